use std::sync::Arc;

use cdbxml::{DEFAULT_MAX_DOCUMENT_BYTES, DocumentGuard, NamespaceRegistry, RawDocument};
use common::AggregateId;
use criterion::{Criterion, criterion_group, criterion_main};
use domain::{
    CreateEventFromDocument, EventCommandHandler, EventSourcedRepository, Label, LabelCollection,
    MergeLabels, Repository,
};
use event_store::InMemoryEventStore;

const VALID: &str = include_str!("../../cdbxml/tests/fixtures/Valid.xml");

type Handler = EventCommandHandler<EventSourcedRepository<InMemoryEventStore, domain::Event>>;

fn handler() -> Handler {
    let registry = NamespaceRegistry::cdbxml_3_3().unwrap();
    EventCommandHandler::new(
        EventSourcedRepository::new(InMemoryEventStore::new()),
        DocumentGuard::new(Arc::new(registry)),
    )
}

fn document() -> RawDocument {
    RawDocument::new(VALID, DEFAULT_MAX_DOCUMENT_BYTES).unwrap()
}

fn bench_create_event(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let handler = handler();

    c.bench_function("domain/create_event_from_document", |b| {
        b.iter(|| {
            rt.block_on(async {
                handler
                    .handle(CreateEventFromDocument::new(AggregateId::new(), document()).into())
                    .await
                    .unwrap();
            });
        });
    });
}

fn bench_merge_labels(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let handler = handler();
    let id = AggregateId::new();
    rt.block_on(async {
        handler
            .handle(CreateEventFromDocument::new(id.clone(), document()).into())
            .await
            .unwrap();
    });

    let mut n = 0u64;
    c.bench_function("domain/merge_labels", |b| {
        b.iter(|| {
            n += 1;
            let labels = LabelCollection::new().with(Label::visible(format!("label-{n}")).unwrap());
            rt.block_on(async {
                handler
                    .handle(MergeLabels::new(id.clone(), labels).into())
                    .await
                    .unwrap();
            });
        });
    });
}

fn bench_aggregate_reconstruction_100(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let handler = handler();
    let id = AggregateId::new();

    rt.block_on(async {
        handler
            .handle(CreateEventFromDocument::new(id.clone(), document()).into())
            .await
            .unwrap();
        for v in 1..100 {
            let labels = LabelCollection::new().with(Label::visible(format!("label-{v}")).unwrap());
            handler
                .handle(MergeLabels::new(id.clone(), labels).into())
                .await
                .unwrap();
        }
    });

    c.bench_function("domain/reconstruct_100_events", |b| {
        b.iter(|| {
            rt.block_on(async {
                handler.repository().load(&id).await.unwrap();
            });
        });
    });
}

criterion_group!(
    benches,
    bench_create_event,
    bench_merge_labels,
    bench_aggregate_reconstruction_100,
);
criterion_main!(benches);
