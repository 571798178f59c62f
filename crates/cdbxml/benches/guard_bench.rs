use std::sync::Arc;

use cdbxml::{DEFAULT_MAX_DOCUMENT_BYTES, DocumentGuard, NamespaceRegistry, RawDocument};
use criterion::{Criterion, criterion_group, criterion_main};

const VALID: &str = include_str!("../tests/fixtures/Valid.xml");
const TOO_MANY_EVENTS: &str = include_str!("../tests/fixtures/TooManyEvents.xml");

fn bench_validate_valid(c: &mut Criterion) {
    let guard = DocumentGuard::new(Arc::new(NamespaceRegistry::cdbxml_3_3().unwrap()));
    let raw = RawDocument::new(VALID, DEFAULT_MAX_DOCUMENT_BYTES).unwrap();

    c.bench_function("cdbxml/validate_valid", |b| {
        b.iter(|| guard.validate(&raw).unwrap());
    });
}

fn bench_validate_rejected(c: &mut Criterion) {
    let guard = DocumentGuard::new(Arc::new(NamespaceRegistry::cdbxml_3_3().unwrap()));
    let raw = RawDocument::new(TOO_MANY_EVENTS, DEFAULT_MAX_DOCUMENT_BYTES).unwrap();

    c.bench_function("cdbxml/validate_too_many_items", |b| {
        b.iter(|| guard.validate(&raw).unwrap_err());
    });
}

fn bench_registry_load(c: &mut Criterion) {
    c.bench_function("cdbxml/registry_load", |b| {
        b.iter(|| NamespaceRegistry::cdbxml_3_3().unwrap());
    });
}

criterion_group!(
    benches,
    bench_validate_valid,
    bench_validate_rejected,
    bench_registry_load
);
criterion_main!(benches);
