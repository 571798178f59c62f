use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::{
    AggregateId, EventEnvelope, EventStoreError, Result, Version,
    store::{AppendOptions, EventStore, validate_events_for_append},
};

/// Event store keeping one stream per aggregate in memory.
///
/// Appends hold the write lock across the version check and the insert.
#[derive(Clone, Default)]
pub struct InMemoryEventStore {
    streams: Arc<RwLock<HashMap<AggregateId, Vec<EventEnvelope>>>>,
}

impl InMemoryEventStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of stored changes over all streams.
    pub async fn event_count(&self) -> usize {
        self.streams.read().await.values().map(Vec::len).sum()
    }
}

fn stream_version(stream: &[EventEnvelope]) -> Version {
    stream
        .last()
        .map(|envelope| envelope.version)
        .unwrap_or_default()
}

#[async_trait]
impl EventStore for InMemoryEventStore {
    #[tracing::instrument(skip_all, fields(count = events.len()))]
    async fn append(&self, events: Vec<EventEnvelope>, options: AppendOptions) -> Result<Version> {
        validate_events_for_append(&events)?;
        let aggregate_id = events[0].aggregate_id.clone();

        let mut streams = self.streams.write().await;
        let current = streams
            .get(&aggregate_id)
            .map(|stream| stream_version(stream))
            .unwrap_or_default();

        if let Some(expected) = options.expected_version
            && current != expected
        {
            tracing::debug!(%aggregate_id, %expected, actual = %current, "version mismatch");
            return Err(EventStoreError::ConcurrencyConflict {
                aggregate_id,
                expected,
                actual: current,
            });
        }

        if events[0].version != current.next() {
            return Err(EventStoreError::ConcurrencyConflict {
                aggregate_id,
                expected: options.expected_version.unwrap_or(current),
                actual: current,
            });
        }

        let stream = streams.entry(aggregate_id.clone()).or_default();
        stream.extend(events);
        let version = stream_version(stream);
        tracing::debug!(%aggregate_id, %version, "appended");
        Ok(version)
    }

    async fn get_events_for_aggregate(
        &self,
        aggregate_id: &AggregateId,
    ) -> Result<Vec<EventEnvelope>> {
        let streams = self.streams.read().await;
        Ok(streams.get(aggregate_id).cloned().unwrap_or_default())
    }

    async fn get_aggregate_version(&self, aggregate_id: &AggregateId) -> Result<Option<Version>> {
        let streams = self.streams.read().await;
        Ok(streams
            .get(aggregate_id)
            .map(|stream| stream_version(stream)))
    }
}
