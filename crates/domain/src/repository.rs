//! Loading and saving aggregates.

use std::marker::PhantomData;

use async_trait::async_trait;
use common::AggregateId;
use event_store::{AppendOptions, EventEnvelope, EventStore, EventStoreError, Version};

use crate::aggregate::{Aggregate, AggregateRoot, DomainEvent};
use crate::command::CommandResult;
use crate::error::DomainError;

/// Storage contract for aggregates.
///
/// `load` fails with [`DomainError::AggregateNotFound`] for unknown ids;
/// `save` fails with a concurrency conflict if the aggregate changed
/// since it was loaded.
#[async_trait]
pub trait Repository<A: Aggregate>: Send + Sync {
    async fn load(&self, id: &AggregateId) -> Result<AggregateRoot<A>, DomainError>;

    async fn save(&self, root: AggregateRoot<A>) -> Result<CommandResult<A>, DomainError>;
}

/// Repository that rebuilds aggregates by replaying their events.
pub struct EventSourcedRepository<S, A>
where
    S: EventStore,
    A: Aggregate,
{
    store: S,
    _phantom: PhantomData<A>,
}

impl<S, A> EventSourcedRepository<S, A>
where
    S: EventStore,
    A: Aggregate,
{
    pub fn new(store: S) -> Self {
        Self {
            store,
            _phantom: PhantomData,
        }
    }

    /// Returns a reference to the underlying event store.
    pub fn store(&self) -> &S {
        &self.store
    }

    fn build_envelopes(
        id: &AggregateId,
        current_version: Version,
        events: &[A::Event],
    ) -> Result<Vec<EventEnvelope>, DomainError> {
        let mut envelopes = Vec::with_capacity(events.len());
        let mut version = current_version;

        for event in events {
            version = version.next();
            let envelope = EventEnvelope::builder()
                .aggregate_id(id.clone())
                .aggregate_type(A::aggregate_type())
                .event_type(event.event_type())
                .version(version)
                .payload(event)?
                .try_build()
                .ok_or_else(|| {
                    EventStoreError::InvalidAppend(format!(
                        "incomplete envelope for {id} at version {version}"
                    ))
                })?;
            envelopes.push(envelope);
        }

        Ok(envelopes)
    }
}

#[async_trait]
impl<S, A> Repository<A> for EventSourcedRepository<S, A>
where
    S: EventStore,
    A: Aggregate + 'static,
{
    #[tracing::instrument(skip(self), fields(aggregate_type = A::aggregate_type()))]
    async fn load(&self, id: &AggregateId) -> Result<AggregateRoot<A>, DomainError> {
        let envelopes = self.store.get_events_for_aggregate(id).await?;
        if envelopes.is_empty() {
            return Err(DomainError::AggregateNotFound {
                aggregate_type: A::aggregate_type(),
                aggregate_id: id.to_string(),
            });
        }

        let mut aggregate = A::default();
        for envelope in envelopes {
            let event: A::Event = serde_json::from_value(envelope.payload)?;
            aggregate.apply(event);
            aggregate.set_version(envelope.version);
        }

        tracing::debug!(version = %aggregate.version(), "Aggregate loaded");
        Ok(AggregateRoot::from_loaded(id.clone(), aggregate))
    }

    #[tracing::instrument(skip(self, root), fields(aggregate_id = %root.id()))]
    async fn save(&self, root: AggregateRoot<A>) -> Result<CommandResult<A>, DomainError> {
        let is_new = root.is_new();
        let (id, mut aggregate, expected_version, events) = root.into_parts();

        if events.is_empty() {
            return Ok(CommandResult {
                aggregate,
                events,
                new_version: expected_version,
            });
        }

        let envelopes = Self::build_envelopes(&id, expected_version, &events)?;

        let options = if is_new {
            AppendOptions::expect_new()
        } else {
            AppendOptions::expect_version(expected_version)
        };

        let new_version = self.store.append(envelopes, options).await?;
        aggregate.set_version(new_version);

        tracing::debug!(%new_version, count = events.len(), "Aggregate saved");
        Ok(CommandResult {
            aggregate,
            events,
            new_version,
        })
    }
}
