//! Domain error types.

use cdbxml::GuardError;
use event_store::EventStoreError;
use thiserror::Error;

use crate::event::EventError;

/// Errors that can occur while dispatching a command.
#[derive(Debug, Error)]
pub enum DomainError {
    /// The submitted document was rejected by the guard.
    #[error(transparent)]
    Document(#[from] GuardError),

    /// An error occurred in the event store, including concurrency conflicts.
    #[error("Event store error: {0}")]
    EventStore(#[from] EventStoreError),

    /// The event aggregate refused the operation.
    #[error("Event error: {0}")]
    Event(#[from] EventError),

    /// Aggregate not found.
    #[error("Aggregate not found: {aggregate_type} with id {aggregate_id}")]
    AggregateNotFound {
        aggregate_type: &'static str,
        aggregate_id: String,
    },

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl DomainError {
    /// Stable name of the failure, used for logs and metric labels.
    pub fn reason(&self) -> &'static str {
        match self {
            DomainError::Document(error) => error.kind(),
            DomainError::EventStore(EventStoreError::ConcurrencyConflict { .. }) => "Conflict",
            DomainError::EventStore(_) => "EventStore",
            DomainError::Event(_) => "Event",
            DomainError::AggregateNotFound { .. } => "NotFound",
            DomainError::Serialization(_) => "Serialization",
        }
    }

    /// True for an optimistic concurrency conflict on save.
    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            DomainError::EventStore(EventStoreError::ConcurrencyConflict { .. })
        )
    }
}
