use thiserror::Error;

use crate::{AggregateId, Version};

#[derive(Debug, Error)]
pub enum EventStoreError {
    /// The stream moved on since the caller read it.
    #[error(
        "Concurrency conflict for aggregate {aggregate_id}: expected version {expected}, found {actual}"
    )]
    ConcurrencyConflict {
        aggregate_id: AggregateId,
        expected: Version,
        actual: Version,
    },

    /// The batch was rejected before the store was touched.
    #[error("Invalid append: {0}")]
    InvalidAppend(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, EventStoreError>;
