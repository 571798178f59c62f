//! Command infrastructure.

use common::AggregateId;
use event_store::Version;

use crate::aggregate::Aggregate;

/// Result of a saved command.
#[derive(Debug)]
pub struct CommandResult<A: Aggregate> {
    /// The aggregate after applying the new events.
    pub aggregate: A,

    /// The events that were generated and persisted.
    pub events: Vec<A::Event>,

    /// The version of the aggregate after the command.
    pub new_version: Version,
}

/// A request to change one aggregate.
///
/// Commands are immutable once built. They may be rejected if the
/// aggregate's current state doesn't allow the change.
pub trait Command: Send + Sync {
    /// The type of aggregate this command targets.
    type Aggregate: Aggregate;

    /// Returns the ID of the aggregate this command targets.
    fn aggregate_id(&self) -> &AggregateId;
}
