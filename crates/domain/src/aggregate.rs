//! Core aggregate and domain event traits.

use common::AggregateId;
use event_store::Version;
use serde::{Serialize, de::DeserializeOwned};

/// Trait for domain events.
///
/// Domain events represent facts that have happened in the domain.
/// They are immutable and named in past tense.
pub trait DomainEvent: Serialize + DeserializeOwned + Send + Sync + Clone {
    /// Returns the event type name stored alongside the payload.
    fn event_type(&self) -> &'static str;
}

/// Trait for aggregates in an event-sourced system.
///
/// Aggregates:
/// - are rebuilt by replaying events
/// - generate events from commands without mutating themselves
/// - apply events to update state (pure, deterministic)
pub trait Aggregate: Default + Send + Sync + Sized {
    /// The type of events this aggregate produces and consumes.
    type Event: DomainEvent;

    /// The type of errors its command methods can produce.
    type Error: std::error::Error + Send + Sync;

    /// Returns the aggregate type name.
    fn aggregate_type() -> &'static str;

    /// Returns the aggregate's identifier, or `None` before creation.
    fn id(&self) -> Option<&AggregateId>;

    /// Returns the version of the last event applied from the store.
    fn version(&self) -> Version;

    /// Sets the aggregate version.
    ///
    /// Called by the repository while replaying and after saving.
    fn set_version(&mut self, version: Version);

    /// Applies an event to the aggregate, updating its state.
    ///
    /// Must be deterministic and must not fail: events are facts.
    fn apply(&mut self, event: Self::Event);

    /// Applies multiple events in sequence.
    fn apply_events(&mut self, events: impl IntoIterator<Item = Self::Event>) {
        for event in events {
            self.apply(event);
        }
    }
}

/// An aggregate together with the changes recorded since it was loaded.
///
/// Command methods are executed through [`AggregateRoot::execute`], which
/// applies the returned events immediately and keeps them pending until a
/// repository saves the root.
pub struct AggregateRoot<A: Aggregate> {
    id: AggregateId,
    aggregate: A,
    expected_version: Version,
    pending: Vec<A::Event>,
}

impl<A> std::fmt::Debug for AggregateRoot<A>
where
    A: Aggregate + std::fmt::Debug,
    A::Event: std::fmt::Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AggregateRoot")
            .field("id", &self.id)
            .field("aggregate", &self.aggregate)
            .field("expected_version", &self.expected_version)
            .field("pending", &self.pending)
            .finish()
    }
}

impl<A: Aggregate> AggregateRoot<A> {
    /// A root for an aggregate that does not exist yet.
    pub fn new(id: AggregateId) -> Self {
        Self {
            id,
            aggregate: A::default(),
            expected_version: Version::initial(),
            pending: Vec::new(),
        }
    }

    /// A root for an aggregate rebuilt from stored events.
    pub fn from_loaded(id: AggregateId, aggregate: A) -> Self {
        let expected_version = aggregate.version();
        Self {
            id,
            aggregate,
            expected_version,
            pending: Vec::new(),
        }
    }

    pub fn id(&self) -> &AggregateId {
        &self.id
    }

    pub fn aggregate(&self) -> &A {
        &self.aggregate
    }

    /// Version the store must still hold when the pending events are saved.
    pub fn expected_version(&self) -> Version {
        self.expected_version
    }

    /// True if nothing has been stored for this aggregate yet.
    pub fn is_new(&self) -> bool {
        self.expected_version == Version::initial()
    }

    pub fn pending_events(&self) -> &[A::Event] {
        &self.pending
    }

    /// Runs a command method and records the events it returns.
    ///
    /// On error nothing is recorded and the aggregate is left untouched.
    pub fn execute<F>(&mut self, command_fn: F) -> Result<&[A::Event], A::Error>
    where
        F: FnOnce(&A) -> Result<Vec<A::Event>, A::Error>,
    {
        let events = command_fn(&self.aggregate)?;
        let start = self.pending.len();
        for event in events {
            self.aggregate.apply(event.clone());
            self.pending.push(event);
        }
        Ok(&self.pending[start..])
    }

    /// Splits the root into the aggregate and its pending events.
    pub fn into_parts(self) -> (AggregateId, A, Version, Vec<A::Event>) {
        (self.id, self.aggregate, self.expected_version, self.pending)
    }
}
