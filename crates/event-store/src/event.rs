use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::AggregateId;

/// Position of a change in an aggregate's stream.
///
/// A fresh aggregate sits at 0; its first stored change is version 1.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Version(i64);

impl Version {
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    pub fn initial() -> Self {
        Self(0)
    }

    pub fn first() -> Self {
        Self(1)
    }

    pub fn next(&self) -> Self {
        Self(self.0 + 1)
    }
}

impl std::fmt::Display for Version {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One recorded change of an aggregate, as kept by the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventEnvelope {
    /// Change name, e.g. "LabelsMerged".
    pub event_type: String,
    pub aggregate_id: AggregateId,
    /// Aggregate kind, e.g. "Event".
    pub aggregate_type: String,
    /// Stream version after this change.
    pub version: Version,
    pub recorded_at: DateTime<Utc>,
    pub payload: serde_json::Value,
}

impl EventEnvelope {
    pub fn builder() -> EventEnvelopeBuilder {
        EventEnvelopeBuilder::default()
    }
}

#[derive(Debug, Default)]
pub struct EventEnvelopeBuilder {
    event_type: Option<String>,
    aggregate_id: Option<AggregateId>,
    aggregate_type: Option<String>,
    version: Option<Version>,
    payload: Option<serde_json::Value>,
}

impl EventEnvelopeBuilder {
    pub fn event_type(mut self, event_type: impl Into<String>) -> Self {
        self.event_type = Some(event_type.into());
        self
    }

    pub fn aggregate_id(mut self, id: AggregateId) -> Self {
        self.aggregate_id = Some(id);
        self
    }

    pub fn aggregate_type(mut self, aggregate_type: impl Into<String>) -> Self {
        self.aggregate_type = Some(aggregate_type.into());
        self
    }

    pub fn version(mut self, version: Version) -> Self {
        self.version = Some(version);
        self
    }

    /// Serializes `payload` into the envelope.
    pub fn payload<T: Serialize>(mut self, payload: &T) -> Result<Self, serde_json::Error> {
        self.payload = Some(serde_json::to_value(payload)?);
        Ok(self)
    }

    pub fn payload_raw(mut self, payload: serde_json::Value) -> Self {
        self.payload = Some(payload);
        self
    }

    /// Returns `None` unless every field was set. The record time is taken now.
    pub fn try_build(self) -> Option<EventEnvelope> {
        Some(EventEnvelope {
            event_type: self.event_type?,
            aggregate_id: self.aggregate_id?,
            aggregate_type: self.aggregate_type?,
            version: self.version?,
            recorded_at: Utc::now(),
            payload: self.payload?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn versions_advance_from_initial() {
        assert_eq!(Version::initial().next(), Version::first());
        assert!(Version::first() < Version::new(2));
        assert_eq!(Version::new(7).to_string(), "7");
    }

    #[test]
    fn builder_stamps_record_time() {
        let before = Utc::now();
        let envelope = EventEnvelope::builder()
            .event_type("LabelsMerged")
            .aggregate_id(AggregateId::from("cdb-1"))
            .aggregate_type("Event")
            .version(Version::first())
            .payload(&serde_json::json!({"labels": ["jazz"]}))
            .unwrap()
            .try_build()
            .unwrap();

        assert_eq!(envelope.aggregate_id.as_str(), "cdb-1");
        assert_eq!(envelope.payload["labels"][0], "jazz");
        assert!(envelope.recorded_at >= before);
    }

    #[test]
    fn builder_requires_every_field() {
        let missing_payload = EventEnvelope::builder()
            .event_type("LabelsMerged")
            .aggregate_id(AggregateId::from("cdb-1"))
            .aggregate_type("Event")
            .version(Version::first())
            .try_build();
        assert!(missing_payload.is_none());
    }
}
