use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for an aggregate instance.
///
/// Event records are addressed by their cdbid. Ids minted by this service
/// are UUID v4 strings, but ids supplied by callers are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AggregateId(String);

impl AggregateId {
    /// Mints a fresh cdbid.
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Returns the ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for AggregateId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for AggregateId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for AggregateId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for AggregateId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl AsRef<str> for AggregateId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aggregate_id_new_creates_unique_ids() {
        let id1 = AggregateId::new();
        let id2 = AggregateId::new();
        assert_ne!(id1, id2);
    }

    #[test]
    fn aggregate_id_new_is_a_uuid() {
        let id = AggregateId::new();
        assert!(Uuid::parse_str(id.as_str()).is_ok());
    }

    #[test]
    fn aggregate_id_keeps_caller_supplied_value() {
        let id = AggregateId::from("004aea08-e13d-48c9-b9eb-a18f20e6d44e");
        assert_eq!(id.to_string(), "004aea08-e13d-48c9-b9eb-a18f20e6d44e");

        let id = AggregateId::from("foo");
        assert_eq!(id.as_str(), "foo");
    }

    #[test]
    fn aggregate_id_serializes_as_plain_string() {
        let id = AggregateId::from("foo");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"foo\"");
        let deserialized: AggregateId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, deserialized);
    }
}
