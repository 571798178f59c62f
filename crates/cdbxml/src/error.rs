//! Failures raised by the document guard.

use thiserror::Error;

/// Reason a submitted document was rejected.
///
/// Exactly one variant is reported per document: the first rule the
/// document breaks, in the order the guard checks them.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GuardError {
    /// The input is not well-formed XML.
    #[error("Malformed document: {message}")]
    MalformedDocument { message: String },

    /// The root element's namespace is not registered.
    #[error(
        "Unexpected namespace \"{received}\", expected one of: {}",
        .accepted.join(", ")
    )]
    UnexpectedNamespace {
        received: String,
        accepted: Vec<String>,
    },

    /// The root element is not `cdbxml`.
    #[error("Unexpected root element \"{actual}\", expected \"{expected}\"")]
    UnexpectedRootElement { expected: String, actual: String },

    /// The tree does not satisfy the schema registered for its namespace.
    #[error(
        "Document is not valid according to the schema for namespace {namespace}: {}",
        .violations.join("; ")
    )]
    SchemaValidationFailure {
        namespace: String,
        violations: Vec<String>,
    },

    /// The root's first child is missing or is not an `event`.
    #[error("{}", element_not_found(.expected, .found.as_deref()))]
    ElementNotFound {
        expected: String,
        found: Option<String>,
    },

    /// More than one record was submitted.
    #[error("Too many items in your messages.")]
    TooManyItems,

    /// A long description contains a script tag.
    #[error("Suspicious content found in element {element}")]
    SuspiciousContent { element: String },
}

impl GuardError {
    pub(crate) fn malformed(source: impl std::fmt::Display) -> Self {
        GuardError::MalformedDocument {
            message: source.to_string(),
        }
    }

    /// Stable name of the failure kind, used for logs and metric labels.
    pub fn kind(&self) -> &'static str {
        match self {
            GuardError::MalformedDocument { .. } => "MalformedDocument",
            GuardError::UnexpectedNamespace { .. } => "UnexpectedNamespace",
            GuardError::UnexpectedRootElement { .. } => "UnexpectedRootElement",
            GuardError::SchemaValidationFailure { .. } => "SchemaValidationFailure",
            GuardError::ElementNotFound { .. } => "ElementNotFound",
            GuardError::TooManyItems => "TooManyItems",
            GuardError::SuspiciousContent { .. } => "SuspiciousContent",
        }
    }
}

fn element_not_found(expected: &str, found: Option<&str>) -> String {
    match found {
        Some(found) => format!("Element {expected} not found, found {found} instead"),
        None => format!("Element {expected} not found"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unexpected_namespace_lists_accepted_uris() {
        let err = GuardError::UnexpectedNamespace {
            received: "http://example.com/other".to_string(),
            accepted: vec!["http://a".to_string(), "http://b".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "Unexpected namespace \"http://example.com/other\", expected one of: http://a, http://b"
        );
    }

    #[test]
    fn element_not_found_mentions_what_was_found() {
        let err = GuardError::ElementNotFound {
            expected: "http://a:event".to_string(),
            found: Some("http://a:actor".to_string()),
        };
        assert_eq!(
            err.to_string(),
            "Element http://a:event not found, found http://a:actor instead"
        );

        let err = GuardError::ElementNotFound {
            expected: "http://a:event".to_string(),
            found: None,
        };
        assert_eq!(err.to_string(), "Element http://a:event not found");
    }

    #[test]
    fn kind_is_stable() {
        assert_eq!(GuardError::TooManyItems.kind(), "TooManyItems");
        assert_eq!(GuardError::malformed("eof").kind(), "MalformedDocument");
    }
}
