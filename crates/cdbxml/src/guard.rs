//! The document guard: every check a submission must pass before it may
//! reach an aggregate.

use std::sync::Arc;

use tracing::instrument;

use crate::document::{Element, ParsedDocument, RawDocument};
use crate::error::GuardError;
use crate::namespace::NamespaceRegistry;

/// Local name of the required root element.
pub const ROOT_ELEMENT: &str = "cdbxml";

/// Local name of the single record a submission carries.
pub const EVENT_ELEMENT: &str = "event";

const LONG_DESCRIPTION: &str = "longdescription";
const SCRIPT_TAG: &str = "<script>";

/// A document that passed every guard check.
#[derive(Debug, Clone)]
pub struct ValidatedDocument {
    document: ParsedDocument,
    namespace_uri: String,
}

impl ValidatedDocument {
    /// The namespace the document declared, as accepted by the registry.
    pub fn namespace_uri(&self) -> &str {
        &self.namespace_uri
    }

    pub fn document(&self) -> &ParsedDocument {
        &self.document
    }

    /// The single `event` record.
    pub fn event_element(&self) -> Option<&Element> {
        self.document.root().child_elements().next()
    }
}

/// Validates raw submissions against a [`NamespaceRegistry`].
///
/// Checks run in a fixed order and the first failure is returned, so the
/// same input always yields the same outcome.
#[derive(Debug, Clone)]
pub struct DocumentGuard {
    registry: Arc<NamespaceRegistry>,
}

impl DocumentGuard {
    pub fn new(registry: Arc<NamespaceRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &NamespaceRegistry {
        &self.registry
    }

    /// Runs all checks against a submission.
    #[instrument(skip(self, raw), fields(size = raw.len()))]
    pub fn validate(&self, raw: &RawDocument) -> Result<ValidatedDocument, GuardError> {
        match self.check(raw) {
            Ok(validated) => {
                tracing::debug!(namespace = %validated.namespace_uri(), "Document accepted");
                Ok(validated)
            }
            Err(error) => {
                tracing::warn!(reason = error.kind(), %error, "Document rejected");
                metrics::counter!("entry_documents_rejected_total", "reason" => error.kind())
                    .increment(1);
                Err(error)
            }
        }
    }

    fn check(&self, raw: &RawDocument) -> Result<ValidatedDocument, GuardError> {
        let document = ParsedDocument::parse(raw.as_str())?;
        let root = document.root();

        let namespace = root.namespace().unwrap_or_default().to_string();
        let Some(schema) = self.registry.schema(&namespace) else {
            return Err(GuardError::UnexpectedNamespace {
                received: namespace,
                accepted: self.registry.namespaces().map(str::to_string).collect(),
            });
        };

        if root.local_name() != ROOT_ELEMENT {
            return Err(GuardError::UnexpectedRootElement {
                expected: ROOT_ELEMENT.to_string(),
                actual: root.local_name().to_string(),
            });
        }

        schema
            .validate(&namespace, root)
            .map_err(|violations| GuardError::SchemaValidationFailure {
                namespace: namespace.clone(),
                violations: violations.iter().map(ToString::to_string).collect(),
            })?;

        locate_event(&namespace, root)?;
        scan_long_descriptions(&namespace, root)?;

        Ok(ValidatedDocument {
            document,
            namespace_uri: namespace,
        })
    }
}

fn locate_event<'a>(namespace: &str, root: &'a Element) -> Result<&'a Element, GuardError> {
    let expected = format!("{namespace}:{EVENT_ELEMENT}");
    let mut children = root.child_elements();

    let first = match children.next() {
        Some(first) if first.is(namespace, EVENT_ELEMENT) => first,
        Some(other) => {
            return Err(GuardError::ElementNotFound {
                expected,
                found: Some(other.qualified_name()),
            });
        }
        None => {
            return Err(GuardError::ElementNotFound {
                expected,
                found: None,
            });
        }
    };

    if children.next().is_some() {
        return Err(GuardError::TooManyItems);
    }
    Ok(first)
}

fn scan_long_descriptions(namespace: &str, root: &Element) -> Result<(), GuardError> {
    let suspicious = root
        .descendants()
        .filter(|element| element.is(namespace, LONG_DESCRIPTION))
        .any(|element| element.text_content().to_ascii_lowercase().contains(SCRIPT_TAG));

    if suspicious {
        return Err(GuardError::SuspiciousContent {
            element: LONG_DESCRIPTION.to_string(),
        });
    }
    Ok(())
}
