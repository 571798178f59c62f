//! Document guard for CdbXML submissions.
//!
//! A submitted document passes through, in order:
//! - XML parsing (namespace aware)
//! - namespace lookup in the [`NamespaceRegistry`]
//! - root element check (`cdbxml`)
//! - schema validation for the declared namespace
//! - location of the single `event` record
//! - a scan of long descriptions for script tags
//!
//! The first violated rule is reported as a [`GuardError`].

pub mod document;
pub mod error;
pub mod guard;
pub mod namespace;
pub mod schema;

pub use document::{
    DEFAULT_MAX_DOCUMENT_BYTES, DocumentTooLarge, Element, Node, ParsedDocument, RawDocument,
};
pub use error::GuardError;
pub use guard::{DocumentGuard, EVENT_ELEMENT, ROOT_ELEMENT, ValidatedDocument};
pub use namespace::{
    CDBXML_3_3_NAMESPACE, NamespaceRegistry, NamespaceRegistryBuilder, RegistryError,
    SchemaLocation,
};
pub use schema::{Content, ElementRule, Occurs, Schema, SchemaError, Violation};
