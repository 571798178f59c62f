//! Cultural event aggregate and related types.

mod aggregate;
mod commands;
mod events;
mod value_objects;

pub use aggregate::{Event, Translation};
pub use commands::*;
pub use events::{
    CollaborationDataAddedData, EventChange, EventImportedData, LabelsMergedData,
    TranslationAppliedData, TranslationDeletedData, UnlabelledData,
};
pub use value_objects::{CdbXml, CollaborationData, Label, LabelCollection, Language, LinkType};

use thiserror::Error;

/// Errors raised by the event aggregate and its value objects.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EventError {
    /// The event already exists.
    #[error("Event already created")]
    AlreadyCreated,

    /// The operation needs an existing event.
    #[error("Event has not been created")]
    NotCreated,

    /// A merge was requested without any labels.
    #[error("No labels to merge")]
    NoLabels,

    /// A document command reached the aggregate without passing the guard.
    #[error("Document has not been validated")]
    DocumentNotValidated,

    #[error("Invalid language code: {0:?}")]
    InvalidLanguage(String),

    #[error("Label name must not be blank")]
    BlankLabel,

    #[error("Invalid link type: {0:?}")]
    InvalidLinkType(String),
}
