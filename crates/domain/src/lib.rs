//! Domain layer for the entry API.
//!
//! This crate provides:
//! - Aggregate and DomainEvent traits, plus [`AggregateRoot`] for pending changes
//! - the [`Repository`] contract and its event-sourced implementation
//! - the cultural [`Event`] aggregate with its commands and value objects
//! - the [`EventCommandHandler`] that validates and dispatches commands

pub mod aggregate;
pub mod command;
pub mod dispatcher;
pub mod error;
pub mod event;
pub mod repository;

pub use aggregate::{Aggregate, AggregateRoot, DomainEvent};
pub use command::{Command, CommandResult};
pub use dispatcher::EventCommandHandler;
pub use error::DomainError;
pub use event::{
    AddCollaborationLink, ApplyTranslation, CdbXml, CollaborationData, CommandKind,
    CreateEventFromDocument, DeleteLabel, DeleteTranslation, Event, EventChange, EventCommand,
    EventError, Label, LabelCollection, Language, LinkType, MergeLabels, Route, Translation,
    UpdateEventFromDocument,
};
pub use repository::{EventSourcedRepository, Repository};
