//! Commands accepted for cultural events.

use cdbxml::RawDocument;
use common::AggregateId;

use crate::command::Command;

use super::{
    CdbXml, CollaborationData, Event, EventChange, EventError, Label, LabelCollection, Language,
};

/// Command to create an event from a submitted document.
#[derive(Debug, Clone)]
pub struct CreateEventFromDocument {
    pub event_id: AggregateId,
    pub document: RawDocument,
}

impl CreateEventFromDocument {
    pub fn new(event_id: AggregateId, document: RawDocument) -> Self {
        Self { event_id, document }
    }
}

/// Command to replace an existing event's document.
#[derive(Debug, Clone)]
pub struct UpdateEventFromDocument {
    pub event_id: AggregateId,
    pub document: RawDocument,
}

impl UpdateEventFromDocument {
    pub fn new(event_id: AggregateId, document: RawDocument) -> Self {
        Self { event_id, document }
    }
}

/// Command to add labels to an event.
#[derive(Debug, Clone)]
pub struct MergeLabels {
    pub event_id: AggregateId,
    pub labels: LabelCollection,
}

impl MergeLabels {
    pub fn new(event_id: AggregateId, labels: LabelCollection) -> Self {
        Self { event_id, labels }
    }
}

/// Command to add or change a translation.
#[derive(Debug, Clone)]
pub struct ApplyTranslation {
    pub event_id: AggregateId,
    pub language: Language,
    pub title: Option<String>,
    pub short_description: Option<String>,
    pub long_description: Option<String>,
}

impl ApplyTranslation {
    pub fn new(event_id: AggregateId, language: Language) -> Self {
        Self {
            event_id,
            language,
            title: None,
            short_description: None,
            long_description: None,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_short_description(mut self, short_description: impl Into<String>) -> Self {
        self.short_description = Some(short_description.into());
        self
    }

    pub fn with_long_description(mut self, long_description: impl Into<String>) -> Self {
        self.long_description = Some(long_description.into());
        self
    }
}

/// Command to remove a translation.
#[derive(Debug, Clone)]
pub struct DeleteTranslation {
    pub event_id: AggregateId,
    pub language: Language,
}

impl DeleteTranslation {
    pub fn new(event_id: AggregateId, language: Language) -> Self {
        Self { event_id, language }
    }
}

/// Command to attach a collaboration link.
#[derive(Debug, Clone)]
pub struct AddCollaborationLink {
    pub event_id: AggregateId,
    pub language: Language,
    pub data: CollaborationData,
}

impl AddCollaborationLink {
    pub fn new(event_id: AggregateId, language: Language, data: CollaborationData) -> Self {
        Self {
            event_id,
            language,
            data,
        }
    }
}

/// Command to remove a label.
#[derive(Debug, Clone)]
pub struct DeleteLabel {
    pub event_id: AggregateId,
    pub label: Label,
}

impl DeleteLabel {
    pub fn new(event_id: AggregateId, label: Label) -> Self {
        Self { event_id, label }
    }
}

macro_rules! impl_event_command {
    ($($command:ident),* $(,)?) => {
        $(
            impl Command for $command {
                type Aggregate = Event;

                fn aggregate_id(&self) -> &AggregateId {
                    &self.event_id
                }
            }

            impl From<$command> for EventCommand {
                fn from(command: $command) -> Self {
                    EventCommand::$command(command)
                }
            }
        )*
    };
}

impl_event_command!(
    CreateEventFromDocument,
    UpdateEventFromDocument,
    MergeLabels,
    ApplyTranslation,
    DeleteTranslation,
    AddCollaborationLink,
    DeleteLabel,
);

/// Any command the dispatcher accepts.
#[derive(Debug, Clone)]
pub enum EventCommand {
    CreateEventFromDocument(CreateEventFromDocument),
    UpdateEventFromDocument(UpdateEventFromDocument),
    MergeLabels(MergeLabels),
    ApplyTranslation(ApplyTranslation),
    DeleteTranslation(DeleteTranslation),
    AddCollaborationLink(AddCollaborationLink),
    DeleteLabel(DeleteLabel),
}

/// Tag of an [`EventCommand`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandKind {
    CreateEventFromDocument,
    UpdateEventFromDocument,
    MergeLabels,
    ApplyTranslation,
    DeleteTranslation,
    AddCollaborationLink,
    DeleteLabel,
}

/// How the dispatcher handles one kind of command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Route {
    /// Run the document guard before touching the repository.
    pub validates_document: bool,
    /// Load the existing aggregate; otherwise a new one is created.
    pub loads_aggregate: bool,
}

impl CommandKind {
    pub const ALL: [CommandKind; 7] = [
        CommandKind::CreateEventFromDocument,
        CommandKind::UpdateEventFromDocument,
        CommandKind::MergeLabels,
        CommandKind::ApplyTranslation,
        CommandKind::DeleteTranslation,
        CommandKind::AddCollaborationLink,
        CommandKind::DeleteLabel,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CommandKind::CreateEventFromDocument => "CreateEventFromDocument",
            CommandKind::UpdateEventFromDocument => "UpdateEventFromDocument",
            CommandKind::MergeLabels => "MergeLabels",
            CommandKind::ApplyTranslation => "ApplyTranslation",
            CommandKind::DeleteTranslation => "DeleteTranslation",
            CommandKind::AddCollaborationLink => "AddCollaborationLink",
            CommandKind::DeleteLabel => "DeleteLabel",
        }
    }

    /// The dispatch table. Every command is saved exactly once.
    pub const fn route(&self) -> Route {
        match self {
            CommandKind::CreateEventFromDocument => Route {
                validates_document: true,
                loads_aggregate: false,
            },
            CommandKind::UpdateEventFromDocument => Route {
                validates_document: true,
                loads_aggregate: true,
            },
            CommandKind::MergeLabels
            | CommandKind::ApplyTranslation
            | CommandKind::DeleteTranslation
            | CommandKind::AddCollaborationLink
            | CommandKind::DeleteLabel => Route {
                validates_document: false,
                loads_aggregate: true,
            },
        }
    }
}

impl std::fmt::Display for CommandKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl EventCommand {
    pub fn kind(&self) -> CommandKind {
        match self {
            EventCommand::CreateEventFromDocument(_) => CommandKind::CreateEventFromDocument,
            EventCommand::UpdateEventFromDocument(_) => CommandKind::UpdateEventFromDocument,
            EventCommand::MergeLabels(_) => CommandKind::MergeLabels,
            EventCommand::ApplyTranslation(_) => CommandKind::ApplyTranslation,
            EventCommand::DeleteTranslation(_) => CommandKind::DeleteTranslation,
            EventCommand::AddCollaborationLink(_) => CommandKind::AddCollaborationLink,
            EventCommand::DeleteLabel(_) => CommandKind::DeleteLabel,
        }
    }

    /// The targeted event.
    pub fn event_id(&self) -> &AggregateId {
        match self {
            EventCommand::CreateEventFromDocument(command) => command.aggregate_id(),
            EventCommand::UpdateEventFromDocument(command) => command.aggregate_id(),
            EventCommand::MergeLabels(command) => command.aggregate_id(),
            EventCommand::ApplyTranslation(command) => command.aggregate_id(),
            EventCommand::DeleteTranslation(command) => command.aggregate_id(),
            EventCommand::AddCollaborationLink(command) => command.aggregate_id(),
            EventCommand::DeleteLabel(command) => command.aggregate_id(),
        }
    }

    /// The submitted document, for the two document commands.
    pub fn document(&self) -> Option<&RawDocument> {
        match self {
            EventCommand::CreateEventFromDocument(command) => Some(&command.document),
            EventCommand::UpdateEventFromDocument(command) => Some(&command.document),
            _ => None,
        }
    }

    /// Invokes the aggregate operation matching this command.
    ///
    /// `cdbxml` is the accepted document for the two document commands.
    pub(crate) fn apply_to(
        self,
        event: &Event,
        cdbxml: Option<CdbXml>,
    ) -> Result<Vec<EventChange>, EventError> {
        match self {
            EventCommand::CreateEventFromDocument(command) => {
                let cdbxml = cdbxml.ok_or(EventError::DocumentNotValidated)?;
                event.create_from_cdbxml(command.event_id, cdbxml)
            }
            EventCommand::UpdateEventFromDocument(command) => {
                let cdbxml = cdbxml.ok_or(EventError::DocumentNotValidated)?;
                event.update_from_cdbxml(command.event_id, cdbxml)
            }
            EventCommand::MergeLabels(command) => event.merge_labels(&command.labels),
            EventCommand::ApplyTranslation(command) => event.apply_translation(
                command.language,
                command.title,
                command.short_description,
                command.long_description,
            ),
            EventCommand::DeleteTranslation(command) => event.delete_translation(command.language),
            EventCommand::AddCollaborationLink(command) => {
                event.add_collaboration_data(command.language, command.data)
            }
            EventCommand::DeleteLabel(command) => event.delete_label(&command.label),
        }
    }
}
