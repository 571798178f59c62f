//! Routes event commands to the aggregate through a repository.

use cdbxml::{DocumentGuard, RawDocument};
use tracing::instrument;

use crate::aggregate::AggregateRoot;
use crate::command::CommandResult;
use crate::error::DomainError;
use crate::event::{CdbXml, Event, EventCommand};
use crate::repository::Repository;

/// Handles [`EventCommand`]s.
///
/// Document commands pass the [`DocumentGuard`] before any repository
/// call. Creation builds a new aggregate; every other command loads the
/// existing one. Each successful command is saved exactly once, and a
/// repository failure (not found, conflict) is returned unchanged.
pub struct EventCommandHandler<R> {
    repository: R,
    guard: DocumentGuard,
}

impl<R> EventCommandHandler<R>
where
    R: Repository<Event>,
{
    pub fn new(repository: R, guard: DocumentGuard) -> Self {
        Self { repository, guard }
    }

    pub fn repository(&self) -> &R {
        &self.repository
    }

    pub fn guard(&self) -> &DocumentGuard {
        &self.guard
    }

    /// Dispatches one command.
    #[instrument(skip(self, command), fields(command = %command.kind(), event_id = %command.event_id()))]
    pub async fn handle(&self, command: EventCommand) -> Result<CommandResult<Event>, DomainError> {
        let kind = command.kind();
        metrics::counter!("entry_commands_total", "command" => kind.as_str()).increment(1);

        match self.dispatch(command).await {
            Ok(result) => {
                tracing::info!(
                    version = %result.new_version,
                    changes = result.events.len(),
                    "Command handled"
                );
                Ok(result)
            }
            Err(error) => {
                tracing::warn!(reason = error.reason(), %error, "Command rejected");
                metrics::counter!(
                    "entry_commands_rejected_total",
                    "command" => kind.as_str(),
                    "reason" => error.reason()
                )
                .increment(1);
                Err(error)
            }
        }
    }

    async fn dispatch(&self, command: EventCommand) -> Result<CommandResult<Event>, DomainError> {
        let route = command.kind().route();

        let cdbxml = match command.document() {
            Some(document) if route.validates_document => Some(self.accept(document)?),
            _ => None,
        };

        let mut root = if route.loads_aggregate {
            self.repository.load(command.event_id()).await?
        } else {
            AggregateRoot::new(command.event_id().clone())
        };

        root.execute(|event| command.apply_to(event, cdbxml))?;
        self.repository.save(root).await
    }

    fn accept(&self, document: &RawDocument) -> Result<CdbXml, DomainError> {
        let validated = self.guard.validate(document)?;
        Ok(CdbXml::new(document.as_str(), validated.namespace_uri()))
    }
}
