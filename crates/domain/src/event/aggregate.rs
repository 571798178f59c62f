//! The cultural event aggregate.

use std::collections::BTreeMap;

use common::AggregateId;
use event_store::Version;

use crate::aggregate::Aggregate;

use super::{
    CdbXml, CollaborationData, EventChange, EventError, Label, LabelCollection, Language,
    events::{EventImportedData, TranslationAppliedData},
};

/// Translated texts for one language.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Translation {
    pub title: Option<String>,
    pub short_description: Option<String>,
    pub long_description: Option<String>,
}

/// A cultural event, as submitted through the entry API.
#[derive(Debug, Clone, Default)]
pub struct Event {
    id: Option<AggregateId>,
    version: Version,
    cdbxml: Option<CdbXml>,
    labels: LabelCollection,
    translations: BTreeMap<Language, Translation>,
    collaboration: BTreeMap<Language, Vec<CollaborationData>>,
}

impl Aggregate for Event {
    type Event = EventChange;
    type Error = EventError;

    fn aggregate_type() -> &'static str {
        "Event"
    }

    fn id(&self) -> Option<&AggregateId> {
        self.id.as_ref()
    }

    fn version(&self) -> Version {
        self.version
    }

    fn set_version(&mut self, version: Version) {
        self.version = version;
    }

    fn apply(&mut self, event: Self::Event) {
        match event {
            EventChange::EventCreatedFromCdbXml(data)
            | EventChange::EventUpdatedFromCdbXml(data) => self.apply_imported(data),
            EventChange::LabelsMerged(data) => {
                for label in data.labels {
                    self.labels.insert(label);
                }
            }
            EventChange::TranslationApplied(data) => self.apply_translation_applied(data),
            EventChange::TranslationDeleted(data) => {
                self.translations.remove(&data.language);
            }
            EventChange::CollaborationDataAdded(data) => {
                self.collaboration
                    .entry(data.language)
                    .or_default()
                    .push(data.data);
            }
            EventChange::Unlabelled(data) => {
                self.labels.remove(&data.label);
            }
        }
    }
}

// Query methods
impl Event {
    /// The most recently imported document.
    pub fn cdbxml(&self) -> Option<&CdbXml> {
        self.cdbxml.as_ref()
    }

    pub fn labels(&self) -> &LabelCollection {
        &self.labels
    }

    pub fn translation(&self, language: &Language) -> Option<&Translation> {
        self.translations.get(language)
    }

    pub fn translations(&self) -> impl Iterator<Item = (&Language, &Translation)> {
        self.translations.iter()
    }

    pub fn collaboration_data(&self, language: &Language) -> &[CollaborationData] {
        self.collaboration
            .get(language)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn is_created(&self) -> bool {
        self.id.is_some()
    }
}

// Command methods (return events)
impl Event {
    /// Creates the event from an accepted CdbXML document.
    pub fn create_from_cdbxml(
        &self,
        event_id: AggregateId,
        cdbxml: CdbXml,
    ) -> Result<Vec<EventChange>, EventError> {
        if self.is_created() {
            return Err(EventError::AlreadyCreated);
        }
        Ok(vec![EventChange::created_from_cdbxml(event_id, cdbxml)])
    }

    /// Replaces the event's document with a newer one.
    pub fn update_from_cdbxml(
        &self,
        event_id: AggregateId,
        cdbxml: CdbXml,
    ) -> Result<Vec<EventChange>, EventError> {
        self.ensure_created()?;
        Ok(vec![EventChange::updated_from_cdbxml(event_id, cdbxml)])
    }

    /// Adds the labels the event doesn't carry yet.
    pub fn merge_labels(&self, labels: &LabelCollection) -> Result<Vec<EventChange>, EventError> {
        self.ensure_created()?;
        if labels.is_empty() {
            return Err(EventError::NoLabels);
        }

        let new = labels.without(&self.labels);
        if new.is_empty() {
            return Ok(vec![]);
        }
        Ok(vec![EventChange::labels_merged(new)])
    }

    /// Sets the supplied translated fields for a language.
    pub fn apply_translation(
        &self,
        language: Language,
        title: Option<String>,
        short_description: Option<String>,
        long_description: Option<String>,
    ) -> Result<Vec<EventChange>, EventError> {
        self.ensure_created()?;
        Ok(vec![EventChange::translation_applied(
            language,
            title,
            short_description,
            long_description,
        )])
    }

    pub fn delete_translation(&self, language: Language) -> Result<Vec<EventChange>, EventError> {
        self.ensure_created()?;
        Ok(vec![EventChange::translation_deleted(language)])
    }

    pub fn add_collaboration_data(
        &self,
        language: Language,
        data: CollaborationData,
    ) -> Result<Vec<EventChange>, EventError> {
        self.ensure_created()?;
        Ok(vec![EventChange::collaboration_data_added(language, data)])
    }

    /// Removes a label; a label the event doesn't carry is not an error.
    pub fn delete_label(&self, label: &Label) -> Result<Vec<EventChange>, EventError> {
        self.ensure_created()?;
        if !self.labels.contains(label) {
            return Ok(vec![]);
        }
        Ok(vec![EventChange::unlabelled(label.clone())])
    }

    fn ensure_created(&self) -> Result<(), EventError> {
        if self.is_created() {
            Ok(())
        } else {
            Err(EventError::NotCreated)
        }
    }
}

// Event application helpers
impl Event {
    fn apply_imported(&mut self, data: EventImportedData) {
        self.id = Some(data.event_id);
        self.cdbxml = Some(data.cdbxml);
    }

    fn apply_translation_applied(&mut self, data: TranslationAppliedData) {
        let translation = self.translations.entry(data.language).or_default();
        if let Some(title) = data.title {
            translation.title = Some(title);
        }
        if let Some(short_description) = data.short_description {
            translation.short_description = Some(short_description);
        }
        if let Some(long_description) = data.long_description {
            translation.long_description = Some(long_description);
        }
    }
}
