//! Events recorded by the cultural event aggregate.

use chrono::{DateTime, Utc};
use common::AggregateId;
use serde::{Deserialize, Serialize};

use crate::aggregate::DomainEvent;

use super::{CdbXml, CollaborationData, Label, LabelCollection, Language};

/// Changes that can happen to a cultural event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum EventChange {
    /// The event was imported from a CdbXML document.
    EventCreatedFromCdbXml(EventImportedData),

    /// The event was replaced by a newer CdbXML document.
    EventUpdatedFromCdbXml(EventImportedData),

    /// Labels not yet on the event were added.
    LabelsMerged(LabelsMergedData),

    /// A translation was added or changed.
    TranslationApplied(TranslationAppliedData),

    /// A translation was removed.
    TranslationDeleted(TranslationDeletedData),

    /// A collaboration link was attached.
    CollaborationDataAdded(CollaborationDataAddedData),

    /// A label was removed.
    Unlabelled(UnlabelledData),
}

impl DomainEvent for EventChange {
    fn event_type(&self) -> &'static str {
        match self {
            EventChange::EventCreatedFromCdbXml(_) => "EventCreatedFromCdbXml",
            EventChange::EventUpdatedFromCdbXml(_) => "EventUpdatedFromCdbXml",
            EventChange::LabelsMerged(_) => "LabelsMerged",
            EventChange::TranslationApplied(_) => "TranslationApplied",
            EventChange::TranslationDeleted(_) => "TranslationDeleted",
            EventChange::CollaborationDataAdded(_) => "CollaborationDataAdded",
            EventChange::Unlabelled(_) => "Unlabelled",
        }
    }
}

/// Data for EventCreatedFromCdbXml and EventUpdatedFromCdbXml.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventImportedData {
    pub event_id: AggregateId,

    /// The document exactly as submitted, with the namespace it was accepted under.
    pub cdbxml: CdbXml,

    pub imported_at: DateTime<Utc>,
}

/// Data for LabelsMerged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelsMergedData {
    /// Only the labels that were new to the event.
    pub labels: LabelCollection,
}

/// Data for TranslationApplied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranslationAppliedData {
    pub language: Language,
    pub title: Option<String>,
    pub short_description: Option<String>,
    pub long_description: Option<String>,
}

/// Data for TranslationDeleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranslationDeletedData {
    pub language: Language,
}

/// Data for CollaborationDataAdded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollaborationDataAddedData {
    pub language: Language,
    pub data: CollaborationData,
}

/// Data for Unlabelled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnlabelledData {
    pub label: Label,
}

impl EventChange {
    pub fn created_from_cdbxml(event_id: AggregateId, cdbxml: CdbXml) -> Self {
        EventChange::EventCreatedFromCdbXml(EventImportedData {
            event_id,
            cdbxml,
            imported_at: Utc::now(),
        })
    }

    pub fn updated_from_cdbxml(event_id: AggregateId, cdbxml: CdbXml) -> Self {
        EventChange::EventUpdatedFromCdbXml(EventImportedData {
            event_id,
            cdbxml,
            imported_at: Utc::now(),
        })
    }

    pub fn labels_merged(labels: LabelCollection) -> Self {
        EventChange::LabelsMerged(LabelsMergedData { labels })
    }

    pub fn translation_applied(
        language: Language,
        title: Option<String>,
        short_description: Option<String>,
        long_description: Option<String>,
    ) -> Self {
        EventChange::TranslationApplied(TranslationAppliedData {
            language,
            title,
            short_description,
            long_description,
        })
    }

    pub fn translation_deleted(language: Language) -> Self {
        EventChange::TranslationDeleted(TranslationDeletedData { language })
    }

    pub fn collaboration_data_added(language: Language, data: CollaborationData) -> Self {
        EventChange::CollaborationDataAdded(CollaborationDataAddedData { language, data })
    }

    pub fn unlabelled(label: Label) -> Self {
        EventChange::Unlabelled(UnlabelledData { label })
    }
}
