//! Value objects for the cultural event aggregate.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::EventError;

/// Two-letter ISO 639-1 language code, lowercase.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Language(String);

impl Language {
    pub fn new(code: impl Into<String>) -> Result<Self, EventError> {
        let code = code.into();
        if code.len() == 2 && code.bytes().all(|b| b.is_ascii_lowercase()) {
            Ok(Self(code))
        } else {
            Err(EventError::InvalidLanguage(code))
        }
    }

    pub fn code(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Language {
    type Error = EventError;

    fn try_from(code: String) -> Result<Self, Self::Error> {
        Self::new(code)
    }
}

impl From<Language> for String {
    fn from(language: Language) -> Self {
        language.0
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A keyword attached to an event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Label {
    name: String,
    visible: bool,
}

impl Label {
    /// Creates a label; surrounding whitespace is trimmed and blank names are rejected.
    pub fn new(name: impl AsRef<str>, visible: bool) -> Result<Self, EventError> {
        let name = name.as_ref().trim();
        if name.is_empty() {
            return Err(EventError::BlankLabel);
        }
        Ok(Self {
            name: name.to_string(),
            visible,
        })
    }

    /// A visible label.
    pub fn visible(name: impl AsRef<str>) -> Result<Self, EventError> {
        Self::new(name, true)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Labels compare case-insensitively by name.
    pub fn same_as(&self, other: &Label) -> bool {
        self.name.to_lowercase() == other.name.to_lowercase()
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Ordered set of labels, unique by case-insensitive name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LabelCollection(Vec<Label>);

impl LabelCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a label unless one with the same name is already present.
    pub fn with(mut self, label: Label) -> Self {
        self.insert(label);
        self
    }

    pub fn insert(&mut self, label: Label) -> bool {
        if self.contains(&label) {
            return false;
        }
        self.0.push(label);
        true
    }

    pub fn remove(&mut self, label: &Label) -> bool {
        let before = self.0.len();
        self.0.retain(|existing| !existing.same_as(label));
        self.0.len() != before
    }

    pub fn contains(&self, label: &Label) -> bool {
        self.0.iter().any(|existing| existing.same_as(label))
    }

    /// Labels of `self` that are not in `other`.
    pub fn without(&self, other: &LabelCollection) -> LabelCollection {
        self.0
            .iter()
            .filter(|label| !other.contains(label))
            .cloned()
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Label> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<Label> for LabelCollection {
    fn from_iter<I: IntoIterator<Item = Label>>(iter: I) -> Self {
        let mut collection = LabelCollection::new();
        for label in iter {
            collection.insert(label);
        }
        collection
    }
}

impl IntoIterator for LabelCollection {
    type Item = Label;
    type IntoIter = std::vec::IntoIter<Label>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// Kind of link attached to an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkType {
    Collaboration,
    Reservations,
    Roadmap,
    Video,
    Text,
    Imageweb,
}

impl LinkType {
    pub fn as_str(&self) -> &'static str {
        match self {
            LinkType::Collaboration => "collaboration",
            LinkType::Reservations => "reservations",
            LinkType::Roadmap => "roadmap",
            LinkType::Video => "video",
            LinkType::Text => "text",
            LinkType::Imageweb => "imageweb",
        }
    }
}

impl FromStr for LinkType {
    type Err = EventError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "collaboration" => Ok(LinkType::Collaboration),
            "reservations" => Ok(LinkType::Reservations),
            "roadmap" => Ok(LinkType::Roadmap),
            "video" => Ok(LinkType::Video),
            "text" => Ok(LinkType::Text),
            "imageweb" => Ok(LinkType::Imageweb),
            other => Err(EventError::InvalidLinkType(other.to_string())),
        }
    }
}

impl fmt::Display for LinkType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Link metadata published by a collaborating party.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollaborationData {
    pub link: String,
    pub link_type: LinkType,
    pub title: Option<String>,
    pub copyright: Option<String>,
    pub subbrand: Option<String>,
    pub description: Option<String>,
}

impl CollaborationData {
    pub fn new(link: impl Into<String>, link_type: LinkType) -> Self {
        Self {
            link: link.into(),
            link_type,
            title: None,
            copyright: None,
            subbrand: None,
            description: None,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_copyright(mut self, copyright: impl Into<String>) -> Self {
        self.copyright = Some(copyright.into());
        self
    }

    pub fn with_subbrand(mut self, subbrand: impl Into<String>) -> Self {
        self.subbrand = Some(subbrand.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// A validated CdbXML document and the namespace it was accepted under.
///
/// Only the dispatcher builds these, after the document guard accepted
/// the submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CdbXml {
    xml: String,
    namespace_uri: String,
}

impl CdbXml {
    pub fn new(xml: impl Into<String>, namespace_uri: impl Into<String>) -> Self {
        Self {
            xml: xml.into(),
            namespace_uri: namespace_uri.into(),
        }
    }

    pub fn xml(&self) -> &str {
        &self.xml
    }

    pub fn namespace_uri(&self) -> &str {
        &self.namespace_uri
    }
}
