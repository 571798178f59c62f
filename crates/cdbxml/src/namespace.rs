//! Registry of accepted CdbXML namespaces and their schemas.

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use crate::schema::{Schema, SchemaError};

/// Namespace URI of CdbXML 3.3.
pub const CDBXML_3_3_NAMESPACE: &str =
    "http://www.cultuurdatabank.com/XMLSchema/CdbXSD/3.3/FINAL";

const BUNDLED_SCHEMAS: &[(&str, &str)] = &[(
    "CdbXSD3.3",
    include_str!("../schemas/CdbXSD3.3.json"),
)];

/// Where a namespace's schema resource is read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaLocation {
    /// A schema compiled into the crate, by name.
    Bundled(&'static str),
    /// A schema file on disk.
    File(PathBuf),
}

impl fmt::Display for SchemaLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchemaLocation::Bundled(name) => write!(f, "bundled:{name}"),
            SchemaLocation::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Errors raised while building a [`NamespaceRegistry`].
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Failed to read schema {location}: {source}")]
    Read {
        location: SchemaLocation,
        #[source]
        source: std::io::Error,
    },

    #[error("Schema {location} is invalid: {source}")]
    Invalid {
        location: SchemaLocation,
        #[source]
        source: SchemaError,
    },

    #[error("Namespace {0} is registered twice")]
    DuplicateNamespace(String),

    #[error("No bundled schema named {0}")]
    UnknownBundledSchema(String),
}

#[derive(Debug)]
struct Registration {
    location: SchemaLocation,
    schema: Schema,
}

/// Maps each accepted namespace URI to the schema documents must satisfy.
///
/// Schemas are loaded when the registry is built, so a missing or broken
/// resource is a startup failure rather than a per-request one.
#[derive(Debug)]
pub struct NamespaceRegistry {
    entries: BTreeMap<String, Registration>,
}

impl NamespaceRegistry {
    pub fn builder() -> NamespaceRegistryBuilder {
        NamespaceRegistryBuilder::default()
    }

    /// Registry accepting CdbXML 3.3 with its bundled schema.
    pub fn cdbxml_3_3() -> Result<Self, RegistryError> {
        Self::builder()
            .register(CDBXML_3_3_NAMESPACE, SchemaLocation::Bundled("CdbXSD3.3"))?
            .build()
    }

    pub fn schema(&self, namespace: &str) -> Option<&Schema> {
        self.entries.get(namespace).map(|entry| &entry.schema)
    }

    pub fn location(&self, namespace: &str) -> Option<&SchemaLocation> {
        self.entries.get(namespace).map(|entry| &entry.location)
    }

    pub fn contains(&self, namespace: &str) -> bool {
        self.entries.contains_key(namespace)
    }

    /// Accepted namespace URIs, sorted.
    pub fn namespaces(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Builder for [`NamespaceRegistry`].
#[derive(Debug, Default)]
pub struct NamespaceRegistryBuilder {
    entries: BTreeMap<String, Registration>,
}

impl NamespaceRegistryBuilder {
    /// Loads the schema at `location` and registers it for `namespace`.
    pub fn register(
        mut self,
        namespace: impl Into<String>,
        location: SchemaLocation,
    ) -> Result<Self, RegistryError> {
        let namespace = namespace.into();
        if self.entries.contains_key(&namespace) {
            return Err(RegistryError::DuplicateNamespace(namespace));
        }

        let schema = load(&location)?;
        tracing::debug!(%namespace, %location, "Registered schema");
        self.entries
            .insert(namespace, Registration { location, schema });
        Ok(self)
    }

    pub fn build(self) -> Result<NamespaceRegistry, RegistryError> {
        Ok(NamespaceRegistry {
            entries: self.entries,
        })
    }
}

fn load(location: &SchemaLocation) -> Result<Schema, RegistryError> {
    let text = match location {
        SchemaLocation::Bundled(name) => BUNDLED_SCHEMAS
            .iter()
            .find(|(bundled, _)| bundled == name)
            .map(|(_, json)| (*json).to_string())
            .ok_or_else(|| RegistryError::UnknownBundledSchema((*name).to_string()))?,
        SchemaLocation::File(path) => {
            std::fs::read_to_string(path).map_err(|source| RegistryError::Read {
                location: location.clone(),
                source,
            })?
        }
    };

    Schema::from_json(&text).map_err(|source| RegistryError::Invalid {
        location: location.clone(),
        source,
    })
}
