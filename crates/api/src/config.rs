//! Application configuration loaded from environment variables.

use std::path::PathBuf;

use cdbxml::{
    CDBXML_3_3_NAMESPACE, DEFAULT_MAX_DOCUMENT_BYTES, NamespaceRegistry, RegistryError,
    SchemaLocation,
};

const DEFAULT_LINK_BASE_URL: &str = "http://localhost:3000/event/";

/// Server configuration with sensible defaults.
///
/// Reads from environment variables:
/// - `HOST`: bind address (default: `"0.0.0.0"`)
/// - `PORT`: listen port (default: `3000`)
/// - `RUST_LOG`: tracing filter directive (default: `"info"`)
/// - `ENTRY_LINK_BASE_URL`: prefix of the `link` in responses
/// - `ENTRY_MAX_DOCUMENT_BYTES`: size limit for submitted documents (default: 10 MiB)
/// - `CDBXML_3_3_SCHEMA`: schema file replacing the bundled CdbXML 3.3 schema
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub log_level: String,
    pub link_base_url: String,
    pub max_document_bytes: usize,
    pub cdbxml_3_3_schema: Option<PathBuf>,
}

impl Config {
    /// Loads configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            host: lookup("HOST").unwrap_or(defaults.host),
            port: lookup("PORT")
                .and_then(|p| p.parse().ok())
                .unwrap_or(defaults.port),
            log_level: lookup("RUST_LOG").unwrap_or(defaults.log_level),
            link_base_url: lookup("ENTRY_LINK_BASE_URL").unwrap_or(defaults.link_base_url),
            max_document_bytes: lookup("ENTRY_MAX_DOCUMENT_BYTES")
                .and_then(|n| n.parse().ok())
                .unwrap_or(defaults.max_document_bytes),
            cdbxml_3_3_schema: lookup("CDBXML_3_3_SCHEMA").map(PathBuf::from),
        }
    }

    /// Returns the `"host:port"` bind address string.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Builds the registry of accepted namespaces, loading every schema.
    pub fn namespace_registry(&self) -> Result<NamespaceRegistry, RegistryError> {
        match &self.cdbxml_3_3_schema {
            Some(path) => NamespaceRegistry::builder()
                .register(CDBXML_3_3_NAMESPACE, SchemaLocation::File(path.clone()))?
                .build(),
            None => NamespaceRegistry::cdbxml_3_3(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            log_level: "info".to_string(),
            link_base_url: DEFAULT_LINK_BASE_URL.to_string(),
            max_document_bytes: DEFAULT_MAX_DOCUMENT_BYTES,
            cdbxml_3_3_schema: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn from_pairs(pairs: &[(&str, &str)]) -> Config {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_default_values() {
        let config = Config::default();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 3000);
        assert_eq!(config.log_level, "info");
        assert_eq!(config.link_base_url, "http://localhost:3000/event/");
        assert_eq!(config.max_document_bytes, 10 * 1024 * 1024);
        assert!(config.cdbxml_3_3_schema.is_none());
    }

    #[test]
    fn test_addr_formatting() {
        let config = Config {
            host: "127.0.0.1".to_string(),
            port: 8080,
            ..Config::default()
        };
        assert_eq!(config.addr(), "127.0.0.1:8080");
    }

    #[test]
    fn test_reads_entry_settings() {
        let config = from_pairs(&[
            ("PORT", "8080"),
            ("ENTRY_LINK_BASE_URL", "https://entry.example.com/event/"),
            ("ENTRY_MAX_DOCUMENT_BYTES", "2048"),
            ("CDBXML_3_3_SCHEMA", "/etc/entry/CdbXSD3.3.json"),
        ]);
        assert_eq!(config.port, 8080);
        assert_eq!(config.link_base_url, "https://entry.example.com/event/");
        assert_eq!(config.max_document_bytes, 2048);
        assert_eq!(
            config.cdbxml_3_3_schema,
            Some(PathBuf::from("/etc/entry/CdbXSD3.3.json"))
        );
    }

    #[test]
    fn test_invalid_numbers_fall_back() {
        let config = from_pairs(&[("PORT", "http"), ("ENTRY_MAX_DOCUMENT_BYTES", "-1")]);
        assert_eq!(config.port, 3000);
        assert_eq!(config.max_document_bytes, DEFAULT_MAX_DOCUMENT_BYTES);
    }

    #[test]
    fn test_bundled_registry_by_default() {
        let registry = Config::default().namespace_registry().unwrap();
        assert!(registry.contains(CDBXML_3_3_NAMESPACE));
    }

    #[test]
    fn test_missing_schema_file_fails() {
        let config = from_pairs(&[("CDBXML_3_3_SCHEMA", "/nonexistent/schema.json")]);
        assert!(matches!(
            config.namespace_registry(),
            Err(RegistryError::Read { .. })
        ));
    }
}
