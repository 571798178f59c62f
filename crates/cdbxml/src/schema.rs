//! Structural schema model and validator.
//!
//! A schema resource is a JSON document listing, per element local name,
//! which children may appear (and how often), which attributes are
//! required, and what kind of content the element holds. It captures the
//! structural part of the CdbXSD definitions that submissions must meet.

use std::collections::BTreeMap;

use serde::Deserialize;
use thiserror::Error;

use crate::document::Element;

/// Errors raised while loading a schema resource.
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("Invalid schema resource: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Schema declares root <{0}> but has no rule for it")]
    MissingRootRule(String),
}

/// What an element may contain.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Content {
    /// Declared child elements only.
    #[default]
    Elements,
    /// Character data only.
    Text,
    /// Declared child elements interleaved with text.
    Mixed,
    /// Anything; the subtree is not inspected.
    Any,
}

/// Allowed number of occurrences of a child element.
///
/// Defaults follow XSD: `min = 1`, `max = 1`. A `null` max means unbounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct Occurs {
    #[serde(default = "one")]
    pub min: u32,
    #[serde(default = "bounded_one")]
    pub max: Option<u32>,
}

fn one() -> u32 {
    1
}

fn bounded_one() -> Option<u32> {
    Some(1)
}

/// Constraints for one element.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ElementRule {
    #[serde(default)]
    pub content: Content,
    #[serde(default)]
    pub children: BTreeMap<String, Occurs>,
    #[serde(default)]
    pub required_attributes: Vec<String>,
}

/// One schema violation, located by element path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub path: String,
    pub message: String,
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

/// A loaded schema resource.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Schema {
    root: String,
    elements: BTreeMap<String, ElementRule>,
}

impl Schema {
    /// Parses a schema resource.
    pub fn from_json(json: &str) -> Result<Self, SchemaError> {
        let schema: Schema = serde_json::from_str(json)?;
        if !schema.elements.contains_key(&schema.root) {
            return Err(SchemaError::MissingRootRule(schema.root));
        }
        Ok(schema)
    }

    /// Local name of the root element the schema describes.
    pub fn root(&self) -> &str {
        &self.root
    }

    /// Returns the rule for an element, if the schema constrains it.
    pub fn rule(&self, local_name: &str) -> Option<&ElementRule> {
        self.elements.get(local_name)
    }

    /// Validates a tree whose elements belong to `namespace`.
    ///
    /// Every violation is collected; elements without a rule are accepted
    /// with any content.
    pub fn validate(&self, namespace: &str, root: &Element) -> Result<(), Vec<Violation>> {
        let mut violations = Vec::new();
        let path = format!("/{}", root.local_name());

        if !root.is(namespace, &self.root) {
            violations.push(Violation {
                path,
                message: format!("expected root element <{}>", self.root),
            });
        } else {
            self.validate_element(namespace, root, &path, &mut violations);
        }

        if violations.is_empty() {
            Ok(())
        } else {
            Err(violations)
        }
    }

    fn validate_element(
        &self,
        namespace: &str,
        element: &Element,
        path: &str,
        violations: &mut Vec<Violation>,
    ) {
        let Some(rule) = self.rule(element.local_name()) else {
            return;
        };

        for attribute in &rule.required_attributes {
            if element.attribute(attribute).is_none() {
                violations.push(Violation {
                    path: path.to_string(),
                    message: format!("missing required attribute '{attribute}'"),
                });
            }
        }

        match rule.content {
            Content::Any => return,
            Content::Text => {
                if let Some(child) = element.child_elements().next() {
                    violations.push(Violation {
                        path: path.to_string(),
                        message: format!("element <{}> not allowed here", child.local_name()),
                    });
                }
                return;
            }
            Content::Elements if element.has_text() => {
                violations.push(Violation {
                    path: path.to_string(),
                    message: "text content not allowed".to_string(),
                });
            }
            Content::Elements | Content::Mixed => {}
        }

        let mut counts: BTreeMap<&str, u32> = BTreeMap::new();
        for child in element.child_elements() {
            let child_path = format!("{path}/{}", child.local_name());
            if child.namespace() != Some(namespace) {
                violations.push(Violation {
                    path: child_path,
                    message: format!("element {} not allowed here", child.qualified_name()),
                });
                continue;
            }
            if !rule.children.contains_key(child.local_name()) {
                violations.push(Violation {
                    path: child_path,
                    message: format!("element <{}> not allowed here", child.local_name()),
                });
                continue;
            }
            *counts.entry(child.local_name()).or_default() += 1;
            self.validate_element(namespace, child, &child_path, violations);
        }

        for (name, occurs) in &rule.children {
            let count = counts.get(name.as_str()).copied().unwrap_or(0);
            if count < occurs.min {
                violations.push(Violation {
                    path: path.to_string(),
                    message: format!(
                        "expected at least {} <{name}>, found {count}",
                        occurs.min
                    ),
                });
            }
            if let Some(max) = occurs.max
                && count > max
            {
                violations.push(Violation {
                    path: path.to_string(),
                    message: format!("expected at most {max} <{name}>, found {count}"),
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::ParsedDocument;

    const NS: &str = "urn:test";

    fn schema() -> Schema {
        Schema::from_json(
            r#"{
                "root": "list",
                "elements": {
                    "list": { "children": { "item": { "min": 0, "max": null } } },
                    "item": {
                        "required_attributes": ["id"],
                        "children": {
                            "name": {},
                            "note": { "min": 0 }
                        }
                    },
                    "name": { "content": "text" },
                    "note": { "content": "any" }
                }
            }"#,
        )
        .unwrap()
    }

    fn validate(xml: &str) -> Result<(), Vec<Violation>> {
        let doc = ParsedDocument::parse(xml).unwrap();
        schema().validate(NS, doc.root())
    }

    #[test]
    fn accepts_conforming_tree() {
        let result = validate(
            r#"<list xmlns="urn:test">
                <item id="1"><name>a</name></item>
                <item id="2"><name>b</name><note><anything/>free text</note></item>
            </list>"#,
        );
        assert_eq!(result, Ok(()));
    }

    #[test]
    fn reports_missing_required_child_with_path() {
        let violations = validate(r#"<list xmlns="urn:test"><item id="1"/></list>"#).unwrap_err();
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].path, "/list/item");
        assert_eq!(violations[0].message, "expected at least 1 <name>, found 0");
    }

    #[test]
    fn reports_every_violation() {
        let violations = validate(
            r#"<list xmlns="urn:test">
                <item><name>a</name><name>b</name></item>
                <unknown/>
            </list>"#,
        )
        .unwrap_err();

        let messages: Vec<_> = violations.iter().map(ToString::to_string).collect();
        assert!(messages.contains(&"/list/item: missing required attribute 'id'".to_string()));
        assert!(messages.contains(&"/list/item: expected at most 1 <name>, found 2".to_string()));
        assert!(messages.contains(&"/list/unknown: element <unknown> not allowed here".to_string()));
    }

    #[test]
    fn rejects_text_where_elements_are_expected() {
        let violations = validate(r#"<list xmlns="urn:test">loose text</list>"#).unwrap_err();
        assert_eq!(violations[0].message, "text content not allowed");
    }

    #[test]
    fn rejects_elements_inside_text_content() {
        let violations =
            validate(r#"<list xmlns="urn:test"><item id="1"><name><b/></name></item></list>"#)
                .unwrap_err();
        assert_eq!(violations[0].path, "/list/item/name");
    }

    #[test]
    fn rejects_foreign_namespace_children() {
        let violations =
            validate(r#"<list xmlns="urn:test"><item xmlns="urn:other" id="1"/></list>"#)
                .unwrap_err();
        assert_eq!(
            violations[0].message,
            "element urn:other:item not allowed here"
        );
    }

    #[test]
    fn schema_without_root_rule_is_rejected() {
        let result = Schema::from_json(r#"{ "root": "list", "elements": {} }"#);
        assert!(matches!(result, Err(SchemaError::MissingRootRule(_))));
    }

    #[test]
    fn occurs_defaults_follow_xsd() {
        let occurs: Occurs = serde_json::from_str("{}").unwrap();
        assert_eq!(occurs, Occurs { min: 1, max: Some(1) });

        let occurs: Occurs = serde_json::from_str(r#"{ "max": null }"#).unwrap();
        assert_eq!(occurs.max, None);
    }
}
