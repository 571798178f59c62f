//! Raw submissions and their parse tree.

use std::borrow::Cow;

use quick_xml::events::{BytesStart, Event};
use quick_xml::name::ResolveResult;
use quick_xml::reader::NsReader;
use thiserror::Error;

use crate::error::GuardError;

/// Default upper bound for a submitted document.
pub const DEFAULT_MAX_DOCUMENT_BYTES: usize = 10 * 1024 * 1024;

/// Returned when a submission exceeds the configured size limit.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Document of {size} bytes exceeds the maximum of {limit} bytes")]
pub struct DocumentTooLarge {
    pub size: usize,
    pub limit: usize,
}

/// Submitted document text, already checked against a size limit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawDocument {
    text: String,
}

impl RawDocument {
    /// Wraps `text`, rejecting it when it is longer than `max_bytes`.
    pub fn new(text: impl Into<String>, max_bytes: usize) -> Result<Self, DocumentTooLarge> {
        let text = text.into();
        if text.len() > max_bytes {
            return Err(DocumentTooLarge {
                size: text.len(),
                limit: max_bytes,
            });
        }
        Ok(Self { text })
    }

    /// Returns the document text.
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Returns the size of the document in bytes.
    pub fn len(&self) -> usize {
        self.text.len()
    }

    /// Returns true if the document is empty.
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// A node of the parse tree.
///
/// Comments and processing instructions are not kept. Adjacent text and
/// CDATA runs form one text node, which is dropped when it is blank and
/// the element holds no other text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    Text(String),
}

/// An element with its resolved namespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    namespace: Option<String>,
    local_name: String,
    attributes: Vec<(String, String)>,
    children: Vec<Node>,
}

impl Element {
    fn open(resolved: ResolveResult<'_>, start: &BytesStart<'_>) -> Result<Self, GuardError> {
        let namespace = match resolved {
            ResolveResult::Bound(namespace) => {
                Some(String::from_utf8_lossy(namespace.into_inner()).into_owned())
            }
            ResolveResult::Unbound => None,
            ResolveResult::Unknown(prefix) => {
                return Err(GuardError::malformed(format!(
                    "unbound namespace prefix '{}'",
                    String::from_utf8_lossy(&prefix)
                )));
            }
        };
        let local_name = String::from_utf8_lossy(start.local_name().as_ref()).into_owned();

        let mut attributes = Vec::new();
        for attribute in start.attributes() {
            let attribute = attribute.map_err(GuardError::malformed)?;
            if attribute.key.as_namespace_binding().is_some() {
                continue;
            }
            let name = String::from_utf8_lossy(attribute.key.local_name().as_ref()).into_owned();
            let value = attribute
                .unescape_value()
                .map_err(GuardError::malformed)?
                .into_owned();
            attributes.push((name, value));
        }

        Ok(Self {
            namespace,
            local_name,
            attributes,
            children: Vec::new(),
        })
    }

    /// Returns the namespace URI, if the element is in one.
    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    /// Returns the local (unprefixed) name.
    pub fn local_name(&self) -> &str {
        &self.local_name
    }

    /// Returns `namespace:local-name`, the form used in diagnostics.
    pub fn qualified_name(&self) -> String {
        format!("{}:{}", self.namespace().unwrap_or_default(), self.local_name)
    }

    /// Returns true if the element has the given namespace and local name.
    pub fn is(&self, namespace: &str, local_name: &str) -> bool {
        self.namespace() == Some(namespace) && self.local_name == local_name
    }

    /// Looks up an attribute by local name.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Returns all attributes in document order.
    pub fn attributes(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attributes
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str()))
    }

    /// Returns the child nodes.
    pub fn children(&self) -> &[Node] {
        &self.children
    }

    /// Returns the child elements, skipping text.
    pub fn child_elements(&self) -> impl DoubleEndedIterator<Item = &Element> {
        self.children.iter().filter_map(|node| match node {
            Node::Element(element) => Some(element),
            Node::Text(_) => None,
        })
    }

    /// Returns true if the element has text of its own (not counting descendants).
    pub fn has_text(&self) -> bool {
        self.children
            .iter()
            .any(|node| matches!(node, Node::Text(_)))
    }

    /// Concatenated text of the element and all its descendants.
    pub fn text_content(&self) -> String {
        let mut text = String::new();
        self.collect_text(&mut text);
        text
    }

    fn collect_text(&self, out: &mut String) {
        for node in &self.children {
            match node {
                Node::Text(text) => out.push_str(text),
                Node::Element(element) => element.collect_text(out),
            }
        }
    }

    /// Removes indentation-only text, keeping whitespace that sits inside
    /// real text.
    fn drop_blank_text(&mut self) {
        let blank = self.children.iter().all(|node| match node {
            Node::Text(text) => text.trim().is_empty(),
            Node::Element(_) => true,
        });
        if blank {
            self.children
                .retain(|node| matches!(node, Node::Element(_)));
        }
    }

    /// Iterates over all descendant elements in document order.
    pub fn descendants(&self) -> Descendants<'_> {
        Descendants {
            stack: self.child_elements().rev().collect(),
        }
    }
}

/// Depth-first iterator over descendant elements.
pub struct Descendants<'a> {
    stack: Vec<&'a Element>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a Element;

    fn next(&mut self) -> Option<Self::Item> {
        let element = self.stack.pop()?;
        self.stack.extend(element.child_elements().rev());
        Some(element)
    }
}

/// Parse tree of a submitted document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedDocument {
    root: Element,
}

impl ParsedDocument {
    /// Parses `text` into a tree.
    ///
    /// Fails with [`GuardError::MalformedDocument`] on anything that is not a
    /// single well-formed element tree.
    pub fn parse(text: &str) -> Result<Self, GuardError> {
        let mut reader = NsReader::from_str(text);
        let mut open: Vec<Element> = Vec::new();
        let mut root: Option<Element> = None;

        loop {
            let (resolved, event) = reader.read_resolved_event().map_err(GuardError::malformed)?;
            match event {
                Event::Start(start) => {
                    if open.is_empty() && root.is_some() {
                        return Err(GuardError::malformed("more than one root element"));
                    }
                    open.push(Element::open(resolved, &start)?);
                }
                Event::Empty(start) => {
                    let element = Element::open(resolved, &start)?;
                    close(&mut open, &mut root, element)?;
                }
                Event::End(_) => {
                    let element = open
                        .pop()
                        .ok_or_else(|| GuardError::malformed("unexpected closing tag"))?;
                    close(&mut open, &mut root, element)?;
                }
                Event::Text(text) => {
                    let text = text.unescape().map_err(GuardError::malformed)?;
                    append_text(&mut open, text)?;
                }
                Event::CData(data) => {
                    let bytes = data.into_inner();
                    append_text(&mut open, String::from_utf8_lossy(&bytes))?;
                }
                Event::Eof => break,
                // declarations, comments, processing instructions, doctype
                _ => {}
            }
        }

        if let Some(unclosed) = open.last() {
            return Err(GuardError::malformed(format!(
                "unexpected end of document, <{}> is not closed",
                unclosed.local_name()
            )));
        }

        root.map(|root| Self { root })
            .ok_or_else(|| GuardError::malformed("document has no root element"))
    }

    /// Returns the root element.
    pub fn root(&self) -> &Element {
        &self.root
    }

    /// Returns the namespace URI declared on the root element.
    pub fn namespace_uri(&self) -> Option<&str> {
        self.root.namespace()
    }

    /// Returns the root element's local name.
    pub fn root_local_name(&self) -> &str {
        self.root.local_name()
    }
}

fn close(
    open: &mut [Element],
    root: &mut Option<Element>,
    mut element: Element,
) -> Result<(), GuardError> {
    element.drop_blank_text();
    match open.last_mut() {
        Some(parent) => parent.children.push(Node::Element(element)),
        None if root.is_some() => {
            return Err(GuardError::malformed("more than one root element"));
        }
        None => *root = Some(element),
    }
    Ok(())
}

fn append_text(open: &mut [Element], text: Cow<'_, str>) -> Result<(), GuardError> {
    let Some(parent) = open.last_mut() else {
        if text.trim().is_empty() {
            return Ok(());
        }
        return Err(GuardError::malformed("text outside of the root element"));
    };
    match parent.children.last_mut() {
        Some(Node::Text(existing)) => existing.push_str(&text),
        _ => parent.children.push(Node::Text(text.into_owned())),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const NS: &str = "http://www.cultuurdatabank.com/XMLSchema/CdbXSD/3.3/FINAL";

    #[test]
    fn raw_document_enforces_size_limit() {
        assert!(RawDocument::new("<a/>", 4).is_ok());

        let err = RawDocument::new("<ab/>", 4).unwrap_err();
        assert_eq!(err, DocumentTooLarge { size: 5, limit: 4 });
    }

    #[test]
    fn parses_namespaces_and_attributes() {
        let doc = ParsedDocument::parse(&format!(
            r#"<?xml version="1.0"?><cdb:cdbxml xmlns:cdb="{NS}"><cdb:event cdbid="abc" private="false"/></cdb:cdbxml>"#
        ))
        .unwrap();

        assert_eq!(doc.namespace_uri(), Some(NS));
        assert_eq!(doc.root_local_name(), "cdbxml");

        let event = doc.root().child_elements().next().unwrap();
        assert!(event.is(NS, "event"));
        assert_eq!(event.attribute("cdbid"), Some("abc"));
        assert_eq!(event.attributes().count(), 2);
        assert_eq!(event.qualified_name(), format!("{NS}:event"));
    }

    #[test]
    fn default_namespace_applies_to_children() {
        let doc = ParsedDocument::parse(&format!(
            r#"<cdbxml xmlns="{NS}"><event><title>x</title></event></cdbxml>"#
        ))
        .unwrap();

        let title = doc.root().descendants().find(|e| e.local_name() == "title");
        assert_eq!(title.unwrap().namespace(), Some(NS));
    }

    #[test]
    fn whitespace_and_comments_are_not_nodes() {
        let doc = ParsedDocument::parse(
            "<root>\n  <!-- a comment -->\n  <?pi data?>\n  <child/>\n</root>",
        )
        .unwrap();

        assert_eq!(doc.root().children().len(), 1);
        assert!(!doc.root().has_text());
    }

    #[test]
    fn text_content_includes_entities_and_cdata() {
        let doc = ParsedDocument::parse(
            "<root><a>Tom &amp; Jerry</a><b><![CDATA[<script>]]></b></root>",
        )
        .unwrap();

        assert_eq!(doc.root().text_content(), "Tom & Jerry<script>");
    }

    #[test]
    fn whitespace_between_cdata_sections_is_kept() {
        let doc = ParsedDocument::parse(
            "<root>\n  <longdescription><![CDATA[<script]]> <![CDATA[>]]></longdescription>\n</root>",
        )
        .unwrap();

        let description = doc.root().child_elements().next().unwrap();
        assert_eq!(description.text_content(), "<script >");
        assert!(!doc.root().has_text());
    }

    #[test]
    fn mixed_content_keeps_its_spacing() {
        let doc = ParsedDocument::parse("<p>Jazz <b>in</b> de stad</p>").unwrap();

        assert_eq!(doc.root().text_content(), "Jazz in de stad");
    }

    #[test]
    fn blank_text_only_element_has_no_text() {
        let doc = ParsedDocument::parse("<root><title>   </title></root>").unwrap();

        let title = doc.root().child_elements().next().unwrap();
        assert!(!title.has_text());
        assert!(title.children().is_empty());
    }

    #[test]
    fn descendants_are_in_document_order() {
        let doc = ParsedDocument::parse("<r><a><b/><c/></a><d/></r>").unwrap();
        let names: Vec<_> = doc.root().descendants().map(|e| e.local_name()).collect();
        assert_eq!(names, vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn rejects_malformed_input() {
        for input in [
            "",
            "not xml at all",
            "<root>",
            "<root></other>",
            "<a/><b/>",
            "<x:root/>",
        ] {
            let result = ParsedDocument::parse(input);
            assert!(
                matches!(result, Err(GuardError::MalformedDocument { .. })),
                "expected {input:?} to be malformed, got {result:?}"
            );
        }
    }
}
