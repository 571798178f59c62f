//! End-to-end checks of the document guard against realistic CdbXML 3.3
//! submissions.

use std::sync::Arc;

use cdbxml::{
    CDBXML_3_3_NAMESPACE, DEFAULT_MAX_DOCUMENT_BYTES, DocumentGuard, GuardError,
    NamespaceRegistry, RawDocument,
};

const VALID: &str = include_str!("fixtures/Valid.xml");
const VALID_WITH_CDBID: &str = include_str!("fixtures/ValidWithCdbid.xml");
const INVALID_NAMESPACE: &str = include_str!("fixtures/InvalidNamespace.xml");
const INVALID_ROOT_ELEMENT: &str = include_str!("fixtures/InvalidRootElement.xml");
const INVALID_SCHEMA_TITLE_MISSING: &str = include_str!("fixtures/InvalidSchemaTitleMissing.xml");
const TOO_MANY_EVENTS: &str = include_str!("fixtures/TooManyEvents.xml");
const NO_EVENT_AT_ALL: &str = include_str!("fixtures/NoEventAtAll.xml");
const NO_EVENT_BUT_ACTOR: &str = include_str!("fixtures/NoEventButActor.xml");
const EMPTY: &str = include_str!("fixtures/Empty.xml");
const SCRIPT_TAG: &str = include_str!("fixtures/ScriptTag.xml");
const SCRIPT_TAG_UPPERCASE: &str = include_str!("fixtures/ScriptTagUppercase.xml");
const MALFORMED: &str = include_str!("fixtures/Malformed.xml");

fn guard() -> DocumentGuard {
    DocumentGuard::new(Arc::new(NamespaceRegistry::cdbxml_3_3().unwrap()))
}

fn validate(xml: &str) -> Result<cdbxml::ValidatedDocument, GuardError> {
    let raw = RawDocument::new(xml, DEFAULT_MAX_DOCUMENT_BYTES).unwrap();
    guard().validate(&raw)
}

fn event_not_found(found: Option<&str>) -> GuardError {
    GuardError::ElementNotFound {
        expected: format!("{CDBXML_3_3_NAMESPACE}:event"),
        found: found.map(str::to_string),
    }
}

#[test]
fn accepts_valid_document() {
    let validated = validate(VALID).unwrap();

    assert_eq!(validated.namespace_uri(), CDBXML_3_3_NAMESPACE);
    let event = validated.event_element().unwrap();
    assert!(event.is(CDBXML_3_3_NAMESPACE, "event"));
}

#[test]
fn accepts_valid_document_carrying_cdbid() {
    let validated = validate(VALID_WITH_CDBID).unwrap();
    assert_eq!(
        validated.event_element().unwrap().attribute("cdbid"),
        Some("004aea08-e13d-48c9-b9eb-a18f20e6d44e")
    );
}

#[test]
fn accepts_prefixed_namespace_declaration() {
    let prefixed = VALID
        .replace("<cdbxml xmlns=", "<cdb:cdbxml xmlns:cdb=")
        .replace("</cdbxml>", "</cdb:cdbxml>")
        .replace("<", "<cdb:")
        .replace("<cdb:/", "</cdb:")
        .replace("<cdb:?", "<?")
        .replace("<cdb:cdb:", "<cdb:")
        .replace("</cdb:cdb:", "</cdb:");

    let validated = validate(&prefixed).unwrap();
    assert_eq!(validated.namespace_uri(), CDBXML_3_3_NAMESPACE);
}

#[test]
fn rejects_unregistered_namespace() {
    let error = validate(INVALID_NAMESPACE).unwrap_err();
    assert_eq!(
        error,
        GuardError::UnexpectedNamespace {
            received: "http://www.cultuurdatabank.com/XMLSchema/CdbXSD/3.2/FINAL".to_string(),
            accepted: vec![CDBXML_3_3_NAMESPACE.to_string()],
        }
    );
}

#[test]
fn namespace_is_checked_before_root_element() {
    let error = validate(r#"<foo xmlns="urn:unknown"><event/></foo>"#).unwrap_err();
    assert!(matches!(error, GuardError::UnexpectedNamespace { .. }));
}

#[test]
fn rejects_wrong_root_element() {
    let error = validate(INVALID_ROOT_ELEMENT).unwrap_err();
    assert_eq!(
        error,
        GuardError::UnexpectedRootElement {
            expected: "cdbxml".to_string(),
            actual: "foo".to_string(),
        }
    );
}

#[test]
fn rejects_schema_violation() {
    let error = validate(INVALID_SCHEMA_TITLE_MISSING).unwrap_err();
    match error {
        GuardError::SchemaValidationFailure {
            namespace,
            violations,
        } => {
            assert_eq!(namespace, CDBXML_3_3_NAMESPACE);
            assert_eq!(
                violations,
                vec!["/cdbxml/event/eventdetails/eventdetail: expected at least 1 <title>, found 0"]
            );
        }
        other => panic!("expected schema failure, got {other:?}"),
    }
}

#[test]
fn schema_is_checked_before_event_location() {
    let xml = format!(r#"<cdbxml xmlns="{CDBXML_3_3_NAMESPACE}"><unknown/></cdbxml>"#);
    let error = validate(&xml).unwrap_err();
    assert!(matches!(error, GuardError::SchemaValidationFailure { .. }));
}

#[test]
fn rejects_document_without_children() {
    assert_eq!(validate(NO_EVENT_AT_ALL).unwrap_err(), event_not_found(None));
    assert_eq!(validate(EMPTY).unwrap_err(), event_not_found(None));
}

#[test]
fn rejects_document_without_event() {
    let error = validate(NO_EVENT_BUT_ACTOR).unwrap_err();
    assert_eq!(
        error,
        event_not_found(Some(&format!("{CDBXML_3_3_NAMESPACE}:actor")))
    );
    assert_eq!(
        error.to_string(),
        format!(
            "Element {CDBXML_3_3_NAMESPACE}:event not found, found {CDBXML_3_3_NAMESPACE}:actor instead"
        )
    );
}

#[test]
fn rejects_more_than_one_event() {
    let error = validate(TOO_MANY_EVENTS).unwrap_err();
    assert_eq!(error, GuardError::TooManyItems);
    assert_eq!(error.to_string(), "Too many items in your messages.");
}

#[test]
fn rejects_script_tag_in_long_description() {
    let error = validate(SCRIPT_TAG).unwrap_err();
    assert_eq!(
        error,
        GuardError::SuspiciousContent {
            element: "longdescription".to_string()
        }
    );
}

#[test]
fn script_tag_detection_ignores_case() {
    let error = validate(SCRIPT_TAG_UPPERCASE).unwrap_err();
    assert!(matches!(error, GuardError::SuspiciousContent { .. }));
}

#[test]
fn spaced_script_tag_across_cdata_sections_is_accepted() {
    let xml = VALID.replace(
        "Een avond vol jazz in het centrum van Leuven.",
        "<![CDATA[<script]]> <![CDATA[>]]>",
    );
    assert!(validate(&xml).is_ok());
}

#[test]
fn script_tag_split_across_cdata_sections_is_rejected() {
    let xml = VALID.replace(
        "Een avond vol jazz in het centrum van Leuven.",
        "<![CDATA[<scr]]><![CDATA[ipt>]]>",
    );
    assert!(matches!(
        validate(&xml),
        Err(GuardError::SuspiciousContent { .. })
    ));
}

#[test]
fn rejects_malformed_xml() {
    let error = validate(MALFORMED).unwrap_err();
    assert!(matches!(error, GuardError::MalformedDocument { .. }));
    assert_eq!(error.kind(), "MalformedDocument");
}

#[test]
fn size_limit_applies_before_parsing() {
    let error = RawDocument::new(VALID, VALID.len() - 1).unwrap_err();
    assert_eq!(error.size, VALID.len());
    assert_eq!(error.limit, VALID.len() - 1);
    assert!(RawDocument::new(VALID, VALID.len()).is_ok());
}

#[test]
fn validation_is_deterministic() {
    let guard = guard();
    for xml in [VALID, INVALID_NAMESPACE, TOO_MANY_EVENTS, SCRIPT_TAG, MALFORMED] {
        let raw = RawDocument::new(xml, DEFAULT_MAX_DOCUMENT_BYTES).unwrap();
        let first = guard.validate(&raw).map(|v| v.namespace_uri().to_string());
        let second = guard.validate(&raw).map(|v| v.namespace_uri().to_string());
        assert_eq!(first, second);
    }
}
