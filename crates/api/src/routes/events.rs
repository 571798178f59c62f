//! Entry API endpoints for cultural events.

use std::sync::Arc;

use axum::body::Body;
use axum::extract::rejection::{FormRejection, QueryRejection};
use axum::extract::{Form, Path, Query, State};
use axum::http::{HeaderMap, header};
use cdbxml::RawDocument;
use common::AggregateId;
use domain::{
    AddCollaborationLink, ApplyTranslation, CollaborationData, CreateEventFromDocument,
    DeleteLabel, DeleteTranslation, Event, EventCommandHandler, EventSourcedRepository, Label,
    LabelCollection, Language, LinkType, MergeLabels, UpdateEventFromDocument,
};
use event_store::EventStore;
use serde::Deserialize;

use crate::error::ApiError;
use crate::rsp::Rsp;

/// Shared application state accessible from all handlers.
pub struct AppState<S: EventStore> {
    pub handler: EventCommandHandler<EventSourcedRepository<S, Event>>,
    pub link_base_url: String,
    pub max_document_bytes: usize,
}

impl<S: EventStore> AppState<S> {
    fn info(&self, event_id: &AggregateId, code: &str) -> Rsp {
        Rsp::info(code, format!("{}{}", self.link_base_url, event_id))
    }

    async fn read_document(&self, headers: &HeaderMap, body: Body) -> Result<RawDocument, ApiError> {
        require_xml(headers)?;
        let limit = self.max_document_bytes;
        let bytes = axum::body::to_bytes(body, limit)
            .await
            .map_err(|_| ApiError::BodyTooLarge { limit })?;
        let text = String::from_utf8(bytes.to_vec()).map_err(|_| ApiError::InvalidEncoding)?;
        Ok(RawDocument::new(text, limit)?)
    }
}

// -- Request types --

#[derive(Debug, Deserialize)]
pub struct KeywordsForm {
    pub keywords: Option<String>,
    pub visibles: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct KeywordQuery {
    pub keyword: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TranslationForm {
    pub lang: Option<String>,
    pub title: Option<String>,
    pub shortdescription: Option<String>,
    pub longdescription: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LanguageQuery {
    pub lang: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LinkForm {
    pub lang: Option<String>,
    pub link: Option<String>,
    pub linktype: Option<String>,
    pub title: Option<String>,
    pub copyright: Option<String>,
    pub subbrand: Option<String>,
    pub description: Option<String>,
}

// -- Handlers --

/// POST /event: create an event from a CdbXML document under a new id.
#[tracing::instrument(skip(state, headers, body))]
pub async fn create<S: EventStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    headers: HeaderMap,
    body: Body,
) -> Result<Rsp, ApiError> {
    let document = state.read_document(&headers, body).await?;
    let event_id = AggregateId::new();

    state
        .handler
        .handle(CreateEventFromDocument::new(event_id.clone(), document).into())
        .await?;

    Ok(state.info(&event_id, "ItemCreated"))
}

/// PUT /event/{cdbid}: replace an event's document.
#[tracing::instrument(skip(state, headers, body))]
pub async fn update<S: EventStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(cdbid): Path<String>,
    headers: HeaderMap,
    body: Body,
) -> Result<Rsp, ApiError> {
    let document = state.read_document(&headers, body).await?;
    let event_id = AggregateId::from(cdbid);

    state
        .handler
        .handle(UpdateEventFromDocument::new(event_id.clone(), document).into())
        .await?;

    Ok(state.info(&event_id, "ItemModified"))
}

/// POST /event/{cdbid}/keywords: add `;`-separated keywords.
#[tracing::instrument(skip(state, form))]
pub async fn add_keywords<S: EventStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(cdbid): Path<String>,
    form: Result<Form<KeywordsForm>, FormRejection>,
) -> Result<Rsp, ApiError> {
    let Form(form) = form.map_err(form_rejection)?;
    let keywords = required(form.keywords, "Keywords are required.")?;
    let labels = parse_labels(&keywords, form.visibles.as_deref())?;
    let event_id = AggregateId::from(cdbid);

    state
        .handler
        .handle(MergeLabels::new(event_id.clone(), labels).into())
        .await?;

    Ok(state.info(&event_id, "KeywordsCreated"))
}

/// DELETE /event/{cdbid}/keywords?keyword=: remove one keyword.
#[tracing::instrument(skip(state, query))]
pub async fn delete_keyword<S: EventStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(cdbid): Path<String>,
    query: Result<Query<KeywordQuery>, QueryRejection>,
) -> Result<Rsp, ApiError> {
    let Query(query) = query.map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;
    let keyword = required(query.keyword, "Keyword is required.")?;
    let label = Label::visible(keyword)?;
    let event_id = AggregateId::from(cdbid);

    state
        .handler
        .handle(DeleteLabel::new(event_id.clone(), label).into())
        .await?;

    Ok(state.info(&event_id, "KeywordWithdrawn"))
}

/// POST /event/{cdbid}/translations: add or change a translation.
#[tracing::instrument(skip(state, form))]
pub async fn translate<S: EventStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(cdbid): Path<String>,
    form: Result<Form<TranslationForm>, FormRejection>,
) -> Result<Rsp, ApiError> {
    let Form(form) = form.map_err(form_rejection)?;
    let language = language(form.lang)?;
    let event_id = AggregateId::from(cdbid);

    let command = ApplyTranslation {
        event_id: event_id.clone(),
        language,
        title: form.title,
        short_description: form.shortdescription,
        long_description: form.longdescription,
    };
    state.handler.handle(command.into()).await?;

    Ok(state.info(&event_id, "TranslationCreated"))
}

/// DELETE /event/{cdbid}/translations?lang=: remove a translation.
#[tracing::instrument(skip(state, query))]
pub async fn delete_translation<S: EventStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(cdbid): Path<String>,
    query: Result<Query<LanguageQuery>, QueryRejection>,
) -> Result<Rsp, ApiError> {
    let Query(query) = query.map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;
    let language = language(query.lang)?;
    let event_id = AggregateId::from(cdbid);

    state
        .handler
        .handle(DeleteTranslation::new(event_id.clone(), language).into())
        .await?;

    Ok(state.info(&event_id, "TranslationWithdrawn"))
}

/// POST /event/{cdbid}/links: attach a collaboration link.
#[tracing::instrument(skip(state, form))]
pub async fn add_link<S: EventStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(cdbid): Path<String>,
    form: Result<Form<LinkForm>, FormRejection>,
) -> Result<Rsp, ApiError> {
    let Form(form) = form.map_err(form_rejection)?;
    let language = language(form.lang)?;
    let link = required(form.link, "Link is required.")?.to_lowercase();
    let link_type: LinkType = required(form.linktype, "Link type is required.")?
        .to_lowercase()
        .parse()?;
    let event_id = AggregateId::from(cdbid);

    let data = CollaborationData {
        link,
        link_type,
        title: form.title,
        copyright: form.copyright,
        subbrand: form.subbrand,
        description: form.description,
    };
    state
        .handler
        .handle(AddCollaborationLink::new(event_id.clone(), language, data).into())
        .await?;

    Ok(state.info(&event_id, "LinkCreated"))
}

// -- Request parsing --

/// Accepts the media types a client may use for an XML body, with or
/// without parameters such as `charset`.
fn require_xml(headers: &HeaderMap) -> Result<(), ApiError> {
    let media_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(';').next())
        .map(|value| value.trim().to_ascii_lowercase());

    match media_type.as_deref() {
        Some("application/xml" | "text/xml" | "application/x-xml") => Ok(()),
        _ => Err(ApiError::BadRequest("Content-Type is not XML.".to_string())),
    }
}

fn form_rejection(rejection: FormRejection) -> ApiError {
    match rejection {
        FormRejection::InvalidFormContentType(_) => {
            ApiError::BadRequest("Content-Type is not x-www-form-urlencoded.".to_string())
        }
        other => ApiError::BadRequest(other.body_text()),
    }
}

fn required(value: Option<String>, message: &str) -> Result<String, ApiError> {
    value.ok_or_else(|| ApiError::BadRequest(message.to_string()))
}

fn language(lang: Option<String>) -> Result<Language, ApiError> {
    let lang = required(lang, "Language code is required.")?;
    Ok(Language::new(lang.to_lowercase())?)
}

/// Pairs `;`-separated keywords with their `;`-separated visibility flags.
///
/// Without flags every keyword is visible.
fn parse_labels(keywords: &str, visibles: Option<&str>) -> Result<LabelCollection, ApiError> {
    let names: Vec<&str> = keywords.split(';').collect();

    let visibles: Vec<bool> = match visibles {
        Some(visibles) => {
            let values: Vec<&str> = visibles.split(';').collect();
            if values.len() != names.len() {
                return Err(ApiError::UnequalAmountOfValues {
                    first: "keywords",
                    second: "visibles",
                });
            }
            values
                .into_iter()
                .map(parse_visible)
                .collect::<Result<_, _>>()?
        }
        None => vec![true; names.len()],
    };

    let labels = names
        .into_iter()
        .zip(visibles)
        .map(|(name, visible)| Label::new(name, visible))
        .collect::<Result<LabelCollection, _>>()?;
    Ok(labels)
}

fn parse_visible(value: &str) -> Result<bool, ApiError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" => Ok(true),
        "false" => Ok(false),
        other => Err(ApiError::BadRequest(format!(
            "Invalid visibility \"{other}\", expected true or false."
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::EventError;

    #[test]
    fn keywords_default_to_visible() {
        let labels = parse_labels("jazz;blues", None).unwrap();
        let parsed: Vec<_> = labels
            .iter()
            .map(|label| (label.name(), label.is_visible()))
            .collect();
        assert_eq!(parsed, vec![("jazz", true), ("blues", true)]);
    }

    #[test]
    fn keywords_pair_with_visibles() {
        let labels = parse_labels("jazz;blues", Some("true;FALSE")).unwrap();
        let parsed: Vec<_> = labels
            .iter()
            .map(|label| (label.name(), label.is_visible()))
            .collect();
        assert_eq!(parsed, vec![("jazz", true), ("blues", false)]);
    }

    #[test]
    fn unequal_amounts_are_rejected() {
        let error = parse_labels("jazz;blues", Some("true")).unwrap_err();
        assert!(matches!(
            error,
            ApiError::UnequalAmountOfValues {
                first: "keywords",
                second: "visibles"
            }
        ));
    }

    #[test]
    fn blank_keywords_are_rejected() {
        let error = parse_labels("jazz;;blues", None).unwrap_err();
        assert!(matches!(error, ApiError::InvalidValue(EventError::BlankLabel)));
    }

    #[test]
    fn invalid_visibility_is_rejected() {
        assert!(matches!(
            parse_labels("jazz", Some("yes")),
            Err(ApiError::BadRequest(_))
        ));
    }

    fn with_content_type(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::CONTENT_TYPE, value.parse().unwrap());
        headers
    }

    #[test]
    fn xml_media_types_are_accepted() {
        for value in ["application/xml", "text/xml; charset=UTF-8", "Application/XML"] {
            assert!(require_xml(&with_content_type(value)).is_ok(), "{value}");
        }
    }

    #[test]
    fn other_media_types_are_rejected() {
        for headers in [
            with_content_type("application/json"),
            with_content_type("application/xhtml+xml"),
            HeaderMap::new(),
        ] {
            assert!(matches!(
                require_xml(&headers),
                Err(ApiError::BadRequest(message)) if message == "Content-Type is not XML."
            ));
        }
    }

    #[test]
    fn language_is_lowercased_before_validation() {
        assert_eq!(language(Some("NL".to_string())).unwrap().code(), "nl");
        assert!(matches!(
            language(Some("dutch".to_string())),
            Err(ApiError::InvalidValue(EventError::InvalidLanguage(_)))
        ));
        assert!(matches!(language(None), Err(ApiError::BadRequest(_))));
    }
}
