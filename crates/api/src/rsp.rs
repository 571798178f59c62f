//! `rsp` response documents returned by every entry endpoint.
//!
//! ```xml
//! <?xml version="1.0" encoding="UTF-8"?>
//! <rsp level="INFO" version="0.1"><code>ItemCreated</code><link>...</link></rsp>
//! ```

use std::fmt;
use std::str::FromStr;

use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use quick_xml::events::attributes::AttrError;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use thiserror::Error;

/// Version attribute written on every response.
pub const RSP_VERSION: &str = "0.1";

/// Errors raised while writing or reading an `rsp` document.
#[derive(Debug, Error)]
pub enum RspError {
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("Attribute error: {0}")]
    Attribute(#[from] AttrError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Response is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    #[error("Unknown rsp level: {0}")]
    UnknownLevel(String),

    #[error("Response has no code")]
    MissingCode,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RspLevel {
    Info,
    Error,
}

impl RspLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RspLevel::Info => "INFO",
            RspLevel::Error => "ERROR",
        }
    }
}

impl FromStr for RspLevel {
    type Err = RspError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "INFO" => Ok(RspLevel::Info),
            "ERROR" => Ok(RspLevel::Error),
            other => Err(RspError::UnknownLevel(other.to_string())),
        }
    }
}

impl fmt::Display for RspLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A response document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rsp {
    pub level: RspLevel,
    pub code: String,
    pub link: Option<String>,
    pub message: Option<String>,
}

impl Rsp {
    /// Successful outcome pointing at the affected resource.
    pub fn info(code: impl Into<String>, link: impl Into<String>) -> Self {
        Self {
            level: RspLevel::Info,
            code: code.into(),
            link: Some(link.into()),
            message: None,
        }
    }

    pub fn error(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            level: RspLevel::Error,
            code: code.into(),
            link: None,
            message: Some(message.into()),
        }
    }

    pub fn is_error(&self) -> bool {
        self.level == RspLevel::Error
    }

    pub fn to_xml(&self) -> Result<String, RspError> {
        let mut writer = Writer::new(Vec::new());

        writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
        writer.write_event(Event::Start(
            BytesStart::new("rsp")
                .with_attributes([("level", self.level.as_str()), ("version", RSP_VERSION)]),
        ))?;
        write_element(&mut writer, "code", &self.code)?;
        if let Some(link) = &self.link {
            write_element(&mut writer, "link", link)?;
        }
        if let Some(message) = &self.message {
            write_element(&mut writer, "message", message)?;
        }
        writer.write_event(Event::End(BytesEnd::new("rsp")))?;

        Ok(String::from_utf8(writer.into_inner())?)
    }

    pub fn from_xml(xml: &str) -> Result<Self, RspError> {
        let mut reader = Reader::from_str(xml);
        let mut level = RspLevel::Info;
        let mut code: Option<String> = None;
        let mut link: Option<String> = None;
        let mut message: Option<String> = None;
        let mut current = None;

        loop {
            match reader.read_event()? {
                Event::Start(start) => {
                    current = match start.name().as_ref() {
                        b"rsp" => {
                            for attribute in start.attributes() {
                                let attribute = attribute?;
                                if attribute.key.as_ref() == b"level" {
                                    level = attribute.unescape_value()?.parse()?;
                                }
                            }
                            None
                        }
                        b"code" => Some(Field::Code),
                        b"link" => Some(Field::Link),
                        b"message" => Some(Field::Message),
                        _ => None,
                    };
                }
                Event::Text(text) => {
                    let target = match current {
                        Some(Field::Code) => &mut code,
                        Some(Field::Link) => &mut link,
                        Some(Field::Message) => &mut message,
                        None => continue,
                    };
                    target
                        .get_or_insert_with(String::new)
                        .push_str(&text.unescape()?);
                }
                Event::End(_) => current = None,
                Event::Eof => break,
                _ => {}
            }
        }

        Ok(Self {
            level,
            code: code.ok_or(RspError::MissingCode)?,
            link,
            message,
        })
    }

    /// Renders the document with an explicit status.
    pub fn into_response_with(self, status: StatusCode) -> Response {
        match self.to_xml() {
            Ok(xml) => (status, [(header::CONTENT_TYPE, "application/xml")], xml).into_response(),
            Err(error) => {
                tracing::error!(%error, code = %self.code, "failed to render rsp");
                StatusCode::INTERNAL_SERVER_ERROR.into_response()
            }
        }
    }
}

#[derive(Clone, Copy)]
enum Field {
    Code,
    Link,
    Message,
}

fn write_element(writer: &mut Writer<Vec<u8>>, name: &str, text: &str) -> Result<(), RspError> {
    writer.write_event(Event::Start(BytesStart::new(name)))?;
    writer.write_event(Event::Text(BytesText::new(text)))?;
    writer.write_event(Event::End(BytesEnd::new(name)))?;
    Ok(())
}

/// INFO documents are `200 OK`, ERROR documents `400 Bad Request`.
impl IntoResponse for Rsp {
    fn into_response(self) -> Response {
        let status = if self.is_error() {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::OK
        };
        self.into_response_with(status)
    }
}
