//! API error types with `rsp` response mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use cdbxml::{DocumentTooLarge, GuardError};
use domain::{DomainError, EventError};
use thiserror::Error;

use crate::rsp::Rsp;

/// API-level error type that maps to `rsp` error documents.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The submitted document exceeds the configured size.
    #[error(transparent)]
    DocumentTooLarge(#[from] DocumentTooLarge),

    /// The request body could not be read within the size limit.
    #[error("Request body exceeds the maximum of {limit} bytes")]
    BodyTooLarge { limit: usize },

    /// The submitted document is not UTF-8 text.
    #[error("Document is not valid UTF-8")]
    InvalidEncoding,

    /// Dispatching the command failed.
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// A request value could not be turned into a domain value.
    #[error(transparent)]
    InvalidValue(#[from] EventError),

    /// Separated value lists of different lengths.
    #[error("The number of values for {first} do not match the number of values for {second}")]
    UnequalAmountOfValues {
        first: &'static str,
        second: &'static str,
    },

    /// Missing field, wrong content type or other malformed request.
    #[error("{0}")]
    BadRequest(String),
}

impl ApiError {
    /// The `rsp` code and HTTP status for this error.
    pub fn code_and_status(&self) -> (&'static str, StatusCode) {
        match self {
            ApiError::DocumentTooLarge(_) | ApiError::BodyTooLarge { .. } => {
                ("FileSizeTooLarge", StatusCode::BAD_REQUEST)
            }
            ApiError::InvalidEncoding => ("XmlSyntaxError", StatusCode::BAD_REQUEST),
            ApiError::Domain(DomainError::Document(error)) => {
                (guard_error_code(error), StatusCode::BAD_REQUEST)
            }
            ApiError::Domain(DomainError::AggregateNotFound { .. }) => {
                ("NotFound", StatusCode::NOT_FOUND)
            }
            ApiError::Domain(error) if error.is_conflict() => ("Conflict", StatusCode::CONFLICT),
            ApiError::Domain(_)
            | ApiError::InvalidValue(_)
            | ApiError::UnequalAmountOfValues { .. }
            | ApiError::BadRequest(_) => ("UnexpectedFailure", StatusCode::BAD_REQUEST),
        }
    }

    fn message(&self) -> String {
        match self {
            ApiError::Domain(DomainError::AggregateNotFound { .. }) => {
                "Resource not found".to_string()
            }
            other => other.to_string(),
        }
    }

    fn is_unexpected(&self) -> bool {
        match self {
            ApiError::Domain(error) => {
                !error.is_conflict()
                    && matches!(
                        error,
                        DomainError::EventStore(_) | DomainError::Serialization(_)
                    )
            }
            _ => false,
        }
    }
}

fn guard_error_code(error: &GuardError) -> &'static str {
    match error {
        GuardError::MalformedDocument { .. }
        | GuardError::UnexpectedNamespace { .. }
        | GuardError::UnexpectedRootElement { .. }
        | GuardError::SchemaValidationFailure { .. } => "XmlSyntaxError",
        GuardError::ElementNotFound { .. } => "ElementNotFoundError",
        GuardError::TooManyItems => "TooManyItems",
        GuardError::SuspiciousContent { .. } => "SuspectedContent",
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (code, status) = self.code_and_status();
        metrics::counter!("entry_api_errors_total", "code" => code).increment(1);
        if self.is_unexpected() {
            tracing::error!(error = %self, "unexpected failure");
        }
        Rsp::error(code, self.message()).into_response_with(status)
    }
}
