use actix_web::{http::StatusCode, HttpResponse, ResponseError};

use crate::backend::BackendError;
use crate::models::SessionError;
use crate::utils::responses::ResponseBuilder;

/// Failures of a credential flow, each mapped to one HTTP status
///
/// Handoff problems are absent on purpose: they resolve to a local-only
/// completion, never to an error.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum FlowError {
    /// Input rejected before any network call
    #[error("{0}")]
    Validation(String),
    /// Backend unreachable; the user may retry
    #[error("{0}")]
    ServiceUnavailable(String),
    /// Backend refused the request
    #[error("{message}")]
    Rejected { status: u16, message: String },
    /// Backend answered but the reply cannot establish a session
    #[error("{0}")]
    InvalidResponse(String),
}

impl FlowError {
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation_error",
            Self::ServiceUnavailable(_) => "service_unavailable",
            Self::Rejected { .. } => "rejected",
            Self::InvalidResponse(_) => "invalid_response",
        }
    }

    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::ServiceUnavailable(_))
    }
}

impl From<BackendError> for FlowError {
    fn from(error: BackendError) -> Self {
        match error {
            BackendError::Unavailable(message) => Self::ServiceUnavailable(message),
            BackendError::Rejected { status, message } => Self::Rejected { status, message },
            BackendError::InvalidResponse(message) => Self::InvalidResponse(message),
        }
    }
}

impl From<SessionError> for FlowError {
    fn from(error: SessionError) -> Self {
        Self::InvalidResponse(format!("Invalid response from server: {error}"))
    }
}

impl ResponseError for FlowError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Rejected { status, .. } => StatusCode::from_u16(*status)
                .ok()
                .filter(|s| s.is_client_error() || s.is_server_error())
                .unwrap_or(StatusCode::BAD_GATEWAY),
            Self::InvalidResponse(_) => StatusCode::BAD_GATEWAY,
        }
    }

    fn error_response(&self) -> HttpResponse {
        ResponseBuilder::error(self.status_code())
            .with_error_code(self.code())
            .with_message(&self.to_string())
            .build()
    }
}
