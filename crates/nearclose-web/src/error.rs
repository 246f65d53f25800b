use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use nearclose_core::{CoreError, LookupError, Notice, ValidationError};
use serde_json::json;
use thiserror::Error;

/// Error returned by the JSON and download endpoints.
#[derive(Debug, Error)]
pub enum WebError {
    #[error(transparent)]
    Lookup(#[from] LookupError),

    #[error("failed to build spreadsheet: {0}")]
    Export(#[from] CoreError),
}

impl From<ValidationError> for WebError {
    fn from(error: ValidationError) -> Self {
        Self::Lookup(LookupError::InvalidInput(error))
    }
}

impl WebError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Lookup(error) => lookup_status(error),
            Self::Export(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::Lookup(error) => error.code(),
            Self::Export(_) => "export.failed",
        }
    }

    pub fn notice(&self) -> Notice {
        match self {
            Self::Lookup(error) => error.notice(),
            Self::Export(error) => Notice::error(format!("Could not build the spreadsheet: {error}")),
        }
    }
}

/// HTTP status for each lookup failure.
pub fn lookup_status(error: &LookupError) -> StatusCode {
    match error {
        LookupError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        LookupError::DataUnavailable { .. } => StatusCode::NOT_FOUND,
        LookupError::QuoteUnavailable { .. } | LookupError::Upstream(_) => StatusCode::BAD_GATEWAY,
    }
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(code = self.code(), error = %self, "request failed");
        } else {
            tracing::debug!(code = self.code(), error = %self, "request rejected");
        }

        let body = json!({
            "error": self.code(),
            "message": self.to_string(),
            "notice": self.notice(),
        });
        (status, Json(body)).into_response()
    }
}
