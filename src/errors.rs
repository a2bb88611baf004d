use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// Failures reported by a calendar backend.
#[derive(Debug, thiserror::Error)]
pub enum CalendarError {
    #[error("calendar request timed out")]
    Timeout,

    #[error("calendar authorization failed: {0}")]
    Auth(String),

    #[error("calendar network error: {0}")]
    Network(String),

    #[error("calendar API error ({status}): {body}")]
    Api { status: u16, body: String },

    #[error("unexpected calendar response: {0}")]
    InvalidResponse(String),
}

impl From<reqwest::Error> for CalendarError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            CalendarError::Timeout
        } else if err.is_decode() {
            CalendarError::InvalidResponse(err.to_string())
        } else {
            CalendarError::Network(err.to_string())
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Calendar(#[from] CalendarError),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("unauthorized")]
    Unauthorized,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::Calendar(CalendarError::Timeout) => StatusCode::GATEWAY_TIMEOUT,
            AppError::Calendar(_) => StatusCode::BAD_GATEWAY,
            AppError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
        };

        let body = serde_json::json!({ "error": self.to_string() });
        (status, axum::Json(body)).into_response()
    }
}
