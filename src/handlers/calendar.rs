use std::sync::Arc;

use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use chrono::{DateTime, Duration, FixedOffset, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::models::BookingRequest;
use crate::state::AppState;

/// Bearer-token check for the direct calendar endpoints. An empty configured
/// token disables the check.
fn check_auth(headers: &HeaderMap, expected_token: &str) -> Result<(), AppError> {
    if expected_token.is_empty() {
        return Ok(());
    }

    let token = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .unwrap_or("");

    if token != expected_token {
        return Err(AppError::Unauthorized);
    }
    Ok(())
}

// GET /api/availability
#[derive(Serialize)]
pub struct AvailabilityResponse {
    pub busy_slots: Vec<String>,
}

pub async fn get_availability(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<AvailabilityResponse>, AppError> {
    check_auth(&headers, &state.config.api_token)?;

    let now = Utc::now().with_timezone(&state.config.utc_offset());
    let end = now + Duration::days(state.config.lookahead_days);
    tracing::info!(from = %now, to = %end, "availability requested");

    let slots = state.calendar.list_busy(now, end).await?;

    Ok(Json(AvailabilityResponse {
        busy_slots: slots.iter().map(|s| s.start_marker()).collect(),
    }))
}

// POST /api/book
#[derive(Deserialize)]
pub struct BookMeetingRequest {
    pub summary: Option<String>,
    pub start: DateTime<FixedOffset>,
    pub end: Option<DateTime<FixedOffset>>,
}

#[derive(Serialize)]
pub struct BookMeetingResponse {
    pub status: &'static str,
    pub event_link: String,
}

pub async fn book_meeting(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(payload): Json<BookMeetingRequest>,
) -> Result<Json<BookMeetingResponse>, AppError> {
    check_auth(&headers, &state.config.api_token)?;

    let mut booking = BookingRequest::new(
        payload.summary.as_deref(),
        &state.config.default_meeting_summary,
        payload.start,
        state.config.meeting_duration_minutes,
    );
    if let Some(end) = payload.end {
        if end <= booking.start {
            return Err(AppError::BadRequest("end must be after start".to_string()));
        }
        booking.end = end;
    }

    tracing::info!(start = %booking.start, end = %booking.end, "direct booking requested");
    let event_link = state.calendar.create_event(&booking).await?;

    Ok(Json(BookMeetingResponse {
        status: "booked",
        event_link,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_empty_token_disables_auth() {
        assert!(check_auth(&HeaderMap::new(), "").is_ok());
    }

    #[test]
    fn test_bearer_token_must_match() {
        let mut headers = HeaderMap::new();
        assert!(check_auth(&headers, "secret").is_err());

        headers.insert("authorization", HeaderValue::from_static("Bearer wrong"));
        assert!(check_auth(&headers, "secret").is_err());

        headers.insert("authorization", HeaderValue::from_static("Bearer secret"));
        assert!(check_auth(&headers, "secret").is_ok());
    }
}
