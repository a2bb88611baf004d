use chrono::{DateTime, Duration, FixedOffset};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BookingRequest {
    pub summary: String,
    pub start: DateTime<FixedOffset>,
    pub end: DateTime<FixedOffset>,
}

impl BookingRequest {
    /// Builds a request lasting `duration_minutes` from `start`. A blank or
    /// missing summary is replaced by `default_summary`.
    pub fn new(
        summary: Option<&str>,
        default_summary: &str,
        start: DateTime<FixedOffset>,
        duration_minutes: i64,
    ) -> Self {
        let summary = summary
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(default_summary)
            .to_string();

        Self {
            summary,
            start,
            end: start + Duration::minutes(duration_minutes),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BookingResult {
    Booked { link: String },
    Failed { reason: String },
}
