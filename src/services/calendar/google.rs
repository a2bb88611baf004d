use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, NaiveDate};
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::json;

use super::auth::AccessTokenProvider;
use super::CalendarGateway;
use crate::errors::CalendarError;
use crate::models::{BookingRequest, TimeSlot};

/// Upper bound on result pages fetched for one availability query.
const MAX_PAGES: usize = 10;

/// Google Calendar v3 REST gateway.
pub struct GoogleCalendarGateway {
    client: reqwest::Client,
    api_base: reqwest::Url,
    calendar_id: String,
    timezone: String,
    tokens: Arc<dyn AccessTokenProvider>,
}

impl GoogleCalendarGateway {
    /// `timeout` bounds every request; hitting it is reported as
    /// [`CalendarError::Timeout`].
    pub fn new(
        api_base: String,
        calendar_id: String,
        timezone: String,
        timeout: Duration,
        tokens: Arc<dyn AccessTokenProvider>,
    ) -> Result<Self, CalendarError> {
        let api_base = reqwest::Url::parse(api_base.trim_end_matches('/')).map_err(|e| {
            CalendarError::Network(format!("invalid calendar API base {api_base:?}: {e}"))
        })?;
        if api_base.cannot_be_a_base() {
            return Err(CalendarError::Network(format!(
                "invalid calendar API base {api_base}"
            )));
        }

        Ok(Self {
            client: http_client(timeout)?,
            api_base,
            calendar_id,
            timezone,
            tokens,
        })
    }

    /// The calendar id is pushed as one path segment, so ids such as
    /// `en.indian#holiday@group.v.calendar.google.com` are percent-encoded.
    fn events_url(&self) -> reqwest::Url {
        let mut url = self.api_base.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments
                .pop_if_empty()
                .push("calendars")
                .push(&self.calendar_id)
                .push("events");
        }
        url
    }

    /// Sends the request built by `build`, retrying once with a fresh token if
    /// the API rejects the current one.
    async fn send_authorized<F>(&self, build: F) -> Result<reqwest::Response, CalendarError>
    where
        F: Fn(&str) -> reqwest::RequestBuilder + Send + Sync,
    {
        let token = self.tokens.access_token().await?;
        let resp = build(&token).send().await?;
        if resp.status() != StatusCode::UNAUTHORIZED {
            return check_status(resp).await;
        }

        tracing::warn!("calendar rejected access token, refreshing");
        self.tokens.invalidate().await;
        let token = self.tokens.access_token().await?;
        let resp = build(&token).send().await?;
        check_status(resp).await
    }
}

/// HTTP client whose requests fail with [`CalendarError::Timeout`] after
/// `timeout`. Shared by the calendar gateway and the token refresher.
pub fn http_client(timeout: Duration) -> Result<reqwest::Client, CalendarError> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| CalendarError::Network(format!("failed to build HTTP client: {e}")))
}

async fn check_status(resp: reqwest::Response) -> Result<reqwest::Response, CalendarError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }

    let body = resp
        .text()
        .await
        .unwrap_or_else(|_| "Unknown error".to_string());
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            Err(CalendarError::Auth(format!("{status}: {body}")))
        }
        _ => Err(CalendarError::Api {
            status: status.as_u16(),
            body,
        }),
    }
}

#[async_trait]
impl CalendarGateway for GoogleCalendarGateway {
    async fn list_busy(
        &self,
        range_start: DateTime<FixedOffset>,
        range_end: DateTime<FixedOffset>,
    ) -> Result<Vec<TimeSlot>, CalendarError> {
        let url = self.events_url();
        let mut slots = Vec::new();
        let mut page_token: Option<String> = None;

        for _ in 0..MAX_PAGES {
            let mut query = vec![
                ("timeMin", range_start.to_rfc3339()),
                ("timeMax", range_end.to_rfc3339()),
                ("singleEvents", "true".to_string()),
                ("orderBy", "startTime".to_string()),
            ];
            if let Some(token) = &page_token {
                query.push(("pageToken", token.clone()));
            }

            let resp = self
                .send_authorized(|token| {
                    self.client
                        .get(url.clone())
                        .bearer_auth(token)
                        .query(&query)
                })
                .await?;
            let page: GoogleEventsResponse = resp.json().await?;

            for event in page.items {
                match event.into_time_slot()? {
                    Some(slot) => slots.push(slot),
                    None => tracing::warn!("calendar event without a start time, skipping"),
                }
            }

            page_token = page.next_page_token;
            if page_token.is_none() {
                break;
            }
        }

        if page_token.is_some() {
            tracing::warn!(
                max_pages = MAX_PAGES,
                fetched = slots.len(),
                "busy slot listing truncated, more pages remain"
            );
        }

        tracing::info!(count = slots.len(), "fetched busy slots");
        Ok(slots)
    }

    async fn create_event(&self, booking: &BookingRequest) -> Result<String, CalendarError> {
        let url = self.events_url();
        let body = json!({
            "summary": booking.summary,
            "start": { "dateTime": booking.start.to_rfc3339(), "timeZone": self.timezone },
            "end": { "dateTime": booking.end.to_rfc3339(), "timeZone": self.timezone },
        });

        let resp = self
            .send_authorized(|token| self.client.post(url.clone()).bearer_auth(token).json(&body))
            .await?;
        let created: GoogleCreatedEvent = resp.json().await?;

        tracing::info!(start = %booking.start, summary = %booking.summary, "created calendar event");
        created
            .html_link
            .ok_or_else(|| CalendarError::InvalidResponse("missing htmlLink in created event".into()))
    }
}

#[derive(Debug, Deserialize)]
struct GoogleEventsResponse {
    #[serde(default)]
    items: Vec<GoogleCalendarEvent>,
    #[serde(rename = "nextPageToken")]
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GoogleCalendarEvent {
    start: Option<EventDateTime>,
    end: Option<EventDateTime>,
}

#[derive(Debug, Deserialize)]
struct EventDateTime {
    #[serde(rename = "dateTime")]
    date_time: Option<String>,
    date: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GoogleCreatedEvent {
    #[serde(rename = "htmlLink")]
    html_link: Option<String>,
}

impl GoogleCalendarEvent {
    fn into_time_slot(self) -> Result<Option<TimeSlot>, CalendarError> {
        let Some(start) = self.start else {
            return Ok(None);
        };

        if let Some(date_time) = start.date_time {
            let start = parse_date_time(&date_time)?;
            let end = self
                .end
                .and_then(|e| e.date_time)
                .map(|e| parse_date_time(&e))
                .transpose()?;
            return Ok(Some(TimeSlot::Timed { start, end }));
        }

        match start.date {
            Some(date) => {
                let date = NaiveDate::parse_from_str(&date, "%Y-%m-%d").map_err(|e| {
                    CalendarError::InvalidResponse(format!("bad event date {date:?}: {e}"))
                })?;
                Ok(Some(TimeSlot::AllDay { date }))
            }
            None => Ok(None),
        }
    }
}

fn parse_date_time(value: &str) -> Result<DateTime<FixedOffset>, CalendarError> {
    DateTime::parse_from_rfc3339(value)
        .map_err(|e| CalendarError::InvalidResponse(format!("bad event dateTime {value:?}: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(json: &str) -> GoogleCalendarEvent {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_timed_event_to_slot() {
        let slot = event(
            r#"{"start":{"dateTime":"2025-06-27T15:00:00+05:30"},"end":{"dateTime":"2025-06-27T15:30:00+05:30"}}"#,
        )
        .into_time_slot()
        .unwrap()
        .unwrap();
        match slot {
            TimeSlot::Timed { start, end } => {
                assert_eq!(start.to_rfc3339(), "2025-06-27T15:00:00+05:30");
                assert_eq!(end.unwrap().to_rfc3339(), "2025-06-27T15:30:00+05:30");
            }
            other => panic!("expected timed slot, got {other:?}"),
        }
    }

    #[test]
    fn test_all_day_event_to_slot() {
        let slot = event(r#"{"start":{"date":"2025-06-28"},"end":{"date":"2025-06-29"}}"#)
            .into_time_slot()
            .unwrap();
        assert_eq!(
            slot,
            Some(TimeSlot::AllDay {
                date: NaiveDate::from_ymd_opt(2025, 6, 28).unwrap()
            })
        );
    }

    #[test]
    fn test_event_without_start_is_skipped() {
        assert_eq!(event("{}").into_time_slot().unwrap(), None);
    }

    #[test]
    fn test_malformed_date_time_is_invalid_response() {
        let err = event(r#"{"start":{"dateTime":"tomorrow-ish"}}"#)
            .into_time_slot()
            .unwrap_err();
        assert!(matches!(err, CalendarError::InvalidResponse(_)));
    }
}
