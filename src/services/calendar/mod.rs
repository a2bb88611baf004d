pub mod auth;
pub mod google;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset};

use crate::config::AppConfig;
use crate::errors::{AppError, CalendarError};
use crate::models::{BookingRequest, TimeSlot};

use self::auth::{AccessTokenProvider, RefreshingToken, StaticToken};
use self::google::GoogleCalendarGateway;

/// The two calendar operations the assistant needs.
#[async_trait]
pub trait CalendarGateway: Send + Sync {
    /// Busy slots starting in `[range_start, range_end)`, ordered by start.
    async fn list_busy(
        &self,
        range_start: DateTime<FixedOffset>,
        range_end: DateTime<FixedOffset>,
    ) -> Result<Vec<TimeSlot>, CalendarError>;

    /// Creates one event and returns a link to it. Not idempotent.
    async fn create_event(&self, booking: &BookingRequest) -> Result<String, CalendarError>;
}

/// Builds the Google gateway from configuration. A static access token wins
/// over refresh credentials; having neither is a configuration error.
pub fn gateway_from_config(config: &AppConfig) -> Result<GoogleCalendarGateway, AppError> {
    let timeout = Duration::from_secs(config.gateway_timeout_secs);
    let tokens: Arc<dyn AccessTokenProvider> = if !config.google_access_token.is_empty() {
        tracing::info!("using static Google access token");
        Arc::new(StaticToken::new(config.google_access_token.clone()))
    } else if !config.google_refresh_token.is_empty() {
        if config.google_client_id.is_empty() || config.google_client_secret.is_empty() {
            return Err(AppError::Config(
                "GOOGLE_CLIENT_ID and GOOGLE_CLIENT_SECRET must be set with GOOGLE_REFRESH_TOKEN"
                    .to_string(),
            ));
        }
        tracing::info!("using Google refresh-token credentials");
        Arc::new(RefreshingToken::new(
            google::http_client(timeout)?,
            config.google_token_url.clone(),
            config.google_client_id.clone(),
            config.google_client_secret.clone(),
            config.google_refresh_token.clone(),
        ))
    } else {
        return Err(AppError::Config(
            "set GOOGLE_ACCESS_TOKEN or GOOGLE_REFRESH_TOKEN to reach the calendar".to_string(),
        ));
    };

    Ok(GoogleCalendarGateway::new(
        config.calendar_api_base.clone(),
        config.calendar_id.clone(),
        config.calendar_timezone.clone(),
        timeout,
        tokens,
    )?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_credentials_is_config_error() {
        let err = gateway_from_config(&AppConfig::default()).err().unwrap();
        assert!(matches!(err, AppError::Config(_)));
    }

    #[test]
    fn test_refresh_token_requires_client_credentials() {
        let config = AppConfig {
            google_refresh_token: "refresh".to_string(),
            ..AppConfig::default()
        };
        assert!(matches!(
            gateway_from_config(&config),
            Err(AppError::Config(_))
        ));
    }

    #[test]
    fn test_static_token_builds_gateway() {
        let config = AppConfig {
            google_access_token: "token".to_string(),
            ..AppConfig::default()
        };
        assert!(gateway_from_config(&config).is_ok());
    }
}
