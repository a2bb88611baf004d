use std::env;

use chrono::{FixedOffset, Offset, Utc};

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub port: u16,
    pub api_token: String,
    pub calendar_id: String,
    pub calendar_api_base: String,
    pub google_token_url: String,
    pub google_client_id: String,
    pub google_client_secret: String,
    pub google_refresh_token: String,
    pub google_access_token: String,
    pub calendar_timezone: String,
    pub utc_offset_minutes: i32,
    pub meeting_duration_minutes: i64,
    pub lookahead_days: i64,
    pub default_meeting_summary: String,
    pub gateway_timeout_secs: u64,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            port: parsed_var("PORT", 3000),
            api_token: env::var("API_TOKEN").unwrap_or_default(),
            calendar_id: env::var("CALENDAR_ID").unwrap_or_else(|_| "primary".to_string()),
            calendar_api_base: env::var("CALENDAR_API_BASE")
                .unwrap_or_else(|_| "https://www.googleapis.com/calendar/v3".to_string()),
            google_token_url: env::var("GOOGLE_TOKEN_URL")
                .unwrap_or_else(|_| "https://oauth2.googleapis.com/token".to_string()),
            google_client_id: env::var("GOOGLE_CLIENT_ID").unwrap_or_default(),
            google_client_secret: env::var("GOOGLE_CLIENT_SECRET").unwrap_or_default(),
            google_refresh_token: env::var("GOOGLE_REFRESH_TOKEN").unwrap_or_default(),
            google_access_token: env::var("GOOGLE_ACCESS_TOKEN").unwrap_or_default(),
            calendar_timezone: env::var("CALENDAR_TIMEZONE")
                .unwrap_or_else(|_| "Asia/Kolkata".to_string()),
            utc_offset_minutes: parsed_var("UTC_OFFSET_MINUTES", 330),
            meeting_duration_minutes: parsed_var("MEETING_DURATION_MINUTES", 30),
            lookahead_days: parsed_var("LOOKAHEAD_DAYS", 2),
            default_meeting_summary: env::var("DEFAULT_MEETING_SUMMARY")
                .unwrap_or_else(|_| "Meeting with Agenda".to_string()),
            gateway_timeout_secs: parsed_var("GATEWAY_TIMEOUT_SECS", 10),
        }
    }

    /// Fixed offset used for "now" and for created events. Out-of-range
    /// values fall back to UTC.
    pub fn utc_offset(&self) -> FixedOffset {
        self.utc_offset_minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .unwrap_or_else(|| Utc.fix())
    }
}

fn parsed_var<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            api_token: String::new(),
            calendar_id: "primary".to_string(),
            calendar_api_base: "https://www.googleapis.com/calendar/v3".to_string(),
            google_token_url: "https://oauth2.googleapis.com/token".to_string(),
            google_client_id: String::new(),
            google_client_secret: String::new(),
            google_refresh_token: String::new(),
            google_access_token: String::new(),
            calendar_timezone: "Asia/Kolkata".to_string(),
            utc_offset_minutes: 330,
            meeting_duration_minutes: 30,
            lookahead_days: 2,
            default_meeting_summary: "Meeting with Agenda".to_string(),
            gateway_timeout_secs: 10,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_offset_is_ist() {
        let config = AppConfig::default();
        assert_eq!(config.utc_offset().local_minus_utc(), 330 * 60);
    }

    #[test]
    fn test_out_of_range_offset_falls_back_to_utc() {
        let config = AppConfig {
            utc_offset_minutes: 100_000,
            ..AppConfig::default()
        };
        assert_eq!(config.utc_offset().local_minus_utc(), 0);
    }
}
