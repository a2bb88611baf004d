use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use tokio::sync::RwLock;

use crate::errors::CalendarError;

/// Refresh this long before the provider-reported expiry.
const REFRESH_MARGIN_SECS: i64 = 60;

/// Longest lifetime trusted from a token response.
const MAX_TOKEN_LIFETIME_SECS: i64 = 86_400;

/// Supplies a bearer token for calendar requests.
#[async_trait]
pub trait AccessTokenProvider: Send + Sync {
    async fn access_token(&self) -> Result<String, CalendarError>;

    /// Drops any cached token so the next call fetches a fresh one.
    async fn invalidate(&self) {}
}

/// A pre-issued token, used as-is.
pub struct StaticToken(String);

impl StaticToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }
}

#[async_trait]
impl AccessTokenProvider for StaticToken {
    async fn access_token(&self) -> Result<String, CalendarError> {
        Ok(self.0.clone())
    }
}

#[derive(Debug, Clone)]
struct CachedToken {
    access_token: String,
    expires_at: DateTime<Utc>,
}

impl CachedToken {
    fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        self.expires_at - now > Duration::seconds(REFRESH_MARGIN_SECS)
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_expires_in")]
    expires_in: i64,
}

fn default_expires_in() -> i64 {
    3600
}

/// OAuth refresh-token grant with an in-memory cache of the access token.
pub struct RefreshingToken {
    client: reqwest::Client,
    token_url: String,
    client_id: String,
    client_secret: String,
    refresh_token: String,
    cached: RwLock<Option<CachedToken>>,
}

impl RefreshingToken {
    pub fn new(
        client: reqwest::Client,
        token_url: String,
        client_id: String,
        client_secret: String,
        refresh_token: String,
    ) -> Self {
        Self {
            client,
            token_url,
            client_id,
            client_secret,
            refresh_token,
            cached: RwLock::new(None),
        }
    }

    async fn refresh(&self) -> Result<CachedToken, CalendarError> {
        let resp = self
            .client
            .post(&self.token_url)
            .form(&[
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("refresh_token", self.refresh_token.as_str()),
                ("grant_type", "refresh_token"),
            ])
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(CalendarError::Auth(format!(
                "token refresh failed ({status}): {body}"
            )));
        }

        let token: TokenResponse = resp.json().await?;
        tracing::debug!(expires_in = token.expires_in, "refreshed calendar access token");

        let expires_in = token.expires_in;
        let bad_lifetime = || CalendarError::InvalidResponse(format!("bad expires_in {expires_in}"));
        let lifetime = Duration::try_seconds(expires_in.clamp(0, MAX_TOKEN_LIFETIME_SECS))
            .ok_or_else(bad_lifetime)?;
        let expires_at = Utc::now()
            .checked_add_signed(lifetime)
            .ok_or_else(bad_lifetime)?;

        Ok(CachedToken {
            access_token: token.access_token,
            expires_at,
        })
    }
}

#[async_trait]
impl AccessTokenProvider for RefreshingToken {
    async fn access_token(&self) -> Result<String, CalendarError> {
        if let Some(token) = self.cached.read().await.as_ref() {
            if token.is_fresh(Utc::now()) {
                return Ok(token.access_token.clone());
            }
        }

        // Held across the refresh so concurrent callers share one grant. The
        // refresh client carries the gateway timeout, which bounds the wait.
        let mut cached = self.cached.write().await;
        // Another caller may have refreshed while we waited for the lock.
        if let Some(token) = cached.as_ref() {
            if token.is_fresh(Utc::now()) {
                return Ok(token.access_token.clone());
            }
        }

        let token = self.refresh().await?;
        let access_token = token.access_token.clone();
        *cached = Some(token);
        Ok(access_token)
    }

    async fn invalidate(&self) {
        *self.cached.write().await = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cached_token_freshness() {
        let now = Utc::now();
        let fresh = CachedToken {
            access_token: "a".to_string(),
            expires_at: now + Duration::seconds(600),
        };
        let expiring = CachedToken {
            access_token: "b".to_string(),
            expires_at: now + Duration::seconds(30),
        };
        assert!(fresh.is_fresh(now));
        assert!(!expiring.is_fresh(now));
    }

    #[tokio::test]
    async fn test_static_token() {
        let provider = StaticToken::new("abc");
        assert_eq!(provider.access_token().await.unwrap(), "abc");
        provider.invalidate().await;
        assert_eq!(provider.access_token().await.unwrap(), "abc");
    }
}
