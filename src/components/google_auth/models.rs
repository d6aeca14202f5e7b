use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;

/// Refresh this long before the provider's expiry
const EXPIRY_MARGIN_SECS: i64 = 60;

/// Token endpoint response for both grant types
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub expires_in: Option<i64>,
    #[serde(default)]
    pub refresh_token: Option<String>,
}

/// In-memory credential for the current session
#[derive(Debug, Clone, PartialEq)]
pub struct AccessToken {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_at: DateTime<Utc>,
}

impl AccessToken {
    /// Build from a token response. A refresh response usually omits the
    /// refresh token, so the previous one is carried over.
    pub fn from_response(response: TokenResponse, previous_refresh: Option<String>, now: DateTime<Utc>) -> Self {
        let expires_in = response.expires_in.unwrap_or(3600);
        Self {
            access_token: response.access_token,
            refresh_token: response.refresh_token.or(previous_refresh),
            expires_at: now + Duration::seconds(expires_in),
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at - Duration::seconds(EXPIRY_MARGIN_SECS) <= now
    }
}

/// Userinfo endpoint response
#[derive(Debug, Clone, Deserialize)]
pub struct UserInfo {
    pub email: String,
    #[serde(default)]
    pub name: Option<String>,
}
