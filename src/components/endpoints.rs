/// Google OAuth consent page
pub const GOOGLE_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
/// Google OAuth token endpoint
pub const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
/// Signed-in user profile
pub const GOOGLE_USERINFO_URL: &str = "https://www.googleapis.com/oauth2/v2/userinfo";
/// Calendar REST API root
pub const GOOGLE_CALENDAR_API: &str = "https://www.googleapis.com/calendar/v3";
/// Gmail REST API root
pub const GMAIL_API: &str = "https://gmail.googleapis.com/gmail/v1";

/// Scopes requested during consent
pub const GOOGLE_SCOPES: &[&str] = &[
    "https://www.googleapis.com/auth/calendar.events",
    "https://www.googleapis.com/auth/gmail.send",
    "https://www.googleapis.com/auth/userinfo.email",
    "https://www.googleapis.com/auth/userinfo.profile",
    "openid",
];

/// Where each Google service lives
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoogleEndpoints {
    pub auth_url: String,
    pub token_url: String,
    pub userinfo_url: String,
    pub calendar_api: String,
    pub gmail_api: String,
}

impl Default for GoogleEndpoints {
    fn default() -> Self {
        Self {
            auth_url: GOOGLE_AUTH_URL.to_string(),
            token_url: GOOGLE_TOKEN_URL.to_string(),
            userinfo_url: GOOGLE_USERINFO_URL.to_string(),
            calendar_api: GOOGLE_CALENDAR_API.to_string(),
            gmail_api: GMAIL_API.to_string(),
        }
    }
}

impl GoogleEndpoints {
    /// Point every service at one base URL, keeping the real paths
    pub fn with_base(base: &str) -> Self {
        let base = base.trim_end_matches('/');
        Self {
            auth_url: format!("{}/o/oauth2/v2/auth", base),
            token_url: format!("{}/token", base),
            userinfo_url: format!("{}/oauth2/v2/userinfo", base),
            calendar_api: format!("{}/calendar/v3", base),
            gmail_api: format!("{}/gmail/v1", base),
        }
    }
}
