use miette::{Diagnostic, Result};
use thiserror::Error;

/// Main error type for the application
#[derive(Debug, Error, Diagnostic)]
pub enum Error {
    #[error("Authentication error: {0}")]
    #[diagnostic(
        code(rescheduler::authentication),
        help("Connect your Google account again with /connect")
    )]
    Authentication(String),

    #[error("{0} rate limit reached")]
    #[diagnostic(code(rescheduler::rate_limited), help("Wait a moment and try again"))]
    RateLimited(String),

    #[error("{service} API error: HTTP {status} - {message}")]
    #[diagnostic(code(rescheduler::provider))]
    Provider {
        service: String,
        status: u16,
        message: String,
    },

    #[error("Network error: {0}")]
    #[diagnostic(code(rescheduler::network))]
    Network(#[from] reqwest::Error),

    #[error("Malformed response: {0}")]
    #[diagnostic(code(rescheduler::malformed_response))]
    MalformedResponse(String),

    #[error("Language model error: {0}")]
    #[diagnostic(code(rescheduler::language_model))]
    LanguageModel(String),

    #[error("Google Calendar error: {0}")]
    #[diagnostic(code(rescheduler::google_calendar))]
    GoogleCalendar(String),

    #[error("Mail error: {0}")]
    #[diagnostic(code(rescheduler::mail))]
    Mail(String),

    #[error("Template error: {0}")]
    #[diagnostic(code(rescheduler::template))]
    Template(String),

    #[error("Invalid input: {0}")]
    #[diagnostic(code(rescheduler::invalid_input))]
    InvalidInput(String),

    #[error("Environment error: {0}")]
    #[diagnostic(code(rescheduler::environment))]
    Environment(String),

    #[error("Configuration error: {0}")]
    #[diagnostic(code(rescheduler::config))]
    Config(String),

    #[error(transparent)]
    #[diagnostic(code(rescheduler::io))]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    #[diagnostic(code(rescheduler::serialization))]
    Serialization(String),

    #[error("Other error: {0}")]
    #[diagnostic(code(rescheduler::other))]
    Other(String),
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

/// Type alias for Result with our Error type
pub type AppResult<T> = Result<T, Error>;

/// Helper to create environment errors
pub fn env_error(var: &str) -> Error {
    Error::Environment(format!("Missing environment variable: {}", var))
}

/// Helper to create configuration errors
pub fn config_error(message: &str) -> Error {
    Error::Config(message.to_string())
}

/// Helper to create authentication errors
pub fn auth_error(message: &str) -> Error {
    Error::Authentication(message.to_string())
}

/// Helper to create Google Calendar errors
pub fn google_calendar_error(message: &str) -> Error {
    Error::GoogleCalendar(message.to_string())
}

/// Helper to create mail errors
pub fn mail_error(message: &str) -> Error {
    Error::Mail(message.to_string())
}

/// Helper to create invalid input errors
pub fn input_error(message: &str) -> Error {
    Error::InvalidInput(message.to_string())
}

/// Helper to create other errors
pub fn other_error(message: &str) -> Error {
    Error::Other(message.to_string())
}

/// Map a non-success HTTP status from a provider onto the error taxonomy
pub fn status_error(service: &str, status: u16, body: String) -> Error {
    match status {
        401 | 403 => Error::Authentication(format!("{} rejected the credential ({}): {}", service, status, body)),
        429 => Error::RateLimited(service.to_string()),
        _ => Error::Provider {
            service: service.to_string(),
            status,
            message: body,
        },
    }
}

/// Read an unsuccessful response body and turn it into an error
pub async fn error_from_response(service: &str, response: reqwest::Response) -> Error {
    let status = response.status().as_u16();
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "Could not read error response".to_string());
    status_error(service, status, body)
}
