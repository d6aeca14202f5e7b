//! Narrow interfaces to the hosted services the workflow depends on.

use super::models::{Account, CalendarEvent, OutgoingMail, TimeOffRange};
use crate::error::AppResult;
use crate::session::transcript::ConversationTurn;
use async_trait::async_trait;

/// Obtains a credential from the identity provider
#[async_trait]
pub trait Authenticator: Send + Sync {
    /// Run the sign-in flow and return the signed-in account
    async fn authenticate(&self) -> AppResult<Account>;
}

/// Calendar data source
#[async_trait]
pub trait CalendarProvider: Send + Sync {
    /// Events whose start falls inside the range
    async fn list_events(&self, range: &TimeOffRange) -> AppResult<Vec<CalendarEvent>>;

    /// Cancel a single event, optionally letting the provider notify attendees
    async fn cancel_event(&self, event_id: &str, notify_attendees: bool) -> AppResult<()>;
}

/// Outgoing mail
#[async_trait]
pub trait MailTransport: Send + Sync {
    async fn send(&self, mail: &OutgoingMail) -> AppResult<()>;
}

/// Hosted text-generation service
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Complete the next assistant turn given the preamble, the transcript so
    /// far and the new user message
    async fn reply(&self, preamble: &str, history: &[ConversationTurn], message: &str) -> AppResult<String>;
}
