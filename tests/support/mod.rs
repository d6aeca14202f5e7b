//! Mock implementations of the provider traits for testing without a network
#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use meeting_rescheduler::config::{Config, TemplateConfig};
use meeting_rescheduler::error::{AppResult, Error};
use meeting_rescheduler::session::{ConversationTurn, Services};
use meeting_rescheduler::workflow::{
    Account, Attendee, Authenticator, CalendarEvent, CalendarProvider, LanguageModel, MailTransport, OutgoingMail,
    TimeOffRange,
};
use std::collections::{HashSet, VecDeque};
use std::sync::{Arc, Mutex};

/// Minimal config for tests
pub fn test_config() -> Config {
    Config {
        google_client_id: "test_client_id".to_string(),
        google_client_secret: "test_client_secret".to_string(),
        google_calendar_id: "primary".to_string(),
        openai_api_key: "test_openai_key".to_string(),
        openai_model: "gpt-4".to_string(),
        openai_base_url: None,
        llm_temperature: 0.7,
        llm_max_tokens: 1000,
        timezone: "UTC".to_string(),
        oauth_redirect_port: 8080,
        bot_locale: "en".to_string(),
        sender_name: None,
        templates: TemplateConfig::default(),
    }
}

pub fn me() -> Account {
    Account {
        email: "me@example.com".to_string(),
        name: Some("Test User".to_string()),
    }
}

/// Meeting on a day in June 2024 at the given hour (UTC)
pub fn meeting(id: &str, title: &str, day: u32, hour: u32, recurring: bool) -> CalendarEvent {
    CalendarEvent {
        id: id.to_string(),
        title: title.to_string(),
        start: Utc.with_ymd_and_hms(2024, 6, day, hour, 0, 0).unwrap(),
        end: Utc.with_ymd_and_hms(2024, 6, day, hour + 1, 0, 0).unwrap(),
        all_day: false,
        recurring,
        attendees: vec![
            Attendee {
                email: "me@example.com".to_string(),
                display_name: Some("Test User".to_string()),
                is_self: true,
            },
            Attendee {
                email: format!("{}-owner@example.com", id),
                display_name: Some(format!("Owner {}", id)),
                is_self: false,
            },
        ],
        organizer: Some(format!("{}-owner@example.com", id)),
    }
}

/// 3 recurring and 2 one-off meetings during 2024-06-01..2024-06-07
pub fn june_week() -> Vec<CalendarEvent> {
    vec![
        meeting("standup-0603", "Daily standup", 3, 9, true),
        meeting("design-review", "Design review", 4, 13, false),
        meeting("standup-0604", "Daily standup", 4, 9, true),
        meeting("one-on-one", "1:1 with Anna", 5, 10, true),
        meeting("vendor-call", "Vendor call", 6, 15, false),
    ]
}

pub fn june_range() -> TimeOffRange {
    TimeOffRange::parse("2024-06-01", "2024-06-07").unwrap()
}

/// Authenticator that signs in immediately
pub struct MockAuthenticator {
    pub account: Account,
    pub fail: bool,
}

impl MockAuthenticator {
    pub fn new() -> Self {
        Self { account: me(), fail: false }
    }
}

#[async_trait]
impl Authenticator for MockAuthenticator {
    async fn authenticate(&self) -> AppResult<Account> {
        if self.fail {
            Err(Error::Authentication("consent denied".to_string()))
        } else {
            Ok(self.account.clone())
        }
    }
}

/// Calendar serving fixed events and recording cancellations
#[derive(Default)]
pub struct MockCalendar {
    pub events: Vec<CalendarEvent>,
    /// Event ids whose cancellation fails
    pub failing: Mutex<HashSet<String>>,
    pub cancelled: Mutex<Vec<(String, bool)>>,
    pub cancel_attempts: Mutex<Vec<String>>,
    pub list_calls: Mutex<Vec<TimeOffRange>>,
}

impl MockCalendar {
    pub fn with_events(events: Vec<CalendarEvent>) -> Self {
        Self {
            events,
            ..Default::default()
        }
    }

    pub fn failing_on(self, event_id: &str) -> Self {
        self.failing.lock().unwrap().insert(event_id.to_string());
        self
    }

    pub fn recover(&self, event_id: &str) {
        self.failing.lock().unwrap().remove(event_id);
    }

    pub fn cancelled_ids(&self) -> Vec<String> {
        self.cancelled.lock().unwrap().iter().map(|(id, _)| id.clone()).collect()
    }
}

#[async_trait]
impl CalendarProvider for MockCalendar {
    async fn list_events(&self, range: &TimeOffRange) -> AppResult<Vec<CalendarEvent>> {
        self.list_calls.lock().unwrap().push(*range);
        Ok(self.events.clone())
    }

    async fn cancel_event(&self, event_id: &str, notify_attendees: bool) -> AppResult<()> {
        self.cancel_attempts.lock().unwrap().push(event_id.to_string());
        if self.failing.lock().unwrap().contains(event_id) {
            return Err(Error::Provider {
                service: "Google Calendar".to_string(),
                status: 500,
                message: "backend error".to_string(),
            });
        }
        self.cancelled
            .lock()
            .unwrap()
            .push((event_id.to_string(), notify_attendees));
        Ok(())
    }
}

/// Mail transport that keeps what it was asked to send
#[derive(Default)]
pub struct RecordingMail {
    pub sent: Mutex<Vec<OutgoingMail>>,
    pub fail: bool,
}

#[async_trait]
impl MailTransport for RecordingMail {
    async fn send(&self, mail: &OutgoingMail) -> AppResult<()> {
        if self.fail {
            return Err(Error::RateLimited("Gmail".to_string()));
        }
        self.sent.lock().unwrap().push(mail.clone());
        Ok(())
    }
}

/// One recorded model call
#[derive(Debug, Clone)]
pub struct ModelCall {
    pub preamble: String,
    pub history: Vec<ConversationTurn>,
    pub message: String,
}

/// Model that answers from a script, in order
#[derive(Default)]
pub struct ScriptedModel {
    pub replies: Mutex<VecDeque<AppResult<String>>>,
    pub calls: Mutex<Vec<ModelCall>>,
}

impl ScriptedModel {
    pub fn new(replies: Vec<AppResult<String>>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<ModelCall> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl LanguageModel for ScriptedModel {
    async fn reply(&self, preamble: &str, history: &[ConversationTurn], message: &str) -> AppResult<String> {
        self.calls.lock().unwrap().push(ModelCall {
            preamble: preamble.to_string(),
            history: history.to_vec(),
            message: message.to_string(),
        });
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok("Okay.".to_string()))
    }
}

/// The mocks behind a session, kept so tests can inspect them
pub struct Harness {
    pub calendar: Arc<MockCalendar>,
    pub mail: Arc<RecordingMail>,
    pub model: Arc<ScriptedModel>,
    pub services: Services,
}

impl Harness {
    pub fn new(calendar: MockCalendar, mail: RecordingMail, model: ScriptedModel) -> Self {
        let calendar = Arc::new(calendar);
        let mail = Arc::new(mail);
        let model = Arc::new(model);
        let services = Services {
            auth: Arc::new(MockAuthenticator::new()),
            calendar: calendar.clone(),
            mail: mail.clone(),
            model: model.clone(),
        };
        Self {
            calendar,
            mail,
            model,
            services,
        }
    }
}
