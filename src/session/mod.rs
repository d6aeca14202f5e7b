//! The conversation loop. Each user input is either a slash command, run
//! directly, or chat text sent to the model; directives in the model's reply
//! trigger the same actions as the commands.

pub mod directives;
pub mod prompts;
pub mod render;
pub mod state;
pub mod transcript;

pub use directives::{extract_directives, parse_command, Action};
pub use state::{MeetingStatus, SessionState, TrackedMeeting};
pub use transcript::{ConversationTurn, Role, Transcript};

use crate::error::{auth_error, input_error, AppResult};
use crate::workflow::{
    cancel_all, classify, Authenticator, CalendarProvider, CompositionContext, LanguageModel, MailTransport,
    NotificationComposer, TimeOffRange,
};
use chrono::{Duration, Utc};
use chrono_tz::Tz;
use rust_i18n::t;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Days of meetings previewed after sign-in
const PREVIEW_DAYS: i64 = 7;

/// Which half of a turn the loop is in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    AwaitingUserInput,
    AwaitingModelResponse,
}

/// What the terminal should do after an input
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Reply(String),
    Quit,
    /// Blank input
    Ignored,
}

/// External services a session talks to
#[derive(Clone)]
pub struct Services {
    pub auth: Arc<dyn Authenticator>,
    pub calendar: Arc<dyn CalendarProvider>,
    pub mail: Arc<dyn MailTransport>,
    pub model: Arc<dyn LanguageModel>,
}

pub struct Session {
    services: Services,
    composer: NotificationComposer,
    timezone: Tz,
    sender_name: Option<String>,
    transcript: Transcript,
    state: SessionState,
    loop_state: LoopState,
}

impl Session {
    pub fn new(services: Services, composer: NotificationComposer, timezone: Tz, sender_name: Option<String>) -> Self {
        Self {
            services,
            composer,
            timezone,
            sender_name,
            transcript: Transcript::new(),
            state: SessionState::default(),
            loop_state: LoopState::AwaitingUserInput,
        }
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn loop_state(&self) -> LoopState {
        self.loop_state
    }

    /// Opening message shown before the first input
    pub fn greeting(&self) -> String {
        t!("greeting").to_string()
    }

    /// Handle one line from the user
    pub async fn handle_input(&mut self, input: &str) -> Outcome {
        let input = input.trim();
        if input.is_empty() {
            return Outcome::Ignored;
        }

        match parse_command(input) {
            Ok(Some(Action::Quit)) => Outcome::Quit,
            Ok(Some(Action::Reset)) => {
                self.reset();
                Outcome::Reply(t!("reset_done").to_string())
            }
            Ok(Some(action)) => {
                let reply = self.run_action(action).await;
                self.record(input, &reply);
                Outcome::Reply(reply)
            }
            Ok(None) => Outcome::Reply(self.chat(input).await),
            Err(e) => {
                warn!(error = %e, "Invalid command");
                self.state.last_error = Some(e.to_string());
                let reply = t!("command_failed", error = e.to_string()).to_string();
                self.record(input, &reply);
                Outcome::Reply(reply)
            }
        }
    }

    /// Forget the transcript and everything fetched so far
    pub fn reset(&mut self) {
        info!("Resetting session");
        self.transcript.clear();
        self.state = SessionState::default();
        self.loop_state = LoopState::AwaitingUserInput;
    }

    fn record(&mut self, input: &str, reply: &str) {
        self.transcript.push_user(input);
        self.transcript.push_assistant(reply);
    }

    /// Send chat text to the model and run any directives in its reply
    async fn chat(&mut self, message: &str) -> String {
        let preamble = prompts::preamble(&self.state.summary(&self.timezone));

        self.transcript.push_user(message);
        self.loop_state = LoopState::AwaitingModelResponse;

        let result = self
            .services
            .model
            .reply(&preamble, self.transcript.history(), message)
            .await
            .and_then(|reply| extract_directives(&reply));

        self.loop_state = LoopState::AwaitingUserInput;

        let (text, actions) = match result {
            Ok(parsed) => parsed,
            Err(e) => {
                // Keep the transcript alternating; the user can resend
                self.transcript.rollback_user();
                warn!(error = %e, "Model call failed");
                self.state.last_error = Some(e.to_string());
                return t!("chat_failed", error = e.to_string()).to_string();
            }
        };

        debug!("Model reply carried {} directives", actions.len());

        let mut sections = Vec::new();
        if !text.is_empty() {
            sections.push(text);
        }
        for action in actions {
            sections.push(self.run_action(action).await);
        }

        let reply = sections.join("\n\n");
        self.transcript.push_assistant(&reply);
        reply
    }

    /// Run an action, turning any error into a chat message
    async fn run_action(&mut self, action: Action) -> String {
        let label = action.label();
        info!(action = label, "Running action");

        let result = self.execute(action).await;
        self.state.current_action = Some(label.to_string());

        match result {
            Ok(reply) => {
                self.state.last_error = None;
                reply
            }
            Err(e) => {
                warn!(action = label, error = %e, "Action failed");
                self.state.last_error = Some(e.to_string());
                t!("action_failed", action = label, error = e.to_string()).to_string()
            }
        }
    }

    async fn execute(&mut self, action: Action) -> AppResult<String> {
        match action {
            Action::Connect => {
                let account = self.services.auth.authenticate().await?;
                let mut reply = t!("connected", email = account.email.as_str()).to_string();
                self.state.account = Some(account);
                if let Some(preview) = self.upcoming_preview().await {
                    reply.push_str("\n\n");
                    reply.push_str(&preview);
                }
                Ok(reply)
            }
            Action::SetRange(range) => {
                self.state.set_range(range);
                Ok(t!(
                    "range_set",
                    start = range.start(),
                    end = range.end(),
                    days = range.days()
                )
                .to_string())
            }
            Action::Fetch => self.fetch().await,
            Action::ListMeetings => Ok(render::meetings(&self.state, &self.timezone)),
            Action::CancelRecurring {
                meeting,
                notify_attendees,
            } => self.cancel_recurring(meeting, notify_attendees).await,
            Action::Draft(number) => self.draft(number),
            Action::Edit(number, note) => {
                self.state.one_off_mut(number)?.note = note;
                self.draft(number)
            }
            Action::Send(number) => self.send(number).await,
            Action::Help => Ok(render::help()),
            // Handled before dispatch
            Action::Reset | Action::Quit => Ok(String::new()),
        }
    }

    /// Next week's meetings, shown once the user signs in. A failure here
    /// does not undo the sign-in.
    async fn upcoming_preview(&self) -> Option<String> {
        let today = Utc::now().with_timezone(&self.timezone).date_naive();
        let range = TimeOffRange::new(today, today + Duration::days(PREVIEW_DAYS - 1)).ok()?;

        match self.services.calendar.list_events(&range).await {
            Ok(events) => Some(render::upcoming(&events, &self.timezone)),
            Err(e) => {
                warn!(error = %e, "Could not load upcoming meetings");
                None
            }
        }
    }

    async fn fetch(&mut self) -> AppResult<String> {
        self.require_account()?;
        let range = self
            .state
            .range
            .ok_or_else(|| input_error("Set the time-off range first, e.g. /range 2024-06-01 2024-06-07"))?;

        let events = self.services.calendar.list_events(&range).await?;
        let classified = classify(events);
        info!(
            recurring = classified.recurring.len(),
            one_off = classified.one_off.len(),
            "Classified meetings"
        );

        self.state.load(classified);
        Ok(render::meetings(&self.state, &self.timezone))
    }

    async fn cancel_recurring(&mut self, meeting: Option<usize>, notify_attendees: bool) -> AppResult<String> {
        self.require_fetched()?;
        let targets = match meeting {
            Some(number) => {
                let meeting = self.state.recurring(number)?;
                if !meeting.status.is_open() {
                    return Err(input_error(&format!(
                        "Recurring meeting {} was already cancelled",
                        number
                    )));
                }
                vec![meeting.event.clone()]
            }
            None => self.state.open_recurring(),
        };
        if targets.is_empty() {
            return Ok(t!("cancel_nothing").to_string());
        }

        let report = cancel_all(self.services.calendar.as_ref(), &targets, notify_attendees).await;
        self.state.apply_cancellation(&report);
        Ok(render::cancellation(&report))
    }

    fn draft(&mut self, number: usize) -> AppResult<String> {
        self.require_fetched()?;
        let context = self.composition_context()?;
        let meeting = self.state.one_off(number)?;
        let draft = self.composer.compose(&meeting.event, &meeting.note, &context)?;
        let reply = render::draft(number, &draft);
        self.state.one_off_mut(number)?.draft = Some(draft);
        Ok(reply)
    }

    async fn send(&mut self, number: usize) -> AppResult<String> {
        self.require_fetched()?;
        let context = self.composition_context()?;
        let meeting = self.state.one_off(number)?;
        if meeting.status == MeetingStatus::Notified {
            return Err(input_error(&format!("The email for meeting {} was already sent", number)));
        }

        let draft = match &meeting.draft {
            Some(draft) => draft.clone(),
            None => self.composer.compose(&meeting.event, &meeting.note, &context)?,
        };
        let title = meeting.event.title.clone();

        let result = self.composer.send(self.services.mail.as_ref(), &draft).await;

        let meeting = self.state.one_off_mut(number)?;
        match result {
            Ok(()) => {
                meeting.status = MeetingStatus::Notified;
                Ok(t!("sent", title = title.as_str(), count = draft.mail.to.len()).to_string())
            }
            Err(e) => {
                meeting.status = MeetingStatus::Failed(e.to_string());
                Err(e)
            }
        }
    }

    fn composition_context(&self) -> AppResult<CompositionContext> {
        let sender = self.require_account()?.clone();
        let range = self
            .state
            .range
            .ok_or_else(|| input_error("Set the time-off range first"))?;

        Ok(CompositionContext {
            sender,
            sender_name: self.sender_name.clone(),
            range,
            timezone: self.timezone,
        })
    }

    fn require_account(&self) -> AppResult<&crate::workflow::Account> {
        self.state
            .account
            .as_ref()
            .ok_or_else(|| auth_error("Not connected to Google yet, use /connect"))
    }

    fn require_fetched(&self) -> AppResult<()> {
        if self.state.fetched {
            Ok(())
        } else {
            Err(input_error("Fetch the meetings first with /fetch"))
        }
    }
}
