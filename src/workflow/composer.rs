use super::models::{Account, CalendarEvent, OutgoingMail, TimeOffRange};
use super::providers::MailTransport;
use super::templates::MessageTemplate;
use crate::error::{mail_error, AppResult};
use chrono_tz::Tz;
use std::collections::{HashMap, HashSet};
use tracing::info;

/// Everything about the sender a draft needs
#[derive(Debug, Clone)]
pub struct CompositionContext {
    pub sender: Account,
    /// Overrides the account name in signatures
    pub sender_name: Option<String>,
    pub range: TimeOffRange,
    pub timezone: Tz,
}

/// A rendered email for one one-off event
#[derive(Debug, Clone, PartialEq)]
pub struct Draft {
    pub event_id: String,
    pub mail: OutgoingMail,
}

/// Builds and sends rescheduling emails for one-off events
#[derive(Debug, Clone)]
pub struct NotificationComposer {
    template: MessageTemplate,
}

impl NotificationComposer {
    pub fn new(template: MessageTemplate) -> Self {
        Self { template }
    }

    /// Render the email for an event with the user's free text
    pub fn compose(&self, event: &CalendarEvent, note: &str, ctx: &CompositionContext) -> AppResult<Draft> {
        let recipients = recipients(event, &ctx.sender);
        if recipients.is_empty() {
            return Err(mail_error(&format!("No recipients found for '{}'", event.title)));
        }

        let attendee_name = recipients_names(event, &recipients).join(", ");
        let local_start = event.start.with_timezone(&ctx.timezone);
        let meeting_time = if event.all_day {
            "all day".to_string()
        } else {
            local_start.format("%H:%M").to_string()
        };
        let user_name = ctx
            .sender_name
            .clone()
            .unwrap_or_else(|| ctx.sender.display_name().to_string());

        let mut values = HashMap::new();
        values.insert("meeting_name", event.title.clone());
        values.insert("meeting_date", local_start.format("%A, %B %d").to_string());
        values.insert("meeting_time", meeting_time);
        values.insert("attendee_name", attendee_name);
        values.insert("time_off_start", ctx.range.start().format("%Y-%m-%d").to_string());
        values.insert("time_off_end", ctx.range.end().format("%Y-%m-%d").to_string());
        values.insert("user_name", user_name);
        values.insert("note", note.trim().to_string());

        let (subject, body) = self.template.render(&values)?;

        Ok(Draft {
            event_id: event.id.clone(),
            mail: OutgoingMail {
                to: recipients,
                subject,
                body: tidy_blank_lines(&body),
            },
        })
    }

    /// Hand a draft to the mail transport, once for the whole recipient list
    pub async fn send(&self, transport: &dyn MailTransport, draft: &Draft) -> AppResult<()> {
        transport.send(&draft.mail).await?;
        info!(
            event_id = %draft.event_id,
            recipients = draft.mail.to.len(),
            "Sent rescheduling email"
        );
        Ok(())
    }
}

/// Organizer first, then attendees; no duplicates and never the sender
pub fn recipients(event: &CalendarEvent, sender: &Account) -> Vec<String> {
    let sender_email = sender.email.to_lowercase();
    let mut seen = HashSet::new();
    let mut recipients = Vec::new();

    let candidates = event.organizer.iter().cloned().chain(
        event
            .attendees
            .iter()
            .filter(|attendee| !attendee.is_self)
            .map(|attendee| attendee.email.clone()),
    );

    for email in candidates {
        let email = email.trim().to_string();
        let key = email.to_lowercase();
        if email.is_empty() || key == sender_email {
            continue;
        }
        if seen.insert(key) {
            recipients.push(email);
        }
    }

    recipients
}

fn recipients_names(event: &CalendarEvent, recipients: &[String]) -> Vec<String> {
    recipients
        .iter()
        .map(|email| {
            event
                .attendees
                .iter()
                .find(|attendee| attendee.email.eq_ignore_ascii_case(email))
                .map(|attendee| attendee.name())
                .unwrap_or_else(|| email.split('@').next().unwrap_or(email).to_string())
        })
        .collect()
}

/// Collapse the gap an empty note leaves behind
fn tidy_blank_lines(body: &str) -> String {
    let mut output = String::with_capacity(body.len());
    let mut blank_run = 0;
    for line in body.lines() {
        if line.trim().is_empty() {
            blank_run += 1;
            if blank_run > 1 {
                continue;
            }
        } else {
            blank_run = 0;
        }
        output.push_str(line);
        output.push('\n');
    }
    output.trim_end().to_string()
}
