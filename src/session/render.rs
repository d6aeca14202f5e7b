use super::state::{SessionState, TrackedMeeting};
use crate::workflow::{CalendarEvent, CancellationReport, Draft};
use chrono_tz::Tz;
use rust_i18n::t;

/// When a meeting happens, in the configured zone
pub fn when(event: &CalendarEvent, tz: &Tz) -> String {
    let start = event.start.with_timezone(tz);
    if event.all_day {
        format!("{} ({})", start.format("%a %d %b"), t!("all_day"))
    } else {
        let end = event.end.with_timezone(tz);
        format!("{}-{}", start.format("%a %d %b %H:%M"), end.format("%H:%M"))
    }
}

fn meeting_line(meeting: &TrackedMeeting, tz: &Tz) -> String {
    format!(
        "{} | {} | {} | {}",
        meeting.event.title,
        when(&meeting.event, tz),
        t!("attendee_count", count = meeting.event.attendees.len()),
        meeting.status
    )
}

/// Numbered listing of the fetched meetings
pub fn meetings(state: &SessionState, tz: &Tz) -> String {
    if !state.fetched {
        return t!("meetings_not_fetched").to_string();
    }
    if state.recurring.is_empty() && state.one_off.is_empty() {
        return t!("meetings_none").to_string();
    }

    let mut lines = vec![t!(
        "meetings_header",
        recurring = state.recurring.len(),
        one_off = state.one_off.len()
    )
    .to_string()];

    if !state.recurring.is_empty() {
        lines.push(String::new());
        lines.push(t!("meetings_recurring_title").to_string());
        for (index, meeting) in state.recurring.iter().enumerate() {
            lines.push(format!("  {}. {}", index + 1, meeting_line(meeting, tz)));
        }
    }

    if !state.one_off.is_empty() {
        lines.push(String::new());
        lines.push(t!("meetings_one_off_title").to_string());
        for (index, meeting) in state.one_off.iter().enumerate() {
            lines.push(format!("  {}. {}", index + 1, meeting_line(meeting, tz)));
        }
    }

    lines.join("\n")
}

/// Short list of the meetings coming up, shown after sign-in
pub fn upcoming(events: &[CalendarEvent], tz: &Tz) -> String {
    if events.is_empty() {
        return t!("upcoming_none").to_string();
    }

    let mut lines = vec![t!("upcoming_header", count = events.len()).to_string()];
    for event in events.iter().take(UPCOMING_SHOWN) {
        lines.push(format!("  - {} | {}", event.title, when(event, tz)));
    }
    if events.len() > UPCOMING_SHOWN {
        lines.push(t!("upcoming_more", count = events.len() - UPCOMING_SHOWN).to_string());
    }

    lines.join("\n")
}

const UPCOMING_SHOWN: usize = 10;

pub fn draft(number: usize, draft: &Draft) -> String {
    format!(
        "{}\n{}: {}\n{}: {}\n\n{}\n\n{}",
        t!("draft_title", number = number),
        t!("draft_to"),
        draft.mail.to.join(", "),
        t!("draft_subject"),
        draft.mail.subject,
        draft.mail.body,
        t!("draft_hint", number = number)
    )
}

pub fn cancellation(report: &CancellationReport) -> String {
    let mut lines = vec![t!(
        "cancel_summary",
        cancelled = report.cancelled.len(),
        attempted = report.attempted()
    )
    .to_string()];

    for failure in &report.failed {
        lines.push(format!("  - {}: {}", failure.title, failure.reason));
    }
    if !report.is_complete_success() {
        lines.push(t!("cancel_retry_hint").to_string());
    }

    lines.join("\n")
}

pub fn help() -> String {
    t!("help").to_string()
}
