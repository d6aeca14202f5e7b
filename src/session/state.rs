use crate::error::{input_error, AppResult};
use crate::workflow::{Account, CalendarEvent, CancellationReport, ClassifiedEvents, Draft, TimeOffRange};
use chrono_tz::Tz;
use std::fmt;

/// Where a fetched meeting stands in this session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MeetingStatus {
    Pending,
    Cancelled,
    Notified,
    Failed(String),
}

impl MeetingStatus {
    /// Still waiting for an action to succeed
    pub fn is_open(&self) -> bool {
        matches!(self, MeetingStatus::Pending | MeetingStatus::Failed(_))
    }
}

impl fmt::Display for MeetingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MeetingStatus::Pending => write!(f, "pending"),
            MeetingStatus::Cancelled => write!(f, "cancelled"),
            MeetingStatus::Notified => write!(f, "notified"),
            MeetingStatus::Failed(reason) => write!(f, "failed: {}", reason),
        }
    }
}

/// A fetched meeting and what has happened to it
#[derive(Debug, Clone, PartialEq)]
pub struct TrackedMeeting {
    pub event: CalendarEvent,
    pub status: MeetingStatus,
    /// Free text the user wants in the email
    pub note: String,
    pub draft: Option<Draft>,
}

impl TrackedMeeting {
    fn new(event: CalendarEvent) -> Self {
        Self {
            event,
            status: MeetingStatus::Pending,
            note: String::new(),
            draft: None,
        }
    }
}

/// Everything the session knows besides the transcript
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    pub account: Option<Account>,
    pub range: Option<TimeOffRange>,
    pub recurring: Vec<TrackedMeeting>,
    pub one_off: Vec<TrackedMeeting>,
    /// Whether events have been fetched for the current range
    pub fetched: bool,
    pub current_action: Option<String>,
    pub last_error: Option<String>,
}

impl SessionState {
    /// Set a new range. Meetings fetched for the old one no longer apply.
    pub fn set_range(&mut self, range: TimeOffRange) {
        self.range = Some(range);
        self.recurring.clear();
        self.one_off.clear();
        self.fetched = false;
    }

    /// Replace the meeting lists with a fresh fetch
    pub fn load(&mut self, classified: ClassifiedEvents) {
        self.recurring = classified.recurring.into_iter().map(TrackedMeeting::new).collect();
        self.one_off = classified.one_off.into_iter().map(TrackedMeeting::new).collect();
        self.fetched = true;
    }

    /// Recurring meetings not cancelled yet
    pub fn open_recurring(&self) -> Vec<CalendarEvent> {
        self.recurring
            .iter()
            .filter(|meeting| meeting.status.is_open())
            .map(|meeting| meeting.event.clone())
            .collect()
    }

    /// Recurring meeting by its 1-based number in the listing
    pub fn recurring(&self, number: usize) -> AppResult<&TrackedMeeting> {
        number
            .checked_sub(1)
            .and_then(|index| self.recurring.get(index))
            .ok_or_else(|| unknown_meeting("recurring", number, self.recurring.len()))
    }

    /// Record the outcome of a cancellation batch
    pub fn apply_cancellation(&mut self, report: &CancellationReport) {
        for meeting in &mut self.recurring {
            if report.cancelled.contains(&meeting.event.id) {
                meeting.status = MeetingStatus::Cancelled;
            } else if let Some(failure) = report.failed.iter().find(|f| f.event_id == meeting.event.id) {
                meeting.status = MeetingStatus::Failed(failure.reason.clone());
            }
        }
    }

    /// One-off meeting by its 1-based number in the listing
    pub fn one_off(&self, number: usize) -> AppResult<&TrackedMeeting> {
        number
            .checked_sub(1)
            .and_then(|index| self.one_off.get(index))
            .ok_or_else(|| unknown_meeting("one-off", number, self.one_off.len()))
    }

    pub fn one_off_mut(&mut self, number: usize) -> AppResult<&mut TrackedMeeting> {
        let err = unknown_meeting("one-off", number, self.one_off.len());
        number
            .checked_sub(1)
            .and_then(|index| self.one_off.get_mut(index))
            .ok_or(err)
    }

    /// Short plain-text description of the session for the model
    pub fn summary(&self, tz: &Tz) -> String {
        let mut lines = Vec::new();

        match &self.account {
            Some(account) => lines.push(format!("Connected to Google as {}.", account.email)),
            None => lines.push("Not connected to Google yet.".to_string()),
        }

        match &self.range {
            Some(range) => lines.push(format!(
                "Time off: {} to {} ({} days, timezone {}).",
                range.start(),
                range.end(),
                range.days(),
                tz
            )),
            None => lines.push("No time-off range set.".to_string()),
        }

        if self.fetched {
            lines.push(format!(
                "Meetings: {} recurring ({} cancelled), {} one-off ({} notified).",
                self.recurring.len(),
                count(&self.recurring, &MeetingStatus::Cancelled),
                self.one_off.len(),
                count(&self.one_off, &MeetingStatus::Notified),
            ));
            for (index, meeting) in self.recurring.iter().enumerate() {
                lines.push(format!(
                    "Recurring {}: \"{}\" on {} [{}]",
                    index + 1,
                    meeting.event.title,
                    meeting.event.start.with_timezone(tz).format("%Y-%m-%d %H:%M"),
                    meeting.status
                ));
            }
            for (index, meeting) in self.one_off.iter().enumerate() {
                lines.push(format!(
                    "One-off {}: \"{}\" on {} [{}]",
                    index + 1,
                    meeting.event.title,
                    meeting.event.start.with_timezone(tz).format("%Y-%m-%d %H:%M"),
                    meeting.status
                ));
            }
        } else {
            lines.push("Meetings not fetched yet.".to_string());
        }

        if let Some(action) = &self.current_action {
            lines.push(format!("Last action: {}.", action));
        }
        if let Some(error) = &self.last_error {
            lines.push(format!("Last error: {}", error));
        }

        lines.join("\n")
    }
}

fn unknown_meeting(kind: &str, number: usize, available: usize) -> crate::error::Error {
    if available == 0 {
        input_error(&format!("There are no {} meetings to work on", kind))
    } else {
        input_error(&format!("No {} meeting number {} (choose 1-{})", kind, number, available))
    }
}

fn count(meetings: &[TrackedMeeting], status: &MeetingStatus) -> usize {
    meetings.iter().filter(|meeting| &meeting.status == status).count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflow::{classify, CancellationFailure};
    use chrono::{TimeZone, Utc};

    fn event(id: &str, recurring: bool) -> CalendarEvent {
        CalendarEvent {
            id: id.to_string(),
            title: format!("Meeting {}", id),
            start: Utc.with_ymd_and_hms(2024, 6, 3, 9, 0, 0).unwrap(),
            end: Utc.with_ymd_and_hms(2024, 6, 3, 10, 0, 0).unwrap(),
            all_day: false,
            recurring,
            attendees: Vec::new(),
            organizer: None,
        }
    }

    fn loaded() -> SessionState {
        let mut state = SessionState::default();
        state.set_range(TimeOffRange::parse("2024-06-01", "2024-06-07").unwrap());
        state.load(classify(vec![event("r1", true), event("o1", false), event("r2", true)]));
        state
    }

    #[test]
    fn cancellation_outcomes_update_statuses() {
        let mut state = loaded();
        state.apply_cancellation(&CancellationReport {
            cancelled: vec!["r1".to_string()],
            failed: vec![CancellationFailure {
                event_id: "r2".to_string(),
                title: "Meeting r2".to_string(),
                reason: "HTTP 500".to_string(),
            }],
        });

        assert_eq!(state.recurring[0].status, MeetingStatus::Cancelled);
        assert_eq!(state.recurring[1].status, MeetingStatus::Failed("HTTP 500".to_string()));
        let open: Vec<_> = state.open_recurring().into_iter().map(|e| e.id).collect();
        assert_eq!(open, vec!["r2"]);
    }

    #[test]
    fn one_off_numbers_are_one_based() {
        let state = loaded();
        assert_eq!(state.one_off(1).unwrap().event.id, "o1");
        assert!(state.one_off(0).is_err());
        assert!(state.one_off(2).is_err());
        assert_eq!(state.recurring(2).unwrap().event.id, "r2");
        assert!(state.recurring(3).is_err());
    }

    #[test]
    fn new_range_drops_fetched_meetings() {
        let mut state = loaded();
        state.set_range(TimeOffRange::parse("2024-07-01", "2024-07-02").unwrap());
        assert!(state.recurring.is_empty());
        assert!(!state.fetched);
    }

    #[test]
    fn summary_mentions_range_and_counts() {
        let summary = loaded().summary(&Tz::UTC);
        assert!(summary.contains("Not connected"));
        assert!(summary.contains("2024-06-01 to 2024-06-07 (7 days"));
        assert!(summary.contains("2 recurring (0 cancelled), 1 one-off (0 notified)"));
        assert!(summary.contains("Recurring 2: \"Meeting r2\""));
        assert!(summary.contains("One-off 1: \"Meeting o1\""));
    }
}
