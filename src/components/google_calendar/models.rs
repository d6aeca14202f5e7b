use super::time::parse_event_time;
use crate::error::AppResult;
use crate::workflow::{Attendee, CalendarEvent};
use chrono_tz::Tz;
use serde::Deserialize;

/// One page of `events.list`
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct EventsPage {
    #[serde(default)]
    pub items: Vec<ApiEvent>,
    #[serde(default)]
    pub next_page_token: Option<String>,
}

/// Calendar event as returned by the API
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ApiEvent {
    pub id: String,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub start: Option<ApiEventTime>,
    #[serde(default)]
    pub end: Option<ApiEventTime>,
    /// RRULE/EXDATE lines on a series master
    #[serde(default)]
    pub recurrence: Option<Vec<String>>,
    /// Set on every instance of a recurring series
    #[serde(default)]
    pub recurring_event_id: Option<String>,
    #[serde(default)]
    pub attendees: Vec<ApiAttendee>,
    #[serde(default)]
    pub organizer: Option<ApiPerson>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ApiEventTime {
    #[serde(default)]
    pub date_time: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ApiAttendee {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default, rename = "self")]
    pub is_self: bool,
    /// Meeting rooms and other resources
    #[serde(default)]
    pub resource: bool,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ApiPerson {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default, rename = "self")]
    pub is_self: bool,
}

impl ApiEvent {
    /// Recurring if it is an instance of a series or a series itself
    pub fn is_recurring(&self) -> bool {
        self.recurring_event_id.is_some()
            || self.recurrence.as_ref().is_some_and(|rules| !rules.is_empty())
    }

    /// Convert into the session model. Cancelled entries and entries without
    /// a start are dropped.
    pub fn into_event(self, tz: &Tz) -> AppResult<Option<CalendarEvent>> {
        if self.status.as_deref() == Some("cancelled") {
            return Ok(None);
        }
        let (Some(start), Some(end)) = (&self.start, &self.end) else {
            return Ok(None);
        };

        let (start, all_day) = parse_event_time(start, tz)?;
        let (end, _) = parse_event_time(end, tz)?;
        let recurring = self.is_recurring();

        let attendees = self
            .attendees
            .into_iter()
            .filter(|attendee| !attendee.resource)
            .filter_map(|attendee| {
                attendee.email.map(|email| Attendee {
                    email,
                    display_name: attendee.display_name,
                    is_self: attendee.is_self,
                })
            })
            .collect();

        let organizer = self
            .organizer
            .filter(|person| !person.is_self)
            .and_then(|person| person.email);

        Ok(Some(CalendarEvent {
            id: self.id,
            title: self
                .summary
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| "(untitled)".to_string()),
            start,
            end,
            all_day,
            recurring,
            attendees,
            organizer,
        }))
    }
}
