use crate::error::{input_error, AppResult};
use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

/// A calendar event as fetched for the current session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarEvent {
    pub id: String,
    pub title: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub all_day: bool,
    pub recurring: bool,
    pub attendees: Vec<Attendee>,
    pub organizer: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attendee {
    pub email: String,
    pub display_name: Option<String>,
    /// The signed-in user's own attendee entry
    pub is_self: bool,
}

impl Attendee {
    /// Display name, falling back to the local part of the address
    pub fn name(&self) -> String {
        match &self.display_name {
            Some(name) if !name.trim().is_empty() => name.trim().to_string(),
            _ => self.email.split('@').next().unwrap_or(&self.email).to_string(),
        }
    }
}

/// The signed-in account
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    pub email: String,
    pub name: Option<String>,
}

impl Account {
    /// Name used in signatures
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.email)
    }
}

/// An email ready to hand to the mail transport
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutgoingMail {
    pub to: Vec<String>,
    pub subject: String,
    pub body: String,
}

/// Inclusive range of days the user is away
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeOffRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl TimeOffRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> AppResult<Self> {
        if end < start {
            return Err(input_error(&format!(
                "Time off ends ({}) before it starts ({})",
                end, start
            )));
        }
        Ok(Self { start, end })
    }

    /// Parse a range from two YYYY-MM-DD strings
    pub fn parse(start: &str, end: &str) -> AppResult<Self> {
        let start = parse_date(start)?;
        let end = parse_date(end)?;
        Self::new(start, end)
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// Number of days covered, both ends included
    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }

    /// Half-open UTC window from local midnight of the first day to local
    /// midnight after the last day
    pub fn bounds(&self, tz: &Tz) -> AppResult<(DateTime<Utc>, DateTime<Utc>)> {
        let start = local_midnight(self.start, tz)?;
        let end = local_midnight(self.end + Duration::days(1), tz)?;
        Ok((start, end))
    }

    /// Whether an instant falls inside the window
    pub fn contains(&self, instant: &DateTime<Utc>, tz: &Tz) -> AppResult<bool> {
        let (start, end) = self.bounds(tz)?;
        Ok(*instant >= start && *instant < end)
    }
}

/// Parse a date in YYYY-MM-DD format
pub fn parse_date(value: &str) -> AppResult<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|_| input_error(&format!("Expected a date like 2024-06-01, got '{}'", value.trim())))
}

/// First instant of a day in the given zone. When a DST change skips
/// midnight the day starts at the first local time after the gap.
pub fn local_midnight(date: NaiveDate, tz: &Tz) -> AppResult<DateTime<Utc>> {
    let midnight = date
        .and_hms_opt(0, 0, 0)
        .ok_or_else(|| input_error("Failed to create datetime"))?;

    (0..MINUTES_PER_DAY)
        .map(|minute| midnight + Duration::minutes(minute))
        .find_map(|naive| tz.from_local_datetime(&naive).earliest())
        .map(|dt| dt.with_timezone(&Utc))
        .ok_or_else(|| input_error(&format!("No local time exists on {} in {}", date, tz)))
}

const MINUTES_PER_DAY: i64 = 24 * 60;
