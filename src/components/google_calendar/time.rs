use super::models::ApiEventTime;
use crate::error::{google_calendar_error, AppResult};
use crate::workflow::models::local_midnight;
use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;

/// Event boundary as a UTC instant, plus whether it was an all-day date.
/// All-day dates start at local midnight in the configured zone.
pub fn parse_event_time(time: &ApiEventTime, tz: &Tz) -> AppResult<(DateTime<Utc>, bool)> {
    if let Some(date_time) = &time.date_time {
        let dt = DateTime::parse_from_rfc3339(date_time)
            .map_err(|e| google_calendar_error(&format!("Failed to parse datetime '{}': {}", date_time, e)))?;
        Ok((dt.with_timezone(&Utc), false))
    } else if let Some(date) = &time.date {
        let date = NaiveDate::parse_from_str(date, "%Y-%m-%d")
            .map_err(|e| google_calendar_error(&format!("Failed to parse date '{}': {}", date, e)))?;
        Ok((local_midnight(date, tz)?, true))
    } else {
        Err(google_calendar_error("Event time has neither dateTime nor date"))
    }
}
