use super::models::CalendarEvent;
use super::providers::CalendarProvider;
use tracing::{info, warn};

/// Outcome of cancelling a batch of recurring events
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CancellationReport {
    /// IDs of the events that were cancelled
    pub cancelled: Vec<String>,
    pub failed: Vec<CancellationFailure>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CancellationFailure {
    pub event_id: String,
    pub title: String,
    pub reason: String,
}

impl CancellationReport {
    pub fn attempted(&self) -> usize {
        self.cancelled.len() + self.failed.len()
    }

    pub fn is_complete_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Cancel each event in turn. A failure is recorded against its event and the
/// remaining events are still attempted.
pub async fn cancel_all(
    calendar: &dyn CalendarProvider,
    events: &[CalendarEvent],
    notify_attendees: bool,
) -> CancellationReport {
    let mut report = CancellationReport::default();

    for event in events {
        match calendar.cancel_event(&event.id, notify_attendees).await {
            Ok(()) => {
                info!(event_id = %event.id, "Cancelled event");
                report.cancelled.push(event.id.clone());
            }
            Err(e) => {
                warn!(event_id = %event.id, error = %e, "Failed to cancel event");
                report.failed.push(CancellationFailure {
                    event_id: event.id.clone(),
                    title: event.title.clone(),
                    reason: e.to_string(),
                });
            }
        }
    }

    report
}
