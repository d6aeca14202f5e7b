use super::models::CalendarEvent;

/// Fetched events split by the provider's recurrence flag
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClassifiedEvents {
    pub recurring: Vec<CalendarEvent>,
    pub one_off: Vec<CalendarEvent>,
}

impl ClassifiedEvents {
    pub fn len(&self) -> usize {
        self.recurring.len() + self.one_off.len()
    }

    pub fn is_empty(&self) -> bool {
        self.recurring.is_empty() && self.one_off.is_empty()
    }
}

/// Partition events into recurring and one-off, keeping their order
pub fn classify(events: Vec<CalendarEvent>) -> ClassifiedEvents {
    let (recurring, one_off) = events.into_iter().partition(|event| event.recurring);
    ClassifiedEvents { recurring, one_off }
}
