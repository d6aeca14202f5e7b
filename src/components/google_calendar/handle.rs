use super::actor::{GoogleCalendarActor, GoogleCalendarActorHandle};
use crate::components::google_auth::TokenManager;
use crate::config::Config;
use crate::error::AppResult;
use crate::workflow::{CalendarEvent, CalendarProvider, TimeOffRange};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;

/// Handle for interacting with the Google Calendar actor
#[derive(Clone)]
pub struct GoogleCalendarHandle {
    actor_handle: GoogleCalendarActorHandle,
    _actor_task: Arc<JoinHandle<()>>,
}

impl GoogleCalendarHandle {
    /// Create a new GoogleCalendarHandle and spawn the actor
    pub fn new(config: Arc<RwLock<Config>>, token_manager: TokenManager) -> Self {
        let (mut actor, handle) = GoogleCalendarActor::new(config, token_manager);

        let actor_task = tokio::spawn(async move {
            actor.run().await;
        });

        Self {
            actor_handle: handle,
            _actor_task: Arc::new(actor_task),
        }
    }

    /// Shutdown the actor
    pub async fn shutdown(&self) -> AppResult<()> {
        self.actor_handle.shutdown().await
    }
}

#[async_trait]
impl CalendarProvider for GoogleCalendarHandle {
    async fn list_events(&self, range: &TimeOffRange) -> AppResult<Vec<CalendarEvent>> {
        self.actor_handle.list_events(*range).await
    }

    async fn cancel_event(&self, event_id: &str, notify_attendees: bool) -> AppResult<()> {
        self.actor_handle.cancel_event(event_id, notify_attendees).await
    }
}
