use super::models::EventsPage;
use crate::components::google_auth::TokenManager;
use crate::config::Config;
use crate::error::{error_from_response, google_calendar_error, AppResult, Error};
use crate::workflow::{CalendarEvent, TimeOffRange};
use reqwest::Client;
use std::sync::Arc;
use tokio::sync::{mpsc, RwLock};
use tracing::{debug, info, warn};
use url::Url;

/// Upper bound on pages fetched for one range
const MAX_PAGES: usize = 20;

/// The Google Calendar actor that processes messages
pub struct GoogleCalendarActor {
    config: Arc<RwLock<Config>>,
    token_manager: TokenManager,
    client: Client,
    command_rx: mpsc::Receiver<GoogleCalendarCommand>,
}

/// Commands that can be sent to the Google Calendar actor
pub enum GoogleCalendarCommand {
    ListEvents(TimeOffRange, mpsc::Sender<AppResult<Vec<CalendarEvent>>>),
    CancelEvent {
        event_id: String,
        notify_attendees: bool,
        response_tx: mpsc::Sender<AppResult<()>>,
    },
    Shutdown,
}

/// Handle for communicating with the Google Calendar actor
#[derive(Clone)]
pub struct GoogleCalendarActorHandle {
    command_tx: mpsc::Sender<GoogleCalendarCommand>,
}

impl GoogleCalendarActorHandle {
    /// List events starting inside the range
    pub async fn list_events(&self, range: TimeOffRange) -> AppResult<Vec<CalendarEvent>> {
        let (response_tx, mut response_rx) = mpsc::channel(1);
        self.command_tx
            .send(GoogleCalendarCommand::ListEvents(range, response_tx))
            .await
            .map_err(|e| google_calendar_error(&format!("Actor mailbox error: {}", e)))?;

        response_rx
            .recv()
            .await
            .ok_or_else(|| google_calendar_error("Response channel closed"))?
    }

    /// Cancel one event
    pub async fn cancel_event(&self, event_id: &str, notify_attendees: bool) -> AppResult<()> {
        let (response_tx, mut response_rx) = mpsc::channel(1);
        self.command_tx
            .send(GoogleCalendarCommand::CancelEvent {
                event_id: event_id.to_string(),
                notify_attendees,
                response_tx,
            })
            .await
            .map_err(|e| google_calendar_error(&format!("Actor mailbox error: {}", e)))?;

        response_rx
            .recv()
            .await
            .ok_or_else(|| google_calendar_error("Response channel closed"))?
    }

    /// Shutdown the actor
    pub async fn shutdown(&self) -> AppResult<()> {
        let _ = self.command_tx.send(GoogleCalendarCommand::Shutdown).await;
        Ok(())
    }
}

impl GoogleCalendarActor {
    /// Create a new actor and return its handle
    pub fn new(config: Arc<RwLock<Config>>, token_manager: TokenManager) -> (Self, GoogleCalendarActorHandle) {
        let (command_tx, command_rx) = mpsc::channel(32);

        let actor = Self {
            config,
            token_manager,
            client: Client::new(),
            command_rx,
        };

        let handle = GoogleCalendarActorHandle { command_tx };

        (actor, handle)
    }

    /// Start the actor's processing loop
    pub async fn run(&mut self) {
        info!("Google Calendar actor started");

        while let Some(cmd) = self.command_rx.recv().await {
            match cmd {
                GoogleCalendarCommand::ListEvents(range, response_tx) => {
                    let result = self.list_events(&range).await;
                    let _ = response_tx.send(result).await;
                }
                GoogleCalendarCommand::CancelEvent {
                    event_id,
                    notify_attendees,
                    response_tx,
                } => {
                    let result = self.cancel_event(&event_id, notify_attendees).await;
                    let _ = response_tx.send(result).await;
                }
                GoogleCalendarCommand::Shutdown => {
                    info!("Google Calendar actor shutting down");
                    break;
                }
            }
        }

        info!("Google Calendar actor shut down");
    }

    fn events_url(&self, calendar_id: &str) -> AppResult<Url> {
        let mut url = Url::parse(&self.token_manager.endpoints().calendar_api)
            .map_err(|e| google_calendar_error(&format!("Failed to parse URL: {}", e)))?;
        url.path_segments_mut()
            .map_err(|_| google_calendar_error("Calendar API URL cannot be a base"))?
            .pop_if_empty()
            .extend(["calendars", calendar_id, "events"]);
        Ok(url)
    }

    /// Fetch every page for the range and keep events that start inside it
    async fn list_events(&self, range: &TimeOffRange) -> AppResult<Vec<CalendarEvent>> {
        let (calendar_id, tz) = {
            let config_read = self.config.read().await;
            (config_read.google_calendar_id.clone(), config_read.tz()?)
        };

        let access_token = self.token_manager.access_token().await?;
        let (time_min, time_max) = range.bounds(&tz)?;

        let mut events = Vec::new();
        let mut page_token: Option<String> = None;

        for page_number in 1..=MAX_PAGES {
            let mut url = self.events_url(&calendar_id)?;
            {
                let mut query = url.query_pairs_mut();
                query
                    .append_pair("timeMin", &time_min.to_rfc3339())
                    .append_pair("timeMax", &time_max.to_rfc3339())
                    .append_pair("singleEvents", "true")
                    .append_pair("orderBy", "startTime")
                    .append_pair("maxResults", "250");
                if let Some(token) = &page_token {
                    query.append_pair("pageToken", token);
                }
            }

            let response = self.client.get(url).bearer_auth(&access_token).send().await?;

            if !response.status().is_success() {
                return Err(error_from_response("Google Calendar", response).await);
            }

            let page: EventsPage = response
                .json()
                .await
                .map_err(|e| Error::MalformedResponse(format!("Failed to parse events response: {}", e)))?;

            debug!("Fetched {} events", page.items.len());

            for item in page.items {
                if let Some(event) = item.into_event(&tz)? {
                    // The API matches on overlap; only starts inside the range count
                    if range.contains(&event.start, &tz)? {
                        events.push(event);
                    }
                }
            }

            match page.next_page_token {
                Some(_) if page_number == MAX_PAGES => {
                    warn!("Stopped after {} pages, later events were not fetched", MAX_PAGES);
                    return Err(google_calendar_error(&format!(
                        "More than {} pages of events in the range, try a shorter range",
                        MAX_PAGES
                    )));
                }
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        info!("Found {} events between {} and {}", events.len(), range.start(), range.end());
        Ok(events)
    }

    /// Delete a single event or a single instance of a series
    async fn cancel_event(&self, event_id: &str, notify_attendees: bool) -> AppResult<()> {
        let calendar_id = {
            let config_read = self.config.read().await;
            config_read.google_calendar_id.clone()
        };

        let access_token = self.token_manager.access_token().await?;

        let mut url = self.events_url(&calendar_id)?;
        url.path_segments_mut()
            .map_err(|_| google_calendar_error("Calendar API URL cannot be a base"))?
            .push(event_id);
        url.query_pairs_mut()
            .append_pair("sendUpdates", if notify_attendees { "all" } else { "none" });

        let response = self.client.delete(url).bearer_auth(&access_token).send().await?;

        // 410 means the event is already gone, which is what we wanted
        if response.status().is_success() || response.status().as_u16() == 410 {
            Ok(())
        } else {
            Err(error_from_response("Google Calendar", response).await)
        }
    }
}
