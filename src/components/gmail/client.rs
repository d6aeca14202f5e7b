use super::mime::{build_message, encode_raw};
use crate::components::google_auth::TokenManager;
use crate::error::{error_from_response, AppResult, Error};
use crate::workflow::{MailTransport, OutgoingMail};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, info};

#[derive(Debug, Deserialize)]
struct SentMessage {
    id: String,
}

/// Sends mail as the signed-in user through the Gmail API
#[derive(Clone)]
pub struct GmailClient {
    tokens: TokenManager,
    client: Client,
}

impl GmailClient {
    pub fn new(tokens: TokenManager) -> Self {
        Self {
            tokens,
            client: Client::new(),
        }
    }
}

#[async_trait]
impl MailTransport for GmailClient {
    async fn send(&self, mail: &OutgoingMail) -> AppResult<()> {
        let access_token = self.tokens.access_token().await?;
        let from = self.tokens.account().await?.email;

        let message = build_message(&from, mail)?;
        let url = format!("{}/users/me/messages/send", self.tokens.endpoints().gmail_api);
        debug!("Sending mail to {} recipients", mail.to.len());

        let response = self
            .client
            .post(&url)
            .bearer_auth(&access_token)
            .json(&json!({ "raw": encode_raw(&message) }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(error_from_response("Gmail", response).await);
        }

        let sent: SentMessage = response
            .json()
            .await
            .map_err(|e| Error::MalformedResponse(format!("Failed to parse send response: {}", e)))?;

        info!(message_id = %sent.id, "Mail accepted by Gmail");
        Ok(())
    }
}
