use super::models::{AccessToken, TokenResponse, UserInfo};
use crate::components::endpoints::GoogleEndpoints;
use crate::config::Config;
use crate::error::{auth_error, error_from_response, AppResult, Error};
use crate::workflow::Account;
use chrono::Utc;
use reqwest::Client;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};

/// Holds the session's Google credential. Nothing is written to disk; the
/// token lives as long as the process.
#[derive(Clone)]
pub struct TokenManager {
    config: Arc<RwLock<Config>>,
    endpoints: GoogleEndpoints,
    client: Client,
    token: Arc<RwLock<Option<AccessToken>>>,
    account: Arc<RwLock<Option<Account>>>,
}

impl TokenManager {
    pub fn new(config: Arc<RwLock<Config>>, endpoints: GoogleEndpoints) -> Self {
        Self {
            config,
            endpoints,
            client: Client::new(),
            token: Arc::new(RwLock::new(None)),
            account: Arc::new(RwLock::new(None)),
        }
    }

    pub fn endpoints(&self) -> &GoogleEndpoints {
        &self.endpoints
    }

    /// Whether a credential has been obtained this session
    pub async fn is_authenticated(&self) -> bool {
        self.token.read().await.is_some()
    }

    /// Current access token, refreshed first if it has expired
    pub async fn access_token(&self) -> AppResult<String> {
        let current = self.token.read().await.clone();
        let token = current.ok_or_else(|| auth_error("Not connected to Google yet"))?;

        if !token.is_expired(Utc::now()) {
            return Ok(token.access_token);
        }

        let refresh_token = token
            .refresh_token
            .ok_or_else(|| auth_error("Access token expired and no refresh token is available"))?;

        let refreshed = self.refresh_token(&refresh_token).await?;
        let access_token = refreshed.access_token.clone();
        *self.token.write().await = Some(refreshed);
        Ok(access_token)
    }

    /// Exchange an authorization code for a token
    pub async fn exchange_code(&self, code: &str, redirect_uri: &str) -> AppResult<AccessToken> {
        let (client_id, client_secret) = self.client_credentials().await;

        let response = self
            .client
            .post(&self.endpoints.token_url)
            .form(&[
                ("client_id", client_id),
                ("client_secret", client_secret),
                ("code", code.to_string()),
                ("redirect_uri", redirect_uri.to_string()),
                ("grant_type", "authorization_code".to_string()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(error_from_response("Google OAuth", response).await);
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| Error::MalformedResponse(format!("Failed to parse token response: {}", e)))?;

        info!("Obtained Google access token");
        Ok(AccessToken::from_response(token, None, Utc::now()))
    }

    /// Refresh an expired token
    async fn refresh_token(&self, refresh_token: &str) -> AppResult<AccessToken> {
        let (client_id, client_secret) = self.client_credentials().await;

        let params = [
            ("client_id", client_id),
            ("client_secret", client_secret),
            ("refresh_token", refresh_token.to_string()),
            ("grant_type", "refresh_token".to_string()),
        ];

        let response = self
            .client
            .post(&self.endpoints.token_url)
            .form(&params)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(error_from_response("Google OAuth", response).await);
        }

        let new_token: TokenResponse = response
            .json()
            .await
            .map_err(|e| Error::MalformedResponse(format!("Failed to parse token response: {}", e)))?;

        debug!("Refreshed Google access token");
        Ok(AccessToken::from_response(new_token, Some(refresh_token.to_string()), Utc::now()))
    }

    /// Store a token for the rest of the session
    pub async fn set_token(&self, token: AccessToken) {
        *self.token.write().await = Some(token);
        *self.account.write().await = None;
    }

    /// The signed-in account, looked up once per credential
    pub async fn account(&self) -> AppResult<Account> {
        if let Some(account) = self.account.read().await.clone() {
            return Ok(account);
        }

        let access_token = self.access_token().await?;

        let response = self
            .client
            .get(&self.endpoints.userinfo_url)
            .bearer_auth(access_token)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(error_from_response("Google userinfo", response).await);
        }

        let info: UserInfo = response
            .json()
            .await
            .map_err(|e| Error::MalformedResponse(format!("Failed to parse userinfo response: {}", e)))?;

        let account = Account {
            email: info.email,
            name: info.name,
        };
        *self.account.write().await = Some(account.clone());
        Ok(account)
    }

    async fn client_credentials(&self) -> (String, String) {
        let config_read = self.config.read().await;
        (
            config_read.google_client_id.clone(),
            config_read.google_client_secret.clone(),
        )
    }
}
