pub mod flow;
pub mod models;
pub mod token;

pub use token::TokenManager;

use crate::config::Config;
use crate::error::AppResult;
use crate::workflow::{Account, Authenticator};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, warn};

/// Auth gate: signs the user in through the browser and keeps the token in
/// memory for the rest of the session
#[derive(Clone)]
pub struct GoogleAuth {
    config: Arc<RwLock<Config>>,
    tokens: TokenManager,
}

impl GoogleAuth {
    pub fn new(config: Arc<RwLock<Config>>, tokens: TokenManager) -> Self {
        Self { config, tokens }
    }
}

#[async_trait]
impl Authenticator for GoogleAuth {
    async fn authenticate(&self) -> AppResult<Account> {
        let (client_id, port) = {
            let config_read = self.config.read().await;
            (config_read.google_client_id.clone(), config_read.oauth_redirect_port)
        };

        // Generate random state for security
        let state = uuid::Uuid::new_v4().to_string();
        let redirect_uri = format!("http://localhost:{}", port);
        let auth_url = flow::authorization_url(&self.tokens.endpoints().auth_url, &client_id, &redirect_uri, &state)?;

        println!("Opening browser for Google authorization...");
        println!("If nothing opens, visit: {}", auth_url);
        if let Err(e) = webbrowser::open(auth_url.as_str()) {
            warn!("Could not open a browser: {}", e);
        }

        let code = flow::wait_for_code(port, state).await?;
        let token = self.tokens.exchange_code(&code, &redirect_uri).await?;
        self.tokens.set_token(token).await;

        let account = self.tokens.account().await?;
        info!("Authenticated as {}", account.email);
        Ok(account)
    }
}
