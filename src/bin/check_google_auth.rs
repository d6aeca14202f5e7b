//! Runs the Google consent flow once and prints the signed-in account.
//! Useful for checking the OAuth client setup before starting a session.

use meeting_rescheduler::components::google_auth::{GoogleAuth, TokenManager};
use meeting_rescheduler::components::GoogleEndpoints;
use meeting_rescheduler::startup;
use meeting_rescheduler::workflow::Authenticator;
use std::sync::Arc;

#[tokio::main]
async fn main() -> miette::Result<()> {
    startup::init_logging()?;

    let config = startup::load_config().await?;
    let tokens = TokenManager::new(Arc::clone(&config), GoogleEndpoints::default());
    let auth = GoogleAuth::new(config, tokens);

    let account = auth.authenticate().await?;

    println!("Signed in as {}", account.email);
    if let Some(name) = &account.name {
        println!("Name: {}", name);
    }
    println!("Calendar, Gmail send and userinfo scopes were granted.");

    Ok(())
}
