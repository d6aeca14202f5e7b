use meeting_rescheduler::startup;
use tracing::info;

#[tokio::main]
async fn main() -> miette::Result<()> {
    // Initialize logging
    startup::init_logging()?;

    info!("Starting meeting rescheduler");

    // Load configuration
    let config = startup::load_config().await?;

    // Run the chat session
    startup::run_session(config).await
}
