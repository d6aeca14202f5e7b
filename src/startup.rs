use crate::components::google_calendar::GoogleCalendar;
use crate::components::google_auth::{GoogleAuth, TokenManager};
use crate::components::{ComponentManager, GmailClient, GoogleEndpoints, RigLanguageModel};
use crate::config::Config;
use crate::error::{other_error, Error};
use crate::session::{Outcome, Services, Session};
use crate::shutdown;
use crate::workflow::NotificationComposer;
use std::future::Future;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::{oneshot, RwLock};
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Initialize logging with environment-based configuration. Output goes to
/// stderr so it stays out of the chat.
pub fn init_logging() -> miette::Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("warn,meeting_rescheduler=info")),
        )
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| Error::Other(format!("Failed to set up logging: {}", e)))?;

    Ok(())
}

/// Load and initialize the application config
pub async fn load_config() -> miette::Result<Arc<RwLock<Config>>> {
    match Config::load() {
        Ok(config) => Ok(Arc::new(RwLock::new(config))),
        Err(e) => {
            error!("Failed to load configuration: {:?}", e);
            Err(e.into())
        }
    }
}

/// Build the services and run the chat loop on stdin/stdout
pub async fn run_session(config: Arc<RwLock<Config>>) -> miette::Result<()> {
    let (timezone, sender_name, template, model) = {
        let config_read = config.read().await;
        rust_i18n::set_locale(&config_read.bot_locale);
        info!("Setting locale to {}", config_read.bot_locale);
        (
            config_read.tz()?,
            config_read.sender_name.clone(),
            config_read.templates.one_off.clone(),
            RigLanguageModel::new(&config_read),
        )
    };

    let tokens = TokenManager::new(Arc::clone(&config), GoogleEndpoints::default());

    // Initialize component manager
    let mut component_manager = ComponentManager::new(Arc::clone(&config));
    component_manager.register(GoogleCalendar::new());
    component_manager.init_all(tokens.clone()).await?;

    let calendar = component_manager
        .get_component_by_name("google_calendar")
        .and_then(|component| component.as_any().downcast_ref::<GoogleCalendar>())
        .ok_or_else(|| other_error("Google Calendar component is not registered"))?
        .get_handle()
        .await
        .ok_or_else(|| other_error("Google Calendar component has no handle"))?;

    let services = Services {
        auth: Arc::new(GoogleAuth::new(Arc::clone(&config), tokens.clone())),
        calendar: Arc::new(calendar),
        mail: Arc::new(GmailClient::new(tokens)),
        model: Arc::new(model),
    };

    let mut session = Session::new(services, NotificationComposer::new(template), timezone, sender_name);

    // Create shutdown channel
    let (shutdown_send, mut shutdown_recv) = oneshot::channel();
    tokio::spawn(async move {
        shutdown::handle_signals(shutdown_send).await;
    });

    let result = chat_loop(&mut session, &mut shutdown_recv).await;

    if let Err(e) = component_manager.shutdown_all().await {
        error!("Error shutting down components: {:?}", e);
    } else {
        info!("All components shut down successfully");
    }

    result.map_err(Into::into)
}

async fn chat_loop(session: &mut Session, shutdown_recv: &mut oneshot::Receiver<()>) -> Result<(), Error> {
    let mut stdout = tokio::io::stdout();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    write_out(&mut stdout, &format!("{}\n", session.greeting())).await?;

    loop {
        write_out(&mut stdout, "> ").await?;

        let Some(line) = until_shutdown(lines.next_line(), shutdown_recv).await else {
            return Ok(());
        };

        // End of input
        let Some(line) = line? else {
            return Ok(());
        };

        // Sign-in can wait minutes for the browser, so a signal must cut it short
        let Some(outcome) = until_shutdown(session.handle_input(&line), shutdown_recv).await else {
            return Ok(());
        };

        match outcome {
            Outcome::Reply(reply) => write_out(&mut stdout, &format!("\n{}\n\n", reply)).await?,
            Outcome::Quit => return Ok(()),
            Outcome::Ignored => {}
        }
    }
}

/// Run a future unless a shutdown signal arrives first
async fn until_shutdown<F: Future>(future: F, shutdown_recv: &mut oneshot::Receiver<()>) -> Option<F::Output> {
    tokio::select! {
        output = future => Some(output),
        _ = &mut *shutdown_recv => {
            info!("Received shutdown signal, ending session");
            None
        }
    }
}

async fn write_out(stdout: &mut tokio::io::Stdout, text: &str) -> Result<(), Error> {
    stdout.write_all(text.as_bytes()).await?;
    stdout.flush().await?;
    Ok(())
}
