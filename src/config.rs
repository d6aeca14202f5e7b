use crate::error::{config_error, env_error, AppResult};
use crate::workflow::templates::MessageTemplate;
use chrono_tz::Tz;
use dotenvy::dotenv;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::Path;

/// Default location of the optional template overrides
pub const TEMPLATES_FILE: &str = "config/rescheduler.toml";

/// Default language model
pub const DEFAULT_MODEL: &str = "gpt-4";

/// Main configuration structure for the assistant
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Google OAuth client ID
    pub google_client_id: String,
    /// Google OAuth client secret
    pub google_client_secret: String,
    /// Google Calendar ID to manage
    pub google_calendar_id: String,
    /// API key for the hosted language model
    pub openai_api_key: String,
    /// Model name used for completions
    pub openai_model: String,
    /// Alternative OpenAI-compatible endpoint
    pub openai_base_url: Option<String>,
    /// Sampling temperature for the model
    pub llm_temperature: f64,
    /// Completion length limit
    pub llm_max_tokens: u64,
    /// Timezone used to interpret date ranges and render times
    pub timezone: String,
    /// Loopback port for the OAuth redirect
    pub oauth_redirect_port: u16,
    /// Locale for chat messages
    pub bot_locale: String,
    /// Name used to sign outgoing emails
    pub sender_name: Option<String>,
    /// Templates for outgoing messages
    pub templates: TemplateConfig,
}

/// Message templates, overridable from the config file
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TemplateConfig {
    #[serde(default)]
    pub one_off: MessageTemplate,
}

impl Config {
    /// Load configuration from environment and config file
    pub fn load() -> AppResult<Self> {
        // Load .env file if it exists
        dotenv().ok();

        let google_client_id = env::var("GOOGLE_CLIENT_ID").map_err(|_| env_error("GOOGLE_CLIENT_ID"))?;
        let google_client_secret =
            env::var("GOOGLE_CLIENT_SECRET").map_err(|_| env_error("GOOGLE_CLIENT_SECRET"))?;
        let openai_api_key = env::var("OPENAI_API_KEY").map_err(|_| env_error("OPENAI_API_KEY"))?;

        let google_calendar_id = env::var("GOOGLE_CALENDAR_ID").unwrap_or_else(|_| String::from("primary"));
        let openai_model = env::var("OPENAI_MODEL").unwrap_or_else(|_| String::from(DEFAULT_MODEL));
        let openai_base_url = env::var("OPENAI_BASE_URL").ok().filter(|url| !url.trim().is_empty());

        let llm_temperature = match env::var("LLM_TEMPERATURE") {
            Ok(value) => value
                .parse::<f64>()
                .map_err(|_| env_error("Invalid LLM_TEMPERATURE format"))?,
            Err(_) => 0.7,
        };

        let llm_max_tokens = match env::var("LLM_MAX_TOKENS") {
            Ok(value) => value
                .parse::<u64>()
                .map_err(|_| env_error("Invalid LLM_MAX_TOKENS format"))?,
            Err(_) => 1000,
        };

        let oauth_redirect_port = match env::var("OAUTH_REDIRECT_PORT") {
            Ok(value) => value
                .parse::<u16>()
                .map_err(|_| env_error("Invalid OAUTH_REDIRECT_PORT format"))?,
            Err(_) => 8080,
        };

        let timezone = env::var("TIMEZONE").unwrap_or_else(|_| String::from("UTC"));
        let bot_locale = env::var("BOT_LOCALE").unwrap_or_else(|_| String::from("en"));
        let sender_name = env::var("SENDER_NAME").ok().filter(|name| !name.trim().is_empty());

        let templates = Self::load_templates(Path::new(TEMPLATES_FILE))?;

        let config = Config {
            google_client_id,
            google_client_secret,
            google_calendar_id,
            openai_api_key,
            openai_model,
            openai_base_url,
            llm_temperature,
            llm_max_tokens,
            timezone,
            oauth_redirect_port,
            bot_locale,
            sender_name,
            templates,
        };

        // Fail early on a bad timezone instead of on the first date range
        config.tz()?;

        Ok(config)
    }

    /// Load template overrides, falling back to the built-in templates
    pub fn load_templates(path: &Path) -> AppResult<TemplateConfig> {
        match fs::read_to_string(path) {
            Ok(content) => Self::parse_templates(&content),
            Err(_) => Ok(TemplateConfig::default()),
        }
    }

    /// Parse template overrides from TOML
    pub fn parse_templates(content: &str) -> AppResult<TemplateConfig> {
        let templates: TemplateConfig = toml::from_str(content)?;
        templates.one_off.validate()?;
        Ok(templates)
    }

    /// Parsed timezone
    pub fn tz(&self) -> AppResult<Tz> {
        self.timezone
            .parse::<Tz>()
            .map_err(|_| config_error(&format!("Unknown timezone: {}", self.timezone)))
    }
}
