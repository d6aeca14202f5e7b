use crate::config::Config;
use crate::error::{AppResult, Error};
use crate::session::transcript::{ConversationTurn, Role};
use crate::workflow::LanguageModel;
use async_trait::async_trait;
use rig::completion::{Chat, Message};
use rig::providers::openai::Client as OpenAiClient;
use tracing::{debug, info};

/// Chat model reached through rig's OpenAI-compatible provider
pub struct RigLanguageModel {
    client: OpenAiClient,
    model: String,
    temperature: f64,
    max_tokens: u64,
}

impl RigLanguageModel {
    pub fn new(config: &Config) -> Self {
        let client = match &config.openai_base_url {
            Some(base_url) => OpenAiClient::from_url(&config.openai_api_key, base_url),
            None => OpenAiClient::new(&config.openai_api_key),
        };
        info!("Using language model: {}", config.openai_model);

        Self {
            client,
            model: config.openai_model.clone(),
            temperature: config.llm_temperature,
            max_tokens: config.llm_max_tokens,
        }
    }
}

/// Transcript turns in rig's message form, oldest first
pub fn to_messages(history: &[ConversationTurn]) -> Vec<Message> {
    history
        .iter()
        .map(|turn| match turn.role {
            Role::User => Message::user(turn.text.clone()),
            Role::Assistant => Message::assistant(turn.text.clone()),
        })
        .collect()
}

#[async_trait]
impl LanguageModel for RigLanguageModel {
    async fn reply(&self, preamble: &str, history: &[ConversationTurn], message: &str) -> AppResult<String> {
        let agent = self
            .client
            .agent(&self.model)
            .preamble(preamble)
            .temperature(self.temperature)
            .max_tokens(self.max_tokens)
            .build();

        debug!("Sending chat with {} prior turns", history.len());

        let response = agent
            .chat(message.to_string(), to_messages(history))
            .await
            .map_err(|e| Error::LanguageModel(format!("Chat request failed: {}", e)))?;

        if response.trim().is_empty() {
            return Err(Error::MalformedResponse("Language model returned an empty reply".to_string()));
        }

        Ok(response)
    }
}
