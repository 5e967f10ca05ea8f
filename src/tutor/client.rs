use reqwest::Client;
use std::time::Duration;
use tracing::{debug, info, warn};

use super::wire::{ChatMessage, ChatRequest, ChatResponse};
use crate::config::TutorConfig;
use crate::error::TutorError;

/// System instruction sent with every question
pub const TUTOR_SYSTEM_PROMPT: &str = "You are an astrophysics tutor guiding students through black hole simulations. Ask questions and give suggestions to help them think like a scientist.";

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Chat-completion client, created once at startup and read-only afterwards
#[derive(Debug, Clone)]
pub struct TutorClient {
    http: Client,
    config: TutorConfig,
}

impl TutorClient {
    pub fn new(config: TutorConfig) -> Self {
        Self {
            http: Client::builder()
                .connect_timeout(CONNECT_TIMEOUT)
                .timeout(config.timeout)
                .build()
                .unwrap_or_default(),
            config,
        }
    }

    /// Whether a credential was found at startup
    pub fn has_api_key(&self) -> bool {
        self.config.api_key.is_some()
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }

    /// Ask the tutor. Never fails: any error comes back as `"Error: <reason>"`.
    pub async fn ask(&self, prompt: &str) -> String {
        match self.complete(prompt).await {
            Ok(reply) => reply,
            Err(e) => {
                warn!("Tutor request failed: {}", e);
                format!("Error: {}", e)
            }
        }
    }

    fn request_body(&self, prompt: &str) -> ChatRequest {
        ChatRequest {
            model: self.config.model.clone(),
            messages: vec![
                ChatMessage::system(TUTOR_SYSTEM_PROMPT),
                ChatMessage::user(prompt),
            ],
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'))
    }

    async fn complete(&self, prompt: &str) -> Result<String, TutorError> {
        let api_key = self.config.api_key.as_deref().ok_or(TutorError::MissingApiKey)?;

        info!("Asking tutor ({})", self.config.model);
        debug!("Prompt: {}", prompt);

        let response = self
            .http
            .post(self.endpoint())
            .bearer_auth(api_key)
            .timeout(self.config.timeout)
            .json(&self.request_body(prompt))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TutorError::Status { status, body });
        }

        response.json::<ChatResponse>().await?.into_reply()
    }
}
