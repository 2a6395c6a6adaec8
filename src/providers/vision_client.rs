//! Vision-capable chat completion client (OpenAI-compatible API)

use super::{read_credential, DescriptionGenerator, UpstreamError};
use crate::config::VisionConfig;
use crate::metrics::{provider, METRICS};
use crate::pipeline::models::StoredImage;
use async_trait::async_trait;
use reqwest::Client;
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, error};

/// Describes images through `POST {base_url}/chat/completions`
pub struct VisionDescriber {
    http: Client,
    endpoint: String,
    config: VisionConfig,
}

impl VisionDescriber {
    pub fn new(config: VisionConfig) -> Result<Self, UpstreamError> {
        let http = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| UpstreamError::Unavailable(e.to_string()))?;

        let endpoint = format!("{}/chat/completions", config.base_url.trim_end_matches('/'));

        Ok(Self {
            http,
            endpoint,
            config,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn call_completions(&self, image: &StoredImage) -> Result<String, UpstreamError> {
        let api_key = read_credential(&self.config.api_key_env)?;

        let body = ChatRequest {
            model: &self.config.model,
            messages: vec![ChatMessage {
                role: "user",
                content: vec![
                    ContentPart::Text {
                        text: &self.config.prompt,
                    },
                    ContentPart::ImageUrl {
                        image_url: ImageUrl { url: &image.data },
                    },
                ],
            }],
        };

        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(api_key.expose_secret())
            .json(&body)
            .send()
            .await
            .map_err(UpstreamError::from_transport)?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "<body unavailable>".to_string());
            return Err(UpstreamError::from_status(status, &error_text));
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(UpstreamError::from_transport)?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or_else(|| {
                UpstreamError::InvalidResponse("completion has no message content".to_string())
            })
    }
}

#[async_trait]
impl DescriptionGenerator for VisionDescriber {
    async fn describe(&self, image: &StoredImage) -> Result<String, UpstreamError> {
        let start = Instant::now();
        debug!(model = %self.config.model, image_length = image.length, "Requesting image description");

        let result = self.call_completions(image).await;
        METRICS.record_upstream(provider::VISION, result.is_ok(), start.elapsed().as_secs_f64());

        if let Err(e) = &result {
            error!(error = %e, "Vision provider call failed");
        }
        result
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: Vec<ContentPart<'a>>,
}

#[derive(Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentPart<'a> {
    Text { text: &'a str },
    ImageUrl { image_url: ImageUrl<'a> },
}

#[derive(Serialize)]
struct ImageUrl<'a> {
    url: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: AssistantMessage,
}

#[derive(Debug, Deserialize)]
struct AssistantMessage {
    #[serde(default)]
    content: Option<String>,
}
