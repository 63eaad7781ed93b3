//! OpenAI vision provider implementation.
//!
//! Sends an image URL to the chat completions API and returns the model's
//! short-format answer naming the installation and artist.

use super::{ProviderError, VisionProvider};
use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};

/// OpenAI API base URL.
const OPENAI_API_BASE: &str = "https://api.openai.com/v1";

/// Model used for image understanding.
const VISION_MODEL: &str = "gpt-4o";

/// Fixed instruction constraining the answer format. The identity parser
/// depends on this exact `installation_name by artist` shape.
const IDENTIFY_PROMPT: &str = "what is the name of this art piece and artist? \
     only give in this format: `installation_name by artist`";

const MAX_IDENTIFY_TOKENS: u32 = 300;

/// Vision provider backed by OpenAI chat completions.
pub struct OpenAiVisionProvider {
    api_key: Secret<String>,
    base_url: String,
    client: Client,
}

impl OpenAiVisionProvider {
    pub fn new(api_key: Secret<String>) -> Self {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(120))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            api_key,
            base_url: OPENAI_API_BASE.to_string(),
            client,
        }
    }

    /// Override the API base URL. Used by tests to point the client at a
    /// local mock server.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[async_trait]
impl VisionProvider for OpenAiVisionProvider {
    async fn identify_installation(&self, image_url: &str) -> Result<String, ProviderError> {
        let request = ChatCompletionRequest {
            model: VISION_MODEL,
            messages: vec![Message {
                role: "user",
                content: vec![
                    ContentPart::Text {
                        text: IDENTIFY_PROMPT.to_string(),
                    },
                    ContentPart::ImageUrl {
                        image_url: ImageRef {
                            url: image_url.to_string(),
                        },
                    },
                ],
            }],
            max_tokens: MAX_IDENTIFY_TOKENS,
        };

        let url = format!("{}/chat/completions", self.base_url);

        tracing::debug!(
            model = VISION_MODEL,
            image_url = %image_url,
            "Sending identification request to OpenAI"
        );

        let response = self
            .client
            .post(&url)
            .bearer_auth(self.api_key.expose_secret())
            .json(&request)
            .send()
            .await
            .map_err(|e| ProviderError::NetworkError(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();

            if status.as_u16() == 429 {
                return Err(ProviderError::RateLimited);
            }

            return Err(ProviderError::ApiError(format!(
                "OpenAI API error {}: {}",
                status, error_text
            )));
        }

        let api_response: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::InvalidResponse(format!("Failed to parse response: {}", e)))?;

        api_response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| {
                ProviderError::InvalidResponse("response contained no message content".to_string())
            })
    }
}

// ============================================================================
// OpenAI API Request/Response Types
// ============================================================================

#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: &'static str,
    messages: Vec<Message>,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct Message {
    role: &'static str,
    content: Vec<ContentPart>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentPart {
    Text { text: String },
    ImageUrl { image_url: ImageRef },
}

#[derive(Debug, Serialize)]
struct ImageRef {
    url: String,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}
