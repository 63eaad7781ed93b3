//! Cohere knowledge provider implementation.
//!
//! Uses the chat API with the web-search connector to fetch grounded
//! descriptions and follow-up answers. Supports both blocking and streaming
//! responses; only blocking calls carry a conversation id.

use super::{InstallationInfo, KnowledgeProvider, KnowledgeStream, ProviderError};
use async_trait::async_trait;
use futures::StreamExt;
use reqwest::Client;
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;

/// Cohere API base URL.
const COHERE_API_BASE: &str = "https://api.cohere.ai/v1";

/// Model used for installation descriptions.
const DESCRIBE_MODEL: &str = "command-light-nightly";

/// Model used for short follow-up answers.
const ANSWER_MODEL: &str = "command-light";

/// Connector that augments the response with live web search results.
const WEB_SEARCH_CONNECTOR: &str = "web-search";

/// Knowledge provider backed by the Cohere chat API.
pub struct CohereKnowledgeProvider {
    api_key: Secret<String>,
    base_url: String,
    client: Client,
}

impl CohereKnowledgeProvider {
    pub fn new(api_key: Secret<String>) -> Self {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(120))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            api_key,
            base_url: COHERE_API_BASE.to_string(),
            client,
        }
    }

    /// Override the API base URL. Used by tests to point the client at a
    /// local mock server.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn describe_message(city: &str, installation_name: &str, artist: &str) -> String {
        format!(
            "Give key insights about the art installation {} by {} in {}, \
             explaining the art work, artist background, interpretation, and \
             location background.",
            installation_name, artist, city
        )
    }

    async fn send_chat(&self, request: &ChatRequest) -> Result<reqwest::Response, ProviderError> {
        let url = format!("{}/chat", self.base_url);

        let response = self
            .client
            .post(&url)
            .bearer_auth(self.api_key.expose_secret())
            .json(request)
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
                "Cohere API error {}: {}",
                status, error_text
            )));
        }

        Ok(response)
    }
}

#[async_trait]
impl KnowledgeProvider for CohereKnowledgeProvider {
    async fn describe_installation(
        &self,
        city: &str,
        installation_name: &str,
        artist: &str,
        conversation_id: &str,
    ) -> Result<InstallationInfo, ProviderError> {
        let request = ChatRequest {
            model: DESCRIBE_MODEL,
            message: Self::describe_message(city, installation_name, artist),
            connectors: vec![Connector {
                id: WEB_SEARCH_CONNECTOR,
            }],
            conversation_id: Some(conversation_id.to_string()),
            stream: false,
        };

        tracing::debug!(
            model = DESCRIBE_MODEL,
            installation_name = %installation_name,
            artist = %artist,
            conversation_id = %conversation_id,
            "Sending description request to Cohere"
        );

        let response = self.send_chat(&request).await?;

        let api_response: ChatResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::InvalidResponse(format!("Failed to parse response: {}", e)))?;

        let generation_id = api_response.generation_id.ok_or_else(|| {
            ProviderError::InvalidResponse("response carried no generation_id".to_string())
        })?;

        Ok(InstallationInfo {
            text: api_response.text,
            generation_id,
        })
    }

    async fn describe_installation_stream(
        &self,
        city: &str,
        installation_name: &str,
        artist: &str,
    ) -> Result<KnowledgeStream, ProviderError> {
        let request = ChatRequest {
            model: DESCRIBE_MODEL,
            message: Self::describe_message(city, installation_name, artist),
            connectors: vec![Connector {
                id: WEB_SEARCH_CONNECTOR,
            }],
            conversation_id: None,
            stream: true,
        };

        tracing::debug!(
            model = DESCRIBE_MODEL,
            installation_name = %installation_name,
            artist = %artist,
            "Starting streaming description request to Cohere"
        );

        let response = self.send_chat(&request).await?;

        // The streaming endpoint emits newline-delimited JSON events.
        // Forward text-generation fragments as they arrive; the full text is
        // never buffered.
        let (tx, rx) = mpsc::channel(32);

        tokio::spawn(async move {
            let mut stream = response.bytes_stream();
            let mut buffer = String::new();

            while let Some(chunk_result) = stream.next().await {
                match chunk_result {
                    Ok(chunk) => {
                        buffer.push_str(&String::from_utf8_lossy(&chunk));

                        while let Some(line_end) = buffer.find('\n') {
                            let line = buffer[..line_end].to_string();
                            buffer = buffer[line_end + 1..].to_string();

                            if let Ok(event) = serde_json::from_str::<StreamEvent>(&line) {
                                if event.event_type == "text-generation" {
                                    if let Some(text) = event.text {
                                        if tx.send(Ok(text)).await.is_err() {
                                            return;
                                        }
                                    }
                                }
                            }
                        }
                    }
                    Err(e) => {
                        let _ = tx.send(Err(ProviderError::NetworkError(e.to_string()))).await;
                        return;
                    }
                }
            }
        });

        Ok(Box::pin(ReceiverStream::new(rx)) as KnowledgeStream)
    }

    async fn answer_question(
        &self,
        question: &str,
        conversation_id: &str,
    ) -> Result<String, ProviderError> {
        let request = ChatRequest {
            model: ANSWER_MODEL,
            message: format!(
                "Answer the question based on the art installation info and \
                 keep it to one or two sentences. {}",
                question
            ),
            connectors: vec![Connector {
                id: WEB_SEARCH_CONNECTOR,
            }],
            conversation_id: Some(conversation_id.to_string()),
            stream: false,
        };

        tracing::debug!(
            model = ANSWER_MODEL,
            conversation_id = %conversation_id,
            "Sending follow-up question to Cohere"
        );

        let response = self.send_chat(&request).await?;

        let api_response: ChatResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::InvalidResponse(format!("Failed to parse response: {}", e)))?;

        Ok(api_response.text)
    }
}

// ============================================================================
// Cohere API Request/Response Types
// ============================================================================

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: &'static str,
    message: String,
    connectors: Vec<Connector>,
    #[serde(skip_serializing_if = "Option::is_none")]
    conversation_id: Option<String>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    stream: bool,
}

#[derive(Debug, Serialize)]
struct Connector {
    id: &'static str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    text: String,
    #[serde(default)]
    generation_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StreamEvent {
    event_type: String,
    #[serde(default)]
    text: Option<String>,
}
