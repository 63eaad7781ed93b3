//! AI provider abstractions and implementations.
//!
//! This module provides trait-based seams for the two external AI services:
//! the vision identifier (OpenAI) and the knowledge retriever / follow-up
//! answerer (Cohere). Concrete clients live next to a mock implementation
//! so the router can be tested without network access.

pub mod cohere;
pub mod mock;
pub mod openai;

use async_trait::async_trait;
use std::pin::Pin;
use thiserror::Error;
use tokio_stream::Stream;

/// Error type for provider operations.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("provider not configured: {0}")]
    NotConfigured(String),

    #[error("API error: {0}")]
    ApiError(String),

    #[error("rate limited")]
    RateLimited,

    #[error("network error: {0}")]
    NetworkError(String),

    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

/// Description of an installation plus the handle for follow-up questions.
#[derive(Debug, Clone)]
pub struct InstallationInfo {
    /// Free-text description of the installation.
    pub text: String,

    /// Generation identifier, reusable as a conversation handle in later
    /// calls. Callers persist this client-side; the service stores nothing.
    pub generation_id: String,
}

/// Lazy, finite, non-restartable sequence of description fragments.
pub type KnowledgeStream = Pin<Box<dyn Stream<Item = Result<String, ProviderError>> + Send>>;

/// Identifies an art installation from an image reference.
#[async_trait]
pub trait VisionProvider: Send + Sync {
    /// Returns the raw model answer, expected (but not guaranteed) to be in
    /// the `installation_name by artist` format. Format validation happens
    /// at the [`crate::identity::InstallationIdentity::parse`] boundary.
    async fn identify_installation(&self, image_url: &str) -> Result<String, ProviderError>;
}

/// Fetches web-grounded descriptions and answers follow-up questions,
/// threading calls into one logical conversation.
#[async_trait]
pub trait KnowledgeProvider: Send + Sync {
    /// Describe an installation, returning the text and a new generation id
    /// to be used as the conversation handle for follow-ups.
    async fn describe_installation(
        &self,
        city: &str,
        installation_name: &str,
        artist: &str,
        conversation_id: &str,
    ) -> Result<InstallationInfo, ProviderError>;

    /// Streaming variant of [`describe_installation`]: fragments are
    /// produced incrementally for display, with no conversation threading.
    async fn describe_installation_stream(
        &self,
        city: &str,
        installation_name: &str,
        artist: &str,
    ) -> Result<KnowledgeStream, ProviderError>;

    /// Answer a short follow-up question grounded in an existing
    /// conversation.
    async fn answer_question(
        &self,
        question: &str,
        conversation_id: &str,
    ) -> Result<String, ProviderError>;
}
