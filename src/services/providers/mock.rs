//! Mock provider implementations for testing.

use super::{
    InstallationInfo, KnowledgeProvider, KnowledgeStream, ProviderError, VisionProvider,
};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// Mock vision provider returning a canned answer.
pub struct MockVisionProvider {
    answer: String,
    calls: AtomicUsize,
}

impl MockVisionProvider {
    pub fn new(answer: impl Into<String>) -> Self {
        Self {
            answer: answer.into(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl VisionProvider for MockVisionProvider {
    async fn identify_installation(&self, _image_url: &str) -> Result<String, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.answer.clone())
    }
}

/// Mock knowledge provider with canned responses and call recording.
pub struct MockKnowledgeProvider {
    info_text: String,
    generation_id: String,
    answer: String,
    stream_chunks: Vec<String>,
    describe_calls: AtomicUsize,
    answer_calls: AtomicUsize,
    last_conversation_id: Mutex<Option<String>>,
}

impl MockKnowledgeProvider {
    pub fn new(
        info_text: impl Into<String>,
        generation_id: impl Into<String>,
        answer: impl Into<String>,
    ) -> Self {
        Self {
            info_text: info_text.into(),
            generation_id: generation_id.into(),
            answer: answer.into(),
            stream_chunks: vec!["Dreaming ".to_string(), "is a sculpture.".to_string()],
            describe_calls: AtomicUsize::new(0),
            answer_calls: AtomicUsize::new(0),
            last_conversation_id: Mutex::new(None),
        }
    }

    pub fn with_stream_chunks(mut self, chunks: Vec<String>) -> Self {
        self.stream_chunks = chunks;
        self
    }

    pub fn describe_call_count(&self) -> usize {
        self.describe_calls.load(Ordering::SeqCst)
    }

    pub fn answer_call_count(&self) -> usize {
        self.answer_calls.load(Ordering::SeqCst)
    }

    /// Conversation id received by the most recent call, for asserting the
    /// generation id round-trip.
    pub fn last_conversation_id(&self) -> Option<String> {
        self.last_conversation_id.lock().unwrap().clone()
    }
}

#[async_trait]
impl KnowledgeProvider for MockKnowledgeProvider {
    async fn describe_installation(
        &self,
        _city: &str,
        _installation_name: &str,
        _artist: &str,
        conversation_id: &str,
    ) -> Result<InstallationInfo, ProviderError> {
        self.describe_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_conversation_id.lock().unwrap() = Some(conversation_id.to_string());

        Ok(InstallationInfo {
            text: self.info_text.clone(),
            generation_id: self.generation_id.clone(),
        })
    }

    async fn describe_installation_stream(
        &self,
        _city: &str,
        _installation_name: &str,
        _artist: &str,
    ) -> Result<KnowledgeStream, ProviderError> {
        let chunks: Vec<Result<String, ProviderError>> =
            self.stream_chunks.iter().cloned().map(Ok).collect();

        Ok(Box::pin(tokio_stream::iter(chunks)) as KnowledgeStream)
    }

    async fn answer_question(
        &self,
        _question: &str,
        conversation_id: &str,
    ) -> Result<String, ProviderError> {
        self.answer_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_conversation_id.lock().unwrap() = Some(conversation_id.to_string());

        Ok(self.answer.clone())
    }
}
