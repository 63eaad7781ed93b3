use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::handlers::{
    art_info, ask_question, health_check, root, sample_art_info, stream_art_info,
};
use crate::services::providers::{KnowledgeProvider, VisionProvider};

/// Shared application state.
///
/// Providers are constructed once at startup and injected here; handlers
/// hold no other state and the service persists nothing across requests.
#[derive(Clone)]
pub struct AppState {
    pub vision: Arc<dyn VisionProvider>,
    pub knowledge: Arc<dyn KnowledgeProvider>,
}

impl AppState {
    pub fn new(vision: Arc<dyn VisionProvider>, knowledge: Arc<dyn KnowledgeProvider>) -> Self {
        Self { vision, knowledge }
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .route("/sample_art_info", get(sample_art_info))
        .route("/art_info", get(art_info))
        .route("/stream_art_info", get(stream_art_info))
        .route("/ask_question", post(ask_question))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                tracing::info_span!(
                    "http_request",
                    method = %request.method(),
                    uri = %request.uri(),
                )
            }),
        )
        .with_state(state)
}
