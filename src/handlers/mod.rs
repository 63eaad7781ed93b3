//! HTTP handlers for the artlens service.
//!
//! Each endpoint is a sequential chain of awaited provider calls: identify
//! the installation from the photo, parse the typed identity, then fetch the
//! description or answer. Failures surface through [`AppError`]; there are
//! no retries and no partial results.

use axum::{
    body::Body,
    extract::{Query, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;

use crate::error::AppError;
use crate::identity::InstallationIdentity;
use crate::startup::AppState;

/// Demo image used by the sample endpoint.
const SAMPLE_IMAGE_URL: &str = "https://gsizkkqfipyplvfqhqeb.supabase.co/storage/v1/object/public/user_uploads/statue_toronto.jpg";
const SAMPLE_CITY: &str = "Toronto";
const SAMPLE_CONVERSATION_ID: &str = "123";

#[derive(Debug, Deserialize)]
pub struct ArtInfoParams {
    pub image_url: String,
    pub city: String,
    pub conversation_id: String,
}

#[derive(Debug, Deserialize)]
pub struct StreamArtInfoParams {
    pub city: String,
    pub installation_name: String,
    pub artist: String,
}

#[derive(Debug, Deserialize)]
pub struct AskQuestionParams {
    pub question: String,
    pub generation_id: String,
}

#[derive(Debug, Serialize)]
pub struct ArtInfoResponse {
    pub city: String,
    pub installation_name: String,
    pub artist: String,
    pub info: String,
    pub generation_id: String,
}

#[derive(Debug, Serialize)]
pub struct SampleArtInfoResponse {
    pub info: String,
}

#[derive(Debug, Serialize)]
pub struct AskQuestionResponse {
    pub answer: String,
}

/// GET /
pub async fn root() -> impl IntoResponse {
    Json(json!({ "message": "Hello World" }))
}

/// GET /health
pub async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// GET /sample_art_info
///
/// Runs the full identify-then-describe chain against a hardcoded demo
/// image.
pub async fn sample_art_info(
    State(state): State<AppState>,
) -> Result<Json<SampleArtInfoResponse>, AppError> {
    let raw = state.vision.identify_installation(SAMPLE_IMAGE_URL).await?;
    info!(answer = %raw, "Interpreted sample installation");

    let identity = InstallationIdentity::parse(&raw)?;
    let info = state
        .knowledge
        .describe_installation(
            SAMPLE_CITY,
            &identity.installation_name,
            &identity.artist,
            SAMPLE_CONVERSATION_ID,
        )
        .await?;

    Ok(Json(SampleArtInfoResponse { info: info.text }))
}

/// GET /art_info
///
/// Identifies the installation in `image_url`, then fetches a web-grounded
/// description threaded under `conversation_id`. The returned
/// `generation_id` is the handle for follow-up questions.
pub async fn art_info(
    State(state): State<AppState>,
    Query(params): Query<ArtInfoParams>,
) -> Result<Json<ArtInfoResponse>, AppError> {
    let raw = state
        .vision
        .identify_installation(&params.image_url)
        .await?;
    info!(answer = %raw, city = %params.city, "Interpreted installation");

    let identity = InstallationIdentity::parse(&raw)?;
    let info = state
        .knowledge
        .describe_installation(
            &params.city,
            &identity.installation_name,
            &identity.artist,
            &params.conversation_id,
        )
        .await?;

    Ok(Json(ArtInfoResponse {
        city: params.city,
        installation_name: identity.installation_name,
        artist: identity.artist,
        info: info.text,
        generation_id: info.generation_id,
    }))
}

/// GET /stream_art_info
///
/// Streaming variant of the description call: the response body carries
/// text fragments as the upstream produces them, without buffering the full
/// text first.
pub async fn stream_art_info(
    State(state): State<AppState>,
    Query(params): Query<StreamArtInfoParams>,
) -> Result<Response, AppError> {
    let stream = state
        .knowledge
        .describe_installation_stream(&params.city, &params.installation_name, &params.artist)
        .await?;

    Ok((
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        Body::from_stream(stream),
    )
        .into_response())
}

/// POST /ask_question
///
/// Answers a short follow-up question grounded in the conversation opened
/// by a previous description call.
pub async fn ask_question(
    State(state): State<AppState>,
    Query(params): Query<AskQuestionParams>,
) -> Result<Json<AskQuestionResponse>, AppError> {
    info!(question = %params.question, "Answering follow-up question");

    let answer = state
        .knowledge
        .answer_question(&params.question, &params.generation_id)
        .await?;

    Ok(Json(AskQuestionResponse { answer }))
}
