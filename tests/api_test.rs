//! Router-level tests driven through the full axum service with mock
//! providers, so no network access is needed.

use artlens::services::providers::mock::{MockKnowledgeProvider, MockVisionProvider};
use artlens::startup::{build_router, AppState};
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use std::sync::Arc;
use tower::util::ServiceExt;

fn test_state() -> (Arc<MockVisionProvider>, Arc<MockKnowledgeProvider>, AppState) {
    let vision = Arc::new(MockVisionProvider::new("`Dreaming by Jaume Plensa`"));
    let knowledge = Arc::new(MockKnowledgeProvider::new(
        "Dreaming is a sculpture by Jaume Plensa in Toronto.",
        "gen-42",
        "Jaume Plensa is a Spanish sculptor.",
    ));
    let state = AppState::new(vision.clone(), knowledge.clone());
    (vision, knowledge, state)
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn root_returns_hello_world() {
    let (_, _, state) = test_state();
    let app = build_router(state);

    let response = app
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["message"], "Hello World");
}

#[tokio::test]
async fn health_check_works() {
    let (_, _, state) = test_state();
    let app = build_router(state);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["status"], "ok");
}

#[tokio::test]
async fn art_info_returns_parsed_identity_and_info() {
    let (_, _, state) = test_state();
    let app = build_router(state);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/art_info?image_url=https%3A%2F%2Fexample.com%2Fstatue.jpg&city=Toronto&conversation_id=123")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["city"], "Toronto");
    assert_eq!(json["installation_name"], "Dreaming");
    assert_eq!(json["artist"], "Jaume Plensa");

    // Upstream text is non-deterministic in production; only shape is
    // asserted against the canned values.
    assert!(!json["info"].as_str().unwrap().is_empty());
    assert!(!json["generation_id"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn generation_id_round_trips_into_ask_question() {
    let (_, knowledge, state) = test_state();
    let app = build_router(state);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/art_info?image_url=https%3A%2F%2Fexample.com%2Fstatue.jpg&city=Toronto&conversation_id=123")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    let generation_id = json["generation_id"].as_str().unwrap().to_string();

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(format!(
                    "/ask_question?question=What%20is%20the%20artist%20background%3F&generation_id={}",
                    generation_id
                ))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert!(!json["answer"].as_str().unwrap().is_empty());

    // The follow-up call must have been threaded under the generation id
    // returned by the description call.
    assert_eq!(knowledge.last_conversation_id(), Some(generation_id));
    assert_eq!(knowledge.answer_call_count(), 1);
}

#[tokio::test]
async fn sample_art_info_returns_info() {
    let (vision, knowledge, state) = test_state();
    let app = build_router(state);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/sample_art_info")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert!(!json["info"].as_str().unwrap().is_empty());
    assert_eq!(vision.call_count(), 1);
    assert_eq!(knowledge.describe_call_count(), 1);
}

#[tokio::test]
async fn missing_query_parameter_is_rejected_before_any_provider_call() {
    let (vision, knowledge, state) = test_state();
    let app = build_router(state);

    // conversation_id is missing.
    let response = app
        .oneshot(
            Request::builder()
                .uri("/art_info?image_url=https%3A%2F%2Fexample.com%2Fstatue.jpg&city=Toronto")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(vision.call_count(), 0);
    assert_eq!(knowledge.describe_call_count(), 0);
}

#[tokio::test]
async fn malformed_vision_answer_is_unprocessable() {
    let vision = Arc::new(MockVisionProvider::new("I could not identify this artwork"));
    let knowledge = Arc::new(MockKnowledgeProvider::new("unused", "unused", "unused"));
    let state = AppState::new(vision, knowledge.clone());
    let app = build_router(state);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/art_info?image_url=https%3A%2F%2Fexample.com%2Fstatue.jpg&city=Toronto&conversation_id=123")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    // The knowledge call never happens once parsing fails.
    assert_eq!(knowledge.describe_call_count(), 0);
}

#[tokio::test]
async fn stream_art_info_emits_fragments_as_plain_text() {
    let vision = Arc::new(MockVisionProvider::new("unused"));
    let knowledge = Arc::new(
        MockKnowledgeProvider::new("unused", "unused", "unused").with_stream_chunks(vec![
            "Dreaming ".to_string(),
            "is a sculpture ".to_string(),
            "by Jaume Plensa.".to_string(),
        ]),
    );
    let state = AppState::new(vision, knowledge);
    let app = build_router(state);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/stream_art_info?city=Toronto&installation_name=Dreaming&artist=Jaume%20Plensa")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response
        .headers()
        .get("content-type")
        .unwrap()
        .to_str()
        .unwrap()
        .starts_with("text/plain"));

    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(&bytes[..], b"Dreaming is a sculpture by Jaume Plensa.");
}
