mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use aqualens::create_router;
use common::*;

fn ready(h: &Harness) {
    h.models
        .reply(COORDINATOR_MODEL, Ok("plan"))
        .reply(SUMMARIZER_MODEL, Ok("Lead leaches from old service lines."))
        .reply(INTROSPECTION_MODEL, Ok(r#"{"reflection": "Mention lead testing kits.", "score": 8}"#));
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json");
    let request = match body {
        Some(body) => request.body(Body::from(body.to_string())).unwrap(),
        None => request.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

#[tokio::test]
async fn test_chat_then_feedback_round() {
    let h = harness().await;
    ready(&h);
    let app = create_router(app_state(&h));

    let (status, chat) = send(&app, "POST", "/api/chat", Some(json!({"message": "Is lead in tap water dangerous?"}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(chat["text"], "Lead leaches from old service lines.");
    assert_eq!(chat["degraded"], false);

    let conversation_id = chat["conversation_id"].as_str().unwrap().to_string();
    let (status, reflection) = send(
        &app,
        "POST",
        "/api/feedback",
        Some(json!({"conversation_id": conversation_id, "helpful": false, "text": "no testing advice"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(reflection["score"], 8);
    assert_eq!(reflection["feedback"], "no testing advice");

    let (status, rows) = send(&app, "GET", "/api/reflections?limit=5", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(rows.as_array().unwrap().len(), 1);
    assert_eq!(rows[0]["id"], reflection["id"]);
}

#[tokio::test]
async fn test_feedback_for_unknown_conversation_conflicts() {
    let h = harness().await;
    ready(&h);
    let app = create_router(app_state(&h));

    let (status, body) = send(
        &app,
        "POST",
        "/api/feedback",
        Some(json!({"conversation_id": uuid::Uuid::new_v4(), "helpful": true})),
    )
    .await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["error"].as_str().unwrap().contains("No prior interaction"));
}

#[tokio::test]
async fn test_negative_feedback_needs_text() {
    let h = harness().await;
    ready(&h);
    let app = create_router(app_state(&h));

    let (_, chat) = send(&app, "POST", "/api/chat", Some(json!({"message": "How hard is my water?"}))).await;
    let (status, _) = send(
        &app,
        "POST",
        "/api/feedback",
        Some(json!({"conversation_id": chat["conversation_id"], "helpful": false, "text": "   "})),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(h.store.count().await.unwrap(), 0);
}

#[tokio::test]
async fn test_empty_chat_message_is_bad_request() {
    let h = harness().await;
    let app = create_router(app_state(&h));

    let (status, _) = send(&app, "POST", "/api/chat", Some(json!({"message": "  "}))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_degraded_flag_when_models_fail() {
    let h = harness().await;
    let app = create_router(app_state(&h));

    let (status, chat) = send(&app, "POST", "/api/chat", Some(json!({"message": "Is boiling enough?"}))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(chat["degraded"], true);
    assert!(chat["text"]
        .as_str()
        .unwrap()
        .starts_with("Summary unavailable from model"));
}

#[tokio::test]
async fn test_health_reports_database_and_sessions() {
    let h = harness().await;
    ready(&h);
    let app = create_router(app_state(&h));
    send(&app, "POST", "/api/chat", Some(json!({"message": "What is turbidity?"}))).await;

    let (status, health) = send(&app, "GET", "/api/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(health["status"], "ok");
    assert_eq!(health["database"], "connected");
    assert_eq!(health["sessions"], 1);
}
