use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use shadowbox_timer::{create_router, state::{AppState, TimerSettings}};
use tower::ServiceExt;

fn app() -> Router {
    let state = AppState::in_memory(TimerSettings::default())
        .unwrap()
        .with_server("127.0.0.1".to_string(), 20554);
    create_router(Arc::new(state))
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => request
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => request.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

#[tokio::test]
async fn health_reports_ok() {
    let app = app();
    let (status, body) = send(&app, Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn timer_commands_drive_the_session() {
    let app = app();

    let (status, body) = send(&app, Method::POST, "/timer/start", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "running");
    assert_eq!(body["timer"]["phase"], "gettingReady");
    assert_eq!(body["timer"]["timeRemaining"], 10);
    assert_eq!(body["display"], "0:10");

    let (_, body) = send(&app, Method::POST, "/timer/pause", None).await;
    assert_eq!(body["status"], "paused");
    assert_eq!(body["timer"]["isPaused"], true);

    let (_, body) = send(&app, Method::GET, "/timer/status", None).await;
    assert_eq!(body["timer"]["isPaused"], true);

    let (_, body) = send(&app, Method::POST, "/timer/reset", None).await;
    assert_eq!(body["status"], "idle");
    assert_eq!(body["timer"]["phase"], "idle");

    let (_, body) = send(&app, Method::GET, "/status", None).await;
    assert_eq!(body["lastAction"], "reset");
    assert_eq!(body["port"], 20554);
}

#[tokio::test]
async fn settings_are_validated_and_merged() {
    let app = app();

    let (status, _) = send(&app, Method::PUT, "/timer/settings", Some(json!({ "totalRounds": 0 }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) =
        send(&app, Method::PUT, "/timer/settings", Some(json!({ "roundTime": 120 }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["roundTime"], 120);
    assert_eq!(body["totalRounds"], 3);

    let (_, body) = send(&app, Method::GET, "/timer/settings", None).await;
    assert_eq!(body["roundTime"], 120);
    assert_eq!(body["restTime"], 60);
}

#[tokio::test]
async fn presets_can_be_created_applied_and_deleted() {
    let app = app();

    let new = json!({
        "name": "Heavy bag 6x2",
        "totalRounds": 6,
        "roundTime": 120,
        "restTime": 30,
        "musicEnabled": true,
        "musicUrl": "bag.mp3"
    });
    let (status, created) = send(&app, Method::POST, "/presets", Some(new)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["category"], "Shadow Boxing");
    let id = created["id"].as_str().unwrap().to_string();

    let (_, list) = send(&app, Method::GET, "/presets", None).await;
    assert_eq!(list.as_array().map(Vec::len), Some(1));

    let (_, favorite) = send(&app, Method::POST, &format!("/presets/{}/favorite", id), None).await;
    assert_eq!(favorite["isFavorite"], true);

    let (status, _) = send(&app, Method::POST, &format!("/presets/{}/apply", id), None).await;
    assert_eq!(status, StatusCode::OK);

    let (_, server) = send(&app, Method::GET, "/status", None).await;
    assert_eq!(server["currentPreset"], "Heavy bag 6x2");
    assert_eq!(server["settings"]["totalRounds"], 6);
    assert_eq!(server["music"]["enabled"], true);
    assert_eq!(server["music"]["url"], "bag.mp3");

    let (status, _) = send(&app, Method::DELETE, &format!("/presets/{}", id), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = send(&app, Method::DELETE, &format!("/presets/{}", id), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = send(&app, Method::GET, &format!("/presets/{}", id), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn invalid_preset_is_rejected() {
    let app = app();
    let new = json!({ "name": "Nothing", "totalRounds": 0, "roundTime": 60, "restTime": 0 });
    let (status, body) = send(&app, Method::POST, "/presets", Some(new)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], "error");
}

#[tokio::test]
async fn history_and_profile_endpoints() {
    let app = app();

    let (_, history) = send(&app, Method::GET, "/history", None).await;
    assert_eq!(history, json!([]));

    let (_, stats) = send(&app, Method::GET, "/history/stats", None).await;
    assert_eq!(stats["totalWorkouts"], 0);

    let (status, _) = send(&app, Method::DELETE, "/history/unknown", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, profile) = send(&app, Method::PUT, "/profile", Some(json!({ "weight": 82.5 }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(profile["weight"], 82.5);
    assert_eq!(profile["height"], 175.0);

    let (_, profile) = send(&app, Method::GET, "/profile", None).await;
    assert_eq!(profile["weight"], 82.5);
}

#[tokio::test]
async fn music_settings_round_trip_through_the_api() {
    let app = app();

    let (_, music) = send(
        &app,
        Method::PUT,
        "/music",
        Some(json!({ "enabled": true, "source": "youtube", "url": "https://youtu.be/x" })),
    )
    .await;
    assert_eq!(music["enabled"], true);
    assert_eq!(music["source"], "youtube");

    let (_, music) = send(&app, Method::GET, "/music", None).await;
    assert_eq!(music["url"], "https://youtu.be/x");
    assert_eq!(music["isPlaying"], false);
}
