//! HTTP client against a local stub of the companion service

use std::sync::{Arc, Mutex};

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use companion_core::{ChatSession, ChatTurn, ChatView, CompanionClient, CompanionError, CompanionService};
use serde_json::{json, Value};

type Captured = Arc<Mutex<Vec<Value>>>;

async fn serve(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

async fn transform(State(captured): State<Captured>, Json(body): Json<Value>) -> Json<Value> {
    let message = body["message"].as_str().unwrap_or_default().to_string();
    let personality = body["personality"].clone();
    captured.lock().unwrap().push(body);
    Json(json!({
        "original_response": format!("[Base response] {}", message),
        "transformed_response": format!("[Witty Friend] {}", message),
        "personality_used": personality,
    }))
}

fn companion_stub(captured: Captured) -> Router {
    Router::new()
        .route(
            "/api/sample-messages",
            get(|| async { Json(json!([{ "content": "I love hiking", "sender": "user" }])) }),
        )
        .route(
            "/api/extract-memory",
            post(|State(captured): State<Captured>, Json(body): Json<Value>| async move {
                let count = body["messages"].as_array().map(|m| m.len()).unwrap_or(0);
                captured.lock().unwrap().push(body);
                Json(json!({
                    "preferences": { "likes": ["hiking"], "dislikes": [], "habits": [], "interests": [] },
                    "emotional_patterns": { "dominant_emotions": ["happy"], "communication_style": "casual" },
                    "facts": {},
                    "summary": format!("{} messages", count),
                }))
            }),
        )
        .route(
            "/api/compare-personalities",
            post(|Json(body): Json<Value>| async move {
                Json(json!({
                    "message": body["message"],
                    "responses": { "Therapist": "How does that feel?", "Calm Mentor": "Breathe." },
                }))
            }),
        )
        .route("/api/transform-personality", post(transform))
        .route(
            "/api/personalities",
            get(|| async {
                Json(json!({ "therapist": { "name": "Therapist", "description": "Empathetic" } }))
            }),
        )
        .route(
            "/api/health",
            get(|| async {
                Json(json!({ "status": "healthy", "service": "AI Companion System", "version": "1.0.0" }))
            }),
        )
        .with_state(captured)
}

#[derive(Default)]
struct NullView;

impl ChatView for NullView {
    fn render_turn(&mut self, _turn: &ChatTurn) {}
    fn show_typing(&mut self) {}
    fn hide_typing(&mut self) {}
    fn notify_error(&mut self, _error: &CompanionError) {}
}

#[tokio::test]
async fn chat_turn_posts_message_personality_and_history() {
    let captured = Captured::default();
    let client = CompanionClient::new(&serve(companion_stub(captured.clone())).await);
    let mut session = ChatSession::new();
    let mut view = NullView;

    session.submit(&client, "hi", "witty_friend", &mut view).await.unwrap();
    session.submit(&client, "again", "witty_friend", &mut view).await.unwrap();

    let bodies = captured.lock().unwrap();
    assert_eq!(bodies.len(), 2);
    assert_eq!(bodies[0]["message"], "hi");
    assert_eq!(bodies[0]["personality"], "witty_friend");
    assert_eq!(bodies[0]["history"], json!([]));
    assert!(bodies[0].get("context").is_none());

    let history = bodies[1]["history"].as_array().unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0]["sender"], "user");
    assert_eq!(history[0]["content"], "hi");
    assert_eq!(history[1]["sender"], "ai");
    assert_eq!(history[1]["content"], "[Witty Friend] hi");
    assert_eq!(history[1]["personality"], "witty_friend");

    let last = session.transcript().last().unwrap();
    assert_eq!(last.content, "[Witty Friend] again");
}

#[tokio::test]
async fn memory_request_wraps_messages() {
    let captured = Captured::default();
    let client = CompanionClient::new(&serve(companion_stub(captured.clone())).await);

    let memory = companion_core::extract_memory(&client, r#"[{"content": "I love hiking"}]"#)
        .await
        .unwrap();

    assert_eq!(memory.preferences.likes, vec!["hiking"]);
    assert_eq!(memory.emotional_patterns.communication_style, "casual");
    assert!(memory.emotional_patterns.stress_indicators.is_empty());
    assert!(memory.facts.goals.is_empty());
    assert_eq!(memory.summary, "1 messages");

    let bodies = captured.lock().unwrap();
    assert_eq!(bodies[0]["messages"][0]["content"], "I love hiking");
    assert!(bodies[0]["messages"][0].get("sender").is_none());
}

#[tokio::test]
async fn rejected_memory_shape_is_a_request_error() {
    let captured = Captured::default();
    let app = Router::new()
        .route(
            "/api/extract-memory",
            post(|State(captured): State<Captured>, Json(body): Json<Value>| async move {
                let valid = body["messages"]
                    .as_array()
                    .is_some_and(|m| m.iter().all(|msg| msg["content"].is_string()));
                captured.lock().unwrap().push(body);
                if valid {
                    (StatusCode::OK, Json(json!({})))
                } else {
                    (StatusCode::UNPROCESSABLE_ENTITY, Json(json!({ "detail": "invalid" })))
                }
            }),
        )
        .with_state(captured.clone());
    let client = CompanionClient::new(&serve(app).await);

    let err = companion_core::extract_memory(&client, r#"[{"text": "hi"}]"#)
        .await
        .unwrap_err();

    assert!(err.is_request());
    assert!(!err.is_parse());
    assert!(err.to_string().starts_with("Memory extraction failed"));
    assert_eq!(captured.lock().unwrap()[0]["messages"][0]["text"], "hi");
}

#[tokio::test]
async fn catalogue_health_sample_and_comparison() {
    let client = CompanionClient::new(&serve(companion_stub(Captured::default())).await);

    let sample = companion_core::load_sample(&client).await.unwrap();
    assert!(sample.contains("I love hiking"));

    let responses = companion_core::compare_personalities(&client, "bad day", None)
        .await
        .unwrap();
    assert_eq!(responses["Therapist"], "How does that feel?");

    let catalogue = client.personalities().await.unwrap();
    assert_eq!(catalogue["therapist"].name, "Therapist");

    let health = client.health().await.unwrap();
    assert_eq!(health.status, "healthy");
    assert_eq!(health.version, "1.0.0");
}

#[tokio::test]
async fn error_status_is_a_request_error_for_every_endpoint() {
    let failing = || async { StatusCode::INTERNAL_SERVER_ERROR };
    let app = Router::new()
        .route("/api/sample-messages", get(failing))
        .route("/api/extract-memory", post(failing))
        .route("/api/compare-personalities", post(failing))
        .route("/api/transform-personality", post(failing))
        .route("/api/personalities", get(failing))
        .route("/api/health", get(failing));
    let client = CompanionClient::new(&serve(app).await);

    assert!(client.sample_messages().await.unwrap_err().is_request());
    assert!(companion_core::extract_memory(&client, "[]").await.unwrap_err().is_request());
    assert!(companion_core::compare_personalities(&client, "hi", None)
        .await
        .unwrap_err()
        .is_request());
    assert!(client.personalities().await.unwrap_err().is_request());
    assert!(client.health().await.unwrap_err().is_request());

    let mut session = ChatSession::new();
    let err = session
        .submit(&client, "hello", "therapist", &mut NullView)
        .await
        .unwrap_err();
    assert!(matches!(err, CompanionError::Status { operation: "Chat", .. }));
    assert_eq!(session.transcript().len(), 1);
}
