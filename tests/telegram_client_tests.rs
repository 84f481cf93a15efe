use ampere_spawner::ChatError;
use ampere_spawner::config::TelegramResolvedConfig;
use ampere_spawner::telegram::{ChatApi, TelegramClient};
use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::post,
};
use serde_json::{Value, json};
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;
use url::Url;

const BOT_TOKEN: &str = "123456:test-token";

#[derive(Clone, Default)]
struct CaptureState {
    calls: Arc<Mutex<Vec<(String, String, Value)>>>,
}

async fn spawn_test_server(app: Router) -> Url {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind listener");
    let addr = listener.local_addr().expect("local addr");
    let base = Url::parse(&format!("http://{addr}/")).expect("valid base url");

    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("server run");
    });

    base
}

async fn bot_handler(
    State(state): State<CaptureState>,
    Path((bot, method)): Path<(String, String)>,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    state
        .calls
        .lock()
        .unwrap()
        .push((bot, method.clone(), body.clone()));

    match method.as_str() {
        "sendMessage" => (
            StatusCode::OK,
            Json(json!({
                "ok": true,
                "result": { "message_id": 77, "text": body["text"], "chat": { "id": 42 } }
            })),
        ),
        "editMessageText" if body["message_id"] == 404 => (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "ok": false,
                "error_code": 400,
                "description": "Bad Request: message to edit not found"
            })),
        ),
        "editMessageText" => (
            StatusCode::OK,
            Json(json!({ "ok": true, "result": { "message_id": body["message_id"] } })),
        ),
        "deleteMessage" => (StatusCode::OK, Json(json!({ "ok": true, "result": true }))),
        _ => (
            StatusCode::NOT_FOUND,
            Json(json!({ "ok": false, "error_code": 404, "description": "Not Found" })),
        ),
    }
}

async fn client_with_capture() -> (TelegramClient, CaptureState) {
    let state = CaptureState::default();
    let app = Router::new()
        .route("/{bot}/{method}", post(bot_handler))
        .with_state(state.clone());
    let base = spawn_test_server(app).await;

    let cfg = TelegramResolvedConfig {
        bot_token: BOT_TOKEN.to_string(),
        chat_id: "42".to_string(),
        api_url: base,
    };
    (TelegramClient::new(&cfg, reqwest::Client::new()), state)
}

#[tokio::test]
async fn send_edit_delete_hit_bot_methods() {
    let (client, state) = client_with_capture().await;

    let message_id = client
        .send_message("42", "Start spawning")
        .await
        .expect("send succeeds");
    assert_eq!(message_id, 77);

    client
        .edit_message("42", message_id, "Number of Retry: 10")
        .await
        .expect("edit succeeds");
    client
        .delete_message("42", message_id)
        .await
        .expect("delete succeeds");

    let calls = state.calls.lock().unwrap().clone();
    let methods: Vec<&str> = calls.iter().map(|(_, m, _)| m.as_str()).collect();
    assert_eq!(methods, ["sendMessage", "editMessageText", "deleteMessage"]);
    assert!(calls.iter().all(|(bot, _, _)| bot == &format!("bot{BOT_TOKEN}")));

    assert_eq!(calls[0].2, json!({ "chat_id": "42", "text": "Start spawning" }));
    assert_eq!(
        calls[1].2,
        json!({ "chat_id": "42", "message_id": 77, "text": "Number of Retry: 10" })
    );
    assert_eq!(calls[2].2, json!({ "chat_id": "42", "message_id": 77 }));
}

#[tokio::test]
async fn api_rejection_surfaces_description() {
    let (client, _state) = client_with_capture().await;

    let err = client
        .edit_message("42", 404, "stale")
        .await
        .expect_err("edit of a missing message fails");

    match err {
        ChatError::Api {
            status,
            error_code,
            description,
        } => {
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(error_code, Some(400));
            assert_eq!(description, "Bad Request: message to edit not found");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}
