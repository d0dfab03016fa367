use super::*;
use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::post,
    Router,
};
use shared::domain::SessionId;
use std::sync::Mutex;
use tokio::net::TcpListener;

#[derive(Debug, Clone)]
struct CapturedRequest {
    content_type: Option<String>,
    body: Value,
}

#[derive(Clone)]
struct ServerState {
    captured: Arc<Mutex<Vec<CapturedRequest>>>,
    status: StatusCode,
    reply: &'static str,
}

async fn chat_handler(
    State(state): State<ServerState>,
    headers: HeaderMap,
    body: Bytes,
) -> impl IntoResponse {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let body = serde_json::from_slice(&body).unwrap_or(Value::Null);
    state
        .captured
        .lock()
        .expect("lock")
        .push(CapturedRequest { content_type, body });
    (state.status, state.reply)
}

async fn spawn_chat_server(
    status: StatusCode,
    reply: &'static str,
) -> (String, Arc<Mutex<Vec<CapturedRequest>>>) {
    let captured = Arc::new(Mutex::new(Vec::new()));
    let app = Router::new()
        .route("/chat", post(chat_handler))
        .with_state(ServerState {
            captured: captured.clone(),
            status,
            reply,
        });
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("serve");
    });
    (format!("http://{addr}"), captured)
}

fn request(message: &str) -> ChatRequest {
    ChatRequest::new(SessionId("user_k3j9x0a1b".into()), message)
}

#[tokio::test]
async fn posts_json_body_to_chat_path() {
    let (server_url, captured) =
        spawn_chat_server(StatusCode::OK, r#"{"response": "Hello"}"#).await;
    let client = HttpChatClient::new(&server_url).expect("client");

    let body = client.send_chat(&request("genre")).await.expect("reply");

    assert_eq!(body, serde_json::json!({"response": "Hello"}));
    let captured = captured.lock().expect("lock").clone();
    assert_eq!(captured.len(), 1);
    assert_eq!(captured[0].content_type.as_deref(), Some("application/json"));
    assert_eq!(
        captured[0].body,
        serde_json::json!({"user_id": "user_k3j9x0a1b", "message": "genre"})
    );
}

#[tokio::test]
async fn error_status_body_is_still_decoded() {
    let (server_url, _captured) = spawn_chat_server(
        StatusCode::INTERNAL_SERVER_ERROR,
        r#"{"response": "An error occurred: boom"}"#,
    )
    .await;
    let client = HttpChatClient::new(&server_url).expect("client");

    let body = client.send_chat(&request("story")).await.expect("reply");
    assert_eq!(
        render_response(&body),
        BotReply::TextReply("An error occurred: boom".into())
    );
}

#[tokio::test]
async fn invalid_json_body_is_a_decode_error() {
    let (server_url, _captured) = spawn_chat_server(StatusCode::OK, "<html>oops</html>").await;
    let client = HttpChatClient::new(&server_url).expect("client");

    let err = client.send_chat(&request("story")).await.expect_err("decode");
    assert!(matches!(err, ChatError::Decode(_)), "got {err:?}");
    assert_eq!(render_outcome(&Err(err)), BotReply::Error);
}

#[tokio::test]
async fn unreachable_server_is_a_transport_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);

    let client = HttpChatClient::new(&format!("http://{addr}")).expect("client");
    let err = client.send_chat(&request("story")).await.expect_err("refused");
    assert!(matches!(err, ChatError::Transport(_)), "got {err:?}");
}

#[tokio::test]
async fn transport_works_through_arc() {
    let (server_url, captured) = spawn_chat_server(
        StatusCode::OK,
        r#"{"recommendations": ["Inception"], "check_availability": "https://www.justwatch.com"}"#,
    )
    .await;
    let transport: Arc<dyn ChatTransport> =
        Arc::new(HttpChatClient::new(&server_url).expect("client"));

    let body = transport.send_chat(&request("dreams")).await.expect("reply");
    assert_eq!(
        render_response(&body).plain_text(),
        "Inception\nCheck Availability"
    );
    assert_eq!(captured.lock().expect("lock").len(), 1);
}

#[test]
fn chat_endpoint_appends_chat_path() {
    assert_eq!(
        chat_endpoint("http://127.0.0.1:5000").expect("url").as_str(),
        "http://127.0.0.1:5000/chat"
    );
    assert_eq!(
        chat_endpoint("http://127.0.0.1:5000/").expect("url").as_str(),
        "http://127.0.0.1:5000/chat"
    );
    assert_eq!(
        chat_endpoint(" https://example.com/movies ").expect("url").as_str(),
        "https://example.com/movies/chat"
    );
}

#[test]
fn chat_endpoint_rejects_invalid_urls() {
    assert!(matches!(
        chat_endpoint("not a url"),
        Err(ChatError::InvalidEndpoint(_))
    ));
    assert!(matches!(
        chat_endpoint("mailto:someone@example.com"),
        Err(ChatError::InvalidEndpoint(_))
    ));
}
