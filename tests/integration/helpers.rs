//! Shared test helpers for integration tests.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use futures::{SinkExt, StreamExt};
use serde_json::Value;
use tokio::net::TcpStream;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::{HeaderValue, header::COOKIE};
use tokio_tungstenite::tungstenite::{Error as WsError, Message};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use tower::ServiceExt;

use chathub_api::app::build_state;
use chathub_api::{AppState, Backends, build_app};
use chathub_auth::{JwtEncoder, MemoryUserDirectory};
use chathub_core::config::AppConfig;
use chathub_core::types::id::UserId;
use chathub_realtime::MemoryMessageStore;

const RECV_TIMEOUT: Duration = Duration::from_secs(2);
const SILENCE_WINDOW: Duration = Duration::from_millis(200);

/// A running server backed by in-memory collaborators.
pub struct TestServer {
    /// Bound address
    pub addr: SocketAddr,
    /// Shared application state
    pub state: AppState,
    /// User directory the auth gate consults
    pub directory: Arc<MemoryUserDirectory>,
    /// Message store the persistor writes to
    pub store: Arc<MemoryMessageStore>,
    encoder: JwtEncoder,
    server: JoinHandle<()>,
}

impl TestServer {
    /// Start a server on an ephemeral port
    pub async fn start() -> Self {
        let config = AppConfig::default();
        let encoder = JwtEncoder::new(&config.auth);
        let directory = Arc::new(MemoryUserDirectory::new());
        let store = Arc::new(MemoryMessageStore::new());
        let state = build_state(config, Backends::memory(store.clone(), directory.clone()));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind test listener");
        let addr = listener.local_addr().expect("local addr");
        let app = build_app(state.clone());
        let server = tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Self {
            addr,
            state,
            directory,
            store,
            encoder,
            server,
        }
    }

    /// Router for in-process HTTP requests
    pub fn router(&self) -> Router {
        build_app(self.state.clone())
    }

    /// Register a user and issue their session token
    pub fn add_user(&self, name: &str) -> (UserId, String) {
        let user_id = UserId::new();
        self.directory.insert(user_id, name);
        let (token, _) = self.encoder.issue(user_id).expect("Failed to issue token");
        (user_id, token)
    }

    /// Open a WebSocket, optionally presenting a session cookie
    pub async fn try_connect(&self, token: Option<&str>) -> Result<WsClient, WsError> {
        let mut request = format!("ws://{}/ws", self.addr)
            .into_client_request()
            .expect("Failed to build ws request");
        if let Some(token) = token {
            let cookie = format!("{}={token}", self.state.config.auth.cookie_name);
            request
                .headers_mut()
                .insert(COOKIE, HeaderValue::from_str(&cookie).expect("cookie header"));
        }

        let (stream, _) = tokio_tungstenite::connect_async(request).await?;
        Ok(WsClient { stream })
    }

    /// Connect and wait until the hub has registered the connection
    pub async fn connect(&self, token: &str) -> WsClient {
        let expected = self.state.hub.registry.connection_count() + 1;
        let client = self
            .try_connect(Some(token))
            .await
            .expect("Failed to connect");
        self.wait_for_connections(expected).await;
        client
    }

    /// Poll until the hub reports `count` live connections
    pub async fn wait_for_connections(&self, count: usize) {
        let hub = self.state.hub.clone();
        eventually(|| hub.registry.connection_count() == count).await;
    }

    /// Poll until the store holds `count` messages
    pub async fn wait_for_persisted(&self, count: usize) {
        let deadline = tokio::time::Instant::now() + RECV_TIMEOUT;
        while self.store.len().await != count {
            assert!(
                tokio::time::Instant::now() < deadline,
                "expected {count} persisted messages"
            );
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    }

    /// Make an HTTP request to the app
    pub async fn request(&self, method: &str, path: &str) -> TestResponse {
        let req = Request::builder()
            .method(method)
            .uri(path)
            .body(Body::empty())
            .expect("Failed to build request");

        let response = self
            .router()
            .oneshot(req)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("Failed to read body");
        let body: Value = serde_json::from_slice(&body_bytes).unwrap_or(Value::Null);

        TestResponse { status, body }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.server.abort();
    }
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    /// HTTP status code
    pub status: StatusCode,
    /// Parsed JSON body
    pub body: Value,
}

/// A WebSocket test client speaking the JSON frame protocol.
pub struct WsClient {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

impl WsClient {
    /// Send one event frame
    pub async fn send(&mut self, frame: Value) {
        self.stream
            .send(Message::text(frame.to_string()))
            .await
            .expect("Failed to send frame");
    }

    /// Next JSON text frame, failing after a timeout
    pub async fn recv(&mut self) -> Value {
        loop {
            let next = tokio::time::timeout(RECV_TIMEOUT, self.stream.next())
                .await
                .expect("Timed out waiting for frame")
                .expect("Stream ended")
                .expect("WebSocket error");
            if let Message::Text(text) = next {
                return serde_json::from_str(text.as_str()).expect("Frame is not JSON");
            }
        }
    }

    /// Next frame, asserting its event name
    pub async fn recv_event(&mut self, event: &str) -> Value {
        let frame = self.recv().await;
        assert_eq!(frame["event"], event, "unexpected frame: {frame}");
        frame
    }

    /// Assert that no text frame arrives for a short window
    pub async fn expect_silence(&mut self) {
        let deadline = tokio::time::sleep(SILENCE_WINDOW);
        tokio::pin!(deadline);
        loop {
            tokio::select! {
                _ = &mut deadline => return,
                next = self.stream.next() => match next {
                    Some(Ok(Message::Text(text))) => panic!("unexpected frame: {}", text.as_str()),
                    Some(Ok(_)) => {}
                    _ => return,
                },
            }
        }
    }

    /// Text frames received until the server closes the connection
    pub async fn recv_until_closed(&mut self) -> Vec<Value> {
        let mut frames = Vec::new();
        loop {
            let next = tokio::time::timeout(RECV_TIMEOUT, self.stream.next())
                .await
                .expect("Timed out waiting for close");
            match next {
                Some(Ok(Message::Text(text))) => {
                    frames.push(serde_json::from_str(text.as_str()).expect("Frame is not JSON"));
                }
                Some(Ok(Message::Close(_))) | None | Some(Err(_)) => return frames,
                Some(Ok(_)) => {}
            }
        }
    }

    /// Close the connection
    pub async fn close(mut self) {
        let _ = self.stream.close(None).await;
    }
}

/// Poll `condition` until it holds, failing after a timeout
pub async fn eventually(condition: impl Fn() -> bool) {
    let deadline = tokio::time::Instant::now() + RECV_TIMEOUT;
    while !condition() {
        assert!(
            tokio::time::Instant::now() < deadline,
            "condition not reached in time"
        );
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}
