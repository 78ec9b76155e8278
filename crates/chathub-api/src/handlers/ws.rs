//! WebSocket upgrade handler.

use std::time::Duration;

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::response::Response;
use axum_extra::extract::CookieJar;
use futures::{SinkExt, StreamExt};
use tracing::{debug, info, warn};

use chathub_core::types::principal::Principal;

use crate::error::ApiError;
use crate::state::AppState;

/// How long queued frames may take to reach the client after teardown.
const OUTBOUND_FLUSH_TIMEOUT: Duration = Duration::from_secs(2);

/// GET /ws — WebSocket upgrade, authenticated by the session cookie.
///
/// Authentication runs before the upgrade; a rejected client gets 401 and
/// nothing is registered.
pub async fn ws_upgrade(
    State(state): State<AppState>,
    jar: CookieJar,
    ws: WebSocketUpgrade,
) -> Result<Response, ApiError> {
    let token = jar
        .get(&state.config.auth.cookie_name)
        .map(|cookie| cookie.value().to_owned());

    let principal = state.hub.authenticate(token.as_deref()).await?;

    Ok(ws.on_upgrade(move |socket| handle_ws_connection(state, principal, socket)))
}

/// Runs an established connection until close, transport error, or shutdown.
async fn handle_ws_connection(state: AppState, principal: Principal, socket: WebSocket) {
    let hub = state.hub.clone();
    let mut shutdown_rx = hub.shutdown_receiver();
    let (handle, mut outbound_rx) = hub.connect(principal);
    let conn_id = handle.id;

    let (mut ws_tx, mut ws_rx) = socket.split();

    // Drains until every sender is gone, then closes the socket.
    let mut outbound_task = tokio::spawn(async move {
        while let Some(frame) = outbound_rx.recv().await {
            if ws_tx.send(Message::Text(frame.into())).await.is_err() {
                return;
            }
        }
        let _ = ws_tx.send(Message::Close(None)).await;
    });

    // Inbound frames are handled strictly in arrival order.
    loop {
        tokio::select! {
            incoming = ws_rx.next() => match incoming {
                Some(Ok(Message::Text(text))) => {
                    // Rejections are answered with an ERROR frame by the hub.
                    let _ = hub.handle_inbound(&handle, text.as_str());
                }
                Some(Ok(Message::Binary(_))) => {
                    debug!(conn_id = %conn_id, "Ignoring binary frame");
                }
                Some(Ok(Message::Close(_))) | None => break,
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    warn!(conn_id = %conn_id, error = %e, "WebSocket error");
                    break;
                }
            },
            _ = shutdown_rx.recv() => {
                info!(conn_id = %conn_id, "Closing connection for shutdown");
                break;
            }
        }
    }

    hub.disconnect(conn_id);
    drop(handle);

    if tokio::time::timeout(OUTBOUND_FLUSH_TIMEOUT, &mut outbound_task)
        .await
        .is_err()
    {
        debug!(conn_id = %conn_id, "Outbound flush timed out");
        outbound_task.abort();
    }
}
