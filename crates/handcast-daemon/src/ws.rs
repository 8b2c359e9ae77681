//! WebSocket handler for the broadcast stream

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        ConnectInfo, State,
    },
    response::IntoResponse,
};
use futures_util::{Sink, SinkExt, Stream, StreamExt};
use std::fmt::Display;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info, warn};

use crate::state::AppState;

/// Text a client sends once it is ready to consume the stream
const READY: &str = "ready";

/// WebSocket upgrade handler
pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, addr, state))
}

async fn handle_socket(socket: WebSocket, addr: SocketAddr, state: Arc<AppState>) {
    let (sender, receiver) = socket.split();
    run_session(sender, receiver, addr, &state).await;
}

/// Serve one client until either side closes
async fn run_session<S, R, E>(mut sender: S, mut receiver: R, addr: SocketAddr, state: &AppState)
where
    S: Sink<Message> + Unpin,
    R: Stream<Item = Result<Message, E>> + Unpin,
    E: Display,
{
    let (mut messages, snapshot) = state.connect_client();

    let clients = state.broadcaster.client_connected();
    info!(peer = %addr, clients, "WebSocket client connected");

    for text in snapshot {
        if sender.send(Message::Text(text.into())).await.is_err() {
            disconnect(state, addr);
            return;
        }
    }

    loop {
        tokio::select! {
            // Forward pipeline messages to client
            msg = messages.recv() => {
                match msg {
                    Ok(text) => {
                        if sender.send(Message::Text(text.into())).await.is_err() {
                            break;
                        }
                    }
                    Err(RecvError::Lagged(n)) => {
                        warn!(peer = %addr, skipped = n, "Client lagging, messages skipped");
                    }
                    Err(RecvError::Closed) => {
                        debug!("Broadcast channel closed");
                        break;
                    }
                }
            }

            // Handle incoming messages from client
            msg = receiver.next() => {
                match msg {
                    Some(Ok(Message::Ping(data))) => {
                        if sender.send(Message::Pong(data)).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(Message::Text(text))) => {
                        if let Some(reply) = client_text(state, addr, text.as_str()) {
                            if sender.send(Message::Text(reply.into())).await.is_err() {
                                break;
                            }
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => {
                        break;
                    }
                    Some(Err(e)) => {
                        warn!(peer = %addr, error = %e, "WebSocket error");
                        break;
                    }
                    _ => {}
                }
            }
        }
    }

    disconnect(state, addr);
}

/// Act on a text frame from a client, returning the reply if any
fn client_text(state: &AppState, addr: SocketAddr, text: &str) -> Option<&'static str> {
    match text {
        READY => {
            info!(peer = %addr, "Client ready");
            state.broadcaster.mark_ready();
            None
        }
        "ping" => Some("pong"),
        other => {
            debug!(peer = %addr, message = other, "Ignoring client message");
            None
        }
    }
}

fn disconnect(state: &AppState, addr: SocketAddr) {
    let clients = state.broadcaster.client_disconnected();
    info!(peer = %addr, clients, "WebSocket client disconnected");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use handcast_core::{BendState, Broadcaster, Finger, HandSide, Message as CoreMessage};
    use tokio::sync::mpsc;
    use tokio::task::JoinHandle;

    /// Client side of a session running over in-memory channels
    struct TestClient {
        input: mpsc::Sender<Result<Message, axum::Error>>,
        output: mpsc::Receiver<Message>,
        session: JoinHandle<()>,
    }

    impl TestClient {
        fn connect(state: Arc<AppState>) -> Self {
            let (input, input_rx) = mpsc::channel(16);
            let (output_tx, output) = mpsc::channel(64);

            let receiver = Box::pin(futures_util::stream::unfold(input_rx, |mut rx| async move {
                rx.recv().await.map(|msg| (msg, rx))
            }));
            let sender = Box::pin(futures_util::sink::unfold(
                output_tx,
                |tx, msg: Message| async move { tx.send(msg).await.map(|_| tx) },
            ));

            let addr: SocketAddr = "127.0.0.1:50000".parse().unwrap();
            let session = tokio::spawn(async move {
                run_session(sender, receiver, addr, &state).await;
            });

            Self {
                input,
                output,
                session,
            }
        }

        async fn say(&self, text: &str) {
            self.input
                .send(Ok(Message::Text(text.to_string().into())))
                .await
                .unwrap();
        }

        async fn next_text(&mut self) -> String {
            match self.output.recv().await {
                Some(Message::Text(text)) => text.as_str().to_string(),
                other => panic!("expected text, got {:?}", other),
            }
        }

        async fn close(self) {
            drop(self.input);
            self.session.await.unwrap();
        }
    }

    fn snapshot_state() -> Arc<AppState> {
        let mut config = Config::default();
        config.server.snapshot_on_connect = true;
        AppState::new(config).unwrap()
    }

    #[tokio::test]
    async fn test_ready_and_ping() {
        let state = AppState::new(Config::default()).unwrap();
        let mut client = TestClient::connect(state.clone());

        client.say("ready").await;
        client.say("ping").await;
        assert_eq!(client.next_text().await, "pong");

        // "ready" was handled before the ping that produced the reply
        assert!(state.broadcaster.is_ready());
        client.close().await;
    }

    #[tokio::test]
    async fn test_ping_frame_answered() {
        let state = AppState::new(Config::default()).unwrap();
        let mut client = TestClient::connect(state);

        client
            .input
            .send(Ok(Message::Ping(vec![1, 2, 3].into())))
            .await
            .unwrap();
        match client.output.recv().await {
            Some(Message::Pong(data)) => assert_eq!(&data[..], &[1, 2, 3]),
            other => panic!("expected pong, got {:?}", other),
        }
        client.close().await;
    }

    #[tokio::test]
    async fn test_snapshot_precedes_live_stream() {
        let state = snapshot_state();
        let mut client = TestClient::connect(state.clone());

        let mut snapshot = Vec::new();
        for _ in 0..10 {
            snapshot.push(client.next_text().await);
        }
        assert_eq!(snapshot, state.current_state_messages());
        assert_eq!(snapshot[0], "1! 0? 0? 1");

        state.broadcaster.broadcast(&CoreMessage::Transition {
            hand: HandSide::Right,
            finger: Finger::Ring,
            state: BendState::Bent,
        });
        assert_eq!(client.next_text().await, "1! 1? 3? 0");
        client.close().await;
    }

    #[tokio::test]
    async fn test_client_count_follows_connections() {
        let state = snapshot_state();
        let mut first = TestClient::connect(state.clone());
        let mut second = TestClient::connect(state.clone());

        // The snapshot is sent after the count is raised
        first.next_text().await;
        second.next_text().await;
        assert_eq!(state.broadcaster.clients(), 2);

        first.close().await;
        assert_eq!(state.broadcaster.clients(), 1);

        second.say("ping").await;
        let mut reply = second.next_text().await;
        while reply != "pong" {
            reply = second.next_text().await;
        }
        second.close().await;
        assert_eq!(state.broadcaster.clients(), 0);
    }

    #[tokio::test]
    async fn test_close_frame_ends_session() {
        let state = AppState::new(Config::default()).unwrap();
        let client = TestClient::connect(state.clone());

        client.input.send(Ok(Message::Close(None))).await.unwrap();
        client.session.await.unwrap();
        assert_eq!(state.broadcaster.clients(), 0);
    }
}
