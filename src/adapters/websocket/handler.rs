//! WebSocket upgrade handler speaking STOMP.
//!
//! Connection lifecycle:
//! 1. Upgrade on `GET /ws`
//! 2. Wait for CONNECT; run the handshake (credential + channel join)
//! 3. Serve SUBSCRIBE / UNSUBSCRIBE / SEND / DISCONNECT
//! 4. On close, drop subscriptions and leave the joined channel

use std::collections::HashMap;
use std::time::Duration;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};
use futures::{SinkExt, Stream, StreamExt};
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;

use super::handshake::{handshake, HandshakeError, SocketSession};
use super::stomp::{Command, Frame};
use crate::adapters::http::state::AppState;
use crate::domain::catalog::{ChannelName, ChannelSet};
use crate::domain::foundation::{ErrorCode, ProductId, ValidationError};

/// Destination prefix for view-count increments; followed by `{channel}/{product_id}`.
pub const INCREMENT_DESTINATION_PREFIX: &str = "/ws/message/increase/product/view_count/";

const STOMP_VERSION: &str = "1.2";
const OUTBOUND_BUFFER: usize = 64;
const FLUSH_TIMEOUT: Duration = Duration::from_secs(1);

/// GET /ws
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.protocols(["v12.stomp", "v11.stomp", "v10.stomp"])
        .on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: AppState) {
    let (mut sender, mut receiver) = socket.split();

    let session = match await_connect(&mut receiver, &state).await {
        Some(Ok(session)) => session,
        Some(Err(err)) => {
            tracing::warn!("Socket handshake rejected: {}", err);
            let frame = Frame::new(Command::Error).header("message", err.client_message());
            let _ = sender.send(Message::Text(frame.serialize())).await;
            let _ = sender.close().await;
            return;
        }
        None => {
            tracing::debug!("Socket closed before CONNECT");
            return;
        }
    };

    let connected = Frame::new(Command::Connected)
        .header("version", STOMP_VERSION)
        .header("heart-beat", "0,0")
        .header("user-name", session.principal.id.to_string());
    if let Err(e) = sender.send(Message::Text(connected.serialize())).await {
        tracing::debug!("Failed to send CONNECTED frame: {}", e);
        leave_channel(&state, &session).await;
        return;
    }

    let (outbound_tx, mut outbound_rx) = mpsc::channel::<Message>(OUTBOUND_BUFFER);
    let connection_id = session.connection_id;
    let mut send_task = tokio::spawn(async move {
        while let Some(message) = outbound_rx.recv().await {
            if let Err(e) = sender.send(message).await {
                tracing::debug!(connection_id = %connection_id, "Send error, closing connection: {}", e);
                break;
            }
        }
    });

    let mut connection = Connection::new(session, state, outbound_tx);
    let send_finished = tokio::select! {
        _ = &mut send_task => true,
        _ = connection.run(&mut receiver) => false,
    };

    connection.close().await;

    // flush whatever was queued, e.g. a DISCONNECT receipt
    if !send_finished && tokio::time::timeout(FLUSH_TIMEOUT, &mut send_task).await.is_err() {
        send_task.abort();
    }
}

/// Read until the first real frame and run the handshake on it.
/// `None` when the socket closes first.
async fn await_connect<S>(
    receiver: &mut S,
    state: &AppState,
) -> Option<Result<SocketSession, HandshakeError>>
where
    S: Stream<Item = Result<Message, axum::Error>> + Unpin,
{
    while let Some(result) = receiver.next().await {
        let text = match result {
            Ok(Message::Text(text)) => text,
            Ok(Message::Close(_)) | Err(_) => return None,
            Ok(_) => continue,
        };
        let frame = match Frame::parse(&text) {
            Ok(Some(frame)) => frame,
            Ok(None) => continue,
            Err(e) => return Some(Err(e.into())),
        };
        return Some(
            handshake(
                &frame,
                state.gate.credentials().codec(),
                &state.channels,
                state.membership.as_ref(),
            )
            .await,
        );
    }
    None
}

async fn leave_channel(state: &AppState, session: &SocketSession) {
    match state
        .membership
        .leave(&session.channel, session.principal.id)
        .await
    {
        Ok(removed) => tracing::info!(
            connection_id = %session.connection_id,
            user_id = %session.principal.id,
            channel = %session.channel,
            removed,
            "Socket left channel"
        ),
        Err(e) => tracing::error!(
            connection_id = %session.connection_id,
            channel = %session.channel,
            "Failed to leave channel on close: {}",
            e
        ),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Close,
}

/// An authenticated STOMP connection.
struct Connection {
    session: SocketSession,
    state: AppState,
    outbound: mpsc::Sender<Message>,
    subscriptions: HashMap<String, (ChannelName, JoinHandle<()>)>,
}

impl Connection {
    fn new(session: SocketSession, state: AppState, outbound: mpsc::Sender<Message>) -> Self {
        Self {
            session,
            state,
            outbound,
            subscriptions: HashMap::new(),
        }
    }

    async fn run<S>(&mut self, receiver: &mut S)
    where
        S: Stream<Item = Result<Message, axum::Error>> + Unpin,
    {
        while let Some(result) = receiver.next().await {
            let text = match result {
                Ok(Message::Text(text)) => text,
                Ok(Message::Binary(_)) => {
                    tracing::warn!(connection_id = %self.session.connection_id, "Received unsupported binary message");
                    continue;
                }
                // protocol ping/pong handled by axum
                Ok(Message::Ping(_)) | Ok(Message::Pong(_)) => continue,
                Ok(Message::Close(_)) => {
                    tracing::debug!(connection_id = %self.session.connection_id, "Client sent close frame");
                    break;
                }
                Err(e) => {
                    tracing::debug!(connection_id = %self.session.connection_id, "Receive error: {}", e);
                    break;
                }
            };

            let frame = match Frame::parse(&text) {
                Ok(Some(frame)) => frame,
                Ok(None) => continue,
                Err(e) => {
                    self.send_error(&e.to_string()).await;
                    continue;
                }
            };

            if self.handle_frame(frame).await == Flow::Close {
                break;
            }
        }
    }

    async fn handle_frame(&mut self, frame: Frame) -> Flow {
        match frame.command {
            Command::Subscribe => self.subscribe(&frame).await,
            Command::Unsubscribe => self.unsubscribe(&frame).await,
            Command::Send => self.send(&frame).await,
            Command::Disconnect => {
                self.send_receipt(&frame).await;
                return Flow::Close;
            }
            Command::Connect | Command::Stomp => self.send_error("Already connected").await,
            other => {
                self.send_error(&format!("{} is a server frame", other))
                    .await
            }
        }
        Flow::Continue
    }

    async fn subscribe(&mut self, frame: &Frame) {
        let Some(id) = frame.get("id").map(str::to_string) else {
            return self.send_error("SUBSCRIBE requires an id header").await;
        };
        let channel = match frame.get("destination").map(|d| self.state.channels.resolve(d)) {
            Some(Ok(channel)) => channel,
            _ => return self.send_error("SUBSCRIBE requires a configured channel destination").await,
        };

        let receiver = self.state.topics.subscribe(&channel).await;
        let task = tokio::spawn(forward_topic(
            receiver,
            channel.clone(),
            id.clone(),
            self.outbound.clone(),
        ));
        if let Some((_, previous)) = self.subscriptions.insert(id, (channel.clone(), task)) {
            previous.abort();
        }

        tracing::debug!(connection_id = %self.session.connection_id, channel = %channel, "Subscribed to topic");
        self.send_receipt(frame).await;
    }

    async fn unsubscribe(&mut self, frame: &Frame) {
        let removed = frame.get("id").and_then(|id| self.subscriptions.remove(id));
        if let Some((channel, task)) = removed {
            task.abort();
            // the aborted task drops its receiver once it is polled
            let _ = task.await;
            self.state.topics.release(&channel).await;
        }
        self.send_receipt(frame).await;
    }

    async fn send(&mut self, frame: &Frame) {
        let target = frame
            .get("destination")
            .ok_or_else(|| ValidationError::empty_field("destination"))
            .and_then(|destination| {
                parse_increment_destination(destination, &self.state.channels)
            });

        let (channel, product) = match target {
            Ok(target) => target,
            Err(e) => {
                tracing::debug!(connection_id = %self.session.connection_id, "Rejected SEND: {}", e);
                return self.send_error(&ErrorCode::ValidationFailed.to_string()).await;
            }
        };

        match self
            .state
            .view_counts
            .publish_increment(&channel, product)
            .await
        {
            Ok(update) => {
                tracing::debug!(
                    user_id = %self.session.principal.id,
                    channel = %channel,
                    product_id = %product,
                    view_count = update.view_count,
                    "View counted over socket"
                );
                self.send_receipt(frame).await;
            }
            Err(e) => self.send_error(&e.code().to_string()).await,
        }
    }

    async fn send_receipt(&self, frame: &Frame) {
        if let Some(receipt) = frame.get("receipt") {
            let reply = Frame::new(Command::Receipt).header("receipt-id", receipt);
            self.push(reply).await;
        }
    }

    async fn send_error(&self, message: &str) {
        self.push(Frame::new(Command::Error).header("message", message))
            .await;
    }

    async fn push(&self, frame: Frame) {
        let _ = self.outbound.send(Message::Text(frame.serialize())).await;
    }

    /// Stop forwarding and leave the joined channel.
    async fn close(self) {
        for (_, (channel, task)) in self.subscriptions {
            task.abort();
            let _ = task.await;
            self.state.topics.release(&channel).await;
        }
        leave_channel(&self.state, &self.session).await;
    }
}

async fn forward_topic(
    mut receiver: broadcast::Receiver<String>,
    channel: ChannelName,
    subscription: String,
    outbound: mpsc::Sender<Message>,
) {
    let destination = channel.topic();
    let mut sequence: u64 = 0;
    loop {
        match receiver.recv().await {
            Ok(payload) => {
                sequence += 1;
                let frame = Frame::new(Command::Message)
                    .header("destination", destination.as_str())
                    .header("subscription", subscription.as_str())
                    .header("message-id", format!("{}-{}", subscription, sequence))
                    .header("content-type", "application/json")
                    .body(payload);
                if outbound.send(Message::Text(frame.serialize())).await.is_err() {
                    break;
                }
            }
            Err(broadcast::error::RecvError::Lagged(missed)) => {
                tracing::warn!(channel = %channel, missed, "Socket subscriber lagged");
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}

/// Split `/ws/message/increase/product/view_count/{channel}/{product_id}`.
fn parse_increment_destination(
    destination: &str,
    channels: &ChannelSet,
) -> Result<(ChannelName, ProductId), ValidationError> {
    let rest = destination
        .strip_prefix(INCREMENT_DESTINATION_PREFIX)
        .ok_or_else(|| ValidationError::invalid_format("destination", "unknown destination"))?;
    let (channel, product) = rest
        .split_once('/')
        .ok_or_else(|| ValidationError::invalid_format("destination", "missing product id"))?;
    Ok((channels.resolve(channel)?, product.parse()?))
}
