//! STOMP over WebSocket: publish computed groups and watch the broadcast topic.

use crate::settings::{GROUPS_TOPIC, SEND_DESTINATION};
use crate::transport::{DeliveryGuard, ReconnectPolicy, StompFrame, TransportError};
use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use meetup_groups::GroupRecord;
use serde::Deserialize;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use tracing::{debug, info, warn};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// How long to wait for `CONNECTED` after sending `CONNECT`.
const HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(10);

/// Subscription id used for the groups topic.
const SUBSCRIPTION_ID: &str = "sub-groups-0";

/// An open STOMP session on a WebSocket.
pub struct StompSession {
    url: String,
    sink: SplitSink<WsStream, Message>,
    stream: SplitStream<WsStream>,
    connected: bool,
}

impl StompSession {
    /// Open the WebSocket and complete the STOMP handshake.
    pub async fn connect(ws_uri: &str) -> Result<Self, TransportError> {
        let parsed = url::Url::parse(ws_uri)
            .map_err(|e| TransportError::Connection(format!("invalid WebSocket URI {ws_uri}: {e}")))?;
        let host = parsed.host_str().unwrap_or("localhost").to_string();

        let (ws, _response) = tokio_tungstenite::connect_async(ws_uri)
            .await
            .map_err(|e| TransportError::Connection(format!("WebSocket connection failed: {e}")))?;
        let (sink, stream) = ws.split();
        let mut session = Self {
            url: ws_uri.to_string(),
            sink,
            stream,
            connected: true,
        };

        session.send_frame(&StompFrame::connect(&host)).await?;
        let reply = tokio::time::timeout(HANDSHAKE_TIMEOUT, session.next_frame())
            .await
            .map_err(|_| TransportError::Connection("timed out waiting for CONNECTED".into()))??;
        match reply {
            Some(frame) if frame.command == "CONNECTED" => {
                info!(
                    url = %session.url,
                    version = frame.header("version").unwrap_or("?"),
                    "STOMP connected"
                );
                Ok(session)
            }
            Some(frame) if frame.command == "ERROR" => Err(TransportError::Connection(format!(
                "broker rejected CONNECT: {}",
                frame.header("message").unwrap_or(frame.body.as_str())
            ))),
            Some(frame) => Err(TransportError::Connection(format!(
                "expected CONNECTED, got {}",
                frame.command
            ))),
            None => Err(TransportError::Closed),
        }
    }

    async fn send_frame(&mut self, frame: &StompFrame) -> Result<(), TransportError> {
        if !self.connected {
            return Err(TransportError::Closed);
        }
        debug!(command = %frame.command, "-> frame");
        self.sink
            .send(Message::Text(frame.encode()))
            .await
            .map_err(|e| TransportError::Connection(format!("failed to send {}: {e}", frame.command)))
    }

    pub async fn subscribe(&mut self, id: &str, destination: &str) -> Result<(), TransportError> {
        self.send_frame(&StompFrame::subscribe(id, destination)).await
    }

    pub async fn send_json(&mut self, destination: &str, body: String) -> Result<(), TransportError> {
        self.send_frame(&StompFrame::send_json(destination, body)).await
    }

    /// Next non-heartbeat frame, or `None` once the socket closes.
    pub async fn next_frame(&mut self) -> Result<Option<StompFrame>, TransportError> {
        while self.connected {
            match self.stream.next().await {
                Some(Ok(Message::Text(text))) => {
                    if let Some(frame) = StompFrame::decode(&text)? {
                        debug!(command = %frame.command, "<- frame");
                        return Ok(Some(frame));
                    }
                }
                Some(Ok(Message::Binary(data))) => {
                    let text = String::from_utf8_lossy(&data);
                    if let Some(frame) = StompFrame::decode(&text)? {
                        return Ok(Some(frame));
                    }
                }
                Some(Ok(Message::Close(_))) | None => {
                    self.connected = false;
                }
                Some(Ok(Message::Ping(_) | Message::Pong(_) | Message::Frame(_))) => continue,
                Some(Err(e)) => {
                    self.connected = false;
                    return Err(TransportError::Connection(format!("WebSocket error: {e}")));
                }
            }
        }
        Ok(None)
    }

    /// Send `DISCONNECT` and close the socket. Errors are ignored.
    pub async fn close(&mut self) {
        if !self.connected {
            return;
        }
        self.send_frame(&StompFrame::disconnect()).await.ok();
        self.sink.send(Message::Close(None)).await.ok();
        self.connected = false;
    }
}

/// Publish groups to the backend, retrying the whole exchange per `policy`.
pub async fn publish_groups(
    ws_uri: &str,
    groups: &[GroupRecord],
    policy: &ReconnectPolicy,
) -> Result<(), TransportError> {
    let body = serde_json::to_string(groups)
        .map_err(|e| TransportError::MalformedFrame(format!("failed to encode groups: {e}")))?;
    let body = &body;

    policy
        .retry("publish", |attempt| async move {
            debug!(attempt, "publishing groups");
            let mut session = StompSession::connect(ws_uri).await?;
            session.subscribe(SUBSCRIPTION_ID, GROUPS_TOPIC).await?;
            session.send_json(SEND_DESTINATION, body.clone()).await?;
            session.close().await;
            Ok::<_, anyhow::Error>(())
        })
        .await?;

    info!(groups = groups.len(), destination = SEND_DESTINATION, "published groups");
    Ok(())
}

/// Subscribe to the groups topic and hand each first-seen group to
/// `on_group`. Reconnects per `policy` and returns only when it gives up.
pub async fn watch_groups<F>(
    ws_uri: &str,
    policy: &ReconnectPolicy,
    guard: &mut DeliveryGuard,
    mut on_group: F,
) -> Result<(), TransportError>
where
    F: FnMut(&GroupRecord),
{
    loop {
        let mut session = policy
            .retry("subscribe", |_| async move {
                let mut session = StompSession::connect(ws_uri).await?;
                session.subscribe(SUBSCRIPTION_ID, GROUPS_TOPIC).await?;
                Ok::<_, anyhow::Error>(session)
            })
            .await?;
        info!(topic = GROUPS_TOPIC, "watching for groups");

        loop {
            match session.next_frame().await {
                Ok(Some(frame)) if frame.command == "MESSAGE" => {
                    match parse_group_payload(&frame.body) {
                        Ok(groups) => {
                            for group in guard.filter_new(groups) {
                                on_group(&group);
                            }
                        }
                        Err(e) => warn!("ignoring message: {e}"),
                    }
                }
                Ok(Some(frame)) if frame.command == "ERROR" => {
                    warn!(
                        "broker error: {}",
                        frame.header("message").unwrap_or(frame.body.as_str())
                    );
                    break;
                }
                Ok(Some(frame)) => debug!(command = %frame.command, "ignoring frame"),
                Ok(None) => {
                    warn!("connection closed by broker");
                    break;
                }
                Err(e) => {
                    warn!("{e}");
                    break;
                }
            }
        }

        session.close().await;
        tokio::time::sleep(policy.delay).await;
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum GroupPayload {
    Many(Vec<GroupRecord>),
    One(GroupRecord),
}

/// Parse a broadcast body holding either one group or a list of groups.
pub fn parse_group_payload(body: &str) -> Result<Vec<GroupRecord>, TransportError> {
    match serde_json::from_str::<GroupPayload>(body.trim()) {
        Ok(GroupPayload::Many(groups)) => Ok(groups),
        Ok(GroupPayload::One(group)) => Ok(vec![group]),
        Err(e) => Err(TransportError::MalformedFrame(format!(
            "body is not a group or list of groups: {e}"
        ))),
    }
}
