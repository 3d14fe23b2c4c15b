//! Supabase Realtime change feed over the Phoenix channel protocol.

use std::time::Duration;

use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::net::TcpStream;
use tokio::sync::{mpsc, oneshot};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

use super::{
    ChangeEvent, ChangeFeed, ChangeKind, Collection, RemoteError, RemoteResult, Subscription,
};
use crate::config::ResolvedBackend;
use crate::models::OwnerId;

const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(25);
const JOIN_REF: &str = "1";

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Opens one websocket channel per subscription.
#[derive(Clone)]
pub struct RealtimeFeed {
    backend: ResolvedBackend,
    access_token: String,
}

impl RealtimeFeed {
    pub fn new(backend: ResolvedBackend, access_token: impl Into<String>) -> Self {
        Self {
            backend,
            access_token: access_token.into(),
        }
    }
}

#[async_trait]
impl ChangeFeed for RealtimeFeed {
    async fn subscribe(
        &self,
        collection: Collection,
        owner: &OwnerId,
    ) -> RemoteResult<Subscription> {
        let (mut socket, _response) = connect_async(self.backend.realtime_url())
            .await
            .map_err(|error| RemoteError::Realtime(format!("Connection failed: {error}")))?;

        let table = self.backend.table(collection);
        let topic = channel_topic(table, owner);
        socket
            .send(Message::Text(join_message(
                &topic,
                table,
                owner,
                &self.access_token,
            )))
            .await
            .map_err(|error| RemoteError::Realtime(format!("Join failed: {error}")))?;
        tracing::debug!("Joined realtime channel {}", topic);

        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let (cancel_tx, cancel_rx) = oneshot::channel();
        tokio::spawn(run_channel(socket, topic, collection, events_tx, cancel_rx));

        Ok(Subscription::new(collection, events_rx, Some(cancel_tx)))
    }
}

async fn run_channel(
    socket: Socket,
    topic: String,
    collection: Collection,
    events: mpsc::UnboundedSender<ChangeEvent>,
    mut cancel: oneshot::Receiver<()>,
) {
    let (mut write, mut read) = socket.split();
    let mut heartbeat = tokio::time::interval(HEARTBEAT_INTERVAL);
    heartbeat.tick().await;
    let mut next_ref: u64 = 2;

    loop {
        tokio::select! {
            biased;

            _ = &mut cancel => {
                let _ = write.send(Message::Text(leave_message(&topic, next_ref))).await;
                let _ = write.close().await;
                tracing::debug!("Left realtime channel {}", topic);
                return;
            }

            _ = heartbeat.tick() => {
                if let Err(error) = write.send(Message::Text(heartbeat_message(next_ref))).await {
                    tracing::warn!("Realtime heartbeat failed on {}: {}", topic, error);
                    return;
                }
                next_ref += 1;
            }

            message = read.next() => {
                match message {
                    Some(Ok(Message::Text(text))) => match parse_frame(&text, &topic) {
                        Frame::Change(kind) => {
                            if events.send(ChangeEvent { collection, kind }).is_err() {
                                return;
                            }
                        }
                        Frame::Failed(reason) => {
                            tracing::warn!("Realtime channel {} failed: {}", topic, reason);
                            return;
                        }
                        Frame::Closed => {
                            tracing::debug!("Realtime channel {} closed by server", topic);
                            return;
                        }
                        Frame::Ignored => {}
                    },
                    Some(Ok(Message::Ping(data))) => {
                        let _ = write.send(Message::Pong(data)).await;
                    }
                    Some(Ok(Message::Close(_))) | None => {
                        tracing::debug!("Realtime socket for {} closed", topic);
                        return;
                    }
                    Some(Ok(_)) => {}
                    Some(Err(error)) => {
                        tracing::warn!("Realtime receive error on {}: {}", topic, error);
                        return;
                    }
                }
            }
        }
    }
}

fn channel_topic(table: &str, owner: &OwnerId) -> String {
    format!("realtime:basket:{table}:{owner}")
}

fn join_message(topic: &str, table: &str, owner: &OwnerId, access_token: &str) -> String {
    json!({
        "topic": topic,
        "event": "phx_join",
        "payload": {
            "config": {
                "broadcast": { "self": false },
                "presence": { "key": "" },
                "postgres_changes": [{
                    "event": "*",
                    "schema": "public",
                    "table": table,
                    "filter": format!("user_id=eq.{owner}"),
                }],
            },
            "access_token": access_token,
        },
        "ref": JOIN_REF,
        "join_ref": JOIN_REF,
    })
    .to_string()
}

fn heartbeat_message(reference: u64) -> String {
    json!({
        "topic": "phoenix",
        "event": "heartbeat",
        "payload": {},
        "ref": reference.to_string(),
    })
    .to_string()
}

fn leave_message(topic: &str, reference: u64) -> String {
    json!({
        "topic": topic,
        "event": "phx_leave",
        "payload": {},
        "ref": reference.to_string(),
    })
    .to_string()
}

#[derive(Debug, PartialEq, Eq)]
enum Frame {
    Change(ChangeKind),
    Failed(String),
    Closed,
    Ignored,
}

#[derive(Debug, Deserialize)]
struct PhoenixMessage {
    topic: String,
    event: String,
    #[serde(default)]
    payload: Value,
    #[serde(default, rename = "ref")]
    reference: Option<String>,
}

fn parse_frame(text: &str, topic: &str) -> Frame {
    let Ok(message) = serde_json::from_str::<PhoenixMessage>(text) else {
        return Frame::Ignored;
    };
    if message.topic != topic {
        return Frame::Ignored;
    }

    match message.event.as_str() {
        "postgres_changes" => {
            let kind = message
                .payload
                .pointer("/data/type")
                .and_then(Value::as_str)
                .map_or(ChangeKind::Other, ChangeKind::from_wire);
            Frame::Change(kind)
        }
        "phx_reply" if message.reference.as_deref() == Some(JOIN_REF) => {
            match message.payload.get("status").and_then(Value::as_str) {
                Some("ok") | None => Frame::Ignored,
                Some(_) => Frame::Failed(message.payload["response"].to_string()),
            }
        }
        "system" if message.payload.get("status").and_then(Value::as_str) == Some("error") => {
            let reason = message
                .payload
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("unknown error");
            Frame::Failed(reason.to_string())
        }
        "phx_error" => Frame::Failed("channel error".to_string()),
        "phx_close" => Frame::Closed,
        _ => Frame::Ignored,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOPIC: &str = "realtime:basket:items:user-1";

    #[test]
    fn join_message_scopes_changes_to_owner() {
        let owner = OwnerId::from("user-1");
        let raw = join_message(TOPIC, "items", &owner, "token");
        let value: Value = serde_json::from_str(&raw).unwrap();

        assert_eq!(value["event"], "phx_join");
        assert_eq!(value["topic"], TOPIC);
        let change = &value["payload"]["config"]["postgres_changes"][0];
        assert_eq!(change["table"], "items");
        assert_eq!(change["event"], "*");
        assert_eq!(change["filter"], "user_id=eq.user-1");
        assert_eq!(value["payload"]["access_token"], "token");
    }

    #[test]
    fn channel_topic_includes_table_and_owner() {
        assert_eq!(channel_topic("items", &OwnerId::from("user-1")), TOPIC);
    }

    #[test]
    fn heartbeat_targets_phoenix_topic() {
        let value: Value = serde_json::from_str(&heartbeat_message(7)).unwrap();
        assert_eq!(value["topic"], "phoenix");
        assert_eq!(value["ref"], "7");
    }

    #[test]
    fn parse_frame_reads_change_type() {
        let frame = format!(
            r#"{{"topic":"{TOPIC}","event":"postgres_changes","payload":{{"data":{{"type":"UPDATE","table":"items"}}}},"ref":null}}"#
        );
        assert_eq!(parse_frame(&frame, TOPIC), Frame::Change(ChangeKind::Update));
    }

    #[test]
    fn parse_frame_ignores_other_topics_and_garbage() {
        let frame = r#"{"topic":"phoenix","event":"phx_reply","payload":{"status":"ok"},"ref":"2"}"#;
        assert_eq!(parse_frame(frame, TOPIC), Frame::Ignored);
        assert_eq!(parse_frame("not json", TOPIC), Frame::Ignored);
    }

    #[test]
    fn parse_frame_reports_rejected_join() {
        let frame = format!(
            r#"{{"topic":"{TOPIC}","event":"phx_reply","payload":{{"status":"error","response":{{"reason":"unauthorized"}}}},"ref":"1"}}"#
        );
        assert!(matches!(parse_frame(&frame, TOPIC), Frame::Failed(reason) if reason.contains("unauthorized")));
    }

    #[test]
    fn parse_frame_accepts_successful_join() {
        let frame = format!(
            r#"{{"topic":"{TOPIC}","event":"phx_reply","payload":{{"status":"ok","response":{{}}}},"ref":"1"}}"#
        );
        assert_eq!(parse_frame(&frame, TOPIC), Frame::Ignored);
    }

    #[test]
    fn parse_frame_handles_close() {
        let frame = format!(r#"{{"topic":"{TOPIC}","event":"phx_close","payload":{{}},"ref":"1"}}"#);
        assert_eq!(parse_frame(&frame, TOPIC), Frame::Closed);
    }
}
