//! Publish and watch against an in-process STOMP broker stand-in.

use futures::{SinkExt, StreamExt};
use meetup_groups::GroupRecord;
use meetup_groups_cli::transport::{
    publish_groups, watch_groups, DeliveryGuard, ReconnectPolicy, StompFrame, TransportError,
};
use std::time::Duration;
use tokio::net::TcpListener;
use tokio_tungstenite::tungstenite::Message;

fn group(id: u64, users: Vec<i64>) -> GroupRecord {
    GroupRecord {
        group_id: id,
        users,
        top_traits: vec!["boardgames".into()],
        latitude: Some(52.23),
        longitude: Some(21.01),
    }
}

async fn bind() -> (TcpListener, String) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    (listener, format!("ws://{addr}/ws"))
}

fn text(frame: StompFrame) -> Message {
    Message::Text(frame.encode())
}

#[tokio::test]
async fn publish_sends_connect_subscribe_send() {
    let (listener, uri) = bind().await;

    let broker = tokio::spawn(async move {
        let (tcp, _) = listener.accept().await.unwrap();
        let mut ws = tokio_tungstenite::accept_async(tcp).await.unwrap();
        let mut frames = Vec::new();
        while let Some(Ok(msg)) = ws.next().await {
            let Message::Text(raw) = msg else { continue };
            let Some(frame) = StompFrame::decode(&raw).unwrap() else { continue };
            if frame.command == "CONNECT" {
                ws.send(text(StompFrame::new("CONNECTED").with_header("version", "1.2")))
                    .await
                    .unwrap();
            }
            let done = frame.command == "DISCONNECT";
            frames.push(frame);
            if done {
                break;
            }
        }
        frames
    });

    let groups = vec![group(1, vec![1, 2, 3]), group(2, vec![4, 5, 6])];
    let policy = ReconnectPolicy::bounded(Duration::ZERO, 1);
    publish_groups(&uri, &groups, &policy).await.unwrap();

    let frames = broker.await.unwrap();
    let commands: Vec<&str> = frames.iter().map(|f| f.command.as_str()).collect();
    assert_eq!(commands, vec!["CONNECT", "SUBSCRIBE", "SEND", "DISCONNECT"]);

    assert_eq!(frames[0].header("accept-version"), Some("1.1,1.2"));
    assert_eq!(frames[0].header("host"), Some("127.0.0.1"));
    assert_eq!(frames[1].header("destination"), Some("/topic/groups"));

    let send = &frames[2];
    assert_eq!(send.header("destination"), Some("/app/groups"));
    assert_eq!(
        send.header("content-length"),
        Some(send.body.len().to_string().as_str())
    );
    let sent: Vec<GroupRecord> = serde_json::from_str(&send.body).unwrap();
    assert_eq!(sent, groups);
}

#[tokio::test]
async fn publish_reports_broker_rejection() {
    let (listener, uri) = bind().await;

    tokio::spawn(async move {
        let (tcp, _) = listener.accept().await.unwrap();
        let mut ws = tokio_tungstenite::accept_async(tcp).await.unwrap();
        let _connect = ws.next().await;
        ws.send(text(
            StompFrame::new("ERROR").with_header("message", "bad credentials"),
        ))
        .await
        .unwrap();
    });

    let policy = ReconnectPolicy::bounded(Duration::ZERO, 1);
    let err = publish_groups(&uri, &[group(1, vec![1, 2, 3])], &policy)
        .await
        .unwrap_err();
    match err {
        TransportError::AttemptsExhausted {
            attempts,
            last_error,
            ..
        } => {
            assert_eq!(attempts, 1);
            assert!(last_error.contains("bad credentials"), "{last_error}");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn watch_delivers_each_group_once() {
    let (listener, uri) = bind().await;

    tokio::spawn(async move {
        let (tcp, _) = listener.accept().await.unwrap();
        // Refuse reconnects once this session ends.
        drop(listener);
        let mut ws = tokio_tungstenite::accept_async(tcp).await.unwrap();

        let _connect = ws.next().await;
        ws.send(text(StompFrame::new("CONNECTED"))).await.unwrap();
        let _subscribe = ws.next().await;

        let batch = serde_json::to_string(&vec![group(1, vec![1, 2, 3]), group(2, vec![4, 5, 6])])
            .unwrap();
        let single = serde_json::to_string(&group(3, vec![7, 8, 9])).unwrap();
        let redelivered = serde_json::to_string(&group(1, vec![1, 2, 3])).unwrap();

        for body in [batch, single, "not json".to_string(), redelivered] {
            let frame = StompFrame::new("MESSAGE")
                .with_header("destination", "/topic/groups")
                .with_header("subscription", "sub-groups-0")
                .with_body(body);
            ws.send(text(frame)).await.unwrap();
        }
        ws.send(Message::Text("\n".into())).await.unwrap();
        ws.close(None).await.ok();
    });

    let policy = ReconnectPolicy::bounded(Duration::ZERO, 1);
    let mut guard = DeliveryGuard::default();
    let mut seen = Vec::new();
    let result = watch_groups(&uri, &policy, &mut guard, |g| seen.push(g.group_id)).await;

    assert_eq!(seen, vec![1, 2, 3]);
    assert!(matches!(
        result,
        Err(TransportError::AttemptsExhausted { .. })
    ));
    assert_eq!(guard.len(), 3);
}
