use super::frame::{Command, StompFrame};
use super::{Connector, Session, StompConnector};
use crate::config::BrokerSettings;
use crate::tests::support::FakeBroker;
use crate::utils::ClientError;
use tungstenite::protocol::Message as WsMessage;

fn settings_for(url: String) -> BrokerSettings {
    BrokerSettings {
        url,
        user_id: "back-end".to_string(),
        connect_timeout_ms: 2_000,
    }
}

#[test]
fn test_encode_send_frame() {
    let frame = StompFrame::new(Command::Send)
        .header("destination", "/app/chat/notice")
        .header("content-type", "application/json")
        .body("{}");
    assert_eq!(
        frame.encode(),
        "SEND\ndestination:/app/chat/notice\ncontent-type:application/json\n\n{}\0"
    );
}

#[test]
fn test_header_escaping() {
    let frame = StompFrame::new(Command::Message).header("note", "a:b\\c\nd");
    let wire = frame.encode();
    assert!(wire.contains("note:a\\cb\\\\c\\nd\n"));

    let back = StompFrame::decode(&wire).unwrap().unwrap();
    assert_eq!(back.get("note"), Some("a:b\\c\nd"));
}

#[test]
fn test_connect_headers_are_not_escaped() {
    let frame = StompFrame::new(Command::Connect).header("host", "localhost:9901");
    assert!(frame.encode().contains("host:localhost:9901\n"));
}

#[test]
fn test_decode_message_with_crlf_and_trailing_eol() {
    let wire = "MESSAGE\r\ndestination:/topic/chat\r\nsubscription:sub-0\r\n\r\n{\"type\":\"CHAT\"}\0\n";
    let frame = StompFrame::decode(wire).unwrap().unwrap();
    assert_eq!(frame.command, Command::Message);
    assert_eq!(frame.get("destination"), Some("/topic/chat"));
    assert_eq!(frame.body, "{\"type\":\"CHAT\"}");
}

#[test]
fn test_decode_honours_content_length() {
    let wire = "MESSAGE\ncontent-length:5\n\na\0b\0c\0";
    let frame = StompFrame::decode(wire).unwrap().unwrap();
    assert_eq!(frame.body, "a\0b\0c");
}

#[test]
fn test_repeated_header_first_wins() {
    let wire = "MESSAGE\nfoo:first\nfoo:second\n\n\0";
    let frame = StompFrame::decode(wire).unwrap().unwrap();
    assert_eq!(frame.get("foo"), Some("first"));
}

#[test]
fn test_heartbeat_is_not_a_frame() {
    assert_eq!(StompFrame::decode("\n").unwrap(), None);
    assert_eq!(StompFrame::decode("\r\n\r\n").unwrap(), None);
    assert_eq!(StompFrame::decode("").unwrap(), None);
}

#[test]
fn test_malformed_frames_are_protocol_errors() {
    for wire in [
        "BOGUS\n\n\0",
        "MESSAGE\ndestination:/topic/chat\n\nno terminator",
        "MESSAGE\nno-colon-here\n\n\0",
        "MESSAGE\ncontent-length:99\n\nshort\0",
        "MESSAGE\ncontent-length:abc\n\n\0",
        "MESSAGE\nbad:\\x\n\n\0",
        "MESSAGE",
    ] {
        let err = StompFrame::decode(wire).unwrap_err();
        assert_eq!(err.as_label(), "protocol_error", "input {wire:?}");
        assert!(err.is_recoverable());
    }
}

#[test]
fn test_error_message_summary() {
    let frame = StompFrame::new(Command::Error)
        .header("message", "bad destination")
        .body("details");
    assert_eq!(frame.error_message(), "bad destination: details");
    assert_eq!(
        StompFrame::new(Command::Error).body("only body").error_message(),
        "only body"
    );
}

#[tokio::test]
async fn test_connect_handshake_and_traffic() {
    let mut broker = FakeBroker::start().await;
    let connector = StompConnector::new(&settings_for(broker.url()));

    let mut session = connector.connect().await.expect("connect");
    assert_eq!(session.session_id(), "sess-1");
    assert_eq!(session.connected_frame().get("userId"), Some("back-end"));

    let connect = broker.next_received().await;
    assert_eq!(connect.command, Command::Connect);
    assert_eq!(connect.get("accept-version"), Some("1.2"));
    assert_eq!(connect.get("host"), Some("127.0.0.1"));
    assert_eq!(connect.get("userId"), Some("back-end"));

    session.subscribe("/topic/chat").await.unwrap();
    session.subscribe("/topic/notice").await.unwrap();
    let first = broker.next_received().await;
    let second = broker.next_received().await;
    assert_eq!(first.command, Command::Subscribe);
    assert_eq!(first.get("id"), Some("sub-0"));
    assert_eq!(first.get("destination"), Some("/topic/chat"));
    assert_eq!(second.get("id"), Some("sub-1"));
    assert_eq!(second.get("destination"), Some("/topic/notice"));

    session
        .send("/app/chat/notice", "{\"type\":\"NOTICE\"}".to_string())
        .await
        .unwrap();
    let sent = broker.next_received().await;
    assert_eq!(sent.command, Command::Send);
    assert_eq!(sent.get("destination"), Some("/app/chat/notice"));
    assert_eq!(sent.get("content-type"), Some("application/json"));
    assert_eq!(sent.body, "{\"type\":\"NOTICE\"}");

    broker.send_raw(WsMessage::text("\n"));
    broker.deliver("/topic/chat", "{\"type\":\"CHAT\"}");
    let inbound = session.next_frame().await.unwrap().unwrap();
    assert_eq!(inbound.command, Command::Message);
    assert_eq!(inbound.get("destination"), Some("/topic/chat"));

    broker.send_raw(WsMessage::text("garbage"));
    let err = session.next_frame().await.unwrap().unwrap_err();
    assert!(err.is_recoverable());

    broker.drop_connection();
    assert!(session.next_frame().await.is_none());
}

#[tokio::test]
async fn test_close_sends_disconnect() {
    let mut broker = FakeBroker::start().await;
    let connector = StompConnector::new(&settings_for(broker.url()));
    let mut session = connector.connect().await.unwrap();
    let _connect = broker.next_received().await;

    session.close().await;
    let disconnect = broker.next_received().await;
    assert_eq!(disconnect.command, Command::Disconnect);
}

#[tokio::test]
async fn test_rejected_handshake() {
    let broker = FakeBroker::start_rejecting().await;
    let connector = StompConnector::new(&settings_for(broker.url()));
    let err = connector.connect().await.unwrap_err();
    assert_eq!(
        err,
        ClientError::Handshake {
            error: "bad credentials".to_string()
        }
    );
}

#[tokio::test]
async fn test_unreachable_broker() {
    let addr = {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        listener.local_addr().unwrap()
    };
    let connector = StompConnector::new(&settings_for(format!("ws://{addr}/websocket")));
    let err = connector.connect().await.unwrap_err();
    assert_eq!(err.as_label(), "connect_failed");
}

#[tokio::test]
async fn test_silent_broker_times_out() {
    // Accepts TCP but never completes the websocket upgrade
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((stream, _)) = listener.accept().await {
            held.push(stream);
        }
    });

    let connector = StompConnector::new(&BrokerSettings {
        url: format!("ws://{addr}/websocket"),
        user_id: "back-end".to_string(),
        connect_timeout_ms: 200,
    });
    let err = connector.connect().await.unwrap_err();
    assert_eq!(err.as_label(), "timeout");
}
