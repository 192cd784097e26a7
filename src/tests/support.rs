//! In-process STOMP-over-websocket broker and log capture shared by the test modules.

use futures_util::{SinkExt, StreamExt};
use std::io;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio_tungstenite::accept_async;
use tungstenite::protocol::Message as WsMessage;

use crate::transport::{Command, StompFrame};

/// Collects formatted `tracing` output so tests can assert on log lines.
#[derive(Clone, Default)]
pub(crate) struct LogCapture(Arc<Mutex<Vec<u8>>>);

impl LogCapture {
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl io::Write for LogCapture {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for LogCapture {
    type Writer = LogCapture;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

pub(crate) struct FakeBroker {
    pub addr: SocketAddr,
    received: mpsc::UnboundedReceiver<StompFrame>,
    current: Arc<Mutex<Option<mpsc::UnboundedSender<WsMessage>>>>,
    connections: Arc<AtomicUsize>,
}

impl FakeBroker {
    /// Starts a broker that answers CONNECT with CONNECTED, echoing `userId`.
    pub async fn start() -> Self {
        Self::start_with(false).await
    }

    /// Starts a broker that answers CONNECT with an ERROR frame.
    pub async fn start_rejecting() -> Self {
        Self::start_with(true).await
    }

    async fn start_with(reject: bool) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (received_tx, received) = mpsc::unbounded_channel();
        let current = Arc::new(Mutex::new(None));
        let connections = Arc::new(AtomicUsize::new(0));

        let server_current = current.clone();
        let server_connections = connections.clone();
        tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                let ws_stream = match accept_async(stream).await {
                    Ok(ws) => ws,
                    Err(_) => continue,
                };
                let number = server_connections.fetch_add(1, Ordering::SeqCst) + 1;
                let (mut ws_sender, mut ws_receiver) = ws_stream.split();
                let (tx, mut rx) = mpsc::unbounded_channel::<WsMessage>();
                *server_current.lock().unwrap() = Some(tx.clone());

                tokio::spawn(async move {
                    while let Some(msg) = rx.recv().await {
                        let closing = msg.is_close();
                        if ws_sender.send(msg).await.is_err() || closing {
                            break;
                        }
                    }
                });

                let received_tx = received_tx.clone();
                tokio::spawn(async move {
                    while let Some(Ok(msg)) = ws_receiver.next().await {
                        let Ok(text) = msg.to_text() else { continue };
                        let Ok(Some(frame)) = StompFrame::decode(text) else {
                            continue;
                        };
                        if frame.command == Command::Connect {
                            let reply = if reject {
                                StompFrame::new(Command::Error)
                                    .header("message", "bad credentials")
                            } else {
                                StompFrame::new(Command::Connected)
                                    .header("version", "1.2")
                                    .header("session", format!("sess-{number}"))
                                    .header("userId", frame.get("userId").unwrap_or_default())
                            };
                            let _ = tx.send(WsMessage::text(reply.encode()));
                        }
                        let _ = received_tx.send(frame);
                    }
                });
            }
        });

        Self {
            addr,
            received,
            current,
            connections,
        }
    }

    pub fn url(&self) -> String {
        format!("ws://{}/websocket", self.addr)
    }

    pub fn connections(&self) -> usize {
        self.connections.load(Ordering::SeqCst)
    }

    /// Next frame the client sent, in order.
    pub async fn next_received(&mut self) -> StompFrame {
        tokio::time::timeout(Duration::from_secs(5), self.received.recv())
            .await
            .expect("timed out waiting for a client frame")
            .expect("broker stopped")
    }

    pub fn send_raw(&self, msg: WsMessage) {
        let current = self.current.lock().unwrap();
        current
            .as_ref()
            .expect("no client connected")
            .send(msg)
            .expect("connection gone");
    }

    /// Delivers a MESSAGE frame on `destination` to the connected client.
    pub fn deliver(&self, destination: &str, body: &str) {
        let frame = StompFrame::new(Command::Message)
            .header("destination", destination)
            .header("subscription", "sub-0")
            .header("message-id", "m-1")
            .header("content-type", "application/json")
            .body(body);
        self.send_raw(WsMessage::text(frame.encode()));
    }

    /// Closes the current websocket from the broker side.
    pub fn drop_connection(&self) {
        self.send_raw(WsMessage::Close(None));
    }
}
