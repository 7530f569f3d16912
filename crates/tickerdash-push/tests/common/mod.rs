//! Mock push server for integration tests.
//!
//! Accepts websocket connections, counts them, and lets the test push text
//! frames to every connected client or drop all connections.

use std::net::SocketAddr;
use std::sync::Arc;

use futures_util::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{broadcast, Mutex};
use tokio_tungstenite::{accept_async, tungstenite::Message};

#[derive(Debug, Clone)]
enum Command {
    Send(String),
    Close,
}

pub struct MockPushServer {
    addr: SocketAddr,
    commands: broadcast::Sender<Command>,
    connections: Arc<Mutex<u32>>,
}

impl MockPushServer {
    pub async fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (commands, _) = broadcast::channel(32);
        let connections = Arc::new(Mutex::new(0u32));

        let commands_clone = commands.clone();
        let connections_clone = connections.clone();
        tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                let rx = commands_clone.subscribe();
                tokio::spawn(handle_connection(stream, rx, connections_clone.clone()));
            }
        });

        Self {
            addr,
            commands,
            connections,
        }
    }

    pub fn url(&self) -> String {
        format!("ws://{}", self.addr)
    }

    pub async fn connection_count(&self) -> u32 {
        *self.connections.lock().await
    }

    /// Send a text frame to every connected client.
    pub fn push(&self, frame: &str) {
        let _ = self.commands.send(Command::Send(frame.to_string()));
    }

    /// Close every open connection from the server side.
    pub fn drop_connections(&self) {
        let _ = self.commands.send(Command::Close);
    }
}

async fn handle_connection(
    stream: TcpStream,
    mut commands: broadcast::Receiver<Command>,
    connections: Arc<Mutex<u32>>,
) {
    *connections.lock().await += 1;

    let ws_stream = match accept_async(stream).await {
        Ok(ws) => ws,
        Err(e) => {
            eprintln!("WebSocket handshake failed: {e}");
            return;
        }
    };

    let (mut write, mut read) = ws_stream.split();
    loop {
        tokio::select! {
            cmd = commands.recv() => match cmd {
                Ok(Command::Send(text)) => {
                    if write.send(Message::Text(text)).await.is_err() {
                        break;
                    }
                }
                Ok(Command::Close) | Err(_) => {
                    let _ = write.send(Message::Close(None)).await;
                    break;
                }
            },
            msg = read.next() => match msg {
                Some(Ok(Message::Ping(data))) => {
                    let _ = write.send(Message::Pong(data)).await;
                }
                Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                _ => {}
            },
        }
    }
}
