use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::oneshot;
use tokio::time::timeout;

use chatroom_relay::{ChatServer, Config, Relay};

const READ_TIMEOUT: Duration = Duration::from_secs(3);

struct TestServer {
    addr: std::net::SocketAddr,
    relay: Arc<Relay>,
    _shutdown: oneshot::Sender<()>,
}

async fn start_server(max_clients: usize) -> TestServer {
    let config = Config {
        max_clients,
        ..Config::default()
    };
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let server = ChatServer::new(listener, &config);
    let addr = server.local_addr().unwrap();
    let relay = server.relay();

    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
    tokio::spawn(server.run_until(async {
        let _ = shutdown_rx.await;
    }));

    TestServer {
        addr,
        relay,
        _shutdown: shutdown_tx,
    }
}

struct TestClient {
    reader: BufReader<OwnedReadHalf>,
    writer: OwnedWriteHalf,
}

impl TestClient {
    async fn connect(addr: std::net::SocketAddr, name: &str) -> Self {
        let stream = TcpStream::connect(addr).await.unwrap();
        let (read_half, write_half) = stream.into_split();
        let mut client = Self {
            reader: BufReader::new(read_half),
            writer: write_half,
        };
        client.send(name).await;
        client
    }

    async fn send_raw(&mut self, bytes: &[u8]) {
        self.writer.write_all(bytes).await.unwrap();
    }

    async fn send(&mut self, line: &str) {
        self.writer
            .write_all(format!("{}\n", line).as_bytes())
            .await
            .unwrap();
    }

    async fn read_line(&mut self) -> String {
        let mut line = String::new();
        timeout(READ_TIMEOUT, self.reader.read_line(&mut line))
            .await
            .expect("timed out waiting for a line")
            .unwrap();
        line
    }

    async fn expect_eof(&mut self) {
        let mut line = String::new();
        let n = timeout(READ_TIMEOUT, self.reader.read_line(&mut line))
            .await
            .expect("timed out waiting for close")
            .unwrap_or(0);
        assert_eq!(n, 0, "unexpected line: {:?}", line);
    }
}

#[tokio::test]
async fn test_chat_scenario() {
    let server = start_server(10).await;

    let mut alice = TestClient::connect(server.addr, "Alice").await;
    assert_eq!(alice.read_line().await, "Welcome to the chatroom, Alice!\n");

    let mut bob = TestClient::connect(server.addr, "Bob").await;
    assert_eq!(bob.read_line().await, "Welcome to the chatroom, Bob!\n");
    assert_eq!(alice.read_line().await, "Bob has joined the chatroom.\n");

    alice.send("hi").await;
    assert_eq!(bob.read_line().await, "Alice: hi\n");

    bob.send("/msg Alice secret").await;
    // Alice never saw her own broadcast: the private line is next
    assert_eq!(alice.read_line().await, "[Private from Bob]: secret\n");

    drop(alice);
    assert_eq!(bob.read_line().await, "Alice has left the chatroom.\n");
    assert!(server.relay.registry().find_by_name("Alice").is_none());
    assert_eq!(server.relay.registry().len(), 1);
}

#[tokio::test]
async fn test_private_message_to_unknown_user() {
    let server = start_server(10).await;

    let mut alice = TestClient::connect(server.addr, "Alice").await;
    alice.read_line().await;

    alice.send("/msg Bob hello").await;
    assert_eq!(alice.read_line().await, "User not found.\n");

    // Malformed /msg is dropped silently
    alice.send("/msg Bob").await;
    alice.send("/msg Alice ping").await;
    assert_eq!(alice.read_line().await, "[Private from Alice]: ping\n");
}

#[tokio::test]
async fn test_exit_command_leaves() {
    let server = start_server(10).await;

    let mut alice = TestClient::connect(server.addr, "Alice").await;
    alice.read_line().await;
    let mut bob = TestClient::connect(server.addr, "Bob").await;
    bob.read_line().await;
    alice.read_line().await;

    alice.send("/exit").await;
    assert_eq!(bob.read_line().await, "Alice has left the chatroom.\n");
    alice.expect_eof().await;
    assert_eq!(server.relay.registry().len(), 1);
}

#[tokio::test]
async fn test_capacity_refuses_connection() {
    let server = start_server(1).await;

    let mut alice = TestClient::connect(server.addr, "Alice").await;
    alice.read_line().await;

    let mut bob = TestClient::connect(server.addr, "Bob").await;
    assert_eq!(bob.read_line().await, "Chatroom is full, try again later.\n");
    bob.expect_eof().await;

    assert_eq!(server.relay.registry().len(), 1);
    assert!(server.relay.registry().find_by_name("Bob").is_none());
}

#[tokio::test]
async fn test_invalid_name_refused() {
    let server = start_server(10).await;

    let mut client = TestClient::connect(server.addr, "A").await;
    assert_eq!(
        client.read_line().await,
        "Name must be between 2 and 31 characters.\n"
    );
    client.expect_eof().await;
    assert!(server.relay.registry().is_empty());
}

#[tokio::test]
async fn test_overlong_line_is_discarded() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let config = Config {
        max_line_length: 16,
        ..Config::default()
    };
    let server = ChatServer::new(listener, &config);
    let addr = server.local_addr().unwrap();
    let (_shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
    tokio::spawn(server.run_until(async {
        let _ = shutdown_rx.await;
    }));

    let mut alice = TestClient::connect(addr, "Alice").await;
    alice.read_line().await;
    let mut bob = TestClient::connect(addr, "Bob").await;
    bob.read_line().await;
    alice.read_line().await;

    alice.send(&"x".repeat(64)).await;
    alice.send("short").await;
    assert_eq!(bob.read_line().await, "Alice: short\n");
}

#[tokio::test]
async fn test_invalid_utf8_keeps_session() {
    let server = start_server(10).await;

    let mut alice = TestClient::connect(server.addr, "Alice").await;
    alice.read_line().await;
    let mut bob = TestClient::connect(server.addr, "Bob").await;
    bob.read_line().await;
    alice.read_line().await;

    alice.send_raw(b"caf\xe9\n").await;
    alice.send("still here").await;

    assert_eq!(bob.read_line().await, "Alice: caf\u{fffd}\n");
    assert_eq!(bob.read_line().await, "Alice: still here\n");
    assert_eq!(server.relay.registry().len(), 2);
    assert!(server.relay.registry().find_by_name("Alice").is_some());
}
