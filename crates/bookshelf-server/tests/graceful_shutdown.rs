//! Shutdown behavior against real sockets.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use bookshelf_core::BookStore;
use bookshelf_server::{App, Server, ServerConfig, ServerError, ShutdownSignal};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::task::JoinHandle;

const FORM_BODY: &str = "title=Dune&author=Herbert";

async fn start(
    store: Arc<BookStore>,
    shutdown_timeout: Duration,
) -> (SocketAddr, ShutdownSignal, JoinHandle<Result<(), ServerError>>) {
    let config = ServerConfig::builder()
        .http_addr("127.0.0.1:0")
        .shutdown_timeout(shutdown_timeout)
        .build();
    let bound = Server::new(config, App::crud(store, "template.html"))
        .bind()
        .await
        .unwrap();
    let addr = bound.local_addr();
    let shutdown = ShutdownSignal::new();
    let serving = tokio::spawn(bound.serve(shutdown.clone()));
    (addr, shutdown, serving)
}

/// Sends the request head and the first bytes of the body, leaving the
/// request in flight.
async fn begin_upload(addr: SocketAddr) -> TcpStream {
    let mut stream = TcpStream::connect(addr).await.unwrap();
    let head = format!(
        "POST /books HTTP/1.1\r\nHost: {addr}\r\nContent-Type: application/x-www-form-urlencoded\r\nContent-Length: {}\r\n\r\n",
        FORM_BODY.len()
    );
    stream.write_all(head.as_bytes()).await.unwrap();
    stream.write_all(&FORM_BODY.as_bytes()[..8]).await.unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;
    stream
}

#[tokio::test]
async fn test_in_flight_request_completes_during_drain() {
    let store = Arc::new(BookStore::new());
    let (addr, shutdown, serving) = start(Arc::clone(&store), Duration::from_secs(2)).await;

    let mut stream = begin_upload(addr).await;
    shutdown.trigger();
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(!serving.is_finished(), "server must wait for the open request");

    stream.write_all(&FORM_BODY.as_bytes()[8..]).await.unwrap();
    let mut response = String::new();
    stream.read_to_string(&mut response).await.unwrap();

    assert!(response.starts_with("HTTP/1.1 201 Created"), "{response}");
    assert!(response.ends_with("{\"id\":\"1\",\"title\":\"Dune\",\"author\":\"Herbert\"}\n"));

    let result = tokio::time::timeout(Duration::from_secs(2), serving)
        .await
        .expect("server should finish draining")
        .unwrap();
    assert!(result.is_ok());
    assert_eq!(store.len(), 1);
}

#[tokio::test]
async fn test_stalled_request_misses_deadline() {
    let store = Arc::new(BookStore::new());
    let (addr, shutdown, serving) = start(store, Duration::from_millis(200)).await;

    let _stream = begin_upload(addr).await;
    shutdown.trigger();

    let result = tokio::time::timeout(Duration::from_secs(2), serving)
        .await
        .expect("deadline should end the wait")
        .unwrap();
    assert!(matches!(
        result,
        Err(ServerError::ShutdownTimeout { active: 1, .. })
    ));
}

#[tokio::test]
async fn test_idle_connection_does_not_block_shutdown() {
    let store = Arc::new(BookStore::new());
    let (addr, shutdown, serving) = start(store, Duration::from_secs(2)).await;

    let _idle = TcpStream::connect(addr).await.unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;
    shutdown.trigger();

    let result = tokio::time::timeout(Duration::from_secs(1), serving)
        .await
        .expect("idle connections should close at once")
        .unwrap();
    assert!(result.is_ok());
}

#[tokio::test]
async fn test_no_new_connections_after_shutdown() {
    let store = Arc::new(BookStore::new());
    let (addr, shutdown, serving) = start(store, Duration::from_secs(1)).await;

    shutdown.trigger();
    tokio::time::timeout(Duration::from_secs(1), serving)
        .await
        .unwrap()
        .unwrap()
        .unwrap();

    assert!(TcpStream::connect(addr).await.is_err());
}
