// tests/integration_test.rs

//! Integration tests for gridwire
//!
//! These tests drive the full client end-to-end against an in-process TCP
//! server, verifying connection lifecycle, snapshot delivery, and the input
//! path.

use gridwire::GameClient;
use gridwire::client::ConnectionState;
use gridwire::config::Config;
use gridwire::core::GridwireError;
use gridwire::core::snapshot::{GamePhase, InputEvent, Snapshot, TileId};
use std::net::SocketAddr;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::time::{sleep, timeout};

fn snapshot(phase: GamePhase, status: &str) -> Snapshot {
    Snapshot {
        tiles: vec![vec![TileId::from("floor"); 5]; 5],
        entities: vec![],
        messages: vec![],
        status: status.to_string(),
        phase,
    }
}

fn config_for(addr: SocketAddr) -> Config {
    Config {
        host: addr.ip().to_string(),
        port: addr.port(),
        ..Config::default()
    }
}

async fn bind() -> (TcpListener, SocketAddr) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    (listener, addr)
}

async fn wait_for_state(client: &GameClient, state: ConnectionState) {
    timeout(Duration::from_secs(5), async {
        while client.state() != state {
            sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .unwrap_or_else(|_| panic!("client never reached {state:?}"));
}

#[tokio::test]
async fn test_snapshots_arrive_in_server_order() {
    let (listener, addr) = bind().await;

    let server = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        socket
            .write_all(&snapshot(GamePhase::Playing, "hp:10").encode_to_vec().unwrap())
            .await
            .unwrap();
        socket
            .write_all(&snapshot(GamePhase::Win, "hp:10").encode_to_vec().unwrap())
            .await
            .unwrap();
        socket.flush().await.unwrap();
        // Hold the connection open while the client drains the stream.
        sleep(Duration::from_millis(200)).await;
    });

    let (client, mut snapshots) = GameClient::connect(&config_for(addr)).await.unwrap();
    assert!(client.is_connected());

    let first = timeout(Duration::from_secs(5), snapshots.recv())
        .await
        .unwrap()
        .unwrap();
    let second = timeout(Duration::from_secs(5), snapshots.recv())
        .await
        .unwrap()
        .unwrap();

    assert_eq!(first.phase, GamePhase::Playing);
    assert_eq!(second.phase, GamePhase::Win);

    server.await.unwrap();
    client.shutdown().await;
}

#[tokio::test]
async fn test_frame_split_across_writes_is_reassembled() {
    let (listener, addr) = bind().await;
    let expected = snapshot(GamePhase::Playing, "hp:7");
    let frame = expected.encode_to_vec().unwrap();

    let server = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let third = frame.len() / 3;
        for chunk in [&frame[..third], &frame[third..2 * third], &frame[2 * third..]] {
            socket.write_all(chunk).await.unwrap();
            socket.flush().await.unwrap();
            sleep(Duration::from_millis(20)).await;
        }
        sleep(Duration::from_millis(200)).await;
    });

    let (client, mut snapshots) = GameClient::connect(&config_for(addr)).await.unwrap();

    let decoded = timeout(Duration::from_secs(5), snapshots.recv())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(decoded, expected);

    server.await.unwrap();
    client.shutdown().await;
}

#[tokio::test]
async fn test_peer_close_fails_connection_once_and_ends_stream() {
    let (listener, addr) = bind().await;

    let server = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        socket
            .write_all(&snapshot(GamePhase::Playing, "hp:10").encode_to_vec().unwrap())
            .await
            .unwrap();
        socket.flush().await.unwrap();
        // Dropping the socket is a clean end-of-stream for the client.
    });

    let (client, mut snapshots) = GameClient::connect(&config_for(addr)).await.unwrap();
    server.await.unwrap();

    // The snapshot decoded before the close is still delivered.
    let delivered = timeout(Duration::from_secs(5), snapshots.recv())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(delivered.phase, GamePhase::Playing);

    // Then the stream ends, and it stays ended.
    assert!(timeout(Duration::from_secs(5), snapshots.recv()).await.unwrap().is_none());
    assert!(snapshots.recv().await.is_none());

    wait_for_state(&client, ConnectionState::Failed).await;
    assert!(!client.is_connected());

    client.shutdown().await;
}

#[tokio::test]
async fn test_send_after_peer_close_is_a_write_error() {
    let (listener, addr) = bind().await;

    let server = tokio::spawn(async move {
        let (socket, _) = listener.accept().await.unwrap();
        drop(socket);
    });

    let (client, mut snapshots) = GameClient::connect(&config_for(addr)).await.unwrap();
    server.await.unwrap();
    wait_for_state(&client, ConnectionState::Failed).await;

    let err = client.send(InputEvent::new("ENTER")).await.unwrap_err();
    assert!(matches!(err, GridwireError::Write(_)), "got {err:?}");

    // The event loop exited in an orderly way; nothing crashed.
    assert!(snapshots.recv().await.is_none());
    client.shutdown().await;
}

#[tokio::test]
async fn test_input_event_reaches_server_as_raw_bytes() {
    let (listener, addr) = bind().await;

    let server = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut key = [0u8; 5];
        socket.read_exact(&mut key).await.unwrap();
        assert_eq!(&key, b"ENTER");
        socket
            .write_all(&snapshot(GamePhase::Playing, "hp:10").encode_to_vec().unwrap())
            .await
            .unwrap();
        socket.flush().await.unwrap();
        sleep(Duration::from_millis(200)).await;
    });

    let (client, mut snapshots) = GameClient::connect(&config_for(addr)).await.unwrap();
    client.send(InputEvent::new("ENTER")).await.unwrap();

    let reply = timeout(Duration::from_secs(5), snapshots.recv())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(reply.status, "hp:10");

    server.await.unwrap();
    client.shutdown().await;
}

#[tokio::test]
async fn test_connect_to_unreachable_address_fails() {
    let (listener, addr) = bind().await;
    drop(listener);

    let err = GameClient::connect(&config_for(addr)).await.unwrap_err();
    assert!(matches!(err, GridwireError::Connect(_)), "got {err:?}");
}

#[tokio::test]
async fn test_garbage_stream_fails_the_connection() {
    let (listener, addr) = bind().await;

    let server = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        // A hostile length prefix: advertises a 4 GiB frame.
        socket.write_all(&[0xff; 8]).await.unwrap();
        socket.flush().await.unwrap();
        sleep(Duration::from_millis(200)).await;
    });

    let (client, mut snapshots) = GameClient::connect(&config_for(addr)).await.unwrap();

    assert!(timeout(Duration::from_secs(5), snapshots.recv()).await.unwrap().is_none());
    wait_for_state(&client, ConnectionState::Failed).await;

    server.await.unwrap();
    client.shutdown().await;
}

#[tokio::test]
async fn test_shutdown_stops_the_event_loop() {
    let (listener, addr) = bind().await;

    let server = tokio::spawn(async move {
        let (_socket, _) = listener.accept().await.unwrap();
        sleep(Duration::from_secs(5)).await;
    });

    let (client, mut snapshots) = GameClient::connect(&config_for(addr)).await.unwrap();
    assert!(client.is_connected());

    client.shutdown().await;

    // The channel closes when the loop exits.
    assert!(timeout(Duration::from_secs(5), snapshots.recv()).await.unwrap().is_none());
    server.abort();
}
