//! End-to-end session tests against a mock ambry server.
//!
//! Each test binds a loopback listener, scripts the server side by hand at
//! the byte level, and drives the real event loop with an in-memory input
//! source instead of stdin.

use ambry_client::{Config, Connection, Repl};
use tokio::io::{AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::time::{timeout, Duration};

/// A connected (client Connection, server stream) pair on loopback.
async fn connected_pair() -> (Connection, TcpStream) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let client = TcpStream::connect(addr).await.unwrap();
    let (server, _) = listener.accept().await.unwrap();
    (Connection::from_stream(client), server)
}

/// Read one length-prefixed request payload from the server side.
async fn read_request(server: &mut TcpStream) -> Vec<u8> {
    let mut len_bytes = [0u8; 4];
    server.read_exact(&mut len_bytes).await.unwrap();
    let len = u32::from_le_bytes(len_bytes) as usize;
    let mut payload = vec![0u8; len];
    server.read_exact(&mut payload).await.unwrap();
    payload
}

/// Write one response frame from the server side.
async fn write_response(server: &mut TcpStream, status: u8, body: &[u8]) {
    let mut wire = Vec::with_capacity(5 + body.len());
    wire.push(status);
    wire.extend_from_slice(&(body.len() as u32).to_le_bytes());
    wire.extend_from_slice(body);
    server.write_all(&wire).await.unwrap();
}

fn config(prompt_label: bool) -> Config {
    Config {
        host: "127.0.0.1".to_string(),
        port: 0,
        prompt_label,
    }
}

#[tokio::test]
async fn test_typed_line_reaches_the_wire_byte_exact() {
    let (conn, mut server) = connected_pair().await;

    // Input carries one line, then stays open until the server has seen it
    let (mut input_tx, input_rx) = tokio::io::duplex(64);
    let repl = Repl::with_input(conn, &config(false), BufReader::new(input_rx));
    let session = tokio::spawn(repl.run());

    input_tx.write_all(b"SELECT 1\n").await.unwrap();

    // 4-byte LE length (8) followed by the payload, nothing else
    let mut wire = [0u8; 12];
    timeout(Duration::from_secs(2), server.read_exact(&mut wire))
        .await
        .expect("timed out waiting for request")
        .unwrap();
    assert_eq!(&wire[..4], &[0x08, 0x00, 0x00, 0x00]);
    assert_eq!(&wire[4..], b"SELECT 1");

    write_response(&mut server, 0, b"1").await;

    // Closing input ends the session normally
    drop(input_tx);
    timeout(Duration::from_secs(2), session)
        .await
        .expect("session did not exit")
        .unwrap()
        .unwrap();
}

#[tokio::test]
async fn test_prompt_label_round_trip() {
    let (conn, mut server) = connected_pair().await;

    let (mut input_tx, input_rx) = tokio::io::duplex(64);
    let repl = Repl::with_input(conn, &config(true), BufReader::new(input_rx));
    let session = tokio::spawn(repl.run());

    // First prompt: label round-trip before any input is consumed
    let first = timeout(Duration::from_secs(2), read_request(&mut server))
        .await
        .expect("timed out waiting for label request");
    assert_eq!(first, b"working_db");
    write_response(&mut server, 0, b"test").await;

    input_tx.write_all(b"put x 1\n").await.unwrap();
    let second = timeout(Duration::from_secs(2), read_request(&mut server))
        .await
        .expect("timed out waiting for command");
    assert_eq!(second, b"put x 1");

    // Next prompt fires another round-trip; nonzero status means no db open
    let third = timeout(Duration::from_secs(2), read_request(&mut server))
        .await
        .expect("timed out waiting for second label request");
    assert_eq!(third, b"working_db");
    write_response(&mut server, 1, b"").await;

    drop(input_tx);
    timeout(Duration::from_secs(2), session)
        .await
        .expect("session did not exit")
        .unwrap()
        .unwrap();
}

#[tokio::test]
async fn test_clean_close_in_prompt_mode_ends_normally() {
    let (conn, mut server) = connected_pair().await;

    let (_input_tx, input_rx) = tokio::io::duplex(64);
    let repl = Repl::with_input(conn, &config(true), BufReader::new(input_rx));
    let session = tokio::spawn(repl.run());

    // FIN before any label reply. The socket stays open on this side so
    // the outgoing label request is drained instead of triggering a reset;
    // the round-trip then sees a clean close, not an I/O error.
    server.shutdown().await.unwrap();

    timeout(Duration::from_secs(2), session)
        .await
        .expect("session did not exit")
        .unwrap()
        .expect("clean close during the label round-trip is not a failure");

    drop(server);
}

#[tokio::test]
async fn test_displayed_response_does_not_refetch_label() {
    let (conn, mut server) = connected_pair().await;

    let (input_tx, input_rx) = tokio::io::duplex(64);
    let repl = Repl::with_input(conn, &config(true), BufReader::new(input_rx));
    let session = tokio::spawn(repl.run());

    // Initial prompt fetches the label exactly once
    let first = timeout(Duration::from_secs(2), read_request(&mut server))
        .await
        .expect("timed out waiting for label request");
    assert_eq!(first, b"working_db");
    write_response(&mut server, 0, b"test").await;

    // Server pushes a response; displaying it must not re-prompt
    write_response(&mut server, 0, b"notice").await;

    drop(input_tx);
    timeout(Duration::from_secs(2), session)
        .await
        .expect("session did not exit")
        .unwrap()
        .unwrap();

    // Nothing further reached the wire before the session ended
    let mut buf = [0u8; 1];
    let n = timeout(Duration::from_secs(2), server.read(&mut buf))
        .await
        .expect("timed out draining")
        .unwrap();
    assert_eq!(n, 0, "unexpected bytes on the wire after the response burst");
}

#[tokio::test]
async fn test_server_disconnect_mid_frame_fails_the_session() {
    let (conn, mut server) = connected_pair().await;

    let (_input_tx, input_rx) = tokio::io::duplex(64);
    let repl = Repl::with_input(conn, &config(false), BufReader::new(input_rx));
    let session = tokio::spawn(repl.run());

    // 2 of 5 declared header bytes, then the server goes away
    server.write_all(&[0x00, 0x03]).await.unwrap();
    server.flush().await.unwrap();
    drop(server);

    let result = timeout(Duration::from_secs(2), session)
        .await
        .expect("session did not exit")
        .unwrap();
    let err = result.expect_err("mid-frame disconnect must fail the session");
    assert!(
        matches!(err, ambry_client::ClientError::Read(_)),
        "got: {err:?}"
    );
}

#[tokio::test]
async fn test_clean_server_close_ends_the_session_normally() {
    let (conn, server) = connected_pair().await;

    let (_input_tx, input_rx) = tokio::io::duplex(64);
    let repl = Repl::with_input(conn, &config(false), BufReader::new(input_rx));
    let session = tokio::spawn(repl.run());

    drop(server);

    timeout(Duration::from_secs(2), session)
        .await
        .expect("session did not exit")
        .unwrap()
        .expect("clean close is not a session failure");
}

#[tokio::test]
async fn test_undecodable_body_does_not_kill_the_session() {
    let (conn, mut server) = connected_pair().await;

    let (_input_tx, input_rx) = tokio::io::duplex(64);
    let repl = Repl::with_input(conn, &config(false), BufReader::new(input_rx));
    let session = tokio::spawn(repl.run());

    // Well-framed response whose body is not UTF-8, then a clean close.
    // The loop must warn and keep going, so the session still ends Ok.
    write_response(&mut server, 0, &[0xff, 0xfe, 0xfd]).await;
    write_response(&mut server, 0, b"still here").await;
    drop(server);

    timeout(Duration::from_secs(2), session)
        .await
        .expect("session did not exit")
        .unwrap()
        .expect("one bad frame must not end the session");
}
