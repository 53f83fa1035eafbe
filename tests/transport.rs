//! Integration tests for the transport connection.
//!
//! These tests run against in-process mock servers on the loopback
//! interface, so no real mail server is required.

use std::io::{Read, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::thread;
use std::time::{Duration, Instant};

use mailwire::{Error, FailureCause, TransportConnection, TransportOptions};

fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

/// Spawns a one-shot server and hands the accepted socket to `serve`.
fn spawn_server<F>(serve: F) -> SocketAddr
where
    F: FnOnce(TcpStream) + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind loopback");
    let addr = listener.local_addr().expect("local addr");
    thread::spawn(move || {
        if let Ok((sock, _)) = listener.accept() {
            serve(sock);
        }
    });
    addr
}

/// Serves an echo loop: every byte received is written straight back.
fn echo(mut sock: TcpStream) {
    let mut buf = [0_u8; 1024];
    loop {
        match sock.read(&mut buf) {
            Ok(0) | Err(_) => break,
            Ok(n) => {
                if sock.write_all(&buf[..n]).is_err() {
                    break;
                }
            }
        }
    }
}

fn connect(addr: SocketAddr, options: TransportOptions) -> TransportConnection {
    TransportConnection::connect(&addr.ip().to_string(), addr.port(), options)
        .expect("connect to mock server")
}

#[test]
fn test_connect_plain() {
    init_logging();
    let addr = spawn_server(|mut sock| {
        // Hold the connection open until the client goes away.
        let _ = sock.read(&mut [0_u8; 1]);
    });

    let conn = connect(addr, TransportOptions::default());
    assert!(conn.is_connected());
    assert!(!conn.is_tls());
}

#[test]
fn test_connect_refused() {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind loopback");
    let addr = listener.local_addr().expect("local addr");
    drop(listener);

    let result = TransportConnection::connect(
        &addr.ip().to_string(),
        addr.port(),
        TransportOptions::default(),
    );
    match result {
        Err(Error::ConnectionFailed { addr: target, .. }) => {
            assert!(target.contains(&addr.port().to_string()));
        }
        other => panic!("expected ConnectionFailed, got {other:?}"),
    }
}

#[test]
fn test_echo_round_trip() {
    init_logging();
    let addr = spawn_server(echo);
    let mut conn = connect(addr, TransportOptions::default());

    conn.send_line("HELLO").expect("send");
    assert_eq!(conn.read_line(false).expect("read"), "HELLO\r\n");

    conn.send_line("HELLO").expect("send");
    assert_eq!(conn.read_line(true).expect("read"), "HELLO");

    assert!(conn.is_connected());
}

#[test]
fn test_empty_line_round_trip() {
    let addr = spawn_server(echo);
    let mut conn = connect(addr, TransportOptions::default());

    conn.send_line("").expect("send");
    assert_eq!(conn.read_line(false).expect("read"), "\r\n");
}

#[test]
fn test_partial_delivery_spans_reads() {
    let addr = spawn_server(|mut sock| {
        sock.write_all(b"AB").expect("write first fragment");
        sock.flush().expect("flush");
        thread::sleep(Duration::from_millis(100));
        sock.write_all(b"CD\r\n").expect("write second fragment");
    });

    let options = TransportOptions::builder()
        .timeout(Duration::from_secs(5))
        .build()
        .expect("options");
    let mut conn = connect(addr, options);

    assert_eq!(conn.read_line(false).expect("read"), "ABCD\r\n");
}

#[test]
fn test_pipelined_lines_are_split() {
    let addr = spawn_server(|mut sock| {
        sock.write_all(b"+OK one\r\n+OK two\r\n").expect("write burst");
        // Keep the socket open so the second read cannot hit EOF even if
        // the carry buffer were broken.
        thread::sleep(Duration::from_millis(200));
    });

    let mut conn = connect(addr, TransportOptions::default());
    assert_eq!(conn.read_line(false).expect("read"), "+OK one\r\n");
    assert_eq!(conn.read_line(false).expect("read"), "+OK two\r\n");
}

#[test]
fn test_trim_strips_all_trailing_line_breaks() {
    let addr = spawn_server(|mut sock| {
        sock.write_all(b"DATA\r\r\n").expect("write");
    });

    let mut conn = connect(addr, TransportOptions::default());
    assert_eq!(conn.read_line(true).expect("read"), "DATA");
}

#[test]
fn test_peer_close_mid_line() {
    let addr = spawn_server(|mut sock| {
        sock.write_all(b"PARTIAL").expect("write fragment");
        // Drop without ever sending a terminator.
    });

    let mut conn = connect(addr, TransportOptions::default());
    let err = conn.read_line(false).expect_err("read must fail");

    assert!(err.is_closed_by_peer(), "unexpected error: {err:?}");
    assert!(!conn.is_connected());

    // The dead connection fails fast, it does not hang or loop.
    let err = conn.read_line(false).expect_err("dead connection");
    assert!(matches!(
        err,
        Error::ReadFailed {
            cause: FailureCause::NotConnected
        }
    ));
}

#[test]
fn test_read_timeout_is_bounded() {
    let addr = spawn_server(|mut sock| {
        // Never respond.
        let _ = sock.read(&mut [0_u8; 1]);
    });

    let options = TransportOptions::builder()
        .timeout(Duration::from_millis(200))
        .build()
        .expect("options");
    let mut conn = connect(addr, options);

    let started = Instant::now();
    let err = conn.read_line(false).expect_err("read must time out");
    let elapsed = started.elapsed();

    assert!(err.is_timeout(), "unexpected error: {err:?}");
    assert!(
        elapsed < Duration::from_secs(2),
        "timed out after {elapsed:?}"
    );
    assert!(!conn.is_connected());
}

#[test]
fn test_close_is_idempotent() {
    let addr = spawn_server(|mut sock| {
        let _ = sock.read(&mut [0_u8; 1]);
    });

    let mut conn = connect(addr, TransportOptions::default());
    assert!(conn.is_connected());

    conn.close();
    assert!(!conn.is_connected());
    conn.close();
    assert!(!conn.is_connected());

    let err = conn.send_line("NOOP").expect_err("send on closed");
    assert!(matches!(
        err,
        Error::WriteFailed {
            cause: FailureCause::NotConnected
        }
    ));
    let err = conn.read_line(false).expect_err("read on closed");
    assert!(matches!(
        err,
        Error::ReadFailed {
            cause: FailureCause::NotConnected
        }
    ));
}

#[test]
fn test_set_options_applies_timeout_to_live_socket() {
    let addr = spawn_server(|mut sock| {
        let _ = sock.read(&mut [0_u8; 1]);
    });

    let mut conn = connect(addr, TransportOptions::default());
    assert_eq!(conn.options().timeout(), Duration::from_secs(5));

    let faster = TransportOptions::builder()
        .timeout(Duration::from_millis(100))
        .build()
        .expect("options");
    conn.set_options(faster).expect("swap options");

    let started = Instant::now();
    let err = conn.read_line(false).expect_err("read must time out");
    assert!(err.is_timeout(), "unexpected error: {err:?}");
    assert!(started.elapsed() < Duration::from_secs(2));
}

#[cfg(feature = "tls")]
#[test]
fn test_tls_against_plain_endpoint_fails_bounded() {
    let addr = spawn_server(|mut sock| {
        // A plain-text greeting is not a TLS ServerHello.
        let _ = sock.write_all(b"220 mail.example.com ESMTP\r\n");
        thread::sleep(Duration::from_millis(500));
    });

    let options = TransportOptions::builder()
        .tls(true)
        .timeout(Duration::from_secs(2))
        .build()
        .expect("options");

    let started = Instant::now();
    let result =
        TransportConnection::connect(&addr.ip().to_string(), addr.port(), options);
    let elapsed = started.elapsed();

    assert!(
        matches!(result, Err(Error::ConnectionFailed { .. })),
        "expected ConnectionFailed, got {result:?}"
    );
    assert!(
        elapsed < Duration::from_secs(10),
        "handshake hung for {elapsed:?}"
    );
}

mod wire_format {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(16))]

        /// Every line without an embedded terminator travels the wire as
        /// exactly the line plus CRLF.
        #[test]
        fn round_trip(line in "[^\r\n]{0,64}") {
            let addr = spawn_server(echo);
            let mut conn = connect(addr, TransportOptions::default());

            conn.send_line(&line).expect("send");
            let echoed = conn.read_line(false).expect("read");

            prop_assert_eq!(echoed, format!("{line}\r\n"));
        }
    }
}
