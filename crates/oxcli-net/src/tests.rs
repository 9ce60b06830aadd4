//! Socket-level tests for the backend and the session listener.

use std::io::{Read, Write};
use std::net::TcpStream;
use std::time::Duration;

use oxcli_types::backend::NetworkBackend;

use super::*;

/// Helper: find a free TCP port by binding to port 0 and releasing it.
fn free_port() -> u16 {
    let tmp = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = tmp.local_addr().unwrap().port();
    drop(tmp);
    port
}

fn settle() {
    std::thread::sleep(Duration::from_millis(50));
}

fn started() -> (SessionListener, StdNetworkBackend, u16) {
    let port = free_port();
    let mut backend = StdNetworkBackend::new();
    let mut listener = SessionListener::new(port);
    listener.start(&mut backend).unwrap();
    (listener, backend, port)
}

// ---------------------------------------------------------------------------
// StdNetworkBackend tests
// ---------------------------------------------------------------------------

#[test]
fn listen_and_accept() {
    let mut backend = StdNetworkBackend::new();
    let port = free_port();
    backend.listen(port).unwrap();
    assert_eq!(backend.local_addr().unwrap().port(), port);

    assert!(backend.accept().unwrap().is_none());

    let mut client = TcpStream::connect(("127.0.0.1", port)).unwrap();
    client.write_all(b"hello").unwrap();
    settle();

    let mut server_stream = backend.accept().unwrap().expect("expected connection");
    assert!(server_stream.peer_addr().is_some());

    let mut buf = [0u8; 64];
    let n = server_stream.read(&mut buf).unwrap();
    assert_eq!(&buf[..n], b"hello");

    server_stream.write(b"world").unwrap();
    settle();
    let mut response = [0u8; 64];
    let n = client.read(&mut response).unwrap();
    assert_eq!(&response[..n], b"world");

    server_stream.close().unwrap();
}

#[test]
fn accept_without_listen_errors() {
    let mut backend = StdNetworkBackend::new();
    assert!(backend.accept().is_err());
}

#[test]
fn shutdown_releases_socket() {
    let mut backend = StdNetworkBackend::new();
    backend.listen(free_port()).unwrap();
    backend.shutdown();
    assert!(backend.local_addr().is_none());
    assert!(backend.accept().is_err());
}

// ---------------------------------------------------------------------------
// SessionListener tests
// ---------------------------------------------------------------------------

#[test]
fn client_lines_are_reported() {
    let (mut listener, mut backend, port) = started();
    let mut client = TcpStream::connect(("127.0.0.1", port)).unwrap();
    settle();

    let events = listener.poll(&mut backend);
    assert!(matches!(events.as_slice(), [SessionEvent::Connected(_)]));
    assert!(listener.has_client());

    client.write_all(b"show version\r\nhel").unwrap();
    settle();
    let events = listener.poll(&mut backend);
    assert_eq!(events, vec![SessionEvent::Line("show version".into())]);

    client.write_all(b"lo\n").unwrap();
    settle();
    let events = listener.poll(&mut backend);
    assert_eq!(events, vec![SessionEvent::Line("hello".into())]);

    listener.send("Hello, world!\n").unwrap();
    settle();
    let mut buf = [0u8; 64];
    let n = client.read(&mut buf).unwrap();
    assert_eq!(&buf[..n], b"Hello, world!\n");
}

#[test]
fn second_connection_is_rejected_with_notice() {
    let (mut listener, mut backend, port) = started();
    let _first = TcpStream::connect(("127.0.0.1", port)).unwrap();
    settle();
    listener.poll(&mut backend);
    let active = listener.client_addr().unwrap().to_string();

    let mut second = TcpStream::connect(("127.0.0.1", port)).unwrap();
    second
        .set_read_timeout(Some(Duration::from_secs(2)))
        .unwrap();
    settle();
    let events = listener.poll(&mut backend);
    assert!(events.is_empty());

    let mut notice = String::new();
    second.read_to_string(&mut notice).unwrap();
    assert_eq!(notice, format!("Another session is active from {active}\r\n"));

    // The first session is untouched.
    assert_eq!(listener.client_addr(), Some(active.as_str()));
}

#[test]
fn disconnect_frees_the_slot() {
    let (mut listener, mut backend, port) = started();
    let first = TcpStream::connect(("127.0.0.1", port)).unwrap();
    settle();
    listener.poll(&mut backend);
    drop(first);
    settle();

    let events = listener.poll(&mut backend);
    assert_eq!(events.last(), Some(&SessionEvent::Disconnected));
    assert!(!listener.has_client());

    let _next = TcpStream::connect(("127.0.0.1", port)).unwrap();
    settle();
    let events = listener.poll(&mut backend);
    assert!(matches!(events.as_slice(), [SessionEvent::Connected(_)]));
}

#[test]
fn stop_closes_everything() {
    let (mut listener, mut backend, port) = started();
    let _client = TcpStream::connect(("127.0.0.1", port)).unwrap();
    settle();
    listener.poll(&mut backend);
    listener.stop(&mut backend);
    assert!(!listener.is_listening());
    assert!(!listener.has_client());
    assert!(listener.poll(&mut backend).is_empty());
}

#[test]
fn overlong_line_never_runs_its_tail() {
    let (mut listener, mut backend, port) = started();
    let mut client = TcpStream::connect(("127.0.0.1", port)).unwrap();
    settle();
    listener.poll(&mut backend);

    client.write_all(&[b'a'; 5000]).unwrap();
    settle();
    let first = listener.poll(&mut backend);
    assert_eq!(first, vec![SessionEvent::Overlong]);

    client.write_all(b"zzz quit\nhello\n").unwrap();
    settle();
    let second = listener.poll(&mut backend);
    assert_eq!(second, vec![SessionEvent::Line("hello".into())]);
}

#[test]
fn crlf_split_across_writes_gives_one_line() {
    let (mut listener, mut backend, port) = started();
    let mut client = TcpStream::connect(("127.0.0.1", port)).unwrap();
    client.set_nodelay(true).unwrap();
    settle();
    listener.poll(&mut backend);

    client.write_all(b"hello\r").unwrap();
    settle();
    assert_eq!(listener.poll(&mut backend), vec![SessionEvent::Line("hello".into())]);

    client.write_all(b"\n").unwrap();
    settle();
    assert!(listener.poll(&mut backend).is_empty());
}
