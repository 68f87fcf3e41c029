#![cfg(unix)]

use std::io::{BufRead, BufReader, Read, Write};
use std::os::unix::net::UnixListener;
use std::path::Path;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use serde_json::{json, Value};
use skynet_application::{
    Application, DataType, Node, NodeError, PubService, Service, UnixSocketTransport, NODE_HOST,
};

struct Captured {
    request_line: String,
    headers: Vec<(String, String)>,
    body: Value,
}

/// Accepts `count` connections, answering each with `response` verbatim.
fn serve(socket: &Path, count: usize, response: &'static str) -> JoinHandle<Vec<Captured>> {
    let listener = UnixListener::bind(socket).expect("bind socket");
    thread::spawn(move || {
        let mut captured = Vec::new();
        for _ in 0..count {
            let (stream, _) = listener.accept().expect("accept");
            let mut reader = BufReader::new(stream.try_clone().expect("clone stream"));
            let mut request_line = String::new();
            reader.read_line(&mut request_line).expect("request line");
            let mut headers = Vec::new();
            loop {
                let mut line = String::new();
                reader.read_line(&mut line).expect("header line");
                let line = line.trim_end();
                if line.is_empty() {
                    break;
                }
                let (name, value) = line.split_once(':').expect("header");
                headers.push((name.trim().to_lowercase(), value.trim().to_string()));
            }
            let length: usize = headers
                .iter()
                .find(|(name, _)| name == "content-length")
                .map(|(_, value)| value.parse().expect("length"))
                .unwrap_or(0);
            let mut body = vec![0; length];
            reader.read_exact(&mut body).expect("body");
            let mut stream = stream;
            stream.write_all(response.as_bytes()).expect("respond");
            captured.push(Captured {
                request_line: request_line.trim_end().to_string(),
                headers,
                body: serde_json::from_slice(&body).expect("json body"),
            });
        }
        captured
    })
}

fn node_at(socket: &Path) -> Node {
    let transport =
        UnixSocketTransport::new(socket, NODE_HOST, Duration::from_secs(5)).expect("transport");
    Node::new(transport, "integration-app")
}

#[test]
fn call_round_trips_over_unix_socket() {
    let dir = tempfile::tempdir().expect("tempdir");
    let socket = dir.path().join("node.sock");
    let server = serve(
        &socket,
        1,
        "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: 15\r\n\r\n{\"status\":\"ok\"}",
    );

    let reply = node_at(&socket)
        .call("/status", Some(&json!({ "verbose": true })))
        .expect("call");
    assert_eq!(reply, json!({ "status": "ok" }));

    let captured = server.join().expect("server");
    assert_eq!(captured[0].request_line, "POST /status HTTP/1.1");
    assert!(captured[0]
        .headers
        .contains(&("x-skynet-application-id".into(), "integration-app".into())));
    assert!(captured[0].headers.contains(&("host".into(), "node".into())));
    assert_eq!(captured[0].body, json!({ "verbose": true }));
}

#[test]
fn error_reply_surfaces_node_message() {
    let dir = tempfile::tempdir().expect("tempdir");
    let socket = dir.path().join("node.sock");
    let server = serve(
        &socket,
        1,
        "HTTP/1.1 400 Bad Request\r\nTransfer-Encoding: chunked\r\n\r\n1a\r\n{\"message\":\"unknown type\"}\r\n0\r\n\r\n",
    );

    let err = node_at(&socket).call("service/expose", None).unwrap_err();
    server.join().expect("server");
    assert_eq!(
        err.to_string(),
        "the server replied with error [400]: unknown type"
    );
}

#[test]
fn missing_socket_is_unreachable() {
    let dir = tempfile::tempdir().expect("tempdir");
    let err = node_at(&dir.path().join("absent.sock"))
        .call("status", None)
        .unwrap_err();
    assert!(err.is_unreachable(), "unexpected error: {err}");
    assert!(matches!(err, NodeError::Connect { .. }));
}

#[test]
fn application_exposes_services_through_the_node() {
    let dir = tempfile::tempdir().expect("tempdir");
    let socket = dir.path().join("node.sock");
    let server = serve(&socket, 1, "HTTP/1.1 200 OK\r\nContent-Length: 2\r\n\r\n{}");

    let app = Application::new(node_at(&socket));
    let camera: PubService<Vec<u8>> = app
        .publisher("camera/left", DataType::new("image", [480, 640, 3]))
        .expect("expose");
    assert!(app.is_exposed(camera.name()));

    let captured = server.join().expect("server");
    assert_eq!(captured[0].request_line, "POST /service/expose HTTP/1.1");
    assert_eq!(
        captured[0].body,
        json!({
            "name": "camera/left",
            "type": "pub",
            "data": { "name": "image", "dimensions": [480, 640, 3] },
        })
    );
}
