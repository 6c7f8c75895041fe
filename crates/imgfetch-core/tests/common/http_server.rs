//! Minimal HTTP/1.1 server for integration tests.
//!
//! Routes:
//! - `/ok.png` → 200 with the configured body
//! - `/slow.png` → 200 with the body, sent after a delay
//! - `/redirect.png` → 302 to `/ok.png`
//! - anything else → 404
//!
//! Counts GETs per path so tests can assert how many fetches hit the wire.

use std::collections::HashMap;
use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

pub const SLOW_DELAY: Duration = Duration::from_millis(400);

#[derive(Clone)]
pub struct TestServer {
    base: String,
    hits: Arc<Mutex<HashMap<String, usize>>>,
}

impl TestServer {
    /// Absolute URL for `path` (which must start with `/`).
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    pub fn hits(&self, path: &str) -> usize {
        self.hits.lock().unwrap().get(path).copied().unwrap_or(0)
    }
}

/// Starts a server in a background thread serving `body`. The server runs
/// until the process exits.
pub fn start(body: Vec<u8>) -> TestServer {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    let body = Arc::new(body);
    let hits: Arc<Mutex<HashMap<String, usize>>> = Arc::default();
    let server = TestServer {
        base: format!("http://127.0.0.1:{}", port),
        hits: Arc::clone(&hits),
    };
    thread::spawn(move || {
        for stream in listener.incoming().flatten() {
            let body = Arc::clone(&body);
            let hits = Arc::clone(&hits);
            thread::spawn(move || handle(stream, &body, &hits));
        }
    });
    server
}

fn handle(mut stream: TcpStream, body: &[u8], hits: &Mutex<HashMap<String, usize>>) {
    let _ = stream.set_read_timeout(Some(Duration::from_secs(2)));
    let _ = stream.set_write_timeout(Some(Duration::from_secs(2)));
    let mut buf = [0u8; 8192];
    let n = match stream.read(&mut buf) {
        Ok(0) | Err(_) => return,
        Ok(n) => n,
    };
    let Ok(request) = std::str::from_utf8(&buf[..n]) else {
        return;
    };
    let (method, path) = parse_request_line(request);
    if !method.eq_ignore_ascii_case("GET") {
        let _ = stream.write_all(b"HTTP/1.1 405 Method Not Allowed\r\nContent-Length: 0\r\n\r\n");
        return;
    }
    *hits.lock().unwrap().entry(path.to_string()).or_default() += 1;

    match path {
        "/ok.png" => respond(&mut stream, "200 OK", "", body),
        "/slow.png" => {
            let head = format!(
                "HTTP/1.1 200 OK\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                body.len()
            );
            let _ = stream.write_all(head.as_bytes());
            let _ = stream.flush();
            thread::sleep(SLOW_DELAY);
            let _ = stream.write_all(body);
        }
        "/redirect.png" => respond(&mut stream, "302 Found", "Location: /ok.png\r\n", b""),
        _ => respond(&mut stream, "404 Not Found", "", b"no such image"),
    }
}

fn respond(stream: &mut TcpStream, status: &str, extra_headers: &str, body: &[u8]) {
    let head = format!(
        "HTTP/1.1 {}\r\nContent-Length: {}\r\nConnection: close\r\n{}\r\n",
        status,
        body.len(),
        extra_headers
    );
    let _ = stream.write_all(head.as_bytes());
    let _ = stream.write_all(body);
}

/// Returns (method, path) from the request line.
fn parse_request_line(request: &str) -> (&str, &str) {
    let line = request.lines().next().unwrap_or("");
    let mut parts = line.split_whitespace();
    let method = parts.next().unwrap_or("");
    let path = parts.next().unwrap_or("/");
    (method, path)
}
