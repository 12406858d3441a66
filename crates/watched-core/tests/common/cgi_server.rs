//! Minimal HTTP/1.1 server standing in for the watched CGI in integration tests.
//!
//! Understands `GET /<anything>?<marker path>&<0|1>&<callback>`: action 0
//! reports whether the marker exists, action 1 toggles it. Replies with
//! `<callback>(<action>, <status>)`. Markers live in memory.

#![allow(dead_code)]

use percent_encoding::percent_decode_str;
use std::collections::HashSet;
use std::io::{Read, Write};
use std::net::TcpListener;
use std::sync::{Arc, Mutex};
use std::thread;

#[derive(Debug, Clone, Default)]
pub struct CgiServerOptions {
    /// If set, every GET is answered with this body instead of a callback.
    pub body_override: Option<String>,
    /// If set, every GET is answered with this status line and an empty body.
    pub status_override: Option<&'static str>,
}

#[derive(Clone)]
pub struct CgiServer {
    /// Base URL with trailing slash, e.g. "http://127.0.0.1:12345/".
    pub base_url: String,
    markers: Arc<Mutex<HashSet<String>>>,
    hits: Arc<Mutex<Vec<String>>>,
}

impl CgiServer {
    /// Marker paths that currently exist.
    pub fn markers(&self) -> HashSet<String> {
        self.markers.lock().unwrap().clone()
    }

    /// Decoded query strings received so far, in arrival order.
    pub fn hits(&self) -> Vec<String> {
        self.hits.lock().unwrap().clone()
    }

    pub fn add_marker(&self, path: &str) {
        self.markers.lock().unwrap().insert(path.to_string());
    }
}

/// Starts a server in a background thread. It runs until the process exits.
pub fn start() -> CgiServer {
    start_with_options(CgiServerOptions::default())
}

pub fn start_with_options(opts: CgiServerOptions) -> CgiServer {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    let server = CgiServer {
        base_url: format!("http://127.0.0.1:{}/", port),
        markers: Arc::new(Mutex::new(HashSet::new())),
        hits: Arc::new(Mutex::new(Vec::new())),
    };
    let shared = server.clone();
    thread::spawn(move || {
        for stream in listener.incoming().flatten() {
            let shared = shared.clone();
            let opts = opts.clone();
            thread::spawn(move || handle(stream, &shared, &opts));
        }
    });
    server
}

fn handle(mut stream: std::net::TcpStream, server: &CgiServer, opts: &CgiServerOptions) {
    let _ = stream.set_read_timeout(Some(std::time::Duration::from_secs(2)));
    let _ = stream.set_write_timeout(Some(std::time::Duration::from_secs(2)));
    let mut buf = [0u8; 8192];
    let n = match stream.read(&mut buf) {
        Ok(0) => return,
        Ok(n) => n,
        Err(_) => return,
    };
    let request = match std::str::from_utf8(&buf[..n]) {
        Ok(s) => s,
        Err(_) => return,
    };
    let Some(target) = parse_get_target(request) else {
        let _ = stream.write_all(b"HTTP/1.1 405 Method Not Allowed\r\nContent-Length: 0\r\n\r\n");
        return;
    };
    let query = target.split_once('?').map(|(_, q)| q).unwrap_or("");
    let query = percent_decode_str(query).decode_utf8_lossy().into_owned();
    server.hits.lock().unwrap().push(query.clone());

    if let Some(status_line) = opts.status_override {
        let response = format!("HTTP/1.1 {}\r\nContent-Length: 0\r\n\r\n", status_line);
        let _ = stream.write_all(response.as_bytes());
        return;
    }

    let body = match &opts.body_override {
        Some(body) => body.clone(),
        None => run_script(&query, &server.markers),
    };
    let response = format!(
        "HTTP/1.1 200 OK\r\nContent-Type: application/javascript\r\nContent-Length: {}\r\n\r\n{}",
        body.len(),
        body
    );
    let _ = stream.write_all(response.as_bytes());
}

/// Applies `<path>&<action>&<callback>` to the marker set and renders the reply.
fn run_script(query: &str, markers: &Mutex<HashSet<String>>) -> String {
    let mut args = query.split('&');
    let path = args.next().unwrap_or("");
    let action = args.next().unwrap_or("0");
    let callback = args.next().unwrap_or("watchedCallback");

    let mut markers = markers.lock().unwrap();
    let status = match action {
        "0" => markers.contains(path) as i64,
        "1" => {
            if markers.remove(path) {
                0
            } else {
                markers.insert(path.to_string());
                1
            }
        }
        _ => 2,
    };
    format!("{}({}, {});\n", callback, action, status)
}

/// Returns the request target for a GET request line.
fn parse_get_target(request: &str) -> Option<&str> {
    let line = request.lines().next()?;
    let mut parts = line.split_whitespace();
    let method = parts.next()?;
    if !method.eq_ignore_ascii_case("GET") {
        return None;
    }
    parts.next()
}
