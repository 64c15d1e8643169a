//! Minimal HTTP/1.1 gateway server for integration tests.
//!
//! Serves one static body under any path. HEAD and GET statuses are
//! configurable so a single instance can play a healthy gateway, a gateway
//! that hangs up on HEAD, a dead one, or the relay. POST answers with a fixed
//! JSON body (pinning endpoint). Every request is recorded.

use std::collections::HashMap;
use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct GatewayServerOptions {
    pub head_status: u16,
    pub get_status: u16,
    /// Response status and JSON body for POST.
    pub post_status: u16,
    pub post_body: String,
    /// Honour `Range: bytes=a-b` on GET with 206.
    pub support_ranges: bool,
    /// Close the connection on HEAD without writing a status line.
    pub drop_head: bool,
}

impl Default for GatewayServerOptions {
    fn default() -> Self {
        Self {
            head_status: 200,
            get_status: 200,
            post_status: 200,
            post_body: r#"{"IpfsHash":"QmPinnedByServer","PinSize":1}"#.to_string(),
            support_ranges: true,
            drop_head: false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    /// Header names lowercased.
    pub headers: HashMap<String, String>,
    pub body: Vec<u8>,
}

pub struct GatewayServer {
    /// e.g. "http://127.0.0.1:12345/"
    pub base: String,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl GatewayServer {
    /// Gateway base in the `/ipfs/` layout.
    pub fn ipfs_base(&self) -> String {
        format!("{}ipfs/", self.base)
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn count(&self, method: &str) -> usize {
        self.requests()
            .iter()
            .filter(|r| r.method.eq_ignore_ascii_case(method))
            .count()
    }
}

/// Healthy gateway serving `body`.
pub fn start(body: Vec<u8>) -> GatewayServer {
    start_with_options(body, GatewayServerOptions::default())
}

pub fn start_with_options(body: Vec<u8>, opts: GatewayServerOptions) -> GatewayServer {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    let body = Arc::new(body);
    let requests = Arc::new(Mutex::new(Vec::new()));
    let recorded = Arc::clone(&requests);
    thread::spawn(move || {
        for stream in listener.incoming().flatten() {
            let body = Arc::clone(&body);
            let opts = opts.clone();
            let recorded = Arc::clone(&recorded);
            thread::spawn(move || handle(stream, &body, &opts, &recorded));
        }
    });
    GatewayServer {
        base: format!("http://127.0.0.1:{}/", port),
        requests,
    }
}

fn reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        206 => "Partial Content",
        401 => "Unauthorized",
        404 => "Not Found",
        405 => "Method Not Allowed",
        500 => "Internal Server Error",
        501 => "Not Implemented",
        _ => "Status",
    }
}

fn respond(stream: &mut TcpStream, status: u16, extra: &str, body: &[u8]) {
    let head = format!(
        "HTTP/1.1 {} {}\r\nContent-Length: {}\r\nConnection: close\r\n{}\r\n",
        status,
        reason(status),
        body.len(),
        extra
    );
    let _ = stream.write_all(head.as_bytes());
    let _ = stream.write_all(body);
}

/// Read the request head; returns (head text, bytes of body already read).
fn read_head(stream: &mut TcpStream) -> Option<(String, Vec<u8>)> {
    let mut data = Vec::new();
    let mut buf = [0u8; 8192];
    loop {
        let n = stream.read(&mut buf).ok()?;
        if n == 0 {
            return None;
        }
        data.extend_from_slice(&buf[..n]);
        if let Some(pos) = data.windows(4).position(|w| w == b"\r\n\r\n") {
            let head = String::from_utf8_lossy(&data[..pos]).into_owned();
            return Some((head, data[pos + 4..].to_vec()));
        }
    }
}

fn handle(
    mut stream: TcpStream,
    body: &[u8],
    opts: &GatewayServerOptions,
    recorded: &Mutex<Vec<RecordedRequest>>,
) {
    let _ = stream.set_read_timeout(Some(Duration::from_secs(5)));
    let _ = stream.set_write_timeout(Some(Duration::from_secs(5)));
    let Some((head, mut req_body)) = read_head(&mut stream) else {
        return;
    };

    let mut lines = head.lines();
    let request_line = lines.next().unwrap_or("");
    let mut parts = request_line.split_whitespace();
    let method = parts.next().unwrap_or("").to_string();
    let path = parts.next().unwrap_or("").to_string();
    let headers: HashMap<String, String> = lines
        .filter_map(|l| l.split_once(':'))
        .map(|(k, v)| (k.trim().to_ascii_lowercase(), v.trim().to_string()))
        .collect();

    if method.eq_ignore_ascii_case("POST") {
        if headers
            .get("expect")
            .is_some_and(|v| v.eq_ignore_ascii_case("100-continue"))
        {
            let _ = stream.write_all(b"HTTP/1.1 100 Continue\r\n\r\n");
        }
        let want = headers
            .get("content-length")
            .and_then(|v| v.parse::<usize>().ok())
            .unwrap_or(0);
        let mut buf = [0u8; 8192];
        while req_body.len() < want {
            match stream.read(&mut buf) {
                Ok(0) | Err(_) => break,
                Ok(n) => req_body.extend_from_slice(&buf[..n]),
            }
        }
    }

    let range = headers.get("range").and_then(|v| parse_range(v));
    recorded.lock().unwrap().push(RecordedRequest {
        method: method.clone(),
        path,
        headers,
        body: req_body,
    });

    match method.to_ascii_uppercase().as_str() {
        "HEAD" if opts.drop_head => {}
        "HEAD" => {
            let head = format!(
                "HTTP/1.1 {} {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                opts.head_status,
                reason(opts.head_status),
                body.len()
            );
            let _ = stream.write_all(head.as_bytes());
        }
        "GET" => {
            if opts.get_status != 200 {
                respond(&mut stream, opts.get_status, "", b"not here");
                return;
            }
            match range {
                Some((start, end_incl)) if opts.support_ranges && start <= end_incl && start < body.len() => {
                    let total = body.len();
                    let end_excl = end_incl.saturating_add(1).min(total);
                    let extra = format!("Content-Range: bytes {}-{}/{}\r\n", start, end_excl - 1, total);
                    respond(&mut stream, 206, &extra, &body[start..end_excl]);
                }
                _ => respond(&mut stream, 200, "", body),
            }
        }
        "POST" => {
            let extra = "Content-Type: application/json\r\n";
            respond(&mut stream, opts.post_status, extra, opts.post_body.as_bytes());
        }
        _ => respond(&mut stream, 405, "", b""),
    }
}

/// `bytes=a-b` as (a, b inclusive); an open end means the rest of the body.
fn parse_range(value: &str) -> Option<(usize, usize)> {
    let ranges = value.trim().strip_prefix("bytes=")?;
    let (a, b) = ranges.split_once('-')?;
    let start = a.trim().parse().ok()?;
    let end = match b.trim() {
        "" => usize::MAX,
        b => b.parse().ok()?,
    };
    Some((start, end))
}
