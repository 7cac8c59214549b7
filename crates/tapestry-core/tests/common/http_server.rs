//! Minimal HTTP/1.1 server with scripted responses for integration tests.
//!
//! Each request path maps to one [`Reply`]. Unknown paths get a 404.

#![allow(dead_code)]

use std::collections::HashMap;
use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

#[derive(Debug, Clone)]
pub enum Reply {
    /// 200 with an accurate Content-Length.
    Body(Vec<u8>),
    /// 200 with a Content-Type header and accurate Content-Length.
    Typed(&'static str, Vec<u8>),
    /// 200 without Content-Length; body streamed in small writes, then close.
    Streamed(Vec<u8>),
    /// 200 claiming `declared` bytes, then sending `body` and closing.
    Declared { declared: u64, body: Vec<u8> },
    /// Headers plus a few bytes, then silence for `hold`.
    Stall { hold: Duration },
    /// Given status code and reason with a short body.
    Status(u16, &'static str),
    /// 302 to `location` (absolute or path-relative).
    Redirect(String),
    /// 200 whose body is the request's User-Agent header.
    EchoUserAgent,
}

/// Starts a server on 127.0.0.1 in a background thread. Returns the base URL
/// without trailing slash (e.g. "http://127.0.0.1:12345"). Runs until the
/// process exits.
pub fn start(routes: Vec<(&str, Reply)>) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    let routes: Arc<HashMap<String, Reply>> = Arc::new(
        routes
            .into_iter()
            .map(|(path, reply)| (path.to_string(), reply))
            .collect(),
    );
    thread::spawn(move || {
        for stream in listener.incoming().flatten() {
            let routes = Arc::clone(&routes);
            thread::spawn(move || handle(stream, &routes));
        }
    });
    format!("http://127.0.0.1:{}", port)
}

/// A loopback URL nothing listens on.
pub fn refused_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{}/gone", port)
}

fn handle(mut stream: TcpStream, routes: &HashMap<String, Reply>) {
    let _ = stream.set_read_timeout(Some(Duration::from_secs(2)));
    let _ = stream.set_write_timeout(Some(Duration::from_secs(2)));
    let Some(request) = read_head(&mut stream) else {
        return;
    };
    let (path, user_agent) = parse_request(&request);

    let reply = routes
        .get(path)
        .cloned()
        .unwrap_or(Reply::Status(404, "Not Found"));
    match reply {
        Reply::Body(body) => respond(&mut stream, "200 OK", &[], &body),
        Reply::Typed(content_type, body) => {
            let header = format!("Content-Type: {}", content_type);
            respond(&mut stream, "200 OK", &[header.as_str()], &body)
        }
        Reply::Streamed(body) => {
            let _ = stream
                .write_all(b"HTTP/1.1 200 OK\r\nConnection: close\r\n\r\n");
            for chunk in body.chunks(512) {
                if stream.write_all(chunk).is_err() {
                    return;
                }
                let _ = stream.flush();
            }
        }
        Reply::Declared { declared, body } => {
            let head = format!(
                "HTTP/1.1 200 OK\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                declared
            );
            let _ = stream.write_all(head.as_bytes());
            let _ = stream.write_all(&body);
        }
        Reply::Stall { hold } => {
            let _ = stream.write_all(b"HTTP/1.1 200 OK\r\nContent-Length: 1000\r\n\r\nabc");
            let _ = stream.flush();
            thread::sleep(hold);
        }
        Reply::Status(code, reason) => {
            let status = format!("{} {}", code, reason);
            respond(&mut stream, &status, &[], reason.as_bytes())
        }
        Reply::Redirect(location) => {
            let header = format!("Location: {}", location);
            respond(&mut stream, "302 Found", &[header.as_str()], b"moved")
        }
        Reply::EchoUserAgent => {
            respond(&mut stream, "200 OK", &[], user_agent.unwrap_or("").as_bytes())
        }
    }
}

fn respond(stream: &mut TcpStream, status: &str, headers: &[&str], body: &[u8]) {
    let mut head = format!(
        "HTTP/1.1 {}\r\nContent-Length: {}\r\nConnection: close\r\n",
        status,
        body.len()
    );
    for h in headers {
        head.push_str(h);
        head.push_str("\r\n");
    }
    head.push_str("\r\n");
    let _ = stream.write_all(head.as_bytes());
    let _ = stream.write_all(body);
}

/// Reads until the end of the request head.
fn read_head(stream: &mut TcpStream) -> Option<String> {
    let mut data = Vec::new();
    let mut buf = [0u8; 4096];
    while !data.windows(4).any(|w| w == b"\r\n\r\n") {
        match stream.read(&mut buf) {
            Ok(0) | Err(_) => return None,
            Ok(n) => data.extend_from_slice(&buf[..n]),
        }
        if data.len() > 64 * 1024 {
            return None;
        }
    }
    String::from_utf8(data).ok()
}

/// Returns (path, optional User-Agent value).
fn parse_request(request: &str) -> (&str, Option<&str>) {
    let mut lines = request.lines();
    let path = lines
        .next()
        .and_then(|l| l.split_whitespace().nth(1))
        .unwrap_or("/");
    let user_agent = lines
        .take_while(|l| !l.trim().is_empty())
        .filter_map(|l| l.split_once(':'))
        .find(|(name, _)| name.trim().eq_ignore_ascii_case("user-agent"))
        .map(|(_, value)| value.trim());
    (path, user_agent)
}
