//! Mock ScamGuard API server for testing
//!
//! Simulates the backend endpoints the HTTP adapter talks to:
//! - POST /auth/otp/send returns { success, message, expiresIn }
//! - POST /auth/otp/verify returns { success, token, user } for the configured code
//! - POST /verifications/image requires the bearer token, returns a verdict
//! - POST /reports/phone returns { success, message }
//!
//! `MockConfig` switches cover forced statuses, declined OTP calls,
//! rejected reports and slow responses.

use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use serde_json::json;

/// Token handed out by a successful verify
pub const MOCK_TOKEN: &str = "mock-token-abc123";

/// Mock server for testing
pub struct MockBackendServer {
    port: u16,
    running: Arc<AtomicBool>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
    thread_handle: Option<thread::JoinHandle<()>>,
}

/// Behaviour switches for the mock
#[derive(Debug, Clone)]
pub struct MockConfig {
    /// The only OTP code accepted by /auth/otp/verify
    pub valid_otp: String,
    /// Answer every request with this status and an error body
    pub force_status: Option<u16>,
    /// Whether /reports/phone accepts reports
    pub accept_reports: bool,
    /// Delay in milliseconds before responding
    pub delay_ms: u64,
    /// Answer both OTP endpoints with 200 `{success: false, message}`
    pub otp_declined: Option<String>,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            valid_otp: "123456".to_string(),
            force_status: None,
            accept_reports: true,
            delay_ms: 0,
            otp_declined: None,
        }
    }
}

/// A request as seen by the mock
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    /// Header lines, lowercased
    pub headers: Vec<String>,
    pub body: Vec<u8>,
}

impl RecordedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        let prefix = format!("{}:", name.to_lowercase());
        self.headers
            .iter()
            .find(|h| h.starts_with(&prefix))
            .map(|h| h[prefix.len()..].trim())
    }

    pub fn body_json(&self) -> serde_json::Value {
        serde_json::from_slice(&self.body).unwrap_or(serde_json::Value::Null)
    }

    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

impl MockBackendServer {
    /// Start a new mock server on a random available port
    pub fn start(config: MockConfig) -> std::io::Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0")?;
        let port = listener.local_addr()?.port();
        let running = Arc::new(AtomicBool::new(true));
        let requests = Arc::new(Mutex::new(Vec::new()));

        // Non-blocking so the loop notices shutdown
        listener.set_nonblocking(true)?;

        let running_clone = Arc::clone(&running);
        let requests_clone = Arc::clone(&requests);
        let thread_handle = thread::spawn(move || {
            while running_clone.load(Ordering::SeqCst) {
                match listener.accept() {
                    Ok((stream, _)) => {
                        let cfg = config.clone();
                        let log = Arc::clone(&requests_clone);
                        thread::spawn(move || handle_connection(stream, &cfg, &log));
                    }
                    Err(ref e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                        thread::sleep(Duration::from_millis(5));
                    }
                    Err(_) => break,
                }
            }
        });

        Ok(Self {
            port,
            running,
            requests,
            thread_handle: Some(thread_handle),
        })
    }

    pub fn base_url(&self) -> String {
        format!("http://127.0.0.1:{}", self.port)
    }

    /// Requests received so far, in arrival order
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn stop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        if let Some(handle) = self.thread_handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for MockBackendServer {
    fn drop(&mut self) {
        self.stop();
    }
}

fn handle_connection(mut stream: TcpStream, config: &MockConfig, log: &Mutex<Vec<RecordedRequest>>) {
    let _ = stream.set_nonblocking(false);
    let Some(request) = read_request(&mut stream) else {
        send_response(&mut stream, 400, r#"{"message": "Invalid request"}"#);
        return;
    };
    log.lock().unwrap().push(request.clone());

    if config.delay_ms > 0 {
        thread::sleep(Duration::from_millis(config.delay_ms));
    }

    if let Some(status) = config.force_status {
        send_response(&mut stream, status, r#"{"message": "Forced failure from mock"}"#);
        return;
    }

    let (status, body) = route(&request, config);
    send_response(&mut stream, status, &body.to_string());
}

fn route(request: &RecordedRequest, config: &MockConfig) -> (u16, serde_json::Value) {
    match (request.method.as_str(), request.path.as_str()) {
        ("POST", "/auth/otp/send" | "/auth/otp/verify") if config.otp_declined.is_some() => {
            (200, json!({"success": false, "message": config.otp_declined}))
        }
        ("POST", "/auth/otp/send") => {
            let body = request.body_json();
            (
                200,
                json!({
                    "success": true,
                    "message": format!("Code sent to {}", body["phoneNumber"].as_str().unwrap_or("")),
                    "expiresIn": 300
                }),
            )
        }
        ("POST", "/auth/otp/verify") => {
            let body = request.body_json();
            if body["otp"].as_str() == Some(config.valid_otp.as_str()) {
                (
                    200,
                    json!({
                        "success": true,
                        "token": MOCK_TOKEN,
                        "user": {
                            "id": 7,
                            "name": "Ana",
                            "isElderly": true,
                            "phoneNumber": body["phoneNumber"]
                        }
                    }),
                )
            } else {
                (400, json!({"success": false, "message": "Invalid OTP code"}))
            }
        }
        ("POST", "/verifications/image") => {
            let expected = format!("bearer {}", MOCK_TOKEN);
            if request.header("authorization") != Some(expected.as_str()) {
                return (401, json!({"message": "Missing or invalid token"}));
            }
            (
                200,
                json!({
                    "id": "ver-001",
                    "isScam": true,
                    "riskLevel": "high",
                    "confidence": 0.93,
                    "explanation": "Message impersonates a bank",
                    "category": "phishing"
                }),
            )
        }
        ("POST", "/reports/phone") => {
            if config.accept_reports {
                (200, json!({"success": true, "message": "Report received"}))
            } else {
                (200, json!({"success": false, "message": "Number already reported"}))
            }
        }
        _ => (404, json!({"message": "Endpoint not found"})),
    }
}

/// Read one HTTP/1.1 request, honouring Content-Length
fn read_request(stream: &mut TcpStream) -> Option<RecordedRequest> {
    let mut data = Vec::new();
    let mut buffer = [0u8; 8192];

    let header_end = loop {
        let n = stream.read(&mut buffer).ok()?;
        if n == 0 {
            return None;
        }
        data.extend_from_slice(&buffer[..n]);
        if let Some(pos) = data.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8_lossy(&data[..header_end]).into_owned();
    let mut lines = head.split("\r\n");
    let mut request_line = lines.next()?.split_whitespace();
    let method = request_line.next()?.to_string();
    let path = request_line.next()?.to_string();
    let headers: Vec<String> = lines
        .filter(|l| !l.is_empty())
        .map(|l| l.to_lowercase())
        .collect();

    let content_length = headers
        .iter()
        .find_map(|h| h.strip_prefix("content-length:"))
        .and_then(|v| v.trim().parse::<usize>().ok())
        .unwrap_or(0);

    while data.len() < header_end + content_length {
        let n = stream.read(&mut buffer).ok()?;
        if n == 0 {
            break;
        }
        data.extend_from_slice(&buffer[..n]);
    }

    Some(RecordedRequest {
        method,
        path,
        headers,
        body: data[header_end..].to_vec(),
    })
}

fn send_response(stream: &mut TcpStream, status: u16, body: &str) {
    let status_text = match status {
        200 => "OK",
        400 => "Bad Request",
        401 => "Unauthorized",
        404 => "Not Found",
        413 => "Payload Too Large",
        429 => "Too Many Requests",
        500 => "Internal Server Error",
        503 => "Service Unavailable",
        _ => "Unknown",
    };
    let response = format!(
        "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        status_text,
        body.len(),
        body
    );
    let _ = stream.write_all(response.as_bytes());
    let _ = stream.flush();
}
