//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::future::Future;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde_json::{json, Value};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

use weekly_report::config::ServiceConfig;
use weekly_report::http::HttpServer;
use weekly_report::lifecycle::Shutdown;
use weekly_report::llm::ReportClient;
use weekly_report::report::ReportGenerator;

/// A captured upstream request.
#[derive(Debug, Clone)]
pub struct CapturedRequest {
    /// Request line and headers, lowercased.
    pub head: String,
    pub body: String,
}

impl CapturedRequest {
    pub fn json(&self) -> Value {
        serde_json::from_str(&self.body).unwrap()
    }
}

/// Handle to a running mock chat-completion endpoint.
pub struct MockUpstream {
    pub addr: SocketAddr,
    calls: Arc<AtomicU32>,
    requests: Arc<Mutex<Vec<CapturedRequest>>>,
}

impl MockUpstream {
    pub fn url(&self) -> String {
        format!("http://{}/v1/chat/completions", self.addr)
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_request(&self) -> Option<CapturedRequest> {
        self.requests.lock().unwrap().last().cloned()
    }
}

async fn read_request(socket: &mut TcpStream) -> Option<CapturedRequest> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];

    let header_end = loop {
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8_lossy(&buf[..header_end]).to_lowercase();
    let content_length = head
        .lines()
        .find_map(|line| line.strip_prefix("content-length:"))
        .and_then(|v| v.trim().parse::<usize>().ok())
        .unwrap_or(0);

    while buf.len() < header_end + content_length {
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
    }

    Some(CapturedRequest {
        head,
        body: String::from_utf8_lossy(&buf[header_end..]).into_owned(),
    })
}

fn status_text(status: u16) -> &'static str {
    match status {
        200 => "200 OK",
        400 => "400 Bad Request",
        401 => "401 Unauthorized",
        429 => "429 Too Many Requests",
        500 => "500 Internal Server Error",
        502 => "502 Bad Gateway",
        503 => "503 Service Unavailable",
        _ => "200 OK",
    }
}

/// Start a programmable upstream on an ephemeral port.
///
/// `f` receives the zero-based call number and returns status and body.
pub async fn start_programmable_upstream<F, Fut>(f: F) -> MockUpstream
where
    F: Fn(u32) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = (u16, String)> + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let calls = Arc::new(AtomicU32::new(0));
    let requests = Arc::new(Mutex::new(Vec::new()));
    let f = Arc::new(f);

    let upstream = MockUpstream {
        addr,
        calls: calls.clone(),
        requests: requests.clone(),
    };

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    let f = f.clone();
                    let calls = calls.clone();
                    let requests = requests.clone();
                    tokio::spawn(async move {
                        let Some(request) = read_request(&mut socket).await else {
                            return;
                        };
                        requests.lock().unwrap().push(request);
                        let call = calls.fetch_add(1, Ordering::SeqCst);

                        let (status, body) = f(call).await;
                        let response = format!(
                            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                            status_text(status),
                            body.len(),
                            body
                        );
                        let _ = socket.write_all(response.as_bytes()).await;
                        let _ = socket.shutdown().await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    upstream
}

/// Upstream that always answers with `content` as the assistant message.
pub async fn start_report_upstream(content: &'static str) -> MockUpstream {
    start_programmable_upstream(move |_| async move { (200, chat_completion(content)) }).await
}

pub fn chat_completion(content: &str) -> String {
    json!({
        "id": "chatcmpl-test",
        "choices": [{ "index": 0, "message": { "role": "assistant", "content": content } }]
    })
    .to_string()
}

/// Config pointing at `upstream_url` with fast retries.
pub fn test_config(upstream_url: &str) -> ServiceConfig {
    let mut config = ServiceConfig::default();
    config.listener.bind_address = "127.0.0.1:0".to_string();
    config.llm.base_url = upstream_url.to_string();
    config.llm.api_key = "test-key".to_string();
    config.llm.model = "test-model".to_string();
    config.retries.base_delay_ms = 10;
    config.retries.max_delay_ms = 100;
    config.timeouts.upstream_request_secs = 5;
    config
}

pub fn test_client(config: &ServiceConfig) -> ReportClient {
    ReportClient::new(config.llm.clone(), &config.retries, &config.timeouts).unwrap()
}

/// A running report service.
pub struct TestServer {
    pub addr: SocketAddr,
    pub shutdown: Shutdown,
}

impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

pub async fn start_server(config: ServiceConfig) -> TestServer {
    let generator = ReportGenerator::new(test_client(&config));
    let server = HttpServer::with_generator(config, generator);
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });
    tokio::time::sleep(Duration::from_millis(50)).await;

    TestServer { addr, shutdown }
}

pub fn http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}

pub fn shop_info() -> Value {
    json!({
        "shopName": "测试餐厅",
        "category": "中式快餐",
        "address": "北京市朝阳区测试街道123号",
        "businessHours": "06:30 - 15:30"
    })
}

pub fn operation_data() -> Value {
    json!({
        "thisWeek": {
            "exposureCount": 1000, "visitCount": 150, "visitConversionRate": 15,
            "orderConversionRate": 20, "orderCount": 30, "repurchaseRate": 25
        },
        "lastWeek": {
            "exposureCount": 800, "visitCount": 120, "visitConversionRate": 15,
            "orderConversionRate": 25, "orderCount": 30, "repurchaseRate": 20
        }
    })
}

/// Operation data where visits exceed exposure this week.
pub fn suspicious_operation_data() -> Value {
    let mut data = operation_data();
    data["thisWeek"]["visitCount"] = json!(1500);
    data["thisWeek"]["orderCount"] = json!(300);
    data
}

pub fn report_data() -> Value {
    json!({
        "shopInfo": shop_info(),
        "operationData": operation_data(),
        "generatedAt": "2024-03-08T10:00:00Z"
    })
}
