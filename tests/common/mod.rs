//! Shared utilities for integration testing.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Instant;

use auth_hook::config::{HookConfig, LocationConfig};
use auth_hook::{HttpServer, Shutdown};
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;

/// A request as seen by a mock upstream.
#[derive(Debug, Clone)]
pub struct Recorded {
    pub upstream: &'static str,
    pub method: String,
    pub path: String,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
    /// When the request line arrived.
    pub received_at: Instant,
}

#[allow(dead_code)]
impl Recorded {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Requests seen by every mock upstream of a test, in arrival order.
pub type Journal = Arc<Mutex<Vec<Recorded>>>;

pub fn journal() -> Journal {
    Arc::new(Mutex::new(Vec::new()))
}

/// Start a mock upstream that records each request into `journal` and answers
/// with whatever `respond` yields.
pub async fn start_upstream<F, Fut>(name: &'static str, journal: Journal, respond: F) -> SocketAddr
where
    F: Fn(Recorded) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = (u16, String)> + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let respond = Arc::new(respond);

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((socket, _)) => {
                    let journal = journal.clone();
                    let respond = respond.clone();
                    tokio::spawn(async move {
                        serve_one(name, socket, journal, respond).await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    addr
}

/// Start a mock upstream with a fixed answer.
#[allow(dead_code)]
pub async fn start_fixed_upstream(
    name: &'static str,
    journal: Journal,
    status: u16,
    body: &'static str,
) -> SocketAddr {
    start_upstream(name, journal, move |_| async move { (status, body.to_string()) }).await
}

async fn serve_one<F, Fut>(name: &'static str, mut socket: TcpStream, journal: Journal, respond: Arc<F>)
where
    F: Fn(Recorded) -> Fut,
    Fut: Future<Output = (u16, String)>,
{
    let Some(recorded) = read_request(name, &mut socket).await else {
        return;
    };
    journal.lock().unwrap().push(recorded.clone());

    let (status, body) = respond(recorded).await;
    let response = format!(
        "HTTP/1.1 {} {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        reason(status),
        body.len(),
        body
    );
    let _ = socket.write_all(response.as_bytes()).await;
    let _ = socket.shutdown().await;
}

async fn read_request(name: &'static str, socket: &mut TcpStream) -> Option<Recorded> {
    let mut reader = BufReader::new(socket);

    let mut line = String::new();
    reader.read_line(&mut line).await.ok()?;
    let received_at = Instant::now();
    let mut parts = line.split_whitespace();
    let method = parts.next()?.to_string();
    let path = parts.next()?.to_string();

    let mut headers = Vec::new();
    let mut content_length = 0usize;
    loop {
        let mut header = String::new();
        reader.read_line(&mut header).await.ok()?;
        let header = header.trim_end();
        if header.is_empty() {
            break;
        }
        let (key, value) = header.split_once(':')?;
        let (key, value) = (key.trim().to_string(), value.trim().to_string());
        if key.eq_ignore_ascii_case("content-length") {
            content_length = value.parse().ok()?;
        }
        headers.push((key, value));
    }

    let mut body = vec![0; content_length];
    reader.read_exact(&mut body).await.ok()?;

    Some(Recorded {
        upstream: name,
        method,
        path,
        headers,
        body,
        received_at,
    })
}

fn reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        201 => "Created",
        403 => "Forbidden",
        404 => "Not Found",
        500 => "Internal Server Error",
        503 => "Service Unavailable",
        _ => "Unknown",
    }
}

/// Hook config pointing `/_opa` at `auth` and `/_storm-tape` at `backend`.
///
/// The backend location keeps its prefix so mocks see the full internal path.
pub fn hook_config(auth: SocketAddr, backend: SocketAddr) -> HookConfig {
    let mut config = HookConfig::default();
    config.listener.bind_address = "127.0.0.1:0".into();
    config.timeouts.subrequest_secs = 2;
    config.locations = vec![
        LocationConfig {
            prefix: "/_opa".into(),
            upstream: format!("http://{}", auth),
            strip_prefix: true,
        },
        LocationConfig {
            prefix: "/_storm-tape".into(),
            upstream: format!("http://{}", backend),
            strip_prefix: false,
        },
    ];
    config
}

/// A running hook under test.
#[allow(dead_code)]
pub struct Hook {
    pub addr: SocketAddr,
    pub shutdown: Shutdown,
    pub updates: mpsc::UnboundedSender<HookConfig>,
}

#[allow(dead_code)]
impl Hook {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

/// Start the hook on an ephemeral port.
pub async fn start_hook(config: HookConfig) -> Hook {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let (updates, config_updates) = mpsc::unbounded_channel();
    let server = HttpServer::new(config);
    let server_shutdown = shutdown.subscribe();

    tokio::spawn(async move {
        let _ = server.run(listener, config_updates, server_shutdown).await;
    });

    Hook {
        addr,
        shutdown,
        updates,
    }
}

/// Client that never reuses connections or goes through a system proxy.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}
