//! Test doubles shared by the unit and scenario tests.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use tempfile::TempDir;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

use crate::database::{LibsqlStore, MonitoredSite, initialize_database};
use crate::monitoring::checker::Checker;
use crate::monitoring::connectivity::ConnectivityGate;
use crate::monitoring::types::ProbeOutcome;
use crate::notify::{AlertMessage, NotificationChannel, NotifyError};
use crate::pool::open_pool;

/// Fresh migrated database in a temp dir; keep the `TempDir` alive for the test
pub async fn test_store() -> Result<(LibsqlStore, TempDir)> {
    let dir = tempfile::tempdir()?;
    let pool = open_pool(dir.path().join("test.db")).await?;
    {
        let conn = pool.get().await?;
        initialize_database(&conn).await?;
    }
    Ok((LibsqlStore::new(pool), dir))
}

pub fn sample_site(id: i64, url: &str) -> MonitoredSite {
    MonitoredSite {
        id,
        name: "sitio".into(),
        url: url.into(),
        active: true,
        status: "Pendiente".into(),
        response_time: 0.0,
        last_checked_at: None,
        created_at: Utc::now(),
    }
}

#[derive(Debug, Clone, Copy)]
pub enum StubReply {
    Status(u16),
    /// Accept the connection and never answer
    Hang,
}

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub head: String,
    pub body: String,
}

/// Minimal HTTP/1.1 server on 127.0.0.1 answering every request the same way
pub async fn spawn_stub_server(reply: StubReply) -> String {
    spawn_recording_server(reply).await.0
}

pub async fn spawn_recording_server(
    reply: StubReply,
) -> (String, Arc<Mutex<Vec<RecordedRequest>>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind stub server");
    let addr = listener.local_addr().expect("stub server address");
    let requests = Arc::new(Mutex::new(Vec::new()));
    let recorded = requests.clone();

    tokio::spawn(async move {
        loop {
            let Ok((stream, _)) = listener.accept().await else { break };
            let recorded = recorded.clone();
            tokio::spawn(async move {
                let _ = serve_one(stream, reply, recorded).await;
            });
        }
    });

    (format!("http://{addr}"), requests)
}

async fn serve_one(
    mut stream: TcpStream,
    reply: StubReply,
    recorded: Arc<Mutex<Vec<RecordedRequest>>>,
) -> std::io::Result<()> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];

    let head_end = loop {
        let n = stream.read(&mut chunk).await?;
        if n == 0 {
            return Ok(());
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8_lossy(&buf[..head_end]).to_string();
    let content_length = head
        .lines()
        .filter_map(|line| line.split_once(':'))
        .find(|(name, _)| name.eq_ignore_ascii_case("content-length"))
        .and_then(|(_, value)| value.trim().parse::<usize>().ok())
        .unwrap_or(0);

    while buf.len() < head_end + content_length {
        let n = stream.read(&mut chunk).await?;
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
    }

    let body = String::from_utf8_lossy(&buf[head_end..]).to_string();
    recorded.lock().expect("recorded requests").push(RecordedRequest { head, body });

    match reply {
        StubReply::Status(code) => {
            let response =
                format!("HTTP/1.1 {code} Stub\r\nContent-Length: 0\r\nConnection: close\r\n\r\n");
            stream.write_all(response.as_bytes()).await?;
            stream.shutdown().await
        }
        StubReply::Hang => {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Ok(())
        }
    }
}

/// URL of a local port nothing listens on
pub async fn unused_local_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind probe port");
    let addr = listener.local_addr().expect("probe port address");
    drop(listener);
    format!("http://{addr}")
}

/// Checker answering from a fixed table; unknown URLs get a transport error
#[derive(Clone, Default)]
pub struct FakeChecker {
    outcomes: Arc<HashMap<String, ProbeOutcome>>,
    probed: Arc<Mutex<Vec<String>>>,
}

impl FakeChecker {
    pub fn new(outcomes: impl IntoIterator<Item = (String, ProbeOutcome)>) -> Self {
        Self {
            outcomes: Arc::new(outcomes.into_iter().collect()),
            probed: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn probed(&self) -> Vec<String> {
        self.probed.lock().expect("probed urls").clone()
    }
}

pub fn http(status: u16) -> ProbeOutcome {
    ProbeOutcome::Response { status, elapsed: Duration::from_millis(150) }
}

#[async_trait]
impl Checker for FakeChecker {
    async fn probe(&self, target: &str) -> ProbeOutcome {
        self.probed.lock().expect("probed urls").push(target.to_string());
        self.outcomes
            .get(target)
            .cloned()
            .unwrap_or_else(|| ProbeOutcome::Transport("connection refused".into()))
    }
}

/// Gate returning scripted answers, then `true` once the script runs out
#[derive(Clone, Default)]
pub struct FakeGate {
    answers: Arc<Mutex<VecDeque<bool>>>,
}

impl FakeGate {
    pub fn online() -> Self {
        Self::default()
    }

    pub fn offline() -> Self {
        Self::scripted([false])
    }

    pub fn scripted(answers: impl IntoIterator<Item = bool>) -> Self {
        Self { answers: Arc::new(Mutex::new(answers.into_iter().collect())) }
    }
}

#[async_trait]
impl ConnectivityGate for FakeGate {
    async fn is_network_reachable(&self) -> bool {
        self.answers.lock().expect("gate script").pop_front().unwrap_or(true)
    }
}

/// Channel that keeps every alert it is handed
#[derive(Clone, Default)]
pub struct RecordingChannel {
    sent: Arc<Mutex<Vec<AlertMessage>>>,
}

impl RecordingChannel {
    pub fn sent(&self) -> Vec<AlertMessage> {
        self.sent.lock().expect("sent alerts").clone()
    }
}

#[async_trait]
impl NotificationChannel for RecordingChannel {
    fn name(&self) -> &str {
        "recorder"
    }

    async fn deliver(&self, alert: &AlertMessage) -> Result<(), NotifyError> {
        self.sent.lock().expect("sent alerts").push(alert.clone());
        Ok(())
    }
}
