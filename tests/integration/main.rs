//! End-to-end tests — a real axum server on an ephemeral loopback port,
//! driven over HTTP with reqwest.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;

use marquee_core::sig::SigningKey;
use marquee_services::{AntiCheatPolicy, ScoreStore, SessionRegistry, TimeBounds};

mod anticheat;
mod sessions;

static DIR_SEQ: AtomicUsize = AtomicUsize::new(0);

/// A freshly started daemon core plus direct handles to its state.
pub struct TestServer {
    pub base: String,
    pub registry: SessionRegistry,
    pub store: ScoreStore,
    pub scores_path: PathBuf,
}

/// Start a real API server on an ephemeral loopback port, with a unique
/// temp path for the score document (which does not exist yet).
pub async fn spawn_server(capacity: usize) -> TestServer {
    let n = DIR_SEQ.fetch_add(1, Ordering::Relaxed);
    let dir = std::env::temp_dir().join(format!("marquee-e2e-{}-{}", std::process::id(), n));
    std::fs::create_dir_all(&dir).unwrap();
    let scores_path = dir.join("scores.json");

    let registry = SessionRegistry::new(Arc::new(SigningKey::generate()));
    let store = ScoreStore::new(&scores_path, capacity);

    let state = marquee_api::ApiState {
        registry: registry.clone(),
        store: store.clone(),
        policy: AntiCheatPolicy::default(),
        bounds: TimeBounds::default(),
        list_limit: 50,
        started_at: Instant::now(),
    };

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr: SocketAddr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, marquee_api::router(state))
            .await
            .unwrap();
    });

    TestServer {
        base: format!("http://{}/api", addr),
        registry,
        store,
        scores_path,
    }
}

/// POST a JSON body and return (status, parsed body).
pub async fn post(url: &str, body: serde_json::Value) -> (u16, serde_json::Value) {
    let resp = reqwest::Client::new()
        .post(url)
        .json(&body)
        .send()
        .await
        .unwrap();
    let status = resp.status().as_u16();
    (status, resp.json().await.unwrap())
}

/// GET a URL and return (status, parsed body).
pub async fn get(url: &str) -> (u16, serde_json::Value) {
    let resp = reqwest::get(url).await.unwrap();
    let status = resp.status().as_u16();
    (status, resp.json().await.unwrap())
}

/// A minimal valid submission body.
pub fn submission(name: &str, time_ms: u64) -> serde_json::Value {
    serde_json::json!({
        "name": name,
        "cinema": "Rialto",
        "time": time_ms,
    })
}
