//! marqueed — leaderboard daemon for timed arcade attempts.

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;

use marquee_core::config::MarqueeConfig;
use marquee_core::sig::SigningKey;
use marquee_services::{AntiCheatPolicy, ScoreStore, SessionRegistry, TimeBounds};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    // Load config
    if let Err(e) = MarqueeConfig::write_default_if_missing() {
        tracing::warn!(error = %e, "failed to write default config");
    }
    let config = MarqueeConfig::load().unwrap_or_else(|e| {
        tracing::warn!(error = %e, "failed to load config, using defaults");
        MarqueeConfig::default()
    });

    tracing::info!(
        port = config.network.api_port,
        scores = %config.storage.scores_path.display(),
        capacity = config.board.capacity,
        "marqueed starting"
    );

    // Process-lifetime signing secret. A restart regenerates it, which
    // invalidates every outstanding session — intended.
    let key = Arc::new(SigningKey::generate());

    let registry = SessionRegistry::new(key);
    let store = ScoreStore::new(&config.storage.scores_path, config.board.capacity);

    // ── Shutdown channel ─────────────────────────────────────────────────────

    let (shutdown_tx, _) = tokio::sync::broadcast::channel::<()>(1);
    {
        let shutdown = shutdown_tx.clone();
        tokio::spawn(async move {
            tokio::signal::ctrl_c().await.ok();
            tracing::info!("shutdown signal received");
            let _ = shutdown.send(());
        });
    }

    // ── Spawn tasks ──────────────────────────────────────────────────────────

    let sweep_task = {
        let registry = registry.clone();
        let max_age = Duration::from_secs(config.sessions.max_age_secs);
        let every = Duration::from_secs(config.sessions.sweep_interval_secs);
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(every);
            // The first tick fires immediately; skip it.
            interval.tick().await;
            loop {
                interval.tick().await;
                let evicted = registry.sweep(max_age);
                tracing::info!(evicted, live = registry.len(), "session sweep complete");
            }
        })
    };

    let api_task = {
        let state = marquee_api::ApiState {
            registry: registry.clone(),
            store: store.clone(),
            policy: AntiCheatPolicy {
                grace_ms: config.sessions.grace_ms,
                min_interactions: config.sessions.min_interactions,
            },
            bounds: TimeBounds {
                min_ms: config.board.min_time_ms,
                max_ms: config.board.max_time_ms,
            },
            list_limit: config.board.list_limit,
            started_at: Instant::now(),
        };
        let port = config.network.api_port;
        tokio::spawn(async move {
            if let Err(e) = marquee_api::serve(state, port).await {
                tracing::error!(error = %e, "API server failed");
            }
        })
    };

    // ── Wait for exit ────────────────────────────────────────────────────────

    let mut shutdown_rx = shutdown_tx.subscribe();

    tokio::select! {
        _ = shutdown_rx.recv() => tracing::info!("shutting down"),
        r = sweep_task         => tracing::error!("sweep task exited: {:?}", r),
        r = api_task           => tracing::error!("API task exited: {:?}", r),
    }

    Ok(())
}
