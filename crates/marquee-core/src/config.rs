//! Configuration system for marquee.
//!
//! Resolution order: environment variables → config file → defaults.
//!
//! Config file location:
//!   1. $MARQUEE_CONFIG (explicit override)
//!   2. $XDG_CONFIG_HOME/marquee/config.toml
//!   3. ~/.config/marquee/config.toml

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Top-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MarqueeConfig {
    pub network: NetworkConfig,
    pub storage: StorageConfig,
    pub sessions: SessionsConfig,
    pub board: BoardConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// TCP port for the JSON API.
    pub api_port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Path of the leaderboard document. Created empty on first insert.
    pub scores_path: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionsConfig {
    /// Sessions older than this are deleted by the sweep, submitted or not.
    pub max_age_secs: u64,
    /// How often the sweep runs.
    pub sweep_interval_secs: u64,
    /// Interaction count a session needs before a score can be verified.
    pub min_interactions: u32,
    /// Slack added to the session duration when checking a claimed time,
    /// covering network round-trip latency.
    pub grace_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BoardConfig {
    /// Maximum persisted entries. Slowest times are evicted first.
    pub capacity: usize,
    /// Maximum entries returned by a list request.
    pub list_limit: usize,
    /// Hard lower bound on a submitted time, in milliseconds.
    pub min_time_ms: u64,
    /// Hard upper bound on a submitted time, in milliseconds.
    pub max_time_ms: u64,
}

// ── Defaults ──────────────────────────────────────────────────────────────────

impl Default for MarqueeConfig {
    fn default() -> Self {
        Self {
            network: NetworkConfig::default(),
            storage: StorageConfig::default(),
            sessions: SessionsConfig::default(),
            board: BoardConfig::default(),
        }
    }
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self { api_port: 9040 }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            scores_path: data_dir().join("scores.json"),
        }
    }
}

impl Default for SessionsConfig {
    fn default() -> Self {
        Self {
            max_age_secs: 1800,
            sweep_interval_secs: 600,
            min_interactions: 3,
            grace_ms: 2000,
        }
    }
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            capacity: 500,
            list_limit: 50,
            min_time_ms: 3000,
            max_time_ms: 600_000,
        }
    }
}

// ── Path helpers ──────────────────────────────────────────────────────────────

fn config_dir() -> PathBuf {
    std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| dirs_or_home().join(".config"))
        .join("marquee")
}

pub fn data_dir() -> PathBuf {
    std::env::var("XDG_DATA_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| dirs_or_home().join(".local").join("share"))
        .join("marquee")
}

fn dirs_or_home() -> PathBuf {
    std::env::var("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("/tmp"))
}

// ── Errors ────────────────────────────────────────────────────────────────────

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {0}: {1}")]
    ReadFailed(PathBuf, std::io::Error),
    #[error("failed to parse {0}: {1}")]
    ParseFailed(PathBuf, toml::de::Error),
    #[error("failed to write {0}: {1}")]
    WriteFailed(PathBuf, std::io::Error),
    #[error("failed to serialize: {0}")]
    SerializeFailed(toml::ser::Error),
}

// ── Loading ───────────────────────────────────────────────────────────────────

impl MarqueeConfig {
    /// Load config: env vars → file → defaults.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::file_path();
        let mut config = if path.exists() {
            let text = std::fs::read_to_string(&path)
                .map_err(|e| ConfigError::ReadFailed(path.clone(), e))?;
            toml::from_str(&text).map_err(|e| ConfigError::ParseFailed(path.clone(), e))?
        } else {
            MarqueeConfig::default()
        };
        config.apply_env_overrides();
        Ok(config)
    }

    /// Config file path.
    pub fn file_path() -> PathBuf {
        std::env::var("MARQUEE_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| config_dir().join("config.toml"))
    }

    /// Write default config if none exists. Returns the path.
    pub fn write_default_if_missing() -> Result<PathBuf, ConfigError> {
        let path = Self::file_path();
        if !path.exists() {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| ConfigError::WriteFailed(path.clone(), e))?;
            }
            let text = toml::to_string_pretty(&MarqueeConfig::default())
                .map_err(ConfigError::SerializeFailed)?;
            std::fs::write(&path, text)
                .map_err(|e| ConfigError::WriteFailed(path.clone(), e))?;
        }
        Ok(path)
    }

    /// Apply MARQUEE_* env var overrides.
    fn apply_env_overrides(&mut self) {
        if let Ok(v) = std::env::var("MARQUEE_NETWORK__API_PORT") {
            if let Ok(p) = v.parse() {
                self.network.api_port = p;
            }
        }
        if let Ok(v) = std::env::var("MARQUEE_STORAGE__SCORES_PATH") {
            self.storage.scores_path = PathBuf::from(v);
        }
        if let Ok(v) = std::env::var("MARQUEE_SESSIONS__MAX_AGE_SECS") {
            if let Ok(s) = v.parse() {
                self.sessions.max_age_secs = s;
            }
        }
        if let Ok(v) = std::env::var("MARQUEE_SESSIONS__SWEEP_INTERVAL_SECS") {
            if let Ok(s) = v.parse() {
                self.sessions.sweep_interval_secs = s;
            }
        }
        if let Ok(v) = std::env::var("MARQUEE_BOARD__CAPACITY") {
            if let Ok(c) = v.parse() {
                self.board.capacity = c;
            }
        }
    }
}
