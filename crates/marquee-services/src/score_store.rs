//! Durable ranked leaderboard — a single JSON document on disk.
//!
//! The whole collection is loaded, mutated, and rewritten on every insert;
//! one async Mutex serializes writers so load/save halves never interleave
//! (the lost-update hazard of a file-as-database). Persistence replaces
//! the file atomically — write to `<path>.tmp`, then rename — so a
//! concurrent reader sees either the old document or the new one, never a
//! torn one.

use std::path::PathBuf;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::Mutex;

/// One persisted leaderboard record. Never updated after insertion;
/// removed only by truncation eviction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreEntry {
    pub id: String,
    pub name: String,
    pub cinema: String,
    pub email: Option<String>,
    /// Elapsed game time in milliseconds.
    #[serde(rename = "time")]
    pub time_ms: u64,
    /// Submission instant, ISO-8601 on the wire.
    pub date: DateTime<Utc>,
    /// Anti-cheat verdict at insertion time.
    pub verified: bool,
    /// Client-declared platform flag.
    pub mobile: bool,
}

/// Validated fields for a new entry. `id` and `date` are stamped by the
/// store at insertion.
#[derive(Debug, Clone)]
pub struct ScoreCandidate {
    pub name: String,
    pub cinema: String,
    pub email: Option<String>,
    pub time_ms: u64,
    pub verified: bool,
    pub mobile: bool,
}

impl ScoreCandidate {
    /// Build a candidate from raw client fields: trims whitespace and
    /// caps lengths (name 50, cinema 100, email 100 chars).
    pub fn new(
        name: &str,
        cinema: &str,
        email: Option<&str>,
        time_ms: u64,
        verified: bool,
        mobile: bool,
    ) -> Self {
        Self {
            name: trim_cap(name, 50),
            cinema: trim_cap(cinema, 100),
            email: email.map(|e| trim_cap(e, 100)),
            time_ms,
            verified,
            mobile,
        }
    }
}

fn trim_cap(value: &str, max_chars: usize) -> String {
    value.trim().chars().take(max_chars).collect()
}

/// Outcome of an insert with respect to the capacity-bounded board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// 1-based position within the persisted, sorted collection.
    Ranked(usize),
    /// The entry was slower than every retained entry and was dropped by
    /// truncation. Encoded as rank 0 on the wire.
    Evicted,
}

impl Placement {
    pub fn rank(self) -> usize {
        match self {
            Placement::Ranked(rank) => rank,
            Placement::Evicted => 0,
        }
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to read score document: {0}")]
    Read(std::io::Error),
    #[error("score document is malformed: {0}")]
    Parse(serde_json::Error),
    #[error("failed to serialize score document: {0}")]
    Serialize(serde_json::Error),
    #[error("failed to write score document: {0}")]
    Write(std::io::Error),
}

/// Owner of the on-disk leaderboard. Clone shares the writer lock.
#[derive(Clone)]
pub struct ScoreStore {
    path: PathBuf,
    capacity: usize,
    write_lock: Arc<Mutex<()>>,
}

impl ScoreStore {
    pub fn new(path: impl Into<PathBuf>, capacity: usize) -> Self {
        Self {
            path: path.into(),
            capacity,
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Read-only projection: ascending by time, at most `limit` entries.
    ///
    /// A missing document is legitimately empty; an unreadable or
    /// malformed one is an error, never a silent empty list.
    pub fn list(&self, limit: usize) -> Result<Vec<ScoreEntry>, StoreError> {
        let mut entries = self.load()?;
        entries.sort_by_key(|e| e.time_ms);
        entries.truncate(limit);
        Ok(entries)
    }

    /// Append a new entry, re-rank, truncate to capacity, persist
    /// atomically. Returns the placement and the stored entry.
    pub async fn insert(
        &self,
        candidate: ScoreCandidate,
    ) -> Result<(Placement, ScoreEntry), StoreError> {
        let _guard = self.write_lock.lock().await;

        let mut entries = self.load()?;
        let entry = ScoreEntry {
            id: generate_id(),
            name: candidate.name,
            cinema: candidate.cinema,
            email: candidate.email,
            time_ms: candidate.time_ms,
            date: Utc::now(),
            verified: candidate.verified,
            mobile: candidate.mobile,
        };
        entries.push(entry.clone());
        // Stable sort: equal times keep insertion order, so a new entry
        // ranks behind existing ties.
        entries.sort_by_key(|e| e.time_ms);
        entries.truncate(self.capacity);
        self.persist(&entries)?;

        let placement = entries
            .iter()
            .position(|e| e.id == entry.id)
            .map(|i| Placement::Ranked(i + 1))
            .unwrap_or(Placement::Evicted);

        tracing::debug!(
            time_ms = entry.time_ms,
            verified = entry.verified,
            rank = placement.rank(),
            stored = entries.len(),
            "score inserted"
        );
        Ok((placement, entry))
    }

    /// Number of persisted entries.
    pub fn count(&self) -> Result<usize, StoreError> {
        Ok(self.load()?.len())
    }

    fn load(&self) -> Result<Vec<ScoreEntry>, StoreError> {
        let text = match std::fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(StoreError::Read(e)),
        };
        serde_json::from_str(&text).map_err(StoreError::Parse)
    }

    fn persist(&self, entries: &[ScoreEntry]) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(StoreError::Write)?;
        }
        let json = serde_json::to_string_pretty(entries).map_err(StoreError::Serialize)?;
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, json).map_err(StoreError::Write)?;
        std::fs::rename(&tmp, &self.path).map_err(StoreError::Write)
    }
}

fn generate_id() -> String {
    let mut bytes = [0u8; 16];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}
