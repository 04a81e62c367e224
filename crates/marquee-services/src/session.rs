//! Session registry — server-issued tokens for timed game attempts.
//!
//! A client opens a session before playing, reports interaction events
//! while playing, and spends the session exactly once when submitting a
//! score. Sessions live in memory only; a periodic sweep deletes anything
//! older than the lifetime cap so abandoned attempts cannot accumulate.
//!
//! All read-modify-write paths go through DashMap entry guards, which are
//! exclusive per key. `consume` is a check-and-mark under that guard: of
//! two racing submissions with the same token, exactly one sees the
//! session and the other sees not-found.

use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use dashmap::DashMap;

use marquee_core::sig::{self, SigningKey};

/// One in-progress timed attempt. Exclusively owned by the registry;
/// handlers only ever see an [`Issued`] or a [`SessionSnapshot`].
#[derive(Debug)]
pub struct Session {
    pub token: String,
    pub started_at: Instant,
    /// Wall-clock issuance instant — the value the signature covers.
    pub started_unix_ms: u64,
    /// Full keyed signature over `(token, started_unix_ms)`.
    pub signature: [u8; 32],
    pub interactions: u32,
    pub last_interaction: Option<Instant>,
    /// Set once by `consume`; the session is inert afterwards.
    pub submitted: bool,
}

/// Credentials returned to the client when a session is opened.
#[derive(Debug, Clone)]
pub struct Issued {
    pub token: String,
    pub started_unix_ms: u64,
    /// 16-hex-char prefix of the full signature, for client display only.
    pub partial_sig: String,
}

/// Immutable view of a consumed session, handed to the anti-cheat
/// evaluator.
#[derive(Debug, Clone, Copy)]
pub struct SessionSnapshot {
    /// How long the session had been running at consumption.
    pub duration: Duration,
    pub interactions: u32,
    /// Whether the stored signature still re-derives from the process key.
    /// False means the registry entry was not issued by this process.
    pub signature_ok: bool,
}

/// In-memory token → session map. Clone shares the underlying table.
pub struct SessionRegistry {
    sessions: Arc<DashMap<String, Session>>,
    key: Arc<SigningKey>,
}

impl SessionRegistry {
    pub fn new(key: Arc<SigningKey>) -> Self {
        Self {
            sessions: Arc::new(DashMap::new()),
            key,
        }
    }

    /// Open a session: mint a fresh high-entropy token, sign it, store it.
    pub fn start(&self) -> Issued {
        let token = sig::generate_token();
        let started_unix_ms = unix_ms();
        let signature = self.key.sign(&token, started_unix_ms);

        self.sessions.insert(
            token.clone(),
            Session {
                token: token.clone(),
                started_at: Instant::now(),
                started_unix_ms,
                signature,
                interactions: 0,
                last_interaction: None,
                submitted: false,
            },
        );
        tracing::debug!(token = &token[..8], "session opened");

        Issued {
            token,
            started_unix_ms,
            partial_sig: sig::partial(&signature),
        }
    }

    /// Record one in-game interaction event.
    ///
    /// Unknown token, missing session, and already-submitted all return
    /// false identically — callers learn nothing about which it was.
    pub fn interact(&self, token: &str) -> bool {
        match self.sessions.get_mut(token) {
            Some(mut session) if !session.submitted => {
                session.interactions += 1;
                session.last_interaction = Some(Instant::now());
                true
            }
            _ => false,
        }
    }

    /// Atomically mark the session submitted and return a snapshot for
    /// evaluation, or None if it does not exist or was already spent.
    ///
    /// The caller is responsible for deleting the entry afterwards.
    pub fn consume(&self, token: &str) -> Option<SessionSnapshot> {
        let mut session = self.sessions.get_mut(token)?;
        if session.submitted {
            return None;
        }
        session.submitted = true;
        Some(SessionSnapshot {
            duration: session.started_at.elapsed(),
            interactions: session.interactions,
            signature_ok: self.key.verify(
                &session.token,
                session.started_unix_ms,
                &session.signature,
            ),
        })
    }

    /// Remove a session. Called after a submission has consumed it.
    pub fn delete(&self, token: &str) {
        self.sessions.remove(token);
    }

    /// Delete every session older than `max_age`, submitted or not.
    /// Returns how many were evicted.
    pub fn sweep(&self, max_age: Duration) -> usize {
        let before = self.sessions.len();
        self.sessions
            .retain(|_, session| session.started_at.elapsed() <= max_age);
        let evicted = before.saturating_sub(self.sessions.len());
        if evicted > 0 {
            tracing::debug!(evicted, live = self.sessions.len(), "session sweep");
        }
        evicted
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

impl Clone for SessionRegistry {
    fn clone(&self) -> Self {
        Self {
            sessions: self.sessions.clone(),
            key: self.key.clone(),
        }
    }
}

fn unix_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
