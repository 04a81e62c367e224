//! marquee-services — the shared mutable state behind the API: the
//! session registry, the ranked score store, and the anti-cheat evaluator.

pub mod anticheat;
pub mod score_store;
pub mod session;

pub use anticheat::{evaluate, AntiCheatPolicy, TimeBounds, ValidationError};
pub use score_store::{Placement, ScoreCandidate, ScoreEntry, ScoreStore, StoreError};
pub use session::{Issued, SessionRegistry, SessionSnapshot};
