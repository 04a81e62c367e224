//! Keyed signatures over session tokens.
//!
//! The daemon mints one 32-byte secret at startup and signs every issued
//! token together with its issuance timestamp:
//!
//!   signature = BLAKE3_keyed(secret, token || ":" || started_unix_ms)
//!
//! The secret never leaves the process and is never persisted or logged.
//! A restart regenerates it, which silently invalidates every outstanding
//! session — sessions are not meant to survive one.
//!
//! Clients are shown only a 16-hex-character prefix of the signature, a
//! display-level echo. Verification always re-derives the full signature
//! from server-held state; the prefix plays no part in it.

use rand::RngCore;
use zeroize::Zeroizing;

/// Hex characters of the full signature echoed to clients.
pub const PARTIAL_LEN: usize = 16;

/// Generate a fresh session token: 32 random bytes, hex-encoded.
pub fn generate_token() -> String {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// First [`PARTIAL_LEN`] hex characters of a full signature.
pub fn partial(signature: &[u8; 32]) -> String {
    hex::encode(&signature[..PARTIAL_LEN / 2])
}

/// Process-lifetime signing secret.
///
/// Wiped from memory on drop. There is no way to read the secret back out.
pub struct SigningKey {
    secret: Zeroizing<[u8; 32]>,
}

impl SigningKey {
    /// Generate a fresh random secret. Called once at daemon startup.
    pub fn generate() -> Self {
        let mut secret = Zeroizing::new([0u8; 32]);
        rand::thread_rng().fill_bytes(&mut *secret);
        Self { secret }
    }

    /// Sign a token and its issuance timestamp.
    ///
    /// Deterministic for the lifetime of this key: same inputs, same
    /// signature.
    pub fn sign(&self, token: &str, started_unix_ms: u64) -> [u8; 32] {
        let mut input = Vec::with_capacity(token.len() + 24);
        input.extend_from_slice(token.as_bytes());
        input.push(b':');
        input.extend_from_slice(started_unix_ms.to_string().as_bytes());
        *blake3::keyed_hash(&self.secret, &input).as_bytes()
    }

    /// Re-derive the signature and compare against a stored one.
    ///
    /// Comparison goes through `blake3::Hash`, which compares in constant
    /// time.
    pub fn verify(&self, token: &str, started_unix_ms: u64, signature: &[u8; 32]) -> bool {
        blake3::Hash::from(self.sign(token, started_unix_ms)) == blake3::Hash::from(*signature)
    }
}
