//! Challenge-response authentication.
//!
//! obs-websocket 4.x authenticates with two salted SHA-256 rounds:
//!
//! ```text
//! secret = base64(sha256(password + salt))
//! auth   = base64(sha256(secret + challenge))
//! ```

// ============================================================================
// Imports
// ============================================================================

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use sha2::{Digest, Sha256};

// ============================================================================
// Functions
// ============================================================================

/// Computes the `auth` field of an `Authenticate` request.
#[must_use]
pub fn challenge_response(password: &str, salt: &str, challenge: &str) -> String {
    let secret = digest_base64(password, salt);
    digest_base64(&secret, challenge)
}

fn digest_base64(first: &str, second: &str) -> String {
    let digest = Sha256::new()
        .chain_update(first.as_bytes())
        .chain_update(second.as_bytes())
        .finalize();
    BASE64.encode(digest)
}

// ============================================================================
// Tests
// ============================================================================
