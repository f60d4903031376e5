//! # ops-credentials
//!
//! Password hashing and verification for the operations backend.
//!
//! Stored credentials come in two forms:
//!
//! - `sha256$<salt-hex>$<digest-hex>` — the current format: a random
//!   16-byte salt and the SHA-256 of `salt || password`, both hex-encoded.
//! - anything else — a legacy plaintext credential from before the hashing
//!   rollout. These still verify by direct comparison, and callers are
//!   expected to rehash on the next successful login ([`CredentialCheck`]
//!   carries the `needs_rehash` signal). This is a deliberate, temporary
//!   migration path, not a pattern to copy.
//!
//! ## Quick Example
//!
//! ```rust
//! use ops_credentials::{check, hash, CredentialCheck};
//!
//! let stored = hash("hunter2");
//! assert!(matches!(
//!     check("hunter2", &stored),
//!     CredentialCheck::Valid { needs_rehash: false }
//! ));
//! ```

use rand::RngCore;
use sha2::{Digest, Sha256};

/// Format prefix identifying a hashed credential.
const HASH_PREFIX: &str = "sha256$";

/// Result of checking a submitted password against a stored credential.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialCheck {
    /// Password matches. `needs_rehash` is set when the stored form is
    /// legacy plaintext and should be upgraded opportunistically.
    Valid { needs_rehash: bool },
    /// Password does not match.
    Invalid,
}

/// Hash a password into the stored `sha256$salt$digest` form.
pub fn hash(password: &str) -> String {
    let mut salt = [0u8; 16];
    rand::thread_rng().fill_bytes(&mut salt);
    let salt_hex = hex_encode(&salt);
    format!("{HASH_PREFIX}{salt_hex}${}", digest(&salt_hex, password))
}

/// Whether a stored credential is in the current hashed format.
pub fn is_hashed(stored: &str) -> bool {
    stored.starts_with(HASH_PREFIX)
}

/// Check a submitted password against a stored credential.
///
/// Hashed credentials verify against the embedded salt; anything else is
/// treated as legacy plaintext and compared directly. A malformed hash
/// (prefix present but missing fields) never verifies.
pub fn check(password: &str, stored: &str) -> CredentialCheck {
    if let Some(rest) = stored.strip_prefix(HASH_PREFIX) {
        let Some((salt_hex, digest_hex)) = rest.split_once('$') else {
            return CredentialCheck::Invalid;
        };
        if digest(salt_hex, password) == digest_hex {
            CredentialCheck::Valid {
                needs_rehash: false,
            }
        } else {
            CredentialCheck::Invalid
        }
    } else if stored == password {
        CredentialCheck::Valid { needs_rehash: true }
    } else {
        CredentialCheck::Invalid
    }
}

fn digest(salt_hex: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt_hex.as_bytes());
    hasher.update(password.as_bytes());
    // `format!("{:x}", ...)` produces lowercase hex
    format!("{:x}", hasher.finalize())
}

fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}
