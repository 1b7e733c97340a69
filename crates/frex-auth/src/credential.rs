//! # Credential Hashing
//!
//! Salted password hashing with constant-time verification. The stored form
//! is owned by this crate and opaque to everything else — the core never
//! sees a password or a hash component.
//!
//! ## Format
//!
//! ```text
//! hs1$base64url(salt)$base64url(hmac_sha256(key = salt, msg = password))
//! ```
//!
//! A random 16-byte salt per credential; verification recomputes the MAC
//! and compares via `Mac::verify_slice`, which is constant-time.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

const SCHEME: &str = "hs1";
const SALT_LEN: usize = 16;

/// An opaque, salted credential hash.
#[derive(Clone, PartialEq, Eq)]
pub struct CredentialHash(String);

impl std::fmt::Debug for CredentialHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Never print hash material in logs.
        f.write_str("CredentialHash(redacted)")
    }
}

impl CredentialHash {
    /// Hash a password under a fresh random salt.
    pub fn from_password(password: &str) -> Self {
        let salt: [u8; SALT_LEN] = rand::random();
        Self::derive(&salt, password)
    }

    /// Verify a candidate password against this hash, in constant time.
    ///
    /// Any structural problem with the stored form verifies as `false`;
    /// login failures are indistinguishable by design.
    pub fn verify(&self, password: &str) -> bool {
        let mut parts = self.0.split('$');
        let (Some(scheme), Some(salt_b64), Some(mac_b64), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return false;
        };
        if scheme != SCHEME {
            return false;
        }
        let Ok(salt) = URL_SAFE_NO_PAD.decode(salt_b64) else {
            return false;
        };
        let Ok(expected) = URL_SAFE_NO_PAD.decode(mac_b64) else {
            return false;
        };
        let Ok(mut mac) = HmacSha256::new_from_slice(&salt) else {
            return false;
        };
        mac.update(password.as_bytes());
        mac.verify_slice(&expected).is_ok()
    }

    /// The stored wire form (for persistence by the directory backend).
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Rehydrate a hash from its stored form.
    pub fn from_stored(stored: impl Into<String>) -> Self {
        Self(stored.into())
    }

    fn derive(salt: &[u8], password: &str) -> Self {
        let mut mac = match HmacSha256::new_from_slice(salt) {
            Ok(mac) => mac,
            Err(_) => unreachable!("HMAC accepts keys of any length"),
        };
        mac.update(password.as_bytes());
        let digest = mac.finalize().into_bytes();
        Self(format!(
            "{SCHEME}${}${}",
            URL_SAFE_NO_PAD.encode(salt),
            URL_SAFE_NO_PAD.encode(digest)
        ))
    }
}
