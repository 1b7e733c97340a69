//! # Token Service — Signed, Expiring Identity Tokens
//!
//! Issues and verifies the bearer tokens that assert `{principal_id, role}`.
//! Tokens are immutable once issued and never stored server-side; validity
//! is bounded by the embedded expiry alone (no revocation list).
//!
//! ## Format
//!
//! ```text
//! base64url(claims-json) "." base64url(hmac_sha256(claims-json))
//! ```
//!
//! HMAC-SHA256 under a shared secret — issuer and verifier are the same
//! process, so symmetric signing suffices. The secret is injected from
//! configuration at construction; there is no default and no literal.
//!
//! ## Claims
//!
//! Every token embeds the role explicitly. `iat`/`exp` are Unix epoch
//! seconds.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;

use frex_core::{PrincipalId, Role, Timestamp};

use crate::error::AuthError;

type HmacSha256 = Hmac<Sha256>;

/// The verified contents of a token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// The authenticated principal.
    pub principal_id: PrincipalId,
    /// The principal's role, always explicit.
    pub role: Role,
    /// Issued-at, Unix epoch seconds.
    pub iat: i64,
    /// Expiry, Unix epoch seconds.
    pub exp: i64,
}

/// An issued token in its wire form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedToken(String);

impl SignedToken {
    /// The wire form, suitable for an `Authorization: Bearer` header.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume into the wire string.
    pub fn into_string(self) -> String {
        self.0
    }
}

impl std::fmt::Display for SignedToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Issues and verifies signed tokens under one shared secret.
#[derive(Clone)]
pub struct TokenService {
    secret: Vec<u8>,
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Never print the secret.
        f.debug_struct("TokenService").finish_non_exhaustive()
    }
}

impl TokenService {
    /// Create a token service with the signing secret from configuration.
    pub fn new(secret: impl Into<Vec<u8>>) -> Self {
        Self {
            secret: secret.into(),
        }
    }

    /// Issue a token for `principal_id` with `role`, valid for `ttl_secs`
    /// seconds from now.
    pub fn issue(
        &self,
        principal_id: PrincipalId,
        role: Role,
        ttl_secs: i64,
    ) -> Result<SignedToken, AuthError> {
        self.issue_at(principal_id, role, ttl_secs, Timestamp::now())
    }

    /// Issue a token relative to an explicit `now`. Exposed for tests that
    /// need deterministic expiry.
    pub fn issue_at(
        &self,
        principal_id: PrincipalId,
        role: Role,
        ttl_secs: i64,
        now: Timestamp,
    ) -> Result<SignedToken, AuthError> {
        let claims = Claims {
            principal_id,
            role,
            iat: now.epoch_secs(),
            exp: now.plus_secs(ttl_secs).epoch_secs(),
        };
        let payload = serde_json::to_vec(&claims).map_err(|e| AuthError::Encoding(e.to_string()))?;
        let sig = self.sign(&payload);
        Ok(SignedToken(format!(
            "{}.{}",
            URL_SAFE_NO_PAD.encode(&payload),
            URL_SAFE_NO_PAD.encode(sig)
        )))
    }

    /// Verify a token's signature and expiry and return its claims.
    ///
    /// # Errors
    ///
    /// - [`AuthError::Malformed`] — wrong structure, bad base64, bad JSON.
    /// - [`AuthError::InvalidSignature`] — MAC mismatch.
    /// - [`AuthError::Expired`] — past the embedded expiry.
    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        self.verify_at(token, Timestamp::now())
    }

    /// Verify against an explicit `now`. Exposed for tests.
    pub fn verify_at(&self, token: &str, now: Timestamp) -> Result<Claims, AuthError> {
        let (payload_b64, sig_b64) = token.split_once('.').ok_or(AuthError::Malformed)?;
        let payload = URL_SAFE_NO_PAD
            .decode(payload_b64)
            .map_err(|_| AuthError::Malformed)?;
        let sig = URL_SAFE_NO_PAD
            .decode(sig_b64)
            .map_err(|_| AuthError::Malformed)?;

        // Constant-time comparison via Mac::verify_slice.
        let mut mac = HmacSha256::new_from_slice(&self.secret)
            .map_err(|e| AuthError::Encoding(e.to_string()))?;
        mac.update(&payload);
        mac.verify_slice(&sig)
            .map_err(|_| AuthError::InvalidSignature)?;

        let claims: Claims =
            serde_json::from_slice(&payload).map_err(|_| AuthError::Malformed)?;
        if now.epoch_secs() >= claims.exp {
            return Err(AuthError::Expired);
        }
        Ok(claims)
    }

    fn sign(&self, payload: &[u8]) -> Vec<u8> {
        // HMAC accepts keys of any length; new_from_slice cannot fail here,
        // but we avoid unwrap in non-test code regardless.
        let mut mac = match HmacSha256::new_from_slice(&self.secret) {
            Ok(mac) => mac,
            Err(_) => unreachable!("HMAC accepts keys of any length"),
        };
        mac.update(payload);
        mac.finalize().into_bytes().to_vec()
    }
}

// ─── Tests ───────────────────────────────────────────────────────────
