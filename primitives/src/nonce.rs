//! # Private Nonce Store
//!
//! The secret half of a shielded identity: 32 random bytes, generated
//! once, held by the identity's own process, and revealed only locally
//! while computing a commitment. The nonce is what makes the on-ledger
//! owner commitment unforgeable — anyone can see a public key, but only
//! the holder can recompute `H(publicKey, nonce)`.
//!
//! ## Containment rules
//!
//! - `SecretNonce` does NOT implement `Serialize`. A nonce that ends up
//!   in a JSON response or a persisted ledger write is a broken scheme,
//!   so the type system forbids it outright.
//! - `Debug` prints a redacted placeholder. If you add logging that
//!   formats nonce bytes, you will be asked to leave.
//! - [`SecretNonce::reveal`] is the only way at the bytes, and its
//!   callers are the commitment computations inside a ledger operation —
//!   never the operation's public arguments or return value.
//! - [`SecretNonce::inject`] exists for negative-path tests only and is
//!   compiled out of production builds.

use rand::rngs::OsRng;
use rand::RngCore;
use std::fmt;
use thiserror::Error;

/// Length of a secret nonce in bytes.
pub const NONCE_LEN: usize = 32;

/// Errors from nonce generation.
#[derive(Debug, Error)]
pub enum NonceError {
    /// The OS cryptographic random source failed.
    #[error("system entropy source unavailable")]
    Entropy,
}

/// A 32-byte secret witness bound to one identity.
///
/// Lives for the process lifetime of its holder. Cloneable so a holder
/// can thread it through their own call stack, but it never crosses a
/// public operation boundary: ledger operations accept `&SecretNonce` as
/// a locally-resolved capability, and nothing about it is written to
/// public state.
#[derive(Clone)]
pub struct SecretNonce {
    bytes: [u8; NONCE_LEN],
}

impl SecretNonce {
    /// Generates a fresh nonce from the OS cryptographic RNG.
    ///
    /// # Errors
    ///
    /// Returns [`NonceError::Entropy`] if the OS random source fails —
    /// rare, but a weak nonce is a stolen identity, so we refuse to
    /// fall back to anything less.
    pub fn generate() -> Result<Self, NonceError> {
        let mut bytes = [0u8; NONCE_LEN];
        OsRng
            .try_fill_bytes(&mut bytes)
            .map_err(|_| NonceError::Entropy)?;
        Ok(Self { bytes })
    }

    /// Reveals the nonce bytes for local use.
    ///
    /// This is a *witness* operation: the returned reference is meant to
    /// be fed into a commitment computation inside the current call and
    /// dropped. Do not copy it into anything serializable.
    pub fn reveal(&self) -> &[u8; NONCE_LEN] {
        &self.bytes
    }

    /// Replaces the nonce with caller-chosen bytes. Test-only: used to
    /// pin a known witness for negative-path tests (wrong nonce, stale
    /// nonce). Unreachable from production call paths.
    #[cfg(any(test, feature = "test-witness"))]
    pub fn inject(bytes: [u8; NONCE_LEN]) -> Self {
        Self { bytes }
    }
}

impl fmt::Debug for SecretNonce {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretNonce(REDACTED)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generate_produces_nonzero_nonce() {
        // All-zero output from a CSPRNG is a 2^-256 event; treat it as
        // a broken RNG.
        let nonce = SecretNonce::generate().unwrap();
        assert_ne!(nonce.reveal(), &[0u8; NONCE_LEN]);
    }

    #[test]
    fn generate_produces_distinct_nonces() {
        let a = SecretNonce::generate().unwrap();
        let b = SecretNonce::generate().unwrap();
        assert_ne!(a.reveal(), b.reveal());
    }

    #[test]
    fn inject_overrides_bytes() {
        let nonce = SecretNonce::inject([7u8; NONCE_LEN]);
        assert_eq!(nonce.reveal(), &[7u8; NONCE_LEN]);
    }

    #[test]
    fn debug_is_redacted() {
        let nonce = SecretNonce::inject([0xaa; NONCE_LEN]);
        let rendered = format!("{nonce:?}");
        assert_eq!(rendered, "SecretNonce(REDACTED)");
        assert!(!rendered.contains("aa"));
    }

    #[test]
    fn clone_preserves_witness() {
        let a = SecretNonce::inject([3u8; NONCE_LEN]);
        let b = a.clone();
        assert_eq!(a.reveal(), b.reveal());
    }
}
