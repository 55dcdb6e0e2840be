//! # Identity Keys and the Identity Hash
//!
//! Every shielded identity is an already-held Ed25519 keypair plus a
//! [`SecretNonce`](crate::nonce::SecretNonce). This module covers the key
//! half and the binding between the two:
//!
//! ```text
//! IdentityHash = commit([publicKey, secretNonce])
//! ```
//!
//! The identity hash is a privacy-preserving stand-in for the key: it can
//! be handed to a ledger operation (e.g. as a transfer target) without
//! disclosing the key, and recomputing it requires the nonce. Collision
//! resistance of the hash means two different `(key, nonce)` pairs share
//! an identity hash only with negligible probability.
//!
//! Signing and verification are deliberately absent. Umbra binds keys to
//! commitments and proves control of them via the witness; what else the
//! keypair signs is the embedding application's business, not ours.

use ed25519_dalek::{SigningKey, VerifyingKey};
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::commit::{commit, CommitError, PART_LEN};
use crate::nonce::SecretNonce;

/// Errors from key construction.
#[derive(Debug, Error)]
pub enum KeyError {
    /// Input was not valid hex or not 32 bytes of it.
    #[error("invalid public key encoding: expected 64 hex characters")]
    InvalidEncoding,
}

/// An Ed25519 identity keypair.
///
/// No `Serialize`/`Deserialize`: exporting private key material should be
/// a deliberate act, not a side effect of shoving a keypair into a struct
/// that derives serde. There is intentionally no accessor for the signing
/// key at all — within Umbra, only the public half and the nonce ever
/// participate in a commitment.
pub struct UmbraKeypair {
    signing_key: SigningKey,
}

impl UmbraKeypair {
    /// Generates a fresh keypair from the OS cryptographic RNG.
    pub fn generate() -> Self {
        Self {
            signing_key: SigningKey::generate(&mut OsRng),
        }
    }

    /// Constructs a keypair deterministically from a 32-byte seed.
    ///
    /// Useful for test vectors and KDF-derived identities. A weak seed
    /// makes a weak key; use a proper CSPRNG or KDF to produce it.
    pub fn from_seed(seed: &[u8; 32]) -> Self {
        Self {
            signing_key: SigningKey::from_bytes(seed),
        }
    }

    /// Returns the public half of this identity.
    pub fn public_key(&self) -> UmbraPublicKey {
        UmbraPublicKey {
            bytes: self.signing_key.verifying_key().to_bytes(),
        }
    }
}

impl fmt::Debug for UmbraKeypair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "UmbraKeypair({})", self.public_key())
    }
}

/// The public half of an identity — 32 bytes, safe to share and to feed
/// into commitments as an exact-width part.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UmbraPublicKey {
    bytes: [u8; 32],
}

impl UmbraPublicKey {
    /// Borrows the raw key bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.bytes
    }

    /// Parses a key from 64 hex characters.
    pub fn from_hex(hex_str: &str) -> Result<Self, KeyError> {
        let raw = hex::decode(hex_str).map_err(|_| KeyError::InvalidEncoding)?;
        let bytes: [u8; 32] = raw.try_into().map_err(|_| KeyError::InvalidEncoding)?;
        // Accept any 32 bytes here: the key only ever enters a hash, so
        // curve validity is checked where signatures are, elsewhere.
        Ok(Self { bytes })
    }

    /// Hex rendering of the key.
    pub fn to_hex(&self) -> String {
        hex::encode(self.bytes)
    }
}

impl From<VerifyingKey> for UmbraPublicKey {
    fn from(vk: VerifyingKey) -> Self {
        Self {
            bytes: vk.to_bytes(),
        }
    }
}

impl fmt::Debug for UmbraPublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "UmbraPublicKey({})", self.to_hex())
    }
}

impl fmt::Display for UmbraPublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// A 32-byte identity hash: `commit([publicKey, nonce])`.
///
/// The zero value is reserved ledger-wide to mean "no identity" and is
/// rejected as an input by every ownership operation.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IdentityHash([u8; PART_LEN]);

impl IdentityHash {
    /// The reserved "no identity" sentinel.
    pub const ZERO: IdentityHash = IdentityHash([0u8; PART_LEN]);

    /// Wraps raw hash bytes.
    pub const fn from_bytes(bytes: [u8; PART_LEN]) -> Self {
        Self(bytes)
    }

    /// Borrows the raw hash bytes.
    pub fn as_bytes(&self) -> &[u8; PART_LEN] {
        &self.0
    }

    /// True if this is the reserved zero sentinel.
    pub fn is_zero(&self) -> bool {
        *self == Self::ZERO
    }
}

impl fmt::Debug for IdentityHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "IdentityHash({})", hex::encode(self.0))
    }
}

impl fmt::Display for IdentityHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

/// Binds a public key to its secret nonce.
///
/// This is a witness operation: the nonce is revealed locally, hashed,
/// and dropped. The resulting hash is public-safe — it discloses neither
/// input.
///
/// # Errors
///
/// Propagates [`CommitError`] from the engine. Both inputs are 32 bytes
/// by type, so in practice this is infallible; the signature keeps the
/// engine's contract visible.
pub fn identity_hash(
    key: &UmbraPublicKey,
    nonce: &SecretNonce,
) -> Result<IdentityHash, CommitError> {
    let digest = commit(&[key.as_bytes(), nonce.reveal()])?;
    Ok(IdentityHash(*digest.as_bytes()))
}
