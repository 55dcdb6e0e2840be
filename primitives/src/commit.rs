//! # Hash Commitment Engine
//!
//! Deterministic, fixed-arity hashing over exact-width byte parts. Every
//! commitment in Umbra — identity hashes, owner commitments, pending
//! commitments — is produced by [`commit`], and by nothing else.
//!
//! ## Construction
//!
//! `commit(parts)` feeds each part into a single BLAKE3 hasher in order
//! and returns the 32-byte digest. Parts must each be exactly
//! [`PART_LEN`] bytes; the engine neither pads nor truncates. A caller
//! that hands us a 31-byte part has a bug, and silently zero-padding it
//! would turn that bug into a commitment collision between distinct
//! inputs (`[0x01]` vs `[0x01, 0x00]`). We fail loudly instead.
//!
//! Domain separation is done the input way: the domain tag is itself a
//! 32-byte part, produced by [`domain_tag`] from a short ASCII context
//! string. Two protocols with distinct tags can never produce the same
//! commitment for related inputs, because the tag is the first thing the
//! hasher eats.
//!
//! ## The zero sentinel
//!
//! [`Commitment::ZERO`] (32 zero bytes) is reserved ledger-wide to mean
//! "no owner" / "no pending owner". It is never a legitimate output of
//! [`commit`] in practice (that would be a preimage of all-zeros), so the
//! reservation is enforced by rejecting the zero *input* sentinel at the
//! state-machine layer, not by inspecting hash outputs.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Width of every input part and of the digest, in bytes.
pub const PART_LEN: usize = 32;

/// Errors from the commitment engine.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommitError {
    /// An input part was not exactly [`PART_LEN`] bytes.
    #[error("commitment part {index} is {actual} bytes, expected exactly {PART_LEN}")]
    Encoding {
        /// Zero-based index of the offending part.
        index: usize,
        /// Actual length of the offending part.
        actual: usize,
    },

    /// A domain context string does not fit in a 32-byte tag.
    #[error("domain context is {0} bytes, must be at most {PART_LEN}")]
    DomainTooLong(usize),
}

/// A 32-byte commitment digest.
///
/// Opaque and equality-comparable. A `Commitment` binds whatever was
/// hashed into it without revealing any of it — the public ledger stores
/// these, and only these.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Commitment([u8; PART_LEN]);

impl Commitment {
    /// The reserved "no owner" sentinel: 32 zero bytes.
    pub const ZERO: Commitment = Commitment([0u8; PART_LEN]);

    /// Wraps raw digest bytes.
    pub const fn from_bytes(bytes: [u8; PART_LEN]) -> Self {
        Self(bytes)
    }

    /// Borrows the raw digest bytes.
    pub fn as_bytes(&self) -> &[u8; PART_LEN] {
        &self.0
    }

    /// True if this is the reserved zero sentinel.
    pub fn is_zero(&self) -> bool {
        *self == Self::ZERO
    }

    /// Hex rendering of the digest. Safe to log — commitments hide their
    /// preimages by construction.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Debug for Commitment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Commitment({})", self.to_hex())
    }
}

impl fmt::Display for Commitment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Commits to an ordered sequence of exact-width byte parts.
///
/// Deterministic: the same parts in the same order always produce the
/// same digest. Any single-byte change to any part changes the output
/// (standard collision-resistance assumption on BLAKE3 — we treat the
/// hash as a black box and do not reimplement it).
///
/// # Errors
///
/// Returns [`CommitError::Encoding`] if any part is not exactly
/// [`PART_LEN`] bytes. The engine never pads or truncates.
///
/// # Example
///
/// ```
/// use umbra_primitives::commit::{commit, domain_tag};
///
/// let tag = domain_tag("example").unwrap();
/// let c = commit(&[&tag, &[0x42u8; 32]]).unwrap();
/// assert!(!c.is_zero());
/// ```
pub fn commit(parts: &[&[u8]]) -> Result<Commitment, CommitError> {
    let mut hasher = blake3::Hasher::new();
    for (index, part) in parts.iter().enumerate() {
        if part.len() != PART_LEN {
            return Err(CommitError::Encoding {
                index,
                actual: part.len(),
            });
        }
        hasher.update(part);
    }
    Ok(Commitment(*hasher.finalize().as_bytes()))
}

/// Builds a 32-byte domain tag from a short ASCII context string.
///
/// The string's bytes are placed at the front of a zeroed 32-byte block.
/// Distinct context strings yield distinct tags, and a tag fed to
/// [`commit`] as the first part separates that protocol's commitments
/// from every other protocol's.
///
/// # Errors
///
/// Returns [`CommitError::DomainTooLong`] if the context exceeds 32 bytes.
pub fn domain_tag(context: &str) -> Result<[u8; PART_LEN], CommitError> {
    let raw = context.as_bytes();
    if raw.len() > PART_LEN {
        return Err(CommitError::DomainTooLong(raw.len()));
    }
    let mut tag = [0u8; PART_LEN];
    tag[..raw.len()].copy_from_slice(raw);
    Ok(tag)
}

/// Encodes an instance counter as a 32-byte commitment part.
///
/// Big-endian u64 in the last 8 bytes of a zeroed block. The fixed width
/// means `counter_bytes(1)` and `counter_bytes(256)` can never alias, and
/// the encoding is injective over the full u64 range.
pub fn counter_bytes(counter: u64) -> [u8; PART_LEN] {
    let mut out = [0u8; PART_LEN];
    out[PART_LEN - 8..].copy_from_slice(&counter.to_be_bytes());
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commit_is_deterministic() {
        let a = commit(&[&[1u8; 32], &[2u8; 32]]).unwrap();
        let b = commit(&[&[1u8; 32], &[2u8; 32]]).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn commit_order_matters() {
        let a = commit(&[&[1u8; 32], &[2u8; 32]]).unwrap();
        let b = commit(&[&[2u8; 32], &[1u8; 32]]).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn single_byte_change_changes_digest() {
        let mut part = [7u8; 32];
        let a = commit(&[&part]).unwrap();
        part[31] ^= 1;
        let b = commit(&[&part]).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn short_part_rejected() {
        let err = commit(&[&[0u8; 31]]).unwrap_err();
        assert_eq!(
            err,
            CommitError::Encoding {
                index: 0,
                actual: 31
            }
        );
    }

    #[test]
    fn long_part_rejected() {
        let err = commit(&[&[0u8; 32], &[0u8; 33]]).unwrap_err();
        assert_eq!(
            err,
            CommitError::Encoding {
                index: 1,
                actual: 33
            }
        );
    }

    #[test]
    fn domain_tags_separate_protocols() {
        let tag_a = domain_tag("protocol-a").unwrap();
        let tag_b = domain_tag("protocol-b").unwrap();
        let payload = [9u8; 32];
        let a = commit(&[&tag_a, &payload]).unwrap();
        let b = commit(&[&tag_b, &payload]).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn domain_tag_exact_width_allowed() {
        let ctx = "x".repeat(32);
        assert!(domain_tag(&ctx).is_ok());
    }

    #[test]
    fn domain_tag_too_long_rejected() {
        let ctx = "x".repeat(33);
        assert_eq!(domain_tag(&ctx).unwrap_err(), CommitError::DomainTooLong(33));
    }

    #[test]
    fn counter_encoding_is_injective_samples() {
        assert_ne!(counter_bytes(1), counter_bytes(256));
        assert_ne!(counter_bytes(0), counter_bytes(1));
        assert_ne!(counter_bytes(u64::MAX), counter_bytes(u64::MAX - 1));
    }

    #[test]
    fn counter_encoding_is_big_endian_tail() {
        let enc = counter_bytes(0x0102_0304_0506_0708);
        assert_eq!(&enc[..24], &[0u8; 24]);
        assert_eq!(&enc[24..], &[1, 2, 3, 4, 5, 6, 7, 8]);
    }

    #[test]
    fn zero_sentinel_roundtrip() {
        assert!(Commitment::ZERO.is_zero());
        assert!(!commit(&[&[0u8; 32]]).unwrap().is_zero());
    }

    #[test]
    fn commitment_serde_roundtrip() {
        let c = commit(&[&[5u8; 32]]).unwrap();
        let json = serde_json::to_string(&c).unwrap();
        let back: Commitment = serde_json::from_str(&json).unwrap();
        assert_eq!(c, back);
    }

    #[test]
    fn display_is_hex() {
        let c = Commitment::from_bytes([0xab; 32]);
        assert_eq!(c.to_string(), "ab".repeat(32));
    }
}
