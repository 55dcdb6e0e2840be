//! # Umbra Primitives
//!
//! The cryptographic floor of the Umbra contract library: everything the
//! ledger-facing state machines in `umbra-contracts` need, and nothing
//! they should have to think about.
//!
//! ## Modules
//!
//! - **commit** — The hash commitment engine. Fixed-arity BLAKE3 over
//!   exact-width byte parts, with domain tags and counter encoding. This
//!   is the function every shielded-ownership guarantee reduces to.
//! - **nonce** — The private witness. A 32-byte secret that lives in the
//!   holder's process and nowhere else — not in logs, not in serialized
//!   state, not in error messages.
//! - **identity** — Ed25519 identity keys and the identity-hash binding
//!   of a public key to its witness.
//!
//! ## Design Philosophy
//!
//! 1. Secrets never implement `Serialize`. Making leakage a compile error
//!    beats making it a code-review item.
//! 2. Every fallible path returns a typed error. No panics on input.
//! 3. Commitments are opaque 32-byte values — compare them, store them,
//!    render them as hex, and do nothing else with them.

pub mod commit;
pub mod identity;
pub mod nonce;

pub use commit::{commit, counter_bytes, domain_tag, CommitError, Commitment};
pub use identity::{identity_hash, IdentityHash, KeyError, UmbraKeypair, UmbraPublicKey};
pub use nonce::{NonceError, SecretNonce};
