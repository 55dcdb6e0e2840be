//! # Shielded Ownership (one-step)
//!
//! Commitment-based access control: the module can prove "the caller
//! controls the current owner" without the owner's identity ever touching
//! the public ledger. What the ledger stores is a rotating commitment:
//!
//! ```text
//! identityHash    = commit([publicKey, secretNonce])
//! ownerCommitment = commit([domainTag, commit([counter, identityHash])])
//! ```
//!
//! Recomputing the owner commitment requires the secret nonce, so the
//! public key alone forges nothing. Folding the instance counter into the
//! hash means every ownership-establishing transition — even a transfer
//! back to the identical `(key, nonce)` pair — produces a fresh,
//! unlinkable commitment. That rotation is deliberate anti-linkability,
//! not a bug; do not special-case self-transfer into a no-op.
//!
//! ## Authorization model
//!
//! [`ShieldedOwnable::assert_only_owner`] is the *sole* authorization
//! check. Every privileged operation, here and in modules composed on
//! top, calls it before mutating anything. The secret nonce enters these
//! operations as a call-time capability (`&SecretNonce`) resolved from
//! the caller's local process — it is never part of public arguments,
//! return values, logs, or serialized state.
//!
//! ## Atomicity
//!
//! Each operation is one atomic transition: validate everything, then
//! write, or fail with state untouched. There is no internal concurrency;
//! ordering comes from whatever serializes operations against the module.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;
use umbra_primitives::commit::{commit, counter_bytes, domain_tag, CommitError, Commitment};
use umbra_primitives::identity::{identity_hash, IdentityHash, UmbraPublicKey};
use umbra_primitives::nonce::SecretNonce;

use crate::lifecycle::{Initializable, LifecycleError};

/// Domain tag for the one-step shielded ownership protocol. Distinct per
/// variant so related inputs can never collide across protocols.
pub const ONE_STEP_DOMAIN: &str = "UmbraShieldedOwnerV1";

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors from shielded ownership operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum OwnershipError {
    /// A zero identity hash was supplied where an owner is required. The
    /// zero value is reserved to mean "no owner".
    #[error("invalid owner: the zero identity hash is reserved for \"no owner\"")]
    InvalidOwner,

    /// The caller's recomputed commitment does not match the required
    /// slot. Intentionally silent about *which* part mismatched.
    #[error("forbidden: caller cannot prove control of the required commitment")]
    Forbidden,

    /// A lifecycle guard rejected the operation.
    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),

    /// The commitment engine rejected an input.
    #[error(transparent)]
    Commit(#[from] CommitError),
}

// ---------------------------------------------------------------------------
// Commitment construction
// ---------------------------------------------------------------------------

/// Builds the on-ledger commitment for `identity` under `counter`:
/// `commit([domainTag, commit([counter, identityHash])])`.
///
/// Shared by both ownership variants (composition, not inheritance); each
/// passes its own domain string.
pub(crate) fn build_owner_commitment(
    domain: &str,
    identity: &IdentityHash,
    counter: u64,
) -> Result<Commitment, CommitError> {
    let tag = domain_tag(domain)?;
    let inner = commit(&[&counter_bytes(counter), identity.as_bytes()])?;
    commit(&[&tag, inner.as_bytes()])
}

/// Recomputes the caller's candidate commitment from their public key and
/// locally-held witness.
pub(crate) fn candidate_commitment(
    domain: &str,
    caller: &UmbraPublicKey,
    witness: &SecretNonce,
    counter: u64,
) -> Result<Commitment, CommitError> {
    let id = identity_hash(caller, witness)?;
    build_owner_commitment(domain, &id, counter)
}

// ---------------------------------------------------------------------------
// Public state layout
// ---------------------------------------------------------------------------

/// The public ledger layout exposed to external collaborators.
///
/// This is everything an observer ever sees of an ownership module:
/// opaque commitments and a counter. `pending_owner_commitment` is `None`
/// for the one-step machine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShieldedOwnershipState {
    /// Commitment to the current owner, or the zero sentinel.
    pub owner_commitment: Commitment,
    /// Commitment to a proposed owner (two-step machines only).
    pub pending_owner_commitment: Option<Commitment>,
    /// Strictly monotonic count of ownership-establishing operations.
    pub instance_counter: u64,
}

// ---------------------------------------------------------------------------
// State machine
// ---------------------------------------------------------------------------

/// One-step shielded ownership: `Uninitialized → Owned → ... → Renounced`.
///
/// Renounced is terminal — the owner commitment becomes the zero sentinel
/// and no key/witness pair can ever satisfy the gate again.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShieldedOwnable {
    init: Initializable,
    owner_commitment: Commitment,
    instance_counter: u64,
}

impl ShieldedOwnable {
    /// Creates an uninitialized machine. Every operation except
    /// [`initialize`](Self::initialize) fails until initialization.
    pub fn new() -> Self {
        Self {
            init: Initializable::new(),
            owner_commitment: Commitment::ZERO,
            instance_counter: 0,
        }
    }

    /// Establishes the initial owner. Constructor-time only.
    ///
    /// Sets the instance counter to 1 and stores the owner commitment
    /// built from `owner` under that counter.
    ///
    /// # Errors
    ///
    /// - [`OwnershipError::Lifecycle`] (`AlreadyInitialized`) on re-init.
    /// - [`OwnershipError::InvalidOwner`] for the zero identity hash.
    pub fn initialize(&mut self, owner: IdentityHash) -> Result<(), OwnershipError> {
        self.init.assert_not_initialized()?;
        if owner.is_zero() {
            return Err(OwnershipError::InvalidOwner);
        }

        let commitment = build_owner_commitment(ONE_STEP_DOMAIN, &owner, 1)?;
        self.init.initialize()?;
        self.instance_counter = 1;
        self.owner_commitment = commitment;

        debug!(owner = %self.owner_commitment, "shielded ownership initialized");
        Ok(())
    }

    /// The current owner commitment. Pure read, no authorization.
    pub fn owner(&self) -> Commitment {
        self.owner_commitment
    }

    /// The current instance counter. Pure read.
    pub fn instance_counter(&self) -> u64 {
        self.instance_counter
    }

    /// The sole authorization gate.
    ///
    /// Recomputes the caller's identity hash from `(caller, witness)`,
    /// rebuilds the commitment under the current counter, and compares it
    /// to the stored owner commitment. No state change on success or
    /// failure.
    ///
    /// # Errors
    ///
    /// - [`OwnershipError::Lifecycle`] (`NotInitialized`) before init.
    /// - [`OwnershipError::Forbidden`] on any mismatch — including for
    ///   everyone, forever, after renounce.
    pub fn assert_only_owner(
        &self,
        caller: &UmbraPublicKey,
        witness: &SecretNonce,
    ) -> Result<(), OwnershipError> {
        self.init.assert_initialized()?;
        let candidate =
            candidate_commitment(ONE_STEP_DOMAIN, caller, witness, self.instance_counter)?;
        if candidate != self.owner_commitment {
            return Err(OwnershipError::Forbidden);
        }
        Ok(())
    }

    /// Transfers ownership to `new_owner` (an identity hash prepared by
    /// the incoming owner; their nonce never reaches us).
    ///
    /// Bumps the counter, then rebuilds the owner commitment under the
    /// new counter. Transferring to the *same* identity still rotates the
    /// stored commitment — intentional, see the module docs.
    ///
    /// # Errors
    ///
    /// - [`OwnershipError::Forbidden`] unless `(caller, witness)` proves
    ///   the current owner.
    /// - [`OwnershipError::InvalidOwner`] for the zero identity hash.
    pub fn transfer_ownership(
        &mut self,
        caller: &UmbraPublicKey,
        witness: &SecretNonce,
        new_owner: IdentityHash,
    ) -> Result<(), OwnershipError> {
        self.assert_only_owner(caller, witness)?;
        if new_owner.is_zero() {
            return Err(OwnershipError::InvalidOwner);
        }

        let next_counter = self.instance_counter + 1;
        let commitment = build_owner_commitment(ONE_STEP_DOMAIN, &new_owner, next_counter)?;
        self.instance_counter = next_counter;
        self.owner_commitment = commitment;

        debug!(
            counter = self.instance_counter,
            owner = %self.owner_commitment,
            "ownership transferred"
        );
        Ok(())
    }

    /// Renounces ownership, irrevocably.
    ///
    /// The owner commitment becomes the zero sentinel directly (not
    /// hash-derived) and the counter is bumped. Every later
    /// [`assert_only_owner`](Self::assert_only_owner) fails, including
    /// for the former owner.
    pub fn renounce_ownership(
        &mut self,
        caller: &UmbraPublicKey,
        witness: &SecretNonce,
    ) -> Result<(), OwnershipError> {
        self.assert_only_owner(caller, witness)?;
        self.instance_counter += 1;
        self.owner_commitment = Commitment::ZERO;

        debug!(counter = self.instance_counter, "ownership renounced");
        Ok(())
    }

    /// Snapshot of the public ledger layout.
    pub fn public_state(&self) -> ShieldedOwnershipState {
        ShieldedOwnershipState {
            owner_commitment: self.owner_commitment,
            pending_owner_commitment: None,
            instance_counter: self.instance_counter,
        }
    }
}

impl Default for ShieldedOwnable {
    fn default() -> Self {
        Self::new()
    }
}
