//! # Shielded Ownership (two-step)
//!
//! The propose/accept variant: `transfer_ownership` writes only a
//! *pending* commitment, and ownership actually moves when the proposed
//! owner proves control of it via [`accept_ownership`]. This removes the
//! classic one-step footgun of transferring to a mistyped or unclaimable
//! identity hash — until accept, the current owner is still in charge.
//!
//! This is the one-step machine plus one slot and one operation,
//! expressed as composition: both machines share the commitment
//! construction in [`shielded_ownable`](crate::shielded_ownable) but own
//! their state independently, under a distinct domain tag.
//!
//! ## Counters and slots
//!
//! Every operation (propose, accept, renounce) bumps the instance
//! counter, keeping it a strict operation count. A proposal, however,
//! leaves the owner slot untouched — so the commitment stored in a slot
//! remains bound to the counter value it was built under. Each slot
//! therefore carries that counter alongside the commitment, and the
//! gates recompute against the slot's own counter. The instance counter
//! stays the freshness source for every *new* commitment, which is what
//! makes re-proposing the same identity twice yield two different
//! pending commitments.

use serde::{Deserialize, Serialize};
use tracing::debug;
use umbra_primitives::commit::Commitment;
use umbra_primitives::identity::{IdentityHash, UmbraPublicKey};
use umbra_primitives::nonce::SecretNonce;

use crate::lifecycle::Initializable;
use crate::shielded_ownable::{
    build_owner_commitment, candidate_commitment, OwnershipError, ShieldedOwnershipState,
};

/// Domain tag for the two-step protocol — distinct from the one-step tag
/// so the two variants can never produce colliding commitments for
/// related inputs.
pub const TWO_STEP_DOMAIN: &str = "UmbraShieldedOwner2StepV1";

/// A stored commitment together with the counter value folded into it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
struct Slot {
    commitment: Commitment,
    counter: u64,
}

impl Slot {
    const EMPTY: Slot = Slot {
        commitment: Commitment::ZERO,
        counter: 0,
    };

    fn is_empty(&self) -> bool {
        self.commitment.is_zero()
    }
}

/// Two-step shielded ownership with a pending-owner slot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShieldedOwnableTwoStep {
    init: Initializable,
    owner: Slot,
    pending: Slot,
    instance_counter: u64,
}

impl ShieldedOwnableTwoStep {
    /// Creates an uninitialized machine.
    pub fn new() -> Self {
        Self {
            init: Initializable::new(),
            owner: Slot::EMPTY,
            pending: Slot::EMPTY,
            instance_counter: 0,
        }
    }

    /// Establishes the initial owner. Constructor-time only; same
    /// contract as the one-step machine.
    pub fn initialize(&mut self, owner: IdentityHash) -> Result<(), OwnershipError> {
        self.init.assert_not_initialized()?;
        if owner.is_zero() {
            return Err(OwnershipError::InvalidOwner);
        }

        let commitment = build_owner_commitment(TWO_STEP_DOMAIN, &owner, 1)?;
        self.init.initialize()?;
        self.instance_counter = 1;
        self.owner = Slot {
            commitment,
            counter: 1,
        };

        debug!(owner = %self.owner.commitment, "two-step shielded ownership initialized");
        Ok(())
    }

    /// The current owner commitment. Pure read.
    pub fn owner(&self) -> Commitment {
        self.owner.commitment
    }

    /// The pending owner commitment, or the zero sentinel when no
    /// proposal is outstanding. Pure read.
    pub fn pending_owner(&self) -> Commitment {
        self.pending.commitment
    }

    /// The current instance counter. Pure read.
    pub fn instance_counter(&self) -> u64 {
        self.instance_counter
    }

    /// The sole authorization gate, checked against the *current* owner
    /// slot. Recomputes under the counter the owner commitment was built
    /// with, so an outstanding proposal does not lock the owner out.
    pub fn assert_only_owner(
        &self,
        caller: &UmbraPublicKey,
        witness: &SecretNonce,
    ) -> Result<(), OwnershipError> {
        self.init.assert_initialized()?;
        if self.owner.is_empty() {
            return Err(OwnershipError::Forbidden);
        }
        let candidate = candidate_commitment(TWO_STEP_DOMAIN, caller, witness, self.owner.counter)?;
        if candidate != self.owner.commitment {
            return Err(OwnershipError::Forbidden);
        }
        Ok(())
    }

    /// Proposes a new owner. Writes only the pending slot; the current
    /// owner commitment is unchanged and the current owner stays in
    /// control until the proposal is accepted.
    ///
    /// Proposing while a proposal is already pending overwrites it —
    /// last writer wins, there is no proposal queue.
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
        let commitment = build_owner_commitment(TWO_STEP_DOMAIN, &new_owner, next_counter)?;
        self.instance_counter = next_counter;
        self.pending = Slot {
            commitment,
            counter: next_counter,
        };

        debug!(
            counter = self.instance_counter,
            pending = %self.pending.commitment,
            "ownership transfer proposed"
        );
        Ok(())
    }

    /// Accepts an outstanding proposal.
    ///
    /// The caller must prove control of the *pending* commitment. On
    /// success the pending slot is copied into the owner slot verbatim,
    /// the counter is bumped, and the pending slot is cleared to the
    /// zero sentinel.
    ///
    /// # Errors
    ///
    /// [`OwnershipError::Forbidden`] when no proposal is outstanding or
    /// the caller cannot prove control of it.
    pub fn accept_ownership(
        &mut self,
        caller: &UmbraPublicKey,
        witness: &SecretNonce,
    ) -> Result<(), OwnershipError> {
        self.init.assert_initialized()?;
        if self.pending.is_empty() {
            return Err(OwnershipError::Forbidden);
        }

        let candidate =
            candidate_commitment(TWO_STEP_DOMAIN, caller, witness, self.pending.counter)?;
        if candidate != self.pending.commitment {
            return Err(OwnershipError::Forbidden);
        }

        self.instance_counter += 1;
        self.owner = self.pending;
        self.pending = Slot::EMPTY;

        debug!(
            counter = self.instance_counter,
            owner = %self.owner.commitment,
            "ownership transfer accepted"
        );
        Ok(())
    }

    /// Renounces ownership, irrevocably, and cancels any outstanding
    /// proposal. Both slots become the zero sentinel.
    pub fn renounce_ownership(
        &mut self,
        caller: &UmbraPublicKey,
        witness: &SecretNonce,
    ) -> Result<(), OwnershipError> {
        self.assert_only_owner(caller, witness)?;
        self.instance_counter += 1;
        self.owner = Slot::EMPTY;
        self.pending = Slot::EMPTY;

        debug!(counter = self.instance_counter, "two-step ownership renounced");
        Ok(())
    }

    /// Snapshot of the public ledger layout.
    pub fn public_state(&self) -> ShieldedOwnershipState {
        ShieldedOwnershipState {
            owner_commitment: self.owner.commitment,
            pending_owner_commitment: Some(self.pending.commitment),
            instance_counter: self.instance_counter,
        }
    }
}

impl Default for ShieldedOwnableTwoStep {
    fn default() -> Self {
        Self::new()
    }
}
