//! # Fungible Token Ledger
//!
//! A single-token fungible ledger showing how the ownership and lifecycle
//! primitives compose: minting is gated by the shielded owner, transfers
//! by the pause breaker, and construction by the one-shot init guard.
//!
//! ## Security Model
//!
//! - **Mint gating**: every `mint()` passes through
//!   `ShieldedOwnable::assert_only_owner` before touching supply. The
//!   minter's identity never appears on the ledger — only the rotating
//!   owner commitment does.
//! - **Circuit breaker**: `pause()`/`unpause()` are owner-gated; all
//!   balance-moving user operations are `when_not_paused`.
//! - **Checked arithmetic**: `checked_add` on every supply and balance
//!   increase. Wrapping arithmetic and money do not mix.
//!
//! Holder-facing operations are keyed by hex address strings; how those
//! addresses are authenticated (signatures, session keys) is the
//! embedding ledger's concern, same as in the rest of this family.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;
use tracing::debug;
use umbra_primitives::identity::{IdentityHash, UmbraPublicKey};
use umbra_primitives::nonce::SecretNonce;

use crate::lifecycle::{Initializable, LifecycleError, Pausable};
use crate::shielded_ownable::{OwnershipError, ShieldedOwnable};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors from fungible token operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenError {
    /// The account does not hold enough tokens.
    #[error("insufficient balance: account has {balance}, needed {amount}")]
    InsufficientBalance {
        /// Current balance of the account.
        balance: u64,
        /// Amount the operation required.
        amount: u64,
    },

    /// The spender's allowance does not cover the transfer.
    #[error("insufficient allowance: approved {allowance}, needed {amount}")]
    InsufficientAllowance {
        /// Currently approved amount.
        allowance: u64,
        /// Amount the transfer required.
        amount: u64,
    },

    /// A supply or balance increase would overflow u64.
    #[error("supply overflow: adding {amount} would exceed u64::MAX")]
    SupplyOverflow {
        /// The amount that was attempted.
        amount: u64,
    },

    /// Zero-amount mints and transfers are rejected as no-ops.
    #[error("amount must be non-zero")]
    ZeroAmount,

    /// The ownership gate rejected the caller.
    #[error(transparent)]
    Ownership(#[from] OwnershipError),

    /// A lifecycle guard rejected the operation.
    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),
}

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Immutable token metadata, fixed at initialization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenMetadata {
    /// Human-readable token name (e.g. "Umbra Credit").
    pub name: String,
    /// Ticker symbol (e.g. "UMC").
    pub symbol: String,
    /// Number of decimal places in the smallest denomination.
    pub decimals: u8,
    /// Timestamp of initialization.
    pub created_at: DateTime<Utc>,
}

/// A fungible token ledger with shielded-owner-gated minting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FungibleToken {
    init: Initializable,
    pause: Pausable,
    ownable: ShieldedOwnable,
    metadata: Option<TokenMetadata>,
    total_supply: u64,
    /// Hex address -> balance in the smallest denomination.
    balances: HashMap<String, u64>,
    /// Holder address -> (spender address -> approved amount).
    allowances: HashMap<String, HashMap<String, u64>>,
}

impl FungibleToken {
    /// Creates an uninitialized ledger.
    pub fn new() -> Self {
        Self {
            init: Initializable::new(),
            pause: Pausable::new(),
            ownable: ShieldedOwnable::new(),
            metadata: None,
            total_supply: 0,
            balances: HashMap::new(),
            allowances: HashMap::new(),
        }
    }

    /// One-shot constructor: records metadata and establishes the
    /// shielded owner who may mint and pause.
    ///
    /// # Errors
    ///
    /// - [`TokenError::Lifecycle`] (`AlreadyInitialized`) on re-init.
    /// - [`TokenError::Ownership`] (`InvalidOwner`) for a zero owner hash.
    pub fn initialize(
        &mut self,
        name: String,
        symbol: String,
        decimals: u8,
        owner: IdentityHash,
    ) -> Result<(), TokenError> {
        self.init.assert_not_initialized()?;
        self.ownable.initialize(owner)?;
        self.init.initialize()?;
        self.metadata = Some(TokenMetadata {
            name,
            symbol,
            decimals,
            created_at: Utc::now(),
        });
        Ok(())
    }

    // -- Privileged operations ----------------------------------------------

    /// Mints `amount` tokens to `to`. Shielded-owner gated.
    pub fn mint(
        &mut self,
        caller: &UmbraPublicKey,
        witness: &SecretNonce,
        to: &str,
        amount: u64,
    ) -> Result<(), TokenError> {
        self.init.assert_initialized()?;
        self.ownable.assert_only_owner(caller, witness)?;
        if amount == 0 {
            return Err(TokenError::ZeroAmount);
        }

        let new_supply = self
            .total_supply
            .checked_add(amount)
            .ok_or(TokenError::SupplyOverflow { amount })?;
        let balance = self.balances.get(to).copied().unwrap_or(0);
        let new_balance = balance
            .checked_add(amount)
            .ok_or(TokenError::SupplyOverflow { amount })?;

        self.total_supply = new_supply;
        self.balances.insert(to.to_string(), new_balance);

        debug!(to, amount, supply = self.total_supply, "tokens minted");
        Ok(())
    }

    /// Trips the circuit breaker. Shielded-owner gated.
    pub fn pause(
        &mut self,
        caller: &UmbraPublicKey,
        witness: &SecretNonce,
    ) -> Result<(), TokenError> {
        self.ownable.assert_only_owner(caller, witness)?;
        self.pause.pause()?;
        debug!("token transfers paused");
        Ok(())
    }

    /// Resets the circuit breaker. Shielded-owner gated.
    pub fn unpause(
        &mut self,
        caller: &UmbraPublicKey,
        witness: &SecretNonce,
    ) -> Result<(), TokenError> {
        self.ownable.assert_only_owner(caller, witness)?;
        self.pause.unpause()?;
        debug!("token transfers resumed");
        Ok(())
    }

    // -- Holder operations --------------------------------------------------

    /// Moves `amount` from `from` to `to`. Pause-gated.
    pub fn transfer(&mut self, from: &str, to: &str, amount: u64) -> Result<(), TokenError> {
        self.init.assert_initialized()?;
        self.pause.when_not_paused()?;
        self.debit_credit(from, to, amount)
    }

    /// Approves `spender` to move up to `amount` of `holder`'s tokens.
    /// Overwrites any previous approval for that spender.
    pub fn approve(&mut self, holder: &str, spender: &str, amount: u64) -> Result<(), TokenError> {
        self.init.assert_initialized()?;
        self.pause.when_not_paused()?;
        self.allowances
            .entry(holder.to_string())
            .or_default()
            .insert(spender.to_string(), amount);
        Ok(())
    }

    /// Moves `amount` from `from` to `to` on behalf of `spender`,
    /// consuming allowance. Pause-gated.
    pub fn transfer_from(
        &mut self,
        spender: &str,
        from: &str,
        to: &str,
        amount: u64,
    ) -> Result<(), TokenError> {
        self.init.assert_initialized()?;
        self.pause.when_not_paused()?;

        let allowance = self.allowance(from, spender);
        if allowance < amount {
            return Err(TokenError::InsufficientAllowance { allowance, amount });
        }

        self.debit_credit(from, to, amount)?;
        // Deduct only after the transfer succeeded — a failed transfer
        // must not burn allowance.
        self.allowances
            .entry(from.to_string())
            .or_default()
            .insert(spender.to_string(), allowance - amount);
        Ok(())
    }

    /// Burns `amount` from `from`'s balance. Holder-initiated and
    /// pause-gated like every other balance-moving operation; there is
    /// no admin burn.
    pub fn burn(&mut self, from: &str, amount: u64) -> Result<(), TokenError> {
        self.init.assert_initialized()?;
        self.pause.when_not_paused()?;
        if amount == 0 {
            return Err(TokenError::ZeroAmount);
        }

        let balance = self.balances.get(from).copied().unwrap_or(0);
        if balance < amount {
            return Err(TokenError::InsufficientBalance { balance, amount });
        }
        self.balances.insert(from.to_string(), balance - amount);
        self.total_supply -= amount;

        debug!(from, amount, supply = self.total_supply, "tokens burned");
        Ok(())
    }

    // -- Reads --------------------------------------------------------------

    /// Balance of `address`, or 0.
    pub fn balance_of(&self, address: &str) -> u64 {
        self.balances.get(address).copied().unwrap_or(0)
    }

    /// Remaining approval from `holder` to `spender`, or 0.
    pub fn allowance(&self, holder: &str, spender: &str) -> u64 {
        self.allowances
            .get(holder)
            .and_then(|a| a.get(spender))
            .copied()
            .unwrap_or(0)
    }

    /// Current total supply.
    pub fn total_supply(&self) -> u64 {
        self.total_supply
    }

    /// Token metadata, or `None` before initialization.
    pub fn metadata(&self) -> Option<&TokenMetadata> {
        self.metadata.as_ref()
    }

    /// True while the circuit breaker is tripped.
    pub fn is_paused(&self) -> bool {
        self.pause.is_paused()
    }

    /// The embedded ownership machine, for public-state observation and
    /// ownership transfers of the token itself.
    pub fn ownership(&self) -> &ShieldedOwnable {
        &self.ownable
    }

    /// Mutable access to the embedded ownership machine, so the token
    /// owner can transfer or renounce control of the token.
    pub fn ownership_mut(&mut self) -> &mut ShieldedOwnable {
        &mut self.ownable
    }

    fn debit_credit(&mut self, from: &str, to: &str, amount: u64) -> Result<(), TokenError> {
        if amount == 0 {
            return Err(TokenError::ZeroAmount);
        }

        let from_balance = self.balances.get(from).copied().unwrap_or(0);
        if from_balance < amount {
            return Err(TokenError::InsufficientBalance {
                balance: from_balance,
                amount,
            });
        }
        // Self-transfer: the balance check above still applies, but the
        // ledger must not move — reading the recipient side before the
        // debit lands would double-count the amount.
        if from == to {
            return Ok(());
        }
        let to_balance = self.balances.get(to).copied().unwrap_or(0);
        let new_to = to_balance
            .checked_add(amount)
            .ok_or(TokenError::SupplyOverflow { amount })?;

        // Both sides validated; write both or neither.
        self.balances.insert(from.to_string(), from_balance - amount);
        self.balances.insert(to.to_string(), new_to);
        Ok(())
    }
}

impl Default for FungibleToken {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use umbra_primitives::identity::{identity_hash, UmbraKeypair};

    fn owner_identity() -> (UmbraPublicKey, SecretNonce, IdentityHash) {
        let pk = UmbraKeypair::from_seed(&[1u8; 32]).public_key();
        let nonce = SecretNonce::inject([2u8; 32]);
        let id = identity_hash(&pk, &nonce).unwrap();
        (pk, nonce, id)
    }

    fn token() -> (FungibleToken, UmbraPublicKey, SecretNonce) {
        let (pk, nonce, id) = owner_identity();
        let mut token = FungibleToken::new();
        token
            .initialize("Umbra Credit".into(), "UMC".into(), 8, id)
            .unwrap();
        (token, pk, nonce)
    }

    #[test]
    fn initialize_records_metadata_and_owner() {
        let (token, _, _) = token();
        let meta = token.metadata().unwrap();
        assert_eq!(meta.symbol, "UMC");
        assert_eq!(meta.decimals, 8);
        assert_eq!(token.ownership().instance_counter(), 1);
    }

    #[test]
    fn initialize_is_one_shot() {
        let (mut token, _, _) = token();
        let (_, _, id) = owner_identity();
        assert_eq!(
            token.initialize("X".into(), "X".into(), 0, id).unwrap_err(),
            TokenError::Lifecycle(LifecycleError::AlreadyInitialized)
        );
    }

    #[test]
    fn mint_is_owner_gated() {
        let (mut token, pk, nonce) = token();
        token.mint(&pk, &nonce, "alice", 1_000_000).unwrap();
        assert_eq!(token.total_supply(), 1_000_000);
        assert_eq!(token.balance_of("alice"), 1_000_000);

        // A stranger with their own witness cannot mint.
        let stranger = UmbraKeypair::from_seed(&[9u8; 32]).public_key();
        let stranger_nonce = SecretNonce::inject([8u8; 32]);
        assert_eq!(
            token
                .mint(&stranger, &stranger_nonce, "mallory", 1)
                .unwrap_err(),
            TokenError::Ownership(OwnershipError::Forbidden)
        );
        assert_eq!(token.total_supply(), 1_000_000);
    }

    #[test]
    fn mint_zero_rejected() {
        let (mut token, pk, nonce) = token();
        assert_eq!(
            token.mint(&pk, &nonce, "alice", 0).unwrap_err(),
            TokenError::ZeroAmount
        );
    }

    #[test]
    fn mint_overflow_rejected() {
        let (mut token, pk, nonce) = token();
        token.mint(&pk, &nonce, "alice", u64::MAX).unwrap();
        assert_eq!(
            token.mint(&pk, &nonce, "bob", 1).unwrap_err(),
            TokenError::SupplyOverflow { amount: 1 }
        );
        assert_eq!(token.balance_of("bob"), 0);
    }

    #[test]
    fn transfer_moves_balance() {
        let (mut token, pk, nonce) = token();
        token.mint(&pk, &nonce, "alice", 100).unwrap();
        token.transfer("alice", "bob", 40).unwrap();
        assert_eq!(token.balance_of("alice"), 60);
        assert_eq!(token.balance_of("bob"), 40);
        assert_eq!(token.total_supply(), 100);
    }

    #[test]
    fn transfer_more_than_balance_rejected() {
        let (mut token, pk, nonce) = token();
        token.mint(&pk, &nonce, "alice", 10).unwrap();
        assert_eq!(
            token.transfer("alice", "bob", 11).unwrap_err(),
            TokenError::InsufficientBalance {
                balance: 10,
                amount: 11
            }
        );
        assert_eq!(token.balance_of("alice"), 10);
        assert_eq!(token.balance_of("bob"), 0);
    }

    #[test]
    fn self_transfer_conserves_supply() {
        let (mut token, pk, nonce) = token();
        token.mint(&pk, &nonce, "alice", 100).unwrap();

        // Transferring to yourself moves nothing and mints nothing.
        token.transfer("alice", "alice", 40).unwrap();
        assert_eq!(token.balance_of("alice"), 100);
        assert_eq!(token.total_supply(), 100);

        // The balance check still applies.
        assert_eq!(
            token.transfer("alice", "alice", 101).unwrap_err(),
            TokenError::InsufficientBalance {
                balance: 100,
                amount: 101
            }
        );

        // And the whole balance remains burnable afterwards — supply
        // and holdings never diverged.
        token.burn("alice", 100).unwrap();
        assert_eq!(token.total_supply(), 0);
    }

    #[test]
    fn self_transfer_from_conserves_supply_and_consumes_allowance() {
        let (mut token, pk, nonce) = token();
        token.mint(&pk, &nonce, "alice", 100).unwrap();
        token.approve("alice", "carol", 50).unwrap();

        token.transfer_from("carol", "alice", "alice", 30).unwrap();
        assert_eq!(token.balance_of("alice"), 100);
        assert_eq!(token.total_supply(), 100);
        // The spend still counts against the approval.
        assert_eq!(token.allowance("alice", "carol"), 20);
    }

    #[test]
    fn pause_blocks_transfers_and_is_owner_gated() {
        let (mut token, pk, nonce) = token();
        token.mint(&pk, &nonce, "alice", 100).unwrap();

        // Only the owner can pause.
        let stranger = UmbraKeypair::from_seed(&[9u8; 32]).public_key();
        let stranger_nonce = SecretNonce::inject([8u8; 32]);
        assert!(token.pause(&stranger, &stranger_nonce).is_err());

        token.pause(&pk, &nonce).unwrap();
        assert!(token.is_paused());
        assert_eq!(
            token.transfer("alice", "bob", 1).unwrap_err(),
            TokenError::Lifecycle(LifecycleError::AlreadyPaused)
        );
        // Burning moves supply too, so the breaker covers it as well.
        assert_eq!(
            token.burn("alice", 1).unwrap_err(),
            TokenError::Lifecycle(LifecycleError::AlreadyPaused)
        );

        // Minting stays available to the owner while paused — the
        // breaker covers holder-facing movement, not administration.
        token.mint(&pk, &nonce, "alice", 1).unwrap();

        token.unpause(&pk, &nonce).unwrap();
        token.transfer("alice", "bob", 1).unwrap();
    }

    #[test]
    fn allowance_flow() {
        let (mut token, pk, nonce) = token();
        token.mint(&pk, &nonce, "alice", 100).unwrap();
        token.approve("alice", "carol", 30).unwrap();
        assert_eq!(token.allowance("alice", "carol"), 30);

        token.transfer_from("carol", "alice", "bob", 20).unwrap();
        assert_eq!(token.balance_of("bob"), 20);
        assert_eq!(token.allowance("alice", "carol"), 10);

        assert_eq!(
            token.transfer_from("carol", "alice", "bob", 11).unwrap_err(),
            TokenError::InsufficientAllowance {
                allowance: 10,
                amount: 11
            }
        );
    }

    #[test]
    fn failed_transfer_does_not_burn_allowance() {
        let (mut token, pk, nonce) = token();
        token.mint(&pk, &nonce, "alice", 5).unwrap();
        token.approve("alice", "carol", 100).unwrap();

        // Allowance covers it, balance does not.
        assert!(token.transfer_from("carol", "alice", "bob", 50).is_err());
        assert_eq!(token.allowance("alice", "carol"), 100);
    }

    #[test]
    fn burn_decreases_supply() {
        let (mut token, pk, nonce) = token();
        token.mint(&pk, &nonce, "alice", 100).unwrap();
        token.burn("alice", 40).unwrap();
        assert_eq!(token.balance_of("alice"), 60);
        assert_eq!(token.total_supply(), 60);

        assert_eq!(
            token.burn("alice", 61).unwrap_err(),
            TokenError::InsufficientBalance {
                balance: 60,
                amount: 61
            }
        );
    }

    #[test]
    fn renounced_token_cannot_mint_again() {
        let (mut token, pk, nonce) = token();
        token.mint(&pk, &nonce, "alice", 10).unwrap();
        token.ownership_mut().renounce_ownership(&pk, &nonce).unwrap();

        assert_eq!(
            token.mint(&pk, &nonce, "alice", 1).unwrap_err(),
            TokenError::Ownership(OwnershipError::Forbidden)
        );
        // Existing balances keep moving.
        token.transfer("alice", "bob", 5).unwrap();
    }

    #[test]
    fn uninitialized_token_rejects_operations() {
        let mut token = FungibleToken::new();
        assert_eq!(
            token.transfer("a", "b", 1).unwrap_err(),
            TokenError::Lifecycle(LifecycleError::NotInitialized)
        );
    }
}
