//! # Non-Fungible Token Ledger
//!
//! A minimal NFT ledger: unique `u64` token ids, one owner each, one
//! approved operator per token. Minting is gated by the shielded owner,
//! same discipline as the fungible ledger; holder operations are keyed by
//! hex address strings with authentication left to the embedding ledger.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;
use tracing::debug;
use umbra_primitives::identity::{IdentityHash, UmbraPublicKey};
use umbra_primitives::nonce::SecretNonce;

use crate::lifecycle::{Initializable, LifecycleError};
use crate::shielded_ownable::{OwnershipError, ShieldedOwnable};

/// Errors from non-fungible token operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum NftError {
    /// The token id is already minted.
    #[error("token {0} already exists")]
    AlreadyMinted(u64),

    /// The token id does not exist.
    #[error("token {0} not found")]
    NotFound(u64),

    /// The named address neither owns the token nor is approved for it.
    #[error("address {address} is not the owner of token {token_id} and not approved")]
    NotAuthorized {
        /// The address that attempted the operation.
        address: String,
        /// The token in question.
        token_id: u64,
    },

    /// The ownership gate rejected the caller.
    #[error(transparent)]
    Ownership(#[from] OwnershipError),

    /// A lifecycle guard rejected the operation.
    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),
}

/// A non-fungible token ledger with shielded-owner-gated minting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NonFungibleToken {
    init: Initializable,
    ownable: ShieldedOwnable,
    /// Collection name, fixed at initialization.
    name: String,
    /// Token id -> holder address.
    owners: HashMap<u64, String>,
    /// Token id -> approved operator address.
    approvals: HashMap<u64, String>,
    total_minted: u64,
}

impl NonFungibleToken {
    /// Creates an uninitialized ledger.
    pub fn new() -> Self {
        Self {
            init: Initializable::new(),
            ownable: ShieldedOwnable::new(),
            name: String::new(),
            owners: HashMap::new(),
            approvals: HashMap::new(),
            total_minted: 0,
        }
    }

    /// One-shot constructor: names the collection and establishes the
    /// shielded owner who may mint.
    pub fn initialize(&mut self, name: String, owner: IdentityHash) -> Result<(), NftError> {
        self.init.assert_not_initialized()?;
        self.ownable.initialize(owner)?;
        self.init.initialize()?;
        self.name = name;
        Ok(())
    }

    /// Mints `token_id` to `to`. Shielded-owner gated; ids are
    /// caller-chosen and must be fresh.
    pub fn mint(
        &mut self,
        caller: &UmbraPublicKey,
        witness: &SecretNonce,
        to: &str,
        token_id: u64,
    ) -> Result<(), NftError> {
        self.init.assert_initialized()?;
        self.ownable.assert_only_owner(caller, witness)?;
        if self.owners.contains_key(&token_id) {
            return Err(NftError::AlreadyMinted(token_id));
        }

        self.owners.insert(token_id, to.to_string());
        self.total_minted += 1;

        debug!(token_id, to, "nft minted");
        Ok(())
    }

    /// Moves `token_id` from `from` to `to`. `from` must be the holder
    /// or the token's approved operator. Any approval is cleared on
    /// transfer.
    pub fn transfer(&mut self, from: &str, to: &str, token_id: u64) -> Result<(), NftError> {
        self.init.assert_initialized()?;
        let holder = self
            .owners
            .get(&token_id)
            .ok_or(NftError::NotFound(token_id))?;

        let approved = self.approvals.get(&token_id).map(String::as_str);
        if holder != from && approved != Some(from) {
            return Err(NftError::NotAuthorized {
                address: from.to_string(),
                token_id,
            });
        }

        self.owners.insert(token_id, to.to_string());
        self.approvals.remove(&token_id);
        Ok(())
    }

    /// Approves `operator` to move `token_id`. Only the holder may
    /// approve; approving overwrites any previous operator.
    pub fn approve(&mut self, holder: &str, operator: &str, token_id: u64) -> Result<(), NftError> {
        self.init.assert_initialized()?;
        let current = self
            .owners
            .get(&token_id)
            .ok_or(NftError::NotFound(token_id))?;
        if current != holder {
            return Err(NftError::NotAuthorized {
                address: holder.to_string(),
                token_id,
            });
        }
        self.approvals.insert(token_id, operator.to_string());
        Ok(())
    }

    /// Burns `token_id`. Holder-only; there is no admin burn.
    pub fn burn(&mut self, holder: &str, token_id: u64) -> Result<(), NftError> {
        self.init.assert_initialized()?;
        let current = self
            .owners
            .get(&token_id)
            .ok_or(NftError::NotFound(token_id))?;
        if current != holder {
            return Err(NftError::NotAuthorized {
                address: holder.to_string(),
                token_id,
            });
        }
        self.owners.remove(&token_id);
        self.approvals.remove(&token_id);

        debug!(token_id, holder, "nft burned");
        Ok(())
    }

    // -- Reads --------------------------------------------------------------

    /// Holder of `token_id`, or `None`.
    pub fn owner_of(&self, token_id: u64) -> Option<&str> {
        self.owners.get(&token_id).map(String::as_str)
    }

    /// Approved operator for `token_id`, or `None`.
    pub fn get_approved(&self, token_id: u64) -> Option<&str> {
        self.approvals.get(&token_id).map(String::as_str)
    }

    /// Number of tokens currently held by `address`.
    pub fn balance_of(&self, address: &str) -> usize {
        self.owners.values().filter(|a| a.as_str() == address).count()
    }

    /// Count of mints over the ledger's lifetime (burns do not decrease
    /// it).
    pub fn total_minted(&self) -> u64 {
        self.total_minted
    }

    /// Collection name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The embedded ownership machine.
    pub fn ownership(&self) -> &ShieldedOwnable {
        &self.ownable
    }

    /// Mutable access to the embedded ownership machine.
    pub fn ownership_mut(&mut self) -> &mut ShieldedOwnable {
        &mut self.ownable
    }
}

impl Default for NonFungibleToken {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use umbra_primitives::identity::{identity_hash, UmbraKeypair};

    fn collection() -> (NonFungibleToken, UmbraPublicKey, SecretNonce) {
        let pk = UmbraKeypair::from_seed(&[1u8; 32]).public_key();
        let nonce = SecretNonce::inject([2u8; 32]);
        let id = identity_hash(&pk, &nonce).unwrap();
        let mut nft = NonFungibleToken::new();
        nft.initialize("Umbra Relics".into(), id).unwrap();
        (nft, pk, nonce)
    }

    #[test]
    fn mint_assigns_owner() {
        let (mut nft, pk, nonce) = collection();
        nft.mint(&pk, &nonce, "alice", 1).unwrap();
        assert_eq!(nft.owner_of(1), Some("alice"));
        assert_eq!(nft.balance_of("alice"), 1);
        assert_eq!(nft.total_minted(), 1);
    }

    #[test]
    fn mint_is_owner_gated() {
        let (mut nft, _, _) = collection();
        let stranger = UmbraKeypair::from_seed(&[9u8; 32]).public_key();
        let stranger_nonce = SecretNonce::inject([8u8; 32]);
        assert_eq!(
            nft.mint(&stranger, &stranger_nonce, "mallory", 1).unwrap_err(),
            NftError::Ownership(OwnershipError::Forbidden)
        );
    }

    #[test]
    fn duplicate_id_rejected() {
        let (mut nft, pk, nonce) = collection();
        nft.mint(&pk, &nonce, "alice", 7).unwrap();
        assert_eq!(
            nft.mint(&pk, &nonce, "bob", 7).unwrap_err(),
            NftError::AlreadyMinted(7)
        );
        assert_eq!(nft.owner_of(7), Some("alice"));
    }

    #[test]
    fn holder_transfers() {
        let (mut nft, pk, nonce) = collection();
        nft.mint(&pk, &nonce, "alice", 1).unwrap();
        nft.transfer("alice", "bob", 1).unwrap();
        assert_eq!(nft.owner_of(1), Some("bob"));
        assert_eq!(nft.balance_of("alice"), 0);
    }

    #[test]
    fn non_holder_cannot_transfer() {
        let (mut nft, pk, nonce) = collection();
        nft.mint(&pk, &nonce, "alice", 1).unwrap();
        assert_eq!(
            nft.transfer("mallory", "mallory", 1).unwrap_err(),
            NftError::NotAuthorized {
                address: "mallory".into(),
                token_id: 1
            }
        );
    }

    #[test]
    fn approved_operator_transfers_and_approval_clears() {
        let (mut nft, pk, nonce) = collection();
        nft.mint(&pk, &nonce, "alice", 1).unwrap();
        nft.approve("alice", "carol", 1).unwrap();
        assert_eq!(nft.get_approved(1), Some("carol"));

        nft.transfer("carol", "dave", 1).unwrap();
        assert_eq!(nft.owner_of(1), Some("dave"));
        assert_eq!(nft.get_approved(1), None);
    }

    #[test]
    fn only_holder_approves() {
        let (mut nft, pk, nonce) = collection();
        nft.mint(&pk, &nonce, "alice", 1).unwrap();
        assert!(nft.approve("mallory", "mallory", 1).is_err());
    }

    #[test]
    fn burn_removes_token() {
        let (mut nft, pk, nonce) = collection();
        nft.mint(&pk, &nonce, "alice", 1).unwrap();
        nft.burn("alice", 1).unwrap();
        assert_eq!(nft.owner_of(1), None);
        assert_eq!(nft.transfer("alice", "bob", 1).unwrap_err(), NftError::NotFound(1));
        // Lifetime mint count is unaffected by burns.
        assert_eq!(nft.total_minted(), 1);
    }

    #[test]
    fn unknown_token_reads_return_none() {
        let (nft, _, _) = collection();
        assert_eq!(nft.owner_of(404), None);
        assert_eq!(nft.get_approved(404), None);
    }
}
