use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use alloy_primitives::{Address, U256};

use crate::airdrop::{ClaimEvent, MerkleAirdrop};
use crate::eip712::Signature;
use crate::error::ClaimError;
use crate::hash::Hash;
use crate::token::TokenLedger;

/// A [`MerkleAirdrop`] that can be claimed against from several threads.
///
/// Checks and the claim record happen under one lock, so two claims for the
/// same account can never both observe it as unclaimed. The lock is released
/// while the token transfers, so a ledger that calls back into this handle
/// already sees the claim recorded.
#[derive(Debug)]
pub struct SharedAirdrop<L> {
    inner: Arc<Mutex<MerkleAirdrop<Arc<Mutex<L>>>>>,
}

impl<L> Clone for SharedAirdrop<L> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<L: TokenLedger> SharedAirdrop<L> {
    pub fn new(airdrop: MerkleAirdrop<L>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(
                airdrop.map_token(|token| Arc::new(Mutex::new(token))),
            )),
        }
    }

    fn lock(&self) -> MutexGuard<'_, MerkleAirdrop<Arc<Mutex<L>>>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Same checks and rollback as [`MerkleAirdrop::claim`].
    ///
    /// A transfer that re-enters the handle sees `account` as claimed, and a
    /// nested claim for it fails with [`ClaimError::AlreadyClaimed`].
    pub fn claim(
        &self,
        account: Address,
        amount: U256,
        proof: &[Hash],
        signature: &Signature,
    ) -> Result<(), ClaimError> {
        let mut token = {
            let mut airdrop = self.lock();
            airdrop.commit_claim(account, amount, proof, signature)?;
            Arc::clone(airdrop.airdrop_token())
        };

        if let Err(e) = token.transfer(&account, amount) {
            return Err(self.lock().rollback_claim(&account, e));
        }

        log::info!("claim: {} received {}", account, amount);
        Ok(())
    }

    pub fn has_claimed(&self, account: &Address) -> bool {
        self.lock().has_claimed(account)
    }

    pub fn claimers(&self) -> Vec<Address> {
        self.lock().claimers().to_vec()
    }

    pub fn events(&self) -> Vec<ClaimEvent> {
        self.lock().events().to_vec()
    }

    pub fn merkle_root(&self) -> Hash {
        self.lock().merkle_root()
    }

    pub fn message_hash(&self, account: &Address, amount: &U256) -> Hash {
        self.lock().message_hash(account, amount)
    }

    /// Handle to the token the airdrop pays from.
    pub fn token(&self) -> Arc<Mutex<L>> {
        Arc::clone(self.lock().airdrop_token())
    }

    pub fn balance_of(&self, owner: &Address) -> U256 {
        self.token().balance_of(owner)
    }
}
