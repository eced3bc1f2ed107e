use std::collections::HashMap;

use alloy_primitives::{Address, U256};

use crate::error::TreeError;
use crate::hash::Hash;
use crate::merkle::{leaf_hash, MerkleTree};

/// The `(account, amount)` entries an airdrop root commits to.
#[derive(Clone, Debug, Default)]
pub struct Whitelist {
    entries: Vec<(Address, U256)>,
    index: HashMap<Address, usize>,
}

impl Whitelist {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a whitelist, failing on the first invalid entry.
    pub fn from_entries(
        entries: impl IntoIterator<Item = (Address, U256)>,
    ) -> Result<Self, TreeError> {
        let mut whitelist = Self::new();
        for (account, amount) in entries {
            whitelist.insert(account, amount)?;
        }
        Ok(whitelist)
    }

    /// Adds an entry. Each account may appear once and the zero address
    /// never.
    pub fn insert(&mut self, account: Address, amount: U256) -> Result<(), TreeError> {
        if account == Address::ZERO {
            return Err(TreeError::ZeroAccount);
        }
        if self.index.contains_key(&account) {
            return Err(TreeError::DuplicateAccount(account));
        }
        self.index.insert(account, self.entries.len());
        self.entries.push((account, amount));
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[(Address, U256)] {
        &self.entries
    }

    pub fn amount_of(&self, account: &Address) -> Option<U256> {
        self.index.get(account).map(|&i| self.entries[i].1)
    }

    pub fn leaves(&self) -> Vec<Hash> {
        self.entries
            .iter()
            .map(|(account, amount)| leaf_hash(account, amount))
            .collect()
    }

    pub fn tree(&self) -> Result<MerkleTree, TreeError> {
        MerkleTree::new(self.leaves())
    }

    /// Looks up `account`'s amount and its proof in `tree`.
    ///
    /// `tree` must have been built from this whitelist.
    pub fn proof_for(&self, tree: &MerkleTree, account: &Address) -> Option<(U256, Vec<Hash>)> {
        let amount = self.amount_of(account)?;
        let proof = tree.proof(&leaf_hash(account, &amount))?;
        Some((amount, proof))
    }
}
