use std::collections::HashSet;

use alloy_primitives::Address;

/// Per-account claim flags and the ordered log of everyone who claimed.
///
/// This is bookkeeping only. It does not refuse a second record for the
/// same account; [`crate::MerkleAirdrop::claim`] checks `has_claimed` first.
#[derive(Clone, Debug, Default)]
pub struct ClaimLedger {
    claimed: HashSet<Address>,
    claimers: Vec<Address>,
}

impl ClaimLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_claimed(&self, account: &Address) -> bool {
        self.claimed.contains(account)
    }

    /// Marks `account` as claimed and appends it to the claimer log.
    pub fn record_claim(&mut self, account: Address) {
        self.claimed.insert(account);
        self.claimers.push(account);
    }

    /// Accounts in the order their claims succeeded.
    pub fn claimers(&self) -> &[Address] {
        &self.claimers
    }

    pub fn len(&self) -> usize {
        self.claimers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.claimers.is_empty()
    }

    /// Undoes `account`'s `record_claim` when its payout failed.
    ///
    /// Claims recorded after it keep their place in the log.
    pub(crate) fn revert_claim(&mut self, account: &Address) {
        if !self.claimed.remove(account) {
            return;
        }
        if let Some(pos) = self.claimers.iter().rposition(|c| c == account) {
            self.claimers.remove(pos);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_claim() {
        let mut ledger = ClaimLedger::new();
        let a = Address::from([1u8; 20]);
        let b = Address::from([2u8; 20]);

        assert!(!ledger.has_claimed(&a));
        ledger.record_claim(a);
        ledger.record_claim(b);

        assert!(ledger.has_claimed(&a));
        assert!(ledger.has_claimed(&b));
        assert_eq!(ledger.claimers(), &[a, b]);
        assert_eq!(ledger.len(), 2);
    }

    #[test]
    fn test_revert_keeps_later_claims() {
        let mut ledger = ClaimLedger::new();
        let a = Address::from([1u8; 20]);
        let b = Address::from([2u8; 20]);
        let c = Address::from([3u8; 20]);
        ledger.record_claim(a);
        ledger.record_claim(b);
        ledger.record_claim(c);

        ledger.revert_claim(&b);
        assert_eq!(ledger.claimers(), &[a, c]);
        assert!(!ledger.has_claimed(&b));
        assert!(ledger.has_claimed(&a));
        assert!(ledger.has_claimed(&c));

        // Reverting an account that holds no claim is a no-op.
        ledger.revert_claim(&b);
        assert_eq!(ledger.len(), 2);
    }
}
