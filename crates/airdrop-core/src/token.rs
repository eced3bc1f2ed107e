use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use alloy_primitives::{Address, U256};

use crate::error::TransferError;

/// The fungible token the airdrop pays out of.
///
/// `transfer` moves tokens from the airdrop's own holding to `to`. An
/// implementation may refuse, in which case the claim that triggered it is
/// rolled back.
pub trait TokenLedger {
    fn transfer(&mut self, to: &Address, amount: U256) -> Result<(), TransferError>;

    fn balance_of(&self, owner: &Address) -> U256;
}

/// Balance book for a single token, paying out of one holder account.
#[derive(Clone, Debug)]
pub struct InMemoryToken {
    holder: Address,
    balances: HashMap<Address, U256>,
    supply: U256,
    frozen: bool,
}

impl InMemoryToken {
    /// Creates an empty ledger whose transfers debit `holder`.
    pub fn new(holder: Address) -> Self {
        Self {
            holder,
            balances: HashMap::new(),
            supply: U256::ZERO,
            frozen: false,
        }
    }

    /// Credits `amount` new tokens to `owner`.
    ///
    /// # Errors
    /// Returns [`TransferError::Overflow`] if the total supply would exceed
    /// `U256::MAX`. Nothing is credited in that case.
    pub fn mint(&mut self, owner: Address, amount: U256) -> Result<(), TransferError> {
        let supply = self
            .supply
            .checked_add(amount)
            .ok_or(TransferError::Overflow)?;
        let balance = self
            .balance_of(&owner)
            .checked_add(amount)
            .ok_or(TransferError::Overflow)?;
        self.balances.insert(owner, balance);
        self.supply = supply;
        Ok(())
    }

    /// While frozen every transfer fails with [`TransferError::Frozen`].
    pub fn set_frozen(&mut self, frozen: bool) {
        self.frozen = frozen;
    }

    pub fn total_supply(&self) -> U256 {
        self.supply
    }
}

impl TokenLedger for InMemoryToken {
    fn transfer(&mut self, to: &Address, amount: U256) -> Result<(), TransferError> {
        if self.frozen {
            return Err(TransferError::Frozen);
        }
        if *to == Address::ZERO {
            return Err(TransferError::ZeroRecipient);
        }

        let available = self.balance_of(&self.holder);
        if available < amount {
            return Err(TransferError::InsufficientBalance {
                available,
                requested: amount,
            });
        }

        if *to == self.holder {
            return Ok(());
        }

        let credited = self
            .balance_of(to)
            .checked_add(amount)
            .ok_or(TransferError::Overflow)?;
        self.balances.insert(self.holder, available - amount);
        self.balances.insert(*to, credited);
        Ok(())
    }

    fn balance_of(&self, owner: &Address) -> U256 {
        self.balances.get(owner).copied().unwrap_or_default()
    }
}

/// A ledger shared with other holders of the same handle.
impl<L: TokenLedger> TokenLedger for Arc<Mutex<L>> {
    fn transfer(&mut self, to: &Address, amount: U256) -> Result<(), TransferError> {
        self.lock()
            .unwrap_or_else(PoisonError::into_inner)
            .transfer(to, amount)
    }

    fn balance_of(&self, owner: &Address) -> U256 {
        self.lock()
            .unwrap_or_else(PoisonError::into_inner)
            .balance_of(owner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn funded(amount: u64) -> (InMemoryToken, Address) {
        let holder = Address::from([0xAAu8; 20]);
        let mut token = InMemoryToken::new(holder);
        token.mint(holder, U256::from(amount)).unwrap();
        (token, holder)
    }

    #[test]
    fn test_transfer_moves_balance() {
        let (mut token, holder) = funded(100);
        let to = Address::from([1u8; 20]);

        token.transfer(&to, U256::from(25u64)).unwrap();
        assert_eq!(token.balance_of(&to), U256::from(25u64));
        assert_eq!(token.balance_of(&holder), U256::from(75u64));
        assert_eq!(token.total_supply(), U256::from(100u64));
    }

    #[test]
    fn test_transfer_refusals() {
        let (mut token, holder) = funded(10);
        let to = Address::from([1u8; 20]);

        assert_eq!(
            token.transfer(&to, U256::from(11u64)),
            Err(TransferError::InsufficientBalance {
                available: U256::from(10u64),
                requested: U256::from(11u64),
            })
        );
        assert_eq!(
            token.transfer(&Address::ZERO, U256::from(1u64)),
            Err(TransferError::ZeroRecipient)
        );

        token.set_frozen(true);
        assert_eq!(token.transfer(&to, U256::from(1u64)), Err(TransferError::Frozen));
        assert_eq!(token.balance_of(&holder), U256::from(10u64));
    }

    #[test]
    fn test_shared_handle_sees_transfers() {
        let (token, _) = funded(10);
        let shared = Arc::new(Mutex::new(token));
        let mut handle = Arc::clone(&shared);
        let to = Address::from([1u8; 20]);

        handle.transfer(&to, U256::from(3u64)).unwrap();
        assert_eq!(shared.balance_of(&to), U256::from(3u64));
    }

    #[test]
    fn test_self_transfer_keeps_balance() {
        let (mut token, holder) = funded(10);
        token.transfer(&holder, U256::from(4u64)).unwrap();
        assert_eq!(token.balance_of(&holder), U256::from(10u64));
    }

    #[test]
    fn test_mint_refuses_to_overflow_supply() {
        let (mut token, holder) = funded(10);
        let other = Address::from([1u8; 20]);

        assert_eq!(token.mint(other, U256::MAX), Err(TransferError::Overflow));
        assert_eq!(token.balance_of(&other), U256::ZERO);
        assert_eq!(token.total_supply(), U256::from(10u64));

        token.mint(other, U256::MAX - U256::from(10u64)).unwrap();
        assert_eq!(token.total_supply(), U256::MAX);
        assert_eq!(token.mint(holder, U256::from(1u64)), Err(TransferError::Overflow));
        assert_eq!(token.balance_of(&holder), U256::from(10u64));
    }
}
