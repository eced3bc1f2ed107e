use alloy_primitives::{Address, U256};

use crate::eip712::{ClaimAuthorizer, Eip712Domain, Signature};
use crate::error::{AirdropError, ClaimError, TransferError};
use crate::hash::{Hash, ZERO_HASH};
use crate::ledger::ClaimLedger;
use crate::merkle;
use crate::token::TokenLedger;

/// Emitted for every successful claim, for off-chain indexers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClaimEvent {
    pub account: Address,
    pub amount: U256,
}

/// One airdrop round: a fixed whitelist commitment paying out of `token`.
///
/// The root, token and signing domain are fixed at construction. A new
/// whitelist needs a new instance.
#[derive(Debug)]
pub struct MerkleAirdrop<T> {
    merkle_root: Hash,
    token: T,
    authorizer: ClaimAuthorizer,
    ledger: ClaimLedger,
    events: Vec<ClaimEvent>,
}

impl<T> MerkleAirdrop<T> {
    /// Rewraps the token, keeping every other piece of state.
    pub(crate) fn map_token<U>(self, f: impl FnOnce(T) -> U) -> MerkleAirdrop<U> {
        MerkleAirdrop {
            merkle_root: self.merkle_root,
            token: f(self.token),
            authorizer: self.authorizer,
            ledger: self.ledger,
            events: self.events,
        }
    }
}

impl<T: TokenLedger> MerkleAirdrop<T> {
    /// Creates an airdrop over `merkle_root`, paying out of `token`.
    ///
    /// # Errors
    /// Returns [`AirdropError::ZeroRoot`] for an all-zero root.
    pub fn new(merkle_root: Hash, token: T, domain: Eip712Domain) -> Result<Self, AirdropError> {
        if merkle_root == ZERO_HASH {
            return Err(AirdropError::ZeroRoot);
        }

        log::info!(
            "airdrop created: root=0x{}, chain_id={}, contract={}",
            hex::encode(merkle_root),
            domain.chain_id,
            domain.verifying_contract
        );

        Ok(Self {
            merkle_root,
            token,
            authorizer: ClaimAuthorizer::new(domain),
            ledger: ClaimLedger::new(),
            events: Vec::new(),
        })
    }

    /// Pays `amount` to `account` if the claim is whitelisted, signed by
    /// `account` and not yet paid.
    ///
    /// Anyone may submit the call; authorization comes from `signature`
    /// alone. The claim is recorded before the transfer is attempted, and
    /// a refused transfer undoes the record and the event.
    ///
    /// # Errors
    /// Checks run in order and stop at the first failure:
    /// [`ClaimError::AlreadyClaimed`], [`ClaimError::InvalidProof`],
    /// [`ClaimError::InvalidSignature`], then [`ClaimError::TransferFailed`].
    pub fn claim(
        &mut self,
        account: Address,
        amount: U256,
        proof: &[Hash],
        signature: &Signature,
    ) -> Result<(), ClaimError> {
        self.commit_claim(account, amount, proof, signature)?;

        if let Err(e) = self.token.transfer(&account, amount) {
            return Err(self.rollback_claim(&account, e));
        }

        log::info!("claim: {} received {}", account, amount);
        Ok(())
    }

    /// Runs the checks, then records the claim and its event. The transfer
    /// is left to the caller.
    pub(crate) fn commit_claim(
        &mut self,
        account: Address,
        amount: U256,
        proof: &[Hash],
        signature: &Signature,
    ) -> Result<(), ClaimError> {
        if let Err(e) = self.validate_claim(&account, &amount, proof, signature) {
            log::debug!("claim by {} for {} rejected: {}", account, amount, e);
            return Err(e);
        }

        self.ledger.record_claim(account);
        self.events.push(ClaimEvent { account, amount });
        Ok(())
    }

    /// Undoes a committed claim whose transfer was refused.
    pub(crate) fn rollback_claim(&mut self, account: &Address, cause: TransferError) -> ClaimError {
        if let Some(pos) = self.events.iter().rposition(|e| e.account == *account) {
            self.events.remove(pos);
        }
        self.ledger.revert_claim(account);
        log::warn!("claim by {} rolled back: {}", account, cause);
        ClaimError::TransferFailed(cause)
    }

    /// Runs every check `claim` performs without changing any state.
    pub fn validate_claim(
        &self,
        account: &Address,
        amount: &U256,
        proof: &[Hash],
        signature: &Signature,
    ) -> Result<(), ClaimError> {
        if self.ledger.has_claimed(account) {
            return Err(ClaimError::AlreadyClaimed);
        }

        let leaf = merkle::leaf_hash(account, amount);
        if !merkle::verify(&leaf, proof, &self.merkle_root) {
            return Err(ClaimError::InvalidProof);
        }

        if !self.authorizer.authorize(account, amount, signature) {
            return Err(ClaimError::InvalidSignature);
        }

        Ok(())
    }

    pub fn merkle_root(&self) -> Hash {
        self.merkle_root
    }

    pub fn airdrop_token(&self) -> &T {
        &self.token
    }

    pub fn has_claimed(&self, account: &Address) -> bool {
        self.ledger.has_claimed(account)
    }

    pub fn claimers(&self) -> &[Address] {
        self.ledger.claimers()
    }

    /// The typed-data digest `account` must sign to claim `amount`.
    pub fn message_hash(&self, account: &Address, amount: &U256) -> Hash {
        self.authorizer.digest(account, amount)
    }

    pub fn domain(&self) -> &Eip712Domain {
        self.authorizer.domain()
    }

    /// Claim events in emission order.
    pub fn events(&self) -> &[ClaimEvent] {
        &self.events
    }
}

#[cfg(test)]
mod tests {
    use k256::ecdsa::SigningKey;

    use super::*;
    use crate::eip712::{address_of, sign_digest};
    use crate::token::InMemoryToken;

    const HOLDER: Address = Address::new([0xAAu8; 20]);

    fn setup(amount: u64) -> (MerkleAirdrop<InMemoryToken>, SigningKey, Address) {
        let key = SigningKey::from_slice(&[1u8; 32]).unwrap();
        let account = address_of(key.verifying_key());
        let root = merkle::leaf_hash(&account, &U256::from(amount));

        let mut token = InMemoryToken::new(HOLDER);
        token.mint(HOLDER, U256::from(100u64)).unwrap();
        let airdrop = MerkleAirdrop::new(root, token, Eip712Domain::new(1, HOLDER)).unwrap();
        (airdrop, key, account)
    }

    #[test]
    fn test_zero_root_rejected() {
        let token = InMemoryToken::new(HOLDER);
        let result = MerkleAirdrop::new(ZERO_HASH, token, Eip712Domain::new(1, HOLDER));
        assert_eq!(result.unwrap_err(), AirdropError::ZeroRoot);
    }

    #[test]
    fn test_single_entry_claim() {
        let (mut airdrop, key, account) = setup(25);
        let amount = U256::from(25u64);
        let signature = sign_digest(&key, &airdrop.message_hash(&account, &amount)).unwrap();

        airdrop.claim(account, amount, &[], &signature).unwrap();

        assert!(airdrop.has_claimed(&account));
        assert_eq!(airdrop.claimers(), &[account]);
        assert_eq!(airdrop.airdrop_token().balance_of(&account), amount);
        assert_eq!(airdrop.events(), &[ClaimEvent { account, amount }]);
    }

    #[test]
    fn test_validate_claim_has_no_side_effects() {
        let (airdrop, key, account) = setup(25);
        let amount = U256::from(25u64);
        let signature = sign_digest(&key, &airdrop.message_hash(&account, &amount)).unwrap();

        airdrop
            .validate_claim(&account, &amount, &[], &signature)
            .unwrap();
        assert!(!airdrop.has_claimed(&account));
        assert!(airdrop.events().is_empty());
    }

    #[test]
    fn test_insufficient_funds_rolls_back() {
        let (mut airdrop, key, account) = setup(500);
        let amount = U256::from(500u64);
        let signature = sign_digest(&key, &airdrop.message_hash(&account, &amount)).unwrap();

        let err = airdrop.claim(account, amount, &[], &signature).unwrap_err();
        assert!(matches!(
            err,
            ClaimError::TransferFailed(TransferError::InsufficientBalance { .. })
        ));
        assert!(!airdrop.has_claimed(&account));
        assert!(airdrop.claimers().is_empty());
        assert!(airdrop.events().is_empty());
        assert_eq!(airdrop.airdrop_token().balance_of(&HOLDER), U256::from(100u64));
    }
}
