//! Claim verification core for Merkle airdrops.
//!
//! Each whitelisted address is owed a fixed amount, committed to by a single
//! Merkle root. A claim pays out only when
//!
//! - the account has not claimed before,
//! - `(account, amount)` is a leaf under the root, and
//! - the account signed the EIP-712 claim digest for this airdrop.
//!
//! The signature, not the submitter, authorizes the claim, so a relayer can
//! pay the fees on the claimant's behalf.
//!
//! # Components
//!
//! - `hash` - Keccak256 helpers and ABI word encoding
//! - `merkle` - leaf hashing, proof verification and an off-chain tree builder
//! - `whitelist` - `(account, amount)` entries and their proofs
//! - `eip712` - typed-data digests, signing and signer recovery
//! - `ledger` - claimed flags and the claimer log
//! - `token` - the token ledger the airdrop pays from
//! - `airdrop` - the claim entry point
//! - `shared` - thread-safe wrapper around an airdrop

#![forbid(unsafe_code)]

pub mod airdrop;
pub mod eip712;
pub mod error;
pub mod hash;
pub mod ledger;
pub mod merkle;
pub mod shared;
pub mod token;
pub mod whitelist;

pub use airdrop::{ClaimEvent, MerkleAirdrop};
pub use alloy_primitives::{Address, U256};
pub use eip712::{address_of, sign_digest, ClaimAuthorizer, Eip712Domain, Signature};
pub use error::{AirdropError, ClaimError, SignatureError, TransferError, TreeError};
pub use hash::{keccak256, Hash};
pub use ledger::ClaimLedger;
pub use merkle::{leaf_hash, verify, MerkleTree};
pub use shared::SharedAirdrop;
pub use token::{InMemoryToken, TokenLedger};
pub use whitelist::Whitelist;
