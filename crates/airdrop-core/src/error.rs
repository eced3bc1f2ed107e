use alloy_primitives::{Address, U256};
use thiserror::Error;

/// Reasons a claim is refused. Each kind is distinct so callers can tell
/// whitelist membership failures from authorization failures.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClaimError {
    #[error("account has already claimed")]
    AlreadyClaimed,

    #[error("merkle proof does not resolve to the airdrop root")]
    InvalidProof,

    #[error("signature does not authorize this claim")]
    InvalidSignature,

    #[error("token transfer failed: {0}")]
    TransferFailed(#[from] TransferError),
}

/// Construction-time failures of an airdrop instance.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AirdropError {
    #[error("merkle root must be non-zero")]
    ZeroRoot,
}

/// Why a signature could not be turned into a signer address.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SignatureError {
    #[error("invalid signature length: expected 65 bytes, got {0}")]
    InvalidLength(usize),

    #[error("invalid hex encoding: {0}")]
    InvalidHex(String),

    #[error("recovery id must be 27 or 28, got {0}")]
    InvalidRecoveryId(u8),

    #[error("s value is in the upper half of the curve order")]
    HighS,

    #[error("r or s is outside the curve order")]
    Malformed,

    #[error("public key recovery failed")]
    RecoveryFailed,

    #[error("recovered the zero address")]
    ZeroAddress,

    #[error("signing failed")]
    SigningFailed,
}

/// Failures building a tree or whitelist.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TreeError {
    #[error("cannot build a merkle tree without leaves")]
    Empty,

    #[error("account {0} appears more than once")]
    DuplicateAccount(Address),

    #[error("zero address cannot be whitelisted")]
    ZeroAccount,
}

/// Refusals reported by a token ledger.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransferError {
    #[error("insufficient balance: holder has {available}, transfer needs {requested}")]
    InsufficientBalance { available: U256, requested: U256 },

    #[error("transfer to the zero address")]
    ZeroRecipient,

    #[error("ledger is frozen")]
    Frozen,

    #[error("balance overflow")]
    Overflow,
}
