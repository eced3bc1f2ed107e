//! EIP-712 typed-data digests and secp256k1 signature authorization.
//!
//! A claim is signed as the typed struct
//! `AirdropClaim(address account,uint256 amount)` under a domain that names
//! the airdrop, its schema version, the chain and the verifying instance.
//! Binding all four into the digest means a signature produced for one
//! deployment never verifies against another.

use std::fmt;
use std::str::FromStr;

use alloy_primitives::{Address, U256};
use k256::ecdsa::{RecoveryId, Signature as EcdsaSignature, SigningKey, VerifyingKey};
use sha3::{Digest, Keccak256};

use crate::error::SignatureError;
use crate::hash::{address_word, amount_word, keccak256, Hash};

pub const DOMAIN_TYPE: &str =
    "EIP712Domain(string name,string version,uint256 chainId,address verifyingContract)";

pub const CLAIM_TYPE: &str = "AirdropClaim(address account,uint256 amount)";

pub const DEFAULT_NAME: &str = "MerkleAirdrop";

pub const DEFAULT_VERSION: &str = "1";

/// Prefix that separates typed-data digests from raw transaction and
/// personal-message hashes.
pub const TYPED_DATA_PREFIX: [u8; 2] = [0x19, 0x01];

/// Half of the secp256k1 group order. Signatures with a larger `s` are the
/// malleable twin of a canonical one and are refused.
const SECP256K1_HALF_ORDER: Hash = [
    0x7f, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff,
    0x5d, 0x57, 0x6e, 0x73, 0x57, 0xa4, 0x50, 0x1d, 0xdf, 0xe9, 0x2f, 0x46, 0x68, 0x1b, 0x20, 0xa0,
];

pub fn domain_typehash() -> Hash {
    keccak256(DOMAIN_TYPE)
}

pub fn claim_typehash() -> Hash {
    keccak256(CLAIM_TYPE)
}

/// The EIP-712 signing domain of one airdrop instance.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Eip712Domain {
    pub name: String,
    pub version: String,
    pub chain_id: U256,
    pub verifying_contract: Address,
}

impl Eip712Domain {
    /// Domain with the default name and version for a deployment.
    pub fn new(chain_id: u64, verifying_contract: Address) -> Self {
        Self {
            name: DEFAULT_NAME.to_string(),
            version: DEFAULT_VERSION.to_string(),
            chain_id: U256::from(chain_id),
            verifying_contract,
        }
    }

    /// Computes the domain separator.
    pub fn separator(&self) -> Hash {
        Keccak256::new()
            .chain_update(domain_typehash())
            .chain_update(keccak256(self.name.as_bytes()))
            .chain_update(keccak256(self.version.as_bytes()))
            .chain_update(amount_word(&self.chain_id))
            .chain_update(address_word(&self.verifying_contract))
            .finalize()
            .into()
    }
}

/// Hash of the encoded `AirdropClaim` struct.
pub fn claim_struct_hash(account: &Address, amount: &U256) -> Hash {
    Keccak256::new()
        .chain_update(claim_typehash())
        .chain_update(address_word(account))
        .chain_update(amount_word(amount))
        .finalize()
        .into()
}

/// Final digest: `keccak256(0x19 0x01 ‖ domainSeparator ‖ structHash)`.
pub fn typed_data_digest(domain_separator: &Hash, struct_hash: &Hash) -> Hash {
    Keccak256::new()
        .chain_update(TYPED_DATA_PREFIX)
        .chain_update(domain_separator)
        .chain_update(struct_hash)
        .finalize()
        .into()
}

/// A recoverable secp256k1 signature in Ethereum `(v, r, s)` form.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Signature {
    pub v: u8,
    pub r: Hash,
    pub s: Hash,
}

impl Signature {
    pub const LEN: usize = 65;

    /// Parses the 65-byte `r ‖ s ‖ v` wire form.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, SignatureError> {
        if bytes.len() != Self::LEN {
            return Err(SignatureError::InvalidLength(bytes.len()));
        }
        let mut r = [0u8; 32];
        let mut s = [0u8; 32];
        r.copy_from_slice(&bytes[..32]);
        s.copy_from_slice(&bytes[32..64]);
        Ok(Self { v: bytes[64], r, s })
    }

    pub fn to_bytes(&self) -> [u8; 65] {
        let mut bytes = [0u8; 65];
        bytes[..32].copy_from_slice(&self.r);
        bytes[32..64].copy_from_slice(&self.s);
        bytes[64] = self.v;
        bytes
    }

    pub fn is_low_s(&self) -> bool {
        self.s <= SECP256K1_HALF_ORDER
    }

    /// Maps `v` onto the curve's recovery id. Only 27 and 28 are canonical.
    fn recovery_id(&self) -> Result<RecoveryId, SignatureError> {
        match self.v {
            27 | 28 => RecoveryId::from_byte(self.v - 27)
                .ok_or(SignatureError::InvalidRecoveryId(self.v)),
            other => Err(SignatureError::InvalidRecoveryId(other)),
        }
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.to_bytes()))
    }
}

impl FromStr for Signature {
    type Err = SignatureError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let cleaned = s.trim();
        let cleaned = cleaned.strip_prefix("0x").unwrap_or(cleaned);
        let bytes = hex::decode(cleaned).map_err(|e| SignatureError::InvalidHex(e.to_string()))?;
        Self::from_bytes(&bytes)
    }
}

/// Derives the Ethereum address of a public key.
///
/// The address is the last 20 bytes of the Keccak256 hash of the
/// uncompressed public key without its `0x04` tag.
pub fn address_of(public_key: &VerifyingKey) -> Address {
    let encoded = public_key.to_encoded_point(false);
    let hash = keccak256(&encoded.as_bytes()[1..]);
    Address::from_slice(&hash[12..32])
}

/// Recovers the signer of `digest`.
///
/// # Errors
/// Non-canonical `v`, a high `s`, out-of-range scalars, failed recovery and
/// a zero-address result are each reported as their own [`SignatureError`].
pub fn recover(digest: &Hash, signature: &Signature) -> Result<Address, SignatureError> {
    let recovery_id = signature.recovery_id()?;
    if !signature.is_low_s() {
        return Err(SignatureError::HighS);
    }

    let mut rs = [0u8; 64];
    rs[..32].copy_from_slice(&signature.r);
    rs[32..].copy_from_slice(&signature.s);
    let ecdsa = EcdsaSignature::from_slice(&rs).map_err(|_| SignatureError::Malformed)?;

    let key = VerifyingKey::recover_from_prehash(digest, &ecdsa, recovery_id)
        .map_err(|_| SignatureError::RecoveryFailed)?;
    let signer = address_of(&key);
    if signer == Address::ZERO {
        return Err(SignatureError::ZeroAddress);
    }
    Ok(signer)
}

/// Signs a prehashed digest, always producing a low-s signature with
/// `v` in {27, 28}.
pub fn sign_digest(key: &SigningKey, digest: &Hash) -> Result<Signature, SignatureError> {
    let (signature, recovery_id) = key
        .sign_prehash_recoverable(digest)
        .map_err(|_| SignatureError::SigningFailed)?;

    // Negating s flips the parity of the recovered point's y coordinate.
    let (signature, recovery_id) = match signature.normalize_s() {
        Some(normalized) => (
            normalized,
            RecoveryId::new(!recovery_id.is_y_odd(), recovery_id.is_x_reduced()),
        ),
        None => (signature, recovery_id),
    };

    let bytes = signature.to_bytes();
    let mut r = [0u8; 32];
    let mut s = [0u8; 32];
    r.copy_from_slice(&bytes[..32]);
    s.copy_from_slice(&bytes[32..64]);
    Ok(Signature {
        v: 27 + recovery_id.to_byte(),
        r,
        s,
    })
}

/// Builds claim digests for one domain and checks claim signatures
/// against them.
#[derive(Clone, Debug)]
pub struct ClaimAuthorizer {
    domain: Eip712Domain,
    separator: Hash,
}

impl ClaimAuthorizer {
    pub fn new(domain: Eip712Domain) -> Self {
        let separator = domain.separator();
        Self { domain, separator }
    }

    pub fn domain(&self) -> &Eip712Domain {
        &self.domain
    }

    pub fn domain_separator(&self) -> Hash {
        self.separator
    }

    /// The digest an account signs to authorize claiming `amount`.
    pub fn digest(&self, account: &Address, amount: &U256) -> Hash {
        typed_data_digest(&self.separator, &claim_struct_hash(account, amount))
    }

    /// Returns true only if `signature` over this claim's digest recovers to
    /// `account`. Malformed or non-canonical signatures are simply invalid.
    pub fn authorize(&self, account: &Address, amount: &U256, signature: &Signature) -> bool {
        match recover(&self.digest(account, amount), signature) {
            Ok(signer) => signer == *account,
            Err(e) => {
                log::debug!("signature for {} rejected: {}", account, e);
                false
            }
        }
    }
}
