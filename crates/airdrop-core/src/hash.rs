use alloy_primitives::{Address, U256};
use sha3::{Digest, Keccak256};

/// A 32-byte Keccak256 output.
pub type Hash = [u8; 32];

/// All-zero hash, never a valid Merkle root.
pub const ZERO_HASH: Hash = [0u8; 32];

/// Computes the Keccak256 hash of arbitrary bytes.
pub fn keccak256(data: impl AsRef<[u8]>) -> Hash {
    Keccak256::digest(data.as_ref()).into()
}

/// Computes a Keccak256 hash of two 32-byte values concatenated in
/// ascending byte order.
///
/// Ordering the pair first makes the hash independent of which side of
/// the parent each child sits on, so proofs carry no direction bits.
///
/// # Arguments
/// * `a` - First 32-byte value
/// * `b` - Second 32-byte value
///
/// # Returns
/// 32-byte hash result
pub fn hash_pair(a: &Hash, b: &Hash) -> Hash {
    let (left, right) = if a <= b { (a, b) } else { (b, a) };
    Keccak256::new()
        .chain_update(left)
        .chain_update(right)
        .finalize()
        .into()
}

/// Left-pads a 20-byte address into a 32-byte ABI word.
pub fn address_word(address: &Address) -> Hash {
    let mut word = [0u8; 32];
    word[12..32].copy_from_slice(address.as_slice());
    word
}

/// Big-endian 32-byte ABI word of an amount.
pub fn amount_word(amount: &U256) -> Hash {
    amount.to_be_bytes::<32>()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keccak256_empty_input() {
        assert_eq!(
            hex::encode(keccak256(b"")),
            "c5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a470"
        );
    }

    #[test]
    fn test_hash_pair_is_commutative() {
        let a = [1u8; 32];
        let b = [2u8; 32];
        assert_eq!(hash_pair(&a, &b), hash_pair(&b, &a));
        assert_ne!(hash_pair(&a, &b), hash_pair(&a, &a));
    }

    #[test]
    fn test_hash_pair_sorts_before_hashing() {
        let low = [1u8; 32];
        let high = [2u8; 32];
        let mut concat = Vec::with_capacity(64);
        concat.extend_from_slice(&low);
        concat.extend_from_slice(&high);
        assert_eq!(hash_pair(&high, &low), keccak256(&concat));
    }

    #[test]
    fn test_address_word() {
        let address = Address::from([1u8; 20]);
        let word = address_word(&address);
        assert_eq!(word[0..12], [0u8; 12]);
        assert_eq!(word[12..32], [1u8; 20]);
    }

    #[test]
    fn test_amount_word_is_big_endian() {
        let word = amount_word(&U256::from(25u64));
        assert_eq!(word[31], 25);
        assert_eq!(word[..31], [0u8; 31]);
    }
}
