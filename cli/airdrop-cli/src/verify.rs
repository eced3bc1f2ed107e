use std::fs;
use std::path::PathBuf;

use airdrop_core::{leaf_hash, merkle, ClaimAuthorizer, ClaimError, Hash, Signature};
use anyhow::{Context, Result};
use clap::Parser;

use crate::common::{
    parse_address, parse_amount, parse_hash, validate_merkle_root, ClaimFile, DomainArgs,
};

#[derive(Parser, Debug)]
#[command(name = "verify")]
#[command(about = "Check a signed claim offline before submitting it", long_about = None)]
pub struct Cli {
    /// Claim JSON file written by the claim command
    #[arg(short, long)]
    pub claim: PathBuf,

    /// Merkle root of the deployed airdrop (hex format)
    #[arg(short, long)]
    pub root: String,

    #[command(flatten)]
    pub domain: DomainArgs,
}

/// Runs the proof and signature checks a claim goes through, in the same
/// order, against `root` and `authorizer`'s domain.
///
/// Malformed fields are reported as errors; a well-formed claim that fails
/// a check yields the matching [`ClaimError`].
pub fn check_claim(
    claim: &ClaimFile,
    root: &Hash,
    authorizer: &ClaimAuthorizer,
) -> Result<std::result::Result<(), ClaimError>> {
    let account = parse_address(&claim.account).context("Invalid account")?;
    let amount = parse_amount(&claim.amount).context("Invalid amount")?;
    let proof = claim
        .proof
        .iter()
        .map(|node| parse_hash(node))
        .collect::<Result<Vec<Hash>>>()
        .context("Invalid proof node")?;
    let signature = claim
        .signature
        .parse::<Signature>()
        .context("Invalid signature")?;

    if !merkle::verify(&leaf_hash(&account, &amount), &proof, root) {
        return Ok(Err(ClaimError::InvalidProof));
    }
    if !authorizer.authorize(&account, &amount, &signature) {
        return Ok(Err(ClaimError::InvalidSignature));
    }
    Ok(Ok(()))
}

pub fn run(cli: Cli) -> Result<()> {
    let root = validate_merkle_root(&cli.root).context("Invalid Merkle root")?;
    let authorizer = ClaimAuthorizer::new(cli.domain.domain()?);

    println!("Reading claim from {:?}...", cli.claim);
    let content = fs::read_to_string(&cli.claim).context("Failed to read claim file")?;
    let claim: ClaimFile = serde_json::from_str(&content).context("Failed to parse claim JSON")?;

    if parse_hash(&claim.merkle_root).ok() != Some(root) {
        log::warn!(
            "claim was built against root {}, checking against {}",
            claim.merkle_root,
            cli.root
        );
    }

    match check_claim(&claim, &root, &authorizer)? {
        Ok(()) => {
            println!("Claim for {} ({}) is valid", claim.account, claim.amount);
            Ok(())
        }
        Err(e) => anyhow::bail!("Claim for {} is not valid: {}", claim.account, e),
    }
}

#[cfg(test)]
mod tests {
    use airdrop_core::{Address, Eip712Domain, Whitelist, U256};
    use k256::ecdsa::SigningKey;

    use super::*;
    use crate::build_tree::build_tree_file;
    use crate::claim::build_claim;
    use crate::common::TreeFile;

    fn authorizer(chain_id: u64) -> ClaimAuthorizer {
        ClaimAuthorizer::new(Eip712Domain::new(chain_id, Address::new([0xAA; 20])))
    }

    fn signed_claim() -> (ClaimFile, TreeFile) {
        let key = SigningKey::from_slice(&[5u8; 32]).unwrap();
        let whitelist = Whitelist::from_entries([
            (airdrop_core::address_of(key.verifying_key()), U256::from(25u64)),
            (Address::new([0x22; 20]), U256::from(50u64)),
            (Address::new([0x33; 20]), U256::from(75u64)),
        ])
        .unwrap();
        let tree = build_tree_file(&whitelist).unwrap();
        let claim = build_claim(&tree, &key, &authorizer(1)).unwrap();
        (claim, tree)
    }

    #[test]
    fn test_valid_claim() {
        let (claim, tree) = signed_claim();
        let root = parse_hash(&tree.merkle_root).unwrap();
        assert_eq!(check_claim(&claim, &root, &authorizer(1)).unwrap(), Ok(()));
    }

    #[test]
    fn test_wrong_root_is_invalid_proof() {
        let (claim, _) = signed_claim();
        let result = check_claim(&claim, &[0x42; 32], &authorizer(1)).unwrap();
        assert_eq!(result, Err(ClaimError::InvalidProof));
    }

    #[test]
    fn test_wrong_domain_is_invalid_signature() {
        let (claim, tree) = signed_claim();
        let root = parse_hash(&tree.merkle_root).unwrap();
        let result = check_claim(&claim, &root, &authorizer(5)).unwrap();
        assert_eq!(result, Err(ClaimError::InvalidSignature));
    }

    #[test]
    fn test_short_proof_node_is_an_error() {
        let (mut claim, tree) = signed_claim();
        let root = parse_hash(&tree.merkle_root).unwrap();
        claim.proof[0] = "0x1234".to_string();
        assert!(check_claim(&claim, &root, &authorizer(1)).is_err());
    }
}
