use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

use airdrop_core::eip712::{DEFAULT_NAME, DEFAULT_VERSION};
use airdrop_core::{Address, Eip712Domain, Hash, U256};
use anyhow::Context;
use clap::Args;
use serde::{Deserialize, Serialize};

/// Parses an Ethereum address from a hex string.
///
/// # Arguments
/// * `addr_str` - The address string, with or without "0x" prefix
///
/// # Returns
/// The parsed address
///
/// # Errors
/// Returns an error if the address is not 40 hex characters, contains invalid
/// hex, or is the zero address
pub fn parse_address(addr_str: &str) -> anyhow::Result<Address> {
    let cleaned = addr_str
        .trim()
        .strip_prefix("0x")
        .unwrap_or(addr_str.trim());
    if cleaned.len() != 40 {
        anyhow::bail!(
            "Invalid address length: expected 40 hex chars, got {}",
            cleaned.len()
        );
    }
    let mut address = [0u8; 20];
    hex::decode_to_slice(cleaned, &mut address)
        .map_err(|e| anyhow::anyhow!("Invalid hex encoding: {}", e))?;
    if address == [0u8; 20] {
        anyhow::bail!("Zero address not allowed");
    }
    Ok(Address::from(address))
}

/// Parses a 32-byte hash (Merkle root, proof node or digest) from hex.
///
/// Anything other than exactly 64 hex characters is rejected, so proof
/// elements of the wrong width never reach the verifier.
pub fn parse_hash(hash_str: &str) -> anyhow::Result<Hash> {
    let cleaned = hash_str
        .trim()
        .strip_prefix("0x")
        .unwrap_or(hash_str.trim());
    if cleaned.len() != 64 {
        anyhow::bail!(
            "Invalid hash length: expected 64 hex chars, got {}",
            cleaned.len()
        );
    }
    let mut hash = [0u8; 32];
    hex::decode_to_slice(cleaned, &mut hash)
        .map_err(|e| anyhow::anyhow!("Invalid hex encoding: {}", e))?;
    Ok(hash)
}

/// Validates a Merkle root string. The zero hash is never a valid root.
pub fn validate_merkle_root(root_str: &str) -> anyhow::Result<Hash> {
    let root = parse_hash(root_str)?;
    if root == [0u8; 32] {
        anyhow::bail!("Merkle root cannot be zero");
    }
    Ok(root)
}

/// Parses a token amount, decimal or `0x`-prefixed hex.
pub fn parse_amount(amount_str: &str) -> anyhow::Result<U256> {
    let trimmed = amount_str.trim();
    if trimmed.is_empty() {
        anyhow::bail!("Amount is empty");
    }
    trimmed
        .parse::<U256>()
        .map_err(|e| anyhow::anyhow!("Invalid amount '{}': {}", trimmed, e))
}

/// Encodes bytes as a `0x`-prefixed lowercase hex string.
pub fn hex_encode(bytes: impl AsRef<[u8]>) -> String {
    format!("0x{}", hex::encode(bytes))
}

/// Writes `contents` to a temp file next to `path`, then renames it into
/// place so readers never see a partial file.
pub fn write_file_atomic(path: &Path, contents: &str) -> anyhow::Result<()> {
    let temp_path = path.with_extension("tmp");
    let mut file = File::create(&temp_path).context("Failed to create temp file")?;
    file.write_all(contents.as_bytes())
        .context("Failed to write to temp file")?;
    file.flush().context("Failed to flush temp file")?;
    fs::rename(&temp_path, path).context("Failed to move temp file to output")?;
    Ok(())
}

/// EIP-712 domain of the deployed airdrop.
#[derive(Args, Debug, Clone)]
pub struct DomainArgs {
    /// Domain name
    #[arg(long, env = "AIRDROP_NAME", default_value = DEFAULT_NAME)]
    pub name: String,

    /// Domain schema version
    #[arg(long = "domain-version", env = "AIRDROP_VERSION", default_value = DEFAULT_VERSION)]
    pub version: String,

    /// Chain id of the deployment
    #[arg(long, env = "AIRDROP_CHAIN_ID", default_value_t = 1)]
    pub chain_id: u64,

    /// Address of the deployed airdrop instance
    #[arg(long, env = "AIRDROP_CONTRACT")]
    pub verifying_contract: String,
}

impl DomainArgs {
    pub fn domain(&self) -> anyhow::Result<Eip712Domain> {
        let verifying_contract = parse_address(&self.verifying_contract)
            .context("Invalid verifying contract address")?;
        Ok(Eip712Domain {
            name: self.name.clone(),
            version: self.version.clone(),
            chain_id: U256::from(self.chain_id),
            verifying_contract,
        })
    }
}

/// Per-account entry of a tree file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TreeEntry {
    pub amount: String,
    pub leaf: String,
    pub proof: Vec<String>,
}

/// Output of `build-tree`: the root plus every account's proof.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreeFile {
    pub merkle_root: String,
    pub leaf_count: usize,
    pub claims: BTreeMap<String, TreeEntry>,
}

impl TreeFile {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path).context("Failed to read tree file")?;
        let tree: TreeFile =
            serde_json::from_str(&content).context("Failed to parse tree JSON")?;
        if tree.claims.is_empty() {
            anyhow::bail!("Tree file contains no claims");
        }
        Ok(tree)
    }

    /// Finds `account`'s entry, parsing its amount and proof.
    ///
    /// Keys written by `build-tree` are checksummed addresses and are found
    /// directly. Other spellings fall back to a scan over every key.
    pub fn lookup(&self, account: &Address) -> anyhow::Result<Option<(U256, Vec<Hash>)>> {
        let entry = match self.claims.get(&account.to_string()) {
            Some(entry) => Some(entry),
            None => self.scan(account)?,
        };
        let Some(entry) = entry else {
            return Ok(None);
        };

        let amount = parse_amount(&entry.amount)?;
        let proof = entry
            .proof
            .iter()
            .map(|node| parse_hash(node))
            .collect::<anyhow::Result<Vec<Hash>>>()
            .context("Invalid proof node in tree file")?;
        Ok(Some((amount, proof)))
    }

    fn scan(&self, account: &Address) -> anyhow::Result<Option<&TreeEntry>> {
        for (key, entry) in &self.claims {
            let address = parse_address(key)
                .with_context(|| format!("Invalid address key '{}' in tree file", key))?;
            if address == *account {
                return Ok(Some(entry));
            }
        }
        Ok(None)
    }
}

/// Signed claim, ready to be submitted by anyone.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClaimFile {
    pub account: String,
    pub amount: String,
    pub merkle_root: String,
    pub proof: Vec<String>,
    pub digest: String,
    pub signature: String,
    pub v: u8,
    pub r: String,
    pub s: String,
}
