use std::path::PathBuf;

use airdrop_core::{address_of, sign_digest, ClaimAuthorizer, Hash, Signature, U256};
use anyhow::{Context, Result};
use clap::Parser;
use k256::ecdsa::SigningKey;
use zeroize::Zeroize;

use crate::common::{
    hex_encode, validate_merkle_root, write_file_atomic, ClaimFile, DomainArgs, TreeFile,
};

#[derive(Parser, Debug)]
#[command(name = "claim")]
#[command(about = "Sign an airdrop claim for submission by any relayer", long_about = None)]
pub struct Cli {
    /// Path to the tree file written by build-tree
    #[arg(short = 't', long)]
    pub tree: PathBuf,

    /// Private key (hex format, with or without 0x prefix)
    /// Alternatively, use "-" to read from stdin (more secure)
    #[arg(short = 'k', long)]
    pub private_key: String,

    /// Output JSON file
    #[arg(short, long)]
    pub output: PathBuf,

    #[command(flatten)]
    pub domain: DomainArgs,
}

/// Parses a 32-byte secp256k1 private key, wiping intermediate buffers.
pub fn parse_private_key(key_str: &str) -> Result<SigningKey> {
    let key_str = key_str.trim();
    let key_str = key_str.strip_prefix("0x").unwrap_or(key_str);
    if key_str.is_empty() {
        anyhow::bail!("Private key is empty");
    }
    let mut key_bytes = hex::decode(key_str).context("Invalid private key format")?;
    if key_bytes.len() != 32 {
        let len = key_bytes.len();
        key_bytes.zeroize();
        anyhow::bail!(
            "Invalid private key length: expected 32 bytes, got {}",
            len
        );
    }
    let signing_key = SigningKey::from_slice(&key_bytes).context("Invalid private key");
    key_bytes.zeroize();
    signing_key
}

fn read_private_key(arg: &str) -> Result<SigningKey> {
    if arg != "-" {
        return parse_private_key(arg);
    }
    let mut buffer = String::new();
    std::io::stdin()
        .read_line(&mut buffer)
        .context("Failed to read private key from stdin")?;
    let signing_key = parse_private_key(&buffer);
    buffer.zeroize();
    signing_key
}

/// Builds the signed claim for `signing_key`'s account.
pub fn build_claim(
    tree: &TreeFile,
    signing_key: &SigningKey,
    authorizer: &ClaimAuthorizer,
) -> Result<ClaimFile> {
    let account = address_of(signing_key.verifying_key());
    let (amount, proof): (U256, Vec<Hash>) = tree
        .lookup(&account)?
        .with_context(|| format!("Address {} not found in tree", account))?;

    let digest = authorizer.digest(&account, &amount);
    let signature: Signature =
        sign_digest(signing_key, &digest).context("Failed to sign claim digest")?;

    Ok(ClaimFile {
        account: account.to_string(),
        amount: amount.to_string(),
        merkle_root: tree.merkle_root.clone(),
        proof: proof.iter().map(hex_encode).collect(),
        digest: hex_encode(digest),
        signature: signature.to_string(),
        v: signature.v,
        r: hex_encode(signature.r),
        s: hex_encode(signature.s),
    })
}

pub fn run(cli: Cli) -> Result<()> {
    println!("Loading Merkle tree...");
    let tree = TreeFile::load(&cli.tree).context("Failed to load Merkle tree")?;
    validate_merkle_root(&tree.merkle_root).context("Invalid Merkle root")?;

    let domain = cli.domain.domain()?;
    let authorizer = ClaimAuthorizer::new(domain);

    println!("Parsing private key...");
    let signing_key = read_private_key(&cli.private_key)?;

    println!("Signing claim...");
    let claim = build_claim(&tree, &signing_key, &authorizer)?;
    log::info!("signed claim for {} ({})", claim.account, claim.amount);

    println!("Writing claim JSON to {:?}...", cli.output);
    let json_output = serde_json::to_string_pretty(&claim).context("Failed to serialize JSON")?;
    write_file_atomic(&cli.output, &json_output).context("Failed to write claim file")?;

    println!("\nClaim generated successfully!");
    println!("Account: {}", claim.account);
    println!("Amount: {}", claim.amount);
    println!("Digest: {}", claim.digest);
    println!("Proof length: {} nodes", claim.proof.len());

    Ok(())
}
