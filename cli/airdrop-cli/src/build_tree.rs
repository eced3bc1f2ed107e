use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use airdrop_core::{leaf_hash, Whitelist};
use anyhow::{Context, Result};
use clap::Parser;

use crate::common::{
    hex_encode, parse_address, parse_amount, write_file_atomic, TreeEntry, TreeFile,
};

#[derive(Parser, Debug)]
#[command(name = "build-tree")]
#[command(about = "Build Merkle tree from whitelisted accounts and amounts", long_about = None)]
pub struct Cli {
    /// Input file with one `address,amount` entry per line
    #[arg(short, long)]
    pub input: PathBuf,

    /// Output JSON file with the root and every account's proof
    #[arg(short, long)]
    pub output: PathBuf,
}

/// Reads a whitelist file.
///
/// Each non-empty line is `address,amount`; lines starting with `#` are
/// comments. Amounts are decimal or `0x` hex.
pub fn load_whitelist(path: &Path) -> Result<Whitelist> {
    let file = File::open(path).context("Failed to open input file")?;
    let reader = BufReader::new(file);
    let mut whitelist = Whitelist::new();

    for (line_num, line) in reader.lines().enumerate() {
        let line = line.context("Failed to read line")?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let (addr_str, amount_str) = trimmed.split_once(',').with_context(|| {
            format!(
                "Invalid format at line {}: expected 'address,amount', got '{}'",
                line_num + 1,
                trimmed
            )
        })?;
        let address = parse_address(addr_str)
            .with_context(|| format!("Invalid address at line {}", line_num + 1))?;
        let amount = parse_amount(amount_str)
            .with_context(|| format!("Invalid amount at line {}", line_num + 1))?;
        whitelist
            .insert(address, amount)
            .with_context(|| format!("Rejected entry at line {}", line_num + 1))?;

        if (line_num + 1) % 1_000_000 == 0 {
            println!("Processed {} entries...", line_num + 1);
        }
    }

    if whitelist.is_empty() {
        anyhow::bail!("Whitelist file is empty");
    }

    Ok(whitelist)
}

/// Builds the tree for `whitelist` and collects every account's proof.
pub fn build_tree_file(whitelist: &Whitelist) -> Result<TreeFile> {
    let tree = whitelist.tree().context("Failed to build Merkle tree")?;
    let mut claims = BTreeMap::new();

    for (address, amount) in whitelist.entries() {
        let leaf = leaf_hash(address, amount);
        let proof = tree
            .proof(&leaf)
            .with_context(|| format!("No proof for {}", address))?;
        claims.insert(
            address.to_string(),
            TreeEntry {
                amount: amount.to_string(),
                leaf: hex_encode(leaf),
                proof: proof.iter().map(hex_encode).collect(),
            },
        );
    }

    Ok(TreeFile {
        merkle_root: hex_encode(tree.root()),
        leaf_count: tree.leaf_count(),
        claims,
    })
}

pub fn run(cli: Cli) -> Result<()> {
    println!("Reading whitelist from {:?}...", cli.input);
    let whitelist = load_whitelist(&cli.input)?;
    println!("Total entries: {}", whitelist.len());

    println!("Building Merkle tree...");
    let tree_file = build_tree_file(&whitelist)?;
    log::info!(
        "built tree over {} leaves, root {}",
        tree_file.leaf_count,
        tree_file.merkle_root
    );
    println!("Merkle root: {}", tree_file.merkle_root);

    println!("Writing tree to {:?}...", cli.output);
    let json_output =
        serde_json::to_string_pretty(&tree_file).context("Failed to serialize JSON")?;
    write_file_atomic(&cli.output, &json_output).context("Failed to write tree file")?;

    println!("Done!");
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use airdrop_core::{verify, U256};

    use super::*;
    use crate::common::{parse_hash, validate_merkle_root};

    fn write_input(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_whitelist_skips_comments_and_blanks() {
        let input = write_input(
            "# airdrop round 1\n\
             0x1111111111111111111111111111111111111111,25\n\
             \n\
             0x2222222222222222222222222222222222222222,0x32\n",
        );
        let whitelist = load_whitelist(input.path()).unwrap();
        assert_eq!(whitelist.len(), 2);
        assert_eq!(whitelist.entries()[1].1, U256::from(50u64));
    }

    #[test]
    fn test_load_whitelist_rejects_duplicates() {
        let input = write_input(
            "0x1111111111111111111111111111111111111111,25\n\
             0x1111111111111111111111111111111111111111,30\n",
        );
        assert!(load_whitelist(input.path()).is_err());
    }

    #[test]
    fn test_load_whitelist_rejects_missing_amount() {
        let input = write_input("0x1111111111111111111111111111111111111111\n");
        assert!(load_whitelist(input.path()).is_err());
    }

    #[test]
    fn test_load_whitelist_rejects_empty_file() {
        let input = write_input("# nothing here\n\n");
        assert!(load_whitelist(input.path()).is_err());
    }

    #[test]
    fn test_tree_file_proofs_verify() {
        let input = write_input(
            "0x1111111111111111111111111111111111111111,25\n\
             0x2222222222222222222222222222222222222222,50\n\
             0x3333333333333333333333333333333333333333,75\n",
        );
        let whitelist = load_whitelist(input.path()).unwrap();
        let tree_file = build_tree_file(&whitelist).unwrap();
        let root = validate_merkle_root(&tree_file.merkle_root).unwrap();

        assert_eq!(tree_file.leaf_count, 3);
        for entry in tree_file.claims.values() {
            let leaf = parse_hash(&entry.leaf).unwrap();
            let proof: Vec<_> = entry.proof.iter().map(|p| parse_hash(p).unwrap()).collect();
            assert!(verify(&leaf, &proof, &root));
        }
    }

    #[test]
    fn test_run_writes_tree_file() {
        let input = write_input("0x1111111111111111111111111111111111111111,25\n");
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("tree.json");

        run(Cli {
            input: input.path().to_path_buf(),
            output: output.clone(),
        })
        .unwrap();

        let tree_file = TreeFile::load(&output).unwrap();
        let entry = tree_file.claims.values().next().unwrap();
        // A single entry is its own root.
        assert_eq!(entry.leaf, tree_file.merkle_root);
        assert!(entry.proof.is_empty());
    }
}
