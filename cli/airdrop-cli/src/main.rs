#![forbid(unsafe_code)]

use airdrop_cli::{build_tree, claim, digest, verify};
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "airdrop")]
#[command(about = "Merkle airdrop tools: build trees, sign and check claims", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    BuildTree(build_tree::Cli),
    Digest(digest::Cli),
    Claim(claim::Cli),
    Verify(verify::Cli),
}

fn main() -> anyhow::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let cli = Cli::parse();

    match cli.command {
        Commands::BuildTree(args) => build_tree::run(args)?,
        Commands::Digest(args) => digest::run(&args)?,
        Commands::Claim(args) => claim::run(args)?,
        Commands::Verify(args) => verify::run(args)?,
    }

    Ok(())
}
