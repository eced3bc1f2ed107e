use anyhow::{Context, Result};
use clap::Parser;

use airdrop_core::ClaimAuthorizer;

use crate::common::{hex_encode, parse_address, parse_amount, DomainArgs};

#[derive(Parser, Debug)]
#[command(name = "digest")]
#[command(about = "Print the typed-data digest an account signs to claim", long_about = None)]
pub struct Cli {
    /// Claiming account
    #[arg(short, long)]
    pub account: String,

    /// Whitelisted amount (decimal or 0x hex)
    #[arg(short = 'm', long)]
    pub amount: String,

    #[command(flatten)]
    pub domain: DomainArgs,
}

pub fn run(cli: &Cli) -> Result<()> {
    let account = parse_address(&cli.account).context("Invalid account")?;
    let amount = parse_amount(&cli.amount)?;
    let authorizer = ClaimAuthorizer::new(cli.domain.domain()?);

    println!("Domain separator: {}", hex_encode(authorizer.domain_separator()));
    println!("Digest: {}", hex_encode(authorizer.digest(&account, &amount)));
    Ok(())
}
