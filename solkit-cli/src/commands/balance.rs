//! Balance command - show an account balance

use std::str::FromStr;

use anyhow::{Context, Result};
use colored::Colorize;
use solkit_core::{Pubkey, Signer};

use super::{get_context, load_wallet};
use crate::output;

pub async fn run(address: Option<String>, json: bool) -> Result<()> {
    let ctx = get_context()?;
    let address = match address {
        Some(text) => Pubkey::from_str(text.trim())
            .with_context(|| format!("'{}' is not a valid address", text))?,
        None => load_wallet(&ctx, &ctx.config.dev_wallet)?.pubkey(),
    };

    let report = ctx.balance_service.report(&address).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("{}", "Account Balance".bold());
    println!();

    let mut table = output::create_table();
    table.add_row(vec!["Address", &report.address]);
    table.add_row(vec!["Cluster", ctx.config.cluster().as_str()]);
    table.add_row(vec!["Balance", &output::format_lamports(report.lamports)]);
    table.add_row(vec![
        "Rent-exempt minimum",
        &format!("{} lamports", report.rent_exempt_minimum),
    ]);
    println!("{}", table);

    if report.lamports == 0 {
        println!();
        output::warning("Empty account. Run 'solkit airdrop' to fund it.");
    }
    Ok(())
}
