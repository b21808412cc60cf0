//! Transfer commands - fixed-amount transfer and full-balance drain

use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{Context, Result};
use colored::Colorize;
use solkit_core::{LogEvent, LoggingService, Pubkey, Signer, SolkitContext};

use super::{get_context, load_wallet, log_event};
use crate::output;

fn destination(ctx: &SolkitContext, to: Option<String>) -> Result<Pubkey> {
    match to {
        Some(text) => Pubkey::from_str(text.trim())
            .with_context(|| format!("'{}' is not a valid address", text)),
        None => Ok(ctx.config.transfer_destination),
    }
}

/// Send the configured amount from the dev wallet
pub async fn run_transfer(
    wallet: Option<PathBuf>,
    to: Option<String>,
    lamports: Option<u64>,
    json: bool,
    logger: Option<&LoggingService>,
) -> Result<()> {
    let ctx = get_context()?;
    let keypair = load_wallet(&ctx, &wallet.unwrap_or_else(|| ctx.config.dev_wallet.clone()))?;
    let to = destination(&ctx, to)?;
    let lamports = lamports.unwrap_or(ctx.config.transfer_lamports);

    let spinner = output::spinner(
        &format!("Sending {} to {}", output::format_lamports(lamports), to),
        json,
    );
    let result = ctx.transfer_service.transfer(&keypair, &to, lamports).await;
    spinner.finish_and_clear();
    let receipt = result?;

    log_event(
        logger,
        LogEvent::new("transfer_completed")
            .with_command("transfer")
            .with_cluster(ctx.config.cluster().as_str())
            .with_address(keypair.pubkey().to_string())
            .with_signature(&receipt.signature)
            .with_lamports(receipt.amount),
    );

    if json {
        println!("{}", serde_json::to_string_pretty(&receipt)?);
        return Ok(());
    }

    output::success(&format!(
        "Sent {} to {}",
        output::format_lamports(receipt.amount),
        to
    ));
    println!("  Fee: {} lamports", receipt.fee);
    output::signature(ctx.config.cluster(), &receipt.signature);
    Ok(())
}

/// Move the whole dev wallet balance, net of the exact fee
pub async fn run_drain(
    wallet: Option<PathBuf>,
    to: Option<String>,
    json: bool,
    logger: Option<&LoggingService>,
) -> Result<()> {
    let ctx = get_context()?;
    let keypair = load_wallet(&ctx, &wallet.unwrap_or_else(|| ctx.config.dev_wallet.clone()))?;
    let to = destination(&ctx, to)?;

    let spinner = output::spinner(&format!("Draining {} into {}", keypair.pubkey(), to), json);
    let result = ctx.transfer_service.drain(&keypair, &to).await;
    spinner.finish_and_clear();
    let receipt = result?;

    log_event(
        logger,
        LogEvent::new("drain_completed")
            .with_command("drain")
            .with_cluster(ctx.config.cluster().as_str())
            .with_address(keypair.pubkey().to_string())
            .with_signature(&receipt.signature)
            .with_lamports(receipt.amount),
    );

    if json {
        println!("{}", serde_json::to_string_pretty(&receipt)?);
        return Ok(());
    }

    output::success(&format!("Drained {} into {}", keypair.pubkey(), to));

    let mut table = output::create_table();
    table.set_header(vec!["", "Lamports"]);
    table.add_row(vec!["Balance".to_string(), receipt.balance.to_string()]);
    table.add_row(vec!["Fee".to_string(), receipt.fee.to_string()]);
    table.add_row(vec!["Sent".to_string(), receipt.amount.to_string().bold().to_string()]);
    table.add_row(vec!["Remaining".to_string(), receipt.remaining().to_string()]);
    println!("{}", table);

    output::signature(ctx.config.cluster(), &receipt.signature);
    Ok(())
}
