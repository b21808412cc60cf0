//! Airdrop command - request devnet SOL for a wallet

use std::path::PathBuf;

use anyhow::Result;
use solkit_core::{LogEvent, LoggingService, Signer};

use super::{get_context, load_wallet, log_event};
use crate::output;

pub async fn run(
    wallet: Option<PathBuf>,
    lamports: Option<u64>,
    json: bool,
    logger: Option<&LoggingService>,
) -> Result<()> {
    let ctx = get_context()?;
    let path = wallet.unwrap_or_else(|| ctx.config.dev_wallet.clone());
    let keypair = load_wallet(&ctx, &path)?;
    let address = keypair.pubkey();
    let lamports = lamports.unwrap_or(ctx.config.airdrop_lamports);

    let spinner = output::spinner(
        &format!("Requesting {} for {}", output::format_lamports(lamports), address),
        json,
    );
    let result = ctx.airdrop_service.request(&address, lamports).await;
    spinner.finish_and_clear();
    let receipt = result?;

    log_event(
        logger,
        LogEvent::new("airdrop_confirmed")
            .with_command("airdrop")
            .with_cluster(ctx.config.cluster().as_str())
            .with_address(address.to_string())
            .with_signature(&receipt.signature)
            .with_lamports(receipt.lamports),
    );

    if json {
        println!("{}", serde_json::to_string_pretty(&receipt)?);
        return Ok(());
    }

    output::success(&format!(
        "Airdropped {} to {}",
        output::format_lamports(receipt.lamports),
        address
    ));
    output::signature(ctx.config.cluster(), &receipt.signature);
    Ok(())
}
