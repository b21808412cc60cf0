//! Key commands - generate wallets and convert key material

use std::path::PathBuf;

use anyhow::{Context, Result};
use colored::Colorize;
use solkit_core::config::Config;
use solkit_core::domain::keys::{
    decode_base58, encode_base58, format_byte_array, keypair_from_bytes, parse_byte_array,
};
use solkit_core::services::WalletService;
use solkit_core::{LogEvent, LoggingService, Signer};

use super::{get_app_dir, log_event, value_or_prompt};
use crate::output;

fn load_config() -> Result<Config> {
    Config::load(&get_app_dir()?)
}

/// Generate a keypair and write it to `out` (default: the dev wallet)
pub fn run_keygen(
    out: Option<PathBuf>,
    force: bool,
    json: bool,
    logger: Option<&LoggingService>,
) -> Result<()> {
    let path = match out {
        Some(p) => p,
        None => load_config()?.dev_wallet,
    };

    let keypair = WalletService::new().generate(&path, force)?;
    let address = keypair.pubkey().to_string();
    log_event(
        logger,
        LogEvent::new("wallet_generated")
            .with_command("keygen")
            .with_address(&address),
    );

    if json {
        println!(
            "{}",
            serde_json::json!({"address": address, "path": path.to_string_lossy()})
        );
        return Ok(());
    }

    output::success("Generated a new keypair");
    println!("  Address: {}", address.bold());
    println!("  Wallet:  {}", path.display());
    Ok(())
}

/// Convert a base58 secret key (as exported by browser wallets) to wallet bytes
pub fn run_base58_to_wallet(value: Option<String>, out: Option<PathBuf>, force: bool) -> Result<()> {
    let text = value_or_prompt(value, "Private key (base58)")?;
    let bytes = decode_base58(&text)?;
    let keypair = keypair_from_bytes(&bytes)?;

    match out {
        Some(path) => {
            WalletService::new()
                .save(&path, &keypair, force)
                .with_context(|| format!("Failed to write wallet {}", path.display()))?;
            output::success(&format!("Wallet written to {}", path.display()));
            println!("  Address: {}", keypair.pubkey().to_string().bold());
        }
        None => println!("{}", format_byte_array(&bytes)),
    }
    Ok(())
}

/// Convert wallet bytes to a base58 secret key
///
/// Reads the bytes from `wallet` when given, otherwise from `value` or stdin.
pub fn run_wallet_to_base58(value: Option<String>, wallet: Option<PathBuf>) -> Result<()> {
    let bytes = match wallet {
        Some(path) => WalletService::new().load(&path)?.to_bytes().to_vec(),
        None => {
            let text = value_or_prompt(value, "Wallet bytes ([1,2,...])")?;
            let bytes = parse_byte_array(&text)?;
            keypair_from_bytes(&bytes)?;
            bytes
        }
    };

    println!("{}", encode_base58(&bytes)?);
    Ok(())
}
