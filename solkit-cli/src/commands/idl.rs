//! IDL command - fetch a program's on-chain IDL to a JSON file

use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{Context, Result};
use colored::Colorize;
use solkit_core::services::IdlService;
use solkit_core::{LogEvent, LoggingService, Pubkey};

use super::{get_context, log_event};
use crate::output;

pub async fn run(
    program: Option<String>,
    out_dir: Option<PathBuf>,
    json: bool,
    logger: Option<&LoggingService>,
) -> Result<()> {
    let ctx = get_context()?;
    let program_id = match program {
        Some(text) => Pubkey::from_str(text.trim())
            .with_context(|| format!("'{}' is not a valid program id", text))?,
        None => ctx.config.idl_program,
    };
    let cluster = ctx.config.cluster();

    let fetched = match ctx.idl_service.fetch(&program_id).await {
        Ok(f) => f,
        Err(e) => {
            if !json {
                eprintln!(
                    "{} {}",
                    "Alternatively, run:".dimmed(),
                    IdlService::alternative_command(&program_id, cluster)
                );
            }
            return Err(e.into());
        }
    };

    let dir = out_dir.unwrap_or_else(|| ctx.config.idl_output_dir.clone());
    let path = ctx
        .idl_service
        .save(&fetched.idl, &dir, &ctx.config.idl_file_name)?;

    log_event(
        logger,
        LogEvent::new("idl_saved")
            .with_command("fetch-idl")
            .with_cluster(cluster.as_str())
            .with_address(program_id.to_string()),
    );

    if json {
        println!(
            "{}",
            serde_json::json!({
                "program": program_id.to_string(),
                "account": fetched.address.to_string(),
                "authority": fetched.authority.to_string(),
                "path": path.to_string_lossy(),
            })
        );
        return Ok(());
    }

    output::success(&format!("IDL saved to {}", path.display()));
    println!("  Program:   {}", program_id);
    println!("  Account:   {}", fetched.address);
    println!("  Authority: {}", fetched.authority);
    Ok(())
}
