//! Enrollment commands - enroll, update the GitHub handle, show addresses

use std::path::PathBuf;

use anyhow::Result;
use colored::Colorize;
use solkit_core::domain::idl::idl_address;
use solkit_core::services::EnrollmentStatus;
use solkit_core::{LogEvent, LoggingService, Signer};

use super::{get_context, load_wallet, log_event};
use crate::output;

/// Initialize the enrollment account if needed, then submit the configured track
pub async fn run_enroll(
    wallet: Option<PathBuf>,
    json: bool,
    logger: Option<&LoggingService>,
) -> Result<()> {
    let ctx = get_context()?;
    let path = wallet.unwrap_or_else(|| ctx.config.enrollment_wallet.clone());
    let user = load_wallet(&ctx, &path)?;
    let cluster = ctx.config.cluster();

    let spinner = output::spinner("Checking enrollment account", json);
    let status = ctx.enrollment_service.ensure_enrolled(&user).await;
    spinner.finish_and_clear();
    let status = status?;

    let event = match &status {
        EnrollmentStatus::Created { signature } => LogEvent::new("enrollment_initialized")
            .with_signature(signature),
        EnrollmentStatus::AlreadyEnrolled => LogEvent::new("enrollment_skipped"),
    };
    log_event(
        logger,
        event
            .with_command("enroll")
            .with_cluster(cluster.as_str())
            .with_address(user.pubkey().to_string()),
    );

    if !json {
        match &status {
            EnrollmentStatus::Created { signature } => {
                output::success("Enrollment account created");
                output::signature(cluster, signature);
            }
            EnrollmentStatus::AlreadyEnrolled => {
                output::info("Already enrolled, skipping initialize");
            }
        }
    }

    let spinner = output::spinner(
        &format!("Submitting {} track", ctx.config.track.instruction_name()),
        json,
    );
    let submission = ctx.enrollment_service.submit(&user).await;
    spinner.finish_and_clear();
    let submission = submission?;

    log_event(
        logger,
        LogEvent::new("enrollment_submitted")
            .with_command("enroll")
            .with_cluster(cluster.as_str())
            .with_address(user.pubkey().to_string())
            .with_signature(&submission.signature),
    );

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({
                "account": ctx.enrollment_service.enrollment_address(&user.pubkey()).to_string(),
                "enrollment": status,
                "submission": submission,
            }))?
        );
        return Ok(());
    }

    output::success("Submission confirmed");
    println!("  Mint: {}", submission.mint.bold());
    output::signature(cluster, &submission.signature);
    Ok(())
}

/// Rewrite the GitHub handle on an existing enrollment
pub async fn run_update_github(
    wallet: Option<PathBuf>,
    json: bool,
    logger: Option<&LoggingService>,
) -> Result<()> {
    let ctx = get_context()?;
    let path = wallet.unwrap_or_else(|| ctx.config.enrollment_wallet.clone());
    let user = load_wallet(&ctx, &path)?;

    let spinner = output::spinner("Updating GitHub handle", json);
    let result = ctx.enrollment_service.update_github(&user).await;
    spinner.finish_and_clear();
    let signature = result?;

    log_event(
        logger,
        LogEvent::new("enrollment_updated")
            .with_command("update-github")
            .with_cluster(ctx.config.cluster().as_str())
            .with_address(user.pubkey().to_string())
            .with_signature(&signature),
    );

    if json {
        println!(
            "{}",
            serde_json::json!({"github": ctx.config.github, "signature": signature})
        );
        return Ok(());
    }

    output::success(&format!("GitHub handle set to '{}'", ctx.config.github));
    output::signature(ctx.config.cluster(), &signature);
    Ok(())
}

/// Show the program-derived addresses the enrollment flow uses
pub fn run_addresses(wallet: Option<PathBuf>, json: bool) -> Result<()> {
    let ctx = get_context()?;
    let path = wallet.unwrap_or_else(|| ctx.config.enrollment_wallet.clone());
    let user = load_wallet(&ctx, &path)?.pubkey();

    let program = ctx.enrollment_service.program();
    let (account, account_bump) = program.enrollment_address(&user);
    let (authority, authority_bump) = program.collection_authority();
    let idl = idl_address(&ctx.config.idl_program)?;

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({
                "user": user.to_string(),
                "program": program.program_id.to_string(),
                "enrollment": {"address": account.to_string(), "bump": account_bump},
                "collectionAuthority": {"address": authority.to_string(), "bump": authority_bump},
                "idl": idl.to_string(),
            }))?
        );
        return Ok(());
    }

    let mut table = output::create_table();
    table.set_header(vec!["Name", "Address", "Bump"]);
    table.add_row(vec!["User".to_string(), user.to_string(), String::new()]);
    table.add_row(vec!["Program".to_string(), program.program_id.to_string(), String::new()]);
    table.add_row(vec!["Enrollment".to_string(), account.to_string(), account_bump.to_string()]);
    table.add_row(vec![
        "Collection authority".to_string(),
        authority.to_string(),
        authority_bump.to_string(),
    ]);
    table.add_row(vec!["IDL account".to_string(), idl.to_string(), String::new()]);
    println!("{}", table);
    Ok(())
}
