//! CLI command implementations

pub mod airdrop;
pub mod balance;
pub mod enroll;
pub mod idl;
pub mod keys;
pub mod logs;
pub mod transfer;

use std::io::{self, BufRead};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use dialoguer::Input;
use solkit_core::{Keypair, LogEvent, LoggingService, SolkitContext};

/// Get the solkit directory from environment or default
pub fn get_app_dir() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var("SOLKIT_DIR") {
        return Ok(PathBuf::from(dir));
    }
    dirs::home_dir()
        .map(|home| home.join(".solkit"))
        .context("Could not find home directory; set SOLKIT_DIR")
}

/// Get the logging service for CLI operations
///
/// Returns None if logging fails to initialize (shouldn't block operations)
pub fn get_logger() -> Option<LoggingService> {
    let app_dir = get_app_dir().ok()?;
    LoggingService::new(&app_dir, env!("CARGO_PKG_VERSION")).ok()
}

/// Log an event, ignoring any errors (logging should never break the app)
pub fn log_event(logger: Option<&LoggingService>, event: LogEvent) {
    if let Some(l) = logger {
        let _ = l.log(event);
    }
}

/// Load configuration and connect to the configured cluster
pub fn get_context() -> Result<SolkitContext> {
    let app_dir = get_app_dir()?;
    SolkitContext::new(&app_dir).context("Failed to initialize solkit context")
}

/// Load a wallet file, naming the path on failure
pub fn load_wallet(ctx: &SolkitContext, path: &Path) -> Result<Keypair> {
    ctx.wallet_service
        .load(path)
        .with_context(|| format!("Failed to load wallet {}", path.display()))
}

/// Use `value` if given, otherwise read one line from the user
///
/// Prompts with dialoguer on a terminal and reads a plain line from piped
/// stdin.
pub fn value_or_prompt(value: Option<String>, prompt: &str) -> Result<String> {
    if let Some(v) = value {
        return Ok(v.trim().to_string());
    }

    if atty::isnt(atty::Stream::Stdin) {
        let mut line = String::new();
        io::stdin()
            .lock()
            .read_line(&mut line)
            .context("Failed to read from stdin")?;
        return Ok(line.trim().to_string());
    }

    let line: String = Input::new().with_prompt(prompt).interact_text()?;
    Ok(line.trim().to_string())
}
