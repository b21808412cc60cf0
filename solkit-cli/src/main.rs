//! Solkit CLI - Solana devnet toolkit

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;
mod output;

use commands::{airdrop, balance, enroll, idl, keys, logs, transfer};
use solkit_core::{Error, LoggingService};

/// Solkit - keys, airdrops, transfers and enrollment on Solana devnet
#[derive(Parser)]
#[command(name = "solkit", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a new keypair and save it as a wallet file
    Keygen {
        /// Wallet file to write (default: the configured dev wallet)
        #[arg(short, long)]
        out: Option<PathBuf>,
        /// Replace an existing wallet file
        #[arg(long)]
        force: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Convert a base58 private key to wallet bytes
    Base58ToWallet {
        /// Base58 private key (read from stdin if omitted)
        value: Option<String>,
        /// Write a wallet file instead of printing the bytes
        #[arg(short, long)]
        out: Option<PathBuf>,
        /// Replace an existing wallet file
        #[arg(long)]
        force: bool,
    },

    /// Convert wallet bytes to a base58 private key
    WalletToBase58 {
        /// Byte array such as [1,2,...] (read from stdin if omitted)
        value: Option<String>,
        /// Read the bytes from a wallet file
        #[arg(short, long, conflicts_with = "value")]
        wallet: Option<PathBuf>,
    },

    /// Request a devnet airdrop
    Airdrop {
        /// Wallet to fund (default: the configured dev wallet)
        #[arg(short, long)]
        wallet: Option<PathBuf>,
        /// Amount in lamports (default: from settings)
        #[arg(long)]
        lamports: Option<u64>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Send a fixed amount from the dev wallet
    Transfer {
        /// Sending wallet (default: the configured dev wallet)
        #[arg(short, long)]
        wallet: Option<PathBuf>,
        /// Destination address (default: from settings)
        #[arg(long)]
        to: Option<String>,
        /// Amount in lamports (default: from settings)
        #[arg(long)]
        lamports: Option<u64>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Send the entire dev wallet balance, net of the fee
    Drain {
        /// Sending wallet (default: the configured dev wallet)
        #[arg(short, long)]
        wallet: Option<PathBuf>,
        /// Destination address (default: from settings)
        #[arg(long)]
        to: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show an account balance
    Balance {
        /// Address to query (default: the dev wallet)
        address: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Enroll (once) and submit the configured track
    Enroll {
        /// Enrollment wallet (default: from settings)
        #[arg(short, long)]
        wallet: Option<PathBuf>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Update the GitHub handle on an existing enrollment
    UpdateGithub {
        /// Enrollment wallet (default: from settings)
        #[arg(short, long)]
        wallet: Option<PathBuf>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the program-derived addresses used by enrollment
    Addresses {
        /// Enrollment wallet (default: from settings)
        #[arg(short, long)]
        wallet: Option<PathBuf>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Fetch a program's on-chain IDL to a JSON file
    FetchIdl {
        /// Program id (default: from settings)
        #[arg(long)]
        program: Option<String>,
        /// Output directory (default: from settings)
        #[arg(long)]
        out_dir: Option<PathBuf>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// View and manage the event log
    Logs {
        #[command(subcommand)]
        command: logs::LogsCommands,
    },
}

impl Commands {
    fn name(&self) -> &'static str {
        match self {
            Commands::Keygen { .. } => "keygen",
            Commands::Base58ToWallet { .. } => "base58-to-wallet",
            Commands::WalletToBase58 { .. } => "wallet-to-base58",
            Commands::Airdrop { .. } => "airdrop",
            Commands::Transfer { .. } => "transfer",
            Commands::Drain { .. } => "drain",
            Commands::Balance { .. } => "balance",
            Commands::Enroll { .. } => "enroll",
            Commands::UpdateGithub { .. } => "update-github",
            Commands::Addresses { .. } => "addresses",
            Commands::FetchIdl { .. } => "fetch-idl",
            Commands::Logs { .. } => "logs",
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let name = cli.command.name();

    let logger = commands::get_logger();
    if let Some(l) = &logger {
        let _ = l.log_command(name);
    }

    match run(cli, logger.as_ref()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            report_failure(name, &e, logger.as_ref());
            ExitCode::FAILURE
        }
    }
}

/// Print the error, with server-provided details when present, and log it
fn report_failure(command: &str, err: &anyhow::Error, logger: Option<&LoggingService>) {
    let message = format!("{:#}", err);
    output::error(&message);

    let details = err.downcast_ref::<Error>().and_then(Error::details);
    if let Some(d) = details {
        output::error_details(d);
    }

    if let Some(l) = logger {
        let details = details.map(|d| d.to_string());
        let _ = l.log_error(command, &message, details.as_deref());
    }
}

async fn run(cli: Cli, logger: Option<&LoggingService>) -> Result<()> {
    match cli.command {
        Commands::Keygen { out, force, json } => keys::run_keygen(out, force, json, logger),
        Commands::Base58ToWallet { value, out, force } => {
            keys::run_base58_to_wallet(value, out, force)
        }
        Commands::WalletToBase58 { value, wallet } => keys::run_wallet_to_base58(value, wallet),
        Commands::Airdrop { wallet, lamports, json } => {
            airdrop::run(wallet, lamports, json, logger).await
        }
        Commands::Transfer { wallet, to, lamports, json } => {
            transfer::run_transfer(wallet, to, lamports, json, logger).await
        }
        Commands::Drain { wallet, to, json } => transfer::run_drain(wallet, to, json, logger).await,
        Commands::Balance { address, json } => balance::run(address, json).await,
        Commands::Enroll { wallet, json } => enroll::run_enroll(wallet, json, logger).await,
        Commands::UpdateGithub { wallet, json } => {
            enroll::run_update_github(wallet, json, logger).await
        }
        Commands::Addresses { wallet, json } => enroll::run_addresses(wallet, json),
        Commands::FetchIdl { program, out_dir, json } => {
            idl::run(program, out_dir, json, logger).await
        }
        Commands::Logs { command } => logs::run(command, logger),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_commands_take_no_required_arguments() {
        for args in [
            vec!["solkit", "drain"],
            vec!["solkit", "enroll"],
            vec!["solkit", "fetch-idl"],
            vec!["solkit", "airdrop", "--json"],
        ] {
            assert!(Cli::try_parse_from(args.clone()).is_ok(), "failed to parse {:?}", args);
        }
    }

    #[test]
    fn test_command_names_match_subcommands() {
        let cli = Cli::try_parse_from(["solkit", "update-github"]).unwrap();
        assert_eq!(cli.command.name(), "update-github");
        let cli = Cli::try_parse_from(["solkit", "logs", "stats"]).unwrap();
        assert_eq!(cli.command.name(), "logs");
    }
}
