//! Solkit Core - Solana devnet toolkit logic
//!
//! This crate follows a hexagonal layout:
//!
//! - **domain**: Key codecs, lamport arithmetic, program layouts, errors
//! - **ports**: The `RpcConnection` trait services depend on
//! - **services**: One service per procedure (drain, airdrop, enroll, ...)
//! - **adapters**: The Solana RPC client and an in-memory ledger

pub mod adapters;
pub mod config;
pub mod domain;
mod log_migrations;
pub mod ports;
pub mod services;

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;

use adapters::SolanaRpcClient;
use config::Config;
use ports::RpcConnection;
use services::*;

// Re-export commonly used types at crate root
pub use domain::result::{Error, Result as CoreResult};
pub use services::{LogEntry, LogEvent, LoggingService};
pub use domain::{Cluster, Commitment, EnrollmentProgram, SubmissionTrack, LAMPORTS_PER_SOL};
pub use solana_sdk::pubkey::Pubkey;
pub use solana_sdk::signature::{Keypair, Signature, Signer};

/// Main context for solkit operations
///
/// Holds the configuration, the cluster connection and every service wired
/// to it.
pub struct SolkitContext {
    pub config: Config,
    pub rpc: Arc<dyn RpcConnection>,
    pub wallet_service: WalletService,
    pub transfer_service: TransferService,
    pub airdrop_service: AirdropService,
    pub enrollment_service: EnrollmentService,
    pub idl_service: IdlService,
    pub balance_service: BalanceService,
}

impl SolkitContext {
    /// Load configuration from `app_dir` and connect to the configured cluster
    pub fn new(app_dir: &Path) -> Result<Self> {
        let config = Config::load(app_dir)?;
        let rpc: Arc<dyn RpcConnection> = Arc::new(SolanaRpcClient::with_timeout(
            &config.rpc_url,
            config.request_timeout,
            config.commitment,
        )?);
        Ok(Self::with_connection(config, rpc))
    }

    /// Wire services to an existing connection
    pub fn with_connection(config: Config, rpc: Arc<dyn RpcConnection>) -> Self {
        let confirm = config.confirm_options();

        let transfer_service = TransferService::new(Arc::clone(&rpc), confirm)
            .with_anchor_max_age(config.anchor_max_age);
        let airdrop_service = AirdropService::new(Arc::clone(&rpc), confirm);
        let enrollment_service = EnrollmentService::new(
            Arc::clone(&rpc),
            confirm,
            config.enrollment,
            config.github.clone(),
            config.track,
        );
        let idl_service = IdlService::new(Arc::clone(&rpc), config.commitment);
        let balance_service = BalanceService::new(Arc::clone(&rpc), config.commitment);

        Self {
            config,
            rpc,
            wallet_service: WalletService::new(),
            transfer_service,
            airdrop_service,
            enrollment_service,
            idl_service,
            balance_service,
        }
    }
}
