//! Configuration management
//!
//! Settings live in `<app dir>/settings.json`; every field is optional:
//! ```json
//! {
//!   "rpc": { "url": "https://api.devnet.solana.com", "commitment": "confirmed" },
//!   "wallets": { "dev": "dev-wallet.json", "enrollment": "Turbin3-wallet.json" },
//!   "transfer": { "destination": "Fv6p...", "amountLamports": 100000000 },
//!   "airdrop": { "amountLamports": 2000000000 },
//!   "enrollment": { "github": "octocat", "track": "ts" },
//!   "idl": { "outputDir": "programs", "fileName": "Turbin3_prereq" }
//! }
//! ```
//! `SOLKIT_RPC_URL` and `SOLKIT_COMMITMENT` override the file.

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use solana_sdk::pubkey::Pubkey;
use url::Url;

use crate::adapters::rpc_client::DEVNET_URL;
use crate::domain::enrollment::{EnrollmentProgram, SubmissionTrack};
use crate::domain::network::{Cluster, Commitment};
use crate::domain::LAMPORTS_PER_SOL;
use crate::services::ConfirmOptions;

/// Environment variable overriding the RPC endpoint
pub const RPC_URL_ENV: &str = "SOLKIT_RPC_URL";

/// Environment variable overriding the commitment level
pub const COMMITMENT_ENV: &str = "SOLKIT_COMMITMENT";

const DEFAULT_DESTINATION: &str = "Fv6pfvTxAXECfs81aPNFTqiLvwkSkPUo3D3Zr7NrGfNP";
const DEFAULT_PROGRAM: &str = "TRBZyQHB3m68FGeVsqTK39Wm4xejadjVhP5MAZaKWDM";
const DEFAULT_COLLECTION: &str = "5ebsp5RChCGK7ssRZMVMufgVZhd2kFbNaotcZ5UvytN2";
const DEFAULT_MPL_CORE: &str = "CoREENxT6tW1HoK8ypY1SxRMZTcVPm7R94rH4PZNhX7d";

/// Raw settings.json structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SettingsFile {
    #[serde(default)]
    rpc: RpcSettings,
    #[serde(default)]
    wallets: WalletSettings,
    #[serde(default)]
    transfer: TransferSettings,
    #[serde(default)]
    airdrop: AirdropSettings,
    #[serde(default)]
    enrollment: EnrollmentSettings,
    #[serde(default)]
    idl: IdlSettings,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RpcSettings {
    url: Option<String>,
    commitment: Option<String>,
    request_timeout_secs: Option<u64>,
    confirm_timeout_secs: Option<u64>,
    poll_interval_ms: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WalletSettings {
    dev: Option<PathBuf>,
    enrollment: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TransferSettings {
    destination: Option<String>,
    amount_lamports: Option<u64>,
    anchor_max_age_secs: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AirdropSettings {
    amount_lamports: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EnrollmentSettings {
    program_id: Option<String>,
    collection: Option<String>,
    mpl_core_program: Option<String>,
    github: Option<String>,
    track: Option<SubmissionTrack>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IdlSettings {
    program_id: Option<String>,
    output_dir: Option<PathBuf>,
    file_name: Option<String>,
}

/// Resolved configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub rpc_url: String,
    pub commitment: Commitment,
    pub request_timeout: Duration,
    pub confirm_timeout: Duration,
    pub poll_interval: Duration,
    pub dev_wallet: PathBuf,
    pub enrollment_wallet: PathBuf,
    pub transfer_destination: Pubkey,
    pub transfer_lamports: u64,
    pub anchor_max_age: Duration,
    pub airdrop_lamports: u64,
    pub enrollment: EnrollmentProgram,
    /// Empty until the operator sets `enrollment.github`
    pub github: String,
    pub track: SubmissionTrack,
    pub idl_program: Pubkey,
    pub idl_output_dir: PathBuf,
    pub idl_file_name: String,
}

fn parse_pubkey(field: &str, value: Option<String>, default: &str) -> Result<Pubkey> {
    let text = value.unwrap_or_else(|| default.to_string());
    Pubkey::from_str(text.trim())
        .with_context(|| format!("{} is not a valid address: '{}'", field, text))
}

impl Config {
    /// Load config from the app directory, applying environment overrides
    pub fn load(app_dir: &Path) -> Result<Self> {
        let settings_path = app_dir.join("settings.json");

        let raw: SettingsFile = if settings_path.exists() {
            let content = std::fs::read_to_string(&settings_path)
                .with_context(|| format!("Failed to read {}", settings_path.display()))?;
            serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse {}", settings_path.display()))?
        } else {
            SettingsFile::default()
        };

        Self::resolve(raw, |key| std::env::var(key).ok())
    }

    fn resolve(raw: SettingsFile, env: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let rpc_url = env(RPC_URL_ENV)
            .or(raw.rpc.url)
            .unwrap_or_else(|| DEVNET_URL.to_string());
        Url::parse(&rpc_url).with_context(|| format!("Invalid RPC URL '{}'", rpc_url))?;

        let commitment = match env(COMMITMENT_ENV).or(raw.rpc.commitment) {
            Some(text) => Commitment::from_str(&text)?,
            None => Commitment::default(),
        };

        let program_id = parse_pubkey(
            "enrollment.programId",
            raw.enrollment.program_id,
            DEFAULT_PROGRAM,
        )?;
        let enrollment = EnrollmentProgram {
            program_id,
            collection: parse_pubkey(
                "enrollment.collection",
                raw.enrollment.collection,
                DEFAULT_COLLECTION,
            )?,
            mpl_core_program: parse_pubkey(
                "enrollment.mplCoreProgram",
                raw.enrollment.mpl_core_program,
                DEFAULT_MPL_CORE,
            )?,
        };

        let idl_program = match raw.idl.program_id {
            Some(text) => parse_pubkey("idl.programId", Some(text), DEFAULT_PROGRAM)?,
            None => program_id,
        };

        Ok(Self {
            rpc_url,
            commitment,
            request_timeout: Duration::from_secs(raw.rpc.request_timeout_secs.unwrap_or(30)),
            confirm_timeout: Duration::from_secs(raw.rpc.confirm_timeout_secs.unwrap_or(60)),
            poll_interval: Duration::from_millis(raw.rpc.poll_interval_ms.unwrap_or(500)),
            dev_wallet: raw
                .wallets
                .dev
                .unwrap_or_else(|| PathBuf::from("dev-wallet.json")),
            enrollment_wallet: raw
                .wallets
                .enrollment
                .unwrap_or_else(|| PathBuf::from("Turbin3-wallet.json")),
            transfer_destination: parse_pubkey(
                "transfer.destination",
                raw.transfer.destination,
                DEFAULT_DESTINATION,
            )?,
            transfer_lamports: raw
                .transfer
                .amount_lamports
                .unwrap_or(LAMPORTS_PER_SOL / 10),
            anchor_max_age: Duration::from_secs(raw.transfer.anchor_max_age_secs.unwrap_or(30)),
            airdrop_lamports: raw.airdrop.amount_lamports.unwrap_or(2 * LAMPORTS_PER_SOL),
            enrollment,
            github: raw.enrollment.github.unwrap_or_default().trim().to_string(),
            track: raw.enrollment.track.unwrap_or_default(),
            idl_program,
            idl_output_dir: raw
                .idl
                .output_dir
                .unwrap_or_else(|| PathBuf::from("programs")),
            idl_file_name: raw
                .idl
                .file_name
                .unwrap_or_else(|| "Turbin3_prereq".to_string()),
        })
    }

    /// Confirmation settings for the submitter
    pub fn confirm_options(&self) -> ConfirmOptions {
        ConfirmOptions {
            commitment: self.commitment,
            timeout: self.confirm_timeout,
            poll_interval: self.poll_interval,
        }
    }

    pub fn cluster(&self) -> Cluster {
        Cluster::from_rpc_url(&self.rpc_url)
    }
}
