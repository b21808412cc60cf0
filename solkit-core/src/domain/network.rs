//! Network selection: commitment levels and clusters

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::domain::result::{Error, Result};

/// How far a transaction must have progressed before we call it done
///
/// Ordered from weakest to strongest so a status can be compared against
/// the level a caller asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Commitment {
    Processed,
    Confirmed,
    Finalized,
}

impl Commitment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Commitment::Processed => "processed",
            Commitment::Confirmed => "confirmed",
            Commitment::Finalized => "finalized",
        }
    }
}

impl Default for Commitment {
    fn default() -> Self {
        Commitment::Confirmed
    }
}

impl fmt::Display for Commitment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Commitment {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "processed" => Ok(Commitment::Processed),
            "confirmed" => Ok(Commitment::Confirmed),
            "finalized" => Ok(Commitment::Finalized),
            other => Err(Error::Config(format!(
                "unknown commitment '{}' (expected processed, confirmed or finalized)",
                other
            ))),
        }
    }
}

/// Solana cluster, used for explorer links and operator hints
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Cluster {
    Devnet,
    Testnet,
    MainnetBeta,
    Localnet,
}

impl Cluster {
    pub fn as_str(&self) -> &'static str {
        match self {
            Cluster::Devnet => "devnet",
            Cluster::Testnet => "testnet",
            Cluster::MainnetBeta => "mainnet-beta",
            Cluster::Localnet => "localnet",
        }
    }

    /// Guess the cluster from an RPC endpoint
    ///
    /// Third-party providers usually carry the cluster name in the host
    /// (e.g. `devnet.helius-rpc.com`); anything unrecognized on a loopback
    /// host is localnet, everything else defaults to devnet.
    pub fn from_rpc_url(rpc_url: &str) -> Cluster {
        let host = Url::parse(rpc_url)
            .ok()
            .and_then(|u| u.host_str().map(|h| h.to_lowercase()))
            .unwrap_or_default();

        if host.contains("devnet") {
            Cluster::Devnet
        } else if host.contains("testnet") {
            Cluster::Testnet
        } else if host.contains("mainnet") {
            Cluster::MainnetBeta
        } else if host == "localhost" || host == "127.0.0.1" {
            Cluster::Localnet
        } else {
            Cluster::Devnet
        }
    }

    /// Explorer link for a transaction signature
    pub fn explorer_tx_url(&self, signature: &str) -> String {
        let base = format!("https://explorer.solana.com/tx/{}", signature);
        let params: Vec<(&str, String)> = match self {
            Cluster::MainnetBeta => vec![],
            Cluster::Localnet => vec![
                ("cluster", "custom".to_string()),
                ("customUrl", "http://localhost:8899".to_string()),
            ],
            other => vec![("cluster", other.as_str().to_string())],
        };

        match Url::parse_with_params(&base, &params) {
            Ok(url) if !params.is_empty() => url.to_string(),
            _ => base,
        }
    }
}

impl fmt::Display for Cluster {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
