//! Cluster connection backed by the Solana RPC client
//!
//! Wraps the nonblocking `RpcClient` from `solana-client` and translates its
//! errors into domain errors. Node-side errors keep their `data` payload
//! (preflight logs, health hints) as error details.

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::{json, Value as JsonValue};
use solana_client::client_error::{ClientError, ClientErrorKind};
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_client::rpc_config::RpcSendTransactionConfig;
use solana_client::rpc_request::{RpcError, RpcResponseErrorData};
use solana_sdk::commitment_config::{CommitmentConfig, CommitmentLevel};
use solana_sdk::message::Message;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Signature;
use solana_sdk::transaction::Transaction;
use url::Url;

use crate::domain::network::Commitment;
use crate::domain::result::{Error, Result};
use crate::ports::{AccountInfo, LatestBlockhash, RpcConnection, SendOptions, SignatureStatus};

/// Public devnet endpoint
pub const DEVNET_URL: &str = "https://api.devnet.solana.com";

/// Default HTTP timeout per request
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

fn commitment_level(commitment: Commitment) -> CommitmentLevel {
    match commitment {
        Commitment::Processed => CommitmentLevel::Processed,
        Commitment::Confirmed => CommitmentLevel::Confirmed,
        Commitment::Finalized => CommitmentLevel::Finalized,
    }
}

fn commitment_config(commitment: Commitment) -> CommitmentConfig {
    CommitmentConfig {
        commitment: commitment_level(commitment),
    }
}

/// Connection to a cluster over JSON-RPC
pub struct SolanaRpcClient {
    client: RpcClient,
    url: String,
}

impl SolanaRpcClient {
    /// Connect to `url` with the default timeout and confirmed commitment
    pub fn new(url: &str) -> Result<Self> {
        Self::with_timeout(url, DEFAULT_TIMEOUT, Commitment::Confirmed)
    }

    /// Connect with a per-request timeout
    ///
    /// `commitment` is the client default, used by calls that take no
    /// explicit commitment (fee quotes, airdrops).
    pub fn with_timeout(url: &str, timeout: Duration, commitment: Commitment) -> Result<Self> {
        let parsed = Url::parse(url)
            .map_err(|e| Error::Config(format!("invalid RPC URL '{}': {}", url, e)))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(Error::Config(format!(
                "RPC URL must be http or https, got '{}'",
                parsed.scheme()
            )));
        }

        Ok(Self::from_client(RpcClient::new_with_timeout_and_commitment(
            url.to_string(),
            timeout,
            commitment_config(commitment),
        )))
    }

    /// Use an already configured client
    pub fn from_client(client: RpcClient) -> Self {
        let url = client.url();
        Self { client, url }
    }
}

/// Server-provided payload of a node-side error
#[allow(unreachable_patterns)]
fn response_error_details(data: &RpcResponseErrorData) -> Option<JsonValue> {
    match data {
        RpcResponseErrorData::Empty => None,
        RpcResponseErrorData::SendTransactionPreflightFailure(simulation) => {
            serde_json::to_value(simulation).ok()
        }
        RpcResponseErrorData::NodeUnhealthy { num_slots_behind } => {
            Some(json!({ "numSlotsBehind": num_slots_behind }))
        }
        _ => None,
    }
}

/// Map a client error for a read call
///
/// Everything, including HTTP 429 and node-side errors, becomes `Network`.
fn map_client_error(method: &str, error: ClientError) -> Error {
    match error.kind() {
        ClientErrorKind::RpcError(RpcError::RpcResponseError {
            code,
            message,
            data,
        }) => Error::Network {
            message: format!("{} failed: {} (code {})", method, message, code),
            details: response_error_details(data),
        },
        ClientErrorKind::Reqwest(e) if e.status().map(|s| s.as_u16()) == Some(429) => {
            Error::network(format!(
                "{}: rate limit exceeded. Wait a moment and try again.",
                method
            ))
        }
        ClientErrorKind::Reqwest(e) if e.is_timeout() => {
            Error::network(format!("{} timed out", method))
        }
        ClientErrorKind::Reqwest(e) if e.is_connect() => {
            Error::network(format!("{}: unable to connect", method))
        }
        _ => Error::network(format!("{} failed: {}", method, error)),
    }
}

/// Map a `sendTransaction` error: node rejections are `Submission`
fn map_send_error(error: ClientError) -> Error {
    match error.kind() {
        ClientErrorKind::RpcError(RpcError::RpcResponseError { message, data, .. }) => {
            Error::Submission {
                message: message.clone(),
                details: response_error_details(data),
            }
        }
        _ => map_client_error("sendTransaction", error),
    }
}

/// Map a `getFeeForMessage` error
///
/// A null fee (stale blockhash) is reported by the client as a custom error
/// and becomes `Ok(None)`; anything else is `FeeUnavailable`.
fn map_fee_error(error: ClientError) -> Result<Option<u64>> {
    match error.kind() {
        ClientErrorKind::Custom(_) => Ok(None),
        ClientErrorKind::RpcError(RpcError::RpcResponseError { code, message, .. }) => Err(
            Error::FeeUnavailable(format!("{} (code {})", message, code)),
        ),
        _ => Err(Error::FeeUnavailable(error.to_string())),
    }
}

/// Convert a client-side status enum to our `Commitment` via its wire name
fn confirmation_level<T: Serialize>(status: &T) -> Result<Commitment> {
    Ok(serde_json::from_value(serde_json::to_value(status)?)?)
}

#[async_trait]
impl RpcConnection for SolanaRpcClient {
    fn endpoint(&self) -> &str {
        &self.url
    }

    async fn get_balance(&self, address: &Pubkey, commitment: Commitment) -> Result<u64> {
        self.client
            .get_balance_with_commitment(address, commitment_config(commitment))
            .await
            .map(|response| response.value)
            .map_err(|e| map_client_error("getBalance", e))
    }

    async fn get_latest_blockhash(&self, commitment: Commitment) -> Result<LatestBlockhash> {
        let (blockhash, last_valid_block_height) = self
            .client
            .get_latest_blockhash_with_commitment(commitment_config(commitment))
            .await
            .map_err(|e| map_client_error("getLatestBlockhash", e))?;
        Ok(LatestBlockhash {
            blockhash,
            last_valid_block_height,
        })
    }

    /// The quote uses the client's default commitment
    async fn get_fee_for_message(
        &self,
        message: &Message,
        _commitment: Commitment,
    ) -> Result<Option<u64>> {
        match self.client.get_fee_for_message(message).await {
            Ok(fee) => Ok(Some(fee)),
            Err(e) => map_fee_error(e),
        }
    }

    async fn get_account_info(
        &self,
        address: &Pubkey,
        commitment: Commitment,
    ) -> Result<Option<AccountInfo>> {
        let account = self
            .client
            .get_account_with_commitment(address, commitment_config(commitment))
            .await
            .map_err(|e| map_client_error("getAccountInfo", e))?
            .value;

        Ok(account.map(|account| AccountInfo {
            lamports: account.lamports,
            owner: account.owner,
            data: account.data,
            executable: account.executable,
        }))
    }

    async fn get_minimum_balance_for_rent_exemption(&self, data_len: usize) -> Result<u64> {
        self.client
            .get_minimum_balance_for_rent_exemption(data_len)
            .await
            .map_err(|e| map_client_error("getMinimumBalanceForRentExemption", e))
    }

    async fn send_transaction(
        &self,
        transaction: &Transaction,
        options: SendOptions,
    ) -> Result<Signature> {
        let config = RpcSendTransactionConfig {
            skip_preflight: options.skip_preflight,
            preflight_commitment: Some(commitment_level(options.preflight_commitment)),
            ..RpcSendTransactionConfig::default()
        };
        self.client
            .send_transaction_with_config(transaction, config)
            .await
            .map_err(map_send_error)
    }

    async fn get_signature_status(&self, signature: &Signature) -> Result<Option<SignatureStatus>> {
        let statuses = self
            .client
            .get_signature_statuses(&[*signature])
            .await
            .map_err(|e| map_client_error("getSignatureStatuses", e))?
            .value;

        let Some(status) = statuses.into_iter().next().flatten() else {
            return Ok(None);
        };

        let err = match &status.err {
            Some(e) => Some(serde_json::to_value(e)?),
            None => None,
        };
        let confirmation_status = match &status.confirmation_status {
            Some(level) => Some(confirmation_level(level)?),
            None => None,
        };

        Ok(Some(SignatureStatus {
            slot: status.slot,
            err,
            confirmation_status,
        }))
    }

    async fn request_airdrop(&self, address: &Pubkey, lamports: u64) -> Result<Signature> {
        self.client
            .request_airdrop(address, lamports)
            .await
            .map_err(|e| map_client_error("requestAirdrop", e))
    }
}
