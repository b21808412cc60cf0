//! RPC connection port - access to a Solana cluster

use async_trait::async_trait;
use serde_json::Value as JsonValue;
use solana_sdk::hash::Hash;
use solana_sdk::message::Message;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Signature;
use solana_sdk::transaction::Transaction;

use crate::domain::network::Commitment;
use crate::domain::result::Result;

/// A recent blockhash and the last block height it stays valid for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LatestBlockhash {
    pub blockhash: Hash,
    pub last_valid_block_height: u64,
}

/// Subset of an on-chain account the services care about
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountInfo {
    pub lamports: u64,
    pub owner: Pubkey,
    pub data: Vec<u8>,
    pub executable: bool,
}

/// Status of a submitted signature
#[derive(Debug, Clone, PartialEq)]
pub struct SignatureStatus {
    pub slot: u64,
    /// Execution error reported by the node; `None` means success
    pub err: Option<JsonValue>,
    /// `None` once the transaction is rooted on older nodes
    pub confirmation_status: Option<Commitment>,
}

impl SignatureStatus {
    /// Whether the status has reached at least `commitment`
    pub fn satisfies(&self, commitment: Commitment) -> bool {
        match self.confirmation_status {
            Some(status) => status >= commitment,
            None => true,
        }
    }
}

/// Options for `sendTransaction`
#[derive(Debug, Clone, Copy)]
pub struct SendOptions {
    pub skip_preflight: bool,
    pub preflight_commitment: Commitment,
}

impl Default for SendOptions {
    fn default() -> Self {
        Self {
            skip_preflight: false,
            preflight_commitment: Commitment::Confirmed,
        }
    }
}

/// Connection to a Solana cluster
///
/// Each method maps to one JSON-RPC call. Implementations never retry;
/// callers decide what a failure means.
#[async_trait]
pub trait RpcConnection: Send + Sync {
    /// Endpoint description, used in logs and explorer hints
    fn endpoint(&self) -> &str;

    /// Balance in lamports
    async fn get_balance(&self, address: &Pubkey, commitment: Commitment) -> Result<u64>;

    /// Fresh blockhash to anchor a transaction
    async fn get_latest_blockhash(&self, commitment: Commitment) -> Result<LatestBlockhash>;

    /// Fee the cluster would charge for `message`
    ///
    /// `None` when the node cannot price it (e.g. the blockhash expired).
    async fn get_fee_for_message(
        &self,
        message: &Message,
        commitment: Commitment,
    ) -> Result<Option<u64>>;

    /// Account contents, `None` when the account does not exist
    async fn get_account_info(
        &self,
        address: &Pubkey,
        commitment: Commitment,
    ) -> Result<Option<AccountInfo>>;

    /// Minimum balance making an account of `data_len` bytes rent exempt
    async fn get_minimum_balance_for_rent_exemption(&self, data_len: usize) -> Result<u64>;

    /// Submit a signed transaction
    async fn send_transaction(
        &self,
        transaction: &Transaction,
        options: SendOptions,
    ) -> Result<Signature>;

    /// Current status of `signature`, `None` if the node has not seen it
    async fn get_signature_status(&self, signature: &Signature) -> Result<Option<SignatureStatus>>;

    /// Ask the faucet for `lamports`
    async fn request_airdrop(&self, address: &Pubkey, lamports: u64) -> Result<Signature>;
}
