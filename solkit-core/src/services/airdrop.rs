//! Airdrop service - devnet faucet requests

use std::sync::Arc;

use serde::Serialize;
use solana_sdk::pubkey::Pubkey;

use crate::domain::result::Result;
use crate::ports::RpcConnection;
use crate::services::submit::{ConfirmOptions, Submitter};

/// Confirmed airdrop
#[derive(Debug, Clone, Serialize)]
pub struct AirdropReceipt {
    pub signature: String,
    pub lamports: u64,
}

/// Airdrop service
pub struct AirdropService {
    rpc: Arc<dyn RpcConnection>,
    submitter: Submitter,
}

impl AirdropService {
    pub fn new(rpc: Arc<dyn RpcConnection>, confirm: ConfirmOptions) -> Self {
        Self {
            submitter: Submitter::new(Arc::clone(&rpc), confirm),
            rpc,
        }
    }

    /// Request `lamports` for `address` and wait for the credit to confirm
    ///
    /// Faucet refusals (including rate limiting) are returned unchanged.
    pub async fn request(&self, address: &Pubkey, lamports: u64) -> Result<AirdropReceipt> {
        let signature = self.rpc.request_airdrop(address, lamports).await?;
        self.submitter.wait_for_confirmation(&signature).await?;

        Ok(AirdropReceipt {
            signature: signature.to_string(),
            lamports,
        })
    }
}
