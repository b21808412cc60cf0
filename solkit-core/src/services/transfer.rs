//! Transfer service - fixed-amount transfers and fee-exact wallet drains

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use solana_sdk::message::Message;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::{Keypair, Signer};
use solana_system_interface::instruction as system_instruction;
use tokio::time::Instant;

use crate::domain::lamports::{drain_amount, ensure_covers};
use crate::domain::network::Commitment;
use crate::domain::result::{Error, Result};
use crate::ports::{LatestBlockhash, RpcConnection};
use crate::services::submit::{build_signed_transaction, ConfirmOptions, Submitter};

/// Default age after which a quoted blockhash is replaced before signing
pub const DEFAULT_ANCHOR_MAX_AGE: Duration = Duration::from_secs(30);

/// Fee quoted for a transfer-shaped message
#[derive(Debug, Clone, Copy)]
pub struct FeeQuote {
    pub fee: u64,
    pub blockhash: LatestBlockhash,
    pub fetched_at: Instant,
}

/// Outcome of a drain
#[derive(Debug, Clone, Serialize)]
pub struct DrainReceipt {
    pub signature: String,
    pub balance: u64,
    pub fee: u64,
    pub amount: u64,
}

impl DrainReceipt {
    /// Balance left behind, by construction zero
    pub fn remaining(&self) -> u64 {
        self.balance.saturating_sub(self.fee).saturating_sub(self.amount)
    }
}

/// Outcome of a fixed-amount transfer
#[derive(Debug, Clone, Serialize)]
pub struct TransferReceipt {
    pub signature: String,
    pub balance_before: u64,
    pub fee: u64,
    pub amount: u64,
}

/// Transfer service
pub struct TransferService {
    rpc: Arc<dyn RpcConnection>,
    submitter: Submitter,
    anchor_max_age: Duration,
}

impl TransferService {
    pub fn new(rpc: Arc<dyn RpcConnection>, confirm: ConfirmOptions) -> Self {
        Self {
            submitter: Submitter::new(Arc::clone(&rpc), confirm),
            rpc,
            anchor_max_age: DEFAULT_ANCHOR_MAX_AGE,
        }
    }

    pub fn with_anchor_max_age(mut self, max_age: Duration) -> Self {
        self.anchor_max_age = max_age;
        self
    }

    fn commitment(&self) -> Commitment {
        self.submitter.options().commitment
    }

    /// Current balance of `address` in lamports
    pub async fn balance(&self, address: &Pubkey) -> Result<u64> {
        self.rpc.get_balance(address, self.commitment()).await
    }

    /// Quote the fee of a transfer from `from` to `to`
    ///
    /// Prices a zero-amount transfer: the fee depends on the message shape,
    /// not on the amount moved.
    pub async fn quote_fee(&self, from: &Pubkey, to: &Pubkey) -> Result<FeeQuote> {
        let blockhash = self.submitter.latest_blockhash().await?;
        let fetched_at = Instant::now();

        let zero_transfer = system_instruction::transfer(from, to, 0);
        let message = Message::new_with_blockhash(&[zero_transfer], Some(from), &blockhash.blockhash);

        let fee = match self.rpc.get_fee_for_message(&message, self.commitment()).await {
            Ok(Some(fee)) => fee,
            Ok(None) => {
                return Err(Error::FeeUnavailable(
                    "node could not price the transfer message".to_string(),
                ))
            }
            Err(Error::FeeUnavailable(msg)) => return Err(Error::FeeUnavailable(msg)),
            Err(e) => return Err(Error::FeeUnavailable(e.to_string())),
        };

        Ok(FeeQuote {
            fee,
            blockhash,
            fetched_at,
        })
    }

    /// Send the whole balance of `from` to `to`, net of the exact fee
    ///
    /// Fails with `InsufficientFunds` before submitting anything when the
    /// balance cannot cover the fee.
    pub async fn drain(&self, from: &Keypair, to: &Pubkey) -> Result<DrainReceipt> {
        let source = from.pubkey();
        let balance = self.balance(&source).await?;
        let quote = self.quote_fee(&source, to).await?;
        let amount = drain_amount(balance, quote.fee)?;

        let signature = self.send(from, to, amount, quote).await?;

        Ok(DrainReceipt {
            signature,
            balance,
            fee: quote.fee,
            amount,
        })
    }

    /// Send exactly `lamports` from `from` to `to`
    pub async fn transfer(
        &self,
        from: &Keypair,
        to: &Pubkey,
        lamports: u64,
    ) -> Result<TransferReceipt> {
        let source = from.pubkey();
        let balance = self.balance(&source).await?;
        let quote = self.quote_fee(&source, to).await?;
        ensure_covers(balance, lamports, quote.fee)?;

        let signature = self.send(from, to, lamports, quote).await?;

        Ok(TransferReceipt {
            signature,
            balance_before: balance,
            fee: quote.fee,
            amount: lamports,
        })
    }

    async fn send(&self, from: &Keypair, to: &Pubkey, lamports: u64, quote: FeeQuote) -> Result<String> {
        let blockhash = if quote.fetched_at.elapsed() > self.anchor_max_age {
            self.submitter.latest_blockhash().await?.blockhash
        } else {
            quote.blockhash.blockhash
        };

        let instruction = system_instruction::transfer(&from.pubkey(), to, lamports);
        let transaction =
            build_signed_transaction(&[instruction], &from.pubkey(), &[from], blockhash)?;

        let signature = self.submitter.send_and_confirm(&transaction).await?;
        Ok(signature.to_string())
    }
}
