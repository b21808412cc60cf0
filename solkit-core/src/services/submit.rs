//! Submitter - sign, size-check, send and confirm transactions
//!
//! Shared by every service that mutates the ledger. Confirmation polls
//! `getSignatureStatuses` until the requested commitment is reached, bounded
//! by `tokio::time::timeout`.

use std::sync::Arc;
use std::time::Duration;

use solana_sdk::hash::Hash;
use solana_sdk::instruction::Instruction;
use solana_sdk::message::Message;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::{Keypair, Signature, Signer};
use solana_sdk::transaction::Transaction;

use crate::domain::network::Commitment;
use crate::domain::result::{Error, Result};
use crate::ports::{LatestBlockhash, RpcConnection, SendOptions};

/// Largest serialized transaction the network accepts
pub const MAX_TRANSACTION_SIZE: usize = 1232;

/// How to wait for a submitted transaction
#[derive(Debug, Clone, Copy)]
pub struct ConfirmOptions {
    pub commitment: Commitment,
    pub timeout: Duration,
    pub poll_interval: Duration,
}

impl Default for ConfirmOptions {
    fn default() -> Self {
        Self {
            commitment: Commitment::Confirmed,
            timeout: Duration::from_secs(60),
            poll_interval: Duration::from_millis(500),
        }
    }
}

/// Build a legacy transaction and sign it
///
/// `signers` must cover every signer the instructions require, payer
/// included.
pub fn build_signed_transaction(
    instructions: &[Instruction],
    payer: &Pubkey,
    signers: &[&Keypair],
    blockhash: Hash,
) -> Result<Transaction> {
    let message = Message::new_with_blockhash(instructions, Some(payer), &blockhash);
    let mut transaction = Transaction::new_unsigned(message);
    let signers: Vec<&Keypair> = signers.to_vec();
    transaction
        .try_sign(&signers, blockhash)
        .map_err(|e| Error::Signing(e.to_string()))?;
    Ok(transaction)
}

/// Serialized size of `transaction`, failing if it exceeds the packet limit
pub fn check_size(transaction: &Transaction) -> Result<usize> {
    let size = bincode::serialize(transaction)
        .map_err(|e| Error::Other(format!("failed to serialize transaction: {}", e)))?
        .len();
    if size > MAX_TRANSACTION_SIZE {
        return Err(Error::OversizedTransaction {
            size,
            max: MAX_TRANSACTION_SIZE,
        });
    }
    Ok(size)
}

/// Sends transactions and waits for them to land
pub struct Submitter {
    rpc: Arc<dyn RpcConnection>,
    options: ConfirmOptions,
}

impl Submitter {
    pub fn new(rpc: Arc<dyn RpcConnection>, options: ConfirmOptions) -> Self {
        Self { rpc, options }
    }

    pub fn options(&self) -> ConfirmOptions {
        self.options
    }

    /// Fresh blockhash at the configured commitment
    pub async fn latest_blockhash(&self) -> Result<LatestBlockhash> {
        self.rpc.get_latest_blockhash(self.options.commitment).await
    }

    /// Fetch a blockhash, sign, send and confirm in one go
    pub async fn submit(
        &self,
        instructions: &[Instruction],
        payer: &Keypair,
        extra_signers: &[&Keypair],
    ) -> Result<Signature> {
        let latest = self.latest_blockhash().await?;
        let mut signers = vec![payer];
        signers.extend_from_slice(extra_signers);

        let transaction =
            build_signed_transaction(instructions, &payer.pubkey(), &signers, latest.blockhash)?;
        self.send_and_confirm(&transaction).await
    }

    /// Size-check, send and wait for the configured commitment
    pub async fn send_and_confirm(&self, transaction: &Transaction) -> Result<Signature> {
        check_size(transaction)?;

        let signature = self
            .rpc
            .send_transaction(
                transaction,
                SendOptions {
                    skip_preflight: false,
                    preflight_commitment: self.options.commitment,
                },
            )
            .await?;

        self.wait_for_confirmation(&signature).await?;
        Ok(signature)
    }

    /// Poll until `signature` reaches the configured commitment
    ///
    /// A status carrying an execution error becomes `Submission`; running
    /// out of time becomes `ConfirmationTimeout`. Network errors from a
    /// status query are retried until the timeout.
    pub async fn wait_for_confirmation(&self, signature: &Signature) -> Result<()> {
        tokio::time::timeout(self.options.timeout, self.poll_status(signature))
            .await
            .map_err(|_| Error::ConfirmationTimeout {
                signature: signature.to_string(),
                waited_secs: self.options.timeout.as_secs(),
            })?
    }

    async fn poll_status(&self, signature: &Signature) -> Result<()> {
        loop {
            let status = match self.rpc.get_signature_status(signature).await {
                Ok(status) => status,
                Err(Error::Network { .. }) => None,
                Err(e) => return Err(e),
            };
            if let Some(status) = status {
                if let Some(err) = status.err {
                    return Err(Error::Submission {
                        message: format!("transaction {} failed on chain", signature),
                        details: Some(err),
                    });
                }
                if status.satisfies(self.options.commitment) {
                    return Ok(());
                }
            }
            tokio::time::sleep(self.options.poll_interval).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::MemoryLedger;
    use solana_system_interface::instruction as system_instruction;

    fn ledger_with_funds(owner: &Keypair, lamports: u64) -> Arc<MemoryLedger> {
        let ledger = Arc::new(MemoryLedger::new());
        ledger.fund(&owner.pubkey(), lamports);
        ledger
    }

    #[test]
    fn test_signing_with_missing_signer_fails() {
        let payer = Keypair::new();
        let other = Keypair::new();
        let ix = system_instruction::transfer(&other.pubkey(), &payer.pubkey(), 1);

        let err = build_signed_transaction(&[ix], &payer.pubkey(), &[&payer], Hash::new_unique())
            .unwrap_err();
        assert!(matches!(err, Error::Signing(_)));
    }

    #[test]
    fn test_oversized_transaction_is_rejected() {
        let payer = Keypair::new();
        let instructions: Vec<Instruction> = (0..40)
            .map(|_| system_instruction::transfer(&payer.pubkey(), &Pubkey::new_unique(), 1))
            .collect();
        let tx = build_signed_transaction(&instructions, &payer.pubkey(), &[&payer], Hash::new_unique())
            .unwrap();

        match check_size(&tx) {
            Err(Error::OversizedTransaction { size, max }) => {
                assert!(size > max);
                assert_eq!(max, MAX_TRANSACTION_SIZE);
            }
            other => panic!("expected oversized error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_submit_confirms() {
        let payer = Keypair::new();
        let ledger = ledger_with_funds(&payer, 1_000_000);
        let submitter = Submitter::new(ledger.clone(), ConfirmOptions::default());

        let to = Pubkey::new_unique();
        let ix = system_instruction::transfer(&payer.pubkey(), &to, 1_000);
        submitter.submit(&[ix], &payer, &[]).await.unwrap();

        assert_eq!(ledger.balance(&to), 1_000);
        assert_eq!(ledger.submission_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stalled_confirmation_times_out() {
        let payer = Keypair::new();
        let ledger = ledger_with_funds(&payer, 1_000_000);
        ledger.stall_confirmations(true);

        let submitter = Submitter::new(
            ledger.clone(),
            ConfirmOptions {
                timeout: Duration::from_secs(5),
                ..Default::default()
            },
        );

        let ix = system_instruction::transfer(&payer.pubkey(), &Pubkey::new_unique(), 1);
        let err = submitter.submit(&[ix], &payer, &[]).await.unwrap_err();
        match err {
            Error::ConfirmationTimeout { waited_secs, .. } => assert_eq!(waited_secs, 5),
            other => panic!("expected timeout, got {:?}", other),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_status_errors_keep_polling() {
        let payer = Keypair::new();
        let ledger = ledger_with_funds(&payer, 1_000_000);
        ledger.fail_status_queries(3);
        let submitter = Submitter::new(ledger.clone(), ConfirmOptions::default());

        let to = Pubkey::new_unique();
        let ix = system_instruction::transfer(&payer.pubkey(), &to, 1_000);
        submitter.submit(&[ix], &payer, &[]).await.unwrap();

        assert_eq!(ledger.balance(&to), 1_000);
        assert_eq!(ledger.submission_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_unreachable_status_times_out_with_signature() {
        let payer = Keypair::new();
        let ledger = ledger_with_funds(&payer, 1_000_000);
        ledger.fail_status_queries(usize::MAX);
        let submitter = Submitter::new(
            ledger.clone(),
            ConfirmOptions {
                timeout: Duration::from_secs(5),
                ..Default::default()
            },
        );

        let ix = system_instruction::transfer(&payer.pubkey(), &Pubkey::new_unique(), 1);
        let tx = build_signed_transaction(
            &[ix],
            &payer.pubkey(),
            &[&payer],
            submitter.latest_blockhash().await.unwrap().blockhash,
        )
        .unwrap();

        let err = submitter.send_and_confirm(&tx).await.unwrap_err();
        match err {
            Error::ConfirmationTimeout { signature, waited_secs } => {
                assert_eq!(signature, tx.signatures[0].to_string());
                assert_eq!(waited_secs, 5);
            }
            other => panic!("expected timeout, got {:?}", other),
        }
        assert_eq!(ledger.submission_count(), 1);
    }

    #[tokio::test]
    async fn test_landed_with_error_is_submission_error() {
        let payer = Keypair::new();
        let ledger = ledger_with_funds(&payer, 1_000_000);
        ledger.fail_executions(true);
        let submitter = Submitter::new(ledger.clone(), ConfirmOptions::default());

        let ix = system_instruction::transfer(&payer.pubkey(), &Pubkey::new_unique(), 1);
        let err = submitter.submit(&[ix], &payer, &[]).await.unwrap_err();
        assert!(matches!(err, Error::Submission { .. }));
        assert!(err.details().is_some());
    }
}
