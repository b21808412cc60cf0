//! In-memory ledger
//!
//! A single-node stand-in for a cluster that runs every procedure end to
//! end without a network. It verifies signatures, charges fees, executes
//! system transfers and records a generic "program owns this account" effect
//! for other programs. Knobs let tests stall confirmation, refuse fee quotes
//! or make transactions land with an error.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use serde_json::json;
use solana_sdk::hash::Hash;
use solana_sdk::message::Message;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::{Keypair, Signature, Signer};
use solana_sdk::transaction::Transaction;
use solana_system_interface::instruction::SystemInstruction;
use solana_system_interface::program as system_program;

use crate::domain::anchor::account_discriminator;
use crate::domain::enrollment::ENROLLMENT_ACCOUNT_NAME;
use crate::domain::network::Commitment;
use crate::domain::result::{Error, Result};
use crate::ports::{AccountInfo, LatestBlockhash, RpcConnection, SendOptions, SignatureStatus};

/// Fee charged per required signature
pub const FEE_PER_SIGNATURE: u64 = 5_000;

/// Blocks a blockhash stays valid for
const BLOCKHASH_VALIDITY: u64 = 150;

/// Rent-exempt minimum: `(128 + len) * 3480 * 2`
pub fn rent_exempt_minimum(data_len: usize) -> u64 {
    (128 + data_len as u64) * 3_480 * 2
}

#[derive(Default)]
struct LedgerState {
    accounts: HashMap<Pubkey, AccountInfo>,
    blockhashes: Vec<Hash>,
    statuses: HashMap<Signature, SignatureStatus>,
    slot: u64,
    submissions: usize,
    airdrops: u64,
    stall_confirmations: bool,
    reject_fee_quotes: bool,
    fail_executions: bool,
    fail_airdrops: bool,
    failing_status_queries: usize,
}

/// In-memory cluster implementing `RpcConnection`
pub struct MemoryLedger {
    state: Mutex<LedgerState>,
    faucet: Keypair,
}

impl Default for MemoryLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(LedgerState::default()),
            faucet: Keypair::new(),
        }
    }

    fn state(&self) -> MutexGuard<'_, LedgerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Credit `lamports` to a system-owned account
    pub fn fund(&self, address: &Pubkey, lamports: u64) {
        let mut state = self.state();
        credit(&mut state.accounts, address, lamports);
    }

    /// Install an account as-is
    pub fn set_account(&self, address: Pubkey, account: AccountInfo) {
        self.state().accounts.insert(address, account);
    }

    /// Mark `program_id` as a deployed program
    pub fn deploy_program(&self, program_id: Pubkey) {
        self.set_account(
            program_id,
            AccountInfo {
                lamports: rent_exempt_minimum(36),
                owner: Pubkey::new_from_array([0xbf; 32]),
                data: Vec::new(),
                executable: true,
            },
        );
    }

    pub fn account(&self, address: &Pubkey) -> Option<AccountInfo> {
        self.state().accounts.get(address).cloned()
    }

    pub fn balance(&self, address: &Pubkey) -> u64 {
        self.state()
            .accounts
            .get(address)
            .map(|a| a.lamports)
            .unwrap_or(0)
    }

    /// Number of `sendTransaction` calls the ledger accepted
    pub fn submission_count(&self) -> usize {
        self.state().submissions
    }

    /// Accept transactions but never move them past `processed`
    pub fn stall_confirmations(&self, stall: bool) {
        self.state().stall_confirmations = stall;
    }

    /// Answer every fee quote with `null`
    pub fn reject_fee_quotes(&self, reject: bool) {
        self.state().reject_fee_quotes = reject;
    }

    /// Accept transactions, charge the fee, then report an execution error
    pub fn fail_executions(&self, fail: bool) {
        self.state().fail_executions = fail;
    }

    /// Refuse airdrops the way a rate-limited faucet does
    pub fn fail_airdrops(&self, fail: bool) {
        self.state().fail_airdrops = fail;
    }

    /// Fail the next `count` signature status queries with a network error
    pub fn fail_status_queries(&self, count: usize) {
        self.state().failing_status_queries = count;
    }

    fn record_status(&self, state: &mut LedgerState, signature: Signature, err: Option<serde_json::Value>) {
        state.slot += 1;
        let confirmation_status = if state.stall_confirmations {
            Commitment::Processed
        } else {
            Commitment::Finalized
        };
        state.statuses.insert(
            signature,
            SignatureStatus {
                slot: state.slot,
                err,
                confirmation_status: Some(confirmation_status),
            },
        );
    }
}

fn credit(accounts: &mut HashMap<Pubkey, AccountInfo>, address: &Pubkey, lamports: u64) {
    let account = accounts.entry(*address).or_insert_with(|| AccountInfo {
        lamports: 0,
        owner: system_program::id(),
        data: Vec::new(),
        executable: false,
    });
    account.lamports = account.lamports.saturating_add(lamports);
}

fn debit(
    accounts: &mut HashMap<Pubkey, AccountInfo>,
    address: &Pubkey,
    lamports: u64,
) -> std::result::Result<(), String> {
    let account = accounts
        .get_mut(address)
        .ok_or_else(|| "Attempt to debit an account but found no record of a prior credit.".to_string())?;
    let current = account.lamports;
    account.lamports = current
        .checked_sub(lamports)
        .ok_or_else(|| format!("insufficient lamports {}, need {}", current, lamports))?;
    Ok(())
}

fn is_signer(message: &Message, index: usize) -> bool {
    index < message.header.num_required_signatures as usize
}

fn is_writable(message: &Message, index: usize) -> bool {
    let header = &message.header;
    let signed = header.num_required_signatures as usize;
    if index < signed {
        index < signed - header.num_readonly_signed_accounts as usize
    } else {
        index < message.account_keys.len() - header.num_readonly_unsigned_accounts as usize
    }
}

/// Run every instruction against `accounts`
fn execute(
    message: &Message,
    accounts: &mut HashMap<Pubkey, AccountInfo>,
) -> std::result::Result<(), String> {
    let keys = &message.account_keys;
    let payer = keys[0];

    for (position, ix) in message.instructions.iter().enumerate() {
        let program_id = keys[ix.program_id_index as usize];
        let key_at = |i: usize| -> std::result::Result<(usize, Pubkey), String> {
            let index = *ix
                .accounts
                .get(i)
                .ok_or_else(|| format!("instruction {}: missing account {}", position, i))?
                as usize;
            Ok((index, keys[index]))
        };

        if program_id == system_program::id() {
            let decoded: SystemInstruction = bincode::deserialize(&ix.data)
                .map_err(|e| format!("instruction {}: invalid system instruction: {}", position, e))?;
            match decoded {
                SystemInstruction::Transfer { lamports } => {
                    let (from_index, from) = key_at(0)?;
                    let (_, to) = key_at(1)?;
                    if !is_signer(message, from_index) {
                        return Err(format!("instruction {}: missing required signature", position));
                    }
                    debit(accounts, &from, lamports)?;
                    credit(accounts, &to, lamports);
                }
                other => {
                    return Err(format!("instruction {}: unsupported system instruction {:?}", position, other));
                }
            }
            continue;
        }

        match accounts.get(&program_id) {
            Some(program) if program.executable => {}
            _ => return Err("Attempt to load a program that does not exist".to_string()),
        }

        // Writable, unsigned accounts become (or stay) program state
        let payload = ix.data.get(8..).unwrap_or_default();
        let mut data = account_discriminator(ENROLLMENT_ACCOUNT_NAME).to_vec();
        data.extend_from_slice(payload);

        for &raw in &ix.accounts {
            let index = raw as usize;
            if is_signer(message, index) || !is_writable(message, index) {
                continue;
            }
            let address = keys[index];
            if !accounts.contains_key(&address) {
                let rent = rent_exempt_minimum(data.len());
                debit(accounts, &payer, rent)?;
                accounts.insert(
                    address,
                    AccountInfo {
                        lamports: rent,
                        owner: program_id,
                        data: data.clone(),
                        executable: false,
                    },
                );
                continue;
            }

            if let Some(existing) = accounts.get_mut(&address) {
                let unclaimed = existing.owner == system_program::id() && existing.data.is_empty();
                if unclaimed {
                    existing.owner = program_id;
                    existing.data = data.clone();
                } else if existing.owner == program_id {
                    if !payload.is_empty() {
                        existing.data = data.clone();
                    }
                } else {
                    return Err(format!(
                        "instruction {}: account {} is not owned by {}",
                        position, address, program_id
                    ));
                }
            }
        }
    }

    Ok(())
}

#[async_trait]
impl RpcConnection for MemoryLedger {
    fn endpoint(&self) -> &str {
        "memory"
    }

    async fn get_balance(&self, address: &Pubkey, _commitment: Commitment) -> Result<u64> {
        Ok(self.balance(address))
    }

    async fn get_latest_blockhash(&self, _commitment: Commitment) -> Result<LatestBlockhash> {
        let mut state = self.state();
        state.slot += 1;
        let blockhash = Hash::new_unique();
        state.blockhashes.push(blockhash);
        Ok(LatestBlockhash {
            blockhash,
            last_valid_block_height: state.slot + BLOCKHASH_VALIDITY,
        })
    }

    async fn get_fee_for_message(
        &self,
        message: &Message,
        _commitment: Commitment,
    ) -> Result<Option<u64>> {
        let state = self.state();
        if state.reject_fee_quotes || !state.blockhashes.contains(&message.recent_blockhash) {
            return Ok(None);
        }
        Ok(Some(
            FEE_PER_SIGNATURE * message.header.num_required_signatures as u64,
        ))
    }

    async fn get_account_info(
        &self,
        address: &Pubkey,
        _commitment: Commitment,
    ) -> Result<Option<AccountInfo>> {
        Ok(self.account(address))
    }

    async fn get_minimum_balance_for_rent_exemption(&self, data_len: usize) -> Result<u64> {
        Ok(rent_exempt_minimum(data_len))
    }

    async fn send_transaction(
        &self,
        transaction: &Transaction,
        _options: SendOptions,
    ) -> Result<Signature> {
        transaction
            .verify()
            .map_err(|e| Error::submission(format!("signature verification failed: {}", e)))?;

        let message = &transaction.message;
        let signature = transaction.signatures[0];

        let mut state = self.state();
        if !state.blockhashes.contains(&message.recent_blockhash) {
            return Err(Error::submission("Blockhash not found"));
        }

        let fee = FEE_PER_SIGNATURE * message.header.num_required_signatures as u64;
        let payer = message.account_keys[0];
        if state.accounts.get(&payer).map(|a| a.lamports).unwrap_or(0) < fee {
            return Err(Error::Submission {
                message: "Transaction simulation failed: Attempt to debit an account but found no record of a prior credit.".to_string(),
                details: Some(json!({"err": "AccountNotFound", "logs": []})),
            });
        }

        // Dry run first so preflight failures leave no trace
        let mut scratch = state.accounts.clone();
        debit(&mut scratch, &payer, fee).map_err(Error::submission)?;
        let outcome = if state.fail_executions {
            Err("custom program error: 0x1".to_string())
        } else {
            execute(message, &mut scratch)
        };

        match outcome {
            Ok(()) => {
                state.accounts = scratch;
                state.submissions += 1;
                self.record_status(&mut state, signature, None);
            }
            Err(reason) if state.fail_executions => {
                // Landed with an error: fee is charged, nothing else changes
                debit(&mut state.accounts, &payer, fee).map_err(Error::submission)?;
                state.submissions += 1;
                self.record_status(
                    &mut state,
                    signature,
                    Some(json!({"InstructionError": [0, {"Custom": 1}], "reason": reason})),
                );
            }
            Err(reason) => {
                return Err(Error::Submission {
                    message: format!("Transaction simulation failed: {}", reason),
                    details: Some(json!({"logs": [reason]})),
                });
            }
        }

        Ok(signature)
    }

    async fn get_signature_status(&self, signature: &Signature) -> Result<Option<SignatureStatus>> {
        let mut state = self.state();
        if state.failing_status_queries > 0 {
            state.failing_status_queries -= 1;
            return Err(Error::network("getSignatureStatuses failed: connection reset"));
        }
        Ok(state.statuses.get(signature).cloned())
    }

    async fn request_airdrop(&self, address: &Pubkey, lamports: u64) -> Result<Signature> {
        let mut state = self.state();
        if state.fail_airdrops {
            return Err(Error::Network {
                message: "requestAirdrop failed: 429 Too Many Requests".to_string(),
                details: Some(json!({"code": 429})),
            });
        }

        state.airdrops += 1;
        let signature = self.faucet.sign_message(&state.airdrops.to_le_bytes());
        credit(&mut state.accounts, address, lamports);
        self.record_status(&mut state, signature, None);
        Ok(signature)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use solana_system_interface::instruction as system_instruction;

    async fn signed_transfer(ledger: &MemoryLedger, from: &Keypair, to: &Pubkey, lamports: u64) -> Transaction {
        let blockhash = ledger
            .get_latest_blockhash(Commitment::Confirmed)
            .await
            .unwrap()
            .blockhash;
        let ix = system_instruction::transfer(&from.pubkey(), to, lamports);
        Transaction::new_signed_with_payer(&[ix], Some(&from.pubkey()), &[from], blockhash)
    }

    #[test]
    fn test_rent_exempt_minimum() {
        assert_eq!(rent_exempt_minimum(0), 890_880);
    }

    #[tokio::test]
    async fn test_transfer_charges_fee() {
        let ledger = MemoryLedger::new();
        let from = Keypair::new();
        let to = Pubkey::new_unique();
        ledger.fund(&from.pubkey(), 1_000_000);

        let tx = signed_transfer(&ledger, &from, &to, 400_000).await;
        let signature = ledger.send_transaction(&tx, SendOptions::default()).await.unwrap();

        assert_eq!(ledger.balance(&from.pubkey()), 1_000_000 - 400_000 - FEE_PER_SIGNATURE);
        assert_eq!(ledger.balance(&to), 400_000);
        let status = ledger.get_signature_status(&signature).await.unwrap().unwrap();
        assert!(status.err.is_none());
    }

    #[tokio::test]
    async fn test_overdraw_is_rejected_without_side_effects() {
        let ledger = MemoryLedger::new();
        let from = Keypair::new();
        ledger.fund(&from.pubkey(), 10_000);

        let tx = signed_transfer(&ledger, &from, &Pubkey::new_unique(), 10_000).await;
        let err = ledger.send_transaction(&tx, SendOptions::default()).await.unwrap_err();
        assert!(matches!(err, Error::Submission { .. }));
        assert_eq!(ledger.balance(&from.pubkey()), 10_000);
        assert_eq!(ledger.submission_count(), 0);
    }

    #[tokio::test]
    async fn test_unknown_blockhash_is_rejected() {
        let ledger = MemoryLedger::new();
        let from = Keypair::new();
        ledger.fund(&from.pubkey(), 1_000_000);

        let ix = system_instruction::transfer(&from.pubkey(), &Pubkey::new_unique(), 1);
        let tx = Transaction::new_signed_with_payer(&[ix], Some(&from.pubkey()), &[&from], Hash::new_unique());
        let err = ledger.send_transaction(&tx, SendOptions::default()).await.unwrap_err();
        assert!(err.to_string().contains("Blockhash not found"));
    }

    #[tokio::test]
    async fn test_fee_quote_needs_known_blockhash() {
        let ledger = MemoryLedger::new();
        let from = Keypair::new();
        let ix = system_instruction::transfer(&from.pubkey(), &Pubkey::new_unique(), 0);

        let stale = Message::new_with_blockhash(&[ix.clone()], Some(&from.pubkey()), &Hash::new_unique());
        assert_eq!(ledger.get_fee_for_message(&stale, Commitment::Confirmed).await.unwrap(), None);

        let fresh_hash = ledger.get_latest_blockhash(Commitment::Confirmed).await.unwrap().blockhash;
        let fresh = Message::new_with_blockhash(&[ix], Some(&from.pubkey()), &fresh_hash);
        assert_eq!(
            ledger.get_fee_for_message(&fresh, Commitment::Confirmed).await.unwrap(),
            Some(FEE_PER_SIGNATURE)
        );
    }

    #[tokio::test]
    async fn test_airdrop_credits_account() {
        let ledger = MemoryLedger::new();
        let address = Pubkey::new_unique();
        let signature = ledger.request_airdrop(&address, 2_000_000_000).await.unwrap();
        assert_eq!(ledger.balance(&address), 2_000_000_000);
        assert!(ledger.get_signature_status(&signature).await.unwrap().is_some());

        ledger.fail_airdrops(true);
        assert!(ledger.request_airdrop(&address, 1).await.is_err());
    }
}
