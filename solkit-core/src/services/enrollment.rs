//! Enrollment service - idempotent enrollment and submission
//!
//! Enrollment is two dependent transactions: `initialize` creates the
//! per-user account, `submit_ts`/`submit_rs` mints the completion NFT and
//! requires that account. The account is inspected before `initialize` so an
//! existing, correctly owned enrollment is never recreated.

use std::sync::Arc;

use serde::Serialize;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::{Keypair, Signer};
use solana_system_interface::program as system_program;

use crate::domain::enrollment::{is_enrollment_account, EnrollmentProgram, SubmissionTrack};
use crate::domain::result::{Error, Result};
use crate::ports::RpcConnection;
use crate::services::submit::{ConfirmOptions, Submitter};

/// What `ensure_enrolled` did
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum EnrollmentStatus {
    Created { signature: String },
    AlreadyEnrolled,
}

/// Confirmed submission
#[derive(Debug, Clone, Serialize)]
pub struct SubmitReceipt {
    pub signature: String,
    pub mint: String,
    pub track: SubmissionTrack,
}

/// Result of a full enrollment run
#[derive(Debug, Clone, Serialize)]
pub struct EnrollmentReport {
    pub account: String,
    pub enrollment: EnrollmentStatus,
    pub submission: SubmitReceipt,
}

/// State of the enrollment account as seen on chain
#[derive(Debug, Clone, PartialEq, Eq)]
enum AccountState {
    Missing,
    Enrolled,
    Uninitialized,
    Foreign { owner: Pubkey },
}

/// Enrollment service
pub struct EnrollmentService {
    rpc: Arc<dyn RpcConnection>,
    submitter: Submitter,
    program: EnrollmentProgram,
    github: String,
    track: SubmissionTrack,
}

impl EnrollmentService {
    pub fn new(
        rpc: Arc<dyn RpcConnection>,
        confirm: ConfirmOptions,
        program: EnrollmentProgram,
        github: impl Into<String>,
        track: SubmissionTrack,
    ) -> Self {
        Self {
            submitter: Submitter::new(Arc::clone(&rpc), confirm),
            rpc,
            program,
            github: github.into(),
            track,
        }
    }

    pub fn program(&self) -> &EnrollmentProgram {
        &self.program
    }

    /// Enrollment account of `user`
    pub fn enrollment_address(&self, user: &Pubkey) -> Pubkey {
        self.program.enrollment_address(user).0
    }

    /// Collection authority PDA
    pub fn collection_authority(&self) -> Pubkey {
        self.program.collection_authority().0
    }

    async fn inspect(&self, account: &Pubkey) -> Result<AccountState> {
        let info = self
            .rpc
            .get_account_info(account, self.submitter.options().commitment)
            .await?;

        Ok(match info {
            None => AccountState::Missing,
            // Lamports sent to the address before initialization
            Some(info) if info.owner == system_program::id() && info.data.is_empty() => {
                AccountState::Missing
            }
            Some(info) if info.owner != self.program.program_id => {
                AccountState::Foreign { owner: info.owner }
            }
            Some(info) if is_enrollment_account(&info.data) => AccountState::Enrolled,
            Some(_) => AccountState::Uninitialized,
        })
    }

    fn github(&self) -> Result<&str> {
        if self.github.is_empty() {
            return Err(Error::Config(
                "enrollment.github is not set in settings.json".to_string(),
            ));
        }
        Ok(&self.github)
    }

    fn conflict(&self, account: &Pubkey, owner: &Pubkey) -> Error {
        Error::AccountOwnershipConflict {
            address: account.to_string(),
            owner: owner.to_string(),
            expected: self.program.program_id.to_string(),
        }
    }

    /// Create the enrollment account unless it already exists
    pub async fn ensure_enrolled(&self, user: &Keypair) -> Result<EnrollmentStatus> {
        let account = self.enrollment_address(&user.pubkey());

        match self.inspect(&account).await? {
            AccountState::Enrolled => Ok(EnrollmentStatus::AlreadyEnrolled),
            AccountState::Foreign { owner } => Err(self.conflict(&account, &owner)),
            AccountState::Uninitialized => Err(Error::IncompleteEnrollment(account.to_string())),
            AccountState::Missing => {
                let instruction = self
                    .program
                    .initialize_instruction(&user.pubkey(), self.github()?);
                let signature = self.submitter.submit(&[instruction], user, &[]).await?;
                Ok(EnrollmentStatus::Created {
                    signature: signature.to_string(),
                })
            }
        }
    }

    /// Submit the configured track with a fresh one-time mint
    pub async fn submit(&self, user: &Keypair) -> Result<SubmitReceipt> {
        let mint = Keypair::new();
        let instruction =
            self.program
                .submit_instruction(self.track, &user.pubkey(), &mint.pubkey());

        let signature = self.submitter.submit(&[instruction], user, &[&mint]).await?;

        Ok(SubmitReceipt {
            signature: signature.to_string(),
            mint: mint.pubkey().to_string(),
            track: self.track,
        })
    }

    /// `ensure_enrolled` followed by `submit`
    pub async fn enroll(&self, user: &Keypair) -> Result<EnrollmentReport> {
        let enrollment = self.ensure_enrolled(user).await?;
        let submission = self.submit(user).await?;

        Ok(EnrollmentReport {
            account: self.enrollment_address(&user.pubkey()).to_string(),
            enrollment,
            submission,
        })
    }

    /// Rewrite the GitHub handle on an existing enrollment
    pub async fn update_github(&self, user: &Keypair) -> Result<String> {
        let github = self.github()?;
        let account = self.enrollment_address(&user.pubkey());

        match self.inspect(&account).await? {
            AccountState::Enrolled => {}
            AccountState::Missing => {
                return Err(Error::not_found(format!(
                    "no enrollment account at {}",
                    account
                )))
            }
            AccountState::Foreign { owner } => return Err(self.conflict(&account, &owner)),
            AccountState::Uninitialized => {
                return Err(Error::IncompleteEnrollment(account.to_string()))
            }
        }

        let instruction = self.program.update_instruction(&user.pubkey(), github);
        let signature = self.submitter.submit(&[instruction], user, &[]).await?;
        Ok(signature.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::MemoryLedger;
    use crate::domain::anchor::account_discriminator;
    use crate::ports::AccountInfo;

    fn program() -> EnrollmentProgram {
        EnrollmentProgram {
            program_id: Pubkey::new_unique(),
            collection: Pubkey::new_unique(),
            mpl_core_program: Pubkey::new_unique(),
        }
    }

    fn setup() -> (Arc<MemoryLedger>, EnrollmentService, Keypair) {
        let ledger = Arc::new(MemoryLedger::new());
        let program = program();
        ledger.deploy_program(program.program_id);

        let user = Keypair::new();
        ledger.fund(&user.pubkey(), 1_000_000_000);

        let service = EnrollmentService::new(
            ledger.clone(),
            ConfirmOptions::default(),
            program,
            "octocat",
            SubmissionTrack::Ts,
        );
        (ledger, service, user)
    }

    #[tokio::test]
    async fn test_second_call_skips() {
        let (ledger, service, user) = setup();

        let first = service.ensure_enrolled(&user).await.unwrap();
        assert!(matches!(first, EnrollmentStatus::Created { .. }));
        assert_eq!(ledger.submission_count(), 1);

        let second = service.ensure_enrolled(&user).await.unwrap();
        assert_eq!(second, EnrollmentStatus::AlreadyEnrolled);
        assert_eq!(ledger.submission_count(), 1);
    }

    #[tokio::test]
    async fn test_foreign_owner_is_a_conflict() {
        let (ledger, service, user) = setup();
        let account = service.enrollment_address(&user.pubkey());
        let other_program = Pubkey::new_unique();
        ledger.set_account(
            account,
            AccountInfo {
                lamports: 1_000_000,
                owner: other_program,
                data: vec![1; 16],
                executable: false,
            },
        );

        let err = service.ensure_enrolled(&user).await.unwrap_err();
        match err {
            Error::AccountOwnershipConflict { owner, expected, .. } => {
                assert_eq!(owner, other_program.to_string());
                assert_eq!(expected, service.program().program_id.to_string());
            }
            other => panic!("expected ownership conflict, got {:?}", other),
        }
        assert_eq!(ledger.submission_count(), 0);
    }

    #[tokio::test]
    async fn test_uninitialized_account_is_incomplete() {
        let (ledger, service, user) = setup();
        let account = service.enrollment_address(&user.pubkey());
        ledger.set_account(
            account,
            AccountInfo {
                lamports: 1_000_000,
                owner: service.program().program_id,
                data: vec![0; 32],
                executable: false,
            },
        );

        let err = service.ensure_enrolled(&user).await.unwrap_err();
        assert!(matches!(err, Error::IncompleteEnrollment(_)));
        assert_eq!(ledger.submission_count(), 0);
    }

    #[tokio::test]
    async fn test_other_account_type_is_incomplete() {
        let (ledger, service, user) = setup();
        let account = service.enrollment_address(&user.pubkey());
        let mut data = account_discriminator("CollectionAccount").to_vec();
        data.extend_from_slice(&[9; 24]);
        ledger.set_account(
            account,
            AccountInfo {
                lamports: 1_000_000,
                owner: service.program().program_id,
                data,
                executable: false,
            },
        );

        let err = service.ensure_enrolled(&user).await.unwrap_err();
        assert!(matches!(err, Error::IncompleteEnrollment(_)));
        assert_eq!(ledger.submission_count(), 0);
    }

    #[tokio::test]
    async fn test_prefunded_address_is_initialized() {
        let (ledger, service, user) = setup();
        let account = service.enrollment_address(&user.pubkey());
        ledger.fund(&account, 10_000);

        let status = service.ensure_enrolled(&user).await.unwrap();
        assert!(matches!(status, EnrollmentStatus::Created { .. }));
        assert_eq!(
            ledger.account(&account).unwrap().owner,
            service.program().program_id
        );
    }

    #[tokio::test]
    async fn test_enroll_submits_with_fresh_mint() {
        let (ledger, service, user) = setup();

        let report = service.enroll(&user).await.unwrap();
        assert_eq!(report.account, service.enrollment_address(&user.pubkey()).to_string());
        assert_eq!(report.submission.track, SubmissionTrack::Ts);
        assert_eq!(ledger.submission_count(), 2);

        let again = service.enroll(&user).await.unwrap();
        assert_eq!(again.enrollment, EnrollmentStatus::AlreadyEnrolled);
        assert_ne!(again.submission.mint, report.submission.mint);
        assert_eq!(ledger.submission_count(), 3);
    }

    #[tokio::test]
    async fn test_update_github_requires_enrollment() {
        let (ledger, service, user) = setup();

        let err = service.update_github(&user).await.unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));

        service.ensure_enrolled(&user).await.unwrap();
        service.update_github(&user).await.unwrap();
        assert_eq!(ledger.submission_count(), 2);
    }

    #[tokio::test]
    async fn test_missing_github_is_a_config_error() {
        let ledger = Arc::new(MemoryLedger::new());
        let program = program();
        ledger.deploy_program(program.program_id);
        let user = Keypair::new();
        ledger.fund(&user.pubkey(), 1_000_000_000);

        let service = EnrollmentService::new(
            ledger.clone(),
            ConfirmOptions::default(),
            program,
            "",
            SubmissionTrack::Ts,
        );
        let err = service.ensure_enrolled(&user).await.unwrap_err();
        assert!(matches!(err, Error::Config(_)));
        assert_eq!(ledger.submission_count(), 0);
    }
}
