//! Enrollment program layout
//!
//! Instruction builders and address derivation for the prereq program.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use solana_sdk::instruction::{AccountMeta, Instruction};
use solana_sdk::pubkey::Pubkey;
use solana_system_interface::program as system_program;

use crate::domain::anchor::{account_discriminator, borsh_string, instruction_discriminator};
use crate::domain::result::{Error, Result};

/// Seed prefix of the per-user enrollment account
pub const ENROLLMENT_SEED: &[u8] = b"prereqs";

/// Seed prefix of the collection authority
pub const COLLECTION_SEED: &[u8] = b"collection";

/// Anchor name of the per-user enrollment account type
pub const ENROLLMENT_ACCOUNT_NAME: &str = "ApplicationAccount";

/// Whether account data starts with the enrollment account discriminator
///
/// Zeroed data, short data, and accounts of any other type are not enrollments.
pub fn is_enrollment_account(data: &[u8]) -> bool {
    data.get(..8) == Some(&account_discriminator(ENROLLMENT_ACCOUNT_NAME)[..])
}

/// Which submission instruction to call after enrolling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubmissionTrack {
    Ts,
    Rs,
}

impl SubmissionTrack {
    pub fn instruction_name(&self) -> &'static str {
        match self {
            SubmissionTrack::Ts => "submit_ts",
            SubmissionTrack::Rs => "submit_rs",
        }
    }
}

impl Default for SubmissionTrack {
    fn default() -> Self {
        SubmissionTrack::Ts
    }
}

impl FromStr for SubmissionTrack {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "ts" => Ok(SubmissionTrack::Ts),
            "rs" => Ok(SubmissionTrack::Rs),
            other => Err(Error::Config(format!(
                "unknown submission track '{}' (expected ts or rs)",
                other
            ))),
        }
    }
}

/// Addresses the enrollment instructions reference
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnrollmentProgram {
    pub program_id: Pubkey,
    pub collection: Pubkey,
    pub mpl_core_program: Pubkey,
}

impl EnrollmentProgram {
    /// Per-user enrollment account: PDA of `["prereqs", user]`
    pub fn enrollment_address(&self, user: &Pubkey) -> (Pubkey, u8) {
        Pubkey::find_program_address(&[ENROLLMENT_SEED, user.as_ref()], &self.program_id)
    }

    /// Authority over the NFT collection: PDA of `["collection", collection]`
    pub fn collection_authority(&self) -> (Pubkey, u8) {
        Pubkey::find_program_address(
            &[COLLECTION_SEED, self.collection.as_ref()],
            &self.program_id,
        )
    }

    /// `initialize(github)` creating the enrollment account
    pub fn initialize_instruction(&self, user: &Pubkey, github: &str) -> Instruction {
        self.account_instruction("initialize", user, github)
    }

    /// `update(github)` rewriting the handle on an existing enrollment
    pub fn update_instruction(&self, user: &Pubkey, github: &str) -> Instruction {
        self.account_instruction("update", user, github)
    }

    fn account_instruction(&self, name: &str, user: &Pubkey, github: &str) -> Instruction {
        let (account, _) = self.enrollment_address(user);
        let mut data = instruction_discriminator(name).to_vec();
        data.extend_from_slice(&borsh_string(github));

        Instruction {
            program_id: self.program_id,
            accounts: vec![
                AccountMeta::new(*user, true),
                AccountMeta::new(account, false),
                AccountMeta::new_readonly(system_program::id(), false),
            ],
            data,
        }
    }

    /// Submission instruction minting the completion NFT into `mint`
    pub fn submit_instruction(
        &self,
        track: SubmissionTrack,
        user: &Pubkey,
        mint: &Pubkey,
    ) -> Instruction {
        let (account, _) = self.enrollment_address(user);
        let (authority, _) = self.collection_authority();

        Instruction {
            program_id: self.program_id,
            accounts: vec![
                AccountMeta::new(*user, true),
                AccountMeta::new(account, false),
                AccountMeta::new(*mint, true),
                AccountMeta::new(self.collection, false),
                AccountMeta::new_readonly(authority, false),
                AccountMeta::new_readonly(self.mpl_core_program, false),
                AccountMeta::new_readonly(system_program::id(), false),
            ],
            data: instruction_discriminator(track.instruction_name()).to_vec(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn program() -> EnrollmentProgram {
        EnrollmentProgram {
            program_id: Pubkey::from_str("TRBZyQHB3m68FGeVsqTK39Wm4xejadjVhP5MAZaKWDM").unwrap(),
            collection: Pubkey::from_str("5ebsp5RChCGK7ssRZMVMufgVZhd2kFbNaotcZ5UvytN2").unwrap(),
            mpl_core_program: Pubkey::from_str("CoREENxT6tW1HoK8ypY1SxRMZTcVPm7R94rH4PZNhX7d")
                .unwrap(),
        }
    }

    #[test]
    fn test_enrollment_account_discriminator() {
        let mut data = account_discriminator("ApplicationAccount").to_vec();
        data.extend_from_slice(&[7; 40]);
        assert!(is_enrollment_account(&data));

        assert!(!is_enrollment_account(&[]));
        assert!(!is_enrollment_account(&data[..7]));
        assert!(!is_enrollment_account(&[0u8; 64]));
        assert!(!is_enrollment_account(&account_discriminator("CollectionAccount")));
    }

    #[test]
    fn test_pda_is_deterministic() {
        let user = Pubkey::new_unique();
        let first = program().enrollment_address(&user);
        let second = program().enrollment_address(&user);
        assert_eq!(first, second);

        let other = program().enrollment_address(&Pubkey::new_unique());
        assert_ne!(first.0, other.0);
    }

    #[test]
    fn test_pda_matches_manual_derivation() {
        let p = program();
        let user = Pubkey::new_unique();
        let (expected, bump) =
            Pubkey::find_program_address(&[b"prereqs", user.as_ref()], &p.program_id);
        assert_eq!(p.enrollment_address(&user), (expected, bump));

        let recreated =
            Pubkey::create_program_address(&[b"prereqs", user.as_ref(), &[bump]], &p.program_id)
                .unwrap();
        assert_eq!(recreated, expected);
    }

    #[test]
    fn test_initialize_instruction_layout() {
        let p = program();
        let user = Pubkey::new_unique();
        let ix = p.initialize_instruction(&user, "octocat");

        assert_eq!(ix.program_id, p.program_id);
        assert_eq!(&ix.data[..8], &instruction_discriminator("initialize"));
        assert_eq!(&ix.data[8..12], &7u32.to_le_bytes());
        assert_eq!(&ix.data[12..], b"octocat");

        assert_eq!(ix.accounts.len(), 3);
        assert!(ix.accounts[0].is_signer && ix.accounts[0].is_writable);
        assert_eq!(ix.accounts[1].pubkey, p.enrollment_address(&user).0);
        assert!(!ix.accounts[2].is_writable);
    }

    #[test]
    fn test_submit_instruction_layout() {
        let p = program();
        let user = Pubkey::new_unique();
        let mint = Pubkey::new_unique();
        let ix = p.submit_instruction(SubmissionTrack::Rs, &user, &mint);

        assert_eq!(ix.data, instruction_discriminator("submit_rs").to_vec());
        assert_eq!(ix.accounts.len(), 7);
        assert_eq!(ix.accounts[2].pubkey, mint);
        assert!(ix.accounts[2].is_signer);
        assert_eq!(ix.accounts[3].pubkey, p.collection);
        assert!(ix.accounts[3].is_writable && !ix.accounts[3].is_signer);
        assert_eq!(ix.accounts[4].pubkey, p.collection_authority().0);
        assert_eq!(ix.accounts[5].pubkey, p.mpl_core_program);
    }
}
