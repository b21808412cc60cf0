//! IDL service - fetch a program's on-chain interface description

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde_json::Value as JsonValue;
use solana_sdk::pubkey::Pubkey;

use crate::domain::idl::{decode_idl_account, idl_address};
use crate::domain::network::{Cluster, Commitment};
use crate::domain::result::{Error, Result};
use crate::ports::RpcConnection;

/// A fetched IDL
#[derive(Debug, Clone)]
pub struct FetchedIdl {
    pub program_id: Pubkey,
    pub address: Pubkey,
    pub authority: Pubkey,
    pub idl: JsonValue,
}

/// IDL service
pub struct IdlService {
    rpc: Arc<dyn RpcConnection>,
    commitment: Commitment,
}

impl IdlService {
    pub fn new(rpc: Arc<dyn RpcConnection>, commitment: Commitment) -> Self {
        Self { rpc, commitment }
    }

    /// Fetch and decode the IDL published for `program_id`
    pub async fn fetch(&self, program_id: &Pubkey) -> Result<FetchedIdl> {
        let address = idl_address(program_id)?;
        let account = self
            .rpc
            .get_account_info(&address, self.commitment)
            .await?
            .ok_or_else(|| {
                Error::not_found(format!(
                    "IDL not found for program {} (expected account {})",
                    program_id, address
                ))
            })?;

        let decoded = decode_idl_account(&account.data)?;
        Ok(FetchedIdl {
            program_id: *program_id,
            address,
            authority: decoded.authority,
            idl: decoded.idl,
        })
    }

    /// Write `idl` as pretty JSON to `<dir>/<name>.json`, creating `dir`
    pub fn save(&self, idl: &JsonValue, dir: &Path, name: &str) -> Result<PathBuf> {
        fs::create_dir_all(dir)?;
        let path = dir.join(format!("{}.json", name));
        fs::write(&path, serde_json::to_string_pretty(idl)?)?;
        Ok(path)
    }

    /// Command that fetches the same IDL with the Anchor CLI
    pub fn alternative_command(program_id: &Pubkey, cluster: Cluster) -> String {
        format!(
            "anchor idl fetch {} --provider.cluster {}",
            program_id, cluster
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::MemoryLedger;
    use crate::domain::idl::encode_idl_account;
    use crate::ports::AccountInfo;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_fetch_and_save() {
        let ledger = Arc::new(MemoryLedger::new());
        let program = Pubkey::new_unique();
        let authority = Pubkey::new_unique();
        let idl = serde_json::json!({"metadata": {"name": "turbin3_prereq"}, "instructions": []});

        ledger.set_account(
            idl_address(&program).unwrap(),
            AccountInfo {
                lamports: 1_000_000,
                owner: program,
                data: encode_idl_account(&authority, &idl),
                executable: false,
            },
        );

        let service = IdlService::new(ledger, Commitment::Confirmed);
        let fetched = service.fetch(&program).await.unwrap();
        assert_eq!(fetched.authority, authority);
        assert_eq!(fetched.idl, idl);

        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("programs");
        let path = service.save(&fetched.idl, &dir, "Turbin3_prereq").unwrap();
        assert_eq!(path, dir.join("Turbin3_prereq.json"));

        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains("\n  \"metadata\""));
        let parsed: JsonValue = serde_json::from_str(&written).unwrap();
        assert_eq!(parsed, idl);
    }

    #[tokio::test]
    async fn test_missing_idl_is_not_found() {
        let service = IdlService::new(Arc::new(MemoryLedger::new()), Commitment::Confirmed);
        let err = service.fetch(&Pubkey::new_unique()).await.unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[test]
    fn test_alternative_command() {
        let program = Pubkey::new_unique();
        assert_eq!(
            IdlService::alternative_command(&program, Cluster::Devnet),
            format!("anchor idl fetch {} --provider.cluster devnet", program)
        );
    }
}
