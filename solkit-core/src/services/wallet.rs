//! Wallet service - keypair files on disk
//!
//! Wallet files hold a JSON array of the 64 keypair bytes, the format the
//! Solana CLI writes.

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use solana_sdk::signature::Keypair;

use crate::domain::keys::{format_byte_array, generate, keypair_from_bytes, parse_byte_array};
use crate::domain::result::{Error, Result};

/// Wallet service
#[derive(Debug, Default)]
pub struct WalletService;

impl WalletService {
    pub fn new() -> Self {
        Self
    }

    /// Load the keypair stored at `path`
    pub fn load(&self, path: &Path) -> Result<Keypair> {
        let text = fs::read_to_string(path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => {
                Error::not_found(format!("wallet file {} does not exist", path.display()))
            }
            _ => Error::Io(e),
        })?;

        let bytes = parse_byte_array(&text).map_err(|e| {
            Error::malformed_key(format!("{}: {}", path.display(), e))
        })?;
        keypair_from_bytes(&bytes)
    }

    /// Write `keypair` to `path`
    ///
    /// Refuses to replace an existing file unless `overwrite` is set.
    pub fn save(&self, path: &Path, keypair: &Keypair, overwrite: bool) -> Result<()> {
        if path.exists() && !overwrite {
            return Err(Error::Io(std::io::Error::new(
                ErrorKind::AlreadyExists,
                format!("{} already exists; refusing to overwrite", path.display()),
            )));
        }

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        fs::write(path, format_byte_array(&keypair.to_bytes()))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(path, fs::Permissions::from_mode(0o600))?;
        }

        Ok(())
    }

    /// Generate a keypair and save it to `path`
    pub fn generate(&self, path: &Path, overwrite: bool) -> Result<Keypair> {
        let keypair = generate();
        self.save(path, &keypair, overwrite)?;
        Ok(keypair)
    }
}
