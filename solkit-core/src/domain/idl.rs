//! On-chain IDL account layout
//!
//! Anchor publishes a program's IDL in an account derived with
//! `create_with_seed(base, "anchor:idl", program)` where `base` is the
//! program's PDA for an empty seed list. The account holds:
//!
//! | bytes       | field                        |
//! |-------------|------------------------------|
//! | 0..8        | discriminator                |
//! | 8..40       | authority pubkey             |
//! | 40..44      | u32 LE length of the payload |
//! | 44..44+len  | zlib-compressed IDL JSON     |

use std::io::Read;

use flate2::read::ZlibDecoder;
use serde_json::Value as JsonValue;
use solana_sdk::pubkey::Pubkey;

use crate::domain::anchor::idl_account_discriminator;
use crate::domain::result::{Error, Result};

/// Seed passed to `create_with_seed` for the IDL account
pub const IDL_SEED: &str = "anchor:idl";

const HEADER_LEN: usize = 8 + 32 + 4;

/// Address of the account holding a program's IDL
pub fn idl_address(program_id: &Pubkey) -> Result<Pubkey> {
    let (base, _) = Pubkey::find_program_address(&[], program_id);
    Pubkey::create_with_seed(&base, IDL_SEED, program_id)
        .map_err(|e| Error::Other(format!("failed to derive IDL address: {}", e)))
}

/// A decoded IDL account
#[derive(Debug, Clone)]
pub struct IdlAccount {
    pub authority: Pubkey,
    pub idl: JsonValue,
}

/// Decode raw IDL account data
pub fn decode_idl_account(data: &[u8]) -> Result<IdlAccount> {
    if data.len() < HEADER_LEN {
        return Err(Error::Other(format!(
            "IDL account too small: {} bytes",
            data.len()
        )));
    }
    if data[..8] != idl_account_discriminator() {
        return Err(Error::Other(
            "account is not an IDL account (discriminator mismatch)".to_string(),
        ));
    }

    let mut authority = [0u8; 32];
    authority.copy_from_slice(&data[8..40]);

    let mut len_bytes = [0u8; 4];
    len_bytes.copy_from_slice(&data[40..44]);
    let len = u32::from_le_bytes(len_bytes) as usize;

    let compressed = data.get(HEADER_LEN..HEADER_LEN + len).ok_or_else(|| {
        Error::Other(format!(
            "IDL payload truncated: header says {} bytes, account has {}",
            len,
            data.len() - HEADER_LEN
        ))
    })?;

    let mut json = Vec::new();
    ZlibDecoder::new(compressed)
        .read_to_end(&mut json)
        .map_err(|e| Error::Other(format!("failed to inflate IDL: {}", e)))?;

    Ok(IdlAccount {
        authority: Pubkey::new_from_array(authority),
        idl: serde_json::from_slice(&json)?,
    })
}

#[cfg(test)]
pub(crate) fn encode_idl_account(authority: &Pubkey, idl: &JsonValue) -> Vec<u8> {
    use std::io::Write;

    use flate2::write::ZlibEncoder;
    use flate2::Compression;

    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder
        .write_all(serde_json::to_string(idl).unwrap().as_bytes())
        .unwrap();
    let compressed = encoder.finish().unwrap();

    let mut data = idl_account_discriminator().to_vec();
    data.extend_from_slice(authority.as_ref());
    data.extend_from_slice(&(compressed.len() as u32).to_le_bytes());
    data.extend_from_slice(&compressed);
    data
}
