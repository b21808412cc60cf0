//! Key material codecs
//!
//! A wallet keypair travels in three shapes: the raw 64 bytes
//! (32-byte secret followed by 32-byte public key), a base58 string as
//! exported by browser wallets, and a loaded `Keypair`. Conversions between
//! them are exact and reject anything that is not a full keypair.

use solana_sdk::signature::{Keypair, Signer};

use crate::domain::result::{Error, Result};

/// Length of a serialized ed25519 keypair
pub const KEYPAIR_LENGTH: usize = 64;

/// Generate a fresh keypair from the OS random source
pub fn generate() -> Keypair {
    Keypair::new()
}

/// Encode raw keypair bytes as base58
pub fn encode_base58(bytes: &[u8]) -> Result<String> {
    check_length(bytes.len())?;
    Ok(bs58::encode(bytes).into_string())
}

/// Decode a base58 private key into raw keypair bytes
pub fn decode_base58(text: &str) -> Result<Vec<u8>> {
    let bytes = bs58::decode(text.trim())
        .into_vec()
        .map_err(|e| Error::malformed_key(format!("invalid base58: {}", e)))?;
    check_length(bytes.len())?;
    Ok(bytes)
}

/// Parse a byte array typed by a human
///
/// Accepts `[1, 2, 3]`, `1,2,3` and whitespace separated values. Every token
/// must be an integer in 0..=255.
pub fn parse_byte_array(text: &str) -> Result<Vec<u8>> {
    let trimmed = text.trim();
    let inner = trimmed
        .strip_prefix('[')
        .and_then(|s| s.strip_suffix(']'))
        .unwrap_or(trimmed);

    let bytes = inner
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|token| !token.is_empty())
        .map(|token| {
            token
                .parse::<u8>()
                .map_err(|_| Error::malformed_key(format!("'{}' is not a byte value (0-255)", token)))
        })
        .collect::<Result<Vec<u8>>>()?;

    check_length(bytes.len())?;
    Ok(bytes)
}

/// Format bytes the way wallet files store them: `[1,2,3]`
pub fn format_byte_array(bytes: &[u8]) -> String {
    let items: Vec<String> = bytes.iter().map(|b| b.to_string()).collect();
    format!("[{}]", items.join(","))
}

/// Load a signing keypair from raw bytes
pub fn keypair_from_bytes(bytes: &[u8]) -> Result<Keypair> {
    check_length(bytes.len())?;
    #[allow(deprecated)]
    let keypair = Keypair::from_bytes(bytes)
        .map_err(|e| Error::malformed_key(format!("invalid keypair bytes: {}", e)))?;

    // A signature made with a mismatched public half does not verify.
    let signature = keypair.sign_message(VERIFY_MESSAGE);
    if !signature.verify(keypair.pubkey().as_ref(), VERIFY_MESSAGE) {
        return Err(Error::malformed_key(
            "public key half does not match the secret key",
        ));
    }
    Ok(keypair)
}

const VERIFY_MESSAGE: &[u8] = b"I verify my Solana Keypair!";

fn check_length(len: usize) -> Result<()> {
    if len != KEYPAIR_LENGTH {
        return Err(Error::malformed_key(format!(
            "expected {} bytes, got {}",
            KEYPAIR_LENGTH, len
        )));
    }
    Ok(())
}
