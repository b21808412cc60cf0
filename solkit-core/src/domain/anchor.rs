//! Anchor encoding helpers
//!
//! Anchor programs address instructions and accounts by the first 8 bytes of
//! `sha256("<namespace>:<name>")`; arguments and account fields are Borsh.

use sha2::{Digest, Sha256};

/// Instruction discriminator: `sha256("global:<name>")[..8]`
pub fn instruction_discriminator(name: &str) -> [u8; 8] {
    discriminator("global", name)
}

/// Account discriminator: `sha256("account:<Name>")[..8]`
pub fn account_discriminator(name: &str) -> [u8; 8] {
    discriminator("account", name)
}

/// Discriminator of the framework's own IDL account
pub fn idl_account_discriminator() -> [u8; 8] {
    discriminator("internal", "IdlAccount")
}

fn discriminator(namespace: &str, name: &str) -> [u8; 8] {
    let digest = Sha256::digest(format!("{}:{}", namespace, name).as_bytes());
    let mut out = [0u8; 8];
    out.copy_from_slice(&digest[..8]);
    out
}

/// Borsh string: u32 little-endian length followed by the UTF-8 bytes
pub fn borsh_string(value: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(4 + value.len());
    out.extend_from_slice(&(value.len() as u32).to_le_bytes());
    out.extend_from_slice(value.as_bytes());
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_discriminators() {
        assert_eq!(
            instruction_discriminator("initialize"),
            [175, 175, 109, 31, 13, 152, 155, 237]
        );
        assert_eq!(
            instruction_discriminator("update"),
            [219, 200, 88, 176, 158, 63, 253, 127]
        );
        assert_eq!(
            instruction_discriminator("submit_ts"),
            [137, 241, 199, 223, 125, 33, 85, 217]
        );
        assert_eq!(
            instruction_discriminator("submit_rs"),
            [77, 124, 82, 163, 21, 133, 181, 206]
        );
        assert_eq!(idl_account_discriminator(), [24, 70, 98, 191, 58, 144, 123, 158]);
    }

    #[test]
    fn test_borsh_string() {
        assert_eq!(borsh_string(""), vec![0, 0, 0, 0]);
        assert_eq!(borsh_string("ab"), vec![2, 0, 0, 0, b'a', b'b']);
    }
}
