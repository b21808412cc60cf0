//! Lamport arithmetic and display

use rust_decimal::Decimal;

use crate::domain::result::{Error, Result};

/// Lamports in one SOL
pub const LAMPORTS_PER_SOL: u64 = 1_000_000_000;

/// Convert lamports to a SOL amount for display (exact, 9 decimal places)
pub fn to_sol(lamports: u64) -> Decimal {
    Decimal::from_i128_with_scale(lamports as i128, 9).normalize()
}

/// Amount that empties `balance` once `fee` has been paid
pub fn drain_amount(balance: u64, fee: u64) -> Result<u64> {
    balance.checked_sub(fee).ok_or(Error::InsufficientFunds {
        balance,
        required: fee,
    })
}

/// Check that `balance` covers `amount` plus `fee`
pub fn ensure_covers(balance: u64, amount: u64, fee: u64) -> Result<()> {
    let required = amount.checked_add(fee).ok_or_else(|| {
        Error::Other(format!("{} + {} lamports overflows", amount, fee))
    })?;
    if balance < required {
        return Err(Error::InsufficientFunds { balance, required });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drain_amount_exact() {
        assert_eq!(drain_amount(1_000_000_000, 5_000).unwrap(), 999_995_000);
        assert_eq!(drain_amount(5_000, 5_000).unwrap(), 0);
        assert_eq!(drain_amount(u64::MAX, 0).unwrap(), u64::MAX);
    }

    #[test]
    fn test_drain_amount_never_wraps() {
        match drain_amount(3_000, 5_000) {
            Err(Error::InsufficientFunds { balance, required }) => {
                assert_eq!(balance, 3_000);
                assert_eq!(required, 5_000);
            }
            other => panic!("expected InsufficientFunds, got {:?}", other),
        }
    }

    #[test]
    fn test_ensure_covers() {
        assert!(ensure_covers(100_005_000, 100_000_000, 5_000).is_ok());
        assert!(matches!(
            ensure_covers(100_004_999, 100_000_000, 5_000),
            Err(Error::InsufficientFunds { required: 100_005_000, .. })
        ));
        assert!(ensure_covers(u64::MAX, u64::MAX, 1).is_err());
    }

    #[test]
    fn test_to_sol() {
        assert_eq!(to_sol(2 * LAMPORTS_PER_SOL).to_string(), "2");
        assert_eq!(to_sol(999_995_000).to_string(), "0.999995");
        assert_eq!(to_sol(1).to_string(), "0.000000001");
        assert_eq!(to_sol(0).to_string(), "0");
    }
}
