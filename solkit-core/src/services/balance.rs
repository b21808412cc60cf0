//! Balance service - account balance report

use std::sync::Arc;

use rust_decimal::Decimal;
use serde::Serialize;
use solana_sdk::pubkey::Pubkey;

use crate::domain::lamports::to_sol;
use crate::domain::network::Commitment;
use crate::domain::result::Result;
use crate::ports::RpcConnection;

/// Balance of one address
#[derive(Debug, Clone, Serialize)]
pub struct BalanceReport {
    pub address: String,
    pub lamports: u64,
    pub sol: Decimal,
    /// Rent-exempt minimum for an account with no data
    pub rent_exempt_minimum: u64,
}

/// Balance service
pub struct BalanceService {
    rpc: Arc<dyn RpcConnection>,
    commitment: Commitment,
}

impl BalanceService {
    pub fn new(rpc: Arc<dyn RpcConnection>, commitment: Commitment) -> Self {
        Self { rpc, commitment }
    }

    pub async fn report(&self, address: &Pubkey) -> Result<BalanceReport> {
        let lamports = self.rpc.get_balance(address, self.commitment).await?;
        let rent_exempt_minimum = self.rpc.get_minimum_balance_for_rent_exemption(0).await?;

        Ok(BalanceReport {
            address: address.to_string(),
            lamports,
            sol: to_sol(lamports),
            rent_exempt_minimum,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::MemoryLedger;
    use std::str::FromStr;

    #[tokio::test]
    async fn test_report() {
        let ledger = Arc::new(MemoryLedger::new());
        let address = Pubkey::new_unique();
        ledger.fund(&address, 1_500_000_000);

        let report = BalanceService::new(ledger, Commitment::Confirmed)
            .report(&address)
            .await
            .unwrap();
        assert_eq!(report.lamports, 1_500_000_000);
        assert_eq!(report.sol, Decimal::from_str("1.5").unwrap());
        assert_eq!(report.rent_exempt_minimum, 890_880);
    }
}
