//! Service layer - one service per procedure
//!
//! Services orchestrate domain logic over the `RpcConnection` port. Each
//! mutating service owns a `Submitter` for signing and confirmation.

mod airdrop;
mod balance;
mod enrollment;
mod idl;
pub mod logging;
pub mod submit;
mod transfer;
mod wallet;

pub use airdrop::{AirdropReceipt, AirdropService};
pub use balance::{BalanceReport, BalanceService};
pub use enrollment::{EnrollmentReport, EnrollmentService, EnrollmentStatus, SubmitReceipt};
pub use idl::{FetchedIdl, IdlService};
pub use logging::{LogEntry, LogEvent, LoggingService};
pub use submit::{ConfirmOptions, Submitter, MAX_TRANSACTION_SIZE};
pub use transfer::{DrainReceipt, FeeQuote, TransferReceipt, TransferService};
pub use wallet::WalletService;
