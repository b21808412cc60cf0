//! Adapter implementations (hexagonal architecture)
//!
//! Concrete implementations of the port traits.

pub mod memory;
pub mod rpc_client;

pub use memory::MemoryLedger;
pub use rpc_client::SolanaRpcClient;
