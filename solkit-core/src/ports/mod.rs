//! Port definitions (hexagonal architecture)
//!
//! Ports define the interfaces for external dependencies. Services depend
//! only on these traits, never on a concrete transport.

mod rpc;

pub use rpc::{AccountInfo, LatestBlockhash, RpcConnection, SendOptions, SignatureStatus};
