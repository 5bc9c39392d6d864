//! Ports layer: Trait definitions for external collaborators.
//!
//! Following Hexagonal Architecture, these traits define the boundaries
//! between the application and the systems it cannot own: the registry
//! contract, the FHE SDK, and the wallet provider.

mod fhe;
mod registry;
mod wallet;

pub use fhe::{FheClient, FheError};
pub use registry::{ChainError, PendingTransaction, RegistryReader, RegistryWriter};
pub use wallet::WalletProvider;
