//! Wallet port: connection status and the active address.

use crate::domain::Address;

/// Trait for the wallet/account provider.
///
/// Every flow is a no-op (with a user-facing message) while disconnected.
pub trait WalletProvider: Send + Sync {
    /// Whether a wallet is currently connected.
    fn is_connected(&self) -> bool;

    /// The active address, if connected.
    fn address(&self) -> Option<Address>;
}
