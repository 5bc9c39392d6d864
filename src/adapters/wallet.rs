//! Static wallet adapter: fixed address, flip-able connection state.

use std::sync::atomic::{AtomicBool, Ordering};

use crate::domain::Address;
use crate::ports::WalletProvider;

/// Wallet with a fixed address, connected on creation.
pub struct StaticWallet {
    address: Address,
    connected: AtomicBool,
}

impl StaticWallet {
    /// Create a connected wallet for an address.
    pub fn new(address: Address) -> Self {
        Self {
            address,
            connected: AtomicBool::new(true),
        }
    }

    /// Mark the wallet as connected.
    pub fn connect(&self) {
        self.connected.store(true, Ordering::SeqCst);
    }

    /// Mark the wallet as disconnected.
    pub fn disconnect(&self) {
        self.connected.store(false, Ordering::SeqCst);
    }
}

impl WalletProvider for StaticWallet {
    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    fn address(&self) -> Option<Address> {
        self.is_connected().then(|| self.address.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_toggle() {
        let wallet = StaticWallet::new(Address::new("0xuser"));
        assert!(wallet.is_connected());
        assert!(wallet.address().is_some());

        wallet.disconnect();
        assert!(!wallet.is_connected());
        assert!(wallet.address().is_none());

        wallet.connect();
        assert!(wallet.is_connected());
    }
}
