//! FHE session bring-up after wallet connection.

use std::sync::Arc;

use chrono::Utc;

use crate::application::store::{StateStore, StatusBanner};
use crate::ports::{FheClient, WalletProvider};
use crate::CipherregError;

/// Service that brings the FHE client up once a wallet is connected.
pub struct SessionService<F, W>
where
    F: FheClient,
    W: WalletProvider,
{
    fhe: Arc<F>,
    wallet: Arc<W>,
    store: Arc<StateStore>,
}

impl<F, W> SessionService<F, W>
where
    F: FheClient,
    W: WalletProvider,
{
    /// Create a new session service.
    pub fn new(fhe: Arc<F>, wallet: Arc<W>, store: Arc<StateStore>) -> Self {
        Self { fhe, wallet, store }
    }

    /// Initialize the FHE client if it is not already up.
    ///
    /// No-op while the wallet is disconnected, when the client is already
    /// initialized, or when another initialization is in flight. A failure
    /// surfaces an error banner and leaves the session retryable.
    ///
    /// # Errors
    /// Returns `CipherregError::Fhe` if initialization fails.
    pub fn ensure_initialized(&self) -> Result<(), CipherregError> {
        if !self.wallet.is_connected() {
            return Ok(());
        }
        if self.fhe.is_initialized() {
            return Ok(());
        }
        if !self.store.try_begin_init() {
            return Ok(());
        }

        let result = self.fhe.initialize();
        self.store.end_init();

        match result {
            Ok(()) => {
                tracing::info!("FHE client initialized");
                Ok(())
            }
            Err(e) => {
                tracing::warn!(error = %e, "FHE initialization failed");
                self.store
                    .set_banner(StatusBanner::error("FHE initialization failed", Utc::now()));
                Err(e.into())
            }
        }
    }
}
