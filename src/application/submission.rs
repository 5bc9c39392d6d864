//! Confidential submission: encrypt the severity client-side, then submit.

use std::sync::Arc;

use chrono::Utc;

use crate::application::store::{StateStore, StatusBanner};
use crate::application::sync::SyncService;
use crate::domain::{RecordDraft, RecordId};
use crate::ports::{
    ChainError, FheClient, PendingTransaction, RegistryReader, RegistryWriter, WalletProvider,
};
use crate::CipherregError;

/// Service that creates records with an encrypted confidential field.
pub struct SubmissionService<F, W, C, R>
where
    F: FheClient,
    W: WalletProvider,
    C: RegistryWriter,
    R: RegistryReader,
{
    fhe: Arc<F>,
    wallet: Arc<W>,
    writer: Arc<C>,
    sync: Arc<SyncService<R>>,
    store: Arc<StateStore>,
}

impl<F, W, C, R> SubmissionService<F, W, C, R>
where
    F: FheClient,
    W: WalletProvider,
    C: RegistryWriter,
    R: RegistryReader,
{
    /// Create a new submission service.
    pub fn new(
        fhe: Arc<F>,
        wallet: Arc<W>,
        writer: Arc<C>,
        sync: Arc<SyncService<R>>,
        store: Arc<StateStore>,
    ) -> Self {
        Self {
            fhe,
            wallet,
            writer,
            sync,
            store,
        }
    }

    /// Encrypt the draft's severity and submit the record on-chain.
    ///
    /// Guards run in order, all before any encryption call: wallet
    /// connected, FHE client ready, draft valid. On confirmation the
    /// registry is re-synced so the new record appears.
    ///
    /// # Errors
    /// - `NotConnected` when no wallet is connected (banner shown)
    /// - `NotInitialized` when the FHE client is not ready
    /// - `Validation` for an empty name or out-of-range severity
    /// - `Busy` when a submission is already in flight
    /// - `Chain`/`Fhe` for collaborator failures; a user-declined
    ///   signature surfaces a distinct "Transaction rejected" banner
    pub fn submit(&self, draft: &RecordDraft) -> Result<RecordId, CipherregError> {
        let Some(user) = self.wallet.address().filter(|_| self.wallet.is_connected()) else {
            self.store
                .set_banner(StatusBanner::error("Please connect wallet first", Utc::now()));
            return Err(CipherregError::NotConnected);
        };
        if !self.fhe.is_initialized() {
            self.store
                .set_banner(StatusBanner::error("FHE system not ready", Utc::now()));
            return Err(CipherregError::NotInitialized);
        }
        draft.validate().map_err(CipherregError::Validation)?;

        if !self.store.try_begin_submit() {
            return Err(CipherregError::Busy("submission"));
        }
        let result = self.submit_inner(draft, &user);
        self.store.end_submit();

        match result {
            Ok(id) => {
                tracing::info!(record = %id, creator = %user.short(), "record created");
                Ok(id)
            }
            Err(e) => {
                let message = match &e {
                    CipherregError::Chain(ChainError::Rejected) => "Transaction rejected",
                    _ => "Creation failed",
                };
                tracing::warn!(error = %e, "record creation failed");
                self.store
                    .set_banner(StatusBanner::error(message, Utc::now()));
                Err(e)
            }
        }
    }

    fn submit_inner(
        &self,
        draft: &RecordDraft,
        user: &crate::domain::Address,
    ) -> Result<RecordId, CipherregError> {
        self.store
            .set_banner(StatusBanner::pending("Creating record with FHE..."));

        let id = RecordId::generate(Utc::now());
        let contract = self.sync.reader().contract_address();

        let payload = self
            .fhe
            .encrypt(&contract, user, u64::from(draft.severity))?;
        tracing::debug!(record = %id, payload = ?payload, "severity encrypted");

        // The severity is echoed as the first public field; the contract
        // keeps only the ciphertext confidential.
        let tx = self.writer.submit_record(
            &id,
            &draft.name,
            &payload,
            u64::from(draft.severity),
            0,
            &draft.description,
        )?;

        self.store
            .set_banner(StatusBanner::pending("Waiting for confirmation..."));
        tx.wait()?;

        self.store
            .set_banner(StatusBanner::success("Record created!", Utc::now()));

        if let Err(e) = self.sync.sync() {
            tracing::warn!(error = %e, "post-submission sync failed");
        }
        Ok(id)
    }
}
