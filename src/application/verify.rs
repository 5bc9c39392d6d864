//! Decrypt-and-verify: reveal a record's confidential field with an
//! on-chain-checked proof.
//!
//! Per-record state machine: `Unverified -> Verifying -> Verified`
//! (terminal), or back to `Unverified` on failure. Already-verified
//! records short-circuit to the stored cleartext without touching the SDK.

use std::sync::Arc;

use chrono::Utc;

use crate::application::store::{StateStore, StatusBanner};
use crate::application::sync::SyncService;
use crate::domain::{RecordId, VerifyState};
use crate::ports::{
    ChainError, FheClient, FheError, PendingTransaction, RegistryReader, RegistryWriter,
    WalletProvider,
};
use crate::CipherregError;

/// Outcome of a decrypt-and-verify round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerifyOutcome {
    /// The chain had already verified this record; the stored cleartext is
    /// returned without any SDK round trip.
    AlreadyOnChain(u64),

    /// Fresh decryption whose proof was accepted on-chain. The value is
    /// the SDK's cleartext, returned before the re-synced canonical value
    /// is observed (optimistic; see DESIGN.md).
    Revealed(u64),

    /// A concurrent verifier won the race. The registry was re-synced and
    /// no error is surfaced.
    RacedAndSynced,
}

impl VerifyOutcome {
    /// The revealed value, when one is available.
    #[must_use]
    pub fn value(&self) -> Option<u64> {
        match self {
            Self::AlreadyOnChain(v) | Self::Revealed(v) => Some(*v),
            Self::RacedAndSynced => None,
        }
    }
}

/// Service that runs the decrypt-and-verify round trip.
pub struct VerifyService<F, W, C, R>
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

impl<F, W, C, R> VerifyService<F, W, C, R>
where
    F: FheClient,
    W: WalletProvider,
    C: RegistryWriter,
    R: RegistryReader,
{
    /// Create a new verify service.
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

    /// Run one decrypt-and-verify round for a record.
    ///
    /// Idempotent: a record the chain already reports verified
    /// short-circuits to the stored value and never re-submits a proof.
    ///
    /// # Errors
    /// - `NotConnected` when no wallet is connected (banner shown)
    /// - `Busy` when a verify round is already in flight
    /// - `NotInitialized` when the FHE client is not ready
    /// - `Chain`/`Fhe` for collaborator failures; the record returns to a
    ///   retryable state. A concurrent-verification race is not an error.
    pub fn verify(&self, id: &RecordId) -> Result<VerifyOutcome, CipherregError> {
        if !self.wallet.is_connected() {
            self.store
                .set_banner(StatusBanner::error("Connect wallet first", Utc::now()));
            return Err(CipherregError::NotConnected);
        }
        if !self.store.try_begin_verify(id) {
            return Err(CipherregError::Busy("verification"));
        }
        let result = self.verify_inner(id);
        self.store.end_verify();

        match result {
            Ok(outcome) => Ok(outcome),
            Err(e) => {
                tracing::warn!(record = %id, error = %e, "verification failed");
                // Retryable: roll the record back out of Verifying.
                let state = self.store.snapshot().verify_state(id);
                if let Ok(reset) = state.reset() {
                    self.store.set_verify_state(id, reset);
                }
                self.store
                    .set_banner(StatusBanner::error("Decryption failed", Utc::now()));
                Err(e)
            }
        }
    }

    fn verify_inner(&self, id: &RecordId) -> Result<VerifyOutcome, CipherregError> {
        // Short-circuit on records the chain has already verified: the
        // stored cleartext is canonical, no SDK round trip needed.
        let record = self.sync.reader().get_record(id)?;
        if record.is_verified {
            let value = record.decrypted_value.unwrap_or(0);
            self.store.set_verify_state(id, VerifyState::Verified);
            self.store
                .set_banner(StatusBanner::success("Data verified", Utc::now()));
            tracing::info!(record = %id, "record already verified on-chain");
            return Ok(VerifyOutcome::AlreadyOnChain(value));
        }

        if !self.fhe.is_initialized() {
            return Err(CipherregError::NotInitialized);
        }

        let verifying = self
            .store
            .snapshot()
            .verify_state(id)
            .begin()
            .map_err(|e| CipherregError::Validation(e.to_string()))?;
        self.store.set_verify_state(id, verifying);

        let contract = self.sync.reader().contract_address();
        let handle = self.sync.reader().get_encrypted_handle(id)?;
        let share = self
            .fhe
            .prepare_decryption(std::slice::from_ref(&handle), &contract)?;
        tracing::debug!(record = %id, share = ?share, "decryption share prepared");

        self.store
            .set_banner(StatusBanner::pending("Verifying..."));
        let submitted = self
            .writer
            .submit_verification(id, &share.clear_values_abi, &share.proof)
            .and_then(PendingTransaction::wait);

        if let Err(e) = submitted {
            if matches!(e, ChainError::AlreadyVerified) {
                // Race with another verifier: their proof landed first,
                // which is exactly the state this flow wants.
                tracing::info!(record = %id, "verification raced; treating as success");
                self.store.set_verify_state(id, VerifyState::Verified);
                if let Err(sync_err) = self.sync.sync() {
                    tracing::warn!(error = %sync_err, "post-race sync failed");
                }
                self.store
                    .set_banner(StatusBanner::success("Already verified", Utc::now()));
                return Ok(VerifyOutcome::RacedAndSynced);
            }
            return Err(e.into());
        }

        let clear = share.value_for(&handle).ok_or_else(|| {
            FheError::Decryption(format!("SDK returned no cleartext for {handle}"))
        })?;

        self.store.set_verify_state(id, VerifyState::Verified);
        if let Err(e) = self.sync.sync() {
            tracing::warn!(error = %e, "post-verification sync failed");
        }
        self.store
            .set_banner(StatusBanner::success("Decrypted successfully!", Utc::now()));
        tracing::info!(record = %id, "confidential field verified");
        Ok(VerifyOutcome::Revealed(clear))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::{DevnetChain, SimulatedFhe, StaticWallet};
    use crate::application::store::BannerKind;
    use crate::application::submission::SubmissionService;
    use crate::domain::{Address, RecordDraft};

    struct Fixture {
        chain: Arc<DevnetChain>,
        fhe: Arc<SimulatedFhe>,
        store: Arc<StateStore>,
        verify: VerifyService<SimulatedFhe, StaticWallet, DevnetChain, DevnetChain>,
        wallet: Arc<StaticWallet>,
    }

    fn fixture() -> Fixture {
        let chain = Arc::new(DevnetChain::new(
            Address::new("0xcontract"),
            Address::new("0xsigner"),
        ));
        let fhe = Arc::new(SimulatedFhe::new());
        fhe.initialize().expect("init");
        let wallet = Arc::new(StaticWallet::new(Address::new("0xuser")));
        let store = Arc::new(StateStore::new());
        let sync = Arc::new(SyncService::new(chain.clone(), store.clone()));
        let verify = VerifyService::new(
            fhe.clone(),
            wallet.clone(),
            chain.clone(),
            sync,
            store.clone(),
        );
        Fixture {
            chain,
            fhe,
            store,
            verify,
            wallet,
        }
    }

    /// Create a record through the real submission flow.
    fn create_record(f: &Fixture, severity: u8) -> RecordId {
        let sync = Arc::new(SyncService::new(f.chain.clone(), f.store.clone()));
        let submission = SubmissionService::new(
            f.fhe.clone(),
            f.wallet.clone(),
            f.chain.clone(),
            sync,
            f.store.clone(),
        );
        submission
            .submit(&RecordDraft::new("Influenza A", severity, ""))
            .expect("submit")
    }

    #[test]
    fn test_round_trip_reveals_and_flags() {
        let f = fixture();
        let id = create_record(&f, 7);

        let outcome = f.verify.verify(&id).expect("verify");
        assert_eq!(outcome, VerifyOutcome::Revealed(7));

        let state = f.store.snapshot();
        let record = &state.records[0];
        assert!(record.is_verified);
        assert_eq!(record.decrypted_value, Some(7));
        assert_eq!(state.verify_state(&id), VerifyState::Verified);
    }

    #[test]
    fn test_verified_record_short_circuits() {
        let f = fixture();
        let id = create_record(&f, 7);
        f.verify.verify(&id).expect("first verify");
        let calls_after_first = f.fhe.decrypt_calls();

        let outcome = f.verify.verify(&id).expect("second verify");
        assert_eq!(outcome, VerifyOutcome::AlreadyOnChain(7));
        // No further SDK round trip, no proof re-submission.
        assert_eq!(f.fhe.decrypt_calls(), calls_after_first);
    }

    #[test]
    fn test_concurrent_verification_race_is_success() {
        let f = fixture();
        let id = create_record(&f, 7);
        // Another verifier's proof lands between our read and our submit.
        f.chain.race_next_verification(&id);

        let outcome = f.verify.verify(&id).expect("race is not an error");
        assert_eq!(outcome, VerifyOutcome::RacedAndSynced);

        let state = f.store.snapshot();
        assert!(state.records[0].is_verified);
        let banner = state.banner.expect("banner");
        assert_eq!(banner.kind, BannerKind::Success);
        assert_eq!(banner.message, "Already verified");
    }

    #[test]
    fn test_failure_returns_to_retryable_state() {
        let f = fixture();
        let id = create_record(&f, 7);
        f.chain.reject_next_transaction();

        let err = f.verify.verify(&id);
        assert!(err.is_err());

        let state = f.store.snapshot();
        assert_eq!(state.verify_state(&id), VerifyState::Unverified);
        assert_eq!(
            state.banner.as_ref().map(|b| b.message.clone()),
            Some("Decryption failed".to_string())
        );
        assert!(state.verifying.is_none());

        // Retry succeeds.
        let outcome = f.verify.verify(&id).expect("retry");
        assert_eq!(outcome, VerifyOutcome::Revealed(7));
    }

    #[test]
    fn test_disconnected_wallet_blocks_verify() {
        let f = fixture();
        let id = create_record(&f, 7);
        f.wallet.disconnect();

        let err = f.verify.verify(&id);
        assert!(matches!(err, Err(CipherregError::NotConnected)));
        assert_eq!(f.fhe.decrypt_calls(), 0);
    }
}
