//! Cipherreg demo session.
//!
//! Wires the in-process adapters together (composition root) and runs
//! every flow once: FHE session bring-up, registry sync, an encrypted
//! submission, and the decrypt-and-verify round trip.

use std::sync::Arc;

use anyhow::Result;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use cipherreg::adapters::{DevnetChain, SimulatedFhe, StaticWallet};
use cipherreg::application::{
    SessionService, StateStore, SubmissionService, SyncService, VerifyService,
};
use cipherreg::domain::{Address, RecordDraft};

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting cipherreg demo session...");

    let contract = Address::new(
        std::env::var("CIPHERREG_CONTRACT")
            .unwrap_or_else(|_| "0x5FbDB2315678afecb367f032d93F642f64180aa3".to_string()),
    );
    let account = Address::new(
        std::env::var("CIPHERREG_ACCOUNT")
            .unwrap_or_else(|_| "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266".to_string()),
    );
    tracing::info!(contract = %contract.short(), account = %account.short(), "session context");

    let chain = Arc::new(DevnetChain::new(contract, account.clone()));
    let fhe = Arc::new(SimulatedFhe::new());
    let wallet = Arc::new(StaticWallet::new(account));
    let store = Arc::new(StateStore::new());

    // Observer contract: log each banner transition exactly once.
    let last_banner = std::sync::Mutex::new(None::<String>);
    store.subscribe(move |state| {
        let mut last = last_banner
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        let current = state.banner.as_ref().map(|b| b.message.clone());
        if current != *last {
            if let Some(message) = &current {
                tracing::info!("status banner: {message}");
            }
            *last = current;
        }
    });

    let sync = Arc::new(SyncService::new(chain.clone(), store.clone()));
    let session = SessionService::new(fhe.clone(), wallet.clone(), store.clone());
    let submission = SubmissionService::new(
        fhe.clone(),
        wallet.clone(),
        chain.clone(),
        sync.clone(),
        store.clone(),
    );
    let verify = VerifyService::new(fhe, wallet, chain, sync.clone(), store.clone());

    session.ensure_initialized()?;
    sync.sync()?;

    let draft = RecordDraft::new("Influenza A", 7, "Seasonal presentation, outpatient");
    let id = submission.submit(&draft)?;

    let outcome = verify.verify(&id)?;
    tracing::info!(record = %id, ?outcome, "decrypt-and-verify finished");

    // Idempotence check: a second verify short-circuits to the stored value.
    let outcome = verify.verify(&id)?;
    tracing::info!(record = %id, ?outcome, "repeat verify");

    let stats = store.snapshot().stats;
    tracing::info!(
        total = stats.total_records,
        verified = stats.verified_records,
        avg_severity = stats.avg_severity,
        recent = stats.recent_records,
        "registry statistics"
    );

    tracing::info!("Cipherreg demo complete.");
    Ok(())
}
