//! Registry sync: fetch identifiers, fetch each record, replace the list.

use std::sync::Arc;

use chrono::Utc;

use crate::application::store::{StateStore, StatusBanner};
use crate::ports::RegistryReader;
use crate::CipherregError;

/// Service that mirrors the on-chain registry into the state store.
pub struct SyncService<R>
where
    R: RegistryReader,
{
    reader: Arc<R>,
    store: Arc<StateStore>,
}

impl<R> SyncService<R>
where
    R: RegistryReader,
{
    /// Create a new sync service.
    pub fn new(reader: Arc<R>, store: Arc<StateStore>) -> Self {
        Self { reader, store }
    }

    /// The read-only contract handle.
    #[must_use]
    pub fn reader(&self) -> &R {
        &self.reader
    }

    /// The shared state store.
    #[must_use]
    pub fn store(&self) -> &Arc<StateStore> {
        &self.store
    }

    /// Fetch every record and replace the cached list wholesale.
    ///
    /// A record that fails to load is logged and skipped; one bad record
    /// never aborts the listing. Re-entrant: overlapping calls each replace
    /// the full list, so the last writer wins and no stale merge occurs.
    ///
    /// # Errors
    /// Returns `CipherregError::Chain` only when the identifier listing
    /// itself fails; an error banner is surfaced in that case.
    pub fn sync(&self) -> Result<(), CipherregError> {
        self.store.begin_sync();
        let result = self.sync_inner();
        self.store.end_sync();

        if let Err(e) = &result {
            tracing::warn!(error = %e, "registry sync failed");
            self.store
                .set_banner(StatusBanner::error("Failed to load data", Utc::now()));
        }
        result
    }

    fn sync_inner(&self) -> Result<(), CipherregError> {
        let ids = self.reader.list_record_ids()?;

        let mut records = Vec::with_capacity(ids.len());
        for id in &ids {
            match self.reader.get_record(id) {
                Ok(record) => records.push(record),
                Err(e) => {
                    tracing::warn!(record = %id, error = %e, "skipping record that failed to load");
                }
            }
        }

        tracing::info!(
            total = records.len(),
            skipped = ids.len() - records.len(),
            "registry synced"
        );
        self.store.replace_records(records, Utc::now());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::{DevnetChain, SimulatedFhe};
    use crate::domain::{Address, RecordId};
    use crate::ports::{FheClient, PendingTransaction, RegistryWriter};

    fn submit(chain: &DevnetChain, fhe: &SimulatedFhe, id: &str, severity: u64) {
        let payload = fhe
            .encrypt(
                &chain.contract_address(),
                &Address::new("0xuser"),
                severity,
            )
            .expect("encrypt");
        chain
            .submit_record(&RecordId::new(id), id, &payload, severity, 0, "")
            .expect("submit")
            .wait()
            .expect("confirm");
    }

    fn setup() -> (Arc<DevnetChain>, SimulatedFhe, Arc<StateStore>) {
        let chain = Arc::new(DevnetChain::new(
            Address::new("0xcontract"),
            Address::new("0xsigner"),
        ));
        let fhe = SimulatedFhe::new();
        fhe.initialize().expect("init");
        (chain, fhe, Arc::new(StateStore::new()))
    }

    #[test]
    fn test_sync_mirrors_chain() {
        let (chain, fhe, store) = setup();
        submit(&chain, &fhe, "a", 4);
        submit(&chain, &fhe, "b", 6);

        let sync = SyncService::new(chain, store.clone());
        sync.sync().expect("sync");

        let state = store.snapshot();
        assert_eq!(state.records.len(), 2);
        assert_eq!(state.records[0].id, RecordId::new("a"));
        assert_eq!(state.records[1].id, RecordId::new("b"));
        assert_eq!(state.stats.total_records, 2);
        assert!((state.stats.avg_severity - 5.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_failed_record_is_skipped() {
        let (chain, fhe, store) = setup();
        submit(&chain, &fhe, "a", 4);
        submit(&chain, &fhe, "b", 6);
        submit(&chain, &fhe, "c", 8);
        chain.inject_read_failure(&RecordId::new("b"));

        let sync = SyncService::new(chain, store.clone());
        sync.sync().expect("sync succeeds despite one bad record");

        let state = store.snapshot();
        assert_eq!(state.records.len(), 2);
        assert_eq!(state.stats.total_records, 2);
        assert!(state.records.iter().all(|r| r.id != RecordId::new("b")));
    }

    #[test]
    fn test_repeat_sync_is_last_write_wins() {
        let (chain, fhe, store) = setup();
        submit(&chain, &fhe, "a", 4);

        let sync = SyncService::new(chain.clone(), store.clone());
        sync.sync().expect("first sync");

        // Contract state moves between syncs.
        submit(&chain, &fhe, "b", 6);
        sync.sync().expect("second sync");

        let state = store.snapshot();
        let ids: Vec<_> = state.records.iter().map(|r| r.id.clone()).collect();
        assert_eq!(ids, vec![RecordId::new("a"), RecordId::new("b")]);
        // No duplicate entries from the earlier sync.
        assert_eq!(state.records.len(), 2);
    }
}
