//! In-memory chain adapter: implementation of the registry ports.
//!
//! Models the registry contract for tests and local development:
//! insertion-ordered records, one ciphertext handle per record, and the
//! contract's verification-flag semantics (a second proof submission for
//! the same record fails with `AlreadyVerified`). Failure injection
//! hooks cover the flows' error paths.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use chrono::Utc;

use crate::domain::{Address, CiphertextHandle, DiseaseRecord, EncryptedSubmission, RecordId};
use crate::ports::{ChainError, PendingTransaction, RegistryReader, RegistryWriter};

struct StoredRecord {
    record: DiseaseRecord,
    handle: CiphertextHandle,
    // Submitted but never read back, like the contract's description field.
    #[allow(dead_code)]
    description: String,
}

#[derive(Default)]
struct ChainState {
    order: Vec<RecordId>,
    records: HashMap<RecordId, StoredRecord>,
    read_failures: HashSet<RecordId>,
    raced: HashSet<RecordId>,
    reject_next: bool,
}

/// Single-node in-memory chain.
pub struct DevnetChain {
    state: Mutex<ChainState>,
    contract: Address,
    signer: Address,
}

impl DevnetChain {
    /// Create an empty chain with a contract address and a signer.
    pub fn new(contract: Address, signer: Address) -> Self {
        Self {
            state: Mutex::new(ChainState::default()),
            contract,
            signer,
        }
    }

    /// Make every subsequent `get_record` for this id fail, until cleared.
    pub fn inject_read_failure(&self, id: &RecordId) {
        self.lock().read_failures.insert(id.clone());
    }

    /// Clear all injected read failures.
    pub fn clear_read_failures(&self) {
        self.lock().read_failures.clear();
    }

    /// Make the next transaction fail as user-rejected.
    pub fn reject_next_transaction(&self) {
        self.lock().reject_next = true;
    }

    /// Simulate a concurrent verifier winning the race for this record:
    /// the next `submit_verification` finds the flag already set and
    /// fails with `AlreadyVerified`.
    pub fn race_next_verification(&self, id: &RecordId) {
        self.lock().raced.insert(id.clone());
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, ChainState> {
        self.state
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    fn decode_clear_value(clear_values_abi: &[u8], handle: &CiphertextHandle) -> Result<u64, ChainError> {
        // Devnet ABI convention: a JSON map of handle -> cleartext.
        let values: HashMap<String, u64> = serde_json::from_slice(clear_values_abi)
            .map_err(|e| ChainError::Rpc(format!("malformed cleartext encoding: {e}")))?;
        values
            .get(handle.as_str())
            .copied()
            .ok_or_else(|| ChainError::Rpc(format!("no cleartext submitted for {handle}")))
    }
}

/// Devnet transactions confirm (or fail) immediately on `wait`.
pub struct DevnetTx {
    result: Result<(), ChainError>,
}

impl PendingTransaction for DevnetTx {
    fn wait(self) -> Result<(), ChainError> {
        self.result
    }
}

impl RegistryReader for DevnetChain {
    fn list_record_ids(&self) -> Result<Vec<RecordId>, ChainError> {
        Ok(self.lock().order.clone())
    }

    fn get_record(&self, id: &RecordId) -> Result<DiseaseRecord, ChainError> {
        let state = self.lock();
        if state.read_failures.contains(id) {
            return Err(ChainError::Rpc(format!("injected read failure for {id}")));
        }
        state
            .records
            .get(id)
            .map(|stored| stored.record.clone())
            .ok_or_else(|| ChainError::RecordNotFound(id.to_string()))
    }

    fn get_encrypted_handle(&self, id: &RecordId) -> Result<CiphertextHandle, ChainError> {
        self.lock()
            .records
            .get(id)
            .map(|stored| stored.handle.clone())
            .ok_or_else(|| ChainError::RecordNotFound(id.to_string()))
    }

    fn contract_address(&self) -> Address {
        self.contract.clone()
    }
}

impl RegistryWriter for DevnetChain {
    type Tx = DevnetTx;

    fn submit_record(
        &self,
        id: &RecordId,
        name: &str,
        submission: &EncryptedSubmission,
        public_value1: u64,
        public_value2: u64,
        description: &str,
    ) -> Result<Self::Tx, ChainError> {
        let mut state = self.lock();
        if std::mem::take(&mut state.reject_next) {
            return Err(ChainError::Rejected);
        }
        if submission.proof.is_empty() {
            return Err(ChainError::Rpc("invalid validity proof".to_string()));
        }
        if state.records.contains_key(id) {
            return Err(ChainError::Rpc(format!("record {id} already exists")));
        }

        let handle = CiphertextHandle::from_ciphertext(&submission.ciphertext);
        let record = DiseaseRecord {
            id: id.clone(),
            name: name.to_string(),
            public_value1,
            public_value2,
            timestamp: Utc::now().timestamp(),
            creator: self.signer.clone(),
            is_verified: false,
            decrypted_value: None,
        };
        state.order.push(id.clone());
        state.records.insert(
            id.clone(),
            StoredRecord {
                record,
                handle,
                description: description.to_string(),
            },
        );

        Ok(DevnetTx { result: Ok(()) })
    }

    fn submit_verification(
        &self,
        id: &RecordId,
        clear_values_abi: &[u8],
        proof: &[u8],
    ) -> Result<Self::Tx, ChainError> {
        let mut state = self.lock();
        if std::mem::take(&mut state.reject_next) {
            return Err(ChainError::Rejected);
        }
        if proof.is_empty() {
            return Err(ChainError::Rpc("invalid decryption proof".to_string()));
        }

        let raced = state.raced.remove(id);
        let Some(stored) = state.records.get_mut(id) else {
            return Err(ChainError::RecordNotFound(id.to_string()));
        };

        let value = Self::decode_clear_value(clear_values_abi, &stored.handle)?;
        if raced {
            // The competing proof landed first; its value is already final.
            stored.record.is_verified = true;
            stored.record.decrypted_value.get_or_insert(value);
            return Err(ChainError::AlreadyVerified);
        }
        if stored.record.is_verified {
            return Err(ChainError::AlreadyVerified);
        }

        stored.record.is_verified = true;
        stored.record.decrypted_value = Some(value);
        Ok(DevnetTx { result: Ok(()) })
    }
}
