//! Registry contract ports: read-only and signer-bound handles.
//!
//! The contract owns all record data; these traits are the only way the
//! application observes or mutates it.

use crate::domain::{Address, CiphertextHandle, DiseaseRecord, EncryptedSubmission, RecordId};

/// Error type for chain operations.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ChainError {
    #[error("RPC call failed: {0}")]
    Rpc(String),

    #[error("Transaction rejected by user")]
    Rejected,

    /// Another verifier's proof landed first. Flows treat this as success.
    #[error("Data already verified")]
    AlreadyVerified,

    #[error("Record not found: {0}")]
    RecordNotFound(String),
}

/// Read-only contract handle.
pub trait RegistryReader: Send + Sync {
    /// Fetch every record identifier, in contract enumeration order.
    ///
    /// # Errors
    /// Returns `ChainError::Rpc` if the listing call fails.
    fn list_record_ids(&self) -> Result<Vec<RecordId>, ChainError>;

    /// Fetch the public fields of one record.
    ///
    /// # Errors
    /// Returns `ChainError::RecordNotFound` for unknown identifiers and
    /// `ChainError::Rpc` for node failures.
    fn get_record(&self, id: &RecordId) -> Result<DiseaseRecord, ChainError>;

    /// Fetch the ciphertext handle for a record's confidential field.
    ///
    /// # Errors
    /// Returns `ChainError::RecordNotFound` for unknown identifiers.
    fn get_encrypted_handle(&self, id: &RecordId) -> Result<CiphertextHandle, ChainError>;

    /// Address of the registry contract (encryption context).
    fn contract_address(&self) -> Address;
}

/// A submitted transaction awaiting confirmation.
pub trait PendingTransaction {
    /// Block until the transaction is confirmed.
    ///
    /// # Errors
    /// Returns a chain/node error if confirmation fails.
    fn wait(self) -> Result<(), ChainError>;
}

/// Signer-bound contract handle.
pub trait RegistryWriter: Send + Sync {
    /// Pending-transaction handle returned by submissions.
    type Tx: PendingTransaction;

    /// Submit a new record carrying a ciphertext, its validity proof, and
    /// the public fields.
    ///
    /// # Errors
    /// Returns `ChainError::Rejected` if the user declines the signature,
    /// or `ChainError::Rpc` for node failures.
    #[allow(clippy::too_many_arguments)]
    fn submit_record(
        &self,
        id: &RecordId,
        name: &str,
        submission: &EncryptedSubmission,
        public_value1: u64,
        public_value2: u64,
        description: &str,
    ) -> Result<Self::Tx, ChainError>;

    /// Submit a decryption proof. The contract flips the record's
    /// verification flag if the proof checks out.
    ///
    /// # Errors
    /// Returns `ChainError::AlreadyVerified` when a concurrent verifier won
    /// the race, `ChainError::Rejected` on declined signature, or
    /// `ChainError::Rpc` for node failures.
    fn submit_verification(
        &self,
        id: &RecordId,
        clear_values_abi: &[u8],
        proof: &[u8],
    ) -> Result<Self::Tx, ChainError>;
}
