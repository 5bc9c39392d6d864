//! FHE client port: Trait for the external encryption SDK.
//!
//! Encryption, proof generation, and decryption all happen inside the SDK;
//! this trait only sequences them. Decryption is two-phase: the SDK returns
//! the cleartexts and proof, and the caller submits the proof on-chain
//! itself — the SDK never performs chain writes on the caller's behalf.

use crate::domain::{Address, CiphertextHandle, DecryptionShare, EncryptedSubmission};

/// Error type for FHE client operations.
#[derive(Debug, Clone, thiserror::Error)]
pub enum FheError {
    #[error("FHE client not initialized")]
    NotInitialized,

    #[error("Initialization failed: {0}")]
    Initialization(String),

    #[error("Encryption failed: {0}")]
    Encryption(String),

    #[error("Decryption failed: {0}")]
    Decryption(String),
}

/// Trait for the FHE SDK.
pub trait FheClient: Send + Sync {
    /// Initialize the client. Idempotent; must complete before any
    /// encrypt or decrypt call.
    ///
    /// # Errors
    /// Returns `FheError::Initialization` on failure; a retry is safe.
    fn initialize(&self) -> Result<(), FheError>;

    /// Whether the client has completed initialization.
    fn is_initialized(&self) -> bool;

    /// Encrypt a plaintext for a (contract, user) context, producing the
    /// ciphertext and its validity proof.
    ///
    /// # Errors
    /// Returns `FheError::NotInitialized` before `initialize`, or
    /// `FheError::Encryption` on SDK failure.
    fn encrypt(
        &self,
        contract: &Address,
        user: &Address,
        plaintext: u64,
    ) -> Result<EncryptedSubmission, FheError>;

    /// Produce cleartexts and a decryption proof for on-chain ciphertext
    /// handles. May internally require local key material and signatures;
    /// opaque here.
    ///
    /// # Errors
    /// Returns `FheError::NotInitialized` before `initialize`, or
    /// `FheError::Decryption` when a handle cannot be resolved.
    fn prepare_decryption(
        &self,
        handles: &[CiphertextHandle],
        contract: &Address,
    ) -> Result<DecryptionShare, FheError>;
}
