//! # Cipherreg
//!
//! Client-side flows for a confidential disease registry backed by a smart
//! contract that keeps severity values under Fully Homomorphic Encryption.
//!
//! This crate provides:
//! - Registry sync with per-record fault isolation and aggregate statistics
//! - Encrypt-before-submit record creation
//! - A decrypt-and-verify round trip that only trusts proof-checked values
//!
//! ## Architecture
//!
//! The crate follows Hexagonal Architecture:
//! - `domain`: Core business types (records, stats, ciphertext carriers)
//! - `ports`: Trait definitions for the external collaborators (registry
//!   contract, FHE client, wallet)
//! - `adapters`: In-process stand-ins (devnet chain, simulated FHE, wallet)
//! - `application`: Flow services and the observable dashboard state store

pub mod adapters;
pub mod application;
pub mod domain;
pub mod ports;

pub use domain::{DiseaseRecord, RecordDraft, RegistryStats};

/// Result type for Cipherreg operations.
pub type Result<T> = std::result::Result<T, CipherregError>;

/// Main error type for Cipherreg.
#[derive(Debug, thiserror::Error)]
pub enum CipherregError {
    #[error("Wallet not connected")]
    NotConnected,

    #[error("FHE client not initialized")]
    NotInitialized,

    #[error("Chain operation failed: {0}")]
    Chain(#[from] ports::ChainError),

    #[error("FHE operation failed: {0}")]
    Fhe(#[from] ports::FheError),

    #[error("Invalid record data: {0}")]
    Validation(String),

    #[error("Operation already in flight: {0}")]
    Busy(&'static str),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
