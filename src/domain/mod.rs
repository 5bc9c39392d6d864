//! Domain layer: core registry types.
//!
//! Pure types with strict validation. Nothing in here touches a chain,
//! a wallet, or the FHE SDK.

mod crypto;
mod record;
mod stats;
mod verify;

pub use crypto::{CiphertextHandle, DecryptionShare, EncryptedSubmission};
pub use record::{Address, DiseaseRecord, RecordDraft, RecordId, SEVERITY_MAX, SEVERITY_MIN};
pub use stats::RegistryStats;
pub use verify::{InvalidTransition, VerifyState};
