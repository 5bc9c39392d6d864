//! Ciphertext and proof carriers exchanged with the FHE client.
//!
//! These types are ephemeral: produced for one submission or one
//! decryption round, then discarded. `Debug` implementations expose
//! sizes and fingerprints only, never raw ciphertext or proof bytes.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// On-chain reference to an encrypted value. Never the value itself.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CiphertextHandle(String);

impl CiphertextHandle {
    /// Wrap an existing handle string.
    pub fn new(handle: impl Into<String>) -> Self {
        Self(handle.into())
    }

    /// Derive the devnet handle for a ciphertext: its SHA-256 digest.
    ///
    /// The in-memory chain and the simulated FHE client agree on this
    /// convention so a handle read back from the chain can be resolved
    /// against the simulator's ledger.
    #[must_use]
    pub fn from_ciphertext(ciphertext: &[u8]) -> Self {
        Self(format!("0x{}", fingerprint(ciphertext)))
    }

    /// Get the handle as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CiphertextHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Ciphertext plus validity proof for one confidential submission.
///
/// Produced by the FHE client for a (contract address, user address,
/// plaintext) triple. Used exactly once.
#[derive(Clone, Serialize, Deserialize)]
pub struct EncryptedSubmission {
    /// Serialized encrypted value
    pub ciphertext: Vec<u8>,

    /// Validity proof checked by the contract on submission
    pub proof: Vec<u8>,
}

impl EncryptedSubmission {
    /// Create a new submission payload.
    pub fn new(ciphertext: Vec<u8>, proof: Vec<u8>) -> Self {
        Self { ciphertext, proof }
    }
}

impl std::fmt::Debug for EncryptedSubmission {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EncryptedSubmission")
            .field("ciphertext_bytes", &self.ciphertext.len())
            .field("proof_bytes", &self.proof.len())
            .field("fingerprint", &fingerprint(&self.ciphertext))
            .finish()
    }
}

/// Output of a decryption round: revealed cleartexts plus the proof
/// material the caller submits on-chain.
///
/// The caller performs the on-chain submission itself; the FHE client
/// never submits on the caller's behalf.
#[derive(Clone, Serialize, Deserialize)]
pub struct DecryptionShare {
    /// Revealed cleartext per requested handle
    pub clear_values: HashMap<CiphertextHandle, u64>,

    /// ABI-encoded cleartexts, passed verbatim to the contract
    pub clear_values_abi: Vec<u8>,

    /// Decryption proof, checked by the contract before the verification
    /// flag is flipped
    pub proof: Vec<u8>,
}

impl DecryptionShare {
    /// Look up the revealed cleartext for a handle.
    #[must_use]
    pub fn value_for(&self, handle: &CiphertextHandle) -> Option<u64> {
        self.clear_values.get(handle).copied()
    }
}

impl std::fmt::Debug for DecryptionShare {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DecryptionShare")
            .field("handles", &self.clear_values.len())
            .field("abi_bytes", &self.clear_values_abi.len())
            .field("proof_bytes", &self.proof.len())
            .finish()
    }
}

/// Compute a short identification fingerprint using SHA-256.
///
/// The first 8 bytes of the digest, hex-encoded. Identification only,
/// never a substitute for the full proof.
pub(crate) fn fingerprint(bytes: &[u8]) -> String {
    use sha2::{Digest, Sha256};

    let mut hasher = Sha256::new();
    hasher.update(bytes);
    let result = hasher.finalize();

    result[..8]
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect::<Vec<_>>()
        .join("")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_submission_debug_no_leak() {
        let submission = EncryptedSubmission::new(vec![1, 2, 3, 4, 5], vec![9, 9]);
        let debug_output = format!("{submission:?}");

        assert!(!debug_output.contains("1, 2, 3"));
        assert!(debug_output.contains("fingerprint"));
    }

    #[test]
    fn test_handle_derivation_deterministic() {
        let a = CiphertextHandle::from_ciphertext(&[0xde, 0xad]);
        let b = CiphertextHandle::from_ciphertext(&[0xde, 0xad]);
        let c = CiphertextHandle::from_ciphertext(&[0xbe, 0xef]);
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert!(a.as_str().starts_with("0x"));
    }

    #[test]
    fn test_share_value_lookup() {
        let handle = CiphertextHandle::new("0xabc");
        let mut clear_values = HashMap::new();
        clear_values.insert(handle.clone(), 7u64);
        let share = DecryptionShare {
            clear_values,
            clear_values_abi: vec![],
            proof: vec![],
        };
        assert_eq!(share.value_for(&handle), Some(7));
        assert_eq!(share.value_for(&CiphertextHandle::new("0xdef")), None);
    }
}
