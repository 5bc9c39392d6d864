//! Simulated FHE client: deterministic local stand-in for the SDK.
//!
//! Masks plaintexts with a ChaCha20-derived keystream and issues SHA-256
//! digests as validity and decryption proofs. It offers the same
//! observable contract as the real SDK — nothing here is homomorphic or
//! secure, and it must never leave tests and local development.

use std::collections::HashMap;
use std::sync::Mutex;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;
use sha2::{Digest, Sha256};

use crate::domain::{Address, CiphertextHandle, DecryptionShare, EncryptedSubmission};
use crate::ports::{FheClient, FheError};

const NONCE_LEN: usize = 12;

#[derive(Default)]
struct SimState {
    initialized: bool,
    mask_key: [u8; 32],
    /// Handle -> plaintext, so `prepare_decryption` can reveal values this
    /// client encrypted. Stands in for the SDK's key material.
    ledger: HashMap<CiphertextHandle, u64>,
    encrypt_calls: usize,
    decrypt_calls: usize,
    fail_next_init: bool,
}

/// Local FHE simulator.
pub struct SimulatedFhe {
    state: Mutex<SimState>,
}

impl Default for SimulatedFhe {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulatedFhe {
    /// Create an uninitialized simulator.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: Mutex::new(SimState::default()),
        }
    }

    /// Make the next `initialize` call fail. One-shot.
    pub fn fail_next_initialize(&self) {
        self.lock().fail_next_init = true;
    }

    /// Number of `encrypt` calls made so far.
    #[must_use]
    pub fn encrypt_calls(&self) -> usize {
        self.lock().encrypt_calls
    }

    /// Number of `prepare_decryption` calls made so far.
    #[must_use]
    pub fn decrypt_calls(&self) -> usize {
        self.lock().decrypt_calls
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, SimState> {
        self.state
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Keystream for one ciphertext: ChaCha20 seeded from the session key
    /// and the per-ciphertext nonce.
    fn keystream(mask_key: &[u8; 32], nonce: &[u8]) -> [u8; 8] {
        let mut hasher = Sha256::new();
        hasher.update(mask_key);
        hasher.update(nonce);
        let seed: [u8; 32] = hasher.finalize().into();
        let mut rng = ChaCha20Rng::from_seed(seed);
        rng.gen()
    }
}

impl FheClient for SimulatedFhe {
    fn initialize(&self) -> Result<(), FheError> {
        let mut state = self.lock();
        if std::mem::take(&mut state.fail_next_init) {
            return Err(FheError::Initialization(
                "injected initialization failure".to_string(),
            ));
        }
        if state.initialized {
            return Ok(());
        }
        let mut rng = ChaCha20Rng::from_entropy();
        state.mask_key = rng.gen();
        state.initialized = true;
        Ok(())
    }

    fn is_initialized(&self) -> bool {
        self.lock().initialized
    }

    fn encrypt(
        &self,
        contract: &Address,
        user: &Address,
        plaintext: u64,
    ) -> Result<EncryptedSubmission, FheError> {
        let mut state = self.lock();
        if !state.initialized {
            return Err(FheError::NotInitialized);
        }
        state.encrypt_calls += 1;

        let mut rng = ChaCha20Rng::from_entropy();
        let nonce: [u8; NONCE_LEN] = rng.gen();
        let keystream = Self::keystream(&state.mask_key, &nonce);

        let mut ciphertext = Vec::with_capacity(NONCE_LEN + 8);
        ciphertext.extend_from_slice(&nonce);
        for (byte, key_byte) in plaintext.to_le_bytes().iter().zip(keystream.iter()) {
            ciphertext.push(byte ^ key_byte);
        }

        let mut hasher = Sha256::new();
        hasher.update(b"validity-proof");
        hasher.update(contract.as_str().as_bytes());
        hasher.update(user.as_str().as_bytes());
        hasher.update(&ciphertext);
        let proof = hasher.finalize().to_vec();

        let handle = CiphertextHandle::from_ciphertext(&ciphertext);
        state.ledger.insert(handle, plaintext);

        Ok(EncryptedSubmission::new(ciphertext, proof))
    }

    fn prepare_decryption(
        &self,
        handles: &[CiphertextHandle],
        contract: &Address,
    ) -> Result<DecryptionShare, FheError> {
        let mut state = self.lock();
        if !state.initialized {
            return Err(FheError::NotInitialized);
        }
        state.decrypt_calls += 1;

        let mut clear_values = HashMap::with_capacity(handles.len());
        for handle in handles {
            let value = state
                .ledger
                .get(handle)
                .copied()
                .ok_or_else(|| FheError::Decryption(format!("unknown handle {handle}")))?;
            clear_values.insert(handle.clone(), value);
        }

        let clear_values_abi = serde_json::to_vec(&clear_values)
            .map_err(|e| FheError::Decryption(e.to_string()))?;

        let mut hasher = Sha256::new();
        hasher.update(b"decryption-proof");
        hasher.update(contract.as_str().as_bytes());
        hasher.update(&clear_values_abi);
        let proof = hasher.finalize().to_vec();

        Ok(DecryptionShare {
            clear_values,
            clear_values_abi,
            proof,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addresses() -> (Address, Address) {
        (Address::new("0xcontract"), Address::new("0xuser"))
    }

    #[test]
    fn test_requires_initialization() {
        let fhe = SimulatedFhe::new();
        let (contract, user) = addresses();

        assert!(matches!(
            fhe.encrypt(&contract, &user, 7),
            Err(FheError::NotInitialized)
        ));
        assert!(matches!(
            fhe.prepare_decryption(&[], &contract),
            Err(FheError::NotInitialized)
        ));
    }

    #[test]
    fn test_initialize_is_idempotent() {
        let fhe = SimulatedFhe::new();
        fhe.initialize().expect("first");
        fhe.initialize().expect("second");
        assert!(fhe.is_initialized());
    }

    #[test]
    fn test_encrypt_then_reveal() {
        let fhe = SimulatedFhe::new();
        fhe.initialize().expect("init");
        let (contract, user) = addresses();

        let payload = fhe.encrypt(&contract, &user, 7).expect("encrypt");
        assert!(!payload.proof.is_empty());

        let handle = CiphertextHandle::from_ciphertext(&payload.ciphertext);
        let share = fhe
            .prepare_decryption(std::slice::from_ref(&handle), &contract)
            .expect("share");
        assert_eq!(share.value_for(&handle), Some(7));
        assert!(!share.proof.is_empty());
    }

    #[test]
    fn test_ciphertexts_are_not_repeated() {
        let fhe = SimulatedFhe::new();
        fhe.initialize().expect("init");
        let (contract, user) = addresses();

        let a = fhe.encrypt(&contract, &user, 7).expect("encrypt");
        let b = fhe.encrypt(&contract, &user, 7).expect("encrypt");
        assert_ne!(a.ciphertext, b.ciphertext);
    }

    #[test]
    fn test_unknown_handle_fails() {
        let fhe = SimulatedFhe::new();
        fhe.initialize().expect("init");
        let (contract, _) = addresses();

        let err = fhe.prepare_decryption(&[CiphertextHandle::new("0xnope")], &contract);
        assert!(matches!(err, Err(FheError::Decryption(_))));
    }
}
