//! Observable dashboard state store.
//!
//! Replaces implicit re-render-on-state-change with an explicit
//! subscription contract: every transition notifies registered listeners
//! with a fresh snapshot. Flow services hold the store by `Arc` and are
//! pure orchestration over (current state, event) -> (next state).
//!
//! In-flight flags provide the mutual exclusion a browser UI gets from
//! disabled buttons: submit and verify refuse to start while their flag
//! is set. Sync stays re-entrant and replaces the whole record list, so
//! overlapping syncs resolve last-write-wins.

use std::collections::HashMap;
use std::sync::Mutex;

use chrono::{DateTime, Duration, Utc};

use crate::domain::{DiseaseRecord, RecordId, RegistryStats, VerifyState};

/// Kind of a transient status banner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BannerKind {
    /// Operation in flight
    Pending,
    /// Operation completed
    Success,
    /// Operation failed
    Error,
}

/// How long a success banner stays up.
const SUCCESS_BANNER_SECS: i64 = 2;
/// How long an error banner stays up.
const ERROR_BANNER_SECS: i64 = 3;

/// Transient status banner with an absolute expiry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusBanner {
    /// Banner kind
    pub kind: BannerKind,
    /// User-facing message
    pub message: String,
    /// Absolute expiry. Pending banners carry none; they are replaced by
    /// the flow's outcome banner.
    pub expires_at: Option<DateTime<Utc>>,
}

impl StatusBanner {
    /// A pending banner without expiry.
    pub fn pending(message: impl Into<String>) -> Self {
        Self {
            kind: BannerKind::Pending,
            message: message.into(),
            expires_at: None,
        }
    }

    /// A success banner, auto-dismissed after two seconds.
    pub fn success(message: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            kind: BannerKind::Success,
            message: message.into(),
            expires_at: Some(now + Duration::seconds(SUCCESS_BANNER_SECS)),
        }
    }

    /// An error banner, auto-dismissed after three seconds.
    pub fn error(message: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            kind: BannerKind::Error,
            message: message.into(),
            expires_at: Some(now + Duration::seconds(ERROR_BANNER_SECS)),
        }
    }

    /// Whether the banner should be dismissed at `now`.
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|t| now >= t)
    }
}

/// Snapshot of everything the dashboard renders.
#[derive(Debug, Clone, Default)]
pub struct DashboardState {
    /// Cached record list, contract enumeration order
    pub records: Vec<DiseaseRecord>,

    /// Statistics derived from `records`
    pub stats: RegistryStats,

    /// Per-record verification lifecycle
    pub verify_states: HashMap<RecordId, VerifyState>,

    /// Current status banner, if any
    pub banner: Option<StatusBanner>,

    /// A sync is in flight (informational; sync is re-entrant)
    pub syncing: bool,

    /// The FHE client is initializing
    pub fhe_initializing: bool,

    /// A submission is in flight
    pub submitting: bool,

    /// The record a verify round is in flight for, if any
    pub verifying: Option<RecordId>,
}

impl DashboardState {
    /// Verification state for a record, defaulting to `Unverified`.
    #[must_use]
    pub fn verify_state(&self, id: &RecordId) -> VerifyState {
        self.verify_states.get(id).copied().unwrap_or_default()
    }
}

type Listener = Box<dyn Fn(&DashboardState) + Send + Sync>;

/// Shared state store. Listeners are notified after every transition.
pub struct StateStore {
    state: Mutex<DashboardState>,
    listeners: Mutex<Vec<Listener>>,
}

impl Default for StateStore {
    fn default() -> Self {
        Self::new()
    }
}

impl StateStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: Mutex::new(DashboardState::default()),
            listeners: Mutex::new(Vec::new()),
        }
    }

    /// Clone the current state.
    #[must_use]
    pub fn snapshot(&self) -> DashboardState {
        self.lock_state().clone()
    }

    /// Register a listener called with a snapshot after every transition.
    pub fn subscribe(&self, listener: impl Fn(&DashboardState) + Send + Sync + 'static) {
        self.lock_listeners().push(Box::new(listener));
    }

    /// Apply a transition, then notify listeners with the new snapshot.
    pub fn update(&self, f: impl FnOnce(&mut DashboardState)) {
        let snapshot = {
            let mut state = self.lock_state();
            f(&mut state);
            state.clone()
        };
        for listener in self.lock_listeners().iter() {
            listener(&snapshot);
        }
    }

    /// Replace the whole record list and recompute stats.
    ///
    /// Also reconciles verify states: records the chain reports as
    /// verified become `Verified`, and states for identifiers that no
    /// longer exist are dropped.
    pub fn replace_records(&self, records: Vec<DiseaseRecord>, now: DateTime<Utc>) {
        self.update(|s| {
            s.stats = RegistryStats::compute(&records, now);
            let mut states = HashMap::new();
            for record in &records {
                let state = if record.is_verified {
                    VerifyState::Verified
                } else {
                    s.verify_state(&record.id)
                };
                states.insert(record.id.clone(), state);
            }
            s.verify_states = states;
            s.records = records;
        });
    }

    /// Show a banner, replacing any current one.
    pub fn set_banner(&self, banner: StatusBanner) {
        self.update(|s| s.banner = Some(banner));
    }

    /// Dismiss an expired banner. Call from the host's timer loop.
    pub fn tick(&self, now: DateTime<Utc>) {
        let expired = self
            .lock_state()
            .banner
            .as_ref()
            .is_some_and(|b| b.is_expired(now));
        if expired {
            self.update(|s| s.banner = None);
        }
    }

    /// Record the verification state for a record.
    pub fn set_verify_state(&self, id: &RecordId, state: VerifyState) {
        self.update(|s| {
            s.verify_states.insert(id.clone(), state);
        });
    }

    /// Mark a sync as started. Informational only: sync is re-entrant.
    pub fn begin_sync(&self) {
        self.update(|s| s.syncing = true);
    }

    /// Mark the sync as finished.
    pub fn end_sync(&self) {
        self.update(|s| s.syncing = false);
    }

    /// Try to claim the FHE-initialization flag.
    pub fn try_begin_init(&self) -> bool {
        self.claim(|s| &mut s.fhe_initializing)
    }

    /// Release the FHE-initialization flag.
    pub fn end_init(&self) {
        self.update(|s| s.fhe_initializing = false);
    }

    /// Try to claim the submission flag. Returns `false` when a
    /// submission is already in flight.
    pub fn try_begin_submit(&self) -> bool {
        self.claim(|s| &mut s.submitting)
    }

    /// Release the submission flag.
    pub fn end_submit(&self) {
        self.update(|s| s.submitting = false);
    }

    /// Try to claim the verify flag for a record. Returns `false` when a
    /// verify round is already in flight for any record.
    pub fn try_begin_verify(&self, id: &RecordId) -> bool {
        let claimed = {
            let mut state = self.lock_state();
            if state.verifying.is_some() {
                false
            } else {
                state.verifying = Some(id.clone());
                true
            }
        };
        if claimed {
            self.notify();
        }
        claimed
    }

    /// Release the verify flag.
    pub fn end_verify(&self) {
        self.update(|s| s.verifying = None);
    }

    fn claim(&self, flag: impl FnOnce(&mut DashboardState) -> &mut bool) -> bool {
        let claimed = {
            let mut state = self.lock_state();
            let flag = flag(&mut state);
            if *flag {
                false
            } else {
                *flag = true;
                true
            }
        };
        if claimed {
            self.notify();
        }
        claimed
    }

    fn notify(&self) {
        let snapshot = self.lock_state().clone();
        for listener in self.lock_listeners().iter() {
            listener(&snapshot);
        }
    }

    // A poisoned lock still holds the last consistent snapshot; recover it
    // rather than propagate a panic into every flow.
    fn lock_state(&self) -> std::sync::MutexGuard<'_, DashboardState> {
        self.state.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    fn lock_listeners(&self) -> std::sync::MutexGuard<'_, Vec<Listener>> {
        self.listeners
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Address;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn record(id: &str, verified: bool) -> DiseaseRecord {
        DiseaseRecord {
            id: RecordId::new(id),
            name: id.to_string(),
            public_value1: 5,
            public_value2: 0,
            timestamp: Utc::now().timestamp(),
            creator: Address::new("0xcreator"),
            is_verified: verified,
            decrypted_value: verified.then_some(5),
        }
    }

    #[test]
    fn test_listeners_notified_on_update() {
        let store = StateStore::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let calls_in = calls.clone();
        store.subscribe(move |_| {
            calls_in.fetch_add(1, Ordering::SeqCst);
        });

        store.set_banner(StatusBanner::pending("working"));
        store.begin_sync();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_replace_records_reconciles_verify_states() {
        let store = StateStore::new();
        let gone = RecordId::new("gone");
        store.set_verify_state(&gone, VerifyState::Verifying);

        store.replace_records(vec![record("a", true), record("b", false)], Utc::now());

        let state = store.snapshot();
        assert_eq!(state.records.len(), 2);
        assert_eq!(state.verify_state(&RecordId::new("a")), VerifyState::Verified);
        assert_eq!(state.verify_state(&RecordId::new("b")), VerifyState::Unverified);
        // Dropped with its record.
        assert!(!state.verify_states.contains_key(&gone));
    }

    #[test]
    fn test_banner_expiry_sweep() {
        let store = StateStore::new();
        let now = Utc::now();
        store.set_banner(StatusBanner::success("done", now));

        store.tick(now + Duration::seconds(1));
        assert!(store.snapshot().banner.is_some());

        store.tick(now + Duration::seconds(2));
        assert!(store.snapshot().banner.is_none());
    }

    #[test]
    fn test_pending_banner_never_expires() {
        let store = StateStore::new();
        store.set_banner(StatusBanner::pending("working"));
        store.tick(Utc::now() + Duration::days(1));
        assert!(store.snapshot().banner.is_some());
    }

    #[test]
    fn test_submit_flag_is_exclusive() {
        let store = StateStore::new();
        assert!(store.try_begin_submit());
        assert!(!store.try_begin_submit());
        store.end_submit();
        assert!(store.try_begin_submit());
    }

    #[test]
    fn test_verify_flag_is_exclusive() {
        let store = StateStore::new();
        let a = RecordId::new("a");
        let b = RecordId::new("b");
        assert!(store.try_begin_verify(&a));
        assert!(!store.try_begin_verify(&b));
        store.end_verify();
        assert!(store.try_begin_verify(&b));
    }
}
