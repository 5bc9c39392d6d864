//! Aggregate statistics over the synced record list.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::record::DiseaseRecord;

/// Recency window for `recent_records`: seven days.
const RECENT_WINDOW_SECS: i64 = 60 * 60 * 24 * 7;

/// Derived statistics, recomputed on every sync.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct RegistryStats {
    /// Total number of records in the registry
    pub total_records: usize,

    /// Records whose confidential field passed on-chain verification
    pub verified_records: usize,

    /// Mean of `public_value1` across all records (0.0 when empty)
    pub avg_severity: f64,

    /// Records created within the last seven days
    pub recent_records: usize,
}

impl RegistryStats {
    /// Compute statistics for a record list at a given instant.
    ///
    /// Pure function of `(records, now)` so tests can pin the clock.
    #[must_use]
    pub fn compute(records: &[DiseaseRecord], now: DateTime<Utc>) -> Self {
        let total_records = records.len();
        let verified_records = records.iter().filter(|r| r.is_verified).count();
        let avg_severity = if records.is_empty() {
            0.0
        } else {
            let sum: f64 = records.iter().map(|r| r.public_value1 as f64).sum();
            sum / total_records as f64
        };
        let recent_records = records
            .iter()
            .filter(|r| now.timestamp() - r.timestamp < RECENT_WINDOW_SECS)
            .count();

        Self {
            total_records,
            verified_records,
            avg_severity,
            recent_records,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Address, RecordId};
    use chrono::Duration;

    fn record(id: &str, public_value1: u64, timestamp: i64, verified: bool) -> DiseaseRecord {
        DiseaseRecord {
            id: RecordId::new(id),
            name: format!("disease {id}"),
            public_value1,
            public_value2: 0,
            timestamp,
            creator: Address::new("0x1234567890abcdef1234567890abcdef12345678"),
            is_verified: verified,
            decrypted_value: verified.then_some(public_value1),
        }
    }

    #[test]
    fn test_empty_stats() {
        let stats = RegistryStats::compute(&[], Utc::now());
        assert_eq!(stats.total_records, 0);
        assert_eq!(stats.verified_records, 0);
        assert_eq!(stats.recent_records, 0);
        assert!(stats.avg_severity.abs() < f64::EPSILON);
    }

    #[test]
    fn test_recency_and_average() {
        let now = Utc::now();
        let records = vec![
            record("a", 4, (now - Duration::days(1)).timestamp(), false),
            record("b", 9, (now - Duration::days(8)).timestamp(), false),
            record("c", 2, (now - Duration::hours(3)).timestamp(), false),
        ];

        let stats = RegistryStats::compute(&records, now);
        assert_eq!(stats.total_records, 3);
        assert_eq!(stats.recent_records, 2);
        assert!((stats.avg_severity - 5.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_verified_count() {
        let now = Utc::now();
        let records = vec![
            record("a", 3, now.timestamp(), true),
            record("b", 5, now.timestamp(), false),
            record("c", 8, now.timestamp(), true),
        ];

        let stats = RegistryStats::compute(&records, now);
        assert_eq!(stats.verified_records, 2);
    }
}
