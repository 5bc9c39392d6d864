//! Disease record types and submission drafts.

use serde::{Deserialize, Serialize};

/// Lowest severity a record may carry.
pub const SEVERITY_MIN: u8 = 1;
/// Highest severity a record may carry.
pub const SEVERITY_MAX: u8 = 10;

/// Identifier of a record, in contract enumeration order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RecordId(String);

impl RecordId {
    /// Wrap an existing on-chain identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a fresh submission-time identifier: `disease-<unix-millis>`.
    #[must_use]
    pub fn generate(now: chrono::DateTime<chrono::Utc>) -> Self {
        Self(format!("disease-{}", now.timestamp_millis()))
    }

    /// Get the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RecordId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Wallet or contract address.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Address(String);

impl Address {
    /// Wrap an address string.
    pub fn new(addr: impl Into<String>) -> Self {
        Self(addr.into())
    }

    /// Get the address as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Elided form for display and logs: first six and last four characters.
    #[must_use]
    pub fn short(&self) -> String {
        let chars: Vec<char> = self.0.chars().collect();
        if chars.len() <= 10 {
            return self.0.clone();
        }
        let head: String = chars[..6].iter().collect();
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("{head}…{tail}")
    }
}

impl std::fmt::Display for Address {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A registry record as read back from the contract.
///
/// This is a read-only cached copy; the contract owns the data. The
/// `decrypted_value` is canonical only once `is_verified` is set — an
/// SDK-reported cleartext that has not passed on-chain proof checking
/// must not be treated as trustworthy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiseaseRecord {
    /// On-chain identifier
    pub id: RecordId,

    /// Display name of the disease
    pub name: String,

    /// First public numeric field (severity echoed publicly at submission)
    pub public_value1: u64,

    /// Second public numeric field
    pub public_value2: u64,

    /// Creation time, seconds since epoch (contract representation)
    pub timestamp: i64,

    /// Address that submitted the record
    pub creator: Address,

    /// Whether the confidential field passed proof-checked decryption
    pub is_verified: bool,

    /// Revealed cleartext, present once verified
    pub decrypted_value: Option<u64>,
}

/// User-entered fields for a new record.
///
/// Validated at the edge, before any encryption call is made.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordDraft {
    /// Disease name (required)
    pub name: String,

    /// Severity level, integer in `[SEVERITY_MIN, SEVERITY_MAX]`.
    /// This is the confidential field: encrypted client-side before
    /// submission.
    pub severity: u8,

    /// Free-text description (submitted on-chain, not read back)
    pub description: String,
}

impl RecordDraft {
    /// Create a new draft.
    pub fn new(name: impl Into<String>, severity: u8, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            severity,
            description: description.into(),
        }
    }

    /// Validate the draft.
    ///
    /// # Errors
    /// Returns a human-readable message when the name is empty or the
    /// severity falls outside `[SEVERITY_MIN, SEVERITY_MAX]`.
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("Disease name is required".to_string());
        }
        if !(SEVERITY_MIN..=SEVERITY_MAX).contains(&self.severity) {
            return Err(format!(
                "Severity {} out of range [{SEVERITY_MIN}, {SEVERITY_MAX}]",
                self.severity
            ));
        }
        Ok(())
    }
}
