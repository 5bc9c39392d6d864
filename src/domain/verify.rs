//! Per-record decrypt-and-verify lifecycle.

use serde::{Deserialize, Serialize};

/// State of a record's confidential field on the client.
///
/// `Verified` is terminal. A failed or rejected round returns the record
/// to `Unverified`, from which verification can be retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum VerifyState {
    /// No proof-checked decryption has been observed for this record
    #[default]
    Unverified,
    /// A decrypt-and-verify round is in flight
    Verifying,
    /// The on-chain verification flag is set; the revealed value is canonical
    Verified,
}

/// Rejected state transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("invalid verify transition: {from:?} -> {to}")]
pub struct InvalidTransition {
    /// State the transition was attempted from
    pub from: VerifyState,
    /// Name of the attempted target state
    pub to: &'static str,
}

impl VerifyState {
    /// Start a verification round. Legal only from `Unverified`.
    ///
    /// # Errors
    /// Returns `InvalidTransition` from `Verifying` (a round is already in
    /// flight) or `Verified` (terminal; verify must short-circuit instead).
    pub fn begin(self) -> Result<Self, InvalidTransition> {
        match self {
            Self::Unverified => Ok(Self::Verifying),
            from => Err(InvalidTransition {
                from,
                to: "Verifying",
            }),
        }
    }

    /// Record on-chain confirmation. Legal from `Verifying`; idempotent
    /// from `Verified` (a concurrent verifier may have won the race).
    ///
    /// # Errors
    /// Returns `InvalidTransition` from `Unverified`.
    pub fn confirm(self) -> Result<Self, InvalidTransition> {
        match self {
            Self::Verifying | Self::Verified => Ok(Self::Verified),
            from => Err(InvalidTransition {
                from,
                to: "Verified",
            }),
        }
    }

    /// The round failed or was rejected; return to a retryable state.
    ///
    /// # Errors
    /// Returns `InvalidTransition` from `Verified` — a terminal state is
    /// never rolled back.
    pub fn reset(self) -> Result<Self, InvalidTransition> {
        match self {
            Self::Unverified | Self::Verifying => Ok(Self::Unverified),
            from => Err(InvalidTransition {
                from,
                to: "Unverified",
            }),
        }
    }

    /// Whether a round is currently in flight.
    #[must_use]
    pub fn is_in_flight(self) -> bool {
        self == Self::Verifying
    }

    /// Whether the terminal state has been reached.
    #[must_use]
    pub fn is_verified(self) -> bool {
        self == Self::Verified
    }
}
