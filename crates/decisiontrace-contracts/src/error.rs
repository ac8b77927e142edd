//! Error types for the DecisionTrace core.
//!
//! Only failures that stop an operation live here. Problems found while
//! verifying a log are reported as findings in a `VerificationReport`, not
//! as errors.

use thiserror::Error;

/// The unified error type for DecisionTrace.
#[derive(Debug, Error)]
pub enum TraceError {
    /// The candidate decision is missing required fields or is malformed.
    ///
    /// Nothing is written when this is returned.
    #[error("invalid decision input: {reason}")]
    Validation {
        reason: String,
        /// Required fields that were absent or null, in declaration order.
        missing: Vec<String>,
    },

    /// The store could not persist a record. The chain keeps its previous
    /// length.
    #[error("store write failed: {reason}")]
    StoreWrite { reason: String },

    /// The store could not be read at all.
    #[error("store read failed: {reason}")]
    StoreRead { reason: String },

    /// A configuration file is missing or invalid.
    #[error("configuration error: {reason}")]
    Config { reason: String },

    /// A record could not be converted to or from JSON.
    #[error("serialization error: {reason}")]
    Serialization { reason: String },
}

impl TraceError {
    /// Build a `Validation` error for a non-empty list of missing fields.
    pub fn missing_fields(missing: Vec<String>) -> Self {
        Self::Validation {
            reason: format!("missing required fields: {}", missing.join(", ")),
            missing,
        }
    }
}

/// Convenience alias used throughout the DecisionTrace crates.
pub type TraceResult<T> = Result<T, TraceError>;
