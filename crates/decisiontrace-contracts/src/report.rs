//! Chain verification report types.
//!
//! The verifier never stops at the first problem. Every discrepancy becomes
//! a `ChainFinding` tied to its 1-indexed line, and the report's `valid`
//! flag is the AND over all lines.

use std::fmt;

use serde::{Deserialize, Serialize};

/// What went wrong on a single line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FindingKind {
    /// The line is not a well-formed decision record.
    Decode { reason: String },

    /// The record's `prev_hash` does not match the recomputed hash of the
    /// preceding record (or the genesis digest on line 1).
    ChainLink { expected: String, found: String },

    /// The record's stored `hash` does not match its recomputed content hash.
    Tamper { stored: String, recomputed: String },
}

/// A single discrepancy located in the log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainFinding {
    /// 1-indexed physical line in the store.
    pub line: usize,
    pub kind: FindingKind,
}

impl fmt::Display for ChainFinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            FindingKind::Decode { reason } => {
                write!(f, "line {}: invalid record: {}", self.line, reason)
            }
            FindingKind::ChainLink { expected, found } => write!(
                f,
                "line {}: prev_hash {} does not match expected {}",
                self.line, found, expected
            ),
            FindingKind::Tamper { stored, recomputed } => write!(
                f,
                "line {}: stored hash {} does not match recomputed {}",
                self.line, stored, recomputed
            ),
        }
    }
}

/// The outcome of verifying an entire log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationReport {
    /// True only if no line produced a finding. An empty log is valid.
    pub valid: bool,
    /// Number of lines examined.
    pub lines_checked: usize,
    /// Every finding, in line order.
    pub findings: Vec<ChainFinding>,
}

impl VerificationReport {
    /// Line number of the first discrepancy, if any.
    pub fn first_failure_line(&self) -> Option<usize> {
        self.findings.first().map(|f| f.line)
    }

    /// All findings reported for `line`.
    pub fn findings_on(&self, line: usize) -> impl Iterator<Item = &ChainFinding> {
        self.findings.iter().filter(move |f| f.line == line)
    }
}
