//! Full-chain verification.
//!
//! Every line is checked against two rules:
//!
//! 1. **Linkage**: the record's `prev_hash` equals the recomputed hash of the
//!    preceding decodable record (or the genesis digest for the first).
//! 2. **Content**: the record's stored `hash` equals the digest of its own
//!    canonical content.
//!
//! All findings are collected before returning. The expected linkage value
//! advances to the *recomputed* hash, so one edited record produces a
//! `Tamper` finding on its own line and a `ChainLink` finding on the next,
//! and nothing further. An undecodable line is a gap: it is reported and the
//! expected linkage value is left untouched.

use tracing::{debug, warn};

use decisiontrace_contracts::{
    error::TraceResult,
    record::DecisionRecord,
    report::{ChainFinding, FindingKind, VerificationReport},
};
use decisiontrace_core::traits::DecisionStore;

use crate::chain::{canonicalize, decode_line, digest};

/// Read every line of `store` and verify the chain.
///
/// Only a failure to read the store is an error; corruption is reported
/// through the returned `VerificationReport`.
pub fn verify_store<S>(store: &S) -> TraceResult<VerificationReport>
where
    S: DecisionStore + ?Sized,
{
    let lines = store.read_lines()?;
    Ok(verify_lines(&lines))
}

/// Verify an in-order sequence of serialized records.
///
/// An empty sequence is valid.
pub fn verify_lines(lines: &[String]) -> VerificationReport {
    let mut expected_prev = DecisionRecord::GENESIS_HASH.to_string();
    let mut findings: Vec<ChainFinding> = Vec::new();

    for (idx, line) in lines.iter().enumerate() {
        let line_no = idx + 1;

        let (fields, record) = match decode_line(line) {
            Ok(decoded) => decoded,
            Err(reason) => {
                warn!(line = line_no, %reason, "undecodable record");
                findings.push(ChainFinding {
                    line: line_no,
                    kind: FindingKind::Decode { reason },
                });
                continue;
            }
        };

        // Rule 1: linkage to the predecessor.
        if record.prev_hash != expected_prev {
            warn!(
                line = line_no,
                decision_id = %record.decision_id,
                found = %record.prev_hash,
                expected = %expected_prev,
                "chain link mismatch"
            );
            findings.push(ChainFinding {
                line: line_no,
                kind: FindingKind::ChainLink {
                    expected: expected_prev.clone(),
                    found: record.prev_hash.clone(),
                },
            });
        }

        // Rule 2: content hash.
        let recomputed = match canonicalize(&fields) {
            Ok(bytes) => digest(&bytes),
            Err(e) => {
                findings.push(ChainFinding {
                    line: line_no,
                    kind: FindingKind::Decode {
                        reason: e.to_string(),
                    },
                });
                continue;
            }
        };
        if record.hash != recomputed {
            warn!(
                line = line_no,
                decision_id = %record.decision_id,
                stored = %record.hash,
                %recomputed,
                "record content does not match its hash"
            );
            findings.push(ChainFinding {
                line: line_no,
                kind: FindingKind::Tamper {
                    stored: record.hash.clone(),
                    recomputed: recomputed.clone(),
                },
            });
        }

        expected_prev = recomputed;
    }

    let valid = findings.is_empty();
    debug!(
        lines_checked = lines.len(),
        finding_count = findings.len(),
        valid,
        "chain verification complete"
    );

    VerificationReport {
        valid,
        lines_checked: lines.len(),
        findings,
    }
}
