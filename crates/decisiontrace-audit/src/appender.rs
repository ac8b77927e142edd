//! The chain appender: the only code path that writes records.
//!
//! One append is one critical section on the store: read the tail hash,
//! stamp identity and time, hash, and write. The store's
//! `append_exclusive` holds its writer lock across all of it, so concurrent
//! appenders are strictly serialized and can never fork the chain.

use chrono::{SubsecRound, Utc};
use serde_json::Value;
use tracing::info;

use decisiontrace_contracts::{
    error::{TraceError, TraceResult},
    record::{DecisionId, DecisionInput, DecisionRecord},
};
use decisiontrace_core::{
    traits::DecisionStore,
    validate::{check_input, validate_candidate},
};

use crate::chain::{record_hash, tail_hash};

/// Extends the hash chain held by a store.
///
/// ```rust,ignore
/// let store = JsonlFileStore::from_config(&config);
/// let record = ChainAppender::new(&store).append(input)?;
/// println!("{} {}", record.decision_id, record.hash);
/// ```
pub struct ChainAppender<'s, S: DecisionStore + ?Sized> {
    store: &'s S,
}

impl<'s, S: DecisionStore + ?Sized> ChainAppender<'s, S> {
    pub fn new(store: &'s S) -> Self {
        Self { store }
    }

    /// Validate a raw JSON candidate, then append it.
    pub fn append_json(&self, candidate: &Value) -> TraceResult<DecisionRecord> {
        let input = validate_candidate(candidate)?;
        self.append(input)
    }

    /// Append one decision and return the record exactly as written.
    ///
    /// Fails with `Validation` before touching the store if the input is
    /// unusable, and with `StoreWrite` if the store could not persist the
    /// line, in which case the chain keeps its previous length.
    pub fn append(&self, input: DecisionInput) -> TraceResult<DecisionRecord> {
        check_input(&input)?;

        let mut written: Option<DecisionRecord> = None;
        self.store.append_exclusive(&mut |lines| {
            let mut record = DecisionRecord {
                decision_id: DecisionId::new(),
                timestamp: Utc::now().trunc_subsecs(6),
                model: input.model.clone(),
                config: input.config.clone(),
                prompt: input.prompt.clone(),
                context_sources: input.context_sources.clone(),
                output: input.output.clone(),
                confidence: input.confidence,
                risk_flags: input.risk_flags.clone(),
                prev_hash: tail_hash(lines),
                hash: String::new(),
            };
            record.hash = record_hash(&record)?;

            let line = serde_json::to_string(&record).map_err(|e| TraceError::Serialization {
                reason: format!("failed to serialize record {}: {}", record.decision_id, e),
            })?;
            written = Some(record);
            Ok(line)
        })?;

        let record = written.ok_or_else(|| TraceError::StoreWrite {
            reason: "store reported success without building a record".to_string(),
        })?;

        info!(
            decision_id = %record.decision_id,
            model = %record.model,
            prev_hash = %record.prev_hash,
            hash = %record.hash,
            "decision appended"
        );

        Ok(record)
    }
}
