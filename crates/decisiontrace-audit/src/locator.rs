//! Record lookup by decision ID.

use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use decisiontrace_contracts::{error::TraceResult, record::DecisionRecord};
use decisiontrace_core::traits::DecisionStore;

/// Find the first record whose `decision_id` equals `decision_id`.
///
/// Lines that do not parse are skipped, as is a matching line whose shape
/// is not a full record. `Ok(None)` means the ID is not in the log; `Err`
/// is returned only when the store itself cannot be read.
pub fn locate<S>(store: &S, decision_id: &str) -> TraceResult<Option<DecisionRecord>>
where
    S: DecisionStore + ?Sized,
{
    let lines = store.read_lines()?;

    for (idx, line) in lines.iter().enumerate() {
        let Ok(value) = serde_json::from_str::<Value>(line) else {
            debug!(line = idx + 1, "skipping undecodable line");
            continue;
        };
        if value.get("decision_id").and_then(Value::as_str) != Some(decision_id) {
            continue;
        }
        match DecisionRecord::deserialize(&value) {
            Ok(record) => return Ok(Some(record)),
            Err(e) => {
                warn!(
                    line = idx + 1,
                    %decision_id,
                    error = %e,
                    "matching line is not a well-formed record; continuing scan"
                );
            }
        }
    }

    debug!(%decision_id, lines_scanned = lines.len(), "decision not found");
    Ok(None)
}
