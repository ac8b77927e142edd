//! Hash-chain primitives: canonical encoding, digest, and tail lookup.
//!
//! The canonical form of a record is its JSON object with the `hash` key
//! removed, written as compact JSON with object keys sorted bytewise at
//! every depth (including inside `config`). Scalars use serde_json's own
//! encoding, so a record read back from the log re-encodes to the same
//! bytes it was hashed from.
//!
//! Key order is imposed here rather than inherited from `serde_json::Map`,
//! whose iteration order depends on the `preserve_order` feature.

use serde::Deserialize;
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};
use tracing::warn;

use decisiontrace_contracts::{
    error::{TraceError, TraceResult},
    record::DecisionRecord,
};

/// The key excluded from the canonical form.
pub const HASH_FIELD: &str = "hash";

/// Produce the canonical bytes of a record's top-level fields, `hash`
/// excluded.
pub fn canonicalize(fields: &Map<String, Value>) -> TraceResult<Vec<u8>> {
    let mut out = Vec::new();
    write_object(fields, Some(HASH_FIELD), &mut out).map_err(|e| TraceError::Serialization {
        reason: format!("failed to canonicalize record: {}", e),
    })?;
    Ok(out)
}

/// SHA-256 of `bytes` as a lowercase 64-character hex string.
pub fn digest(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

/// Recompute the content hash of a typed record.
///
/// The stored `record.hash` is ignored.
pub fn record_hash(record: &DecisionRecord) -> TraceResult<String> {
    let value = serde_json::to_value(record).map_err(|e| TraceError::Serialization {
        reason: format!("failed to serialize record {}: {}", record.decision_id, e),
    })?;
    let Value::Object(fields) = value else {
        return Err(TraceError::Serialization {
            reason: format!("record {} did not serialize to an object", record.decision_id),
        });
    };
    Ok(digest(&canonicalize(&fields)?))
}

/// The hash a new record must link to.
///
/// Scans from the end for the last line that decodes as a record, using the
/// same rule as the verifier, so a line the verifier treats as a gap is a
/// gap here too. Undecodable trailing lines are skipped with a warning; a
/// log with no decodable line links to the genesis digest.
pub fn tail_hash(lines: &[String]) -> String {
    for (idx, line) in lines.iter().enumerate().rev() {
        if let Ok((_, record)) = decode_line(line) {
            return record.hash;
        }
        warn!(
            line = idx + 1,
            "skipping undecodable line while locating chain tail; the chain may be broken"
        );
    }
    DecisionRecord::GENESIS_HASH.to_string()
}

/// Parse one stored line into its raw field map and its typed record.
///
/// The raw map is what gets hashed, so keys the typed record does not know
/// about still count toward the digest.
pub fn decode_line(line: &str) -> Result<(Map<String, Value>, DecisionRecord), String> {
    let value: Value = serde_json::from_str(line).map_err(|e| format!("invalid JSON: {}", e))?;
    if !value.is_object() {
        return Err("not a decision record: expected a JSON object".to_string());
    }
    let record = DecisionRecord::deserialize(&value)
        .map_err(|e| format!("not a decision record: {}", e))?;
    match value {
        Value::Object(fields) => Ok((fields, record)),
        _ => Err("not a decision record: expected a JSON object".to_string()),
    }
}

// ── Canonical writer ──────────────────────────────────────────────────────────

fn write_value(value: &Value, out: &mut Vec<u8>) -> serde_json::Result<()> {
    match value {
        Value::Object(map) => write_object(map, None, out),
        Value::Array(items) => {
            out.push(b'[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(b',');
                }
                write_value(item, out)?;
            }
            out.push(b']');
            Ok(())
        }
        scalar => serde_json::to_writer(&mut *out, scalar),
    }
}

fn write_object(
    map: &Map<String, Value>,
    skip: Option<&str>,
    out: &mut Vec<u8>,
) -> serde_json::Result<()> {
    let mut entries: Vec<(&String, &Value)> = map
        .iter()
        .filter(|(key, _)| Some(key.as_str()) != skip)
        .collect();
    entries.sort_by(|a, b| a.0.cmp(b.0));

    out.push(b'{');
    for (i, (key, value)) in entries.into_iter().enumerate() {
        if i > 0 {
            out.push(b',');
        }
        serde_json::to_writer(&mut *out, key)?;
        out.push(b':');
        write_value(value, out)?;
    }
    out.push(b'}');
    Ok(())
}
