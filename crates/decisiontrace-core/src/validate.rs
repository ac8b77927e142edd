//! Validation of candidate decisions before they reach the appender.
//!
//! Runs in two phases, collecting every problem before returning:
//!
//! 1. **Presence**: each required field must be present and non-null. All
//!    missing names are reported together.
//! 2. **Structure**: the candidate is checked against a JSON Schema document
//!    with the `jsonschema` crate, so a string where an array belongs is
//!    rejected with a pointer to the offending location.
//!
//! Extra fields are ignored.

use serde_json::{json, Value};
use tracing::{debug, warn};

use decisiontrace_contracts::{
    error::{TraceError, TraceResult},
    record::DecisionInput,
};

/// Fields every candidate must carry, in reporting order.
pub const REQUIRED_FIELDS: [&str; 5] = ["model", "config", "prompt", "context_sources", "output"];

/// The JSON Schema a candidate must satisfy once all required fields are
/// present.
pub fn candidate_schema() -> Value {
    json!({
        "type": "object",
        "required": REQUIRED_FIELDS,
        "properties": {
            "model": { "type": "string" },
            "config": { "type": "object" },
            "prompt": { "type": "string" },
            "context_sources": { "type": "array", "items": { "type": "string" } },
            "output": { "type": "string" },
            "confidence": { "type": ["number", "null"] },
            "risk_flags": { "type": ["array", "null"], "items": { "type": "string" } }
        }
    })
}

/// Validate a raw JSON candidate and convert it into a `DecisionInput`.
///
/// Returns `TraceError::Validation` naming every missing field, or every
/// structural violation, without constructing a partial input.
pub fn validate_candidate(candidate: &Value) -> TraceResult<DecisionInput> {
    let Some(fields) = candidate.as_object() else {
        return Err(TraceError::Validation {
            reason: "decision input must be a JSON object".to_string(),
            missing: Vec::new(),
        });
    };

    // ── Phase 1: presence ────────────────────────────────────────────────
    let missing: Vec<String> = REQUIRED_FIELDS
        .iter()
        .filter(|name| fields.get(**name).map_or(true, Value::is_null))
        .map(|name| name.to_string())
        .collect();
    if !missing.is_empty() {
        warn!(missing = ?missing, "decision input is missing required fields");
        return Err(TraceError::missing_fields(missing));
    }

    // ── Phase 2: structure ───────────────────────────────────────────────
    let validator = jsonschema::validator_for(&candidate_schema()).map_err(|e| {
        TraceError::Validation {
            reason: format!("invalid candidate schema document: {e}"),
            missing: Vec::new(),
        }
    })?;
    let violations: Vec<String> = validator
        .iter_errors(candidate)
        .map(|error| format!("{} at '{}'", error, error.instance_path))
        .collect();
    if !violations.is_empty() {
        warn!(violation_count = violations.len(), "decision input is malformed");
        return Err(TraceError::Validation {
            reason: violations.join("; "),
            missing: Vec::new(),
        });
    }

    let input: DecisionInput =
        serde_json::from_value(candidate.clone()).map_err(|e| TraceError::Validation {
            reason: e.to_string(),
            missing: Vec::new(),
        })?;
    check_input(&input)?;

    debug!(model = %input.model, "decision input validated");
    Ok(input)
}

/// Checks that apply to typed inputs as well as raw JSON ones.
///
/// JSON has no encoding for NaN or infinity, so a non-finite confidence
/// could never be hashed and read back consistently.
pub fn check_input(input: &DecisionInput) -> TraceResult<()> {
    match input.confidence {
        Some(c) if !c.is_finite() => Err(TraceError::Validation {
            reason: format!("confidence must be a finite number, got {c}"),
            missing: Vec::new(),
        }),
        _ => Ok(()),
    }
}
