//! # decisiontrace-core
//!
//! The seams of the DecisionTrace audit log.
//!
//! This crate provides:
//! - The `DecisionStore` trait every chain operation runs against
//! - `TraceConfig`, the TOML configuration for a log
//! - Candidate validation (`validate_candidate`) shared by every entry point
//!
//! ## Usage
//!
//! ```rust,ignore
//! use decisiontrace_core::{validate::validate_candidate, TraceConfig};
//!
//! let config = TraceConfig::from_file(Path::new("decisiontrace.toml"))?;
//! let input = validate_candidate(&serde_json::from_str(&raw)?)?;
//! ```

pub mod config;
pub mod traits;
pub mod validate;

pub use config::TraceConfig;
pub use traits::DecisionStore;

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use serde_json::json;

    use decisiontrace_contracts::{error::TraceError, record::DecisionInput};

    use crate::{
        validate::{check_input, validate_candidate},
        TraceConfig,
    };

    // ── Helpers ───────────────────────────────────────────────────────────────

    fn valid_candidate() -> serde_json::Value {
        json!({
            "model": "m1",
            "config": { "temp": 1 },
            "prompt": "p1",
            "context_sources": ["c1"],
            "output": "o1"
        })
    }

    fn missing_of(err: TraceError) -> Vec<String> {
        match err {
            TraceError::Validation { missing, .. } => missing,
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    // ── TraceConfig ───────────────────────────────────────────────────────────

    #[test]
    fn config_defaults_when_empty() {
        let config = TraceConfig::from_toml_str("").unwrap();
        assert_eq!(config, TraceConfig::default());
        assert_eq!(config.log_path, PathBuf::from("logs/decision_log.jsonl"));
        assert!(config.durable);
        assert_eq!(config.lock_timeout().as_millis(), 5_000);
    }

    #[test]
    fn config_overrides() {
        let config = TraceConfig::from_toml_str(
            r#"
            log_path = "/var/log/decisions.jsonl"
            durable = false
            lock_timeout_ms = 250
            "#,
        )
        .unwrap();

        assert_eq!(config.log_path, PathBuf::from("/var/log/decisions.jsonl"));
        assert!(!config.durable);
        assert_eq!(config.lock_timeout_ms, 250);
    }

    #[test]
    fn config_rejects_unknown_keys() {
        let err = TraceConfig::from_toml_str("log_file = \"x\"").unwrap_err();
        assert!(matches!(err, TraceError::Config { .. }));
    }

    #[test]
    fn config_missing_file_is_config_error() {
        let err = TraceConfig::from_file(std::path::Path::new("/nonexistent/decisiontrace.toml"))
            .unwrap_err();
        assert!(err.to_string().contains("failed to read config file"));
    }

    // ── validate_candidate ────────────────────────────────────────────────────

    #[test]
    fn valid_candidate_converts() {
        let input = validate_candidate(&valid_candidate()).unwrap();
        assert_eq!(input.model, "m1");
        assert_eq!(input.config["temp"], json!(1));
        assert_eq!(input.context_sources, vec!["c1"]);
        assert_eq!(input.confidence, None);
        assert!(input.risk_flags.is_empty());
    }

    #[test]
    fn all_missing_fields_are_named() {
        let err = validate_candidate(&json!({ "prompt": "p1", "model": null })).unwrap_err();
        assert!(err.to_string().contains("model, config, context_sources, output"));
        assert_eq!(
            missing_of(err),
            vec!["model", "config", "context_sources", "output"]
        );
    }

    #[test]
    fn non_object_candidate_is_rejected() {
        let err = validate_candidate(&json!(["model"])).unwrap_err();
        assert!(err.to_string().contains("must be a JSON object"));
    }

    #[test]
    fn wrong_types_are_rejected() {
        let mut candidate = valid_candidate();
        candidate["context_sources"] = json!("c1");
        candidate["confidence"] = json!("high");

        let err = validate_candidate(&candidate).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("context_sources"), "{msg}");
        assert!(msg.contains("confidence"), "{msg}");
        assert!(missing_of(err).is_empty());
    }

    #[test]
    fn extra_fields_are_ignored() {
        let mut candidate = valid_candidate();
        candidate["reviewer"] = json!("alice");
        assert!(validate_candidate(&candidate).is_ok());
    }

    #[test]
    fn non_finite_confidence_is_rejected() {
        let mut input: DecisionInput = serde_json::from_value(valid_candidate()).unwrap();
        input.confidence = Some(f64::NAN);
        assert!(check_input(&input).is_err());

        input.confidence = Some(0.75);
        assert!(check_input(&input).is_ok());
    }
}
