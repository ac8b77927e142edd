//! DecisionTrace: append-only audit log for AI decisions.
//!
//! Every logged decision is chained to the one before it by SHA-256, so any
//! later edit to the log is detectable with `verify`.
//!
//! Usage:
//!   decisiontrace log decision.json
//!   decisiontrace replay 6f1c2a4e-0d7b-4a55-9a0e-3c1f7f0b9d21
//!   decisiontrace verify
//!   decisiontrace --log-file /var/log/decisions.jsonl verify

mod render;

use std::{
    fs,
    path::{Path, PathBuf},
    process::ExitCode,
};

use clap::{Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use decisiontrace_audit::{locate, verify_store, ChainAppender, JsonlFileStore};
use decisiontrace_contracts::error::{TraceError, TraceResult};
use decisiontrace_core::TraceConfig;

// ── CLI definition ────────────────────────────────────────────────────────────

/// DecisionTrace: an append-only audit log for AI decisions.
///
/// Log decisions from JSON files, replay them by ID, and verify that the
/// hash chain protecting the log is intact.
#[derive(Parser)]
#[command(
    name = "decisiontrace",
    version,
    about = "Append-only, hash-chained audit log for AI decisions",
    long_about = "Logs AI model decisions (prompt, configuration, output, provenance) to an\n\
                  append-only JSON Lines file protected by a SHA-256 hash chain, and\n\
                  verifies later that the log has not been altered."
)]
struct Cli {
    /// TOML configuration file (log_path, durable, lock_timeout_ms).
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Decision log to operate on. Overrides `log_path` from the config.
    #[arg(long, global = true, value_name = "PATH")]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Log a new decision from a JSON file.
    ///
    /// The file must supply model, config, prompt, context_sources, and
    /// output. confidence and risk_flags are optional.
    Log {
        #[arg(value_name = "DECISION_FILE")]
        decision_file: PathBuf,
    },
    /// Replay a recorded decision by its ID.
    Replay {
        #[arg(value_name = "DECISION_ID")]
        decision_id: String,
    },
    /// Verify the integrity of the entire decision log.
    Verify,
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() -> ExitCode {
    // Initialize structured logging.  Set RUST_LOG=debug for verbose output.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_target(false)
        .compact()
        .init();

    let cli = Cli::parse();

    let result = load_config(&cli).and_then(|config| {
        debug!(log_path = %config.log_path.display(), "using decision log");
        let store = JsonlFileStore::from_config(&config);
        match cli.command {
            Command::Log { decision_file } => run_log(&store, &decision_file),
            Command::Replay { decision_id } => run_replay(&store, &decision_id),
            Command::Verify => run_verify(&store),
        }
    });

    match result {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("An error occurred: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn load_config(cli: &Cli) -> TraceResult<TraceConfig> {
    let mut config = match &cli.config {
        Some(path) => TraceConfig::from_file(path)?,
        None => TraceConfig::default(),
    };
    if let Some(path) = &cli.log_file {
        config.log_path = path.clone();
    }
    Ok(config)
}

// ── Commands ──────────────────────────────────────────────────────────────────

fn run_log(store: &JsonlFileStore, decision_file: &Path) -> TraceResult<bool> {
    let raw = fs::read_to_string(decision_file).map_err(|e| TraceError::Validation {
        reason: format!("cannot read '{}': {}", decision_file.display(), e),
        missing: Vec::new(),
    })?;
    let candidate: serde_json::Value =
        serde_json::from_str(&raw).map_err(|e| TraceError::Validation {
            reason: format!("the provided file is not valid JSON: {}", e),
            missing: Vec::new(),
        })?;

    let record = ChainAppender::new(store).append_json(&candidate)?;

    println!("Decision successfully logged.");
    println!("  Decision ID: {}", record.decision_id);
    println!("  Record Hash: {}", record.hash);
    Ok(true)
}

fn run_replay(store: &JsonlFileStore, decision_id: &str) -> TraceResult<bool> {
    if !store.exists() {
        eprintln!("Error: Log file not found at '{}'.", store.path().display());
        return Ok(false);
    }

    match locate(store, decision_id)? {
        Some(record) => {
            print!("{}", render::render_record(&record));
            Ok(true)
        }
        None => {
            eprintln!("Decision ID '{}' not found.", decision_id);
            Ok(false)
        }
    }
}

fn run_verify(store: &JsonlFileStore) -> TraceResult<bool> {
    println!("Verifying integrity of the decision log...");
    if !store.exists() {
        println!("Log file is empty or does not exist. Nothing to verify.");
    }

    let report = verify_store(store)?;
    print!("{}", render::render_findings(&report));
    println!("{}", render::render_summary(&report));
    Ok(report.valid)
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use std::{fs, path::PathBuf};

    use clap::{CommandFactory, Parser};
    use serde_json::{json, Value};
    use tempfile::TempDir;

    use decisiontrace_audit::{verify_store, JsonlFileStore};
    use decisiontrace_contracts::{error::TraceError, report::FindingKind};
    use decisiontrace_core::traits::DecisionStore;

    use super::{load_config, run_log, run_replay, run_verify, Cli, Command};

    // ── Helpers ───────────────────────────────────────────────────────────────

    /// Write `body` as a decision file inside `dir`.
    fn decision_file(dir: &TempDir, name: &str, body: &str) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, body).unwrap();
        path
    }

    fn valid_decision(output: &str) -> String {
        json!({
            "model": "m1",
            "config": { "temp": 1 },
            "prompt": "p1",
            "context_sources": ["c1"],
            "output": output,
            "confidence": 0.9,
            "risk_flags": ["pii"]
        })
        .to_string()
    }

    /// A store in a fresh temp dir, plus the dir that keeps it alive.
    fn temp_store() -> (TempDir, JsonlFileStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonlFileStore::new(dir.path().join("logs").join("decision_log.jsonl"));
        (dir, store)
    }

    fn decision_id_on(store: &JsonlFileStore, line: usize) -> String {
        let record: Value = serde_json::from_str(&store.read_lines().unwrap()[line - 1]).unwrap();
        record["decision_id"].as_str().unwrap().to_string()
    }

    // ── Commands ──────────────────────────────────────────────────────────────

    #[test]
    fn log_then_replay_finds_the_decision() {
        let (dir, store) = temp_store();
        let file = decision_file(&dir, "d1.json", &valid_decision("o1"));

        assert!(run_log(&store, &file).unwrap());
        assert_eq!(store.read_lines().unwrap().len(), 1);

        let id = decision_id_on(&store, 1);
        assert!(run_replay(&store, &id).unwrap());
    }

    #[test]
    fn verify_of_untouched_log_succeeds() {
        let (dir, store) = temp_store();
        for (i, output) in ["o1", "o2", "o3"].iter().enumerate() {
            let file = decision_file(&dir, &format!("d{i}.json"), &valid_decision(output));
            assert!(run_log(&store, &file).unwrap());
        }

        assert!(run_verify(&store).unwrap());
    }

    #[test]
    fn verify_of_edited_log_fails() {
        let (dir, store) = temp_store();
        for (i, output) in ["o1", "o2"].iter().enumerate() {
            let file = decision_file(&dir, &format!("d{i}.json"), &valid_decision(output));
            run_log(&store, &file).unwrap();
        }

        let mut lines = store.read_lines().unwrap();
        let mut first: Value = serde_json::from_str(&lines[0]).unwrap();
        first["output"] = json!("edited");
        lines[0] = first.to_string();
        fs::write(store.path(), lines.join("\n") + "\n").unwrap();

        assert!(!run_verify(&store).unwrap());

        let report = verify_store(&store).unwrap();
        assert!(matches!(
            report.findings_on(1).next().map(|f| &f.kind),
            Some(FindingKind::Tamper { .. })
        ));
        assert!(matches!(
            report.findings_on(2).next().map(|f| &f.kind),
            Some(FindingKind::ChainLink { .. })
        ));
    }

    #[test]
    fn log_rejects_invalid_json() {
        let (dir, store) = temp_store();
        let file = decision_file(&dir, "bad.json", "{ not json");

        let err = run_log(&store, &file).unwrap_err();
        assert!(matches!(err, TraceError::Validation { .. }), "got {err:?}");
        assert!(!store.exists());
    }

    #[test]
    fn log_rejects_missing_required_field() {
        let (dir, store) = temp_store();
        let file = decision_file(&dir, "partial.json", r#"{ "model": "m1", "prompt": "p1" }"#);

        match run_log(&store, &file).unwrap_err() {
            TraceError::Validation { missing, .. } => {
                assert_eq!(missing, vec!["config", "context_sources", "output"]);
            }
            other => panic!("expected validation error, got {other:?}"),
        }
        assert!(!store.exists());
    }

    #[test]
    fn log_of_unreadable_file_is_an_error() {
        let (dir, store) = temp_store();
        let err = run_log(&store, &dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, TraceError::Validation { .. }), "got {err:?}");
    }

    #[test]
    fn replay_of_unknown_id_fails() {
        let (dir, store) = temp_store();
        let file = decision_file(&dir, "d1.json", &valid_decision("o1"));
        run_log(&store, &file).unwrap();

        assert!(!run_replay(&store, "00000000-0000-4000-8000-000000000000").unwrap());
    }

    #[test]
    fn replay_without_log_file_fails() {
        let (_dir, store) = temp_store();
        assert!(!run_replay(&store, "00000000-0000-4000-8000-000000000000").unwrap());
    }

    #[test]
    fn verify_without_log_file_succeeds() {
        let (_dir, store) = temp_store();
        assert!(run_verify(&store).unwrap());
    }

    // ── Argument parsing ──────────────────────────────────────────────────────

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn log_file_flag_overrides_default_path() {
        let cli = Cli::parse_from(["decisiontrace", "--log-file", "/tmp/d.jsonl", "verify"]);
        let config = load_config(&cli).unwrap();

        assert_eq!(config.log_path, std::path::PathBuf::from("/tmp/d.jsonl"));
        assert!(matches!(cli.command, Command::Verify));
    }

    #[test]
    fn missing_config_file_is_an_error() {
        let cli = Cli::parse_from(["decisiontrace", "--config", "/nonexistent.toml", "verify"]);
        assert!(load_config(&cli).is_err());
    }

    #[test]
    fn replay_takes_an_id() {
        let cli = Cli::parse_from(["decisiontrace", "replay", "abc"]);
        match cli.command {
            Command::Replay { decision_id } => assert_eq!(decision_id, "abc"),
            _ => panic!("expected replay"),
        }
    }
}
