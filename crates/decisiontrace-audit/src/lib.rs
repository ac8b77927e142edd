//! # decisiontrace-audit
//!
//! Append-only, SHA-256 hash-chained decision log.
//!
//! ## Overview
//!
//! Every decision is written as one JSON line whose `prev_hash` is the hash
//! of the record before it. Editing any stored byte breaks either the
//! record's own hash or the link from its successor, and `verify_store`
//! reports every such break in one pass.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use decisiontrace_audit::{locate, verify_store, ChainAppender, JsonlFileStore};
//!
//! let store = JsonlFileStore::new("logs/decision_log.jsonl");
//! let record = ChainAppender::new(&store).append_json(&candidate)?;
//!
//! assert!(verify_store(&store)?.valid);
//! let found = locate(&store, &record.decision_id.to_string())?;
//! ```

pub mod appender;
pub mod chain;
pub mod file;
pub mod locator;
pub mod memory;
pub mod verify;

pub use appender::ChainAppender;
pub use chain::{canonicalize, digest, record_hash, tail_hash};
pub use file::JsonlFileStore;
pub use locator::locate;
pub use memory::InMemoryStore;
pub use verify::{verify_lines, verify_store};

// ── Tests ─────────────────────────────────────────────────────────────────────
