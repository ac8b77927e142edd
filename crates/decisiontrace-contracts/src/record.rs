//! Decision record types.
//!
//! `DecisionInput` is the candidate a caller hands to the appender.
//! `DecisionRecord` is what lands in the log: the candidate plus identity,
//! timestamp, and the two hashes that link it into the chain.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Unique identifier for one logged decision.
///
/// Generated once by the appender and never reused. Carries no ordering
/// guarantee; physical position in the log defines chain order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DecisionId(pub uuid::Uuid);

impl DecisionId {
    /// Create a new, random decision ID.
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl Default for DecisionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for DecisionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// The fields a caller supplies for a new decision.
///
/// Unknown keys in the source JSON are ignored. `confidence` and
/// `risk_flags` may be absent or `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionInput {
    /// Model or system that produced the decision.
    pub model: String,
    /// Model configuration. Key order carries no meaning.
    pub config: Map<String, Value>,
    pub prompt: String,
    /// Names of the inputs the model consulted, in order.
    pub context_sources: Vec<String>,
    pub output: String,
    /// Absent means "not reported".
    #[serde(default)]
    pub confidence: Option<f64>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub risk_flags: Vec<String>,
}

/// One append-only entry in the decision log.
///
/// Field order here is the on-disk field order. Hashing does not depend on
/// it: the canonical form sorts keys.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionRecord {
    pub decision_id: DecisionId,

    /// Creation time (UTC), stamped by the appender. Stored with exactly six
    /// fractional digits so timestamps sort as text.
    #[serde(with = "timestamp_micros")]
    pub timestamp: DateTime<Utc>,

    pub model: String,
    pub config: Map<String, Value>,
    pub prompt: String,
    pub context_sources: Vec<String>,
    pub output: String,

    /// Serialized as `null` when absent so the key is always present.
    pub confidence: Option<f64>,

    pub risk_flags: Vec<String>,

    /// Hash (hex) of the preceding record, or `GENESIS_HASH` for the first
    /// record in a log.
    pub prev_hash: String,

    /// SHA-256 (hex) of this record's canonical content, `hash` excluded.
    pub hash: String,
}

impl DecisionRecord {
    /// Literal whose SHA-256 is the genesis digest.
    pub const GENESIS_SEED: &'static str = "genesis_block";

    /// The `prev_hash` of the first record in every log: the lowercase hex
    /// SHA-256 of `GENESIS_SEED`.
    pub const GENESIS_HASH: &'static str =
        "a1c0749b5b39ae000916b037528fe92676b68cc28ce91dc6762e50698c98214e";
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}

/// RFC 3339 with microsecond precision and a `Z` suffix,
/// e.g. `2026-10-19T08:15:02.004117Z`.
mod timestamp_micros {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(ts: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&ts.to_rfc3339_opts(SecondsFormat::Micros, true))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|ts| ts.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}
