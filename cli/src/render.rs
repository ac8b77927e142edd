//! Plain-text presentation of records and verification reports.
//!
//! Everything here returns a `String` so the command handlers decide where
//! it goes. No decision logic lives in this module.

use chrono::SecondsFormat;

use decisiontrace_contracts::{
    record::DecisionRecord,
    report::{FindingKind, VerificationReport},
};

const BRANCH: &str = "├── ";
const LAST: &str = "└── ";
const PIPE: &str = "│   ";
const SPACE: &str = "    ";

/// Render one record as a tree for `replay`.
pub fn render_record(record: &DecisionRecord) -> String {
    let mut out = String::new();
    push(&mut out, format!("Decision Replay: {}", record.decision_id));

    // Core information
    push(&mut out, format!("{BRANCH}Core Information"));
    let timestamp = record.timestamp.to_rfc3339_opts(SecondsFormat::Micros, true);
    push(&mut out, format!("{PIPE}{BRANCH}Timestamp: {timestamp}"));
    push(&mut out, format!("{PIPE}{BRANCH}Model: {}", record.model));
    push(&mut out, format!("{PIPE}{LAST}Model Config"));
    let config =
        serde_json::to_string_pretty(&record.config).unwrap_or_else(|_| "{}".to_string());
    push_block(&mut out, &format!("{PIPE}{SPACE}"), &config);

    push(&mut out, format!("{BRANCH}Prompt"));
    push_block(&mut out, PIPE, &record.prompt);

    push(&mut out, format!("{BRANCH}Output"));
    push_block(&mut out, PIPE, &record.output);

    // Metadata
    let confidence = record
        .confidence
        .map(|c| c.to_string())
        .unwrap_or_else(|| "N/A".to_string());
    let risk_flags = if record.risk_flags.is_empty() {
        "None".to_string()
    } else {
        record.risk_flags.join(", ")
    };
    push(&mut out, format!("{BRANCH}Metadata"));
    push(
        &mut out,
        format!("{PIPE}{BRANCH}Context Sources: {}", record.context_sources.join(", ")),
    );
    push(&mut out, format!("{PIPE}{BRANCH}Confidence: {confidence}"));
    push(&mut out, format!("{PIPE}{LAST}Risk Flags: {risk_flags}"));

    // Integrity chain
    push(&mut out, format!("{LAST}Integrity Chain"));
    push(&mut out, format!("{SPACE}{BRANCH}Previous Hash: {}", record.prev_hash));
    push(&mut out, format!("{SPACE}{LAST}Record Hash: {}", record.hash));

    out
}

/// Render every finding in a report, one block per finding, in line order.
pub fn render_findings(report: &VerificationReport) -> String {
    let mut out = String::new();
    for finding in &report.findings {
        let line = finding.line;
        match &finding.kind {
            FindingKind::Decode { reason } => {
                push(&mut out, format!("Error: Invalid record on line {line}: {reason}"));
            }
            FindingKind::ChainLink { expected, found } => {
                push(&mut out, format!("Integrity Error on line {line}:"));
                push(&mut out, format!("   Record's prev_hash: {found}"));
                push(&mut out, format!("   Actual prev_hash:   {expected}"));
            }
            FindingKind::Tamper { stored, recomputed } => {
                push(&mut out, format!("Tampering Detected on line {line}:"));
                push(&mut out, format!("   Record's hash:      {stored}"));
                push(&mut out, format!("   Recalculated hash:  {recomputed}"));
            }
        }
    }
    out
}

/// Closing outcome for `verify`.
pub fn render_summary(report: &VerificationReport) -> String {
    if report.valid {
        format!(
            "Success: The decision log is intact and the hash chain is valid ({} records).",
            report.lines_checked
        )
    } else {
        format!(
            "Critical: The decision log has been tampered with or is corrupt \
             ({} findings, first on line {}).\nReview the errors above to identify the point of failure.",
            report.findings.len(),
            report.first_failure_line().unwrap_or(0)
        )
    }
}

/// Write `text` line by line under `prefix`. Empty text still gets one line.
fn push_block(out: &mut String, prefix: &str, text: &str) {
    if text.is_empty() {
        push(out, prefix);
        return;
    }
    for line in text.lines() {
        push(out, format!("{prefix}{line}"));
    }
}

fn push(out: &mut String, line: impl AsRef<str>) {
    out.push_str(line.as_ref());
    out.push('\n');
}

// ── Tests ─────────────────────────────────────────────────────────────────────
