//! Output formatting for the demo report.

use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::json;
use watchtx::{Outcome, Ttl, Value};

/// Output format selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Human,
    Json,
}

/// What the demo observed around one transaction.
#[derive(Debug)]
pub struct Report {
    pub key: String,
    pub ttl_before: Ttl,
    pub ttl_after: Ttl,
    pub value_after: Option<Value>,
    /// Store version of the key's last write
    pub version_after: Option<u64>,
    pub written_at: Option<DateTime<Utc>>,
    pub outcome: Outcome,
}

impl Report {
    /// Process exit code: 0 committed, 2 exhausted, 1 fatal.
    pub fn exit_code(&self) -> i32 {
        match self.outcome {
            Outcome::Committed(_) => 0,
            Outcome::ConflictExhausted { .. } => 2,
            Outcome::Fatal(_) => 1,
        }
    }
}

/// Render a report in the requested mode.
pub fn format_report(report: &Report, mode: OutputMode) -> String {
    match mode {
        OutputMode::Human => format_human(report),
        OutputMode::Json => format_json(report).to_string(),
    }
}

fn format_human(report: &Report) -> String {
    let value = report
        .value_after
        .as_ref()
        .map(|v| v.to_string())
        .unwrap_or_else(|| "(nil)".to_string());
    let mut lines = vec![
        format!("TTL before write: {}", report.ttl_before),
        format!("TTL after write: {}", report.ttl_after),
        format!("{} = {}", report.key, value),
    ];
    if let (Some(version), Some(at)) = (report.version_after, report.written_at) {
        lines.push(format!(
            "last write: version {} at {}",
            version,
            at.to_rfc3339_opts(SecondsFormat::Secs, true)
        ));
    }
    lines.push(match &report.outcome {
        Outcome::Committed(info) => format!("committed after {} attempt(s)", info.attempts),
        Outcome::ConflictExhausted { attempts, .. } => {
            format!("gave up after {} conflicting attempt(s)", attempts)
        }
        Outcome::Fatal(e) => format!("failed: {}", e),
    });
    lines.join("\n")
}

fn format_json(report: &Report) -> serde_json::Value {
    let mut out = json!({
        "key": report.key,
        "ttl_before_secs": report.ttl_before.as_secs_reply(),
        "ttl_after_secs": report.ttl_after.as_secs_reply(),
        "value": report.value_after.as_ref().map(|v| v.to_string()),
        "version": report.version_after,
        "written_at": report
            .written_at
            .map(|at| at.to_rfc3339_opts(SecondsFormat::Secs, true)),
        "outcome": report.outcome.name(),
    });
    match &report.outcome {
        Outcome::Committed(info) => out["attempts"] = json!(info.attempts),
        Outcome::ConflictExhausted { attempts, .. } => out["attempts"] = json!(attempts),
        Outcome::Fatal(e) => {
            out["error_kind"] = json!(e.kind());
            out["error"] = json!(e.to_string());
        }
    }
    out
}
