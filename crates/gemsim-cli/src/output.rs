//! Terminal rendering of transcripts and verdicts

use chrono::{DateTime, Utc};
use gemsim_core::{LogEntry, Severity, ValidationErrors, Verdict};

pub fn print_transcript(entries: &[LogEntry]) {
    for entry in entries {
        println!("{}", format_entry(entry));
    }
}

pub fn format_entry(entry: &LogEntry) -> String {
    format!(
        "{} {} {} {}",
        format_timestamp(entry.timestamp_ms),
        entry.direction,
        severity_marker(entry.severity),
        entry.summary
    )
}

pub fn format_verdict(verdict: &Verdict) -> String {
    let status = match (verdict.passed, verdict.cancelled) {
        (_, true) => "CANCELLED",
        (true, false) => "PASS",
        (false, false) => "FAIL",
    };
    format!(
        "[{status}] {} at {}: {}",
        verdict.scenario_id,
        format_timestamp(verdict.timestamp_ms),
        verdict.notes
    )
}

pub fn print_validation_errors(errors: &ValidationErrors) {
    for (key, message) in errors {
        eprintln!("  {key}: {message}");
    }
}

fn format_timestamp(timestamp_ms: u64) -> String {
    i64::try_from(timestamp_ms)
        .ok()
        .and_then(DateTime::<Utc>::from_timestamp_millis)
        .map(|t| t.format("%H:%M:%S%.3f").to_string())
        .unwrap_or_else(|| format!("{timestamp_ms}ms"))
}

fn severity_marker(severity: Severity) -> &'static str {
    match severity {
        Severity::Info => " ",
        Severity::Success => "+",
        Severity::Warning => "!",
        Severity::Error => "x",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gemsim_core::Direction;
    use serde_json::Value;

    #[test]
    fn test_entry_line() {
        let entry = LogEntry::new(
            1_500,
            Direction::EquipmentToHost,
            Severity::Success,
            "S1F2",
            Value::Null,
        );
        assert_eq!(format_entry(&entry), "00:00:01.500 E->H + S1F2");
    }

    #[test]
    fn test_cancelled_verdict_label() {
        let verdict = Verdict {
            scenario_id: "s".to_string(),
            timestamp_ms: 0,
            passed: false,
            cancelled: true,
            notes: "Cancelled".to_string(),
        };
        assert!(format_verdict(&verdict).starts_with("[CANCELLED] s"));
    }
}
