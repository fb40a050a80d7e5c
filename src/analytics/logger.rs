use std::fs::{self, OpenOptions, create_dir_all};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use anyhow::Result;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::config::schema::LoggingConfig;
use crate::predict::controller::Completion;
use crate::predict::risk;

// ---------------------------------------------------------------------------
// Prediction log entry (JSONL)
// ---------------------------------------------------------------------------

/// One completed submission in `~/.churnwatch/predictions.jsonl`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionLogEntry {
    pub timestamp: String,
    /// `success`, `application_error`, `transport_error` or `malformed_response`.
    pub outcome: String,
    /// Whether the completion was rendered (superseded ones are not).
    #[serde(default = "default_true")]
    pub displayed: bool,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub probability: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub prediction: Option<String>,
    /// `low`, `medium` or `high`.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub tier: Option<String>,
    #[serde(default)]
    pub tip_count: usize,
    pub latency_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub error: Option<String>,
}

fn default_true() -> bool {
    true
}

impl PredictionLogEntry {
    pub fn from_completion(completion: &Completion) -> Self {
        let mut entry = Self {
            timestamp: Utc::now().to_rfc3339(),
            outcome: "success".to_string(),
            displayed: completion.displayed,
            probability: None,
            prediction: None,
            tier: None,
            tip_count: 0,
            latency_ms: completion.latency.as_millis() as u64,
            error: None,
        };

        match &completion.outcome {
            Ok(result) => {
                entry.probability = Some(result.churn_probability);
                entry.prediction = Some(result.churn_prediction.clone());
                entry.tier = Some(risk::classify(result.churn_probability).as_str().to_string());
                entry.tip_count = result.tips().len();
            }
            Err(err) => {
                entry.outcome = err.kind().to_string();
                entry.error = Some(err.message().to_string());
            }
        }

        entry
    }
}

// ---------------------------------------------------------------------------
// Logging
// ---------------------------------------------------------------------------

/// Log a completion to the configured prediction log.
///
/// Best-effort: failures are silently ignored.
pub fn log_completion(config: &LoggingConfig, completion: &Completion) {
    if !config.enabled {
        return;
    }
    let Some(path) = prediction_log_path(config) else {
        return;
    };
    let _ = append_log_entry(&path, &PredictionLogEntry::from_completion(completion));
}

// ---------------------------------------------------------------------------
// Reading log entries
// ---------------------------------------------------------------------------

/// Read all entries. Malformed lines are skipped; a missing file reads as
/// empty.
pub fn read_all_entries(path: &Path) -> Vec<PredictionLogEntry> {
    let Ok(file) = fs::File::open(path) else {
        return Vec::new();
    };

    BufReader::new(file)
        .lines()
        .map_while(Result::ok)
        .filter_map(|line| serde_json::from_str::<PredictionLogEntry>(&line).ok())
        .collect()
}

/// Read entries from the last `days` days, or all of them for `None`.
pub fn read_entries_since_days(path: &Path, days: Option<u32>) -> Vec<PredictionLogEntry> {
    let entries = read_all_entries(path);

    let Some(days) = days else {
        return entries;
    };

    let cutoff = (Utc::now() - chrono::Duration::days(i64::from(days))).to_rfc3339();

    entries
        .into_iter()
        .filter(|e| e.timestamp >= cutoff)
        .collect()
}

// ---------------------------------------------------------------------------
// File I/O
// ---------------------------------------------------------------------------

pub fn append_log_entry(path: &Path, entry: &PredictionLogEntry) -> Result<()> {
    if let Some(parent) = path.parent() {
        create_dir_all(parent)?;
    }

    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    let json = serde_json::to_string(entry)?;
    writeln!(file, "{json}")?;

    Ok(())
}

/// Resolve the log file: the configured override or
/// `~/.churnwatch/predictions.jsonl`.
pub fn prediction_log_path(config: &LoggingConfig) -> Option<PathBuf> {
    config
        .path
        .clone()
        .or_else(|| crate::config::home_dir().map(|dir| dir.join("predictions.jsonl")))
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::predict::PredictionError;
    use crate::predict::model::PredictionResult;

    fn completion(outcome: std::result::Result<PredictionResult, PredictionError>) -> Completion {
        Completion {
            generation: 1,
            outcome,
            latency: Duration::from_millis(42),
            displayed: true,
        }
    }

    #[test]
    fn success_entry() {
        let entry = PredictionLogEntry::from_completion(&completion(Ok(PredictionResult {
            churn_probability: 72.5,
            churn_prediction: "Yes".to_string(),
            retention_tips: Some(vec!["Offer long-term contract incentives".to_string()]),
            risk_level: None,
        })));
        assert_eq!(entry.outcome, "success");
        assert_eq!(entry.tier.as_deref(), Some("high"));
        assert_eq!(entry.tip_count, 1);
        assert_eq!(entry.latency_ms, 42);
        assert!(entry.error.is_none());
    }

    #[test]
    fn error_entry() {
        let entry = PredictionLogEntry::from_completion(&completion(Err(
            PredictionError::Transport("connection refused".to_string()),
        )));
        assert_eq!(entry.outcome, "transport_error");
        assert_eq!(entry.error.as_deref(), Some("connection refused"));
        assert!(entry.probability.is_none());

        let json = serde_json::to_string(&entry).unwrap();
        assert!(!json.contains("probability"));
    }

    #[test]
    fn configured_path_wins() {
        let config = LoggingConfig {
            enabled: true,
            path: Some(PathBuf::from("/tmp/cw/predictions.jsonl")),
        };
        assert_eq!(
            prediction_log_path(&config),
            Some(PathBuf::from("/tmp/cw/predictions.jsonl"))
        );
    }

    #[test]
    fn append_then_read_skips_garbage() {
        let dir = std::env::temp_dir().join(format!("churnwatch-log-{}", std::process::id()));
        let path = dir.join("predictions.jsonl");
        let _ = fs::remove_file(&path);

        let entry = PredictionLogEntry::from_completion(&completion(Err(
            PredictionError::Application("invalid input".to_string()),
        )));
        append_log_entry(&path, &entry).unwrap();
        fs::OpenOptions::new()
            .append(true)
            .open(&path)
            .and_then(|mut f| writeln!(f, "not json"))
            .unwrap();
        append_log_entry(&path, &entry).unwrap();

        let entries = read_all_entries(&path);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].outcome, "application_error");
        assert_eq!(read_entries_since_days(&path, Some(1)).len(), 2);

        let _ = fs::remove_dir_all(&dir);
    }
}
