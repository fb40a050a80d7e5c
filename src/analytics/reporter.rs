//! Aggregation over the prediction log for `churnwatch history`.

use std::path::Path;

use crate::analytics::logger::{self, PredictionLogEntry};

/// Summary of logged predictions.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct HistorySummary {
    pub total: usize,
    pub outcomes: OutcomeCounts,
    pub tiers: TierCounts,
    /// Mean probability over successful predictions.
    pub avg_probability: f64,
    pub avg_latency_ms: f64,
    /// Completions that were superseded and never displayed.
    pub superseded: usize,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct OutcomeCounts {
    pub success: usize,
    pub application_error: usize,
    pub transport_error: usize,
    pub malformed_response: usize,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TierCounts {
    pub low: usize,
    pub medium: usize,
    pub high: usize,
}

impl TierCounts {
    pub fn total(&self) -> usize {
        self.low + self.medium + self.high
    }

    /// Percentage for a given count, 0.0 when there are no predictions.
    pub fn pct(&self, count: usize) -> f64 {
        let total = self.total();
        if total == 0 {
            0.0
        } else {
            (count as f64 / total as f64) * 100.0
        }
    }
}

/// Summarize the log at `path`, optionally limited to the last `days` days.
pub fn compute_summary(path: &Path, days: Option<u32>) -> HistorySummary {
    build_summary(&logger::read_entries_since_days(path, days))
}

pub fn build_summary(entries: &[PredictionLogEntry]) -> HistorySummary {
    let mut summary = HistorySummary {
        total: entries.len(),
        ..HistorySummary::default()
    };
    if entries.is_empty() {
        return summary;
    }

    let mut probability_sum = 0.0;
    // f64 so corrupt or hand-edited latencies cannot overflow.
    let mut latency_sum = 0.0;

    for entry in entries {
        latency_sum += entry.latency_ms as f64;
        if !entry.displayed {
            summary.superseded += 1;
        }

        match entry.outcome.as_str() {
            "success" => summary.outcomes.success += 1,
            "application_error" => summary.outcomes.application_error += 1,
            "transport_error" => summary.outcomes.transport_error += 1,
            "malformed_response" => summary.outcomes.malformed_response += 1,
            _ => {}
        }

        if let Some(p) = entry.probability {
            probability_sum += p;
        }

        match entry.tier.as_deref() {
            Some("low") => summary.tiers.low += 1,
            Some("medium") => summary.tiers.medium += 1,
            Some("high") => summary.tiers.high += 1,
            _ => {}
        }
    }

    if summary.outcomes.success > 0 {
        summary.avg_probability = probability_sum / summary.outcomes.success as f64;
    }
    summary.avg_latency_ms = latency_sum / entries.len() as f64;

    summary
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(outcome: &str, probability: Option<f64>, tier: Option<&str>) -> PredictionLogEntry {
        PredictionLogEntry {
            timestamp: "2026-10-01T12:00:00+00:00".to_string(),
            outcome: outcome.to_string(),
            displayed: true,
            probability,
            prediction: probability.map(|_| "Yes".to_string()),
            tier: tier.map(str::to_string),
            tip_count: 0,
            latency_ms: 100,
            error: None,
        }
    }

    #[test]
    fn empty_log() {
        let summary = build_summary(&[]);
        assert_eq!(summary.total, 0);
        assert_eq!(summary.tiers.pct(0), 0.0);
    }

    #[test]
    fn mixed_outcomes() {
        let mut superseded = entry("success", Some(20.0), Some("low"));
        superseded.displayed = false;
        let entries = vec![
            entry("success", Some(80.0), Some("high")),
            entry("success", Some(50.0), Some("medium")),
            superseded,
            entry("application_error", None, None),
            entry("transport_error", None, None),
        ];

        let summary = build_summary(&entries);
        assert_eq!(summary.total, 5);
        assert_eq!(summary.outcomes.success, 3);
        assert_eq!(summary.outcomes.application_error, 1);
        assert_eq!(summary.outcomes.transport_error, 1);
        assert_eq!(summary.tiers, TierCounts { low: 1, medium: 1, high: 1 });
        assert_eq!(summary.avg_probability, 50.0);
        assert_eq!(summary.avg_latency_ms, 100.0);
        assert_eq!(summary.superseded, 1);
    }

    #[test]
    fn huge_latencies_do_not_overflow() {
        let mut a = entry("success", Some(10.0), Some("low"));
        a.latency_ms = u64::MAX;
        let mut b = entry("success", Some(10.0), Some("low"));
        b.latency_ms = u64::MAX;

        let summary = build_summary(&[a, b]);
        assert!(summary.avg_latency_ms.is_finite());
        assert!(summary.avg_latency_ms > 1e18);
    }
}
