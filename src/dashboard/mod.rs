//! Dashboard charts and headline counters.
//!
//! Charts are pure functions of a [`DashboardMetrics`] value. The bundled
//! [`DashboardMetrics::sample`] carries illustrative figures for a demo
//! deployment; a real deployment passes its own evaluation numbers.

use std::io::{self, Write};

use colored::Colorize;
use serde::{Deserialize, Serialize};

use crate::animation::stats::StatCounter;

/// Bar width used for a full-scale value.
const CHART_WIDTH: usize = 40;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabeledValue {
    pub label: String,
    pub value: f64,
}

impl LabeledValue {
    pub fn new(label: impl Into<String>, value: f64) -> Self {
        Self {
            label: label.into(),
            value,
        }
    }
}

/// Everything the dashboard draws.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardMetrics {
    /// Model evaluation scores on a 0–1 scale.
    pub performance: Vec<LabeledValue>,
    /// Feature importances, largest first.
    pub feature_importance: Vec<LabeledValue>,
    /// Share of customers per risk tier, in percent.
    pub risk_distribution: Vec<LabeledValue>,
}

impl DashboardMetrics {
    pub fn sample() -> Self {
        Self {
            performance: vec![
                LabeledValue::new("Precision", 0.82),
                LabeledValue::new("Recall", 0.78),
                LabeledValue::new("F1-Score", 0.80),
                LabeledValue::new("ROC AUC", 0.86),
            ],
            feature_importance: vec![
                LabeledValue::new("Contract Type", 0.18),
                LabeledValue::new("Tenure", 0.15),
                LabeledValue::new("Monthly Charges", 0.12),
                LabeledValue::new("Internet Service", 0.10),
                LabeledValue::new("Payment Method", 0.08),
            ],
            risk_distribution: vec![
                LabeledValue::new("Low Risk", 65.0),
                LabeledValue::new("Medium Risk", 25.0),
                LabeledValue::new("High Risk", 10.0),
            ],
        }
    }

    /// Headline counters derived from the metrics, as `(label, target)`.
    pub fn headline_stats(&self) -> Vec<(String, String)> {
        let mut stats = Vec::new();
        if let Some(auc) = self.performance.iter().find(|m| m.label == "ROC AUC") {
            stats.push(("ROC AUC".to_string(), format!("{:.0}%", auc.value * 100.0)));
        }
        if let Some(low) = self.risk_distribution.iter().find(|m| m.label == "Low Risk") {
            stats.push(("Low-risk customers".to_string(), format!("{:.0}%", low.value)));
        }
        stats.push((
            "Features tracked".to_string(),
            self.feature_importance.len().to_string(),
        ));
        stats
    }

    /// Headline counters parsed and ready to animate.
    pub fn headline_counters(&self) -> Vec<(String, StatCounter)> {
        self.headline_stats()
            .into_iter()
            .filter_map(|(label, target)| StatCounter::parse(&target).map(|c| (label, c)))
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Terminal charts
// ---------------------------------------------------------------------------

/// Draw all three charts.
pub fn render_charts(metrics: &DashboardMetrics, out: &mut impl Write) -> io::Result<()> {
    render_bar_chart(
        out,
        "Model Performance Metrics",
        &metrics.performance,
        1.0,
        |v| format!("{v:.2}"),
    )?;
    writeln!(out)?;

    let max_importance = metrics
        .feature_importance
        .iter()
        .map(|m| m.value)
        .fold(0.0_f64, f64::max);
    render_bar_chart(
        out,
        "Top Feature Importance",
        &metrics.feature_importance,
        max_importance,
        |v| format!("{v:.2}"),
    )?;
    writeln!(out)?;

    render_distribution(out, "Customer Risk Distribution", &metrics.risk_distribution)
}

/// Horizontal bars scaled so `scale` fills [`CHART_WIDTH`].
fn render_bar_chart(
    out: &mut impl Write,
    title: &str,
    values: &[LabeledValue],
    scale: f64,
    fmt: impl Fn(f64) -> String,
) -> io::Result<()> {
    writeln!(out, "{}", title.bold().cyan())?;
    let label_width = values.iter().map(|m| m.label.len()).max().unwrap_or(0);
    for m in values {
        let bar = "█".repeat(bar_cells(m.value, scale));
        writeln!(
            out,
            "  {:<width$} {} {}",
            m.label,
            bar.blue(),
            fmt(m.value),
            width = label_width
        )?;
    }
    Ok(())
}

/// Share bars; each segment's width is its share of the total.
fn render_distribution(out: &mut impl Write, title: &str, values: &[LabeledValue]) -> io::Result<()> {
    writeln!(out, "{}", title.bold().cyan())?;
    let total: f64 = values.iter().map(|m| m.value).sum();
    let label_width = values.iter().map(|m| m.label.len()).max().unwrap_or(0);
    for m in values {
        let share = if total > 0.0 { m.value / total } else { 0.0 };
        let bar = "█".repeat(bar_cells(share, 1.0));
        let bar = match m.label.as_str() {
            "High Risk" => bar.red(),
            "Medium Risk" => bar.yellow(),
            _ => bar.green(),
        };
        writeln!(
            out,
            "  {:<width$} {} {:.0}%",
            m.label,
            bar,
            share * 100.0,
            width = label_width
        )?;
    }
    Ok(())
}

fn bar_cells(value: f64, scale: f64) -> usize {
    if scale <= 0.0 || value <= 0.0 {
        return 0;
    }
    ((value / scale).min(1.0) * CHART_WIDTH as f64).round() as usize
}
