//! Risk tier classification for a churn probability.
//!
//! Two strict breakpoints: anything above 70 is high risk, anything above 40
//! is medium risk, the rest is low risk. Boundary values belong to the lower
//! tier (`70.0` is Medium, `40.0` is Low).

use serde::Serialize;

const HIGH_RISK_ABOVE: f64 = 70.0;
const MEDIUM_RISK_ABOVE: f64 = 40.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskTier {
    Low,
    Medium,
    High,
}

/// Classify a probability (0–100) into a [`RiskTier`].
pub fn classify(probability: f64) -> RiskTier {
    if probability > HIGH_RISK_ABOVE {
        RiskTier::High
    } else if probability > MEDIUM_RISK_ABOVE {
        RiskTier::Medium
    } else {
        RiskTier::Low
    }
}

impl RiskTier {
    /// Human-readable tier label.
    pub fn label(self) -> &'static str {
        match self {
            Self::Low => "Low Risk",
            Self::Medium => "Medium Risk",
            Self::High => "High Risk",
        }
    }

    /// CSS class for the probability gauge.
    pub fn style_tag(self) -> &'static str {
        match self {
            Self::Low => "probability-low",
            Self::Medium => "probability-medium",
            Self::High => "probability-high",
        }
    }

    /// CSS class for the prediction badge.
    pub fn badge_class(self) -> &'static str {
        match self {
            Self::Low => "badge-success",
            Self::Medium => "badge-warning",
            Self::High => "badge-danger",
        }
    }

    /// Hex color associated with the tier.
    pub fn color(self) -> &'static str {
        match self {
            Self::Low => "#10b981",
            Self::Medium => "#f59e0b",
            Self::High => "#ef4444",
        }
    }

    /// Short name as stored in the prediction log.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl std::fmt::Display for RiskTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}
