//! Configuration schema and defaults for churnwatch.
//!
//! Sections: `[endpoint]`, `[animation]`, `[controller]`, `[logging]`,
//! `[web]`. Every field has a built-in default; config files only need the
//! values they change.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::animation::AnimationSettings;
use crate::predict::controller::OrderingPolicy;

/// Top-level configuration, mapped from `~/.churnwatch/config.toml` and
/// `.churnwatch.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChurnwatchConfig {
    pub endpoint: EndpointConfig,
    pub animation: AnimationConfig,
    pub controller: ControllerConfig,
    pub logging: LoggingConfig,
    pub web: WebConfig,
}

// ---------------------------------------------------------------------------
// [endpoint]
// ---------------------------------------------------------------------------

/// Where predictions are requested from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EndpointConfig {
    /// Base URL of the prediction service.
    pub base_url: String,
    /// Path of the prediction route.
    pub predict_path: String,
    /// Request timeout. Unset means the call may wait indefinitely.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:5000".to_string(),
            predict_path: "/api/predict".to_string(),
            timeout_ms: None,
        }
    }
}

// ---------------------------------------------------------------------------
// [animation]
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimationConfig {
    /// Animate counters in the terminal.
    pub enabled: bool,
    /// Probability counter duration on the result card.
    pub probability_duration_ms: u64,
    /// Dashboard stat counter duration.
    pub stat_duration_ms: u64,
    /// Delay between redraws.
    pub frame_interval_ms: u64,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            probability_duration_ms: 1500,
            stat_duration_ms: 2000,
            frame_interval_ms: 16,
        }
    }
}

impl AnimationConfig {
    pub fn probability(&self) -> AnimationSettings {
        AnimationSettings {
            duration: Duration::from_millis(self.probability_duration_ms),
            frame_interval: Duration::from_millis(self.frame_interval_ms),
        }
    }

    pub fn stats(&self) -> AnimationSettings {
        AnimationSettings {
            duration: Duration::from_millis(self.stat_duration_ms),
            frame_interval: Duration::from_millis(self.frame_interval_ms),
        }
    }
}

// ---------------------------------------------------------------------------
// [controller]
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    /// `last-resolved-wins` or `latest-submission-wins`.
    pub ordering: OrderingPolicy,
}

// ---------------------------------------------------------------------------
// [logging]
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Append every completed prediction to the JSONL log.
    pub enabled: bool,
    /// Log file override. Defaults to `~/.churnwatch/predictions.jsonl`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            path: None,
        }
    }
}

// ---------------------------------------------------------------------------
// [web]
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WebConfig {
    /// Listen address for `churnwatch serve`.
    pub addr: String,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            addr: "127.0.0.1:9747".to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Annotated template
// ---------------------------------------------------------------------------

impl ChurnwatchConfig {
    /// The annotated default config written by `churnwatch config init`.
    pub fn default_toml() -> String {
        r#"# churnwatch configuration
#
# Configuration hierarchy (highest precedence wins):
#   1. Environment variables (CHURNWATCH_*)
#   2. Project config (.churnwatch.toml in current directory)
#   3. User global config (~/.churnwatch/config.toml)
#   4. Built-in defaults

[endpoint]
base_url = "http://127.0.0.1:5000"
predict_path = "/api/predict"
# timeout_ms = 10000                  # Unset: wait for the service indefinitely

[animation]
enabled = true
probability_duration_ms = 1500
stat_duration_ms = 2000
frame_interval_ms = 16

[controller]
ordering = "last-resolved-wins"       # last-resolved-wins | latest-submission-wins

[logging]
enabled = true
# path = "/var/log/churnwatch/predictions.jsonl"

[web]
addr = "127.0.0.1:9747"
"#
        .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_toml_parses_back() {
        let config: ChurnwatchConfig = toml::from_str(&ChurnwatchConfig::default_toml()).unwrap();
        assert_eq!(config, ChurnwatchConfig::default());
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let config: ChurnwatchConfig = toml::from_str(
            r#"
[endpoint]
base_url = "http://models:8080"

[controller]
ordering = "latest-submission-wins"
"#,
        )
        .unwrap();
        assert_eq!(config.endpoint.base_url, "http://models:8080");
        assert_eq!(config.endpoint.predict_path, "/api/predict");
        assert_eq!(config.controller.ordering, OrderingPolicy::LatestSubmissionWins);
        assert_eq!(config.animation.probability_duration_ms, 1500);
    }

    #[test]
    fn serialized_defaults_omit_unset_options() {
        let text = toml::to_string_pretty(&ChurnwatchConfig::default()).unwrap();
        assert!(!text.contains("timeout_ms"));
        assert!(text.contains("ordering = \"last-resolved-wins\""));
    }

    #[test]
    fn animation_settings() {
        let anim = AnimationConfig::default();
        assert_eq!(anim.probability().duration, Duration::from_millis(1500));
        assert_eq!(anim.stats().duration, Duration::from_millis(2000));
        assert_eq!(anim.stats().frame_interval, Duration::from_millis(16));
    }
}
