//! Payload types exchanged with the prediction endpoint.
//!
//! The request is an opaque field map built from form input; the controller
//! never inspects individual fields. The result mirrors the JSON record the
//! prediction service returns.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

// ---------------------------------------------------------------------------
// Request
// ---------------------------------------------------------------------------

/// Form fields submitted for one prediction, serialized as a flat JSON object.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PredictionRequest {
    fields: BTreeMap<String, String>,
}

impl PredictionRequest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.fields.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Parse a JSON object of form fields.
    ///
    /// Scalars are stringified the way a browser form submits them; nested
    /// arrays or objects make the whole body invalid.
    pub fn from_json_fields(body: &str) -> Option<Self> {
        let Value::Object(map) = serde_json::from_str::<Value>(body).ok()? else {
            return None;
        };

        let mut request = Self::new();
        for (key, value) in map {
            let value = match value {
                Value::String(s) => s,
                Value::Number(n) => n.to_string(),
                Value::Bool(b) => b.to_string(),
                Value::Null => String::new(),
                Value::Array(_) | Value::Object(_) => return None,
            };
            request.insert(key, value);
        }
        Some(request)
    }
}

impl<K, V> FromIterator<(K, V)> for PredictionRequest
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            fields: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

// ---------------------------------------------------------------------------
// Result
// ---------------------------------------------------------------------------

/// Server-returned prediction record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    /// Likelihood of churn, 0–100.
    pub churn_probability: f64,
    /// Predicted label (the service answers `"Yes"` / `"No"`).
    pub churn_prediction: String,
    /// Suggested retention actions; absent and empty are treated the same.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retention_tips: Option<Vec<String>>,
    /// Server-side tier. Not used for display: the tier is always recomputed
    /// from `churn_probability`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub risk_level: Option<String>,
}

impl PredictionResult {
    /// Retention tips, or an empty slice when the field was absent.
    pub fn tips(&self) -> &[String] {
        self.retention_tips.as_deref().unwrap_or(&[])
    }

    pub fn has_recommendations(&self) -> bool {
        !self.tips().is_empty()
    }
}

// ---------------------------------------------------------------------------
// UI state
// ---------------------------------------------------------------------------

/// The single state currently rendered by a controller.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(tag = "state", content = "value", rename_all = "snake_case")]
pub enum UiState {
    #[default]
    Idle,
    Loading,
    Success(PredictionResult),
    Error(String),
}

impl UiState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Success(_) | Self::Error(_))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
