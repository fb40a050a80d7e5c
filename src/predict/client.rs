//! Prediction service seam and its HTTP implementation.
//!
//! The controller talks to the model through [`PredictionService`] so tests
//! and the web server can inject their own backends. The production backend
//! is [`HttpPredictionClient`], a synchronous `ureq` client that issues one
//! JSON `POST` per prediction.
//!
//! Outcomes map onto three failure kinds:
//!
//! - **Transport** — the request never reached the server or the response
//!   could not be read. The message is the transport error's own text.
//! - **Application** — non-2xx status; the JSON body's `error` field is the
//!   message, surfaced verbatim.
//! - **Malformed** — the body was not valid JSON or lacked required fields.
//!
//! There are no retries. No timeout is applied unless one is configured.

use std::time::Duration;

use serde::Deserialize;
use serde_json::Value;

use super::model::{PredictionRequest, PredictionResult};
use crate::config::schema::EndpointConfig;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Terminal failure of a single prediction request.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PredictionError {
    #[error("{0}")]
    Transport(String),
    #[error("{0}")]
    Application(String),
    #[error("{0}")]
    Malformed(String),
}

impl PredictionError {
    /// The user-facing message, without any kind prefix.
    pub fn message(&self) -> &str {
        match self {
            Self::Transport(m) | Self::Application(m) | Self::Malformed(m) => m,
        }
    }

    /// Outcome name as stored in the prediction log.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Transport(_) => "transport_error",
            Self::Application(_) => "application_error",
            Self::Malformed(_) => "malformed_response",
        }
    }
}

// ---------------------------------------------------------------------------
// Service seam
// ---------------------------------------------------------------------------

/// Anything that can turn a request into a prediction.
///
/// Called from worker threads, so implementations must be `Send + Sync`.
pub trait PredictionService: Send + Sync {
    fn predict(&self, request: &PredictionRequest) -> Result<PredictionResult, PredictionError>;
}

// ---------------------------------------------------------------------------
// HTTP client
// ---------------------------------------------------------------------------

/// Error body returned by the service on non-2xx responses.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    /// Usually a string; other JSON values are shown as their JSON text.
    error: Option<Value>,
}

/// Synchronous HTTP client for `POST {base_url}{predict_path}`.
#[derive(Debug, Clone)]
pub struct HttpPredictionClient {
    url: String,
    timeout: Option<Duration>,
}

impl HttpPredictionClient {
    /// Build a client from the resolved endpoint config.
    pub fn from_config(config: &EndpointConfig) -> Self {
        let base = config.base_url.trim_end_matches('/');
        let path = config.predict_path.trim_start_matches('/');
        // "localhost" may resolve to ::1 first while the service only binds IPv4.
        let url = format!("{base}/{path}").replace("://localhost", "://127.0.0.1");
        Self {
            url,
            timeout: config.timeout_ms.map(Duration::from_millis),
        }
    }

    /// Full endpoint URL this client posts to.
    pub fn url(&self) -> &str {
        &self.url
    }
}

impl PredictionService for HttpPredictionClient {
    fn predict(&self, request: &PredictionRequest) -> Result<PredictionResult, PredictionError> {
        let mut req = ureq::post(&self.url);
        if let Some(timeout) = self.timeout {
            req = req.timeout(timeout);
        }

        match req.send_json(request) {
            Ok(resp) => {
                let body = resp
                    .into_string()
                    .map_err(|e| PredictionError::Transport(e.to_string()))?;
                parse_success_body(&body)
            }
            Err(ureq::Error::Status(code, resp)) => {
                let body = resp
                    .into_string()
                    .map_err(|e| PredictionError::Transport(e.to_string()))?;
                Err(parse_error_body(code, &body))
            }
            Err(ureq::Error::Transport(transport)) => {
                Err(PredictionError::Transport(transport.to_string()))
            }
        }
    }
}

/// Parse a 2xx body into a result.
fn parse_success_body(body: &str) -> Result<PredictionResult, PredictionError> {
    serde_json::from_str(body).map_err(|e| PredictionError::Malformed(e.to_string()))
}

/// Turn a non-2xx body into the matching failure.
///
/// The body is parsed before the status is considered, so an unparseable
/// error body is reported as malformed rather than as an application error.
fn parse_error_body(status: u16, body: &str) -> PredictionError {
    match serde_json::from_str::<ErrorBody>(body) {
        Ok(ErrorBody {
            error: Some(Value::String(message)),
        }) => PredictionError::Application(message),
        Ok(ErrorBody {
            error: Some(Value::Null) | None,
        }) => {
            PredictionError::Application(format!("request failed with status {status}"))
        }
        Ok(ErrorBody { error: Some(other) }) => PredictionError::Application(other.to_string()),
        Err(e) => PredictionError::Malformed(e.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
