//! Prediction request lifecycle.
//!
//! - [`model`] — request/result payloads and the rendered UI state
//! - [`risk`] — the fixed-threshold risk tier classifier
//! - [`client`] — the prediction service seam and its HTTP implementation
//! - [`controller`] — submission, completion ordering, and rendering

pub mod client;
pub mod controller;
pub mod model;
pub mod risk;

pub use client::{HttpPredictionClient, PredictionError, PredictionService};
pub use controller::{Completion, OrderingPolicy, PredictionController, SubmitError};
pub use model::{PredictionRequest, PredictionResult, UiState};
pub use risk::{RiskTier, classify};
