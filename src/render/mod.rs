//! Result sinks: where the controller's rendered states land.
//!
//! The controller never touches an output surface directly. It drives a
//! [`ResultSink`], which owns the "result container" and replaces its
//! content with one of three fragments (loading, result card, error card).
//!
//! Two sinks ship with the crate:
//! - [`html::HtmlSink`] — builds the HTML fragments served by `churnwatch serve`
//! - [`terminal::TerminalSink`] — colored cards for `churnwatch predict`

pub mod html;
pub mod terminal;

use crate::predict::model::PredictionResult;
use crate::predict::risk::{self, RiskTier};

pub use html::HtmlSink;
pub use terminal::TerminalSink;

/// Output surface for the prediction lifecycle.
pub trait ResultSink {
    /// Replace the container content with the loading indicator.
    fn show_loading(&mut self);

    /// Clear the loading indicator. Called exactly once per submission.
    fn clear_loading(&mut self);

    /// Replace the container content with the result card.
    fn show_result(&mut self, view: &ResultView<'_>);

    /// Replace the container content with the error card.
    fn show_error(&mut self, message: &str);

    /// One frame of the animated probability counter.
    fn update_counter(&mut self, _value: i64) {}

    /// The counter animation reached its final frame.
    fn finish_counter(&mut self) {}
}

/// Everything a sink needs to draw a result card.
#[derive(Debug, Clone, Copy)]
pub struct ResultView<'a> {
    pub probability: f64,
    pub prediction: &'a str,
    pub tier: RiskTier,
    pub tips: &'a [String],
}

impl<'a> ResultView<'a> {
    pub fn from_result(result: &'a PredictionResult) -> Self {
        Self {
            probability: result.churn_probability,
            prediction: &result.churn_prediction,
            tier: risk::classify(result.churn_probability),
            tips: result.tips(),
        }
    }

    /// Whether the recommendations block is drawn.
    pub fn has_recommendations(&self) -> bool {
        !self.tips.is_empty()
    }
}

/// Format a probability the way the service reports it (`81.27`, `40`).
pub fn format_probability(probability: f64) -> String {
    let rounded = (probability * 100.0).round() / 100.0;
    if rounded.fract() == 0.0 {
        format!("{rounded:.0}")
    } else {
        let text = format!("{rounded:.2}");
        text.trim_end_matches('0').to_string()
    }
}
