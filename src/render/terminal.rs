//! Colored terminal sink for `churnwatch predict`.
//!
//! Write failures are ignored: a broken pipe on stdout must not turn a
//! finished prediction into an error.

use std::io::Write;

use colored::{ColoredString, Colorize};

use super::{ResultSink, ResultView, format_probability};
use crate::predict::risk::RiskTier;

/// Width of the probability gauge in cells.
const GAUGE_WIDTH: usize = 30;

pub struct TerminalSink<W: Write> {
    out: W,
    loading: bool,
    counter_active: bool,
}

impl<W: Write> TerminalSink<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            loading: false,
            counter_active: false,
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> ResultSink for TerminalSink<W> {
    fn show_loading(&mut self) {
        self.loading = true;
        let _ = writeln!(
            self.out,
            "{} {}",
            "…".cyan(),
            "Analyzing customer data...".dimmed()
        );
        let _ = self.out.flush();
    }

    fn clear_loading(&mut self) {
        self.loading = false;
    }

    fn show_result(&mut self, view: &ResultView<'_>) {
        let out = &mut self.out;
        let _ = writeln!(out);
        let _ = writeln!(out, "{}", "Prediction Result".bold().cyan());
        let _ = writeln!(out, "{}", "=".repeat(40));
        let _ = writeln!(
            out,
            "  {} {}%",
            "Churn probability:".bold(),
            format_probability(view.probability)
        );
        let _ = writeln!(out, "  {} {}", "Churn prediction: ".bold(), view.prediction);
        let _ = writeln!(
            out,
            "  {} {}",
            "Risk level:       ".bold(),
            tint(view.tier, view.tier.label()).bold()
        );

        if view.has_recommendations() {
            let _ = writeln!(out);
            let _ = writeln!(out, "{}", "Retention Recommendations".bold().cyan());
            for tip in view.tips {
                let _ = writeln!(out, "  • {tip}");
            }
        }
        let _ = writeln!(out);
        let _ = out.flush();
    }

    fn show_error(&mut self, message: &str) {
        let _ = writeln!(self.out);
        let _ = writeln!(self.out, "{}", "Prediction Error".bold().red());
        let _ = writeln!(self.out, "  {message}");
        let _ = writeln!(
            self.out,
            "  {}",
            "Please check your input and try again.".dimmed()
        );
        let _ = self.out.flush();
    }

    fn update_counter(&mut self, value: i64) {
        self.counter_active = true;
        let _ = write!(self.out, "\r  {}", gauge(value));
        let _ = self.out.flush();
    }

    fn finish_counter(&mut self) {
        if self.counter_active {
            self.counter_active = false;
            let _ = writeln!(self.out);
            let _ = self.out.flush();
        }
    }
}

/// A `[#####.....]  42%` gauge colored by the tier of the current value.
fn gauge(value: i64) -> String {
    let clamped = value.clamp(0, 100) as usize;
    let filled = clamped * GAUGE_WIDTH / 100;
    let bar = format!("{}{}", "#".repeat(filled), ".".repeat(GAUGE_WIDTH - filled));
    let tier = crate::predict::risk::classify(value as f64);
    format!("[{}] {:>3}%", tint(tier, &bar), value)
}

fn tint(tier: RiskTier, text: &str) -> ColoredString {
    match tier {
        RiskTier::Low => text.green(),
        RiskTier::Medium => text.yellow(),
        RiskTier::High => text.red(),
    }
}
