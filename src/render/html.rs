//! HTML fragment sink.
//!
//! Holds the current content of the result container as a string. Every
//! `show_*` call replaces it wholesale, so at most one fragment is ever
//! present. Text coming from the service is escaped before insertion.

use super::{ResultSink, ResultView, format_probability};

/// Result container backed by an HTML string.
#[derive(Debug, Default, Clone)]
pub struct HtmlSink {
    content: String,
    visible: bool,
    loading: bool,
}

impl HtmlSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current inner HTML of the container.
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Whether the container has been shown at least once.
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Consume the sink and return the rendered fragment.
    pub fn into_content(self) -> String {
        self.content
    }

    fn replace(&mut self, html: String) {
        self.content = html;
        self.visible = true;
    }
}

impl ResultSink for HtmlSink {
    fn show_loading(&mut self) {
        self.loading = true;
        self.replace(loading_fragment());
    }

    fn clear_loading(&mut self) {
        self.loading = false;
    }

    fn show_result(&mut self, view: &ResultView<'_>) {
        self.replace(result_fragment(view));
    }

    fn show_error(&mut self, message: &str) {
        self.replace(error_fragment(message));
    }
}

// ---------------------------------------------------------------------------
// Fragments
// ---------------------------------------------------------------------------

/// Spinner shown while a request is pending.
pub fn loading_fragment() -> String {
    r#"<div class="loading">
  <div class="spinner"></div>
  <p>Analyzing customer data with AI...</p>
  <p class="text-muted">This may take a few seconds</p>
</div>"#
        .to_string()
}

/// Result card. The recommendations block appears only when there are tips.
pub fn result_fragment(view: &ResultView<'_>) -> String {
    let probability = format_probability(view.probability);

    let tips = if view.has_recommendations() {
        let items: String = view
            .tips
            .iter()
            .map(|tip| format!("<li>{}</li>", escape(tip)))
            .collect();
        format!(
            r#"
  <div class="retention-tips">
    <h4>Retention Recommendations</h4>
    <ul>{items}</ul>
  </div>"#
        )
    } else {
        String::new()
    };

    format!(
        r#"<div class="result-card">
  <h3>Prediction Result</h3>
  <div class="probability-circle {style}" style="--p: {probability}%; --tier-color: {color}">
    <span>{probability}%</span>
  </div>
  <div class="prediction-badge {badge}">Churn Prediction: {prediction}</div>
  <p><strong>Risk Level:</strong> {tier}</p>{tips}
</div>"#,
        style = view.tier.style_tag(),
        color = view.tier.color(),
        badge = view.tier.badge_class(),
        prediction = escape(view.prediction),
        tier = view.tier.label(),
    )
}

/// Error card carrying the failure message.
pub fn error_fragment(message: &str) -> String {
    format!(
        r#"<div class="result-card error">
  <h3>Prediction Error</h3>
  <p class="error-message">{}</p>
  <p class="text-muted">Please check your input and try again.</p>
</div>"#,
        escape(message)
    )
}

/// Escape text for inclusion in HTML element content or attribute values.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::predict::risk::RiskTier;

    fn view<'a>(probability: f64, tips: &'a [String]) -> ResultView<'a> {
        ResultView {
            probability,
            prediction: "Yes",
            tier: crate::predict::risk::classify(probability),
            tips,
        }
    }

    #[test]
    fn result_without_tips_has_no_block() {
        let html = result_fragment(&view(85.0, &[]));
        assert!(!html.contains("retention-tips"));
        assert!(html.contains("High Risk"));
        assert!(html.contains("probability-high"));
        assert!(html.contains("<span>85%</span>"));
    }

    #[test]
    fn result_with_one_tip_has_one_item() {
        let tips = vec!["Offer discount".to_string()];
        let html = result_fragment(&view(55.5, &tips));
        assert!(html.contains("retention-tips"));
        assert_eq!(html.matches("<li>").count(), 1);
        assert!(html.contains("<li>Offer discount</li>"));
        assert!(html.contains(RiskTier::Medium.label()));
    }

    #[test]
    fn error_message_is_escaped() {
        let html = error_fragment("bad <input> & stuff");
        assert!(html.contains("bad &lt;input&gt; &amp; stuff"));
    }

    #[test]
    fn sink_replaces_content() {
        let mut sink = HtmlSink::new();
        assert!(!sink.is_visible());
        sink.show_loading();
        assert!(sink.is_loading());
        assert!(sink.content().contains("spinner"));
        sink.show_error("invalid input");
        sink.clear_loading();
        assert!(!sink.is_loading());
        assert!(!sink.content().contains("spinner"));
        assert!(sink.content().contains("invalid input"));
    }
}
