//! Controller behavior through the public API: rendering contract, error
//! handling, and overlapping submissions under both ordering policies.

use std::collections::HashMap;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use churnwatch::predict::{
    OrderingPolicy, PredictionController, PredictionError, PredictionRequest, PredictionResult,
    PredictionService, UiState,
};
use churnwatch::render::{HtmlSink, ResultSink, ResultView};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Records every sink call in order.
#[derive(Debug, Default)]
struct RecordingSink {
    events: Vec<String>,
    tips_rendered: Vec<usize>,
}

impl RecordingSink {
    fn count(&self, event: &str) -> usize {
        self.events.iter().filter(|e| e.as_str() == event).count()
    }
}

impl ResultSink for RecordingSink {
    fn show_loading(&mut self) {
        self.events.push("loading".to_string());
    }

    fn clear_loading(&mut self) {
        self.events.push("clear".to_string());
    }

    fn show_result(&mut self, view: &ResultView<'_>) {
        self.events.push(format!("result:{}", view.probability));
        if view.has_recommendations() {
            self.tips_rendered.push(view.tips.len());
        }
    }

    fn show_error(&mut self, message: &str) {
        self.events.push(format!("error:{message}"));
    }
}

/// Always answers with the same outcome.
struct Fixed(Result<PredictionResult, PredictionError>);

impl PredictionService for Fixed {
    fn predict(&self, _: &PredictionRequest) -> Result<PredictionResult, PredictionError> {
        self.0.clone()
    }
}

/// Blocks each request until the test releases it by request id.
///
/// The id is the `id` form field; the answer's probability is taken from the
/// `probability` field so tests can tell the responses apart.
#[derive(Default)]
struct Gated {
    gates: Mutex<HashMap<String, Receiver<()>>>,
}

impl Gated {
    fn gate(&self, id: &str) -> Sender<()> {
        let (tx, rx) = mpsc::channel();
        self.gates.lock().unwrap().insert(id.to_string(), rx);
        tx
    }
}

impl PredictionService for Gated {
    fn predict(&self, request: &PredictionRequest) -> Result<PredictionResult, PredictionError> {
        let id = request.get("id").unwrap_or_default().to_string();
        let gate = self.gates.lock().unwrap().remove(&id);
        if let Some(gate) = gate {
            let _ = gate.recv();
        }
        Ok(result(
            request
                .get("probability")
                .and_then(|p| p.parse().ok())
                .unwrap_or(0.0),
            None,
        ))
    }
}

fn result(probability: f64, tips: Option<Vec<String>>) -> PredictionResult {
    PredictionResult {
        churn_probability: probability,
        churn_prediction: if probability > 50.0 { "Yes" } else { "No" }.to_string(),
        retention_tips: tips,
        risk_level: None,
    }
}

fn request(id: &str, probability: f64) -> PredictionRequest {
    PredictionRequest::new()
        .with_field("id", id)
        .with_field("probability", probability.to_string())
}

/// Poll until exactly `remaining` submissions are still pending.
fn poll_until<S: ResultSink>(ctl: &mut PredictionController<S>, remaining: usize) {
    for _ in 0..500 {
        ctl.poll();
        if ctl.in_flight() == remaining {
            return;
        }
        std::thread::sleep(Duration::from_millis(10));
    }
    panic!("controller never reached {remaining} in flight");
}

// ---------------------------------------------------------------------------
// Rendering contract
// ---------------------------------------------------------------------------

#[test]
fn empty_tips_render_no_recommendations_block() {
    let service = Arc::new(Fixed(Ok(result(12.5, Some(Vec::new())))));
    let mut ctl = PredictionController::new(service, RecordingSink::default());
    ctl.submit(request("a", 12.5)).unwrap();
    ctl.wait_idle();

    assert_eq!(ctl.sink().events, vec!["loading", "result:12.5", "clear"]);
    assert!(ctl.sink().tips_rendered.is_empty());
}

#[test]
fn single_tip_renders_one_item() {
    let tips = vec!["Offer long-term contract incentives".to_string()];
    let service = Arc::new(Fixed(Ok(result(81.27, Some(tips)))));
    let mut ctl = PredictionController::new(service, HtmlSink::new());
    ctl.submit(request("a", 81.27)).unwrap();
    ctl.wait_idle();

    let html = ctl.sink().content();
    assert!(html.contains("81.27%"));
    assert!(html.contains("High Risk"));
    assert_eq!(html.matches("<li>").count(), 1);
    assert!(!ctl.sink().is_loading());
}

#[test]
fn application_error_shows_server_message() {
    let err = PredictionError::Application("invalid input".to_string());
    let mut ctl = PredictionController::new(Arc::new(Fixed(Err(err))), RecordingSink::default());
    ctl.submit(request("a", 0.0)).unwrap();
    ctl.wait_idle();

    assert_eq!(ctl.state(), &UiState::Error("invalid input".to_string()));
    assert_eq!(ctl.sink().events, vec!["loading", "error:invalid input", "clear"]);
}

#[test]
fn transport_error_clears_loading_once() {
    let err = PredictionError::Transport("connection refused".to_string());
    let mut ctl = PredictionController::new(Arc::new(Fixed(Err(err))), RecordingSink::default());
    ctl.submit(request("a", 0.0)).unwrap();
    ctl.wait_idle();

    assert_eq!(ctl.sink().count("loading"), 1);
    assert_eq!(ctl.sink().count("clear"), 1);
    assert!(matches!(ctl.state(), UiState::Error(m) if m == "connection refused"));
}

#[test]
fn controller_is_reusable_after_error() {
    let err = PredictionError::Malformed("expected value".to_string());
    let mut ctl = PredictionController::new(Arc::new(Fixed(Err(err))), RecordingSink::default());
    ctl.submit(request("a", 0.0)).unwrap();
    ctl.wait_idle();
    assert!(matches!(ctl.state(), UiState::Error(_)));

    ctl.submit(request("b", 0.0)).unwrap();
    assert_eq!(ctl.state(), &UiState::Loading);
    ctl.wait_idle();
    assert_eq!(ctl.sink().count("loading"), 2);
    assert_eq!(ctl.sink().count("clear"), 2);
}

// ---------------------------------------------------------------------------
// Overlapping submissions
// ---------------------------------------------------------------------------

#[test]
fn last_resolved_wins_by_default() {
    let service = Arc::new(Gated::default());
    let release_a = service.gate("a");
    let release_b = service.gate("b");

    let mut ctl = PredictionController::new(service.clone(), RecordingSink::default());
    assert_eq!(ctl.ordering(), OrderingPolicy::LastResolvedWins);
    ctl.submit(request("a", 20.0)).unwrap();
    ctl.submit(request("b", 90.0)).unwrap();

    // B resolves first, then A.
    release_b.send(()).unwrap();
    poll_until(&mut ctl, 1);
    release_a.send(()).unwrap();
    ctl.wait_idle();

    assert!(matches!(ctl.state(), UiState::Success(r) if r.churn_probability == 20.0));
    assert_eq!(ctl.sink().count("clear"), 2);
    assert_eq!(ctl.sink().events.last().map(String::as_str), Some("clear"));
    assert_eq!(ctl.sink().count("result:20"), 1);
    assert_eq!(ctl.sink().count("result:90"), 1);
}

#[test]
fn latest_submission_wins_drops_stale_results() {
    let service = Arc::new(Gated::default());
    let release_a = service.gate("a");
    let release_b = service.gate("b");

    let displayed = Arc::new(Mutex::new(Vec::new()));
    let seen = Arc::clone(&displayed);
    let mut ctl = PredictionController::new(service.clone(), RecordingSink::default())
        .with_ordering(OrderingPolicy::LatestSubmissionWins)
        .on_completion(move |c| seen.lock().unwrap().push((c.generation, c.displayed)));
    ctl.submit(request("a", 20.0)).unwrap();
    ctl.submit(request("b", 90.0)).unwrap();

    release_b.send(()).unwrap();
    poll_until(&mut ctl, 1);
    release_a.send(()).unwrap();
    ctl.wait_idle();

    assert!(matches!(ctl.state(), UiState::Success(r) if r.churn_probability == 90.0));
    assert_eq!(ctl.sink().count("result:20"), 0);
    // The stale completion still clears its loading indicator.
    assert_eq!(ctl.sink().count("clear"), 2);
    assert_eq!(*displayed.lock().unwrap(), vec![(2, true), (1, false)]);
}
