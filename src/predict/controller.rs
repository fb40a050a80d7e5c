//! Prediction controller — owns the lifecycle of prediction submissions.
//!
//! ```text
//! Idle ──submit──▶ Loading ──completion──▶ Success(result) | Error(message)
//!                    ▲                               │
//!                    └────────────submit─────────────┘
//! ```
//!
//! # Threading
//!
//! The controller and its sink live on one thread. `submit` renders the
//! loading state immediately and hands the network call to a worker thread,
//! which reports a [`Completion`] back over a channel. Completions are only
//! applied on the controller thread, through [`PredictionController::poll`]
//! or [`PredictionController::wait_idle`], so rendering never races.
//!
//! # Duplicate submissions
//!
//! Submitting again while a request is pending is allowed. What the user
//! ends up seeing depends on the [`OrderingPolicy`]:
//!
//! - [`OrderingPolicy::LastResolvedWins`] applies completions in arrival
//!   order; the request that resolves last owns the final render even if it
//!   was submitted first.
//! - [`OrderingPolicy::LatestSubmissionWins`] tags each submission with a
//!   generation number and drops completions from superseded submissions.
//!
//! In both policies the loading indicator is cleared exactly once per
//! submission, whatever the outcome.

use std::ops::{Deref, DerefMut};
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::thread;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use super::client::{PredictionError, PredictionService};
use super::model::{PredictionRequest, PredictionResult, UiState};
use crate::animation::{AnimationSettings, Clock, CounterAnimation, MonotonicClock};
use crate::render::{ResultSink, ResultView};

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// How completions from overlapping submissions are ordered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OrderingPolicy {
    /// Whichever request resolves last is displayed.
    #[default]
    LastResolvedWins,
    /// Only the most recent submission may be displayed.
    LatestSubmissionWins,
}

impl std::fmt::Display for OrderingPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::LastResolvedWins => write!(f, "last-resolved-wins"),
            Self::LatestSubmissionWins => write!(f, "latest-submission-wins"),
        }
    }
}

/// Rejected submission. Nothing is rendered when this is returned.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SubmitError {
    #[error("prediction request has no fields")]
    EmptyRequest,
}

/// The outcome of one submission, as reported by its worker.
#[derive(Debug, Clone)]
pub struct Completion {
    /// Generation number assigned at submit time (1-based).
    pub generation: u64,
    pub outcome: Result<PredictionResult, PredictionError>,
    /// Wall time between dispatch and response.
    pub latency: Duration,
    /// `false` when the completion was superseded and not rendered.
    pub displayed: bool,
}

type CompletionHook = Box<dyn FnMut(&Completion)>;

// ---------------------------------------------------------------------------
// Loading guard
// ---------------------------------------------------------------------------

/// Clears the sink's loading indicator when dropped.
///
/// Every completion is handled through one of these, so the indicator is
/// cleared on the success, application-error and transport-error paths
/// alike, including early returns.
struct LoadingGuard<'a, S: ResultSink> {
    sink: &'a mut S,
}

impl<'a, S: ResultSink> LoadingGuard<'a, S> {
    fn new(sink: &'a mut S) -> Self {
        Self { sink }
    }
}

impl<S: ResultSink> Deref for LoadingGuard<'_, S> {
    type Target = S;

    fn deref(&self) -> &S {
        self.sink
    }
}

impl<S: ResultSink> DerefMut for LoadingGuard<'_, S> {
    fn deref_mut(&mut self) -> &mut S {
        self.sink
    }
}

impl<S: ResultSink> Drop for LoadingGuard<'_, S> {
    fn drop(&mut self) {
        self.sink.clear_loading();
    }
}

// ---------------------------------------------------------------------------
// Controller
// ---------------------------------------------------------------------------

pub struct PredictionController<S: ResultSink> {
    service: Arc<dyn PredictionService>,
    sink: S,
    state: UiState,
    ordering: OrderingPolicy,
    generation: u64,
    in_flight: usize,
    tx: Sender<Completion>,
    rx: Receiver<Completion>,
    animation: Option<AnimationSettings>,
    clock: Box<dyn Clock>,
    on_completion: Option<CompletionHook>,
}

impl<S: ResultSink> PredictionController<S> {
    /// Build a controller around an injected service and result sink.
    ///
    /// Starts `Idle`, with [`OrderingPolicy::LastResolvedWins`] and no
    /// counter animation.
    pub fn new(service: Arc<dyn PredictionService>, sink: S) -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            service,
            sink,
            state: UiState::Idle,
            ordering: OrderingPolicy::default(),
            generation: 0,
            in_flight: 0,
            tx,
            rx,
            animation: None,
            clock: Box::new(MonotonicClock::new()),
            on_completion: None,
        }
    }

    pub fn with_ordering(mut self, ordering: OrderingPolicy) -> Self {
        self.ordering = ordering;
        self
    }

    /// Animate the probability counter after each displayed result.
    pub fn with_animation(mut self, settings: AnimationSettings) -> Self {
        self.animation = Some(settings);
        self
    }

    pub fn with_clock(mut self, clock: Box<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Called for every completion, displayed or not. Used for logging.
    pub fn on_completion(mut self, hook: impl FnMut(&Completion) + 'static) -> Self {
        self.on_completion = Some(Box::new(hook));
        self
    }

    pub fn state(&self) -> &UiState {
        &self.state
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }

    pub fn ordering(&self) -> OrderingPolicy {
        self.ordering
    }

    /// Number of submissions whose completion has not been applied yet.
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    /// Submit a prediction request.
    ///
    /// Renders the loading state, then dispatches the request on a worker
    /// thread and returns the submission's generation number. The result is
    /// rendered later, when the completion is applied.
    pub fn submit(&mut self, request: PredictionRequest) -> Result<u64, SubmitError> {
        if request.is_empty() {
            return Err(SubmitError::EmptyRequest);
        }

        self.generation += 1;
        self.in_flight += 1;
        self.state = UiState::Loading;
        self.sink.show_loading();

        let generation = self.generation;
        let service = Arc::clone(&self.service);
        let tx = self.tx.clone();
        thread::spawn(move || {
            let started = Instant::now();
            let outcome = service.predict(&request);
            // The receiver only disappears with the controller itself.
            let _ = tx.send(Completion {
                generation,
                outcome,
                latency: started.elapsed(),
                displayed: true,
            });
        });

        Ok(generation)
    }

    /// Apply every completion that has already arrived, without blocking.
    ///
    /// Returns the number of completions applied.
    pub fn poll(&mut self) -> usize {
        let mut applied = 0;
        while self.in_flight > 0 {
            match self.rx.try_recv() {
                Ok(completion) => {
                    self.apply(completion);
                    applied += 1;
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
        applied
    }

    /// Block until every pending submission has completed and been applied.
    ///
    /// There is no timeout: a request the server never answers keeps this
    /// waiting unless the endpoint config sets one.
    pub fn wait_idle(&mut self) -> usize {
        let mut applied = 0;
        while self.in_flight > 0 {
            match self.rx.recv() {
                Ok(completion) => {
                    self.apply(completion);
                    applied += 1;
                }
                Err(_) => break,
            }
        }
        applied
    }

    fn apply(&mut self, mut completion: Completion) {
        self.in_flight = self.in_flight.saturating_sub(1);
        let stale = self.ordering == OrderingPolicy::LatestSubmissionWins
            && completion.generation != self.generation;
        completion.displayed = !stale;

        {
            let mut sink = LoadingGuard::new(&mut self.sink);
            if !stale {
                match &completion.outcome {
                    Ok(result) => {
                        sink.show_result(&ResultView::from_result(result));
                        self.state = UiState::Success(result.clone());
                        if let Some(settings) = self.animation {
                            let anim =
                                CounterAnimation::new(0.0, result.churn_probability, settings.duration);
                            anim.run(self.clock.as_ref(), settings.frame_interval, |v| {
                                sink.update_counter(v)
                            });
                            sink.finish_counter();
                        }
                    }
                    Err(err) => {
                        sink.show_error(err.message());
                        self.state = UiState::Error(err.message().to_string());
                    }
                }
            }
        }

        if let Some(hook) = self.on_completion.as_mut() {
            hook(&completion);
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::tests::SteppedClock;

    #[derive(Debug, Default)]
    struct CountingSink {
        loading_shown: usize,
        loading_cleared: usize,
        results: Vec<f64>,
        errors: Vec<String>,
        frames: Vec<i64>,
    }

    impl ResultSink for CountingSink {
        fn show_loading(&mut self) {
            self.loading_shown += 1;
        }
        fn clear_loading(&mut self) {
            self.loading_cleared += 1;
        }
        fn show_result(&mut self, view: &ResultView<'_>) {
            self.results.push(view.probability);
        }
        fn show_error(&mut self, message: &str) {
            self.errors.push(message.to_string());
        }
        fn update_counter(&mut self, value: i64) {
            self.frames.push(value);
        }
    }

    struct Fixed(Result<PredictionResult, PredictionError>);

    impl PredictionService for Fixed {
        fn predict(&self, _: &PredictionRequest) -> Result<PredictionResult, PredictionError> {
            self.0.clone()
        }
    }

    fn result(probability: f64) -> PredictionResult {
        PredictionResult {
            churn_probability: probability,
            churn_prediction: "Yes".to_string(),
            retention_tips: None,
            risk_level: None,
        }
    }

    fn request() -> PredictionRequest {
        PredictionRequest::new().with_field("tenure", "3")
    }

    #[test]
    fn empty_request_is_rejected_without_rendering() {
        let mut ctl = PredictionController::new(Arc::new(Fixed(Ok(result(10.0)))), CountingSink::default());
        assert_eq!(ctl.submit(PredictionRequest::new()), Err(SubmitError::EmptyRequest));
        assert_eq!(ctl.state(), &UiState::Idle);
        assert_eq!(ctl.sink().loading_shown, 0);
    }

    #[test]
    fn submit_renders_loading_then_result() {
        let mut ctl = PredictionController::new(Arc::new(Fixed(Ok(result(85.0)))), CountingSink::default());
        let generation = ctl.submit(request()).unwrap();
        assert_eq!(generation, 1);
        assert_eq!(ctl.sink().loading_shown, 1);
        assert_eq!(ctl.in_flight(), 1);

        assert_eq!(ctl.wait_idle(), 1);
        assert_eq!(ctl.state(), &UiState::Success(result(85.0)));
        assert_eq!(ctl.sink().results, vec![85.0]);
        assert_eq!(ctl.sink().loading_cleared, 1);
        assert_eq!(ctl.in_flight(), 0);
    }

    #[test]
    fn error_clears_loading_once() {
        let err = PredictionError::Application("invalid input".to_string());
        let mut ctl = PredictionController::new(Arc::new(Fixed(Err(err))), CountingSink::default());
        ctl.submit(request()).unwrap();
        ctl.wait_idle();
        assert_eq!(ctl.state(), &UiState::Error("invalid input".to_string()));
        assert_eq!(ctl.sink().errors, vec!["invalid input".to_string()]);
        assert_eq!(ctl.sink().loading_cleared, 1);
    }

    #[test]
    fn animation_frames_reach_final_value() {
        let mut ctl = PredictionController::new(Arc::new(Fixed(Ok(result(85.0)))), CountingSink::default())
            .with_clock(Box::new(SteppedClock::new()))
            .with_animation(AnimationSettings {
                duration: Duration::from_millis(1500),
                frame_interval: Duration::from_millis(16),
            });
        ctl.submit(request()).unwrap();
        ctl.wait_idle();

        let frames = &ctl.sink().frames;
        assert_eq!(frames.first(), Some(&0));
        assert_eq!(frames.last(), Some(&85));
        assert!(frames.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn hook_sees_every_completion() {
        let seen = std::rc::Rc::new(std::cell::RefCell::new(Vec::new()));
        let sink_seen = std::rc::Rc::clone(&seen);
        let mut ctl = PredictionController::new(Arc::new(Fixed(Ok(result(30.0)))), CountingSink::default())
            .on_completion(move |c| sink_seen.borrow_mut().push((c.generation, c.displayed)));
        ctl.submit(request()).unwrap();
        ctl.submit(request()).unwrap();
        ctl.wait_idle();

        let mut seen = seen.borrow().clone();
        seen.sort();
        assert_eq!(seen, vec![(1, true), (2, true)]);
    }

    #[test]
    fn ordering_display() {
        assert_eq!(OrderingPolicy::LastResolvedWins.to_string(), "last-resolved-wins");
        assert_eq!(
            OrderingPolicy::LatestSubmissionWins.to_string(),
            "latest-submission-wins"
        );
    }
}
