//! CLI command implementations.
//!
//! - `churnwatch predict` — one prediction, rendered to the terminal or HTML
//! - `churnwatch dashboard` — model charts and headline counters
//! - `churnwatch serve` — local web dashboard
//! - `churnwatch history` — summary of logged predictions
//! - `churnwatch health` — config, endpoint, and log status
//! - `churnwatch config show|init` — configuration management

use std::io::{IsTerminal, Write};
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use colored::Colorize;

use crate::analytics::logger;
use crate::analytics::reporter::{self, HistorySummary};
use crate::animation::stats::VisibilityTrigger;
use crate::animation::{Clock, MonotonicClock};
use crate::config::{self, ChurnwatchConfig};
use crate::dashboard::{self, DashboardMetrics};
use crate::predict::client::HttpPredictionClient;
use crate::predict::controller::PredictionController;
use crate::predict::model::{PredictionRequest, UiState};
use crate::render::{HtmlSink, ResultSink, TerminalSink};
use crate::web;

/// Output format for `history`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Json,
    Csv,
}

impl OutputFormat {
    pub fn from_str_opt(s: Option<&str>) -> Self {
        match s {
            Some("json") => Self::Json,
            Some("csv") => Self::Csv,
            _ => Self::Table,
        }
    }
}

/// Where `predict` renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PredictFormat {
    Terminal,
    Html,
}

impl PredictFormat {
    pub fn from_str_opt(s: Option<&str>) -> Self {
        match s {
            Some("html") => Self::Html,
            _ => Self::Terminal,
        }
    }
}

// ---------------------------------------------------------------------------
// churnwatch predict
// ---------------------------------------------------------------------------

/// Build a request from an optional JSON file plus `name=value` pairs.
///
/// Pairs override file fields with the same name.
pub fn build_request(input: Option<&Path>, fields: &[String]) -> Result<PredictionRequest> {
    let mut request = match input {
        Some(path) => {
            let body = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            PredictionRequest::from_json_fields(&body).with_context(|| {
                format!("{} must contain a JSON object of form fields", path.display())
            })?
        }
        None => PredictionRequest::new(),
    };

    for pair in fields {
        let (name, value) = pair
            .split_once('=')
            .with_context(|| format!("invalid field `{pair}`, expected name=value"))?;
        let name = name.trim();
        if name.is_empty() {
            anyhow::bail!("invalid field `{pair}`, field name is empty");
        }
        request.insert(name, value);
    }

    if request.is_empty() {
        anyhow::bail!("no form fields given; pass --field name=value or --input file.json");
    }

    Ok(request)
}

/// Submit one prediction and render it.
///
/// Returns `false` when the prediction ended in an error card, so `main` can
/// exit non-zero.
pub fn run_predict(request: PredictionRequest, format: PredictFormat, animate: bool) -> Result<bool> {
    let cfg = config::load();
    let animate = animate && cfg.animation.enabled && std::io::stdout().is_terminal();
    predict_with_config(&cfg, request, format, animate)
}

fn predict_with_config(
    cfg: &ChurnwatchConfig,
    request: PredictionRequest,
    format: PredictFormat,
    animate: bool,
) -> Result<bool> {
    let state = match format {
        PredictFormat::Terminal => {
            let controller =
                submit_and_wait(cfg, TerminalSink::new(std::io::stdout()), request, animate)?;
            controller.state().clone()
        }
        PredictFormat::Html => {
            let controller = submit_and_wait(cfg, HtmlSink::new(), request, false)?;
            let state = controller.state().clone();
            println!("{}", controller.into_sink().into_content());
            state
        }
    };

    Ok(!matches!(state, UiState::Error(_)))
}

fn submit_and_wait<S: ResultSink>(
    cfg: &ChurnwatchConfig,
    sink: S,
    request: PredictionRequest,
    animate: bool,
) -> Result<PredictionController<S>> {
    let service = Arc::new(HttpPredictionClient::from_config(&cfg.endpoint));
    let logging = cfg.logging.clone();

    let mut controller = PredictionController::new(service, sink)
        .with_ordering(cfg.controller.ordering)
        .on_completion(move |completion| logger::log_completion(&logging, completion));
    if animate {
        controller = controller.with_animation(cfg.animation.probability());
    }

    controller.submit(request)?;
    controller.wait_idle();
    Ok(controller)
}

// ---------------------------------------------------------------------------
// churnwatch dashboard
// ---------------------------------------------------------------------------

/// Print the charts, then count the headline stats up.
pub fn run_dashboard(animate: bool) -> Result<()> {
    let cfg = config::load();
    let metrics = DashboardMetrics::sample();
    let mut out = std::io::stdout();

    dashboard::render_charts(&metrics, &mut out).context("failed writing charts")?;
    writeln!(out)?;

    let animate = animate && cfg.animation.enabled && out.is_terminal();
    let settings = cfg.animation.stats();
    let clock = MonotonicClock::new();

    let counters = metrics.headline_counters();
    let mut trigger = VisibilityTrigger::new();
    for (label, _) in &counters {
        trigger.observe(label.clone());
    }

    println!("{}", "Headline".bold().cyan());
    // Every counter comes into view once the charts have printed.
    for (label, counter) in &counters {
        if !trigger.notify_visible(label) {
            continue;
        }
        if animate {
            counter.run(settings.duration, &clock as &dyn Clock, settings.frame_interval, |frame| {
                let _ = write!(out, "\r  {:<22} {}", label.bold(), frame);
                let _ = out.flush();
            });
            writeln!(out)?;
        } else {
            let text = counter.text_at(settings.duration, settings.duration);
            writeln!(out, "  {:<22} {}", label.bold(), text)?;
        }
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// churnwatch serve
// ---------------------------------------------------------------------------

pub fn run_serve(addr: Option<String>) -> Result<()> {
    let cfg = config::load();
    let addr = addr.unwrap_or_else(|| cfg.web.addr.clone());
    web::serve(&addr, web::ServerContext::from_config(cfg))
}

// ---------------------------------------------------------------------------
// churnwatch history
// ---------------------------------------------------------------------------

/// Summarize logged predictions.
pub fn run_history(format: OutputFormat, days: Option<u32>) -> Result<()> {
    let cfg = config::load();
    let path = logger::prediction_log_path(&cfg.logging).context("could not resolve log path")?;
    let summary = reporter::compute_summary(&path, days);

    if summary.total == 0 {
        println!(
            "{}",
            "No predictions logged yet. Run `churnwatch predict` to record some.".yellow()
        );
        return Ok(());
    }

    match format {
        OutputFormat::Json => print_history_json(&summary)?,
        OutputFormat::Csv => print_history_csv(&summary),
        OutputFormat::Table => print_history_table(&summary),
    }

    Ok(())
}

fn print_history_table(s: &HistorySummary) {
    println!("{}", "churnwatch Prediction History".bold().cyan());
    println!("{}", "=".repeat(50));
    println!();
    println!("  {} {}", "Predictions:    ".bold(), s.total);
    println!("  {} {:.1}%", "Avg probability:".bold(), s.avg_probability);
    println!("  {} {:.0} ms", "Avg latency:    ".bold(), s.avg_latency_ms);
    if s.superseded > 0 {
        println!("  {} {}", "Superseded:     ".bold(), s.superseded);
    }
    println!();

    println!("{}", "Outcomes".bold().cyan());
    println!(
        "  Success: {}  Application error: {}  Transport error: {}  Malformed: {}",
        s.outcomes.success,
        s.outcomes.application_error,
        s.outcomes.transport_error,
        s.outcomes.malformed_response,
    );
    println!();

    let t = &s.tiers;
    println!("{}", "Risk Tiers".bold().cyan());
    println!(
        "  {}: {} ({:.0}%)  {}: {} ({:.0}%)  {}: {} ({:.0}%)",
        "Low".green(),
        t.low,
        t.pct(t.low),
        "Medium".yellow(),
        t.medium,
        t.pct(t.medium),
        "High".red(),
        t.high,
        t.pct(t.high),
    );
}

fn print_history_json(s: &HistorySummary) -> Result<()> {
    let value = serde_json::json!({
        "total": s.total,
        "avg_probability": s.avg_probability,
        "avg_latency_ms": s.avg_latency_ms,
        "superseded": s.superseded,
        "outcomes": {
            "success": s.outcomes.success,
            "application_error": s.outcomes.application_error,
            "transport_error": s.outcomes.transport_error,
            "malformed_response": s.outcomes.malformed_response,
        },
        "tiers": {
            "low": s.tiers.low,
            "medium": s.tiers.medium,
            "high": s.tiers.high,
        },
    });

    println!("{}", serde_json::to_string_pretty(&value)?);
    Ok(())
}

fn print_history_csv(s: &HistorySummary) {
    println!("metric,value");
    println!("total,{}", s.total);
    println!("avg_probability,{:.2}", s.avg_probability);
    println!("avg_latency_ms,{:.0}", s.avg_latency_ms);
    println!("success,{}", s.outcomes.success);
    println!("application_error,{}", s.outcomes.application_error);
    println!("transport_error,{}", s.outcomes.transport_error);
    println!("malformed_response,{}", s.outcomes.malformed_response);
    println!("tier_low,{}", s.tiers.low);
    println!("tier_medium,{}", s.tiers.medium);
    println!("tier_high,{}", s.tiers.high);
}

// ---------------------------------------------------------------------------
// churnwatch health
// ---------------------------------------------------------------------------

pub fn run_health() -> Result<()> {
    println!("{}", "churnwatch Health Check".bold().cyan());
    println!("{}", "=".repeat(40));

    let global_exists = config::global_config_file()
        .map(|p| p.exists())
        .unwrap_or(false);
    let project_exists = config::project_config_file()
        .map(|p| p.exists())
        .unwrap_or(false);
    let cfg = config::load();

    print_health_item(
        "Global config",
        global_exists,
        if global_exists {
            "~/.churnwatch/config.toml found"
        } else {
            "not found (run `churnwatch config init` to create)"
        },
    );
    print_health_item(
        "Project config",
        project_exists,
        if project_exists {
            ".churnwatch.toml found"
        } else {
            "none (optional)"
        },
    );

    let client = HttpPredictionClient::from_config(&cfg.endpoint);
    print_health_item("Prediction endpoint", true, client.url());
    print_health_item(
        "Request timeout",
        true,
        &cfg.endpoint
            .timeout_ms
            .map(|ms| format!("{ms} ms"))
            .unwrap_or_else(|| "none".to_string()),
    );
    print_health_item("Ordering", true, &cfg.controller.ordering.to_string());

    let log_path = logger::prediction_log_path(&cfg.logging);
    let log_exists = log_path.as_ref().map(|p| p.exists()).unwrap_or(false);
    let detail = match (&log_path, log_exists, cfg.logging.enabled) {
        (_, _, false) => "disabled".to_string(),
        (Some(path), true, _) => format!(
            "{} entries in {}",
            logger::read_all_entries(path).len(),
            path.display()
        ),
        _ => "no log file yet".to_string(),
    };
    print_health_item("Prediction log", log_exists || !cfg.logging.enabled, &detail);

    Ok(())
}

fn print_health_item(name: &str, ok: bool, detail: &str) {
    let status = if ok {
        "✓".green().bold()
    } else {
        "✗".red().bold()
    };
    println!("  {} {:<22} {}", status, name, detail.dimmed());
}

// ---------------------------------------------------------------------------
// churnwatch config show | init
// ---------------------------------------------------------------------------

pub fn run_config_show() -> Result<()> {
    let toml_str = config::show_effective_config()?;
    println!("{}", "Effective churnwatch Configuration".bold().cyan());
    println!("{}", "=".repeat(50));
    println!();
    println!("{toml_str}");
    Ok(())
}

pub fn run_config_init(force: bool) -> Result<()> {
    let path = config::init_config(force)?;
    println!("{} {}", "Wrote".green().bold(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fields_from_pairs() {
        let request = build_request(
            None,
            &["tenure=3".to_string(), "contract=Month-to-month".to_string()],
        )
        .unwrap();
        assert_eq!(request.get("tenure"), Some("3"));
        assert_eq!(request.get("contract"), Some("Month-to-month"));
    }

    #[test]
    fn value_may_contain_equals() {
        let request = build_request(None, &["note=a=b".to_string()]).unwrap();
        assert_eq!(request.get("note"), Some("a=b"));
    }

    #[test]
    fn invalid_pairs_are_rejected() {
        assert!(build_request(None, &["tenure".to_string()]).is_err());
        assert!(build_request(None, &["=3".to_string()]).is_err());
        assert!(build_request(None, &[]).is_err());
    }

    #[test]
    fn pairs_override_input_file() {
        let path = std::env::temp_dir().join(format!("churnwatch-input-{}.json", std::process::id()));
        std::fs::write(&path, r#"{"tenure": 24, "contract": "Two year"}"#).unwrap();

        let request = build_request(Some(&path), &["tenure=2".to_string()]).unwrap();
        assert_eq!(request.get("tenure"), Some("2"));
        assert_eq!(request.get("contract"), Some("Two year"));

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn failed_prediction_reports_false() {
        let port = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        let mut cfg = ChurnwatchConfig::default();
        cfg.endpoint.base_url = format!("http://127.0.0.1:{port}");
        cfg.endpoint.timeout_ms = Some(2000);
        cfg.logging.enabled = false;

        let request = PredictionRequest::new().with_field("tenure", "3");
        let ok = predict_with_config(&cfg, request, PredictFormat::Html, false).unwrap();
        assert!(!ok);
    }

    #[test]
    fn formats_parse() {
        assert_eq!(PredictFormat::from_str_opt(Some("html")), PredictFormat::Html);
        assert_eq!(PredictFormat::from_str_opt(None), PredictFormat::Terminal);
        assert_eq!(OutputFormat::from_str_opt(Some("csv")), OutputFormat::Csv);
    }
}
