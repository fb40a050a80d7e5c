//! Embedded web dashboard for churnwatch.
//!
//! A lightweight HTTP server (sync, via `tiny_http`) that serves:
//! - the single-page dashboard with the prediction form
//! - `GET /api/metrics` — chart data as JSON
//! - `POST /predict` — runs one prediction and returns the rendered
//!   HTML fragment (result card or error card)
//!
//! Launched via `churnwatch serve` (default: `http://127.0.0.1:9747`).

mod api;
mod frontend;

use std::io::Read;
use std::sync::Arc;
use std::thread;

use anyhow::Result;
use tiny_http::{Header, Method, Request, Response, Server, StatusCode};

use crate::config::ChurnwatchConfig;
use crate::dashboard::DashboardMetrics;
use crate::predict::client::{HttpPredictionClient, PredictionService};

/// Shared state for request handlers.
pub struct ServerContext {
    pub service: Arc<dyn PredictionService>,
    pub metrics: DashboardMetrics,
    pub config: ChurnwatchConfig,
}

impl ServerContext {
    /// Context backed by the configured HTTP prediction service.
    pub fn from_config(config: ChurnwatchConfig) -> Self {
        Self {
            service: Arc::new(HttpPredictionClient::from_config(&config.endpoint)),
            metrics: DashboardMetrics::sample(),
            config,
        }
    }
}

/// A handler's response before it is turned into a `tiny_http` response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub status: u16,
    pub content_type: &'static str,
    pub body: String,
}

impl Reply {
    pub fn json(status: u16, body: String) -> Self {
        Self {
            status,
            content_type: "application/json; charset=utf-8",
            body,
        }
    }

    pub fn html(status: u16, body: String) -> Self {
        Self {
            status,
            content_type: "text/html; charset=utf-8",
            body,
        }
    }

    fn into_response(self) -> Response<std::io::Cursor<Vec<u8>>> {
        let mut resp =
            Response::from_data(self.body.into_bytes()).with_status_code(StatusCode(self.status));
        if let Ok(header) = Header::from_bytes("Content-Type", self.content_type) {
            resp = resp.with_header(header);
        }
        resp
    }
}

// ---------------------------------------------------------------------------
// Server entry point
// ---------------------------------------------------------------------------

/// Start the dashboard server on `addr`.
///
/// Blocks the current thread. See [`serve_on`] for request handling.
pub fn serve(addr: &str, context: ServerContext) -> Result<()> {
    let server = Server::http(addr)
        .map_err(|e| anyhow::anyhow!("failed to start HTTP server on {addr}: {e}"))?;

    println!("churnwatch dashboard running at http://{addr}");
    println!(
        "Predictions are forwarded to {}{}",
        context.config.endpoint.base_url, context.config.endpoint.predict_path
    );
    println!("Press Ctrl+C to stop.\n");

    serve_on(server, context)
}

/// Accept requests on an already-bound server until it shuts down.
///
/// Each request is handled on its own thread, so a `/predict` waiting on a
/// slow upstream never holds up other routes or other predictions. Handler
/// errors become JSON 500 responses.
pub fn serve_on(server: Server, context: ServerContext) -> Result<()> {
    let context = Arc::new(context);

    for request in server.incoming_requests() {
        let context = Arc::clone(&context);
        thread::spawn(move || handle(request, &context));
    }

    Ok(())
}

fn handle(mut request: Request, context: &ServerContext) {
    let method = request.method().clone();
    let url = request.url().to_string();

    let body = if matches!(method, Method::Post | Method::Put) {
        let mut buf = String::new();
        let _ = request.as_reader().read_to_string(&mut buf);
        Some(buf)
    } else {
        None
    };

    let reply = dispatch(&method, &url, body.as_deref(), context).unwrap_or_else(|e| {
        Reply::json(500, serde_json::json!({ "error": e.to_string() }).to_string())
    });
    let status = reply.status;
    let _ = request.respond(reply.into_response());

    println!(
        "{} {} {} {}",
        method,
        url,
        status,
        chrono::Local::now().format("%H:%M:%S")
    );
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

/// Route a request to its handler.
pub fn dispatch(
    method: &Method,
    url: &str,
    body: Option<&str>,
    context: &ServerContext,
) -> Result<Reply> {
    let path = url.split('?').next().unwrap_or(url);

    match (method, path) {
        (&Method::Get, "/") | (&Method::Get, "/index.html") => {
            Ok(Reply::html(200, frontend::INDEX_HTML.to_string()))
        }
        (&Method::Get, "/api/metrics") => api::get_metrics(context),
        (&Method::Post, "/predict") => api::post_predict(body.unwrap_or("{}"), context),
        _ => Ok(Reply::json(404, r#"{"error": "not found"}"#.to_string())),
    }
}
