//! Handlers for the dashboard's data and prediction routes.

use anyhow::{Context, Result};

use super::{Reply, ServerContext};
use crate::analytics::logger;
use crate::predict::controller::PredictionController;
use crate::predict::model::PredictionRequest;
use crate::render::html::{self, HtmlSink};

/// `GET /api/metrics` — chart data.
pub fn get_metrics(context: &ServerContext) -> Result<Reply> {
    let body = serde_json::to_string(&context.metrics).context("failed to serialize metrics")?;
    Ok(Reply::json(200, body))
}

/// `POST /predict` — one controller submission rendered to an HTML fragment.
///
/// The body is a JSON object of form fields. Application and transport
/// failures still answer 200: the error card is the rendered result.
pub fn post_predict(body: &str, context: &ServerContext) -> Result<Reply> {
    let Some(request) = PredictionRequest::from_json_fields(body) else {
        return Ok(Reply::html(
            400,
            html::error_fragment("Request body must be a JSON object of form fields."),
        ));
    };

    let logging = context.config.logging.clone();
    let mut controller = PredictionController::new(context.service.clone(), HtmlSink::new())
        .with_ordering(context.config.controller.ordering)
        .on_completion(move |completion| logger::log_completion(&logging, completion));

    if let Err(e) = controller.submit(request) {
        return Ok(Reply::html(400, html::error_fragment(&e.to_string())));
    }
    controller.wait_idle();

    Ok(Reply::html(200, controller.into_sink().into_content()))
}
