//! churnwatch — client-side controller for a churn-prediction service.
//!
//! The core is [`predict::PredictionController`]: it takes form fields,
//! calls the prediction endpoint, and renders exactly one of loading, result
//! or error through an injected [`render::ResultSink`]. Around it sit the
//! dashboard charts, counter animations, the prediction log, and a small
//! local web server.

pub mod analytics;
pub mod animation;
pub mod cli;
pub mod config;
pub mod dashboard;
pub mod predict;
pub mod render;
pub mod web;
