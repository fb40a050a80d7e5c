//! Prediction log: JSONL append ([`logger`]) and aggregation ([`reporter`]).

pub mod logger;
pub mod reporter;
