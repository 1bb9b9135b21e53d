//! Observability Module
//!
//! In-memory update metrics

pub mod metrics;

pub use metrics::{UpdateMetrics, UpdateRecord, HISTORY_LIMIT};
