//! Observability subsystem.
//!
//! Structured logs via `tracing`, request counters and latency histograms
//! via the `metrics` facade with a Prometheus exporter. Request IDs flow
//! through both.

pub mod logging;
pub mod metrics;
