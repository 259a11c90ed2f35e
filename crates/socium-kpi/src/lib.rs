//! MongoDB → Datadog KPI reporting for the Socium HR platform.
//!
//! A run extracts grouped business counters from the operational store and
//! submits each one as a tagged gauge. The [`fixtures`] module seeds a store
//! with synthetic records for development.

pub mod config;
pub mod error;
pub mod fixtures;
pub mod kpi;
pub mod pipeline;
pub mod sink;
pub mod store;
pub mod telemetry;

pub use kpi::KpiDomain;
pub use pipeline::{KpiPipeline, RunSummary, StageSummary};
pub use sink::{MetricSink, SendOutcome, Tally};
