//! EpiTrend Core: observations, loading, selection, cleaning, snapshot metrics.
//!
//! This crate contains the linear pipeline that turns a raw epidemiological
//! CSV into presentation-ready tables:
//! - Domain types (observations, cleaned series, latest snapshot)
//! - Loader with pluggable data providers (HTTP, local file)
//! - Selector: entity allow-list and column projection
//! - Cleaner: per-entity date sort and forward-fill
//! - Metrics: global-latest snapshot with death and vaccination rates
//! - Shaped tables for an external presentation sink

pub mod config;
pub mod data;
pub mod domain;
pub mod error;
pub mod pipeline;
pub mod present;

#[cfg(test)]
mod test_support;

pub use config::{ConfigError, PipelineConfig};
pub use error::PipelineError;
