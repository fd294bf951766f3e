//! EpiTrend Runner: pipeline orchestration and presentation sinks.
//!
//! This crate builds on `epitrend-core` to provide:
//! - A single entry point that runs load → select → clean → metrics
//! - Exploration and cleaning summaries for the console
//! - A console sink printing the shaped tables
//! - An artifact sink writing CSV/JSON/Parquet files, a manifest, and a
//!   Markdown report

pub mod reporting;
pub mod runner;
pub mod summary;

pub use reporting::{
    save_artifacts, ArtifactPaths, ArtifactSink, ConsoleSink, MarkdownReport, RunManifest,
};
pub use runner::{run_from_config, run_pipeline, PipelineRun};
pub use summary::CleaningSummary;
