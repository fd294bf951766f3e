//! Presentation sinks and artifact export.

pub mod artifacts;
pub mod console;
pub mod markdown;

pub use artifacts::{save_artifacts, ArtifactPaths, ArtifactSink, RunManifest};
pub use console::ConsoleSink;
pub use markdown::MarkdownReport;
