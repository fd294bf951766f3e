//! The three in-memory stages: select → clean → metrics.

pub mod clean;
pub mod metrics;
pub mod select;

pub use clean::{forward_fill, Cleaner};
pub use metrics::{ratio_pct, Metrics, RatePoint};
pub use select::{SelectionConfig, Selector};
