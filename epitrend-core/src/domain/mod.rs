//! Domain types for the epidemiological pipeline.

pub mod observation;
pub mod series;
pub mod snapshot;

pub use observation::{FillColumn, Observation};
pub use series::{CleanedSeries, EntitySeries};
pub use snapshot::{LatestSnapshot, SnapshotRow};
