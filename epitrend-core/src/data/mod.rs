//! Data loading: providers, CSV ingest, and the in-memory dataset.

pub mod dataset;
pub mod ingest;
pub mod provider;
pub mod schema;

pub use dataset::{Dataset, DatasetOverview};
pub use ingest::{ingest_csv, LoadedDataset, Loader};
pub use provider::{
    provider_for, DataError, DataProvider, DataSource, FileProvider, HttpProvider, LoadProgress,
    RawPayload, SourceLocator, StdoutProgress,
};
pub use schema::ObservationSchema;
