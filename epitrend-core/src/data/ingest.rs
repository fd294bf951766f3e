//! CSV ingest and the load stage.
//!
//! Fetch → hash → parse. A failure anywhere is a `DataError` and the
//! caller is expected to stop the pipeline.

use super::dataset::Dataset;
use super::provider::{DataError, DataProvider, DataSource, LoadProgress, SourceLocator};
use polars::prelude::*;
use std::io::Cursor;

/// Parse CSV bytes into a dataset.
///
/// Schema inference scans the whole payload: sparse numeric columns in the
/// source often hold integers for thousands of rows before the first
/// fractional value.
pub fn ingest_csv(bytes: &[u8]) -> Result<Dataset, DataError> {
    if bytes.iter().all(|b| b.is_ascii_whitespace()) {
        return Err(DataError::Empty("payload is empty".into()));
    }

    let frame = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(None)
        .into_reader_with_file_handle(Cursor::new(bytes.to_vec()))
        .finish()
        .map_err(|e| DataError::MalformedContent(e.to_string()))?;

    Ok(Dataset::new(frame))
}

/// A parsed dataset plus provenance for the run manifest.
#[derive(Debug, Clone)]
pub struct LoadedDataset {
    pub dataset: Dataset,
    pub locator: SourceLocator,
    pub source: DataSource,
    /// BLAKE3 hex digest of the raw payload.
    pub content_hash: String,
    pub byte_len: usize,
}

/// The load stage: one provider, one fetch, no retry.
pub struct Loader<'a> {
    provider: &'a dyn DataProvider,
    progress: Option<&'a dyn LoadProgress>,
}

impl<'a> Loader<'a> {
    pub fn new(provider: &'a dyn DataProvider) -> Self {
        Self {
            provider,
            progress: None,
        }
    }

    pub fn with_progress(mut self, progress: &'a dyn LoadProgress) -> Self {
        self.progress = Some(progress);
        self
    }

    pub fn load(&self, locator: &SourceLocator) -> Result<LoadedDataset, DataError> {
        if let Some(p) = self.progress {
            p.on_start(locator);
        }

        let result = self.load_inner(locator);

        match (&result, self.progress) {
            (Ok(loaded), Some(p)) => p.on_loaded(loaded.dataset.height(), loaded.dataset.width()),
            (Err(e), Some(p)) => p.on_failed(e),
            _ => {}
        }
        if let Err(e) = &result {
            tracing::debug!(provider = self.provider.name(), %locator, error = %e, "load failed");
        }

        result
    }

    fn load_inner(&self, locator: &SourceLocator) -> Result<LoadedDataset, DataError> {
        let payload = self.provider.fetch(locator)?;
        let content_hash = blake3::hash(&payload.bytes).to_hex().to_string();
        let byte_len = payload.bytes.len();
        tracing::debug!(byte_len, %content_hash, "payload received");

        let dataset = ingest_csv(&payload.bytes)?;
        tracing::info!(
            rows = dataset.height(),
            columns = dataset.width(),
            "dataset parsed"
        );

        Ok(LoadedDataset {
            dataset,
            locator: locator.clone(),
            source: payload.source,
            content_hash,
            byte_len,
        })
    }
}
