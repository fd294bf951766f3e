//! Data provider trait and structured error types.
//!
//! The DataProvider trait abstracts over where the raw CSV comes from
//! (HTTP endpoint, local file) so the loader can be exercised in tests
//! without network access.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Structured error types for data loading.
///
/// Every variant is fatal for the pipeline; there is no retry.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("network unreachable: {0}")]
    NetworkUnreachable(String),

    #[error("HTTP {status} from {url}")]
    HttpStatus { status: u16, url: String },

    #[error("cannot read {path}: {reason}")]
    Io { path: PathBuf, reason: String },

    #[error("malformed content: {0}")]
    MalformedContent(String),

    #[error("source returned no data: {0}")]
    Empty(String),

    #[error("provider '{provider}' cannot fetch {locator}")]
    UnsupportedLocator { provider: String, locator: String },
}

/// Where a dataset lives: a remote URL or a local path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SourceLocator {
    Url(String),
    Path(PathBuf),
}

impl SourceLocator {
    /// `http://` and `https://` locators are URLs; anything else is a path.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
            SourceLocator::Url(trimmed.to_string())
        } else {
            SourceLocator::Path(PathBuf::from(trimmed))
        }
    }
}

impl std::fmt::Display for SourceLocator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceLocator::Url(url) => f.write_str(url),
            SourceLocator::Path(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Where the bytes actually came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DataSource {
    Remote,
    LocalFile,
}

/// Raw, unparsed bytes returned by a provider.
#[derive(Debug, Clone)]
pub struct RawPayload {
    pub bytes: Vec<u8>,
    pub source: DataSource,
}

/// Trait for data providers (HTTP, local file).
pub trait DataProvider: Send + Sync {
    /// Human-readable name of this provider.
    fn name(&self) -> &str;

    /// Fetch the raw CSV bytes for a locator.
    fn fetch(&self, locator: &SourceLocator) -> Result<RawPayload, DataError>;
}

/// Blocking HTTP provider.
pub struct HttpProvider {
    client: reqwest::blocking::Client,
}

impl HttpProvider {
    pub fn new(timeout: Duration) -> Result<Self, DataError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("epitrend/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| DataError::NetworkUnreachable(format!("build HTTP client: {e}")))?;
        Ok(Self { client })
    }
}

impl DataProvider for HttpProvider {
    fn name(&self) -> &str {
        "http"
    }

    fn fetch(&self, locator: &SourceLocator) -> Result<RawPayload, DataError> {
        let url = match locator {
            SourceLocator::Url(url) => url,
            SourceLocator::Path(_) => {
                return Err(DataError::UnsupportedLocator {
                    provider: self.name().to_string(),
                    locator: locator.to_string(),
                })
            }
        };

        tracing::debug!(%url, "requesting dataset");
        let resp = self
            .client
            .get(url)
            .send()
            .map_err(|e| DataError::NetworkUnreachable(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(DataError::HttpStatus {
                status: status.as_u16(),
                url: url.clone(),
            });
        }

        let bytes = resp
            .bytes()
            .map_err(|e| DataError::NetworkUnreachable(format!("read body: {e}")))?;

        Ok(RawPayload {
            bytes: bytes.to_vec(),
            source: DataSource::Remote,
        })
    }
}

/// Provider reading from the local filesystem.
#[derive(Debug, Default)]
pub struct FileProvider;

impl DataProvider for FileProvider {
    fn name(&self) -> &str {
        "file"
    }

    fn fetch(&self, locator: &SourceLocator) -> Result<RawPayload, DataError> {
        let path: &Path = match locator {
            SourceLocator::Path(path) => path,
            SourceLocator::Url(_) => {
                return Err(DataError::UnsupportedLocator {
                    provider: self.name().to_string(),
                    locator: locator.to_string(),
                })
            }
        };

        let bytes = std::fs::read(path).map_err(|e| DataError::Io {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        Ok(RawPayload {
            bytes,
            source: DataSource::LocalFile,
        })
    }
}

/// Pick the provider that can serve a locator.
pub fn provider_for(
    locator: &SourceLocator,
    timeout: Duration,
) -> Result<Box<dyn DataProvider>, DataError> {
    match locator {
        SourceLocator::Url(_) => Ok(Box::new(HttpProvider::new(timeout)?)),
        SourceLocator::Path(_) => Ok(Box::new(FileProvider)),
    }
}

/// Progress callback for the load stage.
pub trait LoadProgress: Send {
    /// Called before the provider is asked for data.
    fn on_start(&self, locator: &SourceLocator);

    /// Called when the dataset has been parsed.
    fn on_loaded(&self, rows: usize, columns: usize);

    /// Called when loading fails. The pipeline stops after this.
    fn on_failed(&self, error: &DataError);
}

/// Progress reporter printing status to stdout and failures to stderr.
pub struct StdoutProgress;

impl LoadProgress for StdoutProgress {
    fn on_start(&self, locator: &SourceLocator) {
        println!("Loading dataset from {locator}...");
    }

    fn on_loaded(&self, rows: usize, columns: usize) {
        println!("Dataset loaded successfully ({rows} rows, {columns} columns)");
    }

    fn on_failed(&self, error: &DataError) {
        eprintln!("Data loading failed: {error}");
    }
}
