//! Pipeline orchestration.
//!
//! Runs the four stages strictly in order. Each stage consumes its input
//! fully before the next begins, and the first error ends the run with no
//! partial output.

use crate::summary::CleaningSummary;
use epitrend_core::data::{
    provider_for, DataProvider, DataSource, DatasetOverview, LoadProgress, Loader, SourceLocator,
};
use epitrend_core::domain::{CleanedSeries, LatestSnapshot};
use epitrend_core::pipeline::{Cleaner, Metrics, Selector};
use epitrend_core::present::ChartBundle;
use epitrend_core::{PipelineConfig, PipelineError};

/// Number of columns listed in the missing-value overview.
const OVERVIEW_TOP_MISSING: usize = 10;

/// Everything a completed run produced.
#[derive(Debug, Clone)]
pub struct PipelineRun {
    pub config: PipelineConfig,
    pub locator: SourceLocator,
    pub source: DataSource,
    pub content_hash: String,
    pub byte_len: usize,
    pub overview: DatasetOverview,
    pub selected_rows: usize,
    pub series: CleanedSeries,
    pub cleaning: CleaningSummary,
    pub snapshot: LatestSnapshot,
    pub charts: ChartBundle,
}

/// Run the pipeline against an explicit provider.
pub fn run_pipeline(
    config: &PipelineConfig,
    provider: &dyn DataProvider,
    progress: Option<&dyn LoadProgress>,
) -> Result<PipelineRun, PipelineError> {
    let locator = config.locator();

    let mut loader = Loader::new(provider);
    if let Some(p) = progress {
        loader = loader.with_progress(p);
    }
    let loaded = loader.load(&locator)?;
    let overview = loaded.dataset.overview(OVERVIEW_TOP_MISSING);

    let selected = Selector::select(&loaded.dataset, &config.selection())?;
    // the raw table is not needed past selection
    let selected_rows = selected.height();
    drop(loaded.dataset);

    let series = Cleaner::clean(&selected, &config.schema())?;
    let cleaning = CleaningSummary::from_series(&series);

    let snapshot = Metrics::latest_snapshot(&series);
    let charts = ChartBundle::build(&series, &snapshot);

    tracing::info!(
        selected_rows,
        cleaned_rows = series.len(),
        snapshot_rows = snapshot.rows.len(),
        "pipeline complete"
    );

    Ok(PipelineRun {
        config: config.clone(),
        locator,
        source: loaded.source,
        content_hash: loaded.content_hash,
        byte_len: loaded.byte_len,
        overview,
        selected_rows,
        series,
        cleaning,
        snapshot,
        charts,
    })
}

/// Run the pipeline with the provider matching the configured source.
pub fn run_from_config(
    config: &PipelineConfig,
    progress: Option<&dyn LoadProgress>,
) -> Result<PipelineRun, PipelineError> {
    let provider = provider_for(&config.locator(), config.timeout())?;
    run_pipeline(config, provider.as_ref(), progress)
}

#[cfg(test)]
mod tests {
    use super::*;
    use epitrend_core::data::{DataError, RawPayload};

    struct Fixture(&'static str);

    impl DataProvider for Fixture {
        fn name(&self) -> &str {
            "fixture"
        }

        fn fetch(&self, _locator: &SourceLocator) -> Result<RawPayload, DataError> {
            Ok(RawPayload {
                bytes: self.0.as_bytes().to_vec(),
                source: DataSource::LocalFile,
            })
        }
    }

    const CSV: &str = "\
date,location,iso_code,total_cases,new_cases,total_deaths,new_deaths,people_vaccinated,population
2022-01-01,Kenya,KEN,10,10,1,1,,1000
2022-01-02,Kenya,KEN,,,,,,1000
2022-01-02,Chile,CHL,7,7,0,0,,50
";

    fn config() -> PipelineConfig {
        PipelineConfig {
            source: "fixture.csv".into(),
            entities: vec!["Kenya".into()],
            ..PipelineConfig::default()
        }
    }

    #[test]
    fn run_produces_snapshot_and_charts() {
        let run = run_pipeline(&config(), &Fixture(CSV), None).unwrap();
        assert_eq!(run.overview.rows, 3);
        assert_eq!(run.selected_rows, 2);
        assert_eq!(run.series.len(), 2);
        assert_eq!(run.snapshot.rows.len(), 1);
        assert_eq!(run.charts.metrics.rows[0].death_rate, Some(10.0));
        assert_eq!(run.charts.total_cases.points.len(), 2);
    }

    #[test]
    fn schema_mismatch_stops_the_run() {
        let csv = "date,location\n2022-01-01,Kenya\n";
        let err = run_pipeline(&config(), &Fixture(csv), None).unwrap_err();
        assert!(matches!(err, PipelineError::SchemaMismatch { .. }));
    }
}
