//! Artifact sink and run export (CSV, JSON, Parquet, Markdown).

use super::markdown::MarkdownReport;
use crate::runner::PipelineRun;
use anyhow::{Context, Result};
use chrono::NaiveDate;
use epitrend_core::data::DataSource;
use epitrend_core::domain::{CleanedSeries, Observation};
use epitrend_core::present::{Choropleth, LineChart, MetricsTable, PresentationSink};
use polars::prelude::{Column, DataFrame, ParquetWriter};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::path::{Path, PathBuf};

/// Artifact paths returned after export.
#[derive(Debug, Clone)]
pub struct ArtifactPaths {
    pub dir: PathBuf,
    /// One file per delivered table, in delivery order.
    pub tables: Vec<PathBuf>,
    pub cleaned_parquet: PathBuf,
    pub manifest: PathBuf,
    pub report_markdown: PathBuf,
}

/// Presentation sink that writes each table to a file under `dir`.
#[derive(Debug, Clone)]
pub struct ArtifactSink {
    dir: PathBuf,
    written: Vec<PathBuf>,
}

impl ArtifactSink {
    pub fn new(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create artifact directory {}", dir.display()))?;
        Ok(Self {
            dir,
            written: Vec::new(),
        })
    }

    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }

    fn write_csv<T: Serialize>(&mut self, file_name: &str, rows: &[T]) -> Result<()> {
        let path = self.dir.join(file_name);
        let mut writer = csv::Writer::from_path(&path)
            .with_context(|| format!("Failed to create {}", path.display()))?;
        for row in rows {
            writer
                .serialize(row)
                .with_context(|| format!("Failed to write row to {}", path.display()))?;
        }
        writer.flush()?;
        self.written.push(path);
        Ok(())
    }

    fn write_json<T: Serialize + ?Sized>(&mut self, file_name: &str, value: &T) -> Result<()> {
        let path = self.dir.join(file_name);
        let json = serde_json::to_string_pretty(value).context("Failed to serialize JSON")?;
        std::fs::write(&path, json)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        self.written.push(path);
        Ok(())
    }
}

impl PresentationSink for ArtifactSink {
    type Error = anyhow::Error;

    fn line_chart(&mut self, chart: &LineChart) -> Result<()> {
        self.write_csv(&format!("{}.csv", chart.metric), &chart.points)
    }

    fn choropleth(&mut self, map: &Choropleth) -> Result<()> {
        self.write_csv("choropleth.csv", &map.cells)
    }

    fn metrics_table(&mut self, table: &MetricsTable) -> Result<()> {
        self.write_csv("metrics.csv", &table.rows)?;
        self.write_json("metrics.json", table)
    }
}

/// Provenance and row counts for one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunManifest {
    pub source: String,
    pub data_source: DataSource,
    /// BLAKE3 of the raw payload.
    pub content_hash: String,
    pub byte_len: usize,
    pub raw_rows: usize,
    pub raw_columns: usize,
    pub selected_rows: usize,
    pub cleaned_rows: usize,
    pub entities: Vec<String>,
    pub latest_date: Option<NaiveDate>,
    pub snapshot_entities: Vec<String>,
    pub remaining_missing: usize,
    pub generated_at: chrono::NaiveDateTime,
}

impl RunManifest {
    pub fn from_run(run: &PipelineRun) -> Self {
        Self {
            source: run.locator.to_string(),
            data_source: run.source,
            content_hash: run.content_hash.clone(),
            byte_len: run.byte_len,
            raw_rows: run.overview.rows,
            raw_columns: run.overview.columns,
            selected_rows: run.selected_rows,
            cleaned_rows: run.series.len(),
            entities: run.config.entities.clone(),
            latest_date: run.snapshot.date,
            snapshot_entities: run
                .snapshot
                .rows
                .iter()
                .map(|r| r.observation.entity_id.clone())
                .collect(),
            remaining_missing: run.cleaning.remaining_total(),
            generated_at: chrono::Utc::now().naive_utc(),
        }
    }
}

/// Write every table, the cleaned series, a manifest, and a report.
pub fn save_artifacts(run: &PipelineRun, output_dir: impl AsRef<Path>) -> Result<ArtifactPaths> {
    let mut sink = ArtifactSink::new(output_dir)?;
    run.charts.present(&mut sink)?;
    let tables = sink.written().to_vec();

    let dir = sink.dir.clone();
    let cleaned_parquet = dir.join("cleaned.parquet");
    write_series_parquet(&cleaned_parquet, &run.series)?;

    let manifest = dir.join("manifest.json");
    sink.write_json("manifest.json", &RunManifest::from_run(run))?;

    let report_markdown = dir.join("report.md");
    std::fs::write(&report_markdown, MarkdownReport.generate(run))
        .with_context(|| format!("Failed to write {}", report_markdown.display()))?;

    tracing::info!(dir = %dir.display(), "artifacts saved");

    Ok(ArtifactPaths {
        dir,
        tables,
        cleaned_parquet,
        manifest,
        report_markdown,
    })
}

pub fn write_series_parquet(path: &Path, series: &CleanedSeries) -> Result<()> {
    let rows: Vec<&Observation> = series.rows().collect();
    let dates: Vec<String> = rows.iter().map(|o| o.date.to_string()).collect();
    let entities: Vec<String> = rows.iter().map(|o| o.entity_id.clone()).collect();
    let iso_codes: Vec<Option<String>> = rows.iter().map(|o| o.iso_code.clone()).collect();

    let mut df = DataFrame::new(vec![
        Column::new("date".into(), dates),
        Column::new("location".into(), entities),
        Column::new("iso_code".into(), iso_codes),
        numeric_column("total_cases", &rows, |o| o.total_cases),
        numeric_column("new_cases", &rows, |o| o.new_cases),
        numeric_column("total_deaths", &rows, |o| o.total_deaths),
        numeric_column("new_deaths", &rows, |o| o.new_deaths),
        numeric_column("people_vaccinated", &rows, |o| o.people_vaccinated),
        numeric_column("population", &rows, |o| o.population),
    ])
    .context("Failed to build cleaned series dataframe")?;

    let mut file = File::create(path)
        .with_context(|| format!("Failed to create cleaned parquet {}", path.display()))?;
    ParquetWriter::new(&mut file)
        .finish(&mut df)
        .context("Failed to write cleaned parquet")?;
    Ok(())
}

fn numeric_column(
    name: &str,
    rows: &[&Observation],
    field: fn(&Observation) -> Option<f64>,
) -> Column {
    let values: Vec<Option<f64>> = rows.iter().map(|&o| field(o)).collect();
    Column::new(name.into(), values)
}
