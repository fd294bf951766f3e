//! Console sink: plain-text tables on any writer.

use crate::summary::CleaningSummary;
use epitrend_core::data::DatasetOverview;
use epitrend_core::present::{Choropleth, LineChart, MetricsTable, PresentationSink};
use std::io::{self, Write};

pub struct ConsoleSink<W: Write> {
    out: W,
}

impl ConsoleSink<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> ConsoleSink<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    /// Shape, columns, and the most-missing columns of the raw dataset.
    pub fn overview(&mut self, overview: &DatasetOverview) -> io::Result<()> {
        writeln!(self.out)?;
        writeln!(self.out, "=== Dataset Overview ===")?;
        writeln!(self.out, "Shape:   ({}, {})", overview.rows, overview.columns)?;
        writeln!(self.out, "Columns: {}", overview.column_names.join(", "))?;
        writeln!(self.out)?;
        writeln!(self.out, "Missing values:")?;
        for (name, count) in &overview.top_missing {
            writeln!(self.out, "  {:<40} {:>10}", name, count)?;
        }
        Ok(())
    }

    pub fn cleaning(&mut self, summary: &CleaningSummary) -> io::Result<()> {
        writeln!(self.out)?;
        writeln!(self.out, "=== Cleaning Summary ===")?;
        writeln!(
            self.out,
            "Rows: {} across {} entities",
            summary.rows, summary.entities
        )?;
        writeln!(
            self.out,
            "Remaining missing values: {}",
            summary.remaining_total()
        )?;
        for (name, count) in summary.remaining_by_column.iter().filter(|(_, n)| *n > 0) {
            writeln!(self.out, "  {:<20} {:>8}", name, count)?;
        }
        Ok(())
    }
}

fn fmt_value(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{v:.2}"),
        None => "NaN".to_string(),
    }
}

impl<W: Write> PresentationSink for ConsoleSink<W> {
    type Error = io::Error;

    /// Per-entity extent and latest value; the console cannot draw lines.
    fn line_chart(&mut self, chart: &LineChart) -> io::Result<()> {
        writeln!(self.out)?;
        writeln!(self.out, "--- {} ---", chart.title)?;
        if chart.points.is_empty() {
            writeln!(self.out, "(no data)")?;
            return Ok(());
        }
        writeln!(
            self.out,
            "{:<20} {:>6} {:<12} {:<12} {:>16}",
            "Entity", "Points", "From", "To", "Latest"
        )?;
        writeln!(self.out, "{}", "-".repeat(70))?;
        for entity in chart.entities() {
            let points: Vec<_> = chart
                .points
                .iter()
                .filter(|p| p.entity_id == entity)
                .collect();
            let (Some(first), Some(last)) = (points.first(), points.last()) else {
                continue;
            };
            let latest = points.iter().rev().find_map(|p| p.value);
            writeln!(
                self.out,
                "{:<20} {:>6} {:<12} {:<12} {:>16}",
                entity,
                points.len(),
                first.date.to_string(),
                last.date.to_string(),
                fmt_value(latest)
            )?;
        }
        Ok(())
    }

    fn choropleth(&mut self, map: &Choropleth) -> io::Result<()> {
        writeln!(self.out)?;
        writeln!(self.out, "--- {} ---", map.title)?;
        writeln!(self.out, "{:<10} {:<20} {:>16}", "ISO", "Entity", map.metric)?;
        writeln!(self.out, "{}", "-".repeat(48))?;
        for cell in &map.cells {
            writeln!(
                self.out,
                "{:<10} {:<20} {:>16}",
                cell.iso_code,
                cell.entity_label,
                fmt_value(cell.value)
            )?;
        }
        Ok(())
    }

    fn metrics_table(&mut self, table: &MetricsTable) -> io::Result<()> {
        writeln!(self.out)?;
        match table.date {
            Some(date) => writeln!(self.out, "=== {} ({date}) ===", table.title)?,
            None => writeln!(self.out, "=== {} ===", table.title)?,
        }
        writeln!(
            self.out,
            "{:<20} {:>16} {:>14} {:>11} {:>17}",
            "location", "total_cases", "total_deaths", "death_rate", "vaccination_rate"
        )?;
        for row in &table.rows {
            writeln!(
                self.out,
                "{:<20} {:>16} {:>14} {:>11} {:>17}",
                row.entity_id,
                fmt_value(row.total_cases),
                fmt_value(row.total_deaths),
                fmt_value(row.death_rate),
                fmt_value(row.vaccination_rate)
            )?;
        }
        Ok(())
    }

    fn finish(&mut self) -> io::Result<()> {
        self.out.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use epitrend_core::present::{MetricsRow, TimeSeriesPoint};

    fn render<F: FnOnce(&mut ConsoleSink<Vec<u8>>) -> io::Result<()>>(f: F) -> String {
        let mut sink = ConsoleSink::new(Vec::new());
        f(&mut sink).unwrap();
        String::from_utf8(sink.into_inner()).unwrap()
    }

    #[test]
    fn metrics_table_prints_nan_for_undefined_rates() {
        let table = MetricsTable {
            title: "Key Metrics".into(),
            date: NaiveDate::from_ymd_opt(2022, 1, 3),
            rows: vec![MetricsRow {
                entity_id: "Kenya".into(),
                total_cases: Some(30.0),
                total_deaths: None,
                death_rate: None,
                vaccination_rate: None,
            }],
        };
        let out = render(|s| s.metrics_table(&table));
        assert!(out.contains("=== Key Metrics (2022-01-03) ==="));
        assert!(out.contains("Kenya"));
        assert!(out.contains("30.00"));
        assert!(out.contains("NaN"));
    }

    #[test]
    fn line_chart_reports_latest_non_null_value() {
        let d = |day| NaiveDate::from_ymd_opt(2022, 1, day).unwrap();
        let chart = LineChart {
            title: "Total Cases Over Time".into(),
            metric: "total_cases".into(),
            points: vec![
                TimeSeriesPoint { date: d(1), entity_id: "Kenya".into(), value: Some(5.0) },
                TimeSeriesPoint { date: d(2), entity_id: "Kenya".into(), value: None },
            ],
        };
        let out = render(|s| s.line_chart(&chart));
        assert!(out.contains("--- Total Cases Over Time ---"));
        assert!(out.contains("2022-01-01"));
        assert!(out.contains("2022-01-02"));
        assert!(out.contains("5.00"));
    }

    #[test]
    fn empty_chart_says_so() {
        let chart = LineChart {
            title: "Vaccination Progress (% Population)".into(),
            metric: "vaccination_pct".into(),
            points: vec![],
        };
        let out = render(|s| s.line_chart(&chart));
        assert!(out.contains("(no data)"));
    }

    #[test]
    fn overview_lists_shape_and_missing() {
        let overview = DatasetOverview {
            rows: 7,
            columns: 3,
            column_names: vec!["date".into(), "location".into(), "total_cases".into()],
            top_missing: vec![("total_cases".into(), 4)],
        };
        let out = render(|s| s.overview(&overview));
        assert!(out.contains("Shape:   (7, 3)"));
        assert!(out.contains("date, location, total_cases"));
        assert!(out.contains("total_cases"));
    }
}
