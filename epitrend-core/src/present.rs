//! Shaped tables for an external presentation sink.
//!
//! The core does not render anything. It builds rendering-agnostic tables
//! and hands them to a [`PresentationSink`].

use crate::domain::{CleanedSeries, FillColumn, LatestSnapshot};
use crate::pipeline::Metrics;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One point of a line chart. `None` renders as a gap.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSeriesPoint {
    pub date: NaiveDate,
    pub entity_id: String,
    pub value: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineChart {
    pub title: String,
    pub metric: String,
    pub points: Vec<TimeSeriesPoint>,
}

impl LineChart {
    /// One point per cleaned row for a fill-eligible column.
    pub fn from_column(title: &str, series: &CleanedSeries, column: FillColumn) -> Self {
        Self {
            title: title.to_string(),
            metric: column.name().to_string(),
            points: series
                .rows()
                .map(|o| TimeSeriesPoint {
                    date: o.date,
                    entity_id: o.entity_id.clone(),
                    value: column.get(o),
                })
                .collect(),
        }
    }

    /// Percentage of population vaccinated over time.
    pub fn vaccination_progress(series: &CleanedSeries) -> Self {
        Self {
            title: "Vaccination Progress (% Population)".into(),
            metric: "vaccination_pct".into(),
            points: Metrics::vaccination_progress(series)
                .into_iter()
                .map(|p| TimeSeriesPoint {
                    date: p.date,
                    entity_id: p.entity_id,
                    value: Some(p.rate),
                })
                .collect(),
        }
    }

    /// Distinct entities in first-appearance order.
    pub fn entities(&self) -> Vec<&str> {
        let mut seen: Vec<&str> = Vec::new();
        for p in &self.points {
            if !seen.contains(&p.entity_id.as_str()) {
                seen.push(&p.entity_id);
            }
        }
        seen
    }
}

/// One shaded region of a choropleth.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChoroplethCell {
    pub iso_code: String,
    pub value: Option<f64>,
    pub entity_label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Choropleth {
    pub title: String,
    pub metric: String,
    pub cells: Vec<ChoroplethCell>,
}

impl Choropleth {
    /// Total cases per region on the snapshot date.
    ///
    /// Rows without an ISO code cannot be placed on a map and are skipped.
    pub fn total_cases(snapshot: &LatestSnapshot) -> Self {
        let title = match snapshot.date {
            Some(date) => format!("Case Distribution as of {}", date.format("%Y-%m-%d")),
            None => "Case Distribution".to_string(),
        };
        Self {
            title,
            metric: FillColumn::TotalCases.name().to_string(),
            cells: snapshot
                .rows
                .iter()
                .filter_map(|r| {
                    let obs = &r.observation;
                    obs.iso_code.as_ref().map(|iso| ChoroplethCell {
                        iso_code: iso.clone(),
                        value: obs.total_cases,
                        entity_label: obs.entity_id.clone(),
                    })
                })
                .collect(),
        }
    }
}

/// One line of the key metrics table. Values rounded to 2 decimals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsRow {
    pub entity_id: String,
    pub total_cases: Option<f64>,
    pub total_deaths: Option<f64>,
    pub death_rate: Option<f64>,
    pub vaccination_rate: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsTable {
    pub title: String,
    pub date: Option<NaiveDate>,
    pub rows: Vec<MetricsRow>,
}

impl MetricsTable {
    pub fn from_snapshot(snapshot: &LatestSnapshot) -> Self {
        Self {
            title: "Key Metrics".into(),
            date: snapshot.date,
            rows: snapshot
                .rows
                .iter()
                .map(|r| MetricsRow {
                    entity_id: r.observation.entity_id.clone(),
                    total_cases: r.observation.total_cases.map(round2),
                    total_deaths: r.observation.total_deaths.map(round2),
                    death_rate: r.death_rate.map(round2),
                    vaccination_rate: r.vaccination_rate.map(round2),
                })
                .collect(),
        }
    }
}

/// Two-decimal rounding, halves to even.
pub fn round2(x: f64) -> f64 {
    (x * 100.0).round_ties_even() / 100.0
}

/// Everything the sink receives for one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartBundle {
    pub total_cases: LineChart,
    pub total_deaths: LineChart,
    pub vaccination: LineChart,
    pub choropleth: Choropleth,
    pub metrics: MetricsTable,
}

impl ChartBundle {
    pub fn build(series: &CleanedSeries, snapshot: &LatestSnapshot) -> Self {
        Self {
            total_cases: LineChart::from_column(
                "Total Cases Over Time",
                series,
                FillColumn::TotalCases,
            ),
            total_deaths: LineChart::from_column(
                "Total Deaths Over Time",
                series,
                FillColumn::TotalDeaths,
            ),
            vaccination: LineChart::vaccination_progress(series),
            choropleth: Choropleth::total_cases(snapshot),
            metrics: MetricsTable::from_snapshot(snapshot),
        }
    }

    /// Hand every table to the sink, in a fixed order.
    pub fn present<S: PresentationSink + ?Sized>(&self, sink: &mut S) -> Result<(), S::Error> {
        sink.line_chart(&self.total_cases)?;
        sink.line_chart(&self.total_deaths)?;
        sink.line_chart(&self.vaccination)?;
        sink.choropleth(&self.choropleth)?;
        sink.metrics_table(&self.metrics)?;
        sink.finish()
    }
}

/// Receiver of shaped tables: console, files, a plotting front end.
pub trait PresentationSink {
    type Error;

    fn line_chart(&mut self, chart: &LineChart) -> Result<(), Self::Error>;

    fn choropleth(&mut self, map: &Choropleth) -> Result<(), Self::Error>;

    fn metrics_table(&mut self, table: &MetricsTable) -> Result<(), Self::Error>;

    /// Called once after every table has been delivered.
    fn finish(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Observation;
    use crate::pipeline::Cleaner;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn series() -> CleanedSeries {
        let mut a1 = Observation::empty("Kenya", date("2022-01-01"));
        a1.iso_code = Some("KEN".into());
        a1.total_cases = Some(3.0);
        a1.total_deaths = Some(1.0);
        let mut a2 = Observation::empty("Kenya", date("2022-01-02"));
        a2.iso_code = Some("KEN".into());
        a2.total_deaths = Some(2.0);
        let mut w = Observation::empty("World", date("2022-01-02"));
        w.total_cases = Some(10.0);
        Cleaner::clean_observations(vec![a1, a2, w])
    }

    #[derive(Default)]
    struct Recorder {
        calls: Vec<String>,
    }

    impl PresentationSink for Recorder {
        type Error = std::convert::Infallible;

        fn line_chart(&mut self, chart: &LineChart) -> Result<(), Self::Error> {
            self.calls.push(format!("line:{}", chart.metric));
            Ok(())
        }

        fn choropleth(&mut self, map: &Choropleth) -> Result<(), Self::Error> {
            self.calls.push(format!("map:{}", map.cells.len()));
            Ok(())
        }

        fn metrics_table(&mut self, table: &MetricsTable) -> Result<(), Self::Error> {
            self.calls.push(format!("table:{}", table.rows.len()));
            Ok(())
        }

        fn finish(&mut self) -> Result<(), Self::Error> {
            self.calls.push("finish".into());
            Ok(())
        }
    }

    #[test]
    fn line_chart_keeps_gaps() {
        let s = series();
        let chart = LineChart::from_column("t", &s, FillColumn::TotalCases);
        let values: Vec<Option<f64>> = chart.points.iter().map(|p| p.value).collect();
        // Kenya: 3, filled 3; World: 10
        assert_eq!(values, vec![Some(3.0), Some(3.0), Some(10.0)]);
        assert_eq!(chart.entities(), vec!["Kenya", "World"]);
    }

    #[test]
    fn choropleth_skips_rows_without_iso_code() {
        let s = series();
        let snap = Metrics::latest_snapshot(&s);
        let map = Choropleth::total_cases(&snap);
        assert_eq!(map.title, "Case Distribution as of 2022-01-02");
        assert_eq!(
            map.cells,
            vec![ChoroplethCell {
                iso_code: "KEN".into(),
                value: Some(3.0),
                entity_label: "Kenya".into(),
            }]
        );
    }

    #[test]
    fn metrics_table_rounds_to_two_decimals() {
        let s = series();
        let snap = Metrics::latest_snapshot(&s);
        let table = MetricsTable::from_snapshot(&snap);
        let kenya = table.rows.iter().find(|r| r.entity_id == "Kenya").unwrap();
        // 2 / 3 * 100
        assert_eq!(kenya.death_rate, Some(66.67));
        assert_eq!(kenya.vaccination_rate, None);
    }

    #[test]
    fn round2_rounds_to_cents() {
        assert_eq!(round2(1.234), 1.23);
        assert_eq!(round2(-1.236), -1.24);
        assert_eq!(round2(150.0), 150.0);
    }

    #[test]
    fn round2_sends_halves_to_even() {
        assert_eq!(round2(0.125), 0.12);
        assert_eq!(round2(0.375), 0.38);
        assert_eq!(round2(-0.125), -0.12);
    }

    #[test]
    fn bundle_presents_every_table_in_order() {
        let s = series();
        let snap = Metrics::latest_snapshot(&s);
        let mut sink = Recorder::default();
        ChartBundle::build(&s, &snap).present(&mut sink).unwrap();
        assert_eq!(
            sink.calls,
            vec![
                "line:total_cases",
                "line:total_deaths",
                "line:vaccination_pct",
                "map:1",
                "table:2",
                "finish",
            ]
        );
    }
}
