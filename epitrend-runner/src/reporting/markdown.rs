//! Markdown report generator.

use crate::runner::PipelineRun;

pub struct MarkdownReport;

fn cell(value: Option<f64>) -> String {
    value.map_or_else(|| "NaN".to_string(), |v| format!("{v:.2}"))
}

impl MarkdownReport {
    pub fn generate(&self, run: &PipelineRun) -> String {
        let mut report = format!(
            "# EpiTrend Run Report\n\n\
Source: `{}`\n\n\
Payload: {} bytes, BLAKE3 `{}`\n\n\
## Dataset\n\
- Raw shape: {} rows x {} columns\n\
- Selected rows: {}\n\
- Entities: {}\n",
            run.locator,
            run.byte_len,
            run.content_hash,
            run.overview.rows,
            run.overview.columns,
            run.selected_rows,
            run.config.entities.join(", "),
        );

        report.push_str("\n## Cleaning\n\n");
        report.push_str(&format!(
            "Remaining missing values after forward-fill: {}\n",
            run.cleaning.remaining_total()
        ));
        let remaining: Vec<_> = run
            .cleaning
            .remaining_by_column
            .iter()
            .filter(|(_, n)| *n > 0)
            .collect();
        if !remaining.is_empty() {
            report.push_str("\n| Column | Missing |\n|--------|---------|\n");
            for (name, count) in remaining {
                report.push_str(&format!("| {name} | {count} |\n"));
            }
        }

        let metrics = &run.charts.metrics;
        report.push_str("\n## Key Metrics\n\n");
        match metrics.date {
            Some(date) => report.push_str(&format!("As of {date}.\n\n")),
            None => report.push_str("No observations survived cleaning.\n\n"),
        }
        report.push_str("| Location | Total Cases | Total Deaths | Death Rate (%) | Vaccination Rate (%) |\n");
        report.push_str("|----------|-------------|--------------|----------------|----------------------|\n");
        for row in &metrics.rows {
            report.push_str(&format!(
                "| {} | {} | {} | {} | {} |\n",
                row.entity_id,
                cell(row.total_cases),
                cell(row.total_deaths),
                cell(row.death_rate),
                cell(row.vaccination_rate)
            ));
        }

        // entities that did not report on the snapshot date
        let missing: Vec<&str> = run
            .config
            .entities
            .iter()
            .map(String::as_str)
            .filter(|e| run.snapshot.row(e).is_none())
            .collect();
        if !missing.is_empty() {
            report.push_str(&format!(
                "\nNot observed on the snapshot date: {}\n",
                missing.join(", ")
            ));
        }

        report.push_str("\n## Charts\n\n");
        for chart in [
            &run.charts.total_cases,
            &run.charts.total_deaths,
            &run.charts.vaccination,
        ] {
            report.push_str(&format!(
                "- {}: {} points, `{}.csv`\n",
                chart.title,
                chart.points.len(),
                chart.metric
            ));
        }
        report.push_str(&format!(
            "- {}: {} regions, `choropleth.csv`\n",
            run.charts.choropleth.title,
            run.charts.choropleth.cells.len()
        ));

        report
    }
}
