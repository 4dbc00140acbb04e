use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use thiserror::Error;

use crate::input::dataset::Dataset;
use crate::model::settings::{ReportSettings, ViewMode};
use crate::pipeline::stage1_summary::Summary;
use crate::pipeline::stage2_density::SampleDensity;
use crate::pipeline::stage4_chart::ChartLayout;
use crate::report::csv::render_report_csv;
use crate::report::json::{render_chart_json, render_summary_json};
use crate::report::text::render_report_text;
use crate::report::{CountingInfo, Counts, Report, SettingsInfo, SummaryData};

pub const REPORT_CSV: &str = "report.csv";
pub const SUMMARY_JSON: &str = "summary.json";
pub const CHART_JSON: &str = "chart.json";
pub const REPORT_TXT: &str = "report.txt";

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
}

#[derive(Debug, Clone)]
pub struct Stage5Input<'a> {
    pub dataset: &'a Dataset,
    pub summary: &'a Summary<'a>,
    pub settings: &'a ReportSettings,
    pub view: ViewMode,
    pub column_groups_requested: usize,
    pub report: &'a Report,
    pub chart: &'a ChartLayout,
    pub sample_densities: &'a [SampleDensity],
    pub density_entries: usize,
    pub tool_name: String,
    pub tool_version: String,
}

pub fn write_reports(input: &Stage5Input<'_>, out_dir: &Path) -> Result<(), ExportError> {
    fs::create_dir_all(out_dir)?;

    let csv = render_report_csv(input.report)?;
    write_text(&out_dir.join(REPORT_CSV), &csv)?;

    let summary = build_summary_data(input);
    let json = render_summary_json(&summary)?;
    write_text(&out_dir.join(SUMMARY_JSON), &json)?;

    let chart = render_chart_json(input.chart)?;
    write_text(&out_dir.join(CHART_JSON), &chart)?;

    let text = render_report_text(&summary, input.report);
    write_text(&out_dir.join(REPORT_TXT), &text)?;

    tracing::info!(out = %out_dir.display(), "reports written");
    Ok(())
}

pub fn build_summary_data(input: &Stage5Input<'_>) -> SummaryData {
    let dataset = input.dataset;
    let catalog = dataset.catalog();
    let counting = &dataset.counting;

    SummaryData {
        tool: input.tool_name.clone(),
        version: input.tool_version.clone(),
        counting: CountingInfo {
            id: counting.id,
            name: counting.name.clone(),
            group: counting
                .group_id
                .and_then(|id| catalog.group(id))
                .map(|g| g.name.clone()),
            marker: counting
                .marker_id
                .and_then(|id| catalog.species(id))
                .map(|s| s.name.clone()),
            marker_count: counting.marker_count,
        },
        settings: SettingsInfo {
            kind: input.settings.kind,
            occurrence: input.summary.mode,
            view: input.view,
            reverse_rows: input.settings.reverse_rows,
            samples_filter: input.settings.samples_ids.clone(),
            percentage_group: input.settings.percentage_group,
            column_groups_requested: input.column_groups_requested,
        },
        counts: Counts {
            samples: input.summary.n_rows(),
            species: input.summary.n_cols(),
            occurrences: dataset.occurrences.len(),
            rows: input.report.n_rows(),
            columns: input.report.n_cols(),
            column_groups: input.report.splits.len(),
            density_entries: input.density_entries,
            densities_available: input
                .sample_densities
                .iter()
                .filter(|d| d.density.is_some())
                .count(),
        },
        species_order: input.summary.species.iter().map(|s| s.name.clone()).collect(),
        sample_order: input.summary.samples.iter().map(|s| s.name.clone()).collect(),
        column_headers: input.report.column_headers.clone(),
        splits: input.report.splits.clone(),
        sample_densities: input.sample_densities.to_vec(),
    }
}

fn write_text(path: &Path, contents: &str) -> std::io::Result<()> {
    let mut w = BufWriter::new(File::create(path)?);
    w.write_all(contents.as_bytes())?;
    w.flush()
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/stage5_export.rs"]
mod tests;
