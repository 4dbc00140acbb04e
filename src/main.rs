mod input;
mod logging;
mod model;
mod pipeline;
mod report;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use thiserror::Error;

use crate::input::columns::{ColumnSpec, ReportRequest};
use crate::input::{InputError, find_dataset_path, find_request_path, load_dataset, load_request};
use crate::model::GroupId;
use crate::model::settings::{ChartStyle, OccurrenceMode, ReportKind, ReportSettings, ViewMode};
use crate::pipeline::stage1_summary::{build_summary, specimens_by_occurrence};
use crate::pipeline::stage2_density::{DensityInputs, occurrence_density_map, sample_densities};
use crate::pipeline::stage3_report::{Stage3Inputs, run_stage3};
use crate::pipeline::stage4_chart::run_stage4;
use crate::pipeline::stage5_export::{ExportError, Stage5Input, write_reports};

#[derive(Parser, Debug)]
#[command(
    name = "micropal-counting",
    version,
    about = "Counting reports for micropaleontological sections"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Build the report, chart layout and summaries for one counting.
    Run(RunArgs),
}

#[derive(Args, Debug, Clone)]
struct RunArgs {
    /// Dataset file, or a directory holding counting.json[.gz].
    #[arg(long)]
    input: PathBuf,
    #[arg(long)]
    out: PathBuf,
    /// Column specification; defaults to request.json beside the dataset.
    #[arg(long)]
    request: Option<PathBuf>,
    #[arg(long, value_enum, default_value = "quantity")]
    kind: ReportKind,
    #[arg(long, value_enum, default_value = "first")]
    occurrence: OccurrenceMode,
    #[arg(long, value_enum, default_value = "numbers")]
    view: ViewMode,
    #[arg(long)]
    reverse: bool,
    /// Sample ids to keep, comma separated.
    #[arg(long, value_delimiter = ',')]
    samples: Option<Vec<String>>,
    /// Restrict percentage row sums to one group; 0 means all groups.
    #[arg(long)]
    percentage_group: Option<GroupId>,
    #[arg(long)]
    font_size: Option<f64>,
    #[arg(long)]
    stroke_width: Option<f64>,
    #[arg(long, short)]
    verbose: bool,
}

#[derive(Debug, Error)]
enum RunError {
    #[error(transparent)]
    Input(#[from] InputError),
    #[error("failed to write reports: {0}")]
    Export(#[from] ExportError),
    #[error("invalid argument: {0}")]
    Usage(String),
}

fn main() {
    let cli = Cli::parse();
    match cli.command {
        Command::Run(args) => {
            logging::init_tracing(args.verbose);
            if let Err(err) = run(&args) {
                eprintln!("{err}");
                std::process::exit(1);
            }
        }
    }
}

fn run(args: &RunArgs) -> Result<(), RunError> {
    let style = chart_style(args)?;

    let dataset_path = find_dataset_path(&args.input)?;
    let dataset = load_dataset(&dataset_path)?;
    let request = match args.request.clone().or_else(|| find_request_path(&args.input)) {
        Some(path) => load_request(&path)?,
        None => ReportRequest::default(),
    };
    let settings = resolve_settings(args, &request);

    let catalog = dataset.catalog();
    let samples = dataset.sample_refs();
    let summary = build_summary(&samples, &dataset.occurrences, &catalog, settings.occurrence);

    let density_inputs = DensityInputs {
        counting: &dataset.counting,
        catalog: &catalog,
    };
    let densities = occurrence_density_map(&density_inputs, &dataset.occurrences, &summary.samples);
    let per_sample = sample_densities(&density_inputs, &dataset.occurrences, &summary.samples);

    let columns = if request.columns.is_empty() {
        let species = specimens_by_occurrence(&summary.samples, &dataset.occurrences, &catalog);
        tracing::info!(
            species = species.len(),
            "no column specification given; reporting every species"
        );
        ColumnSpec::all_species(species.iter().map(|s| s.id))
    } else {
        request.columns.clone()
    };

    let report = run_stage3(&Stage3Inputs {
        summary: &summary,
        columns: &columns,
        densities: Some(&densities),
        settings: &settings,
    });
    let chart = run_stage4(&report, args.view, style);

    let input = Stage5Input {
        dataset: &dataset,
        summary: &summary,
        settings: &settings,
        view: args.view,
        column_groups_requested: columns.len(),
        report: &report,
        chart: &chart,
        sample_densities: &per_sample,
        density_entries: densities.len(),
        tool_name: env!("CARGO_PKG_NAME").to_string(),
        tool_version: env!("CARGO_PKG_VERSION").to_string(),
    };
    write_reports(&input, &args.out)?;

    Ok(())
}

/// CLI flags win over the request file.
fn resolve_settings(args: &RunArgs, request: &ReportRequest) -> ReportSettings {
    ReportSettings {
        kind: args.kind,
        occurrence: args.occurrence,
        reverse_rows: args.reverse,
        samples_ids: args
            .samples
            .clone()
            .map(|ids| ids.into_iter().map(|id| id.trim().to_string()).collect())
            .or_else(|| request.samples_ids.clone()),
        percentage_group: match args.percentage_group {
            // 0 on the command line clears any group from the request.
            Some(0) => None,
            Some(group) => Some(group),
            None => request.percentages_group_id,
        },
    }
}

fn chart_style(args: &RunArgs) -> Result<ChartStyle, RunError> {
    let defaults = ChartStyle::default_v1();
    let style = ChartStyle {
        font_size: args.font_size.unwrap_or(defaults.font_size),
        stroke_width: args.stroke_width.unwrap_or(defaults.stroke_width),
    };
    if !(style.font_size.is_finite() && style.font_size > 0.0) {
        return Err(RunError::Usage(format!(
            "--font-size must be positive, got {}",
            style.font_size
        )));
    }
    if !(style.stroke_width.is_finite() && style.stroke_width >= 0.0) {
        return Err(RunError::Usage(format!(
            "--stroke-width must not be negative, got {}",
            style.stroke_width
        )));
    }
    Ok(style)
}
