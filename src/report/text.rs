use crate::model::settings::{OccurrenceMode, ReportKind, ViewMode};
use crate::pipeline::stage2_density::{SampleDensity, UnavailableKind};
use crate::report::{Report, SummaryData, format_float, round_to};

pub fn render_report_text(data: &SummaryData, report: &Report) -> String {
    let mut out = String::new();

    out.push_str("Counting Report\n");
    out.push_str("===============\n\n");

    out.push_str("1. Counting\n");
    out.push_str(&format!("Name: {} (id {})\n", data.counting.name, data.counting.id));
    out.push_str(&format!(
        "Counted group: {}\n",
        data.counting.group.as_deref().unwrap_or("not set")
    ));
    match (&data.counting.marker, data.counting.marker_count) {
        (Some(marker), Some(count)) => {
            out.push_str(&format!("Marker: {} ({} added)\n\n", marker, count))
        }
        (Some(marker), None) => out.push_str(&format!("Marker: {} (count not set)\n\n", marker)),
        (None, _) => out.push_str("Marker: not set\n\n"),
    }

    let settings = &data.settings;
    out.push_str("2. Settings\n");
    out.push_str(&format!("Report kind: {}\n", kind_name(settings.kind)));
    out.push_str(&format!(
        "Species order: by {} occurrence\n",
        occurrence_name(settings.occurrence)
    ));
    out.push_str(&format!("Chart view: {}\n", view_name(settings.view)));
    out.push_str(&format!(
        "Rows reversed: {}\n",
        if settings.reverse_rows { "yes" } else { "no" }
    ));
    match &settings.samples_filter {
        Some(ids) => out.push_str(&format!("Sample filter: {} ids\n", ids.len())),
        None => out.push_str("Sample filter: all samples\n"),
    }
    match settings.percentage_group {
        Some(group) => out.push_str(&format!("Percentage group: {}\n\n", group)),
        None => out.push_str("Percentage group: all groups\n\n"),
    }

    let counts = &data.counts;
    out.push_str("3. Matrix\n");
    out.push_str(&format!(
        "Samples: {} ({} shown)\n",
        counts.samples, counts.rows
    ));
    out.push_str(&format!("Species: {}\n", counts.species));
    out.push_str(&format!("Occurrences: {}\n", counts.occurrences));
    out.push_str(&format!(
        "Columns: {} in {} groups ({} requested)\n",
        counts.columns, counts.column_groups, settings.column_groups_requested
    ));
    for (idx, group) in report.column_groups().iter().enumerate() {
        out.push_str(&format!("  group {}: {}\n", idx + 1, group.join(", ")));
    }
    out.push('\n');

    out.push_str("4. Group density\n");
    if data.sample_densities.is_empty() {
        out.push_str("No samples.\n");
    }
    for entry in &data.sample_densities {
        out.push_str(&format!("{}: {}\n", entry.sample, density_text(entry)));
    }
    out.push('\n');

    out.push_str("5. Caveats\n");
    let missing_input = count_unavailable(&data.sample_densities, UnavailableKind::MissingInput);
    let not_counted =
        count_unavailable(&data.sample_densities, UnavailableKind::MarkerNotCounted);
    if missing_input + not_counted == 0 {
        out.push_str("Density computable for every sample.\n");
    } else {
        out.push_str(&format!(
            "Samples without a density: {} (missing input: {}, marker not counted: {})\n",
            missing_input + not_counted,
            missing_input,
            not_counted
        ));
    }
    if settings.kind == ReportKind::Density && counts.density_entries == 0 {
        out.push_str("Density report has no density values; every cell renders 0.\n");
    }
    let skipped = settings
        .column_groups_requested
        .saturating_sub(counts.column_groups);
    if skipped > 0 {
        out.push_str(&format!(
            "Column groups without output: {} (empty selection or rejected formula)\n",
            skipped
        ));
    }

    out
}

fn density_text(entry: &SampleDensity) -> String {
    match (entry.density, entry.unavailable) {
        (Some(d), _) => format_float(round_to(d, 2)),
        (None, Some(reason)) => format!("not computable ({})", reason),
        (None, None) => "not computable".to_string(),
    }
}

fn count_unavailable(entries: &[SampleDensity], kind: UnavailableKind) -> usize {
    entries
        .iter()
        .filter(|e| e.unavailable.is_some_and(|r| r.kind() == kind))
        .count()
}

fn kind_name(kind: ReportKind) -> &'static str {
    match kind {
        ReportKind::Quantity => "quantity",
        ReportKind::Density => "density",
    }
}

fn occurrence_name(mode: OccurrenceMode) -> &'static str {
    match mode {
        OccurrenceMode::First => "first",
        OccurrenceMode::Last => "last",
    }
}

fn view_name(view: ViewMode) -> &'static str {
    match view {
        ViewMode::Numbers => "numbers",
        ViewMode::Points => "points",
        ViewMode::Blocks => "blocks",
        ViewMode::Lines => "lines",
    }
}

#[cfg(test)]
#[path = "../../tests/src_inline/report/text.rs"]
mod tests;
