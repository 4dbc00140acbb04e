use crate::input::columns::{ColumnCriteria, ColumnSpec};
use crate::model::settings::{ReportKind, ReportSettings};
use crate::model::{GroupId, Species};
use crate::pipeline::stage1_summary::Summary;
use crate::pipeline::stage2_density::DensityMap;
use crate::report::field::{Field, Textizer};
use crate::report::formula::Formula;
use crate::report::merge::MergeStrategy;
use crate::report::{Number, Report, round_to};

#[derive(Debug, Clone)]
pub struct Stage3Inputs<'a> {
    pub summary: &'a Summary<'a>,
    pub columns: &'a ColumnSpec,
    /// Required for density reports; occurrences missing from it render 0.
    pub densities: Option<&'a DensityMap>,
    pub settings: &'a ReportSettings,
}

#[derive(Debug, Clone)]
enum GroupColumns<'a> {
    /// One column per species, `rows[row][col]`.
    Fields {
        species: Vec<&'a Species>,
        rows: Vec<Vec<Field<'a>>>,
    },
    Reduced {
        header: String,
        values: Vec<Number>,
    },
    Computed {
        header: String,
        values: Vec<Option<f64>>,
    },
    /// Computed group waiting for the second pass.
    Pending,
    /// Computed group whose formula was rejected.
    Skipped,
}

#[derive(Debug, Clone)]
struct ColumnGroup<'a> {
    id: String,
    columns: GroupColumns<'a>,
}

impl ColumnGroup<'_> {
    fn is_computed(&self) -> bool {
        matches!(
            self.columns,
            GroupColumns::Computed { .. } | GroupColumns::Pending | GroupColumns::Skipped
        )
    }

    fn headers(&self) -> Vec<String> {
        match &self.columns {
            GroupColumns::Fields { species, .. } => species.iter().map(|s| s.name.clone()).collect(),
            GroupColumns::Reduced { header, .. } | GroupColumns::Computed { header, .. } => {
                vec![header.clone()]
            }
            GroupColumns::Pending | GroupColumns::Skipped => Vec::new(),
        }
    }

    fn row_texts(&self, row: usize) -> Vec<Option<String>> {
        match &self.columns {
            GroupColumns::Fields { rows, .. } => rows[row].iter().map(|f| Some(f.text())).collect(),
            GroupColumns::Reduced { values, .. } => vec![Some(values[row].to_string())],
            GroupColumns::Computed { values, .. } => {
                vec![values[row].map(|v| Number::Float(v).to_string())]
            }
            GroupColumns::Pending | GroupColumns::Skipped => Vec::new(),
        }
    }

    /// Value a formula sees for this group: the reduced value, or the first
    /// column of an unreduced group.
    fn operand(&self, row: usize) -> Option<f64> {
        match &self.columns {
            GroupColumns::Fields { rows, .. } => rows[row].first().map(|f| f.value().as_f64()),
            GroupColumns::Reduced { values, .. } => Some(values[row].as_f64()),
            _ => None,
        }
    }
}

pub fn run_stage3(inputs: &Stage3Inputs<'_>) -> Report {
    let summary = inputs.summary;
    let settings = inputs.settings;
    if settings.kind == ReportKind::Density && inputs.densities.is_none() {
        tracing::warn!("density report requested without a density map; every cell renders 0");
    }

    let rows = select_rows(summary, settings);
    // Group 0 stands for "all groups".
    let percentage_group = settings.percentage_group.filter(|&g| g != 0);

    let mut groups: Vec<ColumnGroup<'_>> = Vec::with_capacity(inputs.columns.len());
    for (id, criteria) in inputs.columns.iter() {
        if criteria.computed.is_some() {
            groups.push(ColumnGroup {
                id: id.to_string(),
                columns: GroupColumns::Pending,
            });
            continue;
        }

        let mut fields = process_column(inputs, &rows);
        if criteria.percentages {
            post_process_column(&mut fields, percentage_group);
        }
        let (species, fields) = filter_column(&summary.species, fields, criteria);
        let columns = match criteria.merge {
            Some(strategy) if !species.is_empty() => reduce_column(id, criteria, strategy, &fields),
            _ => GroupColumns::Fields {
                species,
                rows: fields,
            },
        };
        groups.push(ColumnGroup {
            id: id.to_string(),
            columns,
        });
    }

    compute_columns(&mut groups, inputs.columns, rows.len());

    let report = assemble(summary, &rows, &groups);
    tracing::info!(
        rows = report.n_rows(),
        columns = report.n_cols(),
        groups = groups.len(),
        kind = ?settings.kind,
        "report assembled"
    );
    report
}

/// Summary row indices kept by the sample filter, in display order.
fn select_rows(summary: &Summary<'_>, settings: &ReportSettings) -> Vec<usize> {
    let mut rows: Vec<usize> = summary
        .samples
        .iter()
        .enumerate()
        .filter(|(_, sample)| match &settings.samples_ids {
            Some(ids) => {
                let id = sample.id.to_string();
                ids.iter().any(|s| *s == id)
            }
            None => true,
        })
        .map(|(row, _)| row)
        .collect();
    if settings.reverse_rows {
        rows.reverse();
    }
    rows
}

fn process_column<'a>(inputs: &Stage3Inputs<'a>, rows: &[usize]) -> Vec<Vec<Field<'a>>> {
    let summary = inputs.summary;
    rows.iter()
        .map(|&row| {
            summary
                .species
                .iter()
                .enumerate()
                .map(|(col, &species)| {
                    let occurrence = summary.cell(row, col);
                    let textizer = match inputs.settings.kind {
                        ReportKind::Quantity => Textizer::Quantity,
                        ReportKind::Density => Textizer::Density(
                            occurrence
                                .zip(inputs.densities)
                                .and_then(|(occ, map)| map.get(&occ.id).copied()),
                        ),
                    };
                    Field::new(species, occurrence, textizer)
                })
                .collect()
        })
        .collect()
}

fn post_process_column(fields: &mut [Vec<Field<'_>>], group: Option<GroupId>) {
    for row in fields.iter_mut() {
        let row_sum: u64 = row
            .iter()
            .filter(|f| group.is_none_or(|g| f.species.group_id == g))
            .map(Field::quantity)
            .sum();
        for field in row.iter_mut() {
            field.textizer = Textizer::Percentage { row_sum };
        }
    }
}

fn filter_column<'a>(
    species: &[&'a Species],
    fields: Vec<Vec<Field<'a>>>,
    criteria: &ColumnCriteria,
) -> (Vec<&'a Species>, Vec<Vec<Field<'a>>>) {
    let keep: Vec<usize> = species
        .iter()
        .enumerate()
        .filter(|(_, s)| criteria.allows(s.id))
        .map(|(col, _)| col)
        .collect();
    let kept_species = keep.iter().map(|&col| species[col]).collect();
    let kept_fields = fields
        .into_iter()
        .map(|row| keep.iter().map(|&col| row[col]).collect())
        .collect();
    (kept_species, kept_fields)
}

fn reduce_column<'a>(
    id: &str,
    criteria: &ColumnCriteria,
    strategy: MergeStrategy,
    fields: &[Vec<Field<'a>>],
) -> GroupColumns<'a> {
    tracing::debug!(column = id, strategy = strategy.name(), "reducing column group");
    GroupColumns::Reduced {
        header: criteria.header.clone().unwrap_or_else(|| id.to_string()),
        values: fields.iter().map(|row| strategy.reduce(row)).collect(),
    }
}

/// Second pass: formulas read the non-computed groups in declaration order,
/// `A` being the first of them.
fn compute_columns(groups: &mut [ColumnGroup<'_>], columns: &ColumnSpec, n_rows: usize) {
    let operands: Vec<usize> = groups
        .iter()
        .enumerate()
        .filter(|(_, g)| !g.is_computed())
        .map(|(idx, _)| idx)
        .collect();

    let mut results = Vec::new();
    for ((idx, group), (_, criteria)) in groups.iter().enumerate().zip(columns.iter()) {
        let Some(source) = criteria.computed.as_deref() else {
            continue;
        };
        let formula = match Formula::parse(source) {
            Ok(formula) => formula,
            Err(error) => {
                tracing::warn!(column = %group.id, %error, "computed column skipped");
                results.push((idx, GroupColumns::Skipped));
                continue;
            }
        };
        tracing::debug!(
            column = %group.id,
            formula = formula.source(),
            ast = ?formula.expr(),
            "computing column"
        );
        let values = (0..n_rows)
            .map(|row| {
                let row_operands: Vec<Option<f64>> = operands
                    .iter()
                    .take(3)
                    .map(|&g| groups[g].operand(row))
                    .collect();
                formula.evaluate(&row_operands).map(|v| round_to(v, 1))
            })
            .collect();
        let header = criteria.header.clone().unwrap_or_else(|| group.id.clone());
        results.push((idx, GroupColumns::Computed { header, values }));
    }

    for (idx, columns) in results {
        groups[idx].columns = columns;
    }
}

fn assemble(summary: &Summary<'_>, rows: &[usize], groups: &[ColumnGroup<'_>]) -> Report {
    let mut column_headers = Vec::new();
    let mut splits = Vec::new();
    for group in groups {
        let headers = group.headers();
        if headers.is_empty() {
            continue;
        }
        column_headers.extend(headers);
        splits.push(column_headers.len());
    }

    let row_headers = rows
        .iter()
        .map(|&row| summary.samples[row].name.clone())
        .collect();

    let values = (0..rows.len())
        .map(|row| groups.iter().flat_map(|g| g.row_texts(row)).collect())
        .collect();

    Report {
        row_headers,
        column_headers,
        values,
        splits,
    }
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/stage3_report.rs"]
mod tests;
