use std::fmt;

use serde::Serialize;

use crate::model::settings::{OccurrenceMode, ReportKind, ViewMode};
use crate::model::{CountingId, GroupId};
use crate::pipeline::stage2_density::SampleDensity;

pub mod csv;
pub mod field;
pub mod formula;
pub mod json;
pub mod merge;
pub mod text;

/// A report value. Integer arithmetic stays integral so quantities render
/// without a decimal part.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    Int(i64),
    Float(f64),
}

impl Number {
    pub const ZERO: Number = Number::Int(0);

    pub fn as_f64(self) -> f64 {
        match self {
            Number::Int(v) => v as f64,
            Number::Float(v) => v,
        }
    }

    pub fn add(self, other: Number) -> Number {
        match (self, other) {
            (Number::Int(a), Number::Int(b)) => Number::Int(a.saturating_add(b)),
            (a, b) => Number::Float(a.as_f64() + b.as_f64()),
        }
    }

    pub fn is_float(self) -> bool {
        matches!(self, Number::Float(_))
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::Int(v) => write!(f, "{v}"),
            Number::Float(v) => f.write_str(&format_float(*v)),
        }
    }
}

/// Rounds through decimal formatting, so a tie on an exactly representable
/// value goes to the even digit (`0.25` -> `0.2`).
pub fn round_to(value: f64, digits: usize) -> f64 {
    if !value.is_finite() {
        return value;
    }
    let rounded = format!("{:.*}", digits, value)
        .parse::<f64>()
        .unwrap_or(value);
    if rounded == 0.0 { 0.0 } else { rounded }
}

/// Integral floats keep one decimal (`25.0`), others print their shortest form.
pub fn format_float(value: f64) -> String {
    let value = if value == 0.0 { 0.0 } else { value };
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{value:.1}")
    } else {
        format!("{value}")
    }
}

/// Leading numeric part of a rendered cell (`"12+?"` -> `12`).
pub fn numeric_prefix(text: &str) -> Option<f64> {
    let end = text
        .char_indices()
        .find(|&(i, c)| !(c.is_ascii_digit() || c == '.' || (i == 0 && c == '-')))
        .map(|(i, _)| i)
        .unwrap_or(text.len());
    text[..end].parse().ok()
}

/// Finished report: one row per sample, one column per emitted column.
/// `None` cells are empty values (a computed column that could not be evaluated).
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Report {
    pub row_headers: Vec<String>,
    pub column_headers: Vec<String>,
    pub values: Vec<Vec<Option<String>>>,
    /// Column count after each non-empty column group.
    pub splits: Vec<usize>,
}

impl Report {
    pub fn n_rows(&self) -> usize {
        self.row_headers.len()
    }

    pub fn n_cols(&self) -> usize {
        self.column_headers.len()
    }

    pub fn value(&self, row: usize, col: usize) -> Option<&str> {
        self.values
            .get(row)
            .and_then(|r| r.get(col))
            .and_then(|v| v.as_deref())
    }

    /// Column headers of each group, split at the group boundaries.
    pub fn column_groups(&self) -> Vec<&[String]> {
        let mut groups = Vec::with_capacity(self.splits.len());
        let mut start = 0;
        for &end in &self.splits {
            if end > start && end <= self.column_headers.len() {
                groups.push(&self.column_headers[start..end]);
                start = end;
            }
        }
        groups
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CountingInfo {
    pub id: CountingId,
    pub name: String,
    pub group: Option<String>,
    pub marker: Option<String>,
    pub marker_count: Option<u32>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SettingsInfo {
    pub kind: ReportKind,
    pub occurrence: OccurrenceMode,
    pub view: ViewMode,
    pub reverse_rows: bool,
    pub samples_filter: Option<Vec<String>>,
    pub percentage_group: Option<GroupId>,
    pub column_groups_requested: usize,
}

#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct Counts {
    pub samples: usize,
    pub species: usize,
    pub occurrences: usize,
    pub rows: usize,
    pub columns: usize,
    pub column_groups: usize,
    pub density_entries: usize,
    pub densities_available: usize,
}

/// Everything `summary.json` and `report.txt` describe about a run.
#[derive(Debug, Clone, Serialize)]
pub struct SummaryData {
    pub tool: String,
    pub version: String,
    pub counting: CountingInfo,
    pub settings: SettingsInfo,
    pub counts: Counts,
    pub species_order: Vec<String>,
    pub sample_order: Vec<String>,
    pub column_headers: Vec<String>,
    pub splits: Vec<usize>,
    pub sample_densities: Vec<SampleDensity>,
}

#[cfg(test)]
#[path = "../../tests/src_inline/report/mod.rs"]
mod tests;
