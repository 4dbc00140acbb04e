use clap::ValueEnum;
use serde::Serialize;

use crate::model::entities::GroupId;

/// Which side of the section decides species column order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum OccurrenceMode {
    #[default]
    First,
    Last,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum ReportKind {
    #[default]
    Quantity,
    Density,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum ViewMode {
    #[default]
    Numbers,
    Points,
    Blocks,
    Lines,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ReportSettings {
    pub kind: ReportKind,
    pub occurrence: OccurrenceMode,
    pub reverse_rows: bool,
    /// Sample ids kept as rows, compared as strings. `None` keeps every sample.
    pub samples_ids: Option<Vec<String>>,
    /// Group whose quantities form the percentage denominator. `None` uses all groups.
    pub percentage_group: Option<GroupId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ChartStyle {
    pub font_size: f64,
    pub stroke_width: f64,
}

impl ChartStyle {
    pub fn default_v1() -> Self {
        Self {
            font_size: 12.0,
            stroke_width: 1.0,
        }
    }
}

impl Default for ChartStyle {
    fn default() -> Self {
        Self::default_v1()
    }
}
