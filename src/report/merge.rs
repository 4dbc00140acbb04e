use serde::{Deserialize, Serialize};

use crate::report::field::Field;
use crate::report::{Number, round_to};

/// Collapses the fields of one row into a single value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MergeStrategy {
    Sum,
    Count,
    MostAbundant,
    SecondMostAbundant,
}

impl MergeStrategy {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "sum" => Some(MergeStrategy::Sum),
            "count" => Some(MergeStrategy::Count),
            "most_abundant" => Some(MergeStrategy::MostAbundant),
            "second_most_abundant" => Some(MergeStrategy::SecondMostAbundant),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            MergeStrategy::Sum => "sum",
            MergeStrategy::Count => "count",
            MergeStrategy::MostAbundant => "most_abundant",
            MergeStrategy::SecondMostAbundant => "second_most_abundant",
        }
    }

    pub fn reduce(self, fields: &[Field<'_>]) -> Number {
        match self {
            MergeStrategy::Sum => sum(fields),
            MergeStrategy::Count => Number::Int(fields.iter().filter(|f| !f.is_absent()).count() as i64),
            MergeStrategy::MostAbundant => most_abundant(fields),
            MergeStrategy::SecondMostAbundant => second_most_abundant(fields),
        }
    }
}

fn sum(fields: &[Field<'_>]) -> Number {
    let total = fields.iter().fold(Number::ZERO, |acc, f| acc.add(f.value()));
    if total.is_float() {
        Number::Float(round_to(total.as_f64(), 1))
    } else {
        total
    }
}

/// Index of the largest value; on ties the first one wins.
fn first_max(values: impl Iterator<Item = (usize, Number)>) -> Option<(usize, Number)> {
    let mut best: Option<(usize, Number)> = None;
    for (idx, value) in values {
        match best {
            Some((_, b)) if value.as_f64() <= b.as_f64() => {}
            _ => best = Some((idx, value)),
        }
    }
    best
}

fn most_abundant(fields: &[Field<'_>]) -> Number {
    first_max(fields.iter().map(Field::value).enumerate())
        .map(|(_, v)| v)
        .unwrap_or(Number::ZERO)
}

/// Drops the single field `most_abundant` picked, then takes the maximum
/// of the rest. With tied maxima the result equals the maximum.
fn second_most_abundant(fields: &[Field<'_>]) -> Number {
    let Some((top, _)) = first_max(fields.iter().map(Field::value).enumerate()) else {
        return Number::ZERO;
    };
    let rest = fields
        .iter()
        .map(Field::value)
        .enumerate()
        .filter(|&(idx, _)| idx != top);
    first_max(rest).map(|(_, v)| v).unwrap_or(Number::ZERO)
}

#[cfg(test)]
#[path = "../../tests/src_inline/report/merge.rs"]
mod tests;
