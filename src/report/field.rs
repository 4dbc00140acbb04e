use crate::model::{Occurrence, Species};
use crate::report::{Number, round_to};

/// How a field turns its occurrence into a value and a text.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Textizer {
    /// Raw quantity with status and uncertainty symbols.
    Quantity,
    /// Pre-looked-up density of the occurrence, if any.
    Density(Option<f64>),
    /// Share of the row total, in percent.
    Percentage { row_sum: u64 },
}

/// One report cell before reduction: the occurrence for a (sample, species)
/// pair, or an absence.
#[derive(Debug, Clone, Copy)]
pub struct Field<'a> {
    pub species: &'a Species,
    pub occurrence: Option<&'a Occurrence>,
    pub textizer: Textizer,
}

impl<'a> Field<'a> {
    pub fn new(species: &'a Species, occurrence: Option<&'a Occurrence>, textizer: Textizer) -> Self {
        Self {
            species,
            occurrence,
            textizer,
        }
    }

    pub fn is_absent(&self) -> bool {
        self.occurrence.is_none()
    }

    pub fn quantity(&self) -> u64 {
        self.occurrence.map(Occurrence::quantity_or_zero).unwrap_or(0)
    }

    /// Numeric value used by reductions and formulas; absences count as 0.
    pub fn value(&self) -> Number {
        if self.is_absent() {
            return Number::ZERO;
        }
        match self.textizer {
            Textizer::Quantity => Number::Int(self.quantity() as i64),
            Textizer::Density(None) => Number::ZERO,
            Textizer::Density(Some(d)) => Number::Float(round_to(d, 1)),
            Textizer::Percentage { row_sum: 0 } => Number::ZERO,
            Textizer::Percentage { row_sum } => {
                Number::Float(round_to(100.0 * self.quantity() as f64 / row_sum as f64, 2))
            }
        }
    }

    pub fn text(&self) -> String {
        match (self.textizer, self.occurrence) {
            (_, None) => "0".to_string(),
            (Textizer::Quantity, Some(occ)) => {
                let mut out = occ.quantity.map(|q| q.to_string()).unwrap_or_default();
                out.push_str(occ.status.symbol());
                if occ.uncertain {
                    out.push('?');
                }
                out
            }
            _ => self.value().to_string(),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/src_inline/report/field.rs"]
mod tests;
