use serde::{Deserialize, Serialize};

use crate::model::entities::{CountingId, SampleId, SpeciesId};

pub type OccurrenceId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum OccurrenceStatus {
    #[default]
    Normal,
    OutsideCount,
    Carving,
    Reworking,
}

impl OccurrenceStatus {
    pub fn code(self) -> u8 {
        match self {
            OccurrenceStatus::Normal => 0,
            OccurrenceStatus::OutsideCount => 1,
            OccurrenceStatus::Carving => 2,
            OccurrenceStatus::Reworking => 3,
        }
    }

    /// Suffix appended to a rendered quantity.
    pub fn symbol(self) -> &'static str {
        match self {
            OccurrenceStatus::Normal => "",
            OccurrenceStatus::OutsideCount => "+",
            OccurrenceStatus::Carving => "c",
            OccurrenceStatus::Reworking => "r",
        }
    }
}

impl TryFrom<u8> for OccurrenceStatus {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(OccurrenceStatus::Normal),
            1 => Ok(OccurrenceStatus::OutsideCount),
            2 => Ok(OccurrenceStatus::Carving),
            3 => Ok(OccurrenceStatus::Reworking),
            other => Err(format!("unknown occurrence status code {other}")),
        }
    }
}

impl From<OccurrenceStatus> for u8 {
    fn from(value: OccurrenceStatus) -> Self {
        value.code()
    }
}

/// Specimens of one species observed in one sample of a counting.
///
/// `quantity` is nullable: a recorded occurrence without a count is still
/// distinct from an absent cell. `rank` is the entry order of the species
/// within the sample and only breaks ordering ties.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Occurrence {
    pub id: OccurrenceId,
    pub counting_id: CountingId,
    pub sample_id: SampleId,
    pub species_id: SpeciesId,
    #[serde(default)]
    pub quantity: Option<u32>,
    #[serde(default)]
    pub status: OccurrenceStatus,
    #[serde(default)]
    pub uncertain: bool,
    #[serde(default)]
    pub rank: i64,
}

impl Occurrence {
    pub fn quantity_or_zero(&self) -> u64 {
        self.quantity.map(u64::from).unwrap_or(0)
    }
}
