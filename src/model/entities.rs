use serde::{Deserialize, Serialize};

pub type SampleId = u64;
pub type SpeciesId = u64;
pub type GroupId = u64;
pub type CountingId = u64;
pub type SectionId = u64;

/// A rock sample of a stratigraphic section. `rank` is the canonical
/// position of the sample in the section, not its insertion order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub id: SampleId,
    pub name: String,
    pub rank: i64,
    #[serde(default)]
    pub weight: Option<f64>,
    #[serde(default)]
    pub section_id: Option<SectionId>,
}

impl Sample {
    /// Weight usable as a density divisor.
    pub fn positive_weight(&self) -> Option<f64> {
        self.weight.filter(|w| w.is_finite() && *w > 0.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub id: GroupId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Species {
    pub id: SpeciesId,
    pub name: String,
    pub group_id: GroupId,
}

/// A count campaign over one section. Density analysis needs the counted
/// group, the marker species and the marker reference quantity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Counting {
    pub id: CountingId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub group_id: Option<GroupId>,
    #[serde(default)]
    pub marker_id: Option<SpeciesId>,
    #[serde(default)]
    pub marker_count: Option<u32>,
}
