use std::collections::HashSet;
use std::hash::Hash;
use std::io::Read;

use serde::{Deserialize, Serialize};

use crate::input::InputError;
use crate::model::{Catalog, Counting, Group, Occurrence, Sample, SampleId, Species, SpeciesId};

/// Fully populated records of one counting, as handed over by the record
/// management layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dataset {
    pub counting: Counting,
    #[serde(default)]
    pub groups: Vec<Group>,
    #[serde(default)]
    pub species: Vec<Species>,
    #[serde(default)]
    pub samples: Vec<Sample>,
    #[serde(default)]
    pub occurrences: Vec<Occurrence>,
}

impl Dataset {
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, InputError> {
        let mut dataset: Dataset = serde_json::from_reader(reader)?;
        dataset.drop_foreign_occurrences();
        dataset.validate()?;
        Ok(dataset)
    }

    pub fn catalog(&self) -> Catalog<'_> {
        Catalog::new(&self.species, &self.samples, &self.groups)
    }

    pub fn sample_refs(&self) -> Vec<&Sample> {
        self.samples.iter().collect()
    }

    fn drop_foreign_occurrences(&mut self) {
        let counting_id = self.counting.id;
        let before = self.occurrences.len();
        self.occurrences.retain(|o| o.counting_id == counting_id);
        let dropped = before - self.occurrences.len();
        if dropped > 0 {
            tracing::warn!(
                dropped,
                counting_id,
                "occurrences belonging to another counting were ignored"
            );
        }
    }

    pub fn validate(&self) -> Result<(), InputError> {
        ensure_unique("group", self.groups.iter().map(|g| g.id))?;
        ensure_unique("species", self.species.iter().map(|s| s.id))?;
        ensure_unique("sample", self.samples.iter().map(|s| s.id))?;
        ensure_unique("occurrence", self.occurrences.iter().map(|o| o.id))?;

        let catalog = self.catalog();

        for sp in &self.species {
            if catalog.group(sp.group_id).is_none() {
                return Err(InputError::InvalidInput(format!(
                    "species {} references unknown group {}",
                    sp.id, sp.group_id
                )));
            }
        }

        if let Some(group_id) = self.counting.group_id.filter(|&id| catalog.group(id).is_none()) {
            return Err(InputError::InvalidInput(format!(
                "counting {} references unknown group {}",
                self.counting.id, group_id
            )));
        }
        if let Some(marker_id) = self.counting.marker_id.filter(|&id| catalog.species(id).is_none()) {
            return Err(InputError::InvalidInput(format!(
                "counting {} references unknown marker species {}",
                self.counting.id, marker_id
            )));
        }

        let mut pairs: HashSet<(SampleId, SpeciesId)> = HashSet::new();
        for occ in &self.occurrences {
            if catalog.sample(occ.sample_id).is_none() {
                return Err(InputError::InvalidInput(format!(
                    "occurrence {} references unknown sample {}",
                    occ.id, occ.sample_id
                )));
            }
            if catalog.species(occ.species_id).is_none() {
                return Err(InputError::InvalidInput(format!(
                    "occurrence {} references unknown species {}",
                    occ.id, occ.species_id
                )));
            }
            if !pairs.insert((occ.sample_id, occ.species_id)) {
                return Err(InputError::InvalidInput(format!(
                    "species {} recorded twice in sample {}",
                    occ.species_id, occ.sample_id
                )));
            }
        }

        Ok(())
    }
}

fn ensure_unique<T>(kind: &str, ids: impl Iterator<Item = T>) -> Result<(), InputError>
where
    T: Eq + Hash + std::fmt::Display,
{
    let mut seen = HashSet::new();
    for id in ids {
        if seen.contains(&id) {
            return Err(InputError::InvalidInput(format!("duplicate {kind} id {id}")));
        }
        seen.insert(id);
    }
    Ok(())
}
