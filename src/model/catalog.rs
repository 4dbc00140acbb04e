use std::collections::HashMap;

use crate::model::entities::{Group, GroupId, Sample, SampleId, Species, SpeciesId};

/// Id lookups over the records of one dataset.
#[derive(Debug, Clone, Default)]
pub struct Catalog<'a> {
    species: HashMap<SpeciesId, &'a Species>,
    samples: HashMap<SampleId, &'a Sample>,
    groups: HashMap<GroupId, &'a Group>,
}

impl<'a> Catalog<'a> {
    pub fn new(species: &'a [Species], samples: &'a [Sample], groups: &'a [Group]) -> Self {
        Self {
            species: species.iter().map(|s| (s.id, s)).collect(),
            samples: samples.iter().map(|s| (s.id, s)).collect(),
            groups: groups.iter().map(|g| (g.id, g)).collect(),
        }
    }

    pub fn species(&self, id: SpeciesId) -> Option<&'a Species> {
        self.species.get(&id).copied()
    }

    pub fn sample(&self, id: SampleId) -> Option<&'a Sample> {
        self.samples.get(&id).copied()
    }

    pub fn group(&self, id: GroupId) -> Option<&'a Group> {
        self.groups.get(&id).copied()
    }

    pub fn group_of(&self, species_id: SpeciesId) -> Option<GroupId> {
        self.species(species_id).map(|s| s.group_id)
    }
}
