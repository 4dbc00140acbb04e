use std::collections::{HashMap, HashSet};

use crate::model::settings::OccurrenceMode;
use crate::model::{Catalog, Occurrence, Sample, SampleId, Species, SpeciesId};

/// Samples in rank order, species in discovery order, and the occurrence
/// recorded for every (sample, species) pair. `None` cells are absences,
/// which are not the same thing as a zero quantity.
#[derive(Debug, Clone)]
pub struct Summary<'a> {
    pub samples: Vec<&'a Sample>,
    pub species: Vec<&'a Species>,
    pub matrix: Vec<Vec<Option<&'a Occurrence>>>,
    pub mode: OccurrenceMode,
}

impl<'a> Summary<'a> {
    pub fn n_rows(&self) -> usize {
        self.samples.len()
    }

    pub fn n_cols(&self) -> usize {
        self.species.len()
    }

    pub fn cell(&self, row: usize, col: usize) -> Option<&'a Occurrence> {
        self.matrix.get(row).and_then(|r| r.get(col)).copied().flatten()
    }
}

/// Stable sort by rank; samples sharing a rank keep their input order.
pub fn sort_samples<'a>(samples: &[&'a Sample]) -> Vec<&'a Sample> {
    let mut sorted = samples.to_vec();
    sorted.sort_by_key(|s| s.rank);
    sorted
}

/// Occurrences per sample, each list ordered by entry rank then id.
pub fn occurrences_by_sample(occurrences: &[Occurrence]) -> HashMap<SampleId, Vec<&Occurrence>> {
    let mut by_sample: HashMap<SampleId, Vec<&Occurrence>> = HashMap::new();
    for occ in occurrences {
        by_sample.entry(occ.sample_id).or_default().push(occ);
    }
    for list in by_sample.values_mut() {
        list.sort_by_key(|o| (o.rank, o.id));
    }
    by_sample
}

/// Species in the order they are first met while walking `samples` as given.
pub fn specimens_by_occurrence<'a>(
    samples: &[&'a Sample],
    occurrences: &'a [Occurrence],
    catalog: &Catalog<'a>,
) -> Vec<&'a Species> {
    let by_sample = occurrences_by_sample(occurrences);
    discover_species(samples, &by_sample, catalog)
}

fn discover_species<'a>(
    samples: &[&'a Sample],
    by_sample: &HashMap<SampleId, Vec<&'a Occurrence>>,
    catalog: &Catalog<'a>,
) -> Vec<&'a Species> {
    let mut seen: HashSet<SpeciesId> = HashSet::new();
    let mut out = Vec::new();
    for sample in samples {
        let Some(list) = by_sample.get(&sample.id) else {
            continue;
        };
        for occ in list {
            if seen.contains(&occ.species_id) {
                continue;
            }
            match catalog.species(occ.species_id) {
                Some(species) => {
                    seen.insert(occ.species_id);
                    out.push(species);
                }
                None => tracing::debug!(
                    occurrence = occ.id,
                    species = occ.species_id,
                    "occurrence references a species outside the catalog"
                ),
            }
        }
    }
    out
}

pub fn build_summary<'a>(
    samples: &[&'a Sample],
    occurrences: &'a [Occurrence],
    catalog: &Catalog<'a>,
    mode: OccurrenceMode,
) -> Summary<'a> {
    let ordered = sort_samples(samples);
    let by_sample = occurrences_by_sample(occurrences);

    let species = match mode {
        OccurrenceMode::First => discover_species(&ordered, &by_sample, catalog),
        OccurrenceMode::Last => {
            let reversed: Vec<&Sample> = ordered.iter().rev().copied().collect();
            discover_species(&reversed, &by_sample, catalog)
        }
    };

    let col_of: HashMap<SpeciesId, usize> = species
        .iter()
        .enumerate()
        .map(|(col, s)| (s.id, col))
        .collect();

    let mut matrix = Vec::with_capacity(ordered.len());
    for sample in &ordered {
        let mut row: Vec<Option<&Occurrence>> = vec![None; species.len()];
        if let Some(list) = by_sample.get(&sample.id) {
            for occ in list {
                if let Some(&col) = col_of.get(&occ.species_id) {
                    row[col] = Some(*occ);
                }
            }
        }
        matrix.push(row);
    }

    tracing::debug!(
        samples = ordered.len(),
        species = species.len(),
        ?mode,
        "built occurrence summary"
    );

    Summary {
        samples: ordered,
        species,
        matrix,
        mode,
    }
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/stage1_summary.rs"]
mod tests;
