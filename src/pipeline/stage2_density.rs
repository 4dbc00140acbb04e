use std::collections::HashMap;

use serde::Serialize;
use thiserror::Error;

use crate::model::{
    Catalog, Counting, GroupId, Occurrence, OccurrenceId, Sample, SampleId, SpeciesId,
};
use crate::pipeline::stage1_summary::occurrences_by_sample;

pub type DensityMap = HashMap<OccurrenceId, f64>;

/// Why a density cannot be computed for a sample. Not a failure: callers
/// treat it as "not computable yet".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DensityUnavailable {
    #[error("sample has no positive weight")]
    MissingSampleWeight,
    #[error("counting has no marker species")]
    MissingMarker,
    #[error("counting has no counted group")]
    MissingCountedGroup,
    #[error("counting has no positive marker count")]
    MissingMarkerCount,
    #[error("sample has no occurrences")]
    NoOccurrences,
    #[error("marker species not counted in sample")]
    MarkerNotCounted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnavailableKind {
    MissingInput,
    MarkerNotCounted,
}

impl DensityUnavailable {
    pub fn kind(self) -> UnavailableKind {
        match self {
            DensityUnavailable::MarkerNotCounted => UnavailableKind::MarkerNotCounted,
            _ => UnavailableKind::MissingInput,
        }
    }
}

/// Everything the density formula needs for one sample, once the gate passed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DensityBasis {
    pub marker: SpeciesId,
    pub counted_group: GroupId,
    pub marker_count: f64,
    pub sample_weight: f64,
    pub marker_total: u64,
}

impl DensityBasis {
    pub fn density(&self, quantity: u64) -> f64 {
        (quantity as f64 / self.marker_total as f64) * (self.marker_count / self.sample_weight)
    }
}

/// Gate shared by every density computation. `occurrences` must already be
/// restricted to the sample.
pub fn can_compute_density(
    sample_weight: Option<f64>,
    marker: Option<SpeciesId>,
    marker_count: Option<u32>,
    counted_group: Option<GroupId>,
    occurrences: &[&Occurrence],
) -> Result<DensityBasis, DensityUnavailable> {
    let sample_weight = sample_weight
        .filter(|w| w.is_finite() && *w > 0.0)
        .ok_or(DensityUnavailable::MissingSampleWeight)?;
    let marker = marker.ok_or(DensityUnavailable::MissingMarker)?;
    let counted_group = counted_group.ok_or(DensityUnavailable::MissingCountedGroup)?;
    let marker_count = marker_count
        .filter(|&c| c > 0)
        .ok_or(DensityUnavailable::MissingMarkerCount)?;
    if occurrences.is_empty() {
        return Err(DensityUnavailable::NoOccurrences);
    }

    let mut counted = false;
    let mut marker_total = 0u64;
    for occ in occurrences.iter().filter(|o| o.species_id == marker) {
        let q = occ.quantity_or_zero();
        counted |= q > 0;
        marker_total += q;
    }
    if !counted {
        return Err(DensityUnavailable::MarkerNotCounted);
    }

    Ok(DensityBasis {
        marker,
        counted_group,
        marker_count: f64::from(marker_count),
        sample_weight,
        marker_total,
    })
}

#[derive(Debug, Clone, Copy)]
pub struct DensityInputs<'a> {
    pub counting: &'a Counting,
    pub catalog: &'a Catalog<'a>,
}

impl DensityInputs<'_> {
    fn gate(&self, sample: &Sample, occurrences: &[&Occurrence]) -> Result<DensityBasis, DensityUnavailable> {
        can_compute_density(
            sample.positive_weight(),
            self.counting.marker_id,
            self.counting.marker_count,
            self.counting.group_id,
            occurrences,
        )
    }

    fn in_group(&self, occ: &Occurrence, group: GroupId) -> bool {
        self.catalog.group_of(occ.species_id) == Some(group)
    }

    fn counted_total(&self, occurrences: &[&Occurrence], group: GroupId) -> u64 {
        occurrences
            .iter()
            .filter(|o| self.in_group(o, group))
            .map(|o| o.quantity_or_zero())
            .sum()
    }
}

/// Specimens of the counted group per unit of sample weight, or `None` when
/// the sample does not qualify.
pub fn group_density(inputs: &DensityInputs<'_>, occurrences: &[Occurrence], sample: &Sample) -> Option<f64> {
    let in_sample: Vec<&Occurrence> = occurrences
        .iter()
        .filter(|o| o.sample_id == sample.id)
        .collect();
    let basis = match inputs.gate(sample, &in_sample) {
        Ok(basis) => basis,
        Err(reason) => {
            tracing::debug!(sample = %sample.name, %reason, "group density not computable");
            return None;
        }
    };
    Some(basis.density(inputs.counted_total(&in_sample, basis.counted_group)))
}

/// Density of every counted-group occurrence in the qualifying samples.
pub fn occurrence_density_map(
    inputs: &DensityInputs<'_>,
    occurrences: &[Occurrence],
    samples: &[&Sample],
) -> DensityMap {
    let by_sample = occurrences_by_sample(occurrences);
    let mut map = DensityMap::new();
    for sample in samples {
        let in_sample = by_sample.get(&sample.id).map(Vec::as_slice).unwrap_or(&[]);
        let basis = match inputs.gate(sample, in_sample) {
            Ok(basis) => basis,
            Err(reason) => {
                tracing::debug!(sample = %sample.name, %reason, "sample skipped in density map");
                continue;
            }
        };
        tracing::debug!(
            sample = %sample.name,
            marker = basis.marker,
            marker_total = basis.marker_total,
            "sample qualifies for densities"
        );
        for occ in in_sample {
            if inputs.in_group(occ, basis.counted_group) {
                map.insert(occ.id, basis.density(occ.quantity_or_zero()));
            }
        }
    }
    tracing::debug!(entries = map.len(), "built occurrence density map");
    map
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SampleDensity {
    pub sample_id: SampleId,
    pub sample: String,
    pub density: Option<f64>,
    pub unavailable: Option<DensityUnavailable>,
}

/// Group density for each sample, with the reason when it is missing.
pub fn sample_densities(
    inputs: &DensityInputs<'_>,
    occurrences: &[Occurrence],
    samples: &[&Sample],
) -> Vec<SampleDensity> {
    let by_sample = occurrences_by_sample(occurrences);
    samples
        .iter()
        .map(|sample| {
            let in_sample = by_sample.get(&sample.id).map(Vec::as_slice).unwrap_or(&[]);
            let (density, unavailable) = match inputs.gate(sample, in_sample) {
                Ok(_) => (group_density(inputs, occurrences, sample), None),
                Err(reason) => (None, Some(reason)),
            };
            SampleDensity {
                sample_id: sample.id,
                sample: sample.name.clone(),
                density,
                unavailable,
            }
        })
        .collect()
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/stage2_density.rs"]
mod tests;
