pub mod catalog;
pub mod entities;
pub mod occurrence;
pub mod settings;

pub use catalog::Catalog;
pub use entities::{Counting, CountingId, Group, GroupId, Sample, SampleId, Species, SpeciesId};
pub use occurrence::{Occurrence, OccurrenceId, OccurrenceStatus};

#[cfg(test)]
#[path = "../../tests/src_inline/model/tests.rs"]
mod tests;
