use super::*;
use crate::model::{Occurrence, OccurrenceStatus, Species};
use crate::report::field::Textizer;

fn species(n: usize) -> Vec<Species> {
    (0..n)
        .map(|i| Species {
            id: i as u64,
            name: format!("sp{i}"),
            group_id: 1,
        })
        .collect()
}

fn occurrences(quantities: &[Option<u32>]) -> Vec<Option<Occurrence>> {
    quantities
        .iter()
        .enumerate()
        .map(|(i, q)| {
            q.map(|q| Occurrence {
                id: i as u64,
                counting_id: 1,
                sample_id: 1,
                species_id: i as u64,
                quantity: Some(q),
                status: OccurrenceStatus::Normal,
                uncertain: false,
                rank: i as i64,
            })
        })
        .collect()
}

fn fields<'a>(species: &'a [Species], occs: &'a [Option<Occurrence>], textizer: Textizer) -> Vec<Field<'a>> {
    species
        .iter()
        .zip(occs)
        .map(|(s, o)| Field::new(s, o.as_ref(), textizer))
        .collect()
}

#[test]
fn test_strategy_names_roundtrip() {
    for s in [
        MergeStrategy::Sum,
        MergeStrategy::Count,
        MergeStrategy::MostAbundant,
        MergeStrategy::SecondMostAbundant,
    ] {
        assert_eq!(MergeStrategy::from_name(s.name()), Some(s));
    }
    assert_eq!(MergeStrategy::from_name("median"), None);
}

#[test]
fn test_sum_and_count_treat_absence_as_zero() {
    let sp = species(4);
    let occs = occurrences(&[Some(3), None, Some(0), Some(9)]);
    let row = fields(&sp, &occs, Textizer::Quantity);
    assert_eq!(MergeStrategy::Sum.reduce(&row), Number::Int(12));
    assert_eq!(MergeStrategy::Count.reduce(&row), Number::Int(3));
}

#[test]
fn test_float_sum_rounded_to_one_decimal() {
    let sp = species(3);
    let occs = occurrences(&[Some(1), Some(1), Some(1)]);
    let row = fields(&sp, &occs, Textizer::Percentage { row_sum: 3 });
    // 33.33 * 3
    assert_eq!(MergeStrategy::Sum.reduce(&row), Number::Float(100.0));
}

#[test]
fn test_most_and_second_most_abundant_with_tie() {
    let sp = species(4);
    let occs = occurrences(&[Some(3), Some(7), Some(7), Some(2)]);
    let row = fields(&sp, &occs, Textizer::Quantity);
    assert_eq!(MergeStrategy::MostAbundant.reduce(&row), Number::Int(7));
    assert_eq!(MergeStrategy::SecondMostAbundant.reduce(&row), Number::Int(7));
}

#[test]
fn test_second_most_abundant_distinct_values() {
    let sp = species(4);
    let occs = occurrences(&[Some(3), Some(9), Some(7), Some(2)]);
    let row = fields(&sp, &occs, Textizer::Quantity);
    assert_eq!(MergeStrategy::SecondMostAbundant.reduce(&row), Number::Int(7));
}

#[test]
fn test_abundance_reductions_on_all_absent_row() {
    let sp = species(3);
    let occs = occurrences(&[None, None, None]);
    let row = fields(&sp, &occs, Textizer::Quantity);
    assert_eq!(MergeStrategy::MostAbundant.reduce(&row), Number::ZERO);
    assert_eq!(MergeStrategy::SecondMostAbundant.reduce(&row), Number::ZERO);
    assert_eq!(MergeStrategy::Count.reduce(&row), Number::ZERO);
}

#[test]
fn test_second_most_abundant_single_field() {
    let sp = species(1);
    let occs = occurrences(&[Some(5)]);
    let row = fields(&sp, &occs, Textizer::Quantity);
    assert_eq!(MergeStrategy::SecondMostAbundant.reduce(&row), Number::ZERO);
}

#[test]
fn test_first_max_prefers_earliest() {
    let values = vec![Number::Int(7), Number::Int(7), Number::Int(1)];
    let (idx, _) = first_max(values.into_iter().enumerate()).unwrap();
    assert_eq!(idx, 0);
}
