use super::*;
use std::fs::{self, File};
use std::io::Write;
use std::sync::atomic::{AtomicUsize, Ordering};

use flate2::Compression;
use flate2::write::GzEncoder;

use crate::input::columns::ColumnCriteria;
use crate::report::merge::MergeStrategy;

static DIR_COUNTER: AtomicUsize = AtomicUsize::new(0);

fn make_temp_dir() -> PathBuf {
    let mut dir = std::env::temp_dir();
    let id = DIR_COUNTER.fetch_add(1, Ordering::SeqCst);
    dir.push(format!("micropal_input_{}_{}", std::process::id(), id));
    fs::create_dir_all(&dir).unwrap();
    dir
}

const DATASET: &str = r#"{
  "counting": {"id": 1, "name": "Core A", "group_id": 1, "marker_id": 9, "marker_count": 37},
  "groups": [{"id": 1, "name": "Foraminifera"}, {"id": 2, "name": "Markers"}],
  "species": [
    {"id": 3, "name": "G. bulloides", "group_id": 1},
    {"id": 9, "name": "Lycopodium", "group_id": 2}
  ],
  "samples": [{"id": 10, "name": "S-1", "rank": 1, "weight": 4.1234}],
  "occurrences": [
    {"id": 100, "counting_id": 1, "sample_id": 10, "species_id": 3, "quantity": 15, "rank": 1},
    {"id": 101, "counting_id": 1, "sample_id": 10, "species_id": 9, "quantity": 20, "rank": 2},
    {"id": 102, "counting_id": 5, "sample_id": 10, "species_id": 3, "quantity": 1, "rank": 3}
  ]
}"#;

#[test]
fn test_load_dataset_from_directory() {
    let dir = make_temp_dir();
    fs::write(dir.join(DATASET_FILE), DATASET).unwrap();

    let path = find_dataset_path(&dir).unwrap();
    let dataset = load_dataset(&path).unwrap();
    assert_eq!(dataset.counting.marker_count, Some(37));
    assert_eq!(dataset.samples.len(), 1);
    // occurrence 102 belongs to counting 5
    assert_eq!(dataset.occurrences.len(), 2);
    assert!(find_request_path(&dir).is_none());
}

#[test]
fn test_load_dataset_gzip() {
    let dir = make_temp_dir();
    let path = dir.join(format!("{DATASET_FILE}.gz"));
    let mut enc = GzEncoder::new(File::create(&path).unwrap(), Compression::default());
    enc.write_all(DATASET.as_bytes()).unwrap();
    enc.finish().unwrap();

    assert_eq!(find_dataset_path(&dir).unwrap(), path);
    let dataset = load_dataset(&path).unwrap();
    assert_eq!(dataset.species.len(), 2);
}

#[test]
fn test_missing_dataset_reported() {
    let dir = make_temp_dir();
    let err = find_dataset_path(&dir).unwrap_err();
    assert!(matches!(err, InputError::MissingInput(_)));
}

#[test]
fn test_validation_rejects_dangling_references() {
    let dangling = DATASET.replace(r#""species_id": 9, "quantity": 20"#, r#""species_id": 77, "quantity": 20"#);
    let err = Dataset::from_reader(dangling.as_bytes()).unwrap_err();
    assert!(err.to_string().contains("unknown species 77"));

    let bad_group = DATASET.replace(r#""group_id": 1, "marker_id""#, r#""group_id": 42, "marker_id""#);
    let err = Dataset::from_reader(bad_group.as_bytes()).unwrap_err();
    assert!(matches!(err, InputError::InvalidInput(_)));
}

#[test]
fn test_validation_rejects_duplicate_pair() {
    let dup = DATASET.replace(r#""species_id": 9, "quantity": 20"#, r#""species_id": 3, "quantity": 20"#);
    let err = Dataset::from_reader(dup.as_bytes()).unwrap_err();
    assert!(err.to_string().contains("recorded twice"));
}

#[test]
fn test_column_spec_keeps_declaration_order() {
    let json = r#"{
      "columns": {
        "9": {"species_ids": [3, "4"], "merge": "count", "header": "Richness"},
        "1": {"species_ids": {"0": "3"}, "merge": "", "percentages": "1"},
        "5": {"computed": "A/B", "header": "Ratio", "percentages": "0"}
      },
      "samples_ids": [10, "11"],
      "percentages_group_id": "0"
    }"#;
    let request = ReportRequest::from_reader(json.as_bytes()).unwrap();
    let ids: Vec<&str> = request.columns.iter().map(|(id, _)| id).collect();
    assert_eq!(ids, vec!["9", "1", "5"]);

    let (_, first) = request.columns.iter().next().unwrap();
    assert_eq!(first.species_ids, Some(vec!["3".to_string(), "4".to_string()]));
    assert_eq!(first.merge, Some(MergeStrategy::Count));
    assert!(first.allows(4));
    assert!(!first.allows(5));

    let (_, second) = request.columns.iter().nth(1).unwrap();
    assert_eq!(second.merge, None);
    assert!(second.percentages);

    let (_, third) = request.columns.iter().nth(2).unwrap();
    assert_eq!(third.computed.as_deref(), Some("A/B"));
    assert!(!third.percentages);
    assert_eq!(third.species_ids, None);

    assert_eq!(request.samples_ids, Some(vec!["10".to_string(), "11".to_string()]));
    assert_eq!(request.percentages_group_id, None);
}

#[test]
fn test_unknown_merge_strategy_rejected() {
    let json = r#"{"columns": {"1": {"merge": "median"}}}"#;
    assert!(ReportRequest::from_reader(json.as_bytes()).is_err());
}

#[test]
fn test_criteria_without_allow_list_allows_nothing() {
    let criteria = ColumnCriteria::default();
    assert!(!criteria.allows(3));
}

#[test]
fn test_request_beside_dataset_file() {
    let dir = make_temp_dir();
    let data = dir.join(DATASET_FILE);
    fs::write(&data, DATASET).unwrap();
    fs::write(dir.join(REQUEST_FILE), r#"{"percentages_group_id": 2}"#).unwrap();

    let path = find_request_path(&data).unwrap();
    let request = load_request(&path).unwrap();
    assert_eq!(request.percentages_group_id, Some(2));
    assert!(request.columns.is_empty());
}
