use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use flate2::read::MultiGzDecoder;
use thiserror::Error;

pub mod columns;
pub mod dataset;

use columns::ReportRequest;
use dataset::Dataset;

pub const DATASET_FILE: &str = "counting.json";
pub const REQUEST_FILE: &str = "request.json";

#[derive(Debug, Error)]
pub enum InputError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("missing input: {0}")]
    MissingInput(String),
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

pub fn open_maybe_gz(path: &Path) -> Result<Box<dyn BufRead>, InputError> {
    let file = File::open(path)?;
    if path.extension().is_some_and(|ext| ext == "gz") {
        Ok(Box::new(BufReader::new(MultiGzDecoder::new(file))))
    } else {
        Ok(Box::new(BufReader::new(file)))
    }
}

/// Resolves `input` to a dataset file: either the path itself or
/// `counting.json[.gz]` inside it.
pub fn find_dataset_path(input: &Path) -> Result<PathBuf, InputError> {
    if input.is_file() {
        return Ok(input.to_path_buf());
    }
    if !input.is_dir() {
        return Err(InputError::MissingInput(format!(
            "{} does not exist",
            input.display()
        )));
    }
    let plain = input.join(DATASET_FILE);
    if plain.exists() {
        return Ok(plain);
    }
    let gz = input.join(format!("{DATASET_FILE}.gz"));
    if gz.exists() {
        return Ok(gz);
    }
    Err(InputError::MissingInput(format!(
        "missing {DATASET_FILE} or {DATASET_FILE}.gz in {}",
        input.display()
    )))
}

/// A `request.json` beside the dataset is picked up when no explicit
/// request path is given.
pub fn find_request_path(input: &Path) -> Option<PathBuf> {
    let dir = if input.is_dir() {
        input
    } else {
        input.parent()?
    };
    let candidate = dir.join(REQUEST_FILE);
    candidate.exists().then_some(candidate)
}

pub fn load_dataset(path: &Path) -> Result<Dataset, InputError> {
    let reader = open_maybe_gz(path)?;
    let dataset = Dataset::from_reader(reader)?;
    tracing::info!(
        path = %path.display(),
        samples = dataset.samples.len(),
        species = dataset.species.len(),
        occurrences = dataset.occurrences.len(),
        "loaded counting dataset"
    );
    Ok(dataset)
}

pub fn load_request(path: &Path) -> Result<ReportRequest, InputError> {
    let reader = open_maybe_gz(path)?;
    let request = ReportRequest::from_reader(reader)?;
    tracing::info!(
        path = %path.display(),
        column_groups = request.columns.len(),
        "loaded report request"
    );
    Ok(request)
}

#[cfg(test)]
#[path = "../../tests/src_inline/input/tests.rs"]
mod tests;
