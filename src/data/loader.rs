use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use log::info;

use super::error::LoadError;
use super::model::Volcano;

/// File name of the dataset shipped with the crate.
pub const DEFAULT_DATASET: &str = "volcano.json";

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Location of the bundled dataset (`data/volcano.json` in the crate root).
pub fn default_dataset_path() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("data")
        .join(DEFAULT_DATASET)
}

/// Load the dataset at `path`, or the bundled one when no path is given.
pub fn load(path: Option<&Path>) -> Result<Vec<Volcano>, LoadError> {
    match path {
        Some(path) => load_file(path),
        None => load_file(&default_dataset_path()),
    }
}

/// Load a dataset from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.json` – `[{ "Name": ..., "Country": ..., "DEATHS": "...", ... }, ...]`
/// * `.csv`  – header row with the same column names as the JSON keys
pub fn load_file(path: &Path) -> Result<Vec<Volcano>, LoadError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let records = match ext.as_str() {
        "json" => {
            let text = read_to_string(path)?;
            from_json_str(&text)?
        }
        "csv" => {
            let file = File::open(path).map_err(|e| io_error(path, e))?;
            from_csv_reader(file)?
        }
        other => return Err(LoadError::UnsupportedFormat(other.to_string())),
    };

    info!("loaded {} volcano records from {}", records.len(), path.display());
    Ok(records)
}

// ---------------------------------------------------------------------------
// JSON
// ---------------------------------------------------------------------------

/// Parse a JSON document whose top level is an array of volcano objects.
pub fn from_json_str(text: &str) -> Result<Vec<Volcano>, LoadError> {
    Ok(serde_json::from_str(text)?)
}

// ---------------------------------------------------------------------------
// CSV
// ---------------------------------------------------------------------------

/// Parse CSV with a header row.  Empty cells behave like empty strings in
/// the JSON form (`Year`, `DEATHS`, `TSU`, `Agent`).
pub fn from_csv_reader<R: Read>(reader: R) -> Result<Vec<Volcano>, LoadError> {
    let mut reader = csv::Reader::from_reader(reader);
    let records = reader
        .deserialize::<Volcano>()
        .collect::<Result<Vec<_>, _>>()?;
    Ok(records)
}

// -- IO helpers --

fn read_to_string(path: &Path) -> Result<String, LoadError> {
    std::fs::read_to_string(path).map_err(|e| io_error(path, e))
}

fn io_error(path: &Path, source: io::Error) -> LoadError {
    if source.kind() == io::ErrorKind::NotFound {
        LoadError::NotFound {
            path: path.to_path_buf(),
        }
    } else {
        LoadError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}
