//! Launch-record dataset: loading, validation and manifest.
//!
//! The table is read once, validated row by row, and never mutated again.
//! Any malformed row aborts the load.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeSet;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use crate::error::DataLoadError;

pub const COL_LAUNCH_SITE: &str = "Launch Site";
pub const COL_PAYLOAD: &str = "Payload Mass (kg)";
pub const COL_CLASS: &str = "class";
pub const COL_BOOSTER_CATEGORY: &str = "Booster Version Category";

pub const REQUIRED_COLUMNS: [&str; 4] = [
    COL_LAUNCH_SITE,
    COL_PAYLOAD,
    COL_CLASS,
    COL_BOOSTER_CATEGORY,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Failure,
    Success,
}

impl Outcome {
    /// Accepts `0`/`1` and their float spellings (`0.0`, `1.0`).
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim() {
            "0" => Some(Outcome::Failure),
            "1" => Some(Outcome::Success),
            other => match other.parse::<f64>() {
                Ok(v) if v == 0.0 => Some(Outcome::Failure),
                Ok(v) if v == 1.0 => Some(Outcome::Success),
                _ => None,
            },
        }
    }

    pub fn as_u8(&self) -> u8 {
        match self {
            Outcome::Failure => 0,
            Outcome::Success => 1,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Outcome::Failure => "Failure",
            Outcome::Success => "Success",
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success)
    }
}

/// One launch record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Row {
    pub launch_site: String,
    pub payload_mass_kg: f64,
    pub outcome: Outcome,
    pub booster_version_category: String,
    pub flight_number: Option<String>,
    pub booster_version: Option<String>,
}

impl Row {
    pub fn new(site: &str, payload_mass_kg: f64, outcome: Outcome, category: &str) -> Self {
        Self {
            launch_site: site.to_string(),
            payload_mass_kg,
            outcome,
            booster_version_category: category.to_string(),
            flight_number: None,
            booster_version: None,
        }
    }
}

/// Raw CSV record before validation. Extra columns are ignored.
#[derive(Debug, Deserialize)]
struct RawRecord {
    #[serde(rename = "Launch Site")]
    launch_site: String,
    #[serde(rename = "Payload Mass (kg)")]
    payload: String,
    #[serde(rename = "class")]
    class: String,
    #[serde(rename = "Booster Version Category")]
    booster_version_category: String,
    #[serde(rename = "Flight Number", default)]
    flight_number: Option<String>,
    #[serde(rename = "Booster Version", default)]
    booster_version: Option<String>,
}

impl RawRecord {
    fn validate(self, line: u64) -> Result<Row, DataLoadError> {
        if self.launch_site.trim().is_empty() {
            return Err(DataLoadError::EmptySite { line });
        }
        let outcome = Outcome::parse(&self.class).ok_or_else(|| DataLoadError::InvalidOutcome {
            line,
            value: self.class.clone(),
        })?;
        let payload_mass_kg = parse_payload(&self.payload).ok_or_else(|| {
            DataLoadError::InvalidPayload {
                line,
                value: self.payload.clone(),
            }
        })?;
        Ok(Row {
            launch_site: self.launch_site.trim().to_string(),
            payload_mass_kg,
            outcome,
            booster_version_category: self.booster_version_category.trim().to_string(),
            flight_number: self.flight_number.filter(|s| !s.is_empty()),
            booster_version: self.booster_version.filter(|s| !s.is_empty()),
        })
    }
}

fn parse_payload(raw: &str) -> Option<f64> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite() && *v >= 0.0)
}

/// The immutable launch table plus its payload bounds.
#[derive(Debug, Clone)]
pub struct Dataset {
    rows: Vec<Row>,
    columns: Vec<String>,
    min_payload: f64,
    max_payload: f64,
}

impl Dataset {
    /// Builds a dataset from already-typed rows, enforcing the same
    /// invariants as the CSV loader. `line` in errors is the 1-based row index.
    pub fn from_rows(rows: Vec<Row>) -> Result<Self, DataLoadError> {
        for (idx, row) in rows.iter().enumerate() {
            let line = idx as u64 + 1;
            if row.launch_site.trim().is_empty() {
                return Err(DataLoadError::EmptySite { line });
            }
            if !row.payload_mass_kg.is_finite() || row.payload_mass_kg < 0.0 {
                return Err(DataLoadError::InvalidPayload {
                    line,
                    value: row.payload_mass_kg.to_string(),
                });
            }
        }
        let columns = REQUIRED_COLUMNS.iter().map(|s| s.to_string()).collect();
        Self::with_columns(rows, columns)
    }

    fn with_columns(rows: Vec<Row>, columns: Vec<String>) -> Result<Self, DataLoadError> {
        let (min_payload, max_payload) = payload_bounds(&rows).ok_or(DataLoadError::Empty)?;
        Ok(Self {
            rows,
            columns,
            min_payload,
            max_payload,
        })
    }

    pub fn load(path: &Path) -> Result<Self, DataLoadError> {
        let file = File::open(path).map_err(|source| DataLoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, DataLoadError> {
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(reader);
        let headers = rdr.headers()?.clone();
        let columns: Vec<String> = headers.iter().map(|h| h.to_string()).collect();
        check_required(&columns)?;

        let mut rows = Vec::new();
        for (idx, result) in rdr.records().enumerate() {
            let record = result?;
            let line = record
                .position()
                .map(|p| p.line())
                .unwrap_or(idx as u64 + 2);
            let raw: RawRecord = record.deserialize(Some(&headers))?;
            rows.push(raw.validate(line)?);
        }
        Self::with_columns(rows, columns)
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn min_payload(&self) -> f64 {
        self.min_payload
    }

    pub fn max_payload(&self) -> f64 {
        self.max_payload
    }

    /// Distinct launch sites, alphabetically sorted.
    pub fn sites(&self) -> Vec<String> {
        self.rows
            .iter()
            .map(|r| r.launch_site.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    pub fn contains_site(&self, site: &str) -> bool {
        self.rows.iter().any(|r| r.launch_site == site)
    }

    pub fn success_count(&self) -> usize {
        self.rows.iter().filter(|r| r.outcome.is_success()).count()
    }
}

fn payload_bounds(rows: &[Row]) -> Option<(f64, f64)> {
    let first = rows.first()?.payload_mass_kg;
    Some(rows.iter().fold((first, first), |(lo, hi), r| {
        (lo.min(r.payload_mass_kg), hi.max(r.payload_mass_kg))
    }))
}

fn check_required(columns: &[String]) -> Result<(), DataLoadError> {
    for required in REQUIRED_COLUMNS {
        if !columns.iter().any(|c| c == required) {
            return Err(DataLoadError::MissingColumn {
                column: required.to_string(),
            });
        }
    }
    Ok(())
}

// =============================================================================
// Schema + manifest
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemaReport {
    pub columns: Vec<String>,
    pub required: Vec<String>,
    pub missing: Vec<String>,
    pub ok: bool,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetManifest {
    pub path: String,
    pub hash_sha256: String,
    pub row_count: usize,
    pub columns: Vec<String>,
    pub sites: Vec<String>,
    pub min_payload: f64,
    pub max_payload: f64,
    pub success_count: usize,
    pub generated_at: String,
}

impl DatasetManifest {
    pub fn describe(dataset: &Dataset, path: &Path, hash_sha256: String) -> Self {
        Self {
            path: path.display().to_string(),
            hash_sha256,
            row_count: dataset.len(),
            columns: dataset.columns().to_vec(),
            sites: dataset.sites(),
            min_payload: dataset.min_payload(),
            max_payload: dataset.max_payload(),
            success_count: dataset.success_count(),
            generated_at: crate::logging::ts_now(),
        }
    }
}

/// Loads the dataset and fingerprints its source file in one pass over the path.
pub fn analyze(path: &Path) -> Result<(Dataset, DatasetManifest), DataLoadError> {
    let dataset = Dataset::load(path)?;
    let hash = file_sha256(path)?;
    let manifest = DatasetManifest::describe(&dataset, path, hash);
    Ok((dataset, manifest))
}

pub fn validate_schema(path: &Path) -> Result<SchemaReport, DataLoadError> {
    let columns = read_header(path)?;
    let missing: Vec<String> = REQUIRED_COLUMNS
        .iter()
        .filter(|req| !columns.iter().any(|c| c == *req))
        .map(|s| s.to_string())
        .collect();
    let ok = missing.is_empty();
    let message = if ok {
        "schema ok".to_string()
    } else {
        format!("schema mismatch: missing {:?}", missing)
    };
    Ok(SchemaReport {
        columns,
        required: REQUIRED_COLUMNS.iter().map(|s| s.to_string()).collect(),
        missing,
        ok,
        message,
    })
}

pub fn read_header(path: &Path) -> Result<Vec<String>, DataLoadError> {
    let file = File::open(path).map_err(|source| DataLoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(file);
    Ok(rdr.headers()?.iter().map(|h| h.to_string()).collect())
}

pub fn file_sha256(path: &Path) -> Result<String, DataLoadError> {
    let io_err = |source| DataLoadError::Io {
        path: path.to_path_buf(),
        source,
    };
    let mut file = File::open(path).map_err(io_err)?;
    let mut hasher = Sha256::new();
    let mut buf = [0u8; 8192];
    loop {
        let n = file.read(&mut buf).map_err(io_err)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(hex::encode(hasher.finalize()))
}

pub fn default_manifest_path(dataset_path: &Path) -> PathBuf {
    let mut p = dataset_path.to_path_buf();
    let fname = dataset_path
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or("dataset.csv");
    p.set_file_name(format!("{}.manifest.json", fname));
    p
}
