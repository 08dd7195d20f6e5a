pub mod cache;
pub mod file;
pub mod http;

pub use cache::DatasetCache;
pub use file::FileDatasetSource;
pub use http::HttpDatasetSource;

use crate::config::Settings;
use crate::domain::Instrument;
use crate::error::AdvisorError;
use std::io::Read;
use std::sync::Arc;

/// The instrument table, read once and treated as immutable.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    pub instruments: Vec<Instrument>,
}

impl Dataset {
    pub fn new(instruments: Vec<Instrument>) -> Self {
        Self { instruments }
    }

    pub fn len(&self) -> usize {
        self.instruments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instruments.is_empty()
    }
}

#[async_trait::async_trait]
pub trait DatasetSource: Send + Sync {
    fn source_name(&self) -> &'static str;

    async fn load(&self) -> Result<Dataset, AdvisorError>;
}

/// Picks the HTTP source when `DATASET_URL` is set, the file source otherwise.
pub fn source_from_settings(settings: &Settings) -> Result<Arc<dyn DatasetSource>, AdvisorError> {
    match settings.dataset_url.as_deref() {
        Some(_) => Ok(Arc::new(HttpDatasetSource::from_settings(settings)?)),
        None => Ok(Arc::new(FileDatasetSource::new(&settings.dataset_path))),
    }
}

const REQUIRED_COLUMNS: [&str; 4] = ["Symbol", "Shortname", "Cluster", "Weight"];

/// Parses the `Symbol, Shortname, Sector, Cluster, Weight` table.
///
/// Columns are matched by header name; extra columns are ignored. A missing
/// column fails the whole table, a row that does not fit the column types
/// (e.g. a blank `Weight`) is skipped.
pub fn parse_csv<R: Read>(reader: R) -> Result<Dataset, AdvisorError> {
    let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);

    let headers = rdr
        .headers()
        .map_err(|e| AdvisorError::data_unavailable(format!("cannot read dataset header: {e}")))?;
    let missing: Vec<&str> = REQUIRED_COLUMNS
        .into_iter()
        .filter(|col| !headers.iter().any(|h| h == *col))
        .collect();
    if !missing.is_empty() {
        return Err(AdvisorError::data_unavailable(format!(
            "dataset is missing columns: {}",
            missing.join(", ")
        )));
    }

    let mut instruments = Vec::new();
    for (idx, row) in rdr.deserialize::<Instrument>().enumerate() {
        // Header is line 1.
        let line = idx + 2;
        match row {
            Ok(row) => instruments.push(row),
            Err(e) if matches!(e.kind(), csv::ErrorKind::Io(_)) => {
                return Err(AdvisorError::data_unavailable(format!(
                    "dataset read failed at row {line}: {e}"
                )));
            }
            Err(e) => {
                tracing::warn!(row = line, error = %e, "skipping unparseable dataset row");
            }
        }
    }

    Ok(Dataset::new(instruments))
}
