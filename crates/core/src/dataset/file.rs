use crate::dataset::{parse_csv, Dataset, DatasetSource};
use crate::error::AdvisorError;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct FileDatasetSource {
    path: PathBuf,
}

impl FileDatasetSource {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait::async_trait]
impl DatasetSource for FileDatasetSource {
    fn source_name(&self) -> &'static str {
        "file"
    }

    async fn load(&self) -> Result<Dataset, AdvisorError> {
        let path = self.path.clone();
        let dataset = tokio::task::spawn_blocking(move || read_dataset_file(&path))
            .await
            .map_err(|e| AdvisorError::data_unavailable(format!("dataset read task failed: {e}")))??;

        tracing::info!(
            path = %self.path.display(),
            instruments = dataset.len(),
            "loaded instrument dataset"
        );
        Ok(dataset)
    }
}

fn read_dataset_file(path: &Path) -> Result<Dataset, AdvisorError> {
    if !path.exists() {
        return Err(AdvisorError::data_unavailable(format!(
            "file not found: {}",
            path.display()
        )));
    }

    let file = std::fs::File::open(path).map_err(|e| {
        AdvisorError::data_unavailable(format!("cannot open {}: {e}", path.display()))
    })?;
    parse_csv(std::io::BufReader::new(file))
}
