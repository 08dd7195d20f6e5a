use crate::config::Settings;
use crate::dataset::{parse_csv, Dataset, DatasetSource};
use crate::error::AdvisorError;
use anyhow::Context;
use std::time::Duration;

const MAX_BACKOFF: Duration = Duration::from_secs(30);

#[derive(Debug, Clone)]
pub struct HttpDatasetSource {
    http: reqwest::Client,
    url: String,
    retries: u32,
}

impl HttpDatasetSource {
    pub fn from_settings(settings: &Settings) -> Result<Self, AdvisorError> {
        let url = settings
            .require_dataset_url()
            .map_err(|e| AdvisorError::data_unavailable(e.to_string()))?;
        Self::new(url, settings.dataset_retries, settings.dataset_timeout)
            .map_err(|e| AdvisorError::data_unavailable(format!("{e:#}")))
    }

    pub fn new(url: impl Into<String>, retries: u32, timeout: Duration) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build dataset http client")?;

        Ok(Self {
            http,
            url: url.into(),
            retries: retries.max(1),
        })
    }

    async fn fetch_once(&self) -> anyhow::Result<Dataset> {
        let res = self
            .http
            .get(&self.url)
            .send()
            .await
            .context("dataset request failed")?;

        let status = res.status();
        let bytes = res
            .bytes()
            .await
            .context("failed to read dataset response")?;

        if !status.is_success() {
            anyhow::bail!("dataset HTTP {status}");
        }

        Ok(parse_csv(&bytes[..])?)
    }
}

#[async_trait::async_trait]
impl DatasetSource for HttpDatasetSource {
    fn source_name(&self) -> &'static str {
        "http_csv"
    }

    async fn load(&self) -> Result<Dataset, AdvisorError> {
        let mut attempt: u32 = 0;
        loop {
            attempt += 1;
            match self.fetch_once().await {
                Ok(dataset) => {
                    tracing::info!(
                        url = %self.url,
                        instruments = dataset.len(),
                        "loaded instrument dataset"
                    );
                    return Ok(dataset);
                }
                Err(err) => {
                    // Malformed content will not fix itself on retry.
                    if attempt >= self.retries || err.downcast_ref::<AdvisorError>().is_some() {
                        return Err(AdvisorError::data_unavailable(format!(
                            "{}: {err:#}",
                            self.url
                        )));
                    }
                    let backoff = backoff_for(attempt);
                    tracing::warn!(attempt, ?backoff, error = %err, "dataset fetch failed; retrying");
                    tokio::time::sleep(backoff).await;
                }
            }
        }
    }
}

/// 1s, 2s, 4s, ... capped at `MAX_BACKOFF`.
fn backoff_for(attempt: u32) -> Duration {
    let secs = 1u64.checked_shl(attempt.saturating_sub(1)).unwrap_or(u64::MAX);
    Duration::from_secs(secs).min(MAX_BACKOFF)
}
