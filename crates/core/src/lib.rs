pub mod allocation;
pub mod dataset;
pub mod domain;
pub mod error;
pub mod session;

pub use error::AdvisorError;

pub mod config {
    use anyhow::Context;
    use std::time::Duration;

    const DEFAULT_DATASET_PATH: &str = "Hackathon_Processed.csv";
    const DEFAULT_DATASET_RETRIES: u32 = 3;
    const DEFAULT_DATASET_TIMEOUT_SECS: u64 = 30;
    const DEFAULT_SESSION_TTL_SECS: u64 = 3600;

    #[derive(Debug, Clone)]
    pub struct Settings {
        pub dataset_path: String,
        pub dataset_url: Option<String>,
        pub dataset_retries: u32,
        pub dataset_timeout: Duration,
        pub session_ttl: Duration,
        pub sentry_dsn: Option<String>,
    }

    impl Settings {
        pub fn from_env() -> anyhow::Result<Self> {
            Ok(Self {
                dataset_path: std::env::var("DATASET_PATH")
                    .ok()
                    .filter(|s| !s.trim().is_empty())
                    .unwrap_or_else(|| DEFAULT_DATASET_PATH.to_string()),
                dataset_url: std::env::var("DATASET_URL")
                    .ok()
                    .filter(|s| !s.trim().is_empty()),
                dataset_retries: parse_env("DATASET_RETRIES")?.unwrap_or(DEFAULT_DATASET_RETRIES),
                dataset_timeout: Duration::from_secs(
                    parse_env("DATASET_TIMEOUT_SECS")?.unwrap_or(DEFAULT_DATASET_TIMEOUT_SECS),
                ),
                session_ttl: Duration::from_secs(
                    parse_env("SESSION_TTL_SECS")?.unwrap_or(DEFAULT_SESSION_TTL_SECS),
                ),
                sentry_dsn: std::env::var("SENTRY_DSN").ok(),
            })
        }

        pub fn require_dataset_url(&self) -> anyhow::Result<&str> {
            self.dataset_url
                .as_deref()
                .context("DATASET_URL is required")
        }
    }

    fn parse_env<T>(key: &str) -> anyhow::Result<Option<T>>
    where
        T: std::str::FromStr,
        T::Err: std::error::Error + Send + Sync + 'static,
    {
        match std::env::var(key) {
            Ok(s) if !s.trim().is_empty() => {
                let v = s
                    .trim()
                    .parse::<T>()
                    .with_context(|| format!("{key} is not a valid value: {s}"))?;
                Ok(Some(v))
            }
            _ => Ok(None),
        }
    }
}
