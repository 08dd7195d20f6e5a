use crate::dataset::{Dataset, DatasetSource};
use crate::error::AdvisorError;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Loads the dataset on first use and keeps it.
///
/// Failed loads are not cached; the next `get` tries the source again.
pub struct DatasetCache {
    source: Arc<dyn DatasetSource>,
    cached: RwLock<Option<Arc<Dataset>>>,
}

impl DatasetCache {
    pub fn new(source: Arc<dyn DatasetSource>) -> Self {
        Self {
            source,
            cached: RwLock::new(None),
        }
    }

    pub fn source_name(&self) -> &'static str {
        self.source.source_name()
    }

    pub async fn get(&self) -> Result<Arc<Dataset>, AdvisorError> {
        if let Some(ds) = self.cached.read().await.as_ref() {
            return Ok(Arc::clone(ds));
        }

        let mut slot = self.cached.write().await;
        // Another caller may have loaded while we waited for the lock.
        if let Some(ds) = slot.as_ref() {
            return Ok(Arc::clone(ds));
        }

        let ds = Arc::new(self.source.load().await?);
        *slot = Some(Arc::clone(&ds));
        Ok(ds)
    }

    /// Replaces the cached table with a fresh load. On failure the old table stays.
    pub async fn reload(&self) -> Result<Arc<Dataset>, AdvisorError> {
        let ds = Arc::new(self.source.load().await?);
        *self.cached.write().await = Some(Arc::clone(&ds));
        Ok(ds)
    }

    pub async fn is_loaded(&self) -> bool {
        self.cached.read().await.is_some()
    }
}

impl std::fmt::Debug for DatasetCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatasetCache")
            .field("source", &self.source.source_name())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Instrument;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingSource {
        calls: AtomicUsize,
        fail_first: usize,
    }

    #[async_trait::async_trait]
    impl DatasetSource for CountingSource {
        fn source_name(&self) -> &'static str {
            "counting"
        }

        async fn load(&self) -> Result<Dataset, AdvisorError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            if n < self.fail_first {
                return Err(AdvisorError::data_unavailable("not yet"));
            }
            Ok(Dataset::new(vec![Instrument::new("A", "A", "Tech", 0, n as f64)]))
        }
    }

    fn cache(fail_first: usize) -> (Arc<CountingSource>, DatasetCache) {
        let source = Arc::new(CountingSource {
            calls: AtomicUsize::new(0),
            fail_first,
        });
        let cache = DatasetCache::new(source.clone());
        (source, cache)
    }

    #[tokio::test]
    async fn loads_once() {
        let (source, cache) = cache(0);
        cache.get().await.unwrap();
        cache.get().await.unwrap();
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn failures_are_retried_on_next_get() {
        let (source, cache) = cache(1);
        assert!(cache.get().await.is_err());
        assert!(!cache.is_loaded().await);
        let ds = cache.get().await.unwrap();
        assert_eq!(ds.instruments[0].weight, 1.0);
        assert_eq!(source.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn reload_replaces_the_table() {
        let (_source, cache) = cache(0);
        let first = cache.get().await.unwrap();
        let second = cache.reload().await.unwrap();
        assert_eq!(first.instruments[0].weight, 0.0);
        assert_eq!(second.instruments[0].weight, 1.0);
        assert_eq!(cache.get().await.unwrap().instruments[0].weight, 1.0);
    }
}
