//! Pipeline — fans a batch out to per-service workers and merges the results.

pub mod service;

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;

use sequence::parser::service_id;
use sequence::TagRegistry;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, info};

use crate::error::MinerError;
use crate::metrics::MinerMetrics;
use crate::records::LogRecord;
use crate::store::{BatchResult, PatternStore};

pub use service::process_service;

pub struct Pipeline {
    registry: Arc<TagRegistry>,
    store: Arc<dyn PatternStore>,
    metrics: Arc<MinerMetrics>,
    max_workers: usize,
}

impl Pipeline {
    pub fn new(
        registry: Arc<TagRegistry>,
        store: Arc<dyn PatternStore>,
        metrics: Arc<MinerMetrics>,
        max_workers: usize,
    ) -> Self {
        Self {
            registry,
            store,
            metrics,
            max_workers: max_workers.max(1),
        }
    }

    /// Process one batch. Services run concurrently on blocking workers;
    /// results are saved by this task alone, sorted by service name.
    pub async fn run_batch(&self, records: Vec<LogRecord>) -> Result<Vec<BatchResult>, MinerError> {
        let started = Instant::now();

        let mut groups: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for record in records {
            groups.entry(record.service).or_default().push(record.message);
        }
        debug!(services = groups.len(), "dispatching batch");

        let semaphore = Arc::new(Semaphore::new(self.max_workers));
        let mut workers = JoinSet::new();
        for (service, messages) in groups {
            let stored = self.store.load_patterns(&service_id(&service))?;
            let permit = Arc::clone(&semaphore)
                .acquire_owned()
                .await
                .map_err(|e| MinerError::Worker(e.to_string()))?;
            let registry = Arc::clone(&self.registry);
            workers.spawn_blocking(move || {
                let _permit = permit;
                process_service(registry, service, stored, messages)
            });
        }

        let mut results = Vec::new();
        while let Some(joined) = workers.join_next().await {
            results.push(joined.map_err(|e| MinerError::Worker(e.to_string()))?);
        }
        results.sort_by(|a, b| a.service.cmp(&b.service));

        for result in &results {
            self.store.save_batch(result)?;
            for line in &result.lines {
                match &line.matched {
                    Some(m) => self.metrics.record_matched(m.discovered),
                    None => self.metrics.record_unmatched(),
                }
            }
        }

        let elapsed = started.elapsed();
        self.metrics.record_batch(elapsed.as_nanos() as u64);
        info!(
            "Batch done: {} services, {} lines in {:?}",
            results.len(),
            results.iter().map(|r| r.lines.len()).sum::<usize>(),
            elapsed
        );
        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn pipeline(max_workers: usize) -> (Pipeline, Arc<MemoryStore>, Arc<MinerMetrics>) {
        let store = Arc::new(MemoryStore::new(3));
        let metrics = Arc::new(MinerMetrics::new());
        let pipeline = Pipeline::new(
            Arc::new(TagRegistry::builtin()),
            store.clone(),
            metrics.clone(),
            max_workers,
        );
        (pipeline, store, metrics)
    }

    fn records() -> Vec<LogRecord> {
        vec![
            LogRecord::new("sshd", "Accepted password for alice from 10.0.0.1 port 5022 ssh2"),
            LogRecord::new("cron", "job 7 failed"),
            LogRecord::new("sshd", "Accepted password for bob from 192.168.7.12 port 61000 ssh2"),
            LogRecord::new("cron", "job 9 failed"),
        ]
    }

    #[tokio::test]
    async fn test_batch_groups_by_service() {
        let (pipeline, store, metrics) = pipeline(2);
        let results = pipeline.run_batch(records()).await.unwrap();

        let services: Vec<_> = results.iter().map(|r| r.service.as_str()).collect();
        assert_eq!(services, vec!["cron", "sshd"]);
        assert_eq!(results[1].lines.len(), 2);
        assert_eq!(store.len(), 2);

        let snap = metrics.snapshot();
        assert_eq!(snap.discovered, 4);
        assert_eq!(snap.matched, 0);
        assert_eq!(snap.batches, 1);
    }

    #[tokio::test]
    async fn test_second_batch_uses_stored_patterns() {
        let (pipeline, store, metrics) = pipeline(1);
        pipeline.run_batch(records()).await.unwrap();

        let results = pipeline
            .run_batch(vec![LogRecord::new("cron", "job 12 failed")])
            .await
            .unwrap();
        let (_, m) = results[0].matched().next().unwrap();
        assert!(!m.discovered);
        assert_eq!(m.pattern, "job %integer% failed");

        let stats = store.patterns(&service_id("cron"));
        assert_eq!(stats.len(), 1);
        assert_eq!(stats[0].count, 3);
        assert_eq!(metrics.snapshot().matched, 1);
    }

    #[tokio::test]
    async fn test_empty_batch() {
        let (pipeline, store, _) = pipeline(4);
        let results = pipeline.run_batch(vec![]).await.unwrap();
        assert!(results.is_empty());
        assert!(store.is_empty());
    }
}
