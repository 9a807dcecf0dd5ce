use std::sync::Arc;

use sequence::TagRegistry;

use crate::conf::MinerConfig;
use crate::metrics::MinerMetrics;
use crate::pipeline::Pipeline;
use crate::store::MemoryStore;

pub struct MinerState {
    pub registry: Arc<TagRegistry>,
    pub store: Arc<MemoryStore>,
    pub metrics: Arc<MinerMetrics>,
    pub config: MinerConfig,
}

impl MinerState {
    pub fn new(registry: Arc<TagRegistry>, config: MinerConfig) -> Self {
        Self {
            registry,
            store: Arc::new(MemoryStore::new(config.max_examples)),
            metrics: Arc::new(MinerMetrics::new()),
            config,
        }
    }

    pub fn pipeline(&self) -> Pipeline {
        Pipeline::new(
            Arc::clone(&self.registry),
            self.store.clone(),
            Arc::clone(&self.metrics),
            self.config.max_workers,
        )
    }
}

pub type SharedState = Arc<MinerState>;
