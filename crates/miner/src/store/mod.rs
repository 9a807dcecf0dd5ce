//! Store module — persistence boundary for learned patterns.

pub mod model;
pub mod memory;

pub use memory::{MemoryStore, PatternStats};
pub use model::{BatchResult, LineOutcome, MatchedPattern, StoredPattern};

use crate::error::MinerError;

/// Where learned patterns live between batches.
///
/// `load_patterns` may be called from many tasks at once; `save_batch` is
/// called by a single writer after every group of a batch has finished.
pub trait PatternStore: Send + Sync {
    /// Patterns known for a service, in the order they were first learned.
    fn load_patterns(&self, service_id: &str) -> Result<Vec<StoredPattern>, MinerError>;

    fn save_batch(&self, batch: &BatchResult) -> Result<(), MinerError>;
}
