//! Memory — in-process pattern store with per-pattern statistics.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::Serialize;
use sequence::PatternId;
use tracing::debug;

use super::model::{BatchResult, StoredPattern};
use super::PatternStore;
use crate::error::MinerError;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PatternStats {
    pub id: PatternId,
    pub pattern: String,
    pub tag_offsets: Vec<usize>,
    pub count: u64,
    pub examples: Vec<String>,
    pub first_matched: DateTime<Utc>,
    pub last_matched: DateTime<Utc>,
    pub complexity: f64,
}

#[derive(Debug, Default)]
struct ServicePatterns {
    name: String,
    patterns: Vec<PatternStats>,
    index: HashMap<PatternId, usize>,
}

/// Patterns keyed by service id.
#[derive(Debug)]
pub struct MemoryStore {
    services: DashMap<String, ServicePatterns>,
    max_examples: usize,
}

impl MemoryStore {
    pub fn new(max_examples: usize) -> Self {
        Self {
            services: DashMap::new(),
            max_examples,
        }
    }

    /// Statistics for every pattern of a service, in learning order.
    pub fn patterns(&self, service_id: &str) -> Vec<PatternStats> {
        self.services
            .get(service_id)
            .map(|s| s.patterns.clone())
            .unwrap_or_default()
    }

    /// `(service id, service name)` pairs, sorted by name.
    pub fn services(&self) -> Vec<(String, String)> {
        let mut out: Vec<(String, String)> = self
            .services
            .iter()
            .map(|e| (e.key().clone(), e.value().name.clone()))
            .collect();
        out.sort_by(|a, b| a.1.cmp(&b.1));
        out
    }

    pub fn len(&self) -> usize {
        self.services.iter().map(|e| e.value().patterns.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl PatternStore for MemoryStore {
    fn load_patterns(&self, service_id: &str) -> Result<Vec<StoredPattern>, MinerError> {
        Ok(self
            .services
            .get(service_id)
            .map(|s| {
                s.patterns
                    .iter()
                    .map(|p| StoredPattern {
                        pattern: p.pattern.clone(),
                        tag_offsets: p.tag_offsets.clone(),
                    })
                    .collect()
            })
            .unwrap_or_default())
    }

    fn save_batch(&self, batch: &BatchResult) -> Result<(), MinerError> {
        let now = Utc::now();
        let mut entry = self
            .services
            .entry(batch.service_id.clone())
            .or_insert_with(|| ServicePatterns {
                name: batch.service.clone(),
                ..Default::default()
            });
        let service = entry.value_mut();

        let mut added = 0usize;
        for (message, matched) in batch.matched() {
            let idx = match service.index.get(&matched.id) {
                Some(&idx) => idx,
                None => {
                    service.patterns.push(PatternStats {
                        id: matched.id.clone(),
                        pattern: matched.pattern.clone(),
                        tag_offsets: matched.tag_offsets.clone(),
                        count: 0,
                        examples: Vec::new(),
                        first_matched: now,
                        last_matched: now,
                        complexity: matched.complexity,
                    });
                    let idx = service.patterns.len() - 1;
                    service.index.insert(matched.id.clone(), idx);
                    added += 1;
                    idx
                }
            };
            let stats = &mut service.patterns[idx];
            stats.count += 1;
            stats.last_matched = now;
            if stats.examples.len() < self.max_examples {
                stats.examples.push(message.to_string());
            }
        }

        debug!(service = %batch.service, added, total = service.patterns.len(), "saved batch");
        Ok(())
    }
}
