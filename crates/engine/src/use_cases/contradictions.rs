//! Contradiction scan - recalled statements vs the current player text.
//!
//! The memory collaborator supplies semantically-related past statements; the
//! knowledge base's conflict-pattern table decides whether one of them and the
//! current text sit on opposite sides of a known tension. Each hit becomes a
//! new Contradiction-category intent referencing the memory; extracted intents
//! are never touched.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use plyrmind_domain::{ConflictRef, Intent, IntentCategory, KnowledgeBase};

use crate::infrastructure::ports::{ClockPort, MemoryPort};

/// Confidence assigned to intents produced by the scan
const CONTRADICTION_CONFIDENCE: f32 = 0.75;

pub struct ContradictionScanner {
    memory: Arc<dyn MemoryPort>,
    kb: Arc<KnowledgeBase>,
    clock: Arc<dyn ClockPort>,
}

impl ContradictionScanner {
    pub fn new(
        memory: Arc<dyn MemoryPort>,
        kb: Arc<KnowledgeBase>,
        clock: Arc<dyn ClockPort>,
    ) -> Self {
        Self { memory, kb, clock }
    }

    /// Produce contradiction intents for the current text.
    ///
    /// Collaborator failure or timeout degrades to no contradictions.
    pub async fn scan(&self, text: &str, timeout: Duration) -> Vec<Intent> {
        let related = match tokio::time::timeout(timeout, self.memory.find_related(text)).await {
            Ok(Ok(related)) => related,
            Ok(Err(err)) => {
                warn!(error = %err, "memory recall failed, skipping contradiction scan");
                return Vec::new();
            }
            Err(_) => {
                warn!("memory recall timed out, skipping contradiction scan");
                return Vec::new();
            }
        };

        let mut contradictions = Vec::new();
        for statement in related {
            // first matching pattern wins; one intent per recalled statement
            let matched = self
                .kb
                .patterns()
                .iter()
                .find(|p| p.opposes(text, &statement.text));
            if let Some(pattern) = matched {
                debug!(
                    pattern = %pattern.name,
                    memory = %statement.id,
                    "recalled statement contradicts current text"
                );
                contradictions.push(
                    Intent::new(IntentCategory::Contradiction, pattern.name.clone())
                        .with_confidence(CONTRADICTION_CONFIDENCE)
                        .with_source_text(statement.text.clone())
                        .with_created_at(self.clock.now())
                        .add_conflict_ref(ConflictRef::Memory(statement.id)),
                );
            }
        }
        contradictions
    }
}
