//! World-feasibility adapter - attaches the evaluator's verdict to every
//! intent before arbitration.
//!
//! No judgment of its own: the collaborator's map is attached verbatim.
//! Failure or timeout substitutes the documented default verdict.

use std::sync::Arc;
use std::time::Duration;

use tracing::warn;

use plyrmind_domain::Intent;

use crate::infrastructure::null::default_feasibility;
use crate::infrastructure::ports::{ContextMap, WorldStatePort};

pub struct FeasibilityService {
    world: Arc<dyn WorldStatePort>,
}

impl FeasibilityService {
    pub fn new(world: Arc<dyn WorldStatePort>) -> Self {
        Self { world }
    }

    /// Evaluate each intent and return fresh records with feasibility attached.
    pub async fn attach(
        &self,
        intents: Vec<Intent>,
        context: &ContextMap,
        timeout: Duration,
    ) -> Vec<Intent> {
        let mut evaluated = Vec::with_capacity(intents.len());
        for intent in intents {
            let verdict =
                match tokio::time::timeout(timeout, self.world.evaluate(&intent, context)).await {
                    Ok(Ok(verdict)) => verdict,
                    Ok(Err(err)) => {
                        warn!(intent = %intent.id, error = %err, "world evaluation failed, assuming feasible");
                        default_feasibility()
                    }
                    Err(_) => {
                        warn!(intent = %intent.id, "world evaluation timed out, assuming feasible");
                        default_feasibility()
                    }
                };
            evaluated.push(intent.with_feasibility(verdict));
        }
        evaluated
    }
}
