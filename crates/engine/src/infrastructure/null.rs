//! Null-object collaborator implementations.
//!
//! Used by the composition root whenever a collaborator is not supplied, so
//! pipeline code calls ports unconditionally instead of probing for presence.

use async_trait::async_trait;
use serde_json::{Map, Value};

use plyrmind_domain::Intent;

use crate::infrastructure::ports::{
    ContextMap, LlmError, MemoryError, MemoryPort, RelatedStatement, TextGenPort, TextGenRequest,
    TextGenResponse, WorldStateError, WorldStatePort,
};

/// Memory collaborator that recalls nothing and stores nowhere.
///
/// With this in place no contradiction intents are ever produced.
pub struct NullMemory;

#[async_trait]
impl MemoryPort for NullMemory {
    async fn find_related(&self, _text: &str) -> Result<Vec<RelatedStatement>, MemoryError> {
        Ok(Vec::new())
    }

    async fn store(
        &self,
        _text: &str,
        _intents: &[Intent],
        _context: &ContextMap,
    ) -> Result<(), MemoryError> {
        Ok(())
    }
}

/// World evaluator that considers everything feasible.
pub struct NullWorldState;

/// The verdict attached when no world evaluator is configured or it fails
pub fn default_feasibility() -> Map<String, Value> {
    let mut map = Map::new();
    map.insert("feasible".to_string(), Value::Bool(true));
    map
}

#[async_trait]
impl WorldStatePort for NullWorldState {
    async fn evaluate(
        &self,
        _intent: &Intent,
        _context: &ContextMap,
    ) -> Result<Map<String, Value>, WorldStateError> {
        Ok(default_feasibility())
    }
}

/// Text generation collaborator that is never available.
///
/// Arbitration treats the error like any other collaborator failure and falls
/// back to the heuristic strategy.
pub struct NullTextGen;

#[async_trait]
impl TextGenPort for NullTextGen {
    async fn generate(&self, _request: TextGenRequest) -> Result<TextGenResponse, LlmError> {
        Err(LlmError::Unavailable)
    }
}
