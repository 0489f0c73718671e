//! Error types for the collaborator boundaries.

// =============================================================================
// Error Types
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum ExtractionError {
    #[error("Extractor failed: {0}")]
    Failed(String),
    #[error(transparent)]
    Source(#[from] anyhow::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum MemoryError {
    #[error("Memory lookup failed: {0}")]
    Lookup(String),
    #[error("Memory store failed: {0}")]
    Store(String),
    #[error(transparent)]
    Source(#[from] anyhow::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum WorldStateError {
    #[error("World evaluation failed: {0}")]
    Evaluation(String),
    #[error(transparent)]
    Source(#[from] anyhow::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("LLM request failed: {0}")]
    RequestFailed(String),
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
    #[error("No text generation collaborator configured")]
    Unavailable,
}
