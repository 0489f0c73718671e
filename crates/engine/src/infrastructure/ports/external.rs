//! External collaborator port traits (extraction, memory, world state, text
//! generation).
//!
//! Every collaborator is optional: the composition root injects a null-object
//! implementation when none is supplied, so pipeline code never branches on
//! presence. Collaborator failures are caught at the call site and substituted
//! with that collaborator's documented default.

use async_trait::async_trait;
use serde_json::{Map, Value};

use plyrmind_domain::{Intent, MemoryId};

use super::error::{ExtractionError, LlmError, MemoryError, WorldStateError};

/// Opaque situational context handed through the pipeline unchanged
pub type ContextMap = Map<String, Value>;

// =============================================================================
// Extraction
// =============================================================================

/// Produces candidate intents from raw player text.
///
/// Zero or more extractors may be registered; the orchestrator iterates the
/// list. An empty result is the extractor's failure signal - malformed text
/// must not surface as an error.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ExtractorPort: Send + Sync {
    async fn extract(
        &self,
        text: &str,
        context: &ContextMap,
    ) -> Result<Vec<Intent>, ExtractionError>;
}

// =============================================================================
// Memory
// =============================================================================

/// A past player statement recalled by the memory collaborator
#[derive(Debug, Clone)]
pub struct RelatedStatement {
    pub id: MemoryId,
    pub text: String,
    pub metadata: Map<String, Value>,
}

/// Long-term statement store used for contradiction detection.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MemoryPort: Send + Sync {
    /// Statements semantically related to the current text
    async fn find_related(&self, text: &str) -> Result<Vec<RelatedStatement>, MemoryError>;

    /// Record the current text and its extracted intents
    async fn store(
        &self,
        text: &str,
        intents: &[Intent],
        context: &ContextMap,
    ) -> Result<(), MemoryError>;
}

// =============================================================================
// World State
// =============================================================================

/// Evaluates an intent against simulated world state.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait WorldStatePort: Send + Sync {
    async fn evaluate(
        &self,
        intent: &Intent,
        context: &ContextMap,
    ) -> Result<Map<String, Value>, WorldStateError>;
}

// =============================================================================
// Text Generation
// =============================================================================

/// A text generation request
#[derive(Debug, Clone)]
pub struct TextGenRequest {
    /// The conversation history
    pub messages: Vec<ChatMessage>,
    /// System prompt / context
    pub system_prompt: Option<String>,
    /// Temperature for response generation (0.0 - 2.0)
    pub temperature: Option<f32>,
    /// Maximum tokens to generate
    pub max_tokens: Option<u32>,
}

impl TextGenRequest {
    pub fn new(messages: Vec<ChatMessage>) -> Self {
        Self {
            messages,
            system_prompt: None,
            temperature: None,
            max_tokens: None,
        }
    }

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }

    pub fn with_temperature(mut self, temp: f32) -> Self {
        self.temperature = Some(temp);
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: Option<u32>) -> Self {
        self.max_tokens = max_tokens;
        self
    }
}

/// A message in the conversation
#[derive(Debug, Clone)]
pub struct ChatMessage {
    pub role: MessageRole,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::System,
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageRole {
    System,
    User,
    Assistant,
}

/// A text generation response
#[derive(Debug, Clone)]
pub struct TextGenResponse {
    pub content: String,
}

/// Text-generation collaborator used for external arbitration.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TextGenPort: Send + Sync {
    async fn generate(&self, request: TextGenRequest) -> Result<TextGenResponse, LlmError>;
}
