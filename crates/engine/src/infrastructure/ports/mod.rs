//! Port traits for infrastructure boundaries.
//!
//! These are the ONLY abstractions in the engine. Everything else is concrete
//! types. Ports exist for:
//! - Intent extraction (the surrounding application's NLP layers)
//! - Long-term memory (vector store or similar)
//! - World-state feasibility evaluation
//! - Text generation (external arbitration)
//! - Clock/Random (for testing)

mod error;
mod external;
mod testing;

pub use error::{ExtractionError, LlmError, MemoryError, WorldStateError};

pub use external::{
    ChatMessage, ContextMap, ExtractorPort, MemoryPort, MessageRole, RelatedStatement,
    TextGenPort, TextGenRequest, TextGenResponse, WorldStatePort,
};

pub use testing::{ClockPort, RandomPort};

#[cfg(test)]
pub use external::{MockExtractorPort, MockMemoryPort, MockTextGenPort, MockWorldStatePort};
#[cfg(test)]
pub use testing::MockClockPort;
