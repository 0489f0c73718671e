//! PlyrMind domain layer.
//!
//! Core types and invariants for the intent analysis pipeline: the intent
//! record model, the conflict taxonomy, analysis results, the knowledge base
//! and the longitudinal player profile. Pure logic only - no async, no I/O,
//! no randomness; the engine injects those at its boundaries.

pub mod analysis;
pub mod conflict;
pub mod error;
pub mod ids;
pub mod intent;
pub mod knowledge;
pub mod profile;

pub use analysis::{
    AnalysisResult, Arbitration, ArbitrationStrategy, EmotionalState, Intervention,
    ParalysisResponse, ParalysisSeverity, Resolution, ANALYSIS_CONFIDENCE_RANGE,
    MAX_CLARIFICATIONS, MAX_PLAYER_OPTIONS, OVERALL_CONFIDENCE_RANGE,
};
pub use conflict::{
    ConflictType, IntentConflict, HIGH_SEVERITY_THRESHOLD, MAX_RESOLUTION_SUGGESTIONS,
};
pub use error::DomainError;
pub use ids::{IntentId, MemoryId};
pub use intent::{
    ConflictRef, FeasibilityMap, Intent, IntentCategory, Timeline, DEFAULT_PRIORITY,
};
pub use knowledge::{
    default_knowledge_base, ConflictPattern, GoalEntry, KnowledgeBase, PatternCue, StanceEntry,
};
pub use profile::{
    growth_modifiers, BatchHistory, BatchIntent, GoalTrait, IntentBatch, Opportunity,
    PlayerProfile, CONSISTENCY_INCREMENT, CONSISTENT_TRAIT_THRESHOLD, DEFAULT_HISTORY_CAPACITY,
    MAX_OPPORTUNITIES,
};
