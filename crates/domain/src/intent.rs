//! Intent entity - a candidate interpretation of player input
//!
//! Intents are produced by external extraction collaborators (or synthesized
//! by the pipeline itself, e.g. contradiction intents) and flow through the
//! analysis pipeline unchanged. The pipeline never mutates an intent; the one
//! apparent exception, feasibility attachment, constructs a fresh record.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::ids::{IntentId, MemoryId};

/// What kind of thing the player is expressing
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntentCategory {
    /// Something the player wants to achieve
    Goal,
    /// How the player wants to go about it
    Approach,
    /// A principle the player wants respected
    Value,
    /// A limit the player places on acceptable outcomes
    Constraint,
    /// A stance toward another character
    Relationship,
    /// When the player wants something to happen
    Timeline,
    /// An expressed feeling rather than a plan
    EmotionalState,
    /// The player signalling they cannot decide
    Hesitation,
    /// A statement at odds with something said before
    Contradiction,
    /// An inferred, unstated undercurrent
    Subconscious,
}

/// Horizon on which an intent is meant to play out
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Timeline {
    Immediate,
    #[default]
    ShortTerm,
    LongTerm,
}

/// Reference to the thing an intent is in tension with
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictRef {
    /// Another intent in the same batch
    Intent(IntentId),
    /// A statement recalled from the memory collaborator
    Memory(MemoryId),
}

/// Opaque feasibility verdict attached by the world-state evaluator
pub type FeasibilityMap = Map<String, Value>;

/// A single candidate interpretation of player input
///
/// Ranges are enforced at construction: `confidence` and `emotional_weight`
/// live in [0.0, 1.0], `priority` in [1, 5]. Collaborator output that bypassed
/// the builders is clamped at ingestion via [`Intent::normalized`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Intent {
    pub id: IntentId,
    pub category: IntentCategory,
    /// Taxonomy key, e.g. "combat_mastery"
    pub subcategory: String,
    /// Extractor confidence in this reading (0.0 - 1.0)
    pub confidence: f32,
    /// The span of player text that produced this intent
    pub source_text: String,
    /// Gameplay domains this intent touches (e.g. "combat", "social")
    pub domains: BTreeSet<String>,
    pub timeline: Timeline,
    /// Declared importance (1 = incidental, 5 = defining)
    pub priority: u8,
    /// Emotional charge carried by the phrasing (0.0 - 1.0)
    pub emotional_weight: f32,
    pub created_at: DateTime<Utc>,
    /// Free-form situational tags supplied by the extractor
    pub context_tags: BTreeSet<String>,
    /// Intents or memories this one is in tension with
    pub conflicts_with: BTreeSet<ConflictRef>,
    /// Verdict from the world-state evaluator, absent until attached
    pub feasibility: Option<FeasibilityMap>,
}

pub const DEFAULT_PRIORITY: u8 = 3;

impl Intent {
    pub fn new(category: IntentCategory, subcategory: impl Into<String>) -> Self {
        Self {
            id: IntentId::new(),
            category,
            subcategory: subcategory.into(),
            confidence: 0.5,
            source_text: String::new(),
            domains: BTreeSet::new(),
            timeline: Timeline::default(),
            priority: DEFAULT_PRIORITY,
            emotional_weight: 0.0,
            created_at: Utc::now(),
            context_tags: BTreeSet::new(),
            conflicts_with: BTreeSet::new(),
            feasibility: None,
        }
    }

    pub fn with_confidence(mut self, confidence: f32) -> Self {
        self.confidence = confidence.clamp(0.0, 1.0);
        self
    }

    pub fn with_source_text(mut self, text: impl Into<String>) -> Self {
        self.source_text = text.into();
        self
    }

    pub fn with_timeline(mut self, timeline: Timeline) -> Self {
        self.timeline = timeline;
        self
    }

    pub fn with_priority(mut self, priority: u8) -> Self {
        self.priority = priority.clamp(1, 5);
        self
    }

    pub fn with_emotional_weight(mut self, weight: f32) -> Self {
        self.emotional_weight = weight.clamp(0.0, 1.0);
        self
    }

    pub fn with_created_at(mut self, at: DateTime<Utc>) -> Self {
        self.created_at = at;
        self
    }

    pub fn add_domain(mut self, domain: impl Into<String>) -> Self {
        self.domains.insert(domain.into());
        self
    }

    pub fn add_context_tag(mut self, tag: impl Into<String>) -> Self {
        self.context_tags.insert(tag.into());
        self
    }

    pub fn add_conflict_ref(mut self, conflict: ConflictRef) -> Self {
        self.conflicts_with.insert(conflict);
        self
    }

    /// Produce a copy with the feasibility verdict attached.
    ///
    /// Intents are immutable once created; the world-feasibility adapter calls
    /// this to build the post-evaluation record.
    pub fn with_feasibility(mut self, feasibility: FeasibilityMap) -> Self {
        self.feasibility = Some(feasibility);
        self
    }

    /// Clamp all bounded fields back into range.
    ///
    /// Extraction collaborators construct intents directly and may hand back
    /// out-of-range values; those are clamped silently at ingestion rather
    /// than rejected.
    pub fn normalized(mut self) -> Self {
        self.confidence = self.confidence.clamp(0.0, 1.0);
        self.emotional_weight = self.emotional_weight.clamp(0.0, 1.0);
        self.priority = self.priority.clamp(1, 5);
        self
    }

    pub fn is_goal(&self) -> bool {
        self.category == IntentCategory::Goal
    }

    pub fn is_hesitation(&self) -> bool {
        self.category == IntentCategory::Hesitation
    }

    pub fn is_contradiction(&self) -> bool {
        self.category == IntentCategory::Contradiction
    }
}
