//! Conflict between two intents, typed and scored by severity.

use serde::{Deserialize, Serialize};

use crate::ids::IntentId;

/// How two intents are in tension
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictType {
    /// The taxonomy lists the two readings as mutually exclusive
    DirectOpposition,
    /// Two mastery-class goals competing for the same finite effort
    ResourceCompetition,
    /// One side is an explicit contradiction of an earlier statement
    ExplicitContradiction,
    /// Hesitation sitting next to a confidently-stated intent
    ConfidenceConflict,
}

/// Severity above which a conflict counts as high-severity for paralysis scoring
pub const HIGH_SEVERITY_THRESHOLD: f32 = 0.7;

/// Cap on resolution suggestions carried per conflict
pub const MAX_RESOLUTION_SUGGESTIONS: usize = 3;

/// A detected tension between exactly two intents.
///
/// `a` and `b` reference the conflicting intents by id and are stored in
/// input order, so identical input yields identical conflict records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntentConflict {
    pub a: IntentId,
    pub b: IntentId,
    pub conflict_type: ConflictType,
    /// How badly the two readings collide (0.0 - 1.0)
    pub severity: f32,
    /// Player-facing ways out, most useful first
    pub resolution_suggestions: Vec<String>,
}

impl IntentConflict {
    pub fn new(
        a: IntentId,
        b: IntentId,
        conflict_type: ConflictType,
        severity: f32,
        mut resolution_suggestions: Vec<String>,
    ) -> Self {
        debug_assert_ne!(a, b, "a conflict must reference two distinct intents");
        resolution_suggestions.truncate(MAX_RESOLUTION_SUGGESTIONS);
        Self {
            a,
            b,
            conflict_type,
            severity: severity.clamp(0.0, 1.0),
            resolution_suggestions,
        }
    }

    pub fn is_high_severity(&self) -> bool {
        self.severity > HIGH_SEVERITY_THRESHOLD
    }

    /// True when this conflict involves the given intent
    pub fn involves(&self, id: IntentId) -> bool {
        self.a == id || self.b == id
    }
}
