//! Longitudinal per-player profile: goal strength/consistency and a bounded
//! window of past intent batches.
//!
//! The profile is owned and mutated exclusively by the engine's profile
//! tracker; everything here is pure data manipulation so it can be exercised
//! without the pipeline around it.

use std::collections::{BTreeSet, HashMap, VecDeque};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::analysis::AnalysisResult;
use crate::intent::{Intent, IntentCategory};

/// Added to a trait's consistency when the previous batch carried the same goal
pub const CONSISTENCY_INCREMENT: f32 = 0.1;

/// Traits above this consistency count as established
pub const CONSISTENT_TRAIT_THRESHOLD: f32 = 0.5;

/// Default sliding-window size for past batches
pub const DEFAULT_HISTORY_CAPACITY: usize = 20;

/// Cap on opportunity suggestions
pub const MAX_OPPORTUNITIES: usize = 3;

/// Accumulated weight of one goal subcategory across calls
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct GoalTrait {
    /// Sum of confidences seen for this goal
    pub strength: f32,
    /// Grows when the goal shows up in consecutive batches
    pub consistency: f32,
}

/// A trimmed record of one intent inside a stored batch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchIntent {
    pub category: IntentCategory,
    pub subcategory: String,
    pub confidence: f32,
}

/// One analysis call's worth of intents, as kept in history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntentBatch {
    pub recorded_at: DateTime<Utc>,
    pub intents: Vec<BatchIntent>,
}

impl IntentBatch {
    pub fn from_intents(intents: &[Intent], recorded_at: DateTime<Utc>) -> Self {
        Self {
            recorded_at,
            intents: intents
                .iter()
                .map(|i| BatchIntent {
                    category: i.category,
                    subcategory: i.subcategory.clone(),
                    confidence: i.confidence,
                })
                .collect(),
        }
    }

    fn goal_subcategories(&self) -> BTreeSet<&str> {
        self.intents
            .iter()
            .filter(|i| i.category == IntentCategory::Goal)
            .map(|i| i.subcategory.as_str())
            .collect()
    }
}

/// Bounded ring of past batches with explicit capacity and eviction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchHistory {
    entries: VecDeque<IntentBatch>,
    capacity: usize,
}

impl BatchHistory {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity: capacity.max(1),
        }
    }

    /// Append a batch, evicting the oldest entry once at capacity.
    pub fn push(&mut self, batch: IntentBatch) {
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(batch);
    }

    pub fn last(&self) -> Option<&IntentBatch> {
        self.entries.back()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn iter(&self) -> impl Iterator<Item = &IntentBatch> {
        self.entries.iter()
    }
}

/// A ranked suggestion blending established traits and open conflicts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Opportunity {
    pub description: String,
    pub relevance: f32,
}

/// Per-player longitudinal state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerProfile {
    pub goal_traits: HashMap<String, GoalTrait>,
    history: BatchHistory,
}

impl PlayerProfile {
    pub fn new(history_capacity: usize) -> Self {
        Self {
            goal_traits: HashMap::new(),
            history: BatchHistory::new(history_capacity),
        }
    }

    pub fn history(&self) -> &BatchHistory {
        &self.history
    }

    /// Fold one analysis call's intents into the profile.
    ///
    /// Every goal intent adds its confidence to the trait's strength; a goal
    /// that also appeared in the immediately-previous batch gains consistency.
    pub fn record_batch(&mut self, intents: &[Intent], recorded_at: DateTime<Utc>) {
        let previous_goals: BTreeSet<String> = self
            .history
            .last()
            .map(|batch| {
                batch
                    .goal_subcategories()
                    .into_iter()
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        for intent in intents.iter().filter(|i| i.is_goal()) {
            let entry = self
                .goal_traits
                .entry(intent.subcategory.clone())
                .or_default();
            entry.strength += intent.confidence;
            if previous_goals.contains(&intent.subcategory) {
                entry.consistency += CONSISTENCY_INCREMENT;
            }
        }

        self.history
            .push(IntentBatch::from_intents(intents, recorded_at));
    }

    /// Goal subcategories whose consistency has crossed the threshold.
    pub fn consistent_traits(&self) -> HashMap<String, f32> {
        self.goal_traits
            .iter()
            .filter(|(_, t)| t.consistency > CONSISTENT_TRAIT_THRESHOLD)
            .map(|(k, t)| (k.clone(), t.consistency))
            .collect()
    }

    /// Up to three suggestions blending established traits and open conflicts,
    /// ranked by relevance descending (ties broken by description for
    /// determinism).
    pub fn suggest_opportunities(&self, result: &AnalysisResult) -> Vec<Opportunity> {
        let mut opportunities: Vec<Opportunity> = self
            .consistent_traits()
            .into_iter()
            .map(|(subcategory, consistency)| Opportunity {
                description: format!("Deepen your long-running pursuit of {subcategory}"),
                relevance: consistency,
            })
            .collect();

        for conflict in &result.conflicts {
            let description = conflict
                .resolution_suggestions
                .first()
                .cloned()
                .unwrap_or_else(|| {
                    "Confront the tension pulling you in two directions".to_string()
                });
            opportunities.push(Opportunity {
                description,
                relevance: conflict.severity,
            });
        }

        opportunities.sort_by(|a, b| {
            b.relevance
                .partial_cmp(&a.relevance)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.description.cmp(&b.description))
        });
        opportunities.truncate(MAX_OPPORTUNITIES);
        opportunities
    }
}

/// Per-domain growth multipliers from a result's primary intents.
///
/// Each referenced domain starts at 1.0 and gains `confidence * 0.5` for every
/// primary intent touching it; multiple intents stack additively.
pub fn growth_modifiers(result: &AnalysisResult) -> HashMap<String, f32> {
    let mut modifiers: HashMap<String, f32> = HashMap::new();
    for intent in &result.primary_intents {
        for domain in &intent.domains {
            let modifier = modifiers.entry(domain.clone()).or_insert(1.0);
            *modifier += intent.confidence * 0.5;
        }
    }
    modifiers
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::AnalysisResult;
    use crate::conflict::{ConflictType, IntentConflict};
    use crate::ids::IntentId;

    fn goal(subcategory: &str, confidence: f32) -> Intent {
        Intent::new(IntentCategory::Goal, subcategory).with_confidence(confidence)
    }

    #[test]
    fn test_strength_accumulates_across_batches() {
        let mut profile = PlayerProfile::new(DEFAULT_HISTORY_CAPACITY);
        profile.record_batch(&[goal("combat_mastery", 0.8)], Utc::now());
        profile.record_batch(&[goal("combat_mastery", 0.6)], Utc::now());

        let t = profile
            .goal_traits
            .get("combat_mastery")
            .expect("trait exists");
        assert!((t.strength - 1.4).abs() < 1e-6);
    }

    #[test]
    fn test_consistency_requires_consecutive_batches() {
        let mut profile = PlayerProfile::new(DEFAULT_HISTORY_CAPACITY);
        profile.record_batch(&[goal("exploration", 0.7)], Utc::now());
        // different goal in between breaks the streak for the next call
        profile.record_batch(&[goal("wealth_accumulation", 0.7)], Utc::now());
        profile.record_batch(&[goal("exploration", 0.7)], Utc::now());

        let t = profile.goal_traits.get("exploration").expect("trait exists");
        assert_eq!(t.consistency, 0.0);

        profile.record_batch(&[goal("exploration", 0.7)], Utc::now());
        let t = profile.goal_traits.get("exploration").expect("trait exists");
        assert!((t.consistency - CONSISTENCY_INCREMENT).abs() < 1e-6);
    }

    #[test]
    fn test_history_evicts_oldest_at_capacity() {
        let mut profile = PlayerProfile::new(3);
        for i in 0..5 {
            profile.record_batch(&[goal(&format!("goal_{i}"), 0.5)], Utc::now());
        }
        assert_eq!(profile.history().len(), 3);
        let oldest = profile
            .history()
            .iter()
            .next()
            .expect("history is non-empty");
        assert_eq!(oldest.intents[0].subcategory, "goal_2");
    }

    #[test]
    fn test_consistent_traits_filters_by_threshold() {
        let mut profile = PlayerProfile::new(DEFAULT_HISTORY_CAPACITY);
        profile.goal_traits.insert(
            "combat_mastery".to_string(),
            GoalTrait {
                strength: 3.0,
                consistency: 0.6,
            },
        );
        profile.goal_traits.insert(
            "exploration".to_string(),
            GoalTrait {
                strength: 1.0,
                consistency: 0.5,
            },
        );

        let traits = profile.consistent_traits();
        assert_eq!(traits.len(), 1);
        assert!(traits.contains_key("combat_mastery"));
    }

    #[test]
    fn test_growth_modifiers_stack_additively() {
        let mut result = AnalysisResult::degraded();
        result.primary_intents = vec![
            goal("combat_mastery", 0.8).add_domain("combat"),
            goal("revenge", 0.6).add_domain("combat").add_domain("social"),
        ];

        let modifiers = growth_modifiers(&result);
        assert!((modifiers["combat"] - (1.0 + 0.4 + 0.3)).abs() < 1e-6);
        assert!((modifiers["social"] - 1.3).abs() < 1e-6);
    }

    #[test]
    fn test_opportunities_are_ranked_and_capped() {
        let mut profile = PlayerProfile::new(DEFAULT_HISTORY_CAPACITY);
        for (name, consistency) in [("a", 0.6), ("b", 0.7), ("c", 0.8)] {
            profile.goal_traits.insert(
                name.to_string(),
                GoalTrait {
                    strength: 1.0,
                    consistency,
                },
            );
        }

        let mut result = AnalysisResult::degraded();
        result.conflicts = vec![IntentConflict::new(
            IntentId::new(),
            IntentId::new(),
            ConflictType::ExplicitContradiction,
            0.9,
            vec!["Settle the contradiction first".to_string()],
        )];

        let opportunities = profile.suggest_opportunities(&result);
        assert_eq!(opportunities.len(), MAX_OPPORTUNITIES);
        // highest relevance first: the 0.9 conflict outranks every trait
        assert_eq!(opportunities[0].description, "Settle the contradiction first");
        assert!(opportunities
            .windows(2)
            .all(|w| w[0].relevance >= w[1].relevance));
    }
}
