//! Conflict detection - pairwise scan over the merged intent list.
//!
//! Every unordered pair is evaluated against a fixed rule precedence; a pair
//! yields at most one conflict record. O(n^2) over the batch, which stays
//! single-digit per call. Output order follows input pair order so identical
//! input produces identical results.

use std::sync::Arc;

use tracing::debug;

use plyrmind_domain::{
    ConflictType, Intent, IntentConflict, KnowledgeBase,
};

/// Confidence above which a non-hesitant intent clashes with hesitation
const CONFIDENT_INTENT_THRESHOLD: f32 = 0.7;

const RESOURCE_COMPETITION_SEVERITY: f32 = 0.6;
const EXPLICIT_CONTRADICTION_SEVERITY: f32 = 0.9;
const CONFIDENCE_CONFLICT_SEVERITY: f32 = 0.5;

const RESOURCE_COMPETITION_SUGGESTIONS: [&str; 2] = [
    "Decide which mastery deserves your hours first",
    "Accept slower progress on both paths",
];

const EXPLICIT_CONTRADICTION_SUGGESTIONS: [&str; 2] = [
    "Revisit what you said before and pick a side",
    "Acknowledge that something has changed for you",
];

const CONFIDENCE_CONFLICT_SUGGESTIONS: [&str; 2] = [
    "Name what is making you hesitate",
    "Commit to the confident impulse and see how it feels",
];

/// Detects tensions between pairs of intents using the knowledge base plus
/// structural rules.
pub struct ConflictDetector {
    kb: Arc<KnowledgeBase>,
}

impl ConflictDetector {
    pub fn new(kb: Arc<KnowledgeBase>) -> Self {
        Self { kb }
    }

    /// Scan the batch and report every conflicting pair, in input pair order.
    pub fn detect(&self, intents: &[Intent]) -> Vec<IntentConflict> {
        let mut conflicts = Vec::new();
        for i in 0..intents.len() {
            for j in (i + 1)..intents.len() {
                if let Some(conflict) = self.evaluate_pair(&intents[i], &intents[j]) {
                    conflicts.push(conflict);
                }
            }
        }
        debug!(
            intents = intents.len(),
            conflicts = conflicts.len(),
            "conflict scan complete"
        );
        conflicts
    }

    /// First matching rule wins; a pair yields at most one conflict.
    fn evaluate_pair(&self, a: &Intent, b: &Intent) -> Option<IntentConflict> {
        let taxonomy_score = self.kb.taxonomy_conflict_score(a, b);
        if taxonomy_score > 0.0 {
            return Some(IntentConflict::new(
                a.id,
                b.id,
                ConflictType::DirectOpposition,
                taxonomy_score,
                self.kb.resolution_suggestions(a.category, b.category),
            ));
        }

        if self.kb.resource_competition(a, b) {
            return Some(IntentConflict::new(
                a.id,
                b.id,
                ConflictType::ResourceCompetition,
                RESOURCE_COMPETITION_SEVERITY,
                fixed_suggestions(&RESOURCE_COMPETITION_SUGGESTIONS),
            ));
        }

        if a.is_contradiction() || b.is_contradiction() {
            return Some(IntentConflict::new(
                a.id,
                b.id,
                ConflictType::ExplicitContradiction,
                EXPLICIT_CONTRADICTION_SEVERITY,
                fixed_suggestions(&EXPLICIT_CONTRADICTION_SUGGESTIONS),
            ));
        }

        let hesitation_vs_confident = (a.is_hesitation()
            && !b.is_hesitation()
            && b.confidence > CONFIDENT_INTENT_THRESHOLD)
            || (b.is_hesitation()
                && !a.is_hesitation()
                && a.confidence > CONFIDENT_INTENT_THRESHOLD);
        if hesitation_vs_confident {
            return Some(IntentConflict::new(
                a.id,
                b.id,
                ConflictType::ConfidenceConflict,
                CONFIDENCE_CONFLICT_SEVERITY,
                fixed_suggestions(&CONFIDENCE_CONFLICT_SUGGESTIONS),
            ));
        }

        None
    }
}

fn fixed_suggestions(suggestions: &[&str]) -> Vec<String> {
    suggestions.iter().map(|s| s.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use plyrmind_domain::{default_knowledge_base, IntentCategory};

    use super::*;

    fn detector() -> ConflictDetector {
        ConflictDetector::new(Arc::new(default_knowledge_base()))
    }

    fn goal(subcategory: &str, confidence: f32) -> Intent {
        Intent::new(IntentCategory::Goal, subcategory).with_confidence(confidence)
    }

    #[test]
    fn test_mutually_conflicting_goals_are_direct_opposition() {
        let intents = vec![goal("revenge", 0.8), goal("redemption", 0.7)];
        let conflicts = detector().detect(&intents);

        assert_eq!(conflicts.len(), 1);
        assert_eq!(conflicts[0].conflict_type, ConflictType::DirectOpposition);
        assert_eq!(conflicts[0].severity, 0.9);
        assert_eq!(conflicts[0].a, intents[0].id);
        assert_eq!(conflicts[0].b, intents[1].id);
        assert!(!conflicts[0].resolution_suggestions.is_empty());
    }

    #[test]
    fn test_two_mastery_goals_compete_for_resources() {
        let intents = vec![goal("combat_mastery", 0.8), goal("magic_mastery", 0.8)];
        let conflicts = detector().detect(&intents);

        assert_eq!(conflicts.len(), 1);
        assert_eq!(
            conflicts[0].conflict_type,
            ConflictType::ResourceCompetition
        );
        assert_eq!(conflicts[0].severity, RESOURCE_COMPETITION_SEVERITY);
    }

    #[test]
    fn test_contradiction_intent_conflicts_with_everything() {
        let intents = vec![
            goal("exploration", 0.5),
            Intent::new(IntentCategory::Contradiction, "violence_stance"),
        ];
        let conflicts = detector().detect(&intents);

        assert_eq!(conflicts.len(), 1);
        assert_eq!(
            conflicts[0].conflict_type,
            ConflictType::ExplicitContradiction
        );
        assert_eq!(conflicts[0].severity, EXPLICIT_CONTRADICTION_SEVERITY);
    }

    #[test]
    fn test_hesitation_against_confident_intent() {
        let intents = vec![
            Intent::new(IntentCategory::Hesitation, "unsure").with_confidence(0.4),
            goal("exploration", 0.9),
        ];
        let conflicts = detector().detect(&intents);

        assert_eq!(conflicts.len(), 1);
        assert_eq!(conflicts[0].conflict_type, ConflictType::ConfidenceConflict);
        assert_eq!(conflicts[0].severity, CONFIDENCE_CONFLICT_SEVERITY);
    }

    #[test]
    fn test_hesitation_needs_a_confident_other_side() {
        let intents = vec![
            Intent::new(IntentCategory::Hesitation, "unsure").with_confidence(0.4),
            goal("exploration", 0.6),
        ];
        assert!(detector().detect(&intents).is_empty());
    }

    #[test]
    fn test_two_hesitations_do_not_conflict() {
        let intents = vec![
            Intent::new(IntentCategory::Hesitation, "unsure").with_confidence(0.9),
            Intent::new(IntentCategory::Hesitation, "torn").with_confidence(0.9),
        ];
        assert!(detector().detect(&intents).is_empty());
    }

    #[test]
    fn test_precedence_taxonomy_wins_over_contradiction_rule() {
        // A contradiction-category intent paired with a goal would hit rule 3,
        // but two opposed goals must resolve via rule 1 even when one batch
        // also contains a contradiction elsewhere.
        let intents = vec![
            goal("revenge", 0.8),
            goal("redemption", 0.7),
            Intent::new(IntentCategory::Contradiction, "trust_stance"),
        ];
        let conflicts = detector().detect(&intents);

        assert_eq!(conflicts.len(), 3);
        assert_eq!(conflicts[0].conflict_type, ConflictType::DirectOpposition);
        assert_eq!(
            conflicts[1].conflict_type,
            ConflictType::ExplicitContradiction
        );
        assert_eq!(
            conflicts[2].conflict_type,
            ConflictType::ExplicitContradiction
        );
    }

    #[test]
    fn test_identical_input_yields_identical_output() {
        let intents = vec![
            goal("combat_mastery", 0.8),
            goal("magic_mastery", 0.8),
            Intent::new(IntentCategory::Hesitation, "unsure"),
        ];
        let first = detector().detect(&intents);
        let second = detector().detect(&intents);
        assert_eq!(first, second);
    }

    #[test]
    fn test_unrelated_intents_produce_no_conflicts() {
        let intents = vec![
            goal("combat_mastery", 0.8),
            Intent::new(IntentCategory::Value, "protection").with_confidence(0.85),
        ];
        assert!(detector().detect(&intents).is_empty());
    }
}
