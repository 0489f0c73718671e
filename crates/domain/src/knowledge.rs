//! Knowledge base: goal/approach/value taxonomy and textual conflict patterns.
//!
//! Pure lookup logic, stateless after construction. The taxonomy is authored
//! data: relationships like "these two goals exclude each other" or "this is a
//! mastery-class goal" are explicit flags set here, never inferred from the
//! subcategory strings at decision time. Keyword matching survives only in the
//! conflict-pattern table, which is a fallback signal source for scanning free
//! text, not an authority for pair scoring.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::intent::{Intent, IntentCategory};

/// Taxonomy entry for a GOAL subcategory
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GoalEntry {
    /// Gameplay domains this goal plays out in
    pub domains: BTreeSet<String>,
    /// Goal subcategories this one excludes
    pub conflicting_goals: BTreeSet<String>,
    /// Approach subcategories that serve this goal well
    pub supporting_approaches: BTreeSet<String>,
    /// Mastery-class goals compete with each other for finite effort
    pub is_mastery_goal: bool,
}

/// Taxonomy entry for an APPROACH or VALUE subcategory
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StanceEntry {
    /// Subcategories on the other axis this stance collides with
    pub conflicts_with: BTreeSet<String>,
    /// Per-domain weighting applied when this stance is active
    pub domain_modifiers: BTreeMap<String, f32>,
}

/// One positive/negative keyword pairing inside a conflict pattern
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatternCue {
    pub positive: Vec<String>,
    pub negative: Vec<String>,
}

/// A named textual tension, e.g. wanting to fight and wanting peace
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConflictPattern {
    pub name: String,
    pub cues: Vec<PatternCue>,
}

impl ConflictPattern {
    /// True when `a` sits on one side of any cue and `b` on the other.
    ///
    /// Matching is case-insensitive substring containment; this is free-text
    /// scanning, deliberately crude.
    pub fn opposes(&self, a: &str, b: &str) -> bool {
        let a = a.to_lowercase();
        let b = b.to_lowercase();
        self.cues.iter().any(|cue| {
            let hit = |text: &str, words: &[String]| words.iter().any(|w| text.contains(w.as_str()));
            (hit(&a, &cue.positive) && hit(&b, &cue.negative))
                || (hit(&a, &cue.negative) && hit(&b, &cue.positive))
        })
    }
}

/// Score for mutually-exclusive goals
const GOAL_OPPOSITION_SCORE: f32 = 0.9;
/// Score for an approach colliding with a held value
const APPROACH_VALUE_SCORE: f32 = 0.8;

/// The taxonomy and pattern table the conflict detector consults.
#[derive(Debug, Clone, Default)]
pub struct KnowledgeBase {
    goals: BTreeMap<String, GoalEntry>,
    approaches: BTreeMap<String, StanceEntry>,
    values: BTreeMap<String, StanceEntry>,
    patterns: Vec<ConflictPattern>,
}

impl KnowledgeBase {
    /// An empty knowledge base; callers author entries via the insert methods.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn insert_goal(&mut self, subcategory: impl Into<String>, entry: GoalEntry) -> &mut Self {
        self.goals.insert(subcategory.into(), entry);
        self
    }

    pub fn insert_approach(
        &mut self,
        subcategory: impl Into<String>,
        entry: StanceEntry,
    ) -> &mut Self {
        self.approaches.insert(subcategory.into(), entry);
        self
    }

    pub fn insert_value(&mut self, subcategory: impl Into<String>, entry: StanceEntry) -> &mut Self {
        self.values.insert(subcategory.into(), entry);
        self
    }

    pub fn insert_pattern(&mut self, pattern: ConflictPattern) -> &mut Self {
        self.patterns.push(pattern);
        self
    }

    pub fn goal(&self, subcategory: &str) -> Option<&GoalEntry> {
        self.goals.get(subcategory)
    }

    pub fn approach(&self, subcategory: &str) -> Option<&StanceEntry> {
        self.approaches.get(subcategory)
    }

    pub fn value(&self, subcategory: &str) -> Option<&StanceEntry> {
        self.values.get(subcategory)
    }

    pub fn patterns(&self) -> &[ConflictPattern] {
        &self.patterns
    }

    /// Taxonomy-driven conflict score between two intents.
    ///
    /// 0.9 when both are goals and either lists the other among its
    /// `conflicting_goals`; 0.8 when an approach collides with a held value;
    /// 0.0 otherwise.
    pub fn taxonomy_conflict_score(&self, a: &Intent, b: &Intent) -> f32 {
        use IntentCategory::{Approach, Goal, Value};
        match (a.category, b.category) {
            (Goal, Goal) => {
                let listed = |x: &Intent, y: &Intent| {
                    self.goal(&x.subcategory)
                        .is_some_and(|e| e.conflicting_goals.contains(&y.subcategory))
                };
                if listed(a, b) || listed(b, a) {
                    GOAL_OPPOSITION_SCORE
                } else {
                    0.0
                }
            }
            (Approach, Value) => self.approach_value_score(a, b),
            (Value, Approach) => self.approach_value_score(b, a),
            _ => 0.0,
        }
    }

    fn approach_value_score(&self, approach: &Intent, value: &Intent) -> f32 {
        let collides = self
            .approach(&approach.subcategory)
            .is_some_and(|e| e.conflicts_with.contains(&value.subcategory));
        if collides {
            APPROACH_VALUE_SCORE
        } else {
            0.0
        }
    }

    /// True when two distinct goals both carry the mastery flag.
    pub fn resource_competition(&self, a: &Intent, b: &Intent) -> bool {
        a.is_goal()
            && b.is_goal()
            && a.subcategory != b.subcategory
            && self.goal(&a.subcategory).is_some_and(|e| e.is_mastery_goal)
            && self.goal(&b.subcategory).is_some_and(|e| e.is_mastery_goal)
    }

    /// Fixed resolution templates keyed by the category pair, order-independent.
    pub fn resolution_suggestions(&self, a: IntentCategory, b: IntentCategory) -> Vec<String> {
        use IntentCategory::{Approach, Goal, Value};
        let pair = if (a as u8) <= (b as u8) { (a, b) } else { (b, a) };
        let suggestions: &[&str] = match pair {
            (Goal, Goal) => &[
                "Pick one goal to pursue first and shelve the other for now",
                "Look for a path that moves both ambitions forward",
                "Let the current situation decide which goal matters more",
            ],
            (Goal, Approach) => &[
                "Ask whether this approach actually serves the goal",
                "Consider a different way of getting what you want",
            ],
            (Goal, Value) => &[
                "Weigh what achieving this would cost you in principle",
                "Look for a version of the goal that honors the value",
            ],
            (Approach, Value) => &[
                "This method sits badly with something you hold dear",
                "Find a way of acting that you could stand behind afterwards",
            ],
            _ => &[
                "Take a moment to sort out which impulse is really yours",
                "Voice both sides aloud and see which rings true",
            ],
        };
        suggestions.iter().map(|s| s.to_string()).collect()
    }
}

/// The default game-flavored taxonomy.
///
/// Enough authored data to exercise every conflict rule; real deployments
/// author their own via the insert methods.
pub fn default_knowledge_base() -> KnowledgeBase {
    let mut kb = KnowledgeBase::empty();

    let goal = |domains: &[&str], conflicting: &[&str], supporting: &[&str], mastery: bool| {
        GoalEntry {
            domains: domains.iter().map(|s| s.to_string()).collect(),
            conflicting_goals: conflicting.iter().map(|s| s.to_string()).collect(),
            supporting_approaches: supporting.iter().map(|s| s.to_string()).collect(),
            is_mastery_goal: mastery,
        }
    };
    let stance = |conflicts: &[&str], modifiers: &[(&str, f32)]| StanceEntry {
        conflicts_with: conflicts.iter().map(|s| s.to_string()).collect(),
        domain_modifiers: modifiers
            .iter()
            .map(|(d, m)| (d.to_string(), *m))
            .collect(),
    };

    kb.insert_goal(
        "combat_mastery",
        goal(&["combat"], &[], &["aggressive", "disciplined"], true),
    );
    kb.insert_goal(
        "magic_mastery",
        goal(&["arcana"], &[], &["disciplined"], true),
    );
    kb.insert_goal(
        "stealth_mastery",
        goal(&["infiltration"], &[], &["cautious", "deceptive"], true),
    );
    kb.insert_goal(
        "social_influence",
        goal(
            &["social"],
            &["solitary_wandering"],
            &["diplomatic", "deceptive"],
            false,
        ),
    );
    kb.insert_goal(
        "solitary_wandering",
        goal(&["exploration"], &["social_influence"], &["cautious"], false),
    );
    kb.insert_goal(
        "wealth_accumulation",
        goal(&["trade"], &["ascetic_life"], &["deceptive"], false),
    );
    kb.insert_goal(
        "ascetic_life",
        goal(&["faith"], &["wealth_accumulation"], &["disciplined"], false),
    );
    kb.insert_goal(
        "revenge",
        goal(&["combat", "social"], &["redemption"], &["aggressive"], false),
    );
    kb.insert_goal(
        "redemption",
        goal(&["faith", "social"], &["revenge"], &["diplomatic"], false),
    );
    kb.insert_goal("exploration", goal(&["exploration"], &[], &["cautious"], false));

    kb.insert_approach("aggressive", stance(&["mercy"], &[("combat", 1.2)]));
    kb.insert_approach("deceptive", stance(&["honor"], &[("social", 1.1)]));
    kb.insert_approach("diplomatic", stance(&[], &[("social", 1.2)]));
    kb.insert_approach("cautious", stance(&[], &[("exploration", 1.1)]));
    kb.insert_approach("disciplined", stance(&[], &[]));

    kb.insert_value("honor", stance(&["deceptive"], &[]));
    kb.insert_value("mercy", stance(&["aggressive"], &[]));
    kb.insert_value("protection", stance(&[], &[("combat", 1.1)]));
    kb.insert_value("freedom", stance(&[], &[]));
    kb.insert_value("loyalty", stance(&[], &[("social", 1.1)]));

    let pattern = |name: &str, cues: &[(&[&str], &[&str])]| ConflictPattern {
        name: name.to_string(),
        cues: cues
            .iter()
            .map(|(pos, neg)| PatternCue {
                positive: pos.iter().map(|s| s.to_string()).collect(),
                negative: neg.iter().map(|s| s.to_string()).collect(),
            })
            .collect(),
    };

    kb.insert_pattern(pattern(
        "violence_stance",
        &[(
            &["fight", "attack", "kill", "strike"],
            &["peace", "spare", "mercy", "talk it out"],
        )],
    ));
    kb.insert_pattern(pattern(
        "trust_stance",
        &[(
            &["trust", "ally with", "befriend"],
            &["betray", "suspect", "never trust"],
        )],
    ));
    kb.insert_pattern(pattern(
        "commitment_stance",
        &[(
            &["stay", "remain", "settle"],
            &["leave", "abandon", "move on"],
        )],
    ));

    kb
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intent::Intent;

    fn goal_intent(subcategory: &str) -> Intent {
        Intent::new(IntentCategory::Goal, subcategory)
    }

    #[test]
    fn test_mutual_conflicting_goals_score() {
        let kb = default_knowledge_base();
        let a = goal_intent("revenge");
        let b = goal_intent("redemption");
        assert_eq!(kb.taxonomy_conflict_score(&a, &b), 0.9);
        assert_eq!(kb.taxonomy_conflict_score(&b, &a), 0.9);
    }

    #[test]
    fn test_one_sided_listing_still_scores() {
        let mut kb = KnowledgeBase::empty();
        kb.insert_goal(
            "a",
            GoalEntry {
                conflicting_goals: ["b".to_string()].into_iter().collect(),
                ..GoalEntry::default()
            },
        );
        kb.insert_goal("b", GoalEntry::default());
        assert_eq!(
            kb.taxonomy_conflict_score(&goal_intent("b"), &goal_intent("a")),
            0.9
        );
    }

    #[test]
    fn test_approach_value_collision() {
        let kb = default_knowledge_base();
        let approach = Intent::new(IntentCategory::Approach, "deceptive");
        let value = Intent::new(IntentCategory::Value, "honor");
        assert_eq!(kb.taxonomy_conflict_score(&approach, &value), 0.8);
        assert_eq!(kb.taxonomy_conflict_score(&value, &approach), 0.8);
    }

    #[test]
    fn test_unrelated_pair_scores_zero() {
        let kb = default_knowledge_base();
        let a = goal_intent("combat_mastery");
        let b = Intent::new(IntentCategory::Value, "protection");
        assert_eq!(kb.taxonomy_conflict_score(&a, &b), 0.0);
    }

    #[test]
    fn test_resource_competition_requires_mastery_flags() {
        let kb = default_knowledge_base();
        assert!(kb.resource_competition(
            &goal_intent("combat_mastery"),
            &goal_intent("magic_mastery")
        ));
        // same subcategory is not competition
        assert!(!kb.resource_competition(
            &goal_intent("combat_mastery"),
            &goal_intent("combat_mastery")
        ));
        // non-mastery goal does not compete
        assert!(!kb.resource_competition(
            &goal_intent("combat_mastery"),
            &goal_intent("exploration")
        ));
    }

    #[test]
    fn test_resolution_suggestions_are_order_independent() {
        let kb = default_knowledge_base();
        let forward =
            kb.resolution_suggestions(IntentCategory::Goal, IntentCategory::Value);
        let backward =
            kb.resolution_suggestions(IntentCategory::Value, IntentCategory::Goal);
        assert_eq!(forward, backward);
        assert!(!forward.is_empty());
    }

    #[test]
    fn test_pattern_opposition_is_symmetric() {
        let kb = default_knowledge_base();
        let pattern = kb
            .patterns()
            .iter()
            .find(|p| p.name == "violence_stance")
            .expect("default table carries violence_stance");
        assert!(pattern.opposes("I will attack the guard", "we should spare him"));
        assert!(pattern.opposes("we should spare him", "I will attack the guard"));
        assert!(!pattern.opposes("I will attack the guard", "I will strike first"));
    }
}
