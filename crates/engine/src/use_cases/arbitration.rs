//! Arbitration - settling on the single dominant intent.
//!
//! Two strategies: a heuristic ranking that is always available, and an
//! external text-generation collaborator consulted only under non-trivial
//! conflict load. The external path returns an explicit Result; the
//! orchestrator performs the fallback decision, so a collaborator failure can
//! never surface to the caller.

use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;
use tracing::{debug, warn};

use plyrmind_domain::{
    Arbitration, ArbitrationStrategy, EmotionalState, Intent, IntentConflict, Resolution,
    MAX_PLAYER_OPTIONS,
};

use crate::infrastructure::ports::{
    ChatMessage, ContextMap, LlmError, TextGenPort, TextGenRequest,
};

/// Dominant confidence above which the heuristic reads as determined
const DETERMINED_CONFIDENCE_THRESHOLD: f32 = 0.7;

/// How many intents and conflicts the external prompt may carry
const PROMPT_INTENT_CAP: usize = 3;
const PROMPT_CONFLICT_CAP: usize = 3;

/// How much serialized situational context the prompt may carry
const PROMPT_CONTEXT_CAP: usize = 500;

const GENERIC_OPTIONS: [&str; 3] = [
    "Take a moment to consider what you really want",
    "Act on your strongest instinct and adjust as you go",
    "Gather more information before committing",
];

const ARBITRATION_SYSTEM_PROMPT: &str = r#"You arbitrate between a player's competing intentions in a narrative game.

Given candidate intents and the tensions between them, pick the single intention the game should act on.

Reply with a JSON object and nothing else, using exactly these keys:
{"dominant_intent": "<subcategory of the winning intent>", "resolution_method": "<one short sentence on how you settled it>", "emotional_state": "determined|uncertain|conflicted", "player_options": ["<up to three short player-facing options>"]}"#;

/// Rank intents by declared priority, then confidence, descending.
///
/// The sort is stable, so equal-ranked intents keep their input order.
pub fn rank_intents(intents: &[Intent]) -> Vec<Intent> {
    let mut ranked = intents.to_vec();
    ranked.sort_by(|a, b| {
        b.priority
            .cmp(&a.priority)
            .then_with(|| b.confidence.partial_cmp(&a.confidence).unwrap_or(std::cmp::Ordering::Equal))
    });
    ranked
}

/// Shape the external collaborator is asked to reply with
#[derive(Debug, Deserialize)]
struct ExternalReply {
    dominant_intent: Option<String>,
    resolution_method: Option<String>,
    emotional_state: Option<String>,
    player_options: Option<Vec<String>>,
}

/// Outcome of one arbitration pass
#[derive(Debug, Clone)]
pub struct ArbitrationOutcome {
    pub arbitration: Arbitration,
    /// The candidate the strategy settled on, if any
    pub dominant: Option<Intent>,
}

pub struct ArbitrationService {
    text_gen: Arc<dyn TextGenPort>,
}

impl ArbitrationService {
    pub fn new(text_gen: Arc<dyn TextGenPort>) -> Self {
        Self { text_gen }
    }

    /// Heuristic strategy: highest-ranked intent wins.
    pub fn heuristic(&self, intents: &[Intent]) -> ArbitrationOutcome {
        let ranked = rank_intents(intents);
        let dominant = ranked.first().cloned();

        let mut options: Vec<String> = ranked
            .iter()
            .filter(|i| i.is_goal())
            .take(MAX_PLAYER_OPTIONS)
            .map(|i| format!("Focus on {}", i.subcategory))
            .collect();
        if options.is_empty() {
            options = GENERIC_OPTIONS.iter().map(|o| o.to_string()).collect();
        }

        let emotional_state = match &dominant {
            Some(intent) if intent.confidence > DETERMINED_CONFIDENCE_THRESHOLD => {
                EmotionalState::Determined
            }
            _ => EmotionalState::Uncertain,
        };

        let resolution = match &dominant {
            Some(intent) => Resolution::DominantIntent { intent: intent.id },
            None => Resolution::NoCandidates,
        };

        ArbitrationOutcome {
            arbitration: Arbitration::new(
                ArbitrationStrategy::Heuristic,
                resolution,
                emotional_state,
                options,
            ),
            dominant,
        }
    }

    /// External strategy: consult the text-generation collaborator.
    ///
    /// Transport failure and timeout surface as `Err` for the orchestrator to
    /// resolve; an unparsable reply is not an error - its raw text is kept as
    /// guidance.
    pub async fn external(
        &self,
        intents: &[Intent],
        conflicts: &[IntentConflict],
        context: &ContextMap,
        timeout: Duration,
    ) -> Result<ArbitrationOutcome, LlmError> {
        let prompt = self.build_prompt(intents, conflicts, context);
        let request = TextGenRequest::new(vec![ChatMessage::user(prompt)])
            .with_system_prompt(ARBITRATION_SYSTEM_PROMPT)
            .with_temperature(0.4)
            .with_max_tokens(Some(400));

        let response = tokio::time::timeout(timeout, self.text_gen.generate(request))
            .await
            .map_err(|_| LlmError::RequestFailed("arbitration timed out".to_string()))??;

        Ok(self.interpret_reply(&response.content, intents))
    }

    fn build_prompt(
        &self,
        intents: &[Intent],
        conflicts: &[IntentConflict],
        context: &ContextMap,
    ) -> String {
        let ranked = rank_intents(intents);
        let mut prompt = String::from("Candidate intents:\n");
        for intent in ranked.iter().take(PROMPT_INTENT_CAP) {
            prompt.push_str(&format!(
                "- [{:?}] {} (confidence {:.2}, priority {})\n",
                intent.category, intent.subcategory, intent.confidence, intent.priority
            ));
        }

        prompt.push_str("\nDetected tensions:\n");
        for conflict in conflicts.iter().take(PROMPT_CONFLICT_CAP) {
            prompt.push_str(&format!(
                "- {:?} (severity {:.2})\n",
                conflict.conflict_type, conflict.severity
            ));
        }

        if !context.is_empty() {
            let mut situation = serde_json::Value::Object(context.clone()).to_string();
            situation.truncate(PROMPT_CONTEXT_CAP);
            prompt.push_str("\nSituation: ");
            prompt.push_str(&situation);
            prompt.push('\n');
        }

        prompt.push_str("\nWhich single intention should the game act on?");
        prompt
    }

    /// Parse the structured reply, degrading to raw guidance when it does not
    /// parse.
    fn interpret_reply(&self, content: &str, intents: &[Intent]) -> ArbitrationOutcome {
        let parsed = extract_json(content)
            .and_then(|json| serde_json::from_str::<ExternalReply>(json).ok());

        let Some(reply) = parsed else {
            warn!("arbitration reply did not parse, keeping raw text as guidance");
            return ArbitrationOutcome {
                arbitration: Arbitration::new(
                    ArbitrationStrategy::External,
                    Resolution::LlmGuidance {
                        guidance: content.trim().to_string(),
                    },
                    EmotionalState::Conflicted,
                    Vec::new(),
                ),
                dominant: None,
            };
        };

        let dominant_name = reply.dominant_intent.unwrap_or_default();
        // match the named goal back to a real candidate where possible
        let dominant = intents
            .iter()
            .find(|i| i.subcategory.eq_ignore_ascii_case(dominant_name.trim()))
            .cloned();
        debug!(
            dominant = %dominant_name,
            matched = dominant.is_some(),
            "external arbitration reply parsed"
        );

        ArbitrationOutcome {
            arbitration: Arbitration::new(
                ArbitrationStrategy::External,
                Resolution::LlmDecision {
                    dominant_intent: dominant_name,
                    resolution_method: reply
                        .resolution_method
                        .unwrap_or_else(|| "external arbitration".to_string()),
                },
                reply
                    .emotional_state
                    .as_deref()
                    .map(EmotionalState::from_reply)
                    .unwrap_or(EmotionalState::Conflicted),
                reply.player_options.unwrap_or_default(),
            ),
            dominant,
        }
    }
}

/// Slice out the first top-level JSON object in a reply.
///
/// Collaborators wrap JSON in prose often enough that strict parsing of the
/// whole reply would throw away usable answers.
fn extract_json(content: &str) -> Option<&str> {
    let start = content.find('{')?;
    let end = content.rfind('}')?;
    (end > start).then(|| &content[start..=end])
}

#[cfg(test)]
mod tests {
    use plyrmind_domain::IntentCategory;

    use crate::infrastructure::null::NullTextGen;
    use crate::infrastructure::ports::{MockTextGenPort, TextGenResponse};

    use super::*;

    fn goal(subcategory: &str, confidence: f32, priority: u8) -> Intent {
        Intent::new(IntentCategory::Goal, subcategory)
            .with_confidence(confidence)
            .with_priority(priority)
    }

    fn service() -> ArbitrationService {
        ArbitrationService::new(Arc::new(NullTextGen))
    }

    #[test]
    fn test_ranking_prefers_priority_then_confidence() {
        let intents = vec![
            goal("a", 0.9, 2),
            goal("b", 0.5, 4),
            goal("c", 0.8, 4),
        ];
        let ranked = rank_intents(&intents);
        assert_eq!(ranked[0].subcategory, "c");
        assert_eq!(ranked[1].subcategory, "b");
        assert_eq!(ranked[2].subcategory, "a");
    }

    #[test]
    fn test_heuristic_picks_top_ranked_intent() {
        let intents = vec![goal("exploration", 0.6, 3), goal("revenge", 0.9, 3)];
        let outcome = service().heuristic(&intents);

        let dominant = outcome.dominant.expect("dominant chosen");
        assert_eq!(dominant.subcategory, "revenge");
        assert_eq!(
            outcome.arbitration.resolution,
            Resolution::DominantIntent { intent: dominant.id }
        );
        assert_eq!(outcome.arbitration.strategy, ArbitrationStrategy::Heuristic);
    }

    #[test]
    fn test_heuristic_phrases_goal_options() {
        let intents = vec![goal("exploration", 0.6, 3), goal("revenge", 0.9, 3)];
        let outcome = service().heuristic(&intents);
        assert!(outcome
            .arbitration
            .player_options
            .iter()
            .all(|o| o.starts_with("Focus on ")));
    }

    #[test]
    fn test_heuristic_without_goals_uses_generic_options() {
        let intents =
            vec![Intent::new(IntentCategory::Value, "honor").with_confidence(0.8)];
        let outcome = service().heuristic(&intents);
        assert_eq!(outcome.arbitration.player_options.len(), 3);
        assert_eq!(
            outcome.arbitration.player_options[0],
            GENERIC_OPTIONS[0]
        );
    }

    #[test]
    fn test_heuristic_emotional_state_tracks_dominant_confidence() {
        let confident = service().heuristic(&[goal("revenge", 0.9, 3)]);
        assert_eq!(
            confident.arbitration.emotional_state,
            EmotionalState::Determined
        );

        let shaky = service().heuristic(&[goal("revenge", 0.5, 3)]);
        assert_eq!(shaky.arbitration.emotional_state, EmotionalState::Uncertain);
    }

    #[test]
    fn test_heuristic_with_no_candidates() {
        let outcome = service().heuristic(&[]);
        assert!(outcome.dominant.is_none());
        assert_eq!(outcome.arbitration.resolution, Resolution::NoCandidates);
    }

    #[tokio::test]
    async fn test_external_parses_structured_reply() {
        let mut text_gen = MockTextGenPort::new();
        text_gen.expect_generate().returning(|_| {
            Ok(TextGenResponse {
                content: r#"Here is my call: {"dominant_intent": "revenge", "resolution_method": "the stronger drive", "emotional_state": "determined", "player_options": ["Hunt the baron", "Bide your time"]}"#.to_string(),
            })
        });

        let service = ArbitrationService::new(Arc::new(text_gen));
        let intents = vec![goal("revenge", 0.9, 3), goal("redemption", 0.6, 3)];
        let outcome = service
            .external(&intents, &[], &ContextMap::new(), Duration::from_secs(1))
            .await
            .expect("external arbitration succeeds");

        assert_eq!(outcome.arbitration.strategy, ArbitrationStrategy::External);
        assert_eq!(
            outcome.dominant.expect("matched candidate").subcategory,
            "revenge"
        );
        assert_eq!(outcome.arbitration.player_options.len(), 2);
        assert_eq!(
            outcome.arbitration.emotional_state,
            EmotionalState::Determined
        );
    }

    #[tokio::test]
    async fn test_external_unparsable_reply_becomes_guidance() {
        let mut text_gen = MockTextGenPort::new();
        text_gen.expect_generate().returning(|_| {
            Ok(TextGenResponse {
                content: "They should probably sleep on it.".to_string(),
            })
        });

        let service = ArbitrationService::new(Arc::new(text_gen));
        let outcome = service
            .external(
                &[goal("revenge", 0.9, 3)],
                &[],
                &ContextMap::new(),
                Duration::from_secs(1),
            )
            .await
            .expect("guidance fallback is not an error");

        assert_eq!(
            outcome.arbitration.resolution,
            Resolution::LlmGuidance {
                guidance: "They should probably sleep on it.".to_string()
            }
        );
        assert_eq!(
            outcome.arbitration.emotional_state,
            EmotionalState::Conflicted
        );
        assert!(outcome.dominant.is_none());
    }

    #[tokio::test]
    async fn test_external_transport_failure_is_an_err() {
        let service = ArbitrationService::new(Arc::new(NullTextGen));
        let result = service
            .external(
                &[goal("revenge", 0.9, 3)],
                &[],
                &ContextMap::new(),
                Duration::from_secs(1),
            )
            .await;
        assert!(result.is_err());
    }

    #[test]
    fn test_prompt_is_bounded() {
        let intents: Vec<Intent> =
            (0..10).map(|i| goal(&format!("goal_{i}"), 0.5, 3)).collect();
        let conflicts: Vec<IntentConflict> = Vec::new();
        let mut context = ContextMap::new();
        context.insert(
            "scene".to_string(),
            serde_json::Value::String("x".repeat(2000)),
        );

        let prompt = service().build_prompt(&intents, &conflicts, &context);
        let listed = prompt.matches("- [Goal]").count();
        assert_eq!(listed, PROMPT_INTENT_CAP);
        assert!(prompt.len() < 1500);
    }

    #[test]
    fn test_extract_json_finds_embedded_object() {
        assert_eq!(extract_json(r#"noise {"a": 1} trailing"#), Some(r#"{"a": 1}"#));
        assert_eq!(extract_json("no json here"), None);
    }
}
