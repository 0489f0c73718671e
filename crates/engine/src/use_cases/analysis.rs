//! The analysis orchestrator - fixed-order coordination of every pipeline
//! stage.
//!
//! Pure coordination: no stage begins before the previous stage's full output
//! is available, and no internal state lives here beyond what the stages own.
//! Every collaborator call is bounded by the configured timeout; every failure
//! mode degrades to a still-valid result. Nothing raises past `analyze`.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, instrument, warn};

use plyrmind_domain::{
    AnalysisResult, Intent, IntentConflict, KnowledgeBase, MAX_CLARIFICATIONS,
};

use crate::infrastructure::ports::{
    ClockPort, ContextMap, ExtractorPort, MemoryPort, RandomPort,
};
use crate::use_cases::arbitration::{rank_intents, ArbitrationService};
use crate::use_cases::conflicts::ConflictDetector;
use crate::use_cases::contradictions::ContradictionScanner;
use crate::use_cases::feasibility::FeasibilityService;
use crate::use_cases::paralysis::ParalysisDetector;
use crate::use_cases::profile::ProfileTracker;

/// Tuning knobs for one pipeline instance.
#[derive(Debug, Clone)]
pub struct AnalysisConfig {
    /// How many top-ranked intents count as primary
    pub max_primary_intents: usize,
    /// Budget for every individual collaborator call
    pub collaborator_timeout: Duration,
    /// Below this dominant confidence the external arbiter is consulted
    pub low_confidence_threshold: f32,
    /// Sliding-window size for per-player batch history
    pub history_capacity: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            max_primary_intents: 3,
            collaborator_timeout: Duration::from_secs(10),
            low_confidence_threshold: 0.6,
            history_capacity: plyrmind_domain::DEFAULT_HISTORY_CAPACITY,
        }
    }
}

pub struct AnalysisService {
    extractors: Vec<Arc<dyn ExtractorPort>>,
    contradictions: ContradictionScanner,
    conflicts: ConflictDetector,
    feasibility: FeasibilityService,
    arbitration: ArbitrationService,
    profiles: Arc<ProfileTracker>,
    memory: Arc<dyn MemoryPort>,
    clock: Arc<dyn ClockPort>,
    random: Arc<dyn RandomPort>,
    config: AnalysisConfig,
}

impl AnalysisService {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        extractors: Vec<Arc<dyn ExtractorPort>>,
        kb: Arc<KnowledgeBase>,
        memory: Arc<dyn MemoryPort>,
        feasibility: FeasibilityService,
        arbitration: ArbitrationService,
        profiles: Arc<ProfileTracker>,
        clock: Arc<dyn ClockPort>,
        random: Arc<dyn RandomPort>,
        config: AnalysisConfig,
    ) -> Self {
        Self {
            extractors,
            contradictions: ContradictionScanner::new(
                Arc::clone(&memory),
                Arc::clone(&kb),
                Arc::clone(&clock),
            ),
            conflicts: ConflictDetector::new(kb),
            feasibility,
            arbitration,
            profiles,
            memory,
            clock,
            random,
            config,
        }
    }

    /// Run the full pipeline over one piece of player text.
    #[instrument(skip_all, fields(player_id = %player_id))]
    pub async fn analyze(
        &self,
        text: &str,
        context: &ContextMap,
        player_id: &str,
    ) -> AnalysisResult {
        let timeout = self.config.collaborator_timeout;

        // Stage 1: extraction collaborators, merged in registration order.
        // Out-of-range collaborator output is clamped, not rejected.
        let mut intents: Vec<Intent> = Vec::new();
        for extractor in &self.extractors {
            match tokio::time::timeout(timeout, extractor.extract(text, context)).await {
                Ok(Ok(extracted)) => {
                    intents.extend(extracted.into_iter().map(Intent::normalized))
                }
                Ok(Err(err)) => warn!(error = %err, "extractor failed, continuing without it"),
                Err(_) => warn!("extractor timed out, continuing without it"),
            }
        }

        // Stage 2: contradictions against recalled statements
        intents.extend(self.contradictions.scan(text, timeout).await);
        debug!(count = intents.len(), "candidate intents merged");

        // Stage 3: pairwise conflict detection
        let conflicts = self.conflicts.detect(&intents);

        // Stage 4: feasibility attached to every intent
        let intents = self.feasibility.attach(intents, context, timeout).await;

        // Stage 5: paralysis scoring; the response only feeds clarifications
        let assessment = ParalysisDetector::detect(&intents, &conflicts);
        let response = ParalysisDetector::respond(
            assessment.severity,
            &intents,
            &conflicts,
            self.random.as_ref(),
        );
        let mut clarifications = response.clarifications();
        clarifications.truncate(MAX_CLARIFICATIONS);

        // Stage 6: arbitration - heuristic baseline, external under load
        let heuristic = self.arbitration.heuristic(&intents);
        let low_confidence = heuristic
            .dominant
            .as_ref()
            .is_some_and(|d| d.confidence < self.config.low_confidence_threshold);
        let outcome = if conflicts.len() > 1 || low_confidence {
            match self
                .arbitration
                .external(&intents, &conflicts, context, timeout)
                .await
            {
                Ok(mut external) => {
                    // an unmatched or guidance-only reply keeps the heuristic pick
                    if external.dominant.is_none() {
                        external.dominant = heuristic.dominant.clone();
                    }
                    external
                }
                Err(err) => {
                    warn!(error = %err, "external arbitration failed, using heuristic");
                    heuristic
                }
            }
        } else {
            heuristic
        };

        // Stage 7: longitudinal profile update
        self.profiles
            .update(player_id, &intents, self.clock.now());

        // Stage 8: hand the statement back to long-term memory
        match tokio::time::timeout(timeout, self.memory.store(text, &intents, context)).await {
            Ok(Ok(())) => {}
            Ok(Err(err)) => warn!(error = %err, "memory store failed"),
            Err(_) => warn!("memory store timed out"),
        }

        // Stage 9: result assembly
        let ranked = rank_intents(&intents);
        let primary: Vec<Intent> = ranked
            .iter()
            .take(self.config.max_primary_intents)
            .cloned()
            .collect();
        let secondary: Vec<Intent> = ranked
            .into_iter()
            .skip(self.config.max_primary_intents)
            .collect();

        AnalysisResult {
            overall_confidence: overall_confidence(&intents, &conflicts),
            analysis_confidence: analysis_confidence(&intents, &conflicts),
            primary_intents: primary,
            secondary_intents: secondary,
            conflicts,
            paralysis_detected: assessment.detected,
            paralysis_severity: assessment.severity,
            dominant_intent: outcome.dominant,
            arbitration: outcome.arbitration,
            clarifications,
        }
        .clamp_confidences()
    }
}

/// Mean extractor confidence, discounted by conflict load, floored at 0.1.
fn overall_confidence(intents: &[Intent], conflicts: &[IntentConflict]) -> f32 {
    if intents.is_empty() {
        return 0.1;
    }
    let mean = intents.iter().map(|i| i.confidence).sum::<f32>() / intents.len() as f32;
    let penalty = (0.1 * conflicts.len() as f32).min(0.4);
    (mean - penalty).max(0.1)
}

/// Meta-confidence in the analysis itself.
///
/// Starts at 0.7; uniformly severe conflicts sharpen it, ambiguous low-grade
/// ones blur it, category diversity adds a little. Clamped to [0.3, 0.95].
fn analysis_confidence(intents: &[Intent], conflicts: &[IntentConflict]) -> f32 {
    let mut confidence: f32 = 0.7;
    if !conflicts.is_empty() && conflicts.iter().all(|c| c.severity > 0.8) {
        confidence += 0.2;
    }
    if conflicts.iter().any(|c| c.severity < 0.5) {
        confidence -= 0.2;
    }
    let categories: BTreeSet<_> = intents.iter().map(|i| i.category).collect();
    if categories.len() >= 3 {
        confidence += 0.1;
    }
    confidence.clamp(0.3, 0.95)
}

#[cfg(test)]
mod tests {
    use plyrmind_domain::{ConflictType, IntentCategory, IntentId};

    use super::*;

    fn goal(confidence: f32) -> Intent {
        Intent::new(IntentCategory::Goal, "exploration").with_confidence(confidence)
    }

    fn conflict(severity: f32) -> IntentConflict {
        IntentConflict::new(
            IntentId::new(),
            IntentId::new(),
            ConflictType::DirectOpposition,
            severity,
            vec![],
        )
    }

    #[test]
    fn test_overall_confidence_empty_batch_floors_at_point_one() {
        assert_eq!(overall_confidence(&[], &[]), 0.1);
    }

    #[test]
    fn test_overall_confidence_is_mean_minus_conflict_penalty() {
        let intents = vec![goal(0.8), goal(0.6)];
        let conflicts = vec![conflict(0.9)];
        assert!((overall_confidence(&intents, &conflicts) - 0.6).abs() < 1e-6);
    }

    #[test]
    fn test_overall_confidence_penalty_caps_at_point_four() {
        let intents = vec![goal(1.0)];
        let conflicts: Vec<IntentConflict> = (0..8).map(|_| conflict(0.9)).collect();
        assert!((overall_confidence(&intents, &conflicts) - 0.6).abs() < 1e-6);
    }

    #[test]
    fn test_analysis_confidence_baseline() {
        assert!((analysis_confidence(&[goal(0.5)], &[]) - 0.7).abs() < 1e-6);
    }

    #[test]
    fn test_analysis_confidence_rewards_uniformly_severe_conflicts() {
        let conflicts = vec![conflict(0.9), conflict(0.85)];
        assert!((analysis_confidence(&[goal(0.5)], &conflicts) - 0.9).abs() < 1e-6);
    }

    #[test]
    fn test_analysis_confidence_penalizes_ambiguous_conflicts() {
        let conflicts = vec![conflict(0.4)];
        assert!((analysis_confidence(&[goal(0.5)], &conflicts) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_analysis_confidence_rewards_category_diversity() {
        let intents = vec![
            Intent::new(IntentCategory::Goal, "exploration"),
            Intent::new(IntentCategory::Value, "honor"),
            Intent::new(IntentCategory::Approach, "cautious"),
        ];
        assert!((analysis_confidence(&intents, &[]) - 0.8).abs() < 1e-6);
    }

    #[test]
    fn test_analysis_confidence_no_vacuous_severity_bonus() {
        // zero conflicts must not read as "all conflicts are severe"
        assert!((analysis_confidence(&[goal(0.5)], &[]) - 0.7).abs() < 1e-6);
    }

    #[test]
    fn test_analysis_confidence_stays_in_range() {
        let intents = vec![
            Intent::new(IntentCategory::Goal, "exploration"),
            Intent::new(IntentCategory::Value, "honor"),
            Intent::new(IntentCategory::Approach, "cautious"),
        ];
        let conflicts = vec![conflict(0.9)];
        // 0.7 + 0.2 + 0.1 would be 1.0; the ceiling is 0.95
        assert!((analysis_confidence(&intents, &conflicts) - 0.95).abs() < 1e-6);
    }
}
