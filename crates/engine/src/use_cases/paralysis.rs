//! Decision-paralysis scoring and response synthesis.
//!
//! Severity is classified from counts over the full intent set plus the
//! detected conflicts; the rules are evaluated in a fixed order and the first
//! match wins. The severe-branch intervention is drawn uniformly at random for
//! narrative variety - callers must treat it as "one of the valid set".

use tracing::debug;

use plyrmind_domain::{
    Intent, IntentConflict, Intervention, ParalysisResponse, ParalysisSeverity,
};

use crate::infrastructure::ports::RandomPort;

/// Mean confidence below which a contradiction reads as moderate paralysis
const MODERATE_CONFIDENCE_THRESHOLD: f32 = 0.4;

/// Mean confidence below which the batch reads as mild paralysis
const MILD_CONFIDENCE_THRESHOLD: f32 = 0.5;

const CLARIFYING_QUESTIONS: [&str; 3] = [
    "What matters most to you right now?",
    "If you could only do one of these things, which would it be?",
    "What are you most afraid of losing?",
];

/// Outcome of the paralysis scan
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParalysisAssessment {
    pub detected: bool,
    pub severity: ParalysisSeverity,
}

pub struct ParalysisDetector;

impl ParalysisDetector {
    /// Classify overall indecision from the batch and its conflicts.
    pub fn detect(intents: &[Intent], conflicts: &[IntentConflict]) -> ParalysisAssessment {
        let severity = Self::classify(intents, conflicts);
        debug!(%severity, "paralysis scan complete");
        ParalysisAssessment {
            detected: severity.detected(),
            severity,
        }
    }

    fn classify(intents: &[Intent], conflicts: &[IntentConflict]) -> ParalysisSeverity {
        // an empty batch carries no indecision signal at all
        if intents.is_empty() {
            return ParalysisSeverity::None;
        }

        let hesitation_count = intents.iter().filter(|i| i.is_hesitation()).count();
        let contradiction_count = intents.iter().filter(|i| i.is_contradiction()).count();
        let high_severity_conflicts =
            conflicts.iter().filter(|c| c.is_high_severity()).count();
        let avg_confidence =
            intents.iter().map(|i| i.confidence).sum::<f32>() / intents.len() as f32;

        if hesitation_count > 1 && high_severity_conflicts > 0 {
            ParalysisSeverity::Severe
        } else if contradiction_count > 0 && avg_confidence < MODERATE_CONFIDENCE_THRESHOLD {
            ParalysisSeverity::Moderate
        } else if avg_confidence < MILD_CONFIDENCE_THRESHOLD || hesitation_count > 0 {
            ParalysisSeverity::Mild
        } else {
            ParalysisSeverity::None
        }
    }

    /// Synthesize the narrative response for a given severity.
    pub fn respond(
        severity: ParalysisSeverity,
        intents: &[Intent],
        conflicts: &[IntentConflict],
        random: &dyn RandomPort,
    ) -> ParalysisResponse {
        match severity {
            ParalysisSeverity::None => ParalysisResponse::ContinueNormally,
            ParalysisSeverity::Mild => ParalysisResponse::ClarifyingQuestions {
                questions: CLARIFYING_QUESTIONS.iter().map(|q| q.to_string()).collect(),
            },
            ParalysisSeverity::Moderate => {
                let tension_count = conflicts.len().max(1);
                ParalysisResponse::InternalMonologue {
                    text: format!(
                        "Part of you pulls one way, part another - {} tension{} you cannot quite resolve.",
                        tension_count,
                        if tension_count == 1 { "" } else { "s" }
                    ),
                    emotional_state: plyrmind_domain::EmotionalState::Conflicted,
                }
            }
            ParalysisSeverity::Severe => {
                let index =
                    random.gen_range(0, Intervention::ALL.len() as i32 - 1) as usize;
                let intervention = Intervention::ALL[index.min(Intervention::ALL.len() - 1)];
                ParalysisResponse::DramaticIntervention {
                    intervention,
                    narrative_hook: Self::narrative_hook(intervention, intents),
                }
            }
        }
    }

    fn narrative_hook(intervention: Intervention, intents: &[Intent]) -> String {
        let subject = intents
            .first()
            .map(|i| i.subcategory.clone())
            .unwrap_or_else(|| "the choice before you".to_string());
        match intervention {
            Intervention::NpcInterruption => {
                format!("Someone steps in before you can settle on {subject}.")
            }
            Intervention::EnvironmentalShift => {
                format!("The world moves first - {subject} will have to wait.")
            }
            Intervention::InnerVoice => {
                format!("A voice inside you speaks plainly about {subject}.")
            }
            Intervention::MemoryFlash => {
                format!("A memory surfaces, sharp and sudden, about {subject}.")
            }
            Intervention::ForcedChoice => {
                format!("Events conspire to leave you only two ways through {subject}.")
            }
        }
    }
}
