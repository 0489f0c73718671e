//! Analysis outcome types: paralysis, arbitration and the assembled result.
//!
//! These are closed tagged variants rather than string tags so that an invalid
//! severity, resolution or emotional state is unrepresentable.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::conflict::IntentConflict;
use crate::error::DomainError;
use crate::ids::IntentId;
use crate::intent::Intent;

/// How stuck the player is
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParalysisSeverity {
    #[default]
    None,
    Mild,
    Moderate,
    Severe,
}

impl ParalysisSeverity {
    pub fn detected(&self) -> bool {
        *self != ParalysisSeverity::None
    }
}

impl fmt::Display for ParalysisSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ParalysisSeverity::None => "none",
            ParalysisSeverity::Mild => "mild",
            ParalysisSeverity::Moderate => "moderate",
            ParalysisSeverity::Severe => "severe",
        };
        write!(f, "{s}")
    }
}

/// Narrative device used to break severe paralysis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intervention {
    /// An NPC cuts in and forces the moment forward
    NpcInterruption,
    /// The scene itself changes and demands a reaction
    EnvironmentalShift,
    /// The character's inner voice speaks up
    InnerVoice,
    /// A memory surfaces and reframes the choice
    MemoryFlash,
    /// Events close off every option but two
    ForcedChoice,
}

impl Intervention {
    /// The full set the severe branch draws from, uniformly at random
    pub const ALL: [Intervention; 5] = [
        Intervention::NpcInterruption,
        Intervention::EnvironmentalShift,
        Intervention::InnerVoice,
        Intervention::MemoryFlash,
        Intervention::ForcedChoice,
    ];
}

/// What the game should do about the player's indecision
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ParalysisResponse {
    /// Mild: nudge with questions
    ClarifyingQuestions { questions: Vec<String> },
    /// Moderate: voice the tension back at the player
    InternalMonologue {
        text: String,
        emotional_state: EmotionalState,
    },
    /// Severe: break the deadlock narratively
    DramaticIntervention {
        intervention: Intervention,
        narrative_hook: String,
    },
    /// No paralysis detected
    ContinueNormally,
}

impl ParalysisResponse {
    /// Player-facing clarification strings carried into the analysis result
    pub fn clarifications(&self) -> Vec<String> {
        match self {
            ParalysisResponse::ClarifyingQuestions { questions } => questions.clone(),
            ParalysisResponse::InternalMonologue { text, .. } => vec![text.clone()],
            ParalysisResponse::DramaticIntervention { narrative_hook, .. } => {
                vec![narrative_hook.clone()]
            }
            ParalysisResponse::ContinueNormally => Vec::new(),
        }
    }
}

/// Emotional register attached to an arbitration outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmotionalState {
    Determined,
    Uncertain,
    Conflicted,
}

impl fmt::Display for EmotionalState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            EmotionalState::Determined => "determined",
            EmotionalState::Uncertain => "uncertain",
            EmotionalState::Conflicted => "conflicted",
        };
        write!(f, "{s}")
    }
}

impl FromStr for EmotionalState {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "determined" => Ok(EmotionalState::Determined),
            "uncertain" => Ok(EmotionalState::Uncertain),
            "conflicted" => Ok(EmotionalState::Conflicted),
            other => Err(DomainError::parse(format!(
                "Unknown emotional state: {other}"
            ))),
        }
    }
}

impl EmotionalState {
    /// Lenient parse for collaborator replies; unknown wording reads as conflicted
    pub fn from_reply(s: &str) -> Self {
        s.parse().unwrap_or(EmotionalState::Conflicted)
    }
}

/// Which arbitration strategy produced the outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArbitrationStrategy {
    Heuristic,
    External,
}

/// How the dominant direction was settled
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "resolution", rename_all = "snake_case")]
pub enum Resolution {
    /// Heuristic ranking picked a concrete candidate
    DominantIntent { intent: IntentId },
    /// The external arbiter returned a structured decision
    LlmDecision {
        dominant_intent: String,
        resolution_method: String,
    },
    /// The external reply did not parse; its raw text is kept as guidance
    LlmGuidance { guidance: String },
    /// Nothing to arbitrate
    NoCandidates,
}

/// Cap on player-facing options carried in an arbitration outcome
pub const MAX_PLAYER_OPTIONS: usize = 3;

/// The arbitration outcome attached to every analysis result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Arbitration {
    pub strategy: ArbitrationStrategy,
    pub resolution: Resolution,
    pub emotional_state: EmotionalState,
    /// Player-facing follow-up options, at most three
    pub player_options: Vec<String>,
}

impl Arbitration {
    pub fn new(
        strategy: ArbitrationStrategy,
        resolution: Resolution,
        emotional_state: EmotionalState,
        mut player_options: Vec<String>,
    ) -> Self {
        player_options.truncate(MAX_PLAYER_OPTIONS);
        Self {
            strategy,
            resolution,
            emotional_state,
            player_options,
        }
    }
}

/// Cap on clarification strings carried in a result
pub const MAX_CLARIFICATIONS: usize = 3;

/// Floor and ceiling for overall confidence
pub const OVERALL_CONFIDENCE_RANGE: (f32, f32) = (0.1, 1.0);

/// Floor and ceiling for meta-confidence in the analysis itself
pub const ANALYSIS_CONFIDENCE_RANGE: (f32, f32) = (0.3, 0.95);

/// The pipeline's output: constructed once per call, immutable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    /// Top-ranked intents, at most three
    pub primary_intents: Vec<Intent>,
    /// Everything that did not make the cut
    pub secondary_intents: Vec<Intent>,
    pub conflicts: Vec<IntentConflict>,
    /// Confidence in what the player wants (0.1 - 1.0)
    pub overall_confidence: f32,
    /// Meta-confidence in this analysis itself (0.3 - 0.95)
    pub analysis_confidence: f32,
    pub paralysis_detected: bool,
    pub paralysis_severity: ParalysisSeverity,
    /// The single intention downstream systems should act on
    pub dominant_intent: Option<Intent>,
    pub arbitration: Arbitration,
    /// Clarification prompts for the player, at most three
    pub clarifications: Vec<String>,
}

impl AnalysisResult {
    /// Clamp the confidence pair into their documented ranges.
    pub fn clamp_confidences(mut self) -> Self {
        self.overall_confidence = self
            .overall_confidence
            .clamp(OVERALL_CONFIDENCE_RANGE.0, OVERALL_CONFIDENCE_RANGE.1);
        self.analysis_confidence = self
            .analysis_confidence
            .clamp(ANALYSIS_CONFIDENCE_RANGE.0, ANALYSIS_CONFIDENCE_RANGE.1);
        self
    }

    /// The worst-case still-valid result: nothing extracted, nothing decided.
    ///
    /// Every failure mode inside the pipeline degrades to this shape rather
    /// than surfacing an error to the caller.
    pub fn degraded() -> Self {
        Self {
            primary_intents: Vec::new(),
            secondary_intents: Vec::new(),
            conflicts: Vec::new(),
            overall_confidence: OVERALL_CONFIDENCE_RANGE.0,
            analysis_confidence: ANALYSIS_CONFIDENCE_RANGE.0,
            paralysis_detected: false,
            paralysis_severity: ParalysisSeverity::None,
            dominant_intent: None,
            arbitration: Arbitration::new(
                ArbitrationStrategy::Heuristic,
                Resolution::NoCandidates,
                EmotionalState::Uncertain,
                Vec::new(),
            ),
            clarifications: Vec::new(),
        }
    }
}
