//! Application composition.
//!
//! Wires collaborators into the pipeline. Every collaborator is optional:
//! unsupplied ports get their null-object implementation, so the pipeline
//! never branches on presence.

use std::collections::HashMap;
use std::sync::Arc;

use plyrmind_domain::{
    default_knowledge_base, AnalysisResult, KnowledgeBase, Opportunity,
};

use crate::infrastructure::clock::{SystemClock, SystemRandom};
use crate::infrastructure::null::{NullMemory, NullTextGen, NullWorldState};
use crate::infrastructure::ports::{
    ClockPort, ContextMap, ExtractorPort, MemoryPort, RandomPort, TextGenPort, WorldStatePort,
};
use crate::infrastructure::resilient::{ResilientTextGen, RetryConfig};
use crate::use_cases::{
    AnalysisConfig, AnalysisService, ArbitrationService, FeasibilityService, ProfileTracker,
};

/// The assembled intent-analysis pipeline.
pub struct App {
    analysis: AnalysisService,
    profiles: Arc<ProfileTracker>,
}

impl App {
    pub fn builder() -> AppBuilder {
        AppBuilder::new()
    }

    /// Analyze one piece of player text in its situational context.
    pub async fn analyze(
        &self,
        text: &str,
        context: &ContextMap,
        player_id: &str,
    ) -> AnalysisResult {
        self.analysis.analyze(text, context, player_id).await
    }

    /// Goal subcategories the player keeps coming back to.
    pub fn consistent_traits(&self, player_id: &str) -> HashMap<String, f32> {
        self.profiles.consistent_traits(player_id)
    }

    /// Per-domain growth multipliers for a result's primary intents.
    pub fn growth_modifiers(&self, result: &AnalysisResult) -> HashMap<String, f32> {
        self.profiles.growth_modifiers(result)
    }

    /// Ranked suggestions blending established traits and open conflicts.
    pub fn suggest_opportunities(
        &self,
        player_id: &str,
        result: &AnalysisResult,
    ) -> Vec<Opportunity> {
        self.profiles.suggest_opportunities(player_id, result)
    }
}

/// Builder assembling an [`App`] from whichever collaborators exist.
pub struct AppBuilder {
    extractors: Vec<Arc<dyn ExtractorPort>>,
    memory: Arc<dyn MemoryPort>,
    world: Arc<dyn WorldStatePort>,
    text_gen: Arc<dyn TextGenPort>,
    clock: Arc<dyn ClockPort>,
    random: Arc<dyn RandomPort>,
    kb: Arc<KnowledgeBase>,
    config: AnalysisConfig,
    retry: Option<RetryConfig>,
}

impl AppBuilder {
    pub fn new() -> Self {
        Self {
            extractors: Vec::new(),
            memory: Arc::new(NullMemory),
            world: Arc::new(NullWorldState),
            text_gen: Arc::new(NullTextGen),
            clock: Arc::new(SystemClock::new()),
            random: Arc::new(SystemRandom::new()),
            kb: Arc::new(default_knowledge_base()),
            config: AnalysisConfig::default(),
            retry: Some(RetryConfig::default()),
        }
    }

    /// Register an extraction collaborator; order of registration is the
    /// merge order.
    pub fn with_extractor(mut self, extractor: Arc<dyn ExtractorPort>) -> Self {
        self.extractors.push(extractor);
        self
    }

    pub fn with_memory(mut self, memory: Arc<dyn MemoryPort>) -> Self {
        self.memory = memory;
        self
    }

    pub fn with_world_state(mut self, world: Arc<dyn WorldStatePort>) -> Self {
        self.world = world;
        self
    }

    pub fn with_text_gen(mut self, text_gen: Arc<dyn TextGenPort>) -> Self {
        self.text_gen = text_gen;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn ClockPort>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_random(mut self, random: Arc<dyn RandomPort>) -> Self {
        self.random = random;
        self
    }

    pub fn with_knowledge_base(mut self, kb: KnowledgeBase) -> Self {
        self.kb = Arc::new(kb);
        self
    }

    pub fn with_config(mut self, config: AnalysisConfig) -> Self {
        self.config = config;
        self
    }

    /// Disable the retry wrapper around the text-generation collaborator.
    pub fn without_retry(mut self) -> Self {
        self.retry = None;
        self
    }

    pub fn with_retry_config(mut self, retry: RetryConfig) -> Self {
        self.retry = Some(retry);
        self
    }

    pub fn build(self) -> App {
        let text_gen: Arc<dyn TextGenPort> = match self.retry {
            Some(retry) => Arc::new(ResilientTextGen::new(self.text_gen, retry)),
            None => self.text_gen,
        };

        let profiles = Arc::new(ProfileTracker::new(self.config.history_capacity));
        let analysis = AnalysisService::new(
            self.extractors,
            self.kb,
            self.memory,
            FeasibilityService::new(self.world),
            ArbitrationService::new(text_gen),
            Arc::clone(&profiles),
            self.clock,
            self.random,
            self.config,
        );

        App { analysis, profiles }
    }
}

impl Default for AppBuilder {
    fn default() -> Self {
        Self::new()
    }
}
