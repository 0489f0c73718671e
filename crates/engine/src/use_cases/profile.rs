//! Player profile tracker - the only mutable state shared across calls.
//!
//! Profiles are keyed by player id. Updates for the same player are serialized
//! through a per-player mutex so concurrent calls cannot lose strength or
//! consistency increments; calls for different players proceed in parallel.
//! Profiles are created lazily and never evicted here - retention is the
//! surrounding application's concern.

use std::collections::HashMap;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use tracing::debug;

use plyrmind_domain::{AnalysisResult, Intent, Opportunity, PlayerProfile};

pub struct ProfileTracker {
    profiles: DashMap<String, Mutex<PlayerProfile>>,
    history_capacity: usize,
}

impl ProfileTracker {
    pub fn new(history_capacity: usize) -> Self {
        Self {
            profiles: DashMap::new(),
            history_capacity,
        }
    }

    /// Fold one call's intents into the player's profile.
    pub fn update(&self, player_id: &str, intents: &[Intent], recorded_at: DateTime<Utc>) {
        let entry = self
            .profiles
            .entry(player_id.to_string())
            .or_insert_with(|| Mutex::new(PlayerProfile::new(self.history_capacity)));
        let mut profile = entry
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        profile.record_batch(intents, recorded_at);
        debug!(
            player_id,
            goals = profile.goal_traits.len(),
            batches = profile.history().len(),
            "profile updated"
        );
    }

    /// Goal subcategories the player returns to, keyed to their consistency.
    pub fn consistent_traits(&self, player_id: &str) -> HashMap<String, f32> {
        self.profiles
            .get(player_id)
            .map(|entry| {
                entry
                    .lock()
                    .unwrap_or_else(std::sync::PoisonError::into_inner)
                    .consistent_traits()
            })
            .unwrap_or_default()
    }

    /// Per-domain growth multipliers for a result's primary intents.
    pub fn growth_modifiers(&self, result: &AnalysisResult) -> HashMap<String, f32> {
        plyrmind_domain::growth_modifiers(result)
    }

    /// Ranked suggestions blending the player's established traits with the
    /// result's open conflicts.
    pub fn suggest_opportunities(
        &self,
        player_id: &str,
        result: &AnalysisResult,
    ) -> Vec<Opportunity> {
        self.profiles
            .get(player_id)
            .map(|entry| {
                entry
                    .lock()
                    .unwrap_or_else(std::sync::PoisonError::into_inner)
                    .suggest_opportunities(result)
            })
            .unwrap_or_default()
    }
}
