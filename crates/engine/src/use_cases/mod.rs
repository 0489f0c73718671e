//! Pipeline stages - each module owns one stage of the analysis flow.

pub mod analysis;
pub mod arbitration;
pub mod conflicts;
pub mod contradictions;
pub mod feasibility;
pub mod paralysis;
pub mod profile;

pub use analysis::{AnalysisConfig, AnalysisService};
pub use arbitration::{rank_intents, ArbitrationOutcome, ArbitrationService};
pub use conflicts::ConflictDetector;
pub use contradictions::ContradictionScanner;
pub use feasibility::FeasibilityService;
pub use paralysis::{ParalysisAssessment, ParalysisDetector};
pub use profile::ProfileTracker;
