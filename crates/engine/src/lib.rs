//! PlyrMind Engine library.
//!
//! The intent aggregation, conflict-resolution and arbitration pipeline:
//! merges candidate intents from external extraction collaborators, detects
//! conflicts via the knowledge base, scores decision paralysis, arbitrates to
//! a single dominant intent and tracks a longitudinal per-player profile.
//!
//! ## Structure
//!
//! - `infrastructure/` - collaborator port traits and shipped adapters
//! - `use_cases/` - the pipeline stages
//! - `app` - application composition

pub mod app;
pub mod infrastructure;
pub mod use_cases;


pub use app::{App, AppBuilder};
