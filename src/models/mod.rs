//! Core data models for the tracker.

mod ids;
mod match_result;
mod player;
mod snapshot;

pub use ids::*;
pub use match_result::*;
pub use player::*;
pub use snapshot::*;
