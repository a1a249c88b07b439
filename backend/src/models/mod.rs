//! Domain types for the coordination engine.
//!
//! - [`agent`]: classroom state (population, preferences, adjustments,
//!   reputation)
//! - [`commitment`]: cross-episode promises between classrooms
//! - [`snapshot`]: read-only congestion analysis results
//! - [`broadcast`]: episode event log for downstream consumers

pub mod agent;
pub mod broadcast;
pub mod commitment;
pub mod snapshot;

pub use agent::ClassroomAgent;
pub use broadcast::{BroadcastEvent, BroadcastLog};
pub use commitment::{Commitment, CommitmentKind, CommitmentStatus, ReciprocalTerms};
pub use snapshot::{
    CongestionSnapshot, CongestionStatus, Recommendation, RecommendationPriority, SlotAnalysis,
    SlotMember, StaggerAdjustment,
};
