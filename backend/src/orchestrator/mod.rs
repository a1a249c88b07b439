//! Orchestrator - the episode loop.
//!
//! Drives the three coordination phases (analysis, negotiation, reporting)
//! over the classroom agents for one or more episodes.
//!
//! See `engine.rs` for the full implementation.

pub mod engine;

pub use engine::{
    AgentDecisionRecord, CoordinationError, CoordinationMetrics, EpisodeOrchestrator,
    EpisodeResult, ScheduleEntry,
};
