//! Exit Coordination Core - negotiation engine
//!
//! Multi-agent coordination of classroom exit times around a shared
//! corridor bottleneck, with deterministic execution.
//!
//! # Architecture
//!
//! - **core**: Time-of-day and episode-date handling
//! - **models**: Domain types (ClassroomAgent, Commitment, CongestionSnapshot)
//! - **analysis**: Congestion analysis of the exit schedule
//! - **feasibility**: Deterministic adjustment scoring
//! - **negotiation**: Offer construction and acceptance
//! - **ledger**: Commitment lifecycle and reputation
//! - **llm**: Decision providers and response parsing
//! - **scenario**: Built-in and custom scenario definitions
//! - **config**: Tunable coordination parameters
//! - **orchestrator**: The episode loop
//!
//! # Critical Invariants
//!
//! 1. All adjustments are i64 minutes, cumulatively bounded per agent
//! 2. A commitment resolves exactly once, then is terminal
//! 3. Analysis never mutates agents; only negotiation phases do

// Module declarations
pub mod analysis;
pub mod config;
pub mod core;
pub mod feasibility;
pub mod ledger;
pub mod llm;
pub mod models;
pub mod negotiation;
pub mod orchestrator;
pub mod scenario;

// Re-exports for convenience
pub use analysis::CongestionAnalyzer;
pub use config::{
    ConfigError, CoordinationConfig, FeasibilityConfig, NegotiationConfig, NegotiationScope,
    PerformanceConfig, ReputationConfig, RiskBands, SweepParameter,
};
pub use core::time::{EpisodeDate, TimeError, TimeOfDay};
pub use feasibility::{FeasibilityReport, FeasibilityScorer, PreferenceAlignment};
pub use ledger::{CommitmentLedger, LedgerError, ResolveOutcome};
pub use llm::{
    parse_decision, DecisionProvider, DecisionRequest, ProviderError, ScriptedProvider,
    StructuredDecision, UnavailableProvider,
};
pub use models::{
    BroadcastEvent, BroadcastLog, ClassroomAgent, Commitment, CommitmentKind, CommitmentStatus,
    CongestionSnapshot, CongestionStatus, Recommendation, RecommendationPriority, ReciprocalTerms,
    SlotAnalysis, SlotMember, StaggerAdjustment,
};
pub use negotiation::{DecisionFactors, OfferEvaluation, OfferEvaluator};
pub use orchestrator::{
    AgentDecisionRecord, CoordinationError, CoordinationMetrics, EpisodeOrchestrator,
    EpisodeResult, ScheduleEntry,
};
pub use scenario::{ClassroomConfig, ScenarioConfig, ScenarioError};
