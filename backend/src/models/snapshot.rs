//! Congestion snapshots: read-only analysis results.
//!
//! A snapshot summarizes the bottleneck situation for one point in time:
//! per-slot student loads and congestion ratios, the global maximum ratio,
//! the slots exceeding capacity, and advisory stagger recommendations.
//! Snapshots are produced fresh by each analysis call and never mutated.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::core::time::TimeOfDay;

/// Congestion severity band
///
/// Bands use strict `>` comparisons on the congestion ratio: > 1.5 critical,
/// > 1.0 high, > 0.7 moderate, else normal. A ratio landing exactly on a
/// threshold maps to the lower band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CongestionStatus {
    Normal,
    Moderate,
    High,
    Critical,
}

impl fmt::Display for CongestionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CongestionStatus::Normal => "normal",
            CongestionStatus::Moderate => "moderate",
            CongestionStatus::High => "high",
            CongestionStatus::Critical => "critical",
        };
        write!(f, "{}", s)
    }
}

/// One classroom's contribution to a time slot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotMember {
    pub classroom_id: String,
    pub students: u32,
}

/// Analysis of a single exit-time slot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlotAnalysis {
    /// Effective exit time shared by the slot's classrooms
    pub time_slot: TimeOfDay,

    /// Summed student population exiting at this time
    pub students: u32,

    /// Bottleneck capacity in people per minute
    pub capacity_per_minute: u32,

    /// students / capacity_per_minute
    pub congestion_ratio: f64,

    /// Severity band for this slot's ratio
    pub status: CongestionStatus,

    /// Member classrooms in grouping order
    pub classrooms: Vec<SlotMember>,
}

/// Advisory priority for a recommendation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecommendationPriority {
    High,
    Medium,
}

/// Suggested stagger adjustment for one classroom
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaggerAdjustment {
    pub classroom_id: String,
    pub suggested_adjustment: i64,
}

/// Advisory recommendation for a congested slot
///
/// Recommendations are never force-applied; the negotiation phase decides
/// what actually changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub time_slot: TimeOfDay,
    pub priority: RecommendationPriority,

    /// Classrooms considered flexible enough to move
    pub target_classrooms: Vec<String>,

    /// Proposed stagger pattern; empty when the flexible classrooms alone
    /// fit within capacity
    pub suggested_adjustments: Vec<StaggerAdjustment>,
}

/// Read-only congestion summary for one point in time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CongestionSnapshot {
    /// Total students across all classrooms
    pub total_students: u32,

    /// Bottleneck capacity in people per minute
    pub capacity_per_minute: u32,

    /// Maximum congestion ratio over all slots
    pub max_congestion_ratio: f64,

    /// Slots whose ratio exceeds 1.0, in grouping order
    pub critical_time_slots: Vec<TimeOfDay>,

    /// Per-slot analysis in grouping order
    pub time_slot_analysis: Vec<SlotAnalysis>,

    /// Severity band of the maximum ratio
    pub overall_status: CongestionStatus,

    /// Advisory stagger recommendations for high/critical slots
    pub recommendations: Vec<Recommendation>,
}

impl CongestionSnapshot {
    /// Look up the analysis for a specific slot time.
    pub fn slot(&self, time: TimeOfDay) -> Option<&SlotAnalysis> {
        self.time_slot_analysis.iter().find(|s| s.time_slot == time)
    }
}
