//! Corridor congestion analysis.
//!
//! Groups classrooms by effective exit time, computes per-slot load against
//! the bottleneck capacity, bands each slot by risk, and derives stagger
//! recommendations for the slots worth acting on.

use tracing::debug;

use crate::config::RiskBands;
use crate::models::agent::ClassroomAgent;
use crate::models::snapshot::{
    CongestionSnapshot, CongestionStatus, Recommendation, RecommendationPriority, SlotAnalysis,
    SlotMember, StaggerAdjustment,
};

/// Classrooms above this headcount are treated as flexible enough to move
const FLEXIBLE_STUDENT_THRESHOLD: u32 = 60;

/// Analyzes the exit schedule of a set of classrooms
#[derive(Debug, Clone)]
pub struct CongestionAnalyzer {
    bands: RiskBands,
}

impl CongestionAnalyzer {
    pub fn new(bands: RiskBands) -> Self {
        Self { bands }
    }

    /// Produce a full congestion snapshot for the given agents.
    ///
    /// Slots appear in first-encounter order of the agent list, so callers
    /// that keep agents in a stable order get stable snapshots.
    pub fn analyze(&self, agents: &[ClassroomAgent], capacity_per_minute: u32) -> CongestionSnapshot {
        let mut slots: Vec<SlotAnalysis> = Vec::new();

        for agent in agents {
            let time = agent.effective_exit_time();
            let member = SlotMember {
                classroom_id: agent.id().to_string(),
                students: agent.students(),
            };
            match slots.iter_mut().find(|s| s.time_slot == time) {
                Some(slot) => {
                    slot.students += agent.students();
                    slot.classrooms.push(member);
                }
                None => slots.push(SlotAnalysis {
                    time_slot: time,
                    students: agent.students(),
                    capacity_per_minute,
                    congestion_ratio: 0.0,
                    status: CongestionStatus::Normal,
                    classrooms: vec![member],
                }),
            }
        }

        let mut max_ratio = 0.0_f64;
        let mut critical_time_slots = Vec::new();
        for slot in &mut slots {
            slot.congestion_ratio = f64::from(slot.students) / f64::from(capacity_per_minute);
            slot.status = self.bands.status_for(slot.congestion_ratio);
            if slot.congestion_ratio > max_ratio {
                max_ratio = slot.congestion_ratio;
            }
            if slot.congestion_ratio > 1.0 {
                critical_time_slots.push(slot.time_slot);
            }
            debug!(
                time_slot = %slot.time_slot,
                students = slot.students,
                ratio = slot.congestion_ratio,
                status = %slot.status,
                "analyzed exit slot"
            );
        }

        let recommendations = slots
            .iter()
            .filter(|s| s.status >= CongestionStatus::High)
            .filter_map(|s| self.recommend(s, capacity_per_minute))
            .collect();

        CongestionSnapshot {
            total_students: agents.iter().map(ClassroomAgent::students).sum(),
            capacity_per_minute,
            max_congestion_ratio: max_ratio,
            critical_time_slots,
            time_slot_analysis: slots,
            overall_status: self.bands.status_for(max_ratio),
            recommendations,
        }
    }

    /// Build a stagger recommendation for an overloaded slot.
    ///
    /// Larger classrooms are assumed movable and smaller ones not; slots
    /// with no movable member get no recommendation at all. Staggers
    /// alternate direction and grow outward so the slot spreads instead of
    /// shifting wholesale. No staggers are suggested when the movable
    /// classrooms alone fit within capacity.
    fn recommend(&self, slot: &SlotAnalysis, capacity_per_minute: u32) -> Option<Recommendation> {
        let flexible: Vec<&SlotMember> = slot
            .classrooms
            .iter()
            .filter(|m| m.students > FLEXIBLE_STUDENT_THRESHOLD)
            .collect();
        if flexible.is_empty() {
            return None;
        }
        let flexible_students: u32 = flexible.iter().map(|m| m.students).sum();

        let suggested_adjustments = if flexible_students > capacity_per_minute {
            flexible
                .iter()
                .enumerate()
                .map(|(i, member)| {
                    let magnitude = 2 + (i as i64) / 2;
                    let sign = if i % 2 == 0 { -1 } else { 1 };
                    StaggerAdjustment {
                        classroom_id: member.classroom_id.clone(),
                        suggested_adjustment: sign * magnitude,
                    }
                })
                .collect()
        } else {
            Vec::new()
        };

        Some(Recommendation {
            time_slot: slot.time_slot,
            priority: if slot.status == CongestionStatus::Critical {
                RecommendationPriority::High
            } else {
                RecommendationPriority::Medium
            },
            target_classrooms: flexible
                .iter()
                .map(|m| m.classroom_id.clone())
                .collect(),
            suggested_adjustments,
        })
    }
}
