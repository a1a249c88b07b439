//! Classroom agent model
//!
//! Represents one classroom/professor pairing with adjustable exit timing.
//! Each agent carries:
//! - Population count (students exiting through the shared bottleneck)
//! - Professor flexibility in [-1.0, 1.0] (negative = prefers shorter
//!   duration, positive = prefers longer)
//! - Cumulative timing adjustment in minutes, mutated across the run
//! - Violation count and reputation score for commitment accountability
//!
//! Agents are created once per scenario load and live for the whole
//! multi-episode run; there is no persistence beyond the run.

use serde::{Deserialize, Serialize};

use crate::config::ReputationConfig;
use crate::core::time::TimeOfDay;
use crate::scenario::ClassroomConfig;

/// State of a single classroom in the coordination system
///
/// # Example
/// ```
/// use exit_coordination_core::ClassroomAgent;
///
/// let mut agent = ClassroomAgent::new("C101".to_string(), 80, 0.3, "12:30".parse().unwrap());
/// assert_eq!(agent.current_adjustment(), 0);
/// assert_eq!(agent.reputation(), 1.0);
///
/// agent.apply_delta(-2);
/// assert_eq!(agent.effective_exit_time().to_string(), "12:28");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassroomAgent {
    /// Stable identifier (e.g., "C101")
    id: String,

    /// Number of students exiting through the bottleneck (positive)
    students: u32,

    /// Professor flexibility in [-1.0, 1.0]
    flexibility: f64,

    /// Scheduled exit time before any adjustment
    base_end_time: TimeOfDay,

    /// Cumulative adjustment in minutes (signed). Mutated by accepted
    /// adjustments and fulfilled commitments.
    current_adjustment: i64,

    /// Commitment violations recorded against this classroom
    violation_count: u32,

    /// Stored reputation score in [0.0, 1.0], initial 1.0
    reputation: f64,

    /// Subject taught (scenario metadata, used in reports)
    subject: String,

    /// Professor name (scenario metadata, used in reports)
    professor_name: String,
}

impl ClassroomAgent {
    /// Create a new agent with default metadata.
    pub fn new(id: String, students: u32, flexibility: f64, base_end_time: TimeOfDay) -> Self {
        Self {
            id,
            students,
            flexibility,
            base_end_time,
            current_adjustment: 0,
            violation_count: 0,
            reputation: 1.0,
            subject: String::new(),
            professor_name: String::new(),
        }
    }

    /// Create an agent from a validated scenario entry, seeded with the
    /// configured starting reputation.
    pub fn from_config(config: &ClassroomConfig, initial_reputation: f64) -> Self {
        Self {
            id: config.id.clone(),
            students: config.students,
            flexibility: config.professor_flexibility,
            base_end_time: config.base_end_time,
            current_adjustment: 0,
            violation_count: 0,
            reputation: initial_reputation,
            subject: config.subject.clone(),
            professor_name: config.professor_name.clone(),
        }
    }

    /// Exit time with the current cumulative adjustment applied.
    pub fn effective_exit_time(&self) -> TimeOfDay {
        self.base_end_time.shift_minutes(self.current_adjustment)
    }

    /// Add a signed delta to the cumulative adjustment.
    ///
    /// Used when a due commitment is fulfilled or a negotiated offer is
    /// accepted.
    pub fn apply_delta(&mut self, minutes: i64) {
        self.current_adjustment += minutes;
    }

    /// Replace the cumulative adjustment entirely.
    ///
    /// Used when an autonomous decision supersedes the agent's prior stance
    /// for the episode.
    pub fn set_adjustment(&mut self, minutes: i64) {
        self.current_adjustment = minutes;
    }

    /// Update stored reputation after a commitment resolution.
    ///
    /// Fulfilment raises reputation by the configured bonus (capped at the
    /// maximum); violation lowers it by the configured penalty (floored at
    /// the minimum) and increments the violation counter. This is the
    /// agent-held bookkeeping; the ledger independently recounts violations
    /// from history.
    pub fn record_fulfillment(&mut self, fulfilled: bool, config: &ReputationConfig) {
        if fulfilled {
            self.reputation = (self.reputation + config.fulfillment_bonus).min(config.max);
        } else {
            self.reputation = (self.reputation - config.violation_penalty).max(config.min);
            self.violation_count += 1;
        }
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn students(&self) -> u32 {
        self.students
    }

    pub fn flexibility(&self) -> f64 {
        self.flexibility
    }

    pub fn base_end_time(&self) -> TimeOfDay {
        self.base_end_time
    }

    pub fn current_adjustment(&self) -> i64 {
        self.current_adjustment
    }

    pub fn violation_count(&self) -> u32 {
        self.violation_count
    }

    pub fn reputation(&self) -> f64 {
        self.reputation
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }

    pub fn professor_name(&self) -> &str {
        &self.professor_name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn agent() -> ClassroomAgent {
        ClassroomAgent::new("C101".to_string(), 80, 0.3, TimeOfDay::new(12, 30))
    }

    #[test]
    fn test_reputation_capped_at_max() {
        let mut a = agent();
        a.record_fulfillment(true, &ReputationConfig::default());
        assert_eq!(a.reputation(), 1.0);
        assert_eq!(a.violation_count(), 0);
    }

    #[test]
    fn test_violation_lowers_reputation_and_counts() {
        let mut a = agent();
        let config = ReputationConfig::default();
        a.record_fulfillment(false, &config);
        assert!((a.reputation() - 0.8).abs() < 1e-12);
        assert_eq!(a.violation_count(), 1);

        // Repeated violations floor at the configured minimum
        for _ in 0..10 {
            a.record_fulfillment(false, &config);
        }
        assert_eq!(a.reputation(), 0.0);
        assert_eq!(a.violation_count(), 11);
    }

    #[test]
    fn test_effective_exit_time_tracks_adjustment() {
        let mut a = agent();
        a.apply_delta(5);
        a.apply_delta(-2);
        assert_eq!(a.current_adjustment(), 3);
        assert_eq!(a.effective_exit_time(), TimeOfDay::new(12, 33));
    }
}
