//! Commitment ledger: the sole mutator of commitment status.
//!
//! The ledger owns every commitment made during a run, split into an active
//! set (pending) and history (terminal). Resolution happens by id and
//! removes the commitment from the active set, so a commitment can only be
//! resolved once by construction — a resolved id is simply no longer there
//! to resolve, and never re-appears in `due()`.
//!
//! Violation counts and the derived reputation score are recomputed from
//! history on demand; they are independent of the reputation field stored
//! on each agent, which the orchestrator updates separately with the same
//! fulfilment outcome.

use thiserror::Error;
use uuid::Uuid;

use crate::core::time::EpisodeDate;
use crate::models::commitment::{Commitment, CommitmentStatus};

/// Ledger operation errors
#[derive(Debug, Error, PartialEq)]
pub enum LedgerError {
    #[error("no active commitment with id {0}")]
    NotFound(Uuid),
}

/// Outcome of resolving a due commitment
#[derive(Debug, Clone, PartialEq)]
pub struct ResolveOutcome {
    /// Classroom the commitment targeted
    pub classroom_id: String,

    /// Violation count recomputed from history after this resolution
    pub violation_count: u32,

    /// True when a violation pushed the count to the threshold or beyond
    pub flagged: bool,
}

/// Tracks commitments across the episodes of one run
///
/// # Example
/// ```
/// use exit_coordination_core::{Commitment, CommitmentLedger, EpisodeDate};
///
/// let mut ledger = CommitmentLedger::new(3);
/// let due = EpisodeDate::new(2025, 3, 28);
/// let c = Commitment::new("C101".into(), "C102".into(), due, -2);
/// let id = c.id;
/// ledger.record(c);
///
/// assert_eq!(ledger.due(due).len(), 1);
/// ledger.resolve(id, true).unwrap();
/// assert!(ledger.due(due).is_empty());
/// ```
#[derive(Debug, Clone)]
pub struct CommitmentLedger {
    active: Vec<Commitment>,
    history: Vec<Commitment>,
    violation_threshold: u32,
}

impl CommitmentLedger {
    /// Create an empty ledger with the given flagging threshold.
    pub fn new(violation_threshold: u32) -> Self {
        Self {
            active: Vec::new(),
            history: Vec::new(),
            violation_threshold,
        }
    }

    /// Record a new pending commitment.
    ///
    /// Duplicates are legal: two independent promises may target the same
    /// pair and date.
    pub fn record(&mut self, commitment: Commitment) -> Uuid {
        let id = commitment.id;
        self.active.push(commitment);
        id
    }

    /// All active commitments falling due on exactly this date.
    pub fn due(&self, episode_date: EpisodeDate) -> Vec<Commitment> {
        self.active
            .iter()
            .filter(|c| c.episode_date == episode_date)
            .cloned()
            .collect()
    }

    /// Resolve an active commitment as fulfilled or violated.
    ///
    /// Moves it from the active set to history (terminal, never
    /// re-evaluated) and recomputes the target's violation count. The
    /// outcome is flagged when the resolution was a violation and the
    /// recomputed count reaches the threshold.
    pub fn resolve(&mut self, id: Uuid, fulfilled: bool) -> Result<ResolveOutcome, LedgerError> {
        let position = self
            .active
            .iter()
            .position(|c| c.id == id)
            .ok_or(LedgerError::NotFound(id))?;

        let mut commitment = self.active.remove(position);
        commitment.status = if fulfilled {
            CommitmentStatus::Fulfilled
        } else {
            CommitmentStatus::Violated
        };
        let classroom_id = commitment.to_classroom.clone();
        self.history.push(commitment);

        let violation_count = self.violation_count(&classroom_id);
        Ok(ResolveOutcome {
            flagged: !fulfilled && violation_count >= self.violation_threshold,
            classroom_id,
            violation_count,
        })
    }

    /// Violations recorded against a classroom, counted from history.
    pub fn violation_count(&self, classroom_id: &str) -> u32 {
        self.history
            .iter()
            .filter(|c| c.to_classroom == classroom_id && c.status == CommitmentStatus::Violated)
            .count() as u32
    }

    /// Derived reputation from commitment history.
    ///
    /// New entrants with no history get the optimistic prior of 1.0.
    /// Otherwise: fulfilled / total, minus min(0.5, violations * 0.1),
    /// floored at 0.0.
    pub fn reputation_score(&self, classroom_id: &str) -> f64 {
        let (fulfilled, total) = self
            .history
            .iter()
            .filter(|c| c.to_classroom == classroom_id)
            .fold((0u32, 0u32), |(f, t), c| {
                let f = if c.status == CommitmentStatus::Fulfilled {
                    f + 1
                } else {
                    f
                };
                (f, t + 1)
            });

        if total == 0 {
            return 1.0;
        }

        let base = f64::from(fulfilled) / f64::from(total);
        let penalty = (f64::from(total - fulfilled) * 0.1).min(0.5);
        (base - penalty).max(0.0)
    }

    /// Number of still-pending commitments.
    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    /// All resolved commitments, oldest first.
    pub fn history(&self) -> &[Commitment] {
        &self.history
    }
}
