//! Commitments: promised timing adjustments between classrooms.
//!
//! A commitment is a promise from one classroom to another that the target
//! will apply a signed adjustment on a given episode date. When an offer is
//! accepted, a reciprocal promise with the opposite adjustment is generated
//! for the next episode, encoding the fairness contract: whoever benefits
//! now owes the opposite adjustment later.
//!
//! Status is pending until exactly one resolution, after which it is
//! terminal (fulfilled or violated) and the commitment moves from the
//! ledger's active set into history. It is never re-evaluated.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::core::time::EpisodeDate;

/// Direction of a timing adjustment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommitmentKind {
    /// Positive adjustment: class ends later
    Extend,
    /// Non-positive adjustment: class ends earlier (or on time)
    Shorten,
}

impl CommitmentKind {
    /// Kind implied by an adjustment's sign.
    pub fn from_adjustment(minutes: i64) -> Self {
        if minutes > 0 {
            CommitmentKind::Extend
        } else {
            CommitmentKind::Shorten
        }
    }

    /// The opposite direction (used for reciprocals).
    pub fn opposite(self) -> Self {
        match self {
            CommitmentKind::Extend => CommitmentKind::Shorten,
            CommitmentKind::Shorten => CommitmentKind::Extend,
        }
    }
}

/// Lifecycle state of a commitment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommitmentStatus {
    Pending,
    Fulfilled,
    Violated,
}

/// The counter-promise attached to an offer: a negated adjustment due one
/// episode interval later.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReciprocalTerms {
    /// Due date of the reciprocal (offer date + episode interval)
    pub episode_date: EpisodeDate,

    /// Exact negation of the original adjustment
    pub adjustment_minutes: i64,

    /// Opposite of the original kind
    pub kind: CommitmentKind,
}

/// A promise from one classroom to another
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Commitment {
    /// Unique id; the ledger resolves by id so a commitment can only be
    /// resolved once
    pub id: Uuid,

    /// Proposing classroom
    pub from_classroom: String,

    /// Classroom that applies the adjustment
    pub to_classroom: String,

    /// Episode date on which the adjustment falls due
    pub episode_date: EpisodeDate,

    /// Direction label matching the adjustment sign
    pub kind: CommitmentKind,

    /// Signed adjustment in minutes
    pub adjustment_minutes: i64,

    /// Reciprocal counter-promise, if any
    pub reciprocal: Option<ReciprocalTerms>,

    /// Current lifecycle state
    pub status: CommitmentStatus,
}

impl Commitment {
    /// Create a pending commitment without a reciprocal.
    pub fn new(
        from_classroom: String,
        to_classroom: String,
        episode_date: EpisodeDate,
        adjustment_minutes: i64,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            from_classroom,
            to_classroom,
            episode_date,
            kind: CommitmentKind::from_adjustment(adjustment_minutes),
            adjustment_minutes,
            reciprocal: None,
            status: CommitmentStatus::Pending,
        }
    }

    /// Materialize the reciprocal terms as a new pending commitment between
    /// the same pair of classrooms.
    pub fn reciprocal_commitment(&self) -> Option<Commitment> {
        self.reciprocal.as_ref().map(|terms| Commitment {
            id: Uuid::new_v4(),
            from_classroom: self.from_classroom.clone(),
            to_classroom: self.to_classroom.clone(),
            episode_date: terms.episode_date,
            kind: terms.kind,
            adjustment_minutes: terms.adjustment_minutes,
            reciprocal: None,
            status: CommitmentStatus::Pending,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_from_adjustment_sign() {
        assert_eq!(CommitmentKind::from_adjustment(3), CommitmentKind::Extend);
        assert_eq!(CommitmentKind::from_adjustment(-3), CommitmentKind::Shorten);
        // Zero labels as shorten, matching the non-positive branch
        assert_eq!(CommitmentKind::from_adjustment(0), CommitmentKind::Shorten);
    }

    #[test]
    fn test_reciprocal_commitment_inherits_pair() {
        let mut c = Commitment::new(
            "C101".to_string(),
            "C102".to_string(),
            EpisodeDate::new(2025, 3, 28),
            2,
        );
        c.reciprocal = Some(ReciprocalTerms {
            episode_date: EpisodeDate::new(2025, 4, 4),
            adjustment_minutes: -2,
            kind: CommitmentKind::Shorten,
        });

        let r = c.reciprocal_commitment().unwrap();
        assert_eq!(r.from_classroom, "C101");
        assert_eq!(r.to_classroom, "C102");
        assert_eq!(r.adjustment_minutes, -2);
        assert_eq!(r.status, CommitmentStatus::Pending);
        assert_ne!(r.id, c.id);
    }
}
