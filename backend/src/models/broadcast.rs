//! Broadcast log: ledger and negotiation events emitted during an episode.
//!
//! Every commitment state change is broadcast so downstream consumers (the
//! episode report, multi-episode summaries) can reconstruct what the
//! negotiation did. Events serialize with a `type` tag whose values are part
//! of the external interface:
//! `commitment_due_result`, `commitment_offer_accepted`,
//! `commitment_reciprocal_recorded`.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::core::time::EpisodeDate;

/// An episode event involving the commitment ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BroadcastEvent {
    /// A due commitment was resolved (fulfilled or violated)
    CommitmentDueResult {
        commitment_id: Uuid,
        from_classroom: String,
        to_classroom: String,
        adjustment_minutes: i64,
        fulfilled: bool,
        /// True when the violation pushed the target over the threshold
        flagged: bool,
        violation_count: u32,
    },

    /// A negotiated offer was accepted and its adjustment applied
    CommitmentOfferAccepted {
        commitment_id: Uuid,
        from_classroom: String,
        to_classroom: String,
        adjustment_minutes: i64,
        overall_score: f64,
    },

    /// The reciprocal of an accepted offer was recorded for a future episode
    CommitmentReciprocalRecorded {
        commitment_id: Uuid,
        from_classroom: String,
        to_classroom: String,
        episode_date: EpisodeDate,
        adjustment_minutes: i64,
    },
}

impl BroadcastEvent {
    /// The `type` tag this event serializes under.
    pub fn event_type(&self) -> &'static str {
        match self {
            BroadcastEvent::CommitmentDueResult { .. } => "commitment_due_result",
            BroadcastEvent::CommitmentOfferAccepted { .. } => "commitment_offer_accepted",
            BroadcastEvent::CommitmentReciprocalRecorded { .. } => "commitment_reciprocal_recorded",
        }
    }

    /// Classroom on the receiving end of the commitment.
    pub fn to_classroom(&self) -> &str {
        match self {
            BroadcastEvent::CommitmentDueResult { to_classroom, .. } => to_classroom,
            BroadcastEvent::CommitmentOfferAccepted { to_classroom, .. } => to_classroom,
            BroadcastEvent::CommitmentReciprocalRecorded { to_classroom, .. } => to_classroom,
        }
    }

    /// Id of the commitment this event refers to.
    pub fn commitment_id(&self) -> Uuid {
        match self {
            BroadcastEvent::CommitmentDueResult { commitment_id, .. } => *commitment_id,
            BroadcastEvent::CommitmentOfferAccepted { commitment_id, .. } => *commitment_id,
            BroadcastEvent::CommitmentReciprocalRecorded { commitment_id, .. } => *commitment_id,
        }
    }
}

/// Ordered event log for one or more episodes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BroadcastLog {
    events: Vec<BroadcastEvent>,
}

impl BroadcastLog {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn log(&mut self, event: BroadcastEvent) {
        self.events.push(event);
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn events(&self) -> &[BroadcastEvent] {
        &self.events
    }

    /// Events carrying a specific `type` tag.
    pub fn events_of_type(&self, event_type: &str) -> Vec<&BroadcastEvent> {
        self.events
            .iter()
            .filter(|e| e.event_type() == event_type)
            .collect()
    }

    /// Events whose commitment targets a specific classroom.
    pub fn events_for_classroom(&self, classroom_id: &str) -> Vec<&BroadcastEvent> {
        self.events
            .iter()
            .filter(|e| e.to_classroom() == classroom_id)
            .collect()
    }
}
