//! Offer construction and acceptance scoring.
//!
//! Offers are commitments-in-waiting: a proposed adjustment for the current
//! episode paired with an automatically generated reciprocal for the next
//! one. The reciprocal is always the exact negation of the original, due one
//! episode interval later — whoever benefits now owes the opposite
//! adjustment next episode.
//!
//! Acceptance is unilateral from the recipient's perspective: the evaluator
//! blends the recipient's feasibility for both halves of the deal with its
//! reputation and violation history, and the proposer is not re-consulted.

use serde::{Deserialize, Serialize};

use crate::config::CoordinationConfig;
use crate::core::time::EpisodeDate;
use crate::feasibility::FeasibilityScorer;
use crate::models::agent::ClassroomAgent;
use crate::models::commitment::{Commitment, CommitmentKind, ReciprocalTerms};

/// Individual terms feeding an acceptance score
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DecisionFactors {
    pub current_feasibility: f64,
    pub reciprocal_feasibility: f64,
    pub reputation_bonus: f64,
    pub violation_penalty: f64,
}

/// Result of scoring an incoming offer
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OfferEvaluation {
    /// Weighted blend of feasibilities, reputation, and violations
    pub overall_score: f64,

    /// overall_score above the configured acceptance threshold
    pub should_accept: bool,

    /// The immediate adjustment is feasible on its own
    pub current_feasible: bool,

    /// The reciprocal adjustment is feasible on its own (true when the
    /// offer carries no reciprocal)
    pub reciprocal_feasible: bool,

    pub factors: DecisionFactors,
}

/// Builds offers and scores incoming ones
#[derive(Debug, Clone)]
pub struct OfferEvaluator {
    scorer: FeasibilityScorer,
    current_weight: f64,
    reciprocal_weight: f64,
    reputation_weight: f64,
    violation_penalty_per_count: f64,
    acceptance_threshold: f64,
    episode_interval_days: i64,
}

impl OfferEvaluator {
    pub fn new(config: &CoordinationConfig) -> Self {
        Self {
            scorer: FeasibilityScorer::new(config),
            current_weight: config.negotiation.current_weight,
            reciprocal_weight: config.negotiation.reciprocal_weight,
            reputation_weight: config.negotiation.reputation_weight,
            violation_penalty_per_count: config.negotiation.violation_penalty_per_count,
            acceptance_threshold: config.negotiation.offer_acceptance_threshold,
            episode_interval_days: config.episode_interval_days,
        }
    }

    /// Build a commitment offer with its reciprocal counter-promise.
    ///
    /// The kind follows the adjustment's sign; the reciprocal negates the
    /// adjustment, flips the kind, and falls due one episode interval after
    /// the offer date.
    pub fn make_offer(
        &self,
        from_agent: &ClassroomAgent,
        to_classroom_id: &str,
        adjustment_minutes: i64,
        episode_date: EpisodeDate,
    ) -> Commitment {
        let kind = CommitmentKind::from_adjustment(adjustment_minutes);
        let mut offer = Commitment::new(
            from_agent.id().to_string(),
            to_classroom_id.to_string(),
            episode_date,
            adjustment_minutes,
        );
        offer.reciprocal = Some(ReciprocalTerms {
            episode_date: episode_date.advance_days(self.episode_interval_days),
            adjustment_minutes: -adjustment_minutes,
            kind: kind.opposite(),
        });
        offer
    }

    /// Score an incoming offer from the recipient's perspective.
    ///
    /// Both the immediate and the reciprocal adjustment are evaluated
    /// against the recipient's *current* state; the reciprocal does not get
    /// the benefit of the immediate adjustment having been applied.
    pub fn evaluate_offer(
        &self,
        recipient: &ClassroomAgent,
        offer: &Commitment,
    ) -> OfferEvaluation {
        let current = self.scorer.evaluate(
            recipient.flexibility(),
            offer.adjustment_minutes,
            recipient.current_adjustment(),
        );

        let (reciprocal_feasibility, reciprocal_feasible) = match &offer.reciprocal {
            Some(terms) => {
                let report = self.scorer.evaluate(
                    recipient.flexibility(),
                    terms.adjustment_minutes,
                    recipient.current_adjustment(),
                );
                (report.score, report.is_feasible)
            }
            None => (1.0, true),
        };

        let reputation_bonus = (recipient.reputation() - 0.5) * self.reputation_weight;
        let violation_penalty =
            f64::from(recipient.violation_count()) * self.violation_penalty_per_count;

        let overall_score = current.score * self.current_weight
            + reciprocal_feasibility * self.reciprocal_weight
            + reputation_bonus
            - violation_penalty;

        OfferEvaluation {
            overall_score,
            should_accept: overall_score > self.acceptance_threshold,
            current_feasible: current.is_feasible,
            reciprocal_feasible,
            factors: DecisionFactors {
                current_feasibility: current.score,
                reciprocal_feasibility,
                reputation_bonus,
                violation_penalty,
            },
        }
    }
}
