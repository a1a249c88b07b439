//! Tests for commitments, reciprocals, the ledger, and reputation.

use exit_coordination_core::{
    ClassroomAgent, Commitment, CommitmentKind, CommitmentLedger, CommitmentStatus,
    CoordinationConfig, EpisodeDate, OfferEvaluator, TimeOfDay,
};

fn proposer() -> ClassroomAgent {
    ClassroomAgent::new("C102".to_string(), 95, -0.2, TimeOfDay::new(12, 30))
}

// ============================================================================
// Offers and reciprocals
// ============================================================================

#[test]
fn test_offer_carries_negated_reciprocal_one_interval_later() {
    let evaluator = OfferEvaluator::new(&CoordinationConfig::default());
    let date = EpisodeDate::new(2025, 3, 28);
    let offer = evaluator.make_offer(&proposer(), "C101", -2, date);

    assert_eq!(offer.from_classroom, "C102");
    assert_eq!(offer.to_classroom, "C101");
    assert_eq!(offer.kind, CommitmentKind::Shorten);
    assert_eq!(offer.status, CommitmentStatus::Pending);

    let reciprocal = offer.reciprocal.as_ref().unwrap();
    assert_eq!(reciprocal.adjustment_minutes, 2);
    assert_eq!(reciprocal.kind, CommitmentKind::Extend);
    assert_eq!(reciprocal.episode_date, EpisodeDate::new(2025, 4, 4));
}

#[test]
fn test_reciprocal_materializes_as_fresh_pending_commitment() {
    let evaluator = OfferEvaluator::new(&CoordinationConfig::default());
    let offer = evaluator.make_offer(&proposer(), "C101", 3, EpisodeDate::new(2025, 3, 28));

    let reciprocal = offer.reciprocal_commitment().unwrap();
    assert_ne!(reciprocal.id, offer.id);
    assert_eq!(reciprocal.to_classroom, "C101");
    assert_eq!(reciprocal.adjustment_minutes, -3);
    assert!(reciprocal.reciprocal.is_none());
}

// ============================================================================
// Ledger lifecycle
// ============================================================================

#[test]
fn test_due_filters_on_exact_date() {
    let mut ledger = CommitmentLedger::new(3);
    let today = EpisodeDate::new(2025, 3, 28);
    let next_week = today.advance_days(7);
    ledger.record(Commitment::new("A".into(), "B".into(), today, -2));
    ledger.record(Commitment::new("A".into(), "B".into(), next_week, 2));

    assert_eq!(ledger.due(today).len(), 1);
    assert_eq!(ledger.due(next_week).len(), 1);
    assert_eq!(ledger.due(today.advance_days(1)).len(), 0);
}

#[test]
fn test_resolution_is_exactly_once() {
    let mut ledger = CommitmentLedger::new(3);
    let date = EpisodeDate::new(2025, 3, 28);
    let id = ledger.record(Commitment::new("A".into(), "B".into(), date, -2));

    let outcome = ledger.resolve(id, true).unwrap();
    assert_eq!(outcome.classroom_id, "B");
    assert!(ledger.resolve(id, false).is_err());
    assert!(ledger.due(date).is_empty());
    assert_eq!(ledger.history().len(), 1);
    assert_eq!(ledger.history()[0].status, CommitmentStatus::Fulfilled);
}

#[test]
fn test_flagging_starts_exactly_at_threshold() {
    let mut ledger = CommitmentLedger::new(3);
    let date = EpisodeDate::new(2025, 3, 28);

    for expected_flag in [false, false, true, true] {
        let id = ledger.record(Commitment::new("A".into(), "B".into(), date, -2));
        let outcome = ledger.resolve(id, false).unwrap();
        assert_eq!(outcome.flagged, expected_flag);
    }
    assert_eq!(ledger.violation_count("B"), 4);
}

#[test]
fn test_fulfilled_resolution_never_flags() {
    let mut ledger = CommitmentLedger::new(1);
    let date = EpisodeDate::new(2025, 3, 28);
    let id = ledger.record(Commitment::new("A".into(), "B".into(), date, -2));
    let outcome = ledger.resolve(id, true).unwrap();
    assert!(!outcome.flagged);
}

// ============================================================================
// Reputation: ledger-derived and agent-held
// ============================================================================

#[test]
fn test_ledger_reputation_tracks_history() {
    let mut ledger = CommitmentLedger::new(3);
    let date = EpisodeDate::new(2025, 3, 28);
    assert_eq!(ledger.reputation_score("B"), 1.0);

    for fulfilled in [true, false, true, true] {
        let id = ledger.record(Commitment::new("A".into(), "B".into(), date, -2));
        ledger.resolve(id, fulfilled).unwrap();
    }
    // 3/4 fulfilled minus one violation's penalty
    assert!((ledger.reputation_score("B") - 0.65).abs() < 1e-12);

    // Unrelated classrooms keep the prior
    assert_eq!(ledger.reputation_score("C"), 1.0);
}

#[test]
fn test_agent_reputation_is_bounded() {
    let config = CoordinationConfig::default();
    let mut agent = ClassroomAgent::new("C101".to_string(), 80, 0.3, TimeOfDay::new(12, 30));

    agent.record_fulfillment(true, &config.reputation);
    assert_eq!(agent.reputation(), 1.0); // capped at max

    for _ in 0..10 {
        agent.record_fulfillment(false, &config.reputation);
    }
    assert_eq!(agent.reputation(), 0.0); // floored at min
    assert_eq!(agent.violation_count(), 10);
}
