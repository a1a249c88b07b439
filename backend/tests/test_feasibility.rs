//! Tests for the deterministic feasibility scorer.

use exit_coordination_core::{CoordinationConfig, FeasibilityScorer, PreferenceAlignment};
use proptest::prelude::*;

fn scorer() -> FeasibilityScorer {
    FeasibilityScorer::new(&CoordinationConfig::default())
}

// ============================================================================
// Exact scores on the reference cases
// ============================================================================

#[test]
fn test_aligned_extension_scores() {
    let report = scorer().evaluate(0.3, 2, 0);
    assert!((report.score - 0.86).abs() < 1e-12);
    assert!(report.is_feasible);
    assert_eq!(report.alignment, PreferenceAlignment::Neutral);
    // Alignment bands are strict; 0.3 sits on the boundary but the score
    // branch is inclusive.
}

#[test]
fn test_neutral_shortening_loses_score_per_minute() {
    let two = scorer().evaluate(0.0, -2, 0);
    let four = scorer().evaluate(0.0, -4, 0);
    assert!((two.score - 0.5).abs() < 1e-12);
    assert!((four.score - 0.4).abs() < 1e-12);
    assert!(!two.is_feasible);
}

#[test]
fn test_opposed_adjustment_floors_at_min_score() {
    let report = scorer().evaluate(-1.0, 2, 0);
    assert!((report.score - 0.1).abs() < 1e-12);
    assert_eq!(report.alignment, PreferenceAlignment::Opposed);
    assert!(!report.is_feasible);
}

#[test]
fn test_perfectly_flexible_professor_caps_at_one() {
    let report = scorer().evaluate(1.0, 3, 0);
    assert!((report.score - 1.0).abs() < 1e-12);
}

// ============================================================================
// Cumulative budget handling
// ============================================================================

#[test]
fn test_budget_boundary_is_inclusive() {
    // Total of exactly 8 stays within limits; 9 does not.
    let at_limit = scorer().evaluate(0.5, 2, 6);
    assert!(at_limit.within_limits);
    assert!((at_limit.score - 0.9).abs() < 1e-12);

    let over = scorer().evaluate(0.5, 3, 6);
    assert!(!over.within_limits);
    assert!((over.score - 0.9 * 0.3).abs() < 1e-12);
    assert!(!over.is_feasible);
}

#[test]
fn test_negative_totals_count_against_budget_too() {
    let report = scorer().evaluate(-0.5, -4, -5);
    assert_eq!(report.total_adjustment, -9);
    assert!(!report.within_limits);
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #[test]
    fn prop_score_is_deterministic(
        flexibility in -1.0f64..=1.0,
        proposed in -10i64..=10,
        current in -10i64..=10,
    ) {
        let a = scorer().evaluate(flexibility, proposed, current);
        let b = scorer().evaluate(flexibility, proposed, current);
        prop_assert_eq!(a, b);
    }

    #[test]
    fn prop_score_stays_in_unit_interval(
        flexibility in -1.0f64..=1.0,
        proposed in -10i64..=10,
        current in -10i64..=10,
    ) {
        let report = scorer().evaluate(flexibility, proposed, current);
        prop_assert!(report.score > 0.0);
        prop_assert!(report.score <= 1.0);
    }

    #[test]
    fn prop_over_limit_always_dampens(
        flexibility in -1.0f64..=1.0,
        proposed in 1i64..=8,
        current in 8i64..=20,
    ) {
        // current >= 8 and proposed >= 1 guarantees the total exceeds the
        // default budget of 8
        let report = scorer().evaluate(flexibility, proposed, current);
        prop_assert!(!report.within_limits);
        let unconstrained = scorer().evaluate(flexibility, proposed, 0);
        prop_assert!((report.score - unconstrained.score * 0.3).abs() < 1e-12);
    }
}
