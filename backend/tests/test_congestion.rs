//! Tests for congestion analysis and risk banding.

use exit_coordination_core::{
    ClassroomAgent, CongestionAnalyzer, CongestionStatus, RecommendationPriority, RiskBands,
    TimeOfDay,
};

fn agent(id: &str, students: u32, flexibility: f64, time: TimeOfDay) -> ClassroomAgent {
    ClassroomAgent::new(id.to_string(), students, flexibility, time)
}

// ============================================================================
// Band boundaries (strict > comparisons)
// ============================================================================

#[test]
fn test_band_boundaries_are_exclusive() {
    let bands = RiskBands::default();
    assert_eq!(bands.status_for(0.0), CongestionStatus::Normal);
    assert_eq!(bands.status_for(0.69), CongestionStatus::Normal);
    assert_eq!(bands.status_for(0.7), CongestionStatus::Normal);
    assert_eq!(bands.status_for(0.71), CongestionStatus::Moderate);
    assert_eq!(bands.status_for(1.0), CongestionStatus::Moderate);
    assert_eq!(bands.status_for(1.01), CongestionStatus::High);
    assert_eq!(bands.status_for(1.5), CongestionStatus::High);
    assert_eq!(bands.status_for(1.51), CongestionStatus::Critical);
}

#[test]
fn test_status_ordering_matches_severity() {
    assert!(CongestionStatus::Normal < CongestionStatus::Moderate);
    assert!(CongestionStatus::Moderate < CongestionStatus::High);
    assert!(CongestionStatus::High < CongestionStatus::Critical);
}

// ============================================================================
// Slot grouping
// ============================================================================

#[test]
fn test_grouping_by_effective_exit_time() {
    let analyzer = CongestionAnalyzer::new(RiskBands::default());
    let mut shifted = agent("C2", 50, 0.0, TimeOfDay::new(12, 30));
    shifted.apply_delta(5);
    let agents = vec![
        agent("C1", 50, 0.0, TimeOfDay::new(12, 35)),
        shifted,
        agent("C3", 40, 0.0, TimeOfDay::new(12, 30)),
    ];

    // C2's adjustment moves it into C1's slot
    let snapshot = analyzer.analyze(&agents, 150);
    assert_eq!(snapshot.time_slot_analysis.len(), 2);
    let merged = snapshot.slot(TimeOfDay::new(12, 35)).unwrap();
    assert_eq!(merged.students, 100);
    assert_eq!(merged.classrooms.len(), 2);
    assert_eq!(snapshot.total_students, 140);
}

#[test]
fn test_adjustment_across_midnight_groups_correctly() {
    let analyzer = CongestionAnalyzer::new(RiskBands::default());
    let mut late = agent("NIGHT", 30, 0.0, TimeOfDay::new(23, 59));
    late.apply_delta(2);
    let agents = vec![late, agent("EARLY", 30, 0.0, TimeOfDay::new(0, 1))];

    let snapshot = analyzer.analyze(&agents, 100);
    assert_eq!(snapshot.time_slot_analysis.len(), 1);
    assert_eq!(snapshot.time_slot_analysis[0].time_slot, TimeOfDay::new(0, 1));
    assert_eq!(snapshot.time_slot_analysis[0].students, 60);
}

// ============================================================================
// Critical slots and recommendations
// ============================================================================

#[test]
fn test_critical_slots_collects_ratios_above_one() {
    let analyzer = CongestionAnalyzer::new(RiskBands::default());
    let agents = vec![
        agent("A", 120, 0.0, TimeOfDay::new(12, 30)),
        agent("B", 90, 0.0, TimeOfDay::new(12, 35)),
        agent("C", 101, 0.0, TimeOfDay::new(12, 40)),
    ];

    let snapshot = analyzer.analyze(&agents, 100);
    assert_eq!(
        snapshot.critical_time_slots,
        vec![TimeOfDay::new(12, 30), TimeOfDay::new(12, 40)]
    );
    assert_eq!(snapshot.overall_status, CongestionStatus::High);
}

#[test]
fn test_recommendations_only_for_high_and_critical() {
    let analyzer = CongestionAnalyzer::new(RiskBands::default());
    let agents = vec![
        agent("A", 80, 0.0, TimeOfDay::new(12, 30)), // 0.8: moderate
        agent("B", 110, 0.0, TimeOfDay::new(12, 35)), // 1.1: high
        agent("C", 160, 0.0, TimeOfDay::new(12, 40)), // 1.6: critical
    ];

    let snapshot = analyzer.analyze(&agents, 100);
    assert_eq!(snapshot.recommendations.len(), 2);
    assert_eq!(snapshot.recommendations[0].time_slot, TimeOfDay::new(12, 35));
    assert_eq!(snapshot.recommendations[0].priority, RecommendationPriority::Medium);
    assert_eq!(snapshot.recommendations[1].priority, RecommendationPriority::High);
}

#[test]
fn test_empty_agent_list_is_quiet() {
    let analyzer = CongestionAnalyzer::new(RiskBands::default());
    let snapshot = analyzer.analyze(&[], 100);
    assert_eq!(snapshot.total_students, 0);
    assert_eq!(snapshot.max_congestion_ratio, 0.0);
    assert_eq!(snapshot.overall_status, CongestionStatus::Normal);
    assert!(snapshot.time_slot_analysis.is_empty());
    assert!(snapshot.recommendations.is_empty());
}
