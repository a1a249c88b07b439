//! Multi-episode runs: reciprocals made in one episode fall due in the next.

use exit_coordination_core::{
    BroadcastEvent, CoordinationConfig, EpisodeDate, EpisodeOrchestrator, ScenarioConfig,
    UnavailableProvider,
};

fn orchestrator() -> EpisodeOrchestrator {
    EpisodeOrchestrator::new(
        ScenarioConfig::demo(),
        CoordinationConfig::default(),
        Box::new(UnavailableProvider),
        EpisodeDate::new(2025, 3, 28),
    )
    .unwrap()
}

#[test]
fn test_episodes_run_one_interval_apart() {
    let mut orch = orchestrator();
    let results = orch.run_episodes(3).unwrap();

    assert_eq!(results.len(), 3);
    assert_eq!(results[0].episode_date, EpisodeDate::new(2025, 3, 28));
    assert_eq!(results[1].episode_date, EpisodeDate::new(2025, 4, 4));
    assert_eq!(results[2].episode_date, EpisodeDate::new(2025, 4, 11));
    for result in &results {
        assert_eq!(result.scenario, "demo");
    }
}

#[test]
fn test_reciprocals_fall_due_next_episode() {
    let mut orch = orchestrator();
    let results = orch.run_episodes(2).unwrap();

    // Episode 1: two accepted offers, each recording a +2 reciprocal
    let recorded: Vec<_> = results[0]
        .broadcasts
        .iter()
        .filter_map(|e| match e {
            BroadcastEvent::CommitmentReciprocalRecorded {
                to_classroom,
                episode_date,
                adjustment_minutes,
                ..
            } => Some((to_classroom.as_str(), *episode_date, *adjustment_minutes)),
            _ => None,
        })
        .collect();
    assert_eq!(
        recorded,
        vec![
            ("C101", EpisodeDate::new(2025, 4, 4), 2),
            ("C103", EpisodeDate::new(2025, 4, 4), 2),
        ]
    );

    // Episode 2: both reciprocals settle as fulfilled
    let settled: Vec<_> = results[1]
        .broadcasts
        .iter()
        .filter_map(|e| match e {
            BroadcastEvent::CommitmentDueResult {
                to_classroom,
                fulfilled,
                flagged,
                violation_count,
                ..
            } => Some((to_classroom.as_str(), *fulfilled, *flagged, *violation_count)),
            _ => None,
        })
        .collect();
    assert_eq!(settled, vec![("C101", true, false, 0), ("C103", true, false, 0)]);
}

#[test]
fn test_ledger_settles_completely_over_two_episodes() {
    let mut orch = orchestrator();
    orch.run_episodes(2).unwrap();

    // 2 accepted offers + 2 reciprocals, all resolved
    assert_eq!(orch.ledger().active_count(), 0);
    assert_eq!(orch.ledger().history().len(), 4);
    assert_eq!(orch.ledger().violation_count("C101"), 0);
    assert_eq!(orch.ledger().reputation_score("C101"), 1.0);

    // Whole-run broadcast log: 4 events from episode 1, 2 from episode 2
    assert_eq!(orch.broadcast_log().len(), 6);
    assert_eq!(
        orch.broadcast_log()
            .events_of_type("commitment_due_result")
            .len(),
        2
    );
    assert_eq!(orch.broadcast_log().events_for_classroom("C102").len(), 0);
}

#[test]
fn test_second_episode_starts_from_adjusted_schedule() {
    let mut orch = orchestrator();
    let results = orch.run_episodes(2).unwrap();

    // Episode 1 ends moderate; episode 2 inherits that schedule, so it
    // never sees the critical initial load again
    assert!(results[0].coordination_metrics.initial_risk > 1.5);
    assert!(results[1].coordination_metrics.initial_risk < 1.0);
    assert!(results[1].coordination_metrics.coordination_success);
}
