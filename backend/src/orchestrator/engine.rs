//! Episode engine.
//!
//! Runs the full coordination loop for a scenario:
//!
//! ```text
//! For each episode:
//! 1. Analyze the exit schedule (initial snapshot)
//! 2a. Settle commitments falling due today
//! 2b. Negotiate peer offers for overloaded slots
//! 2c. Ask each agent in scope for a direct decision (with fallback)
//! 3. Re-analyze, build the schedule, compute metrics
//! ```
//!
//! Phases 2a and 2b apply deltas on top of whatever adjustment an agent
//! already carries; phase 2c sets the adjustment outright, so a direct
//! decision replaces earlier partial moves rather than stacking on them.
//!
//! # Example
//!
//! ```
//! use exit_coordination_core::config::CoordinationConfig;
//! use exit_coordination_core::core::time::EpisodeDate;
//! use exit_coordination_core::llm::UnavailableProvider;
//! use exit_coordination_core::orchestrator::EpisodeOrchestrator;
//! use exit_coordination_core::scenario::ScenarioConfig;
//!
//! let mut orchestrator = EpisodeOrchestrator::new(
//!     ScenarioConfig::demo(),
//!     CoordinationConfig::default(),
//!     Box::new(UnavailableProvider),
//!     EpisodeDate::new(2025, 3, 28),
//! )
//! .unwrap();
//!
//! let result = orchestrator.run_episode().unwrap();
//! assert!(result.coordination_metrics.final_risk <= result.coordination_metrics.initial_risk);
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::analysis::CongestionAnalyzer;
use crate::config::{ConfigError, CoordinationConfig, NegotiationScope};
use crate::core::time::{EpisodeDate, TimeOfDay};
use crate::feasibility::FeasibilityScorer;
use crate::ledger::{CommitmentLedger, LedgerError};
use crate::llm::{parse_decision, DecisionProvider, DecisionRequest};
use crate::models::agent::ClassroomAgent;
use crate::models::broadcast::{BroadcastEvent, BroadcastLog};
use crate::models::snapshot::{CongestionSnapshot, CongestionStatus, SlotMember};
use crate::negotiation::OfferEvaluator;
use crate::scenario::{ScenarioConfig, ScenarioError};

/// Errors surfaced by orchestration
#[derive(Debug, Error)]
pub enum CoordinationError {
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(#[from] ConfigError),

    #[error("invalid scenario: {0}")]
    InvalidScenario(#[from] ScenarioError),

    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

/// One agent's direct decision during phase 2c
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentDecisionRecord {
    pub classroom_id: String,

    /// Parsed decision keyword (`accept`, `reject`, `no_decision`)
    pub decision: String,

    pub proposed_adjustment: Option<i64>,

    pub reasoning: String,

    /// Feasibility of the suggested adjustment at decision time
    pub feasibility_score: f64,

    /// Adjustment the agent ended up set to (0 when declined)
    pub applied_adjustment: i64,

    /// Provider error text when the deterministic fallback was used
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// One classroom's line in the final schedule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleEntry {
    pub base_time: TimeOfDay,
    pub adjustment: i64,
    pub final_time: TimeOfDay,
    pub students: u32,
}

/// Aggregate outcome figures for one episode
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoordinationMetrics {
    pub initial_risk: f64,
    pub final_risk: f64,

    /// Non-negative drop in the maximum congestion ratio
    pub risk_reduction: f64,

    pub coordination_success: bool,

    /// Agents whose phase 2c decision left them with a non-zero adjustment
    pub agents_participated: usize,
}

/// Full report for one episode
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpisodeResult {
    pub episode_date: EpisodeDate,
    pub scenario: String,
    pub initial_analysis: CongestionSnapshot,
    pub final_analysis: CongestionSnapshot,
    pub negotiation_results: Vec<AgentDecisionRecord>,
    pub final_schedule: BTreeMap<String, ScheduleEntry>,
    pub broadcasts: Vec<BroadcastEvent>,
    pub coordination_metrics: CoordinationMetrics,
}

/// Drives episodes for one scenario
pub struct EpisodeOrchestrator {
    config: CoordinationConfig,
    agents: Vec<ClassroomAgent>,
    ledger: CommitmentLedger,
    analyzer: CongestionAnalyzer,
    scorer: FeasibilityScorer,
    evaluator: OfferEvaluator,
    provider: Box<dyn DecisionProvider>,
    broadcast_log: BroadcastLog,
    capacity_per_minute: u32,
    episode_date: EpisodeDate,
    scenario_name: String,
}

impl EpisodeOrchestrator {
    /// Build an orchestrator from a validated scenario and configuration.
    pub fn new(
        scenario: ScenarioConfig,
        config: CoordinationConfig,
        provider: Box<dyn DecisionProvider>,
        start_date: EpisodeDate,
    ) -> Result<Self, CoordinationError> {
        config.validate()?;
        scenario.validate()?;

        let agents = scenario
            .classrooms
            .iter()
            .map(|c| ClassroomAgent::from_config(c, config.reputation.initial))
            .collect();

        Ok(Self {
            analyzer: CongestionAnalyzer::new(config.risk_bands),
            scorer: FeasibilityScorer::new(&config),
            evaluator: OfferEvaluator::new(&config),
            ledger: CommitmentLedger::new(config.reputation.violation_threshold),
            broadcast_log: BroadcastLog::new(),
            agents,
            provider,
            capacity_per_minute: scenario.bottleneck_capacity,
            episode_date: start_date,
            scenario_name: scenario.name,
            config,
        })
    }

    /// Run one full episode: analysis, three negotiation phases, report.
    pub fn run_episode(&mut self) -> Result<EpisodeResult, CoordinationError> {
        info!(
            scenario = %self.scenario_name,
            episode_date = %self.episode_date,
            "starting episode"
        );

        let initial = self.analyzer.analyze(&self.agents, self.capacity_per_minute);
        info!(
            max_ratio = initial.max_congestion_ratio,
            status = %initial.overall_status,
            "initial analysis"
        );

        let mut broadcasts = Vec::new();
        self.settle_due_commitments(&mut broadcasts)?;

        let after_due = self.analyzer.analyze(&self.agents, self.capacity_per_minute);
        self.negotiate_peer_offers(&after_due, &mut broadcasts)?;

        // Direct decisions are gated on the before-snapshot: an episode that
        // started risky still collects every agent's stance even if peer
        // offers already cleared the corridor.
        let negotiation_results =
            if initial.max_congestion_ratio > self.config.negotiation.risk_threshold {
                let after_offers =
                    self.analyzer.analyze(&self.agents, self.capacity_per_minute);
                self.collect_direct_decisions(&after_offers)
            } else {
                info!(
                    max_ratio = initial.max_congestion_ratio,
                    "risk below threshold, skipping direct decisions"
                );
                Vec::new()
            };

        let final_analysis = self.analyzer.analyze(&self.agents, self.capacity_per_minute);
        let metrics = self.metrics(&initial, &final_analysis, &negotiation_results);
        info!(
            initial_risk = metrics.initial_risk,
            final_risk = metrics.final_risk,
            success = metrics.coordination_success,
            "episode complete"
        );

        for event in &broadcasts {
            self.broadcast_log.log(event.clone());
        }

        Ok(EpisodeResult {
            episode_date: self.episode_date,
            scenario: self.scenario_name.clone(),
            final_schedule: self.schedule(),
            initial_analysis: initial,
            final_analysis,
            negotiation_results,
            broadcasts,
            coordination_metrics: metrics,
        })
    }

    /// Run several consecutive episodes, one interval apart.
    ///
    /// Agents, ledger, and broadcast log carry over between episodes, so
    /// reciprocal commitments made in one episode fall due in the next.
    pub fn run_episodes(&mut self, count: usize) -> Result<Vec<EpisodeResult>, CoordinationError> {
        let mut results = Vec::with_capacity(count);
        for _ in 0..count {
            results.push(self.run_episode()?);
            self.episode_date = self
                .episode_date
                .advance_days(self.config.episode_interval_days);
        }
        Ok(results)
    }

    /// Phase 2a: resolve every commitment due on this episode's date.
    ///
    /// A commitment is fulfilled when its target exists and the promised
    /// adjustment is still feasible within the target's budget; anything
    /// else is a violation.
    fn settle_due_commitments(
        &mut self,
        broadcasts: &mut Vec<BroadcastEvent>,
    ) -> Result<(), CoordinationError> {
        let due = self.ledger.due(self.episode_date);
        if !due.is_empty() {
            info!(count = due.len(), "settling due commitments");
        }

        for commitment in due {
            let target = self
                .agents
                .iter()
                .position(|a| a.id() == commitment.to_classroom);

            let fulfilled = match target {
                Some(i) => {
                    let agent = &self.agents[i];
                    let report = self.scorer.evaluate(
                        agent.flexibility(),
                        commitment.adjustment_minutes,
                        agent.current_adjustment(),
                    );
                    report.is_feasible && report.within_limits
                }
                None => {
                    warn!(
                        classroom = %commitment.to_classroom,
                        "due commitment targets an unknown classroom"
                    );
                    false
                }
            };

            if fulfilled {
                if let Some(i) = target {
                    self.agents[i].apply_delta(commitment.adjustment_minutes);
                }
            }
            let outcome = self.ledger.resolve(commitment.id, fulfilled)?;
            if let Some(i) = target {
                self.agents[i].record_fulfillment(fulfilled, &self.config.reputation);
            }
            if outcome.flagged {
                warn!(
                    classroom = %outcome.classroom_id,
                    violations = outcome.violation_count,
                    "classroom flagged for repeated violations"
                );
            }

            broadcasts.push(BroadcastEvent::CommitmentDueResult {
                commitment_id: commitment.id,
                from_classroom: commitment.from_classroom,
                to_classroom: commitment.to_classroom,
                adjustment_minutes: commitment.adjustment_minutes,
                fulfilled,
                flagged: outcome.flagged,
                violation_count: outcome.violation_count,
            });
        }
        Ok(())
    }

    /// Phase 2b: let the largest classroom of each overloaded slot offer
    /// staggers to its peers.
    ///
    /// The proposer works through peers from largest to smallest, trying an
    /// earlier exit first and a later one second, until the per-slot offer
    /// budget is spent or the slot's overage is covered. Greedy first-fit:
    /// each acceptance subtracts the moved classroom's students from the
    /// outstanding overage. An accepted offer applies immediately and is
    /// settled as fulfilled; its reciprocal is recorded for the next
    /// episode.
    fn negotiate_peer_offers(
        &mut self,
        snapshot: &CongestionSnapshot,
        broadcasts: &mut Vec<BroadcastEvent>,
    ) -> Result<(), CoordinationError> {
        let default = self.config.negotiation.default_adjustment_minutes;
        let max_offers = self.config.negotiation.max_offers_per_slot;

        for slot in &snapshot.time_slot_analysis {
            if slot.status < CongestionStatus::High || slot.classrooms.len() < 2 {
                continue;
            }

            let mut members: Vec<SlotMember> = slot.classrooms.clone();
            members.sort_by(|a, b| b.students.cmp(&a.students));
            let proposer_id = members[0].classroom_id.clone();
            info!(
                time_slot = %slot.time_slot,
                ratio = slot.congestion_ratio,
                proposer = %proposer_id,
                "negotiating overloaded slot"
            );

            let mut overage =
                i64::from(slot.students) - i64::from(slot.capacity_per_minute);
            let mut offers_accepted = 0usize;
            for recipient in &members[1..] {
                if offers_accepted >= max_offers || overage <= 0 {
                    break;
                }
                let Some(proposer_idx) =
                    self.agents.iter().position(|a| a.id() == proposer_id)
                else {
                    break;
                };
                let Some(recipient_idx) = self
                    .agents
                    .iter()
                    .position(|a| a.id() == recipient.classroom_id)
                else {
                    continue;
                };

                for adjustment in [-default, default] {
                    let offer = self.evaluator.make_offer(
                        &self.agents[proposer_idx],
                        &recipient.classroom_id,
                        adjustment,
                        self.episode_date,
                    );
                    let evaluation =
                        self.evaluator.evaluate_offer(&self.agents[recipient_idx], &offer);
                    if !evaluation.should_accept {
                        continue;
                    }

                    self.agents[recipient_idx].apply_delta(adjustment);
                    self.agents[recipient_idx].record_fulfillment(true, &self.config.reputation);

                    let reciprocal = offer.reciprocal_commitment();
                    let offer_id = self.ledger.record(offer);
                    self.ledger.resolve(offer_id, true)?;
                    broadcasts.push(BroadcastEvent::CommitmentOfferAccepted {
                        commitment_id: offer_id,
                        from_classroom: proposer_id.clone(),
                        to_classroom: recipient.classroom_id.clone(),
                        adjustment_minutes: adjustment,
                        overall_score: evaluation.overall_score,
                    });

                    if let Some(reciprocal) = reciprocal {
                        broadcasts.push(BroadcastEvent::CommitmentReciprocalRecorded {
                            commitment_id: reciprocal.id,
                            from_classroom: reciprocal.from_classroom.clone(),
                            to_classroom: reciprocal.to_classroom.clone(),
                            episode_date: reciprocal.episode_date,
                            adjustment_minutes: reciprocal.adjustment_minutes,
                        });
                        self.ledger.record(reciprocal);
                    }

                    overage -= i64::from(recipient.students);
                    offers_accepted += 1;
                    break;
                }
            }
        }
        Ok(())
    }

    /// Phase 2c: ask each agent in scope for a direct decision.
    ///
    /// An accepted decision sets the agent's adjustment outright. Provider
    /// failures fall back to the feasibility heuristic, so an episode never
    /// aborts because a provider is down.
    fn collect_direct_decisions(
        &mut self,
        snapshot: &CongestionSnapshot,
    ) -> Vec<AgentDecisionRecord> {
        let indices = self.scoped_agent_indices();
        let mut records = Vec::with_capacity(indices.len());

        for i in indices {
            let agent = &self.agents[i];
            let suggested = self.config.suggested_adjustment(agent.flexibility());
            let report =
                self.scorer
                    .evaluate(agent.flexibility(), suggested, agent.current_adjustment());
            let request = DecisionRequest {
                classroom_id: agent.id().to_string(),
                congestion_ratio: snapshot.max_congestion_ratio,
                students: agent.students(),
                capacity_per_minute: self.capacity_per_minute,
                suggested_adjustment: suggested,
                feasibility: report,
                timeout_secs: self.config.negotiation.decision_timeout_secs,
            };

            let record = match self.provider.decide(&request) {
                Ok(text) => {
                    let parsed = parse_decision(&text);
                    // A non-zero proposed adjustment counts as acceptance
                    // even when the decision keyword says something else.
                    let accepted = parsed.decision == "accept"
                        || parsed.proposed_adjustment.is_some_and(|a| a != 0);
                    let applied = if accepted {
                        let adjustment = parsed.proposed_adjustment.unwrap_or(suggested);
                        self.agents[i].set_adjustment(adjustment);
                        adjustment
                    } else {
                        0
                    };
                    AgentDecisionRecord {
                        classroom_id: request.classroom_id,
                        decision: parsed.decision,
                        proposed_adjustment: parsed.proposed_adjustment,
                        reasoning: parsed.reasoning,
                        feasibility_score: report.score,
                        applied_adjustment: applied,
                        error: None,
                    }
                }
                Err(err) => {
                    warn!(
                        classroom = %request.classroom_id,
                        error = %err,
                        "provider failed, using feasibility fallback"
                    );
                    let (decision, applied) = if report.is_feasible {
                        self.agents[i].set_adjustment(suggested);
                        ("accept", suggested)
                    } else {
                        ("reject", 0)
                    };
                    AgentDecisionRecord {
                        classroom_id: request.classroom_id,
                        decision: decision.to_string(),
                        proposed_adjustment: Some(applied),
                        reasoning: format!(
                            "feasibility fallback: score {:.2} for {:+} min",
                            report.score, suggested
                        ),
                        feasibility_score: report.score,
                        applied_adjustment: applied,
                        error: Some(err.to_string()),
                    }
                }
            };
            records.push(record);
        }
        records
    }

    /// Agent indices covered by the configured negotiation scope.
    ///
    /// `TopContributors` picks the n largest classrooms by headcount,
    /// breaking ties by original order.
    fn scoped_agent_indices(&self) -> Vec<usize> {
        match self.config.negotiation.scope {
            NegotiationScope::AllAgents => (0..self.agents.len()).collect(),
            NegotiationScope::TopContributors(n) => {
                let mut indices: Vec<usize> = (0..self.agents.len()).collect();
                indices.sort_by(|&a, &b| {
                    self.agents[b].students().cmp(&self.agents[a].students())
                });
                indices.truncate(n);
                indices
            }
        }
    }

    fn schedule(&self) -> BTreeMap<String, ScheduleEntry> {
        self.agents
            .iter()
            .map(|agent| {
                (
                    agent.id().to_string(),
                    ScheduleEntry {
                        base_time: agent.base_end_time(),
                        adjustment: agent.current_adjustment(),
                        final_time: agent.effective_exit_time(),
                        students: agent.students(),
                    },
                )
            })
            .collect()
    }

    fn metrics(
        &self,
        initial: &CongestionSnapshot,
        final_analysis: &CongestionSnapshot,
        records: &[AgentDecisionRecord],
    ) -> CoordinationMetrics {
        let initial_risk = initial.max_congestion_ratio;
        let final_risk = final_analysis.max_congestion_ratio;
        let coordination_success = final_analysis.overall_status <= CongestionStatus::Moderate
            && final_risk <= self.config.performance.max_acceptable_final_risk;

        CoordinationMetrics {
            initial_risk,
            final_risk,
            risk_reduction: (initial_risk - final_risk).max(0.0),
            coordination_success,
            agents_participated: records
                .iter()
                .filter(|r| r.applied_adjustment != 0)
                .count(),
        }
    }

    /// Current agents, in scenario order.
    pub fn agents(&self) -> &[ClassroomAgent] {
        &self.agents
    }

    /// The commitment ledger for the whole run.
    pub fn ledger(&self) -> &CommitmentLedger {
        &self.ledger
    }

    /// Every broadcast event emitted so far, across episodes.
    pub fn broadcast_log(&self) -> &BroadcastLog {
        &self.broadcast_log
    }

    /// Date the next episode will run on.
    pub fn episode_date(&self) -> EpisodeDate {
        self.episode_date
    }
}
