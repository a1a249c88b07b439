//! Coordination configuration.
//!
//! All tunable parameters live in one immutable [`CoordinationConfig`] that
//! is passed into each orchestrator; sensitivity sweeps build a fresh config
//! per trial via [`SweepParameter`] instead of mutating shared state, so no
//! configuration can leak between runs.
//!
//! Validation is fatal at load time and reports *every* violated invariant,
//! not just the first.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::snapshot::CongestionStatus;

/// Configuration validation failure listing all violated invariants
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("configuration validation failed: {}", .violations.join("; "))]
    Invalid { violations: Vec<String> },

    #[error("unknown sweep parameter '{0}'")]
    UnknownSweepParameter(String),
}

/// Congestion ratio thresholds separating the severity bands.
///
/// Comparisons are strict: a ratio exactly on a threshold maps to the band
/// below it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskBands {
    /// Ratio above which a slot is at least moderate
    pub moderate_above: f64,
    /// Ratio above which a slot is at least high
    pub high_above: f64,
    /// Ratio above which a slot is critical
    pub critical_above: f64,
}

impl Default for RiskBands {
    fn default() -> Self {
        Self {
            moderate_above: 0.7,
            high_above: 1.0,
            critical_above: 1.5,
        }
    }
}

impl RiskBands {
    /// Severity band for a congestion ratio.
    pub fn status_for(&self, ratio: f64) -> CongestionStatus {
        if ratio > self.critical_above {
            CongestionStatus::Critical
        } else if ratio > self.high_above {
            CongestionStatus::High
        } else if ratio > self.moderate_above {
            CongestionStatus::Moderate
        } else {
            CongestionStatus::Normal
        }
    }
}

/// Parameters of the feasibility scoring formulas
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeasibilityConfig {
    /// Flexibility at or above which an extension is preference-aligned
    pub high_flexibility_threshold: f64,
    /// Flexibility at or below which a shortening is preference-aligned
    pub low_flexibility_threshold: f64,
    /// Base score when the adjustment matches the professor's preference
    pub aligned_base: f64,
    /// Base score for a neutral professor
    pub neutral_base: f64,
    /// Base score when the adjustment opposes the preference
    pub opposed_base: f64,
    /// Bonus per unit of flexibility on aligned adjustments
    pub flexibility_bonus: f64,
    /// Penalty per unit of flexibility on opposed adjustments
    pub flexibility_penalty: f64,
    /// Score reduction per minute of adjustment for neutral professors
    pub adjustment_penalty_per_minute: f64,
    /// Multiplier applied when the cumulative adjustment would exceed the
    /// per-agent maximum (heavy penalty, not rejection)
    pub over_limit_factor: f64,
    /// Floor for opposed-preference scores
    pub min_score: f64,
    /// Score above which an adjustment counts as feasible
    pub acceptance_threshold: f64,
}

impl Default for FeasibilityConfig {
    fn default() -> Self {
        Self {
            high_flexibility_threshold: 0.3,
            low_flexibility_threshold: -0.3,
            aligned_base: 0.8,
            neutral_base: 0.6,
            opposed_base: 0.4,
            flexibility_bonus: 0.2,
            flexibility_penalty: 0.3,
            adjustment_penalty_per_minute: 0.05,
            over_limit_factor: 0.3,
            min_score: 0.1,
            acceptance_threshold: 0.5,
        }
    }
}

/// Which agents are asked for an autonomous decision when the global risk
/// exceeds the negotiation threshold.
///
/// The two observed behaviours differ between deployments, so the selection
/// is a configurable policy rather than hard-coded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NegotiationScope {
    /// Every agent decides
    AllAgents,
    /// Only the N largest contributors to congestion decide
    TopContributors(usize),
}

/// Negotiation-phase parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NegotiationConfig {
    /// Global congestion ratio above which autonomous decisions trigger
    pub risk_threshold: f64,
    /// Default adjustment magnitude in minutes
    pub default_adjustment_minutes: i64,
    /// Maximum cumulative per-agent adjustment in minutes
    pub max_adjustment_minutes: i64,
    /// Cap on new commitments proposed per congested slot
    pub max_offers_per_slot: usize,
    /// Agent-selection policy for the autonomous-decision step
    pub scope: NegotiationScope,
    /// Weight of the immediate adjustment's feasibility in offer scoring
    pub current_weight: f64,
    /// Weight of the reciprocal adjustment's feasibility in offer scoring
    pub reciprocal_weight: f64,
    /// Scale of the (reputation - 0.5) bonus in offer scoring
    pub reputation_weight: f64,
    /// Score penalty per recorded violation in offer scoring
    pub violation_penalty_per_count: f64,
    /// Overall score above which a recipient accepts an offer
    pub offer_acceptance_threshold: f64,
    /// Timeout carried by each external decision call (seconds)
    pub decision_timeout_secs: u64,
}

impl Default for NegotiationConfig {
    fn default() -> Self {
        Self {
            risk_threshold: 0.7,
            default_adjustment_minutes: 2,
            max_adjustment_minutes: 8,
            max_offers_per_slot: 2,
            scope: NegotiationScope::AllAgents,
            current_weight: 0.6,
            reciprocal_weight: 0.4,
            reputation_weight: 0.2,
            violation_penalty_per_count: 0.1,
            offer_acceptance_threshold: 0.6,
            decision_timeout_secs: 300,
        }
    }
}

/// Reputation bookkeeping parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReputationConfig {
    /// Starting reputation for new agents
    pub initial: f64,
    /// Reputation gained on fulfilment
    pub fulfillment_bonus: f64,
    /// Reputation lost on violation
    pub violation_penalty: f64,
    /// Violation count at which an agent is flagged
    pub violation_threshold: u32,
    /// Lower reputation bound
    pub min: f64,
    /// Upper reputation bound
    pub max: f64,
}

impl Default for ReputationConfig {
    fn default() -> Self {
        Self {
            initial: 1.0,
            fulfillment_bonus: 0.1,
            violation_penalty: 0.2,
            violation_threshold: 3,
            min: 0.0,
            max: 1.0,
        }
    }
}

/// Episode success criteria and reporting grades
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PerformanceConfig {
    /// Risk reduction at or above which an episode grades "excellent"
    pub excellent_risk_reduction: f64,
    /// Risk reduction at or above which an episode grades "good"
    pub good_risk_reduction: f64,
    /// Risk reduction at or above which an episode grades "acceptable"
    pub acceptable_risk_reduction: f64,
    /// Final max ratio must not exceed this for a successful episode
    pub max_acceptable_final_risk: f64,
}

impl Default for PerformanceConfig {
    fn default() -> Self {
        Self {
            excellent_risk_reduction: 0.5,
            good_risk_reduction: 0.3,
            acceptable_risk_reduction: 0.1,
            max_acceptable_final_risk: 1.0,
        }
    }
}

impl PerformanceConfig {
    /// Qualitative grade for an episode's risk reduction.
    pub fn grade(&self, risk_reduction: f64) -> &'static str {
        if risk_reduction >= self.excellent_risk_reduction {
            "excellent"
        } else if risk_reduction >= self.good_risk_reduction {
            "good"
        } else if risk_reduction >= self.acceptable_risk_reduction {
            "acceptable"
        } else {
            "poor"
        }
    }
}

/// Complete, immutable configuration for a coordination run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoordinationConfig {
    pub negotiation: NegotiationConfig,
    pub feasibility: FeasibilityConfig,
    pub reputation: ReputationConfig,
    pub risk_bands: RiskBands,
    pub performance: PerformanceConfig,
    /// Days between consecutive episodes; reciprocal commitments fall due
    /// one interval after their originating offer
    pub episode_interval_days: i64,
}

impl CoordinationConfig {
    /// Validate every invariant, collecting all violations.
    ///
    /// The run must refuse to start on any violation rather than produce
    /// undefined congestion ratios.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut violations = Vec::new();

        if !(self.risk_bands.moderate_above < self.risk_bands.high_above
            && self.risk_bands.high_above < self.risk_bands.critical_above)
        {
            violations.push("risk band thresholds must be in ascending order".to_string());
        }
        if self.feasibility.low_flexibility_threshold >= self.feasibility.high_flexibility_threshold
        {
            violations.push(
                "low flexibility threshold must be less than high flexibility threshold"
                    .to_string(),
            );
        }
        if self.reputation.min >= self.reputation.max {
            violations.push("min reputation must be less than max reputation".to_string());
        }
        if self.episode_interval_days <= 0 {
            violations.push("episode interval must be positive".to_string());
        }
        if self.negotiation.default_adjustment_minutes <= 0 {
            violations.push("default adjustment must be positive".to_string());
        }
        if self.negotiation.max_adjustment_minutes < self.negotiation.default_adjustment_minutes {
            violations
                .push("max adjustment must be at least the default adjustment".to_string());
        }
        if let NegotiationScope::TopContributors(0) = self.negotiation.scope {
            violations.push("top-contributors scope must select at least one agent".to_string());
        }

        if violations.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Invalid { violations })
        }
    }

    /// Default adjustment suggested to an agent, signed by its preference.
    ///
    /// Strong preferences pull toward their own direction; near-neutral
    /// professors follow the sign of their flexibility.
    pub fn suggested_adjustment(&self, flexibility: f64) -> i64 {
        let d = self.negotiation.default_adjustment_minutes;
        if flexibility <= self.feasibility.low_flexibility_threshold {
            -d
        } else if flexibility >= self.feasibility.high_flexibility_threshold {
            d
        } else if flexibility >= 0.0 {
            d
        } else {
            -d
        }
    }
}

impl Default for CoordinationConfig {
    fn default() -> Self {
        Self {
            negotiation: NegotiationConfig::default(),
            feasibility: FeasibilityConfig::default(),
            reputation: ReputationConfig::default(),
            risk_bands: RiskBands::default(),
            performance: PerformanceConfig::default(),
            episode_interval_days: 7,
        }
    }
}

/// One parameter override for a sensitivity sweep.
///
/// Each variant maps a sweep key to an explicit setter; there is no
/// reflection-style attribute lookup. Unknown keys are rejected when the
/// sweep is parsed, before any trial runs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SweepParameter {
    RiskThreshold(f64),
    DefaultAdjustmentMinutes(i64),
    MaxAdjustmentMinutes(i64),
    ViolationThreshold(u32),
    OfferAcceptanceThreshold(f64),
    TopContributors(usize),
}

impl SweepParameter {
    /// Parse a `name=value` sweep entry.
    pub fn parse(key: &str, value: f64) -> Result<Self, ConfigError> {
        match key {
            "risk_threshold" => Ok(SweepParameter::RiskThreshold(value)),
            "default_adjustment_minutes" => {
                Ok(SweepParameter::DefaultAdjustmentMinutes(value as i64))
            }
            "max_adjustment_minutes" => Ok(SweepParameter::MaxAdjustmentMinutes(value as i64)),
            "violation_threshold" => Ok(SweepParameter::ViolationThreshold(value as u32)),
            "offer_acceptance_threshold" => Ok(SweepParameter::OfferAcceptanceThreshold(value)),
            "top_contributors" => Ok(SweepParameter::TopContributors(value as usize)),
            other => Err(ConfigError::UnknownSweepParameter(other.to_string())),
        }
    }

    /// Apply this override to a configuration.
    ///
    /// Sweeps clone a base config, apply their overrides, then re-validate;
    /// the base config is never touched.
    pub fn apply(&self, config: &mut CoordinationConfig) {
        match *self {
            SweepParameter::RiskThreshold(v) => config.negotiation.risk_threshold = v,
            SweepParameter::DefaultAdjustmentMinutes(v) => {
                config.negotiation.default_adjustment_minutes = v
            }
            SweepParameter::MaxAdjustmentMinutes(v) => {
                config.negotiation.max_adjustment_minutes = v
            }
            SweepParameter::ViolationThreshold(v) => config.reputation.violation_threshold = v,
            SweepParameter::OfferAcceptanceThreshold(v) => {
                config.negotiation.offer_acceptance_threshold = v
            }
            SweepParameter::TopContributors(n) => {
                config.negotiation.scope = NegotiationScope::TopContributors(n)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(CoordinationConfig::default().validate().is_ok());
    }

    #[test]
    fn test_validation_collects_all_violations() {
        let mut config = CoordinationConfig::default();
        config.risk_bands.high_above = 0.5; // out of order
        config.reputation.min = 1.0; // min == max
        config.episode_interval_days = 0;

        match config.validate() {
            Err(ConfigError::Invalid { violations }) => assert_eq!(violations.len(), 3),
            other => panic!("expected Invalid, got {:?}", other),
        }
    }

    #[test]
    fn test_suggested_adjustment_follows_preference() {
        let config = CoordinationConfig::default();
        assert_eq!(config.suggested_adjustment(-0.7), -2);
        assert_eq!(config.suggested_adjustment(0.7), 2);
        // Near-neutral: sign of flexibility decides
        assert_eq!(config.suggested_adjustment(0.1), 2);
        assert_eq!(config.suggested_adjustment(-0.1), -2);
        assert_eq!(config.suggested_adjustment(0.0), 2);
    }

    #[test]
    fn test_sweep_parameter_rejects_unknown_key() {
        assert_eq!(
            SweepParameter::parse("llm_temperature", 0.9),
            Err(ConfigError::UnknownSweepParameter(
                "llm_temperature".to_string()
            ))
        );
    }

    #[test]
    fn test_sweep_applies_to_fresh_config() {
        let base = CoordinationConfig::default();
        let mut trial = base.clone();
        SweepParameter::parse("risk_threshold", 1.1)
            .unwrap()
            .apply(&mut trial);

        assert_eq!(trial.negotiation.risk_threshold, 1.1);
        assert_eq!(base.negotiation.risk_threshold, 0.7);
        assert!(trial.validate().is_ok());
    }
}
