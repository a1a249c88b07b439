//! Feasibility scoring for timing adjustments.
//!
//! Maps (professor flexibility, proposed adjustment, current cumulative
//! adjustment) to a score in (0, 1], a feasibility verdict, a
//! preference-alignment label, and a per-agent limit check. The scorer is a
//! pure function of its inputs and configuration: identical inputs always
//! produce bit-identical output, which is what makes the negotiation
//! deterministic whenever the external decision provider is absent.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::{CoordinationConfig, FeasibilityConfig};

/// How an adjustment relates to the professor's preference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PreferenceAlignment {
    StronglyAligned,
    Neutral,
    Opposed,
}

impl fmt::Display for PreferenceAlignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PreferenceAlignment::StronglyAligned => "strongly_aligned",
            PreferenceAlignment::Neutral => "neutral",
            PreferenceAlignment::Opposed => "opposed",
        };
        write!(f, "{}", s)
    }
}

/// Result of evaluating one proposed adjustment
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeasibilityReport {
    /// Score in (0, 1]; multiplied by the over-limit factor when the
    /// cumulative total would exceed the per-agent maximum
    pub score: f64,

    /// score > acceptance threshold
    pub is_feasible: bool,

    /// current cumulative adjustment + proposed adjustment
    pub total_adjustment: i64,

    /// Preference-alignment label for the proposed direction
    pub alignment: PreferenceAlignment,

    /// |total_adjustment| within the per-agent maximum
    pub within_limits: bool,
}

/// Deterministic feasibility scorer
#[derive(Debug, Clone)]
pub struct FeasibilityScorer {
    config: FeasibilityConfig,
    max_adjustment_minutes: i64,
}

impl FeasibilityScorer {
    pub fn new(config: &CoordinationConfig) -> Self {
        Self {
            config: config.feasibility,
            max_adjustment_minutes: config.negotiation.max_adjustment_minutes,
        }
    }

    /// Evaluate a proposed adjustment against a professor's preferences and
    /// the agent's cumulative adjustment budget.
    ///
    /// Extensions favour flexible professors, shortenings favour inflexible
    /// ones; near-neutral professors lose score per minute of adjustment.
    /// Exceeding the cumulative budget multiplies the score by the
    /// over-limit factor rather than rejecting outright, so callers can
    /// still rank over-budget options.
    pub fn evaluate(
        &self,
        flexibility: f64,
        proposed_adjustment: i64,
        current_adjustment: i64,
    ) -> FeasibilityReport {
        let cfg = &self.config;
        let magnitude = proposed_adjustment.unsigned_abs() as f64;

        let mut score = if proposed_adjustment > 0 {
            // Extension
            if flexibility >= cfg.high_flexibility_threshold {
                (cfg.aligned_base + flexibility * cfg.flexibility_bonus).min(1.0)
            } else if flexibility >= cfg.low_flexibility_threshold {
                cfg.neutral_base - magnitude * cfg.adjustment_penalty_per_minute
            } else {
                (cfg.opposed_base - flexibility.abs() * cfg.flexibility_penalty)
                    .max(cfg.min_score)
            }
        } else {
            // Shortening or no-op
            if flexibility <= cfg.low_flexibility_threshold {
                (cfg.aligned_base + flexibility.abs() * cfg.flexibility_bonus).min(1.0)
            } else if flexibility <= cfg.high_flexibility_threshold {
                cfg.neutral_base - magnitude * cfg.adjustment_penalty_per_minute
            } else {
                (cfg.opposed_base - flexibility * cfg.flexibility_penalty).max(cfg.min_score)
            }
        };

        let total_adjustment = current_adjustment + proposed_adjustment;
        let within_limits = total_adjustment.abs() <= self.max_adjustment_minutes;
        if !within_limits {
            score *= cfg.over_limit_factor;
        }

        FeasibilityReport {
            score,
            is_feasible: score > cfg.acceptance_threshold,
            total_adjustment,
            alignment: self.alignment(flexibility, proposed_adjustment),
            within_limits,
        }
    }

    fn alignment(&self, flexibility: f64, adjustment: i64) -> PreferenceAlignment {
        let cfg = &self.config;
        if adjustment > 0 {
            if flexibility > cfg.high_flexibility_threshold {
                PreferenceAlignment::StronglyAligned
            } else if flexibility > cfg.low_flexibility_threshold {
                PreferenceAlignment::Neutral
            } else {
                PreferenceAlignment::Opposed
            }
        } else if flexibility < cfg.low_flexibility_threshold {
            PreferenceAlignment::StronglyAligned
        } else if flexibility < cfg.high_flexibility_threshold {
            PreferenceAlignment::Neutral
        } else {
            PreferenceAlignment::Opposed
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scorer() -> FeasibilityScorer {
        FeasibilityScorer::new(&CoordinationConfig::default())
    }

    #[test]
    fn test_extension_aligned_professor() {
        let report = scorer().evaluate(0.5, 2, 0);
        assert!((report.score - 0.9).abs() < 1e-12);
        assert!(report.is_feasible);
        assert_eq!(report.alignment, PreferenceAlignment::StronglyAligned);
    }

    #[test]
    fn test_extension_neutral_professor_penalized_per_minute() {
        let report = scorer().evaluate(0.0, 4, 0);
        assert!((report.score - 0.4).abs() < 1e-12);
        assert!(!report.is_feasible);
        assert_eq!(report.alignment, PreferenceAlignment::Neutral);
    }

    #[test]
    fn test_extension_opposed_professor_floored() {
        let report = scorer().evaluate(-1.0, 2, 0);
        assert!((report.score - 0.1).abs() < 1e-12);
        assert_eq!(report.alignment, PreferenceAlignment::Opposed);
    }

    #[test]
    fn test_shortening_mirrors_extension() {
        let extend = scorer().evaluate(0.6, 2, 0);
        let shorten = scorer().evaluate(-0.6, -2, 0);
        assert!((extend.score - shorten.score).abs() < 1e-12);
        assert_eq!(shorten.alignment, PreferenceAlignment::StronglyAligned);
    }
}
