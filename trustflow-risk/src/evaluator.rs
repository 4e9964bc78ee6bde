use serde::Deserialize;
use trustflow_core::{EngineError, EngineResult};

use crate::assessment::RiskTier;

/// Score cutoffs for tier classification. Each band is closed on its lower
/// edge: a score equal to `low` is still Low, equal to `medium` is Medium.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct RiskThresholds {
    pub low: f64,
    pub medium: f64,
    pub high: f64,
}

impl Default for RiskThresholds {
    fn default() -> Self {
        Self {
            low: 80.0,
            medium: 50.0,
            high: 35.0,
        }
    }
}

/// Deterministic mapping from a numeric trust score to a [`RiskTier`],
/// independent of which classifier produced the score.
#[derive(Debug, Clone, Copy)]
pub struct TrustScoreEvaluator {
    thresholds: RiskThresholds,
}

impl TrustScoreEvaluator {
    pub fn new(thresholds: RiskThresholds) -> EngineResult<Self> {
        if !(thresholds.low > thresholds.medium && thresholds.medium > thresholds.high) {
            return Err(EngineError::Validation(format!(
                "Risk thresholds must be strictly descending, got low={} medium={} high={}",
                thresholds.low, thresholds.medium, thresholds.high
            )));
        }
        Ok(Self { thresholds })
    }

    pub fn classify(&self, score: f64) -> RiskTier {
        if score >= self.thresholds.low {
            RiskTier::Low
        } else if score >= self.thresholds.medium {
            RiskTier::Medium
        } else if score >= self.thresholds.high {
            RiskTier::High
        } else {
            RiskTier::Critical
        }
    }

    /// Escrow policy is the OR of the deterministic tier rule and the
    /// classifier's explicit recommendation. The classifier can force escrow
    /// on for a nominally safe score, never off for High/Critical.
    pub fn escrow_required(&self, tier: RiskTier, escrow_recommended: bool) -> bool {
        matches!(tier, RiskTier::High | RiskTier::Critical) || escrow_recommended
    }
}

impl Default for TrustScoreEvaluator {
    fn default() -> Self {
        Self {
            thresholds: RiskThresholds::default(),
        }
    }
}
