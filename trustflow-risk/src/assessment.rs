use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use trustflow_core::Money;

/// Qualitative risk bucket derived from a numeric trust score.
///
/// Always derived through [`crate::TrustScoreEvaluator`] thresholds,
/// never set directly by a caller.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
pub enum RiskTier {
    Low,
    Medium,
    High,
    Critical,
}

impl RiskTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskTier::Low => "Low",
            RiskTier::Medium => "Medium",
            RiskTier::High => "High",
            RiskTier::Critical => "Critical",
        }
    }

    /// Accepts any casing of the canonical names. Upstream classifiers have
    /// shipped "HIGH", "high" and "High" for the same tier; everything is
    /// normalized here and the caller decides whether to log the mismatch.
    pub fn parse_lenient(raw: &str) -> Option<RiskTier> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "low" => Some(RiskTier::Low),
            "medium" => Some(RiskTier::Medium),
            "high" => Some(RiskTier::High),
            "critical" => Some(RiskTier::Critical),
            _ => None,
        }
    }
}

impl std::fmt::Display for RiskTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Flag attached to a fail-safe assessment when the classifier is degraded.
pub const CLASSIFIER_UNAVAILABLE_FLAG: &str = "classifier unavailable";

/// Normalized result of a listing analysis. Immutable once produced;
/// re-analysis produces a fresh assessment that supersedes this one.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RiskAssessment {
    pub score: f64,
    pub tier: RiskTier,
    pub flags: Vec<String>,
    pub reasoning: String,
    pub escrow_recommended: bool,
    pub assessed_at: DateTime<Utc>,
}

impl RiskAssessment {
    /// Degraded-but-conservative substitute when the upstream classifier is
    /// unreachable or malformed. Absence of signal is never "safe": the
    /// fail-safe biases toward escrow-on.
    pub fn fail_safe() -> Self {
        Self {
            score: 50.0,
            tier: RiskTier::Medium,
            flags: vec![CLASSIFIER_UNAVAILABLE_FLAG.to_string()],
            reasoning: "Could not reach the risk classifier; holding funds in escrow.".to_string(),
            escrow_recommended: true,
            assessed_at: Utc::now(),
        }
    }

    pub fn is_degraded(&self) -> bool {
        self.flags.iter().any(|f| f == CLASSIFIER_UNAVAILABLE_FLAG)
    }
}

/// Listing data submitted for analysis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisRequest {
    pub title: String,
    pub description: String,
    pub price: Money,
    pub seller_reputation: f64,
}

/// Raw wire contract returned by a classifier implementation, before
/// normalization. Field names follow the upstream provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifierVerdict {
    pub trust_score: f64,
    pub risk_level: String,
    #[serde(default)]
    pub red_flags: Vec<String>,
    #[serde(default)]
    pub reasoning: String,
    pub recommended_escrow: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_lenient_normalizes_casing() {
        assert_eq!(RiskTier::parse_lenient("HIGH"), Some(RiskTier::High));
        assert_eq!(RiskTier::parse_lenient("low"), Some(RiskTier::Low));
        assert_eq!(RiskTier::parse_lenient(" Critical "), Some(RiskTier::Critical));
        assert_eq!(RiskTier::parse_lenient("unknown"), None);
    }

    #[test]
    fn fail_safe_defaults_to_escrow_on() {
        let fallback = RiskAssessment::fail_safe();
        assert_eq!(fallback.score, 50.0);
        assert_eq!(fallback.tier, RiskTier::Medium);
        assert!(fallback.escrow_recommended);
        assert!(fallback.is_degraded());
    }

    #[test]
    fn verdict_deserializes_upstream_payload() {
        let verdict: ClassifierVerdict = serde_json::from_str(
            r#"{
                "trust_score": 92,
                "risk_level": "Low",
                "red_flags": [],
                "reasoning": "Established seller, realistic price.",
                "recommended_escrow": false
            }"#,
        )
        .unwrap();
        assert_eq!(verdict.trust_score, 92.0);
        assert!(!verdict.recommended_escrow);
    }
}
