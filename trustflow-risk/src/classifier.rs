use std::sync::Arc;

use async_trait::async_trait;
use trustflow_core::{EngineError, EngineResult};

use crate::assessment::{AnalysisRequest, ClassifierVerdict, RiskAssessment};
use crate::evaluator::TrustScoreEvaluator;

/// Upstream classifier failure modes. These never escape the gateway.
#[derive(Debug, thiserror::Error)]
pub enum ClassifierError {
    #[error("Classifier unreachable: {0}")]
    Unreachable(String),

    #[error("Classifier returned a malformed response: {0}")]
    Malformed(String),
}

/// Boundary to the external fraud/risk classifier. Implementations own the
/// provider's wire format and transport; the engine only sees
/// [`ClassifierVerdict`]s. Tests substitute deterministic stubs.
#[async_trait]
pub trait RiskClassifier: Send + Sync {
    async fn analyze(&self, request: &AnalysisRequest) -> Result<ClassifierVerdict, ClassifierError>;
}

/// Normalizes and validates classifier output into a [`RiskAssessment`].
///
/// This is the only component permitted to suppress an upstream error: any
/// classifier failure is absorbed into the fail-safe assessment (escrow-on)
/// and logged. Input validation errors are still surfaced to the caller.
pub struct RiskClassifierGateway {
    classifier: Arc<dyn RiskClassifier>,
    evaluator: TrustScoreEvaluator,
}

impl RiskClassifierGateway {
    pub fn new(classifier: Arc<dyn RiskClassifier>, evaluator: TrustScoreEvaluator) -> Self {
        Self {
            classifier,
            evaluator,
        }
    }

    pub async fn assess(&self, request: AnalysisRequest) -> EngineResult<RiskAssessment> {
        if !request.price.is_positive() {
            return Err(EngineError::Validation(format!(
                "Listing price must be positive, got {}",
                request.price
            )));
        }
        if !(0.0..=100.0).contains(&request.seller_reputation) {
            return Err(EngineError::Validation(format!(
                "Seller reputation must be within 0-100, got {}",
                request.seller_reputation
            )));
        }

        match self.classifier.analyze(&request).await {
            Ok(verdict) => Ok(self.normalize(verdict)),
            Err(err) => {
                tracing::warn!(error = %err, title = %request.title, "Classifier degraded, substituting fail-safe assessment");
                Ok(RiskAssessment::fail_safe())
            }
        }
    }

    fn normalize(&self, verdict: ClassifierVerdict) -> RiskAssessment {
        if !verdict.trust_score.is_finite() {
            tracing::warn!("Classifier returned a non-numeric trust score, substituting fail-safe assessment");
            return RiskAssessment::fail_safe();
        }

        let score = verdict.trust_score.clamp(0.0, 100.0);
        if score != verdict.trust_score {
            tracing::warn!(raw = verdict.trust_score, clamped = score, "Clamped out-of-range trust score");
        }

        // The internal tier is always derived from the score; the wire's
        // risk_level is advisory. Spelling drift across upstream modules is
        // flagged rather than silently picked.
        let tier = self.evaluator.classify(score);
        match crate::assessment::RiskTier::parse_lenient(&verdict.risk_level) {
            Some(wire_tier) => {
                if verdict.risk_level != wire_tier.as_str() {
                    tracing::warn!(raw = %verdict.risk_level, canonical = %wire_tier, "Non-canonical risk level spelling from classifier");
                }
                if wire_tier != tier {
                    tracing::warn!(wire = %wire_tier, derived = %tier, score, "Classifier tier disagrees with derived tier, keeping derived");
                }
            }
            None => {
                tracing::warn!(raw = %verdict.risk_level, "Unrecognized risk level from classifier, keeping derived tier");
            }
        }

        RiskAssessment {
            score,
            tier,
            flags: verdict.red_flags,
            reasoning: verdict.reasoning,
            escrow_recommended: verdict.recommended_escrow,
            assessed_at: chrono::Utc::now(),
        }
    }
}

/// Deterministic local classifier scoring from seller reputation with
/// amount-based red flags. Serves as the injected default when no external
/// provider is configured, mirroring the platform's offline fallback rules.
pub struct HeuristicClassifier;

const HIGH_VALUE_MINOR: i64 = 500_000;
const VERY_HIGH_VALUE_MINOR: i64 = 1_000_000;

#[async_trait]
impl RiskClassifier for HeuristicClassifier {
    async fn analyze(&self, request: &AnalysisRequest) -> Result<ClassifierVerdict, ClassifierError> {
        let mut score = request.seller_reputation;
        let mut red_flags = Vec::new();

        if request.price.minor_units() > HIGH_VALUE_MINOR {
            score -= 15.0;
            red_flags.push("high value listing".to_string());
        }
        if request.price.minor_units() > VERY_HIGH_VALUE_MINOR {
            score -= 10.0;
            red_flags.push("very high value listing".to_string());
        }
        if request.description.trim().is_empty() {
            score -= 10.0;
            red_flags.push("missing description".to_string());
        }

        let score = score.clamp(0.0, 100.0);
        let evaluator = TrustScoreEvaluator::default();
        let tier = evaluator.classify(score);

        Ok(ClassifierVerdict {
            trust_score: score,
            risk_level: tier.as_str().to_string(),
            red_flags,
            reasoning: "Heuristic score from seller reputation and listing value.".to_string(),
            recommended_escrow: evaluator.escrow_required(tier, false),
        })
    }
}
