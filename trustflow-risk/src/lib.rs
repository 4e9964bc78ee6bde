pub mod assessment;
pub mod classifier;
pub mod evaluator;

pub use assessment::{AnalysisRequest, ClassifierVerdict, RiskAssessment, RiskTier};
pub use classifier::{ClassifierError, HeuristicClassifier, RiskClassifier, RiskClassifierGateway};
pub use evaluator::{RiskThresholds, TrustScoreEvaluator};
