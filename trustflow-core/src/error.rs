/// Engine-wide error taxonomy.
///
/// Classifier outages are deliberately absent: the risk gateway absorbs them
/// into a degraded-but-safe assessment instead of surfacing a hard failure.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("Product {0} has been withdrawn")]
    ProductWithdrawn(String),

    #[error("Product {0} has no risk assessment; a listing must be assessed before purchase")]
    AssessmentRequired(String),

    #[error("No carrier available for assignment")]
    NoCarrierAvailable,

    #[error("Carrier {0} is not in the available pool")]
    CarrierNotInPool(String),

    #[error("Precondition failed: {0}")]
    Precondition(String),

    #[error("Invalid escrow transition from {from} on {event}")]
    InvalidTransition { from: String, event: String },

    #[error("Concurrent update lost on {entity} {id}")]
    Conflict { entity: &'static str, id: String },
}

impl EngineError {
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    pub fn conflict(entity: &'static str, id: impl ToString) -> Self {
        Self::Conflict {
            entity,
            id: id.to_string(),
        }
    }

    /// A conflicted mutation is the only kind safe to retry with a fresh read.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Conflict { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_conflicts_are_retryable() {
        assert!(EngineError::conflict("order", "o1").is_retryable());
        assert!(!EngineError::Validation("price".into()).is_retryable());
        assert!(!EngineError::NoCarrierAvailable.is_retryable());
    }

    #[test]
    fn messages_name_the_entity() {
        let err = EngineError::not_found("product", "p-42");
        assert_eq!(err.to_string(), "product not found: p-42");
    }
}
