use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use trustflow_core::{EngineError, EngineResult, Money};
use uuid::Uuid;

/// A logistics provider available for order assignment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Carrier {
    pub id: Uuid,
    pub name: String,
    pub active: bool,
}

impl Carrier {
    pub fn new(name: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            active: true,
        }
    }
}

/// Order context available to an assignment policy. Policies may ignore it
/// (first-available) or use it for rating/geography-based selection.
#[derive(Debug, Clone)]
pub struct AssignmentContext {
    pub product_id: Uuid,
    pub buyer_id: Uuid,
    pub total_amount: Money,
}

/// Pluggable carrier selection. The workflow never proceeds without
/// logistics coverage: an empty pool is `NoCarrierAvailable`.
pub trait CarrierAssignmentPolicy: Send + Sync {
    fn select(&self, context: &AssignmentContext, pool: &[Carrier]) -> EngineResult<Uuid>;
}

/// Reference policy: take the first active carrier in the pool.
pub struct FirstAvailablePolicy;

impl CarrierAssignmentPolicy for FirstAvailablePolicy {
    fn select(&self, _context: &AssignmentContext, pool: &[Carrier]) -> EngineResult<Uuid> {
        pool.iter()
            .find(|c| c.active)
            .map(|c| c.id)
            .ok_or(EngineError::NoCarrierAvailable)
    }
}

/// Directory of carriers known to the platform.
#[async_trait]
pub trait CarrierDirectory: Send + Sync {
    async fn register_carrier(&self, carrier: &Carrier) -> EngineResult<()>;

    async fn list_available_carriers(&self) -> EngineResult<Vec<Carrier>>;
}
