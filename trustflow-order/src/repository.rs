use async_trait::async_trait;
use trustflow_core::EngineResult;
use uuid::Uuid;

use crate::models::Order;

/// Keyed access to orders with the engine's per-entity concurrency contract.
#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Persist a fully-formed order. Implementations must validate the
    /// referenced product atomically with the insert: a product withdrawn
    /// concurrently with the purchase yields `ProductWithdrawn` and no order
    /// becomes visible. Either the whole order lands or none of it does.
    async fn create_order(&self, order: &Order) -> EngineResult<()>;

    async fn get_order(&self, id: Uuid) -> EngineResult<Option<Order>>;

    /// Versioned update: succeeds only when `order.version` matches the
    /// stored entity, returning the stored copy with its bumped version.
    /// A lost race yields `EngineError::Conflict` (retryable once with a
    /// fresh read).
    async fn update_order(&self, order: &Order) -> EngineResult<Order>;

    async fn list_orders_for_buyer(&self, buyer_id: Uuid) -> EngineResult<Vec<Order>>;
}
