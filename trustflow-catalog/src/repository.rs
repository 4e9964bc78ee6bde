use async_trait::async_trait;
use trustflow_core::EngineResult;
use uuid::Uuid;

use crate::product::Product;
use crate::seller::SellerAccount;

/// Keyed access to listings. Updates use optimistic concurrency: the write
/// succeeds only when the entity's `version` matches the stored one, and the
/// returned copy carries the bumped version. A mismatch yields
/// `EngineError::Conflict`.
#[async_trait]
pub trait ProductRepository: Send + Sync {
    async fn insert_product(&self, product: &Product) -> EngineResult<()>;

    async fn get_product(&self, id: Uuid) -> EngineResult<Option<Product>>;

    async fn list_active_products(&self) -> EngineResult<Vec<Product>>;

    async fn update_product(&self, product: &Product) -> EngineResult<Product>;
}

/// Keyed access to seller accounts, same versioned-update contract as
/// [`ProductRepository`].
#[async_trait]
pub trait SellerRepository: Send + Sync {
    async fn insert_seller(&self, seller: &SellerAccount) -> EngineResult<()>;

    async fn get_seller(&self, id: Uuid) -> EngineResult<Option<SellerAccount>>;

    async fn update_seller(&self, seller: &SellerAccount) -> EngineResult<SellerAccount>;
}
