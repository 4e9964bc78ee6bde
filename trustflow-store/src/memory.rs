use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use trustflow_catalog::{Product, ProductRepository, SellerAccount, SellerRepository};
use trustflow_core::{EngineError, EngineResult};
use trustflow_order::{Carrier, CarrierDirectory, Order, OrderRepository};
use uuid::Uuid;

#[derive(Default)]
struct StoreState {
    products: HashMap<Uuid, Product>,
    sellers: HashMap<Uuid, SellerAccount>,
    orders: HashMap<Uuid, Order>,
    carriers: Vec<Carrier>,
}

/// In-memory keyed store backing every repository trait.
///
/// One lock over all tables keeps cross-table checks (order creation
/// validating its product) atomic, and versioned writes give per-entity
/// linearizability: a write only lands when the caller saw the latest
/// version, otherwise it loses the race with `EngineError::Conflict`.
#[derive(Clone, Default)]
pub struct MemoryStore {
    state: Arc<RwLock<StoreState>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProductRepository for MemoryStore {
    async fn insert_product(&self, product: &Product) -> EngineResult<()> {
        let mut state = self.state.write().await;
        if state.products.contains_key(&product.id) {
            return Err(EngineError::conflict("product", product.id));
        }
        state.products.insert(product.id, product.clone());
        Ok(())
    }

    async fn get_product(&self, id: Uuid) -> EngineResult<Option<Product>> {
        Ok(self.state.read().await.products.get(&id).cloned())
    }

    async fn list_active_products(&self) -> EngineResult<Vec<Product>> {
        let state = self.state.read().await;
        let mut products: Vec<Product> = state
            .products
            .values()
            .filter(|p| p.is_active())
            .cloned()
            .collect();
        products.sort_by_key(|p| p.created_at);
        Ok(products)
    }

    async fn update_product(&self, product: &Product) -> EngineResult<Product> {
        let mut state = self.state.write().await;
        let stored = state
            .products
            .get_mut(&product.id)
            .ok_or_else(|| EngineError::not_found("product", product.id))?;
        if stored.version != product.version {
            return Err(EngineError::conflict("product", product.id));
        }
        *stored = product.clone();
        stored.version += 1;
        Ok(stored.clone())
    }
}

#[async_trait]
impl SellerRepository for MemoryStore {
    async fn insert_seller(&self, seller: &SellerAccount) -> EngineResult<()> {
        let mut state = self.state.write().await;
        if state.sellers.contains_key(&seller.id) {
            return Err(EngineError::conflict("seller", seller.id));
        }
        state.sellers.insert(seller.id, seller.clone());
        Ok(())
    }

    async fn get_seller(&self, id: Uuid) -> EngineResult<Option<SellerAccount>> {
        Ok(self.state.read().await.sellers.get(&id).cloned())
    }

    async fn update_seller(&self, seller: &SellerAccount) -> EngineResult<SellerAccount> {
        let mut state = self.state.write().await;
        let stored = state
            .sellers
            .get_mut(&seller.id)
            .ok_or_else(|| EngineError::not_found("seller", seller.id))?;
        if stored.version != seller.version {
            return Err(EngineError::conflict("seller", seller.id));
        }
        *stored = seller.clone();
        stored.version += 1;
        Ok(stored.clone())
    }
}

#[async_trait]
impl OrderRepository for MemoryStore {
    async fn create_order(&self, order: &Order) -> EngineResult<()> {
        let mut state = self.state.write().await;

        // Product check and insert under the same write guard: a concurrent
        // withdrawal cannot slip between validation and persistence.
        let product = state
            .products
            .get(&order.product_id)
            .ok_or_else(|| EngineError::not_found("product", order.product_id))?;
        if !product.is_active() {
            return Err(EngineError::ProductWithdrawn(order.product_id.to_string()));
        }
        if state.orders.contains_key(&order.id) {
            return Err(EngineError::conflict("order", order.id));
        }

        state.orders.insert(order.id, order.clone());
        Ok(())
    }

    async fn get_order(&self, id: Uuid) -> EngineResult<Option<Order>> {
        Ok(self.state.read().await.orders.get(&id).cloned())
    }

    async fn update_order(&self, order: &Order) -> EngineResult<Order> {
        let mut state = self.state.write().await;
        let stored = state
            .orders
            .get_mut(&order.id)
            .ok_or_else(|| EngineError::not_found("order", order.id))?;
        if stored.version != order.version {
            return Err(EngineError::conflict("order", order.id));
        }
        *stored = order.clone();
        stored.version += 1;
        Ok(stored.clone())
    }

    async fn list_orders_for_buyer(&self, buyer_id: Uuid) -> EngineResult<Vec<Order>> {
        let state = self.state.read().await;
        let mut orders: Vec<Order> = state
            .orders
            .values()
            .filter(|o| o.buyer_id == buyer_id)
            .cloned()
            .collect();
        orders.sort_by_key(|o| o.created_at);
        Ok(orders)
    }
}

#[async_trait]
impl CarrierDirectory for MemoryStore {
    async fn register_carrier(&self, carrier: &Carrier) -> EngineResult<()> {
        let mut state = self.state.write().await;
        if state.carriers.iter().any(|c| c.id == carrier.id) {
            return Err(EngineError::conflict("carrier", carrier.id));
        }
        state.carriers.push(carrier.clone());
        Ok(())
    }

    async fn list_available_carriers(&self) -> EngineResult<Vec<Carrier>> {
        let state = self.state.read().await;
        Ok(state.carriers.iter().filter(|c| c.active).cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trustflow_core::Money;

    fn product() -> Product {
        Product::new(
            Uuid::new_v4(),
            "Standing desk".into(),
            "Height adjustable".into(),
            Money::from_major(400),
        )
    }

    #[tokio::test]
    async fn stale_product_update_loses_the_race() {
        let store = MemoryStore::new();
        let p = product();
        store.insert_product(&p).await.unwrap();

        // Two readers take the same snapshot.
        let mut first = store.get_product(p.id).await.unwrap().unwrap();
        let mut second = store.get_product(p.id).await.unwrap().unwrap();

        first.withdraw();
        store.update_product(&first).await.unwrap();

        second.title = "renamed".into();
        let err = store.update_product(&second).await.unwrap_err();
        assert!(matches!(err, EngineError::Conflict { .. }));

        // Loser observes the winner's state on a fresh read.
        let current = store.get_product(p.id).await.unwrap().unwrap();
        assert!(!current.is_active());
        assert_eq!(current.version, 1);
    }

    #[tokio::test]
    async fn order_creation_rejects_withdrawn_products_atomically() {
        let store = MemoryStore::new();
        let mut p = product();
        store.insert_product(&p).await.unwrap();

        p.withdraw();
        store.update_product(&p).await.unwrap();

        let order = Order::new(
            p.id,
            Uuid::new_v4(),
            p.seller_id,
            Uuid::new_v4(),
            p.price,
            Money::from_major(20),
            Money::from_major(380),
        );
        let err = store.create_order(&order).await.unwrap_err();
        assert!(matches!(err, EngineError::ProductWithdrawn(_)));
        assert!(store.get_order(order.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn carrier_directory_hides_inactive_carriers() {
        let store = MemoryStore::new();
        let active = Carrier::new("rapid-post".into());
        let mut paused = Carrier::new("paused-express".into());
        paused.active = false;
        store.register_carrier(&active).await.unwrap();
        store.register_carrier(&paused).await.unwrap();

        let available = store.list_available_carriers().await.unwrap();
        assert_eq!(available.len(), 1);
        assert_eq!(available[0].id, active.id);
    }

    #[tokio::test]
    async fn duplicate_inserts_conflict() {
        let store = MemoryStore::new();
        let p = product();
        store.insert_product(&p).await.unwrap();
        assert!(store.insert_product(&p).await.is_err());
    }
}
