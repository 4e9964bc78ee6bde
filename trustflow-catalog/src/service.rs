use std::sync::Arc;

use trustflow_core::{EngineError, EngineResult, Money};
use trustflow_risk::{AnalysisRequest, RiskAssessment, RiskClassifierGateway};
use uuid::Uuid;

use crate::product::Product;
use crate::repository::{ProductRepository, SellerRepository};
use crate::seller::{SellerAccount, UserTier};

/// Listing-side operations: publish, analyze, withdraw, and seller account
/// management. Classifier calls happen here, in a distinct step before any
/// purchase path, and never hold a store lock.
pub struct ListingService {
    products: Arc<dyn ProductRepository>,
    sellers: Arc<dyn SellerRepository>,
    gateway: Arc<RiskClassifierGateway>,
}

impl ListingService {
    pub fn new(
        products: Arc<dyn ProductRepository>,
        sellers: Arc<dyn SellerRepository>,
        gateway: Arc<RiskClassifierGateway>,
    ) -> Self {
        Self {
            products,
            sellers,
            gateway,
        }
    }

    pub async fn register_seller(&self, display_name: String) -> EngineResult<SellerAccount> {
        if display_name.trim().is_empty() {
            return Err(EngineError::Validation(
                "Seller display name must not be empty".into(),
            ));
        }
        let seller = SellerAccount::new(display_name);
        self.sellers.insert_seller(&seller).await?;
        tracing::info!(seller_id = %seller.id, "Registered seller");
        Ok(seller)
    }

    pub async fn get_seller(&self, id: Uuid) -> EngineResult<SellerAccount> {
        self.sellers
            .get_seller(id)
            .await?
            .ok_or_else(|| EngineError::not_found("seller", id))
    }

    /// Run the classifier against listing data without publishing anything.
    pub async fn analyze_listing(
        &self,
        seller_id: Uuid,
        title: String,
        description: String,
        price: Money,
    ) -> EngineResult<RiskAssessment> {
        let seller = self.get_seller(seller_id).await?;
        self.gateway
            .assess(AnalysisRequest {
                title,
                description,
                price,
                seller_reputation: seller.reputation_score,
            })
            .await
    }

    /// Publish a listing with its assessment attached. The assessment is
    /// resolved before the product becomes visible, so a listing is never
    /// purchasable without one.
    pub async fn publish_listing(
        &self,
        seller_id: Uuid,
        title: String,
        description: String,
        price: Money,
    ) -> EngineResult<Product> {
        if title.trim().is_empty() {
            return Err(EngineError::Validation("Listing title must not be empty".into()));
        }

        let assessment = self
            .analyze_listing(seller_id, title.clone(), description.clone(), price)
            .await?;

        let mut product = Product::new(seller_id, title, description, price);
        product.attach_assessment(assessment);
        self.products.insert_product(&product).await?;
        tracing::info!(product_id = %product.id, seller_id = %seller_id, tier = %product.current_assessment.as_ref().map(|a| a.tier.as_str()).unwrap_or("-"), "Published listing");
        Ok(product)
    }

    pub async fn get_product(&self, id: Uuid) -> EngineResult<Product> {
        self.products
            .get_product(id)
            .await?
            .ok_or_else(|| EngineError::not_found("product", id))
    }

    pub async fn list_active_products(&self) -> EngineResult<Vec<Product>> {
        self.products.list_active_products().await
    }

    /// Re-run analysis on an existing listing; the new assessment supersedes
    /// the old one.
    pub async fn reassess_product(&self, product_id: Uuid) -> EngineResult<Product> {
        let mut attempt = 0;
        loop {
            let mut product = self.get_product(product_id).await?;
            let seller = self.get_seller(product.seller_id).await?;
            let assessment = self
                .gateway
                .assess(AnalysisRequest {
                    title: product.title.clone(),
                    description: product.description.clone(),
                    price: product.price,
                    seller_reputation: seller.reputation_score,
                })
                .await?;
            product.attach_assessment(assessment);
            match self.products.update_product(&product).await {
                Ok(updated) => return Ok(updated),
                Err(err) if err.is_retryable() && attempt == 0 => attempt += 1,
                Err(err) => return Err(err),
            }
        }
    }

    /// Withdraw a listing. Blocks new purchases only; open orders keep their
    /// escrow lifecycle.
    pub async fn withdraw_product(&self, product_id: Uuid, seller_id: Uuid) -> EngineResult<Product> {
        let mut attempt = 0;
        loop {
            let mut product = self.get_product(product_id).await?;
            if product.seller_id != seller_id {
                return Err(EngineError::Precondition(
                    "Only the owning seller may withdraw a listing".into(),
                ));
            }
            product.withdraw();
            match self.products.update_product(&product).await {
                Ok(updated) => {
                    tracing::info!(product_id = %product_id, "Listing withdrawn");
                    return Ok(updated);
                }
                Err(err) if err.is_retryable() && attempt == 0 => attempt += 1,
                Err(err) => return Err(err),
            }
        }
    }

    /// Explicit subscription upgrade; the only path that changes a tier.
    pub async fn upgrade_seller_tier(
        &self,
        seller_id: Uuid,
        tier: UserTier,
    ) -> EngineResult<SellerAccount> {
        let mut attempt = 0;
        loop {
            let mut seller = self.get_seller(seller_id).await?;
            seller.upgrade_tier(tier);
            match self.sellers.update_seller(&seller).await {
                Ok(updated) => {
                    tracing::info!(seller_id = %seller_id, tier = %tier, "Seller tier upgraded");
                    return Ok(updated);
                }
                Err(err) if err.is_retryable() && attempt == 0 => attempt += 1,
                Err(err) => return Err(err),
            }
        }
    }
}
