use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use trustflow_core::Money;
use trustflow_risk::RiskAssessment;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProductStatus {
    Active,
    Withdrawn,
}

/// A marketplace listing. The latest risk assessment is attached before or
/// at publish time; re-analysis replaces it wholesale (latest wins).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: Uuid,
    pub seller_id: Uuid,
    pub title: String,
    pub description: String,
    pub price: Money,
    pub current_assessment: Option<RiskAssessment>,
    pub status: ProductStatus,
    pub created_at: DateTime<Utc>,
    /// Optimistic-concurrency token, bumped by the store on every write.
    pub version: u64,
}

impl Product {
    pub fn new(seller_id: Uuid, title: String, description: String, price: Money) -> Self {
        Self {
            id: Uuid::new_v4(),
            seller_id,
            title,
            description,
            price,
            current_assessment: None,
            status: ProductStatus::Active,
            created_at: Utc::now(),
            version: 0,
        }
    }

    /// Replace the current assessment. The superseded one is dropped; the
    /// engine keeps no assessment history.
    pub fn attach_assessment(&mut self, assessment: RiskAssessment) {
        self.current_assessment = Some(assessment);
    }

    /// Withdrawal blocks new purchases only. Orders already open against
    /// this listing are unaffected.
    pub fn withdraw(&mut self) {
        self.status = ProductStatus::Withdrawn;
    }

    pub fn is_active(&self) -> bool {
        self.status == ProductStatus::Active
    }
}
