use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use trustflow_core::{EngineError, EngineResult};
use uuid::Uuid;

/// Seller subscription tier. Changed only by an explicit upgrade operation,
/// never implicitly.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum UserTier {
    Bronze,
    Silver,
    Gold,
    Platinum,
}

impl UserTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserTier::Bronze => "Bronze",
            UserTier::Silver => "Silver",
            UserTier::Gold => "Gold",
            UserTier::Platinum => "Platinum",
        }
    }
}

impl FromStr for UserTier {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "bronze" => Ok(UserTier::Bronze),
            "silver" => Ok(UserTier::Silver),
            "gold" => Ok(UserTier::Gold),
            "platinum" => Ok(UserTier::Platinum),
            other => Err(EngineError::Validation(format!(
                "Unknown subscription tier: {other}"
            ))),
        }
    }
}

impl std::fmt::Display for UserTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Seller account state relevant to trust and fee decisions.
///
/// Reputation is the running average of 1-5 review ratings scaled to 0-100.
/// Sellers with no reviews start at the neutral midpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SellerAccount {
    pub id: Uuid,
    pub display_name: String,
    pub tier: UserTier,
    pub reputation_score: f64,
    pub rating_count: u32,
    pub rating_sum: u32,
    pub created_at: DateTime<Utc>,
    pub version: u64,
}

const NEUTRAL_REPUTATION: f64 = 50.0;

impl SellerAccount {
    pub fn new(display_name: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            display_name,
            tier: UserTier::Bronze,
            reputation_score: NEUTRAL_REPUTATION,
            rating_count: 0,
            rating_sum: 0,
            created_at: Utc::now(),
            version: 0,
        }
    }

    pub fn upgrade_tier(&mut self, tier: UserTier) {
        self.tier = tier;
    }

    /// Fold a 1-5 review rating into the reputation score.
    pub fn record_rating(&mut self, rating: u8) -> EngineResult<()> {
        if !(1..=5).contains(&rating) {
            return Err(EngineError::Validation(format!(
                "Review rating must be within 1-5, got {rating}"
            )));
        }
        self.rating_count += 1;
        self.rating_sum += u32::from(rating);
        self.reputation_score = f64::from(self.rating_sum) / f64::from(self.rating_count) * 20.0;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reputation_is_scaled_average_rating() {
        let mut seller = SellerAccount::new("astra-electronics".into());
        assert_eq!(seller.reputation_score, 50.0);

        seller.record_rating(5).unwrap();
        assert_eq!(seller.reputation_score, 100.0);

        seller.record_rating(3).unwrap();
        assert_eq!(seller.reputation_score, 80.0);

        seller.record_rating(1).unwrap();
        assert_eq!(seller.reputation_score, 60.0);
    }

    #[test]
    fn out_of_range_ratings_are_rejected() {
        let mut seller = SellerAccount::new("astra-electronics".into());
        assert!(seller.record_rating(0).is_err());
        assert!(seller.record_rating(6).is_err());
        assert_eq!(seller.rating_count, 0);
    }

    #[test]
    fn tier_parsing_accepts_any_casing() {
        assert_eq!("platinum".parse::<UserTier>().unwrap(), UserTier::Platinum);
        assert_eq!("GOLD".parse::<UserTier>().unwrap(), UserTier::Gold);
        assert!("diamond".parse::<UserTier>().is_err());
    }
}
