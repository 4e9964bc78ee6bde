use serde::Deserialize;
use trustflow_core::{EngineError, EngineResult, Money};
use trustflow_catalog::UserTier;

/// Commission percentage per seller tier. Operator-tunable configuration,
/// not engine constants. Platinum inherits Gold's rate unless a distinct
/// rate is configured.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct CommissionRates {
    pub bronze: f64,
    pub silver: f64,
    pub gold: f64,
    pub platinum: Option<f64>,
}

impl Default for CommissionRates {
    fn default() -> Self {
        Self {
            bronze: 5.0,
            silver: 4.0,
            gold: 3.0,
            platinum: None,
        }
    }
}

/// Fee split for one transaction. Invariant: `platform_fee + net_amount`
/// equals the input amount exactly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeeBreakdown {
    pub platform_fee: Money,
    pub net_amount: Money,
}

/// Maps a seller's subscription tier to the platform commission.
///
/// Deterministic and side-effect-free: it only sees the tier value passed
/// in, so a tier change mid-transaction cannot alter an already-computed fee.
#[derive(Debug, Clone, Copy)]
pub struct FeeScheduler {
    rates: CommissionRates,
}

impl FeeScheduler {
    pub fn new(rates: CommissionRates) -> EngineResult<Self> {
        for (tier, rate) in [
            ("bronze", rates.bronze),
            ("silver", rates.silver),
            ("gold", rates.gold),
            ("platinum", rates.platinum.unwrap_or(rates.gold)),
        ] {
            if !(0.0..=100.0).contains(&rate) {
                return Err(EngineError::Validation(format!(
                    "Commission rate for {tier} must be within 0-100, got {rate}"
                )));
            }
        }
        Ok(Self { rates })
    }

    pub fn rate_for(&self, tier: UserTier) -> f64 {
        match tier {
            UserTier::Bronze => self.rates.bronze,
            UserTier::Silver => self.rates.silver,
            UserTier::Gold => self.rates.gold,
            UserTier::Platinum => self.rates.platinum.unwrap_or(self.rates.gold),
        }
    }

    pub fn compute_fee(&self, amount: Money, tier: UserTier) -> EngineResult<FeeBreakdown> {
        if amount.is_negative() {
            return Err(EngineError::Validation(format!(
                "Transaction amount must not be negative, got {amount}"
            )));
        }

        let platform_fee = amount.percent(self.rate_for(tier));
        let net_amount = amount - platform_fee;
        Ok(FeeBreakdown {
            platform_fee,
            net_amount,
        })
    }
}

impl Default for FeeScheduler {
    fn default() -> Self {
        Self {
            rates: CommissionRates::default(),
        }
    }
}
