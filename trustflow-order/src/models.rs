use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use trustflow_core::Money;
use uuid::Uuid;

/// Canonical escrow lifecycle states. Upstream modules of the legacy system
/// spelled these inconsistently (`held`, `released_to_seller`); serialization
/// always emits the canonical spelling, and deserialization normalizes the
/// legacy variants via [`EscrowStatus::parse_lenient`].
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EscrowStatus {
    Held,
    Released,
    Disputed,
    Refunded,
}

impl EscrowStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EscrowStatus::Held => "HELD",
            EscrowStatus::Released => "RELEASED",
            EscrowStatus::Disputed => "DISPUTED",
            EscrowStatus::Refunded => "REFUNDED",
        }
    }

    pub fn parse_lenient(raw: &str) -> Option<EscrowStatus> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "HELD" => Some(EscrowStatus::Held),
            "RELEASED" | "RELEASED_TO_SELLER" => Some(EscrowStatus::Released),
            "DISPUTED" => Some(EscrowStatus::Disputed),
            "REFUNDED" | "RELEASED_TO_BUYER" => Some(EscrowStatus::Refunded),
            _ => None,
        }
    }

    /// No transition ever leaves a terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, EscrowStatus::Released | EscrowStatus::Refunded)
    }
}

impl std::fmt::Display for EscrowStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for EscrowStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        EscrowStatus::parse_lenient(&raw)
            .ok_or_else(|| serde::de::Error::custom(format!("unknown escrow status: {raw}")))
    }
}

/// Who performed a lifecycle action. Identity is checked against the order's
/// parties by the state machine guards.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "role", content = "id", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Actor {
    Buyer(Uuid),
    Seller(Uuid),
    Carrier(Uuid),
    Arbiter(Uuid),
    System,
}

/// Arbitration outcome for a disputed order.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Arbitration {
    SellerFavor,
    BuyerFavor,
}

/// One entry of the append-only escrow audit trail. Entries are never
/// rewritten; `seq` is dense and starts at 0 with the initial Held record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HistoryEntry {
    pub seq: u32,
    pub status: EscrowStatus,
    pub at: DateTime<Utc>,
    pub actor: Actor,
}

/// Notification emitted after every successful escrow transition, for
/// external persistence or push channels.
#[derive(Debug, Clone, Serialize)]
pub struct EscrowEvent {
    pub order_id: Uuid,
    pub from: EscrowStatus,
    pub to: EscrowStatus,
    pub actor: Actor,
    pub at: DateTime<Utc>,
}

/// A purchase with platform-held funds. `total_amount` is immutable after
/// creation; `escrow_status` changes only through state machine transitions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: Uuid,
    pub product_id: Uuid,
    pub buyer_id: Uuid,
    pub seller_id: Uuid,
    pub carrier_id: Uuid,
    pub total_amount: Money,
    pub platform_fee: Money,
    pub net_amount: Money,
    pub escrow_status: EscrowStatus,
    pub tracking_code: Option<String>,
    pub shipped_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub history: Vec<HistoryEntry>,
    pub version: u64,
}

impl Order {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        product_id: Uuid,
        buyer_id: Uuid,
        seller_id: Uuid,
        carrier_id: Uuid,
        total_amount: Money,
        platform_fee: Money,
        net_amount: Money,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            product_id,
            buyer_id,
            seller_id,
            carrier_id,
            total_amount,
            platform_fee,
            net_amount,
            escrow_status: EscrowStatus::Held,
            tracking_code: None,
            shipped_at: None,
            created_at: now,
            history: vec![HistoryEntry {
                seq: 0,
                status: EscrowStatus::Held,
                at: now,
                actor: Actor::Buyer(buyer_id),
            }],
            version: 0,
        }
    }

    pub fn is_shipped(&self) -> bool {
        self.shipped_at.is_some()
    }

    pub(crate) fn append_history(&mut self, status: EscrowStatus, actor: Actor) -> DateTime<Utc> {
        let now = Utc::now();
        let seq = self.history.len() as u32;
        self.history.push(HistoryEntry {
            seq,
            status,
            at: now,
            actor,
        });
        now
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_orders_start_held_with_one_history_entry() {
        let order = Order::new(
            Uuid::new_v4(),
            Uuid::new_v4(),
            Uuid::new_v4(),
            Uuid::new_v4(),
            Money::from_major(1200),
            Money::from_major(60),
            Money::from_major(1140),
        );
        assert_eq!(order.escrow_status, EscrowStatus::Held);
        assert_eq!(order.history.len(), 1);
        assert_eq!(order.history[0].seq, 0);
        assert_eq!(order.history[0].status, EscrowStatus::Held);
    }

    #[test]
    fn legacy_spellings_normalize_to_the_canonical_status() {
        assert_eq!(EscrowStatus::parse_lenient("held"), Some(EscrowStatus::Held));
        assert_eq!(
            EscrowStatus::parse_lenient("released_to_seller"),
            Some(EscrowStatus::Released)
        );
        assert_eq!(
            EscrowStatus::parse_lenient("released_to_buyer"),
            Some(EscrowStatus::Refunded)
        );
        assert_eq!(EscrowStatus::parse_lenient("frozen"), None);
    }

    #[test]
    fn serde_emits_canonical_and_accepts_legacy_spellings() {
        assert_eq!(
            serde_json::to_string(&EscrowStatus::Released).unwrap(),
            "\"RELEASED\""
        );

        let status: EscrowStatus = serde_json::from_str("\"released_to_seller\"").unwrap();
        assert_eq!(status, EscrowStatus::Released);
        let status: EscrowStatus = serde_json::from_str("\"held\"").unwrap();
        assert_eq!(status, EscrowStatus::Held);
        assert!(serde_json::from_str::<EscrowStatus>("\"frozen\"").is_err());
    }

    #[test]
    fn terminal_states_are_released_and_refunded() {
        assert!(EscrowStatus::Released.is_terminal());
        assert!(EscrowStatus::Refunded.is_terminal());
        assert!(!EscrowStatus::Held.is_terminal());
        assert!(!EscrowStatus::Disputed.is_terminal());
    }
}
