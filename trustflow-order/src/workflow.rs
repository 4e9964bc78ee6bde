use std::sync::Arc;

use tokio::sync::broadcast;
use trustflow_catalog::{ProductRepository, SellerAccount, SellerRepository};
use trustflow_core::{EngineError, EngineResult};
use trustflow_risk::TrustScoreEvaluator;
use uuid::Uuid;

use crate::carrier::{AssignmentContext, CarrierAssignmentPolicy, CarrierDirectory};
use crate::escrow::{EscrowCommand, EscrowStateMachine};
use crate::fees::FeeScheduler;
use crate::models::{Actor, Arbitration, EscrowEvent, EscrowStatus, Order};
use crate::repository::OrderRepository;

const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Orchestrates purchases and the escrow lifecycle.
///
/// Risk evaluation, fee computation and carrier assignment feed order
/// creation; lifecycle events re-enter here and drive the state machine.
/// Every successful transition is broadcast as an [`EscrowEvent`] for
/// external persistence/notification.
pub struct OrderWorkflow {
    products: Arc<dyn ProductRepository>,
    sellers: Arc<dyn SellerRepository>,
    orders: Arc<dyn OrderRepository>,
    carriers: Arc<dyn CarrierDirectory>,
    policy: Arc<dyn CarrierAssignmentPolicy>,
    evaluator: TrustScoreEvaluator,
    fees: FeeScheduler,
    /// When set, orders whose risk does not require escrow are released to
    /// the seller immediately after creation.
    auto_release_without_escrow: bool,
    events: broadcast::Sender<EscrowEvent>,
}

impl OrderWorkflow {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        products: Arc<dyn ProductRepository>,
        sellers: Arc<dyn SellerRepository>,
        orders: Arc<dyn OrderRepository>,
        carriers: Arc<dyn CarrierDirectory>,
        policy: Arc<dyn CarrierAssignmentPolicy>,
        evaluator: TrustScoreEvaluator,
        fees: FeeScheduler,
        auto_release_without_escrow: bool,
    ) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            products,
            sellers,
            orders,
            carriers,
            policy,
            evaluator,
            fees,
            auto_release_without_escrow,
            events,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<EscrowEvent> {
        self.events.subscribe()
    }

    pub async fn get_order(&self, order_id: Uuid) -> EngineResult<Order> {
        self.orders
            .get_order(order_id)
            .await?
            .ok_or_else(|| EngineError::not_found("order", order_id))
    }

    pub async fn list_orders_for_buyer(&self, buyer_id: Uuid) -> EngineResult<Vec<Order>> {
        self.orders.list_orders_for_buyer(buyer_id).await
    }

    /// Create an order for a listed product, funds held in escrow.
    ///
    /// The listing must be assessed already: the classifier is never called
    /// from the purchase path. An explicit `carrier_id` pins that carrier
    /// (it must be in the available pool); otherwise the assignment policy
    /// picks one.
    pub async fn create_order(
        &self,
        product_id: Uuid,
        buyer_id: Uuid,
        carrier_id: Option<Uuid>,
    ) -> EngineResult<Order> {
        let product = self
            .products
            .get_product(product_id)
            .await?
            .ok_or_else(|| EngineError::not_found("product", product_id))?;
        if !product.is_active() {
            return Err(EngineError::ProductWithdrawn(product_id.to_string()));
        }

        let assessment = product
            .current_assessment
            .as_ref()
            .ok_or_else(|| EngineError::AssessmentRequired(product_id.to_string()))?;
        let escrow_required = self
            .evaluator
            .escrow_required(assessment.tier, assessment.escrow_recommended);

        // Commission is fixed at the seller's tier at purchase time; later
        // tier changes never alter it.
        let seller = self
            .sellers
            .get_seller(product.seller_id)
            .await?
            .ok_or_else(|| EngineError::not_found("seller", product.seller_id))?;
        let split = self.fees.compute_fee(product.price, seller.tier)?;

        let pool = self.carriers.list_available_carriers().await?;
        let context = AssignmentContext {
            product_id,
            buyer_id,
            total_amount: product.price,
        };
        let assigned_carrier = match carrier_id {
            Some(pinned) => {
                if !pool.iter().any(|c| c.id == pinned && c.active) {
                    return Err(EngineError::CarrierNotInPool(pinned.to_string()));
                }
                pinned
            }
            None => self.policy.select(&context, &pool)?,
        };

        let mut order = Order::new(
            product_id,
            buyer_id,
            product.seller_id,
            assigned_carrier,
            product.price,
            split.platform_fee,
            split.net_amount,
        );
        self.orders.create_order(&order).await?;
        tracing::info!(
            order_id = %order.id,
            product_id = %product_id,
            total = %order.total_amount,
            fee = %order.platform_fee,
            escrow_required,
            "Order created with funds held"
        );

        if !escrow_required && self.auto_release_without_escrow {
            let event = EscrowStateMachine::apply(&mut order, EscrowCommand::ConfirmDelivery, Actor::System)?;
            order = self.orders.update_order(&order).await?;
            let _ = self.events.send(event);
        }

        Ok(order)
    }

    /// Record the shipped milestone (gates seller cancellation). Seller or
    /// the assigned carrier may record it, once, while funds are held.
    pub async fn mark_shipped(
        &self,
        order_id: Uuid,
        actor: Actor,
        tracking_code: String,
    ) -> EngineResult<Order> {
        let mut attempt = 0;
        loop {
            let mut order = self.get_order(order_id).await?;
            let permitted = match actor {
                Actor::Seller(id) => id == order.seller_id,
                Actor::Carrier(id) => id == order.carrier_id,
                _ => false,
            };
            if !permitted {
                return Err(EngineError::Precondition(
                    "Only the seller or assigned carrier may record shipment".into(),
                ));
            }
            if order.escrow_status != EscrowStatus::Held {
                return Err(EngineError::Precondition(format!(
                    "Cannot ship an order in {}",
                    order.escrow_status
                )));
            }
            if order.is_shipped() {
                return Err(EngineError::Precondition("Order is already shipped".into()));
            }

            order.shipped_at = Some(chrono::Utc::now());
            order.tracking_code = Some(tracking_code.clone());
            match self.orders.update_order(&order).await {
                Ok(updated) => return Ok(updated),
                Err(err) if err.is_retryable() && attempt == 0 => attempt += 1,
                Err(err) => return Err(err),
            }
        }
    }

    pub async fn confirm_delivery(&self, order_id: Uuid, actor: Actor) -> EngineResult<Order> {
        self.transition(order_id, EscrowCommand::ConfirmDelivery, actor).await
    }

    pub async fn raise_dispute(&self, order_id: Uuid, actor: Actor) -> EngineResult<Order> {
        self.transition(order_id, EscrowCommand::RaiseDispute, actor).await
    }

    pub async fn resolve_dispute(
        &self,
        order_id: Uuid,
        outcome: Arbitration,
        actor: Actor,
    ) -> EngineResult<Order> {
        self.transition(order_id, EscrowCommand::ResolveDispute(outcome), actor)
            .await
    }

    pub async fn cancel_before_shipment(&self, order_id: Uuid, actor: Actor) -> EngineResult<Order> {
        self.transition(order_id, EscrowCommand::CancelBeforeShipment, actor)
            .await
    }

    /// Buyer of a released order rates the seller; reputation folds in the
    /// new rating.
    pub async fn record_review(
        &self,
        order_id: Uuid,
        reviewer_id: Uuid,
        rating: u8,
    ) -> EngineResult<SellerAccount> {
        let order = self.get_order(order_id).await?;
        if order.buyer_id != reviewer_id {
            return Err(EngineError::Precondition(
                "Only the buyer of the order may leave a review".into(),
            ));
        }
        if order.escrow_status != EscrowStatus::Released {
            return Err(EngineError::Precondition(
                "Reviews are accepted only after funds are released".into(),
            ));
        }

        let mut attempt = 0;
        loop {
            let mut seller = self
                .sellers
                .get_seller(order.seller_id)
                .await?
                .ok_or_else(|| EngineError::not_found("seller", order.seller_id))?;
            seller.record_rating(rating)?;
            match self.sellers.update_seller(&seller).await {
                Ok(updated) => return Ok(updated),
                Err(err) if err.is_retryable() && attempt == 0 => attempt += 1,
                Err(err) => return Err(err),
            }
        }
    }

    /// Load-apply-store with a single retry on a lost optimistic race. The
    /// retry re-reads, so a loser either observes the winner's state (and
    /// typically fails with `InvalidTransition`) or applies cleanly.
    async fn transition(
        &self,
        order_id: Uuid,
        command: EscrowCommand,
        actor: Actor,
    ) -> EngineResult<Order> {
        let mut attempt = 0;
        loop {
            let mut order = self.get_order(order_id).await?;
            let event = EscrowStateMachine::apply(&mut order, command, actor)?;
            match self.orders.update_order(&order).await {
                Ok(updated) => {
                    let _ = self.events.send(event);
                    return Ok(updated);
                }
                Err(err) if err.is_retryable() && attempt == 0 => {
                    tracing::debug!(order_id = %order_id, event = command.name(), "Lost transition race, retrying with fresh read");
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }
}
