use axum::extract::{Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use trustflow_core::Money;
use trustflow_order::{Actor, Arbitration, Carrier, EscrowStatus, Order};
use uuid::Uuid;

use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateOrderRequest {
    pub product_id: Uuid,
    pub buyer_id: Uuid,
    /// Omitted means "auto-assign" via the carrier policy.
    pub carrier_id: Option<Uuid>,
}

#[derive(Debug, Serialize)]
pub struct OrderResponse {
    pub id: Uuid,
    pub product_id: Uuid,
    pub buyer_id: Uuid,
    pub seller_id: Uuid,
    pub carrier_id: Uuid,
    pub total_amount: Money,
    pub platform_fee: Money,
    pub net_amount: Money,
    pub escrow_status: EscrowStatus,
    pub order_status: String,
    pub tracking_code: Option<String>,
}

impl From<Order> for OrderResponse {
    fn from(o: Order) -> Self {
        let order_status = match o.escrow_status {
            EscrowStatus::Held if o.is_shipped() => "SHIPPED",
            EscrowStatus::Held => "PENDING",
            EscrowStatus::Disputed => "DISPUTED",
            EscrowStatus::Released => "COMPLETED",
            EscrowStatus::Refunded => "REFUNDED",
        }
        .to_string();
        Self {
            id: o.id,
            product_id: o.product_id,
            buyer_id: o.buyer_id,
            seller_id: o.seller_id,
            carrier_id: o.carrier_id,
            total_amount: o.total_amount,
            platform_fee: o.platform_fee,
            net_amount: o.net_amount,
            escrow_status: o.escrow_status,
            order_status,
            tracking_code: o.tracking_code,
        }
    }
}

/// POST /orders - purchase; funds land in escrow.
pub async fn create(
    State(state): State<AppState>,
    Json(body): Json<CreateOrderRequest>,
) -> Result<Json<OrderResponse>, AppError> {
    let order = state
        .workflow
        .create_order(body.product_id, body.buyer_id, body.carrier_id)
        .await?;
    Ok(Json(order.into()))
}

/// GET /orders/{id}
pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<OrderResponse>, AppError> {
    let order = state.workflow.get_order(id).await?;
    Ok(Json(order.into()))
}

#[derive(Debug, Deserialize)]
pub struct ActorRequest {
    pub actor: Actor,
}

/// POST /orders/{id}/confirm - buyer confirms delivery, escrow releases.
pub async fn confirm(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<ActorRequest>,
) -> Result<Json<OrderResponse>, AppError> {
    let order = state.workflow.confirm_delivery(id, body.actor).await?;
    Ok(Json(order.into()))
}

/// POST /orders/{id}/dispute
pub async fn dispute(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<ActorRequest>,
) -> Result<Json<OrderResponse>, AppError> {
    let order = state.workflow.raise_dispute(id, body.actor).await?;
    Ok(Json(order.into()))
}

#[derive(Debug, Deserialize)]
pub struct ResolveRequest {
    pub arbiter_id: Uuid,
    pub outcome: Arbitration,
}

/// POST /orders/{id}/resolve - arbitration decision on a disputed order.
pub async fn resolve(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<ResolveRequest>,
) -> Result<Json<OrderResponse>, AppError> {
    let order = state
        .workflow
        .resolve_dispute(id, body.outcome, Actor::Arbiter(body.arbiter_id))
        .await?;
    Ok(Json(order.into()))
}

#[derive(Debug, Deserialize)]
pub struct ShipRequest {
    pub actor: Actor,
    pub tracking_code: String,
}

/// POST /orders/{id}/ship - records the milestone gating seller cancellation.
pub async fn ship(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<ShipRequest>,
) -> Result<Json<OrderResponse>, AppError> {
    let order = state
        .workflow
        .mark_shipped(id, body.actor, body.tracking_code)
        .await?;
    Ok(Json(order.into()))
}

/// POST /orders/{id}/cancel - seller cancels before shipment; buyer refunded.
pub async fn cancel(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<ActorRequest>,
) -> Result<Json<OrderResponse>, AppError> {
    let order = state.workflow.cancel_before_shipment(id, body.actor).await?;
    Ok(Json(order.into()))
}

#[derive(Debug, Deserialize)]
pub struct RegisterCarrierRequest {
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct CarrierResponse {
    pub id: Uuid,
    pub name: String,
    pub active: bool,
}

impl From<Carrier> for CarrierResponse {
    fn from(c: Carrier) -> Self {
        Self {
            id: c.id,
            name: c.name,
            active: c.active,
        }
    }
}

/// POST /carriers
pub async fn register_carrier(
    State(state): State<AppState>,
    Json(body): Json<RegisterCarrierRequest>,
) -> Result<Json<CarrierResponse>, AppError> {
    let carrier = Carrier::new(body.name);
    state.carriers.register_carrier(&carrier).await?;
    Ok(Json(carrier.into()))
}

/// GET /carriers - the pool available for auto-assignment.
pub async fn list_carriers(
    State(state): State<AppState>,
) -> Result<Json<Vec<CarrierResponse>>, AppError> {
    let carriers = state.carriers.list_available_carriers().await?;
    Ok(Json(carriers.into_iter().map(Into::into).collect()))
}
