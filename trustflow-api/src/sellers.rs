use axum::extract::{Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use trustflow_catalog::SellerAccount;
use uuid::Uuid;

use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct RegisterSellerRequest {
    pub display_name: String,
}

#[derive(Debug, Serialize)]
pub struct SellerResponse {
    pub id: Uuid,
    pub display_name: String,
    pub tier: String,
    pub reputation_score: f64,
    pub rating_count: u32,
}

impl From<SellerAccount> for SellerResponse {
    fn from(s: SellerAccount) -> Self {
        Self {
            id: s.id,
            display_name: s.display_name,
            tier: s.tier.to_string(),
            reputation_score: s.reputation_score,
            rating_count: s.rating_count,
        }
    }
}

/// POST /sellers
pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterSellerRequest>,
) -> Result<Json<SellerResponse>, AppError> {
    let seller = state.listings.register_seller(body.display_name).await?;
    Ok(Json(seller.into()))
}

/// GET /sellers/{id}
pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SellerResponse>, AppError> {
    let seller = state.listings.get_seller(id).await?;
    Ok(Json(seller.into()))
}

#[derive(Debug, Deserialize)]
pub struct UpgradeRequest {
    pub tier: String,
}

/// POST /sellers/{id}/upgrade - the only path that changes a tier.
pub async fn upgrade(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<UpgradeRequest>,
) -> Result<Json<SellerResponse>, AppError> {
    let tier = body.tier.parse()?;
    let seller = state.listings.upgrade_seller_tier(id, tier).await?;
    Ok(Json(seller.into()))
}

#[derive(Debug, Deserialize)]
pub struct ReviewRequest {
    pub order_id: Uuid,
    pub reviewer_id: Uuid,
    pub rating: u8,
}

/// POST /reviews - buyer rates the seller of a released order.
pub async fn review(
    State(state): State<AppState>,
    Json(body): Json<ReviewRequest>,
) -> Result<Json<SellerResponse>, AppError> {
    let seller = state
        .workflow
        .record_review(body.order_id, body.reviewer_id, body.rating)
        .await?;
    Ok(Json(seller.into()))
}
