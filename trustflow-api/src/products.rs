use axum::extract::{Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use trustflow_catalog::Product;
use trustflow_core::Money;
use trustflow_risk::RiskAssessment;
use uuid::Uuid;

use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    pub seller_id: Uuid,
    pub title: String,
    pub description: String,
    pub price: Money,
}

/// Classifier result on the external wire contract.
#[derive(Debug, Serialize)]
pub struct AssessmentResponse {
    pub trust_score: f64,
    pub risk_level: String,
    pub red_flags: Vec<String>,
    pub reasoning: String,
    pub recommended_escrow: bool,
}

impl From<RiskAssessment> for AssessmentResponse {
    fn from(a: RiskAssessment) -> Self {
        Self {
            trust_score: a.score,
            risk_level: a.tier.as_str().to_string(),
            red_flags: a.flags,
            reasoning: a.reasoning,
            recommended_escrow: a.escrow_recommended,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct PublishRequest {
    pub seller_id: Uuid,
    pub title: String,
    pub description: String,
    pub price: Money,
}

#[derive(Debug, Serialize)]
pub struct ProductResponse {
    pub id: Uuid,
    pub seller_id: Uuid,
    pub title: String,
    pub description: String,
    pub price: Money,
    pub status: String,
    pub assessment: Option<AssessmentResponse>,
}

impl From<Product> for ProductResponse {
    fn from(p: Product) -> Self {
        Self {
            id: p.id,
            seller_id: p.seller_id,
            title: p.title,
            description: p.description,
            price: p.price,
            status: match p.status {
                trustflow_catalog::ProductStatus::Active => "ACTIVE".to_string(),
                trustflow_catalog::ProductStatus::Withdrawn => "WITHDRAWN".to_string(),
            },
            assessment: p.current_assessment.map(Into::into),
        }
    }
}

/// POST /analyze - run the classifier without publishing.
pub async fn analyze(
    State(state): State<AppState>,
    Json(body): Json<AnalyzeRequest>,
) -> Result<Json<AssessmentResponse>, AppError> {
    let assessment = state
        .listings
        .analyze_listing(body.seller_id, body.title, body.description, body.price)
        .await?;
    Ok(Json(assessment.into()))
}

/// POST /products - publish a listing with its assessment attached.
pub async fn publish(
    State(state): State<AppState>,
    Json(body): Json<PublishRequest>,
) -> Result<Json<ProductResponse>, AppError> {
    let product = state
        .listings
        .publish_listing(body.seller_id, body.title, body.description, body.price)
        .await?;
    Ok(Json(product.into()))
}

/// GET /products - active listings only.
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<ProductResponse>>, AppError> {
    let products = state.listings.list_active_products().await?;
    Ok(Json(products.into_iter().map(Into::into).collect()))
}

/// GET /products/{id}
pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ProductResponse>, AppError> {
    let product = state.listings.get_product(id).await?;
    Ok(Json(product.into()))
}

#[derive(Debug, Deserialize)]
pub struct WithdrawRequest {
    pub seller_id: Uuid,
}

/// POST /products/{id}/withdraw - blocks new purchases only.
pub async fn withdraw(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<WithdrawRequest>,
) -> Result<Json<ProductResponse>, AppError> {
    let product = state.listings.withdraw_product(id, body.seller_id).await?;
    Ok(Json(product.into()))
}

/// POST /products/{id}/reassess - re-run analysis, latest assessment wins.
pub async fn reassess(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ProductResponse>, AppError> {
    let product = state.listings.reassess_product(id).await?;
    Ok(Json(product.into()))
}
