use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use trustflow_core::EngineError;

#[derive(Debug)]
pub enum AppError {
    Engine(EngineError),
    Internal(anyhow::Error),
}

impl From<EngineError> for AppError {
    fn from(err: EngineError) -> Self {
        Self::Engine(err)
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::Engine(err) => {
                let status = match &err {
                    EngineError::Validation(_) => StatusCode::BAD_REQUEST,
                    EngineError::NotFound { .. } => StatusCode::NOT_FOUND,
                    EngineError::ProductWithdrawn(_)
                    | EngineError::AssessmentRequired(_)
                    | EngineError::NoCarrierAvailable
                    | EngineError::CarrierNotInPool(_)
                    | EngineError::Precondition(_)
                    | EngineError::InvalidTransition { .. }
                    | EngineError::Conflict { .. } => StatusCode::CONFLICT,
                };
                (status, err.to_string())
            }
            AppError::Internal(err) => {
                tracing::error!("Internal Server Error: {}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal Server Error".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}
