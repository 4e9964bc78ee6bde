pub mod error;
pub mod orders;
pub mod products;
pub mod sellers;
pub mod state;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub use state::AppState;

/// Stable request/response boundary over the decision engine. No UI or
/// session concepts live here; callers submit listing/order data and render
/// whatever comes back.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/analyze", post(products::analyze))
        .route("/products", post(products::publish).get(products::list))
        .route("/products/{id}", get(products::get))
        .route("/products/{id}/withdraw", post(products::withdraw))
        .route("/products/{id}/reassess", post(products::reassess))
        .route("/sellers", post(sellers::register))
        .route("/sellers/{id}", get(sellers::get))
        .route("/sellers/{id}/upgrade", post(sellers::upgrade))
        .route("/reviews", post(sellers::review))
        .route("/carriers", post(orders::register_carrier).get(orders::list_carriers))
        .route("/orders", post(orders::create))
        .route("/orders/{id}", get(orders::get))
        .route("/orders/{id}/ship", post(orders::ship))
        .route("/orders/{id}/confirm", post(orders::confirm))
        .route("/orders/{id}/dispute", post(orders::dispute))
        .route("/orders/{id}/resolve", post(orders::resolve))
        .route("/orders/{id}/cancel", post(orders::cancel))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
