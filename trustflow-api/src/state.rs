use std::sync::Arc;

use trustflow_catalog::ListingService;
use trustflow_order::{CarrierDirectory, OrderWorkflow};

#[derive(Clone)]
pub struct AppState {
    pub listings: Arc<ListingService>,
    pub workflow: Arc<OrderWorkflow>,
    pub carriers: Arc<dyn CarrierDirectory>,
}
