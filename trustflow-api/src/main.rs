use std::net::SocketAddr;
use std::sync::Arc;

use trustflow_api::{app, AppState};
use trustflow_catalog::ListingService;
use trustflow_order::{FeeScheduler, FirstAvailablePolicy, OrderWorkflow};
use trustflow_risk::{HeuristicClassifier, RiskClassifierGateway, TrustScoreEvaluator};
use trustflow_store::MemoryStore;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "trustflow_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = trustflow_store::Config::load().expect("Failed to load config");
    tracing::info!("Starting TrustFlow engine API on port {}", config.server.port);

    let evaluator = TrustScoreEvaluator::new(config.engine.risk_thresholds)
        .expect("Invalid risk thresholds");
    let fees = FeeScheduler::new(config.engine.commission_rates)
        .expect("Invalid commission rates");

    let store = Arc::new(MemoryStore::new());
    // The default classifier is the local heuristic; an LLM-backed provider
    // plugs in behind the same trait.
    let gateway = Arc::new(RiskClassifierGateway::new(
        Arc::new(HeuristicClassifier),
        evaluator,
    ));

    let listings = Arc::new(ListingService::new(store.clone(), store.clone(), gateway));
    let workflow = Arc::new(OrderWorkflow::new(
        store.clone(),
        store.clone(),
        store.clone(),
        store.clone(),
        Arc::new(FirstAvailablePolicy),
        evaluator,
        fees,
        config.engine.auto_release_without_escrow,
    ));

    // Surface escrow transitions in the log until a push channel exists.
    let mut events = workflow.subscribe();
    tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            tracing::info!(
                order_id = %event.order_id,
                from = %event.from,
                to = %event.to,
                "Escrow event"
            );
        }
    });

    let app_state = AppState {
        listings,
        workflow,
        carriers: store,
    };

    let app = app(app_state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}
