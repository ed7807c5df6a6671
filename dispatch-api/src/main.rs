use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use dispatch_api::{app, AppState};
use dispatch_carrier::{CarrierClient, CarrierConfig, RetryPolicy, ShipmentGateway};
use dispatch_core::repository::OrderStore;
use dispatch_order::OrderOrchestrator;
use dispatch_store::{Config, DbClient, PgOrderStore};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "dispatch_api=debug,tower_http=debug,axum::rejection=trace".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load().expect("Failed to load config");
    tracing::info!("Starting Dispatch API on port {}", config.server.port);

    let db = DbClient::new(&config.database.url)
        .await
        .expect("Failed to connect to database");
    db.migrate().await.expect("Failed to run migrations");

    let carrier_client = CarrierClient::new(&CarrierConfig {
        base_url: config.carrier.base_url.clone(),
        token: config.carrier.token.clone(),
        timeout_ms: config.carrier.timeout_ms,
    })
    .expect("Failed to build carrier client");
    let retry = RetryPolicy::new(
        config.retry.max_retries,
        Duration::from_millis(config.retry.initial_delay_ms),
    );
    let gateway = Arc::new(ShipmentGateway::new(carrier_client, retry));

    let store: Arc<dyn OrderStore> = Arc::new(PgOrderStore::new(db.pool.clone()));
    let orchestrator = Arc::new(OrderOrchestrator::new(store.clone(), gateway));

    let state = AppState {
        store,
        orchestrator,
    };
    let app = app(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}
