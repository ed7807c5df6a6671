use std::sync::Arc;

use dispatch_core::repository::OrderStore;
use dispatch_order::OrderOrchestrator;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn OrderStore>,
    pub orchestrator: Arc<OrderOrchestrator>,
}
