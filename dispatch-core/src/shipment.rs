use async_trait::async_trait;

use crate::models::{OrderRequest, ShipmentOutcome};

/// Adapter for registering shipments with an external carrier.
#[async_trait]
pub trait ShipmentAdapter: Send + Sync {
    /// Register a shipment for the order. Infallible by contract: every
    /// failure mode is folded into the returned outcome so the caller can
    /// decide policy instead of catching errors for an expected result.
    async fn create_shipment(&self, order: &OrderRequest) -> ShipmentOutcome;
}
