use async_trait::async_trait;

use crate::error::OrderError;
use crate::models::{OrderLineItem, OrderRequest, PersistedOrder, ShipmentOutcome};

/// One open transaction against the order store. Dropping a transaction
/// without calling `commit` rolls back everything staged on it.
#[async_trait]
pub trait OrderTxn: Send {
    /// Uniqueness check against already-persisted orders.
    async fn order_exists(&mut self, order_id: &str) -> Result<bool, OrderError>;

    /// Insert the order header, embedding the shipment outcome for audit.
    async fn insert_order(
        &mut self,
        order: &OrderRequest,
        shipment: &ShipmentOutcome,
    ) -> Result<PersistedOrder, OrderError>;

    /// Insert a single line item belonging to the order header.
    async fn insert_line_item(
        &mut self,
        order_id: &str,
        item: &OrderLineItem,
    ) -> Result<(), OrderError>;

    async fn commit(self: Box<Self>) -> Result<(), OrderError>;
}

/// Repository trait for order data access
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Acquire a transactional context from the pool.
    async fn begin(&self) -> Result<Box<dyn OrderTxn>, OrderError>;

    /// Fetch one order with its line items.
    async fn find_order(&self, order_id: &str) -> Result<Option<PersistedOrder>, OrderError>;

    /// List orders newest-first, with their line items.
    async fn list_orders(
        &self,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<PersistedOrder>, OrderError>;
}
