use std::sync::Arc;

use dispatch_core::error::OrderError;
use dispatch_core::models::{OrderRequest, PersistedOrder, ShipmentOutcome};
use dispatch_core::repository::OrderStore;
use dispatch_core::shipment::ShipmentAdapter;

/// Aggregate returned to the presentation layer after a successful creation.
#[derive(Debug, Clone)]
pub struct CreatedOrder {
    pub order: PersistedOrder,
    pub shipment: ShipmentOutcome,
}

/// Owns the end-to-end order creation workflow: uniqueness check, shipment
/// registration, transactional persistence of the order and its line items.
pub struct OrderOrchestrator {
    store: Arc<dyn OrderStore>,
    shipments: Arc<dyn ShipmentAdapter>,
}

impl OrderOrchestrator {
    pub fn new(store: Arc<dyn OrderStore>, shipments: Arc<dyn ShipmentAdapter>) -> Self {
        Self { store, shipments }
    }

    /// Create an order inside one transaction. The shipment registration is
    /// an external side effect that a rollback cannot undo, so it sits
    /// outside the rollback boundary: its outcome is recorded either way,
    /// and a failed registration leaves the order "pending" rather than
    /// aborting. Any store failure rolls back everything and re-raises with
    /// its classification intact.
    pub async fn create_order(&self, request: OrderRequest) -> Result<CreatedOrder, OrderError> {
        let mut txn = self.store.begin().await?;

        if txn.order_exists(&request.order_id).await? {
            // Dropping the transaction rolls it back; no remote call made.
            return Err(OrderError::Duplicate(request.order_id.clone()));
        }

        tracing::info!(order_id = %request.order_id, "registering shipment for order");
        let shipment = self.shipments.create_shipment(&request).await;
        if !shipment.success {
            tracing::warn!(
                order_id = %request.order_id,
                "shipment registration failed, persisting order as pending"
            );
        }

        let order = txn.insert_order(&request, &shipment).await?;
        for item in &request.order_items {
            txn.insert_line_item(&request.order_id, item).await?;
        }

        txn.commit().await?;
        tracing::info!(
            order_id = %request.order_id,
            shipment_status = %order.shipment_status,
            "order created"
        );

        Ok(CreatedOrder { order, shipment })
    }
}

// ============================================================================
// In-memory implementations, used by tests and local development
// ============================================================================

use async_trait::async_trait;
use chrono::Utc;
use dispatch_core::models::OrderLineItem;
use dispatch_core::repository::OrderTxn;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// Shipment adapter returning a canned outcome and counting invocations.
pub struct MockShipmentAdapter {
    outcome: ShipmentOutcome,
    calls: AtomicUsize,
}

impl MockShipmentAdapter {
    pub fn new(outcome: ShipmentOutcome) -> Self {
        Self {
            outcome,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ShipmentAdapter for MockShipmentAdapter {
    async fn create_shipment(&self, _order: &OrderRequest) -> ShipmentOutcome {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.outcome.clone()
    }
}

/// Transactional in-memory order store. Writes are staged on the
/// transaction and only become visible on commit; a dropped transaction
/// discards them, matching the rollback semantics of the real store.
#[derive(Default)]
pub struct MemoryOrderStore {
    orders: Arc<Mutex<HashMap<String, PersistedOrder>>>,
    inserts: Arc<AtomicUsize>,
    /// When set, the line-item insert with this 0-based index fails.
    fail_line_item_at: Option<usize>,
}

impl MemoryOrderStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_at_line_item(index: usize) -> Self {
        Self {
            fail_line_item_at: Some(index),
            ..Self::default()
        }
    }

    /// Total insert statements executed, committed or not.
    pub fn insert_count(&self) -> usize {
        self.inserts.load(Ordering::SeqCst)
    }
}

pub struct MemoryOrderTxn {
    orders: Arc<Mutex<HashMap<String, PersistedOrder>>>,
    inserts: Arc<AtomicUsize>,
    fail_line_item_at: Option<usize>,
    staged_order: Option<PersistedOrder>,
    staged_items: Vec<OrderLineItem>,
}

#[async_trait]
impl OrderTxn for MemoryOrderTxn {
    async fn order_exists(&mut self, order_id: &str) -> Result<bool, OrderError> {
        let orders = self
            .orders
            .lock()
            .map_err(|e| OrderError::Store(e.to_string()))?;
        Ok(orders.contains_key(order_id))
    }

    async fn insert_order(
        &mut self,
        order: &OrderRequest,
        shipment: &ShipmentOutcome,
    ) -> Result<PersistedOrder, OrderError> {
        self.inserts.fetch_add(1, Ordering::SeqCst);
        let now = Utc::now();
        let persisted = PersistedOrder {
            request: order.clone(),
            shipment_id: shipment.shipment_id(),
            shipment_status: shipment.shipment_status(),
            shipment_api_response: serde_json::to_value(shipment)
                .map_err(|e| OrderError::Store(e.to_string()))?,
            created_at: now,
            updated_at: now,
        };
        self.staged_order = Some(persisted.clone());
        Ok(persisted)
    }

    async fn insert_line_item(
        &mut self,
        _order_id: &str,
        item: &OrderLineItem,
    ) -> Result<(), OrderError> {
        if self.fail_line_item_at == Some(self.staged_items.len()) {
            return Err(OrderError::Store(
                "simulated line item insert failure".to_string(),
            ));
        }
        self.inserts.fetch_add(1, Ordering::SeqCst);
        self.staged_items.push(item.clone());
        Ok(())
    }

    async fn commit(self: Box<Self>) -> Result<(), OrderError> {
        if let Some(mut order) = self.staged_order {
            order.request.order_items = self.staged_items;
            let mut orders = self
                .orders
                .lock()
                .map_err(|e| OrderError::Store(e.to_string()))?;
            orders.insert(order.request.order_id.clone(), order);
        }
        Ok(())
    }
}

#[async_trait]
impl OrderStore for MemoryOrderStore {
    async fn begin(&self) -> Result<Box<dyn OrderTxn>, OrderError> {
        Ok(Box::new(MemoryOrderTxn {
            orders: Arc::clone(&self.orders),
            inserts: Arc::clone(&self.inserts),
            fail_line_item_at: self.fail_line_item_at,
            staged_order: None,
            staged_items: Vec::new(),
        }))
    }

    async fn find_order(&self, order_id: &str) -> Result<Option<PersistedOrder>, OrderError> {
        let orders = self
            .orders
            .lock()
            .map_err(|e| OrderError::Store(e.to_string()))?;
        Ok(orders.get(order_id).cloned())
    }

    async fn list_orders(
        &self,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<PersistedOrder>, OrderError> {
        let orders = self
            .orders
            .lock()
            .map_err(|e| OrderError::Store(e.to_string()))?;
        let mut all: Vec<PersistedOrder> = orders.values().cloned().collect();
        all.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(all
            .into_iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .collect())
    }
}
