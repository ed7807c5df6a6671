use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::{PgPool, Postgres, Row, Transaction};

use dispatch_core::error::OrderError;
use dispatch_core::models::{
    Dimensions, OrderLineItem, OrderRequest, PersistedOrder, ShipmentOutcome,
};
use dispatch_core::repository::{OrderStore, OrderTxn};

pub struct PgOrderStore {
    pool: PgPool,
}

impl PgOrderStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

// Internal structs for type-safe querying
#[derive(sqlx::FromRow)]
struct OrderRow {
    order_id: String,
    order_created_time: DateTime<Utc>,
    pickup_location: Option<String>,
    customer_name: String,
    customer_address_line1: String,
    customer_address_line2: Option<String>,
    customer_pincode: String,
    customer_city: String,
    customer_state: String,
    customer_country: String,
    customer_phone: String,
    customer_email: String,
    invoice_value: f64,
    dimensions: Value,
    marketplace: Option<String>,
    order_type: String,
    cod_amount: Option<f64>,
    gst_total_tax: Option<f64>,
    tax_percentage: Option<f64>,
    invoice_number: Option<String>,
    order_note: Option<String>,
    order_mode: Option<String>,
    shipment_api_response: Option<Value>,
    shipment_id: Option<String>,
    shipment_status: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow)]
struct OrderItemRow {
    sku: String,
    sku_mrp: f64,
    quantity: i32,
    sku_name: String,
    brand_name: Option<String>,
    product_image: Option<String>,
}

const ORDER_COLUMNS: &str = "order_id, order_created_time, pickup_location, customer_name, \
     customer_address_line1, customer_address_line2, customer_pincode, customer_city, \
     customer_state, customer_country, customer_phone, customer_email, invoice_value, \
     dimensions, marketplace, order_type, cod_amount, gst_total_tax, tax_percentage, \
     invoice_number, order_note, order_mode, shipment_api_response, shipment_id, \
     shipment_status, created_at, updated_at";

fn map_db_err(order_id: &str, err: sqlx::Error) -> OrderError {
    if let sqlx::Error::Database(ref db) = err {
        // A concurrent creator can slip past the in-transaction check and
        // hit the UNIQUE constraint instead.
        if db.is_unique_violation() {
            return OrderError::Duplicate(order_id.to_string());
        }
    }
    OrderError::Store(err.to_string())
}

fn row_to_order(row: OrderRow, items: Vec<OrderItemRow>) -> Result<PersistedOrder, OrderError> {
    let dimensions: Dimensions =
        serde_json::from_value(row.dimensions).map_err(|e| OrderError::Store(e.to_string()))?;

    let order_items = items
        .into_iter()
        .map(|item| OrderLineItem {
            sku: item.sku,
            sku_mrp: item.sku_mrp,
            quantity: item.quantity,
            sku_name: item.sku_name,
            brand_name: item.brand_name,
            product_image: item.product_image,
        })
        .collect();

    Ok(PersistedOrder {
        request: OrderRequest {
            order_id: row.order_id,
            order_created_time: row.order_created_time,
            pickup_location: row.pickup_location,
            customer_name: row.customer_name,
            customer_address_line1: row.customer_address_line1,
            customer_address_line2: row.customer_address_line2,
            customer_pincode: row.customer_pincode,
            customer_city: row.customer_city,
            customer_state: row.customer_state,
            customer_country: row.customer_country,
            customer_phone: row.customer_phone,
            customer_email: row.customer_email,
            order_items,
            invoice_value: row.invoice_value,
            dimensions,
            order_type: row.order_type,
            marketplace: row.marketplace,
            cod_amount: row.cod_amount,
            gst_total_tax: row.gst_total_tax,
            tax_percentage: row.tax_percentage,
            invoice_number: row.invoice_number,
            order_note: row.order_note,
            order_mode: row.order_mode,
        },
        shipment_id: row.shipment_id,
        shipment_status: row.shipment_status.unwrap_or_else(|| "pending".to_string()),
        shipment_api_response: row.shipment_api_response.unwrap_or(Value::Null),
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}

pub struct PgOrderTxn {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl OrderTxn for PgOrderTxn {
    async fn order_exists(&mut self, order_id: &str) -> Result<bool, OrderError> {
        let row = sqlx::query("SELECT order_id FROM shipment_orders WHERE order_id = $1")
            .bind(order_id)
            .fetch_optional(&mut *self.tx)
            .await
            .map_err(|e| OrderError::Store(e.to_string()))?;

        Ok(row.is_some())
    }

    async fn insert_order(
        &mut self,
        order: &OrderRequest,
        shipment: &ShipmentOutcome,
    ) -> Result<PersistedOrder, OrderError> {
        let dimensions = serde_json::to_value(&order.dimensions)
            .map_err(|e| OrderError::Store(e.to_string()))?;
        let shipment_json =
            serde_json::to_value(shipment).map_err(|e| OrderError::Store(e.to_string()))?;
        let shipment_id = shipment.shipment_id();
        let shipment_status = shipment.shipment_status();

        let row = sqlx::query(
            r#"
            INSERT INTO shipment_orders (
                order_id, order_created_time, pickup_location, customer_name,
                customer_address_line1, customer_address_line2, customer_pincode,
                customer_city, customer_state, customer_country, customer_phone,
                customer_email, invoice_value, dimensions, marketplace, order_type,
                cod_amount, gst_total_tax, tax_percentage, invoice_number,
                order_note, order_mode, shipment_api_response, shipment_id,
                shipment_status
            ) VALUES (
                $1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14,
                $15, $16, $17, $18, $19, $20, $21, $22, $23, $24, $25
            ) RETURNING created_at, updated_at
            "#,
        )
        .bind(&order.order_id)
        .bind(order.order_created_time)
        .bind(&order.pickup_location)
        .bind(&order.customer_name)
        .bind(&order.customer_address_line1)
        .bind(&order.customer_address_line2)
        .bind(&order.customer_pincode)
        .bind(&order.customer_city)
        .bind(&order.customer_state)
        .bind(&order.customer_country)
        .bind(&order.customer_phone)
        .bind(&order.customer_email)
        .bind(order.invoice_value)
        .bind(&dimensions)
        .bind(&order.marketplace)
        .bind(&order.order_type)
        .bind(order.cod_amount)
        .bind(order.gst_total_tax)
        .bind(order.tax_percentage)
        .bind(&order.invoice_number)
        .bind(&order.order_note)
        .bind(&order.order_mode)
        .bind(&shipment_json)
        .bind(&shipment_id)
        .bind(&shipment_status)
        .fetch_one(&mut *self.tx)
        .await
        .map_err(|e| map_db_err(&order.order_id, e))?;

        let created_at: DateTime<Utc> = row
            .try_get("created_at")
            .map_err(|e| OrderError::Store(e.to_string()))?;
        let updated_at: DateTime<Utc> = row
            .try_get("updated_at")
            .map_err(|e| OrderError::Store(e.to_string()))?;

        Ok(PersistedOrder {
            request: order.clone(),
            shipment_id,
            shipment_status,
            shipment_api_response: shipment_json,
            created_at,
            updated_at,
        })
    }

    async fn insert_line_item(
        &mut self,
        order_id: &str,
        item: &OrderLineItem,
    ) -> Result<(), OrderError> {
        sqlx::query(
            r#"
            INSERT INTO order_items (
                order_id, sku, sku_mrp, quantity, sku_name, brand_name, product_image
            ) VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(order_id)
        .bind(&item.sku)
        .bind(item.sku_mrp)
        .bind(item.quantity)
        .bind(&item.sku_name)
        .bind(item.brand_name.clone().unwrap_or_default())
        .bind(item.product_image.clone().unwrap_or_default())
        .execute(&mut *self.tx)
        .await
        .map_err(|e| OrderError::Store(e.to_string()))?;

        Ok(())
    }

    async fn commit(self: Box<Self>) -> Result<(), OrderError> {
        self.tx
            .commit()
            .await
            .map_err(|e| OrderError::Store(e.to_string()))
    }
}

#[async_trait]
impl OrderStore for PgOrderStore {
    async fn begin(&self) -> Result<Box<dyn OrderTxn>, OrderError> {
        let tx = self
            .pool
            .begin()
            .await
            .map_err(|e| OrderError::Store(e.to_string()))?;
        Ok(Box::new(PgOrderTxn { tx }))
    }

    async fn find_order(&self, order_id: &str) -> Result<Option<PersistedOrder>, OrderError> {
        let query = format!("SELECT {ORDER_COLUMNS} FROM shipment_orders WHERE order_id = $1");
        let row = sqlx::query_as::<_, OrderRow>(&query)
            .bind(order_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| OrderError::Store(e.to_string()))?;

        let Some(row) = row else {
            return Ok(None);
        };

        let items = self.fetch_items(order_id).await?;
        row_to_order(row, items).map(Some)
    }

    async fn list_orders(
        &self,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<PersistedOrder>, OrderError> {
        let query = format!(
            "SELECT {ORDER_COLUMNS} FROM shipment_orders \
             ORDER BY created_at DESC LIMIT $1 OFFSET $2"
        );
        let rows = sqlx::query_as::<_, OrderRow>(&query)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| OrderError::Store(e.to_string()))?;

        let mut orders = Vec::with_capacity(rows.len());
        for row in rows {
            let items = self.fetch_items(&row.order_id).await?;
            orders.push(row_to_order(row, items)?);
        }

        Ok(orders)
    }
}

impl PgOrderStore {
    async fn fetch_items(&self, order_id: &str) -> Result<Vec<OrderItemRow>, OrderError> {
        sqlx::query_as::<_, OrderItemRow>(
            "SELECT sku, sku_mrp, quantity, sku_name, brand_name, product_image \
             FROM order_items WHERE order_id = $1 ORDER BY id",
        )
        .bind(order_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| OrderError::Store(e.to_string()))
    }
}
