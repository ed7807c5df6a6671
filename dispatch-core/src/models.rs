use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Package dimensions as supplied by the caller. All four fields are
/// required and must be positive for a shippable package.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dimensions {
    pub height: f64,
    pub length: f64,
    pub breadth: f64,
    pub weight: f64,
}

impl Dimensions {
    pub fn is_valid(&self) -> bool {
        self.height > 0.0 && self.length > 0.0 && self.breadth > 0.0 && self.weight > 0.0
    }
}

/// An individual SKU line within an order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderLineItem {
    pub sku: String,
    pub sku_mrp: f64,
    pub quantity: i32,
    pub sku_name: String,
    #[serde(default)]
    pub brand_name: Option<String>,
    #[serde(default)]
    pub product_image: Option<String>,
}

/// Caller-supplied order aggregate. The order_id is caller-assigned and
/// must be unique across all persisted orders.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderRequest {
    pub order_id: String,
    pub order_created_time: DateTime<Utc>,
    #[serde(default)]
    pub pickup_location: Option<String>,
    pub customer_name: String,
    pub customer_address_line1: String,
    #[serde(default)]
    pub customer_address_line2: Option<String>,
    pub customer_pincode: String,
    pub customer_city: String,
    pub customer_state: String,
    pub customer_country: String,
    pub customer_phone: String,
    pub customer_email: String,
    pub order_items: Vec<OrderLineItem>,
    pub invoice_value: f64,
    pub dimensions: Dimensions,
    pub order_type: String,
    #[serde(default)]
    pub marketplace: Option<String>,
    #[serde(default)]
    pub cod_amount: Option<f64>,
    #[serde(default)]
    pub gst_total_tax: Option<f64>,
    #[serde(default)]
    pub tax_percentage: Option<f64>,
    #[serde(default)]
    pub invoice_number: Option<String>,
    #[serde(default)]
    pub order_note: Option<String>,
    #[serde(default)]
    pub order_mode: Option<String>,
}

/// Normalized success payload extracted from a carrier response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShipmentRecord {
    pub shipment_id: Option<String>,
    pub status: String,
    /// Raw carrier response, kept verbatim for audit.
    pub raw: serde_json::Value,
}

/// Structured failure from a shipment-registration attempt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShipmentError {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

/// Result of exactly one shipment-registration attempt per order creation.
/// Never persisted on its own; serialized onto the order row for audit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShipmentOutcome {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<ShipmentRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ShipmentError>,
}

impl ShipmentOutcome {
    pub fn succeeded(record: ShipmentRecord) -> Self {
        Self {
            success: true,
            data: Some(record),
            error: None,
        }
    }

    pub fn failed(error: ShipmentError) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error),
        }
    }

    /// Remote identifier to store on the order, if registration succeeded.
    pub fn shipment_id(&self) -> Option<String> {
        self.data.as_ref().and_then(|d| d.shipment_id.clone())
    }

    /// Shipment status to store on the order. A failed registration leaves
    /// the order "pending" for manual reconciliation.
    pub fn shipment_status(&self) -> String {
        self.data
            .as_ref()
            .map(|d| d.status.clone())
            .unwrap_or_else(|| "pending".to_string())
    }
}

/// An order as committed to the store, with system-assigned fields.
/// Immutable once committed; there is no update path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersistedOrder {
    #[serde(flatten)]
    pub request: OrderRequest,
    pub shipment_id: Option<String>,
    pub shipment_status: String,
    pub shipment_api_response: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
