use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;

use dispatch_core::models::{OrderRequest, ShipmentError, ShipmentOutcome, ShipmentRecord};
use dispatch_core::shipment::ShipmentAdapter;

use crate::client::CarrierClient;
use crate::retry::RetryPolicy;

const CREATE_ORDER_ENDPOINT: &str = "/orders/create/adhoc";

/// Registers shipments with the carrier: transforms the generic order into
/// the carrier's wire format, invokes the API under the retry policy and
/// normalizes the result. Never returns an error; callers branch on the
/// outcome value.
pub struct ShipmentGateway {
    client: CarrierClient,
    retry: RetryPolicy,
}

#[derive(Debug, Serialize)]
struct CarrierOrderItem {
    name: String,
    sku: String,
    units: i32,
    selling_price: String,
    discount: String,
    tax: String,
    hsn: String,
}

#[derive(Debug, Serialize)]
struct CarrierOrderPayload {
    order_id: String,
    order_date: chrono::DateTime<chrono::Utc>,
    pickup_location: Option<String>,
    billing_customer_name: String,
    billing_last_name: String,
    billing_address: String,
    billing_address_2: String,
    billing_city: String,
    billing_pincode: String,
    billing_state: String,
    billing_country: String,
    billing_email: String,
    billing_phone: String,
    shipping_is_billing: bool,
    order_items: Vec<CarrierOrderItem>,
    payment_method: String,
    sub_total: f64,
    length: f64,
    breadth: f64,
    height: f64,
    weight: f64,
}

/// Split a full name into the carrier's first/last fields. A single token
/// gets "." as last name; an empty name falls back to fixed placeholders.
fn split_name(full_name: &str) -> (String, String) {
    let mut parts = full_name.split_whitespace();
    match parts.next() {
        None => ("Customer".to_string(), "Name".to_string()),
        Some(first) => {
            let rest: Vec<&str> = parts.collect();
            if rest.is_empty() {
                (first.to_string(), ".".to_string())
            } else {
                (first.to_string(), rest.join(" "))
            }
        }
    }
}

fn build_payload(order: &OrderRequest) -> CarrierOrderPayload {
    let (first_name, last_name) = split_name(&order.customer_name);

    if !order.dimensions.is_valid() {
        // Validation upstream should have rejected this; pass the values
        // through and let the carrier respond.
        tracing::warn!(
            order_id = %order.order_id,
            "building carrier payload with non-positive dimensions"
        );
    }

    let payment_method = if order.order_type == "COD" {
        "COD"
    } else {
        "Prepaid"
    };

    CarrierOrderPayload {
        order_id: order.order_id.clone(),
        order_date: order.order_created_time,
        pickup_location: order.pickup_location.clone(),
        billing_customer_name: first_name,
        billing_last_name: last_name,
        billing_address: order.customer_address_line1.clone(),
        billing_address_2: order.customer_address_line2.clone().unwrap_or_default(),
        billing_city: order.customer_city.clone(),
        billing_pincode: order.customer_pincode.clone(),
        billing_state: order.customer_state.clone(),
        billing_country: order.customer_country.clone(),
        billing_email: order.customer_email.clone(),
        billing_phone: order.customer_phone.clone(),
        shipping_is_billing: true,
        order_items: order
            .order_items
            .iter()
            .map(|item| CarrierOrderItem {
                name: item.sku_name.clone(),
                sku: item.sku.clone(),
                units: item.quantity,
                selling_price: item.sku_mrp.to_string(),
                discount: String::new(),
                tax: String::new(),
                hsn: String::new(),
            })
            .collect(),
        payment_method: payment_method.to_string(),
        sub_total: order.invoice_value,
        length: order.dimensions.length,
        breadth: order.dimensions.breadth,
        height: order.dimensions.height,
        weight: order.dimensions.weight,
    }
}

/// Identifier fields may come back as strings or numbers.
fn id_field(raw: &Value, key: &str) -> Option<String> {
    match raw.get(key)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

impl ShipmentGateway {
    pub fn new(client: CarrierClient, retry: RetryPolicy) -> Self {
        Self { client, retry }
    }
}

#[async_trait]
impl ShipmentAdapter for ShipmentGateway {
    async fn create_shipment(&self, order: &OrderRequest) -> ShipmentOutcome {
        let payload = build_payload(order);
        let label = format!("Create Shipment API (Order: {})", order.order_id);

        let result = self
            .retry
            .execute_with_retry(
                || self.client.post_json(CREATE_ORDER_ENDPOINT, &payload),
                &label,
            )
            .await;

        match result {
            Ok(raw) => {
                let shipment_id =
                    id_field(&raw, "shipment_id").or_else(|| id_field(&raw, "order_id"));
                let status = raw
                    .get("status")
                    .and_then(Value::as_str)
                    .unwrap_or("created")
                    .to_string();

                ShipmentOutcome::succeeded(ShipmentRecord {
                    shipment_id,
                    status,
                    raw,
                })
            }
            Err(err) => {
                tracing::error!(
                    order_id = %order.order_id,
                    error = %err,
                    "shipment registration failed"
                );
                let message = err.to_string();
                let status = err.status();
                ShipmentOutcome::failed(ShipmentError {
                    message,
                    status,
                    data: err.into_body(),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use dispatch_core::models::{Dimensions, OrderLineItem};
    use serde_json::json;

    fn sample_order(order_type: &str) -> OrderRequest {
        OrderRequest {
            order_id: "ORD-1001".to_string(),
            order_created_time: Utc::now(),
            pickup_location: Some("Primary".to_string()),
            customer_name: "Jane Doe".to_string(),
            customer_address_line1: "221B Baker Street".to_string(),
            customer_address_line2: None,
            customer_pincode: "560001".to_string(),
            customer_city: "Bengaluru".to_string(),
            customer_state: "Karnataka".to_string(),
            customer_country: "India".to_string(),
            customer_phone: "9900112233".to_string(),
            customer_email: "jane@example.com".to_string(),
            order_items: vec![OrderLineItem {
                sku: "SKU-1".to_string(),
                sku_mrp: 499.0,
                quantity: 2,
                sku_name: "Notebook".to_string(),
                brand_name: None,
                product_image: None,
            }],
            invoice_value: 998.0,
            dimensions: Dimensions {
                height: 10.0,
                length: 20.0,
                breadth: 15.0,
                weight: 0.8,
            },
            order_type: order_type.to_string(),
            marketplace: None,
            cod_amount: None,
            gst_total_tax: None,
            tax_percentage: None,
            invoice_number: None,
            order_note: None,
            order_mode: None,
        }
    }

    #[test]
    fn splits_two_part_names() {
        assert_eq!(
            split_name("Jane Doe"),
            ("Jane".to_string(), "Doe".to_string())
        );
        assert_eq!(
            split_name("Jane Anne Doe"),
            ("Jane".to_string(), "Anne Doe".to_string())
        );
    }

    #[test]
    fn single_token_name_gets_placeholder_last_name() {
        assert_eq!(
            split_name("Madonna"),
            ("Madonna".to_string(), ".".to_string())
        );
    }

    #[test]
    fn empty_name_falls_back_to_placeholders() {
        assert_eq!(split_name(""), ("Customer".to_string(), "Name".to_string()));
        assert_eq!(
            split_name("   "),
            ("Customer".to_string(), "Name".to_string())
        );
    }

    #[test]
    fn cod_order_maps_to_cod_payment_method() {
        let payload = build_payload(&sample_order("COD"));
        assert_eq!(payload.payment_method, "COD");
    }

    #[test]
    fn non_cod_order_maps_to_prepaid() {
        for order_type in ["Prepaid", "cod", "anything"] {
            let payload = build_payload(&sample_order(order_type));
            assert_eq!(payload.payment_method, "Prepaid");
        }
    }

    #[test]
    fn payload_matches_carrier_contract() {
        let payload = build_payload(&sample_order("Prepaid"));
        assert_eq!(payload.billing_customer_name, "Jane");
        assert_eq!(payload.billing_last_name, "Doe");
        assert!(payload.shipping_is_billing);
        assert_eq!(payload.sub_total, 998.0);
        assert_eq!(payload.length, 20.0);

        let item = &payload.order_items[0];
        assert_eq!(item.name, "Notebook");
        assert_eq!(item.units, 2);
        assert_eq!(item.selling_price, "499");
        assert_eq!(item.discount, "");
        assert_eq!(item.tax, "");
        assert_eq!(item.hsn, "");
    }

    #[test]
    fn remote_identifier_falls_back_to_order_id() {
        let raw = json!({ "order_id": 7731, "status": "NEW" });
        assert_eq!(id_field(&raw, "shipment_id"), None);
        assert_eq!(id_field(&raw, "order_id").as_deref(), Some("7731"));
    }
}
