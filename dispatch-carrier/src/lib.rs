pub mod client;
pub mod error;
pub mod gateway;
pub mod retry;

pub use client::{CarrierClient, CarrierConfig};
pub use error::CarrierError;
pub use gateway::ShipmentGateway;
pub use retry::RetryPolicy;
