pub mod error;
pub mod models;
pub mod repository;
pub mod shipment;

pub use error::OrderError;
pub use models::{
    Dimensions, OrderLineItem, OrderRequest, PersistedOrder, ShipmentError, ShipmentOutcome,
    ShipmentRecord,
};
pub use repository::{OrderStore, OrderTxn};
pub use shipment::ShipmentAdapter;

pub type CoreResult<T> = Result<T, OrderError>;
