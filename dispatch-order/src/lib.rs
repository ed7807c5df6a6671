pub mod orchestrator;

pub use orchestrator::{CreatedOrder, MemoryOrderStore, MockShipmentAdapter, OrderOrchestrator};
