use thiserror::Error;

/// Failures surfaced by the order-creation workflow.
#[derive(Debug, Error)]
pub enum OrderError {
    #[error("Order with ID {0} already exists")]
    Duplicate(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Order store error: {0}")]
    Store(String),
}

impl OrderError {
    /// True when the failure maps to a client conflict rather than a server fault.
    pub fn is_conflict(&self) -> bool {
        matches!(self, OrderError::Duplicate(_))
    }
}
