use thiserror::Error;

/// Failure from a single carrier API call.
#[derive(Debug, Error)]
pub enum CarrierError {
    /// No HTTP response was received (connection reset, timeout, DNS).
    #[error("Carrier unreachable: {0}")]
    Transport(String),

    /// The carrier answered with a non-success status.
    #[error("Carrier returned status {status}")]
    Status {
        status: u16,
        body: Option<serde_json::Value>,
    },
}

impl CarrierError {
    pub fn status(&self) -> Option<u16> {
        match self {
            CarrierError::Transport(_) => None,
            CarrierError::Status { status, .. } => Some(*status),
        }
    }

    /// Raw remote payload, when the carrier sent one back.
    pub fn into_body(self) -> Option<serde_json::Value> {
        match self {
            CarrierError::Transport(_) => None,
            CarrierError::Status { body, .. } => body,
        }
    }
}

impl From<reqwest::Error> for CarrierError {
    fn from(err: reqwest::Error) -> Self {
        CarrierError::Transport(err.to_string())
    }
}
