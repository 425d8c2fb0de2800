use thiserror::Error;

/// Errors surfaced by the protocol codec, the metadata loader and the
/// per-partition log I/O layer.
#[derive(Debug, Error)]
pub enum BrokerError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed protocol data: {reason}")]
    Malformed { reason: String },
}

impl BrokerError {
    pub fn malformed(reason: impl Into<String>) -> Self {
        Self::Malformed {
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, BrokerError>;
