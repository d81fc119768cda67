use thiserror::Error;

/// Errors of the simulated transport.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SimError {
    #[error("empty pnvm image")]
    EmptyImage,

    #[error("device rejected the pnvm re-apply")]
    ReapplyRejected,
}

/// Errors of the simulator itself.
#[derive(Error, Debug)]
pub enum Error {
    #[error("io error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("invalid sku id: {0}")]
    InvalidSkuId(String),

    #[error("invalid load strategy: {0}")]
    InvalidStrategy(String),
}
