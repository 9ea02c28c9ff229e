// src/hal/types.rs
//! Shared types for the hardware access layer

/// Result alias for raw bus operations
pub type BusResult<T> = std::result::Result<T, BusError>;

/// Failures reported by the vendor driver collaborator.
///
/// `Timeout` is kept separate from `Device` because the DMA engine turns a
/// FIFO timeout into a partial whole-block read rather than an error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BusError {
    /// A bounded FIFO read expired before the requested element count was
    /// available.
    #[error("FIFO read timed out before the requested elements were available")]
    Timeout,

    /// The driver reported a hard failure on a register or FIFO operation.
    #[error("driver fault {code}: {message}")]
    Device { code: i32, message: String },
}

impl BusError {
    /// Driver fault at a specific address, used by bus implementations.
    pub fn fault(code: i32, message: impl Into<String>) -> Self {
        BusError::Device {
            code,
            message: message.into(),
        }
    }
}
