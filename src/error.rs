// src/error.rs
//! Unified error type for the RIO hardware abstraction core

use std::time::Duration;

use crate::hal::BusError;
use crate::platform::PlatformKind;
use crate::terminals::TerminalKind;

/// Convenience alias used across the crate
pub type Result<T> = std::result::Result<T, RioError>;

/// Errors reported by resolution, terminal access and DMA streaming.
///
/// A bounded read that expires is deliberately *not* represented here: the
/// partial whole-block count is returned to the caller and the status surface
/// reports it as a warning (see [`crate::status`]).
#[derive(Debug, thiserror::Error)]
pub enum RioError {
    /// A named resource is absent from the bitfile catalog, or a channel
    /// index is outside the discovered range for its terminal group.
    #[error("resource '{0}' not found in the bitfile catalog")]
    ResourceNotFound(String),

    /// The platform register holds a value outside the closed platform set.
    #[error("platform code {0} does not match any supported platform")]
    UnsupportedPlatform(u8),

    /// The device-profile register holds a value that is not legal for the
    /// resolved platform, even if the code exists for another platform.
    #[error("device profile code {code} is not supported on platform {platform}")]
    UnsupportedDevProfile { code: u8, platform: PlatformKind },

    /// The bitfile declares a VI version different from the one the session
    /// was configured to expect.
    #[error("VI version mismatch: bitfile declares {found}, session expects {expected}")]
    VersionMismatch { expected: String, found: String },

    /// The resolved profile does not expose the requested terminal group.
    #[error("terminal group {0} is not implemented by the resolved profile")]
    TerminalNotImplemented(TerminalKind),

    /// The platform-specific health terminal reports the hardware modules
    /// are not ready. Surfaced only from startup paths.
    #[error("hardware modules are not ready")]
    ModulesNotReady,

    /// InitDone did not assert within the configured startup window.
    #[error("FPGA initialization did not complete within {0:?}")]
    InitializationTimeout(Duration),

    /// A DMA channel declares a frame-type code outside the closed set.
    #[error("DMA channel {channel} declares unsupported frame type {value}")]
    UnsupportedFrameType { channel: usize, value: u8 },

    /// Enabling the channel would push the sum of enabled block sizes past
    /// the platform's aggregate budget.
    #[error(
        "enabling DMA channel {channel} would exceed the aggregate block \
         budget ({requested} > {limit} words)"
    )]
    DmaBudgetExceeded {
        channel: usize,
        requested: usize,
        limit: usize,
    },

    /// A streaming operation was issued before `setup` armed the DMA
    /// engine, or after teardown.
    #[error("DMA engine is not set up; call setup() before streaming operations")]
    DmaNotArmed,

    /// A FIFO drain did not converge within the configured pass cap,
    /// typically because the producer side is still enabled.
    #[error("DMA channel {channel} drain did not converge after {passes} passes")]
    DrainStalled { channel: usize, passes: usize },

    /// The vendor driver reported a failure on a register or FIFO operation.
    #[error(transparent)]
    Driver(#[from] BusError),
}

impl RioError {
    /// Resource-not-found for an indexed terminal, e.g. `AI3`.
    pub(crate) fn missing_indexed(prefix: &str, n: usize) -> Self {
        RioError::ResourceNotFound(format!("{prefix}{n}"))
    }
}
