// src/platform.rs
//! Hardware platform resolution and per-platform capability limits

use serde::{Deserialize, Serialize};

use crate::catalog::ResourceCatalog;
use crate::error::{Result, RioError};
use crate::hal::FpgaBus;
use crate::terminals::names;

/// Closed set of supported hardware families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlatformKind {
    FlexRio,
    CRio,
    RSeries,
}

impl PlatformKind {
    /// Numeric code declared by the `Platform` terminal.
    pub const fn code(self) -> u8 {
        match self {
            PlatformKind::FlexRio => 0,
            PlatformKind::CRio => 1,
            PlatformKind::RSeries => 2,
        }
    }

    fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(PlatformKind::FlexRio),
            1 => Some(PlatformKind::CRio),
            2 => Some(PlatformKind::RSeries),
            _ => None,
        }
    }
}

impl std::fmt::Display for PlatformKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlatformKind::FlexRio => write!(f, "FlexRIO"),
            PlatformKind::CRio => write!(f, "cRIO"),
            PlatformKind::RSeries => write!(f, "R-Series"),
        }
    }
}

/// Resolved platform: family plus the capability limits the composer and the
/// DMA engine consult. Immutable for the session once resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Platform {
    pub kind: PlatformKind,
    pub max_ai: usize,
    pub max_ao: usize,
    pub max_aux_analog: usize,
    pub max_digital: usize,
    pub max_aux_digital: usize,
    pub max_signal_generators: usize,
    pub max_dma_channels: usize,
    pub module_slots: usize,
    /// Aggregate budget for the block sizes of simultaneously enabled DMA
    /// channels, in transfer words.
    pub dma_block_budget_words: usize,
    pub min_sampling_rate_hz: u32,
    pub max_sampling_rate_hz: u32,
}

impl Platform {
    /// Read the `Platform` terminal and map its code onto the closed set.
    pub fn resolve(catalog: &ResourceCatalog, bus: &dyn FpgaBus) -> Result<Self> {
        let handle = catalog.lookup(names::PLATFORM)?;
        let code = bus.read_u8(handle.address)?;
        let kind = PlatformKind::from_code(code).ok_or(RioError::UnsupportedPlatform(code))?;

        tracing::debug!(%kind, code, "platform resolved");
        Ok(Self::limits_for(kind))
    }

    /// Capability table for a platform family.
    pub fn limits_for(kind: PlatformKind) -> Self {
        match kind {
            PlatformKind::FlexRio => Platform {
                kind,
                max_ai: 4,
                max_ao: 2,
                max_aux_analog: 16,
                max_digital: 90,
                max_aux_digital: 16,
                max_signal_generators: 2,
                max_dma_channels: 16,
                module_slots: 1,
                dma_block_budget_words: 8192,
                min_sampling_rate_hz: 1_526,
                max_sampling_rate_hz: 100_000_000,
            },
            PlatformKind::CRio => Platform {
                kind,
                max_ai: 256,
                max_ao: 256,
                max_aux_analog: 256,
                max_digital: 256,
                max_aux_digital: 256,
                max_signal_generators: 256,
                max_dma_channels: 3,
                module_slots: 16,
                dma_block_budget_words: 2048,
                min_sampling_rate_hz: 611,
                max_sampling_rate_hz: 40_000_000,
            },
            PlatformKind::RSeries => Platform {
                kind,
                max_ai: 8,
                max_ao: 8,
                max_aux_analog: 16,
                max_digital: 128,
                max_aux_digital: 16,
                max_signal_generators: 2,
                max_dma_channels: 3,
                module_slots: 0,
                dma_block_budget_words: 4096,
                min_sampling_rate_hz: 611,
                max_sampling_rate_hz: 40_000_000,
            },
        }
    }
}
