// src/profile.rs
//! Device-profile resolution
//!
//! The profile code declared by the bitfile decides which terminal capability
//! groups a session may request. Legality is a static (platform, code) table:
//! a code that exists for one family is still rejected when read on another.

use serde::{Deserialize, Serialize};

use crate::catalog::ResourceCatalog;
use crate::error::{Result, RioError};
use crate::hal::FpgaBus;
use crate::platform::{Platform, PlatformKind};
use crate::terminals::names;

/// Closed set of supported acquisition profiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProfileId {
    /// FlexRIO point-by-point and block DAQ
    FlexRioCpuDaq,
    /// FlexRIO image acquisition
    FlexRioCpuImaq,
    /// cRIO block DAQ
    CRioDaq,
    /// cRIO point-by-point I/O, no bulk transfer
    CRioIo,
    /// R-Series block DAQ
    RSeriesDaq,
}

impl ProfileId {
    /// Numeric code declared by the `DevProfile` terminal.
    pub const fn code(self) -> u8 {
        match self {
            ProfileId::FlexRioCpuDaq => 0,
            ProfileId::FlexRioCpuImaq => 1,
            ProfileId::CRioDaq => 0,
            ProfileId::CRioIo => 1,
            ProfileId::RSeriesDaq => 0,
        }
    }

    /// The platform family this profile is defined for.
    pub const fn platform(self) -> PlatformKind {
        match self {
            ProfileId::FlexRioCpuDaq | ProfileId::FlexRioCpuImaq => PlatformKind::FlexRio,
            ProfileId::CRioDaq | ProfileId::CRioIo => PlatformKind::CRio,
            ProfileId::RSeriesDaq => PlatformKind::RSeries,
        }
    }

    /// Static legality table. Codes 2 and 3 belong to GPU profiles of the
    /// hardware family and are not legal on any supported platform.
    fn from_code(platform: PlatformKind, code: u8) -> Option<Self> {
        match (platform, code) {
            (PlatformKind::FlexRio, 0) => Some(ProfileId::FlexRioCpuDaq),
            (PlatformKind::FlexRio, 1) => Some(ProfileId::FlexRioCpuImaq),
            (PlatformKind::CRio, 0) => Some(ProfileId::CRioDaq),
            (PlatformKind::CRio, 1) => Some(ProfileId::CRioIo),
            (PlatformKind::RSeries, 0) => Some(ProfileId::RSeriesDaq),
            _ => None,
        }
    }

    /// Read the `DevProfile` terminal and validate the code against the
    /// resolved platform.
    pub fn resolve(
        catalog: &ResourceCatalog,
        bus: &dyn FpgaBus,
        platform: &Platform,
    ) -> Result<Self> {
        let handle = catalog.lookup(names::DEV_PROFILE)?;
        let code = bus.read_u8(handle.address)?;

        let profile =
            Self::from_code(platform.kind, code).ok_or(RioError::UnsupportedDevProfile {
                code,
                platform: platform.kind,
            })?;

        tracing::debug!(?profile, code, platform = %platform.kind, "device profile resolved");
        Ok(profile)
    }
}

impl std::fmt::Display for ProfileId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProfileId::FlexRioCpuDaq => write!(f, "FlexRIO CPU-DAQ"),
            ProfileId::FlexRioCpuImaq => write!(f, "FlexRIO CPU-IMAQ"),
            ProfileId::CRioDaq => write!(f, "cRIO DAQ"),
            ProfileId::CRioIo => write!(f, "cRIO IO"),
            ProfileId::RSeriesDaq => write!(f, "R-Series DAQ"),
        }
    }
}
