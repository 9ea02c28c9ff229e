// src/terminals/mod.rs
//! Terminal capability groups and the profile composer
//!
//! The group set is closed: every possible group is enumerated here and the
//! resolved profile selects a subset. Composition is all-or-nothing — if any
//! mandated resource is missing no composite is returned.

pub mod analog;
pub mod crio;
pub mod digital;
pub mod flexrio;
pub mod names;
pub mod signal_generation;

pub use analog::{TerminalsAnalog, TerminalsAuxAnalog};
pub use crio::TerminalsCRio;
pub use digital::{TerminalsAuxDigital, TerminalsDigital};
pub use flexrio::TerminalsFlexRio;
pub use signal_generation::TerminalsSignalGeneration;

use std::sync::Arc;

use crate::catalog::ResourceCatalog;
use crate::config::DmaConfig;
use crate::dma::DmaDaq;
use crate::error::{Result, RioError};
use crate::hal::FpgaBus;
use crate::platform::{Platform, PlatformKind};
use crate::profile::ProfileId;

/// Closed enumeration of the terminal capability groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TerminalKind {
    Analog,
    Digital,
    AuxAnalog,
    AuxDigital,
    SignalGeneration,
    DmaDaq,
    FlexRio,
    CRio,
}

impl std::fmt::Display for TerminalKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TerminalKind::Analog => write!(f, "Analog"),
            TerminalKind::Digital => write!(f, "Digital"),
            TerminalKind::AuxAnalog => write!(f, "AuxAnalog"),
            TerminalKind::AuxDigital => write!(f, "AuxDigital"),
            TerminalKind::SignalGeneration => write!(f, "SignalGeneration"),
            TerminalKind::DmaDaq => write!(f, "DMA-DAQ"),
            TerminalKind::FlexRio => write!(f, "FlexRIO"),
            TerminalKind::CRio => write!(f, "cRIO"),
        }
    }
}

/// Which groups a profile mandates. Platform-specific groups follow the
/// platform, not the profile code.
#[derive(Debug, Clone, Copy)]
struct GroupSet {
    analog: bool,
    digital: bool,
    aux_analog: bool,
    aux_digital: bool,
    signal_generation: bool,
    dma_daq: bool,
}

impl GroupSet {
    fn for_profile(profile: ProfileId) -> Self {
        match profile {
            ProfileId::FlexRioCpuDaq | ProfileId::CRioDaq | ProfileId::RSeriesDaq => GroupSet {
                analog: true,
                digital: true,
                aux_analog: true,
                aux_digital: true,
                signal_generation: true,
                dma_daq: true,
            },
            ProfileId::FlexRioCpuImaq => GroupSet {
                analog: false,
                digital: true,
                aux_analog: true,
                aux_digital: true,
                signal_generation: false,
                dma_daq: true,
            },
            ProfileId::CRioIo => GroupSet {
                analog: true,
                digital: true,
                aux_analog: true,
                aux_digital: true,
                signal_generation: true,
                dma_daq: false,
            },
        }
    }
}

/// The composite handle holding every group the profile exposes.
///
/// Requesting a group outside the profile's set fails with
/// `TerminalNotImplemented`, which is distinct from a missing resource.
pub struct TerminalSet {
    analog: Option<TerminalsAnalog>,
    digital: Option<TerminalsDigital>,
    aux_analog: Option<TerminalsAuxAnalog>,
    aux_digital: Option<TerminalsAuxDigital>,
    signal_generation: Option<TerminalsSignalGeneration>,
    daq: Option<DmaDaq>,
    flexrio: Option<TerminalsFlexRio>,
    crio: Option<TerminalsCRio>,
}

impl TerminalSet {
    /// Instantiate the groups the profile mandates. Groups are independent
    /// and probed in an unspecified order; any failure aborts the whole
    /// composition.
    pub fn compose(
        catalog: &ResourceCatalog,
        bus: Arc<dyn FpgaBus>,
        platform: &Platform,
        profile: ProfileId,
        dma_config: &DmaConfig,
    ) -> Result<Self> {
        let groups = GroupSet::for_profile(profile);

        let analog = groups
            .analog
            .then(|| TerminalsAnalog::new(catalog, Arc::clone(&bus), platform))
            .transpose()?;
        let digital = groups
            .digital
            .then(|| TerminalsDigital::new(catalog, Arc::clone(&bus), platform))
            .transpose()?;
        let aux_analog = groups
            .aux_analog
            .then(|| TerminalsAuxAnalog::new(catalog, Arc::clone(&bus), platform))
            .transpose()?;
        let aux_digital = groups
            .aux_digital
            .then(|| TerminalsAuxDigital::new(catalog, Arc::clone(&bus), platform))
            .transpose()?;
        let signal_generation = groups
            .signal_generation
            .then(|| TerminalsSignalGeneration::new(catalog, Arc::clone(&bus), platform))
            .transpose()?;
        let daq = groups
            .dma_daq
            .then(|| DmaDaq::new(catalog, Arc::clone(&bus), platform, dma_config.clone()))
            .transpose()?;

        let flexrio = (platform.kind == PlatformKind::FlexRio)
            .then(|| TerminalsFlexRio::new(catalog, Arc::clone(&bus)))
            .transpose()?;
        let crio = (platform.kind == PlatformKind::CRio)
            .then(|| TerminalsCRio::new(catalog, Arc::clone(&bus), platform))
            .transpose()?;

        tracing::info!(%profile, platform = %platform.kind, "terminal set composed");

        Ok(Self {
            analog,
            digital,
            aux_analog,
            aux_digital,
            signal_generation,
            daq,
            flexrio,
            crio,
        })
    }

    pub fn analog(&self) -> Result<&TerminalsAnalog> {
        self.analog
            .as_ref()
            .ok_or(RioError::TerminalNotImplemented(TerminalKind::Analog))
    }

    pub fn digital(&self) -> Result<&TerminalsDigital> {
        self.digital
            .as_ref()
            .ok_or(RioError::TerminalNotImplemented(TerminalKind::Digital))
    }

    pub fn aux_analog(&self) -> Result<&TerminalsAuxAnalog> {
        self.aux_analog
            .as_ref()
            .ok_or(RioError::TerminalNotImplemented(TerminalKind::AuxAnalog))
    }

    pub fn aux_digital(&self) -> Result<&TerminalsAuxDigital> {
        self.aux_digital
            .as_ref()
            .ok_or(RioError::TerminalNotImplemented(TerminalKind::AuxDigital))
    }

    pub fn signal_generation(&self) -> Result<&TerminalsSignalGeneration> {
        self.signal_generation
            .as_ref()
            .ok_or(RioError::TerminalNotImplemented(
                TerminalKind::SignalGeneration,
            ))
    }

    pub fn daq(&self) -> Result<&DmaDaq> {
        self.daq
            .as_ref()
            .ok_or(RioError::TerminalNotImplemented(TerminalKind::DmaDaq))
    }

    pub fn daq_mut(&mut self) -> Result<&mut DmaDaq> {
        self.daq
            .as_mut()
            .ok_or(RioError::TerminalNotImplemented(TerminalKind::DmaDaq))
    }

    pub fn flexrio(&self) -> Result<&TerminalsFlexRio> {
        self.flexrio
            .as_ref()
            .ok_or(RioError::TerminalNotImplemented(TerminalKind::FlexRio))
    }

    pub fn crio(&self) -> Result<&TerminalsCRio> {
        self.crio
            .as_ref()
            .ok_or(RioError::TerminalNotImplemented(TerminalKind::CRio))
    }
}

/// Addresses of a contiguous indexed family, `prefix0..prefixN-1`.
pub(crate) fn indexed_addresses(catalog: &ResourceCatalog, prefix: &str, max: usize) -> Vec<u32> {
    let count = catalog.count_indexed(prefix, max);
    (0..count)
        .map(|n| {
            // count_indexed guarantees presence
            catalog
                .find(&format!("{prefix}{n}"))
                .map(|handle| handle.address)
                .unwrap_or_default()
        })
        .collect()
}
