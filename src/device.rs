// src/device.rs
//! Device session
//!
//! `RioDevice` is the top of the stack: it resolves the platform and profile
//! exactly once, composes the terminal set, resolves the common terminal
//! family and drives the startup/teardown lifecycle. Construction is
//! two-phase by design — resolve, then compose — so the "resolved once,
//! immutable after" invariant is structural.

use std::sync::Arc;
use std::time::Instant;

use crate::catalog::ResourceCatalog;
use crate::config::SessionConfig;
use crate::dma::DmaDaq;
use crate::error::{Result, RioError};
use crate::hal::FpgaBus;
use crate::platform::{Platform, PlatformKind};
use crate::profile::ProfileId;
use crate::terminals::{
    names, TerminalSet, TerminalsAnalog, TerminalsAuxAnalog, TerminalsAuxDigital, TerminalsCRio,
    TerminalsDigital, TerminalsFlexRio, TerminalsSignalGeneration,
};

/// Addresses and once-read values of the terminals every profile shares.
struct CommonTerminals {
    init_done: u32,
    dev_quality_status: u32,
    dev_temp: u32,
    daq_start_stop: u32,
    debug_mode: u32,
    vi_version: String,
    fref: u32,
}

impl CommonTerminals {
    fn resolve(
        catalog: &ResourceCatalog,
        bus: &dyn FpgaBus,
        expected_vi_version: Option<&str>,
    ) -> Result<Self> {
        let vi_addr = catalog.lookup(names::FPGA_VI_VERSION)?.address;
        let raw = bus.read_u8_array(vi_addr, 2)?;
        let vi_version = format!("{}.{}", raw[0], raw[1]);

        if let Some(expected) = expected_vi_version {
            if expected != vi_version {
                return Err(RioError::VersionMismatch {
                    expected: expected.to_string(),
                    found: vi_version,
                });
            }
        }

        let fref_addr = catalog.lookup(names::FREF)?.address;
        let fref = bus.read_u32(fref_addr)?;

        Ok(Self {
            init_done: catalog.lookup(names::INIT_DONE)?.address,
            dev_quality_status: catalog.lookup(names::DEV_QUALITY_STATUS)?.address,
            dev_temp: catalog.lookup(names::DEV_TEMP)?.address,
            daq_start_stop: catalog.lookup(names::DAQ_START_STOP)?.address,
            debug_mode: catalog.lookup(names::DEBUG_MODE)?.address,
            vi_version,
            fref,
        })
    }
}

/// One open session against one device.
pub struct RioDevice {
    bus: Arc<dyn FpgaBus>,
    config: SessionConfig,
    platform: Platform,
    profile: ProfileId,
    terminals: TerminalSet,
    common: CommonTerminals,
    closed: bool,
}

impl RioDevice {
    /// Resolve platform and profile, compose the terminal set and resolve
    /// the common terminals. Any failure aborts the whole open — no partial
    /// device is ever returned.
    pub fn open(
        catalog: &ResourceCatalog,
        bus: Arc<dyn FpgaBus>,
        config: SessionConfig,
    ) -> Result<Self> {
        let platform = Platform::resolve(catalog, bus.as_ref())?;
        let profile = ProfileId::resolve(catalog, bus.as_ref(), &platform)?;
        let terminals =
            TerminalSet::compose(catalog, Arc::clone(&bus), &platform, profile, &config.dma)?;
        let common = CommonTerminals::resolve(
            catalog,
            bus.as_ref(),
            config.expected_vi_version.as_deref(),
        )?;

        tracing::info!(
            platform = %platform.kind,
            %profile,
            vi_version = %common.vi_version,
            "device session open"
        );

        Ok(Self {
            bus,
            config,
            platform,
            profile,
            terminals,
            common,
            closed: false,
        })
    }

    pub fn platform(&self) -> &Platform {
        &self.platform
    }

    pub fn profile(&self) -> ProfileId {
        self.profile
    }

    /// VI version declared by the bitfile, as `"M.m"`.
    pub fn vi_version(&self) -> &str {
        &self.common.vi_version
    }

    /// Reference clock for sampling rates, read once at open.
    pub fn fref(&self) -> u32 {
        self.common.fref
    }

    pub fn min_sampling_rate_hz(&self) -> u32 {
        self.platform.min_sampling_rate_hz
    }

    pub fn max_sampling_rate_hz(&self) -> u32 {
        self.platform.max_sampling_rate_hz
    }

    /// Start the design and wait for InitDone, then check the platform's
    /// module health terminal.
    pub fn start_fpga(&self) -> Result<()> {
        self.bus.run()?;

        let timeout = self.config.start_timeout();
        let deadline = Instant::now() + timeout;
        loop {
            if self.bus.read_bool(self.common.init_done)? {
                break;
            }
            if Instant::now() >= deadline {
                return Err(RioError::InitializationTimeout(timeout));
            }
            std::thread::sleep(self.config.init_poll_interval());
        }

        self.check_modules_ready()?;

        tracing::info!("FPGA started");
        Ok(())
    }

    fn check_modules_ready(&self) -> Result<()> {
        let ready = match self.platform.kind {
            PlatformKind::FlexRio => self.terminals.flexrio()?.adapter_correct()?,
            PlatformKind::CRio => self.terminals.crio()?.modules_ok()?,
            PlatformKind::RSeries => true,
        };
        if ready {
            Ok(())
        } else {
            Err(RioError::ModulesNotReady)
        }
    }

    pub fn init_done(&self) -> Result<bool> {
        Ok(self.bus.read_bool(self.common.init_done)?)
    }

    /// Acquisition status byte published by the design.
    pub fn device_quality_status(&self) -> Result<u8> {
        Ok(self.bus.read_u8(self.common.dev_quality_status)?)
    }

    /// Fabric temperature in raw register units.
    pub fn device_temperature(&self) -> Result<i16> {
        Ok(self.bus.read_i16(self.common.dev_temp)?)
    }

    pub fn daq_start_stop(&self) -> Result<bool> {
        Ok(self.bus.read_bool(self.common.daq_start_stop)?)
    }

    pub fn set_daq_start_stop(&self, start: bool) -> Result<()> {
        Ok(self.bus.write_bool(self.common.daq_start_stop, start)?)
    }

    pub fn debug_mode(&self) -> Result<bool> {
        Ok(self.bus.read_bool(self.common.debug_mode)?)
    }

    pub fn set_debug_mode(&self, debug: bool) -> Result<()> {
        Ok(self.bus.write_bool(self.common.debug_mode, debug)?)
    }

    /// The composed terminal set.
    pub fn terminals(&self) -> &TerminalSet {
        &self.terminals
    }

    pub fn terminals_mut(&mut self) -> &mut TerminalSet {
        &mut self.terminals
    }

    // Per-group accessors, failing with `TerminalNotImplemented` when the
    // profile does not expose the group.

    pub fn analog(&self) -> Result<&TerminalsAnalog> {
        self.terminals.analog()
    }

    pub fn digital(&self) -> Result<&TerminalsDigital> {
        self.terminals.digital()
    }

    pub fn aux_analog(&self) -> Result<&TerminalsAuxAnalog> {
        self.terminals.aux_analog()
    }

    pub fn aux_digital(&self) -> Result<&TerminalsAuxDigital> {
        self.terminals.aux_digital()
    }

    pub fn signal_generation(&self) -> Result<&TerminalsSignalGeneration> {
        self.terminals.signal_generation()
    }

    pub fn flexrio(&self) -> Result<&TerminalsFlexRio> {
        self.terminals.flexrio()
    }

    pub fn crio(&self) -> Result<&TerminalsCRio> {
        self.terminals.crio()
    }

    pub fn daq(&self) -> Result<&DmaDaq> {
        self.terminals.daq()
    }

    pub fn daq_mut(&mut self) -> Result<&mut DmaDaq> {
        self.terminals.daq_mut()
    }

    /// Close the session, applying the configured close behavior. Teardown
    /// is best-effort: failures are logged, remaining cleanup proceeds.
    pub fn close(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;

        if let Ok(daq) = self.terminals.daq_mut() {
            daq.teardown();
        }
        if let Err(e) = self.bus.close(self.config.reset_on_close) {
            tracing::warn!(error = %e, "failed to close driver session");
        }

        tracing::info!("device session closed");
    }
}

impl Drop for RioDevice {
    fn drop(&mut self) {
        self.shutdown();
    }
}
