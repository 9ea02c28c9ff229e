// src/terminals/signal_generation.rs
//! Signal generation terminal group
//!
//! The bitfile declares how many generators it implements through the `SGNo`
//! register. A missing `SGNo` means the image has no generation block at all
//! and the group degrades to zero channels; a declared generator with a
//! missing register is a hard composition failure.

use std::sync::Arc;

use crate::catalog::ResourceCatalog;
use crate::error::{Result, RioError};
use crate::hal::FpgaBus;
use crate::platform::Platform;
use crate::terminals::names;

pub struct TerminalsSignalGeneration {
    bus: Arc<dyn FpgaBus>,
    signal_type: Vec<u32>,
    amp: Vec<u32>,
    freq: Vec<u32>,
    phase: Vec<u32>,
    update_rate: Vec<u32>,
    /// Per-generator reference clocks, read once at construction.
    frefs: Vec<u32>,
}

impl std::fmt::Debug for TerminalsSignalGeneration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TerminalsSignalGeneration")
            .field("signal_type", &self.signal_type)
            .field("amp", &self.amp)
            .field("freq", &self.freq)
            .field("phase", &self.phase)
            .field("update_rate", &self.update_rate)
            .field("frefs", &self.frefs)
            .finish_non_exhaustive()
    }
}

impl TerminalsSignalGeneration {
    pub(crate) fn new(
        catalog: &ResourceCatalog,
        bus: Arc<dyn FpgaBus>,
        platform: &Platform,
    ) -> Result<Self> {
        let declared = match catalog.find(names::SG_NO) {
            Some(handle) => bus.read_u8(handle.address)? as usize,
            None => 0,
        };
        let count = declared.min(platform.max_signal_generators);

        let mut signal_type = Vec::with_capacity(count);
        let mut amp = Vec::with_capacity(count);
        let mut freq = Vec::with_capacity(count);
        let mut phase = Vec::with_capacity(count);
        let mut update_rate = Vec::with_capacity(count);
        let mut frefs = Vec::with_capacity(count);

        for n in 0..count {
            signal_type.push(indexed(catalog, names::SG_SIGNAL_TYPE, n)?);
            amp.push(indexed(catalog, names::SG_AMP, n)?);
            freq.push(indexed(catalog, names::SG_FREQ, n)?);
            phase.push(indexed(catalog, names::SG_PHASE, n)?);
            update_rate.push(indexed(catalog, names::SG_UPDATE_RATE, n)?);

            let fref_addr = indexed(catalog, names::SG_FREF, n)?;
            frefs.push(bus.read_u32(fref_addr)?);
        }

        Ok(Self {
            bus,
            signal_type,
            amp,
            freq,
            phase,
            update_rate,
            frefs,
        })
    }

    /// Number of generators discovered for this image.
    pub fn count(&self) -> usize {
        self.frefs.len()
    }

    /// Reference clock of generator `n`, cached at construction.
    pub fn fref(&self, n: usize) -> Result<u32> {
        self.frefs
            .get(n)
            .copied()
            .ok_or_else(|| RioError::missing_indexed(names::SG_FREF, n))
    }

    pub fn signal_type(&self, n: usize) -> Result<u8> {
        let addr = lookup(&self.signal_type, names::SG_SIGNAL_TYPE, n)?;
        Ok(self.bus.read_u8(addr)?)
    }

    pub fn set_signal_type(&self, n: usize, value: u8) -> Result<()> {
        let addr = lookup(&self.signal_type, names::SG_SIGNAL_TYPE, n)?;
        Ok(self.bus.write_u8(addr, value)?)
    }

    pub fn amplitude(&self, n: usize) -> Result<u32> {
        let addr = lookup(&self.amp, names::SG_AMP, n)?;
        Ok(self.bus.read_u32(addr)?)
    }

    pub fn set_amplitude(&self, n: usize, value: u32) -> Result<()> {
        let addr = lookup(&self.amp, names::SG_AMP, n)?;
        Ok(self.bus.write_u32(addr, value)?)
    }

    pub fn frequency(&self, n: usize) -> Result<u32> {
        let addr = lookup(&self.freq, names::SG_FREQ, n)?;
        Ok(self.bus.read_u32(addr)?)
    }

    pub fn set_frequency(&self, n: usize, value: u32) -> Result<()> {
        let addr = lookup(&self.freq, names::SG_FREQ, n)?;
        Ok(self.bus.write_u32(addr, value)?)
    }

    pub fn phase(&self, n: usize) -> Result<u32> {
        let addr = lookup(&self.phase, names::SG_PHASE, n)?;
        Ok(self.bus.read_u32(addr)?)
    }

    pub fn set_phase(&self, n: usize, value: u32) -> Result<()> {
        let addr = lookup(&self.phase, names::SG_PHASE, n)?;
        Ok(self.bus.write_u32(addr, value)?)
    }

    pub fn update_rate(&self, n: usize) -> Result<u32> {
        let addr = lookup(&self.update_rate, names::SG_UPDATE_RATE, n)?;
        Ok(self.bus.read_u32(addr)?)
    }

    pub fn set_update_rate(&self, n: usize, value: u32) -> Result<()> {
        let addr = lookup(&self.update_rate, names::SG_UPDATE_RATE, n)?;
        Ok(self.bus.write_u32(addr, value)?)
    }
}

fn indexed(catalog: &ResourceCatalog, prefix: &str, n: usize) -> Result<u32> {
    let name = format!("{prefix}{n}");
    Ok(catalog.lookup(&name)?.address)
}

fn lookup(addrs: &[u32], prefix: &str, n: usize) -> Result<u32> {
    addrs
        .get(n)
        .copied()
        .ok_or_else(|| RioError::missing_indexed(prefix, n))
}
