// src/terminals/digital.rs
//! Digital and auxiliary digital terminal groups

use std::sync::Arc;

use crate::catalog::ResourceCatalog;
use crate::error::{Result, RioError};
use crate::hal::FpgaBus;
use crate::platform::Platform;
use crate::terminals::{indexed_addresses, names};

/// Digital inputs and outputs.
pub struct TerminalsDigital {
    bus: Arc<dyn FpgaBus>,
    di: Vec<u32>,
    dout: Vec<u32>,
}

impl TerminalsDigital {
    pub(crate) fn new(
        catalog: &ResourceCatalog,
        bus: Arc<dyn FpgaBus>,
        platform: &Platform,
    ) -> Result<Self> {
        Ok(Self {
            bus,
            di: indexed_addresses(catalog, names::DI, platform.max_digital),
            dout: indexed_addresses(catalog, names::DO, platform.max_digital),
        })
    }

    pub fn di_count(&self) -> usize {
        self.di.len()
    }

    pub fn do_count(&self) -> usize {
        self.dout.len()
    }

    pub fn di(&self, n: usize) -> Result<bool> {
        let addr = lookup(&self.di, names::DI, n)?;
        Ok(self.bus.read_bool(addr)?)
    }

    pub fn dout(&self, n: usize) -> Result<bool> {
        let addr = lookup(&self.dout, names::DO, n)?;
        Ok(self.bus.read_bool(addr)?)
    }

    pub fn set_dout(&self, n: usize, value: bool) -> Result<()> {
        let addr = lookup(&self.dout, names::DO, n)?;
        Ok(self.bus.write_bool(addr, value)?)
    }
}

/// Auxiliary digital terminals. Optional family, degrades to zero channels.
pub struct TerminalsAuxDigital {
    bus: Arc<dyn FpgaBus>,
    aux_di: Vec<u32>,
    aux_do: Vec<u32>,
}

impl TerminalsAuxDigital {
    pub(crate) fn new(
        catalog: &ResourceCatalog,
        bus: Arc<dyn FpgaBus>,
        platform: &Platform,
    ) -> Result<Self> {
        Ok(Self {
            bus,
            aux_di: indexed_addresses(catalog, names::AUX_DI, platform.max_aux_digital),
            aux_do: indexed_addresses(catalog, names::AUX_DO, platform.max_aux_digital),
        })
    }

    pub fn aux_di_count(&self) -> usize {
        self.aux_di.len()
    }

    pub fn aux_do_count(&self) -> usize {
        self.aux_do.len()
    }

    pub fn aux_di(&self, n: usize) -> Result<bool> {
        let addr = lookup(&self.aux_di, names::AUX_DI, n)?;
        Ok(self.bus.read_bool(addr)?)
    }

    pub fn aux_do(&self, n: usize) -> Result<bool> {
        let addr = lookup(&self.aux_do, names::AUX_DO, n)?;
        Ok(self.bus.read_bool(addr)?)
    }

    pub fn set_aux_do(&self, n: usize, value: bool) -> Result<()> {
        let addr = lookup(&self.aux_do, names::AUX_DO, n)?;
        Ok(self.bus.write_bool(addr, value)?)
    }
}

fn lookup(addrs: &[u32], prefix: &str, n: usize) -> Result<u32> {
    addrs
        .get(n)
        .copied()
        .ok_or_else(|| RioError::missing_indexed(prefix, n))
}
