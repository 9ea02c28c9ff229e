// src/terminals/analog.rs
//! Analog and auxiliary analog terminal groups
//!
//! Values are raw register-width integers; scaling and calibration are a
//! caller concern.

use std::sync::Arc;

use crate::catalog::ResourceCatalog;
use crate::error::{Result, RioError};
use crate::hal::FpgaBus;
use crate::platform::Platform;
use crate::terminals::{indexed_addresses, names};

/// Analog inputs and outputs, with the per-output enable gates.
pub struct TerminalsAnalog {
    bus: Arc<dyn FpgaBus>,
    ai: Vec<u32>,
    ao: Vec<u32>,
    ao_enable: Vec<u32>,
}

impl std::fmt::Debug for TerminalsAnalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TerminalsAnalog")
            .field("ai", &self.ai)
            .field("ao", &self.ao)
            .field("ao_enable", &self.ao_enable)
            .finish_non_exhaustive()
    }
}

impl TerminalsAnalog {
    /// Probe the catalog for the analog family. Every discovered `AO`
    /// requires its matching `AOEnable`.
    pub(crate) fn new(
        catalog: &ResourceCatalog,
        bus: Arc<dyn FpgaBus>,
        platform: &Platform,
    ) -> Result<Self> {
        let ai = indexed_addresses(catalog, names::AI, platform.max_ai);
        let ao = indexed_addresses(catalog, names::AO, platform.max_ao);

        let mut ao_enable = Vec::with_capacity(ao.len());
        for n in 0..ao.len() {
            let name = format!("{}{n}", names::AO_ENABLE);
            ao_enable.push(catalog.lookup(&name)?.address);
        }

        Ok(Self {
            bus,
            ai,
            ao,
            ao_enable,
        })
    }

    pub fn ai_count(&self) -> usize {
        self.ai.len()
    }

    pub fn ao_count(&self) -> usize {
        self.ao.len()
    }

    pub fn ai(&self, n: usize) -> Result<i32> {
        let addr = self.addr(&self.ai, names::AI, n)?;
        Ok(self.bus.read_i32(addr)?)
    }

    pub fn ao(&self, n: usize) -> Result<i32> {
        let addr = self.addr(&self.ao, names::AO, n)?;
        Ok(self.bus.read_i32(addr)?)
    }

    pub fn set_ao(&self, n: usize, value: i32) -> Result<()> {
        let addr = self.addr(&self.ao, names::AO, n)?;
        Ok(self.bus.write_i32(addr, value)?)
    }

    pub fn ao_enable(&self, n: usize) -> Result<bool> {
        let addr = self.addr(&self.ao_enable, names::AO_ENABLE, n)?;
        Ok(self.bus.read_bool(addr)?)
    }

    pub fn set_ao_enable(&self, n: usize, value: bool) -> Result<()> {
        let addr = self.addr(&self.ao_enable, names::AO_ENABLE, n)?;
        Ok(self.bus.write_bool(addr, value)?)
    }

    fn addr(&self, addrs: &[u32], prefix: &str, n: usize) -> Result<u32> {
        addrs
            .get(n)
            .copied()
            .ok_or_else(|| RioError::missing_indexed(prefix, n))
    }
}

/// Auxiliary analog terminals, 32- and 64-bit. The whole family is optional
/// and degrades to zero channels when absent.
pub struct TerminalsAuxAnalog {
    bus: Arc<dyn FpgaBus>,
    aux_ai: Vec<u32>,
    aux_ao: Vec<u32>,
    aux_ai64: Vec<u32>,
    aux_ao64: Vec<u32>,
}

impl TerminalsAuxAnalog {
    pub(crate) fn new(
        catalog: &ResourceCatalog,
        bus: Arc<dyn FpgaBus>,
        platform: &Platform,
    ) -> Result<Self> {
        let max = platform.max_aux_analog;
        Ok(Self {
            bus,
            aux_ai: indexed_addresses(catalog, names::AUX_AI, max),
            aux_ao: indexed_addresses(catalog, names::AUX_AO, max),
            aux_ai64: indexed_addresses(catalog, names::AUX_AI64, max),
            aux_ao64: indexed_addresses(catalog, names::AUX_AO64, max),
        })
    }

    pub fn aux_ai_count(&self) -> usize {
        self.aux_ai.len()
    }

    pub fn aux_ao_count(&self) -> usize {
        self.aux_ao.len()
    }

    pub fn aux_ai64_count(&self) -> usize {
        self.aux_ai64.len()
    }

    pub fn aux_ao64_count(&self) -> usize {
        self.aux_ao64.len()
    }

    pub fn aux_ai(&self, n: usize) -> Result<i32> {
        let addr = lookup(&self.aux_ai, names::AUX_AI, n)?;
        Ok(self.bus.read_i32(addr)?)
    }

    pub fn aux_ao(&self, n: usize) -> Result<i32> {
        let addr = lookup(&self.aux_ao, names::AUX_AO, n)?;
        Ok(self.bus.read_i32(addr)?)
    }

    pub fn set_aux_ao(&self, n: usize, value: i32) -> Result<()> {
        let addr = lookup(&self.aux_ao, names::AUX_AO, n)?;
        Ok(self.bus.write_i32(addr, value)?)
    }

    pub fn aux_ai64(&self, n: usize) -> Result<i64> {
        let addr = lookup(&self.aux_ai64, names::AUX_AI64, n)?;
        Ok(self.bus.read_i64(addr)?)
    }

    pub fn aux_ao64(&self, n: usize) -> Result<i64> {
        let addr = lookup(&self.aux_ao64, names::AUX_AO64, n)?;
        Ok(self.bus.read_i64(addr)?)
    }

    pub fn set_aux_ao64(&self, n: usize, value: i64) -> Result<()> {
        let addr = lookup(&self.aux_ao64, names::AUX_AO64, n)?;
        Ok(self.bus.write_i64(addr, value)?)
    }
}

fn lookup(addrs: &[u32], prefix: &str, n: usize) -> Result<u32> {
    addrs
        .get(n)
        .copied()
        .ok_or_else(|| RioError::missing_indexed(prefix, n))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::FpgaType;
    use crate::hal::simulator::SimulatedBus;
    use crate::platform::PlatformKind;

    fn flexrio() -> Platform {
        Platform::limits_for(PlatformKind::FlexRio)
    }

    fn analog_catalog() -> ResourceCatalog {
        ResourceCatalog::builder()
            .indicator("AI0", 0x200, FpgaType::I32)
            .indicator("AI1", 0x204, FpgaType::I32)
            .control("AO0", 0x210, FpgaType::I32)
            .control("AOEnable0", 0x214, FpgaType::Bool)
            .build()
    }

    #[test]
    fn test_discovery_counts() {
        let bus = Arc::new(SimulatedBus::new());
        let group = TerminalsAnalog::new(&analog_catalog(), bus, &flexrio()).unwrap();

        assert_eq!(group.ai_count(), 2);
        assert_eq!(group.ao_count(), 1);
    }

    #[test]
    fn test_missing_ao_enable_fails_hard() {
        let catalog = ResourceCatalog::builder()
            .control("AO0", 0x210, FpgaType::I32)
            .build();
        let bus = Arc::new(SimulatedBus::new());

        match TerminalsAnalog::new(&catalog, bus, &flexrio()) {
            Err(RioError::ResourceNotFound(name)) => assert_eq!(name, "AOEnable0"),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_read_write_through_bus() {
        let bus = Arc::new(SimulatedBus::new());
        bus.load_i32(0x200, -1234);
        let group = TerminalsAnalog::new(&analog_catalog(), bus.clone(), &flexrio())
            .unwrap();

        assert_eq!(group.ai(0).unwrap(), -1234);

        group.set_ao(0, 555).unwrap();
        assert_eq!(bus.register(0x210), Some(555));

        group.set_ao_enable(0, true).unwrap();
        assert_eq!(bus.register(0x214), Some(1));
    }

    #[test]
    fn test_out_of_range_makes_no_driver_call() {
        let bus = Arc::new(SimulatedBus::new());
        let group = TerminalsAnalog::new(&analog_catalog(), bus.clone(), &flexrio())
            .unwrap();

        let before = bus.op_count();
        match group.ai(5) {
            Err(RioError::ResourceNotFound(name)) => assert_eq!(name, "AI5"),
            other => panic!("unexpected result: {other:?}"),
        }
        assert!(group.set_ao(3, 1).is_err());
        assert_eq!(bus.op_count(), before);
    }

    #[test]
    fn test_aux_family_degrades_to_zero() {
        let bus = Arc::new(SimulatedBus::new());
        let group =
            TerminalsAuxAnalog::new(&ResourceCatalog::default(), bus, &flexrio()).unwrap();

        assert_eq!(group.aux_ai_count(), 0);
        assert_eq!(group.aux_ao64_count(), 0);
        assert!(matches!(
            group.aux_ai(0),
            Err(RioError::ResourceNotFound(_))
        ));
    }

    #[test]
    fn test_aux_64bit_roundtrip() {
        let catalog = ResourceCatalog::builder()
            .indicator("auxAI640", 0x300, FpgaType::I64)
            .control("auxAO640", 0x308, FpgaType::I64)
            .build();
        let bus = Arc::new(SimulatedBus::new());
        bus.load_i64(0x300, i64::MAX - 1);

        let group =
            TerminalsAuxAnalog::new(&catalog, bus.clone(), &flexrio()).unwrap();
        assert_eq!(group.aux_ai64(0).unwrap(), i64::MAX - 1);

        group.set_aux_ao64(0, -99).unwrap();
        assert_eq!(bus.register(0x308), Some((-99i64) as u64));
    }
}
