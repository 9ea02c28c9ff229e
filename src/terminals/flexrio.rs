// src/terminals/flexrio.rs
//! FlexRIO adapter-module terminals

use std::sync::Arc;

use crate::catalog::ResourceCatalog;
use crate::error::Result;
use crate::hal::FpgaBus;
use crate::terminals::names;

/// Adapter-module health and identification for FlexRIO targets. Both
/// terminals are mandated by the FlexRIO profiles.
pub struct TerminalsFlexRio {
    bus: Arc<dyn FpgaBus>,
    adapter_correct: u32,
    module_id: u32,
}

impl std::fmt::Debug for TerminalsFlexRio {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TerminalsFlexRio")
            .field("adapter_correct", &self.adapter_correct)
            .field("module_id", &self.module_id)
            .finish_non_exhaustive()
    }
}

impl TerminalsFlexRio {
    pub(crate) fn new(catalog: &ResourceCatalog, bus: Arc<dyn FpgaBus>) -> Result<Self> {
        let adapter_correct = catalog.lookup(names::RIO_ADAPTER_CORRECT)?.address;
        let module_id = catalog.lookup(names::INSERTED_IO_MODULE_ID)?.address;
        Ok(Self {
            bus,
            adapter_correct,
            module_id,
        })
    }

    /// Number of adapter-presence terminals; FlexRIO carries exactly one.
    pub fn count(&self) -> usize {
        1
    }

    /// Whether the inserted adapter module matches the one the design was
    /// compiled for.
    pub fn adapter_correct(&self) -> Result<bool> {
        Ok(self.bus.read_bool(self.adapter_correct)?)
    }

    /// Identifier of the inserted adapter module.
    pub fn inserted_io_module_id(&self) -> Result<u32> {
        Ok(self.bus.read_u32(self.module_id)?)
    }
}
