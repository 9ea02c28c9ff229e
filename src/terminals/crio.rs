// src/terminals/crio.rs
//! cRIO chassis-module terminals

use std::sync::Arc;

use crate::catalog::ResourceCatalog;
use crate::error::Result;
use crate::hal::FpgaBus;
use crate::platform::Platform;
use crate::terminals::names;

/// Chassis-module health and identification for cRIO targets.
///
/// `cRIOModulesOK` is mandated by the cRIO profiles. The inserted-module ID
/// array is optional; its read length is fixed by the platform's module-slot
/// count since the catalog does not carry array lengths.
pub struct TerminalsCRio {
    bus: Arc<dyn FpgaBus>,
    modules_ok: u32,
    modules_id: Option<u32>,
    slots: usize,
}

impl std::fmt::Debug for TerminalsCRio {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TerminalsCRio")
            .field("modules_ok", &self.modules_ok)
            .field("modules_id", &self.modules_id)
            .field("slots", &self.slots)
            .finish_non_exhaustive()
    }
}

impl TerminalsCRio {
    pub(crate) fn new(
        catalog: &ResourceCatalog,
        bus: Arc<dyn FpgaBus>,
        platform: &Platform,
    ) -> Result<Self> {
        let modules_ok = catalog.lookup(names::CRIO_MODULES_OK)?.address;
        let modules_id = catalog
            .find(names::INSERTED_IO_MODULES_ID)
            .map(|handle| handle.address);
        Ok(Self {
            bus,
            modules_ok,
            modules_id,
            slots: platform.module_slots,
        })
    }

    /// Number of chassis slots the platform exposes.
    pub fn module_slots(&self) -> usize {
        self.slots
    }

    /// Whether every inserted module matches the compiled design.
    pub fn modules_ok(&self) -> Result<bool> {
        Ok(self.bus.read_bool(self.modules_ok)?)
    }

    /// Identifiers of the inserted modules, one entry per chassis slot.
    /// Empty when the image does not publish the array.
    pub fn module_ids(&self) -> Result<Vec<u16>> {
        match self.modules_id {
            Some(addr) => Ok(self.bus.read_u16_array(addr, self.slots)?),
            None => Ok(Vec::new()),
        }
    }
}
