// src/catalog.rs
//! Resource catalog mapping terminal names to hardware addresses
//!
//! The catalog is produced by parsing the hardware description of a bitfile;
//! parsing itself happens outside this crate. Once built the catalog is
//! read-only: capability groups copy the addresses they need at construction
//! and never hold a reference back into it.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::{Result, RioError};

/// Register data types declared by the hardware description
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FpgaType {
    Bool,
    U8,
    I8,
    U16,
    I16,
    U32,
    I32,
    U64,
    I64,
}

/// What kind of resource a catalog entry describes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResourceKind {
    /// Host-writable register
    Control,
    /// Host-readable register
    Indicator,
    /// Array register read as a whole
    IndicatorArray,
    /// Device-to-host DMA FIFO
    DmaFifo,
}

/// A single named resource: name, resolved address and declared type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceHandle {
    pub name: String,
    pub address: u32,
    pub datatype: FpgaType,
    pub kind: ResourceKind,
}

/// Immutable name → resource mapping for one bitfile.
#[derive(Debug, Clone, Default)]
pub struct ResourceCatalog {
    resources: HashMap<String, ResourceHandle>,
}

impl ResourceCatalog {
    /// Build a catalog from pre-parsed entries. Later duplicates win, which
    /// matches the hardware description allowing a name to appear once.
    pub fn from_entries(entries: impl IntoIterator<Item = ResourceHandle>) -> Self {
        let resources = entries
            .into_iter()
            .map(|handle| (handle.name.clone(), handle))
            .collect();
        Self { resources }
    }

    /// Incremental builder, mostly useful for tests and demos.
    pub fn builder() -> CatalogBuilder {
        CatalogBuilder::default()
    }

    /// Look up a resource, failing with `ResourceNotFound` when absent.
    pub fn lookup(&self, name: &str) -> Result<&ResourceHandle> {
        self.resources
            .get(name)
            .ok_or_else(|| RioError::ResourceNotFound(name.to_string()))
    }

    /// Non-failing lookup for optional resources.
    pub fn find(&self, name: &str) -> Option<&ResourceHandle> {
        self.resources.get(name)
    }

    /// Number of resources in an indexed family (`AI0`, `AI1`, ...).
    ///
    /// Counts contiguously from index 0 and stops at the first gap; `max`
    /// bounds the scan to the platform's channel cap.
    pub fn count_indexed(&self, prefix: &str, max: usize) -> usize {
        (0..max)
            .take_while(|n| self.resources.contains_key(&format!("{prefix}{n}")))
            .count()
    }

    /// Total number of entries.
    pub fn len(&self) -> usize {
        self.resources.len()
    }

    /// True when the catalog holds no entries.
    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }
}

/// Builder collecting resources before freezing them into a catalog.
#[derive(Debug, Default)]
pub struct CatalogBuilder {
    entries: Vec<ResourceHandle>,
}

impl CatalogBuilder {
    /// Add a host-writable register.
    pub fn control(mut self, name: &str, address: u32, datatype: FpgaType) -> Self {
        self.entries.push(ResourceHandle {
            name: name.to_string(),
            address,
            datatype,
            kind: ResourceKind::Control,
        });
        self
    }

    /// Add a host-readable register.
    pub fn indicator(mut self, name: &str, address: u32, datatype: FpgaType) -> Self {
        self.entries.push(ResourceHandle {
            name: name.to_string(),
            address,
            datatype,
            kind: ResourceKind::Indicator,
        });
        self
    }

    /// Add an array register.
    pub fn indicator_array(mut self, name: &str, address: u32, datatype: FpgaType) -> Self {
        self.entries.push(ResourceHandle {
            name: name.to_string(),
            address,
            datatype,
            kind: ResourceKind::IndicatorArray,
        });
        self
    }

    /// Add a device-to-host DMA FIFO.
    pub fn dma_fifo(mut self, name: &str, address: u32) -> Self {
        self.entries.push(ResourceHandle {
            name: name.to_string(),
            address,
            datatype: FpgaType::U64,
            kind: ResourceKind::DmaFifo,
        });
        self
    }

    /// Freeze into an immutable catalog.
    pub fn build(self) -> ResourceCatalog {
        ResourceCatalog::from_entries(self.entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_catalog() -> ResourceCatalog {
        ResourceCatalog::builder()
            .indicator("Platform", 0x10, FpgaType::U8)
            .indicator("AI0", 0x20, FpgaType::I32)
            .indicator("AI1", 0x24, FpgaType::I32)
            .indicator("AI3", 0x2C, FpgaType::I32)
            .control("AO0", 0x30, FpgaType::I32)
            .dma_fifo("DMATtoHOST0", 0x0)
            .build()
    }

    #[test]
    fn test_lookup_present_and_absent() {
        let catalog = sample_catalog();

        let handle = catalog.lookup("Platform").unwrap();
        assert_eq!(handle.address, 0x10);
        assert_eq!(handle.datatype, FpgaType::U8);

        match catalog.lookup("DevProfile") {
            Err(RioError::ResourceNotFound(name)) => assert_eq!(name, "DevProfile"),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_count_indexed_stops_at_first_gap() {
        let catalog = sample_catalog();

        // AI3 exists but AI2 does not, so the contiguous count is 2.
        assert_eq!(catalog.count_indexed("AI", 16), 2);
        assert_eq!(catalog.count_indexed("AO", 16), 1);
        assert_eq!(catalog.count_indexed("DI", 16), 0);
    }

    #[test]
    fn test_count_indexed_respects_max() {
        let catalog = sample_catalog();
        assert_eq!(catalog.count_indexed("AI", 1), 1);
        assert_eq!(catalog.count_indexed("AI", 0), 0);
    }

    #[test]
    fn test_find_is_non_failing() {
        let catalog = sample_catalog();
        assert!(catalog.find("AI0").is_some());
        assert!(catalog.find("missing").is_none());
    }
}
