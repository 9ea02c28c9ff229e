//! rio-core: typed terminal access for RIO FPGA acquisition devices
//!
//! This library abstracts a reconfigurable hardware device (an FPGA image)
//! behind a typed, named-resource API. Callers request logical signals —
//! analog/digital I/O, signal generators, bulk DMA channels — without
//! knowing hardware addresses; the crate resolves them from a parsed
//! hardware-description catalog, validates that the configured design
//! matches expectations, and exposes read/write/stream operations with
//! hardware-appropriate error and timeout semantics.
//!
//! - Platform and device-profile resolution with cross-validation
//! - Profile-driven composition of terminal capability groups
//! - Block-oriented DMA streaming with bounded waits and overflow reporting
//! - A simulated bus for hardware-free development and testing
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use rio_core::catalog::{FpgaType, ResourceCatalog};
//! use rio_core::config::SessionConfig;
//! use rio_core::device::RioDevice;
//! use rio_core::hal::simulator::SimulatedBus;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // In production the catalog comes from the parsed hardware
//!     // description; here a minimal cRIO IO image is declared by hand.
//!     let catalog = ResourceCatalog::builder()
//!         .indicator("Platform", 0x100, FpgaType::U8)
//!         .indicator("DevProfile", 0x104, FpgaType::U8)
//!         .indicator_array("FPGAVIversion", 0x108, FpgaType::U8)
//!         .indicator("InitDone", 0x10C, FpgaType::Bool)
//!         .indicator("Fref", 0x110, FpgaType::U32)
//!         .indicator("DevQualityStatus", 0x114, FpgaType::U8)
//!         .indicator("DevTemp", 0x118, FpgaType::I16)
//!         .control("DAQStartStop", 0x11C, FpgaType::Bool)
//!         .control("DebugMode", 0x120, FpgaType::Bool)
//!         .indicator("cRIOModulesOK", 0x700, FpgaType::Bool)
//!         .build();
//!
//!     let bus = Arc::new(SimulatedBus::new());
//!     bus.load_u8(0x100, 1); // cRIO
//!     bus.load_u8(0x104, 1); // IO profile
//!     bus.load_u8_array(0x108, &[1, 0]);
//!     bus.load_bool(0x10C, true);
//!     bus.load_bool(0x700, true);
//!
//!     let device = RioDevice::open(&catalog, bus, SessionConfig::default())?;
//!     device.start_fpga()?;
//!     println!("temperature: {}", device.device_temperature()?);
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod catalog;
pub mod config;
pub mod device;
pub mod dma;
pub mod error;
pub mod hal;
pub mod platform;
pub mod profile;
pub mod status;
pub mod terminals;

// Re-export the types most callers touch
pub use catalog::{FpgaType, ResourceCatalog, ResourceHandle, ResourceKind};
pub use config::{DmaConfig, SessionConfig};
pub use device::RioDevice;
pub use dma::{DmaDaq, FrameType, ImageHeader};
pub use error::{Result, RioError};
pub use hal::{BusError, FpgaBus};
pub use platform::{Platform, PlatformKind};
pub use profile::ProfileId;
pub use status::{DetailCode, Status, StatusCode};
pub use terminals::{TerminalKind, TerminalSet};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
