// demos/simulator_demo.rs
//! End-to-end walkthrough against the simulated bus: declare a FlexRIO
//! CPU-DAQ image, open a session, start the design and stream a few blocks.
//!
//! Run with: cargo run --example simulator_demo

use std::sync::Arc;

use rio_core::catalog::{FpgaType, ResourceCatalog};
use rio_core::config::SessionConfig;
use rio_core::device::RioDevice;
use rio_core::hal::simulator::SimulatedBus;

const BLOCK_WORDS: usize = 16;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // The catalog normally comes from the parsed hardware description.
    let catalog = ResourceCatalog::builder()
        .indicator("Platform", 0x100, FpgaType::U8)
        .indicator("DevProfile", 0x104, FpgaType::U8)
        .indicator_array("FPGAVIversion", 0x108, FpgaType::U8)
        .indicator("InitDone", 0x10C, FpgaType::Bool)
        .indicator("Fref", 0x110, FpgaType::U32)
        .indicator("DevQualityStatus", 0x114, FpgaType::U8)
        .indicator("DevTemp", 0x118, FpgaType::I16)
        .control("DAQStartStop", 0x11C, FpgaType::Bool)
        .control("DebugMode", 0x120, FpgaType::Bool)
        .indicator("RIOAdapterCorrect", 0x600, FpgaType::Bool)
        .indicator("InsertedIOModuleID", 0x604, FpgaType::U32)
        .indicator("AI0", 0x200, FpgaType::I32)
        .dma_fifo("DMATtoHOST0", 0x1000)
        .control("DMATtoHOSTEnable0", 0x1100, FpgaType::Bool)
        .control("DMATtoHOSTSamplingRate0", 0x1200, FpgaType::I32)
        .indicator_array("DMATtoHOSTNCh", 0x1300, FpgaType::U16)
        .indicator_array("DMATtoHOSTFrameType", 0x1304, FpgaType::U8)
        .indicator_array("DMATtoHOSTSampleSize", 0x1308, FpgaType::U8)
        .indicator_array("DMATtoHOSTBlockNWords", 0x130C, FpgaType::U16)
        .indicator("DMATtoHOSTOverflows", 0x1310, FpgaType::U32)
        .build();

    let bus = Arc::new(SimulatedBus::new());
    bus.load_u8(0x100, 0); // FlexRIO
    bus.load_u8(0x104, 0); // CPU-DAQ profile
    bus.load_u8_array(0x108, &[1, 0]);
    bus.load_bool(0x10C, true);
    bus.load_u32(0x110, 100_000_000);
    bus.load_i16(0x118, 47);
    bus.load_bool(0x600, true);
    bus.load_u32(0x604, 0x7952);
    bus.load_u16_array(0x1300, &[4]);
    bus.load_u8_array(0x1304, &[0]);
    bus.load_u8_array(0x1308, &[16]);
    bus.load_u16_array(0x130C, &[BLOCK_WORDS as u16]);

    let mut device = RioDevice::open(&catalog, bus.clone(), SessionConfig::default())?;
    println!(
        "session open: platform {}, profile {}, VI {}",
        device.platform().kind,
        device.profile(),
        device.vi_version()
    );

    device.start_fpga()?;
    println!("FPGA started, temperature {}", device.device_temperature()?);

    device.daq_mut()?.setup()?;
    let daq = device.daq()?;
    daq.set_sampling_rate(0, 1_000)?;
    daq.enable(0, true)?;
    device.set_daq_start_stop(true)?;

    // The simulated producer fills the FIFO; a real device streams on its
    // own.
    bus.push_sample_blocks(0x1000, 8, BLOCK_WORDS);

    let mut buf = vec![0u64; 4 * BLOCK_WORDS];
    let blocks = daq.read_blocks(0, 4, &mut buf, None)?;
    println!(
        "read {blocks} blocks, first words: {:?}",
        &buf[..4.min(buf.len())]
    );

    if daq.overflow()? != 0 {
        println!("overflow detected: {:#x}", daq.overflow()?);
    }

    device.set_daq_start_stop(false)?;
    let daq = device.daq()?;
    daq.enable(0, false)?;
    let mut scratch = vec![0u64; BLOCK_WORDS];
    let drained = daq.clean(0, &mut scratch)?;
    println!("drained {drained} stale words before shutdown");

    device.close();
    println!("session closed");
    Ok(())
}
