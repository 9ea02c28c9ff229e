// tests/common/mod.rs
//! Shared fixtures: a complete FlexRIO CPU-DAQ image over the simulated bus

#![allow(dead_code)]

use std::sync::Arc;

use rio_core::catalog::{FpgaType, ResourceCatalog};
use rio_core::hal::simulator::SimulatedBus;

// Common terminals
pub const PLATFORM_ADDR: u32 = 0x100;
pub const PROFILE_ADDR: u32 = 0x104;
pub const VI_ADDR: u32 = 0x108;
pub const INIT_DONE_ADDR: u32 = 0x10C;
pub const FREF_ADDR: u32 = 0x110;
pub const QUALITY_ADDR: u32 = 0x114;
pub const TEMP_ADDR: u32 = 0x118;
pub const DAQ_START_STOP_ADDR: u32 = 0x11C;
pub const DEBUG_MODE_ADDR: u32 = 0x120;

// FlexRIO adapter terminals
pub const ADAPTER_CORRECT_ADDR: u32 = 0x600;
pub const MODULE_ID_ADDR: u32 = 0x604;

// DMA geometry registers
pub const NCH_ADDR: u32 = 0x1300;
pub const FRAME_TYPE_ADDR: u32 = 0x1304;
pub const SAMPLE_SIZE_ADDR: u32 = 0x1308;
pub const BLOCK_NWORDS_ADDR: u32 = 0x130C;
pub const OVERFLOW_ADDR: u32 = 0x1310;

/// Channels the fixture image implements.
pub const DMA_CHANNELS: usize = 3;
/// Transfer words per block on every fixture channel.
pub const BLOCK_WORDS: usize = 8;
/// Bits per sample on every fixture channel.
pub const SAMPLE_BITS: u8 = 16;

pub fn fifo_addr(n: usize) -> u32 {
    0x1000 + n as u32
}

pub fn dma_enable_addr(n: usize) -> u32 {
    0x1100 + 4 * n as u32
}

pub fn dma_rate_addr(n: usize) -> u32 {
    0x1200 + 4 * n as u32
}

/// Catalog of a FlexRIO CPU-DAQ image: common terminals, adapter terminals,
/// a small analog/digital complement, one signal generator and three DMA
/// channels (the last one image-framed).
pub fn flexrio_daq_catalog() -> ResourceCatalog {
    let mut builder = ResourceCatalog::builder()
        .indicator("Platform", PLATFORM_ADDR, FpgaType::U8)
        .indicator("DevProfile", PROFILE_ADDR, FpgaType::U8)
        .indicator_array("FPGAVIversion", VI_ADDR, FpgaType::U8)
        .indicator("InitDone", INIT_DONE_ADDR, FpgaType::Bool)
        .indicator("Fref", FREF_ADDR, FpgaType::U32)
        .indicator("DevQualityStatus", QUALITY_ADDR, FpgaType::U8)
        .indicator("DevTemp", TEMP_ADDR, FpgaType::I16)
        .control("DAQStartStop", DAQ_START_STOP_ADDR, FpgaType::Bool)
        .control("DebugMode", DEBUG_MODE_ADDR, FpgaType::Bool)
        // FlexRIO adapter terminals
        .indicator("RIOAdapterCorrect", ADAPTER_CORRECT_ADDR, FpgaType::Bool)
        .indicator("InsertedIOModuleID", MODULE_ID_ADDR, FpgaType::U32)
        // Analog complement
        .indicator("AI0", 0x200, FpgaType::I32)
        .indicator("AI1", 0x204, FpgaType::I32)
        .control("AO0", 0x210, FpgaType::I32)
        .control("AOEnable0", 0x214, FpgaType::Bool)
        // Digital complement
        .indicator("DI0", 0x400, FpgaType::Bool)
        .control("DO0", 0x410, FpgaType::Bool)
        // One signal generator
        .indicator("SGNo", 0x500, FpgaType::U8)
        .control("SGSignalType0", 0x510, FpgaType::U8)
        .control("SGAmp0", 0x514, FpgaType::U32)
        .control("SGFreq0", 0x518, FpgaType::U32)
        .control("SGPhase0", 0x51C, FpgaType::U32)
        .control("SGUpdateRate0", 0x520, FpgaType::U32)
        .indicator("SGFref0", 0x524, FpgaType::U32)
        // DMA family
        .indicator_array("DMATtoHOSTNCh", NCH_ADDR, FpgaType::U16)
        .indicator_array("DMATtoHOSTFrameType", FRAME_TYPE_ADDR, FpgaType::U8)
        .indicator_array("DMATtoHOSTSampleSize", SAMPLE_SIZE_ADDR, FpgaType::U8)
        .indicator_array("DMATtoHOSTBlockNWords", BLOCK_NWORDS_ADDR, FpgaType::U16)
        .indicator("DMATtoHOSTOverflows", OVERFLOW_ADDR, FpgaType::U32);

    for n in 0..DMA_CHANNELS {
        builder = builder
            .dma_fifo(&format!("DMATtoHOST{n}"), fifo_addr(n))
            .control(&format!("DMATtoHOSTEnable{n}"), dma_enable_addr(n), FpgaType::Bool)
            .control(
                &format!("DMATtoHOSTSamplingRate{n}"),
                dma_rate_addr(n),
                FpgaType::I32,
            );
    }

    builder.build()
}

/// Simulated bus preloaded to match [`flexrio_daq_catalog`].
pub fn flexrio_daq_bus() -> Arc<SimulatedBus> {
    let bus = Arc::new(SimulatedBus::new());

    bus.load_u8(PLATFORM_ADDR, 0); // FlexRIO
    bus.load_u8(PROFILE_ADDR, 0); // CPU-DAQ
    bus.load_u8_array(VI_ADDR, &[1, 2]);
    bus.load_bool(INIT_DONE_ADDR, true);
    bus.load_u32(FREF_ADDR, 100_000_000);
    bus.load_bool(ADAPTER_CORRECT_ADDR, true);
    bus.load_u32(MODULE_ID_ADDR, 0x7952);

    bus.load_u8(0x500, 1); // one generator
    bus.load_u32(0x524, 10_000_000);

    // Geometry: four signal channels per DMA, 16-bit samples, 8-word
    // blocks; channel 2 carries framed images.
    bus.load_u16_array(NCH_ADDR, &[4; DMA_CHANNELS]);
    bus.load_u8_array(FRAME_TYPE_ADDR, &[0, 0, 1]);
    bus.load_u8_array(SAMPLE_SIZE_ADDR, &[SAMPLE_BITS; DMA_CHANNELS]);
    bus.load_u16_array(BLOCK_NWORDS_ADDR, &[BLOCK_WORDS as u16; DMA_CHANNELS]);

    bus
}
