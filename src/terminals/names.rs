// src/terminals/names.rs
//! Terminal names declared by the hardware description
//!
//! Indexed families append the channel number to the prefix (`AI0`, `AI1`,
//! ...). The strings must match the bitfile catalog exactly.

// Common device terminals
pub const PLATFORM: &str = "Platform";
pub const DEV_PROFILE: &str = "DevProfile";
pub const FPGA_VI_VERSION: &str = "FPGAVIversion";
pub const INIT_DONE: &str = "InitDone";
pub const FREF: &str = "Fref";
pub const DEV_QUALITY_STATUS: &str = "DevQualityStatus";
pub const DEV_TEMP: &str = "DevTemp";
pub const DAQ_START_STOP: &str = "DAQStartStop";
pub const DEBUG_MODE: &str = "DebugMode";

// Analog terminals
pub const AI: &str = "AI";
pub const AO: &str = "AO";
pub const AO_ENABLE: &str = "AOEnable";
pub const AUX_AI: &str = "auxAI";
pub const AUX_AO: &str = "auxAO";
pub const AUX_AI64: &str = "auxAI64";
pub const AUX_AO64: &str = "auxAO64";

// Digital terminals
pub const DI: &str = "DI";
pub const DO: &str = "DO";
pub const AUX_DI: &str = "auxDI";
pub const AUX_DO: &str = "auxDO";

// Signal generation terminals
pub const SG_NO: &str = "SGNo";
pub const SG_SIGNAL_TYPE: &str = "SGSignalType";
pub const SG_AMP: &str = "SGAmp";
pub const SG_FREQ: &str = "SGFreq";
pub const SG_PHASE: &str = "SGPhase";
pub const SG_UPDATE_RATE: &str = "SGUpdateRate";
pub const SG_FREF: &str = "SGFref";

// FlexRIO adapter terminals
pub const RIO_ADAPTER_CORRECT: &str = "RIOAdapterCorrect";
pub const INSERTED_IO_MODULE_ID: &str = "InsertedIOModuleID";

// cRIO module terminals
pub const CRIO_MODULES_OK: &str = "cRIOModulesOK";
pub const INSERTED_IO_MODULES_ID: &str = "InsertedIOModulesID";

// DMA terminals
pub const DMA_TTOHOST: &str = "DMATtoHOST";
pub const DMA_TTOHOST_ENABLE: &str = "DMATtoHOSTEnable";
pub const DMA_TTOHOST_SAMPLING_RATE: &str = "DMATtoHOSTSamplingRate";
pub const DMA_TTOHOST_NCH: &str = "DMATtoHOSTNCh";
pub const DMA_TTOHOST_FRAME_TYPE: &str = "DMATtoHOSTFrameType";
pub const DMA_TTOHOST_SAMPLE_SIZE: &str = "DMATtoHOSTSampleSize";
pub const DMA_TTOHOST_BLOCK_NWORDS: &str = "DMATtoHOSTBlockNWords";
pub const DMA_TTOHOST_OVERFLOWS: &str = "DMATtoHOSTOverflows";
