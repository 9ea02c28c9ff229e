// src/dma/frame.rs
//! DMA frame typing and image header decoding

use serde::{Deserialize, Serialize};

/// Number of leading transfer words carrying the embedded header of a framed
/// image.
pub const IMAGE_HEADER_WORDS: usize = 2;

/// Closed set of frame layouts a DMA channel can declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FrameType {
    /// Plain sample words, no embedded metadata.
    Raw,
    /// Image payload whose leading words carry a frame counter and a
    /// timestamp.
    Framed,
}

impl FrameType {
    /// Map the hardware-declared code onto the closed set.
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(FrameType::Raw),
            1 => Some(FrameType::Framed),
            _ => None,
        }
    }

    pub const fn code(self) -> u8 {
        match self {
            FrameType::Raw => 0,
            FrameType::Framed => 1,
        }
    }
}

/// Embedded metadata of a framed image, decoded positionally from the
/// leading transfer words: word 0 holds the frame counter in its low half,
/// word 1 the timestamp in device ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageHeader {
    pub frame_counter: u32,
    pub timestamp_ticks: u64,
}

impl ImageHeader {
    /// Decode from an image payload. Returns `None` when the payload is too
    /// short to carry a header.
    pub fn decode(payload: &[u64]) -> Option<Self> {
        if payload.len() < IMAGE_HEADER_WORDS {
            return None;
        }
        Some(Self {
            frame_counter: (payload[0] & 0xFFFF_FFFF) as u32,
            timestamp_ticks: payload[1],
        })
    }
}

/// Transfer words needed to move `pixels` samples of `sample_bits` each,
/// rounded up to whole 64-bit words.
pub fn words_for_pixels(pixels: usize, sample_bits: u16) -> usize {
    let bits = pixels * sample_bits as usize;
    bits.div_ceil(64)
}
