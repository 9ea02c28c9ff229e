// src/dma/mod.rs
//! DMA streaming engine
//!
//! Manages the device-to-host bulk channels: discovery and frame geometry,
//! the enable/sampling-rate controls, block- and image-granularity reads,
//! the shared overflow register and FIFO draining. Geometry is read
//! faithfully from the registers the image declares, never inferred from
//! sample counts.
//!
//! Operations on different channel indices are independent; operations on
//! the same channel must be serialized by the caller.

pub mod frame;

pub use frame::{words_for_pixels, FrameType, ImageHeader, IMAGE_HEADER_WORDS};

use std::sync::Arc;
use std::time::Duration;

use crate::catalog::ResourceCatalog;
use crate::config::DmaConfig;
use crate::error::{Result, RioError};
use crate::hal::{BusError, FpgaBus};
use crate::platform::Platform;
use crate::terminals::names;

/// One discovered bulk channel and its fixed geometry.
///
/// The overflow bit position in the shared register equals `index`.
#[derive(Debug, Clone)]
pub struct DmaChannel {
    pub index: usize,
    /// FIFO handle used for configure/start/stop/read.
    pub fifo: u32,
    /// Enable-gate register.
    pub enable: u32,
    /// Sampling-rate register.
    pub sampling_rate: u32,
    /// Signal channels multiplexed into this DMA.
    pub channels_per_dma: u16,
    pub frame_type: FrameType,
    /// Bits per sample as declared by the image.
    pub sample_bits: u16,
    /// Transfer words per block.
    pub block_words: u16,
}

/// Block-oriented streaming over the image's device-to-host FIFOs.
pub struct DmaDaq {
    bus: Arc<dyn FpgaBus>,
    channels: Vec<DmaChannel>,
    overflow_addr: u32,
    block_budget_words: usize,
    config: DmaConfig,
    armed: bool,
    granted_depths: Vec<usize>,
}

impl std::fmt::Debug for DmaDaq {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DmaDaq")
            .field("channels", &self.channels)
            .field("overflow_addr", &self.overflow_addr)
            .field("block_budget_words", &self.block_budget_words)
            .field("config", &self.config)
            .field("armed", &self.armed)
            .field("granted_depths", &self.granted_depths)
            .finish_non_exhaustive()
    }
}

impl DmaDaq {
    /// Discover the `DMATtoHOST` family and its geometry registers.
    ///
    /// The DMA group is only composed for profiles that mandate it, so a
    /// missing family or geometry register is a hard failure.
    pub(crate) fn new(
        catalog: &ResourceCatalog,
        bus: Arc<dyn FpgaBus>,
        platform: &Platform,
        config: DmaConfig,
    ) -> Result<Self> {
        let count = catalog.count_indexed(names::DMA_TTOHOST, platform.max_dma_channels);
        if count == 0 {
            return Err(RioError::missing_indexed(names::DMA_TTOHOST, 0));
        }

        let nch_addr = catalog.lookup(names::DMA_TTOHOST_NCH)?.address;
        let frame_type_addr = catalog.lookup(names::DMA_TTOHOST_FRAME_TYPE)?.address;
        let sample_size_addr = catalog.lookup(names::DMA_TTOHOST_SAMPLE_SIZE)?.address;
        let block_words_addr = catalog.lookup(names::DMA_TTOHOST_BLOCK_NWORDS)?.address;
        let overflow_addr = catalog.lookup(names::DMA_TTOHOST_OVERFLOWS)?.address;

        let nch = bus.read_u16_array(nch_addr, count)?;
        let frame_types = bus.read_u8_array(frame_type_addr, count)?;
        let sample_sizes = bus.read_u8_array(sample_size_addr, count)?;
        let block_words = bus.read_u16_array(block_words_addr, count)?;

        let mut channels = Vec::with_capacity(count);
        for n in 0..count {
            let fifo = catalog.lookup(&format!("{}{n}", names::DMA_TTOHOST))?.address;
            let enable = catalog
                .lookup(&format!("{}{n}", names::DMA_TTOHOST_ENABLE))?
                .address;
            let sampling_rate = catalog
                .lookup(&format!("{}{n}", names::DMA_TTOHOST_SAMPLING_RATE))?
                .address;

            let frame_type = FrameType::from_code(frame_types[n]).ok_or(
                RioError::UnsupportedFrameType {
                    channel: n,
                    value: frame_types[n],
                },
            )?;

            channels.push(DmaChannel {
                index: n,
                fifo,
                enable,
                sampling_rate,
                channels_per_dma: nch[n],
                frame_type,
                sample_bits: sample_sizes[n] as u16,
                block_words: block_words[n],
            });
        }

        tracing::debug!(count, "DMA channels discovered");

        Ok(Self {
            bus,
            channels,
            overflow_addr,
            block_budget_words: platform.dma_block_budget_words,
            config,
            armed: false,
            granted_depths: Vec::new(),
        })
    }

    /// Number of discovered channels.
    pub fn count(&self) -> usize {
        self.channels.len()
    }

    /// Fixed geometry of channel `n`.
    pub fn channel_info(&self, n: usize) -> Result<&DmaChannel> {
        self.channel(n)
    }

    pub fn block_words(&self, n: usize) -> Result<u16> {
        Ok(self.channel(n)?.block_words)
    }

    pub fn frame_type(&self, n: usize) -> Result<FrameType> {
        Ok(self.channel(n)?.frame_type)
    }

    pub fn sample_bits(&self, n: usize) -> Result<u16> {
        Ok(self.channel(n)?.sample_bits)
    }

    pub fn channels_per_dma(&self, n: usize) -> Result<u16> {
        Ok(self.channel(n)?.channels_per_dma)
    }

    /// Arm the engine: gate every channel off, configure and start its FIFO,
    /// then drain stale data left over from a previous run.
    ///
    /// Idempotent; a second call re-clears every FIFO.
    pub fn setup(&mut self) -> Result<()> {
        self.granted_depths.clear();

        for n in 0..self.channels.len() {
            let (fifo, enable, block_words) = {
                let ch = &self.channels[n];
                (ch.fifo, ch.enable, ch.block_words as usize)
            };
            self.bus.write_bool(enable, false)?;

            let depth = block_words.max(1) * self.config.host_buffer_blocks;
            let granted = self.bus.fifo_configure(fifo, depth)?;
            self.granted_depths.push(granted);

            self.bus.fifo_start(fifo)?;
        }

        self.armed = true;

        for n in 0..self.channels.len() {
            let chunk = (self.channels[n].block_words as usize).max(64);
            let mut scratch = vec![0u64; chunk];
            self.clean(n, &mut scratch)?;
        }

        tracing::info!(channels = self.channels.len(), "DMA engine armed");
        Ok(())
    }

    /// Host-side FIFO depth granted at setup for channel `n`.
    pub fn granted_depth(&self, n: usize) -> Result<usize> {
        self.channel(n)?;
        self.granted_depths
            .get(n)
            .copied()
            .ok_or(RioError::DmaNotArmed)
    }

    /// Whether channel `n`'s enable gate is set.
    pub fn enabled(&self, n: usize) -> Result<bool> {
        let ch = self.channel(n)?;
        Ok(self.bus.read_bool(ch.enable)?)
    }

    /// Gate channel `n` on or off.
    ///
    /// Enabling checks the platform's aggregate block budget against the
    /// gates currently set in hardware. Disabling is a plain write; the
    /// caller is responsible for draining the FIFO first.
    pub fn enable(&self, n: usize, value: bool) -> Result<()> {
        let ch = self.channel(n)?;

        if value {
            let mut requested = ch.block_words as usize;
            for other in &self.channels {
                if other.index != n && self.bus.read_bool(other.enable)? {
                    requested += other.block_words as usize;
                }
            }
            if requested > self.block_budget_words {
                return Err(RioError::DmaBudgetExceeded {
                    channel: n,
                    requested,
                    limit: self.block_budget_words,
                });
            }
        }

        Ok(self.bus.write_bool(ch.enable, value)?)
    }

    /// Current sampling-rate register value of channel `n`.
    pub fn sampling_rate(&self, n: usize) -> Result<i32> {
        let ch = self.channel(n)?;
        Ok(self.bus.read_i32(ch.sampling_rate)?)
    }

    /// Raw sampling-rate write. No range check or conversion is performed;
    /// the platform bounds exist only as informational accessors.
    pub fn set_sampling_rate(&self, n: usize, value: i32) -> Result<()> {
        let ch = self.channel(n)?;
        Ok(self.bus.write_i32(ch.sampling_rate, value)?)
    }

    /// Read whole blocks from channel `n` into `buf`.
    ///
    /// Without a timeout this is a best-effort poll: when fewer than
    /// `num_blocks` are queued nothing is read and 0 is returned. With a
    /// timeout the call waits up to the given duration and, on expiry,
    /// returns the whole blocks available at that point. The return value is
    /// counted in blocks and never lies strictly between 0 and `num_blocks`
    /// in the no-timeout path.
    ///
    /// A short read is a warning, not an error; the status surface reports
    /// it as such.
    ///
    /// Panics when `buf` cannot hold `num_blocks` blocks.
    pub fn read_blocks(
        &self,
        n: usize,
        num_blocks: usize,
        buf: &mut [u64],
        timeout: Option<Duration>,
    ) -> Result<usize> {
        let ch = self.channel(n)?;
        self.ensure_armed()?;

        let block_words = ch.block_words as usize;
        let words = num_blocks * block_words;
        assert!(
            buf.len() >= words,
            "buffer holds {} words, {num_blocks} blocks need {words}",
            buf.len()
        );
        if num_blocks == 0 {
            return Ok(0);
        }

        match timeout {
            None => {
                let available = self.bus.fifo_available(ch.fifo)?;
                if available < words {
                    return Ok(0);
                }
                self.bus
                    .fifo_read_u64(ch.fifo, &mut buf[..words], Duration::ZERO)?;
                Ok(num_blocks)
            }
            Some(timeout) => match self.bus.fifo_read_u64(ch.fifo, &mut buf[..words], timeout) {
                Ok(()) => Ok(num_blocks),
                Err(BusError::Timeout) => {
                    let available = self.bus.fifo_available(ch.fifo)?;
                    let whole = (available / block_words).min(num_blocks);
                    if whole < num_blocks {
                        tracing::warn!(
                            channel = n,
                            requested = num_blocks,
                            read = whole,
                            ?timeout,
                            "DMA read timed out with a partial result"
                        );
                    }
                    if whole == 0 {
                        return Ok(0);
                    }
                    let short = whole * block_words;
                    match self.bus.fifo_read_u64(ch.fifo, &mut buf[..short], Duration::ZERO) {
                        Ok(()) => Ok(whole),
                        Err(BusError::Timeout) => Ok(0),
                        Err(e) => Err(e.into()),
                    }
                }
                Err(e) => Err(e.into()),
            },
        }
    }

    /// Read one whole image of `image_size_pixels` from channel `n`.
    ///
    /// The whole-image rule mirrors the block rule: when a complete image is
    /// not queued nothing is read and 0 is returned, otherwise the pixel
    /// count. For [`FrameType::Framed`] channels the leading words carry the
    /// embedded header; decode it with [`ImageHeader::decode`].
    ///
    /// Panics when `buf` cannot hold the image.
    pub fn read_image(&self, n: usize, image_size_pixels: usize, buf: &mut [u64]) -> Result<usize> {
        let ch = self.channel(n)?;
        self.ensure_armed()?;

        let words = words_for_pixels(image_size_pixels, ch.sample_bits);
        assert!(
            buf.len() >= words,
            "buffer holds {} words, image needs {words}",
            buf.len()
        );
        if words == 0 {
            return Ok(0);
        }

        let available = self.bus.fifo_available(ch.fifo)?;
        if available < words {
            return Ok(0);
        }
        self.bus
            .fifo_read_u64(ch.fifo, &mut buf[..words], Duration::ZERO)?;
        Ok(image_size_pixels)
    }

    /// Raw overflow bitmask; bit `n` set means channel `n` lost data on the
    /// producer side. Interpretation is left to the caller.
    pub fn overflow(&self) -> Result<u32> {
        Ok(self.bus.read_u32(self.overflow_addr)?)
    }

    /// Whether channel `n`'s overflow bit is set.
    pub fn overflowed(&self, n: usize) -> Result<bool> {
        let ch = self.channel(n)?;
        Ok(self.overflow()? & (1u32 << ch.index) != 0)
    }

    /// Drain channel `n` with zero-timeout reads into `scratch` until its
    /// FIFO reports empty. Returns the words drained.
    ///
    /// Precondition: the channel's enable gate is already false. Draining a
    /// channel whose producer is still writing cannot converge; the pass cap
    /// turns that into [`RioError::DrainStalled`] instead of a hang.
    pub fn clean(&self, n: usize, scratch: &mut [u64]) -> Result<usize> {
        let ch = self.channel(n)?;
        self.ensure_armed()?;
        assert!(!scratch.is_empty(), "scratch buffer must not be empty");

        let mut drained = 0usize;
        for _ in 0..self.config.drain_max_passes {
            let available = self.bus.fifo_available(ch.fifo)?;
            if available == 0 {
                return Ok(drained);
            }
            let chunk = available.min(scratch.len());
            self.bus
                .fifo_read_u64(ch.fifo, &mut scratch[..chunk], Duration::ZERO)?;
            drained += chunk;
        }

        Err(RioError::DrainStalled {
            channel: n,
            passes: self.config.drain_max_passes,
        })
    }

    /// Disarm the engine: gate every channel off, stop its FIFO and drop the
    /// host-side bookkeeping. Best-effort and idempotent; failures are
    /// logged, never raised, since this runs during teardown.
    pub fn teardown(&mut self) {
        for ch in &self.channels {
            if let Err(e) = self.bus.write_bool(ch.enable, false) {
                tracing::warn!(channel = ch.index, error = %e, "failed to gate DMA channel off");
            }
            if let Err(e) = self.bus.fifo_stop(ch.fifo) {
                tracing::warn!(channel = ch.index, error = %e, "failed to stop DMA FIFO");
            }
        }
        self.granted_depths.clear();
        self.armed = false;
    }

    fn channel(&self, n: usize) -> Result<&DmaChannel> {
        self.channels
            .get(n)
            .ok_or_else(|| RioError::missing_indexed(names::DMA_TTOHOST, n))
    }

    fn ensure_armed(&self) -> Result<()> {
        if self.armed {
            Ok(())
        } else {
            Err(RioError::DmaNotArmed)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::FpgaType;
    use crate::hal::simulator::SimulatedBus;
    use crate::platform::PlatformKind;

    const NCH_ADDR: u32 = 0x1300;
    const FRAME_TYPE_ADDR: u32 = 0x1304;
    const SAMPLE_SIZE_ADDR: u32 = 0x1308;
    const BLOCK_NWORDS_ADDR: u32 = 0x130C;
    const OVERFLOW_ADDR: u32 = 0x1310;

    fn fifo_addr(n: usize) -> u32 {
        0x1000 + n as u32
    }

    fn enable_addr(n: usize) -> u32 {
        0x1100 + 4 * n as u32
    }

    fn rate_addr(n: usize) -> u32 {
        0x1200 + 4 * n as u32
    }

    fn dma_catalog(channels: usize) -> ResourceCatalog {
        let mut builder = ResourceCatalog::builder()
            .indicator_array(names::DMA_TTOHOST_NCH, NCH_ADDR, FpgaType::U16)
            .indicator_array(names::DMA_TTOHOST_FRAME_TYPE, FRAME_TYPE_ADDR, FpgaType::U8)
            .indicator_array(names::DMA_TTOHOST_SAMPLE_SIZE, SAMPLE_SIZE_ADDR, FpgaType::U8)
            .indicator_array(names::DMA_TTOHOST_BLOCK_NWORDS, BLOCK_NWORDS_ADDR, FpgaType::U16)
            .indicator(names::DMA_TTOHOST_OVERFLOWS, OVERFLOW_ADDR, FpgaType::U32);
        for n in 0..channels {
            builder = builder
                .dma_fifo(&format!("DMATtoHOST{n}"), fifo_addr(n))
                .control(&format!("DMATtoHOSTEnable{n}"), enable_addr(n), FpgaType::Bool)
                .control(&format!("DMATtoHOSTSamplingRate{n}"), rate_addr(n), FpgaType::I32);
        }
        builder.build()
    }

    fn geometry(bus: &SimulatedBus, channels: usize, block_words: u16) {
        bus.load_u16_array(NCH_ADDR, &vec![4u16; channels]);
        bus.load_u8_array(FRAME_TYPE_ADDR, &vec![0u8; channels]);
        bus.load_u8_array(SAMPLE_SIZE_ADDR, &vec![16u8; channels]);
        bus.load_u16_array(BLOCK_NWORDS_ADDR, &vec![block_words; channels]);
    }

    fn engine(channels: usize, block_words: u16) -> (Arc<SimulatedBus>, DmaDaq) {
        let bus = Arc::new(SimulatedBus::new());
        geometry(&bus, channels, block_words);
        let platform = Platform::limits_for(PlatformKind::FlexRio);
        let daq = DmaDaq::new(
            &dma_catalog(channels),
            bus.clone(),
            &platform,
            DmaConfig::default(),
        )
        .unwrap();
        (bus, daq)
    }

    fn armed_engine(channels: usize, block_words: u16) -> (Arc<SimulatedBus>, DmaDaq) {
        let (bus, mut daq) = engine(channels, block_words);
        daq.setup().unwrap();
        (bus, daq)
    }

    #[test]
    fn test_discovery_reads_declared_geometry() {
        let (_bus, daq) = engine(3, 128);

        assert_eq!(daq.count(), 3);
        assert_eq!(daq.block_words(1).unwrap(), 128);
        assert_eq!(daq.frame_type(0).unwrap(), FrameType::Raw);
        assert_eq!(daq.sample_bits(2).unwrap(), 16);
        assert_eq!(daq.channels_per_dma(0).unwrap(), 4);
    }

    #[test]
    fn test_missing_geometry_register_fails() {
        let catalog = ResourceCatalog::builder()
            .dma_fifo("DMATtoHOST0", fifo_addr(0))
            .build();
        let bus = Arc::new(SimulatedBus::new());
        let platform = Platform::limits_for(PlatformKind::FlexRio);

        match DmaDaq::new(&catalog, bus, &platform, DmaConfig::default()) {
            Err(RioError::ResourceNotFound(name)) => {
                assert_eq!(name, names::DMA_TTOHOST_NCH)
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_unknown_frame_type_fails() {
        let bus = Arc::new(SimulatedBus::new());
        geometry(&bus, 1, 16);
        bus.load_u8_array(FRAME_TYPE_ADDR, &[9]);
        let platform = Platform::limits_for(PlatformKind::FlexRio);

        match DmaDaq::new(&dma_catalog(1), bus, &platform, DmaConfig::default()) {
            Err(RioError::UnsupportedFrameType { channel, value }) => {
                assert_eq!(channel, 0);
                assert_eq!(value, 9);
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_setup_gates_off_and_clears_stale_data() {
        let (bus, mut daq) = engine(2, 8);

        bus.load_bool(enable_addr(0), true);
        bus.push_fifo(fifo_addr(0), &[1, 2, 3, 4, 5]);

        daq.setup().unwrap();

        assert_eq!(bus.register(enable_addr(0)), Some(0));
        assert_eq!(bus.fifo_len(fifo_addr(0)), 0);
        assert!(daq.granted_depth(0).unwrap() >= 8 * DmaConfig::default().host_buffer_blocks);

        // Second setup is legal and re-clears.
        bus.push_fifo(fifo_addr(1), &[9; 3]);
        daq.setup().unwrap();
        assert_eq!(bus.fifo_len(fifo_addr(1)), 0);
    }

    #[test]
    fn test_streaming_requires_setup() {
        let (_bus, daq) = engine(1, 8);
        let mut buf = [0u64; 8];

        assert!(matches!(
            daq.read_blocks(0, 1, &mut buf, None),
            Err(RioError::DmaNotArmed)
        ));
        assert!(matches!(
            daq.clean(0, &mut buf),
            Err(RioError::DmaNotArmed)
        ));
    }

    #[test]
    fn test_out_of_range_channel_makes_no_driver_call() {
        let (bus, daq) = armed_engine(2, 8);
        let before = bus.op_count();

        let mut buf = [0u64; 8];
        match daq.read_blocks(5, 1, &mut buf, None) {
            Err(RioError::ResourceNotFound(name)) => assert_eq!(name, "DMATtoHOST5"),
            other => panic!("unexpected result: {other:?}"),
        }
        assert!(daq.set_sampling_rate(2, 1).is_err());
        assert_eq!(bus.op_count(), before);
    }

    #[test]
    fn test_enable_writes_gate_and_budget_allows() {
        let (bus, daq) = armed_engine(2, 8);

        daq.enable(0, true).unwrap();
        assert_eq!(bus.register(enable_addr(0)), Some(1));
        assert!(daq.enabled(0).unwrap());

        daq.enable(0, false).unwrap();
        assert_eq!(bus.register(enable_addr(0)), Some(0));
    }

    #[test]
    fn test_enable_rejects_budget_overrun() {
        // FlexRIO budget is 8192 words; two 8000-word channels exceed it.
        let (_bus, daq) = armed_engine(2, 8000);

        daq.enable(0, true).unwrap();
        match daq.enable(1, true) {
            Err(RioError::DmaBudgetExceeded {
                channel,
                requested,
                limit,
            }) => {
                assert_eq!(channel, 1);
                assert_eq!(requested, 16000);
                assert_eq!(limit, 8192);
            }
            other => panic!("unexpected result: {other:?}"),
        }

        // Disabling channel 0 frees the budget.
        daq.enable(0, false).unwrap();
        daq.enable(1, true).unwrap();
    }

    #[test]
    fn test_sampling_rate_is_raw() {
        let (bus, daq) = armed_engine(1, 8);

        daq.set_sampling_rate(0, -5).unwrap();
        assert_eq!(daq.sampling_rate(0).unwrap(), -5);
        assert_eq!(bus.register(rate_addr(0)), Some((-5i32) as u32 as u64));
    }

    #[test]
    fn test_read_blocks_all_or_nothing_without_timeout() {
        let (bus, daq) = armed_engine(3, 8);

        // Scenario: channel 2 holds 4 blocks, caller asks for 5.
        bus.push_sample_blocks(fifo_addr(2), 4, 8);
        let mut buf = vec![0u64; 5 * 8];
        assert_eq!(daq.read_blocks(2, 5, &mut buf, None).unwrap(), 0);
        assert!(buf.iter().all(|&w| w == 0), "buffer must stay unmodified");
        assert_eq!(bus.fifo_len(fifo_addr(2)), 32, "nothing consumed");

        // Asking for what is queued reads it all.
        assert_eq!(daq.read_blocks(2, 4, &mut buf, None).unwrap(), 4);
        assert_eq!(bus.fifo_len(fifo_addr(2)), 0);
    }

    #[test]
    fn test_read_blocks_timeout_returns_whole_blocks_available() {
        let (bus, daq) = armed_engine(1, 8);

        // 2 whole blocks plus a partial third are queued.
        bus.push_fifo(fifo_addr(0), &[7u64; 2 * 8 + 3]);
        let mut buf = vec![0u64; 5 * 8];

        let read = daq
            .read_blocks(0, 5, &mut buf, Some(Duration::from_millis(20)))
            .unwrap();
        assert_eq!(read, 2);
        assert!(buf[..16].iter().all(|&w| w == 7));
        // The partial block stays queued.
        assert_eq!(bus.fifo_len(fifo_addr(0)), 3);
    }

    #[test]
    fn test_read_blocks_timeout_satisfied_by_late_data() {
        let (bus, daq) = armed_engine(1, 4);
        let producer = bus.clone();

        let handle = std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(10));
            producer.push_fifo(fifo_addr(0), &[1u64; 8]);
        });

        let mut buf = vec![0u64; 8];
        let read = daq
            .read_blocks(0, 2, &mut buf, Some(Duration::from_millis(500)))
            .unwrap();
        assert_eq!(read, 2);
        handle.join().unwrap();
    }

    #[test]
    fn test_read_image_whole_image_rule() {
        let bus = Arc::new(SimulatedBus::new());
        geometry(&bus, 1, 8);
        // Framed image channel, 16-bit pixels.
        bus.load_u8_array(FRAME_TYPE_ADDR, &[1]);
        let platform = Platform::limits_for(PlatformKind::FlexRio);
        let mut daq = DmaDaq::new(
            &dma_catalog(1),
            bus.clone(),
            &platform,
            DmaConfig::default(),
        )
        .unwrap();
        daq.setup().unwrap();

        // 64 pixels at 16 bits = 16 words; queue one word short.
        let mut buf = vec![0u64; 16];
        bus.push_fifo(fifo_addr(0), &[0u64; 15]);
        assert_eq!(daq.read_image(0, 64, &mut buf).unwrap(), 0);

        // Complete the image with a header in the leading words.
        let mut payload = vec![0xAAu64; 1];
        payload[0] = 42; // frame counter
        payload.push(1_000_000); // timestamp
        payload.extend(vec![0xBBu64; 14]);
        // Drain the earlier partial words first.
        let mut scratch = vec![0u64; 64];
        daq.clean(0, &mut scratch).unwrap();
        bus.push_fifo(fifo_addr(0), &payload);

        assert_eq!(daq.read_image(0, 64, &mut buf).unwrap(), 64);
        let header = ImageHeader::decode(&buf).unwrap();
        assert_eq!(header.frame_counter, 42);
        assert_eq!(header.timestamp_ticks, 1_000_000);
    }

    #[test]
    fn test_overflow_bitmask_per_channel() {
        let (bus, daq) = armed_engine(3, 8);

        bus.load_u32(OVERFLOW_ADDR, 0b100);
        assert_eq!(daq.overflow().unwrap(), 0b100);
        assert!(!daq.overflowed(0).unwrap());
        assert!(!daq.overflowed(1).unwrap());
        assert!(daq.overflowed(2).unwrap());
    }

    #[test]
    fn test_clean_drains_until_empty() {
        let (bus, daq) = armed_engine(1, 8);
        bus.push_fifo(fifo_addr(0), &[3u64; 37]);

        let mut scratch = vec![0u64; 16];
        assert_eq!(daq.clean(0, &mut scratch).unwrap(), 37);
        assert_eq!(bus.fifo_len(fifo_addr(0)), 0);

        // Cleaning an empty FIFO terminates immediately.
        assert_eq!(daq.clean(0, &mut scratch).unwrap(), 0);
    }

    #[test]
    fn test_clean_pass_cap_reports_stall() {
        let bus = Arc::new(SimulatedBus::new());
        geometry(&bus, 1, 8);
        let platform = Platform::limits_for(PlatformKind::FlexRio);
        let config = DmaConfig {
            drain_max_passes: 2,
            ..DmaConfig::default()
        };
        let mut daq =
            DmaDaq::new(&dma_catalog(1), bus.clone(), &platform, config).unwrap();
        daq.setup().unwrap();

        bus.push_fifo(fifo_addr(0), &[1u64; 100]);
        let mut scratch = vec![0u64; 1];
        match daq.clean(0, &mut scratch) {
            Err(RioError::DrainStalled { channel, passes }) => {
                assert_eq!(channel, 0);
                assert_eq!(passes, 2);
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_teardown_is_best_effort_and_idempotent() {
        let (bus, mut daq) = armed_engine(2, 8);
        daq.enable(0, true).unwrap();

        // A faulted gate must not abort teardown of the other channel.
        bus.inject_fault(enable_addr(0));
        daq.teardown();
        assert_eq!(bus.register(enable_addr(1)), Some(0));

        daq.teardown();

        let mut buf = [0u64; 8];
        assert!(matches!(
            daq.read_blocks(0, 1, &mut buf, None),
            Err(RioError::DmaNotArmed)
        ));
    }
}
