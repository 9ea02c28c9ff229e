// src/hal/traits.rs
//! The vendor driver boundary
//!
//! Everything the crate does against real hardware funnels through this
//! trait: scalar register access at the widths the hardware description
//! declares, small array reads, and the FIFO primitives the DMA engine is
//! built on. All calls are synchronous; blocking is bounded by the timeout
//! handed to `fifo_read_u64` and by nothing else.

use std::time::Duration;

use crate::hal::types::BusResult;

/// Low-level register and FIFO access for one open FPGA session.
///
/// Implementations must be safe for concurrent calls on distinct FIFO
/// handles; callers serialize operations per channel.
pub trait FpgaBus: Send + Sync {
    // Scalar reads
    fn read_bool(&self, addr: u32) -> BusResult<bool>;
    fn read_u8(&self, addr: u32) -> BusResult<u8>;
    fn read_i8(&self, addr: u32) -> BusResult<i8>;
    fn read_u16(&self, addr: u32) -> BusResult<u16>;
    fn read_i16(&self, addr: u32) -> BusResult<i16>;
    fn read_u32(&self, addr: u32) -> BusResult<u32>;
    fn read_i32(&self, addr: u32) -> BusResult<i32>;
    fn read_u64(&self, addr: u32) -> BusResult<u64>;
    fn read_i64(&self, addr: u32) -> BusResult<i64>;

    // Scalar writes, fire-and-forget
    fn write_bool(&self, addr: u32, value: bool) -> BusResult<()>;
    fn write_u8(&self, addr: u32, value: u8) -> BusResult<()>;
    fn write_u16(&self, addr: u32, value: u16) -> BusResult<()>;
    fn write_u32(&self, addr: u32, value: u32) -> BusResult<()>;
    fn write_i32(&self, addr: u32, value: i32) -> BusResult<()>;
    fn write_u64(&self, addr: u32, value: u64) -> BusResult<()>;
    fn write_i64(&self, addr: u32, value: i64) -> BusResult<()>;

    /// Read `len` elements of a u8 array register.
    fn read_u8_array(&self, addr: u32, len: usize) -> BusResult<Vec<u8>>;

    /// Read `len` elements of a u16 array register.
    fn read_u16_array(&self, addr: u32, len: usize) -> BusResult<Vec<u16>>;

    /// Start the design loaded in the fabric.
    fn run(&self) -> BusResult<()>;

    /// Close the session, optionally resetting the fabric.
    fn close(&self, reset: bool) -> BusResult<()>;

    /// Set the host-side depth of a FIFO in transfer words. Returns the
    /// depth actually granted by the driver.
    fn fifo_configure(&self, fifo: u32, depth_words: usize) -> BusResult<usize>;

    /// Begin transferring on a FIFO.
    fn fifo_start(&self, fifo: u32) -> BusResult<()>;

    /// Stop transferring on a FIFO.
    fn fifo_stop(&self, fifo: u32) -> BusResult<()>;

    /// Transfer words currently queued on the host side of a FIFO.
    fn fifo_available(&self, fifo: u32) -> BusResult<usize>;

    /// Read exactly `buf.len()` words, waiting up to `timeout`.
    ///
    /// A zero timeout is a pure poll. Returns `BusError::Timeout` when the
    /// wait expires with fewer words queued; nothing is consumed in that
    /// case.
    fn fifo_read_u64(&self, fifo: u32, buf: &mut [u64], timeout: Duration) -> BusResult<()>;
}
