// src/hal/simulator.rs
//! In-memory FPGA bus simulator
//!
//! Backs the whole register file with a map and each DMA FIFO with a queue,
//! so resolution, composition and streaming can be exercised without
//! hardware. Supports fault injection per address and counts every bus
//! operation, which the tests use to prove that out-of-range channel access
//! never reaches the driver.

use parking_lot::{Mutex, RwLock};
use rand::Rng;
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::{Duration, Instant};

use crate::hal::traits::FpgaBus;
use crate::hal::types::{BusError, BusResult};

/// Driver fault code the simulator reports for injected faults.
pub const SIM_FAULT_CODE: i32 = -61141;

const POLL_INTERVAL: Duration = Duration::from_millis(1);

#[derive(Debug, Default)]
struct FifoState {
    queue: VecDeque<u64>,
    depth_words: usize,
    started: bool,
}

/// Simulated FPGA session.
///
/// Register values are stored as raw 64-bit words; typed accessors truncate
/// or sign-extend the way a fixed-width hardware register would.
#[derive(Default)]
pub struct SimulatedBus {
    regs: RwLock<HashMap<u32, u64>>,
    arrays: RwLock<HashMap<u32, Vec<u64>>>,
    fifos: Mutex<HashMap<u32, FifoState>>,
    faults: Mutex<HashSet<u32>>,
    running: AtomicBool,
    closed: AtomicBool,
    ops: AtomicU64,
}

impl SimulatedBus {
    pub fn new() -> Self {
        Self::default()
    }

    // ---- test-harness controls -------------------------------------------

    /// Preload a scalar register with a raw word.
    pub fn load_raw(&self, addr: u32, value: u64) {
        self.regs.write().insert(addr, value);
    }

    pub fn load_bool(&self, addr: u32, value: bool) {
        self.load_raw(addr, value as u64);
    }

    pub fn load_u8(&self, addr: u32, value: u8) {
        self.load_raw(addr, value as u64);
    }

    pub fn load_u16(&self, addr: u32, value: u16) {
        self.load_raw(addr, value as u64);
    }

    pub fn load_i16(&self, addr: u32, value: i16) {
        self.load_raw(addr, value as u16 as u64);
    }

    pub fn load_u32(&self, addr: u32, value: u32) {
        self.load_raw(addr, value as u64);
    }

    pub fn load_i32(&self, addr: u32, value: i32) {
        self.load_raw(addr, value as u32 as u64);
    }

    pub fn load_u64(&self, addr: u32, value: u64) {
        self.load_raw(addr, value);
    }

    pub fn load_i64(&self, addr: u32, value: i64) {
        self.load_raw(addr, value as u64);
    }

    /// Preload an array register.
    pub fn load_u8_array(&self, addr: u32, values: &[u8]) {
        self.arrays
            .write()
            .insert(addr, values.iter().map(|&v| v as u64).collect());
    }

    pub fn load_u16_array(&self, addr: u32, values: &[u16]) {
        self.arrays
            .write()
            .insert(addr, values.iter().map(|&v| v as u64).collect());
    }

    /// Raw value last written to a register, if any. Lets tests assert on
    /// fire-and-forget writes.
    pub fn register(&self, addr: u32) -> Option<u64> {
        self.regs.read().get(&addr).copied()
    }

    /// Queue words on the device side of a FIFO.
    pub fn push_fifo(&self, fifo: u32, words: &[u64]) {
        let mut fifos = self.fifos.lock();
        let state = fifos.entry(fifo).or_default();
        state.queue.extend(words.iter().copied());
    }

    /// Queue `blocks` blocks of `block_words` pseudo-random sample words,
    /// the shape a free-running acquisition would produce.
    pub fn push_sample_blocks(&self, fifo: u32, blocks: usize, block_words: usize) {
        let mut rng = rand::thread_rng();
        let words: Vec<u64> = (0..blocks * block_words)
            .map(|_| rng.gen::<u32>() as u64)
            .collect();
        self.push_fifo(fifo, &words);
    }

    /// Words currently queued on a FIFO.
    pub fn fifo_len(&self, fifo: u32) -> usize {
        self.fifos
            .lock()
            .get(&fifo)
            .map(|s| s.queue.len())
            .unwrap_or(0)
    }

    /// Make every operation touching `addr` fail with a driver fault.
    pub fn inject_fault(&self, addr: u32) {
        self.faults.lock().insert(addr);
    }

    /// Remove an injected fault.
    pub fn clear_fault(&self, addr: u32) {
        self.faults.lock().remove(&addr);
    }

    /// Total bus operations issued so far.
    pub fn op_count(&self) -> u64 {
        self.ops.load(Ordering::Relaxed)
    }

    /// Whether `run` has been called.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Relaxed)
    }

    /// Whether `close` has been called.
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Relaxed)
    }

    // ---- internals -------------------------------------------------------

    fn touch(&self, addr: u32) -> BusResult<()> {
        self.ops.fetch_add(1, Ordering::Relaxed);
        if self.faults.lock().contains(&addr) {
            return Err(BusError::fault(
                SIM_FAULT_CODE,
                format!("simulated fault at address {addr:#x}"),
            ));
        }
        Ok(())
    }

    fn read_raw(&self, addr: u32) -> BusResult<u64> {
        self.touch(addr)?;
        let value = self.regs.read().get(&addr).copied();
        match value {
            Some(v) => Ok(v),
            #[cfg(feature = "strict_simulation")]
            None => Err(BusError::fault(
                SIM_FAULT_CODE,
                format!("read of unprogrammed register {addr:#x}"),
            )),
            #[cfg(not(feature = "strict_simulation"))]
            None => Ok(0),
        }
    }

    fn write_raw(&self, addr: u32, value: u64) -> BusResult<()> {
        self.touch(addr)?;
        self.regs.write().insert(addr, value);
        Ok(())
    }

    fn read_array_raw(&self, addr: u32, len: usize) -> BusResult<Vec<u64>> {
        self.touch(addr)?;
        let arrays = self.arrays.read();
        let mut values = arrays.get(&addr).cloned().unwrap_or_default();
        values.resize(len, 0);
        values.truncate(len);
        Ok(values)
    }
}

impl FpgaBus for SimulatedBus {
    fn read_bool(&self, addr: u32) -> BusResult<bool> {
        Ok(self.read_raw(addr)? != 0)
    }

    fn read_u8(&self, addr: u32) -> BusResult<u8> {
        Ok(self.read_raw(addr)? as u8)
    }

    fn read_i8(&self, addr: u32) -> BusResult<i8> {
        Ok(self.read_raw(addr)? as u8 as i8)
    }

    fn read_u16(&self, addr: u32) -> BusResult<u16> {
        Ok(self.read_raw(addr)? as u16)
    }

    fn read_i16(&self, addr: u32) -> BusResult<i16> {
        Ok(self.read_raw(addr)? as u16 as i16)
    }

    fn read_u32(&self, addr: u32) -> BusResult<u32> {
        Ok(self.read_raw(addr)? as u32)
    }

    fn read_i32(&self, addr: u32) -> BusResult<i32> {
        Ok(self.read_raw(addr)? as u32 as i32)
    }

    fn read_u64(&self, addr: u32) -> BusResult<u64> {
        self.read_raw(addr)
    }

    fn read_i64(&self, addr: u32) -> BusResult<i64> {
        Ok(self.read_raw(addr)? as i64)
    }

    fn write_bool(&self, addr: u32, value: bool) -> BusResult<()> {
        self.write_raw(addr, value as u64)
    }

    fn write_u8(&self, addr: u32, value: u8) -> BusResult<()> {
        self.write_raw(addr, value as u64)
    }

    fn write_u16(&self, addr: u32, value: u16) -> BusResult<()> {
        self.write_raw(addr, value as u64)
    }

    fn write_u32(&self, addr: u32, value: u32) -> BusResult<()> {
        self.write_raw(addr, value as u64)
    }

    fn write_i32(&self, addr: u32, value: i32) -> BusResult<()> {
        self.write_raw(addr, value as u32 as u64)
    }

    fn write_u64(&self, addr: u32, value: u64) -> BusResult<()> {
        self.write_raw(addr, value)
    }

    fn write_i64(&self, addr: u32, value: i64) -> BusResult<()> {
        self.write_raw(addr, value as u64)
    }

    fn read_u8_array(&self, addr: u32, len: usize) -> BusResult<Vec<u8>> {
        Ok(self
            .read_array_raw(addr, len)?
            .into_iter()
            .map(|v| v as u8)
            .collect())
    }

    fn read_u16_array(&self, addr: u32, len: usize) -> BusResult<Vec<u16>> {
        Ok(self
            .read_array_raw(addr, len)?
            .into_iter()
            .map(|v| v as u16)
            .collect())
    }

    fn run(&self) -> BusResult<()> {
        self.ops.fetch_add(1, Ordering::Relaxed);
        self.running.store(true, Ordering::Relaxed);
        Ok(())
    }

    fn close(&self, reset: bool) -> BusResult<()> {
        self.ops.fetch_add(1, Ordering::Relaxed);
        self.running.store(false, Ordering::Relaxed);
        self.closed.store(true, Ordering::Relaxed);
        if reset {
            self.fifos.lock().clear();
        }
        Ok(())
    }

    fn fifo_configure(&self, fifo: u32, depth_words: usize) -> BusResult<usize> {
        self.touch(fifo)?;
        let mut fifos = self.fifos.lock();
        let state = fifos.entry(fifo).or_default();
        state.depth_words = depth_words.next_power_of_two();
        Ok(state.depth_words)
    }

    fn fifo_start(&self, fifo: u32) -> BusResult<()> {
        self.touch(fifo)?;
        self.fifos.lock().entry(fifo).or_default().started = true;
        Ok(())
    }

    fn fifo_stop(&self, fifo: u32) -> BusResult<()> {
        self.touch(fifo)?;
        self.fifos.lock().entry(fifo).or_default().started = false;
        Ok(())
    }

    fn fifo_available(&self, fifo: u32) -> BusResult<usize> {
        self.touch(fifo)?;
        Ok(self
            .fifos
            .lock()
            .get(&fifo)
            .map(|s| s.queue.len())
            .unwrap_or(0))
    }

    fn fifo_read_u64(&self, fifo: u32, buf: &mut [u64], timeout: Duration) -> BusResult<()> {
        self.touch(fifo)?;
        if buf.is_empty() {
            return Ok(());
        }

        let deadline = Instant::now() + timeout;
        loop {
            {
                let mut fifos = self.fifos.lock();
                let state = fifos.entry(fifo).or_default();
                if state.queue.len() >= buf.len() {
                    for slot in buf.iter_mut() {
                        // Length was checked above
                        *slot = state.queue.pop_front().unwrap_or(0);
                    }
                    return Ok(());
                }
            }

            if Instant::now() >= deadline {
                return Err(BusError::Timeout);
            }
            std::thread::sleep(POLL_INTERVAL.min(deadline - Instant::now()));
        }
    }
}
