use std::any::Any;

use tlpflow_std::DelayLine;
use tracing::trace;

use super::BarBackend;
use crate::constants::backends::{LATENCY, MEMORY_SIZE};
use crate::error::MemoryError;
use crate::types::{ReadRequest, ReadResponse, WriteRequest};

/// Zero-initialized read/write memory. Addresses wrap inside the window.
///
/// A read and a write in the same cycle return the old value.
#[derive(Debug, Clone)]
pub struct MemoryBar {
    words: Vec<u32>,
    pipe: DelayLine<ReadResponse, LATENCY>,
}

impl Default for MemoryBar {
    fn default() -> Self { Self { words: vec![0; MEMORY_SIZE / 4], pipe: DelayLine::new() } }
}

impl MemoryBar {
    /// Creates a memory of `size` bytes, which must be a power of two of at least 4.
    pub fn new(size: usize) -> Result<Self, MemoryError> {
        if size < 4 || !size.is_power_of_two() {
            return Err(MemoryError::Size(size));
        }
        Ok(Self { words: vec![0; size / 4], pipe: DelayLine::new() })
    }

    fn index(&self, addr: u32) -> usize { ((addr as usize) >> 2) & (self.words.len() - 1) }

    /// Returns the DWORD at `addr`.
    pub fn peek(&self, addr: u32) -> u32 { self.words[self.index(addr)] }

    /// Returns the size in bytes.
    pub fn size(&self) -> usize { self.words.len() * 4 }
}

impl BarBackend for MemoryBar {
    fn name(&self) -> &'static str { "memory" }

    fn latency(&self) -> Option<usize> { Some(LATENCY) }

    fn rd_rsp(&self) -> Option<ReadResponse> { self.pipe.output().copied() }

    fn tick(&mut self, wr: Option<&WriteRequest>, rd: Option<&ReadRequest>) {
        let rsp = rd.map(|rd| ReadResponse { ctx: rd.ctx, data: self.peek(rd.addr) });
        self.pipe.tick(rsp);

        if let Some(wr) = wr {
            let index = self.index(wr.addr);
            self.words[index] = wr.merge_into(self.words[index]);
            trace!(addr = wr.addr, be = wr.be, "memory[{:#x}] <= {:#010x}", index * 4, self.words[index]);
        }
    }

    fn reset(&mut self) { self.pipe.reset(); }

    fn as_any(&self) -> &dyn Any { self }
}
