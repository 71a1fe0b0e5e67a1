use std::any::Any;
use std::collections::BTreeMap;

use tlpflow_std::DelayLine;
use tracing::trace;

use super::BarBackend;
use crate::constants::backends::LATENCY;
use crate::error::TableError;
use crate::types::{ReadRequest, ReadResponse, WriteRequest};

/// Static lookup table.
///
/// A read at `addr` returns the entry at `(addr - (base & !0xF)) mod window`, or 0 if the table
/// has no entry there. Writes are accepted and have no effect.
#[derive(Debug, Clone)]
pub struct TableBar {
    base: u32,
    window: u32,
    entries: BTreeMap<u32, u32>,
    pipe: DelayLine<ReadResponse, LATENCY>,
    ignored_writes: u64,
    cycles: u64,
}

impl TableBar {
    /// Creates a table over a window of `window` bytes. Entries are `(offset, value)` pairs.
    pub fn new<I>(base: u32, window: u32, entries: I) -> Result<Self, TableError>
    where I: IntoIterator<Item = (u32, u32)> {
        if !window.is_power_of_two() {
            return Err(TableError::WindowNotPowerOfTwo(window));
        }
        let mut table = BTreeMap::new();
        for (offset, value) in entries {
            if offset & 0x3 != 0 {
                return Err(TableError::Unaligned(offset));
            }
            if offset >= window {
                return Err(TableError::OutOfWindow { offset, window });
            }
            if table.insert(offset, value).is_some() {
                return Err(TableError::Duplicate(offset));
            }
        }
        Ok(Self { base, window, entries: table, pipe: DelayLine::new(), ignored_writes: 0, cycles: 0 })
    }

    /// Sets the BAR base address, as programmed in the configuration space.
    pub fn set_base(&mut self, base: u32) { self.base = base; }

    /// Returns the table offset `addr` maps to.
    pub fn offset(&self, addr: u32) -> u32 { addr.wrapping_sub(self.base & 0xFFFF_FFF0) & (self.window - 1) }

    /// Returns the value a read at `addr` returns.
    pub fn lookup(&self, addr: u32) -> u32 { self.entries.get(&self.offset(addr)).copied().unwrap_or(0) }

    /// Returns the number of writes received since the last reset.
    pub fn ignored_writes(&self) -> u64 { self.ignored_writes }

    /// Returns the number of cycles since the last reset.
    pub fn cycles(&self) -> u64 { self.cycles }
}

impl BarBackend for TableBar {
    fn name(&self) -> &'static str { "table" }

    fn latency(&self) -> Option<usize> { Some(LATENCY) }

    fn rd_rsp(&self) -> Option<ReadResponse> { self.pipe.output().copied() }

    fn tick(&mut self, wr: Option<&WriteRequest>, rd: Option<&ReadRequest>) {
        self.cycles += 1;
        if let Some(wr) = wr {
            trace!(addr = wr.addr, "table ignores write of {:#010x}", wr.data);
            self.ignored_writes += 1;
        }
        let rsp = rd.map(|rd| ReadResponse { ctx: rd.ctx, data: self.lookup(rd.addr) });
        self.pipe.tick(rsp);
    }

    fn reset(&mut self) {
        self.pipe.reset();
        self.ignored_writes = 0;
        self.cycles = 0;
    }

    fn as_any(&self) -> &dyn Any { self }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_bad_entries() {
        assert_eq!(TableBar::new(0, 0x3000, []).unwrap_err(), TableError::WindowNotPowerOfTwo(0x3000));
        assert_eq!(TableBar::new(0, 0x1000, [(0x2, 1)]).unwrap_err(), TableError::Unaligned(0x2));
        assert_eq!(
            TableBar::new(0, 0x1000, [(0x1000, 1)]).unwrap_err(),
            TableError::OutOfWindow { offset: 0x1000, window: 0x1000 }
        );
        assert_eq!(TableBar::new(0, 0x1000, [(0x4, 1), (0x4, 2)]).unwrap_err(), TableError::Duplicate(0x4));
    }

    #[test]
    fn reset_clears_counters() {
        let mut table = TableBar::new(0, 0x1000, [(0x0, 7)]).unwrap();
        table.tick(Some(&WriteRequest { addr: 0x0, be: 0xF, data: 1, bar: 2 }), None);
        assert_eq!((table.ignored_writes(), table.cycles()), (1, 1));
        table.reset();
        assert_eq!((table.ignored_writes(), table.cycles()), (0, 0));
        assert_eq!(table.lookup(0x0), 7);
    }

    #[test]
    fn offsets_from_masked_base() {
        let table = TableBar::new(0xF000_000C, 0x1000, [(0x0, 0xAAAA_AAAA), (0x4, 0x1234_5678)]).unwrap();
        assert_eq!(table.offset(0xF000_0004), 0x4);
        assert_eq!(table.lookup(0xF000_0004), 0x1234_5678);
        assert_eq!(table.lookup(0xF000_1004), 0x1234_5678);
        assert_eq!(table.lookup(0xF000_0008), 0);
    }
}
