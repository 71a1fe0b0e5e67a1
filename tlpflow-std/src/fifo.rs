//! Synchronous FIFO with one read port and one write port.

use std::fmt::Debug;

use tracing::trace;

/// Read port behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FifoMode {
    /// `rd_en` pops the head, which appears on `dout` in the next cycle for one cycle.
    Standard,
    /// The head is always visible on `dout`; `rd_en` acknowledges it.
    FirstWordFallThrough,
}

/// FIFO parameters.
#[derive(Debug, Clone, Copy)]
pub struct FifoConfig {
    /// Number of slots.
    pub depth: usize,
    /// `prog_empty` holds while the occupancy is at most this value.
    pub prog_empty_thresh: usize,
    /// `prog_full` holds while the occupancy is at least this value.
    pub prog_full_thresh: usize,
    /// Read port behavior.
    pub mode: FifoMode,
}

impl FifoConfig {
    /// Creates a config with thresholds at both ends of the FIFO.
    pub const fn new(depth: usize, mode: FifoMode) -> Self {
        Self { depth, prog_empty_thresh: 0, prog_full_thresh: depth, mode }
    }

    /// Sets the programmable empty threshold.
    pub const fn prog_empty(self, thresh: usize) -> Self { Self { prog_empty_thresh: thresh, ..self } }

    /// Sets the programmable full threshold.
    pub const fn prog_full(self, thresh: usize) -> Self { Self { prog_full_thresh: thresh, ..self } }
}

/// FIFO.
///
/// Within a tick the read is processed before the write, so a full FIFO accepts a write in the
/// cycle it is read.
#[derive(Debug, Clone)]
pub struct Fifo<V> {
    config: FifoConfig,
    slots: Vec<Option<V>>,
    rptr: usize,
    wptr: usize,
    count: usize,
    /// Output register of the standard read port.
    dout: Option<V>,
}

impl<V: Debug + Clone> Fifo<V> {
    /// Creates an empty FIFO.
    pub fn new(config: FifoConfig) -> Self {
        assert!(config.depth > 0, "FIFO depth must be nonzero");
        Self { config, slots: vec![None; config.depth], rptr: 0, wptr: 0, count: 0, dout: None }
    }

    /// Returns the config.
    pub fn config(&self) -> &FifoConfig { &self.config }

    /// Returns the number of stored entries.
    pub fn len(&self) -> usize { self.count }

    /// Returns whether the FIFO holds no entry.
    pub fn is_empty(&self) -> bool { self.count == 0 }

    /// Returns whether the FIFO holds `depth` entries.
    pub fn is_full(&self) -> bool { self.count == self.config.depth }

    /// Returns whether the occupancy is at most the programmable empty threshold.
    pub fn prog_empty(&self) -> bool { self.count <= self.config.prog_empty_thresh }

    /// Returns whether the occupancy is at least the programmable full threshold.
    pub fn prog_full(&self) -> bool { self.count >= self.config.prog_full_thresh }

    /// Returns the oldest entry.
    pub fn head(&self) -> Option<&V> {
        if self.is_empty() {
            None
        } else {
            self.slots[self.rptr].as_ref()
        }
    }

    /// Returns the read port output of the current cycle.
    pub fn dout(&self) -> Option<&V> {
        match self.config.mode {
            FifoMode::Standard => self.dout.as_ref(),
            FifoMode::FirstWordFallThrough => self.head(),
        }
    }

    fn pop(&mut self) -> Option<V> {
        if self.is_empty() {
            return None;
        }
        let value = self.slots[self.rptr].take();
        self.rptr = (self.rptr + 1) % self.config.depth;
        self.count -= 1;
        value
    }

    /// Advances one clock edge. Returns `false` if `write` was dropped because the FIFO was full.
    pub fn tick(&mut self, write: Option<V>, rd_en: bool) -> bool {
        match self.config.mode {
            FifoMode::Standard => self.dout = if rd_en { self.pop() } else { None },
            FifoMode::FirstWordFallThrough => {
                if rd_en {
                    let _ = self.pop();
                }
            }
        }

        let Some(value) = write else {
            return true;
        };
        if self.is_full() {
            trace!(depth = self.config.depth, "fifo full, dropping {:?}", value);
            return false;
        }
        self.slots[self.wptr] = Some(value);
        self.wptr = (self.wptr + 1) % self.config.depth;
        self.count += 1;
        true
    }

    /// Empties the FIFO.
    pub fn reset(&mut self) {
        self.slots.iter_mut().for_each(|slot| *slot = None);
        self.rptr = 0;
        self.wptr = 0;
        self.count = 0;
        self.dout = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_read_has_one_cycle_latency() {
        let mut fifo = Fifo::new(FifoConfig::new(4, FifoMode::Standard));
        assert!(fifo.tick(Some(1u32), false));
        assert!(fifo.tick(Some(2), false));
        assert_eq!(fifo.dout(), None);

        fifo.tick(None, true);
        assert_eq!(fifo.dout(), Some(&1));
        fifo.tick(None, false);
        assert_eq!(fifo.dout(), None);
        fifo.tick(None, true);
        assert_eq!(fifo.dout(), Some(&2));
        fifo.tick(None, true);
        assert_eq!(fifo.dout(), None);
        assert!(fifo.is_empty());
    }

    #[test]
    fn fwft_shows_head() {
        let mut fifo = Fifo::new(FifoConfig::new(2, FifoMode::FirstWordFallThrough));
        assert_eq!(fifo.dout(), None);
        fifo.tick(Some('a'), false);
        fifo.tick(Some('b'), false);
        assert!(fifo.is_full());
        assert!(!fifo.tick(Some('c'), false));
        assert_eq!(fifo.dout(), Some(&'a'));

        // Read and write in the same cycle while full.
        assert!(fifo.tick(Some('c'), true));
        assert_eq!(fifo.dout(), Some(&'b'));
        fifo.tick(None, true);
        assert_eq!(fifo.dout(), Some(&'c'));
        fifo.reset();
        assert_eq!(fifo.dout(), None);
    }

    #[test]
    fn programmable_thresholds() {
        let mut fifo = Fifo::new(FifoConfig::new(8, FifoMode::Standard).prog_empty(2).prog_full(6));
        assert!(fifo.prog_empty());
        for i in 0..3 {
            fifo.tick(Some(i), false);
        }
        assert!(!fifo.prog_empty());
        assert!(!fifo.prog_full());
        for i in 3..6 {
            fifo.tick(Some(i), false);
        }
        assert!(fifo.prog_full());
        assert_eq!(fifo.len(), 6);
    }
}
