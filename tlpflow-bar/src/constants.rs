//! Constants for the BAR controller modules.

use static_assertions::*;

// Constants for the TLP stream.
pub mod stream {
    pub const DATA_WIDTH: usize = 128;
    pub const DWORDS: usize = DATA_WIDTH / 32;
    pub const KEEP_WIDTH: usize = DWORDS;
    pub const BAR_WIDTH: usize = 7;
    /// Width of a beat: data, keep, first, last, bar.
    pub const BEAT_WIDTH: usize = DATA_WIDTH + KEEP_WIDTH + 2 + BAR_WIDTH;
}

// Constants for the TLP header.
pub mod tlp {
    /// Largest payload of a request in DWORDs. A length field of 0 encodes this.
    pub const MAX_DWLEN: u16 = 1024;
    /// Largest beat count of a write: one header beat and 1024 payload DWORDs.
    pub const MAX_WRITE_BEATS: usize = 1 + MAX_DWLEN as usize / super::stream::DWORDS;
    /// Fmt/type of a completion with data.
    pub const CPLD_DW0: u32 = 0x4A00_0000;
}

// Constants for `bar_mux`.
pub mod bar_mux {
    pub const SLOTS: usize = 7;
    pub const INDEX_WIDTH: usize = 3;
}

// Constants for `wr_engine`.
pub mod wr_engine {
    pub const FIFO_DEPTH: usize = 512;
    /// A new write packet is admitted only while the FIFO holds at most this many beats.
    pub const FIFO_PROG_EMPTY: usize = 64;
}

// Constants for `rd_engine`.
pub mod rd_engine {
    pub const REQ_FIFO_DEPTH: usize = 16;
    /// Largest completion in DWORDs, also its alignment.
    pub const MAX_CPL_DWLEN: u16 = 32;
    pub const OUT_FIFO_DEPTH: usize = 512;
    /// Stage 3 issues requests only while the output FIFO holds at most this many beats.
    pub const OUT_FIFO_PROG_EMPTY: usize = 256;
    /// Largest backend latency the output FIFO can absorb after stage 3 stops.
    pub const MAX_BACKEND_LATENCY: usize = 64;
}

// Constants for `backends`.
pub mod backends {
    pub const LATENCY: usize = 2;
    pub const MEMORY_SIZE: usize = 4096;
}

const_assert_eq!(stream::BEAT_WIDTH, 141);
const_assert!(bar_mux::SLOTS <= 1 << bar_mux::INDEX_WIDTH);
const_assert!(wr_engine::FIFO_DEPTH >= wr_engine::FIFO_PROG_EMPTY + tlp::MAX_WRITE_BEATS);
const_assert!(rd_engine::OUT_FIFO_DEPTH >= rd_engine::OUT_FIFO_PROG_EMPTY + rd_engine::MAX_BACKEND_LATENCY + 2);
const_assert!((rd_engine::MAX_CPL_DWLEN as usize).is_power_of_two());
const_assert!(backends::MEMORY_SIZE.is_power_of_two());
