use thiserror::Error;
use tlpflow::SimError;

/// Error from constructing a lookup-table backend.
#[allow(missing_docs)]
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TableError {
    #[error("window size {0:#x} is not a power of two")]
    WindowNotPowerOfTwo(u32),
    #[error("offset {0:#x} is not DWORD aligned")]
    Unaligned(u32),
    #[error("offset {offset:#x} is outside the {window:#x}-byte window")]
    OutOfWindow { offset: u32, window: u32 },
    #[error("offset {0:#x} is defined twice")]
    Duplicate(u32),
}

/// Error from constructing a memory backend.
#[allow(missing_docs)]
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MemoryError {
    #[error("memory size {0:#x} is not a power of two of at least 4 bytes")]
    Size(usize),
}

/// Error from the BAR controller.
#[allow(missing_docs)]
#[allow(variant_size_differences)]
#[derive(Debug, Error)]
pub enum BarError {
    #[error("BAR slot {0} does not exist")]
    SlotOutOfRange(usize),
    #[error("BAR slots {slots:?} responded in the same cycle {cycle}")]
    ResponseConflict { slots: Vec<usize>, cycle: u64 },
    #[error("table error: {0}")]
    Table(#[from] TableError),
    #[error("memory error: {0}")]
    Memory(#[from] MemoryError),
    #[error("simulation error: {0}")]
    Sim(#[from] SimError),
}
