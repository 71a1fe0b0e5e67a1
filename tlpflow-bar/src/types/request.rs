//! Requests and responses between the engines and the BAR backends.

use tlpflow::Signal;

/// Single-DWORD write to a BAR.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Signal)]
pub struct WriteRequest {
    /// DWORD-aligned byte address.
    pub addr: u32,
    /// Byte enable.
    #[member(width = 4)]
    pub be: u8,
    /// Data in backend byte order.
    pub data: u32,
    /// Target BAR.
    #[member(width = 3)]
    pub bar: u8,
}

impl WriteRequest {
    /// Returns `old` with the enabled bytes replaced by `data`.
    pub fn merge_into(&self, old: u32) -> u32 {
        let mask = (0..4u32).filter(|i| (self.be >> i) & 1 == 1).fold(0u32, |mask, i| mask | (0xFF << (8 * i)));
        (old & !mask) | (self.data & mask)
    }
}

/// Context of a DWORD read, echoed back by the backend.
///
/// It carries everything stage 4 of the read engine needs to build the completion, so the
/// backend never sees TLP fields. The packed layout (LSB first) is 88 bits wide.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Signal)]
pub struct ReadContext {
    /// DWORD-aligned byte address of this DWORD.
    pub addr: u32,
    /// Requester ID.
    pub reqid: u16,
    /// Tag.
    pub tag: u8,
    /// BAR index.
    #[member(width = 7)]
    pub bar: u8,
    /// Remaining DWORDs of the completion, including this one.
    #[member(width = 11)]
    pub dwlen: u16,
    /// Remaining bytes of the request, 4096 encoded as 0.
    #[member(width = 12)]
    pub byte_count: u16,
    /// Last DWORD of the completion.
    pub last: bool,
    /// First DWORD of the completion.
    pub first: bool,
}

impl ReadContext {
    /// Lower address field of the completion.
    pub fn lower_addr(&self) -> u32 { self.addr & 0x7F }
}

/// Single-DWORD read from a BAR.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Signal)]
pub struct ReadRequest {
    /// DWORD-aligned byte address.
    pub addr: u32,
    /// Byte enable. Only the edge DWORDs of a completion are partial.
    #[member(width = 4)]
    pub be: u8,
    /// Context to echo.
    pub ctx: ReadContext,
    /// Target BAR.
    #[member(width = 3)]
    pub bar: u8,
}

/// Response to a `ReadRequest`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Signal)]
pub struct ReadResponse {
    /// Context of the request, unmodified.
    pub ctx: ReadContext,
    /// Data in backend byte order.
    pub data: u32,
}
