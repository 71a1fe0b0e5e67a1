//! Stage 1: parses memory read headers into descriptors.

use tracing::debug;

use crate::types::tlp::{byte_enables, dwlen, Fmt};
use crate::types::StreamBeat;

/// Read request descriptor.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ReadDesc {
    /// DWORD-aligned byte address.
    pub addr: u32,
    /// Length in DWORDs, 1 to 1024.
    pub dwlen: u16,
    /// Requester ID.
    pub reqid: u16,
    /// Tag.
    pub tag: u8,
    /// First DWORD byte enable.
    pub be_first: u8,
    /// Last DWORD byte enable.
    pub be_last: u8,
    /// BAR index.
    pub bar: u8,
}

impl ReadDesc {
    /// Parses the header beat of a read. The upper 32 address bits of a 4DW header are dropped.
    pub fn parse(beat: &StreamBeat) -> Self {
        let (dw0, dw1) = (beat.dw(0), beat.dw(1));
        let (be_first, be_last) = byte_enables(dw1);
        let four_dw = Fmt::from_dw0(dw0).map(Fmt::is_4dw).unwrap_or(false);
        let addr = (if four_dw { beat.dw(3) } else { beat.dw(2) }) & !0x3;
        let desc = Self {
            addr,
            dwlen: dwlen(dw0),
            reqid: (dw1 >> 16) as u16,
            tag: (dw1 >> 8) as u8,
            be_first,
            be_last,
            bar: beat.bar_index().unwrap_or(0) as u8,
        };
        debug!(addr = desc.addr, dwlen = desc.dwlen, tag = desc.tag, bar = desc.bar, "read");
        desc
    }
}
