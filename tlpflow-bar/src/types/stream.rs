//! TLP stream.

use tlpflow::Signal;
use tlpflow_std::priority_encode;

use crate::constants::stream::*;

/// One beat of the 128-bit TLP stream.
///
/// DWORD 0 of the packet occupies `data[0]`. Header DWORDs carry their value as is; payload
/// DWORDs are in wire byte order.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Signal)]
pub struct StreamBeat {
    /// Four DWORDs.
    pub data: [u32; DWORDS],
    /// Valid DWORDs. Meaningful only on the last beat of a packet.
    #[member(width = 4)]
    pub keep: u8,
    /// This beat starts a packet.
    pub first: bool,
    /// This beat ends a packet.
    pub last: bool,
    /// One-hot BAR select, valid on the first beat of a packet hitting a BAR.
    #[member(width = 7)]
    pub bar: u8,
}

impl StreamBeat {
    /// Creates a beat that hits no BAR.
    pub fn new(data: [u32; DWORDS], keep: u8, first: bool, last: bool) -> Self {
        Self { data, keep: keep & 0xF, first, last, bar: 0 }
    }

    /// Returns the beat with the BAR select set to hit `index`.
    pub fn with_bar(self, index: usize) -> Self { Self { bar: if index < BAR_WIDTH { 1 << index } else { 0 }, ..self } }

    /// Returns the `i`-th DWORD.
    pub fn dw(&self, i: usize) -> u32 { self.data[i] }

    /// Returns whether the `i`-th DWORD is valid.
    pub fn keeps(&self, i: usize) -> bool { i < KEEP_WIDTH && (self.keep >> i) & 1 == 1 }

    /// Returns the number of valid DWORDs.
    pub fn kept(&self) -> usize { (self.keep & 0xF).count_ones() as usize }

    /// Returns the index of the BAR this beat hits, if any.
    pub fn bar_index(&self) -> Option<usize> {
        let one_hot = (0..BAR_WIDTH).map(|i| (self.bar >> i) & 1 == 1).collect::<Vec<_>>();
        priority_encode(&one_hot)
    }
}
