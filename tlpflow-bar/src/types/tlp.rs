//! TLP headers: classification, request builders and completion parsing.
//!
//! Only the header fields the BAR controller looks at are modelled.

use paste::paste;
use tlpflow::field;

use super::stream::StreamBeat;
use crate::constants::tlp::*;

/// Header format: 3 or 4 DWORDs, with or without data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fmt {
    /// 3DW header, no data.
    Dw3NoData,
    /// 4DW header, no data.
    Dw4NoData,
    /// 3DW header with data.
    Dw3Data,
    /// 4DW header with data.
    Dw4Data,
}

impl Fmt {
    /// Decodes DW0[31:29]. Prefix formats are not supported.
    pub fn from_dw0(dw0: u32) -> Option<Self> {
        match field(dw0, 31, 29) {
            0b000 => Some(Self::Dw3NoData),
            0b001 => Some(Self::Dw4NoData),
            0b010 => Some(Self::Dw3Data),
            0b011 => Some(Self::Dw4Data),
            _ => None,
        }
    }

    /// Returns whether the header is 4 DWORDs long.
    pub fn is_4dw(self) -> bool { matches!(self, Self::Dw4NoData | Self::Dw4Data) }
}

macro_rules! request_kinds {
    ($($name:ident: $hi:literal..$lo:literal == $value:literal),* $(,)?) => {
        paste! {
            $(
                #[doc = "Returns whether `dw0` starts a `" $name "` request header."]
                pub const fn [<is_ $name>](dw0: u32) -> bool { field(dw0, $hi, $lo) == $value }
            )*
        }
    };
}

request_kinds! {
    mrd32: 31..25 == 0b000_0000,
    mrd64: 31..25 == 0b001_0000,
    iord: 31..24 == 0b0000_0010,
    mwr32: 31..25 == 0b010_0000,
    mwr64: 31..25 == 0b011_0000,
    iowr: 31..24 == 0b0100_0010,
}

/// Returns whether `dw0` starts a read the read engine serves. Locked reads are included.
pub const fn is_read_request(dw0: u32) -> bool { is_mrd32(dw0) || is_mrd64(dw0) || is_iord(dw0) }

/// Returns whether `dw0` starts a write the write engine serves.
pub const fn is_write_request(dw0: u32) -> bool { is_mwr32(dw0) || is_mwr64(dw0) || is_iowr(dw0) }

/// Returns the length field, with 0 decoded as 1024.
pub fn dwlen(dw0: u32) -> u16 {
    match field(dw0, 9, 0) {
        0 => MAX_DWLEN,
        len => len as u16,
    }
}

/// Returns `(be_first, be_last)` of a request header.
pub fn byte_enables(dw1: u32) -> (u8, u8) { (field(dw1, 3, 0) as u8, field(dw1, 7, 4) as u8) }

/// Request header fields used to build test and demo traffic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestHeader {
    /// Byte address. Only the low 32 bits reach the engines.
    pub addr: u64,
    /// Requester ID.
    pub reqid: u16,
    /// Tag.
    pub tag: u8,
    /// First DWORD byte enable.
    pub be_first: u8,
    /// Last DWORD byte enable.
    pub be_last: u8,
    /// BAR index the request hits.
    pub bar: usize,
}

impl Default for RequestHeader {
    fn default() -> Self { Self { addr: 0, reqid: 0, tag: 0, be_first: 0xF, be_last: 0xF, bar: 0 } }
}

macro_rules! request_builders {
    ($($bits:literal => $four_dw:literal),*) => {
        paste! {
            $(
                #[doc = "Builds a " $bits "-bit memory read of `dwlen` DWORDs."]
                pub fn [<mrd $bits>](&self, dwlen: u16) -> StreamBeat { self.read($four_dw, dwlen) }

                #[doc = "Builds a " $bits "-bit memory write of `payload`."]
                pub fn [<mwr $bits>](&self, payload: &[u32]) -> Vec<StreamBeat> { self.write($four_dw, payload) }
            )*
        }
    };
}

impl RequestHeader {
    /// Creates a header for a full-DWORD access at `addr` hitting `bar`.
    pub fn new(bar: usize, addr: u64) -> Self { Self { addr, bar, ..Default::default() } }

    /// Sets the byte enables.
    pub fn byte_enables(self, be_first: u8, be_last: u8) -> Self { Self { be_first, be_last, ..self } }

    /// Sets the requester ID and the tag.
    pub fn requester(self, reqid: u16, tag: u8) -> Self { Self { reqid, tag, ..self } }

    request_builders!(32 => false, 64 => true);

    fn dw1(&self) -> u32 {
        u32::from(self.reqid) << 16
            | u32::from(self.tag) << 8
            | u32::from(self.be_last & 0xF) << 4
            | u32::from(self.be_first & 0xF)
    }

    fn header(&self, dw0: u32, four_dw: bool) -> Vec<u32> {
        let mut header = vec![dw0, self.dw1()];
        if four_dw {
            header.push((self.addr >> 32) as u32);
        }
        header.push(self.addr as u32 & !0x3);
        header
    }

    fn read(&self, four_dw: bool, dwlen: u16) -> StreamBeat {
        let fmt = if four_dw { 0x2000_0000 } else { 0x0000_0000 };
        let header = self.header(fmt | (u32::from(dwlen) & 0x3FF), four_dw);
        let mut data = [0; 4];
        data[..header.len()].copy_from_slice(&header);
        StreamBeat::new(data, (1 << header.len()) - 1, true, true).with_bar(self.bar)
    }

    fn write(&self, four_dw: bool, payload: &[u32]) -> Vec<StreamBeat> {
        let fmt = if four_dw { 0x6000_0000 } else { 0x4000_0000 };
        let len = payload.len() as u32 & 0x3FF;
        let dws = self
            .header(fmt | len, four_dw)
            .into_iter()
            .chain(payload.iter().map(|dw| dw.swap_bytes()))
            .collect::<Vec<_>>();
        let beats = dws.chunks(4).count();
        dws.chunks(4)
            .enumerate()
            .map(|(i, chunk)| {
                let mut data = [0; 4];
                data[..chunk.len()].copy_from_slice(chunk);
                let beat = StreamBeat::new(data, (1 << chunk.len()) - 1, i == 0, i + 1 == beats);
                if i == 0 {
                    beat.with_bar(self.bar)
                } else {
                    beat
                }
            })
            .collect()
    }
}

/// Completion with data, parsed back from the egress stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    /// Length field in DWORDs.
    pub dwlen: u16,
    /// Completer ID.
    pub completer_id: u16,
    /// Completion status.
    pub status: u8,
    /// Byte count: remaining bytes of the request including this completion.
    pub byte_count: u16,
    /// Requester ID.
    pub reqid: u16,
    /// Tag.
    pub tag: u8,
    /// Lower address.
    pub lower_addr: u8,
    /// Payload in backend byte order.
    pub payload: Vec<u32>,
}

impl Completion {
    /// Parses one completion. `beats` must start with a first beat and end with a last beat.
    pub fn from_beats(beats: &[StreamBeat]) -> Option<Self> {
        let (head, _) = beats.split_first()?;
        if !head.first || !beats.last()?.last || field(head.dw(0), 31, 24) != CPLD_DW0 >> 24 {
            return None;
        }
        let payload = beats
            .iter()
            .enumerate()
            .flat_map(|(i, beat)| {
                let skip = if i == 0 { 3 } else { 0 };
                (skip..4).filter(move |&j| beat.keeps(j)).map(move |j| beat.dw(j).swap_bytes())
            })
            .collect();
        let (dw0, dw1, dw2) = (head.dw(0), head.dw(1), head.dw(2));
        Some(Self {
            dwlen: field(dw0, 9, 0) as u16,
            completer_id: field(dw1, 31, 16) as u16,
            status: field(dw1, 15, 13) as u8,
            byte_count: field(dw1, 11, 0) as u16,
            reqid: field(dw2, 31, 16) as u16,
            tag: field(dw2, 15, 8) as u8,
            lower_addr: field(dw2, 6, 0) as u8,
            payload,
        })
    }

    /// Splits a beat sequence at packet boundaries and parses every completion.
    pub fn parse_all(beats: &[StreamBeat]) -> Vec<Option<Self>> {
        let mut completions = Vec::new();
        let mut start = 0;
        for (i, beat) in beats.iter().enumerate() {
            if beat.last {
                completions.push(Self::from_beats(&beats[start..=i]));
                start = i + 1;
            }
        }
        completions
    }
}
