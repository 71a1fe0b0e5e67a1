//! Stage 2: splits reads into completions of at most 32 DWORDs that do not cross a 128-byte
//! boundary.

use tlpflow::{Fsm, Signal};
use tracing::trace;

use super::ingest::ReadDesc;
use crate::constants::rd_engine::MAX_CPL_DWLEN;

/// State of the split stage.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Signal)]
pub enum SplitPhase {
    /// Waits for a descriptor from stage 1.
    #[default]
    ReqData,
    /// Splits the rest of the current descriptor.
    Processing,
}

/// The part of a read served by one completion.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SubPacket {
    /// Address of the first DWORD.
    pub addr: u32,
    /// Length in DWORDs, 1 to 32.
    pub dwlen: u16,
    /// Remaining bytes of the read including this completion, 4096 encoded as 0.
    pub byte_count: u16,
    /// Requester ID.
    pub reqid: u16,
    /// Tag.
    pub tag: u8,
    /// BAR index.
    pub bar: u8,
    /// Byte enable of the first DWORD.
    pub be_first: u8,
    /// Byte enable of the last DWORD.
    pub be_last: u8,
}

/// Cuts the next completion off `rest`.
///
/// Returns the completion, what remains of the read, and the byte count of the remainder. The
/// address advances within the 4 KiB page.
pub fn split_next(rest: &ReadDesc, byte_count: u16, first_part: bool) -> (SubPacket, ReadDesc, u16) {
    let dwlen = if first_part {
        let offset = ((rest.addr >> 2) % u32::from(MAX_CPL_DWLEN)) as u16;
        (MAX_CPL_DWLEN - offset).min(rest.dwlen)
    } else {
        MAX_CPL_DWLEN.min(rest.dwlen)
    };
    let last_part = dwlen == rest.dwlen;

    let be_first = if first_part {
        rest.be_first
    } else if last_part && dwlen == 1 {
        rest.be_last
    } else {
        0xF
    };
    let be_last = if last_part { rest.be_last } else { 0xF };
    let sub = SubPacket {
        addr: rest.addr,
        dwlen,
        byte_count,
        reqid: rest.reqid,
        tag: rest.tag,
        bar: rest.bar,
        be_first,
        be_last,
    };

    let bytes = u32::from(dwlen) * 4;
    let addr = (rest.addr & !0xFFF) | (rest.addr.wrapping_add(bytes) & 0xFFF);
    let remainder = ReadDesc { addr, dwlen: rest.dwlen - dwlen, ..*rest };
    (sub, remainder, byte_count.wrapping_sub(bytes as u16) & 0xFFF)
}

/// Registers of the split stage.
#[derive(Debug, Default, Clone)]
pub struct SplitRegs {
    /// State.
    pub phase: SplitPhase,
    /// What remains of the current read.
    pub rest: ReadDesc,
    /// Byte count of `rest`.
    pub byte_count: u16,
    /// Output register, consumed by stage 3.
    pub out: Option<SubPacket>,
}

/// Transition function of the split stage.
///
/// The input is the head of the stage 1 FIFO and whether stage 3 takes the output register in this
/// cycle. The output pops the stage 1 FIFO.
#[derive(Debug, Default, Clone, Copy)]
pub struct SplitFsm;

impl Fsm for SplitFsm {
    type I = (Option<ReadDesc>, bool);
    type O = bool;
    type S = SplitRegs;

    fn init(&self) -> SplitRegs { SplitRegs::default() }

    fn logic(&self, (head, take): (Option<ReadDesc>, bool), regs: &SplitRegs) -> (bool, SplitRegs) {
        let mut next = regs.clone();
        if take {
            next.out = None;
        }
        if next.out.is_some() {
            return (false, next);
        }

        let (pop, (sub, rest, byte_count)) = match (regs.phase, head) {
            (SplitPhase::ReqData, Some(desc)) => (true, split_next(&desc, (desc.dwlen * 4) & 0xFFF, true)),
            (SplitPhase::ReqData, None) => return (false, next),
            (SplitPhase::Processing, _) => (false, split_next(&regs.rest, regs.byte_count, false)),
        };
        trace!(addr = sub.addr, dwlen = sub.dwlen, byte_count = sub.byte_count, "completion");
        next.phase = if rest.dwlen > 0 { SplitPhase::Processing } else { SplitPhase::ReqData };
        next.rest = rest;
        next.byte_count = byte_count;
        next.out = Some(sub);
        (pop, next)
    }
}
