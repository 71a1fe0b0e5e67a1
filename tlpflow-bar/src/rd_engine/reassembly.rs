//! Stage 4: packs read responses into completion beats.

use tlpflow::Fsm;
use tracing::debug;

use crate::constants::tlp::CPLD_DW0;
use crate::types::{ReadResponse, StreamBeat};

/// Word being assembled.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ReassemblyRegs {
    /// DWORDs.
    pub data: [u32; 4],
    /// Filled DWORDs.
    pub keep: u8,
    /// The word starts a completion.
    pub first: bool,
    /// The word ends a completion.
    pub last: bool,
}

impl ReassemblyRegs {
    /// Returns whether the word goes to the output FIFO in this cycle.
    pub fn complete(&self) -> bool { self.last || self.keep == 0xF }

    fn beat(&self) -> StreamBeat { StreamBeat::new(self.data, self.keep, self.first, self.last) }
}

/// Transition function of the reassembly stage.
///
/// The input is the merged backend response of the cycle. The output is the word pushed to the
/// output FIFO.
#[derive(Debug, Default, Clone, Copy)]
pub struct ReassemblyFsm {
    /// Completer ID.
    pub pcie_id: u16,
}

impl ReassemblyFsm {
    /// Returns the three header DWORDs of the completion starting with `rsp`.
    pub fn header(&self, rsp: &ReadResponse) -> [u32; 3] {
        let ctx = &rsp.ctx;
        [
            CPLD_DW0 | u32::from(ctx.dwlen & 0x3FF),
            u32::from(self.pcie_id) << 16 | u32::from(ctx.byte_count & 0xFFF),
            u32::from(ctx.reqid) << 16 | u32::from(ctx.tag) << 8 | ctx.lower_addr(),
        ]
    }
}

impl Fsm for ReassemblyFsm {
    type I = Option<ReadResponse>;
    type O = Option<StreamBeat>;
    type S = ReassemblyRegs;

    fn init(&self) -> ReassemblyRegs { ReassemblyRegs::default() }

    fn logic(&self, rsp: Option<ReadResponse>, regs: &ReassemblyRegs) -> (Option<StreamBeat>, ReassemblyRegs) {
        let complete = regs.complete();
        let push = if complete { Some(regs.beat()) } else { None };
        let base = if complete { ReassemblyRegs::default() } else { *regs };

        let Some(rsp) = rsp else {
            return (push, base);
        };
        let data = rsp.data.swap_bytes();
        let next = if rsp.ctx.first {
            let [dw0, dw1, dw2] = self.header(&rsp);
            debug!(dw0, dw1, dw2, "completion");
            ReassemblyRegs { data: [dw0, dw1, dw2, data], keep: 0xF, first: true, last: rsp.ctx.last }
        } else {
            let slot = base.keep.count_ones() as usize;
            let mut next = base;
            next.data[slot] = data;
            next.keep |= 1 << slot;
            next.last = rsp.ctx.last;
            next
        };
        (push, next)
    }
}
