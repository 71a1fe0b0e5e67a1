//! Stage 3: one read request per DWORD of a completion.

use tlpflow::{Fsm, Signal};
use tracing::trace;

use super::split::SubPacket;
use crate::types::{ReadContext, ReadRequest};

/// State of the fan-out stage.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Signal)]
pub enum FanoutPhase {
    /// Takes the next completion from stage 2 and issues its first DWORD.
    #[default]
    ReqData,
    /// Issues the remaining DWORDs.
    Processing,
}

/// Registers of the fan-out stage.
#[derive(Debug, Default, Clone)]
pub struct FanoutRegs {
    /// State.
    pub phase: FanoutPhase,
    /// Completion being issued.
    pub sub: SubPacket,
    /// Address of the next DWORD.
    pub addr: u32,
    /// DWORDs left, including the next one.
    pub remaining: u16,
    /// The next DWORD is the last of the completion.
    pub last: bool,
}

/// Output of the fan-out stage.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FanoutOutput {
    /// Read request of this cycle.
    pub rd_req: Option<ReadRequest>,
    /// Takes the output register of stage 2.
    pub take: bool,
}

/// Transition function of the fan-out stage.
///
/// The input is the output register of stage 2 and `rd3_enable`, which holds while the output
/// FIFO has room for the responses of every request in flight.
#[derive(Debug, Default, Clone, Copy)]
pub struct FanoutFsm;

fn request(sub: &SubPacket, addr: u32, remaining: u16, first: bool, last: bool, be: u8) -> ReadRequest {
    let ctx = ReadContext {
        addr,
        reqid: sub.reqid,
        tag: sub.tag,
        bar: sub.bar,
        dwlen: remaining,
        byte_count: sub.byte_count,
        last,
        first,
    };
    trace!(addr, be, first, last, "read DWORD");
    ReadRequest { addr, be, ctx, bar: sub.bar }
}

impl Fsm for FanoutFsm {
    type I = (Option<SubPacket>, bool);
    type O = FanoutOutput;
    type S = FanoutRegs;

    fn init(&self) -> FanoutRegs { FanoutRegs::default() }

    fn logic(&self, (sub, rd3_enable): (Option<SubPacket>, bool), regs: &FanoutRegs) -> (FanoutOutput, FanoutRegs) {
        let mut next = regs.clone();
        if !rd3_enable {
            return (FanoutOutput::default(), next);
        }

        match regs.phase {
            FanoutPhase::ReqData => {
                let Some(sub) = sub else {
                    return (FanoutOutput::default(), next);
                };
                let last = sub.dwlen == 1;
                let rd_req = request(&sub, sub.addr, sub.dwlen, true, last, sub.be_first);
                if !last {
                    next.phase = FanoutPhase::Processing;
                    next.addr = sub.addr.wrapping_add(4);
                    next.remaining = sub.dwlen - 1;
                    next.last = sub.dwlen == 2;
                }
                next.sub = sub;
                (FanoutOutput { rd_req: Some(rd_req), take: true }, next)
            }
            FanoutPhase::Processing => {
                let be = if regs.last { regs.sub.be_last } else { 0xF };
                let rd_req = request(&regs.sub, regs.addr, regs.remaining, false, regs.last, be);
                if regs.last {
                    next.phase = FanoutPhase::ReqData;
                } else {
                    next.addr = regs.addr.wrapping_add(4);
                    next.remaining = regs.remaining - 1;
                    next.last = regs.remaining == 2;
                }
                (FanoutOutput { rd_req: Some(rd_req), take: false }, next)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use tlpflow::{FsmModule, Module};

    use super::*;

    fn sub(addr: u32, dwlen: u16) -> SubPacket {
        SubPacket { addr, dwlen, byte_count: dwlen * 4, be_first: 0x3, be_last: 0xC, tag: 9, ..Default::default() }
    }

    #[test]
    fn one_request_per_dword() {
        let mut stage = FsmModule::new(FanoutFsm);
        let out = stage.tick((Some(sub(0x40, 3)), true));
        assert!(out.take);
        let mut reqs = vec![out.rd_req.unwrap()];
        reqs.extend(stage.tick((None, true)).rd_req);
        reqs.extend(stage.tick((None, true)).rd_req);
        assert_eq!(stage.tick((None, true)), FanoutOutput::default());

        assert_eq!(reqs.iter().map(|r| r.addr).collect::<Vec<_>>(), vec![0x40, 0x44, 0x48]);
        assert_eq!(reqs.iter().map(|r| r.be).collect::<Vec<_>>(), vec![0x3, 0xF, 0xC]);
        assert_eq!(reqs.iter().map(|r| (r.ctx.first, r.ctx.last)).collect::<Vec<_>>(), vec![
            (true, false),
            (false, false),
            (false, true)
        ]);
        assert_eq!(reqs[0].ctx.dwlen, 3);
        assert_eq!(reqs[0].ctx.byte_count, 12);
        assert_eq!(reqs[0].ctx.tag, 9);
    }

    #[test]
    fn single_dword_is_first_and_last() {
        let mut stage = FsmModule::new(FanoutFsm);
        let out = stage.tick((Some(sub(0x40, 1)), true));
        let req = out.rd_req.unwrap();
        assert!(req.ctx.first && req.ctx.last);
        assert_eq!(req.be, 0x3);
        assert_eq!(stage.state().phase, FanoutPhase::ReqData);
    }

    #[test]
    fn stalls_while_disabled() {
        let mut stage = FsmModule::new(FanoutFsm);
        assert_eq!(stage.tick((Some(sub(0, 2)), false)), FanoutOutput::default());
        assert!(stage.tick((Some(sub(0, 2)), true)).take);
        assert_eq!(stage.tick((None, false)).rd_req, None);
        assert_eq!(stage.tick((None, true)).rd_req.map(|r| r.addr), Some(0x4));
    }
}
