use std::any::Any;

use tlpflow_std::DelayLine;

use super::BarBackend;
use crate::constants::backends::LATENCY;
use crate::types::{ReadRequest, ReadResponse, WriteRequest};

/// Answers every read with its own address. Writes are discarded.
#[derive(Debug, Default, Clone)]
pub struct LoopAddrBar {
    pipe: DelayLine<ReadResponse, LATENCY>,
}

impl LoopAddrBar {
    /// Creates a new backend.
    pub fn new() -> Self { Self::default() }
}

impl BarBackend for LoopAddrBar {
    fn name(&self) -> &'static str { "loopaddr" }

    fn latency(&self) -> Option<usize> { Some(LATENCY) }

    fn rd_rsp(&self) -> Option<ReadResponse> { self.pipe.output().copied() }

    fn tick(&mut self, _wr: Option<&WriteRequest>, rd: Option<&ReadRequest>) {
        self.pipe.tick(rd.map(|rd| ReadResponse { ctx: rd.ctx, data: rd.addr }));
    }

    fn reset(&mut self) { self.pipe.reset(); }

    fn as_any(&self) -> &dyn Any { self }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ReadContext;

    #[test]
    fn returns_address_after_two_cycles() {
        let mut bar = LoopAddrBar::new();
        let ctx = ReadContext { addr: 0x1000_0004, tag: 7, first: true, last: true, dwlen: 1, ..Default::default() };
        let rd = ReadRequest { addr: 0x1000_0004, be: 0xF, ctx, bar: 1 };

        assert_eq!(bar.rd_rsp(), None);
        bar.tick(None, Some(&rd));
        assert_eq!(bar.rd_rsp(), None);
        bar.tick(None, None);
        assert_eq!(bar.rd_rsp(), Some(ReadResponse { ctx, data: 0x1000_0004 }));
        bar.tick(None, None);
        assert_eq!(bar.rd_rsp(), None);
    }
}
