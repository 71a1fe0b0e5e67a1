//! Routes requests to the BAR slots and merges their responses.

use itertools::Itertools;
use tlpflow::some_or;
use tlpflow_std::array_map::range_map;
use tlpflow_std::{priority_mux, Muxed};
use tracing::{debug, warn};

use crate::backends::{BarBackend, NullBar};
use crate::constants::bar_mux::SLOTS;
use crate::error::BarError;
use crate::types::{ReadRequest, ReadResponse, WriteRequest};

/// BAR mux with one backend per slot.
#[derive(Debug)]
pub struct BarMux {
    slots: [Box<dyn BarBackend>; SLOTS],
}

impl Default for BarMux {
    fn default() -> Self { Self::new() }
}

impl BarMux {
    /// Creates a mux with a `NullBar` in every slot.
    pub fn new() -> Self { Self { slots: range_map(|_| Box::new(NullBar) as Box<dyn BarBackend>) } }

    /// Puts `backend` in slot `index` and returns the backend it replaces.
    pub fn install(&mut self, index: usize, backend: Box<dyn BarBackend>) -> Result<Box<dyn BarBackend>, BarError> {
        let mismatched = self.mismatched_latency(index, backend.latency());
        if !mismatched.is_empty() {
            warn!(index, backend = backend.name(), "backend latency differs from slots {:?}", mismatched);
        }
        let slot = some_or!(self.slots.get_mut(index), return Err(BarError::SlotOutOfRange(index)));
        debug!(index, backend = backend.name(), "install");
        Ok(std::mem::replace(slot, backend))
    }

    /// Returns the slots other than `index` whose backends answer reads after a latency other than `latency`.
    fn mismatched_latency(&self, index: usize, latency: Option<usize>) -> Vec<usize> {
        let Some(latency) = latency else {
            return Vec::new();
        };
        self.slots
            .iter()
            .positions(|slot| slot.latency().map_or(false, |l| l != latency))
            .filter(|&i| i != index)
            .collect()
    }

    /// Returns the backend in slot `index`.
    pub fn slot(&self, index: usize) -> Option<&dyn BarBackend> { self.slots.get(index).map(|slot| &**slot) }

    /// Returns the backend in slot `index` if it is a `T`.
    pub fn backend<T: 'static>(&self, index: usize) -> Option<&T> { self.slot(index)?.as_any().downcast_ref::<T>() }

    /// Returns the merged response of the current cycle. The lowest responding slot wins.
    pub fn rd_rsp(&self) -> Option<Muxed<ReadResponse>> { priority_mux(self.slots.iter().map(|slot| slot.rd_rsp())) }

    /// Advances every slot one clock edge, delivering each request to the slot it targets.
    pub fn tick(&mut self, wr: Option<&WriteRequest>, rd: Option<&ReadRequest>) {
        for (i, slot) in self.slots.iter_mut().enumerate() {
            let wr = wr.filter(|wr| usize::from(wr.bar) == i);
            let rd = rd.filter(|rd| usize::from(rd.bar) == i);
            slot.tick(wr, rd);
        }
    }

    /// Resets every slot.
    pub fn reset(&mut self) { self.slots.iter_mut().for_each(|slot| slot.reset()); }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::{LoopAddrBar, MemoryBar};
    use crate::types::ReadContext;

    fn read(bar: u8, addr: u32) -> ReadRequest {
        ReadRequest { addr, be: 0xF, ctx: ReadContext { addr, first: true, last: true, ..Default::default() }, bar }
    }

    #[test]
    fn routes_by_index() {
        let mut mux = BarMux::new();
        mux.install(2, Box::new(MemoryBar::default())).unwrap();
        mux.install(5, Box::new(LoopAddrBar::new())).unwrap();

        let wr = WriteRequest { addr: 0x10, be: 0xF, data: 0xCAFE, bar: 2 };
        mux.tick(Some(&wr), Some(&read(5, 0x10)));
        mux.tick(None, Some(&read(2, 0x10)));
        let rsp = mux.rd_rsp().unwrap();
        assert_eq!((rsp.index, rsp.value.data), (5, 0x10));
        mux.tick(None, None);
        let rsp = mux.rd_rsp().unwrap();
        assert_eq!((rsp.index, rsp.value.data), (2, 0xCAFE));
        assert!(rsp.conflicts.is_empty());
        assert_eq!(mux.backend::<MemoryBar>(2).map(|m| m.peek(0x10)), Some(0xCAFE));
        assert!(mux.backend::<MemoryBar>(5).is_none());
    }

    /// Responds in every cycle.
    #[derive(Debug)]
    struct Chatty;

    impl BarBackend for Chatty {
        fn name(&self) -> &'static str { "chatty" }

        fn latency(&self) -> Option<usize> { Some(0) }

        fn rd_rsp(&self) -> Option<ReadResponse> { Some(ReadResponse { data: 0xC4A7, ..Default::default() }) }

        fn tick(&mut self, _wr: Option<&WriteRequest>, _rd: Option<&ReadRequest>) {}

        fn reset(&mut self) {}

        fn as_any(&self) -> &dyn std::any::Any { self }
    }

    #[test]
    fn reports_conflicts() {
        let mut mux = BarMux::new();
        mux.install(1, Box::new(LoopAddrBar::new())).unwrap();
        mux.install(4, Box::new(Chatty)).unwrap();
        assert_eq!(mux.rd_rsp().map(|r| (r.index, r.conflicts)), Some((4, vec![])));

        mux.tick(None, Some(&read(1, 0x10)));
        mux.tick(None, None);
        let rsp = mux.rd_rsp().unwrap();
        assert_eq!((rsp.index, rsp.value.data, rsp.conflicts), (1, 0x10, vec![4]));
    }

    #[test]
    fn rejects_missing_slots() {
        let mut mux = BarMux::new();
        assert!(matches!(mux.install(7, Box::new(NullBar)), Err(BarError::SlotOutOfRange(7))));
        let old = mux.install(6, Box::new(LoopAddrBar::new())).unwrap();
        assert_eq!(old.name(), "null");
        assert_eq!(mux.slot(6).map(|s| s.name()), Some("loopaddr"));
    }
}
