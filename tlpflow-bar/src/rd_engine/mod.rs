//! Read engine: memory read TLPs to single-DWORD BAR reads, and BAR responses to completions.
//!
//! The engine is a four-stage pipeline.
//!
//! 1. `ingest` parses read headers into descriptors, queued in a first-word-fall-through FIFO.
//! 2. `split` cuts each read into completions of at most 32 DWORDs along 128-byte boundaries.
//! 3. `fanout` issues one `ReadRequest` per DWORD while the output FIFO has room.
//! 4. `reassembly` packs the responses into completion beats for the output FIFO.

use tlpflow::{FsmModule, Module};
use tlpflow_std::{counter_up_down, CounterUpDown, Fifo, FifoConfig, FifoMode};
use tracing::trace;

use crate::constants::rd_engine::*;
use crate::types::{ReadRequest, ReadResponse, StreamBeat};

mod fanout;
mod ingest;
mod reassembly;
mod split;

pub use fanout::{FanoutFsm, FanoutOutput, FanoutPhase, FanoutRegs};
pub use ingest::ReadDesc;
pub use reassembly::{ReassemblyFsm, ReassemblyRegs};
pub use split::{split_next, SplitFsm, SplitPhase, SplitRegs, SubPacket};

/// Input of the read engine.
#[derive(Debug, Default, Clone, Copy)]
pub struct RdInput {
    /// Beat of a read request. Reads are single-beat packets.
    pub tlp: Option<StreamBeat>,
    /// Merged backend response.
    pub rsp: Option<ReadResponse>,
    /// The consumer accepts a completion beat.
    pub ready: bool,
}

/// Output of the read engine.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RdOutput {
    /// Read request for the BAR mux.
    pub rd_req: Option<ReadRequest>,
    /// Completion beat transferred to the consumer in this cycle.
    pub tlp_out: Option<StreamBeat>,
    /// The output FIFO holds a complete completion after this cycle.
    pub has_data: bool,
}

/// Read engine.
#[derive(Debug)]
pub struct RdEngine {
    req_fifo: Fifo<ReadDesc>,
    split: FsmModule<SplitFsm>,
    fanout: FsmModule<FanoutFsm>,
    reassembly: FsmModule<ReassemblyFsm>,
    out_fifo: Fifo<StreamBeat>,
    packets: CounterUpDown,
    dropped: u64,
}

impl Default for RdEngine {
    fn default() -> Self { Self::new(0) }
}

impl RdEngine {
    /// Creates an idle read engine answering as completer `pcie_id`.
    pub fn new(pcie_id: u16) -> Self {
        Self {
            req_fifo: Fifo::new(FifoConfig::new(REQ_FIFO_DEPTH, FifoMode::FirstWordFallThrough)),
            split: FsmModule::new(SplitFsm),
            fanout: FsmModule::new(FanoutFsm),
            reassembly: FsmModule::new(ReassemblyFsm { pcie_id }),
            out_fifo: Fifo::new(
                FifoConfig::new(OUT_FIFO_DEPTH, FifoMode::FirstWordFallThrough).prog_empty(OUT_FIFO_PROG_EMPTY),
            ),
            packets: counter_up_down(),
            dropped: 0,
        }
    }

    /// Returns whether the output FIFO holds a complete completion.
    pub fn has_data(&self) -> bool { *self.packets.state() > 0 }

    /// Returns the number of read requests dropped on a full request FIFO.
    pub fn dropped(&self) -> u64 { self.dropped }

    /// Returns the number of queued read descriptors.
    pub fn queued(&self) -> usize { self.req_fifo.len() }

    /// Returns the number of completion beats in the output FIFO.
    pub fn buffered(&self) -> usize { self.out_fifo.len() }

    /// Returns whether no read is in progress.
    pub fn is_idle(&self) -> bool {
        self.req_fifo.is_empty()
            && self.split.state().out.is_none()
            && self.split.state().phase == SplitPhase::ReqData
            && self.fanout.state().phase == FanoutPhase::ReqData
            && self.reassembly.state().keep == 0
            && self.out_fifo.is_empty()
    }
}

impl Module for RdEngine {
    type I = RdInput;
    type O = RdOutput;

    fn tick(&mut self, input: RdInput) -> RdOutput {
        let push = self.reassembly.tick(input.rsp);
        let tlp_out = if input.ready { self.out_fifo.head().copied() } else { None };

        let rd3_enable = self.out_fifo.prog_empty();
        let fanout = self.fanout.tick((self.split.state().out, rd3_enable));
        let pop = self.split.tick((self.req_fifo.head().copied(), fanout.take));

        let desc = input.tlp.as_ref().map(ReadDesc::parse);
        if !self.req_fifo.tick(desc, pop) {
            trace!("read request FIFO full, request dropped");
            self.dropped += 1;
        }
        if !self.out_fifo.tick(push, tlp_out.is_some()) {
            trace!("completion FIFO overflow");
        }

        let (_, count_next) = self
            .packets
            .tick((push.map_or(false, |beat| beat.last), tlp_out.map_or(false, |beat| beat.last)));
        RdOutput { rd_req: fanout.rd_req, tlp_out, has_data: count_next > 0 }
    }

    fn reset(&mut self) {
        self.req_fifo.reset();
        self.split.reset();
        self.fanout.reset();
        self.reassembly.reset();
        self.out_fifo.reset();
        self.packets.reset();
        self.dropped = 0;
    }
}
