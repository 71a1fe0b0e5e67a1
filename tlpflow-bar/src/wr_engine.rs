//! Write engine: memory write TLPs to single-DWORD BAR writes.
//!
//! Beats of admitted write packets are buffered in a FIFO with a standard (one cycle latency) read
//! port. The state machine pops the FIFO and emits at most one `WriteRequest` per cycle, one per
//! payload DWORD.

use tlpflow::{Fsm, FsmModule, Module, Signal};
use tlpflow_std::{Fifo, FifoConfig, FifoMode};
use tracing::{debug, trace};

use crate::constants::wr_engine::*;
use crate::types::tlp::{byte_enables, Fmt};
use crate::types::{StreamBeat, WriteRequest};

/// State of the write engine.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Signal)]
#[width(3)]
pub enum WrState {
    /// Requests the next beat.
    #[default]
    #[encode(0)]
    Idle,
    /// Parses the header of the fetched beat.
    #[encode(1)]
    First,
    /// Requests the first payload beat of a 4DW header packet.
    #[encode(2)]
    ReqData,
    /// Emits DWORD 0 of the fetched beat.
    #[encode(4)]
    Tx0,
    /// Emits DWORD 1.
    #[encode(5)]
    Tx1,
    /// Emits DWORD 2.
    #[encode(6)]
    Tx2,
    /// Emits DWORD 3.
    #[encode(7)]
    Tx3,
}

impl WrState {
    fn tx(lane: usize) -> Self {
        match lane {
            0 => Self::Tx0,
            1 => Self::Tx1,
            2 => Self::Tx2,
            _ => Self::Tx3,
        }
    }

    fn lane(self) -> Option<usize> {
        match self {
            Self::Tx0 => Some(0),
            Self::Tx1 => Some(1),
            Self::Tx2 => Some(2),
            Self::Tx3 => Some(3),
            _ => None,
        }
    }
}

/// Registers of the write engine.
#[derive(Debug, Default, Clone)]
pub struct WrRegs {
    /// State.
    pub state: WrState,
    /// Beat being emitted.
    pub beat: StreamBeat,
    /// Address of the next DWORD.
    pub addr: u32,
    /// BAR index of the packet.
    pub bar: u8,
    /// First DWORD byte enable.
    pub be_first: u8,
    /// Last DWORD byte enable.
    pub be_last: u8,
    /// The next DWORD is the first of the packet.
    pub first_dw: bool,
}

/// Output of the write engine state machine.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct WrOutput {
    /// Pops the FIFO.
    pub rd_en: bool,
    /// Write request of this cycle.
    pub wr: Option<WriteRequest>,
}

/// Transition function of the write engine. The input is the FIFO output of the current cycle.
#[derive(Debug, Default, Clone, Copy)]
pub struct WrFsm;

impl WrFsm {
    /// Latches the header of a first beat.
    fn parse_header(beat: &StreamBeat, regs: &mut WrRegs) -> WrState {
        let (dw0, dw1) = (beat.dw(0), beat.dw(1));
        let (be_first, be_last) = byte_enables(dw1);
        regs.beat = *beat;
        regs.bar = beat.bar_index().unwrap_or(0) as u8;
        regs.be_first = be_first;
        regs.be_last = be_last;
        regs.first_dw = true;
        match Fmt::from_dw0(dw0) {
            Some(Fmt::Dw3Data) => {
                regs.addr = beat.dw(2) & !0x3;
                debug!(addr = regs.addr, bar = regs.bar, "write (3DW header)");
                WrState::Tx3
            }
            Some(Fmt::Dw4Data) => {
                // The upper 32 address bits in DW2 are dropped.
                regs.addr = beat.dw(3) & !0x3;
                debug!(addr = regs.addr, bar = regs.bar, "write (4DW header)");
                WrState::ReqData
            }
            _ => {
                trace!(dw0, "not a write header");
                WrState::Idle
            }
        }
    }

    /// Starts a packet at a first beat.
    fn start_packet(beat: &StreamBeat, regs: &mut WrRegs) -> WrOutput {
        regs.state = Self::parse_header(beat, regs);
        match regs.state {
            // The payload of a 3DW header write starts in DWORD 3 of the same beat.
            WrState::Tx3 => Self::transmit(3, regs),
            _ => WrOutput::default(),
        }
    }

    /// Emits DWORD `lane` of the latched beat. The keep mask is only read on the last beat.
    fn transmit(lane: usize, regs: &mut WrRegs) -> WrOutput {
        let beat = regs.beat;
        if beat.last && !beat.keeps(lane) {
            trace!(lane, keep = beat.keep, "no payload in lane");
            regs.state = WrState::First;
            return WrOutput { rd_en: true, wr: None };
        }
        let is_last = beat.last && (lane == 3 || !beat.keeps(lane + 1));
        let be = if regs.first_dw {
            regs.be_first
        } else if is_last {
            regs.be_last
        } else {
            0xF
        };
        let wr = WriteRequest { addr: regs.addr, be, data: beat.dw(lane).swap_bytes(), bar: regs.bar };
        trace!(addr = wr.addr, be = wr.be, data = wr.data, "write DWORD");

        regs.addr = regs.addr.wrapping_add(4);
        regs.first_dw = false;
        let (rd_en, state) = if is_last {
            (true, WrState::First)
        } else if lane < 3 {
            (false, WrState::tx(lane + 1))
        } else {
            (true, WrState::Tx0)
        };
        regs.state = state;
        WrOutput { rd_en, wr: Some(wr) }
    }
}

impl Fsm for WrFsm {
    type I = Option<StreamBeat>;
    type O = WrOutput;
    type S = WrRegs;

    fn init(&self) -> WrRegs { WrRegs::default() }

    fn logic(&self, dout: Option<StreamBeat>, regs: &WrRegs) -> (WrOutput, WrRegs) {
        let mut next = regs.clone();
        let output = match regs.state {
            WrState::Idle => {
                next.state = WrState::First;
                WrOutput { rd_en: true, wr: None }
            }
            WrState::First => match dout {
                Some(beat) if beat.first => Self::start_packet(&beat, &mut next),
                _ => {
                    next.state = WrState::Idle;
                    WrOutput::default()
                }
            },
            WrState::ReqData => {
                next.state = WrState::Tx0;
                WrOutput { rd_en: true, wr: None }
            }
            WrState::Tx0 => match dout {
                Some(beat) if beat.first => {
                    trace!("write packet truncated");
                    Self::start_packet(&beat, &mut next)
                }
                Some(beat) => {
                    next.beat = beat;
                    Self::transmit(0, &mut next)
                }
                None => {
                    next.state = WrState::ReqData;
                    WrOutput::default()
                }
            },
            state => {
                let lane = state.lane().unwrap_or(3);
                Self::transmit(lane, &mut next)
            }
        };
        (output, next)
    }
}

/// Write engine.
#[derive(Debug)]
pub struct WrEngine {
    fifo: Fifo<StreamBeat>,
    fsm: FsmModule<WrFsm>,
}

impl Default for WrEngine {
    fn default() -> Self { Self::new() }
}

impl WrEngine {
    /// Creates an idle write engine.
    pub fn new() -> Self {
        let config = FifoConfig::new(FIFO_DEPTH, FifoMode::Standard).prog_empty(FIFO_PROG_EMPTY);
        Self { fifo: Fifo::new(config), fsm: FsmModule::new(WrFsm) }
    }

    /// Returns whether a new write packet may be admitted.
    pub fn ready(&self) -> bool { self.fifo.prog_empty() }

    /// Returns the state register.
    pub fn state(&self) -> WrState { self.fsm.state().state }

    /// Returns the number of buffered beats.
    pub fn buffered(&self) -> usize { self.fifo.len() }
}

impl Module for WrEngine {
    type I = Option<StreamBeat>;
    type O = Option<WriteRequest>;

    /// Buffers `beat`, which must belong to an admitted write packet, and emits this cycle's write.
    fn tick(&mut self, beat: Option<StreamBeat>) -> Option<WriteRequest> {
        let output = self.fsm.tick(self.fifo.dout().copied());
        if !self.fifo.tick(beat, output.rd_en) {
            trace!("write FIFO overflow");
        }
        output.wr
    }

    fn reset(&mut self) {
        self.fifo.reset();
        self.fsm.reset();
    }
}
