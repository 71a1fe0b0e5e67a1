//! BAR controller: classifies incoming TLPs, drives the engines and the BAR mux.

use tlpflow::{some_or, Module, Signal, Waveform};
use tracing::{debug, trace, warn};

use crate::backends::{BarBackend, LoopAddrBar, MemoryBar};
use crate::bar_mux::BarMux;
use crate::error::BarError;
use crate::rd_engine::{RdEngine, RdInput};
use crate::types::tlp::{is_read_request, is_write_request};
use crate::types::{ReadRequest, ReadResponse, StreamBeat, WriteRequest};
use crate::wr_engine::{WrEngine, WrState};

/// Runtime configuration of the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControllerConfig {
    /// Completer ID put in completions.
    pub pcie_id: u16,
    /// Accepts requests. When unset every TLP is ignored.
    pub bar_enable: bool,
    /// Fails the cycle in which two slots respond. Otherwise the lowest slot wins.
    pub strict_response_mux: bool,
    /// Records a waveform.
    pub trace: bool,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self { pcie_id: 0, bar_enable: true, strict_response_mux: cfg!(debug_assertions), trace: false }
    }
}

/// Input of the controller in one cycle.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ControllerInput {
    /// Incoming TLP beat.
    pub tlp_in: Option<StreamBeat>,
    /// The consumer accepts a completion beat.
    pub tlp_out_ready: bool,
}

impl ControllerInput {
    /// No beat, consumer ready.
    pub fn idle() -> Self { Self { tlp_in: None, tlp_out_ready: true } }

    /// `beat`, consumer ready.
    pub fn beat(beat: StreamBeat) -> Self { Self { tlp_in: Some(beat), tlp_out_ready: true } }
}

/// Output of the controller in one cycle.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ControllerOutput {
    /// Completion beat transferred to the consumer.
    pub tlp_out: Option<StreamBeat>,
    /// A complete completion is waiting.
    pub has_data: bool,
    /// Write request issued to the BAR mux.
    pub wr_req: Option<WriteRequest>,
    /// Read request issued to the BAR mux.
    pub rd_req: Option<ReadRequest>,
    /// Merged backend response.
    pub rd_rsp: Option<ReadResponse>,
}

/// Event counters.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ControllerStats {
    /// Write packets discarded because the write FIFO was not ready.
    pub dropped_writes: u64,
    /// Cycles in which more than one slot responded.
    pub conflicts: u64,
}

const PROBES: [(&str, usize); 8] = [
    ("tlp_in", Option::<StreamBeat>::WIDTH),
    ("tlp_out", Option::<StreamBeat>::WIDTH),
    ("has_data", 1),
    ("wr_req", Option::<WriteRequest>::WIDTH),
    ("rd_req", Option::<ReadRequest>::WIDTH),
    ("rd_rsp", Option::<ReadResponse>::WIDTH),
    ("wr_state", WrState::WIDTH),
    ("wr_ready", 1),
];

fn probe_waveform() -> Result<Waveform, BarError> {
    let mut waveform = Waveform::new("bar_controller");
    for (name, width) in PROBES {
        waveform.declare(name, width)?;
    }
    Ok(waveform)
}

/// PCIe BAR controller.
///
/// Slot 0 holds a 4 KiB `MemoryBar` and slot 1 a `LoopAddrBar` on creation; the other slots are
/// null.
#[derive(Debug)]
pub struct BarController {
    config: ControllerConfig,
    wr: WrEngine,
    rd: RdEngine,
    mux: BarMux,
    /// The next beat continues an admitted write packet.
    wr_cont: bool,
    cycle: u64,
    stats: ControllerStats,
    waveform: Option<Waveform>,
}

impl BarController {
    /// Creates a controller with the default slot population.
    pub fn new(config: ControllerConfig) -> Result<Self, BarError> {
        let mut mux = BarMux::new();
        let _ = mux.install(0, Box::new(MemoryBar::default()))?;
        let _ = mux.install(1, Box::new(LoopAddrBar::new()))?;

        let waveform = if config.trace { Some(probe_waveform()?) } else { None };

        Ok(Self {
            config,
            wr: WrEngine::new(),
            rd: RdEngine::new(config.pcie_id),
            mux,
            wr_cont: false,
            cycle: 0,
            stats: ControllerStats::default(),
            waveform,
        })
    }

    /// Returns the configuration.
    pub fn config(&self) -> &ControllerConfig { &self.config }

    /// Puts `backend` in slot `index` and returns the backend it replaces.
    pub fn install<B: BarBackend + 'static>(&mut self, index: usize, backend: B) -> Result<Box<dyn BarBackend>, BarError> {
        self.mux.install(index, Box::new(backend))
    }

    /// Returns the backend in slot `index` if it is a `T`.
    pub fn backend<T: 'static>(&self, index: usize) -> Option<&T> { self.mux.backend(index) }

    /// Returns the BAR mux.
    pub fn mux(&self) -> &BarMux { &self.mux }

    /// Returns the write engine.
    pub fn wr_engine(&self) -> &WrEngine { &self.wr }

    /// Returns the read engine.
    pub fn rd_engine(&self) -> &RdEngine { &self.rd }

    /// Returns the number of ticks since creation or the last reset.
    pub fn cycle(&self) -> u64 { self.cycle }

    /// Returns the event counters.
    pub fn stats(&self) -> ControllerStats { self.stats }

    /// Returns the recorded waveform, if tracing.
    pub fn waveform(&self) -> Option<&Waveform> { self.waveform.as_ref() }

    fn sample(&mut self, input: &ControllerInput, output: &ControllerOutput) -> Result<(), BarError> {
        let (wr_state, wr_ready) = (self.wr.state(), self.wr.ready());
        let waveform = some_or!(self.waveform.as_mut(), return Ok(()));
        let cycle = self.cycle;
        waveform.sample(cycle, "tlp_in", input.tlp_in)?;
        waveform.sample(cycle, "tlp_out", output.tlp_out)?;
        waveform.sample(cycle, "has_data", output.has_data)?;
        waveform.sample(cycle, "wr_req", output.wr_req)?;
        waveform.sample(cycle, "rd_req", output.rd_req)?;
        waveform.sample(cycle, "rd_rsp", output.rd_rsp)?;
        waveform.sample(cycle, "wr_state", wr_state)?;
        waveform.sample(cycle, "wr_ready", wr_ready)?;
        Ok(())
    }
}

impl Module for BarController {
    type I = ControllerInput;
    type O = Result<ControllerOutput, BarError>;

    fn tick(&mut self, input: ControllerInput) -> Result<ControllerOutput, BarError> {
        let rd_rsp = match self.mux.rd_rsp() {
            Some(muxed) if !muxed.conflicts.is_empty() => {
                self.stats.conflicts += 1;
                let mut slots = vec![muxed.index];
                slots.extend(muxed.conflicts);
                if self.config.strict_response_mux {
                    return Err(BarError::ResponseConflict { slots, cycle: self.cycle });
                }
                warn!(cycle = self.cycle, "slots {:?} responded together, slot {} wins", slots, muxed.index);
                Some(muxed.value)
            }
            muxed => muxed.map(|muxed| muxed.value),
        };

        let (mut rd_beat, mut wr_beat) = (None, None);
        if let Some(beat) = input.tlp_in {
            let dw0 = beat.dw(0);
            let is_bar = self.config.bar_enable && beat.bar_index().is_some();
            let is_rd = beat.first && beat.last && is_bar && is_read_request(dw0);
            let is_wr_head = beat.first && is_bar && is_write_request(dw0);
            let is_wr = (self.wr_cont && !beat.first) || (is_wr_head && self.wr.ready());

            if is_wr_head && !self.wr.ready() {
                trace!(cycle = self.cycle, "write FIFO busy, packet dropped");
                self.stats.dropped_writes += 1;
            }
            if is_rd {
                rd_beat = Some(beat);
            } else if is_wr {
                if beat.first {
                    debug!(cycle = self.cycle, bar = beat.bar_index(), "write packet admitted");
                }
                wr_beat = Some(beat);
            } else if beat.first {
                trace!(cycle = self.cycle, dw0, "TLP ignored");
            }
            self.wr_cont = is_wr && !beat.last;
        }

        let rd = self.rd.tick(RdInput { tlp: rd_beat, rsp: rd_rsp, ready: input.tlp_out_ready });
        let wr_req = self.wr.tick(wr_beat);
        self.mux.tick(wr_req.as_ref(), rd.rd_req.as_ref());

        let output = ControllerOutput { tlp_out: rd.tlp_out, has_data: rd.has_data, wr_req, rd_req: rd.rd_req, rd_rsp };
        self.sample(&input, &output)?;
        self.cycle += 1;
        Ok(output)
    }

    fn reset(&mut self) {
        self.wr.reset();
        self.rd.reset();
        self.mux.reset();
        self.wr_cont = false;
        self.cycle = 0;
        self.stats = ControllerStats::default();
        self.waveform = self.waveform.take().and_then(|_| probe_waveform().ok());
    }
}
