mod common;

use std::any::Any;

use common::Harness;
use itertools::Itertools;
use tlpflow::Module;
use tlpflow_bar::types::{ReadRequest, ReadResponse, RequestHeader, StreamBeat, WriteRequest};
use tlpflow_bar::{BarBackend, BarError, ControllerConfig, TableBar};
use tlpflow_std::DelayLine;

fn table() -> TableBar { TableBar::new(0xF000_0000, 0x1000, [(0x0, 0xAAAA_AAAA), (0x4, 0x1234_5678)]).unwrap() }

#[test]
fn table_lookups() {
    let mut h = Harness::strict();
    h.ctrl.install(2, table()).unwrap();
    h.send(&[RequestHeader::new(2, 0xF000_0000).mrd32(3)]).unwrap();
    h.idle(32).unwrap();
    assert_eq!(h.completions()[0].payload, vec![0xAAAA_AAAA, 0x1234_5678, 0]);
}

#[test]
fn table_writes_are_ignored() {
    let mut h = Harness::strict();
    h.ctrl.install(2, table()).unwrap();
    h.send(&RequestHeader::new(2, 0xF000_0004).mwr32(&[0xDEAD_BEEF])).unwrap();
    h.idle(16).unwrap();
    assert_eq!(h.writes.len(), 1);
    assert_eq!(h.ctrl.backend::<TableBar>(2).unwrap().ignored_writes(), 1);

    h.send(&[RequestHeader::new(2, 0xF000_0004).mrd32(1)]).unwrap();
    h.idle(32).unwrap();
    assert_eq!(h.completions()[0].payload, vec![0x1234_5678]);
    assert!(h.ctrl.backend::<TableBar>(2).unwrap().cycles() >= 48);
}

/// Loopback with a one-cycle latency.
#[derive(Debug, Default)]
struct FastLoop {
    pipe: DelayLine<ReadResponse, 1>,
}

impl BarBackend for FastLoop {
    fn name(&self) -> &'static str { "fast" }

    fn latency(&self) -> Option<usize> { Some(1) }

    fn rd_rsp(&self) -> Option<ReadResponse> { self.pipe.output().copied() }

    fn tick(&mut self, _wr: Option<&WriteRequest>, rd: Option<&ReadRequest>) {
        self.pipe.tick(rd.map(|rd| ReadResponse { ctx: rd.ctx, data: !rd.addr }));
    }

    fn reset(&mut self) { self.pipe.reset(); }

    fn as_any(&self) -> &dyn Any { self }
}

/// Reads slot 1 and then slot 2, whose responses land in the same cycle.
fn colliding_reads() -> [StreamBeat; 2] {
    [RequestHeader::new(1, 0x10).mrd32(1), RequestHeader::new(2, 0x20).mrd32(1)]
}

#[test]
fn strict_mux_rejects_simultaneous_responses() {
    let mut h = Harness::strict();
    h.ctrl.install(2, FastLoop::default()).unwrap();
    h.send(&colliding_reads()).unwrap();
    let error = (0..16).find_map(|_| h.step(None).err()).unwrap();
    assert!(matches!(error, BarError::ResponseConflict { ref slots, .. } if *slots == vec![1, 2]));
}

#[test]
fn lenient_mux_prefers_the_lowest_slot() {
    let mut h = Harness::new(ControllerConfig { strict_response_mux: false, ..Default::default() });
    h.ctrl.install(2, FastLoop::default()).unwrap();
    h.send(&colliding_reads()).unwrap();
    h.idle(32).unwrap();
    assert_eq!(h.ctrl.stats().conflicts, 1);
    assert_eq!(h.completions().iter().map(|c| c.payload.clone()).collect_vec(), vec![vec![0x10]]);
}

#[test]
fn slot_out_of_range() {
    let mut h = Harness::strict();
    assert!(matches!(h.ctrl.install(7, table()), Err(BarError::SlotOutOfRange(7))));
}

#[test]
fn waveform_records_probes() {
    let mut h = Harness::new(ControllerConfig { trace: true, ..Default::default() });
    h.send(&[RequestHeader::new(1, 0x40).mrd32(1)]).unwrap();
    h.idle(16).unwrap();

    let waveform = h.ctrl.waveform().unwrap();
    assert_eq!(waveform.probes().collect_vec(), vec![
        "tlp_in", "tlp_out", "has_data", "wr_req", "rd_req", "rd_rsp", "wr_state", "wr_ready"
    ]);
    // `rd_req` is an `Option`, whose valid bit is the top bit.
    let rd_req_valid = |cycle: u64| waveform.value_at("rd_req", cycle).and_then(|bits| bits.last().copied());
    assert_eq!((0..16).filter(|&cycle| rd_req_valid(cycle) == Some(true)).count(), 1);

    let vcd = waveform.to_vcd();
    assert!(vcd.contains("$scope module bar_controller $end"));
    assert!(vcd.contains("$var wire 142 ! tlp_in $end"));

    let path = std::env::temp_dir().join("tlpflow-bar-test").join("waveform.vcd");
    waveform.save(&path).unwrap();
    assert_eq!(std::fs::read_to_string(&path).unwrap(), vcd);
}

#[test]
fn reset_clears_state() {
    let mut h = Harness::new(ControllerConfig { trace: true, ..Default::default() });
    h.send(&[RequestHeader::new(1, 0x40).mrd32(4)]).unwrap();
    h.idle(2).unwrap();
    h.ctrl.reset();
    assert_eq!(h.ctrl.cycle(), 0);
    assert_eq!(h.ctrl.waveform().and_then(|w| w.value_at("tlp_in", 0)), None);
    h.idle(32).unwrap();
    assert!(h.ctrl.rd_engine().is_idle());
}
