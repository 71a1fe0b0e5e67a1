#![allow(dead_code)]

use tlpflow::Module;
use tlpflow_bar::types::{Completion, ReadRequest, StreamBeat, WriteRequest};
use tlpflow_bar::{BarController, BarError, ControllerConfig, ControllerInput, ControllerOutput};

/// Drives a controller and records everything it emits.
#[derive(Debug)]
pub struct Harness {
    pub ctrl: BarController,
    pub beats: Vec<StreamBeat>,
    pub writes: Vec<WriteRequest>,
    pub reads: Vec<ReadRequest>,
    pub ready: bool,
}

impl Harness {
    pub fn new(config: ControllerConfig) -> Self {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();
        let ctrl = BarController::new(config).expect("controller");
        Self { ctrl, beats: Vec::new(), writes: Vec::new(), reads: Vec::new(), ready: true }
    }

    pub fn strict() -> Self { Self::new(ControllerConfig { strict_response_mux: true, ..Default::default() }) }

    pub fn step(&mut self, tlp_in: Option<StreamBeat>) -> Result<ControllerOutput, BarError> {
        let output = self.ctrl.tick(ControllerInput { tlp_in, tlp_out_ready: self.ready })?;
        self.beats.extend(output.tlp_out);
        self.writes.extend(output.wr_req);
        self.reads.extend(output.rd_req);
        Ok(output)
    }

    /// Sends `beats` back to back.
    pub fn send(&mut self, beats: &[StreamBeat]) -> Result<(), BarError> {
        for beat in beats {
            self.step(Some(*beat))?;
        }
        Ok(())
    }

    pub fn idle(&mut self, cycles: usize) -> Result<(), BarError> {
        for _ in 0..cycles {
            self.step(None)?;
        }
        Ok(())
    }

    /// Returns the completions received so far. Panics on a malformed one.
    pub fn completions(&self) -> Vec<Completion> {
        Completion::parse_all(&self.beats).into_iter().map(|cpl| cpl.expect("malformed completion")).collect()
    }

    /// Takes the completions received so far.
    pub fn take_completions(&mut self) -> Vec<Completion> {
        let completions = self.completions();
        self.beats.clear();
        completions
    }
}
