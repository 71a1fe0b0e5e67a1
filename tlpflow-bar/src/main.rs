use std::path::Path;

use tlpflow::Simulator;
use tlpflow_bar::types::{Completion, RequestHeader};
use tlpflow_bar::{BarController, BarError, ControllerConfig, ControllerInput};
use tracing::info;
use tracing_subscriber::EnvFilter;

const MAX_CYCLES: u64 = 1024;

fn main() -> Result<(), BarError> {
    tracing_subscriber::fmt().with_env_filter(EnvFilter::from_default_env()).init();

    let config = ControllerConfig { pcie_id: 0x0100, trace: true, ..Default::default() };
    let mut sim = Simulator::new("bar_controller", BarController::new(config)?);

    let payload = (0..8).map(|i| 0xC0DE_0000 | i).collect::<Vec<u32>>();
    let writes = RequestHeader::new(0, 0x100).mwr32(&payload);
    let reads = [
        RequestHeader::new(0, 0x100).requester(0x0200, 1).mrd32(8),
        RequestHeader::new(1, 0x1000_0004).requester(0x0200, 2).mrd32(1),
    ];

    let mut beats = Vec::new();
    for cycle in 0..MAX_CYCLES {
        // The reads follow the writes after the write FIFO drains.
        let index = cycle as usize;
        let tlp_in = if index < writes.len() {
            Some(writes[index])
        } else {
            index.checked_sub(32).and_then(|i| reads.get(i).copied())
        };
        let output = sim.tick(ControllerInput { tlp_in, tlp_out_ready: true })?;
        beats.extend(output.tlp_out);
        if Completion::parse_all(&beats).len() == reads.len() {
            break;
        }
    }

    for completion in Completion::parse_all(&beats) {
        match completion {
            Some(cpl) => info!(tag = cpl.tag, byte_count = cpl.byte_count, "completion {:x?}", cpl.payload),
            None => info!("malformed completion"),
        }
    }
    info!(cycles = sim.cycle(), "done");

    if let Some(waveform) = sim.module().waveform() {
        let path = Path::new("build").join("bar_controller.vcd");
        waveform.save(&path)?;
        info!("waveform written to {}", path.display());
    }
    Ok(())
}
