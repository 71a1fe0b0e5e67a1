mod common;

use common::Harness;
use itertools::Itertools;
use tlpflow_bar::types::RequestHeader;
use tlpflow_bar::ControllerConfig;

#[test]
fn single_dword_completion() {
    let mut h = Harness::new(ControllerConfig { pcie_id: 0x0300, ..Default::default() });
    h.send(&RequestHeader::new(0, 0x10).mwr32(&[0xAABB_CCDD])).unwrap();
    h.idle(16).unwrap();
    h.send(&[RequestHeader::new(0, 0x10).requester(0x0042, 0x17).mrd32(1)]).unwrap();
    h.idle(32).unwrap();

    assert_eq!(h.beats.len(), 1);
    assert!(h.beats[0].first && h.beats[0].last);
    let cpls = h.completions();
    assert_eq!(cpls.len(), 1);
    let cpl = &cpls[0];
    assert_eq!((cpl.dwlen, cpl.byte_count, cpl.status), (1, 4, 0));
    assert_eq!((cpl.completer_id, cpl.reqid, cpl.tag, cpl.lower_addr), (0x0300, 0x0042, 0x17, 0x10));
    assert_eq!(cpl.payload, vec![0xAABB_CCDD]);
}

#[test]
fn loopback_returns_address() {
    let mut h = Harness::strict();
    h.send(&[RequestHeader::new(1, 0x1000_0004).mrd32(1)]).unwrap();
    h.idle(32).unwrap();
    assert_eq!(h.completions()[0].payload, vec![0x1000_0004]);

    h.send(&[RequestHeader::new(1, 0x2_1000_0008).mrd64(2)]).unwrap();
    h.idle(32).unwrap();
    assert_eq!(h.completions()[1].payload, vec![0x1000_0008, 0x1000_000C]);
}

#[test]
fn large_reads_split_on_128_byte_boundaries() {
    let mut h = Harness::strict();
    h.send(&[RequestHeader::new(1, 30 * 4).mrd32(40)]).unwrap();
    h.idle(128).unwrap();

    let cpls = h.completions();
    assert_eq!(cpls.iter().map(|c| c.dwlen).collect_vec(), vec![2, 32, 6]);
    assert_eq!(cpls.iter().map(|c| c.byte_count).collect_vec(), vec![160, 152, 24]);
    assert_eq!(cpls.iter().map(|c| c.lower_addr).collect_vec(), vec![0x78, 0x00, 0x00]);
    let payload = cpls.iter().flat_map(|c| c.payload.clone()).collect_vec();
    assert_eq!(payload, (0..40).map(|i| 0x78 + 4 * i).collect_vec());
}

#[test]
fn full_page_read() {
    let mut h = Harness::strict();
    h.send(&[RequestHeader::new(1, 0x4000).mrd32(0)]).unwrap();
    h.idle(2048).unwrap();

    let cpls = h.completions();
    assert_eq!(cpls.len(), 32);
    assert_eq!(cpls[0].byte_count, 0);
    assert_eq!(cpls[1].byte_count, 4096 - 128);
    assert_eq!(cpls.iter().map(|c| c.payload.len()).sum::<usize>(), 1024);
    assert_eq!(cpls[31].payload.last(), Some(&0x4FFC));
}

#[test]
fn reads_are_idempotent() {
    let mut h = Harness::strict();
    let payload = (0..12).map(|i| 0x5A00_0000 + i).collect_vec();
    h.send(&RequestHeader::new(0, 0x3F0).mwr32(&payload)).unwrap();
    h.idle(64).unwrap();

    let read = RequestHeader::new(0, 0x3F0).requester(1, 5).mrd32(12);
    h.send(&[read]).unwrap();
    h.idle(64).unwrap();
    let first = h.take_completions();
    h.send(&[read]).unwrap();
    h.idle(64).unwrap();
    let second = h.take_completions();

    assert_eq!(first, second);
    assert_eq!(first.iter().map(|c| c.dwlen).collect_vec(), vec![4, 8]);
    assert_eq!(first.iter().flat_map(|c| c.payload.clone()).collect_vec(), payload);
}

#[test]
fn completions_wait_for_ready() {
    let mut h = Harness::strict();
    h.ready = false;
    h.send(&[RequestHeader::new(1, 0x100).mrd32(5), RequestHeader::new(1, 0x200).mrd32(1)]).unwrap();
    h.idle(64).unwrap();
    assert!(h.beats.is_empty());
    assert!(h.ctrl.rd_engine().has_data());

    h.ready = true;
    let mut has_data = Vec::new();
    for _ in 0..8 {
        has_data.push(h.step(None).unwrap().has_data);
    }
    assert_eq!(h.beats.len(), 3);
    assert_eq!(has_data, vec![true, true, false, false, false, false, false, false]);
    assert_eq!(h.completions().iter().map(|c| c.payload.len()).collect_vec(), vec![5, 1]);
}

#[test]
fn reads_to_unmapped_slots_produce_nothing() {
    let mut h = Harness::strict();
    h.send(&[RequestHeader::new(4, 0x100).mrd32(1)]).unwrap();
    h.idle(32).unwrap();
    assert_eq!(h.reads.len(), 1);
    assert_eq!(h.reads[0].bar, 4);
    assert!(h.beats.is_empty());
}
