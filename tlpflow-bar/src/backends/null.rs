use std::any::Any;

use super::BarBackend;
use crate::types::{ReadRequest, ReadResponse, WriteRequest};

/// Discards every request and never responds.
#[derive(Debug, Default, Clone)]
pub struct NullBar;

impl BarBackend for NullBar {
    fn name(&self) -> &'static str { "null" }

    fn latency(&self) -> Option<usize> { None }

    fn rd_rsp(&self) -> Option<ReadResponse> { None }

    fn tick(&mut self, _wr: Option<&WriteRequest>, _rd: Option<&ReadRequest>) {}

    fn reset(&mut self) {}

    fn as_any(&self) -> &dyn Any { self }
}
