//! BAR backends.
//!
//! A backend sits in one slot of the BAR mux. Every cycle the controller first reads `rd_rsp`,
//! the backend's registered response output, and then calls `tick` with the requests routed to the
//! slot in that cycle. A backend must answer every read exactly once, after a fixed number of
//! cycles, echoing the context unmodified. All backends of one controller are expected to share
//! that latency; responses of two slots in the same cycle are an error of the backends.

use std::any::Any;
use std::fmt::Debug;

use crate::types::{ReadRequest, ReadResponse, WriteRequest};

mod loopaddr;
mod memory;
mod null;
mod table;

pub use loopaddr::LoopAddrBar;
pub use memory::MemoryBar;
pub use null::NullBar;
pub use table::TableBar;

/// BAR backend.
pub trait BarBackend: Debug {
    /// Name, for logs.
    fn name(&self) -> &'static str;

    /// Read latency in cycles, or `None` if the backend never answers reads.
    fn latency(&self) -> Option<usize>;

    /// Response of the current cycle.
    fn rd_rsp(&self) -> Option<ReadResponse>;

    /// Advances one clock edge, accepting the requests of the current cycle.
    fn tick(&mut self, wr: Option<&WriteRequest>, rd: Option<&ReadRequest>);

    /// Drops requests in flight.
    fn reset(&mut self);

    /// Returns `self` for downcasting.
    fn as_any(&self) -> &dyn Any;
}
