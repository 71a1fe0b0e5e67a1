//! Types.

pub mod request;
pub mod stream;
pub mod tlp;

pub use request::*;
pub use stream::*;
pub use tlp::{Completion, RequestHeader};
