//! PCIe BAR controller: a cycle-level model of the TLP front end that turns memory requests into
//! single-DWORD BAR accesses and BAR responses into completions.

// # Tries to deny all lints (`rustc -W help`).
#![deny(absolute_paths_not_starting_with_crate)]
#![deny(anonymous_parameters)]
#![deny(deprecated_in_future)]
#![deny(explicit_outlives_requirements)]
#![deny(keyword_idents)]
#![deny(macro_use_extern_crate)]
#![deny(missing_debug_implementations)]
#![deny(non_ascii_idents)]
#![deny(rust_2018_idioms)]
#![deny(unsafe_op_in_unsafe_fn)]
#![deny(unused_extern_crates)]
#![deny(unused_import_braces)]
#![warn(trivial_numeric_casts)]
#![warn(unused_qualifications)]
//
#![warn(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]
#![deny(rustdoc::missing_crate_level_docs)]
#![deny(rustdoc::invalid_codeblock_attributes)]
#![deny(rustdoc::invalid_html_tags)]
#![deny(rustdoc::bare_urls)]
#![warn(unreachable_pub)]
//
#![allow(clippy::needless_lifetimes)]
#![allow(clippy::type_complexity)]
#![allow(elided_lifetimes_in_paths)]

pub mod backends;
pub mod bar_mux;
#[allow(missing_docs)]
pub mod constants;
pub mod controller;
mod error;
pub mod rd_engine;
pub mod types;
pub mod wr_engine;

pub use backends::{BarBackend, LoopAddrBar, MemoryBar, NullBar, TableBar};
pub use bar_mux::BarMux;
pub use controller::{BarController, ControllerConfig, ControllerInput, ControllerOutput, ControllerStats};
pub use error::{BarError, MemoryError, TableError};
pub use rd_engine::RdEngine;
pub use wr_engine::WrEngine;
