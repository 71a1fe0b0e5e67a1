//! tlpflow: cycle-level simulation of synchronous hardware described as Mealy machines.

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
#![allow(elided_lifetimes_in_paths)]

#[macro_use]
pub mod utils;
mod error;
mod fsm;
mod module;
mod signal;
mod sim;
mod waveform;

pub use error::SimError;
pub use fsm::{fsm_map, FnFsm, Fsm, FsmModule};
pub use module::Module;
pub use signal::Signal;
pub use sim::Simulator;
pub use tlpflow_macro::Signal;
pub use utils::*;
pub use waveform::Waveform;
