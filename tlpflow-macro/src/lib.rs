//! Derive macro for the `Signal` trait of `tlpflow`.
//!
//! # Note
//!
//! For a struct, the bit representation is the concatenation of its fields in declaration order,
//! least significant bit first. A field may be narrower than its Rust type with `#[member(width = N)]`;
//! the value is then truncated on `transl` and zero-extended on `from_bits`.
//!
//! ```ignore
//! #[derive(Debug, Clone, Signal)]
//! pub struct Header {
//!     addr: u32,
//!     #[member(width = 7)]
//!     bar: u8,
//! }
//! ```
//!
//! For an enum, only unit variants are allowed. The width defaults to `clog2(#variants)` and can be
//! overridden with `#[width(N)]`; each variant is encoded as its index unless `#[encode(V)]` is given.

mod signal;
mod utils;

use proc_macro::{self, TokenStream};

#[proc_macro_derive(Signal, attributes(member, width, encode))]
pub fn signal(input: TokenStream) -> TokenStream { signal::derive(input) }
