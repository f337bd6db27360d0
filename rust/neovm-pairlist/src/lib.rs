//! GC-rooted pairlist construction for the NeoVM Lisp runtime.
//!
//! Pairlists are the cons chains used for call forms and argument lists:
//! each cell holds a value, an optional name tag and the rest of the list.
//! This crate builds them two ways:
//!
//! - [`grow`] prepends one cell, converting the head with [`IntoLisp`] and
//!   tagging it when the head is a [`Named`] value. The plain/named choice
//!   is made by the head's type through [`GrowHead`].
//! - [`to_pairlist`] converts a whole [`ArgumentList`] at once, allocating
//!   the chain in one request and filling it front to back.
//!
//! The [`Runtime`] may collect at any allocation, so builders keep their
//! intermediate values on the root stack through [`RootScope`] guards.

pub mod config;
pub mod error;
pub mod gc;
pub mod lisp;
pub mod pairlist;

pub use config::HeapConfig;
pub use error::{Error, Result};
pub use gc::{GcTrace, RootScope};
pub use lisp::{IntoLisp, Runtime, SymId, Value};
pub use pairlist::{grow, named, pairlist, to_pairlist, ArgumentList, GrowHead, Named};
