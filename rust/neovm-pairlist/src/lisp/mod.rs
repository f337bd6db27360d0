//! Lisp object model: values, symbols, conversion and the runtime that owns
//! them.

pub mod convert;
pub mod intern;
pub mod runtime;
pub mod value;

pub use convert::IntoLisp;
pub use intern::{StringInterner, SymId};
pub use runtime::Runtime;
pub use value::Value;
