//! Garbage collector backing pairlist construction.
//!
//! # Architecture
//!
//! Arena-based mark-and-sweep collector:
//!
//! - **LispHeap**: Arena that owns cons cells and strings.
//! - **ObjId**: Lightweight 8-byte handle (index + generation).
//! - **Root stack**: Values pushed by [`RootScope`] guards survive collection;
//!   the guard pops them again when it goes out of scope.
//! - **Collection points**: Only allocation can collect, so any `Value` held
//!   across an allocation must be rooted first.
//! - **Generation counters**: Catch use-after-collected bugs at runtime (stale ObjId panics).

pub mod heap;
pub mod root;
pub mod types;

pub use heap::LispHeap;
pub use root::RootScope;
pub use types::{HeapObject, ObjId};

use crate::lisp::value::Value;

/// Trait for types that hold GC-managed `Value` references outside the heap.
///
/// Implementors enumerate every `Value` they hold so a [`RootScope`] can
/// protect them as a unit.
pub trait GcTrace {
    /// Push all `Value` references held by `self` into `roots`.
    fn trace_roots(&self, roots: &mut Vec<Value>);
}

impl GcTrace for Value {
    fn trace_roots(&self, roots: &mut Vec<Value>) {
        roots.push(*self);
    }
}

impl GcTrace for [Value] {
    fn trace_roots(&self, roots: &mut Vec<Value>) {
        roots.extend_from_slice(self);
    }
}

impl GcTrace for Vec<Value> {
    fn trace_roots(&self, roots: &mut Vec<Value>) {
        roots.extend_from_slice(self);
    }
}
