//! Scoped rooting of values against collection.

use std::ops::{Deref, DerefMut};

use super::GcTrace;
use crate::lisp::runtime::Runtime;
use crate::lisp::value::Value;

/// Guard that keeps values alive for the rest of its scope.
///
/// Created by [`Runtime::root_scope`]. Records the root-stack depth on
/// creation and restores it on drop, so every exit path (including an early
/// `?` return) releases exactly the roots pushed through this guard.
///
/// The guard derefs to the [`Runtime`], so allocation happens through it
/// while its roots are held:
///
/// ```
/// use neovm_pairlist::{Runtime, Value};
///
/// let mut rt = Runtime::new();
/// let mut scope = rt.root_scope();
/// let s = scope.string("kept").unwrap();
/// scope.protect(s);
/// let cell = scope.cons(s, Value::Nil).unwrap();
/// assert_eq!(scope.list_length(cell), Some(1));
/// ```
pub struct RootScope<'rt> {
    rt: &'rt mut Runtime,
    depth: usize,
}

impl<'rt> RootScope<'rt> {
    pub(crate) fn new(rt: &'rt mut Runtime) -> Self {
        let depth = rt.heap().root_depth();
        Self { rt, depth }
    }

    /// Root `value` until this scope ends. Returns it for chaining.
    pub fn protect(&mut self, value: Value) -> Value {
        self.rt.heap_mut().push_root(value);
        value
    }

    /// Root every value `holder` references.
    pub fn protect_all<T: GcTrace + ?Sized>(&mut self, holder: &T) {
        let mut values = Vec::new();
        holder.trace_roots(&mut values);
        let heap = self.rt.heap_mut();
        for value in values {
            heap.push_root(value);
        }
    }

    /// Number of values rooted through this scope.
    pub fn protected(&self) -> usize {
        self.rt.heap().root_depth() - self.depth
    }
}

impl Deref for RootScope<'_> {
    type Target = Runtime;

    fn deref(&self) -> &Runtime {
        &*self.rt
    }
}

impl DerefMut for RootScope<'_> {
    fn deref_mut(&mut self) -> &mut Runtime {
        &mut *self.rt
    }
}

impl Drop for RootScope<'_> {
    fn drop(&mut self) {
        self.rt.heap_mut().truncate_roots(self.depth);
    }
}
