//! The runtime: heap plus symbol table, and the allocation primitives the
//! pairlist builders are written against.

use super::intern::{StringInterner, SymId};
use super::value::Value;
use crate::config::HeapConfig;
use crate::error::Result;
use crate::gc::{LispHeap, RootScope};

/// Owns every Lisp object reachable by the builders.
pub struct Runtime {
    heap: LispHeap,
    interner: StringInterner,
}

impl Runtime {
    pub fn new() -> Self {
        Self::with_config(HeapConfig::default())
    }

    pub fn with_config(config: HeapConfig) -> Self {
        Self {
            heap: LispHeap::with_config(config),
            interner: StringInterner::new(),
        }
    }

    pub fn heap(&self) -> &LispHeap {
        &self.heap
    }

    pub fn heap_mut(&mut self) -> &mut LispHeap {
        &mut self.heap
    }

    /// Open a rooting scope. Values protected through the returned guard
    /// survive collection until it is dropped.
    pub fn root_scope(&mut self) -> RootScope<'_> {
        RootScope::new(self)
    }

    /// Run a full collection now.
    pub fn collect(&mut self) {
        self.heap.collect(std::iter::empty());
    }

    /// False once the object behind `value` has been collected.
    /// Immediate values are always live.
    pub fn is_live(&self, value: Value) -> bool {
        match value.obj_id() {
            Some(id) => self.heap.is_live(id),
            None => true,
        }
    }

    // -----------------------------------------------------------------------
    // Allocation
    // -----------------------------------------------------------------------

    /// Allocate a fresh untagged cell.
    pub fn cons(&mut self, car: Value, cdr: Value) -> Result<Value> {
        self.heap.alloc_cons(car, cdr).map(Value::Cons)
    }

    /// Allocate a chain of `n` untagged cells whose cars are nil.
    pub fn alloc_list(&mut self, n: usize) -> Result<Value> {
        self.heap.alloc_chain(n)
    }

    pub fn string(&mut self, s: impl Into<String>) -> Result<Value> {
        self.heap.alloc_string(s.into()).map(Value::Str)
    }

    // -----------------------------------------------------------------------
    // Symbols
    // -----------------------------------------------------------------------

    pub fn intern(&mut self, name: &str) -> SymId {
        self.interner.intern(name)
    }

    pub fn symbol_name(&self, id: SymId) -> &str {
        self.interner.resolve(id)
    }

    pub fn interner(&self) -> &StringInterner {
        &self.interner
    }

    // -----------------------------------------------------------------------
    // Cell access
    // -----------------------------------------------------------------------

    /// Car of a cons; nil for nil. Panics on other values.
    pub fn car(&self, list: Value) -> Value {
        match list {
            Value::Nil => Value::Nil,
            Value::Cons(id) => self.heap.cons_car(id),
            other => panic!("car on non-list: {}", other.type_name()),
        }
    }

    /// Cdr of a cons; nil for nil. Panics on other values.
    pub fn cdr(&self, list: Value) -> Value {
        match list {
            Value::Nil => Value::Nil,
            Value::Cons(id) => self.heap.cons_cdr(id),
            other => panic!("cdr on non-list: {}", other.type_name()),
        }
    }

    /// Tag of a cons cell, if it has one.
    pub fn tag(&self, cell: Value) -> Option<SymId> {
        match cell {
            Value::Cons(id) => self.heap.cons_tag(id),
            _ => None,
        }
    }

    /// Tag of a cons cell as text.
    pub fn tag_name(&self, cell: Value) -> Option<&str> {
        self.tag(cell).map(|sym| self.symbol_name(sym))
    }

    pub(crate) fn set_car(&mut self, cell: Value, value: Value) {
        match cell {
            Value::Cons(id) => self.heap.set_car(id, value),
            other => panic!("set_car on non-cons: {}", other.type_name()),
        }
    }

    pub(crate) fn set_tag(&mut self, cell: Value, sym: SymId) {
        match cell {
            Value::Cons(id) => self.heap.set_tag(id, Some(sym)),
            other => panic!("set_tag on non-cons: {}", other.type_name()),
        }
    }

    pub fn string_value(&self, value: Value) -> Option<&str> {
        match value {
            Value::Str(id) => Some(self.heap.get_string(id).as_str()),
            _ => None,
        }
    }

    pub fn list_length(&self, list: Value) -> Option<usize> {
        self.heap.list_length(&list)
    }

    pub fn list_to_vec(&self, list: Value) -> Option<Vec<Value>> {
        self.heap.list_to_vec(&list)
    }

    /// Tags of every cell of `list`, as text.
    pub fn list_tags(&self, list: Value) -> Vec<Option<&str>> {
        let mut tags = Vec::new();
        let mut cursor = list;
        while let Value::Cons(_) = cursor {
            tags.push(self.tag_name(cursor));
            cursor = self.cdr(cursor);
        }
        tags
    }

    /// Structural equality, including cell tags.
    pub fn equal(&self, a: Value, b: Value) -> bool {
        self.heap.equal_value(&a, &b, 0)
    }
}

impl Default for Runtime {
    fn default() -> Self {
        Self::new()
    }
}
