//! Lisp value representation.

use super::intern::SymId;
use crate::gc::types::ObjId;

/// Runtime Lisp value.
///
/// Heap-allocated types use `ObjId` handles into the runtime's `LispHeap`;
/// symbols use `SymId` handles into its `StringInterner`. `Value` is `Copy`,
/// and `==` compares handles (`eq`). Use [`Runtime::equal`] for structural
/// comparison.
///
/// [`Runtime::equal`]: super::runtime::Runtime::equal
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Value {
    /// The empty list. Terminates every pairlist.
    Nil,
    /// `t`, the canonical true value.
    True,
    Int(i64),
    Float(f64),
    Char(char),
    Symbol(SymId),
    Str(ObjId),
    Cons(ObjId),
}

impl Value {
    pub fn bool(b: bool) -> Self {
        if b {
            Value::True
        } else {
            Value::Nil
        }
    }

    pub fn is_cons(&self) -> bool {
        matches!(self, Value::Cons(_))
    }

    pub fn is_list(&self) -> bool {
        matches!(self, Value::Nil | Value::Cons(_))
    }

    /// Heap handle, for values that live on the heap.
    pub fn obj_id(&self) -> Option<ObjId> {
        match self {
            Value::Str(id) | Value::Cons(id) => Some(*id),
            _ => None,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Nil => "symbol",
            Value::True => "symbol",
            Value::Int(_) => "integer",
            Value::Float(_) => "float",
            Value::Char(_) => "integer",
            Value::Symbol(_) => "symbol",
            Value::Str(_) => "string",
            Value::Cons(_) => "cons",
        }
    }
}
