//! GC heap object types and handles.

use crate::lisp::intern::SymId;
use crate::lisp::value::Value;

/// Slot index plus the slot's generation when the handle was issued. A
/// handle to a swept slot no longer matches and panics on access.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObjId {
    pub(crate) index: u32,
    pub(crate) generation: u32,
}

impl std::fmt::Debug for ObjId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ObjId({}/{})", self.index, self.generation)
    }
}

/// The concrete object stored on the managed heap.
pub enum HeapObject {
    /// A pairlist cell. `tag` is the argument name, if any.
    Cons {
        car: Value,
        cdr: Value,
        tag: Option<SymId>,
    },
    Str(String),
    /// Freed slot, available for reuse.
    Free,
}

impl HeapObject {
    /// Values the collector must mark when this object is live.
    pub fn trace_values(&self) -> Vec<Value> {
        match self {
            HeapObject::Cons { car, cdr, .. } => vec![*car, *cdr],
            HeapObject::Str(_) | HeapObject::Free => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handles_differ_by_generation() {
        let old = ObjId {
            index: 3,
            generation: 0,
        };
        let reused = ObjId {
            index: 3,
            generation: 1,
        };
        assert_ne!(old, reused);
        assert_eq!(format!("{:?}", reused), "ObjId(3/1)");
    }

    #[test]
    fn trace_values_cons_ignores_tag() {
        let obj = HeapObject::Cons {
            car: Value::Int(1),
            cdr: Value::Int(2),
            tag: Some(SymId(7)),
        };
        assert_eq!(obj.trace_values(), vec![Value::Int(1), Value::Int(2)]);
    }

    #[test]
    fn trace_values_leaf_objects_empty() {
        assert!(HeapObject::Str("hello".to_string()).trace_values().is_empty());
        assert!(HeapObject::Free.trace_values().is_empty());
    }
}
