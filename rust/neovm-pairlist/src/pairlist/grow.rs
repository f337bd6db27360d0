//! Prepending one cell onto a pairlist.
//!
//! Which of the two construction paths a head takes is decided by its type:
//! every [`GrowHead`] impl is fixed to either the plain path (convert, cons)
//! or the named path (convert, cons, tag). There is no runtime inspection of
//! the head.

use super::named::Named;
use crate::error::Result;
use crate::lisp::convert::IntoLisp;
use crate::lisp::intern::SymId;
use crate::lisp::runtime::Runtime;
use crate::lisp::value::Value;

/// Values that can become the head of a new pairlist cell.
pub trait GrowHead: Sized {
    /// True when cells grown from this type carry a tag.
    const IS_NAMED: bool;

    /// Cons `self` (converted) onto `tail`.
    fn grow_onto(self, rt: &mut Runtime, tail: Value) -> Result<Value>;
}

/// Return a new list whose first cell holds `head` and whose rest is `tail`.
///
/// `tail` is shared, not copied. It stays rooted while `head` is converted,
/// so it may be a freshly built, otherwise unreferenced list.
///
/// `tail` must be nil or a cons. Debug builds assert this; release builds
/// do not check, and a non-list tail yields an improper list.
pub fn grow<H: GrowHead>(rt: &mut Runtime, head: H, tail: Value) -> Result<Value> {
    debug_assert!(tail.is_list(), "grow onto non-list tail: {}", tail.type_name());
    tracing::trace!(named = H::IS_NAMED, "grow");
    head.grow_onto(rt, tail)
}

fn grow_plain<T: IntoLisp>(rt: &mut Runtime, head: T, tail: Value) -> Result<Value> {
    let mut scope = rt.root_scope();
    scope.protect(tail);
    let car = head.into_lisp(&mut scope)?;
    scope.protect(car);
    let cell = scope.cons(car, tail)?;
    Ok(cell)
}

fn grow_named<T: IntoLisp>(rt: &mut Runtime, head: Named<T>, tail: Value) -> Result<Value> {
    let (name, value) = head.into_parts();
    let mut scope = rt.root_scope();
    scope.protect(tail);
    let car = value.into_lisp(&mut scope)?;
    scope.protect(car);
    let cell = scope.cons(car, tail)?;
    scope.protect(cell);
    if !name.is_empty() {
        let sym = scope.intern(&name);
        scope.set_tag(cell, sym);
    }
    Ok(cell)
}

macro_rules! plain_head {
    ($($ty:ty),* $(,)?) => {
        $(
            impl GrowHead for $ty {
                const IS_NAMED: bool = false;

                fn grow_onto(self, rt: &mut Runtime, tail: Value) -> Result<Value> {
                    grow_plain(rt, self, tail)
                }
            }
        )*
    };
}

plain_head!(
    Value, SymId, bool, char, i8, i16, i32, i64, u8, u16, u32, u64, usize, isize, i128, u128,
    f32, f64, &str, String, &String,
);

impl<T: IntoLisp> GrowHead for Option<T> {
    const IS_NAMED: bool = false;

    fn grow_onto(self, rt: &mut Runtime, tail: Value) -> Result<Value> {
        grow_plain(rt, self, tail)
    }
}

impl<T: IntoLisp> GrowHead for Vec<T> {
    const IS_NAMED: bool = false;

    fn grow_onto(self, rt: &mut Runtime, tail: Value) -> Result<Value> {
        grow_plain(rt, self, tail)
    }
}

impl<T: IntoLisp> GrowHead for Named<T> {
    const IS_NAMED: bool = true;

    fn grow_onto(self, rt: &mut Runtime, tail: Value) -> Result<Value> {
        grow_named(rt, self, tail)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HeapConfig;
    use crate::error::Error;
    use crate::pairlist::named::named;

    #[test]
    fn dispatch_is_fixed_per_type() {
        assert!(!<i32 as GrowHead>::IS_NAMED);
        assert!(!<&str as GrowHead>::IS_NAMED);
        assert!(!<Value as GrowHead>::IS_NAMED);
        assert!(!<Option<i64> as GrowHead>::IS_NAMED);
        assert!(<Named<i32> as GrowHead>::IS_NAMED);
        assert!(<Named<&str> as GrowHead>::IS_NAMED);
    }

    #[test]
    fn grow_onto_nil_makes_one_cell() {
        let mut rt = Runtime::new();
        let list = grow(&mut rt, 10, Value::Nil).unwrap();
        assert_eq!(rt.list_length(list), Some(1));
        assert_eq!(rt.car(list), Value::Int(10));
        assert_eq!(rt.cdr(list), Value::Nil);
        assert_eq!(rt.tag(list), None);
    }

    #[test]
    fn grow_shares_the_tail() {
        let mut rt = Runtime::new();
        let tail = grow(&mut rt, 2, Value::Nil).unwrap();
        let a = grow(&mut rt, 1, tail).unwrap();
        let b = grow(&mut rt, named("x", 0), tail).unwrap();
        assert_eq!(rt.cdr(a), tail);
        assert_eq!(rt.cdr(b), tail);
        assert_eq!(rt.list_length(a), Some(2));
        assert_eq!(rt.heap().allocated_count(), 3);
    }

    #[test]
    fn named_head_tags_the_new_cell_only() {
        let mut rt = Runtime::new();
        let tail = grow(&mut rt, 1, Value::Nil).unwrap();
        let list = grow(&mut rt, named("x", 2.5), tail).unwrap();
        assert_eq!(rt.tag_name(list), Some("x"));
        assert_eq!(rt.car(list), Value::Float(2.5));
        assert_eq!(rt.list_tags(list), vec![Some("x"), None]);
    }

    #[test]
    fn empty_name_leaves_cell_untagged() {
        let mut rt = Runtime::new();
        let list = grow(&mut rt, named("", 1), Value::Nil).unwrap();
        assert_eq!(rt.tag(list), None);
        assert!(rt.interner().is_empty());
    }

    #[test]
    fn text_head_becomes_a_string() {
        let mut rt = Runtime::new();
        let inner = grow(&mut rt, "y", Value::Nil).unwrap();
        let list = grow(&mut rt, "x", inner).unwrap();
        let items = rt.list_to_vec(list).unwrap();
        assert_eq!(rt.string_value(items[0]), Some("x"));
        assert_eq!(rt.string_value(items[1]), Some("y"));
        assert_eq!(rt.cdr(rt.cdr(list)), Value::Nil);
    }

    #[test]
    fn conversion_failure_propagates_and_releases_roots() {
        let mut rt = Runtime::new();
        let tail = grow(&mut rt, 1, Value::Nil).unwrap();
        let err = grow(&mut rt, named("big", u64::MAX), tail).unwrap_err();
        assert!(matches!(err, Error::Conversion { type_name: "u64", .. }));
        assert_eq!(rt.heap().root_depth(), 0);
        assert_eq!(rt.heap().allocated_count(), 1);
        assert_eq!(rt.interner().lookup("big"), None);
    }

    #[test]
    fn allocation_failure_propagates() {
        let mut rt = Runtime::with_config(HeapConfig::default().with_max_objects(1));
        let tail = grow(&mut rt, 1, Value::Nil).unwrap();
        let err = grow(&mut rt, 2, tail).unwrap_err();
        assert_eq!(err, Error::HeapExhausted { limit: 1, live: 1 });
    }

    #[test]
    fn unrooted_tail_survives_head_conversion_under_gc_stress() {
        let mut rt = Runtime::with_config(HeapConfig::stress());
        // Each text head allocates, so every step collects with only the
        // grower's own roots keeping the partial list alive.
        let tail = grow(&mut rt, "c", Value::Nil).unwrap();
        let tail = grow(&mut rt, named("b", "b"), tail).unwrap();
        let list = grow(&mut rt, "a", tail).unwrap();

        let mut scope = rt.root_scope();
        scope.protect(list);
        scope.collect();
        let texts: Vec<_> = scope
            .list_to_vec(list)
            .unwrap()
            .into_iter()
            .map(|v| scope.string_value(v).map(str::to_owned))
            .collect();
        assert_eq!(
            texts,
            vec![Some("a".into()), Some("b".into()), Some("c".into())]
        );
        assert_eq!(scope.list_tags(list), vec![None, Some("b"), None]);
    }

    #[test]
    #[should_panic(expected = "stale ObjId")]
    fn unrooted_result_is_reclaimed_by_next_allocation() {
        let mut rt = Runtime::with_config(HeapConfig::stress());
        let list = grow(&mut rt, 1, Value::Nil).unwrap();
        let _ = rt.string("unrelated").unwrap();
        rt.car(list);
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "grow onto non-list tail: integer")]
    fn non_list_tail_is_rejected_in_debug_builds() {
        let mut rt = Runtime::new();
        let _ = grow(&mut rt, 1, Value::Int(2));
    }
}
