//! Pairlist construction: growing one cell at a time, or converting a whole
//! argument list at once.
//!
//! Both builders allocate through the [`Runtime`](crate::Runtime), which may
//! collect at any allocation. Every intermediate value is rooted for exactly
//! as long as the builder needs it; the finished list is returned unrooted,
//! so callers must protect it before their next allocation.

pub mod arglist;
pub mod grow;
pub mod named;


pub use arglist::{to_pairlist, ArgumentList};
pub use grow::{grow, GrowHead};
pub use named::{named, Named};

use crate::lisp::value::Value;

/// The empty pairlist.
pub fn pairlist() -> Value {
    Value::Nil
}

/// Build a pairlist from its elements, in written order.
///
/// Evaluates the runtime expression once, then every element left to right,
/// and only then grows the list from the last element back to the first.
/// Evaluates to `Result<Value>`. Elements may be any [`GrowHead`], so
/// [`named`] arguments can be mixed with plain ones. Heap values passed as
/// elements must already be rooted by the caller.
///
/// ```
/// use neovm_pairlist::{named, pairlist, Runtime};
///
/// let mut rt = Runtime::new();
/// let list = pairlist!(&mut rt; 1, named("b", 2), "c").unwrap();
/// assert_eq!(rt.list_length(list), Some(3));
/// assert_eq!(rt.list_tags(list), vec![None, Some("b"), None]);
/// ```
#[macro_export]
macro_rules! pairlist {
    (@grow $rt:ident;) => {
        ::core::result::Result::<$crate::Value, $crate::Error>::Ok($crate::pairlist::pairlist())
    };
    (@grow $rt:ident; $head:expr $(, $rest:expr)*) => {{
        let head = $head;
        match $crate::pairlist!(@grow $rt; $($rest),*) {
            ::core::result::Result::Ok(tail) => $crate::pairlist::grow($rt, head, tail),
            ::core::result::Result::Err(err) => ::core::result::Result::Err(err),
        }
    }};
    ($rt:expr $(;)?) => {{
        let _: &mut $crate::Runtime = $rt;
        ::core::result::Result::<$crate::Value, $crate::Error>::Ok($crate::pairlist::pairlist())
    }};
    ($rt:expr; $($head:expr),+ $(,)?) => {{
        let rt: &mut $crate::Runtime = $rt;
        $crate::pairlist!(@grow rt; $($head),+)
    }};
}
