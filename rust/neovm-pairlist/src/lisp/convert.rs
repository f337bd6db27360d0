//! Conversion of native Rust values into Lisp values.

use super::intern::SymId;
use super::runtime::Runtime;
use super::value::Value;
use crate::error::{Error, Result};

/// Native values that can be turned into a [`Value`].
///
/// Conversion may allocate, and so may collect: implementations that hold a
/// `Value` across an allocation must root it first.
pub trait IntoLisp {
    fn into_lisp(self, rt: &mut Runtime) -> Result<Value>;
}

impl IntoLisp for Value {
    fn into_lisp(self, _rt: &mut Runtime) -> Result<Value> {
        Ok(self)
    }
}

impl IntoLisp for SymId {
    fn into_lisp(self, _rt: &mut Runtime) -> Result<Value> {
        Ok(Value::Symbol(self))
    }
}

impl IntoLisp for bool {
    fn into_lisp(self, _rt: &mut Runtime) -> Result<Value> {
        Ok(Value::bool(self))
    }
}

impl IntoLisp for char {
    fn into_lisp(self, _rt: &mut Runtime) -> Result<Value> {
        Ok(Value::Char(self))
    }
}

macro_rules! lossless_int {
    ($($ty:ty),*) => {
        $(
            impl IntoLisp for $ty {
                fn into_lisp(self, _rt: &mut Runtime) -> Result<Value> {
                    Ok(Value::Int(i64::from(self)))
                }
            }
        )*
    };
}

lossless_int!(i8, i16, i32, i64, u8, u16, u32);

macro_rules! checked_int {
    ($($ty:ty),*) => {
        $(
            impl IntoLisp for $ty {
                fn into_lisp(self, _rt: &mut Runtime) -> Result<Value> {
                    i64::try_from(self).map(Value::Int).map_err(|_| {
                        Error::conversion(
                            stringify!($ty),
                            format!("{} is outside the fixnum range", self),
                        )
                    })
                }
            }
        )*
    };
}

checked_int!(u64, usize, isize, i128, u128);

impl IntoLisp for f64 {
    fn into_lisp(self, _rt: &mut Runtime) -> Result<Value> {
        Ok(Value::Float(self))
    }
}

impl IntoLisp for f32 {
    fn into_lisp(self, _rt: &mut Runtime) -> Result<Value> {
        Ok(Value::Float(f64::from(self)))
    }
}

/// Lisp strings are NUL-free.
fn check_text(type_name: &'static str, s: &str) -> Result<()> {
    match s.find('\0') {
        Some(pos) => Err(Error::conversion(
            type_name,
            format!("embedded NUL at byte {pos}"),
        )),
        None => Ok(()),
    }
}

impl IntoLisp for &str {
    fn into_lisp(self, rt: &mut Runtime) -> Result<Value> {
        check_text("&str", self)?;
        rt.string(self)
    }
}

impl IntoLisp for String {
    fn into_lisp(self, rt: &mut Runtime) -> Result<Value> {
        check_text("String", &self)?;
        rt.string(self)
    }
}

impl IntoLisp for &String {
    fn into_lisp(self, rt: &mut Runtime) -> Result<Value> {
        self.as_str().into_lisp(rt)
    }
}

/// `None` converts to nil.
impl<T: IntoLisp> IntoLisp for Option<T> {
    fn into_lisp(self, rt: &mut Runtime) -> Result<Value> {
        match self {
            Some(inner) => inner.into_lisp(rt),
            None => Ok(Value::Nil),
        }
    }
}

/// A `Vec` converts to a proper list of its converted elements.
impl<T: IntoLisp> IntoLisp for Vec<T> {
    fn into_lisp(self, rt: &mut Runtime) -> Result<Value> {
        let mut scope = rt.root_scope();
        let mut list = Value::Nil;
        for item in self.into_iter().rev() {
            let car = item.into_lisp(&mut scope)?;
            list = scope.cons(car, list)?;
            scope.protect(list);
        }
        Ok(list)
    }
}
