//! Argument lists and their bulk conversion to pairlists.

use std::ops::Index;

use crate::error::{Error, Result};
use crate::gc::GcTrace;
use crate::lisp::runtime::Runtime;
use crate::lisp::value::Value;

/// Ordered call arguments with optional per-position names.
///
/// `names` is either `None` (no argument is named) or holds exactly one
/// entry per value. `None` and `Some("")` entries both mean "unnamed".
/// The fields are public; [`to_pairlist`] rejects a `names` whose length
/// disagrees with `values`.
///
/// The values are ordinary unrooted `Value`s: keep them reachable (for
/// example with [`RootScope::protect_all`](crate::gc::RootScope::protect_all))
/// across any allocation made while the list is being assembled.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ArgumentList {
    pub values: Vec<Value>,
    pub names: Option<Vec<Option<String>>>,
}

impl ArgumentList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_values(values: Vec<Value>) -> Self {
        Self {
            values,
            names: None,
        }
    }

    /// Values with one name slot each. Fails if the lengths differ.
    pub fn with_names(values: Vec<Value>, names: Vec<Option<String>>) -> Result<Self> {
        let mut args = Self::from_values(values);
        args.set_names(names)?;
        Ok(args)
    }

    pub fn set_names(&mut self, names: Vec<Option<String>>) -> Result<()> {
        if names.len() != self.values.len() {
            return Err(Error::NamesLengthMismatch {
                values: self.values.len(),
                names: names.len(),
            });
        }
        self.names = Some(names);
        Ok(())
    }

    /// Append an unnamed argument.
    pub fn push(&mut self, value: Value) {
        self.values.push(value);
        if let Some(names) = &mut self.names {
            names.push(None);
        }
    }

    /// Append a named argument, giving earlier arguments empty name slots
    /// if this is the first name.
    pub fn push_named(&mut self, name: impl Into<String>, value: Value) {
        let len = self.values.len();
        self.names
            .get_or_insert_with(|| vec![None; len])
            .push(Some(name.into()));
        self.values.push(value);
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Name at `index`, if present and non-empty.
    pub fn name(&self, index: usize) -> Option<&str> {
        self.names
            .as_ref()?
            .get(index)?
            .as_deref()
            .filter(|name| !name.is_empty())
    }

    pub fn has_names(&self) -> bool {
        self.names.is_some()
    }

    /// `(value, name)` pairs in order, with empty names reported as `None`.
    pub fn iter(&self) -> impl Iterator<Item = (Value, Option<&str>)> + '_ {
        self.values
            .iter()
            .enumerate()
            .map(|(i, value)| (*value, self.name(i)))
    }
}

impl Index<usize> for ArgumentList {
    type Output = Value;

    fn index(&self, index: usize) -> &Value {
        &self.values[index]
    }
}

impl FromIterator<Value> for ArgumentList {
    fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Self {
        Self::from_values(iter.into_iter().collect())
    }
}

impl GcTrace for ArgumentList {
    fn trace_roots(&self, roots: &mut Vec<Value>) {
        roots.extend_from_slice(&self.values);
    }
}

/// Build a pairlist holding `args` in order, tagging cells whose name is
/// present and non-empty.
///
/// All `n` cells are allocated in one request and then filled front to
/// back, so no reversal is needed and only the chain and the argument
/// values need rooting. `args` is not modified.
pub fn to_pairlist(rt: &mut Runtime, args: &ArgumentList) -> Result<Value> {
    let n = args.values.len();
    if let Some(names) = &args.names {
        if names.len() != n {
            return Err(Error::NamesLengthMismatch {
                values: n,
                names: names.len(),
            });
        }
    }
    if n == 0 {
        return Ok(Value::Nil);
    }

    let mut scope = rt.root_scope();
    scope.protect_all(args);
    let list = scope.alloc_list(n)?;
    scope.protect(list);

    let mut cell = list;
    let mut tagged = 0usize;
    match &args.names {
        None => {
            for &value in &args.values {
                scope.set_car(cell, value);
                cell = scope.cdr(cell);
            }
        }
        Some(names) => {
            for (&value, name) in args.values.iter().zip(names) {
                scope.set_car(cell, value);
                if let Some(name) = name.as_deref().filter(|name| !name.is_empty()) {
                    let sym = scope.intern(name);
                    scope.set_tag(cell, sym);
                    tagged += 1;
                }
                cell = scope.cdr(cell);
            }
        }
    }
    tracing::trace!(cells = n, tagged, "argument list converted to pairlist");
    Ok(list)
}
