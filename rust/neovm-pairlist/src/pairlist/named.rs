//! `Named` marks a single head as carrying a cell tag.

/// A payload paired with the argument name its cell should be tagged with.
///
/// Growing a list with a `Named` head tags the new cell with `name`; an empty
/// name leaves the cell untagged.
#[derive(Clone, Debug, PartialEq)]
pub struct Named<T> {
    name: String,
    value: T,
}

impl<T> Named<T> {
    pub fn new(name: impl Into<String>, value: T) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> &T {
        &self.value
    }

    pub fn into_parts(self) -> (String, T) {
        (self.name, self.value)
    }
}

/// Shorthand for [`Named::new`].
pub fn named<T>(name: impl Into<String>, value: T) -> Named<T> {
    Named::new(name, value)
}
