//! Tag symbols. Names are interned into an append-only table owned by the
//! [`Runtime`](crate::Runtime); they are never collected, so a tag stored on
//! a cell needs no rooting.

use std::collections::HashMap;

/// Index of a tag name in its [`StringInterner`].
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct SymId(pub(crate) u32);

/// Name table. Equal names share one [`SymId`], so tags compare by id.
#[derive(Default)]
pub struct StringInterner {
    names: Vec<String>,
    ids: HashMap<String, SymId>,
}

impl StringInterner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn intern(&mut self, name: &str) -> SymId {
        if let Some(&id) = self.ids.get(name) {
            return id;
        }
        let id = SymId(self.names.len() as u32);
        self.names.push(name.to_owned());
        self.ids.insert(name.to_owned(), id);
        id
    }

    /// Id of `name` if it is already a tag, without adding it.
    pub fn lookup(&self, name: &str) -> Option<SymId> {
        self.ids.get(name).copied()
    }

    /// Panics on an id from another interner.
    pub fn resolve(&self, id: SymId) -> &str {
        &self.names[id.0 as usize]
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equal_names_share_an_id() {
        let mut interner = StringInterner::new();
        let a = interner.intern("foo");
        let b = interner.intern("foo");
        let c = interner.intern("bar");
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(interner.resolve(a), "foo");
        assert_eq!(interner.resolve(c), "bar");
        assert_eq!(interner.len(), 2);
    }

    #[test]
    fn lookup_does_not_intern() {
        let mut interner = StringInterner::new();
        assert_eq!(interner.lookup("x"), None);
        assert!(interner.is_empty());
        let x = interner.intern("x");
        assert_eq!(interner.lookup("x"), Some(x));
    }
}
