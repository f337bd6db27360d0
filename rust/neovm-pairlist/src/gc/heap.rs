//! Arena-based heap with a root stack and stop-the-world mark-and-sweep.

use super::types::{HeapObject, ObjId};
use crate::config::HeapConfig;
use crate::error::{Error, Result};
use crate::lisp::intern::SymId;
use crate::lisp::value::Value;

/// The managed heap for cons cells and strings.
pub struct LispHeap {
    objects: Vec<HeapObject>,
    generations: Vec<u32>,
    marks: Vec<bool>,
    free_list: Vec<u32>,
    allocated_count: usize,
    gc_threshold: usize,
    /// Values that must survive the next collection (the protect stack).
    roots: Vec<Value>,
    config: HeapConfig,
    collections: usize,
}

impl LispHeap {
    pub fn new() -> Self {
        Self::with_config(HeapConfig::default())
    }

    pub fn with_config(config: HeapConfig) -> Self {
        Self {
            objects: Vec::new(),
            generations: Vec::new(),
            marks: Vec::new(),
            free_list: Vec::new(),
            allocated_count: 0,
            gc_threshold: config.gc_threshold.max(1),
            roots: Vec::new(),
            config,
            collections: 0,
        }
    }

    // -----------------------------------------------------------------------
    // Allocation
    // -----------------------------------------------------------------------

    /// Make room for `count` new objects.
    ///
    /// This is the only point where a collection can run. Anything not
    /// reachable from the root stack (or from `pending`) is reclaimed here.
    fn reserve(&mut self, count: usize, pending: &[Value]) -> Result<()> {
        if self.config.gc_stress || self.should_collect() {
            self.collect(pending.iter().copied());
        }
        if let Some(limit) = self.config.max_objects {
            if self.allocated_count.saturating_add(count) > limit {
                tracing::warn!(
                    requested = count,
                    live = self.allocated_count,
                    limit,
                    "allocation refused: heap limit reached"
                );
                return Err(Error::HeapExhausted {
                    limit,
                    live: self.allocated_count,
                });
            }
        }
        Ok(())
    }

    fn alloc(&mut self, obj: HeapObject) -> ObjId {
        self.allocated_count += 1;
        if let Some(idx) = self.free_list.pop() {
            let i = idx as usize;
            self.generations[i] = self.generations[i].wrapping_add(1);
            self.objects[i] = obj;
            self.marks[i] = false;
            ObjId {
                index: idx,
                generation: self.generations[i],
            }
        } else {
            let idx = self.objects.len() as u32;
            self.objects.push(obj);
            self.generations.push(0);
            self.marks.push(false);
            ObjId {
                index: idx,
                generation: 0,
            }
        }
    }

    /// Allocate one cons cell. `car` and `cdr` are kept alive across any
    /// collection this allocation triggers.
    pub fn alloc_cons(&mut self, car: Value, cdr: Value) -> Result<ObjId> {
        self.reserve(1, &[car, cdr])?;
        Ok(self.alloc(HeapObject::Cons {
            car,
            cdr,
            tag: None,
        }))
    }

    /// Allocate `n` linked cells with nil cars and no tags, returning the
    /// head of the chain (`Value::Nil` when `n == 0`).
    ///
    /// Collection only runs before the first cell is created, so the
    /// partially built chain never needs rooting.
    pub fn alloc_chain(&mut self, n: usize) -> Result<Value> {
        if n == 0 {
            return Ok(Value::Nil);
        }
        self.reserve(n, &[])?;
        let mut head = Value::Nil;
        for _ in 0..n {
            head = Value::Cons(self.alloc(HeapObject::Cons {
                car: Value::Nil,
                cdr: head,
                tag: None,
            }));
        }
        Ok(head)
    }

    pub fn alloc_string(&mut self, s: String) -> Result<ObjId> {
        self.reserve(1, &[])?;
        Ok(self.alloc(HeapObject::Str(s)))
    }

    /// Current allocation threshold used by opportunistic GC call sites.
    pub fn gc_threshold(&self) -> usize {
        self.gc_threshold
    }

    /// Update the allocation threshold used by opportunistic GC call sites.
    /// Clamp to 1 so callers never disable threshold checks with zero.
    pub fn set_gc_threshold(&mut self, threshold: usize) {
        self.gc_threshold = threshold.max(1);
    }

    /// True when allocated objects reached the configured threshold.
    pub fn should_collect(&self) -> bool {
        self.allocated_count >= self.gc_threshold
    }

    // -----------------------------------------------------------------------
    // Root stack
    // -----------------------------------------------------------------------

    pub fn push_root(&mut self, value: Value) {
        self.roots.push(value);
    }

    pub fn root_depth(&self) -> usize {
        self.roots.len()
    }

    /// Pop roots back down to `depth`. Never grows the stack.
    pub fn truncate_roots(&mut self, depth: usize) {
        debug_assert!(
            depth <= self.roots.len(),
            "root stack underflow: restoring depth {depth} > {}",
            self.roots.len()
        );
        self.roots.truncate(depth);
    }

    // -----------------------------------------------------------------------
    // Checked access
    // -----------------------------------------------------------------------

    #[inline]
    fn check(&self, id: ObjId) {
        let i = id.index as usize;
        assert!(
            i < self.objects.len() && self.generations[i] == id.generation,
            "stale ObjId: {:?} (current gen={})",
            id,
            if i < self.generations.len() {
                self.generations[i]
            } else {
                u32::MAX
            }
        );
    }

    pub fn get(&self, id: ObjId) -> &HeapObject {
        self.check(id);
        &self.objects[id.index as usize]
    }

    pub fn get_mut(&mut self, id: ObjId) -> &mut HeapObject {
        self.check(id);
        &mut self.objects[id.index as usize]
    }

    /// True if `id` still names a live object.
    pub fn is_live(&self, id: ObjId) -> bool {
        let i = id.index as usize;
        i < self.objects.len()
            && self.generations[i] == id.generation
            && !matches!(self.objects[i], HeapObject::Free)
    }

    // -----------------------------------------------------------------------
    // Cons accessors
    // -----------------------------------------------------------------------

    pub fn cons_car(&self, id: ObjId) -> Value {
        match self.get(id) {
            HeapObject::Cons { car, .. } => *car,
            _ => panic!("cons_car on non-cons"),
        }
    }

    pub fn cons_cdr(&self, id: ObjId) -> Value {
        match self.get(id) {
            HeapObject::Cons { cdr, .. } => *cdr,
            _ => panic!("cons_cdr on non-cons"),
        }
    }

    pub fn cons_tag(&self, id: ObjId) -> Option<SymId> {
        match self.get(id) {
            HeapObject::Cons { tag, .. } => *tag,
            _ => panic!("cons_tag on non-cons"),
        }
    }

    pub fn set_car(&mut self, id: ObjId, val: Value) {
        match self.get_mut(id) {
            HeapObject::Cons { car, .. } => *car = val,
            _ => panic!("set_car on non-cons"),
        }
    }

    pub fn set_tag(&mut self, id: ObjId, sym: Option<SymId>) {
        match self.get_mut(id) {
            HeapObject::Cons { tag, .. } => *tag = sym,
            _ => panic!("set_tag on non-cons"),
        }
    }

    // -----------------------------------------------------------------------
    // String accessors
    // -----------------------------------------------------------------------

    pub fn get_string(&self, id: ObjId) -> &String {
        match self.get(id) {
            HeapObject::Str(s) => s,
            _ => panic!("get_string on non-string"),
        }
    }

    // -----------------------------------------------------------------------
    // List helpers
    // -----------------------------------------------------------------------

    pub fn list_to_vec(&self, value: &Value) -> Option<Vec<Value>> {
        let mut result = Vec::new();
        let mut cursor = *value;
        loop {
            match cursor {
                Value::Nil => return Some(result),
                Value::Cons(id) => {
                    result.push(self.cons_car(id));
                    cursor = self.cons_cdr(id);
                }
                _ => return None,
            }
        }
    }

    pub fn list_length(&self, value: &Value) -> Option<usize> {
        let mut len = 0;
        let mut cursor = *value;
        loop {
            match cursor {
                Value::Nil => return Some(len),
                Value::Cons(id) => {
                    len += 1;
                    cursor = self.cons_cdr(id);
                }
                _ => return None,
            }
        }
    }

    // -----------------------------------------------------------------------
    // Structural equality
    // -----------------------------------------------------------------------

    /// Structural equality: same shape, equal atoms, equal string contents
    /// and the same tag on every cell. The cdr chain is walked iteratively,
    /// so list length is unbounded; `depth` only counts car nesting.
    pub fn equal_value(&self, a: &Value, b: &Value, depth: usize) -> bool {
        if depth > 4096 {
            return false;
        }
        let (mut a, mut b) = (*a, *b);
        loop {
            match (a, b) {
                (Value::Cons(ai), Value::Cons(bi)) => {
                    if ai == bi {
                        return true;
                    }
                    if self.cons_tag(ai) != self.cons_tag(bi)
                        || !self.equal_value(&self.cons_car(ai), &self.cons_car(bi), depth + 1)
                    {
                        return false;
                    }
                    a = self.cons_cdr(ai);
                    b = self.cons_cdr(bi);
                }
                (Value::Str(ai), Value::Str(bi)) => {
                    return ai == bi || self.get_string(ai) == self.get_string(bi);
                }
                _ => return a == b,
            }
        }
    }

    // -----------------------------------------------------------------------
    // Mark-and-sweep collection
    // -----------------------------------------------------------------------

    /// Collect garbage. Everything reachable from the root stack or from
    /// `extra_roots` survives; everything else is freed.
    pub fn collect(&mut self, extra_roots: impl Iterator<Item = Value>) {
        let before = self.allocated_count;

        for m in self.marks.iter_mut() {
            *m = false;
        }
        self.marks.resize(self.objects.len(), false);

        let mut gray = Vec::new();
        for root in self.roots.iter().copied().chain(extra_roots) {
            Self::push_value_ids(&root, &mut gray);
        }
        self.mark_all(gray);
        self.sweep_all();

        self.collections += 1;
        // Next GC triggers at 2x surviving objects, never below the configured floor.
        self.gc_threshold = self
            .allocated_count
            .saturating_mul(2)
            .max(self.config.gc_threshold.max(1));

        tracing::debug!(
            before,
            after = self.allocated_count,
            roots = self.roots.len(),
            threshold = self.gc_threshold,
            "gc cycle finished"
        );
    }

    fn mark_all(&mut self, mut gray: Vec<ObjId>) {
        while let Some(id) = gray.pop() {
            let i = id.index as usize;
            if i >= self.marks.len() || self.marks[i] {
                continue;
            }
            if self.generations[i] != id.generation {
                continue; // stale
            }
            self.marks[i] = true;
            for child in self.objects[i].trace_values() {
                Self::push_value_ids(&child, &mut gray);
            }
        }
    }

    fn sweep_all(&mut self) {
        for i in 0..self.objects.len() {
            if !self.marks[i] && !matches!(self.objects[i], HeapObject::Free) {
                self.objects[i] = HeapObject::Free;
                self.generations[i] = self.generations[i].wrapping_add(1);
                self.free_list.push(i as u32);
                self.allocated_count = self.allocated_count.saturating_sub(1);
            }
        }
    }

    fn push_value_ids(val: &Value, worklist: &mut Vec<ObjId>) {
        if let Some(id) = val.obj_id() {
            worklist.push(id);
        }
    }

    // -----------------------------------------------------------------------
    // Stats
    // -----------------------------------------------------------------------

    pub fn allocated_count(&self) -> usize {
        self.allocated_count
    }

    /// Number of completed collections since the heap was created.
    pub fn collections(&self) -> usize {
        self.collections
    }
}

impl Default for LispHeap {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alloc_cons_read() {
        let mut heap = LispHeap::new();
        let id = heap.alloc_cons(Value::Int(1), Value::Int(2)).unwrap();
        assert_eq!(heap.cons_car(id), Value::Int(1));
        assert_eq!(heap.cons_cdr(id), Value::Int(2));
        assert_eq!(heap.cons_tag(id), None);
    }

    #[test]
    fn free_list_reuse() {
        let mut heap = LispHeap::new();
        let id1 = heap.alloc_cons(Value::Nil, Value::Nil).unwrap();
        let idx = id1.index;
        heap.collect(std::iter::empty());
        let id2 = heap.alloc_cons(Value::Int(42), Value::Nil).unwrap();
        assert_eq!(id2.index, idx);
        assert_ne!(id2.generation, id1.generation);
    }

    #[test]
    #[should_panic(expected = "stale ObjId")]
    fn stale_id_panics() {
        let mut heap = LispHeap::new();
        let id = heap.alloc_cons(Value::Nil, Value::Nil).unwrap();
        heap.collect(std::iter::empty());
        let _ = heap.cons_car(id);
    }

    #[test]
    fn root_stack_keeps_objects_alive() {
        let mut heap = LispHeap::new();
        let a = heap.alloc_cons(Value::Int(1), Value::Nil).unwrap();
        let b = heap.alloc_cons(Value::Int(2), Value::Nil).unwrap();
        let depth = heap.root_depth();
        heap.push_root(Value::Cons(b));
        heap.collect(std::iter::empty());
        assert!(!heap.is_live(a));
        assert!(heap.is_live(b));

        heap.truncate_roots(depth);
        heap.collect(std::iter::empty());
        assert!(!heap.is_live(b));
        assert_eq!(heap.allocated_count(), 0);
    }

    #[test]
    fn collect_follows_cdr_chain() {
        let mut heap = LispHeap::new();
        let tail = heap.alloc_chain(3).unwrap();
        let s = heap.alloc_string("x".into()).unwrap();
        let Value::Cons(head) = tail else {
            panic!("expected a cons");
        };
        heap.set_car(head, Value::Str(s));
        heap.collect([tail].into_iter());
        assert_eq!(heap.allocated_count(), 4);
        assert_eq!(heap.list_length(&tail), Some(3));
    }

    #[test]
    fn alloc_chain_links_untagged_nil_cells() {
        let mut heap = LispHeap::new();
        assert_eq!(heap.alloc_chain(0).unwrap(), Value::Nil);
        let chain = heap.alloc_chain(4).unwrap();
        assert_eq!(heap.list_to_vec(&chain).unwrap(), vec![Value::Nil; 4]);
        let mut cursor = chain;
        while let Value::Cons(id) = cursor {
            assert_eq!(heap.cons_tag(id), None);
            cursor = heap.cons_cdr(id);
        }
    }

    #[test]
    fn stress_mode_collects_before_each_allocation() {
        let mut heap = LispHeap::with_config(HeapConfig::stress());
        let kept = heap.alloc_cons(Value::Int(1), Value::Nil).unwrap();
        heap.push_root(Value::Cons(kept));
        let dropped = heap.alloc_cons(Value::Int(2), Value::Nil).unwrap();
        let _ = heap.alloc_cons(Value::Int(3), Value::Nil).unwrap();
        assert!(heap.is_live(kept));
        assert!(!heap.is_live(dropped));
        assert_eq!(heap.collections(), 3);
    }

    #[test]
    fn alloc_cons_protects_its_operands() {
        let mut heap = LispHeap::with_config(HeapConfig::stress());
        let inner = heap.alloc_cons(Value::Int(1), Value::Nil).unwrap();
        // `inner` is unrooted, but is the cdr of the cell being allocated.
        let outer = heap.alloc_cons(Value::Int(0), Value::Cons(inner)).unwrap();
        assert!(heap.is_live(inner));
        assert_eq!(heap.cons_cdr(outer), Value::Cons(inner));
    }

    #[test]
    fn heap_limit_refuses_allocation() {
        let mut heap = LispHeap::with_config(HeapConfig::default().with_max_objects(2));
        let a = heap.alloc_cons(Value::Int(1), Value::Nil).unwrap();
        heap.push_root(Value::Cons(a));
        let _ = heap.alloc_cons(Value::Int(2), Value::Nil).unwrap();
        let err = heap.alloc_chain(2).unwrap_err();
        assert_eq!(err, Error::HeapExhausted { limit: 2, live: 2 });
    }

    #[test]
    fn heap_limit_counts_after_collection() {
        let config = HeapConfig {
            gc_threshold: 1,
            ..HeapConfig::default().with_max_objects(1)
        };
        let mut heap = LispHeap::with_config(config);
        let _ = heap.alloc_cons(Value::Int(1), Value::Nil).unwrap();
        // The first cell is garbage; the threshold-driven collection frees it.
        let b = heap.alloc_cons(Value::Int(2), Value::Nil).unwrap();
        assert_eq!(heap.cons_car(b), Value::Int(2));
    }

    #[test]
    fn structural_equality() {
        let mut heap = LispHeap::new();
        let a = heap.alloc_cons(Value::Int(1), Value::Int(2)).unwrap();
        let b = heap.alloc_cons(Value::Int(1), Value::Int(2)).unwrap();
        assert!(heap.equal_value(&Value::Cons(a), &Value::Cons(b), 0));
        heap.set_tag(b, Some(SymId(0)));
        assert!(!heap.equal_value(&Value::Cons(a), &Value::Cons(b), 0));
        let c = heap.alloc_cons(Value::Int(1), Value::Int(3)).unwrap();
        assert!(!heap.equal_value(&Value::Cons(a), &Value::Cons(c), 0));
    }

    #[test]
    fn equality_walks_lists_longer_than_the_nesting_cap() {
        let mut heap = LispHeap::new();
        let a = heap.alloc_chain(5000).unwrap();
        let b = heap.alloc_chain(5000).unwrap();
        assert!(heap.equal_value(&a, &b, 0));

        let mut last = b;
        while let Value::Cons(id) = heap.cons_cdr(last.obj_id().unwrap()) {
            last = Value::Cons(id);
        }
        heap.set_car(last.obj_id().unwrap(), Value::Int(1));
        assert!(!heap.equal_value(&a, &b, 0));
    }

    #[test]
    fn gc_threshold_is_configurable_and_clamped() {
        let mut heap = LispHeap::new();
        assert_eq!(heap.gc_threshold(), 8192);
        heap.set_gc_threshold(0);
        assert_eq!(heap.gc_threshold(), 1);
        heap.set_gc_threshold(64);
        assert_eq!(heap.gc_threshold(), 64);
    }

    #[test]
    fn should_collect_tracks_allocations_against_threshold() {
        let mut heap = LispHeap::new();
        heap.set_gc_threshold(2);
        assert!(!heap.should_collect());
        let _ = heap.alloc_cons(Value::Int(1), Value::Nil).unwrap();
        assert!(!heap.should_collect());
        let _ = heap.alloc_cons(Value::Int(2), Value::Nil).unwrap();
        assert!(heap.should_collect());
    }
}
