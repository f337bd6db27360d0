//! Heap configuration, with `NEOVM_*` environment overrides.

/// Default allocation count that triggers a collection.
pub const DEFAULT_GC_THRESHOLD: usize = 8192;

/// Tuning knobs for [`LispHeap`](crate::gc::LispHeap).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HeapConfig {
    /// Allocation count at which the next allocation collects first.
    pub gc_threshold: usize,
    /// Upper bound on live objects. `None` means unbounded.
    pub max_objects: Option<usize>,
    /// Collect before every allocation. Makes missing roots fail fast.
    pub gc_stress: bool,
}

impl Default for HeapConfig {
    fn default() -> Self {
        Self {
            gc_threshold: DEFAULT_GC_THRESHOLD,
            max_objects: None,
            gc_stress: false,
        }
    }
}

impl HeapConfig {
    /// Defaults overridden by `NEOVM_GC_THRESHOLD`, `NEOVM_HEAP_LIMIT`
    /// and `NEOVM_GC_STRESS`.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Like [`from_env`](Self::from_env) but reading through `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        if let Some(threshold) = parse_count(&lookup, "NEOVM_GC_THRESHOLD") {
            config.gc_threshold = threshold.max(1);
        }
        if let Some(limit) = parse_count(&lookup, "NEOVM_HEAP_LIMIT") {
            config.max_objects = Some(limit);
        }
        if let Some(raw) = lookup("NEOVM_GC_STRESS") {
            config.gc_stress = !matches!(raw.trim(), "" | "0" | "false" | "off");
        }
        config
    }

    pub fn stress() -> Self {
        Self {
            gc_stress: true,
            ..Self::default()
        }
    }

    pub fn with_max_objects(mut self, limit: usize) -> Self {
        self.max_objects = Some(limit);
        self
    }
}

fn parse_count(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<usize> {
    let raw = lookup(key)?;
    match raw.trim().parse::<usize>() {
        Ok(n) => Some(n),
        Err(err) => {
            tracing::warn!("ignoring {key}={raw:?}: {err}");
            None
        }
    }
}
