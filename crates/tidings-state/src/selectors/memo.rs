use std::fmt;
use std::sync::Arc;

/// Cache of one projection of a slice, valid as long as the slice's `Arc` is
/// the same allocation.
///
/// The cache holds a clone of the input `Arc`, so the allocation cannot be
/// freed and reused while cached.
pub struct Memo<S, T> {
    cached: Option<(Arc<S>, Arc<T>)>,
}

impl<S, T> Memo<S, T> {
    pub fn new() -> Self {
        Self { cached: None }
    }

    /// The cached output for `input`, or `compute(input)` if the slice changed.
    pub fn get<F>(&mut self, input: &Arc<S>, compute: F) -> Arc<T>
    where
        F: FnOnce(&S) -> T,
    {
        if let Some((cached_input, output)) = &self.cached {
            if Arc::ptr_eq(cached_input, input) {
                return Arc::clone(output);
            }
        }
        let output = Arc::new(compute(input));
        self.cached = Some((Arc::clone(input), Arc::clone(&output)));
        output
    }

    pub fn clear(&mut self) {
        self.cached = None;
    }
}

impl<S, T> Default for Memo<S, T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S, T> fmt::Debug for Memo<S, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Memo")
            .field("cached", &self.cached.is_some())
            .finish()
    }
}
