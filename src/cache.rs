//! Memoization of per-point quantities.

/// A value memoized for the most recently requested point index.
///
/// Requesting the same index again is a no-op; requesting a different index recomputes
/// the value. The cache is emptied when the element or the point set changes.
#[derive(Debug, Clone)]
pub struct PointCache<V> {
    entry: Option<(usize, V)>,
}

impl<V> Default for PointCache<V> {
    fn default() -> Self {
        Self { entry: None }
    }
}

impl<V> PointCache<V> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn invalidate(&mut self) {
        self.entry = None;
    }

    /// The point index of the memoized value, if any.
    pub fn index(&self) -> Option<usize> {
        self.entry.as_ref().map(|(index, _)| *index)
    }

    pub fn is_current(&self, index: usize) -> bool {
        self.index() == Some(index)
    }

    /// Returns the value for `index`, computing it with `compute` unless it is already memoized.
    pub fn get_or_insert_with(&mut self, index: usize, compute: impl FnOnce() -> V) -> &V {
        if !self.is_current(index) {
            let value = compute();
            self.entry = Some((index, value));
        }
        self.value()
    }

    /// The memoized value.
    ///
    /// # Panics
    ///
    /// Panics if nothing is memoized.
    pub fn value(&self) -> &V {
        let (_, value) = self
            .entry
            .as_ref()
            .expect("Internal error: point cache queried before it was populated");
        value
    }
}
