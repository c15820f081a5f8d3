use crate::resolver::Candidate;

/// Trait for abstracting candidate selection strategies.
///
/// One instance is shared by every request routed through a handler, so
/// implementations keep their state behind an atomic or a short-lived lock.
pub trait SelectionStrategy: Send + Sync {
    /// Picks an index in `0..len`. Returns `None` for `len == 0` without
    /// advancing any internal state.
    fn pick_index(&self, len: usize) -> Option<usize>;

    fn pick<'a>(&self, candidates: &'a [Candidate]) -> Option<&'a Candidate> {
        self.pick_index(candidates.len()).map(|idx| &candidates[idx])
    }
}
