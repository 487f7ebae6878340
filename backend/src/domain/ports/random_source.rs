//! Driven port supplying randomness to reviewer selection.

/// Source of uniformly distributed indices.
#[cfg_attr(test, mockall::automock)]
pub trait RandomSource: Send + Sync {
    /// Return an index in `0..upper`. Callers never pass `upper == 0`.
    fn next_index(&self, upper: usize) -> usize;
}

/// Deterministic source that always picks the first remaining candidate.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureRandomSource;

impl RandomSource for FixtureRandomSource {
    fn next_index(&self, _upper: usize) -> usize {
        0
    }
}
