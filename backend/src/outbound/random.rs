//! `rand`-backed random sources.

use std::sync::{Mutex, PoisonError};

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::domain::ports::RandomSource;

/// Draws from the thread-local generator.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadRandomSource;

impl RandomSource for ThreadRandomSource {
    fn next_index(&self, upper: usize) -> usize {
        rand::thread_rng().gen_range(0..upper.max(1))
    }
}

/// Reproducible generator for tests and replayable runs.
#[derive(Debug)]
pub struct SeededRandomSource(Mutex<SmallRng>);

impl SeededRandomSource {
    pub fn new(seed: u64) -> Self {
        Self(Mutex::new(SmallRng::seed_from_u64(seed)))
    }
}

impl RandomSource for SeededRandomSource {
    fn next_index(&self, upper: usize) -> usize {
        let mut rng = self.0.lock().unwrap_or_else(PoisonError::into_inner);
        rng.gen_range(0..upper.max(1))
    }
}
