use parking_lot::Mutex;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use super::strategy::SelectionStrategy;

/// Picks a uniformly distributed candidate from a seeded generator.
///
/// The sequence of picks depends only on the seed and the number of calls,
/// never on wall-clock time or OS entropy. ChaCha8 output for a given seed
/// is fixed across platforms and releases, and indices are drawn at `u64`
/// width so 32- and 64-bit targets agree.
pub struct RandomStrategy {
    rng: Mutex<ChaCha8Rng>,
}

impl RandomStrategy {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Mutex::new(ChaCha8Rng::seed_from_u64(seed)),
        }
    }
}

impl Default for RandomStrategy {
    fn default() -> Self {
        Self::new(0)
    }
}

impl SelectionStrategy for RandomStrategy {
    fn pick_index(&self, len: usize) -> Option<usize> {
        if len == 0 {
            return None;
        }
        let idx = self.rng.lock().gen_range(0..len as u64);
        Some(idx as usize)
    }
}
