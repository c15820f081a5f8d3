use std::sync::atomic::{AtomicU64, Ordering};

use super::strategy::SelectionStrategy;

/// Cycles through candidates, advancing one position per call.
///
/// The counter starts at the seed and is incremented before use, so the
/// first pick for seed `s` is index `(s + 1) % len`.
pub struct RoundRobinStrategy {
    counter: AtomicU64,
}

impl RoundRobinStrategy {
    pub fn new(seed: u64) -> Self {
        Self {
            counter: AtomicU64::new(seed),
        }
    }
}

impl Default for RoundRobinStrategy {
    fn default() -> Self {
        Self::new(0)
    }
}

impl SelectionStrategy for RoundRobinStrategy {
    fn pick_index(&self, len: usize) -> Option<usize> {
        if len == 0 {
            return None;
        }

        let ticket = self.counter.fetch_add(1, Ordering::Relaxed).wrapping_add(1);
        Some((ticket % len as u64) as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Arc;

    #[test]
    fn first_pick_is_seed_plus_one() {
        assert_eq!(RoundRobinStrategy::new(0).pick_index(4), Some(1));
        assert_eq!(RoundRobinStrategy::new(1).pick_index(4), Some(2));
        assert_eq!(RoundRobinStrategy::new(2).pick_index(4), Some(3));
        assert_eq!(RoundRobinStrategy::new(3).pick_index(4), Some(0));
    }

    #[test]
    fn visits_every_index_once_per_period() {
        let rr = RoundRobinStrategy::new(7);
        let n = 5;
        for _ in 0..3 {
            let period: HashSet<usize> = (0..n).filter_map(|_| rr.pick_index(n)).collect();
            assert_eq!(period.len(), n);
        }
    }

    #[test]
    fn kth_call_returns_seed_plus_k() {
        let seed = 11u64;
        let rr = RoundRobinStrategy::new(seed);
        for k in 1..=20u64 {
            assert_eq!(rr.pick_index(3), Some(((seed + k) % 3) as usize));
        }
    }

    #[test]
    fn modulus_follows_current_len() {
        let rr = RoundRobinStrategy::new(0);
        assert_eq!(rr.pick_index(4), Some(1));
        assert_eq!(rr.pick_index(2), Some(0));
        assert_eq!(rr.pick_index(7), Some(3));
    }

    #[test]
    fn empty_does_not_advance() {
        let rr = RoundRobinStrategy::new(0);
        assert_eq!(rr.pick_index(0), None);
        assert_eq!(rr.pick_index(4), Some(1));
    }

    #[test]
    fn counter_wraps_at_u64_max() {
        let rr = RoundRobinStrategy::new(u64::MAX);
        assert_eq!(rr.pick_index(4), Some(0));
        assert_eq!(rr.pick_index(4), Some(1));
    }

    #[test]
    fn concurrent_callers_never_share_a_ticket() {
        let rr = Arc::new(RoundRobinStrategy::new(0));
        let threads = 8;
        let per_thread = 1000;
        let len = threads * per_thread;

        let handles: Vec<_> = (0..threads)
            .map(|_| {
                let rr = Arc::clone(&rr);
                std::thread::spawn(move || {
                    (0..per_thread)
                        .map(|_| rr.pick_index(len).unwrap())
                        .collect::<Vec<_>>()
                })
            })
            .collect();

        let mut seen = HashSet::new();
        for handle in handles {
            for idx in handle.join().unwrap() {
                assert!(seen.insert(idx), "index {} picked twice", idx);
            }
        }
        assert_eq!(seen.len(), len);
    }
}
