//! Random number generation for role assignment
//!
//! Uses a simple xorshift64 generator. Role shuffles do not need
//! cryptographic strength, only a fair permutation; the engine seeds one
//! generator from wall-clock entropy at construction and derives an
//! independent stream per match from it.

use std::time::{SystemTime, UNIX_EPOCH};

/// A small xorshift64 random number generator
///
/// The explicit-seed constructor keeps shuffles reproducible in tests.
#[derive(Debug, Clone)]
pub struct EngineRng {
    state: u64,
}

impl EngineRng {
    /// Create a new generator with the given seed
    pub fn new(seed: u64) -> Self {
        // Ensure non-zero state (xorshift requires this)
        let state = if seed == 0 { 1 } else { seed };
        Self { state }
    }

    /// Create a generator seeded from the wall clock
    pub fn from_entropy() -> Self {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_nanos() as u64)
            .unwrap_or(0);
        Self::new(nanos ^ 0x9e37_79b9_7f4a_7c15)
    }

    /// Generate the next raw u64 value
    pub fn next_u64(&mut self) -> u64 {
        // xorshift64 algorithm
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.state = x;
        x
    }

    /// Shuffle a slice in place (Fisher-Yates)
    pub fn shuffle<T>(&mut self, slice: &mut [T]) {
        for i in (1..slice.len()).rev() {
            let j = (self.next_u64() as usize) % (i + 1);
            slice.swap(i, j);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_determinism() {
        let mut rng1 = EngineRng::new(42);
        let mut rng2 = EngineRng::new(42);

        for _ in 0..100 {
            assert_eq!(rng1.next_u64(), rng2.next_u64());
        }
    }

    #[test]
    fn test_different_seeds_diverge() {
        let mut rng1 = EngineRng::new(12345);
        let mut rng2 = EngineRng::new(54321);
        let seq1: Vec<u64> = (0..10).map(|_| rng1.next_u64()).collect();
        let seq2: Vec<u64> = (0..10).map(|_| rng2.next_u64()).collect();
        assert_ne!(seq1, seq2);
    }

    #[test]
    fn test_zero_seed_still_produces_values() {
        let mut rng = EngineRng::new(0);
        assert_ne!(rng.next_u64(), 0);
    }

    #[test]
    fn test_shuffle_is_a_permutation() {
        let mut rng = EngineRng::new(42);
        let original = vec![1, 2, 3, 4, 5, 6, 7, 8, 9, 10];
        let mut shuffled = original.clone();
        rng.shuffle(&mut shuffled);

        // Should still contain same elements
        let mut sorted = shuffled.clone();
        sorted.sort();
        assert_eq!(sorted, original);

        // Should be different order (very unlikely to be same with 10 elements)
        assert_ne!(shuffled, original);
    }

    #[test]
    fn test_from_entropy_is_usable() {
        let mut rng = EngineRng::from_entropy();
        // Just exercise the stream; entropy seeding has no fixed expectation.
        let _ = rng.next_u64();
        let _ = rng.next_u64();
    }
}
