//! xorshift64* random number generator
//!
//! # Determinism
//!
//! The whole generator state is one `u64`. Capturing it with
//! [`RngManager::get_state`] and rebuilding with [`RngManager::from_state`]
//! continues the exact same stream, which is what checkpointing relies on.

use serde::{Deserialize, Serialize};

/// Deterministic random number generator using xorshift64*
///
/// # Example
/// ```
/// use outbreak_simulator_core_rs::RngManager;
///
/// let mut rng = RngManager::new(12345);
/// let wait = rng.next_exponential(2.0);
/// assert!(wait > 0.0);
/// let pick = rng.next_uniform(10.0);
/// assert!((0.0..10.0).contains(&pick));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RngManager {
    state: u64,
}

impl RngManager {
    /// Create a new RNG with given seed (a zero seed is remapped to 1)
    pub fn new(seed: u64) -> Self {
        // xorshift never leaves the all-zero state
        let state = if seed == 0 { 1 } else { seed };
        Self { state }
    }

    /// Resume a stream from a state previously returned by [`get_state`](Self::get_state)
    pub fn from_state(state: u64) -> Self {
        Self::new(state)
    }

    /// Generate next random u64 value
    pub fn next(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x >> 12;
        x ^= x << 25;
        x ^= x >> 27;
        self.state = x;
        x.wrapping_mul(0x2545F4914F6CDD1D)
    }

    /// Generate random value in range [min, max)
    ///
    /// # Panics
    /// Panics if min >= max
    pub fn range(&mut self, min: i64, max: i64) -> i64 {
        assert!(min < max, "min must be less than max");

        let value = self.next();
        let range_size = (max - min) as u64;
        min + (value % range_size) as i64
    }

    /// Current stream position (for checkpointing)
    pub fn get_state(&self) -> u64 {
        self.state
    }

    /// Generate random f64 in range [0.0, 1.0)
    pub fn next_f64(&mut self) -> f64 {
        let value = self.next();
        (value >> 11) as f64 * (1.0 / ((1u64 << 53) as f64))
    }

    /// Draw a waiting time from `Exponential(rate)`
    ///
    /// Uses inversion on `(0, 1]` so the logarithm is always finite.
    /// A non-positive rate means the event never happens and yields infinity
    /// without consuming a draw.
    pub fn next_exponential(&mut self, rate: f64) -> f64 {
        if rate <= 0.0 {
            return f64::INFINITY;
        }
        let u = 1.0 - self.next_f64();
        -u.ln() / rate
    }

    /// Draw uniformly on `[0, upper)`
    pub fn next_uniform(&mut self, upper: f64) -> f64 {
        self.next_f64() * upper
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_seed_converted_to_nonzero() {
        let rng = RngManager::new(0);
        assert_ne!(rng.get_state(), 0, "Zero seed should be converted to 1");
    }

    #[test]
    #[should_panic(expected = "min must be less than max")]
    fn test_range_invalid_bounds() {
        let mut rng = RngManager::new(12345);
        rng.range(100, 50);
    }

    #[test]
    fn test_next_f64_in_range() {
        let mut rng = RngManager::new(12345);

        for _ in 0..1000 {
            let val = rng.next_f64();
            assert!(
                (0.0..1.0).contains(&val),
                "next_f64() produced value {} outside [0.0, 1.0)",
                val
            );
        }
    }

    #[test]
    fn test_exponential_positive_and_finite() {
        let mut rng = RngManager::new(7);
        for _ in 0..1000 {
            let tau = rng.next_exponential(3.5);
            assert!(tau.is_finite() && tau >= 0.0, "bad waiting time {}", tau);
        }
    }

    #[test]
    fn test_exponential_zero_rate_never_fires() {
        let mut rng = RngManager::new(7);
        let before = rng.get_state();
        assert!(rng.next_exponential(0.0).is_infinite());
        assert_eq!(rng.get_state(), before, "zero rate must not consume a draw");
    }

    #[test]
    fn test_exponential_mean_close_to_inverse_rate() {
        let mut rng = RngManager::new(2024);
        let n = 20_000;
        let rate = 4.0;
        let mean: f64 = (0..n).map(|_| rng.next_exponential(rate)).sum::<f64>() / n as f64;
        assert!((mean - 0.25).abs() < 0.01, "sample mean {} too far from 0.25", mean);
    }

    #[test]
    fn test_from_state_continues_stream() {
        let mut rng = RngManager::new(99999);
        rng.next();
        rng.next();

        let mut resumed = RngManager::from_state(rng.get_state());
        for _ in 0..50 {
            assert_eq!(rng.next(), resumed.next());
        }
    }
}
