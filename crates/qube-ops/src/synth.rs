//! Synthetic dataset helpers
//!
//! Small generators for tests and demos. Randomness is never implicit:
//! every random helper takes a seed, and the same seed always produces
//! the same dataset.

use qube_core::{element_count, ArrayDataset, Metadata, QubeResult};

/// Splitmix-style generator with explicit seeding
pub struct SimpleRng {
    state: u64,
}

impl SimpleRng {
    pub fn new(seed: u64) -> Self {
        Self {
            state: seed.wrapping_add(0x9E3779B97F4A7C15),
        }
    }

    pub fn next_u64(&mut self) -> u64 {
        self.state = self.state.wrapping_mul(6364136223846793005).wrapping_add(1);
        let mut z = self.state;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58476D1CE4E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D049BB133111EB);
        z ^ (z >> 31)
    }

    /// Uniform value in [0, 1]
    pub fn next_f64(&mut self) -> f64 {
        (self.next_u64() as f64) / (u64::MAX as f64)
    }
}

/// Rank-1 ramp 0, 1, ..., n-1, tagged monotonic
pub fn ramp(n: usize) -> ArrayDataset {
    let values: Vec<f64> = (0..n).map(|i| i as f64).collect();
    ArrayDataset::vector(&values).with_metadata(Metadata::new().with_monotonic(true))
}

/// Qube of uniform random values in [0, 1] from an explicit seed
pub fn random(shape: &[usize], seed: u64) -> QubeResult<ArrayDataset> {
    let mut rng = SimpleRng::new(seed);
    let values: Vec<f64> = (0..element_count(shape)).map(|_| rng.next_f64()).collect();
    ArrayDataset::from_elements(shape.to_vec(), values)
}

/// Rank-1 sine wave sampled at n points over `cycles` full periods
pub fn sine(n: usize, cycles: f64) -> ArrayDataset {
    let values: Vec<f64> = (0..n)
        .map(|i| (2.0 * std::f64::consts::PI * cycles * i as f64 / n as f64).sin())
        .collect();
    ArrayDataset::vector(&values)
}

#[cfg(test)]
mod tests {
    use super::*;
    use qube_core::Dataset;

    #[test]
    fn test_ramp() {
        let ds = ramp(4);
        assert_eq!(ds.elements(), &[0.0, 1.0, 2.0, 3.0]);
        assert_eq!(ds.metadata().monotonic, Some(true));
    }

    #[test]
    fn test_random_is_deterministic() {
        let a = random(&[2, 3], 42).unwrap();
        let b = random(&[2, 3], 42).unwrap();
        let c = random(&[2, 3], 43).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert!(a.elements().iter().all(|v| (0.0..=1.0).contains(v)));
    }

    #[test]
    fn test_sine_period() {
        let ds = sine(8, 1.0);
        assert_eq!(ds.length(&[]), 8);
        assert!(ds.value(&[0]).abs() < 1e-12);
        assert!((ds.value(&[2]) - 1.0).abs() < 1e-12);
    }
}
