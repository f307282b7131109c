//! Sources of movement factors.
//!
//! The engine draws one factor per moving entity from a [`RandomPort`]. Any
//! implementation must yield values in `[-1, 1]`; a value outside that range
//! makes the iteration fail without touching the horizon.

// Factor generation uses intentional casts for RNG operations
#![allow(clippy::cast_precision_loss)]

/// Supplier of movement factors in `[-1, 1]`.
pub trait RandomPort {
    /// Next movement factor.
    fn next_factor(&mut self) -> f64;
}

impl<R: RandomPort + ?Sized> RandomPort for &mut R {
    fn next_factor(&mut self) -> f64 {
        (**self).next_factor()
    }
}

/// Deterministic PRNG using xorshift64.
#[derive(Debug, Clone, Copy)]
pub struct XorShiftRandom {
    state: u64,
}

impl XorShiftRandom {
    /// Create a new generator with the given seed.
    #[must_use]
    pub const fn new(seed: u64) -> Self {
        // Ensure non-zero state
        let state = if seed == 0 { 0x5555_5555_5555_5555 } else { seed };
        Self { state }
    }

    /// Generate next random u64.
    pub fn next_u64(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.state = x;
        x
    }

    /// Generate random f64 in [0, 1].
    pub fn next_f64(&mut self) -> f64 {
        (self.next_u64() as f64) / (u64::MAX as f64)
    }
}

impl RandomPort for XorShiftRandom {
    fn next_factor(&mut self) -> f64 {
        self.next_f64().mul_add(2.0, -1.0).clamp(-1.0, 1.0)
    }
}

/// Replays a fixed list of factors, starting over when exhausted.
///
/// An empty list yields `0.0` forever, which keeps every entity in place.
#[derive(Debug, Clone, Default)]
pub struct SequenceRandom {
    factors: Vec<f64>,
    cursor: usize,
}

impl SequenceRandom {
    /// Create a source cycling through `factors`.
    #[must_use]
    pub fn new(factors: impl Into<Vec<f64>>) -> Self {
        Self {
            factors: factors.into(),
            cursor: 0,
        }
    }

    /// Source that always yields `factor`.
    #[must_use]
    pub fn constant(factor: f64) -> Self {
        Self::new(vec![factor])
    }

    /// How many factors have been drawn so far.
    #[must_use]
    pub const fn drawn(&self) -> usize {
        self.cursor
    }
}

impl RandomPort for SequenceRandom {
    fn next_factor(&mut self) -> f64 {
        if self.factors.is_empty() {
            return 0.0;
        }
        let factor = self.factors[self.cursor % self.factors.len()];
        self.cursor += 1;
        factor
    }
}
