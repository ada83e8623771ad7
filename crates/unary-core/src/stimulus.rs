//! Stimulus generation
//!
//! [`StimulusGenerator`] produces the two kinds of vectors a test case needs:
//! canonical thermometer codes of a chosen run length, and random vectors the
//! reference model rejects.

use crate::bitvec::{BitVector, Width};
use crate::random::StimulusRng;
use crate::reference::classify;

/// Retry rounds used when a caller has no preference
pub const DEFAULT_NON_UNARY_ROUNDS: usize = 1;

/// Stimulus source for one vector width
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StimulusGenerator {
    width: Width,
}

impl StimulusGenerator {
    pub fn new(width: Width) -> Self {
        Self { width }
    }

    pub fn width(&self) -> Width {
        self.width
    }

    /// Thermometer code of run length `n`.
    ///
    /// Bits `[0, n)` take the active polarity (`!complement`) and bits
    /// `[n, W)` take `complement`. `n` beyond `W` saturates to a full run.
    pub fn unary(&self, n: usize, complement: bool) -> BitVector {
        let mut v = BitVector::all_zeros(self.width);
        for i in 0..self.width.bits() {
            v.set_bit(i, if i < n { !complement } else { complement });
        }
        v
    }

    /// Random vector the reference model classifies as not unary.
    ///
    /// Makes up to `rounds` attempts, each filling the storage with uniform
    /// random bytes and masking the tail. Returns `None` when every attempt
    /// landed on a unary vector; callers treat that as "no stimulus this
    /// trial", not as a failure.
    pub fn non_unary(&self, rounds: usize, rng: &mut StimulusRng) -> Option<BitVector> {
        let mut bytes = vec![0u8; self.width.bytes()];
        for round in 0..rounds {
            rng.fill_bytes(&mut bytes);
            let v = BitVector::from_bytes(self.width, &bytes);
            if !classify(&v).is_unary {
                return Some(v);
            }
            tracing::debug!(round, stimulus = %v, "random vector was unary, retrying");
        }
        None
    }
}
