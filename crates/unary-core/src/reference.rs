//! Reference classifier (golden model)
//!
//! A thermometer code is a run of one polarity followed by a run of the
//! other, so it has exactly one transition between adjacent bits. The most
//! significant bit names the polarity: set means the code is complemented
//! (active bits are zeros).
//!
//! ## Bit-0 tally exclusion
//!
//! The ones/zeros tally scans indices `[1, W)` but is compared against the
//! full width `W`. The tally clause therefore never holds, and the
//! transition-free vectors (all zeros, all ones) classify as *not* unary.
//! Device models that accept those vectors will disagree with this model on
//! exactly those two inputs per width. The behaviour is kept as-is and pinned
//! by the tests below.

use std::fmt;

use crate::bitvec::BitVector;

/// Admission decision for one stimulus vector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Classification {
    /// Vector is a valid thermometer code
    pub is_unary: bool,
    /// Vector is in complemented polarity (MSB set)
    pub is_complement: bool,
}

impl Classification {
    pub const fn new(is_unary: bool, is_complement: bool) -> Self {
        Self {
            is_unary,
            is_complement,
        }
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "is_unary={}, is_complement={}",
            self.is_unary, self.is_complement
        )
    }
}

/// Classify `v` as unary or not, and report its polarity.
pub fn classify(v: &BitVector) -> Classification {
    let w = v.width().bits();
    let is_complement = v.bit(w - 1);

    let (mut ones, mut zeros, mut edges) = (0usize, 0usize, 0usize);
    for i in 1..w {
        if v.bit(i) {
            ones += 1;
        } else {
            zeros += 1;
        }
        if v.bit(i) != v.bit(i - 1) {
            edges += 1;
        }
    }

    let uniform = if is_complement { ones == w } else { zeros == w };
    Classification::new(uniform || edges == 1, is_complement)
}
