//! Admission circuit models
//!
//! Three structurally different implementations of the same admission
//! function, each evaluated on 32-bit port words through [`SimDevice`]:
//!
//! - **`u`** ([`LookupMatcher`]): compares the port against every legal code,
//!   both polarities, like a ROM of thermometer codes.
//! - **`e`** ([`EdgeCounter`]): XORs adjacent bits and admits at most one
//!   transition.
//! - **`p`** ([`PrefixDetector`]): normalises polarity with the MSB and admits
//!   words of the form `2^k - 1`.
//!
//! All three accept the transition-free vectors (all zeros, all ones), which
//! the reference model rejects; see [`crate::reference`].

use crate::bitvec::{Width, DEFAULT_WIDTH};
use crate::device::{Circuit, ReferenceDevice, SimDevice};
use crate::reference::Classification;
use crate::registry::DesignRegistry;

/// Mask with the low `bits` bits set
fn low_mask(bits: usize) -> u32 {
    if bits >= 32 {
        u32::MAX
    } else {
        (1u32 << bits) - 1
    }
}

/// Valid-bit mask of port word `k`
fn word_mask(width: Width, k: usize) -> u32 {
    low_mask(width.bits().saturating_sub(32 * k))
}

fn word(i_x: &[u32], k: usize) -> u32 {
    i_x.get(k).copied().unwrap_or(0)
}

/// MSB of the stimulus, which selects polarity
fn msb(i_x: &[u32], width: Width) -> bool {
    let i = width.bits() - 1;
    (word(i_x, i / 32) >> (i % 32)) & 1 == 1
}

/// Code-table matcher
#[derive(Debug, Clone)]
pub struct LookupMatcher {
    width: Width,
    codes: Vec<Vec<u32>>,
}

impl LookupMatcher {
    pub fn new(width: Width) -> Self {
        let n_words = width.port_words();
        let mut codes = Vec::with_capacity(2 * (width.bits() + 1));
        for run in 0..=width.bits() {
            let normal: Vec<u32> = (0..n_words)
                .map(|k| low_mask(run.saturating_sub(32 * k)) & word_mask(width, k))
                .collect();
            let complement: Vec<u32> = normal
                .iter()
                .enumerate()
                .map(|(k, w)| !w & word_mask(width, k))
                .collect();
            codes.push(normal);
            codes.push(complement);
        }
        Self { width, codes }
    }

    /// Number of legal codes in the table
    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }
}

impl Circuit for LookupMatcher {
    fn width(&self) -> Width {
        self.width
    }

    fn eval(&self, i_x: &[u32]) -> Classification {
        let port: Vec<u32> = (0..self.width.port_words())
            .map(|k| word(i_x, k) & word_mask(self.width, k))
            .collect();
        let hit = self.codes.iter().any(|code| *code == port);
        Classification::new(hit, msb(i_x, self.width))
    }
}

/// Adjacent-bit transition counter
#[derive(Debug, Clone, Copy)]
pub struct EdgeCounter {
    width: Width,
}

impl EdgeCounter {
    pub fn new(width: Width) -> Self {
        Self { width }
    }
}

impl Circuit for EdgeCounter {
    fn width(&self) -> Width {
        self.width
    }

    fn eval(&self, i_x: &[u32]) -> Classification {
        let w = self.width.bits();
        let mut edges = 0u32;
        for k in 0..self.width.port_words() {
            let x = word(i_x, k) & word_mask(self.width, k);
            let next = word(i_x, k + 1) & word_mask(self.width, k + 1);
            // Bit j: x[j] ^ x[j + 1], valid for global positions below W - 1.
            let transitions = x ^ ((x >> 1) | (next << 31));
            edges += (transitions & low_mask((w - 1).saturating_sub(32 * k))).count_ones();
        }
        Classification::new(edges <= 1, msb(i_x, self.width))
    }
}

/// Polarity-normalised prefix detector
#[derive(Debug, Clone, Copy)]
pub struct PrefixDetector {
    width: Width,
}

impl PrefixDetector {
    pub fn new(width: Width) -> Self {
        Self { width }
    }
}

impl Circuit for PrefixDetector {
    fn width(&self) -> Width {
        self.width
    }

    fn eval(&self, i_x: &[u32]) -> Classification {
        let complement = msb(i_x, self.width);
        let mut run_ended = false;
        let mut unary = true;

        for k in 0..self.width.port_words() {
            let mask = word_mask(self.width, k);
            let x = word(i_x, k);
            let y = if complement { !x } else { x } & mask;

            if run_ended {
                if y != 0 {
                    unary = false;
                    break;
                }
            } else if y != mask {
                if y & y.wrapping_add(1) != 0 {
                    unary = false;
                    break;
                }
                run_ended = true;
            }
        }
        Classification::new(unary, complement)
    }
}

/// Register the built-in designs.
pub fn register_designs(registry: &mut DesignRegistry) {
    registry.register("reference", || {
        Box::new(ReferenceDevice::new("reference", DEFAULT_WIDTH))
    });
    registry.register("u", || {
        Box::new(SimDevice::new("u", LookupMatcher::new(DEFAULT_WIDTH)))
    });
    registry.register("e", || {
        Box::new(SimDevice::new("e", EdgeCounter::new(DEFAULT_WIDTH)))
    });
    registry.register("p", || {
        Box::new(SimDevice::new("p", PrefixDetector::new(DEFAULT_WIDTH)))
    });
}
