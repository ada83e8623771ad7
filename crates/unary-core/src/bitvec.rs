//! Fixed-width, byte-packed bit vectors
//!
//! A [`BitVector`] carries its [`Width`] at runtime. Storage is
//! `ceil(W / 8)` bytes, bit `i` living in byte `i >> 3` at position `i & 7`
//! (bit 0 is the least-significant bit of byte 0).
//!
//! ## Zero extension
//!
//! Reads are total: any index at or beyond the storage reads as `false`, so a
//! vector behaves as if it were infinitely zero-extended. Storage bits in the
//! tail byte beyond `W` are garbage after raw byte writes and must be masked
//! with [`BitVector::clean`] before the vector is classified or driven.
//!
//! ```
//! use unary_core::{BitVector, Width};
//!
//! let w = Width::new(12)?;
//! let mut v = BitVector::all_zeros(w);
//! v.set_byte(1, 0xFF);
//! v.clean();
//! assert!(v.bit(11));
//! assert!(!v.bit(12));
//! assert_eq!(v.to_string(), "12'b111100000000");
//! # Ok::<(), unary_core::Error>(())
//! ```

use std::fmt;

use crate::error::{Error, Result};

/// Largest supported vector width in bits
pub const MAX_WIDTH: usize = 4096;

/// Bytes per simulated port word
pub const PORT_WORD_BYTES: usize = 4;

/// Width of the registered admission designs
pub const DEFAULT_WIDTH: Width = Width(32);

/// Validated bit width in `[1, MAX_WIDTH]`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Width(usize);

impl Width {
    /// Validate `bits` and wrap it.
    pub fn new(bits: usize) -> Result<Self> {
        if bits == 0 || bits > MAX_WIDTH {
            return Err(Error::InvalidWidth {
                width: bits,
                max: MAX_WIDTH,
            });
        }
        Ok(Self(bits))
    }

    /// Width in bits
    pub const fn bits(self) -> usize {
        self.0
    }

    /// Storage size in bytes, `ceil(W / 8)`
    pub const fn bytes(self) -> usize {
        self.0.div_ceil(8)
    }

    /// Number of 32-bit port words needed to carry the vector
    pub const fn port_words(self) -> usize {
        self.0.div_ceil(PORT_WORD_BYTES * 8)
    }

    /// Mask of valid bits in the final storage byte
    const fn tail_mask(self) -> u8 {
        match self.0 % 8 {
            0 => 0xFF,
            n => (1u8 << n) - 1,
        }
    }
}

impl fmt::Display for Width {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Fixed-width bit container with zero extension on read
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct BitVector {
    width: Width,
    bytes: Vec<u8>,
}

impl BitVector {
    /// Canonical vector with every bit cleared
    pub fn all_zeros(width: Width) -> Self {
        Self {
            width,
            bytes: vec![0; width.bytes()],
        }
    }

    /// Canonical vector with every bit in `[0, W)` set
    pub fn all_ones(width: Width) -> Self {
        let mut v = Self {
            width,
            bytes: vec![0xFF; width.bytes()],
        };
        v.clean();
        v
    }

    /// Build a vector from a raw byte buffer.
    ///
    /// Copies `min(bytes.len(), ceil(W / 8))` bytes, zero-fills the remainder
    /// and masks the tail so the result is canonical.
    pub fn from_bytes(width: Width, bytes: &[u8]) -> Self {
        let mut v = Self::all_zeros(width);
        let n = bytes.len().min(v.bytes.len());
        v.bytes[..n].copy_from_slice(&bytes[..n]);
        v.clean();
        v
    }

    pub fn width(&self) -> Width {
        self.width
    }

    /// Raw storage bytes, least-significant byte first
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Read bit `i`; indices beyond the storage read as `false`.
    pub fn bit(&self, i: usize) -> bool {
        match self.bytes.get(i >> 3) {
            Some(byte) => byte & (1 << (i & 0x7)) != 0,
            None => false,
        }
    }

    /// Set or clear bit `i`. Indices at or beyond `W` are ignored.
    pub fn set_bit(&mut self, i: usize, value: bool) {
        if i >= self.width.bits() {
            return;
        }
        let mask = 1u8 << (i & 0x7);
        if value {
            self.bytes[i >> 3] |= mask;
        } else {
            self.bytes[i >> 3] &= !mask;
        }
    }

    /// Overwrite storage byte `i` verbatim. Out-of-range indices are ignored.
    ///
    /// The tail byte may now hold bits beyond `W`; call [`clean`](Self::clean)
    /// before using the vector.
    pub fn set_byte(&mut self, i: usize, value: u8) {
        if let Some(byte) = self.bytes.get_mut(i) {
            *byte = value;
        }
    }

    /// Mask off storage bits beyond `W`. Idempotent.
    pub fn clean(&mut self) {
        let mask = self.width.tail_mask();
        if let Some(last) = self.bytes.last_mut() {
            *last &= mask;
        }
    }

    /// Whether every storage bit beyond `W` is clear.
    pub fn is_clean(&self) -> bool {
        let mask = self.width.tail_mask();
        self.bytes.last().map_or(true, |last| last & !mask == 0)
    }

    /// Number of set bits in `[0, W)`.
    pub fn count_ones(&self) -> usize {
        (0..self.width.bits()).filter(|&i| self.bit(i)).count()
    }

    /// Pack the storage bytes into a device port buffer of `word_size` bytes.
    ///
    /// Bytes beyond `word_size` are dropped and missing bytes are zero, which
    /// matches how a simulator port of that size would observe the vector.
    pub fn to_device_word(&self, word_size: usize) -> Vec<u8> {
        let mut word = vec![0u8; word_size];
        let n = word_size.min(self.bytes.len());
        word[..n].copy_from_slice(&self.bytes[..n]);
        word
    }

    /// Split the vector into little-endian 32-bit port words.
    pub fn to_port_words(&self) -> Vec<u32> {
        let n_words = self.width.port_words();
        self.to_device_word(n_words * PORT_WORD_BYTES)
            .chunks_exact(PORT_WORD_BYTES)
            .map(|chunk| u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
            .collect()
    }
}

impl fmt::Display for BitVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}'b", self.width)?;
        for i in (0..self.width.bits()).rev() {
            f.write_str(if self.bit(i) { "1" } else { "0" })?;
        }
        Ok(())
    }
}

impl fmt::Debug for BitVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BitVector({self})")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn w(bits: usize) -> Width {
        Width::new(bits).unwrap()
    }

    #[test]
    fn width_rejects_zero_and_oversize() {
        assert!(matches!(Width::new(0), Err(Error::InvalidWidth { width: 0, .. })));
        assert!(matches!(
            Width::new(MAX_WIDTH + 1),
            Err(Error::InvalidWidth { .. })
        ));
        assert_eq!(w(1).bytes(), 1);
        assert_eq!(w(8).bytes(), 1);
        assert_eq!(w(9).bytes(), 2);
        assert_eq!(w(32).port_words(), 1);
        assert_eq!(w(33).port_words(), 2);
    }

    #[test]
    fn bit_round_trip_in_range() {
        let mut v = BitVector::all_zeros(w(13));
        for i in 0..13 {
            v.set_bit(i, true);
            assert!(v.bit(i));
            v.set_bit(i, false);
            assert!(!v.bit(i));
        }
    }

    #[test]
    fn reads_beyond_width_are_false() {
        let mut v = BitVector::all_ones(w(5));
        v.set_bit(5, true);
        v.set_bit(7, true);
        v.set_bit(1000, true);
        for i in 5..64 {
            assert!(!v.bit(i), "bit {i} leaked");
        }
        assert!(v.is_clean());
    }

    #[test]
    fn clean_masks_tail_byte() {
        let mut v = BitVector::all_zeros(w(10));
        v.set_byte(1, 0xFF);
        assert!(!v.is_clean());
        assert!(v.bit(15), "raw storage is visible before clean");

        v.clean();
        assert!(v.is_clean());
        assert_eq!(v.as_bytes(), &[0x00, 0x03]);

        let once = v.clone();
        v.clean();
        assert_eq!(v, once);
    }

    #[test]
    fn clean_is_noop_on_byte_aligned_width() {
        let mut v = BitVector::all_zeros(w(16));
        v.set_byte(1, 0xFF);
        v.clean();
        assert_eq!(v.as_bytes(), &[0x00, 0xFF]);
    }

    #[test]
    fn boundary_constructors() {
        let ones = BitVector::all_ones(w(11));
        assert_eq!(ones.count_ones(), 11);
        assert_eq!(ones.as_bytes(), &[0xFF, 0x07]);

        let zeros = BitVector::all_zeros(w(11));
        assert_eq!(zeros.count_ones(), 0);
    }

    #[test]
    fn from_bytes_truncates_and_cleans() {
        let v = BitVector::from_bytes(w(12), &[0xAB, 0xFF, 0x55]);
        assert_eq!(v.as_bytes(), &[0xAB, 0x0F]);

        let short = BitVector::from_bytes(w(24), &[0x01]);
        assert_eq!(short.as_bytes(), &[0x01, 0x00, 0x00]);
    }

    #[test]
    fn device_word_packing() {
        let v = BitVector::from_bytes(w(12), &[0x34, 0x02]);
        assert_eq!(v.to_device_word(4), vec![0x34, 0x02, 0x00, 0x00]);
        assert_eq!(v.to_device_word(1), vec![0x34]);
        assert_eq!(v.to_port_words(), vec![0x0234]);

        let wide = BitVector::all_ones(w(40));
        assert_eq!(wide.to_port_words(), vec![0xFFFF_FFFF, 0x0000_00FF]);
    }

    #[test]
    fn display_is_msb_first() {
        let mut v = BitVector::all_zeros(w(8));
        v.set_bit(0, true);
        v.set_bit(1, true);
        v.set_bit(2, true);
        assert_eq!(v.to_string(), "8'b00000111");
        assert_eq!(format!("{v:?}"), "BitVector(8'b00000111)");
    }
}
