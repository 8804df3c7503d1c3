//! ## Packed register array
//! Stores `M` HyperLogLog registers using `W = 6` bits per register.
//!
//! Slice encoding:
//! - words[..]     - register ranks packed back to back, register `i` occupies bits `[i * W, (i + 1) * W)`.
//! - words[last]   - one extra element for branchless register updates (see `set` for more details).

use std::mem::size_of_val;

/// Number of bits used to store a single register
pub(crate) const W: usize = 6;

/// Fixed-size array of `W`-bit registers
#[derive(Clone, PartialEq, Eq)]
pub(crate) struct Registers {
    /// Number of registers
    len: usize,
    /// Packed register ranks
    words: Vec<u32>,
}

impl Registers {
    /// Create `len` registers all set to zero
    #[inline]
    pub(crate) fn new(len: usize) -> Self {
        Self {
            len,
            words: vec![0u32; Self::words_len(len)],
        }
    }

    /// Length of `u32` slice needed to store `len` registers plus one extra element
    #[inline]
    fn words_len(len: usize) -> usize {
        len * W / 32 + 1
    }

    /// Return number of registers
    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.len
    }

    /// Get `idx` register
    #[inline]
    pub(crate) fn get(&self, idx: usize) -> u32 {
        let bit_idx = idx * W;
        let u32_idx = bit_idx / 32;
        let bit_pos = bit_idx % 32;
        let bits = &self.words[u32_idx..u32_idx + 2];
        let bits_1 = W.min(32 - bit_pos);
        let bits_2 = W - bits_1;
        let mask_1 = (1 << bits_1) - 1;
        let mask_2 = (1 << bits_2) - 1;

        ((bits[0] >> bit_pos) & mask_1) | ((bits[1] & mask_2) << bits_1)
    }

    /// Set `idx` register to `rank`
    #[inline]
    pub(crate) fn set(&mut self, idx: usize, rank: u32) {
        let bit_idx = idx * W;
        let u32_idx = bit_idx / 32;
        let bit_pos = bit_idx % 32;
        let bits = &mut self.words[u32_idx..u32_idx + 2];
        let bits_1 = W.min(32 - bit_pos);
        let bits_2 = W - bits_1;
        let mask_1 = (1 << bits_1) - 1;
        let mask_2 = (1 << bits_2) - 1;

        // Unconditionally update two `u32` elements based on `rank` bits and masks
        bits[0] &= !(mask_1 << bit_pos);
        bits[0] |= (rank & mask_1) << bit_pos;
        bits[1] &= !mask_2;
        bits[1] |= (rank >> bits_1) & mask_2;
    }

    /// Raise `idx` register to `rank` if it is currently lower.
    /// Returns true when the register changed.
    #[inline]
    pub(crate) fn update(&mut self, idx: usize, rank: u32) -> bool {
        if rank > self.get(idx) {
            self.set(idx, rank);
            return true;
        }
        false
    }

    /// Take pointwise maximum with `rhs` registers of the same length
    #[inline]
    pub(crate) fn merge(&mut self, rhs: &Registers) {
        debug_assert_eq!(self.len, rhs.len);
        for idx in 0..self.len {
            self.update(idx, rhs.get(idx));
        }
    }

    /// Reset all registers to zero
    #[inline]
    pub(crate) fn clear(&mut self) {
        self.words.fill(0);
    }

    /// Iterate over register ranks in index order
    #[inline]
    pub(crate) fn iter(&self) -> impl Iterator<Item = u32> + '_ {
        (0..self.len).map(move |idx| self.get(idx))
    }

    /// Return heap memory occupied by registers
    #[inline]
    pub(crate) fn heap_size(&self) -> usize {
        size_of_val(self.words.as_slice())
    }
}
