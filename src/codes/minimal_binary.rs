/*
 * SPDX-FileCopyrightText: 2023 Tommaso Fontana
 * SPDX-FileCopyrightText: 2023 Inria
 * SPDX-FileCopyrightText: 2023 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! # Minimal binary
//!
//! Also called [truncated binary
//! encoding](https://en.wikipedia.org/wiki/Truncated_binary_encoding), it is
//! optimal for uniform distributions over a bounded range. When the size of
//! the alphabet is a power of two this is the classical binary encoding.

use crate::bits::BitRead;
use crate::Result;

/// Trait for objects that can read minimal binary codes.
pub trait MinimalBinaryRead: BitRead {
    /// Read a minimal binary code with upper bound `max` (the value is in
    /// `0..max`, and `max` must be positive).
    ///
    /// # Errors
    /// This function fails only if the [`BitRead`] backend has problems
    /// reading bits, as when the stream ends unexpectedly.
    #[inline(always)]
    fn read_minimal_binary(&mut self, max: u64) -> Result<u64> {
        debug_assert!(max > 0);
        let l = max.ilog2();
        let mut value = self.read_bits(l as usize)?;
        let limit = (1 << (l + 1)) - max;

        Ok(if value < limit {
            value
        } else {
            value <<= 1;
            value |= self.read_bits(1)?;
            value - limit
        })
    }
}

impl<B: BitRead> MinimalBinaryRead for B {}
