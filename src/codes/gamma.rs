/*
 * SPDX-FileCopyrightText: 2023 Tommaso Fontana
 * SPDX-FileCopyrightText: 2023 Inria
 * SPDX-FileCopyrightText: 2023 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! # Elias γ
//! Optimal for Zipf distributions of exponent 2.
//!
//! γ codes x ∈ N by writing ⌊log₂(x + 1)⌋ in unary followed by
//! x + 1 − 2^⌊log₂(x + 1)⌋ in binary.

use crate::bits::BitRead;
use crate::Result;

/// Trait for objects that can read γ codes.
pub trait GammaRead: BitRead {
    /// Read a γ code from the stream.
    ///
    /// # Errors
    /// This function fails only if the [`BitRead`] backend has problems
    /// reading bits, as when the stream ends unexpectedly.
    #[inline(always)]
    fn read_gamma(&mut self) -> Result<u64> {
        let len = self.read_unary()?;
        debug_assert!(len <= 64);
        Ok(self.read_bits(len as usize)? + (1 << len) - 1)
    }

    /// Skip a γ code from the stream.
    #[inline(always)]
    fn skip_gamma(&mut self) -> Result<()> {
        let len = self.read_unary()?;
        debug_assert!(len <= 64);
        self.skip_bits(len as usize)
    }
}

impl<B: BitRead> GammaRead for B {}
