/*
 * SPDX-FileCopyrightText: 2023 Tommaso Fontana
 * SPDX-FileCopyrightText: 2023 Inria
 * SPDX-FileCopyrightText: 2023 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! # Elias δ
//!
//! δ codes x ∈ N by writing ⌊log₂(x + 1)⌋ in γ followed by the same binary
//! tail as γ. Shorter than γ for large values.

use super::GammaRead;
use crate::Result;

/// Trait for objects that can read δ codes.
pub trait DeltaRead: GammaRead {
    /// Read a δ code from the stream.
    ///
    /// # Errors
    /// This function fails only if the [`BitRead`](crate::bits::BitRead)
    /// backend has problems reading bits, as when the stream ends
    /// unexpectedly.
    #[inline(always)]
    fn read_delta(&mut self) -> Result<u64> {
        let len = self.read_gamma()?;
        debug_assert!(len <= 64);
        Ok(self.read_bits(len as usize)? + (1 << len) - 1)
    }
}

impl<B: GammaRead> DeltaRead for B {}
