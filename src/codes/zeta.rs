/*
 * SPDX-FileCopyrightText: 2023 Tommaso Fontana
 * SPDX-FileCopyrightText: 2023 Inria
 * SPDX-FileCopyrightText: 2023 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! # ζ
//!
//! ζ_k codes are optimal for power-law distributions with small exponent;
//! BV graphs use ζ₃ for residuals by default. The value is split into a
//! unary bucket index h and a minimal binary code over the bucket
//! `[2^{hk} − 1, 2^{(h+1)k} − 1)`.

use super::MinimalBinaryRead;
use crate::Result;

/// Trait for objects that can read ζ codes.
pub trait ZetaRead: MinimalBinaryRead {
    /// Read a ζ_k code from the stream (k must be positive).
    ///
    /// # Errors
    /// This function fails only if the [`BitRead`](crate::bits::BitRead)
    /// backend has problems reading bits, as when the stream ends
    /// unexpectedly.
    #[inline(always)]
    fn read_zeta(&mut self, k: u64) -> Result<u64> {
        let h = self.read_unary()?;
        let u = 1 << ((h + 1) * k);
        let l = 1 << (h * k);
        let res = self.read_minimal_binary(u - l)?;
        Ok(l + res - 1)
    }

    /// Specialized ζ code reader for k = 3, the default for BV residuals.
    #[inline(always)]
    fn read_zeta3(&mut self) -> Result<u64> {
        self.read_zeta(3)
    }
}

impl<B: MinimalBinaryRead> ZetaRead for B {}
