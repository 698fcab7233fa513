/*
 * SPDX-FileCopyrightText: 2023 Inria
 * SPDX-FileCopyrightText: 2023 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! Succinct structures backing the offset index.
//!
//! [`EliasFano`] stores a monotone sequence of n values bounded by u in
//! roughly n(2 + ⌈log₂(u/n)⌉) bits, splitting each value into explicit lower
//! bits ([`BitFieldVec`]) and unary-coded upper bits ([`BitVec`]); a
//! [`SelectIndex`] over the upper bits makes `get` constant-time in
//! expectation. This is how random access stays feasible when one 64-bit
//! offset per node would be too expensive.

mod bit_vec;
pub use bit_vec::BitVec;

mod bit_field_vec;
pub use bit_field_vec::BitFieldVec;

mod select;
pub use select::{SelectIndex, DEFAULT_SPILL_CAPACITY};

mod elias_fano;
pub use elias_fano::{EliasFano, EliasFanoBuilder};
