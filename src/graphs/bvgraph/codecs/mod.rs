/*
 * SPDX-FileCopyrightText: 2023 Tommaso Fontana
 * SPDX-FileCopyrightText: 2023 Inria
 * SPDX-FileCopyrightText: 2023 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

mod factories;
pub use factories::*;

mod dec_dyn;
pub use dec_dyn::*;

use crate::Result;

/// Methods to decode the fields of a BV graph stream.
///
/// One method per field, so that each can be dispatched to the code the
/// `.properties` file selects for it.
pub trait Decode {
    fn read_outdegree(&mut self) -> Result<u64>;
    fn read_reference_offset(&mut self) -> Result<u64>;
    fn read_block_count(&mut self) -> Result<u64>;
    fn read_block(&mut self) -> Result<u64>;
    fn read_interval_count(&mut self) -> Result<u64>;
    fn read_interval_start(&mut self) -> Result<u64>;
    fn read_interval_len(&mut self) -> Result<u64>;
    fn read_first_residual(&mut self) -> Result<u64>;
    fn read_residual(&mut self) -> Result<u64>;
}

/// A trait providing decoders with random access.
pub trait RandomAccessDecoderFactory {
    /// The type of decoder that this factory builds.
    type Decoder<'a>: Decode + 'a
    where
        Self: 'a;

    /// Create a new decoder positioned at the start of the given node.
    fn new_decoder(&self, node: usize) -> Result<Self::Decoder<'_>>;

    /// The bit offset of the given node in the graph stream.
    ///
    /// Fails with [`Error::RequiresOffsets`](crate::Error::RequiresOffsets)
    /// when the graph was loaded without offsets.
    fn bit_offset(&self, node: usize) -> Result<u64>;
}

/// A trait providing decoders on the whole graph.
pub trait SequentialDecoderFactory {
    /// The type of decoder that this factory builds.
    type Decoder<'a>: Decode + 'a
    where
        Self: 'a;

    /// Create a new decoder positioned at the start of the stream.
    fn new_decoder(&self) -> Result<Self::Decoder<'_>>;
}
