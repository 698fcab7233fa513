/*
 * SPDX-FileCopyrightText: 2023 Inria
 * SPDX-FileCopyrightText: 2023 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

use super::{BitReaderFactory, Decode, RandomAccessDecoderFactory, SequentialDecoderFactory};
use crate::bits::{BitRead, BitSeek};
use crate::codes::{Codes, DeltaRead, GammaRead, NibbleRead, ZetaRead};
use crate::graphs::bvgraph::{CompFlags, NodeOffsets};
use crate::{Error, Result};

/// A [`Decode`] implementation resolving the code of each field to a
/// function pointer when the graph is loaded, so that decoding dispatches
/// without matching on an enum.
#[derive(Debug, Clone)]
pub struct DynCodesDecoder<R: BitRead> {
    pub(crate) code_reader: R,
    pub(crate) read_outdegree: fn(&mut R) -> Result<u64>,
    pub(crate) read_reference_offset: fn(&mut R) -> Result<u64>,
    pub(crate) read_block_count: fn(&mut R) -> Result<u64>,
    pub(crate) read_block: fn(&mut R) -> Result<u64>,
    pub(crate) read_interval_count: fn(&mut R) -> Result<u64>,
    pub(crate) read_interval_start: fn(&mut R) -> Result<u64>,
    pub(crate) read_interval_len: fn(&mut R) -> Result<u64>,
    pub(crate) read_first_residual: fn(&mut R) -> Result<u64>,
    pub(crate) read_residual: fn(&mut R) -> Result<u64>,
}

impl<R: BitRead> DynCodesDecoder<R> {
    // Cached functions to read the codes. These could be closures, but this
    // way they are compiled once.
    const READ_UNARY: fn(&mut R) -> Result<u64> = |r| r.read_unary();
    const READ_GAMMA: fn(&mut R) -> Result<u64> = |r| r.read_gamma();
    const READ_DELTA: fn(&mut R) -> Result<u64> = |r| r.read_delta();
    const READ_ZETA2: fn(&mut R) -> Result<u64> = |r| r.read_zeta(2);
    const READ_ZETA3: fn(&mut R) -> Result<u64> = |r| r.read_zeta3();
    const READ_ZETA4: fn(&mut R) -> Result<u64> = |r| r.read_zeta(4);
    const READ_ZETA5: fn(&mut R) -> Result<u64> = |r| r.read_zeta(5);
    const READ_ZETA6: fn(&mut R) -> Result<u64> = |r| r.read_zeta(6);
    const READ_ZETA7: fn(&mut R) -> Result<u64> = |r| r.read_zeta(7);
    const READ_ZETA1: fn(&mut R) -> Result<u64> = Self::READ_GAMMA;
    const READ_NIBBLE: fn(&mut R) -> Result<u64> = |r| r.read_nibble();

    fn select_code(code: Codes) -> Result<fn(&mut R) -> Result<u64>> {
        Ok(match code {
            Codes::Unary => Self::READ_UNARY,
            Codes::Gamma => Self::READ_GAMMA,
            Codes::Delta => Self::READ_DELTA,
            Codes::Zeta { k: 1 } => Self::READ_ZETA1,
            Codes::Zeta { k: 2 } => Self::READ_ZETA2,
            Codes::Zeta { k: 3 } => Self::READ_ZETA3,
            Codes::Zeta { k: 4 } => Self::READ_ZETA4,
            Codes::Zeta { k: 5 } => Self::READ_ZETA5,
            Codes::Zeta { k: 6 } => Self::READ_ZETA6,
            Codes::Zeta { k: 7 } => Self::READ_ZETA7,
            Codes::Nibble => Self::READ_NIBBLE,
            code => return Err(Error::UnsupportedCoding(code)),
        })
    }

    pub fn new(code_reader: R, cf: &CompFlags) -> Result<Self> {
        Ok(Self {
            code_reader,
            read_outdegree: Self::select_code(cf.outdegrees)?,
            read_reference_offset: Self::select_code(cf.references)?,
            read_block_count: Self::select_code(cf.block_count)?,
            read_block: Self::select_code(cf.blocks)?,
            read_interval_count: Self::select_code(cf.interval_count)?,
            read_interval_start: Self::select_code(cf.intervals)?,
            read_interval_len: Self::select_code(cf.intervals)?,
            read_first_residual: Self::select_code(cf.residuals)?,
            read_residual: Self::select_code(cf.residuals)?,
        })
    }
}

impl<R: BitRead + BitSeek> BitSeek for DynCodesDecoder<R> {
    fn bit_pos(&mut self) -> u64 {
        self.code_reader.bit_pos()
    }

    fn set_bit_pos(&mut self, bit_pos: u64) -> Result<()> {
        self.code_reader.set_bit_pos(bit_pos)
    }
}

impl<R: BitRead> Decode for DynCodesDecoder<R> {
    #[inline(always)]
    fn read_outdegree(&mut self) -> Result<u64> {
        (self.read_outdegree)(&mut self.code_reader)
    }

    #[inline(always)]
    fn read_reference_offset(&mut self) -> Result<u64> {
        (self.read_reference_offset)(&mut self.code_reader)
    }

    #[inline(always)]
    fn read_block_count(&mut self) -> Result<u64> {
        (self.read_block_count)(&mut self.code_reader)
    }

    #[inline(always)]
    fn read_block(&mut self) -> Result<u64> {
        (self.read_block)(&mut self.code_reader)
    }

    #[inline(always)]
    fn read_interval_count(&mut self) -> Result<u64> {
        (self.read_interval_count)(&mut self.code_reader)
    }

    #[inline(always)]
    fn read_interval_start(&mut self) -> Result<u64> {
        (self.read_interval_start)(&mut self.code_reader)
    }

    #[inline(always)]
    fn read_interval_len(&mut self) -> Result<u64> {
        (self.read_interval_len)(&mut self.code_reader)
    }

    #[inline(always)]
    fn read_first_residual(&mut self) -> Result<u64> {
        (self.read_first_residual)(&mut self.code_reader)
    }

    #[inline(always)]
    fn read_residual(&mut self) -> Result<u64> {
        (self.read_residual)(&mut self.code_reader)
    }
}

/// A factory of [`DynCodesDecoder`]s over a [`BitReaderFactory`], holding
/// the offsets and the function pointers the decoders are stamped out with.
#[derive(Debug)]
pub struct DynCodesDecoderFactory<F: BitReaderFactory> {
    /// The owned data we will read as a bitstream.
    factory: F,
    /// The offsets into the data.
    offsets: NodeOffsets,
    /// The compression flags.
    compression_flags: CompFlags,
    // The cached functions to read the codes.
    read_outdegree: for<'a> fn(&mut F::BitReader<'a>) -> Result<u64>,
    read_reference_offset: for<'a> fn(&mut F::BitReader<'a>) -> Result<u64>,
    read_block_count: for<'a> fn(&mut F::BitReader<'a>) -> Result<u64>,
    read_block: for<'a> fn(&mut F::BitReader<'a>) -> Result<u64>,
    read_interval_count: for<'a> fn(&mut F::BitReader<'a>) -> Result<u64>,
    read_interval_start: for<'a> fn(&mut F::BitReader<'a>) -> Result<u64>,
    read_interval_len: for<'a> fn(&mut F::BitReader<'a>) -> Result<u64>,
    read_first_residual: for<'a> fn(&mut F::BitReader<'a>) -> Result<u64>,
    read_residual: for<'a> fn(&mut F::BitReader<'a>) -> Result<u64>,
}

impl<F: BitReaderFactory> DynCodesDecoderFactory<F> {
    const READ_UNARY: for<'a> fn(&mut F::BitReader<'a>) -> Result<u64> = |r| r.read_unary();
    const READ_GAMMA: for<'a> fn(&mut F::BitReader<'a>) -> Result<u64> = |r| r.read_gamma();
    const READ_DELTA: for<'a> fn(&mut F::BitReader<'a>) -> Result<u64> = |r| r.read_delta();
    const READ_ZETA2: for<'a> fn(&mut F::BitReader<'a>) -> Result<u64> = |r| r.read_zeta(2);
    const READ_ZETA3: for<'a> fn(&mut F::BitReader<'a>) -> Result<u64> = |r| r.read_zeta3();
    const READ_ZETA4: for<'a> fn(&mut F::BitReader<'a>) -> Result<u64> = |r| r.read_zeta(4);
    const READ_ZETA5: for<'a> fn(&mut F::BitReader<'a>) -> Result<u64> = |r| r.read_zeta(5);
    const READ_ZETA6: for<'a> fn(&mut F::BitReader<'a>) -> Result<u64> = |r| r.read_zeta(6);
    const READ_ZETA7: for<'a> fn(&mut F::BitReader<'a>) -> Result<u64> = |r| r.read_zeta(7);
    const READ_ZETA1: for<'a> fn(&mut F::BitReader<'a>) -> Result<u64> = Self::READ_GAMMA;
    const READ_NIBBLE: for<'a> fn(&mut F::BitReader<'a>) -> Result<u64> = |r| r.read_nibble();

    #[allow(clippy::type_complexity)]
    fn select_code(code: Codes) -> Result<for<'a> fn(&mut F::BitReader<'a>) -> Result<u64>> {
        Ok(match code {
            Codes::Unary => Self::READ_UNARY,
            Codes::Gamma => Self::READ_GAMMA,
            Codes::Delta => Self::READ_DELTA,
            Codes::Zeta { k: 1 } => Self::READ_ZETA1,
            Codes::Zeta { k: 2 } => Self::READ_ZETA2,
            Codes::Zeta { k: 3 } => Self::READ_ZETA3,
            Codes::Zeta { k: 4 } => Self::READ_ZETA4,
            Codes::Zeta { k: 5 } => Self::READ_ZETA5,
            Codes::Zeta { k: 6 } => Self::READ_ZETA6,
            Codes::Zeta { k: 7 } => Self::READ_ZETA7,
            Codes::Nibble => Self::READ_NIBBLE,
            code => return Err(Error::UnsupportedCoding(code)),
        })
    }

    /// Creates a new factory from the data, the offsets, and the compression
    /// flags.
    pub fn new(factory: F, offsets: NodeOffsets, cf: CompFlags) -> Result<Self> {
        Ok(Self {
            factory,
            offsets,
            read_outdegree: Self::select_code(cf.outdegrees)?,
            read_reference_offset: Self::select_code(cf.references)?,
            read_block_count: Self::select_code(cf.block_count)?,
            read_block: Self::select_code(cf.blocks)?,
            read_interval_count: Self::select_code(cf.interval_count)?,
            read_interval_start: Self::select_code(cf.intervals)?,
            read_interval_len: Self::select_code(cf.intervals)?,
            read_first_residual: Self::select_code(cf.residuals)?,
            read_residual: Self::select_code(cf.residuals)?,
            compression_flags: cf,
        })
    }

    /// Return a reference to the compression flags.
    #[inline(always)]
    pub fn compression_flags(&self) -> &CompFlags {
        &self.compression_flags
    }
}

impl<F: BitReaderFactory> RandomAccessDecoderFactory for DynCodesDecoderFactory<F> {
    type Decoder<'a> = DynCodesDecoder<F::BitReader<'a>>
    where
        Self: 'a;

    fn new_decoder(&self, node: usize) -> Result<Self::Decoder<'_>> {
        let mut code_reader = self.factory.new_reader();
        code_reader.set_bit_pos(self.offsets.get(node)?)?;

        Ok(DynCodesDecoder {
            code_reader,
            read_outdegree: self.read_outdegree,
            read_reference_offset: self.read_reference_offset,
            read_block_count: self.read_block_count,
            read_block: self.read_block,
            read_interval_count: self.read_interval_count,
            read_interval_start: self.read_interval_start,
            read_interval_len: self.read_interval_len,
            read_first_residual: self.read_first_residual,
            read_residual: self.read_residual,
        })
    }

    fn bit_offset(&self, node: usize) -> Result<u64> {
        self.offsets.get(node)
    }
}

impl<F: BitReaderFactory> SequentialDecoderFactory for DynCodesDecoderFactory<F> {
    type Decoder<'a> = DynCodesDecoder<F::BitReader<'a>>
    where
        Self: 'a;

    fn new_decoder(&self) -> Result<Self::Decoder<'_>> {
        Ok(DynCodesDecoder {
            code_reader: self.factory.new_reader(),
            read_outdegree: self.read_outdegree,
            read_reference_offset: self.read_reference_offset,
            read_block_count: self.read_block_count,
            read_block: self.read_block,
            read_interval_count: self.read_interval_count,
            read_interval_start: self.read_interval_start,
            read_interval_len: self.read_interval_len,
            read_first_residual: self.read_first_residual,
            read_residual: self.read_residual,
        })
    }
}
