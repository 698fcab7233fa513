/*
 * SPDX-FileCopyrightText: 2023 Inria
 * SPDX-FileCopyrightText: 2023 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

use super::*;
use crate::bits::BitSeek;
use crate::utils::{nat2int, CircularBuffer};
use crate::{Error, Result};
use lender::*;
use std::path::PathBuf;

/// A graph that can only be traversed sequentially, created from a
/// [`SequentialDecoderFactory`].
///
/// Sequential access needs no offsets: the decoder walks the stream node by
/// node, keeping the last `compression_window` successor lists around to
/// resolve reference copies.
#[derive(Debug, Clone)]
pub struct BvGraphSeq<F> {
    factory: F,
    number_of_nodes: usize,
    number_of_arcs: Option<u64>,
    compression_window: usize,
    min_interval_length: usize,
}

impl BvGraphSeq<()> {
    /// Return a [`LoadConfig`] for the graph with the given basename.
    pub fn with_basename(basename: impl AsRef<std::path::Path>) -> LoadConfig<Sequential, Mmap> {
        LoadConfig {
            basename: PathBuf::from(basename.as_ref()),
            graph_load_flags: MemoryFlags::empty(),
            offsets_mode: OffsetsMode::None,
            grow_spill: false,
            _marker: std::marker::PhantomData,
        }
    }
}

impl<F: SequentialDecoderFactory> BvGraphSeq<F> {
    /// Create a new sequential graph from a decoder factory and the graph
    /// parameters.
    pub fn new(
        factory: F,
        number_of_nodes: usize,
        number_of_arcs: Option<u64>,
        compression_window: usize,
        min_interval_length: usize,
    ) -> Self {
        Self {
            factory,
            number_of_nodes,
            number_of_arcs,
            compression_window,
            min_interval_length,
        }
    }

    #[inline(always)]
    pub fn num_nodes(&self) -> usize {
        self.number_of_nodes
    }

    #[inline(always)]
    pub fn num_arcs_hint(&self) -> Option<u64> {
        self.number_of_arcs
    }

    /// Return a lending iterator over the nodes of the graph and their
    /// successors.
    #[inline(always)]
    pub fn iter(&self) -> Iter<F::Decoder<'_>> {
        Iter::new(
            self.factory.new_decoder().expect("cannot create decoder"),
            self.number_of_nodes,
            self.compression_window,
            self.min_interval_length,
        )
    }

    /// As [`iter`](Self::iter), but starting at the given node; the stream
    /// is decoded (and discarded) up to it.
    pub fn iter_from(&self, from: usize) -> Iter<F::Decoder<'_>> {
        let mut iter = self.iter();
        for _ in 0..from {
            iter.next();
        }
        iter
    }

    #[inline(always)]
    /// Consume self and return the factory.
    pub fn into_inner(self) -> F {
        self.factory
    }
}

impl<F: SequentialDecoderFactory> BvGraphSeq<F> {
    #[inline(always)]
    /// Creates an iterator specialized in the degrees of the nodes.
    ///
    /// This is faster than decoding the successors because it can skip the
    /// merging step entirely.
    pub fn offset_deg_iter(&self) -> OffsetDegIter<F::Decoder<'_>> {
        OffsetDegIter::new(
            self.factory.new_decoder().expect("cannot create decoder"),
            self.number_of_nodes,
            self.compression_window,
            self.min_interval_length,
        )
    }
}

impl<'a, F: SequentialDecoderFactory> IntoLender for &'a BvGraphSeq<F> {
    type Lender = Iter<F::Decoder<'a>>;

    #[inline(always)]
    fn into_lender(self) -> Self::Lender {
        self.iter()
    }
}

/// A fast sequential iterator over the nodes of the graph and their
/// successors, which does not need the offsets.
///
/// The successor list it lends borrows an internal buffer, invalidated by
/// the next advancement.
#[derive(Debug, Clone)]
pub struct Iter<D: Decode> {
    pub(crate) number_of_nodes: usize,
    pub(crate) compression_window: usize,
    pub(crate) min_interval_length: usize,
    pub(crate) decoder: D,
    pub(crate) backrefs: CircularBuffer<Vec<usize>>,
    pub(crate) current_node: usize,
}

impl<D: Decode + BitSeek> Iter<D> {
    #[inline(always)]
    /// The current bit offset in the graph stream.
    pub fn bit_pos(&mut self) -> u64 {
        self.decoder.bit_pos()
    }
}

impl<D: Decode> Iter<D> {
    /// Create a new iterator from a decoder positioned at the start of the
    /// stream.
    pub fn new(
        decoder: D,
        number_of_nodes: usize,
        compression_window: usize,
        min_interval_length: usize,
    ) -> Self {
        Self {
            number_of_nodes,
            compression_window,
            min_interval_length,
            decoder,
            backrefs: CircularBuffer::new(compression_window + 1),
            current_node: 0,
        }
    }

    /// Whether there are nodes left to decode.
    #[inline(always)]
    pub fn has_next(&self) -> bool {
        self.current_node < self.number_of_nodes
    }

    /// Get the successors of the next node in the stream.
    ///
    /// This is the checked counterpart of the [`Lender`] interface: decoding
    /// errors are returned instead of panicking, and the iterator is left in
    /// an indeterminate (but droppable) state after an error.
    pub fn next_successors(&mut self) -> Result<&[usize]> {
        let mut res = self.backrefs.take(self.current_node);
        res.clear();
        self.decode_successors(self.current_node, &mut res)?;
        let res = self.backrefs.replace(self.current_node, res);
        self.current_node += 1;
        Ok(res)
    }

    /// Decode the successor list of `node_id` into `results`, resolving
    /// reference copies against the back-reference window.
    fn decode_successors(&mut self, node_id: usize, results: &mut Vec<usize>) -> Result<()> {
        let degree = self.decoder.read_outdegree()? as usize;
        // no edges, we are done!
        if degree == 0 {
            return Ok(());
        }

        results.reserve(degree.saturating_sub(results.capacity()));
        // read the reference offset
        let ref_delta = if self.compression_window != 0 {
            self.decoder.read_reference_offset()? as usize
        } else {
            0
        };
        // if we copy nodes from a previous one
        if ref_delta != 0 {
            let reference_node_id = node_id.checked_sub(ref_delta).ok_or_else(|| {
                Error::CorruptStream(format!(
                    "node {} references {} nodes before the start",
                    node_id, ref_delta
                ))
            })?;
            let neighbours = &self.backrefs[reference_node_id];
            // get the info on which destinations to copy
            let number_of_blocks = self.decoder.read_block_count()? as usize;
            // no blocks, we copy everything
            if number_of_blocks == 0 {
                results.extend_from_slice(neighbours);
            } else {
                // otherwise we copy only the blocks of even index;
                // the first block could be zero
                let mut idx = self.decoder.read_block()? as usize;
                results.extend_from_slice(neighbours.get(..idx).ok_or_else(|| {
                    Error::CorruptStream("copy block beyond the reference list".into())
                })?);

                // while the others can't
                for block_id in 1..number_of_blocks {
                    let block = self.decoder.read_block()? as usize;
                    let end = idx + block + 1;
                    if block_id % 2 == 0 {
                        results.extend_from_slice(neighbours.get(idx..end).ok_or_else(
                            || Error::CorruptStream("copy block beyond the reference list".into()),
                        )?);
                    }
                    idx = end;
                }
                if number_of_blocks & 1 == 0 {
                    results.extend_from_slice(neighbours.get(idx..).ok_or_else(|| {
                        Error::CorruptStream("copy block beyond the reference list".into())
                    })?);
                }
            }
        };

        // if we still have to read nodes
        let nodes_left_to_decode = degree.checked_sub(results.len()).ok_or_else(|| {
            Error::CorruptStream("reference copies more successors than the outdegree".into())
        })?;
        if nodes_left_to_decode != 0 && self.min_interval_length != 0 {
            // read the number of intervals
            let number_of_intervals = self.decoder.read_interval_count()? as usize;
            if number_of_intervals != 0 {
                let node_id_offset = nat2int(self.decoder.read_interval_start()?);
                let signed_start = node_id as i64 + node_id_offset;
                if signed_start < 0 {
                    return Err(Error::CorruptStream("negative interval extreme".into()));
                }
                let mut start = signed_start as usize;
                let mut delta = self.decoder.read_interval_len()? as usize;
                delta += self.min_interval_length;
                // save the first interval
                results.extend(start..(start + delta));
                start += delta;
                // decode the remaining intervals
                for _ in 1..number_of_intervals {
                    start += 1 + self.decoder.read_interval_start()? as usize;
                    delta = self.decoder.read_interval_len()? as usize;
                    delta += self.min_interval_length;

                    results.extend(start..(start + delta));

                    start += delta;
                }
            }
        }

        // decode the residuals if needed
        let nodes_left_to_decode = degree.checked_sub(results.len()).ok_or_else(|| {
            Error::CorruptStream("intervals cover more successors than the outdegree".into())
        })?;
        if nodes_left_to_decode != 0 {
            let node_id_offset = nat2int(self.decoder.read_first_residual()?);
            let signed_extra = node_id as i64 + node_id_offset;
            if signed_extra < 0 {
                return Err(Error::CorruptStream("negative residual".into()));
            }
            let mut extra = signed_extra as usize;
            results.push(extra);
            // decode the successive residuals
            for _ in 1..nodes_left_to_decode {
                extra += 1 + self.decoder.read_residual()? as usize;
                results.push(extra);
            }
        }

        // merge the three sorted groups
        results.sort_unstable();
        // a BV stream never produces duplicates or out-of-range successors
        if results.windows(2).any(|w| w[0] >= w[1])
            || results.last().is_some_and(|&last| last >= self.number_of_nodes)
        {
            return Err(Error::CorruptStream(format!(
                "successor list of node {} is not strictly increasing in range",
                node_id
            )));
        }
        Ok(())
    }
}

impl<'succ, D: Decode> Lending<'succ> for Iter<D> {
    type Lend = (usize, std::iter::Copied<std::slice::Iter<'succ, usize>>);
}

impl<D: Decode> Lender for Iter<D> {
    fn next(&mut self) -> Option<Lend<'_, Self>> {
        if self.current_node >= self.number_of_nodes {
            return None;
        }
        let mut res = self.backrefs.take(self.current_node);
        res.clear();
        self.decode_successors(self.current_node, &mut res)
            .expect("cannot decode successors");

        let res = self.backrefs.replace(self.current_node, res);
        let node_id = self.current_node;
        self.current_node += 1;
        Some((node_id, res.iter().copied()))
    }
}

impl<D: Decode> ExactSizeLender for Iter<D> {
    fn len(&self) -> usize {
        self.number_of_nodes - self.current_node
    }
}
