/*
 * SPDX-FileCopyrightText: 2023 Inria
 * SPDX-FileCopyrightText: 2023 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

use super::sequential::Iter;
use super::*;
use crate::utils::{nat2int, CircularBuffer};
use crate::{Error, Result};
use lender::IntoLender;
use std::path::PathBuf;

/// A graph whose successor lists can be decoded in any order, thanks to the
/// per-node bit offsets held by its [`RandomAccessDecoderFactory`].
///
/// Reference copies are resolved by recursively decoding the referenced
/// node; the recursion is bounded by the `maxrefcount` the graph was
/// compressed with, and a stream requiring deeper chains is reported as
/// corrupt.
#[derive(Debug, Clone)]
pub struct BvGraph<F> {
    factory: F,
    number_of_nodes: usize,
    number_of_arcs: u64,
    compression_window: usize,
    min_interval_length: usize,
    max_ref_count: usize,
}

impl BvGraph<()> {
    /// Return a [`LoadConfig`] for the graph with the given basename.
    pub fn with_basename(basename: impl AsRef<std::path::Path>) -> LoadConfig<Random, Mmap> {
        LoadConfig {
            basename: PathBuf::from(basename.as_ref()),
            graph_load_flags: MemoryFlags::empty(),
            offsets_mode: OffsetsMode::EliasFano,
            grow_spill: false,
            _marker: std::marker::PhantomData,
        }
    }
}

impl<F> BvGraph<F>
where
    F: RandomAccessDecoderFactory,
{
    /// Create a new graph from a decoder factory and the graph parameters.
    pub fn new(
        factory: F,
        number_of_nodes: usize,
        number_of_arcs: u64,
        compression_window: usize,
        min_interval_length: usize,
        max_ref_count: usize,
    ) -> Self {
        Self {
            factory,
            number_of_nodes,
            number_of_arcs,
            compression_window,
            min_interval_length,
            max_ref_count,
        }
    }

    #[inline(always)]
    pub fn num_nodes(&self) -> usize {
        self.number_of_nodes
    }

    #[inline(always)]
    pub fn num_arcs(&self) -> u64 {
        self.number_of_arcs
    }

    #[inline(always)]
    /// Consume self and return the factory.
    pub fn into_inner(self) -> F {
        self.factory
    }

    fn check_node(&self, node_id: usize) -> Result<()> {
        if node_id >= self.number_of_nodes {
            return Err(Error::NodeOutOfRange {
                node: node_id,
                num_nodes: self.number_of_nodes,
            });
        }
        Ok(())
    }

    /// The bit offset of the given node in the graph stream.
    pub fn offset(&self, node_id: usize) -> Result<u64> {
        self.check_node(node_id)?;
        self.factory.bit_offset(node_id)
    }

    /// The outdegree of the given node, decoded without reconstructing its
    /// successors.
    pub fn outdegree(&self, node_id: usize) -> Result<usize> {
        self.check_node(node_id)?;
        let mut reader = self.factory.new_decoder(node_id)?;
        Ok(reader.read_outdegree()? as usize)
    }

    /// An iterator over the successors of the given node, in increasing
    /// order.
    pub fn successors(&self, node_id: usize) -> Result<Succ<F::Decoder<'_>>> {
        self.check_node(node_id)?;
        self.successors_with_depth(node_id, 0)
    }

    fn successors_with_depth(&self, node_id: usize, depth: usize) -> Result<Succ<F::Decoder<'_>>> {
        if depth > self.max_ref_count {
            return Err(Error::CorruptStream(format!(
                "reference chain at node {} deeper than maxrefcount {}",
                node_id, self.max_ref_count
            )));
        }
        let reader = self.factory.new_decoder(node_id)?;
        let mut result = Succ::new(reader);
        let degree = result.reader.read_outdegree()? as usize;
        // no edges, we are done!
        if degree == 0 {
            return Ok(result);
        }
        result.size = degree;
        let mut nodes_left_to_decode = degree;

        // read the reference offset
        let ref_delta = if self.compression_window != 0 {
            result.reader.read_reference_offset()? as usize
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
            let neighbours = self.successors_with_depth(reference_node_id, depth + 1)?;
            // get the info on which destinations to copy
            let number_of_blocks = result.reader.read_block_count()? as usize;
            // add +1 if the number of blocks is even, so we have capacity for
            // the block that will be added in the masked iterator
            let alloc_len = 1 + number_of_blocks - (number_of_blocks & 1);
            let mut blocks = Vec::with_capacity(alloc_len);
            if number_of_blocks != 0 {
                // the first block could be zero
                blocks.push(result.reader.read_block()? as usize);
                // while the others can't
                for _ in 1..number_of_blocks {
                    blocks.push(result.reader.read_block()? as usize + 1);
                }
            }
            let copied = MaskedIterator::new(neighbours, blocks)?;
            nodes_left_to_decode =
                nodes_left_to_decode.checked_sub(copied.len()).ok_or_else(|| {
                    Error::CorruptStream(
                        "reference copies more successors than the outdegree".into(),
                    )
                })?;

            result.copied_nodes_iter = Some(copied);
        };

        // if we still have to read nodes
        if nodes_left_to_decode != 0 && self.min_interval_length != 0 {
            // read the number of intervals
            let number_of_intervals = result.reader.read_interval_count()? as usize;
            if number_of_intervals != 0 {
                result.intervals = Vec::with_capacity(number_of_intervals + 1);
                let node_id_offset = nat2int(result.reader.read_interval_start()?);
                let signed_start = node_id as i64 + node_id_offset;
                if signed_start < 0 {
                    return Err(Error::CorruptStream("negative interval extreme".into()));
                }
                let mut start = signed_start as usize;
                let mut delta = result.reader.read_interval_len()? as usize;
                delta += self.min_interval_length;
                // save the first interval
                result.intervals.push((start, delta));
                start += delta;
                nodes_left_to_decode =
                    nodes_left_to_decode.checked_sub(delta).ok_or_else(interval_overflow)?;
                // decode the remaining intervals
                for _ in 1..number_of_intervals {
                    start += 1 + result.reader.read_interval_start()? as usize;
                    delta = result.reader.read_interval_len()? as usize;
                    delta += self.min_interval_length;

                    result.intervals.push((start, delta));
                    start += delta;
                    nodes_left_to_decode = nodes_left_to_decode
                        .checked_sub(delta)
                        .ok_or_else(interval_overflow)?;
                }
                // a fake final interval to avoid checks in `next`
                result.intervals.push((usize::MAX - 1, 1));
            }
        }

        // decode just the first residual; the others are decoded on demand
        if nodes_left_to_decode != 0 {
            let node_id_offset = nat2int(result.reader.read_first_residual()?);
            let signed_residual = node_id as i64 + node_id_offset;
            if signed_residual < 0 {
                return Err(Error::CorruptStream("negative residual".into()));
            }
            result.next_residual_node = signed_residual as usize;
            result.residuals_to_go = nodes_left_to_decode - 1;
        }

        // setup the first interval node so we can decode without branches
        if !result.intervals.is_empty() {
            let (start, len) = &mut result.intervals[0];
            *len -= 1;
            result.next_interval_node = *start;
            *start += 1;
            result.intervals_idx += (*len == 0) as usize;
        };

        // cache the first copied node so we don't have to check whether the
        // iterator ended at every call of `next`
        result.next_copied_node = result
            .copied_nodes_iter
            .as_mut()
            .and_then(|iter| iter.next())
            .unwrap_or(usize::MAX);

        Ok(result)
    }

    /// Return a fast sequential iterator over the nodes of the graph and
    /// their successors.
    pub fn iter(&self) -> Iter<F::Decoder<'_>> {
        self.iter_from(0)
    }

    /// As [`iter`](Self::iter), but starting at the given node; the
    /// back-reference window is pre-filled with random accesses.
    pub fn iter_from(&self, start_node: usize) -> Iter<F::Decoder<'_>> {
        let codes_reader = self
            .factory
            .new_decoder(start_node)
            .expect("cannot create decoder");
        // we have to pre-fill the buffer
        let mut backrefs = CircularBuffer::new(self.compression_window + 1);

        for node_id in start_node.saturating_sub(self.compression_window)..start_node {
            backrefs.replace(
                node_id,
                self.successors(node_id)
                    .expect("cannot decode successors")
                    .collect(),
            );
        }

        Iter {
            decoder: codes_reader,
            backrefs,
            compression_window: self.compression_window,
            min_interval_length: self.min_interval_length,
            number_of_nodes: self.number_of_nodes,
            current_node: start_node,
        }
    }

    #[inline(always)]
    /// Creates an iterator specialized in the degrees of the nodes.
    ///
    /// This is faster than decoding the successors because it can skip the
    /// merging step entirely.
    pub fn offset_deg_iter(&self) -> OffsetDegIter<F::Decoder<'_>> {
        OffsetDegIter::new(
            self.factory.new_decoder(0).expect("cannot create decoder"),
            self.number_of_nodes,
            self.compression_window,
            self.min_interval_length,
        )
    }
}

fn interval_overflow() -> Error {
    Error::CorruptStream("intervals cover more successors than the outdegree".into())
}

impl<'a, F: RandomAccessDecoderFactory> IntoLender for &'a BvGraph<F> {
    type Lender = Iter<F::Decoder<'a>>;

    #[inline(always)]
    fn into_lender(self) -> Self::Lender {
        self.iter()
    }
}

/// The iterator over the successors of a node returned by
/// [`BvGraph::successors`], merging copied nodes, intervals, and residuals
/// in sorted order.
#[derive(Debug, Clone)]
pub struct Succ<D: Decode> {
    reader: D,
    /// The number of values left.
    size: usize,
    /// Iterator over the destinations that we are copying from another node.
    copied_nodes_iter: Option<MaskedIterator<Succ<D>>>,
    /// Intervals of extra nodes.
    intervals: Vec<(usize, usize)>,
    /// The index of the interval to return.
    intervals_idx: usize,
    /// Remaining residual nodes.
    residuals_to_go: usize,
    /// The next residual node.
    next_residual_node: usize,
    /// The next copied node.
    next_copied_node: usize,
    /// The next interval node.
    next_interval_node: usize,
}

impl<D: Decode> ExactSizeIterator for Succ<D> {
    #[inline(always)]
    fn len(&self) -> usize {
        self.size
    }
}

impl<D: Decode> Succ<D> {
    /// Create an empty iterator.
    fn new(reader: D) -> Self {
        Self {
            reader,
            size: 0,
            copied_nodes_iter: None,
            intervals: vec![],
            intervals_idx: 0,
            residuals_to_go: 0,
            next_residual_node: usize::MAX,
            next_copied_node: usize::MAX,
            next_interval_node: usize::MAX,
        }
    }
}

impl<D: Decode> Iterator for Succ<D> {
    type Item = usize;

    fn next(&mut self) -> Option<Self::Item> {
        // check if we should stop iterating
        if self.size == 0 {
            return None;
        }

        self.size -= 1;
        debug_assert!(
            self.next_copied_node != usize::MAX
                || self.next_residual_node != usize::MAX
                || self.next_interval_node != usize::MAX,
            "at least one of the groups must have a next node",
        );

        // find the smallest of the values
        let min = self.next_residual_node.min(self.next_interval_node);

        // depending on where the node comes from, advance that group
        if min >= self.next_copied_node {
            let res = self.next_copied_node;
            self.next_copied_node = self
                .copied_nodes_iter
                .as_mut()
                .and_then(|iter| iter.next())
                .unwrap_or(usize::MAX);
            return Some(res);
        } else if min == self.next_residual_node {
            if self.residuals_to_go == 0 {
                self.next_residual_node = usize::MAX;
            } else {
                self.residuals_to_go -= 1;
                // NOTE: the error cannot be propagated from here
                self.next_residual_node +=
                    1 + self.reader.read_residual().expect("cannot read residual") as usize;
            }
        } else {
            let (start, len) = &mut self.intervals[self.intervals_idx];
            debug_assert_ne!(*len, 0, "empty intervals should never be stored");
            // if the interval has other values, just shrink it
            *len -= 1;
            self.next_interval_node = *start;
            *start += 1;
            self.intervals_idx += (*len == 0) as usize;
        }

        Some(min)
    }
}
