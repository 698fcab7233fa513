/*
 * SPDX-FileCopyrightText: 2023 Inria
 * SPDX-FileCopyrightText: 2023 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

use crate::bits::MemBitReader;
use crate::codes::Codes;
use crate::ef::{EliasFano, EliasFanoBuilder};
use crate::{Error, Result};
use std::path::Path;

/// The per-node bit offsets of a graph, in one of the three states random
/// access can be loaded with.
///
/// The `.offsets` file stores one code-compressed delta per node; its prefix
/// sums are the absolute bit offsets, materialized either as one 64-bit
/// word per node or as an [`EliasFano`] index using a few bits per node.
#[derive(Debug, Clone)]
pub enum NodeOffsets {
    /// No offsets were loaded: the graph is sequential-only.
    None,
    /// One 64-bit offset per node.
    Dense(Box<[u64]>),
    /// A compact Elias–Fano index over the offsets.
    EliasFano(EliasFano),
}

impl NodeOffsets {
    /// The bit offset of the given node.
    ///
    /// Fails with [`Error::RequiresOffsets`] when no offsets were loaded.
    pub fn get(&self, node: usize) -> Result<u64> {
        match self {
            NodeOffsets::None => Err(Error::RequiresOffsets),
            NodeOffsets::Dense(offsets) => {
                offsets.get(node).copied().ok_or(Error::OutOfBound {
                    index: node as u64,
                    len: offsets.len() as u64,
                })
            }
            NodeOffsets::EliasFano(ef) => ef.get(node as u64),
        }
    }

    /// Whether random access is possible.
    pub fn is_loaded(&self) -> bool {
        !matches!(self, NodeOffsets::None)
    }

    /// Heap memory used by the offsets, in bytes.
    pub fn size_in_bytes(&self) -> u64 {
        match self {
            NodeOffsets::None => 0,
            NodeOffsets::Dense(offsets) => offsets.len() as u64 * 8,
            NodeOffsets::EliasFano(ef) => ef.size_in_bytes(),
        }
    }
}

fn deltas<'a>(
    data: &'a [u8],
    num_nodes: usize,
    code: Codes,
) -> impl Iterator<Item = Result<u64>> + 'a {
    let mut reader = MemBitReader::new(data);
    let mut offset = 0u64;
    (0..num_nodes).map(move |_| {
        let delta = code.read(&mut reader)?;
        offset += delta;
        Ok(offset)
    })
}

/// Decode an `.offsets` file into one 64-bit offset per node.
pub fn read_offsets(path: &Path, num_nodes: usize, code: Codes) -> Result<Box<[u64]>> {
    let data = std::fs::read(path)?;
    let mut offsets = Vec::with_capacity(num_nodes);
    for offset in deltas(&data, num_nodes, code) {
        offsets.push(offset?);
    }
    Ok(offsets.into_boxed_slice())
}

/// Decode an `.offsets` file directly into an Elias–Fano index over the
/// given universe (an upper bound on the bit length of the graph stream).
pub fn read_offsets_ef(
    path: &Path,
    num_nodes: usize,
    code: Codes,
    upper_bound: u64,
    grow_spill: bool,
) -> Result<EliasFano> {
    let data = std::fs::read(path)?;
    let mut builder = EliasFanoBuilder::new(num_nodes as u64, upper_bound).grow_spill(grow_spill);
    for offset in deltas(&data, num_nodes, code) {
        builder.push(offset?)?;
    }
    builder.build()
}

/// Build an Elias–Fano index from already materialized offsets, using the
/// last offset as the universe. This is the fallback when the properties do
/// not record the bit length of the graph stream.
pub fn ef_from_offsets(offsets: &[u64], grow_spill: bool) -> Result<EliasFano> {
    let upper_bound = offsets.last().copied().unwrap_or(0);
    let mut builder =
        EliasFanoBuilder::new(offsets.len() as u64, upper_bound).grow_spill(grow_spill);
    for &offset in offsets {
        builder.push(offset)?;
    }
    builder.build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_requires_offsets() {
        assert!(matches!(
            NodeOffsets::None.get(0),
            Err(Error::RequiresOffsets)
        ));
    }

    #[test]
    fn test_dense_and_ef_agree() {
        let offsets: Vec<u64> = (0..1000u64).map(|i| i * i).collect();
        let dense = NodeOffsets::Dense(offsets.clone().into_boxed_slice());
        let ef = NodeOffsets::EliasFano(ef_from_offsets(&offsets, false).unwrap());
        for node in 0..offsets.len() {
            assert_eq!(dense.get(node).unwrap(), ef.get(node).unwrap());
        }
        assert!(dense.get(offsets.len()).is_err());
        assert!(ef.get(offsets.len()).is_err());
    }
}
