/*
 * SPDX-FileCopyrightText: 2023 Inria
 * SPDX-FileCopyrightText: 2023 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

use super::*;
use crate::ef::EliasFano;
use crate::utils::MmapHelper;
use anyhow::{Context, Result};
use log::info;
use sealed::sealed;
use std::path::{Path, PathBuf};

/// Sequential or random access.
#[doc(hidden)]
#[sealed]
pub trait Access: 'static {}

#[derive(Debug, Clone)]
pub struct Sequential {}
#[sealed]
impl Access for Sequential {}

#[derive(Debug, Clone)]
pub struct Random {}
#[sealed]
impl Access for Random {}

/// How the graph stream is accessed.
///
/// Each load mode provides the [`BitReaderFactory`] backing the decoders.
#[sealed]
pub trait LoadMode: 'static {
    type Factory: BitReaderFactory;

    fn new_factory(graph: &Path, flags: MemoryFlags) -> Result<Self::Factory>;
}

/// The graph is memory-mapped. This is the default mode.
#[derive(Debug, Clone)]
pub struct Mmap {}
#[sealed]
impl LoadMode for Mmap {
    type Factory = MmapHelper<u8>;

    fn new_factory(graph: &Path, flags: MemoryFlags) -> Result<Self::Factory> {
        MmapHelper::mmap(graph, flags.into())
    }
}

/// The graph is loaded into allocated memory.
#[derive(Debug, Clone)]
pub struct LoadMem {}
#[sealed]
impl LoadMode for LoadMem {
    type Factory = MemoryFactory<Box<[u8]>>;

    fn new_factory(graph: &Path, _flags: MemoryFlags) -> Result<Self::Factory> {
        MemoryFactory::new_mem(graph)
    }
}

/// The graph stays on disk and is read through a file; the cheapest mode in
/// memory, the slowest in access.
#[derive(Debug, Clone)]
pub struct File {}
#[sealed]
impl LoadMode for File {
    type Factory = FileFactory;

    fn new_factory(graph: &Path, _flags: MemoryFlags) -> Result<Self::Factory> {
        FileFactory::new(graph)
    }
}

/// How (and whether) the offsets of a graph are loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OffsetsMode {
    /// No offsets: random access fails with
    /// [`Error::RequiresOffsets`](crate::Error::RequiresOffsets).
    None,
    /// One 64-bit offset per node; the fastest lookup, 8n bytes.
    Dense,
    /// A compact Elias–Fano index, a few bits per node.
    EliasFano,
    /// [`Dense`](OffsetsMode::Dense) when `8 * num_nodes` bytes fit the
    /// given budget **in bytes**, [`EliasFano`](OffsetsMode::EliasFano)
    /// otherwise.
    Budget(u64),
}

impl OffsetsMode {
    /// Map the numeric `offset_step` convention of the classic tools onto an
    /// offset mode: `-1` and `0` load no offsets, `1` loads dense offsets,
    /// `2` and anything below `-1` build the Elias–Fano index, and anything
    /// above `2` is a byte budget.
    ///
    /// Steps below zero also imply that the graph itself should stay on
    /// disk, which here is a [`LoadConfig::mode`] choice.
    pub fn from_step(offset_step: i64) -> Self {
        match offset_step {
            -1 | 0 => OffsetsMode::None,
            1 => OffsetsMode::Dense,
            2 => OffsetsMode::EliasFano,
            step if step < -1 => OffsetsMode::EliasFano,
            step => OffsetsMode::Budget(step as u64),
        }
    }

    /// Resolve a [`Budget`](OffsetsMode::Budget) against the number of
    /// nodes.
    fn resolve(self, num_nodes: usize) -> Self {
        match self {
            OffsetsMode::Budget(budget) => {
                if num_nodes as u64 * 8 <= budget {
                    OffsetsMode::Dense
                } else {
                    OffsetsMode::EliasFano
                }
            }
            mode => mode,
        }
    }
}

/// A load configuration for a [`BvGraph`]/[`BvGraphSeq`].
///
/// A basic configuration is returned by
/// [`BvGraph::with_basename`]/[`BvGraphSeq::with_basename`] and can then be
/// customized with the methods of this struct.
#[derive(Debug, Clone)]
pub struct LoadConfig<A: Access, GLM: LoadMode> {
    pub(crate) basename: PathBuf,
    pub(crate) graph_load_flags: MemoryFlags,
    pub(crate) offsets_mode: OffsetsMode,
    pub(crate) grow_spill: bool,
    pub(crate) _marker: std::marker::PhantomData<(A, GLM)>,
}

impl<A: Access, GLM: LoadMode> LoadConfig<A, GLM> {
    /// Choose the [`LoadMode`] for the graph stream.
    pub fn mode<NGLM: LoadMode>(self) -> LoadConfig<A, NGLM> {
        LoadConfig {
            basename: self.basename,
            graph_load_flags: self.graph_load_flags,
            offsets_mode: self.offsets_mode,
            grow_spill: self.grow_spill,
            _marker: std::marker::PhantomData,
        }
    }
}

impl<A: Access> LoadConfig<A, Mmap> {
    /// Set flags for memory-mapping the graph.
    pub fn flags(mut self, flags: MemoryFlags) -> Self {
        self.graph_load_flags = flags;
        self
    }
}

impl<GLM: LoadMode> LoadConfig<Random, GLM> {
    /// Choose how the offsets are loaded.
    pub fn offsets(mut self, mode: OffsetsMode) -> Self {
        self.offsets_mode = mode;
        self
    }

    /// Choose the offsets mode through the numeric `offset_step` convention
    /// (see [`OffsetsMode::from_step`]).
    pub fn offset_step(self, offset_step: i64) -> Self {
        let mode = OffsetsMode::from_step(offset_step);
        self.offsets(mode)
    }

    /// Let the offset index grow its select spill on overflow instead of
    /// failing.
    pub fn grow_spill(mut self, grow: bool) -> Self {
        self.grow_spill = grow;
        self
    }
}

impl<GLM: LoadMode> LoadConfig<Random, GLM> {
    /// Load a random-access graph.
    pub fn load(mut self) -> Result<BvGraph<DynCodesDecoderFactory<GLM::Factory>>> {
        self.basename.set_extension(PROPERTIES_EXTENSION);
        let properties = parse_properties(&self.basename)
            .with_context(|| format!("Cannot parse property file {}", self.basename.display()))?;
        self.basename.set_extension(GRAPH_EXTENSION);
        let factory = GLM::new_factory(&self.basename, self.graph_load_flags)?;
        self.basename.set_extension(OFFSETS_EXTENSION);
        let offsets = load_offsets(&self.basename, &properties, self.offsets_mode, self.grow_spill)
            .with_context(|| format!("Cannot load offsets {}", self.basename.display()))?;

        let cf = properties.comp_flags;
        Ok(BvGraph::new(
            DynCodesDecoderFactory::new(factory, offsets, cf)?,
            properties.num_nodes,
            properties.num_arcs,
            cf.compression_window,
            cf.min_interval_length,
            cf.max_ref_count,
        ))
    }
}

impl<GLM: LoadMode> LoadConfig<Sequential, GLM> {
    /// Load a sequential graph.
    pub fn load(mut self) -> Result<BvGraphSeq<DynCodesDecoderFactory<GLM::Factory>>> {
        self.basename.set_extension(PROPERTIES_EXTENSION);
        let properties = parse_properties(&self.basename)
            .with_context(|| format!("Cannot parse property file {}", self.basename.display()))?;
        self.basename.set_extension(GRAPH_EXTENSION);
        let factory = GLM::new_factory(&self.basename, self.graph_load_flags)?;

        let cf = properties.comp_flags;
        Ok(BvGraphSeq::new(
            DynCodesDecoderFactory::new(factory, NodeOffsets::None, cf)?,
            properties.num_nodes,
            Some(properties.num_arcs),
            cf.compression_window,
            cf.min_interval_length,
        ))
    }
}

fn load_offsets(
    path: &Path,
    properties: &Properties,
    mode: OffsetsMode,
    grow_spill: bool,
) -> Result<NodeOffsets> {
    let num_nodes = properties.num_nodes;
    let code = properties.comp_flags.offsets;
    match mode.resolve(num_nodes) {
        OffsetsMode::None => Ok(NodeOffsets::None),
        OffsetsMode::Dense => {
            info!("loading dense offsets for {} nodes", num_nodes);
            Ok(NodeOffsets::Dense(read_offsets(path, num_nodes, code)?))
        }
        OffsetsMode::EliasFano => {
            info!("building Elias-Fano offset index for {} nodes", num_nodes);
            let ef = match properties.graph_bits {
                Some(upper_bound) => read_offsets_ef(path, num_nodes, code, upper_bound, grow_spill)?,
                // without the exact bit length we have to materialize the
                // offsets to learn the universe
                None => ef_from_offsets(&read_offsets(path, num_nodes, code)?, grow_spill)?,
            };
            info!("offset index uses {} bytes", ef.size_in_bytes());
            Ok(NodeOffsets::EliasFano(ef))
        }
        OffsetsMode::Budget(_) => unreachable!("budgets are resolved before loading"),
    }
}

/// The memory a load would allocate, computed without performing it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequiredMemory {
    /// Bytes for the graph stream; zero for the on-disk modes.
    pub graph_bytes: u64,
    /// Bytes for the offsets, dense or Elias–Fano depending on the step.
    pub offsets_bytes: u64,
}

/// Compute the memory that loading the graph with the given `offset_step`
/// would require, from the properties and file metadata alone.
///
/// The Elias–Fano figure is the analytic bound of the structure (lower and
/// upper bits plus the select inventory, spill excluded), so callers can
/// pre-size buffers before committing to a load.
pub fn required_memory(basename: impl AsRef<Path>, offset_step: i64) -> Result<RequiredMemory> {
    let basename = basename.as_ref();
    let properties_path = basename.with_extension(PROPERTIES_EXTENSION);
    let properties = parse_properties(&properties_path)
        .with_context(|| format!("Cannot parse property file {}", properties_path.display()))?;

    let graph_path = basename.with_extension(GRAPH_EXTENSION);
    let graph_file_bytes = std::fs::metadata(&graph_path).map(|m| m.len()).ok();
    // on-disk modes allocate nothing for the stream
    let graph_bytes = if offset_step < 0 {
        0
    } else {
        graph_file_bytes
            .or_else(|| properties.graph_bits_bound().map(|bits| bits.div_ceil(8)))
            .with_context(|| format!("Cannot stat {}", graph_path.display()))?
    };

    let num_nodes = properties.num_nodes as u64;
    let offsets_bytes = match OffsetsMode::from_step(offset_step).resolve(properties.num_nodes) {
        OffsetsMode::None => 0,
        OffsetsMode::Dense => num_nodes * 8,
        OffsetsMode::EliasFano => {
            let upper_bound = properties
                .graph_bits_bound()
                .or_else(|| graph_file_bytes.map(|bytes| bytes * 8))
                .unwrap_or(0);
            EliasFano::estimate_size_bytes(num_nodes, upper_bound)
        }
        OffsetsMode::Budget(_) => unreachable!("budgets are resolved before sizing"),
    };

    Ok(RequiredMemory {
        graph_bytes,
        offsets_bytes,
    })
}
