/*
 * SPDX-FileCopyrightText: 2023 Inria
 * SPDX-FileCopyrightText: 2023 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! A reader for the BV compressed graph format.
//!
//! The format has been described by Paolo Boldi and Sebastiano Vigna in "[The
//! WebGraph Framework I: Compression
//! Techniques](https://dl.acm.org/doi/10.1145/988672.988752)", *Proc. of the
//! Thirteenth World–Wide Web Conference*, pages 595–601, 2004, ACM Press.
//!
//! A graph with basename `x` is stored in `x.graph` (the bit stream of the
//! successor lists), `x.offsets` (γ-coded deltas of the per-node bit
//! offsets) and `x.properties` (the metadata of the encoding). The main
//! access points are [`BvGraph::with_basename`] (random access) and
//! [`BvGraphSeq::with_basename`] (sequential access), which return a
//! [`LoadConfig`] that can be further customized.

pub const GRAPH_EXTENSION: &str = "graph";
pub const PROPERTIES_EXTENSION: &str = "properties";
pub const OFFSETS_EXTENSION: &str = "offsets";

mod properties;
pub use properties::*;

mod codecs;
pub use codecs::*;

mod offsets;
pub use offsets::*;

mod masked_iterator;
pub use masked_iterator::MaskedIterator;

mod offset_deg_iter;
pub use offset_deg_iter::OffsetDegIter;

pub mod sequential;
pub use sequential::BvGraphSeq;

pub mod random_access;
pub use random_access::BvGraph;

mod load;
pub use load::*;
