/*
 * SPDX-FileCopyrightText: 2023 Inria
 * SPDX-FileCopyrightText: 2023 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

#![doc = include_str!("../README.md")]
#![deny(unstable_features)]
#![deny(trivial_casts)]
#![deny(unconditional_recursion)]
#![deny(clippy::empty_loop)]
#![deny(unreachable_code)]
#![deny(unreachable_pub)]
#![deny(unreachable_patterns)]
#![deny(unused_macro_rules)]

pub mod bits;
pub mod codes;
pub mod ef;
pub mod graphs;
pub mod utils;

use crate::codes::Codes;

/// The errors that can arise while loading or decoding a graph.
///
/// Load entry points wrap these in [`anyhow::Error`] to add path context;
/// the original kind can be recovered with
/// [`downcast_ref`](anyhow::Error::downcast_ref).
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed properties file: {0}")]
    PropertyFile(String),
    #[error("unsupported graph version: {0}")]
    UnsupportedVersion(String),
    #[error("unknown compression flag: {0}")]
    CompressionFlag(String),
    #[error("unsupported coding: {0}")]
    UnsupportedCoding(Codes),
    #[error("node {node} out of range for a graph with {num_nodes} nodes")]
    NodeOutOfRange { node: usize, num_nodes: usize },
    #[error("random access requires offsets; load the graph with a dense or Elias-Fano offset mode")]
    RequiresOffsets,
    #[error("index {index} out of bounds for a sequence of length {len}")]
    OutOfBound { index: u64, len: u64 },
    #[error("select spill buffer too small ({capacity} entries)")]
    SpillTooSmall { capacity: usize },
    #[error("non-monotone value {value} after {last}")]
    Nondecreasing { value: u64, last: u64 },
    #[error("corrupt graph stream: {0}")]
    CorruptStream(String),
}

/// An alias for results whose error is [`Error`].
pub type Result<T> = core::result::Result<T, Error>;

/// Prelude module to import everything from this crate.
pub mod prelude {
    pub use crate::bits::*;
    pub use crate::codes::*;
    pub use crate::ef::*;
    pub use crate::graphs::prelude::*;
    pub use crate::utils::*;
    pub use crate::Error;
}
