#![allow(dead_code)]

use bvgraph::utils::int2nat;
use std::path::{Path, PathBuf};

/// A big-endian bit writer used to synthesize graph streams for the tests.
///
/// Encoders mirror the decoding formulas of the library codes; the library
/// itself only reads.
pub struct BitWriter {
    bytes: Vec<u8>,
    current: u8,
    filled: u32,
}

impl BitWriter {
    pub fn new() -> Self {
        Self {
            bytes: Vec::new(),
            current: 0,
            filled: 0,
        }
    }

    /// The number of bits written so far.
    pub fn len_bits(&self) -> u64 {
        self.bytes.len() as u64 * 8 + self.filled as u64
    }

    fn push_bit(&mut self, bit: u64) {
        self.current = (self.current << 1) | (bit & 1) as u8;
        self.filled += 1;
        if self.filled == 8 {
            self.bytes.push(self.current);
            self.current = 0;
            self.filled = 0;
        }
    }

    /// Write the lowest `n_bits` bits of `value`, most significant first.
    pub fn write_bits(&mut self, value: u64, n_bits: u32) {
        for i in (0..n_bits).rev() {
            self.push_bit(value >> i);
        }
    }

    pub fn write_unary(&mut self, value: u64) {
        for _ in 0..value {
            self.push_bit(0);
        }
        self.push_bit(1);
    }

    pub fn write_gamma(&mut self, value: u64) {
        let value = value + 1;
        let len = value.ilog2();
        self.write_unary(len as u64);
        self.write_bits(value - (1 << len), len);
    }

    pub fn write_delta(&mut self, value: u64) {
        let value = value + 1;
        let len = value.ilog2();
        self.write_gamma(len as u64);
        self.write_bits(value - (1 << len), len);
    }

    pub fn write_minimal_binary(&mut self, value: u64, max: u64) {
        let l = max.ilog2();
        let limit = (1 << (l + 1)) - max;
        if value < limit {
            self.write_bits(value, l);
        } else {
            let to_write = value + limit;
            self.write_bits(to_write >> 1, l);
            self.write_bits(to_write & 1, 1);
        }
    }

    pub fn write_zeta(&mut self, value: u64, k: u64) {
        let value = value + 1;
        let h = value.ilog2() as u64 / k;
        self.write_unary(h);
        let l = 1u64 << (h * k);
        let u = 1u64 << ((h + 1) * k);
        self.write_minimal_binary(value - l, u - l);
    }

    pub fn write_zeta3(&mut self, value: u64) {
        self.write_zeta(value, 3);
    }

    /// Flush and return the bytes, zero-padded to a whole byte.
    pub fn into_bytes(mut self) -> Vec<u8> {
        if self.filled != 0 {
            self.bytes.push(self.current << (8 - self.filled));
        }
        self.bytes
    }
}

/// Write a `.graph` stream for the given adjacency lists using the default
/// codes, encoding every successor as a residual (no references, no
/// intervals), and return the bytes together with the per-node bit offsets.
pub fn encode_residuals_only(
    nodes: &[Vec<usize>],
    compression_window: usize,
    min_interval_length: usize,
) -> (Vec<u8>, Vec<u64>, u64) {
    let mut writer = BitWriter::new();
    let mut offsets = Vec::with_capacity(nodes.len());
    for (node, successors) in nodes.iter().enumerate() {
        offsets.push(writer.len_bits());
        writer.write_gamma(successors.len() as u64);
        if successors.is_empty() {
            continue;
        }
        if compression_window != 0 {
            // no reference
            writer.write_unary(0);
        }
        if min_interval_length != 0 {
            // no intervals
            writer.write_gamma(0);
        }
        writer.write_zeta3(int2nat(successors[0] as i64 - node as i64));
        for pair in successors.windows(2) {
            writer.write_zeta3((pair[1] - pair[0] - 1) as u64);
        }
    }
    let len_bits = writer.len_bits();
    (writer.into_bytes(), offsets, len_bits)
}

/// γ-encode the offset deltas of a graph stream.
pub fn encode_offsets(offsets: &[u64]) -> Vec<u8> {
    let mut writer = BitWriter::new();
    let mut previous = 0;
    for &offset in offsets {
        writer.write_gamma(offset - previous);
        previous = offset;
    }
    writer.into_bytes()
}

/// The `.properties` contents for a graph with the given parameters and the
/// default codes.
pub fn properties(
    num_nodes: usize,
    num_arcs: u64,
    compression_window: usize,
    min_interval_length: usize,
    max_ref_count: usize,
    length: u64,
) -> String {
    format!(
        "#BVGraph properties\n\
         graphclass=it.unimi.dsi.webgraph.BVGraph\n\
         version=0\n\
         nodes={num_nodes}\n\
         arcs={num_arcs}\n\
         windowsize={compression_window}\n\
         minintervallength={min_interval_length}\n\
         maxrefcount={max_ref_count}\n\
         zetak=3\n\
         length={length}\n\
         compressionflags=\n"
    )
}

/// Write the three files of a graph into `dir` and return its basename.
pub fn write_graph_files(
    dir: &Path,
    name: &str,
    graph: &[u8],
    offsets: &[u8],
    properties: &str,
) -> PathBuf {
    let basename = dir.join(name);
    std::fs::write(basename.with_extension("graph"), graph).unwrap();
    std::fs::write(basename.with_extension("offsets"), offsets).unwrap();
    std::fs::write(basename.with_extension("properties"), properties).unwrap();
    basename
}

/// Write a residual-only graph with the given window/interval parameters
/// declared in its properties, returning its basename.
pub fn write_residuals_graph(dir: &Path, name: &str, nodes: &[Vec<usize>]) -> PathBuf {
    let (graph, offsets, len_bits) = encode_residuals_only(nodes, 7, 3);
    let num_arcs = nodes.iter().map(|successors| successors.len() as u64).sum();
    let properties = properties(nodes.len(), num_arcs, 7, 3, 3, len_bits);
    write_graph_files(dir, name, &graph, &encode_offsets(&offsets), &properties)
}
