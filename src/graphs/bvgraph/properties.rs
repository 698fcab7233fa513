/*
 * SPDX-FileCopyrightText: 2023 Inria
 * SPDX-FileCopyrightText: 2023 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

use crate::codes::Codes;
use crate::{Error, Result};
use std::collections::HashMap;
use std::io::BufReader;
use std::path::Path;

/// The compression parameters of a graph, parsed from its `.properties`
/// file.
///
/// Each field of the stream has its own code; for compatibility with the
/// Java tools the `BLOCKS` and `INTERVALS` tokens set both the count and the
/// value codes of their field, unless a `BLOCK_COUNT`/`INTERVAL_COUNT` token
/// overrides the count.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CompFlags {
    /// The code of the outdegrees.
    pub outdegrees: Codes,
    /// The code of the reference offsets.
    pub references: Codes,
    /// The code of the number of copy blocks.
    pub block_count: Codes,
    /// The code of the copy-block lengths.
    pub blocks: Codes,
    /// The code of the number of intervals.
    pub interval_count: Codes,
    /// The code of the interval extremes and lengths.
    pub intervals: Codes,
    /// The code of the residuals.
    pub residuals: Codes,
    /// The code of the deltas in the `.offsets` file.
    pub offsets: Codes,
    /// The minimum length of a run of consecutive successors encoded as an
    /// interval.
    pub min_interval_length: usize,
    /// The number of previous nodes a node can copy its successors from.
    pub compression_window: usize,
    /// The maximum length of a chain of reference copies.
    pub max_ref_count: usize,
    /// The parameter of the ζ codes.
    pub zeta_k: u64,
}

impl core::default::Default for CompFlags {
    fn default() -> Self {
        CompFlags {
            outdegrees: Codes::Gamma,
            references: Codes::Unary,
            block_count: Codes::Gamma,
            blocks: Codes::Gamma,
            interval_count: Codes::Gamma,
            intervals: Codes::Gamma,
            residuals: Codes::Zeta { k: 3 },
            offsets: Codes::Gamma,
            min_interval_length: 3,
            compression_window: 7,
            max_ref_count: 3,
            zeta_k: 3,
        }
    }
}

impl CompFlags {
    /// Convert a decoded `.properties` map (with lowercased keys) into a
    /// `CompFlags` struct.
    pub fn from_properties(map: &HashMap<String, String>) -> Result<Self> {
        let mut cf = CompFlags::default();

        if let Some(spec_k) = map.get("zetak").or_else(|| map.get("zeta_k")) {
            let k = spec_k
                .parse::<u64>()
                .map_err(|_| Error::PropertyFile(format!("cannot parse zetak '{}'", spec_k)))?;
            if !(1..=7).contains(&k) {
                return Err(Error::PropertyFile(format!(
                    "only ζ₁-ζ₇ are supported, got zetak={}",
                    k
                )));
            }
            cf.zeta_k = k;
            cf.residuals = Codes::Zeta { k };
        }

        if let Some(comp_flags) = map.get("compressionflags") {
            for token in comp_flags
                .split(|c: char| c == '|' || c.is_whitespace())
                .filter(|t| !t.is_empty())
            {
                let (field, code) = token
                    .rsplit_once('_')
                    .ok_or_else(|| Error::CompressionFlag(token.to_string()))?;
                let code = Codes::from_token(code, cf.zeta_k)
                    .ok_or_else(|| Error::CompressionFlag(token.to_string()))?;
                match field {
                    "OUTDEGREES" => cf.outdegrees = code,
                    "REFERENCES" | "REFERENCE" => cf.references = code,
                    "BLOCKS" => {
                        cf.blocks = code;
                        cf.block_count = code;
                    }
                    "BLOCK_COUNT" => cf.block_count = code,
                    "INTERVALS" => {
                        cf.intervals = code;
                        cf.interval_count = code;
                    }
                    "INTERVAL_COUNT" => cf.interval_count = code,
                    "RESIDUALS" => cf.residuals = code,
                    "OFFSETS" => cf.offsets = code,
                    _ => return Err(Error::CompressionFlag(token.to_string())),
                }
            }
        }

        macro_rules! parse_usize {
            ($key:literal, $field:ident) => {
                if let Some(value) = map.get($key) {
                    cf.$field = value.parse().map_err(|_| {
                        Error::PropertyFile(format!("cannot parse {} '{}'", $key, value))
                    })?;
                }
            };
        }
        parse_usize!("windowsize", compression_window);
        parse_usize!("minintervallength", min_interval_length);
        parse_usize!("maxrefcount", max_ref_count);

        Ok(cf)
    }
}

/// The metadata of a graph, parsed from its `.properties` file.
#[derive(Clone, Debug)]
pub struct Properties {
    /// The number of nodes.
    pub num_nodes: usize,
    /// The number of arcs.
    pub num_arcs: u64,
    /// The average number of bits per arc, when recorded.
    pub bits_per_link: Option<f64>,
    /// The exact bit length of the graph stream, when recorded.
    pub graph_bits: Option<u64>,
    /// The compression parameters.
    pub comp_flags: CompFlags,
}

impl Properties {
    /// An upper bound on the bit length of the graph stream, usable as the
    /// universe of the offset index: the exact `length` property when
    /// present, otherwise an estimate from `bitsperlink` with slack for its
    /// limited precision.
    pub fn graph_bits_bound(&self) -> Option<u64> {
        self.graph_bits.or_else(|| {
            self.bits_per_link
                .map(|bits| (bits * self.num_arcs as f64).ceil() as u64 + self.num_arcs / 128 + 64)
        })
    }
}

/// Read a `.properties` file and return the graph metadata.
///
/// Keys are case-insensitive. A `version` other than 0 fails with
/// [`Error::UnsupportedVersion`]; unknown `compressionflags` tokens fail
/// with [`Error::CompressionFlag`]; anything else malformed fails with
/// [`Error::PropertyFile`].
pub fn parse_properties(path: impl AsRef<Path>) -> Result<Properties> {
    let path = path.as_ref();
    let file = std::fs::File::open(path)?;
    let map = java_properties::read(BufReader::new(file))
        .map_err(|e| Error::PropertyFile(format!("{}: {}", path.display(), e)))?;
    let map: HashMap<String, String> = map
        .into_iter()
        .map(|(key, value)| (key.to_lowercase(), value))
        .collect();

    if let Some(version) = map.get("version") {
        if version != "0" {
            return Err(Error::UnsupportedVersion(version.clone()));
        }
    }
    if let Some(endianness) = map.get("endianness") {
        if !endianness.to_lowercase().starts_with("big") {
            return Err(Error::PropertyFile(format!(
                "unsupported endianness '{}', only big-endian graphs can be read",
                endianness
            )));
        }
    }

    let num_nodes = map
        .get("nodes")
        .ok_or_else(|| Error::PropertyFile(format!("missing 'nodes' in {}", path.display())))?
        .parse::<usize>()
        .map_err(|_| Error::PropertyFile(format!("cannot parse 'nodes' in {}", path.display())))?;
    let num_arcs = map
        .get("arcs")
        .ok_or_else(|| Error::PropertyFile(format!("missing 'arcs' in {}", path.display())))?
        .parse::<u64>()
        .map_err(|_| Error::PropertyFile(format!("cannot parse 'arcs' in {}", path.display())))?;

    let bits_per_link = map.get("bitsperlink").and_then(|value| value.parse().ok());
    let graph_bits = map.get("length").and_then(|value| value.parse().ok());
    let comp_flags = CompFlags::from_properties(&map)?;

    Ok(Properties {
        num_nodes,
        num_arcs,
        bits_per_link,
        graph_bits,
        comp_flags,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(content: &str) -> Result<Properties> {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("graph.properties");
        std::fs::write(&path, content).unwrap();
        parse_properties(&path)
    }

    #[test]
    fn test_defaults() {
        let properties = parse("nodes=10\narcs=20\n").unwrap();
        assert_eq!(properties.num_nodes, 10);
        assert_eq!(properties.num_arcs, 20);
        assert_eq!(properties.comp_flags, CompFlags::default());
    }

    #[test]
    fn test_full_file() {
        let properties = parse(
            "# a comment\n\
             graphclass=it.unimi.dsi.webgraph.BVGraph\n\
             version=0\n\
             NODES=325557\n\
             arcs=3216152\n\
             windowsize=7\n\
             maxrefcount=3\n\
             minintervallength=4\n\
             zetak=5\n\
             compressionflags=OUTDEGREES_DELTA|RESIDUALS_ZETA\n\
             bitsperlink=3.07\n\
             length=9873423\n",
        )
        .unwrap();
        assert_eq!(properties.num_nodes, 325557);
        assert_eq!(properties.comp_flags.outdegrees, Codes::Delta);
        assert_eq!(properties.comp_flags.residuals, Codes::Zeta { k: 5 });
        assert_eq!(properties.comp_flags.min_interval_length, 4);
        assert_eq!(properties.comp_flags.zeta_k, 5);
        assert_eq!(properties.graph_bits, Some(9873423));
        assert_eq!(properties.bits_per_link, Some(3.07));
    }

    #[test]
    fn test_split_field_tokens() {
        let properties = parse(
            "nodes=1\narcs=0\n\
             compressionflags=BLOCKS_DELTA BLOCK_COUNT_UNARY INTERVAL_COUNT_NIBBLE\n",
        )
        .unwrap();
        assert_eq!(properties.comp_flags.blocks, Codes::Delta);
        assert_eq!(properties.comp_flags.block_count, Codes::Unary);
        assert_eq!(properties.comp_flags.interval_count, Codes::Nibble);
        assert_eq!(properties.comp_flags.intervals, Codes::Gamma);
    }

    #[test]
    fn test_errors() {
        assert!(matches!(
            parse("nodes=1\narcs=0\nversion=7\n"),
            Err(Error::UnsupportedVersion(_))
        ));
        assert!(matches!(
            parse("nodes=1\narcs=0\ncompressionflags=RESIDUALS_FOO\n"),
            Err(Error::CompressionFlag(_))
        ));
        assert!(matches!(
            parse("nodes=1\narcs=0\ncompressionflags=SOMETHING_GAMMA\n"),
            Err(Error::CompressionFlag(_))
        ));
        assert!(matches!(parse("arcs=0\n"), Err(Error::PropertyFile(_))));
        assert!(matches!(
            parse("nodes=x\narcs=0\n"),
            Err(Error::PropertyFile(_))
        ));
        assert!(matches!(
            parse("nodes=1\narcs=0\nzetak=9\n"),
            Err(Error::PropertyFile(_))
        ));
        assert!(matches!(
            parse("nodes=1\narcs=0\nendianness=little\n"),
            Err(Error::PropertyFile(_))
        ));
    }
}
