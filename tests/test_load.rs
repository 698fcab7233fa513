//! Load policies, memory sizing, and error reporting.

mod common;

use anyhow::Result;
use bvgraph::ef::EliasFano;
use bvgraph::prelude::*;
use bvgraph::Error;
use lender::*;

#[test]
fn test_offsets_mode_from_step() {
    assert_eq!(OffsetsMode::from_step(-1), OffsetsMode::None);
    assert_eq!(OffsetsMode::from_step(0), OffsetsMode::None);
    assert_eq!(OffsetsMode::from_step(1), OffsetsMode::Dense);
    assert_eq!(OffsetsMode::from_step(2), OffsetsMode::EliasFano);
    assert_eq!(OffsetsMode::from_step(-2), OffsetsMode::EliasFano);
    assert_eq!(OffsetsMode::from_step(-100), OffsetsMode::EliasFano);
    assert_eq!(OffsetsMode::from_step(1000), OffsetsMode::Budget(1000));
}

#[test]
fn test_required_memory() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let basename = dir.path().join("big");
    std::fs::write(
        basename.with_extension("properties"),
        "version=0\nnodes=1000000\narcs=10000000\nbitsperlink=8.0\nlength=80000000\n",
    )?;
    std::fs::write(basename.with_extension("graph"), vec![0u8; 1024])?;

    // dense offsets cost exactly 8 bytes per node
    let dense = required_memory(&basename, 1)?;
    assert_eq!(dense.offsets_bytes, 8_000_000);
    assert_eq!(dense.graph_bytes, 1024);

    // the Elias-Fano index matches its analytic size and is far smaller
    let compact = required_memory(&basename, 2)?;
    assert_eq!(
        compact.offsets_bytes,
        EliasFano::estimate_size_bytes(1_000_000, 80_000_000)
    );
    assert!(compact.offsets_bytes < dense.offsets_bytes / 4);

    // no offsets, graph on disk
    let metadata_only = required_memory(&basename, -1)?;
    assert_eq!(metadata_only.graph_bytes, 0);
    assert_eq!(metadata_only.offsets_bytes, 0);

    // byte budgets pick dense only when 8n fits
    assert_eq!(required_memory(&basename, 9_000_000)?.offsets_bytes, 8_000_000);
    assert_eq!(
        required_memory(&basename, 7_000_000)?.offsets_bytes,
        compact.offsets_bytes
    );
    Ok(())
}

#[test]
fn test_budget_mode_picks_a_working_index() -> Result<()> {
    // 4 nodes: 32 bytes of dense offsets
    let graph = BvGraph::with_basename("tests/data/toy")
        .offsets(OffsetsMode::Budget(32))
        .load()?;
    assert_eq!(graph.successors(0)?.collect::<Vec<_>>(), vec![1, 2]);

    let graph = BvGraph::with_basename("tests/data/toy")
        .offsets(OffsetsMode::Budget(31))
        .load()?;
    assert_eq!(graph.successors(0)?.collect::<Vec<_>>(), vec![1, 2]);
    Ok(())
}

#[test]
fn test_random_access_without_offsets() -> Result<()> {
    let graph = BvGraph::with_basename("tests/data/toy")
        .offsets(OffsetsMode::None)
        .load()?;
    assert!(matches!(graph.offset(0), Err(Error::RequiresOffsets)));
    assert!(matches!(graph.outdegree(0), Err(Error::RequiresOffsets)));
    assert!(matches!(graph.successors(0), Err(Error::RequiresOffsets)));
    Ok(())
}

#[test]
fn test_node_out_of_range() -> Result<()> {
    let graph = BvGraph::with_basename("tests/data/toy")
        .offsets(OffsetsMode::Dense)
        .load()?;
    assert!(matches!(
        graph.successors(4),
        Err(Error::NodeOutOfRange { node: 4, num_nodes: 4 })
    ));
    assert!(matches!(graph.outdegree(100), Err(Error::NodeOutOfRange { .. })));
    Ok(())
}

#[test]
fn test_missing_files() {
    let error = BvGraph::with_basename("tests/data/no-such-graph")
        .load()
        .unwrap_err();
    assert!(matches!(
        error.downcast_ref::<Error>(),
        Some(Error::Io(_))
    ));
}

#[test]
fn test_malformed_properties_kinds() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let basename = dir.path().join("bad");
    std::fs::write(basename.with_extension("graph"), [0u8])?;
    std::fs::write(basename.with_extension("offsets"), [0x80u8])?;

    for (content, check) in [
        (
            "nodes=1\narcs=0\nversion=2\n",
            &(|e: &Error| matches!(e, Error::UnsupportedVersion(_))) as &dyn Fn(&Error) -> bool,
        ),
        ("nodes=1\narcs=0\ncompressionflags=RESIDUALS_RICE\n", &|e| {
            matches!(e, Error::CompressionFlag(_))
        }),
        ("arcs=0\n", &|e| matches!(e, Error::PropertyFile(_))),
    ] {
        std::fs::write(basename.with_extension("properties"), content)?;
        let error = BvGraphSeq::with_basename(&basename).load().unwrap_err();
        let kind = error.downcast_ref::<Error>().expect("typed error");
        assert!(check(kind), "unexpected kind {:?} for {:?}", kind, content);
    }
    Ok(())
}

#[test]
fn test_unsupported_coding() {
    let cf = CompFlags {
        residuals: bvgraph::codes::Codes::Zeta { k: 9 },
        ..CompFlags::default()
    };
    let factory = MemoryFactory::from_data(vec![0u8; 8].into_boxed_slice());
    assert!(matches!(
        DynCodesDecoderFactory::new(factory, NodeOffsets::None, cf),
        Err(Error::UnsupportedCoding(_))
    ));
}

#[test]
fn test_empty_graph() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let basename = common::write_graph_files(
        dir.path(),
        "empty",
        &[],
        &[],
        "version=0\nnodes=0\narcs=0\nlength=0\ncompressionflags=\n",
    );

    let seq = BvGraphSeq::with_basename(&basename).mode::<LoadMem>().load()?;
    assert_eq!(seq.num_nodes(), 0);
    let mut nodes_iter = seq.iter();
    assert!(!nodes_iter.has_next());
    assert!(nodes_iter.next().is_none());

    let graph = BvGraph::with_basename(&basename)
        .mode::<LoadMem>()
        .offsets(OffsetsMode::EliasFano)
        .load()?;
    assert!(matches!(
        graph.successors(0),
        Err(Error::NodeOutOfRange { node: 0, num_nodes: 0 })
    ));
    Ok(())
}

#[test]
fn test_external_buffers() -> Result<()> {
    // the caller owns the graph bytes; the library only borrows them
    let graph_bytes = std::fs::read("tests/data/toy.graph")?;
    let offsets = read_offsets(
        std::path::Path::new("tests/data/toy.offsets"),
        4,
        bvgraph::codes::Codes::Gamma,
    )?;
    let factory = MemoryFactory::from_data(graph_bytes.as_slice());
    let decoder_factory =
        DynCodesDecoderFactory::new(factory, NodeOffsets::Dense(offsets), CompFlags {
            compression_window: 0,
            min_interval_length: 0,
            ..CompFlags::default()
        })?;
    let graph = BvGraph::new(decoder_factory, 4, 5, 0, 0, 3);
    assert_eq!(graph.successors(0)?.collect::<Vec<_>>(), vec![1, 2]);
    assert_eq!(graph.successors(3)?.collect::<Vec<_>>(), vec![0]);
    Ok(())
}
