//! End-to-end checks on the tiny hand-encoded graphs under `tests/data/`.

use anyhow::Result;
use bvgraph::prelude::*;
use lender::*;

const TOY_ARCS: [&[usize]; 4] = [&[1, 2], &[2], &[3], &[0]];

#[test]
fn test_toy_sequential() -> Result<()> {
    let graph = BvGraphSeq::with_basename("tests/data/toy").load()?;
    assert_eq!(graph.num_nodes(), 4);
    assert_eq!(graph.num_arcs_hint(), Some(5));

    let mut nodes_iter = graph.iter();
    assert!(nodes_iter.has_next());
    let mut seen_nodes = 0;
    while let Some((node, successors)) = nodes_iter.next() {
        assert_eq!(successors.collect::<Vec<_>>(), TOY_ARCS[node]);
        seen_nodes += 1;
    }
    assert_eq!(seen_nodes, 4);
    Ok(())
}

#[test]
fn test_toy_random_access_dense() -> Result<()> {
    let graph = BvGraph::with_basename("tests/data/toy")
        .offsets(OffsetsMode::Dense)
        .load()?;
    assert_eq!(graph.num_nodes(), 4);
    assert_eq!(graph.num_arcs(), 5);

    // known bit offsets of the four nodes
    for (node, expected) in [0u64, 10, 17, 24].into_iter().enumerate() {
        assert_eq!(graph.offset(node)?, expected);
    }

    for (node, expected) in TOY_ARCS.into_iter().enumerate() {
        assert_eq!(graph.outdegree(node)?, expected.len());
        assert_eq!(graph.successors(node)?.collect::<Vec<_>>(), expected);
    }
    Ok(())
}

#[test]
fn test_toy_random_access_elias_fano() -> Result<()> {
    let graph = BvGraph::with_basename("tests/data/toy")
        .offsets(OffsetsMode::EliasFano)
        .load()?;
    for (node, expected) in [0u64, 10, 17, 24].into_iter().enumerate() {
        assert_eq!(graph.offset(node)?, expected);
    }
    for (node, expected) in TOY_ARCS.into_iter().enumerate() {
        assert_eq!(graph.successors(node)?.collect::<Vec<_>>(), expected);
    }
    Ok(())
}

#[test]
fn test_toy_graph_on_disk() -> Result<()> {
    // offset_step -2: the graph stays on disk, offsets go to Elias-Fano
    let graph = BvGraph::with_basename("tests/data/toy")
        .mode::<File>()
        .offset_step(-2)
        .load()?;
    for (node, expected) in TOY_ARCS.into_iter().enumerate() {
        assert_eq!(graph.successors(node)?.collect::<Vec<_>>(), expected);
    }

    let seq = BvGraphSeq::with_basename("tests/data/toy")
        .mode::<File>()
        .load()?;
    let mut nodes_iter = seq.iter();
    while let Some((node, successors)) = nodes_iter.next() {
        assert_eq!(successors.collect::<Vec<_>>(), TOY_ARCS[node]);
    }
    Ok(())
}

#[test]
fn test_toy_load_mem() -> Result<()> {
    let graph = BvGraph::with_basename("tests/data/toy")
        .mode::<LoadMem>()
        .offsets(OffsetsMode::Dense)
        .load()?;
    for (node, expected) in TOY_ARCS.into_iter().enumerate() {
        assert_eq!(graph.successors(node)?.collect::<Vec<_>>(), expected);
    }
    Ok(())
}

#[test]
fn test_toy_offset_deg_iter() -> Result<()> {
    let graph = BvGraph::with_basename("tests/data/toy")
        .offsets(OffsetsMode::Dense)
        .load()?;
    let mut degrees = Vec::new();
    for (offset, degree) in graph.offset_deg_iter() {
        degrees.push((offset, degree));
    }
    assert_eq!(degrees, vec![(0, 2), (10, 1), (17, 1), (24, 1)]);
    Ok(())
}

#[test]
fn test_toy_statistics() -> Result<()> {
    let graph = BvGraphSeq::with_basename("tests/data/toy").load()?;
    let mut arcs = 0u64;
    let mut dangling = 0;
    let mut self_loops = 0;
    let mut nodes_iter = graph.iter();
    while let Some((node, successors)) = nodes_iter.next() {
        let mut degree = 0u64;
        for successor in successors {
            degree += 1;
            self_loops += (successor == node) as u32;
        }
        arcs += degree;
        dangling += (degree == 0) as u32;
    }
    assert_eq!(arcs, 5);
    assert_eq!(dangling, 0);
    assert_eq!(self_loops, 0);
    Ok(())
}

#[test]
fn test_self_loop_graph() -> Result<()> {
    let graph = BvGraph::with_basename("tests/data/loop1")
        .offsets(OffsetsMode::Dense)
        .load()?;
    assert_eq!(graph.num_nodes(), 1);
    assert_eq!(graph.num_arcs(), 1);
    assert_eq!(graph.outdegree(0)?, 1);
    assert_eq!(graph.successors(0)?.collect::<Vec<_>>(), vec![0]);

    let seq = BvGraphSeq::with_basename("tests/data/loop1").load()?;
    let mut nodes_iter = seq.iter();
    let (node, successors) = nodes_iter.next().unwrap();
    assert_eq!(node, 0);
    assert_eq!(successors.collect::<Vec<_>>(), vec![0]);
    assert!(nodes_iter.next().is_none());
    Ok(())
}
