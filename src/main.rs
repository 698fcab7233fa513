/*
 * SPDX-FileCopyrightText: 2023 Inria
 * SPDX-FileCopyrightText: 2023 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

use anyhow::Result;
use bvgraph::prelude::*;
use clap::{Parser, Subcommand};
use dsi_progress_logger::prelude::*;
use lender::*;
use log::info;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "bvgraph", version)]
#[command(about = "Reads, prints, and benchmarks graphs in the BV format.", long_about = None)]
struct Cli {
    /// The basename of the graph (its .graph/.offsets/.properties files).
    basename: PathBuf,

    /// The offset policy: -1 no offsets and graph on disk, 0 no offsets,
    /// 1 dense offsets, 2 Elias-Fano index, < -1 Elias-Fano with graph on
    /// disk, > 2 a byte budget choosing between dense and Elias-Fano.
    #[arg(short = 's', long, default_value_t = 2)]
    offset_step: i64,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Access randomly chosen nodes and print their successors.
    Random {
        /// The number of nodes to sample.
        samples: usize,
    },
    /// Print the successors of the first and last few nodes.
    HeadTail,
    /// Print every node with its successors.
    All,
    /// Measure repeated sequential scans of the whole graph.
    Perform {
        /// The number of scans.
        repeats: usize,
    },
    /// Scan the graph sequentially, reporting arc and degree statistics.
    Iter,
}

/// Load a random-access graph honoring the offset step (negative steps keep
/// the graph on disk) and run the body on it.
macro_rules! with_random_graph {
    ($cli:expr, |$graph:ident| $body:expr) => {
        if $cli.offset_step < 0 {
            let $graph = &BvGraph::with_basename(&$cli.basename)
                .mode::<File>()
                .offset_step($cli.offset_step)
                .load()?;
            $body
        } else {
            let $graph = &BvGraph::with_basename(&$cli.basename)
                .offset_step($cli.offset_step)
                .load()?;
            $body
        }
    };
}

/// Load a sequential graph honoring the offset step and run the body on it.
macro_rules! with_seq_graph {
    ($cli:expr, |$graph:ident| $body:expr) => {
        if $cli.offset_step < 0 {
            let $graph = &BvGraphSeq::with_basename(&$cli.basename)
                .mode::<File>()
                .load()?;
            $body
        } else {
            let $graph = &BvGraphSeq::with_basename(&$cli.basename).load()?;
            $body
        }
    };
}

fn main() -> Result<()> {
    env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .try_init()?;
    let cli = Cli::parse();

    match cli.command {
        Command::Random { samples } => with_random_graph!(cli, |graph| random(graph, samples)),
        Command::HeadTail => with_random_graph!(cli, |graph| head_tail(graph)),
        Command::All => with_seq_graph!(cli, |graph| all(graph)),
        Command::Perform { repeats } => with_seq_graph!(cli, |graph| perform(graph, repeats)),
        Command::Iter => with_seq_graph!(cli, |graph| iter(graph)),
    }
}

fn print_node(node: usize, successors: impl Iterator<Item = usize>) {
    let list = successors
        .map(|successor| successor.to_string())
        .collect::<Vec<_>>()
        .join(" ");
    println!("{}\t{}", node, list);
}

fn random<F: RandomAccessDecoderFactory>(graph: &BvGraph<F>, samples: usize) -> Result<()> {
    let mut rng = SmallRng::seed_from_u64(0);
    for _ in 0..samples {
        let node = rng.random_range(0..graph.num_nodes());
        print_node(node, graph.successors(node)?);
    }
    Ok(())
}

fn head_tail<F: RandomAccessDecoderFactory>(graph: &BvGraph<F>) -> Result<()> {
    let num_nodes = graph.num_nodes();
    let head = num_nodes.min(5);
    for node in 0..head {
        print_node(node, graph.successors(node)?);
    }
    if num_nodes > head {
        println!("...");
    }
    for node in num_nodes.saturating_sub(5).max(head)..num_nodes {
        print_node(node, graph.successors(node)?);
    }
    Ok(())
}

fn all<F: SequentialDecoderFactory>(graph: &BvGraphSeq<F>) -> Result<()> {
    let mut nodes_iter = graph.iter();
    while let Some((node, successors)) = nodes_iter.next() {
        print_node(node, successors);
    }
    Ok(())
}

fn perform<F: SequentialDecoderFactory>(graph: &BvGraphSeq<F>, repeats: usize) -> Result<()> {
    for repeat in 0..repeats {
        let mut pl = ProgressLogger::default();
        pl.display_memory(true)
            .item_name("node")
            .expected_updates(Some(graph.num_nodes()));
        pl.start(format!("Scan {}...", repeat));
        let mut arcs = 0u64;
        let mut nodes_iter = graph.iter();
        while let Some((_, successors)) = nodes_iter.next() {
            arcs += successors.len() as u64;
            pl.light_update();
        }
        pl.done();
        info!("scan {}: {} arcs", repeat, arcs);
    }
    Ok(())
}

fn iter<F: SequentialDecoderFactory>(graph: &BvGraphSeq<F>) -> Result<()> {
    let mut arcs = 0u64;
    let mut dangling = 0u64;
    let mut self_loops = 0u64;
    let mut nodes_iter = graph.iter();
    while let Some((node, successors)) = nodes_iter.next() {
        let mut degree = 0u64;
        for successor in successors {
            degree += 1;
            if successor == node {
                self_loops += 1;
            }
        }
        arcs += degree;
        dangling += (degree == 0) as u64;
    }
    println!("nodes\t{}", graph.num_nodes());
    println!("arcs\t{}", arcs);
    println!("dangling\t{}", dangling);
    println!("self-loops\t{}", self_loops);
    Ok(())
}
