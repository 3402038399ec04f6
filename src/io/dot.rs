//! Graphviz DOT rendering of label graphs and de Bruijn graphs

use std::fmt;

use petgraph::dot::{Config, Dot};
use petgraph::graph::DiGraph;

use crate::graphs::{DeBruijnGraph, LabelGraph};

/// Write a label graph as DOT. Self-loops are drawn, the lattice sentinels of
/// the normalized adjacency are not.
pub fn format_label_graph_as_dot(writer: &mut impl fmt::Write, graph: &LabelGraph) -> fmt::Result {
    let mut transformed = DiGraph::<String, &str>::with_capacity(graph.node_count(), graph.edge_count());
    let nodes: Vec<_> = (0..graph.node_count())
        .map(|node| transformed.add_node(format!("{:?} ({node})", char::from(graph.label(node)))))
        .collect();

    for node in 0..graph.node_count() {
        if graph.has_loop(node) {
            transformed.add_edge(nodes[node], nodes[node], "");
        }

        for &succ in graph.successors(node) {
            transformed.add_edge(nodes[node], nodes[succ], "");
        }
    }

    writeln!(writer, "{}", Dot::with_config(&transformed, &[Config::EdgeNoLabel]))
}

/// Write a de Bruijn graph as DOT, one DOT edge per edge occurrence
pub fn format_debruijn_as_dot(writer: &mut impl fmt::Write, graph: &DeBruijnGraph) -> fmt::Result {
    let mut transformed = DiGraph::<String, &str>::with_capacity(graph.vertex_count(), graph.edge_count());
    let nodes: Vec<_> = graph.vertices().iter()
        .enumerate()
        .map(|(ix, kmer)| transformed.add_node(format!("{} ({ix})", String::from_utf8_lossy(kmer))))
        .collect();

    for &(from, to) in graph.edges() {
        transformed.add_edge(nodes[from], nodes[to], "");
    }

    writeln!(writer, "{}", Dot::with_config(&transformed, &[Config::EdgeNoLabel]))
}
