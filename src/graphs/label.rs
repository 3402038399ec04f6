//! Normalized reference graph with single character node labels.
//!
//! The adjacency of each node is stored in the order the alignment lattice
//! consumes it: `horizontal targets ++ [vertical sentinel] ++ diagonal targets`.
//! The vertical sentinel of node `i` is `i + N` and the diagonal targets are the
//! horizontal targets shifted by `N`, where `N` is the number of nodes. Shifting
//! an entry by a row offset `r * N` thus directly yields a lattice node id.

use std::fmt::{Display, Formatter};

use rustc_hash::FxHashSet;
use smallvec::SmallVec;

use crate::errors::{Result, VaralignError};
use crate::graphs::RawGraph;
use crate::io::dot::format_label_graph_as_dot;

/// Most nodes in variant graphs have one or two successors.
pub(crate) type Adjacency = SmallVec<[usize; 5]>;

#[derive(Debug, Clone, Default)]
pub struct LabelGraph {
    labels: Vec<u8>,
    edges: Vec<Adjacency>,
    loops: Vec<bool>,
}

impl LabelGraph {
    /// Build a normalized graph from node labels and a raw edge list
    ///
    /// Duplicate edges are removed, self-loops are recorded separately and
    /// excluded from the adjacency lists. Edge endpoints outside `[0, N)` and
    /// non-ASCII labels are rejected.
    pub fn new(labels: Vec<u8>, raw_edges: &[(usize, usize)]) -> Result<Self> {
        let node_count = labels.len();

        if let Some((node, &symbol)) = labels.iter().enumerate().find(|(_, l)| !l.is_ascii()) {
            return Err(VaralignError::NonAsciiLabel { node, symbol });
        }

        if let Some(&(from, to)) = raw_edges.iter()
            .find(|(from, to)| *from >= node_count || *to >= node_count)
        {
            return Err(VaralignError::EdgeOutOfRange { from, to, node_count });
        }

        let (edges, loops) = normalize_edges(raw_edges, node_count);

        Ok(Self { labels, edges, loops })
    }

    pub fn from_raw(raw: RawGraph) -> Result<Self> {
        Self::new(raw.labels, &raw.edges)
    }

    #[inline]
    pub fn node_count(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Number of distinct edges between different nodes
    pub fn edge_count(&self) -> usize {
        self.edges.iter()
            .map(|adj| adj.len() / 2)
            .sum()
    }

    pub fn loop_count(&self) -> usize {
        self.loops.iter().filter(|l| **l).count()
    }

    #[inline]
    pub fn label(&self, node: usize) -> u8 {
        self.labels[node]
    }

    pub fn labels(&self) -> &[u8] {
        &self.labels
    }

    /// Full normalized adjacency: horizontals, vertical sentinel, diagonals.
    #[inline]
    pub fn adjacency(&self, node: usize) -> &[usize] {
        &self.edges[node]
    }

    #[inline]
    pub fn has_loop(&self, node: usize) -> bool {
        self.loops[node]
    }

    #[inline]
    pub fn out_degree(&self, node: usize) -> usize {
        self.edges[node].len() / 2
    }

    /// Successors of a node in the reference graph, self-loops excluded.
    #[inline]
    pub fn successors(&self, node: usize) -> &[usize] {
        &self.edges[node][..self.out_degree(node)]
    }

    pub fn in_degrees(&self) -> Vec<usize> {
        let mut in_deg = vec![0; self.node_count()];
        for node in 0..self.node_count() {
            for succ in self.successors(node) {
                in_deg[*succ] += 1;
            }
        }

        in_deg
    }
}

impl Display for LabelGraph {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        format_label_graph_as_dot(f, self)
    }
}

/// Deduplicate edges keeping the first occurrence, so the resulting
/// adjacency order only depends on the input order.
fn dedup_edges(raw_edges: &[(usize, usize)]) -> Vec<(usize, usize)> {
    let mut seen = FxHashSet::default();

    raw_edges.iter()
        .filter(|e| seen.insert(**e))
        .copied()
        .collect()
}

fn normalize_edges(raw_edges: &[(usize, usize)], node_count: usize) -> (Vec<Adjacency>, Vec<bool>) {
    let unique = dedup_edges(raw_edges);

    let mut out_edges = vec![0usize; node_count];
    let mut loops = vec![false; node_count];
    for &(from, to) in &unique {
        if from == to {
            loops[from] = true;
        } else {
            out_edges[from] += 1;
        }
    }

    let mut edges: Vec<Adjacency> = out_edges.iter()
        .map(|out| Adjacency::with_capacity(2 * out + 1))
        .collect();

    for &(from, to) in &unique {
        if from != to {
            edges[from].push(to);
        }
    }

    for (node, adj) in edges.iter_mut().enumerate() {
        let num_horizontal = adj.len();
        adj.push(node + node_count);

        for i in 0..num_horizontal {
            let diagonal = adj[i] + node_count;
            adj.push(diagonal);
        }
    }

    (edges, loops)
}

#[cfg(test)]
mod tests {
    use super::LabelGraph;
    use crate::errors::VaralignError;

    #[test]
    fn test_normalized_adjacency() {
        let graph = LabelGraph::new(b"ACGT".to_vec(), &[(0, 1), (0, 2), (1, 3), (2, 3)]).unwrap();

        assert_eq!(graph.adjacency(0), &[1, 2, 4, 5, 6]);
        assert_eq!(graph.adjacency(1), &[3, 5, 7]);
        assert_eq!(graph.adjacency(2), &[3, 6, 7]);
        assert_eq!(graph.adjacency(3), &[7]);
        assert_eq!(graph.edge_count(), 4);
        assert_eq!(graph.successors(0), &[1, 2]);
        assert_eq!(graph.in_degrees(), vec![0, 1, 1, 2]);
    }

    #[test]
    fn test_duplicates_and_loops() {
        let edges = [(0, 1), (0, 1), (1, 1), (1, 2), (1, 1), (2, 0), (1, 2)];
        let graph = LabelGraph::new(b"AAC".to_vec(), &edges).unwrap();

        assert!(!graph.has_loop(0));
        assert!(graph.has_loop(1));
        assert!(!graph.has_loop(2));
        assert_eq!(graph.loop_count(), 1);

        assert_eq!(graph.adjacency(1), &[2, 4, 5]);
        assert!(!graph.adjacency(1).contains(&1));

        for node in 0..graph.node_count() {
            let out_degree = graph.successors(node).len();
            assert_eq!(graph.adjacency(node).len(), 2 * out_degree + 1);
        }
    }

    #[test]
    fn test_edge_out_of_range() {
        let result = LabelGraph::new(b"AC".to_vec(), &[(0, 1), (1, 2)]);
        assert!(matches!(result, Err(VaralignError::EdgeOutOfRange { from: 1, to: 2, node_count: 2 })));
    }

    #[test]
    fn test_non_ascii_label() {
        let result = LabelGraph::new(vec![b'A', 0xc3, b'T'], &[(0, 1), (1, 2)]);
        assert!(matches!(result, Err(VaralignError::NonAsciiLabel { node: 1, symbol: 0xc3 })));
    }

    #[test]
    fn test_no_edges() {
        let graph = LabelGraph::new(b"G".to_vec(), &[]).unwrap();
        assert_eq!(graph.adjacency(0), &[1]);
        assert_eq!(graph.out_degree(0), 0);
        assert_eq!(graph.edge_count(), 0);
    }
}
