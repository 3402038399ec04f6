//! The implicit alignment lattice
//!
//! The lattice is the product of the query positions and the reference graph
//! nodes. Lattice node `row * N + col` represents query position `row` aligned
//! through graph node `col`, with `N` the number of graph nodes. Two sentinel
//! nodes follow: the source `N * M` and the destination `N * M + 1`, with `M`
//! the query length.
//!
//! Nodes in rows `0..M-1` have three kinds of outgoing edges:
//!
//! - *horizontal*: along a graph edge in the same row, consuming a graph node
//!   but no query symbol (gap cost).
//! - *vertical*: to the same graph node in the next row, consuming a query
//!   symbol but no graph node (gap cost).
//! - *diagonal*: along a graph edge into the next row, consuming both
//!   (substitution cost).
//!
//! Which nodes the source connects to, and which nodes in the last row connect
//! to the destination, is decided by a [`LatticeTraversal`].

use crate::aligner::scoring::{gap_cost, Scoring, GAP_COST_SYMBOLS};
use crate::errors::{Result, VaralignError};
use crate::graphs::{LabelGraph, GAP};

/// Dimensions of the lattice and the conversion between ids and (row, column)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LatticeShape {
    node_count: usize,
    seq_len: usize,
}

impl LatticeShape {
    pub fn new(node_count: usize, seq_len: usize) -> Self {
        Self { node_count, seq_len }
    }

    #[inline(always)]
    pub fn node_count(&self) -> usize {
        self.node_count
    }

    #[inline(always)]
    pub fn seq_len(&self) -> usize {
        self.seq_len
    }

    #[inline(always)]
    pub fn node_id(&self, row: usize, col: usize) -> usize {
        row * self.node_count + col
    }

    #[inline(always)]
    pub fn row_of(&self, id: usize) -> usize {
        id / self.node_count
    }

    #[inline(always)]
    pub fn col_of(&self, id: usize) -> usize {
        id % self.node_count
    }

    #[inline(always)]
    pub fn src(&self) -> usize {
        self.node_count * self.seq_len
    }

    #[inline(always)]
    pub fn dst(&self) -> usize {
        self.node_count * self.seq_len + 1
    }

    /// Total number of lattice nodes, sentinels included
    #[inline(always)]
    pub fn order(&self) -> usize {
        self.node_count * self.seq_len + 2
    }

    /// Whether the node has horizontal, vertical and diagonal edges, i.e., it is
    /// not a sentinel and not in the last row.
    #[inline(always)]
    pub fn is_inner_row(&self, id: usize) -> bool {
        self.row_of(id) + 1 < self.seq_len
    }
}

/// Everything a traversal strategy needs to enumerate lattice edges
pub struct LatticeBase<'a, S> {
    graph: &'a LabelGraph,
    seq: &'a [u8],
    scoring: &'a S,
    shape: LatticeShape,
}

impl<'a, S> LatticeBase<'a, S>
where
    S: Scoring,
{
    #[inline(always)]
    pub fn graph(&self) -> &'a LabelGraph {
        self.graph
    }

    #[inline(always)]
    pub fn seq(&self) -> &'a [u8] {
        self.seq
    }

    #[inline(always)]
    pub fn shape(&self) -> LatticeShape {
        self.shape
    }

    #[inline(always)]
    pub fn gap_cost(&self) -> u8 {
        gap_cost(self.scoring)
    }

    /// Cost of aligning query position `row` to graph node `col`
    #[inline(always)]
    pub fn substitution_cost(&self, row: usize, col: usize) -> u8 {
        self.scoring.score(self.seq[row], self.graph.label(col))
    }

    /// Enumerate the outgoing edges of a node in rows `0..M-1`
    ///
    /// The normalized adjacency is `horizontals ++ [vertical] ++ diagonals`. A
    /// node with a self-loop doesn't get a vertical edge: moving to the same
    /// graph node in the next row means traversing the loop, so the vertical
    /// slot is charged as a diagonal move instead.
    pub fn visit_inner_row<F>(&self, v: usize, mut f: F) -> bool
    where
        F: FnMut(usize, u8) -> bool,
    {
        let n = self.shape.node_count();
        let col = self.shape.col_of(v);
        let row = self.shape.row_of(v);
        let offset = v - col;
        let vertical = col + n;

        let adjacency = self.graph.adjacency(col);
        let gap = self.gap_cost();

        let mut i = 0;
        while adjacency[i] != vertical {
            if f(adjacency[i] + offset, gap) {
                return true;
            }

            i += 1;
        }

        if !self.graph.has_loop(col) {
            if f(vertical + offset, gap) {
                return true;
            }

            i += 1;
        }

        for &w in &adjacency[i..] {
            let cost = self.substitution_cost(row + 1, w - n);
            if f(w + offset, cost) {
                return true;
            }
        }

        false
    }
}

/// Strategy deciding how the sentinels attach to the lattice
///
/// Visit functions call `f(neighbor, cost)` once per outgoing edge. When `f`
/// returns true enumeration stops early and the visit function returns true.
pub trait LatticeTraversal {
    /// Verify the strategy can be applied to the given graph
    fn check(&self, _graph: &LabelGraph) -> Result<()> {
        Ok(())
    }

    fn visit_from_src<S, F>(&self, base: &LatticeBase<'_, S>, f: F) -> bool
    where
        S: Scoring,
        F: FnMut(usize, u8) -> bool;

    fn visit_from_last_row<S, F>(&self, base: &LatticeBase<'_, S>, v: usize, f: F) -> bool
    where
        S: Scoring,
        F: FnMut(usize, u8) -> bool;
}

/// Alignment may start at any graph node and end at any graph node.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardTraversal;

impl LatticeTraversal for StandardTraversal {
    fn visit_from_src<S, F>(&self, base: &LatticeBase<'_, S>, mut f: F) -> bool
    where
        S: Scoring,
        F: FnMut(usize, u8) -> bool,
    {
        for col in 0..base.shape().node_count() {
            if f(col, base.substitution_cost(0, col)) {
                return true;
            }
        }

        false
    }

    fn visit_from_last_row<S, F>(&self, base: &LatticeBase<'_, S>, _: usize, mut f: F) -> bool
    where
        S: Scoring,
        F: FnMut(usize, u8) -> bool,
    {
        f(base.shape().dst(), 0)
    }
}

/// Traversal for graphs made of chains of `k` nodes, such as expanded de Bruijn
/// graphs
///
/// Alignments start at the first node of a chain and end at the last node of a
/// chain. Horizontal moves remain possible in the last row.
#[derive(Debug, Clone, Copy)]
pub struct StrideTraversal {
    k: usize,
}

impl StrideTraversal {
    pub fn new(k: usize) -> Self {
        Self { k }
    }

    pub fn k(&self) -> usize {
        self.k
    }
}

impl LatticeTraversal for StrideTraversal {
    fn check(&self, graph: &LabelGraph) -> Result<()> {
        if self.k == 0 || graph.node_count() % self.k != 0 {
            return Err(VaralignError::StrideMismatch { stride: self.k, node_count: graph.node_count() });
        }

        Ok(())
    }

    fn visit_from_src<S, F>(&self, base: &LatticeBase<'_, S>, mut f: F) -> bool
    where
        S: Scoring,
        F: FnMut(usize, u8) -> bool,
    {
        for col in (0..base.shape().node_count()).step_by(self.k) {
            if f(col, base.substitution_cost(0, col)) {
                return true;
            }
        }

        false
    }

    fn visit_from_last_row<S, F>(&self, base: &LatticeBase<'_, S>, v: usize, mut f: F) -> bool
    where
        S: Scoring,
        F: FnMut(usize, u8) -> bool,
    {
        let col = base.shape().col_of(v);
        let offset = v - col;
        let gap = base.gap_cost();

        for &w in base.graph().successors(col) {
            if f(w + offset, gap) {
                return true;
            }
        }

        if col % self.k == self.k - 1 {
            return f(base.shape().dst(), 0);
        }

        false
    }
}

/// The implicit product graph of a query and a label graph
pub struct AlignmentLattice<'a, S, T> {
    base: LatticeBase<'a, S>,
    traversal: T,
}

impl<'a, S, T> AlignmentLattice<'a, S, T>
where
    S: Scoring,
    T: LatticeTraversal,
{
    pub fn new(graph: &'a LabelGraph, seq: &'a [u8], scoring: &'a S, traversal: T) -> Result<Self> {
        if graph.is_empty() {
            return Err(VaralignError::EmptyGraph);
        }

        if seq.is_empty() {
            return Err(VaralignError::EmptyQuery);
        }

        if let Some((pos, &symbol)) = seq.iter().enumerate().find(|(_, c)| !c.is_ascii()) {
            return Err(VaralignError::NonAsciiQuery { pos, symbol });
        }

        traversal.check(graph)?;

        Ok(Self {
            base: LatticeBase {
                graph,
                seq,
                scoring,
                shape: LatticeShape::new(graph.node_count(), seq.len()),
            },
            traversal,
        })
    }

    #[inline(always)]
    pub fn shape(&self) -> LatticeShape {
        self.base.shape
    }

    pub fn graph(&self) -> &'a LabelGraph {
        self.base.graph
    }

    pub fn seq(&self) -> &'a [u8] {
        self.base.seq
    }

    pub fn scoring(&self) -> &'a S {
        self.base.scoring
    }

    pub fn src(&self) -> usize {
        self.base.shape.src()
    }

    pub fn dst(&self) -> usize {
        self.base.shape.dst()
    }

    pub fn order(&self) -> usize {
        self.base.shape.order()
    }

    /// The (query, label) symbol pair scored for the lattice edge `v -> w`
    ///
    /// Gap moves report the pair used for the gap cost.
    pub fn edge_symbols(&self, v: usize, w: usize) -> (u8, u8) {
        let shape = self.base.shape;

        if w == shape.dst() {
            return (GAP, GAP);
        }

        let label = self.base.graph.label(shape.col_of(w));
        if v == shape.src() {
            return (self.base.seq[0], label);
        }

        let vertical = w == v + shape.node_count() && !self.base.graph.has_loop(shape.col_of(w));
        if vertical || shape.row_of(v) == shape.row_of(w) {
            GAP_COST_SYMBOLS
        } else {
            (self.base.seq[shape.row_of(w)], label)
        }
    }

    /// Enumerate `(neighbor, cost)` pairs of lattice node `v`
    ///
    /// Returns true if `f` requested to stop early.
    pub fn visit<F>(&self, v: usize, f: F) -> bool
    where
        F: FnMut(usize, u8) -> bool,
    {
        let shape = self.base.shape;

        if !shape.is_inner_row(v) {
            if v == shape.dst() {
                return false;
            }

            if v == shape.src() {
                return self.traversal.visit_from_src(&self.base, f);
            }

            return self.traversal.visit_from_last_row(&self.base, v, f);
        }

        self.base.visit_inner_row(v, f)
    }
}

#[cfg(test)]
mod tests {
    use super::{AlignmentLattice, LatticeShape, StandardTraversal, StrideTraversal};
    use crate::aligner::scoring::{Scoring, UnitCost};
    use crate::errors::VaralignError;
    use crate::graphs::{DeBruijnGraph, LabelGraph, GAP};
    use crate::graphs::mock::create_linear_graph;

    fn collect_visits<S, T>(lattice: &AlignmentLattice<'_, S, T>, v: usize) -> Vec<(usize, u8)>
    where
        S: crate::aligner::scoring::Scoring,
        T: super::LatticeTraversal,
    {
        let mut visited = Vec::new();
        lattice.visit(v, |w, c| {
            visited.push((w, c));
            false
        });

        visited
    }

    /// Nodes with and without self-loop, with 0, 1 and 2 successors
    fn create_degree_graph() -> LabelGraph {
        let edges = [
            (1, 1),
            (2, 3),
            (3, 3), (3, 4),
            (4, 0), (4, 5),
            (5, 5), (5, 0), (5, 1),
        ];

        LabelGraph::new(b"ACGTAC".to_vec(), &edges).unwrap()
    }

    #[test]
    fn test_shape_conversions() {
        let shape = LatticeShape::new(4, 3);

        assert_eq!(shape.node_id(0, 0), 0);
        assert_eq!(shape.node_id(2, 3), 11);
        assert_eq!(shape.row_of(11), 2);
        assert_eq!(shape.col_of(11), 3);
        assert_eq!(shape.row_of(shape.node_id(1, 2)), 1);
        assert_eq!(shape.col_of(shape.node_id(1, 2)), 2);

        assert_eq!(shape.src(), 12);
        assert_eq!(shape.dst(), 13);
        assert_eq!(shape.order(), 14);

        assert!(shape.is_inner_row(7));
        assert!(!shape.is_inner_row(8));
        assert!(!shape.is_inner_row(shape.src()));
        assert!(!shape.is_inner_row(shape.dst()));
    }

    #[test]
    fn test_visit_without_loop() {
        let graph = create_degree_graph();
        let lattice = AlignmentLattice::new(&graph, b"AC", &UnitCost, StandardTraversal).unwrap();

        // No successors: only the vertical edge
        assert_eq!(collect_visits(&lattice, 0), vec![(6, 1)]);

        // One successor
        assert_eq!(collect_visits(&lattice, 2), vec![(3, 1), (8, 1), (9, 1)]);

        // Two successors, diagonal to 'C' matches query position 1
        assert_eq!(collect_visits(&lattice, 4), vec![(0, 1), (5, 1), (10, 1), (6, 1), (11, 0)]);
    }

    #[test]
    fn test_visit_with_loop() {
        let graph = create_degree_graph();
        let lattice = AlignmentLattice::new(&graph, b"AC", &UnitCost, StandardTraversal).unwrap();

        // No successors: the loop is the only way down, charged as a diagonal
        assert_eq!(collect_visits(&lattice, 1), vec![(7, 0)]);

        // One successor
        assert_eq!(collect_visits(&lattice, 3), vec![(4, 1), (9, 1), (10, 1)]);

        // Two successors
        assert_eq!(collect_visits(&lattice, 5), vec![(0, 1), (1, 1), (11, 0), (6, 1), (7, 0)]);

        // With or without loop, every inner node reaches its own column in the next row
        for v in 0..graph.node_count() {
            let visits = collect_visits(&lattice, v);
            assert_eq!(visits.len(), 2 * graph.out_degree(v) + 1);
            assert!(visits.iter().any(|(w, _)| *w == v + graph.node_count()));
        }
    }

    #[test]
    fn test_visit_row_offset() {
        let graph = create_degree_graph();
        let lattice = AlignmentLattice::new(&graph, b"ACG", &UnitCost, StandardTraversal).unwrap();
        let v = lattice.shape().node_id(1, 2);

        assert_eq!(v, 8);
        assert_eq!(collect_visits(&lattice, v), vec![(9, 1), (14, 1), (15, 1)]);

        // Looped 'C' at row 1, query position 2 is 'G'
        let v = lattice.shape().node_id(1, 1);
        assert_eq!(collect_visits(&lattice, v), vec![(13, 1)]);
    }

    #[test]
    fn test_visit_early_stop() {
        let graph = create_degree_graph();
        let lattice = AlignmentLattice::new(&graph, b"AC", &UnitCost, StandardTraversal).unwrap();

        let mut visited = Vec::new();
        let stopped = lattice.visit(4, |w, _| {
            visited.push(w);
            visited.len() == 2
        });

        assert!(stopped);
        assert_eq!(visited, vec![0, 5]);
    }

    #[test]
    fn test_standard_sentinels() {
        let graph = create_linear_graph();
        let lattice = AlignmentLattice::new(&graph, b"CG", &UnitCost, StandardTraversal).unwrap();

        assert_eq!(collect_visits(&lattice, lattice.src()), vec![(0, 1), (1, 0), (2, 1), (3, 1)]);

        // Last row connects to the destination only
        for col in 0..4 {
            assert_eq!(collect_visits(&lattice, 4 + col), vec![(lattice.dst(), 0)]);
        }

        assert!(collect_visits(&lattice, lattice.dst()).is_empty());
    }

    #[test]
    fn test_stride_sentinels() {
        let dbg = DeBruijnGraph::build(b"ACGTTGCA", 4);
        let graph = dbg.to_label_graph().unwrap();
        assert_eq!(graph.node_count(), 18);

        let lattice = AlignmentLattice::new(&graph, b"AC", &UnitCost, StrideTraversal::new(3)).unwrap();

        let from_src: Vec<_> = collect_visits(&lattice, lattice.src())
            .into_iter()
            .map(|(w, _)| w)
            .collect();
        assert_eq!(from_src, vec![0, 3, 6, 9, 12, 15]);

        // Inside a chain: only the chain edge, no way to the end
        let v = lattice.shape().node_id(1, 1);
        assert_eq!(collect_visits(&lattice, v), vec![(v + 1, 1)]);

        // Chain end of "ACG" links to the chain end of "CGT" and may finish
        let v = lattice.shape().node_id(1, 2);
        assert_eq!(collect_visits(&lattice, v), vec![(lattice.shape().node_id(1, 5), 1), (lattice.dst(), 0)]);
    }

    #[test]
    fn test_edge_symbols() {
        let graph = create_degree_graph();
        let lattice = AlignmentLattice::new(&graph, b"AC", &UnitCost, StandardTraversal).unwrap();

        assert_eq!(lattice.edge_symbols(lattice.src(), 2), (b'A', b'G'));
        assert_eq!(lattice.edge_symbols(4, 5), (b'A', b'-'));
        assert_eq!(lattice.edge_symbols(4, 10), (b'A', b'-'));
        assert_eq!(lattice.edge_symbols(4, 11), (b'C', b'C'));
        assert_eq!(lattice.edge_symbols(5, 11), (b'C', b'C'));
        assert_eq!(lattice.edge_symbols(11, lattice.dst()), (b'-', b'-'));
    }

    #[test]
    fn test_edge_symbols_score_to_edge_cost() {
        let scoring = |a: u8, b: u8| -> u8 {
            if a == b { 0 } else if a == GAP || b == GAP { 2 } else { 1 }
        };

        let graph = create_degree_graph();
        let lattice = AlignmentLattice::new(&graph, b"AGT", &scoring, StandardTraversal).unwrap();

        for v in 0..lattice.order() {
            for (w, cost) in collect_visits(&lattice, v) {
                let (query, label) = lattice.edge_symbols(v, w);
                assert_eq!(scoring.score(query, label), cost, "{v} -> {w}");
            }
        }
    }

    #[test]
    fn test_invalid_lattices() {
        let graph = create_linear_graph();

        assert!(matches!(
            AlignmentLattice::new(&graph, b"", &UnitCost, StandardTraversal),
            Err(VaralignError::EmptyQuery)
        ));

        let empty = LabelGraph::new(Vec::new(), &[]).unwrap();
        assert!(matches!(
            AlignmentLattice::new(&empty, b"ACGT", &UnitCost, StandardTraversal),
            Err(VaralignError::EmptyGraph)
        ));

        assert!(matches!(
            AlignmentLattice::new(&graph, b"AC\xf0T", &UnitCost, StandardTraversal),
            Err(VaralignError::NonAsciiQuery { pos: 2, symbol: 0xf0 })
        ));

        assert!(matches!(
            AlignmentLattice::new(&graph, b"ACGT", &UnitCost, StrideTraversal::new(3)),
            Err(VaralignError::StrideMismatch { stride: 3, node_count: 4 })
        ));
    }
}
