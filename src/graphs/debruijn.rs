//! De Bruijn graph construction and approximate reduction
//!
//! Vertices are the distinct `(k-1)`-mers of a sequence, in order of first
//! occurrence. Edges connect consecutive windows and are kept with their
//! multiplicity unless [`DeBruijnGraph::dedup_edges`] is called.

use std::fmt::{Display, Formatter};

use ahash::AHashMap;
use rustc_hash::FxHashSet;
use tracing::{debug, info_span};

use crate::errors::{Result, VaralignError};
use crate::graphs::{LabelGraph, RawGraph};
use crate::io::dot::format_debruijn_as_dot;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeBruijnGraph {
    vertices: Vec<Vec<u8>>,
    edges: Vec<(usize, usize)>,

    /// Length of each vertex label, i.e., `k - 1`
    block_len: usize,
}

impl DeBruijnGraph {
    /// Build the de Bruijn graph of `seq` for k-mer size `k`
    ///
    /// A window of length `k - 1` is slid over the sequence. For `k <= 1`, or when
    /// the sequence is shorter than a single window, the graph is empty.
    pub fn build(seq: &[u8], k: usize) -> Self {
        if k <= 1 {
            return Self::default();
        }

        let span = info_span!("debruijn_build", k, seq_len = seq.len());
        let _enter = span.enter();

        let block_len = k - 1;
        let mut graph = Self { block_len, ..Self::default() };
        let mut kmer_ix: AHashMap<&[u8], usize> = AHashMap::new();

        let mut prev = None;
        for window in seq.windows(block_len) {
            let vertex = *kmer_ix.entry(window)
                .or_insert_with(|| {
                    graph.vertices.push(window.to_vec());
                    graph.vertices.len() - 1
                });

            if let Some(prev_vertex) = prev {
                graph.edges.push((prev_vertex, vertex));
            }

            prev = Some(vertex);
        }

        debug!(vertices = graph.vertices.len(), edges = graph.edges.len(), "built");

        graph
    }

    /// Build a single graph from multiple sequences
    ///
    /// Sequences are joined with a separator of `k` gap symbols, such that every
    /// window spanning two sequences contains a gap. These vertices are removed
    /// afterwards with [`Self::filter_gaps`].
    pub fn from_sequences<S>(seqs: &[S], k: usize, gap: u8) -> Self
    where
        S: AsRef<[u8]>,
    {
        let separator = vec![gap; k];
        let mut joined = Vec::with_capacity(seqs.iter().map(|s| s.as_ref().len() + k).sum());
        for seq in seqs {
            joined.extend_from_slice(seq.as_ref());
            joined.extend_from_slice(&separator);
        }

        Self::build(&joined, k).filter_gaps(gap)
    }

    pub fn vertices(&self) -> &[Vec<u8>] {
        &self.vertices
    }

    pub fn edges(&self) -> &[(usize, usize)] {
        &self.edges
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// The vertex label length `k - 1`, which is also the stride to use when
    /// aligning against the expanded graph.
    pub fn block_len(&self) -> usize {
        self.block_len
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Keep only vertices that are within Hamming distance
    /// `floor((k - 1) * threshold)` of at least one window of `seq`
    ///
    /// When `seq` is shorter than a single window, no vertex survives. Surviving
    /// vertices keep their relative order.
    pub fn filter(&self, seq: &[u8], threshold: f64) -> Result<Self> {
        if threshold.is_nan() || threshold < 0.0 {
            return Err(VaralignError::InvalidThreshold(threshold));
        }

        let span = info_span!("debruijn_filter", threshold, seq_len = seq.len());
        let _enter = span.enter();

        let max_dist = (self.block_len as f64 * threshold) as usize;

        let mut keep = Vec::with_capacity(self.vertices.len());
        for vertex in &self.vertices {
            let mut found = false;
            for window in seq.windows(self.block_len.max(1)) {
                if hamming(vertex, window)? <= max_dist {
                    found = true;
                    break;
                }
            }

            keep.push(found);
        }

        let filtered = self.retain(&keep);
        debug!(before = self.vertices.len(), after = filtered.vertices.len(), "filtered vertices");

        Ok(filtered)
    }

    /// Remove all vertices containing the gap symbol
    pub fn filter_gaps(&self, gap: u8) -> Self {
        let keep: Vec<bool> = self.vertices.iter()
            .map(|v| !v.contains(&gap))
            .collect();

        self.retain(&keep)
    }

    /// Collapse parallel edges, keeping the first occurrence of each
    pub fn dedup_edges(&mut self) {
        let mut seen = FxHashSet::default();
        self.edges.retain(|e| seen.insert(*e));
    }

    /// Expand the graph into a label graph with one node per character
    ///
    /// Vertex `i` becomes the chain of nodes `i*(k-1) .. (i+1)*(k-1)`. An edge
    /// `u -> v` becomes an edge between the last nodes of both chains.
    pub fn to_raw_graph(&self) -> RawGraph {
        let k = self.block_len;
        let mut labels = Vec::with_capacity(self.vertices.len() * k);
        let mut edges = Vec::with_capacity(self.vertices.len() * k.saturating_sub(1) + self.edges.len());

        for (i, vertex) in self.vertices.iter().enumerate() {
            let offset = i * k;
            labels.extend_from_slice(vertex);
            edges.extend((1..k).map(|j| (offset + j - 1, offset + j)));
        }

        edges.extend(self.edges.iter()
            .map(|(u, v)| (self.block_end(*u), self.block_end(*v))));

        RawGraph::new(labels, edges)
    }

    pub fn to_label_graph(&self) -> Result<LabelGraph> {
        LabelGraph::from_raw(self.to_raw_graph())
    }

    #[inline]
    fn block_end(&self, vertex: usize) -> usize {
        self.block_len * vertex + self.block_len - 1
    }

    fn retain(&self, keep: &[bool]) -> Self {
        let mut new_ix = vec![None; self.vertices.len()];
        let mut vertices = Vec::new();

        for (i, vertex) in self.vertices.iter().enumerate() {
            if keep[i] {
                new_ix[i] = Some(vertices.len());
                vertices.push(vertex.clone());
            }
        }

        let edges = self.edges.iter()
            .filter_map(|(u, v)| Some((new_ix[*u]?, new_ix[*v]?)))
            .collect();

        Self {
            vertices,
            edges,
            block_len: self.block_len,
        }
    }
}

impl Display for DeBruijnGraph {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        format_debruijn_as_dot(f, self)
    }
}

/// Number of positions at which `a` and `b` differ
pub fn hamming(a: &[u8], b: &[u8]) -> Result<usize> {
    if a.len() != b.len() {
        return Err(VaralignError::LengthMismatch { left: a.len(), right: b.len() });
    }

    Ok(a.iter().zip(b).filter(|(x, y)| x != y).count())
}

#[cfg(test)]
mod tests {
    use super::{hamming, DeBruijnGraph};
    use crate::errors::VaralignError;

    #[test]
    fn test_build() {
        let graph = DeBruijnGraph::build(b"ACGCGTCG", 3);

        let expected: Vec<Vec<u8>> = [b"AC", b"CG", b"GC", b"GT", b"TC"].iter()
            .map(|v| v.to_vec())
            .collect();
        assert_eq!(graph.vertices(), &expected);
        assert_eq!(graph.edges(), &[(0, 1), (1, 2), (2, 1), (1, 3), (3, 4), (4, 1)]);
        assert_eq!(graph.block_len(), 2);
    }

    #[test]
    fn test_build_degenerate() {
        assert!(DeBruijnGraph::build(b"ACGT", 1).is_empty());
        assert!(DeBruijnGraph::build(b"ACGT", 0).is_empty());
        assert!(DeBruijnGraph::build(b"AC", 5).is_empty());

        let single = DeBruijnGraph::build(b"ACG", 4);
        assert_eq!(single.vertex_count(), 1);
        assert_eq!(single.edge_count(), 0);
    }

    #[test]
    fn test_edge_multiplicity() {
        let mut graph = DeBruijnGraph::build(b"ACACAC", 3);
        assert_eq!(graph.vertex_count(), 2);
        assert_eq!(graph.edges(), &[(0, 1), (1, 0), (0, 1), (1, 0)]);

        graph.dedup_edges();
        assert_eq!(graph.edges(), &[(0, 1), (1, 0)]);
    }

    #[test]
    fn test_parse() {
        let graph = DeBruijnGraph::build(b"ACGCGTCG", 3);
        let raw = graph.to_raw_graph();

        assert_eq!(raw.labels.len(), 2 * graph.vertex_count());
        assert_eq!(raw.labels, b"ACCGGCGTTC".to_vec());

        // Chain links first, then the rewired de Bruijn edges
        assert_eq!(&raw.edges[..5], &[(0, 1), (2, 3), (4, 5), (6, 7), (8, 9)]);
        assert_eq!(&raw.edges[5..], &[(1, 3), (3, 5), (5, 3), (3, 7), (7, 9), (9, 3)]);

        let label_graph = graph.to_label_graph().unwrap();
        assert_eq!(label_graph.node_count(), 10);
    }

    #[test]
    fn test_filter() {
        let graph_seq = b"AAABCDEFGHIJKLMNOPQRSTUVWXYZ";
        let k = 5;
        let graph = DeBruijnGraph::build(graph_seq, k);

        let cases: [(&[u8], f64, usize); 4] = [
            (b"AAAAA", 0.25, 1),
            (b"ABCDEBBBBB", 0.0, 2),
            (b"AAAAAA", 0.0, 0),
            (b"111111", 1.0, graph_seq.len() - k + 2),
        ];

        for (seq, threshold, expected) in cases {
            let filtered = graph.filter(seq, threshold).unwrap();
            assert_eq!(filtered.vertex_count(), expected, "filter {:?} at {threshold}", std::str::from_utf8(seq));
        }
    }

    #[test]
    fn test_filter_reindexes_in_order() {
        let graph = DeBruijnGraph::build(b"AAABCDEFGHIJKLMNOPQRSTUVWXYZ", 5);
        let filtered = graph.filter(b"ABCDEBBBBB", 0.0).unwrap();

        assert_eq!(filtered.vertices(), &[b"ABCD".to_vec(), b"BCDE".to_vec()]);
        assert_eq!(filtered.edges(), &[(0, 1)]);
    }

    #[test]
    fn test_filter_short_sequence() {
        let graph = DeBruijnGraph::build(b"ACGTACGT", 5);
        let filtered = graph.filter(b"AC", 1.0).unwrap();

        assert!(filtered.is_empty());
        assert_eq!(filtered.edge_count(), 0);
    }

    #[test]
    fn test_filter_invalid_threshold() {
        let graph = DeBruijnGraph::build(b"ACGTACGT", 5);

        assert!(matches!(graph.filter(b"ACGT", -0.1), Err(VaralignError::InvalidThreshold(_))));
        assert!(matches!(graph.filter(b"ACGT", f64::NAN), Err(VaralignError::InvalidThreshold(_))));
    }

    #[test]
    fn test_filter_gaps() {
        let graph = DeBruijnGraph::build(b"ACG-TAC", 3);
        let filtered = graph.filter_gaps(b'-');

        assert_eq!(filtered.vertices(), &[b"AC".to_vec(), b"CG".to_vec(), b"TA".to_vec()]);
        assert_eq!(filtered.edges(), &[(0, 1), (2, 0)]);
    }

    #[test]
    fn test_from_sequences() {
        let graph = DeBruijnGraph::from_sequences(&[b"ACGT".as_slice(), b"GTTA".as_slice()], 3, b'-');

        assert!(graph.vertices().iter().all(|v| !v.contains(&b'-')));
        assert_eq!(graph.vertices(), &[
            b"AC".to_vec(), b"CG".to_vec(), b"GT".to_vec(), b"TT".to_vec(), b"TA".to_vec()
        ]);
        assert_eq!(graph.edges(), &[(0, 1), (1, 2), (2, 3), (3, 4)]);
    }

    #[test]
    fn test_hamming() {
        assert_eq!(hamming(b"ACGT", b"ACGT").unwrap(), 0);
        assert_eq!(hamming(b"ACGT", b"TCGA").unwrap(), 2);
        assert!(matches!(hamming(b"ACG", b"ACGT"), Err(VaralignError::LengthMismatch { left: 3, right: 4 })));
    }
}
