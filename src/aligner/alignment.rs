use itertools::Itertools;
use serde::Serialize;

use crate::aligner::lattice::LatticeShape;
use crate::errors::{Result, VaralignError};
use crate::graphs::{LabelGraph, GAP};

/// An aligned pair of residues. `rpos` is the graph node, `qpos` the query
/// sequence position.
///
/// In case of an insertion or deletion, one of the elements is `None`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct AlignedPair {
    /// Graph node id
    pub rpos: Option<usize>,

    /// Query sequence position
    pub qpos: Option<usize>
}

impl AlignedPair {
    pub fn new(rpos: Option<usize>, qpos: Option<usize>) -> Self {
        Self { rpos, qpos }
    }

    pub fn is_aligned(&self) -> bool {
        matches!((self.rpos, self.qpos), (Some(_), Some(_)))
    }

    pub fn is_indel(&self) -> bool {
        !self.is_aligned()
    }
}

pub type Alignment = Vec<AlignedPair>;

/// Convert a lattice path from source to destination into aligned pairs
///
/// Consecutive lattice nodes `(prev, cur)` are classified as follows: `cur` one
/// row below in the same column is a vertical move (query symbol against a
/// gap), unless the graph node has a self-loop, in which case the loop was
/// traversed and it is a diagonal move. `cur` in the same row is a horizontal
/// move (graph node against a gap). Everything else is a diagonal move. The
/// first node after the source always aligns the first query symbol.
pub fn backtrace(graph: &LabelGraph, seq: &[u8], path: &[usize]) -> Result<Alignment> {
    let shape = LatticeShape::new(graph.node_count(), seq.len());
    let n = shape.node_count();

    let inner = match path {
        [first, inner @ .., last] if *first == shape.src() && *last == shape.dst() => inner,
        _ => return Err(VaralignError::InvalidPath("path doesn't run from source to destination")),
    };

    let Some(&start) = inner.first() else {
        return Err(VaralignError::InvalidPath("path without lattice nodes"));
    };

    if inner.iter().any(|v| *v >= shape.src()) {
        return Err(VaralignError::InvalidPath("sentinel inside the path"));
    }

    if shape.row_of(start) != 0 {
        return Err(VaralignError::InvalidPath("path doesn't start in the first row"));
    }

    let mut alignment = Vec::with_capacity(inner.len());
    alignment.push(AlignedPair::new(Some(shape.col_of(start)), Some(0)));
    let mut qpos = 1;

    for (prev, cur) in inner.iter().copied().tuple_windows() {
        let col = shape.col_of(cur);

        if cur == prev + n && !graph.has_loop(col) {
            alignment.push(AlignedPair::new(None, Some(qpos)));
            qpos += 1;
        } else if shape.row_of(prev) == shape.row_of(cur) {
            alignment.push(AlignedPair::new(Some(col), None));
        } else {
            alignment.push(AlignedPair::new(Some(col), Some(qpos)));
            qpos += 1;
        }
    }

    if qpos != seq.len() {
        return Err(VaralignError::InvalidPath("path doesn't consume the whole query"));
    }

    Ok(alignment)
}

/// The reference and query rows of an alignment, with gaps as [`GAP`]
///
/// Labels and queries are ASCII, so both rows have the alignment's length in bytes.
pub fn aligned_strings(graph: &LabelGraph, seq: &[u8], aln: &[AlignedPair]) -> (String, String) {
    aln.iter()
        .map(|pair| {
            let reference = pair.rpos.map_or(GAP, |node| graph.label(node));
            let query = pair.qpos.map_or(GAP, |pos| seq[pos]);

            (char::from(reference), char::from(query))
        })
        .unzip()
}

/// Render an alignment as three lines: reference, match line, and query
pub fn print_alignment(graph: &LabelGraph, seq: &[u8], aln: &[AlignedPair]) -> String {
    let (reference, query) = aligned_strings(graph, seq, aln);

    let matches: String = aln.iter()
        .zip(reference.chars().zip(query.chars()))
        .map(|(pair, (r, q))| match (pair.is_aligned(), r == q) {
            (true, true) => '|',
            (true, false) => '*',
            (false, _) => ' ',
        })
        .collect();

    format!("{reference}\n{matches}\n{query}")
}
