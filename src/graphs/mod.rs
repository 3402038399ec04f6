pub mod label;
pub mod debruijn;

#[cfg(test)]
pub(crate) mod mock;

pub use debruijn::DeBruijnGraph;
pub use label::LabelGraph;

/// Symbol used for gaps in aligned sequences and to mark unresolved
/// regions in reference sequences.
pub const GAP: u8 = b'-';

/// Unnormalized graph input: one label per node (index = node id) and a
/// list of directed edges that may contain duplicates and self-loops.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawGraph {
    pub labels: Vec<u8>,
    pub edges: Vec<(usize, usize)>,
}

impl RawGraph {
    pub fn new(labels: Vec<u8>, edges: Vec<(usize, usize)>) -> Self {
        Self { labels, edges }
    }

    pub fn node_count(&self) -> usize {
        self.labels.len()
    }
}
