use crate::aligner::queue::{BucketQueue, LayeredQueue, PathQueue};

/// Selects the priority queue driving the shortest path search
pub trait AlignmentConfig {
    type Queue: PathQueue;

    /// Largest single edge cost the search accepts with this configuration
    fn max_edge_cost(&self) -> u8 {
        <Self::Queue as PathQueue>::MAX_EDGE_COST
    }
}

/// 0-1 BFS with the two-bucket queue. Edge costs must be 0 or 1.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnitCostDial;

impl AlignmentConfig for UnitCostDial {
    type Queue = BucketQueue;
}

/// Dial's algorithm with one layer per distance, for any `u8` edge cost
#[derive(Debug, Clone, Copy, Default)]
pub struct IntegerCostDial;

impl AlignmentConfig for IntegerCostDial {
    type Queue = LayeredQueue;
}

/// How the lattice source and destination attach to the graph
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LatticeStrategy {
    /// Start and end at any node
    #[default]
    Standard,

    /// Start at nodes `0, k, 2k, ...` and end at nodes `k-1, 2k-1, ...`, for
    /// graphs expanded from de Bruijn graphs with block length `k`
    Stride(usize),
}
