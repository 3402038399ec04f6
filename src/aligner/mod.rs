pub mod alignment;
pub mod batch;
pub mod config;
pub mod lattice;
pub mod queue;
pub mod scoring;
pub mod search;

use serde::Serialize;
use tracing::{debug, info_span};

use crate::aligner::lattice::{AlignmentLattice, LatticeTraversal, StandardTraversal, StrideTraversal};
use crate::aligner::scoring::Scoring;
use crate::aligner::search::shortest_path;
use crate::errors::Result;
use crate::graphs::LabelGraph;

pub use alignment::{aligned_strings, backtrace, print_alignment, AlignedPair, Alignment};
pub use config::{AlignmentConfig, IntegerCostDial, LatticeStrategy, UnitCostDial};

/// Result of aligning a single query to a graph
#[derive(Debug, Clone, Serialize)]
pub struct AlignmentResult {
    /// Total cost of the alignment
    pub distance: u32,

    /// Lattice node ids from source to destination
    #[serde(skip)]
    pub path: Vec<usize>,

    pub alignment: Alignment,

    /// Reference side of the alignment, with gaps
    pub reference: String,

    /// Query side of the alignment, with gaps
    pub query: String,
}

/// Aligns query sequences to label graphs
///
/// The aligner holds no per-alignment state, so a single instance can be shared
/// between threads aligning different queries.
pub struct GraphAligner<C, S> {
    config: C,
    scoring: S,
    strategy: LatticeStrategy,
}

impl<C, S> GraphAligner<C, S>
where
    C: AlignmentConfig,
    S: Scoring,
{
    pub fn new(config: C, scoring: S) -> Self {
        Self::with_strategy(config, scoring, LatticeStrategy::Standard)
    }

    pub fn with_strategy(config: C, scoring: S, strategy: LatticeStrategy) -> Self {
        Self { config, scoring, strategy }
    }

    pub fn strategy(&self) -> LatticeStrategy {
        self.strategy
    }

    pub fn align<Seq>(&self, graph: &LabelGraph, seq: &Seq) -> Result<AlignmentResult>
    where
        Seq: AsRef<[u8]> + ?Sized,
    {
        self.align_u8(graph, seq.as_ref())
    }

    fn align_u8(&self, graph: &LabelGraph, seq: &[u8]) -> Result<AlignmentResult> {
        let span = info_span!("align", nodes = graph.node_count(), seq_len = seq.len());
        let _enter = span.enter();

        match self.strategy {
            LatticeStrategy::Standard => self.align_lattice(
                AlignmentLattice::new(graph, seq, &self.scoring, StandardTraversal)?
            ),
            LatticeStrategy::Stride(k) => self.align_lattice(
                AlignmentLattice::new(graph, seq, &self.scoring, StrideTraversal::new(k))?
            ),
        }
    }

    fn align_lattice<T>(&self, lattice: AlignmentLattice<'_, S, T>) -> Result<AlignmentResult>
    where
        T: LatticeTraversal,
    {
        debug!(order = lattice.order(), max_edge_cost = self.config.max_edge_cost(), "searching lattice");

        let shortest = shortest_path::<C::Queue, _, _>(&lattice)?;
        let alignment = backtrace(lattice.graph(), lattice.seq(), &shortest.path)?;
        let (reference, query) = aligned_strings(lattice.graph(), lattice.seq(), &alignment);

        debug!(distance = shortest.distance, aln_len = alignment.len(), "aligned");

        Ok(AlignmentResult {
            distance: shortest.distance,
            path: shortest.path,
            alignment,
            reference,
            query,
        })
    }
}
