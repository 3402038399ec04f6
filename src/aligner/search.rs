//! Shortest path search through the alignment lattice
//!
//! Dijkstra's algorithm with a monotone bucket queue. With unit costs this
//! reduces to a 0-1 BFS over the two-bucket [`BucketQueue`](crate::aligner::queue::BucketQueue).

use std::any::type_name;

use nonmax::NonMaxUsize;
use tracing::{debug, debug_span};

use crate::aligner::lattice::{AlignmentLattice, LatticeTraversal};
use crate::aligner::queue::PathQueue;
use crate::aligner::scoring::{check_costs, Score, Scoring};
use crate::errors::{Result, VaralignError};

/// A minimum cost path from the lattice source to the lattice destination,
/// sentinels included.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShortestPath {
    pub path: Vec<usize>,
    pub distance: u32,
}

/// Find a minimum cost path from the source to the destination of `lattice`
///
/// Fails with [`VaralignError::CostOutOfRange`] when the scoring function
/// produces costs the queue `Q` can't hold, and with
/// [`VaralignError::Unreachable`] when the destination can't be reached.
pub fn shortest_path<Q, S, T>(lattice: &AlignmentLattice<'_, S, T>) -> Result<ShortestPath>
where
    Q: PathQueue,
    S: Scoring,
    T: LatticeTraversal,
{
    check_costs(lattice.scoring(), lattice.seq(), lattice.graph().labels(), Q::MAX_EDGE_COST)?;

    let order = lattice.order();
    let src = lattice.src();
    let dst = lattice.dst();

    let span = debug_span!("shortest_path", order, queue = type_name::<Q>());
    let _enter = span.enter();

    let mut dist = vec![Score::Unvisited; order];
    let mut parent: Vec<Option<NonMaxUsize>> = vec![None; order];
    let mut queue = Q::with_order(order);

    dist[src] = Score::zero();
    queue.push(src, 0);

    let mut expanded = 0usize;
    while let Some(v) = queue.pop() {
        if v == dst {
            let distance = dist[dst].as_u32().ok_or(VaralignError::Unreachable)?;
            debug!(distance, expanded, "reached destination");

            return Ok(ShortestPath { path: trace_parents(&parent, src, dst)?, distance });
        }

        expanded += 1;
        let base = dist[v];
        let mut expensive_edge = None;

        lattice.visit(v, |w, cost| {
            if cost > Q::MAX_EDGE_COST {
                expensive_edge = Some((w, cost));
                return true;
            }

            let new_score = base + cost;
            let new_cost = new_score.as_u32().unwrap_or(u32::MAX);

            let current = dist[w];
            match current {
                Score::Unvisited => {
                    dist[w] = new_score;
                    parent[w] = NonMaxUsize::new(v);
                    queue.push(w, new_cost);
                },
                _ if new_score < current => {
                    dist[w] = new_score;
                    parent[w] = NonMaxUsize::new(v);
                    queue.fix(w, new_cost);
                },
                _ => (),
            }

            false
        });

        if let Some((w, cost)) = expensive_edge {
            let (query, label) = lattice.edge_symbols(v, w);
            return Err(VaralignError::CostOutOfRange {
                query: char::from(query),
                label: char::from(label),
                cost,
                max: Q::MAX_EDGE_COST,
            });
        }
    }

    debug!(expanded, "destination unreachable");
    Err(VaralignError::Unreachable)
}

fn trace_parents(parent: &[Option<NonMaxUsize>], src: usize, dst: usize) -> Result<Vec<usize>> {
    let mut path = vec![dst];
    let mut curr = dst;

    while curr != src {
        curr = parent[curr]
            .ok_or(VaralignError::InvalidPath("parent chain doesn't reach the source"))?
            .get();
        path.push(curr);
    }

    path.reverse();
    Ok(path)
}
