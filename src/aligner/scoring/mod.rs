pub mod unit_cost;

pub use unit_cost::UnitCost;

use std::cmp::Ordering;
use std::fmt::{Display, Formatter};
use std::ops::Add;

use itertools::Itertools;
use nonmax::NonMaxU32;

use crate::errors::{Result, VaralignError};
use crate::graphs::GAP;

/// The (query, label) pair whose score is the cost of a gap move
pub const GAP_COST_SYMBOLS: (u8, u8) = (b'A', GAP);

/// Cost of aligning a query symbol to a graph label
///
/// Either side may be the gap symbol [`GAP`]. Implementations must be pure,
/// the same pair always yields the same cost. Any `Fn(u8, u8) -> u8` closure
/// can be used as a scoring function.
pub trait Scoring {
    fn score(&self, query: u8, label: u8) -> u8;
}

/// The fixed cost of a horizontal or vertical move in the lattice
#[inline]
pub fn gap_cost<S: Scoring + ?Sized>(scoring: &S) -> u8 {
    let (query, label) = GAP_COST_SYMBOLS;
    scoring.score(query, label)
}

impl<F> Scoring for F
where
    F: Fn(u8, u8) -> u8,
{
    #[inline(always)]
    fn score(&self, query: u8, label: u8) -> u8 {
        self(query, label)
    }
}

/// Verify that every edge cost the lattice of `seq` and `labels` can produce is
/// at most `max`
///
/// Only symbols that actually occur are checked, together with the gap cost.
pub fn check_costs<S>(scoring: &S, seq: &[u8], labels: &[u8], max: u8) -> Result<()>
where
    S: Scoring,
{
    let gap = gap_cost(scoring);
    if gap > max {
        let (query, label) = GAP_COST_SYMBOLS;
        return Err(VaralignError::CostOutOfRange { query: query as char, label: label as char, cost: gap, max });
    }

    let label_symbols = labels.iter().copied().unique().collect_vec();
    for query in seq.iter().copied().unique() {
        for &label in &label_symbols {
            let cost = scoring.score(query, label);
            if cost > max {
                return Err(VaralignError::CostOutOfRange {
                    query: query as char,
                    label: label as char,
                    cost,
                    max,
                });
            }
        }
    }

    Ok(())
}

/// Distance of a lattice node from the source
#[derive(Copy, Clone, Default, Debug, PartialEq, Eq)]
pub enum Score {
    Score(NonMaxU32),  // Use non-max, such that the maximum value can be used for Unvisited

    #[default]
    Unvisited
}

impl Score {
    pub fn zero() -> Self {
        Self::Score(NonMaxU32::ZERO)
    }

    pub fn as_u32(&self) -> Option<u32> {
        match self {
            Self::Score(score) => Some(score.get()),
            Self::Unvisited => None,
        }
    }
}

impl PartialOrd for Score {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Score {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Score(score), Self::Score(other_score)) => score.cmp(other_score),
            (Self::Score(_), Self::Unvisited) => Ordering::Less,
            (Self::Unvisited, Self::Score(_)) => Ordering::Greater,
            (Self::Unvisited, Self::Unvisited) => Ordering::Equal,
        }
    }
}

impl Add<u8> for Score {
    type Output = Self;

    fn add(self, rhs: u8) -> Self::Output {
        match self {
            Self::Score(score) => Self::Score(NonMaxU32::new(score.get() + rhs as u32).unwrap()),
            Self::Unvisited => panic!("Can't add to Score::Unvisited!")
        }
    }
}

impl Display for Score {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Score(score) => Display::fmt(score, f),
            Self::Unvisited => Display::fmt("unvisited", f)
        }
    }
}
