use crate::aligner::scoring::Scoring;

/// Edit distance costs: 0 for identical symbols, 1 for a mismatch or a gap
///
/// This is the scoring function the two-bucket queue is built for.
#[derive(Copy, Clone, Debug, Default)]
pub struct UnitCost;

impl Scoring for UnitCost {
    #[inline]
    fn score(&self, query: u8, label: u8) -> u8 {
        u8::from(query != label)
    }
}

#[cfg(test)]
mod tests {
    use super::UnitCost;
    use crate::aligner::scoring::{gap_cost, Scoring};
    use crate::graphs::GAP;

    #[test]
    fn test_unit_cost() {
        assert_eq!(UnitCost.score(b'A', b'A'), 0);
        assert_eq!(UnitCost.score(b'A', b'T'), 1);
        assert_eq!(UnitCost.score(b'A', GAP), 1);
        assert_eq!(UnitCost.score(GAP, b'C'), 1);
        assert_eq!(gap_cost(&UnitCost), 1);
    }
}
