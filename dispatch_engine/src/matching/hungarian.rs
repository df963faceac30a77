use pathfinding::kuhn_munkres::{kuhn_munkres_min, Weights};

use super::cost::{CostMatrix, UNREACHABLE_COST};
use super::strategy::{AssignmentStrategy, Pairing};

/// The square table fed to the Kuhn-Munkres solver. The smaller dimension is padded out with the
/// unreachable sentinel; a pairing that lands on a padding cell is an artifact, not a match.
struct PaddedCosts {
    size: usize,
    costs: Vec<i64>,
}

impl PaddedCosts {
    fn new(matrix: &CostMatrix) -> Self {
        let size = matrix.rides().max(matrix.chairs());
        let mut costs = vec![UNREACHABLE_COST; size * size];
        for ride in 0..matrix.rides() {
            for chair in 0..matrix.chairs() {
                costs[ride * size + chair] = matrix.cost(ride, chair);
            }
        }
        Self { size, costs }
    }
}

impl Weights<i64> for PaddedCosts {
    fn rows(&self) -> usize {
        self.size
    }

    fn columns(&self) -> usize {
        self.size
    }

    fn at(&self, row: usize, col: usize) -> i64 {
        self.costs[row * self.size + col]
    }

    fn neg(&self) -> Self {
        Self { size: self.size, costs: self.costs.iter().map(|&c| c.saturating_neg()).collect() }
    }
}

/// Globally optimal assignment: minimum-total-cost perfect matching over the padded square
/// matrix via the Kuhn-Munkres (Hungarian) algorithm.
///
/// Cubic in the larger of the two dimensions. That is fine for the pending-set sizes one matching
/// tick sees in practice, and is the price of the global optimum; the greedy strategy is the
/// escape hatch when it is not.
#[derive(Debug, Default)]
pub struct OptimalAssignment;

impl AssignmentStrategy for OptimalAssignment {
    fn solve(&self, costs: &CostMatrix) -> Vec<Pairing> {
        if costs.is_empty() {
            return Vec::new();
        }
        let padded = PaddedCosts::new(costs);
        let (_total, assignment) = kuhn_munkres_min(&padded);
        assignment
            .iter()
            .enumerate()
            .filter(|&(ride, &chair)| ride < costs.rides() && chair < costs.chairs())
            .filter(|&(ride, &chair)| costs.cost(ride, chair) < UNREACHABLE_COST)
            .map(|(ride, &chair)| Pairing { ride, chair, cost: costs.cost(ride, chair) })
            .collect()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::matching::greedy::GreedyNearest;

    fn total(pairings: &[Pairing]) -> i64 {
        pairings.iter().map(|p| p.cost).sum()
    }

    /// Exhaustive minimum over every valid pairing of `min(rides, chairs)` pairs.
    fn brute_force_minimum(matrix: &CostMatrix) -> i64 {
        fn recurse(matrix: &CostMatrix, ride: usize, taken: &mut Vec<bool>) -> i64 {
            if ride == matrix.rides() {
                return 0;
            }
            let mut best = i64::MAX;
            // Leaving this ride unmatched is only valid when chairs run out.
            let free_chairs = taken.iter().filter(|t| !**t).count();
            if matrix.rides() - ride > free_chairs {
                best = recurse(matrix, ride + 1, taken);
            }
            for chair in 0..matrix.chairs() {
                if taken[chair] {
                    continue;
                }
                taken[chair] = true;
                let rest = recurse(matrix, ride + 1, taken);
                taken[chair] = false;
                if rest != i64::MAX {
                    best = best.min(matrix.cost(ride, chair) + rest);
                }
            }
            best
        }
        recurse(matrix, 0, &mut vec![false; matrix.chairs()])
    }

    #[test]
    fn square_matrix_reaches_the_exhaustive_minimum() {
        let matrix = CostMatrix::from_costs(3, 3, vec![4, 1, 3, 2, 0, 5, 3, 2, 2]);
        let pairings = OptimalAssignment.solve(&matrix);
        assert_eq!(pairings.len(), 3);
        assert_eq!(total(&pairings), brute_force_minimum(&matrix));
        assert_eq!(total(&pairings), 5);
    }

    #[test]
    fn beats_greedy_when_greedy_is_myopic() {
        // Greedy gives ride 0 the cost-1 chair and leaves ride 1 with cost 100.
        let matrix = CostMatrix::from_costs(2, 2, vec![1, 2, 1, 100]);
        let greedy = GreedyNearest.solve(&matrix);
        let optimal = OptimalAssignment.solve(&matrix);
        assert_eq!(total(&greedy), 101);
        assert_eq!(total(&optimal), 3);
    }

    #[test]
    fn never_worse_than_greedy() {
        let matrices = [
            CostMatrix::from_costs(2, 2, vec![2, 3, 18, 0]),
            CostMatrix::from_costs(3, 3, vec![7, 7, 7, 1, 2, 3, 3, 2, 1]),
            CostMatrix::from_costs(2, 3, vec![5, 1, 9, 4, 2, 8]),
        ];
        for matrix in &matrices {
            let greedy = GreedyNearest.solve(matrix);
            let optimal = OptimalAssignment.solve(matrix);
            assert!(total(&optimal) <= total(&greedy));
        }
    }

    #[test]
    fn more_rides_than_chairs_leaves_the_excess_unmatched() {
        let matrix = CostMatrix::from_costs(3, 2, vec![2, 3, 18, 0, 4, 3]);
        let pairings = OptimalAssignment.solve(&matrix);
        assert_eq!(pairings.len(), 2);
        let mut rides: Vec<_> = pairings.iter().map(|p| p.ride).collect();
        rides.sort_unstable();
        assert_eq!(rides, vec![0, 1]);
        assert_eq!(total(&pairings), 2);
    }

    #[test]
    fn more_chairs_than_rides_uses_the_cheap_ones() {
        let matrix = CostMatrix::from_costs(2, 3, vec![9, 1, 5, 8, 7, 2]);
        let pairings = OptimalAssignment.solve(&matrix);
        assert_eq!(pairings.len(), 2);
        assert_eq!(total(&pairings), 3);
        let chairs: Vec<_> = pairings.iter().map(|p| p.chair).collect();
        assert!(chairs.contains(&1) && chairs.contains(&2));
    }

    #[test]
    fn unreachable_pairs_are_never_emitted() {
        let matrix = CostMatrix::from_costs(2, 2, vec![1, UNREACHABLE_COST, UNREACHABLE_COST, UNREACHABLE_COST]);
        let pairings = OptimalAssignment.solve(&matrix);
        assert_eq!(pairings, vec![Pairing { ride: 0, chair: 0, cost: 1 }]);
    }

    #[test]
    fn empty_matrix_solves_to_nothing() {
        let matrix = CostMatrix::from_costs(0, 3, vec![]);
        assert!(OptimalAssignment.solve(&matrix).is_empty());
    }
}
