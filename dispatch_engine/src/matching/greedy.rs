use super::cost::{CostMatrix, UNREACHABLE_COST};
use super::strategy::{AssignmentStrategy, Pairing};

/// Greedy nearest-first assignment.
///
/// Rides are processed in row order, which the eligibility query guarantees is
/// oldest-request-first, so an older request is never starved in favour of a newer one. Each ride
/// takes the cheapest chair still in the pool; ties go to the lowest column index. A ride for
/// which every remaining chair is unreachable is left unassigned.
#[derive(Debug, Default)]
pub struct GreedyNearest;

impl AssignmentStrategy for GreedyNearest {
    fn solve(&self, costs: &CostMatrix) -> Vec<Pairing> {
        let mut pairings = Vec::new();
        let mut taken = vec![false; costs.chairs()];
        for ride in 0..costs.rides() {
            let mut best: Option<(usize, i64)> = None;
            for chair in 0..costs.chairs() {
                if taken[chair] {
                    continue;
                }
                let cost = costs.cost(ride, chair);
                if cost >= UNREACHABLE_COST {
                    continue;
                }
                if best.map_or(true, |(_, best_cost)| cost < best_cost) {
                    best = Some((chair, cost));
                }
            }
            if let Some((chair, cost)) = best {
                taken[chair] = true;
                pairings.push(Pairing { ride, chair, cost });
            }
        }
        pairings
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::db_types::Coordinate;
    use crate::matching::cost::{CostMatrix, CostModel};
    use crate::matching::fixtures::{chair_at, ride_at};

    fn solve(rides: &[(i64, i64)], chairs: &[((i64, i64), i64)]) -> (CostMatrix, Vec<Pairing>) {
        let rides: Vec<_> = rides
            .iter()
            .map(|&(lat, lon)| ride_at(Coordinate::new(lat, lon), Coordinate::new(0, 0)))
            .collect();
        let chairs: Vec<_> =
            chairs.iter().map(|&((lat, lon), speed)| chair_at(Coordinate::new(lat, lon), speed)).collect();
        let matrix = CostMatrix::build(CostModel::Pickup, &rides, &chairs);
        let pairings = GreedyNearest.solve(&matrix);
        (matrix, pairings)
    }

    #[test]
    fn oldest_ride_takes_the_cheapest_chair() {
        // The reference scenario: R1 (1,1), R2 (9,9), R3 (2,2) against W1 at (0,0) speed 1 and
        // W2 at (10,10) speed 5. R1 takes W1 at cost 2, R2 takes W2 at cost 0, R3 goes unmatched.
        let (_, pairings) = solve(&[(1, 1), (9, 9), (2, 2)], &[((0, 0), 1), ((10, 10), 5)]);
        assert_eq!(
            pairings,
            vec![Pairing { ride: 0, chair: 0, cost: 2 }, Pairing { ride: 1, chair: 1, cost: 0 }]
        );
    }

    #[test]
    fn each_chair_is_used_at_most_once() {
        let (_, pairings) = solve(&[(0, 0), (1, 1), (2, 2)], &[((0, 0), 1)]);
        assert_eq!(pairings.len(), 1);
        assert_eq!(pairings[0].ride, 0);
    }

    #[test]
    fn ties_break_to_the_first_chair() {
        let (_, pairings) = solve(&[(5, 5)], &[((5, 6), 1), ((6, 5), 1)]);
        assert_eq!(pairings, vec![Pairing { ride: 0, chair: 0, cost: 1 }]);
    }

    #[test]
    fn earlier_rides_are_never_outbid_by_later_ones() {
        // No ride may end up with a chair that costs more than a chair a *later* ride received,
        // if that cheaper chair was still free at its turn.
        let (matrix, pairings) = solve(
            &[(0, 0), (3, 0), (9, 9)],
            &[((0, 1), 1), ((4, 0), 1), ((8, 8), 1)],
        );
        for (i, p) in pairings.iter().enumerate() {
            for later in &pairings[i + 1..] {
                assert!(
                    matrix.cost(p.ride, later.chair) >= p.cost,
                    "ride {} took cost {} but the chair given to ride {} would have cost {}",
                    p.ride,
                    p.cost,
                    later.ride,
                    matrix.cost(p.ride, later.chair)
                );
            }
        }
    }

    #[test]
    fn unreachable_chairs_are_skipped() {
        let (_, pairings) = solve(&[(1, 1)], &[((0, 0), 0)]);
        assert!(pairings.is_empty());
    }
}
