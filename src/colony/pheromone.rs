//! Pheromone evaporation and deposit.

use crate::error::{ColonyError, Result};
use crate::matrix::Matrix;

/// Sum the deposits of a batch of tours.
///
/// Each directed edge `a -> b` of a tour, the closing edge included,
/// receives `1 / distance(a, b)`. The reverse edge is left untouched.
/// A one-city tour has no edge and deposits nothing.
pub fn deposits(tours: &[Vec<usize>], distance: &Matrix) -> Result<Matrix> {
    let mut delta = Matrix::zeros(distance.size());

    for tour in tours {
        if tour.len() < 2 {
            continue;
        }

        let m = tour.len();
        for i in 0..m {
            let from = tour[i];
            let to = tour[(i + 1) % m];
            let dist = distance[(from, to)];

            if dist == 0.0 || !dist.is_finite() {
                return Err(ColonyError::InvalidEdgeDistance {
                    from,
                    to,
                    distance: dist,
                });
            }

            delta[(from, to)] += 1.0 / dist;
        }
    }

    Ok(delta)
}

/// Compute the next pheromone matrix: `(1 - rho) * old + deposit`
pub fn update_pheromone(
    tours: &[Vec<usize>],
    distance: &Matrix,
    pheromone: &Matrix,
    rho: f64,
) -> Result<Matrix> {
    let delta = deposits(tours, distance)?;
    let n = pheromone.size();
    let mut next = Matrix::zeros(n);

    for i in 0..n {
        for j in 0..n {
            next[(i, j)] = (1.0 - rho) * pheromone[(i, j)] + delta[(i, j)];
        }
    }

    Ok(next)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn distance_3() -> Matrix {
        Matrix::from_rows(vec![
            vec![0.0, 0.5, 0.25],
            vec![2.0, 0.0, 0.1],
            vec![0.4, 0.8, 0.0],
        ])
        .unwrap()
    }

    #[test]
    fn test_deposit_is_directed_with_wraparound() {
        let delta = deposits(&[vec![0, 1, 2]], &distance_3()).unwrap();

        assert!((delta[(0, 1)] - 2.0).abs() < 1e-12);
        assert!((delta[(1, 2)] - 10.0).abs() < 1e-12);
        assert!((delta[(2, 0)] - 2.5).abs() < 1e-12);
        // Reverse edges untouched
        assert_eq!(delta[(1, 0)], 0.0);
        assert_eq!(delta[(2, 1)], 0.0);
        assert_eq!(delta[(0, 2)], 0.0);
    }

    #[test]
    fn test_deposits_accumulate_across_tours() {
        let delta = deposits(&[vec![0, 1, 2], vec![1, 2, 0]], &distance_3()).unwrap();
        assert!((delta[(0, 1)] - 4.0).abs() < 1e-12);
        assert!((delta[(1, 2)] - 20.0).abs() < 1e-12);
    }

    #[test]
    fn test_full_evaporation_keeps_only_deposit() {
        let pheromone = Matrix::filled(3, 7.0);
        let tours = vec![vec![2, 1, 0]];
        let next = update_pheromone(&tours, &distance_3(), &pheromone, 1.0).unwrap();
        let delta = deposits(&tours, &distance_3()).unwrap();

        assert_eq!(next, delta);
    }

    #[test]
    fn test_no_evaporation_adds_deposit() {
        let pheromone = Matrix::filled(3, 1.5);
        let tours = vec![vec![0, 2, 1]];
        let next = update_pheromone(&tours, &distance_3(), &pheromone, 0.0).unwrap();
        let delta = deposits(&tours, &distance_3()).unwrap();

        for i in 0..3 {
            for j in 0..3 {
                assert_eq!(next[(i, j)], 1.5 + delta[(i, j)]);
            }
        }
    }

    #[test]
    fn test_partial_evaporation() {
        let pheromone = Matrix::filled(3, 1.0);
        let next = update_pheromone(&[vec![0, 1, 2]], &distance_3(), &pheromone, 0.5).unwrap();

        assert!((next[(0, 1)] - 2.5).abs() < 1e-12);
        assert!((next[(1, 0)] - 0.5).abs() < 1e-12);
        assert!((next[(0, 0)] - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_zero_distance_edge_is_fatal() {
        // Repeated city produces a self-edge with zero distance
        let err = deposits(&[vec![0, 0, 1]], &distance_3()).unwrap_err();
        assert_eq!(
            err,
            ColonyError::InvalidEdgeDistance {
                from: 0,
                to: 0,
                distance: 0.0
            }
        );
    }

    #[test]
    fn test_non_finite_distance_is_fatal() {
        let mut distance = distance_3();
        distance[(0, 1)] = f64::INFINITY;
        assert!(deposits(&[vec![0, 1, 2]], &distance).is_err());
    }

    #[test]
    fn test_single_city_tour_only_evaporates() {
        let distance = Matrix::zeros(1);
        let pheromone = Matrix::filled(1, 1.0);
        let next = update_pheromone(&[vec![0], vec![0]], &distance, &pheromone, 0.5).unwrap();

        assert_eq!(next[(0, 0)], 0.5);
    }
}
