//! Probabilistic tour construction for a single ant.
//!
//! An ant starts from a uniformly random city and repeatedly moves to an
//! unvisited city chosen by roulette wheel, with weights
//! `pheromone^alpha * heuristic^beta` on the outgoing edges.

use crate::error::{ColonyError, Result};
use crate::matrix::Matrix;
use rand::prelude::*;

/// Result of one roulette-wheel draw
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouletteOutcome {
    /// The cumulative scan reached the draw at this city
    Selected(usize),
    /// The scan ended short of the draw (rounding left the cumulative mass
    /// below 1); the last candidate is taken instead
    Fallback(usize),
}

impl RouletteOutcome {
    pub fn city(self) -> usize {
        match self {
            RouletteOutcome::Selected(city) | RouletteOutcome::Fallback(city) => city,
        }
    }
}

/// Roulette-wheel selection over `candidates` in the given order.
///
/// Returns the first candidate whose running probability sum reaches `r`.
///
/// # Panics
/// Panics if `candidates` is empty.
pub fn roulette_select(probabilities: &[f64], candidates: &[usize], r: f64) -> RouletteOutcome {
    let mut cumulative = 0.0;
    for &city in candidates {
        cumulative += probabilities[city];
        if r <= cumulative {
            return RouletteOutcome::Selected(city);
        }
    }

    RouletteOutcome::Fallback(candidates[candidates.len() - 1])
}

/// Read-only view of the colony state an ant needs to build a tour.
#[derive(Debug, Clone, Copy)]
pub struct TourConstructor<'a> {
    pheromone: &'a Matrix,
    heuristic: &'a Matrix,
    alpha: f64,
    beta: f64,
}

impl<'a> TourConstructor<'a> {
    pub fn new(pheromone: &'a Matrix, heuristic: &'a Matrix, alpha: f64, beta: f64) -> Self {
        debug_assert_eq!(pheromone.size(), heuristic.size());
        TourConstructor {
            pheromone,
            heuristic,
            alpha,
            beta,
        }
    }

    /// Number of cities
    pub fn num_cities(&self) -> usize {
        self.pheromone.size()
    }

    /// Probability of moving from `current` to each city.
    ///
    /// Visited cities get probability zero. When every unvisited score is
    /// zero the distribution falls back to uniform over the unvisited cities.
    pub fn selection_probabilities(&self, current: usize, visited: &[bool]) -> Result<Vec<f64>> {
        let n = self.num_cities();
        let mut probabilities = vec![0.0; n];

        for j in 0..n {
            if !visited[j] {
                let tau = self.pheromone[(current, j)].powf(self.alpha);
                let eta = self.heuristic[(current, j)].powf(self.beta);
                probabilities[j] = tau * eta;
            }
        }

        let mut total: f64 = probabilities.iter().sum();

        if total == 0.0 {
            for j in 0..n {
                if !visited[j] {
                    probabilities[j] = 1.0;
                }
            }
            total = probabilities.iter().sum();
        }

        // Finite scores can still overflow the sum, which would normalize to all zeros
        if !total.is_finite() {
            let candidate = probabilities
                .iter()
                .position(|p| !p.is_finite())
                .or_else(|| visited.iter().position(|&v| !v))
                .unwrap_or(current);
            return Err(ColonyError::DegenerateProbability {
                from: current,
                candidate,
                value: total,
            });
        }

        for p in probabilities.iter_mut() {
            *p /= total;
        }

        if let Some(candidate) = probabilities.iter().position(|p| !p.is_finite()) {
            return Err(ColonyError::DegenerateProbability {
                from: current,
                candidate,
                value: probabilities[candidate],
            });
        }

        Ok(probabilities)
    }

    /// Build one complete tour, drawing from the ant's own random stream
    pub fn construct<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<Vec<usize>> {
        let n = self.num_cities();
        let mut tour = Vec::with_capacity(n);
        let mut visited = vec![false; n];

        let start = rng.gen_range(0..n);
        tour.push(start);
        visited[start] = true;

        let mut current = start;
        let mut candidates: Vec<usize> = Vec::with_capacity(n);

        while tour.len() < n {
            let probabilities = self.selection_probabilities(current, &visited)?;

            candidates.clear();
            candidates.extend((0..n).filter(|&j| !visited[j]));

            let r = rng.gen::<f64>();
            let next = match roulette_select(&probabilities, &candidates, r) {
                RouletteOutcome::Selected(city) => city,
                RouletteOutcome::Fallback(city) => {
                    log::warn!(
                        "roulette scan from city {} ended short of r={}; falling back to city {}",
                        current,
                        r,
                        city
                    );
                    city
                }
            };

            tour.push(next);
            visited[next] = true;
            current = next;
        }

        Ok(tour)
    }
}

/// Whether `tour` visits every city of `0..num_cities` exactly once
pub fn is_permutation(tour: &[usize], num_cities: usize) -> bool {
    if tour.len() != num_cities {
        return false;
    }
    let mut seen = vec![false; num_cities];
    for &city in tour {
        if city >= num_cities || seen[city] {
            return false;
        }
        seen[city] = true;
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instance::{initialize_instance, ProblemInstance};
    use proptest::prelude::*;
    use rand_chacha::ChaCha8Rng;

    /// Yields zero on the first draw and the maximum value afterwards, so the
    /// start city is 0 and every roulette draw is the largest `f64` below 1.
    struct HighDrawRng {
        draws: usize,
    }

    impl rand::RngCore for HighDrawRng {
        fn next_u32(&mut self) -> u32 {
            self.next_u64() as u32
        }

        fn next_u64(&mut self) -> u64 {
            self.draws += 1;
            if self.draws == 1 {
                0
            } else {
                u64::MAX
            }
        }

        fn fill_bytes(&mut self, dest: &mut [u8]) {
            dest.fill(0xff)
        }

        fn try_fill_bytes(&mut self, dest: &mut [u8]) -> std::result::Result<(), rand::Error> {
            self.fill_bytes(dest);
            Ok(())
        }
    }

    #[test]
    fn test_tour_is_permutation() {
        let (instance, pheromone) = initialize_instance(25, 42).unwrap();
        let constructor = TourConstructor::new(&pheromone, &instance.heuristic, 1.0, 2.0);
        let mut rng = ChaCha8Rng::seed_from_u64(7);

        for _ in 0..20 {
            let tour = constructor.construct(&mut rng).unwrap();
            assert!(is_permutation(&tour, 25));
        }
    }

    #[test]
    fn test_single_city_tour() {
        let (instance, pheromone) = initialize_instance(1, 42).unwrap();
        let constructor = TourConstructor::new(&pheromone, &instance.heuristic, 1.0, 2.0);
        let mut rng = ChaCha8Rng::seed_from_u64(0);

        assert_eq!(constructor.construct(&mut rng).unwrap(), vec![0]);
    }

    #[test]
    fn test_probabilities_exclude_visited() {
        let (instance, pheromone) = initialize_instance(6, 3).unwrap();
        let constructor = TourConstructor::new(&pheromone, &instance.heuristic, 1.0, 2.0);
        let visited = vec![true, false, true, false, false, false];

        let probs = constructor.selection_probabilities(0, &visited).unwrap();

        assert_eq!(probs[0], 0.0);
        assert_eq!(probs[2], 0.0);
        assert!(probs.iter().all(|&p| p >= 0.0 && p.is_finite()));
        assert!((probs.iter().sum::<f64>() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_zero_scores_fall_back_to_uniform() {
        // Zero heuristic everywhere: every score vanishes
        let instance = ProblemInstance::with_heuristic(Matrix::filled(5, 1.0), Matrix::zeros(5)).unwrap();
        let pheromone = instance.initial_pheromone();
        let constructor = TourConstructor::new(&pheromone, &instance.heuristic, 1.0, 1.0);
        let visited = vec![false, true, false, false, true];

        let probs = constructor.selection_probabilities(1, &visited).unwrap();

        assert_eq!(probs, vec![1.0 / 3.0, 0.0, 1.0 / 3.0, 1.0 / 3.0, 0.0]);

        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let tour = constructor.construct(&mut rng).unwrap();
        assert!(is_permutation(&tour, 5));
    }

    #[test]
    fn test_overflowing_score_sum_is_rejected() {
        // Each score is finite but their sum is not
        let instance = ProblemInstance::with_heuristic(Matrix::filled(4, 1.0), Matrix::filled(4, 1e308)).unwrap();
        let pheromone = instance.initial_pheromone();
        let constructor = TourConstructor::new(&pheromone, &instance.heuristic, 1.0, 1.0);
        let visited = vec![true, false, false, false];

        let err = constructor.selection_probabilities(0, &visited).unwrap_err();
        assert!(matches!(
            err,
            ColonyError::DegenerateProbability { from: 0, value, .. } if value.is_infinite()
        ));

        let mut rng = ChaCha8Rng::seed_from_u64(5);
        assert!(constructor.construct(&mut rng).is_err());
    }

    #[test]
    fn test_construct_recovers_from_roulette_shortfall() {
        // Seven equal scores normalize to a cumulative mass just under the
        // draw; city 8 scores zero from city 0, so only the fallback reaches it
        let mut heuristic = Matrix::filled(9, 1.0);
        heuristic[(0, 8)] = 0.0;
        let instance = ProblemInstance::with_heuristic(Matrix::filled(9, 1.0), heuristic).unwrap();
        let pheromone = instance.initial_pheromone();
        let constructor = TourConstructor::new(&pheromone, &instance.heuristic, 1.0, 1.0);

        let mut visited = vec![false; 9];
        visited[0] = true;
        let probs = constructor.selection_probabilities(0, &visited).unwrap();
        let candidates: Vec<usize> = (1..9).collect();
        assert_eq!(
            roulette_select(&probs, &candidates, 1.0 - f64::EPSILON / 2.0),
            RouletteOutcome::Fallback(8)
        );

        let tour = constructor.construct(&mut HighDrawRng { draws: 0 }).unwrap();
        assert_eq!(&tour[..3], &[0, 8, 7]);
        assert!(is_permutation(&tour, 9));
    }

    #[test]
    fn test_nan_probability_is_rejected() {
        let pheromone = Matrix::filled(3, -1.0);
        let heuristic = Matrix::filled(3, 1.0);
        // Negative base with fractional exponent yields NaN
        let constructor = TourConstructor::new(&pheromone, &heuristic, 0.5, 1.0);
        let visited = vec![true, false, false];

        let err = constructor.selection_probabilities(0, &visited).unwrap_err();
        assert!(matches!(err, ColonyError::DegenerateProbability { from: 0, .. }));

        let mut rng = ChaCha8Rng::seed_from_u64(1);
        assert!(constructor.construct(&mut rng).is_err());
    }

    #[test]
    fn test_infinite_score_is_rejected() {
        let pheromone = Matrix::filled(3, 0.0);
        let heuristic = Matrix::filled(3, 1.0);
        // 0^-1 is infinite, and inf / inf is NaN after normalization
        let constructor = TourConstructor::new(&pheromone, &heuristic, -1.0, 1.0);
        let visited = vec![true, false, false];

        assert!(constructor.selection_probabilities(0, &visited).is_err());
    }

    #[test]
    fn test_roulette_picks_first_reaching_draw() {
        let probs = vec![0.0, 0.25, 0.5, 0.25];
        let candidates = vec![1, 2, 3];

        assert_eq!(roulette_select(&probs, &candidates, 0.0), RouletteOutcome::Selected(1));
        assert_eq!(roulette_select(&probs, &candidates, 0.25), RouletteOutcome::Selected(1));
        assert_eq!(roulette_select(&probs, &candidates, 0.3), RouletteOutcome::Selected(2));
        assert_eq!(roulette_select(&probs, &candidates, 0.99), RouletteOutcome::Selected(3));
    }

    #[test]
    fn test_roulette_shortfall_falls_back_to_last_candidate() {
        // Mass sums to slightly under one
        let probs = vec![0.3, 0.0, 0.3, 0.3999999];
        let candidates = vec![0, 2, 3];

        let outcome = roulette_select(&probs, &candidates, 0.99999995);
        assert_eq!(outcome, RouletteOutcome::Fallback(3));
        assert_eq!(outcome.city(), 3);
    }

    #[test]
    fn test_is_permutation() {
        assert!(is_permutation(&[2, 0, 1], 3));
        assert!(!is_permutation(&[0, 0, 1], 3));
        assert!(!is_permutation(&[0, 1], 3));
        assert!(!is_permutation(&[0, 1, 3], 3));
    }

    proptest! {
        #[test]
        fn prop_tours_are_permutations(
            num_cities in 1usize..20,
            instance_seed in any::<u64>(),
            ant_seed in any::<u64>(),
            alpha in 0.0f64..3.0,
            beta in 0.0f64..5.0,
        ) {
            let (instance, pheromone) = initialize_instance(num_cities, instance_seed).unwrap();
            let constructor = TourConstructor::new(&pheromone, &instance.heuristic, alpha, beta);
            let mut rng = ChaCha8Rng::seed_from_u64(ant_seed);

            let tour = constructor.construct(&mut rng).unwrap();
            prop_assert!(is_permutation(&tour, num_cities));
        }

        #[test]
        fn prop_distributions_sum_to_one(
            num_cities in 2usize..15,
            seed in any::<u64>(),
            current in 0usize..15,
            mask in proptest::collection::vec(any::<bool>(), 15),
        ) {
            let current = current % num_cities;
            let (instance, pheromone) = initialize_instance(num_cities, seed).unwrap();
            let constructor = TourConstructor::new(&pheromone, &instance.heuristic, 1.0, 2.0);

            let mut visited: Vec<bool> = mask[..num_cities].to_vec();
            visited[current] = true;
            prop_assume!(visited.iter().any(|&v| !v));

            let probs = constructor.selection_probabilities(current, &visited).unwrap();
            prop_assert!(probs.iter().all(|&p| p.is_finite() && p >= 0.0));
            prop_assert!((probs.iter().sum::<f64>() - 1.0).abs() < 1e-9);
            for (j, &p) in probs.iter().enumerate() {
                if visited[j] {
                    prop_assert_eq!(p, 0.0);
                }
            }
        }
    }
}
