//! Problem instance for the ACO-TSP solver.
//!
//! An instance is a set of cities known only through a precomputed
//! distance matrix. Distances are drawn at random, one independent draw
//! per ordered pair, so `distance(i, j)` and `distance(j, i)` generally
//! differ and the problem is a directed TSP.

use crate::error::{ColonyError, Result};
use crate::matrix::Matrix;
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// Initial value of every pheromone cell, diagonal included
pub const INITIAL_PHEROMONE: f64 = 1.0;

/// Parameters for generating a random instance
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InstanceConfig {
    /// Number of cities
    pub num_cities: usize,
    /// Seed of the distance generator
    pub seed: u64,
}

impl Default for InstanceConfig {
    fn default() -> Self {
        InstanceConfig {
            num_cities: 25,
            seed: 42,
        }
    }
}

/// Static data of a run: distances and their reciprocal heuristic values.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProblemInstance {
    pub distance: Matrix,
    pub heuristic: Matrix,
}

impl ProblemInstance {
    /// Build an instance from an explicit distance matrix.
    ///
    /// The heuristic is `1 / distance` off the diagonal and zero on it.
    pub fn from_distance_matrix(distance: Matrix) -> Self {
        let n = distance.size();
        let mut heuristic = Matrix::zeros(n);

        for i in 0..n {
            for j in 0..n {
                if i != j {
                    heuristic[(i, j)] = 1.0 / distance[(i, j)];
                }
            }
        }

        ProblemInstance { distance, heuristic }
    }

    /// Build an instance with a caller-supplied heuristic matrix
    pub fn with_heuristic(distance: Matrix, heuristic: Matrix) -> Result<Self> {
        if distance.size() != heuristic.size() {
            return Err(ColonyError::InvalidConfig(format!(
                "distance is {}x{} but heuristic is {}x{}",
                distance.size(),
                distance.size(),
                heuristic.size(),
                heuristic.size()
            )));
        }
        Ok(ProblemInstance { distance, heuristic })
    }

    /// Generate a random instance, drawing distances from `rng`.
    ///
    /// Cells are drawn in row-major order, skipping the diagonal, each
    /// uniform in `[0, 1)`.
    pub fn random<R: Rng + ?Sized>(num_cities: usize, rng: &mut R) -> Result<Self> {
        if num_cities == 0 {
            return Err(ColonyError::InvalidConfig(
                "number of cities must be positive".to_string(),
            ));
        }

        let mut distance = Matrix::zeros(num_cities);
        for i in 0..num_cities {
            for j in 0..num_cities {
                if i != j {
                    distance[(i, j)] = rng.gen::<f64>();
                }
            }
        }

        Ok(Self::from_distance_matrix(distance))
    }

    /// Number of cities
    #[inline]
    pub fn num_cities(&self) -> usize {
        self.distance.size()
    }

    /// Get the distance of the directed edge `i -> j`
    #[inline]
    pub fn distance(&self, i: usize, j: usize) -> f64 {
        self.distance[(i, j)]
    }

    /// Fresh pheromone matrix for this instance
    pub fn initial_pheromone(&self) -> Matrix {
        Matrix::filled(self.num_cities(), INITIAL_PHEROMONE)
    }

    /// Whether the distance matrix happens to be symmetric
    pub fn is_symmetric(&self) -> bool {
        let n = self.num_cities();
        (0..n).all(|i| (i + 1..n).all(|j| self.distance(i, j) == self.distance(j, i)))
    }
}

/// Generate a seeded instance together with its initial pheromone matrix.
pub fn initialize_instance(num_cities: usize, seed: u64) -> Result<(ProblemInstance, Matrix)> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let instance = ProblemInstance::random(num_cities, &mut rng)?;
    let pheromone = instance.initial_pheromone();

    log::debug!(
        "initialized instance with {} cities (seed {})",
        num_cities,
        seed
    );

    Ok((instance, pheromone))
}

impl InstanceConfig {
    /// Generate the instance described by this configuration
    pub fn build(&self) -> Result<(ProblemInstance, Matrix)> {
        initialize_instance(self.num_cities, self.seed)
    }
}
