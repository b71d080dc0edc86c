//! Colony iteration loop.
//!
//! Every iteration builds one tour per ant against a frozen pheromone
//! matrix, waits for the whole batch, then replaces the matrix with the
//! updated one. Ants own independent ChaCha streams derived from the
//! master seed, so parallel and sequential runs produce the same result.

use super::config::{ColonyConfig, ExecutionMode};
use super::construction::TourConstructor;
use super::pheromone::update_pheromone;
use crate::error::{ColonyError, Result};
use crate::instance::ProblemInstance;
use crate::matrix::Matrix;
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Emitted after each completed iteration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IterationProgress {
    /// 1-based index of the iteration just completed
    pub iteration: usize,
    pub total: usize,
}

/// Random stream of one ant: the master seed with the ant index as ChaCha stream id
pub fn ant_rng(seed: u64, ant: usize) -> ChaCha8Rng {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    rng.set_stream(ant as u64);
    rng
}

/// Ant Colony Optimization run over a fixed instance
pub struct AntColony<'a> {
    instance: &'a ProblemInstance,
    config: ColonyConfig,
    pheromone: Matrix,
    ant_rngs: Vec<ChaCha8Rng>,
}

impl<'a> AntColony<'a> {
    pub fn new(instance: &'a ProblemInstance, pheromone: Matrix, config: ColonyConfig) -> Result<Self> {
        config.validate()?;

        if pheromone.size() != instance.num_cities() {
            return Err(ColonyError::InvalidConfig(format!(
                "pheromone matrix has size {} but instance has {} cities",
                pheromone.size(),
                instance.num_cities()
            )));
        }

        let ant_rngs = (0..config.num_ants).map(|ant| ant_rng(config.seed, ant)).collect();

        Ok(AntColony {
            instance,
            config,
            pheromone,
            ant_rngs,
        })
    }

    /// Current pheromone matrix
    pub fn pheromone(&self) -> &Matrix {
        &self.pheromone
    }

    /// Build the tour batch of one iteration
    fn construct_tours(&mut self) -> Result<Vec<Vec<usize>>> {
        let constructor = TourConstructor::new(
            &self.pheromone,
            &self.instance.heuristic,
            self.config.alpha,
            self.config.beta,
        );

        match self.config.mode {
            ExecutionMode::Parallel => self
                .ant_rngs
                .par_iter_mut()
                .map(|rng| constructor.construct(rng))
                .collect(),
            ExecutionMode::Sequential => self
                .ant_rngs
                .iter_mut()
                .map(|rng| constructor.construct(rng))
                .collect(),
        }
    }

    /// Run one iteration: construct all tours, then update the pheromone
    pub fn step(&mut self) -> Result<()> {
        let tours = self.construct_tours()?;
        self.pheromone = update_pheromone(
            &tours,
            &self.instance.distance,
            &self.pheromone,
            self.config.rho,
        )?;
        Ok(())
    }

    /// Run all iterations, calling `on_progress` after each one
    pub fn run_with_progress<F>(mut self, mut on_progress: F) -> Result<Matrix>
    where
        F: FnMut(IterationProgress),
    {
        let total = self.config.num_iterations;
        log::info!(
            "Running ACO: {} cities, {} ants, {} iterations ({} mode)",
            self.instance.num_cities(),
            self.config.num_ants,
            total,
            self.config.mode
        );

        for iteration in 0..total {
            if let Err(e) = self.step() {
                log::error!("Iteration {}/{} failed: {}", iteration + 1, total, e);
                return Err(e);
            }

            log::debug!("Iteration {}/{} complete", iteration + 1, total);
            on_progress(IterationProgress {
                iteration: iteration + 1,
                total,
            });
        }

        Ok(self.pheromone)
    }

    /// Run all iterations
    pub fn run(self) -> Result<Matrix> {
        self.run_with_progress(|_| {})
    }
}

/// Run a colony from `pheromone` and return the final pheromone matrix.
pub fn run_colony<F>(
    instance: &ProblemInstance,
    pheromone: Matrix,
    config: &ColonyConfig,
    on_progress: F,
) -> Result<Matrix>
where
    F: FnMut(IterationProgress),
{
    AntColony::new(instance, pheromone, config.clone())?.run_with_progress(on_progress)
}
