//! ACO-TSP Solver Library
//! 
//! Ant Colony Optimization for the Traveling Salesman Problem over a
//! randomly generated, directed distance matrix.
//! 
//! # Features
//! 
//! - Seeded instance generation (distance, heuristic and pheromone matrices)
//! - Roulette-wheel tour construction with a uniform zero-sum fallback
//! - Evaporation/deposit pheromone update
//! - Iteration driver building every ant's tour in parallel with rayon
//! - Timing benchmarks comparing parallel and sequential execution
//! 
//! # Example
//! 
//! ```no_run
//! use aco_tsp::instance::initialize_instance;
//! use aco_tsp::colony::{run_colony, ColonyConfig};
//! 
//! let (instance, pheromone) = initialize_instance(25, 42).unwrap();
//! let config = ColonyConfig { num_iterations: 100, ..Default::default() };
//! 
//! let pheromone = run_colony(&instance, pheromone, &config, |p| {
//!     println!("Iteration {}/{} complete.", p.iteration, p.total);
//! }).unwrap();
//! 
//! println!("{}", pheromone);
//! ```

pub mod error;
pub mod matrix;
pub mod instance;
pub mod colony;
pub mod benchmark;

pub use error::ColonyError;
pub use instance::{initialize_instance, ProblemInstance};
pub use matrix::Matrix;
pub use colony::{run_colony, ColonyConfig};
