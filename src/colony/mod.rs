//! Ant Colony Optimization engine.
//!
//! This module exports the tour constructor, the pheromone updater and
//! the iteration driver that ties them together.

pub mod config;
pub mod construction;
pub mod pheromone;
pub mod driver;

pub use config::*;
pub use construction::*;
pub use pheromone::*;
pub use driver::*;
