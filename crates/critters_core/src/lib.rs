//! # Critters Core
//!
//! The simulation engine for critters: grid-bound agents that sense their
//! neighbourhood, pick a move with an evolvable feed-forward controller and
//! breed across discrete generations, predators hunting prey along the way.
//!
//! This crate contains:
//! - The occupancy grid and its static obstacle mask
//! - Fixed-topology neural controllers with stochastic output selection
//! - Angular, distance-weighted sensing
//! - Role behaviors (bouncer, thinker, interactor, predator, prey)
//! - Crossover, mutation, selection and the generation loop
//! - Metrics collection and structured logging
//!
//! ## Architecture
//!
//! - **Arena and index**: the grid stores entity ids; the [`population`] arena owns entities
//! - **Strategy per role**: [`behavior::Behavior`] picked by the entity's [`EntityKind`]
//! - **Explicit context**: [`simulation::SimulationContext`] carries config, grid and RNG
//! - **Deterministic simulation**: one seeded `ChaCha8Rng` per simulation
//!
//! ## Example
//!
//! ```
//! use critters_core::config::AppConfig;
//! use critters_core::simulation::Simulation;
//!
//! let mut config = AppConfig::default();
//! config.world.seed = Some(42);
//! config.world.steps_per_generation = 10;
//!
//! let mut sim = Simulation::new(config).unwrap();
//! let summary = sim.run_generation().unwrap();
//! assert_eq!(summary.ticks, 10);
//! ```

pub use critters_data::EntityKind;

/// Per-tick role behavior and the move state machine
pub mod behavior;
/// Neural controller: topology, forward pass, mutation, crossover
pub mod brain;
/// Configuration management for simulation parameters
pub mod config;
/// Error types
pub mod error;
/// Selection and reproduction between generations
pub mod generation;
/// Genome construction, crossover and mutation
pub mod genetics;
/// World grid and obstacle mask
pub mod grid;
/// Performance metrics collection and logging
pub mod metrics;
/// Entity arena
pub mod population;
/// Survivor selection strategies
pub mod selection;
/// Angular sensing
pub mod senses;
/// Generation manager
pub mod simulation;
/// Serializable population snapshots
pub mod snapshot;

pub use error::{CoreError, Result};
