//! Plain data records shared by the critters engine, its persistence layer
//! and any external front end.
//!
//! Nothing in here draws random numbers or touches the world grid; the
//! behavior lives in `critters_core`.

pub mod data;

pub use data::brain::{Brain, Layer};
pub use data::entity::{Appearance, Entity, EntityKind, Identity, PopulationArchive, RoleState};
pub use data::genome::{
    Gene, GeneTable, Genome, InternalParams, NeuralGenome, Oscillator, SensoryInput, GENE_COUNT,
    INTERNAL_INPUTS,
};
pub use data::geometry::{Offset, Position};
