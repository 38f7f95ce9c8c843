//! Core data structures for the critters simulation.

pub mod brain;
pub mod entity;
pub mod genome;
pub mod geometry;
