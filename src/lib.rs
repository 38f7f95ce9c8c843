//! # Critters
//!
//! Headless runner and library facade for the critters simulation.
//!
//! - [`model`] re-exports the engine and persistence crates under one path
//! - [`app`] loads configuration, drives generations and saves snapshots

pub mod app;
pub mod model;
