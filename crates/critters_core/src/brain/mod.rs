pub mod crossover;
pub mod forward;
pub mod mutation;
pub mod topology;

pub use critters_data::{Brain, Layer};
use crate::config::EvolutionConfig;
use crate::error::Result;
use rand::Rng;
use serde::{Deserialize, Serialize};

pub use crossover::crossover_brain;
pub use topology::{create_brain_random_with_rng, overlay_saved};

pub const OUTPUT_LABELS: [&str; 8] = ["N", "NE", "E", "SE", "S", "SW", "W", "NW"];

/// One output neuron per grid-adjacent move direction.
pub const BRAIN_OUTPUTS: usize = OUTPUT_LABELS.len();

/// Layer sizes of a fixed-topology controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Topology {
    pub inputs: usize,
    pub hidden_width: usize,
    pub hidden_layers: usize,
    pub outputs: usize,
}

impl Topology {
    /// Neuron count of every layer, input layer first.
    #[must_use]
    pub fn layer_sizes(&self) -> Vec<usize> {
        let mut sizes = Vec::with_capacity(self.hidden_layers + 2);
        sizes.push(self.inputs);
        sizes.extend(std::iter::repeat(self.hidden_width).take(self.hidden_layers));
        sizes.push(self.outputs);
        sizes
    }
}

/// Trait defining the core logic of a critter's neural controller.
pub trait BrainLogic: Sized {
    fn new_random_with_rng<R: Rng + ?Sized>(topology: &Topology, rng: &mut R) -> Self;

    fn input_count(&self) -> usize;
    fn output_count(&self) -> usize;

    /// `(rows, columns)` of every weight matrix, input layer excluded.
    fn layer_shapes(&self) -> Vec<(usize, usize)>;

    /// Runs a forward pass and returns the output activations.
    fn forward(&mut self, inputs: &[f32]) -> Result<&[f32]>;

    /// Forward pass followed by the weighted-random output choice.
    fn think<R: Rng + ?Sized>(&mut self, inputs: &[f32], rng: &mut R) -> Result<Option<usize>>;

    fn crossover_with_rng<R: Rng + ?Sized>(
        &self,
        other: &Self,
        config: &EvolutionConfig,
        rng: &mut R,
    ) -> Result<Self>;

    /// Rebuilds an executable controller from saved parameter arrays.
    fn overlay_saved(topology: &Topology, saved: &Self) -> Result<Self>;
}

impl BrainLogic for Brain {
    fn new_random_with_rng<R: Rng + ?Sized>(topology: &Topology, rng: &mut R) -> Self {
        topology::create_brain_random_with_rng(topology, rng)
    }

    fn input_count(&self) -> usize {
        match self.layers.get(1) {
            Some(first) => first.weights.len(),
            None => self.layers.first().map_or(0, |l| l.values.len()),
        }
    }

    fn output_count(&self) -> usize {
        match self.layers.len() {
            0 | 1 => self.input_count(),
            _ => self.layers.last().map_or(0, |l| l.biases.len()),
        }
    }

    fn layer_shapes(&self) -> Vec<(usize, usize)> {
        self.layers
            .iter()
            .skip(1)
            .map(|l| (l.weights.len(), l.biases.len()))
            .collect()
    }

    fn forward(&mut self, inputs: &[f32]) -> Result<&[f32]> {
        forward::forward(self, inputs)
    }

    fn think<R: Rng + ?Sized>(&mut self, inputs: &[f32], rng: &mut R) -> Result<Option<usize>> {
        forward::think(self, inputs, rng)
    }

    fn crossover_with_rng<R: Rng + ?Sized>(
        &self,
        other: &Self,
        config: &EvolutionConfig,
        rng: &mut R,
    ) -> Result<Self> {
        crossover::crossover_brain(self, other, config, rng)
    }

    fn overlay_saved(topology: &Topology, saved: &Self) -> Result<Self> {
        topology::overlay_saved(topology, saved)
    }
}
