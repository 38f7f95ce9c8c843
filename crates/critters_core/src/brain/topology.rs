use super::*;
use crate::error::CoreError;
use critters_data::{Brain, Layer};
use rand::Rng;

/// Mean of ten uniform draws, stretched to `width` and centred on zero.
pub fn approx_gaussian<R: Rng + ?Sized>(width: f32, rng: &mut R) -> f32 {
    let sum: f32 = (0..10).map(|_| rng.gen::<f32>()).sum();
    sum / 10.0 * width - width / 2.0
}

pub fn random_weight<R: Rng + ?Sized>(fan_in: usize, rng: &mut R) -> f32 {
    approx_gaussian(4.0, rng) / (fan_in.max(1) as f32).sqrt()
}

pub fn random_bias<R: Rng + ?Sized>(rng: &mut R) -> f32 {
    approx_gaussian(1.0, rng)
}

/// A controller of the given shape with every parameter zeroed.
#[must_use]
pub fn scaffold(topology: &Topology) -> Brain {
    let sizes = topology.layer_sizes();
    let mut layers = Vec::with_capacity(sizes.len());
    layers.push(Layer::input(topology.inputs));
    for pair in sizes.windows(2) {
        let (rows, cols) = (pair[0], pair[1]);
        layers.push(Layer {
            weights: vec![vec![0.0; cols]; rows],
            biases: vec![0.0; cols],
            values: vec![0.0; cols],
        });
    }
    Brain { layers }
}

pub fn create_brain_random_with_rng<R: Rng + ?Sized>(topology: &Topology, rng: &mut R) -> Brain {
    let mut brain = scaffold(topology);
    for layer in brain.layers.iter_mut().skip(1) {
        let fan_in = layer.weights.len();
        for row in &mut layer.weights {
            for w in row.iter_mut() {
                *w = random_weight(fan_in, rng);
            }
        }
        for b in &mut layer.biases {
            *b = random_bias(rng);
        }
    }
    brain
}

/// Copies saved weights and biases onto a fresh controller of `topology`.
///
/// Fails with [`CoreError::ShapeMismatch`] when any saved array disagrees
/// with the reconstructed shape.
pub fn overlay_saved(topology: &Topology, saved: &Brain) -> Result<Brain> {
    let mut brain = scaffold(topology);
    if saved.layers.len() != brain.layers.len() {
        return Err(CoreError::shape_mismatch(
            0,
            format!("{} layers", brain.layers.len()),
            format!("{} layers", saved.layers.len()),
        ));
    }

    for (index, (layer, source)) in brain
        .layers
        .iter_mut()
        .zip(&saved.layers)
        .enumerate()
        .skip(1)
    {
        let expected = (layer.weights.len(), layer.biases.len());
        let rows_match = source.weights.len() == expected.0
            && source.weights.iter().all(|row| row.len() == expected.1);
        if !rows_match || source.biases.len() != expected.1 {
            let actual_cols = source.weights.first().map_or(0, Vec::len);
            return Err(CoreError::shape_mismatch(
                index,
                expected,
                (source.weights.len(), actual_cols, source.biases.len()),
            ));
        }
        layer.weights.clone_from(&source.weights);
        layer.biases.clone_from(&source.biases);
    }
    Ok(brain)
}
