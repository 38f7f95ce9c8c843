use super::*;
use crate::error::CoreError;
use critters_data::Brain;
use rand::seq::SliceRandom;
use rand::Rng;

/// Output activations below this never become candidates.
pub const OUTPUT_THRESHOLD: f32 = 0.5;

/// Squashes a pre-activation into `[0, 1]`.
#[inline]
pub fn activate(x: f32) -> f32 {
    (x.tanh() + 1.0) / 2.0
}

pub fn forward<'a>(brain: &'a mut Brain, inputs: &[f32]) -> Result<&'a [f32]> {
    let expected = brain.input_count();
    if inputs.len() != expected {
        return Err(CoreError::TopologyMismatch {
            expected,
            actual: inputs.len(),
        });
    }

    let Some(first) = brain.layers.first_mut() else {
        return Ok(&[]);
    };
    first.values.clear();
    first.values.extend_from_slice(inputs);

    for i in 1..brain.layers.len() {
        let (done, rest) = brain.layers.split_at_mut(i);
        let input = &done[i - 1].values;
        let layer = &mut rest[0];

        layer.values.clear();
        layer.values.resize(layer.biases.len(), 0.0);
        for (row, &x) in layer.weights.iter().zip(input) {
            for (acc, &w) in layer.values.iter_mut().zip(row) {
                *acc += x * w;
            }
        }
        for (acc, &b) in layer.values.iter_mut().zip(&layer.biases) {
            *acc = activate(*acc + b);
        }
    }

    Ok(brain.layers.last().map_or(&[][..], |l| l.values.as_slice()))
}

/// Lottery tickets an output neuron receives: `floor(value³ × 10)` at or
/// above the threshold, none below it.
#[must_use]
pub fn candidate_count(value: f32) -> usize {
    if value < OUTPUT_THRESHOLD {
        return 0;
    }
    (value * value * value * 10.0).floor() as usize
}

/// Weighted-random pick among confidently activated outputs.
pub fn select_output<R: Rng + ?Sized>(outputs: &[f32], rng: &mut R) -> Option<usize> {
    let candidates: Vec<usize> = outputs
        .iter()
        .enumerate()
        .flat_map(|(i, &v)| std::iter::repeat(i).take(candidate_count(v)))
        .collect();
    candidates.choose(rng).copied()
}

pub fn think<R: Rng + ?Sized>(
    brain: &mut Brain,
    inputs: &[f32],
    rng: &mut R,
) -> Result<Option<usize>> {
    let outputs = forward(brain, inputs)?;
    Ok(select_output(outputs, rng))
}
