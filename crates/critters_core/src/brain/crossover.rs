use super::mutation::{mutate_bias, mutate_weight};
use super::*;
use crate::config::EvolutionConfig;
use crate::error::CoreError;
use critters_data::{Brain, Layer};
use rand::Rng;

/// Builds a child controller with the parents' shape.
///
/// Each neuron takes its incoming weights from one coin-flipped parent and
/// its bias from another independent flip; every inherited value then goes
/// through [`mutate_weight`] or [`mutate_bias`].
pub fn crossover_brain<R: Rng + ?Sized>(
    brain: &Brain,
    other: &Brain,
    config: &EvolutionConfig,
    rng: &mut R,
) -> Result<Brain> {
    let shapes = brain.layer_shapes();
    let other_shapes = other.layer_shapes();
    if shapes != other_shapes {
        return Err(CoreError::shape_mismatch(
            shapes.len(),
            shapes,
            other_shapes,
        ));
    }

    let mut child = Brain {
        layers: vec![Layer::input(brain.input_count())],
    };

    for (a, b) in brain.layers.iter().zip(&other.layers).skip(1) {
        let fan_in = a.weights.len();
        let width = a.biases.len();
        let mut layer = Layer {
            weights: vec![vec![0.0; width]; fan_in],
            biases: vec![0.0; width],
            values: vec![0.0; width],
        };

        for j in 0..width {
            let source = if rng.gen_bool(0.5) { a } else { b };
            for (row, src_row) in layer.weights.iter_mut().zip(&source.weights) {
                row[j] = mutate_weight(src_row[j], fan_in, config, rng);
            }
            let bias_source = if rng.gen_bool(0.5) { a } else { b };
            layer.biases[j] = mutate_bias(bias_source.biases[j], config, rng);
        }
        child.layers.push(layer);
    }
    Ok(child)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn topology() -> Topology {
        Topology {
            inputs: 19,
            hidden_width: 7,
            hidden_layers: 2,
            outputs: BRAIN_OUTPUTS,
        }
    }

    #[test]
    fn test_crossover_preserves_shape() {
        let mut rng = ChaCha8Rng::seed_from_u64(456);
        let p1 = Brain::new_random_with_rng(&topology(), &mut rng);
        let p2 = Brain::new_random_with_rng(&topology(), &mut rng);

        let child = crossover_brain(&p1, &p2, &EvolutionConfig::default(), &mut rng).unwrap();
        assert_eq!(child.layer_shapes(), p1.layer_shapes());
        assert_eq!(child.input_count(), 19);
    }

    #[test]
    fn test_unmutated_child_genes_come_from_parents() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let p1 = Brain::new_random_with_rng(&topology(), &mut rng);
        let p2 = Brain::new_random_with_rng(&topology(), &mut rng);
        let config = EvolutionConfig {
            action_mutation_rate: 0.0,
            weight_mutation_amount: 0.0,
            bias_mutation_amount: 0.0,
            ..Default::default()
        };

        let child = crossover_brain(&p1, &p2, &config, &mut rng).unwrap();
        for (l, layer) in child.layers.iter().enumerate().skip(1) {
            for (j, &b) in layer.biases.iter().enumerate() {
                assert!(b == p1.layers[l].biases[j] || b == p2.layers[l].biases[j]);
            }
            let width = layer.biases.len();
            for j in 0..width {
                let column: Vec<f32> = layer.weights.iter().map(|r| r[j]).collect();
                let from_p1: Vec<f32> = p1.layers[l].weights.iter().map(|r| r[j]).collect();
                let from_p2: Vec<f32> = p2.layers[l].weights.iter().map(|r| r[j]).collect();
                assert!(column == from_p1 || column == from_p2);
            }
        }
    }

    #[test]
    fn test_mismatched_parents_rejected() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let p1 = Brain::new_random_with_rng(&topology(), &mut rng);
        let p2 = Brain::new_random_with_rng(
            &Topology {
                hidden_width: 3,
                ..topology()
            },
            &mut rng,
        );
        assert!(crossover_brain(&p1, &p2, &EvolutionConfig::default(), &mut rng).is_err());
    }
}
