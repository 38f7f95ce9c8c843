use super::topology::{random_bias, random_weight};
use crate::config::EvolutionConfig;
use rand::Rng;

/// Inherited weight after mutation: replaced outright with probability
/// `action_mutation_rate`, otherwise nudged by a fixed step of random sign.
pub fn mutate_weight<R: Rng + ?Sized>(
    weight: f32,
    fan_in: usize,
    config: &EvolutionConfig,
    rng: &mut R,
) -> f32 {
    if rng.gen::<f32>() < config.action_mutation_rate {
        return random_weight(fan_in, rng);
    }
    let step = config.weight_mutation_amount / (fan_in.max(1) as f32).sqrt();
    if rng.gen_bool(0.5) {
        weight + step
    } else {
        weight - step
    }
}

pub fn mutate_bias<R: Rng + ?Sized>(bias: f32, config: &EvolutionConfig, rng: &mut R) -> f32 {
    if rng.gen::<f32>() < config.action_mutation_rate {
        return random_bias(rng);
    }
    if rng.gen_bool(0.5) {
        bias + config.bias_mutation_amount
    } else {
        bias - config.bias_mutation_amount
    }
}
