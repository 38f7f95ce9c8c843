//! Genome construction, crossover and mutation.
//!
//! Children are always built on a fresh scaffold for their role, so the
//! current configuration decides sensor geometry and network shape. Parents
//! only contribute parameter values.

use crate::brain::{topology, BrainLogic};
use crate::config::{AppConfig, EvolutionConfig};
use crate::error::{CoreError, Result};
use crate::senses;
use critters_data::{
    Brain, Entity, EntityKind, Gene, GeneTable, Genome, Identity, InternalParams, NeuralGenome,
    Oscillator, Position, RoleState, GENE_COUNT,
};
use rand::Rng;
use uuid::Uuid;

pub use crate::brain::crossover::crossover_brain;
pub use crate::brain::mutation::{mutate_bias, mutate_weight};

/// Highest bouncer gene action (north-west).
pub const MAX_ACTION: u8 = 8;

pub fn new_identity<R: Rng + ?Sized>(parents: &[&Entity], rng: &mut R) -> Identity {
    Identity {
        id: Uuid::from_u128(rng.gen()),
        parent_ids: parents.iter().map(|p| p.identity.id).collect(),
    }
}

pub fn random_gene<R: Rng + ?Sized>(rng: &mut R) -> Gene {
    Gene {
        action: rng.gen_range(0..=MAX_ACTION),
        weight: rng.gen::<f32>(),
    }
}

#[must_use]
pub fn random_table<R: Rng + ?Sized>(rng: &mut R) -> GeneTable {
    GeneTable {
        genes: (0..GENE_COUNT).map(|_| random_gene(rng)).collect(),
    }
}

pub fn random_internal_params<R: Rng + ?Sized>(
    config: &EvolutionConfig,
    rng: &mut R,
) -> InternalParams {
    InternalParams {
        sense_x: rng.gen_bool(0.5),
        sense_y: rng.gen_bool(0.5),
        oscillator: Oscillator {
            on: rng.gen_bool(0.5),
            period: rng.gen_range(config.oscillator_period_min..=config.oscillator_period_max),
        },
    }
}

/// A fresh random genome of the right variant and shape for `kind`.
pub fn random_genome_for<R: Rng + ?Sized>(
    kind: EntityKind,
    config: &AppConfig,
    rng: &mut R,
) -> Genome {
    match config.topology_for(kind) {
        None => Genome::Table(random_table(rng)),
        Some(topology) => Genome::Neural(NeuralGenome {
            brain: Brain::new_random_with_rng(&topology, rng),
            sensory_inputs: senses::build_sensory_inputs(
                config.senses.radius,
                config.senses.angular_resolution,
            ),
            internal_params: random_internal_params(&config.evolution, rng),
        }),
    }
}

pub fn random_entity<R: Rng + ?Sized>(
    kind: EntityKind,
    position: Position,
    config: &AppConfig,
    rng: &mut R,
) -> Entity {
    Entity {
        identity: new_identity(&[], rng),
        kind,
        position,
        genome: random_genome_for(kind, config, rng),
        step_count: 0,
        role_state: RoleState::default(),
    }
}

/// Bouncer gene after mutation: weight walks by a fixed step (clamped to
/// `[0, 1]`), action is rerolled with probability `action_mutation_rate`.
pub fn mutate_gene<R: Rng + ?Sized>(gene: Gene, config: &EvolutionConfig, rng: &mut R) -> Gene {
    let step = if rng.gen_bool(0.5) {
        config.weight_mutation_amount
    } else {
        -config.weight_mutation_amount
    };
    let action = if rng.gen::<f32>() < config.action_mutation_rate {
        rng.gen_range(0..=MAX_ACTION)
    } else {
        gene.action
    };
    Gene {
        action,
        weight: (gene.weight + step).clamp(0.0, 1.0),
    }
}

pub fn crossover_table<R: Rng + ?Sized>(
    a: &GeneTable,
    b: &GeneTable,
    config: &EvolutionConfig,
    rng: &mut R,
) -> GeneTable {
    let genes = (0..GENE_COUNT)
        .map(|i| {
            let pick = if rng.gen_bool(0.5) { a } else { b };
            match pick.genes.get(i) {
                Some(&gene) => mutate_gene(gene, config, rng),
                None => random_gene(rng),
            }
        })
        .collect();
    GeneTable { genes }
}

/// Each internal field comes whole from one coin-flipped parent.
pub fn crossover_internal<R: Rng + ?Sized>(
    a: &InternalParams,
    b: &InternalParams,
    rng: &mut R,
) -> InternalParams {
    let mut pick = |x, y| if rng.gen_bool(0.5) { x } else { y };
    InternalParams {
        sense_x: pick(a.sense_x, b.sense_x),
        sense_y: pick(a.sense_y, b.sense_y),
        oscillator: Oscillator {
            on: pick(a.oscillator.on, b.oscillator.on),
            period: if rng.gen_bool(0.5) {
                a.oscillator.period
            } else {
                b.oscillator.period
            },
        },
    }
}

/// Child genome of two same-role parents.
pub fn crossover_genome<R: Rng + ?Sized>(
    kind: EntityKind,
    a: &Genome,
    b: &Genome,
    config: &AppConfig,
    rng: &mut R,
) -> Result<Genome> {
    let Some(topology) = config.topology_for(kind) else {
        return match (a, b) {
            (Genome::Table(ta), Genome::Table(tb)) => Ok(Genome::Table(crossover_table(
                ta,
                tb,
                &config.evolution,
                rng,
            ))),
            _ => Err(CoreError::GenomeMismatch {
                kind,
                reason: "expected two gene tables".to_string(),
            }),
        };
    };

    let (Genome::Neural(na), Genome::Neural(nb)) = (a, b) else {
        return Err(CoreError::GenomeMismatch {
            kind,
            reason: "expected two neural genomes".to_string(),
        });
    };

    let expected = topology::scaffold(&topology).layer_shapes();
    for parent in [&na.brain, &nb.brain] {
        if parent.layer_shapes() != expected {
            return Err(CoreError::shape_mismatch(
                0,
                &expected,
                parent.layer_shapes(),
            ));
        }
    }

    Ok(Genome::Neural(NeuralGenome {
        brain: crossover_brain(&na.brain, &nb.brain, &config.evolution, rng)?,
        sensory_inputs: senses::build_sensory_inputs(
            config.senses.radius,
            config.senses.angular_resolution,
        ),
        internal_params: crossover_internal(&na.internal_params, &nb.internal_params, rng),
    }))
}

/// One child of two parents. It starts on the first parent's cell with
/// fresh role state.
pub fn crossover_entities<R: Rng + ?Sized>(
    a: &Entity,
    b: &Entity,
    config: &AppConfig,
    rng: &mut R,
) -> Result<Entity> {
    let genome = crossover_genome(a.kind, &a.genome, &b.genome, config, rng)?;
    Ok(Entity {
        identity: new_identity(&[a, b], rng),
        kind: a.kind,
        position: a.position,
        genome,
        step_count: 0,
        role_state: RoleState::default(),
    })
}
