//! Serializable picture of a population between ticks.
//!
//! Activations are never stored. On restore every controller is rebuilt from
//! the saved options and the stored parameter arrays are laid over it.

use crate::brain::BrainLogic;
use crate::config::AppConfig;
use crate::error::{CoreError, Result};
use crate::genetics::new_identity;
use crate::senses;
use critters_data::{
    Brain, Entity, EntityKind, Genome, Identity, NeuralGenome, Position, RoleState, GENE_COUNT,
};
use rand::Rng;
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct EntitySnapshot {
    pub role: EntityKind,
    pub position: Position,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identity: Option<Identity>,
    pub genome: Genome,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct SimulationSnapshot {
    pub options: AppConfig,
    pub generation: u64,
    /// RFC 3339.
    pub timestamp: String,
    pub entities: Vec<EntitySnapshot>,
}

impl SimulationSnapshot {
    pub fn capture<'a>(
        options: &AppConfig,
        generation: u64,
        entities: impl IntoIterator<Item = &'a Entity>,
    ) -> Self {
        Self {
            options: options.clone(),
            generation,
            timestamp: chrono::Utc::now().to_rfc3339(),
            entities: entities
                .into_iter()
                .map(|e| EntitySnapshot {
                    role: e.kind,
                    position: e.position,
                    identity: Some(e.identity.clone()),
                    genome: e.genome.clone(),
                })
                .collect(),
        }
    }

    /// Rebuilds executable entities. Missing identities get fresh ids.
    pub fn restore<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<Vec<Entity>> {
        self.entities
            .iter()
            .map(|snap| -> Result<Entity> {
                Ok(Entity {
                    identity: match &snap.identity {
                        Some(identity) => identity.clone(),
                        None => new_identity(&[], rng),
                    },
                    kind: snap.role,
                    position: snap.position,
                    genome: rehydrate_genome(snap.role, &snap.genome, &self.options)?,
                    step_count: 0,
                    role_state: RoleState::default(),
                })
            })
            .collect()
    }
}

/// Turns a stored genome back into one the engine can run.
pub fn rehydrate_genome(kind: EntityKind, genome: &Genome, config: &AppConfig) -> Result<Genome> {
    match (config.topology_for(kind), genome) {
        (Some(topology), Genome::Neural(saved)) => {
            let brain = Brain::overlay_saved(&topology, &saved.brain)?;
            let (radius, resolution) = (config.senses.radius, config.senses.angular_resolution);
            let sensory_inputs = if saved.sensory_inputs.is_empty() {
                senses::build_sensory_inputs(radius, resolution)
            } else if let Some(bad) = saved
                .sensory_inputs
                .iter()
                .find(|probe| !senses::probe_fits(probe, radius, resolution))
            {
                return Err(CoreError::GenomeMismatch {
                    kind,
                    reason: format!(
                        "probe {:?} does not fit radius {} with {} buckets",
                        bad, radius, resolution
                    ),
                });
            } else {
                saved.sensory_inputs.clone()
            };
            Ok(Genome::Neural(NeuralGenome {
                brain,
                sensory_inputs,
                internal_params: saved.internal_params,
            }))
        }
        (None, Genome::Table(table)) if table.genes.len() == GENE_COUNT => {
            Ok(Genome::Table(table.clone()))
        }
        (None, Genome::Table(table)) => Err(CoreError::GenomeMismatch {
            kind,
            reason: format!("{} genes, expected {}", table.genes.len(), GENE_COUNT),
        }),
        (Some(_), Genome::Table(_)) => Err(CoreError::GenomeMismatch {
            kind,
            reason: "gene table where a controller is expected".to_string(),
        }),
        (None, Genome::Neural(_)) => Err(CoreError::GenomeMismatch {
            kind,
            reason: "controller where a gene table is expected".to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::genetics::random_entity;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_json_restore_keeps_parameters() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let config = AppConfig::default();
        let entities = vec![
            random_entity(EntityKind::Predator, Position::new(3, 4), &config, &mut rng),
            random_entity(EntityKind::Bouncer, Position::new(5, 6), &config, &mut rng),
        ];

        let snapshot = SimulationSnapshot::capture(&config, 7, &entities);
        let json = serde_json::to_string(&snapshot).unwrap();
        let parsed: SimulationSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.generation, 7);

        let restored = parsed.restore(&mut rng).unwrap();
        assert_eq!(restored.len(), 2);
        assert_eq!(restored[0].identity, entities[0].identity);
        assert!(restored[0]
            .neural()
            .unwrap()
            .brain
            .same_parameters(&entities[0].neural().unwrap().brain));
        assert_eq!(restored[1].genome.as_table(), entities[1].genome.as_table());
    }

    #[test]
    fn test_shape_disagreement_fails() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let config = AppConfig::default();
        let mut entity = random_entity(EntityKind::Prey, Position::new(1, 1), &config, &mut rng);
        if let Some(g) = entity.genome.as_neural_mut() {
            g.brain.layers[1].weights.pop();
        }
        let err = rehydrate_genome(EntityKind::Prey, &entity.genome, &config).unwrap_err();
        assert!(matches!(err, CoreError::ShapeMismatch { layer: 1, .. }));
    }

    #[test]
    fn test_probes_outside_layout_fail() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let config = AppConfig::default();
        let resolution = config.senses.angular_resolution;
        let entity = random_entity(EntityKind::Prey, Position::new(1, 1), &config, &mut rng);
        assert!(rehydrate_genome(EntityKind::Prey, &entity.genome, &config).is_ok());

        let mut bad_bucket = entity.genome.clone();
        if let Some(g) = bad_bucket.as_neural_mut() {
            g.sensory_inputs[0].bucket = resolution as u16;
        }
        let err = rehydrate_genome(EntityKind::Prey, &bad_bucket, &config).unwrap_err();
        assert!(matches!(err, CoreError::GenomeMismatch { .. }));

        let mut too_far = entity.genome.clone();
        if let Some(g) = too_far.as_neural_mut() {
            let far = critters_data::Offset::new(i32::from(config.senses.radius) + 1, 0);
            g.sensory_inputs[0] = critters_data::SensoryInput {
                offset: far,
                bucket: senses::angular_bucket(far, resolution),
                magnitude: senses::magnitude(far),
            };
        }
        let err = rehydrate_genome(EntityKind::Prey, &too_far, &config).unwrap_err();
        assert!(matches!(err, CoreError::GenomeMismatch { .. }));
    }

    #[test]
    fn test_wrong_variant_for_role() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let config = AppConfig::default();
        let bouncer = random_entity(EntityKind::Bouncer, Position::new(1, 1), &config, &mut rng);
        let err = rehydrate_genome(EntityKind::Prey, &bouncer.genome, &config).unwrap_err();
        assert!(matches!(err, CoreError::GenomeMismatch { .. }));
    }
}
