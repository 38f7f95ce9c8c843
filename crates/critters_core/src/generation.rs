//! Selection and reproduction between generations.

use crate::config::AppConfig;
use crate::error::{CoreError, Result};
use crate::genetics::crossover_entities;
use crate::population::Population;
use crate::selection::SelectionStrategy;
use critters_data::{Entity, EntityKind};
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::BTreeMap;

/// Smallest pool that can still pair up.
pub const MIN_PARENTS: usize = 2;

/// Living entities the strategy keeps as parents.
#[must_use]
pub fn select_survivors(population: &Population, strategy: &dyn SelectionStrategy) -> Vec<Entity> {
    let alive = population.iter_alive().map(|(_, e)| e.clone()).collect();
    strategy.select(alive)
}

/// Breeds the next generation, one child per shuffled pair, in full passes
/// over each role's pool until its target is met.
///
/// Refuses before pairing anything when the survivor list, or any role with
/// a positive target, holds fewer than [`MIN_PARENTS`] entities.
pub fn reproduce<R: Rng + ?Sized>(
    survivors: Vec<Entity>,
    targets: &BTreeMap<EntityKind, usize>,
    config: &AppConfig,
    rng: &mut R,
) -> Result<Vec<Entity>> {
    if survivors.len() < MIN_PARENTS {
        return Err(CoreError::PopulationCollapse {
            survivors: survivors.len(),
        });
    }

    let mut pools: BTreeMap<EntityKind, Vec<Entity>> = BTreeMap::new();
    for entity in survivors {
        pools.entry(entity.kind).or_default().push(entity);
    }

    for (&kind, &target) in targets {
        let available = pools.get(&kind).map_or(0, Vec::len);
        if target > 0 && available < MIN_PARENTS {
            return Err(CoreError::Extinction {
                kind,
                survivors: available,
            });
        }
    }

    let mut next = Vec::with_capacity(targets.values().sum());
    for (&kind, &target) in targets {
        if target == 0 {
            continue;
        }
        let Some(pool) = pools.get_mut(&kind) else {
            continue;
        };
        let mut children = Vec::with_capacity(target + pool.len() / 2);
        while children.len() < target {
            pool.shuffle(rng);
            for pair in pool.chunks_exact(2) {
                children.push(crossover_entities(&pair[0], &pair[1], config, rng)?);
            }
        }
        children.truncate(target);
        next.extend(children);
    }
    Ok(next)
}
