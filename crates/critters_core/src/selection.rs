//! Replaceable rules deciding which entities of a finished generation become
//! parents.

use crate::config::{RectConfig, SelectionPolicy};
use critters_data::{Entity, EntityKind};

pub trait SelectionStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    /// Filters the living entities of a finished generation.
    fn select(&self, candidates: Vec<Entity>) -> Vec<Entity>;
}

/// Predators that killed at least once, best half by kills; every living
/// prey. Other roles pass through.
#[derive(Debug, Clone, Copy, Default)]
pub struct KillRanking;

impl SelectionStrategy for KillRanking {
    fn name(&self) -> &'static str {
        "kill-ranking"
    }

    fn select(&self, candidates: Vec<Entity>) -> Vec<Entity> {
        let (mut predators, others): (Vec<Entity>, Vec<Entity>) = candidates
            .into_iter()
            .partition(|e| e.kind == EntityKind::Predator);

        predators.retain(|p| p.kill_count() > 0);
        predators.sort_by(|a, b| b.kill_count().cmp(&a.kill_count()));
        let keep = predators.len() - predators.len() / 2;
        predators.truncate(keep);

        predators.extend(others);
        predators
    }
}

/// Entities standing inside any of the regions survive.
#[derive(Debug, Clone, Default)]
pub struct RegionFilter {
    pub regions: Vec<RectConfig>,
}

impl RegionFilter {
    #[must_use]
    pub fn new(regions: Vec<RectConfig>) -> Self {
        Self { regions }
    }
}

impl SelectionStrategy for RegionFilter {
    fn name(&self) -> &'static str {
        "regions"
    }

    fn select(&self, candidates: Vec<Entity>) -> Vec<Entity> {
        candidates
            .into_iter()
            .filter(|e| {
                self.regions
                    .iter()
                    .any(|r| r.contains(e.position.x, e.position.y))
            })
            .collect()
    }
}

#[must_use]
pub fn strategy_for(policy: &SelectionPolicy) -> Box<dyn SelectionStrategy> {
    match policy {
        SelectionPolicy::KillRanking => Box::new(KillRanking),
        SelectionPolicy::Regions { regions } => Box::new(RegionFilter::new(regions.clone())),
    }
}
