//! Arena owning every entity of the current generation.
//!
//! The world grid stores [`EntityId`]s only; lookups always go through the
//! arena. Killed entities keep their slot (so ids stay stable) but leave the
//! active list immediately.

use critters_data::{Entity, EntityKind};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Index of an entity inside the current generation's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(pub u32);

impl EntityId {
    #[inline]
    #[must_use]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Default)]
pub struct Population {
    entities: Vec<Entity>,
    alive: Vec<bool>,
    active: Vec<EntityId>,
}

impl Population {
    #[must_use]
    pub fn new(entities: Vec<Entity>) -> Self {
        let count = entities.len();
        Self {
            entities,
            alive: vec![true; count],
            active: (0..count as u32).map(EntityId).collect(),
        }
    }

    /// Total slots, dead entities included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    #[must_use]
    pub fn alive_count(&self) -> usize {
        self.active.len()
    }

    #[must_use]
    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(id.index())
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.get_mut(id.index())
    }

    #[must_use]
    pub fn is_alive(&self, id: EntityId) -> bool {
        self.alive.get(id.index()).copied().unwrap_or(false)
    }

    /// Living entities in processing order.
    #[must_use]
    pub fn active(&self) -> &[EntityId] {
        &self.active
    }

    /// Marks an entity dead and drops it from the active list.
    /// Returns `false` if it was already dead or unknown.
    pub fn kill(&mut self, id: EntityId) -> bool {
        match self.alive.get_mut(id.index()) {
            Some(flag) if *flag => {
                *flag = false;
                self.active.retain(|&other| other != id);
                true
            }
            _ => false,
        }
    }

    pub fn iter_alive(&self) -> impl Iterator<Item = (EntityId, &Entity)> {
        self.active
            .iter()
            .filter_map(move |&id| self.get(id).map(|e| (id, e)))
    }

    /// Every slot, including entities killed this generation.
    #[must_use]
    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    /// Living entities, consuming the arena.
    #[must_use]
    pub fn into_alive(self) -> Vec<Entity> {
        let alive = self.alive;
        self.entities
            .into_iter()
            .zip(alive)
            .filter_map(|(e, live)| live.then_some(e))
            .collect()
    }

    /// Living entities per role.
    #[must_use]
    pub fn count_by_kind(&self) -> BTreeMap<EntityKind, usize> {
        let mut counts = BTreeMap::new();
        for (_, entity) in self.iter_alive() {
            *counts.entry(entity.kind).or_insert(0) += 1;
        }
        counts
    }
}
