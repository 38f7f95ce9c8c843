use super::genome::{Genome, NeuralGenome};
use super::geometry::Position;
use rkyv::{Archive, Deserialize as RkyvDeserialize, Serialize as RkyvSerialize};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Role of a critter. Drives sensing, action choice and interactions.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Archive,
    RkyvSerialize,
    RkyvDeserialize,
)]
#[archive(check_bytes)]
#[archive_attr(derive(Debug, PartialEq, Eq, Hash))]
pub enum EntityKind {
    /// Non-neural mover driven by a weighted gene table.
    Bouncer,
    /// Neural mover that senses occupancy without telling occupants apart.
    Thinker,
    /// Neural mover that distinguishes obstacles, boundaries and roles.
    Interactor,
    /// Interactor that kills adjacent prey.
    Predator,
    /// Interactor hunted by predators.
    Prey,
}

impl EntityKind {
    pub const ALL: [EntityKind; 5] = [
        EntityKind::Bouncer,
        EntityKind::Thinker,
        EntityKind::Interactor,
        EntityKind::Predator,
        EntityKind::Prey,
    ];

    #[must_use]
    pub fn is_neural(self) -> bool {
        !matches!(self, EntityKind::Bouncer)
    }

    /// Roles that sense type-tagged occupants.
    #[must_use]
    pub fn discriminates(self) -> bool {
        matches!(
            self,
            EntityKind::Interactor | EntityKind::Predator | EntityKind::Prey
        )
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            EntityKind::Bouncer => "Bouncer",
            EntityKind::Thinker => "Thinker",
            EntityKind::Interactor => "Interactor",
            EntityKind::Predator => "Predator",
            EntityKind::Prey => "Prey",
        }
    }

    /// Marker handed to the drawing layer.
    #[must_use]
    pub fn appearance(self) -> Appearance {
        match self {
            EntityKind::Bouncer => Appearance::new(120, 120, 200, 'o'),
            EntityKind::Thinker => Appearance::new(100, 200, 100, '●'),
            EntityKind::Interactor => Appearance::new(220, 200, 60, '◆'),
            EntityKind::Predator => Appearance::new(220, 40, 40, '▲'),
            EntityKind::Prey => Appearance::new(60, 120, 230, '●'),
        }
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Visual tag of an entity.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    Archive,
    RkyvSerialize,
    RkyvDeserialize,
)]
#[archive(check_bytes)]
pub struct Appearance {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub symbol: char,
}

impl Appearance {
    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8, symbol: char) -> Self {
        Self { r, g, b, symbol }
    }
}

/// Unique identification of an entity and its parents.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Archive, RkyvSerialize, RkyvDeserialize)]
#[archive(check_bytes)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    pub id: Uuid,
    #[serde(default)]
    pub parent_ids: Vec<Uuid>,
}

/// Role-specific mutable state. Never inherited.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    Archive,
    RkyvSerialize,
    RkyvDeserialize,
)]
#[archive(check_bytes)]
#[serde(rename_all = "camelCase")]
pub struct RoleState {
    pub kill_count: u32,
    pub digestion_counter: u32,
}

/// A critter: position, genome, role and per-life counters.
#[derive(Clone, Debug, Serialize, Deserialize, Archive, RkyvSerialize, RkyvDeserialize)]
#[archive(check_bytes)]
#[serde(rename_all = "camelCase")]
pub struct Entity {
    pub identity: Identity,
    pub kind: EntityKind,
    pub position: Position,
    pub genome: Genome,
    pub step_count: u64,
    pub role_state: RoleState,
}

impl Entity {
    #[must_use]
    pub fn neural(&self) -> Option<&NeuralGenome> {
        self.genome.as_neural()
    }

    #[must_use]
    pub fn kill_count(&self) -> u32 {
        self.role_state.kill_count
    }
}

/// Binary archive of a whole population between generations.
#[derive(Clone, Debug, Serialize, Deserialize, Archive, RkyvSerialize, RkyvDeserialize)]
#[archive(check_bytes)]
pub struct PopulationArchive {
    pub generation: u64,
    pub timestamp: String,
    pub entities: Vec<Entity>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_roles() {
        assert!(!EntityKind::Bouncer.is_neural());
        assert!(EntityKind::Thinker.is_neural());
        assert!(!EntityKind::Thinker.discriminates());
        assert!(EntityKind::Predator.discriminates());
        assert!(EntityKind::Prey.discriminates());
    }

    #[test]
    fn test_kind_display_matches_label() {
        for kind in EntityKind::ALL {
            assert_eq!(kind.to_string(), kind.label());
        }
    }
}
