//! Configuration management for simulation parameters.
//!
//! Strongly-typed configuration structures that map to the `config.toml`
//! file. Every section has defaults, so a partial file only overrides what it
//! names.
//!
//! ## Example `config.toml`
//!
//! ```toml
//! [world]
//! width = 100
//! height = 100
//! seed = 42
//! steps_per_generation = 150
//!
//! [population]
//! predators = 50
//! prey = 450
//!
//! [evolution]
//! action_mutation_rate = 0.01
//! ```

use crate::brain::{Topology, BRAIN_OUTPUTS};
use crate::senses::{self, SensorLayout};
use critters_data::EntityKind;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Axis-aligned rectangle in grid cells.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct RectConfig {
    pub x: u16,
    pub y: u16,
    pub width: u16,
    pub height: u16,
}

impl RectConfig {
    #[must_use]
    pub const fn new(x: u16, y: u16, width: u16, height: u16) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Whether the cell `(x, y)` lies inside the rectangle.
    #[must_use]
    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= i32::from(self.x)
            && y >= i32::from(self.y)
            && x < i32::from(self.x) + i32::from(self.width)
            && y < i32::from(self.y) + i32::from(self.height)
    }
}

/// World dimensions, generation length and the default obstacle layout.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct WorldConfig {
    pub width: u16,
    pub height: u16,
    pub seed: Option<u64>,
    pub steps_per_generation: u64,
    /// Offspring start on their first parent's cell (falling back to a free
    /// cell on collision) instead of a random free cell.
    pub inherit_positions: bool,
    pub obstacles: Vec<RectConfig>,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            width: 100,
            height: 100,
            seed: None,
            steps_per_generation: 150,
            inherit_positions: false,
            obstacles: vec![
                RectConfig::new(33, 33, 33, 33),
                RectConfig::new(60, 20, 20, 20),
                RectConfig::new(20, 60, 20, 20),
            ],
        }
    }
}

/// Target head count per role for every generation.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct PopulationConfig {
    pub bouncers: usize,
    pub thinkers: usize,
    pub interactors: usize,
    pub predators: usize,
    pub prey: usize,
}

impl Default for PopulationConfig {
    fn default() -> Self {
        Self {
            bouncers: 0,
            thinkers: 0,
            interactors: 0,
            predators: 50,
            prey: 450,
        }
    }
}

impl PopulationConfig {
    #[must_use]
    pub fn target(&self, kind: EntityKind) -> usize {
        match kind {
            EntityKind::Bouncer => self.bouncers,
            EntityKind::Thinker => self.thinkers,
            EntityKind::Interactor => self.interactors,
            EntityKind::Predator => self.predators,
            EntityKind::Prey => self.prey,
        }
    }

    /// Roles with a positive target, in role order.
    #[must_use]
    pub fn targets(&self) -> BTreeMap<EntityKind, usize> {
        EntityKind::ALL
            .iter()
            .map(|&k| (k, self.target(k)))
            .filter(|&(_, n)| n > 0)
            .collect()
    }

    #[must_use]
    pub fn total(&self) -> usize {
        EntityKind::ALL.iter().map(|&k| self.target(k)).sum()
    }
}

/// Hidden-layer shape of every neural controller. The output layer is
/// always [`BRAIN_OUTPUTS`] wide.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct BrainConfig {
    pub hidden_width: usize,
    pub hidden_layers: usize,
}

impl Default for BrainConfig {
    fn default() -> Self {
        Self {
            hidden_width: 10,
            hidden_layers: 1,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct SensesConfig {
    /// Sensing radius in cells.
    pub radius: u16,
    /// Number of angular wedges per channel.
    pub angular_resolution: usize,
    pub thinker_layout: SensorLayout,
    /// Used by interactors, predators and prey.
    pub interactor_layout: SensorLayout,
}

impl Default for SensesConfig {
    fn default() -> Self {
        Self {
            radius: 2,
            angular_resolution: 8,
            thinker_layout: SensorLayout::undiscriminating(),
            interactor_layout: SensorLayout::interactor(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct EvolutionConfig {
    /// Chance that an inherited weight, bias or gene action is replaced outright.
    pub action_mutation_rate: f32,
    /// Random-walk step for weights, divided by `sqrt(fan-in)`.
    pub weight_mutation_amount: f32,
    /// Random-walk step for biases.
    pub bias_mutation_amount: f32,
    pub oscillator_period_min: u32,
    pub oscillator_period_max: u32,
}

impl Default for EvolutionConfig {
    fn default() -> Self {
        Self {
            action_mutation_rate: 0.01,
            weight_mutation_amount: 0.05,
            bias_mutation_amount: 0.02,
            oscillator_period_min: 2,
            oscillator_period_max: 20,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct PredationConfig {
    /// Ticks a predator must wait after a kill before it can kill again.
    pub digestion_delay: u32,
}

impl Default for PredationConfig {
    fn default() -> Self {
        Self { digestion_delay: 10 }
    }
}

/// What a neural critter does when no output neuron crosses the threshold.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IdlePolicy {
    /// Treat it as output 0 and attempt to move north.
    #[default]
    FirstOutput,
    /// Stay in place.
    Stay,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
#[serde(default)]
pub struct BehaviorConfig {
    pub idle_policy: IdlePolicy,
}

/// Which finished-generation entities become parents.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub enum SelectionPolicy {
    /// Successful predators ranked by kills (top half kept), all living prey.
    #[default]
    KillRanking,
    /// Entities standing inside any of the regions survive.
    Regions { regions: Vec<RectConfig> },
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
#[serde(default)]
pub struct SelectionConfig {
    pub policy: SelectionPolicy,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct AppConfig {
    pub world: WorldConfig,
    pub population: PopulationConfig,
    pub brain: BrainConfig,
    pub senses: SensesConfig,
    pub evolution: EvolutionConfig,
    pub predation: PredationConfig,
    pub behavior: BehaviorConfig,
    pub selection: SelectionConfig,
}

impl AppConfig {
    /// Sensor layout of a role, `None` for the non-neural bouncer.
    #[must_use]
    pub fn layout_for(&self, kind: EntityKind) -> Option<&SensorLayout> {
        match kind {
            EntityKind::Bouncer => None,
            EntityKind::Thinker => Some(&self.senses.thinker_layout),
            EntityKind::Interactor | EntityKind::Predator | EntityKind::Prey => {
                Some(&self.senses.interactor_layout)
            }
        }
    }

    /// Controller topology of a role, `None` for the non-neural bouncer.
    #[must_use]
    pub fn topology_for(&self, kind: EntityKind) -> Option<Topology> {
        self.layout_for(kind).map(|layout| Topology {
            inputs: senses::input_count(layout, self.senses.angular_resolution),
            hidden_width: self.brain.hidden_width,
            hidden_layers: self.brain.hidden_layers,
            outputs: BRAIN_OUTPUTS,
        })
    }

    /// Validates all configuration parameters.
    ///
    /// Returns `Ok(())` if all parameters are valid, or `Err` with a
    /// description of the first validation failure.
    pub fn validate(&self) -> anyhow::Result<()> {
        // World validation
        anyhow::ensure!(self.world.width > 0, "World width must be positive");
        anyhow::ensure!(self.world.width <= 1000, "World width too large (max 1000)");
        anyhow::ensure!(self.world.height > 0, "World height must be positive");
        anyhow::ensure!(
            self.world.height <= 1000,
            "World height too large (max 1000)"
        );
        anyhow::ensure!(
            self.world.steps_per_generation > 0,
            "Steps per generation must be positive"
        );
        for rect in &self.world.obstacles {
            anyhow::ensure!(
                u32::from(rect.x) + u32::from(rect.width) <= u32::from(self.world.width)
                    && u32::from(rect.y) + u32::from(rect.height) <= u32::from(self.world.height),
                "Obstacle {:?} extends past the world edge",
                rect
            );
        }

        // Population validation
        let cells = usize::from(self.world.width) * usize::from(self.world.height);
        anyhow::ensure!(
            self.population.total() <= cells,
            "Population of {} does not fit in {} cells",
            self.population.total(),
            cells
        );

        // Brain validation
        anyhow::ensure!(
            self.brain.hidden_width > 0 || self.brain.hidden_layers == 0,
            "Hidden width must be positive when hidden layers are used"
        );
        anyhow::ensure!(
            self.brain.hidden_layers <= 8,
            "Too many hidden layers (max 8)"
        );

        // Senses validation
        anyhow::ensure!(self.senses.radius > 0, "Sensing radius must be positive");
        anyhow::ensure!(
            self.senses.radius <= 16,
            "Sensing radius too large (max 16)"
        );
        anyhow::ensure!(
            (1..=64).contains(&self.senses.angular_resolution),
            "Angular resolution must be in [1, 64]"
        );
        for layout in [&self.senses.thinker_layout, &self.senses.interactor_layout] {
            layout.validate()?;
        }

        // Evolution validation
        anyhow::ensure!(
            (0.0..=1.0).contains(&self.evolution.action_mutation_rate),
            "Action mutation rate must be in [0.0, 1.0]"
        );
        anyhow::ensure!(
            self.evolution.weight_mutation_amount >= 0.0,
            "Weight mutation amount must be non-negative"
        );
        anyhow::ensure!(
            self.evolution.bias_mutation_amount >= 0.0,
            "Bias mutation amount must be non-negative"
        );
        anyhow::ensure!(
            self.evolution.oscillator_period_min >= 2,
            "Oscillator period must be at least 2"
        );
        anyhow::ensure!(
            self.evolution.oscillator_period_max >= self.evolution.oscillator_period_min,
            "Oscillator period range is empty"
        );

        Ok(())
    }

    /// Parses and validates configuration from TOML text.
    pub fn from_toml(content: &str) -> anyhow::Result<Self> {
        let config = toml::from_str::<Self>(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Digest of every parameter that influences simulation outcomes.
    #[must_use]
    pub fn fingerprint(&self) -> String {
        use sha2::{Digest, Sha256};
        let mut hasher = Sha256::new();
        hasher.update(format!("{:?}", self.world).as_bytes());
        hasher.update(format!("{:?}", self.population).as_bytes());
        hasher.update(format!("{:?}", self.brain).as_bytes());
        hasher.update(format!("{:?}", self.senses).as_bytes());
        hasher.update(format!("{:?}", self.evolution).as_bytes());
        hasher.update(format!("{:?}", self.predation).as_bytes());
        hasher.update(format!("{:?}", self.behavior).as_bytes());
        hasher.update(format!("{:?}", self.selection).as_bytes());
        hex::encode(hasher.finalize())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::senses::SensorChannel;

    #[test]
    fn test_default_config_validates() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_world_width() {
        let config = AppConfig {
            world: WorldConfig {
                width: 0,
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_obstacle_outside_world() {
        let config = AppConfig {
            world: WorldConfig {
                width: 10,
                height: 10,
                obstacles: vec![RectConfig::new(5, 5, 6, 1)],
                ..Default::default()
            },
            population: PopulationConfig {
                predators: 2,
                prey: 2,
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_overcrowded_population() {
        let config = AppConfig {
            world: WorldConfig {
                width: 4,
                height: 4,
                obstacles: Vec::new(),
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_mutation_rate() {
        let config = AppConfig {
            evolution: EvolutionConfig {
                action_mutation_rate: 1.5,
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_oscillator_period_below_two() {
        let config = AppConfig {
            evolution: EvolutionConfig {
                oscillator_period_min: 1,
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_duplicate_channel_rejected() {
        let mut config = AppConfig::default();
        config.senses.interactor_layout.channels =
            vec![SensorChannel::Prey, SensorChannel::Prey];
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = AppConfig::from_toml(
            r#"
            [world]
            seed = 7
            [population]
            predators = 4
            prey = 12
            "#,
        )
        .unwrap();
        assert_eq!(config.world.seed, Some(7));
        assert_eq!(config.world.width, 100);
        assert_eq!(config.population.target(EntityKind::Prey), 12);
        assert_eq!(config.brain, BrainConfig::default());
    }

    #[test]
    fn test_toml_roundtrip() {
        let config = AppConfig::default();
        let text = toml::to_string(&config).unwrap();
        let parsed = AppConfig::from_toml(&text).unwrap();
        assert_eq!(parsed.fingerprint(), config.fingerprint());
    }

    #[test]
    fn test_topology_per_role() {
        let config = AppConfig::default();
        assert!(config.topology_for(EntityKind::Bouncer).is_none());
        let thinker = config.topology_for(EntityKind::Thinker).unwrap();
        assert_eq!(thinker.inputs, 8 + 3);
        let predator = config.topology_for(EntityKind::Predator).unwrap();
        assert_eq!(predator.inputs, 8 * 5 + 3);
        assert_eq!(predator.outputs, BRAIN_OUTPUTS);
    }

    #[test]
    fn test_targets_skip_empty_roles() {
        let targets = PopulationConfig::default().targets();
        assert_eq!(targets.len(), 2);
        assert_eq!(targets[&EntityKind::Predator], 50);
    }

    #[test]
    fn test_fingerprint_consistency() {
        let config1 = AppConfig::default();
        let mut config2 = AppConfig::default();
        assert_eq!(config1.fingerprint(), config2.fingerprint());
        config2.predation.digestion_delay += 1;
        assert_ne!(config1.fingerprint(), config2.fingerprint());
    }
}
