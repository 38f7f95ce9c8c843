pub mod macros;

use critters_lib::model::config::{AppConfig, IdlePolicy, PopulationConfig};
use critters_lib::model::genetics::random_entity;
use critters_lib::model::simulation::{Placement, Simulation};
use critters_lib::model::state::{Entity, EntityKind, Position};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Bias that drives an output neuron to full confidence.
#[allow(dead_code)]
pub const CONFIDENT: f32 = 10.0;

type ConfigMod = Box<dyn FnOnce(&mut AppConfig)>;

#[allow(dead_code)]
pub struct SimulationBuilder {
    config: AppConfig,
    entities: Vec<(EntityKind, Position, Option<usize>, u32)>,
    config_mods: Vec<ConfigMod>,
}

#[allow(dead_code)]
impl SimulationBuilder {
    /// An empty 20x20 world without obstacles.
    pub fn new() -> Self {
        let mut config = AppConfig::default();
        config.world.width = 20;
        config.world.height = 20;
        config.world.obstacles.clear();
        config.world.seed = Some(42);
        config.population = PopulationConfig {
            bouncers: 0,
            thinkers: 0,
            interactors: 0,
            predators: 0,
            prey: 0,
        };
        Self {
            config,
            entities: Vec::new(),
            config_mods: Vec::new(),
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.config.world.seed = Some(seed);
        self
    }

    pub fn with_config<F>(mut self, modifier: F) -> Self
    where
        F: FnOnce(&mut AppConfig) + 'static,
    {
        self.config_mods.push(Box::new(modifier));
        self
    }

    pub fn with_idle_policy(self, policy: IdlePolicy) -> Self {
        self.with_config(move |c| c.behavior.idle_policy = policy)
    }

    /// A random entity at `(x, y)`.
    pub fn with_entity(mut self, kind: EntityKind, x: i32, y: i32) -> Self {
        self.entities.push((kind, Position::new(x, y), None, 0));
        self
    }

    /// A neural entity whose controller always fires output `output`.
    pub fn with_forced(mut self, kind: EntityKind, x: i32, y: i32, output: usize) -> Self {
        self.entities.push((kind, Position::new(x, y), Some(output), 0));
        self
    }

    /// A neural entity whose controller never fires.
    pub fn with_idle(mut self, kind: EntityKind, x: i32, y: i32) -> Self {
        self.entities
            .push((kind, Position::new(x, y), Some(usize::MAX), 0));
        self
    }

    /// Sets the digestion counter of the most recently added entity.
    pub fn digesting(mut self, ticks: u32) -> Self {
        if let Some(last) = self.entities.last_mut() {
            last.3 = ticks;
        }
        self
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Places entities exactly where they were requested, in insertion
    /// order, so population index follows the builder calls.
    pub fn build(mut self) -> Simulation {
        for modifier in self.config_mods.drain(..) {
            modifier(&mut self.config);
        }
        let mut rng = ChaCha8Rng::seed_from_u64(self.config.world.seed.unwrap_or(0));
        let entities: Vec<Entity> = self
            .entities
            .iter()
            .map(|&(kind, position, forced, digestion)| {
                let mut entity = random_entity(kind, position, &self.config, &mut rng);
                if let Some(output) = forced {
                    force_output(&mut entity, output);
                }
                entity.role_state.digestion_counter = digestion;
                entity
            })
            .collect();
        Simulation::from_population(self.config, entities, Placement::Keep)
            .expect("Failed to create simulation in test builder")
    }
}

impl Default for SimulationBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Rewrites a controller so that only `output` clears the threshold.
/// An out-of-range `output` silences every output.
#[allow(dead_code)]
pub fn force_output(entity: &mut Entity, output: usize) {
    let Some(genome) = entity.genome.as_neural_mut() else {
        return;
    };
    let last = genome.brain.layers.len() - 1;
    for (index, layer) in genome.brain.layers.iter_mut().enumerate().skip(1) {
        for row in &mut layer.weights {
            row.iter_mut().for_each(|w| *w = 0.0);
        }
        for (j, bias) in layer.biases.iter_mut().enumerate() {
            *bias = match (index == last, j == output) {
                (false, _) => 0.0,
                (true, true) => CONFIDENT,
                (true, false) => -CONFIDENT,
            };
        }
    }
}

/// A config small enough to run whole generations quickly.
#[allow(dead_code)]
pub fn small_config(seed: u64) -> AppConfig {
    let mut config = AppConfig::default();
    config.world.width = 40;
    config.world.height = 40;
    config.world.obstacles.clear();
    config.world.seed = Some(seed);
    config.world.steps_per_generation = 30;
    config.population = PopulationConfig {
        bouncers: 6,
        thinkers: 6,
        interactors: 6,
        predators: 8,
        prey: 60,
    };
    config
}
