//! The generation manager.
//!
//! [`Simulation`] owns the world grid, the population arena and the random
//! generator for the duration of a generation. A tick driver calls
//! [`Simulation::step`] per frame or [`Simulation::advance`] per generation;
//! both are synchronous.

use crate::behavior::{step_entity, StepOutcome};
use crate::config::AppConfig;
use crate::error::{CoreError, Result};
use crate::generation;
use crate::genetics::random_entity;
use crate::grid::{Cell, ObstacleMask, Occupant, WorldGrid};
use crate::metrics::Metrics;
use crate::population::{EntityId, Population};
use crate::selection::{strategy_for, SelectionStrategy};
use crate::snapshot::SimulationSnapshot;
use critters_data::{Appearance, Entity, EntityKind, Position};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Instant;

/// Everything a core call may touch, passed explicitly.
pub struct SimulationContext {
    pub config: AppConfig,
    pub grid: WorldGrid,
    pub mask: ObstacleMask,
    pub rng: ChaCha8Rng,
}

impl SimulationContext {
    /// Validates `config`, rasterizes its obstacles and seeds the generator.
    pub fn new(config: AppConfig) -> Result<Self> {
        let mask = ObstacleMask::from_rects(
            config.world.width,
            config.world.height,
            &config.world.obstacles,
        );
        Self::with_mask(config, mask)
    }

    /// Uses an externally drawn occupancy mask instead of the configured rectangles.
    pub fn with_mask(config: AppConfig, mask: ObstacleMask) -> Result<Self> {
        config.validate()?;
        let grid = WorldGrid::from_mask(config.world.width, config.world.height, &mask)?;
        let rng = match config.world.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        Ok(Self {
            config,
            grid,
            mask,
            rng,
        })
    }
}

/// How entities entering a generation find their cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// A uniformly random free cell.
    Scatter,
    /// The entity's recorded position, or a random free cell if it is taken.
    Keep,
}

/// Render hook and kill notifications, drained by the caller.
#[derive(Debug, Clone, PartialEq)]
pub enum SimEvent {
    Placed {
        id: EntityId,
        position: Position,
        appearance: Appearance,
    },
    Moved {
        id: EntityId,
        from: Position,
        to: Position,
        appearance: Appearance,
    },
    Killed {
        predator: EntityId,
        prey: EntityId,
        at: Position,
    },
}

/// Inspection result with the occupying entity resolved.
#[derive(Debug, Clone, Copy)]
pub enum OccupantRef<'a> {
    OutOfBounds,
    Empty,
    Obstacle,
    Entity(EntityId, &'a Entity),
}

/// Status of the current generation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationSummary {
    pub generation: u64,
    pub ticks: u64,
    /// Head count per role when the generation began.
    pub population: BTreeMap<EntityKind, usize>,
    /// Living entities per role right now.
    pub alive: BTreeMap<EntityKind, usize>,
    /// Entities the selection rule would keep, per role.
    pub survivors: BTreeMap<EntityKind, usize>,
    pub kills: u32,
}

impl GenerationSummary {
    #[must_use]
    pub fn survivor_total(&self) -> usize {
        self.survivors.values().sum()
    }
}

pub struct Simulation {
    pub ctx: SimulationContext,
    pub population: Population,
    pub generation: u64,
    pub tick: u64,
    pub metrics: Metrics,
    selection: Box<dyn SelectionStrategy>,
    events: Vec<SimEvent>,
    record_events: bool,
    kills: u32,
    started_with: BTreeMap<EntityKind, usize>,
}

impl Simulation {
    /// A first generation of random genomes at the configured head counts.
    pub fn new(config: AppConfig) -> Result<Self> {
        let mut ctx = SimulationContext::new(config)?;
        let mut entities = Vec::with_capacity(ctx.config.population.total());
        for (kind, count) in ctx.config.population.targets() {
            for _ in 0..count {
                entities.push(random_entity(
                    kind,
                    Position::default(),
                    &ctx.config,
                    &mut ctx.rng,
                ));
            }
        }
        Self::from_context(ctx, entities, Placement::Scatter)
    }

    /// Starts a generation from an existing population.
    pub fn from_population(
        config: AppConfig,
        entities: Vec<Entity>,
        placement: Placement,
    ) -> Result<Self> {
        let ctx = SimulationContext::new(config)?;
        Self::from_context(ctx, entities, placement)
    }

    pub fn from_context(
        ctx: SimulationContext,
        entities: Vec<Entity>,
        placement: Placement,
    ) -> Result<Self> {
        let selection = strategy_for(&ctx.config.selection.policy);
        let mut sim = Self {
            ctx,
            population: Population::default(),
            generation: 0,
            tick: 0,
            metrics: Metrics::new(),
            selection,
            events: Vec::new(),
            record_events: true,
            kills: 0,
            started_with: BTreeMap::new(),
        };
        sim.begin_generation(entities, placement)?;
        Ok(sim)
    }

    /// Replaces the selection rule.
    #[must_use]
    pub fn with_selection(mut self, strategy: Box<dyn SelectionStrategy>) -> Self {
        self.selection = strategy;
        self
    }

    /// Turns the event queue on or off. Headless runs that never drain it
    /// should switch it off.
    pub fn set_event_recording(&mut self, on: bool) {
        self.record_events = on;
        if !on {
            self.events.clear();
        }
    }

    #[must_use]
    pub fn config(&self) -> &AppConfig {
        &self.ctx.config
    }

    #[must_use]
    pub fn selection(&self) -> &dyn SelectionStrategy {
        self.selection.as_ref()
    }

    /// Rebuilds the grid from the obstacle mask and places `entities` on it.
    pub fn begin_generation(&mut self, entities: Vec<Entity>, placement: Placement) -> Result<()> {
        let (width, height) = (self.ctx.config.world.width, self.ctx.config.world.height);
        self.ctx.grid = WorldGrid::from_mask(width, height, &self.ctx.mask)?;
        self.tick = 0;
        self.kills = 0;

        let mut placed = Vec::with_capacity(entities.len());
        for (index, mut entity) in entities.into_iter().enumerate() {
            let id = EntityId(index as u32);
            let wanted = match placement {
                Placement::Keep => Some(entity.position),
                Placement::Scatter => None,
            };
            let position = match wanted.filter(|&p| self.ctx.grid.get(p) == Some(Cell::Empty)) {
                Some(p) => p,
                None => {
                    let p = self
                        .ctx
                        .grid
                        .random_free_cell(&mut self.ctx.rng)
                        .ok_or(CoreError::NoFreeCell { kind: entity.kind })?;
                    if let Some(w) = wanted {
                        tracing::debug!(
                            kind = %entity.kind,
                            wanted_x = w.x,
                            wanted_y = w.y,
                            x = p.x,
                            y = p.y,
                            "Placement collided, using a free cell"
                        );
                        self.metrics.increment_counter("fallback_placement");
                    }
                    p
                }
            };
            entity.position = position;
            self.ctx.grid.set(
                position,
                Cell::Entity {
                    id,
                    kind: entity.kind,
                },
            );
            if self.record_events {
                self.events.push(SimEvent::Placed {
                    id,
                    position,
                    appearance: entity.kind.appearance(),
                });
            }
            placed.push(entity);
        }

        self.population = Population::new(placed);
        self.started_with = self.population.count_by_kind();
        Ok(())
    }

    /// Advances every living entity by one tick, in population order.
    pub fn step(&mut self) -> Result<()> {
        let started = Instant::now();
        let order = self.population.active().to_vec();
        for id in order {
            if !self.population.is_alive(id) {
                continue;
            }
            let outcome = step_entity(&mut self.ctx, &mut self.population, id)?;
            match outcome {
                StepOutcome::Stayed => {}
                StepOutcome::Moved { from, to } => {
                    if self.record_events {
                        let appearance = self
                            .population
                            .get(id)
                            .map_or(Appearance::new(0, 0, 0, ' '), |e| e.kind.appearance());
                        self.events.push(SimEvent::Moved {
                            id,
                            from,
                            to,
                            appearance,
                        });
                    }
                }
                StepOutcome::Killed { prey, at } => {
                    self.kills += 1;
                    self.metrics.record_kill();
                    if self.record_events {
                        self.events.push(SimEvent::Killed {
                            predator: id,
                            prey,
                            at,
                        });
                    }
                }
            }
        }
        self.tick += 1;
        self.metrics
            .record_tick(started.elapsed(), self.population.alive_count());
        Ok(())
    }

    #[must_use]
    pub fn generation_finished(&self) -> bool {
        self.tick >= self.ctx.config.world.steps_per_generation
    }

    /// Runs the remaining ticks of the current generation.
    pub fn run_generation(&mut self) -> Result<GenerationSummary> {
        while !self.generation_finished() {
            self.step()?;
        }
        Ok(self.summary())
    }

    #[must_use]
    pub fn select_survivors(&self) -> Vec<Entity> {
        generation::select_survivors(&self.population, self.selection.as_ref())
    }

    pub fn reproduce(&mut self, survivors: Vec<Entity>) -> Result<Vec<Entity>> {
        let targets = self.ctx.config.population.targets();
        generation::reproduce(survivors, &targets, &self.ctx.config, &mut self.ctx.rng)
    }

    /// Finishes the current generation, selects, breeds and starts the next.
    ///
    /// On extinction the current generation is left as it is and the error is
    /// returned so the caller can halt.
    pub fn advance(&mut self) -> Result<GenerationSummary> {
        while !self.generation_finished() {
            self.step()?;
        }
        let survivors = self.select_survivors();
        let summary = self.summarize(&survivors);
        self.metrics.record_generation(&summary);

        let next = match self.reproduce(survivors) {
            Ok(next) => next,
            Err(err) => {
                if err.is_extinction() {
                    tracing::warn!(generation = self.generation, error = %err, "Population went extinct");
                }
                return Err(err);
            }
        };

        let placement = if self.ctx.config.world.inherit_positions {
            Placement::Keep
        } else {
            Placement::Scatter
        };
        self.generation += 1;
        self.begin_generation(next, placement)?;
        Ok(summary)
    }

    #[must_use]
    pub fn summary(&self) -> GenerationSummary {
        self.summarize(&self.select_survivors())
    }

    fn summarize(&self, survivors: &[Entity]) -> GenerationSummary {
        let mut by_kind = BTreeMap::new();
        for e in survivors {
            *by_kind.entry(e.kind).or_insert(0) += 1;
        }
        GenerationSummary {
            generation: self.generation,
            ticks: self.tick,
            population: self.started_with.clone(),
            alive: self.population.count_by_kind(),
            survivors: by_kind,
            kills: self.kills,
        }
    }

    /// Read-only inspection of a cell.
    #[must_use]
    pub fn occupant_at(&self, pos: Position) -> OccupantRef<'_> {
        match self.ctx.grid.occupant_at(pos) {
            Occupant::OutOfBounds => OccupantRef::OutOfBounds,
            Occupant::Empty => OccupantRef::Empty,
            Occupant::Obstacle => OccupantRef::Obstacle,
            Occupant::Entity(id, _) => match self.population.get(id) {
                Some(entity) => OccupantRef::Entity(id, entity),
                None => OccupantRef::Empty,
            },
        }
    }

    pub fn drain_events(&mut self) -> Vec<SimEvent> {
        std::mem::take(&mut self.events)
    }

    /// Living entities with their genomes, plus the options that shaped them.
    #[must_use]
    pub fn snapshot(&self) -> SimulationSnapshot {
        SimulationSnapshot::capture(
            &self.ctx.config,
            self.generation,
            self.population.iter_alive().map(|(_, e)| e),
        )
    }

    /// Rebuilds a simulation from a snapshot, keeping stored positions.
    pub fn from_snapshot(snapshot: &SimulationSnapshot) -> Result<Self> {
        let mut ctx = SimulationContext::new(snapshot.options.clone())?;
        let entities = snapshot.restore(&mut ctx.rng)?;
        let mut sim = Self::from_context(ctx, entities, Placement::Keep)?;
        sim.generation = snapshot.generation;
        Ok(sim)
    }

    /// Every living entity sits on the cell that references it, and no
    /// other cell references an entity.
    #[must_use]
    pub fn grid_consistent(&self) -> bool {
        let positioned = self.population.iter_alive().all(|(id, e)| {
            matches!(self.ctx.grid.get(e.position), Some(Cell::Entity { id: cell_id, kind }) if cell_id == id && kind == e.kind)
        });
        positioned && self.ctx.grid.entity_cells().count() == self.population.alive_count()
    }
}
