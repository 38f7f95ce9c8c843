//! Per-tick behavior of every role.
//!
//! Entities are flat records; what differs between roles is the
//! [`Behavior`] strategy picked by [`behavior_for`]. [`step_entity`] is the
//! shared state machine: sense, choose, then move or resolve the blocker.

use crate::brain::BrainLogic;
use crate::config::{AppConfig, IdlePolicy};
use crate::error::{CoreError, Result};
use crate::grid::{Cell, WorldGrid};
use crate::population::{EntityId, Population};
use crate::senses;
use crate::simulation::SimulationContext;
use critters_data::{Entity, EntityKind, GeneTable, Offset, Position};
use rand::seq::SliceRandom;
use rand::RngCore;

/// A grid-adjacent move. Action `0` means "stay" and has no direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Direction {
    N = 1,
    NE = 2,
    E = 3,
    SE = 4,
    S = 5,
    SW = 6,
    W = 7,
    NW = 8,
}

const UP: [u8; 3] = [1, 2, 8];
const DOWN: [u8; 3] = [4, 5, 6];
const LEFT: [u8; 3] = [6, 7, 8];
const RIGHT: [u8; 3] = [2, 3, 4];

impl Direction {
    pub const ALL: [Direction; 8] = [
        Direction::N,
        Direction::NE,
        Direction::E,
        Direction::SE,
        Direction::S,
        Direction::SW,
        Direction::W,
        Direction::NW,
    ];

    #[must_use]
    pub fn from_action(action: u8) -> Option<Self> {
        match action {
            1..=8 => Some(Self::ALL[usize::from(action) - 1]),
            _ => None,
        }
    }

    #[must_use]
    pub fn action(self) -> u8 {
        self as u8
    }

    #[must_use]
    pub fn offset(self) -> Offset {
        let a = self.action();
        let dx = i32::from(RIGHT.contains(&a)) - i32::from(LEFT.contains(&a));
        let dy = i32::from(DOWN.contains(&a)) - i32::from(UP.contains(&a));
        Offset::new(dx, dy)
    }
}

/// What happens when the target cell is not free.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Blocked {
    Stay,
    Kill(EntityId),
}

/// Outcome of one entity's tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    Stayed,
    Moved { from: Position, to: Position },
    Killed { prey: EntityId, at: Position },
}

pub trait Behavior: Sync {
    fn sense_all(&self, entity: &Entity, grid: &WorldGrid, config: &AppConfig) -> Vec<f32>;

    /// Move action in `0..=8`.
    fn choose_action(
        &self,
        entity: &mut Entity,
        senses: &[f32],
        config: &AppConfig,
        rng: &mut dyn RngCore,
    ) -> Result<u8>;

    /// `blocker` is `None` when the target lies outside the grid.
    fn on_blocked(&self, _entity: &Entity, _blocker: Option<Cell>, _config: &AppConfig) -> Blocked {
        Blocked::Stay
    }
}

pub struct BouncerBehavior;
pub struct NeuralBehavior;
pub struct PredatorBehavior;

static BOUNCER: BouncerBehavior = BouncerBehavior;
static NEURAL: NeuralBehavior = NeuralBehavior;
static PREDATOR: PredatorBehavior = PredatorBehavior;

#[must_use]
pub fn behavior_for(kind: EntityKind) -> &'static dyn Behavior {
    match kind {
        EntityKind::Bouncer => &BOUNCER,
        EntityKind::Thinker | EntityKind::Interactor | EntityKind::Prey => &NEURAL,
        EntityKind::Predator => &PREDATOR,
    }
}

/// Occupancy of the eight neighbours, in direction order. Boundary counts
/// as occupied.
#[must_use]
pub fn adjacent_occupancy(position: Position, grid: &WorldGrid) -> [bool; 8] {
    let mut out = [false; 8];
    for (slot, dir) in out.iter_mut().zip(Direction::ALL) {
        *slot = grid
            .get(position.offset_by(dir.offset()))
            .map_or(true, |c| !c.is_empty());
    }
    out
}

/// Weighted pick from a gene table. The list always holds one "stay" entry;
/// gene 0 always fires, gene `i` fires when neighbour `i` is occupied.
pub fn bouncer_choose<R: rand::Rng + ?Sized>(
    table: &GeneTable,
    occupied: &[bool; 8],
    rng: &mut R,
) -> u8 {
    let mut candidates = vec![0u8];
    for (i, gene) in table.genes.iter().enumerate() {
        let fires = i == 0 || occupied.get(i - 1).copied().unwrap_or(false);
        if fires {
            let copies = (gene.weight * gene.weight * 100.0).floor() as usize;
            candidates.extend(std::iter::repeat(gene.action).take(copies));
        }
    }
    candidates.choose(rng).copied().unwrap_or(0)
}

/// Neural pick: output `i` maps to action `i + 1`; no confident output is
/// resolved by the idle policy.
pub fn neural_choose<R: rand::Rng + ?Sized>(
    entity: &mut Entity,
    senses: &[f32],
    idle: IdlePolicy,
    rng: &mut R,
) -> Result<u8> {
    let kind = entity.kind;
    let genome = entity
        .genome
        .as_neural_mut()
        .ok_or_else(|| CoreError::GenomeMismatch {
            kind,
            reason: "neural role without a controller".to_string(),
        })?;
    let choice = genome.brain.think(senses, rng)?;
    Ok(match (choice, idle) {
        (Some(output), _) => output as u8 + 1,
        (None, IdlePolicy::FirstOutput) => Direction::N.action(),
        (None, IdlePolicy::Stay) => 0,
    })
}

impl Behavior for BouncerBehavior {
    fn sense_all(&self, entity: &Entity, grid: &WorldGrid, _config: &AppConfig) -> Vec<f32> {
        adjacent_occupancy(entity.position, grid)
            .iter()
            .map(|&o| if o { 1.0 } else { 0.0 })
            .collect()
    }

    fn choose_action(
        &self,
        entity: &mut Entity,
        senses: &[f32],
        _config: &AppConfig,
        rng: &mut dyn RngCore,
    ) -> Result<u8> {
        let table = entity.genome.as_table().ok_or_else(|| CoreError::GenomeMismatch {
            kind: entity.kind,
            reason: "bouncer without a gene table".to_string(),
        })?;
        let mut occupied = [false; 8];
        for (slot, &s) in occupied.iter_mut().zip(senses) {
            *slot = s > 0.5;
        }
        Ok(bouncer_choose(table, &occupied, rng))
    }
}

impl Behavior for NeuralBehavior {
    fn sense_all(&self, entity: &Entity, grid: &WorldGrid, config: &AppConfig) -> Vec<f32> {
        let layout = config.layout_for(entity.kind).cloned().unwrap_or_default();
        senses::read(entity, grid, &layout, config.senses.angular_resolution)
    }

    fn choose_action(
        &self,
        entity: &mut Entity,
        senses: &[f32],
        config: &AppConfig,
        rng: &mut dyn RngCore,
    ) -> Result<u8> {
        neural_choose(entity, senses, config.behavior.idle_policy, rng)
    }
}

impl Behavior for PredatorBehavior {
    fn sense_all(&self, entity: &Entity, grid: &WorldGrid, config: &AppConfig) -> Vec<f32> {
        NEURAL.sense_all(entity, grid, config)
    }

    fn choose_action(
        &self,
        entity: &mut Entity,
        senses: &[f32],
        config: &AppConfig,
        rng: &mut dyn RngCore,
    ) -> Result<u8> {
        NEURAL.choose_action(entity, senses, config, rng)
    }

    fn on_blocked(&self, entity: &Entity, blocker: Option<Cell>, _config: &AppConfig) -> Blocked {
        match blocker {
            Some(Cell::Entity {
                id,
                kind: EntityKind::Prey,
            }) if entity.role_state.digestion_counter == 0 => Blocked::Kill(id),
            _ => Blocked::Stay,
        }
    }
}

/// Runs one tick of entity `id`: sense, choose, then move or resolve what
/// blocks the move. Grid updates happen immediately, so entities later in
/// the same tick see the new layout.
pub fn step_entity(
    ctx: &mut SimulationContext,
    population: &mut Population,
    id: EntityId,
) -> Result<StepOutcome> {
    if !population.is_alive(id) {
        return Ok(StepOutcome::Stayed);
    }
    let Some(entity) = population.get_mut(id) else {
        return Ok(StepOutcome::Stayed);
    };
    let behavior = behavior_for(entity.kind);

    if entity.kind == EntityKind::Predator {
        let counter = &mut entity.role_state.digestion_counter;
        *counter = counter.saturating_sub(1);
    }

    let senses = behavior.sense_all(entity, &ctx.grid, &ctx.config);
    entity.step_count += 1;
    let action = behavior.choose_action(entity, &senses, &ctx.config, &mut ctx.rng)?;

    let Some(direction) = Direction::from_action(action) else {
        return Ok(StepOutcome::Stayed);
    };
    let from = entity.position;
    let to = from.offset_by(direction.offset());

    match ctx.grid.get(to) {
        Some(Cell::Empty) => {
            ctx.grid.set(from, Cell::Empty);
            ctx.grid.set(
                to,
                Cell::Entity {
                    id,
                    kind: entity.kind,
                },
            );
            entity.position = to;
            Ok(StepOutcome::Moved { from, to })
        }
        blocker => match behavior.on_blocked(entity, blocker, &ctx.config) {
            Blocked::Stay => Ok(StepOutcome::Stayed),
            Blocked::Kill(prey) => {
                entity.role_state.kill_count += 1;
                entity.role_state.digestion_counter = ctx.config.predation.digestion_delay;
                ctx.grid.set(to, Cell::Empty);
                population.kill(prey);
                tracing::debug!(predator = %id, prey = %prey, x = to.x, y = to.y, "Prey killed");
                Ok(StepOutcome::Killed { prey, at: to })
            }
        },
    }
}
