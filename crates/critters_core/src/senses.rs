//! Angular, distance-weighted sensing of the world grid.
//!
//! Probe geometry (relative offset, wedge, strength) is computed once when a
//! genome is built; [`read`] only looks up cells and folds them into the
//! channel blocks of the role's [`SensorLayout`].
//!
//! Wedges are numbered clockwise from north and centred on the compass
//! directions, so with 8 wedges bucket `k` points the same way as move
//! direction `k + 1`.

use crate::grid::{Cell, WorldGrid};
use critters_data::{Entity, EntityKind, InternalParams, Offset, SensoryInput, INTERNAL_INPUTS};
use serde::{Deserialize, Serialize};
use std::f64::consts::{PI, TAU};

/// Magnitudes above this saturate to full strength.
pub const SATURATION: f32 = 0.707;

/// What a sensed cell holds, as seen by a sensor.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SensorChannel {
    Obstacle,
    Boundary,
    Bouncer,
    Thinker,
    Interactor,
    Predator,
    Prey,
}

impl SensorChannel {
    #[must_use]
    pub fn for_kind(kind: EntityKind) -> Self {
        match kind {
            EntityKind::Bouncer => SensorChannel::Bouncer,
            EntityKind::Thinker => SensorChannel::Thinker,
            EntityKind::Interactor => SensorChannel::Interactor,
            EntityKind::Predator => SensorChannel::Predator,
            EntityKind::Prey => SensorChannel::Prey,
        }
    }

    fn of_cell(cell: Option<Cell>) -> Option<Self> {
        match cell {
            None => Some(SensorChannel::Boundary),
            Some(Cell::Empty) => None,
            Some(Cell::Obstacle) => Some(SensorChannel::Obstacle),
            Some(Cell::Entity { kind, .. }) => Some(Self::for_kind(kind)),
        }
    }
}

/// Ordered channel blocks of a role, plus an optional trailing block that
/// merges every channel not listed.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct SensorLayout {
    pub channels: Vec<SensorChannel>,
    pub catch_all: bool,
}

impl Default for SensorLayout {
    fn default() -> Self {
        Self::undiscriminating()
    }
}

impl SensorLayout {
    /// Everything that occupies a cell lands in one block.
    #[must_use]
    pub fn undiscriminating() -> Self {
        Self {
            channels: Vec::new(),
            catch_all: true,
        }
    }

    #[must_use]
    pub fn interactor() -> Self {
        Self {
            channels: vec![
                SensorChannel::Obstacle,
                SensorChannel::Boundary,
                SensorChannel::Prey,
                SensorChannel::Predator,
            ],
            catch_all: true,
        }
    }

    #[must_use]
    pub fn block_count(&self) -> usize {
        self.channels.len() + usize::from(self.catch_all)
    }

    /// Block receiving `channel`, or `None` if the layout drops it.
    #[must_use]
    pub fn block_of(&self, channel: SensorChannel) -> Option<usize> {
        self.channels
            .iter()
            .position(|&c| c == channel)
            .or_else(|| self.catch_all.then_some(self.channels.len()))
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            self.block_count() > 0,
            "Sensor layout must enable at least one channel"
        );
        for (i, c) in self.channels.iter().enumerate() {
            anyhow::ensure!(
                !self.channels[..i].contains(c),
                "Sensor channel {:?} listed twice",
                c
            );
        }
        Ok(())
    }
}

/// Wedge index of an offset, clockwise from north with half-wedge centring.
#[must_use]
pub fn angular_bucket(offset: Offset, resolution: usize) -> u16 {
    let res = resolution.max(1);
    let mut bearing = f64::from(offset.dx).atan2(-f64::from(offset.dy));
    if bearing < 0.0 {
        bearing += TAU;
    }
    let bucket = ((bearing + PI / res as f64) / TAU * res as f64).floor() as usize % res;
    bucket as u16
}

/// `1 / distance`, saturated to `1.0` for every immediate neighbour.
#[must_use]
pub fn magnitude(offset: Offset) -> f32 {
    let m = (1.0 / offset.distance()) as f32;
    if m > SATURATION {
        1.0
    } else {
        m
    }
}

/// Every offset within `radius` (origin excluded), row-major.
#[must_use]
pub fn build_sensory_inputs(radius: u16, resolution: usize) -> Vec<SensoryInput> {
    let r = i32::from(radius);
    let mut inputs = Vec::new();
    for dy in -r..=r {
        for dx in -r..=r {
            if (dx, dy) == (0, 0) || dx * dx + dy * dy > r * r {
                continue;
            }
            let offset = Offset::new(dx, dy);
            inputs.push(SensoryInput {
                offset,
                bucket: angular_bucket(offset, resolution),
                magnitude: magnitude(offset),
            });
        }
    }
    inputs
}

/// Whether a stored probe is one [`build_sensory_inputs`] would produce
/// for `radius` and `resolution`.
#[must_use]
pub fn probe_fits(probe: &SensoryInput, radius: u16, resolution: usize) -> bool {
    let r = i32::from(radius);
    let (dx, dy) = (probe.offset.dx, probe.offset.dy);
    (dx, dy) != (0, 0)
        && dx * dx + dy * dy <= r * r
        && probe.bucket == angular_bucket(probe.offset, resolution)
        && probe.magnitude.is_finite()
        && (0.0..=1.0).contains(&probe.magnitude)
}

/// Length of the vector [`read`] produces for a layout.
#[must_use]
pub fn input_count(layout: &SensorLayout, resolution: usize) -> usize {
    resolution * layout.block_count() + INTERNAL_INPUTS
}

/// Builds the input vector of an entity: channel blocks in layout order,
/// then normalized x, normalized y and the oscillator.
#[must_use]
pub fn read(
    entity: &Entity,
    grid: &WorldGrid,
    layout: &SensorLayout,
    resolution: usize,
) -> Vec<f32> {
    let mut out = vec![0.0; input_count(layout, resolution)];
    let (probes, params): (&[SensoryInput], InternalParams) = match entity.neural() {
        Some(g) => (g.sensory_inputs.as_slice(), g.internal_params),
        None => (&[][..], InternalParams::default()),
    };

    for probe in probes {
        let target = entity.position.offset_by(probe.offset);
        let Some(channel) = SensorChannel::of_cell(grid.get(target)) else {
            continue;
        };
        let Some(block) = layout.block_of(channel) else {
            continue;
        };
        let bucket = usize::from(probe.bucket);
        if bucket >= resolution {
            continue;
        }
        let slot = &mut out[block * resolution + bucket];
        let strength = if channel == SensorChannel::Boundary {
            1.0
        } else {
            probe.magnitude
        };
        *slot = f32::max(*slot, strength);
    }

    let base = resolution * layout.block_count();
    out[base..].copy_from_slice(&internal_signals(entity, grid, &params));
    out
}

fn internal_signals(entity: &Entity, grid: &WorldGrid, params: &InternalParams) -> [f32; 3] {
    let x = if params.sense_x {
        2.0 * entity.position.x as f32 / f32::from(grid.width()) - 1.0
    } else {
        0.0
    };
    let y = if params.sense_y {
        2.0 * entity.position.y as f32 / f32::from(grid.height()) - 1.0
    } else {
        0.0
    };
    let osc = &params.oscillator;
    let phase = if osc.on && osc.period >= 2 {
        (entity.step_count % u64::from(osc.period)) as f32 / (osc.period - 1) as f32
    } else {
        0.0
    };
    [x, y, phase]
}
