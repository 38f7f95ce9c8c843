use super::brain::Brain;
use super::geometry::Offset;
use rkyv::{Archive, Deserialize as RkyvDeserialize, Serialize as RkyvSerialize};
use serde::{Deserialize, Serialize};

/// Number of non-spatial inputs appended after the sensor blocks:
/// normalized x, normalized y, oscillator.
pub const INTERNAL_INPUTS: usize = 3;

/// Number of genes in a bouncer gene table: one impulse gene plus one per
/// adjacent direction.
pub const GENE_COUNT: usize = 9;

/// A precomputed sensory probe: a relative cell, the angular wedge it falls
/// into and its distance-weighted strength.
#[derive(
    Clone, Copy, Debug, PartialEq, Serialize, Deserialize, Archive, RkyvSerialize, RkyvDeserialize,
)]
#[archive(check_bytes)]
pub struct SensoryInput {
    pub offset: Offset,
    pub bucket: u16,
    pub magnitude: f32,
}

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
pub struct Oscillator {
    pub on: bool,
    /// Cycle length in ticks, at least 2.
    pub period: u32,
}

impl Default for Oscillator {
    fn default() -> Self {
        Self {
            on: false,
            period: 2,
        }
    }
}

/// Heritable flags controlling the non-spatial inputs.
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
pub struct InternalParams {
    pub sense_x: bool,
    pub sense_y: bool,
    pub oscillator: Oscillator,
}

/// Genome of a neural critter.
#[derive(Clone, Debug, Serialize, Deserialize, Archive, RkyvSerialize, RkyvDeserialize)]
#[archive(check_bytes)]
#[serde(rename_all = "camelCase")]
pub struct NeuralGenome {
    pub brain: Brain,
    pub sensory_inputs: Vec<SensoryInput>,
    pub internal_params: InternalParams,
}

/// One entry of a bouncer gene table.
#[derive(
    Clone, Copy, Debug, PartialEq, Serialize, Deserialize, Archive, RkyvSerialize, RkyvDeserialize,
)]
#[archive(check_bytes)]
pub struct Gene {
    /// Move action, 0 (stay) through 8 (north-west).
    pub action: u8,
    /// Preference strength in `[0, 1]`.
    pub weight: f32,
}

/// Hand-authored movement table of the non-neural bouncer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, Archive, RkyvSerialize, RkyvDeserialize)]
#[archive(check_bytes)]
pub struct GeneTable {
    pub genes: Vec<Gene>,
}

/// Heritable state of a critter.
#[derive(Clone, Debug, Serialize, Deserialize, Archive, RkyvSerialize, RkyvDeserialize)]
#[archive(check_bytes)]
#[serde(untagged)]
pub enum Genome {
    Neural(NeuralGenome),
    Table(GeneTable),
}

impl Genome {
    #[must_use]
    pub fn as_neural(&self) -> Option<&NeuralGenome> {
        match self {
            Genome::Neural(g) => Some(g),
            Genome::Table(_) => None,
        }
    }

    #[must_use]
    pub fn as_neural_mut(&mut self) -> Option<&mut NeuralGenome> {
        match self {
            Genome::Neural(g) => Some(g),
            Genome::Table(_) => None,
        }
    }

    #[must_use]
    pub fn as_table(&self) -> Option<&GeneTable> {
        match self {
            Genome::Table(t) => Some(t),
            Genome::Neural(_) => None,
        }
    }
}
