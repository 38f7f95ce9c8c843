//! Error types for the simulation engine.
//!
//! Contract violations (a sensed vector that does not fit the controller,
//! saved weights that do not fit the topology) and simulation-level halts
//! (extinction) are reported through [`CoreError`]. Out-of-bounds sensing and
//! predation races are defined behavior and never surface here.

use critters_data::EntityKind;
use thiserror::Error;

/// Main error type for engine operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    /// Input vector length disagrees with the controller's input layer.
    #[error("Topology mismatch: controller expects {expected} inputs, got {actual}")]
    TopologyMismatch { expected: usize, actual: usize },

    /// Saved weight or bias arrays disagree with the reconstructed topology.
    #[error("Shape mismatch in layer {layer}: expected {expected}, got {actual}")]
    ShapeMismatch {
        layer: usize,
        expected: String,
        actual: String,
    },

    /// A role that must reproduce has fewer than two survivors.
    #[error("Extinction: {kind} has {survivors} survivor(s), at least 2 are required")]
    Extinction { kind: EntityKind, survivors: usize },

    /// The whole survivor pool is below the minimum viable size.
    #[error("Extinction: only {survivors} survivor(s) left in the population")]
    PopulationCollapse { survivors: usize },

    /// Static occupancy mask dimensions disagree with the world.
    #[error("Obstacle mask is {mask_width}x{mask_height}, world is {width}x{height}")]
    MaskMismatch {
        mask_width: u16,
        mask_height: u16,
        width: u16,
        height: u16,
    },

    /// No empty cell left to place an entity.
    #[error("No free cell left to place {kind}")]
    NoFreeCell { kind: EntityKind },

    /// Genome variant does not fit the entity's role.
    #[error("Genome of a {kind} has the wrong layout: {reason}")]
    GenomeMismatch { kind: EntityKind, reason: String },

    /// Configuration failed validation.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result type alias for engine operations.
pub type Result<T> = std::result::Result<T, CoreError>;

impl CoreError {
    /// Whether this error means the population can no longer continue.
    #[must_use]
    pub fn is_extinction(&self) -> bool {
        matches!(
            self,
            CoreError::Extinction { .. } | CoreError::PopulationCollapse { .. }
        )
    }

    #[must_use]
    pub fn shape_mismatch<E: std::fmt::Debug, A: std::fmt::Debug>(
        layer: usize,
        expected: E,
        actual: A,
    ) -> Self {
        CoreError::ShapeMismatch {
            layer,
            expected: format!("{expected:?}"),
            actual: format!("{actual:?}"),
        }
    }
}

impl From<anyhow::Error> for CoreError {
    fn from(err: anyhow::Error) -> Self {
        CoreError::InvalidConfig(err.to_string())
    }
}
