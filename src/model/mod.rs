pub use critters_core::brain::BrainLogic;
pub use critters_core::{CoreError, EntityKind};

pub mod behavior {
    pub use critters_core::behavior::*;
}
pub mod brain {
    pub use critters_core::brain::*;
}
pub mod config {
    pub use critters_core::config::*;
}
pub mod generation {
    pub use critters_core::generation::*;
}
pub mod genetics {
    pub use critters_core::genetics::*;
}
pub mod grid {
    pub use critters_core::grid::*;
}
pub mod metrics {
    pub use critters_core::metrics::*;
}
pub mod population {
    pub use critters_core::population::*;
}
pub mod selection {
    pub use critters_core::selection::*;
}
pub mod senses {
    pub use critters_core::senses::*;
}
pub mod simulation {
    pub use critters_core::simulation::*;
}
pub mod snapshot {
    pub use critters_core::snapshot::*;
}
pub mod persistence {
    pub use critters_io::*;
}

pub mod state {
    pub use critters_data::*;
}
