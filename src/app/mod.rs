pub mod shutdown;
pub mod state;

pub use shutdown::{RunOutcome, ShutdownManager, EXTINCTION_EXIT_CODE};
pub use state::{App, RunOptions};

use anyhow::Result;

impl App {
    /// Runs up to `generations` generations, stopping early on extinction.
    ///
    /// Extinction is not an error here: it ends the run and sets a non-zero
    /// exit code on [`App::shutdown`]. Any other engine error propagates.
    /// The final save happens in both cases unless it was switched off.
    pub fn run(&mut self, generations: u64) -> Result<()> {
        let mut completed = 0;
        while self.running && completed < generations {
            match self.sim.advance() {
                Ok(summary) => {
                    tracing::debug!(
                        generation = summary.generation,
                        wall_ms = self.sim.metrics.last_generation_time().as_millis() as u64,
                        "Generation recorded"
                    );
                    self.history.push(summary);
                    completed += 1;
                    if self.autosave_every > 0 && completed % self.autosave_every == 0 {
                        self.save_state()?;
                    }
                }
                Err(err) if err.is_extinction() => {
                    tracing::error!(generation = self.sim.generation, "Run halted: {}", err);
                    self.shutdown.record_extinction(self.sim.generation, &err);
                    self.running = false;
                }
                Err(err) => return Err(err.into()),
            }
        }
        self.running = false;
        self.shutdown.cleanup(self)
    }

    /// Whether the last run ended because a role died out.
    pub fn went_extinct(&self) -> bool {
        matches!(self.shutdown.outcome(), RunOutcome::Extinct { .. })
    }
}
