//! How a run ends: why the generation loop stopped, the exit code that maps
//! to, and whether a final snapshot gets written.

use anyhow::Result;

use crate::model::CoreError;

/// Exit code reported when a role dies out.
pub const EXTINCTION_EXIT_CODE: i32 = 2;

/// Why the generation loop stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// Still running, or stopped after the requested generations.
    Completed,
    /// Reproduction refused to continue at `generation`.
    Extinct { generation: u64, reason: String },
}

pub struct ShutdownManager {
    save_on_exit: bool,
    outcome: RunOutcome,
}

impl Default for ShutdownManager {
    fn default() -> Self {
        Self::new(true)
    }
}

impl ShutdownManager {
    pub fn new(save_on_exit: bool) -> Self {
        Self {
            save_on_exit,
            outcome: RunOutcome::Completed,
        }
    }

    pub fn should_save_on_exit(&self) -> bool {
        self.save_on_exit
    }

    /// Marks the run as halted by `err` in `generation`.
    pub fn record_extinction(&mut self, generation: u64, err: &CoreError) {
        self.outcome = RunOutcome::Extinct {
            generation,
            reason: err.to_string(),
        };
    }

    pub fn outcome(&self) -> &RunOutcome {
        &self.outcome
    }

    pub fn exit_code(&self) -> i32 {
        match self.outcome {
            RunOutcome::Completed => 0,
            RunOutcome::Extinct { .. } => EXTINCTION_EXIT_CODE,
        }
    }

    /// Writes the final snapshot if saving is on and the app has a path.
    /// A halted run is saved too, so the failed generation can be inspected.
    pub fn cleanup(&self, app: &crate::app::App) -> Result<()> {
        if self.save_on_exit && app.save_path.is_some() {
            tracing::info!("Saving state before exit...");
            app.save_state()?;
        }
        tracing::info!(
            exit_code = self.exit_code(),
            generations = app.history.len(),
            elapsed_ms = app.sim.metrics.elapsed().as_millis() as u64,
            "Cleanup complete"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::state::EntityKind;

    #[test]
    fn test_shutdown_manager_defaults() {
        let manager = ShutdownManager::default();
        assert!(manager.should_save_on_exit());
        assert_eq!(manager.outcome(), &RunOutcome::Completed);
        assert_eq!(manager.exit_code(), 0);
    }

    #[test]
    fn test_save_on_exit_disabled() {
        let manager = ShutdownManager::new(false);
        assert!(!manager.should_save_on_exit());
    }

    #[test]
    fn test_extinction_sets_exit_code() {
        let mut manager = ShutdownManager::default();
        let err = CoreError::Extinction {
            kind: EntityKind::Predator,
            survivors: 1,
        };
        manager.record_extinction(4, &err);
        assert_eq!(manager.exit_code(), EXTINCTION_EXIT_CODE);
        match manager.outcome() {
            RunOutcome::Extinct { generation, reason } => {
                assert_eq!(*generation, 4);
                assert!(reason.contains("Predator"));
            }
            other => panic!("unexpected outcome {:?}", other),
        }
    }
}
