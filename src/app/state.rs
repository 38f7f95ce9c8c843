use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use crate::app::shutdown::ShutdownManager;
use crate::model::config::AppConfig;
use crate::model::persistence::{load_snapshot, save_snapshot};
use crate::model::simulation::{GenerationSummary, Simulation};

/// Command-line choices that shape one run.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub config_path: PathBuf,
    pub seed: Option<u64>,
    pub load_path: Option<PathBuf>,
    pub save_path: Option<PathBuf>,
    /// Save every N generations; 0 saves only at exit.
    pub autosave_every: u64,
    /// Skip the snapshot normally written when the run ends.
    pub no_final_save: bool,
}

pub struct App {
    pub running: bool,
    pub sim: Simulation,
    pub config_path: PathBuf,
    pub save_path: Option<PathBuf>,
    pub autosave_every: u64,
    pub history: Vec<GenerationSummary>,
    pub shutdown: ShutdownManager,
}

impl App {
    /// Reads `path`, writing the defaults there first if it does not exist.
    /// An unreadable file falls back to defaults with a warning.
    pub fn load_config(path: &Path) -> AppConfig {
        if let Ok(content) = std::fs::read_to_string(path) {
            match AppConfig::from_toml(&content) {
                Ok(config) => return config,
                Err(e) => {
                    tracing::warn!("Failed to load {}: {:#}", path.display(), e);
                }
            }
        }
        let default = AppConfig::default();
        if !path.exists() {
            match toml::to_string(&default) {
                Ok(toml_str) => {
                    if let Err(e) = std::fs::write(path, toml_str) {
                        tracing::warn!("Could not write default config to {}: {}", path.display(), e);
                    }
                }
                Err(e) => tracing::warn!("Could not encode default config: {}", e),
            }
        }
        default
    }

    pub fn new(options: RunOptions) -> Result<Self> {
        let mut sim = match &options.load_path {
            Some(load_path) => {
                let mut snapshot = load_snapshot(load_path)
                    .with_context(|| format!("loading snapshot {}", load_path.display()))?;
                if options.seed.is_some() {
                    snapshot.options.world.seed = options.seed;
                }
                tracing::info!(
                    path = %load_path.display(),
                    generation = snapshot.generation,
                    entities = snapshot.entities.len(),
                    "Resuming from snapshot"
                );
                Simulation::from_snapshot(&snapshot).context("restoring simulation")?
            }
            None => {
                let mut config = Self::load_config(&options.config_path);
                if options.seed.is_some() {
                    config.world.seed = options.seed;
                }
                tracing::info!(fingerprint = %config.fingerprint(), "Configuration loaded");
                Simulation::new(config).context("creating simulation")?
            }
        };

        sim.set_event_recording(false);

        Ok(Self {
            running: true,
            sim,
            config_path: options.config_path,
            save_path: options.save_path,
            autosave_every: options.autosave_every,
            history: Vec::new(),
            shutdown: ShutdownManager::new(!options.no_final_save),
        })
    }

    pub fn save_state(&self) -> Result<()> {
        if let Some(path) = &self.save_path {
            save_snapshot(&self.sim.snapshot(), path)
                .with_context(|| format!("saving snapshot to {}", path.display()))?;
        }
        Ok(())
    }
}
