//! Performance metrics collection for the simulation.
//!
//! Provides structured logging and counters for monitoring simulation
//! progress and health.

use crate::simulation::GenerationSummary;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

/// Ticks between periodic progress logs.
const TICK_LOG_INTERVAL: u64 = 1000;

/// Metrics collector owned by a simulation.
pub struct Metrics {
    tick_count: AtomicU64,
    generation_count: AtomicU64,
    kill_count: AtomicU64,
    entity_count: AtomicU64,
    /// Microseconds since `start_time` when the last generation closed.
    generation_mark_us: AtomicU64,
    last_generation_us: AtomicU64,
    pub counters: Mutex<HashMap<String, AtomicU64>>,
    start_time: Instant,
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Metrics {
    /// Creates a new metrics collector.
    #[must_use]
    pub fn new() -> Self {
        Self {
            tick_count: AtomicU64::new(0),
            generation_count: AtomicU64::new(0),
            kill_count: AtomicU64::new(0),
            entity_count: AtomicU64::new(0),
            generation_mark_us: AtomicU64::new(0),
            last_generation_us: AtomicU64::new(0),
            counters: Mutex::new(HashMap::new()),
            start_time: Instant::now(),
        }
    }

    /// Records a completed tick with its duration.
    pub fn record_tick(&self, duration: Duration, entities: usize) {
        self.tick_count.fetch_add(1, Ordering::Relaxed);
        self.entity_count.store(entities as u64, Ordering::Relaxed);

        let tick = self.tick_count.load(Ordering::Relaxed);
        if tick % TICK_LOG_INTERVAL == 0 {
            tracing::info!(
                tick = tick,
                entities = entities,
                kills = self.kill_count(),
                duration_us = duration.as_micros() as u64,
                "Simulation tick"
            );
        }
    }

    pub fn record_kill(&self) {
        self.kill_count.fetch_add(1, Ordering::Relaxed);
    }

    /// Records and logs a finished generation, returning the wall time it
    /// took since the previous one closed (or since creation).
    pub fn record_generation(&self, summary: &GenerationSummary) -> Duration {
        self.generation_count.fetch_add(1, Ordering::Relaxed);
        let elapsed = self.elapsed();
        let now_us = elapsed.as_micros() as u64;
        let previous = self.generation_mark_us.swap(now_us, Ordering::Relaxed);
        let wall_us = now_us.saturating_sub(previous);
        self.last_generation_us.store(wall_us, Ordering::Relaxed);

        tracing::info!(
            generation = summary.generation,
            ticks = summary.ticks,
            population = ?summary.population,
            alive = ?summary.alive,
            survivors = ?summary.survivors,
            kills = summary.kills,
            wall_ms = wall_us / 1000,
            elapsed_ms = elapsed.as_millis() as u64,
            "Generation finished"
        );
        Duration::from_micros(wall_us)
    }

    /// Wall time of the most recently recorded generation.
    #[must_use]
    pub fn last_generation_time(&self) -> Duration {
        Duration::from_micros(self.last_generation_us.load(Ordering::Relaxed))
    }

    /// Increments a named counter.
    pub fn increment_counter(&self, name: &str) {
        let mut counters = self.counters.lock().unwrap_or_else(|e| e.into_inner());
        counters
            .entry(name.to_string())
            .or_insert_with(|| AtomicU64::new(0))
            .fetch_add(1, Ordering::Relaxed);
    }

    /// Current value of a named counter, zero if never incremented.
    #[must_use]
    pub fn counter(&self, name: &str) -> u64 {
        let counters = self.counters.lock().unwrap_or_else(|e| e.into_inner());
        counters
            .get(name)
            .map_or(0, |c| c.load(Ordering::Relaxed))
    }

    #[must_use]
    pub fn tick_count(&self) -> u64 {
        self.tick_count.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn generation_count(&self) -> u64 {
        self.generation_count.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn kill_count(&self) -> u64 {
        self.kill_count.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn entity_count(&self) -> u64 {
        self.entity_count.load(Ordering::Relaxed)
    }

    /// Gets elapsed time since metrics creation.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }
}

/// Initialize tracing subscriber for logging. `RUST_LOG` overrides the
/// default `info` level.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing::subscriber::set_global_default(
        tracing_subscriber::FmtSubscriber::builder()
            .with_env_filter(filter)
            .finish(),
    )
    .ok();
}
