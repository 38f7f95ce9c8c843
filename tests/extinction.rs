mod common;

use common::SimulationBuilder;
use critters_lib::app::{App, RunOptions, RunOutcome, EXTINCTION_EXIT_CODE};
use critters_lib::model::config::IdlePolicy;
use critters_lib::model::persistence::load_snapshot;
use critters_lib::model::state::EntityKind;
use critters_lib::model::CoreError;
use std::path::PathBuf;

const EAST: usize = 2;

fn temp_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("critters_ext_{}_{}", std::process::id(), name))
}

#[test]
fn test_single_prey_survivor_halts() {
    let mut sim = SimulationBuilder::new()
        .with_idle_policy(IdlePolicy::Stay)
        .with_config(|c| {
            c.world.steps_per_generation = 1;
            c.population.predators = 2;
            c.population.prey = 2;
        })
        .with_forced(EntityKind::Predator, 2, 2, EAST)
        .with_idle(EntityKind::Prey, 3, 2)
        .with_forced(EntityKind::Predator, 2, 8, EAST)
        .with_idle(EntityKind::Prey, 3, 8)
        .with_idle(EntityKind::Prey, 12, 12)
        .build();

    let generation = sim.generation;
    let err = sim.advance().expect_err("expected extinction");
    // Predators: two hunters, one kept. Prey: one left.
    assert!(err.is_extinction());
    assert!(matches!(
        err,
        CoreError::Extinction {
            kind: EntityKind::Predator,
            survivors: 1
        }
    ));
    // The failed generation is left in place.
    assert_eq!(sim.generation, generation);
    assert_eq!(sim.population.alive_count(), 3);
}

#[test]
fn test_empty_world_collapses() {
    let mut sim = SimulationBuilder::new()
        .with_config(|c| {
            c.world.steps_per_generation = 1;
            c.population.prey = 5;
        })
        .with_idle(EntityKind::Prey, 4, 4)
        .build();
    let err = sim.advance().expect_err("expected collapse");
    assert!(matches!(err, CoreError::PopulationCollapse { survivors: 1 }));
}

#[test]
fn test_roles_without_target_do_not_halt() {
    let mut sim = SimulationBuilder::new()
        .with_config(|c| {
            c.world.steps_per_generation = 2;
            c.population.prey = 4;
        })
        .with_idle(EntityKind::Prey, 1, 1)
        .with_idle(EntityKind::Prey, 3, 3)
        .with_idle(EntityKind::Thinker, 5, 5)
        .build();
    let summary = sim.advance().expect("Failed to advance");
    assert_eq!(summary.generation, 0);
    assert_eq!(sim.generation, 1);
    assert_eq!(sim.population.alive_count(), 4);
    assert!(sim
        .population
        .iter_alive()
        .all(|(_, e)| e.kind == EntityKind::Prey));
}

#[test]
fn test_app_reports_extinction_exit_code() {
    let config_path = temp_path("config.toml");
    let save_path = temp_path("halted.json");
    // A lone predator can never leave two parents behind.
    let toml = r#"
[world]
width = 20
height = 20
seed = 3
steps_per_generation = 5
obstacles = []

[population]
predators = 1
prey = 3
"#;
    std::fs::write(&config_path, toml).expect("Failed to write config");

    let mut app = App::new(RunOptions {
        config_path: config_path.clone(),
        save_path: Some(save_path.clone()),
        ..Default::default()
    })
    .expect("Failed to create app");
    app.run(50).expect("run should not fail on extinction");

    assert!(!app.running);
    assert!(app.went_extinct());
    assert_eq!(app.shutdown.exit_code(), EXTINCTION_EXIT_CODE);
    assert!(app.history.is_empty());
    assert!(matches!(
        app.shutdown.outcome(),
        RunOutcome::Extinct { generation: 0, .. }
    ));

    // The halted generation is still written out.
    let snapshot = load_snapshot(&save_path).expect("Failed to load halted snapshot");
    assert_eq!(snapshot.generation, 0);

    let _ = std::fs::remove_file(config_path);
    let _ = std::fs::remove_file(save_path);
}
