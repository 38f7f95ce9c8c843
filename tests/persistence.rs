mod common;

use common::small_config;
use critters_lib::app::{App, RunOptions};
use critters_lib::model::persistence::{
    export_genome, from_json, import_genome, load_snapshot, to_json, IoError,
};
use critters_lib::model::simulation::Simulation;
use critters_lib::model::snapshot::SimulationSnapshot;
use critters_lib::model::state::EntityKind;
use critters_lib::model::BrainLogic;
use std::path::PathBuf;

fn temp_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("critters_persist_{}_{}", std::process::id(), name))
}

#[test]
fn test_snapshot_restores_exact_population() {
    let mut sim = Simulation::new(small_config(17)).expect("Failed to create simulation");
    sim.run_generation().expect("Failed to run generation");

    let json = to_json(&sim.snapshot()).expect("Failed to serialize snapshot");
    let snapshot: SimulationSnapshot = from_json(&json).expect("Failed to parse snapshot");
    let mut restored = Simulation::from_snapshot(&snapshot).expect("Failed to restore");

    assert_eq!(restored.population.alive_count(), sim.population.alive_count());
    assert_eq!(restored.generation, sim.generation);
    assert!(restored.grid_consistent());

    let originals: Vec<_> = sim.population.iter_alive().map(|(_, e)| e).collect();
    for ((_, copy), original) in restored.population.iter_alive().zip(originals) {
        assert_eq!(copy.identity, original.identity);
        assert_eq!(copy.position, original.position);
        if let (Some(a), Some(b)) = (copy.neural(), original.neural()) {
            assert!(a.brain.same_parameters(&b.brain));
        }
    }

    restored.step().expect("Restored simulation should run");
}

#[test]
fn test_restored_brains_think_like_originals() {
    let sim = Simulation::new(small_config(4)).expect("Failed to create simulation");
    let snapshot: SimulationSnapshot =
        from_json(&to_json(&sim.snapshot()).unwrap()).expect("Failed to parse snapshot");
    let restored = Simulation::from_snapshot(&snapshot).expect("Failed to restore");

    let (_, original) = sim
        .population
        .iter_alive()
        .find(|(_, e)| e.kind == EntityKind::Prey)
        .expect("no prey");
    let (_, copy) = restored
        .population
        .iter_alive()
        .find(|(_, e)| e.identity == original.identity)
        .expect("prey missing after restore");

    let mut a = original.neural().unwrap().brain.clone();
    let mut b = copy.neural().unwrap().brain.clone();
    let inputs = vec![0.3; a.input_count()];
    assert_eq!(a.forward(&inputs).unwrap(), b.forward(&inputs).unwrap());
}

#[test]
fn test_genome_hex_dna_roundtrip() {
    let sim = Simulation::new(small_config(8)).expect("Failed to create simulation");
    let config = sim.config().clone();
    let (_, predator) = sim
        .population
        .iter_alive()
        .find(|(_, e)| e.kind == EntityKind::Predator)
        .expect("no predator");

    let hex = export_genome(predator).expect("Failed to export genome");
    let genome = import_genome(EntityKind::Predator, &hex, &config).expect("Failed to import");
    assert!(genome
        .as_neural()
        .unwrap()
        .brain
        .same_parameters(&predator.neural().unwrap().brain));

    let err = import_genome(EntityKind::Bouncer, &hex, &config).unwrap_err();
    assert!(matches!(err, IoError::Core(_)));
}

#[test]
fn test_app_saves_and_resumes() {
    let config_path = temp_path("config.toml");
    let save_path = temp_path("save.json.gz");
    let mut config = small_config(23);
    config.world.steps_per_generation = 5;
    std::fs::write(&config_path, toml::to_string(&config).expect("encode config"))
        .expect("Failed to write config");

    let mut app = App::new(RunOptions {
        config_path: config_path.clone(),
        save_path: Some(save_path.clone()),
        ..Default::default()
    })
    .expect("Failed to create app");
    app.run(1).expect("Failed to run");
    let generation = app.sim.generation;
    let alive = app.sim.population.alive_count();

    let snapshot = load_snapshot(&save_path).expect("Failed to load saved snapshot");
    assert_eq!(snapshot.generation, generation);
    assert_eq!(snapshot.entities.len(), alive);

    let resumed = App::new(RunOptions {
        config_path: config_path.clone(),
        load_path: Some(save_path.clone()),
        ..Default::default()
    })
    .expect("Failed to resume");
    assert_eq!(resumed.sim.generation, generation);
    assert_eq!(resumed.sim.population.alive_count(), alive);

    let _ = std::fs::remove_file(config_path);
    let _ = std::fs::remove_file(save_path);
}

#[test]
fn test_final_save_can_be_switched_off() {
    let config_path = temp_path("nosave_config.toml");
    let save_path = temp_path("nosave.json");
    let mut config = small_config(23);
    config.world.steps_per_generation = 5;
    std::fs::write(&config_path, toml::to_string(&config).expect("encode config"))
        .expect("Failed to write config");
    let _ = std::fs::remove_file(&save_path);

    let mut app = App::new(RunOptions {
        config_path: config_path.clone(),
        save_path: Some(save_path.clone()),
        no_final_save: true,
        ..Default::default()
    })
    .expect("Failed to create app");
    assert!(!app.shutdown.should_save_on_exit());
    app.run(1).expect("Failed to run");
    assert!(!save_path.exists());

    // Autosaves still land.
    let mut app = App::new(RunOptions {
        config_path: config_path.clone(),
        save_path: Some(save_path.clone()),
        autosave_every: 1,
        no_final_save: true,
        ..Default::default()
    })
    .expect("Failed to create app");
    app.run(1).expect("Failed to run");
    let snapshot = load_snapshot(&save_path).expect("Failed to load autosave");
    assert_eq!(snapshot.generation, app.sim.generation);

    let _ = std::fs::remove_file(config_path);
    let _ = std::fs::remove_file(save_path);
}
