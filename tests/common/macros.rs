/// Asserts that every living entity sits on the cell that references it.
#[macro_export]
macro_rules! assert_grid_consistent {
    ($sim:expr) => {
        assert!(
            $sim.grid_consistent(),
            "Grid and population disagree at tick {}",
            $sim.tick
        )
    };
}

/// Asserts that the entity at population index `$index` is alive at `$pos`.
#[macro_export]
macro_rules! assert_alive_at {
    ($sim:expr, $index:expr, $pos:expr) => {
        let id = critters_lib::model::population::EntityId($index);
        assert!($sim.population.is_alive(id), "Entity {} should be alive", id);
        let entity = $sim.population.get(id).expect("Entity not found");
        assert_eq!(entity.position, $pos, "Entity {} is not where expected", id);
    };
}

/// Asserts that the entity at population index `$index` is dead.
#[macro_export]
macro_rules! assert_dead {
    ($sim:expr, $index:expr) => {
        let id = critters_lib::model::population::EntityId($index);
        assert!(
            !$sim.population.is_alive(id),
            "Entity {} should be dead but is alive",
            id
        );
    };
}

/// Asserts the number of living entities.
#[macro_export]
macro_rules! assert_population {
    ($sim:expr, $count:expr) => {
        assert_eq!(
            $sim.population.alive_count(),
            $count,
            "Population count mismatch"
        )
    };
}
