use anyhow::Result;
use clap::Parser;
use critters_lib::app::{App, RunOptions};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Config file path, created with defaults if missing
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// Number of generations to run
    #[arg(short, long, default_value_t = 100)]
    generations: u64,

    /// Overrides the configured seed
    #[arg(short, long)]
    seed: Option<u64>,

    /// Snapshot to write at exit (`.gz` compresses)
    #[arg(long)]
    save: Option<PathBuf>,

    /// Snapshot to resume from instead of a random population
    #[arg(long)]
    load: Option<PathBuf>,

    /// Also save every N generations
    #[arg(long, default_value_t = 0)]
    autosave_every: u64,

    /// Only write the autosaves, not the snapshot at exit
    #[arg(long)]
    no_final_save: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    critters_lib::model::metrics::init_logging();

    let mut app = App::new(RunOptions {
        config_path: args.config,
        seed: args.seed,
        load_path: args.load,
        save_path: args.save,
        autosave_every: args.autosave_every,
        no_final_save: args.no_final_save,
    })?;
    app.run(args.generations)?;

    if let Some(last) = app.history.last() {
        println!(
            "Generation {}: {} survivors, {} kills",
            last.generation,
            last.survivor_total(),
            last.kills
        );
    }

    if app.went_extinct() {
        eprintln!("Simulation halted: a role went extinct");
        std::process::exit(app.shutdown.exit_code());
    }
    Ok(())
}
