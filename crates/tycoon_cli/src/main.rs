use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::path::{Path, PathBuf};
use tycoon_control::{AutopilotController, CommandSource};
use tycoon_core::{Action, EventLevel, GameContent, GameState};
use tycoon_core::world_events::drop_foreign_time_boxes;
use tycoon_world::{build_initial_state, load_content, load_game, JsonFileStore, SaveStore};

/// Simulated wall-clock milliseconds per tick in headless runs.
const MS_PER_TICK: u64 = 1_000;

// ---------------------------------------------------------------------------
// CLI definition
// ---------------------------------------------------------------------------

#[derive(Parser)]
#[command(name = "tycoon_cli", about = "Hacker tycoon simulation CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play a career headless with the autopilot for a fixed number of ticks.
    Run {
        #[arg(long)]
        ticks: u64,
        /// Seed for a new career. Ignored when a save is resumed.
        #[arg(long)]
        seed: Option<u64>,
        /// Resume from and save back to this directory.
        #[arg(long)]
        save_dir: Option<PathBuf>,
        #[arg(long, default_value = "player_one")]
        player: String,
        #[arg(long, default_value = "./content")]
        content_dir: String,
        #[arg(long, default_value_t = 600)]
        print_every: u64,
        #[arg(long, default_value = "normal", value_parser = ["normal", "debug"])]
        event_level: String,
        /// Sample metrics every N ticks.
        #[arg(long, default_value_t = 60)]
        metrics_every: u64,
        /// Disable metrics collection to the runs/ directory.
        #[arg(long)]
        no_metrics: bool,
    },
    /// Factory reset: replace a save with a brand-new career.
    Reset {
        #[arg(long)]
        save_dir: PathBuf,
        #[arg(long, default_value = "player_one")]
        player: String,
        #[arg(long, default_value = "./content")]
        content_dir: String,
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Print the status line of a saved career.
    Status {
        #[arg(long)]
        save_dir: PathBuf,
        #[arg(long, default_value = "player_one")]
        player: String,
        #[arg(long, default_value = "./content")]
        content_dir: String,
    },
}

struct RunOptions {
    ticks: u64,
    seed: Option<u64>,
    save_dir: Option<PathBuf>,
    player: String,
    content_dir: String,
    print_every: u64,
    event_level: EventLevel,
    metrics_every: u64,
    no_metrics: bool,
}

// ---------------------------------------------------------------------------
// Run loop
// ---------------------------------------------------------------------------

fn generate_run_id(seed: u64) -> String {
    format!("{}_seed{seed}", chrono::Utc::now().format("%Y%m%d_%H%M%S"))
}

fn create_run_dir(run_id: &str) -> Result<PathBuf> {
    let dir = PathBuf::from("runs").join(run_id);
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("creating run directory: {}", dir.display()))?;
    Ok(dir)
}

fn write_run_info(dir: &Path, run_id: &str, state: &GameState, opts: &RunOptions) -> Result<()> {
    let info = serde_json::json!({
        "run_id": run_id,
        "seed": state.meta.seed,
        "player_id": state.meta.player_id,
        "start_tick": state.meta.tick,
        "content_version": state.meta.content_version,
        "metrics_every": opts.metrics_every,
        "runner": "tycoon_cli",
        "args": {
            "ticks": opts.ticks,
            "print_every": opts.print_every,
        }
    });
    let path = dir.join("run_info.json");
    let file =
        std::fs::File::create(&path).with_context(|| format!("creating {}", path.display()))?;
    serde_json::to_writer_pretty(file, &info)
        .with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}

fn new_career(content: &GameContent, seed: Option<u64>, player: &str) -> (GameState, ChaCha8Rng) {
    let seed = seed.unwrap_or_else(rand::random);
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let state = build_initial_state(content, seed, player, &mut rng);
    (state, rng)
}

/// Resumed careers reseed from seed and tick so a resumed run does not
/// replay the random stream from the start.
fn resumed_rng(state: &GameState) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(state.meta.seed ^ state.meta.tick.rotate_left(32))
}

fn run(opts: &RunOptions) -> Result<()> {
    let content = load_content(&opts.content_dir)?;

    let store = opts
        .save_dir
        .as_ref()
        .map(|dir| JsonFileStore::new(dir, &opts.player));
    if let Some(store) = &store {
        store.init().context("preparing save directory")?;
    }
    let loaded = match &store {
        Some(store) => load_game(store, &content).context("loading save")?,
        None => None,
    };
    let (mut state, mut rng) = match loaded {
        Some(mut state) => {
            println!("Resuming {} at tick {}", state.meta.player_id, state.meta.tick);
            let now_ms = state.meta.tick * MS_PER_TICK;
            if drop_foreign_time_boxes(&mut state, now_ms, content.constants.shadow_access_secs) {
                println!("Closed signal/shadow windows timed against another clock");
            }
            let rng = resumed_rng(&state);
            (state, rng)
        }
        None => new_career(&content, opts.seed, &opts.player),
    };

    let mut metrics_writer: Option<tycoon_core::MetricsFileWriter> = None;
    if !opts.no_metrics {
        let run_id = generate_run_id(state.meta.seed);
        let run_dir = create_run_dir(&run_id)?;
        write_run_info(&run_dir, &run_id, &state, opts)?;
        let writer = tycoon_core::MetricsFileWriter::new(run_dir.clone())
            .with_context(|| format!("opening metrics CSV in {}", run_dir.display()))?;
        metrics_writer = Some(writer);
        println!("Run directory: {}", run_dir.display());
    }

    let mut autopilot = AutopilotController::default();
    let print_every = opts.print_every.max(1);
    let metrics_every = opts.metrics_every.max(1);

    println!(
        "Starting career: ticks={} seed={} player={} content_version={}",
        opts.ticks, state.meta.seed, state.meta.player_id, content.content_version,
    );
    println!("{}", "-".repeat(80));

    for _ in 0..opts.ticks {
        let now_ms = state.meta.tick * MS_PER_TICK;
        let mut events = Vec::new();
        for command in autopilot.generate_commands(&state, &content, now_ms) {
            let action = Action::Player(command);
            match tycoon_core::apply(&mut state, &action, &content, &mut rng, now_ms) {
                Ok(mut emitted) => events.append(&mut emitted),
                Err(err) if opts.event_level == EventLevel::Debug => {
                    println!("    rejected: {err}");
                }
                Err(_) => {}
            }
        }
        events.extend(tycoon_core::tick(&mut state, &content, &mut rng, now_ms));

        for envelope in &events {
            if envelope.event.level() <= opts.event_level {
                println!("  {} t={:06} {:?}", envelope.id.0, envelope.tick, envelope.event);
            }
        }

        if state.meta.tick % print_every == 0 {
            print_status(&state);
        }

        if let Some(ref mut writer) = metrics_writer {
            if state.meta.tick % metrics_every == 0 {
                let snapshot = tycoon_core::compute_metrics(&state, &content);
                writer.write_row(&snapshot).context("writing metrics row")?;
            }
        }
    }

    println!("{}", "-".repeat(80));
    println!("Done. Final state at tick {}:", state.meta.tick);
    print_status(&state);

    if let Some(ref mut writer) = metrics_writer {
        writer.flush().context("final metrics flush")?;
        println!("Metrics written to runs/ directory.");
    }
    if let Some(store) = &store {
        store.save(&state).context("saving career")?;
        println!("Saved to {}", store.path().display());
    }
    Ok(())
}

fn reset(save_dir: &Path, player: &str, content_dir: &str, seed: Option<u64>) -> Result<()> {
    let content = load_content(content_dir)?;
    let store = JsonFileStore::new(save_dir, player);
    store.init().context("preparing save directory")?;
    store.delete().context("deleting old save")?;
    let (state, _) = new_career(&content, seed, player);
    store.save(&state).context("writing fresh save")?;
    println!("Reset {player}: new career with seed {}", state.meta.seed);
    Ok(())
}

fn status(save_dir: &Path, player: &str, content_dir: &str) -> Result<()> {
    let content = load_content(content_dir)?;
    let store = JsonFileStore::new(save_dir, player);
    let Some(state) = load_game(&store, &content).context("loading save")? else {
        bail!("no save for {player} in {}", save_dir.display());
    };
    print_status(&state);
    Ok(())
}

fn print_status(state: &GameState) {
    let player = &state.player;
    let hour = state.clock.time_of_day.floor();
    let minute = ((state.clock.time_of_day - hour) * 60.0).floor();
    let project = player.active_project.as_ref().map_or_else(
        || "-".to_string(),
        |p| format!("{}:{:.0}/{:.0}", p.name, p.progress, p.target_lines),
    );

    println!(
        "[tick={tick:06}  day={day:3}  {hour:02}:{minute:02}]  \
         money={money:10.2}  shadow={shadow:8.2}  rep={rep:4} ({tier:?})  \
         energy={energy:5.1}  temp={temp:5.1}{hot}  trace={trace:5.1}  heat={heat:5.1}  \
         loc={loc:.0}  released={released}  project={project}",
        tick = state.meta.tick,
        day = state.clock.day,
        money = player.money,
        shadow = player.shadow_credits,
        rep = player.reputation,
        tier = player.tier,
        energy = player.energy,
        temp = player.temperature,
        hot = if player.is_overheating { "!" } else { "" },
        trace = state.risk.trace_percent,
        heat = state.risk.global_heat,
        loc = player.lines_of_code,
        released = player.released_projects.len(),
    );
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Run {
            ticks,
            seed,
            save_dir,
            player,
            content_dir,
            print_every,
            event_level,
            metrics_every,
            no_metrics,
        } => {
            let event_level = match event_level.as_str() {
                "debug" => EventLevel::Debug,
                _ => EventLevel::Normal,
            };
            run(&RunOptions {
                ticks,
                seed,
                save_dir,
                player,
                content_dir,
                print_every,
                event_level,
                metrics_every,
                no_metrics,
            })?;
        }
        Commands::Reset {
            save_dir,
            player,
            content_dir,
            seed,
        } => reset(&save_dir, &player, &content_dir, seed)?,
        Commands::Status {
            save_dir,
            player,
            content_dir,
        } => status(&save_dir, &player, &content_dir)?,
    }
    Ok(())
}
