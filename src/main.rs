//! The Knight headless runner
//!
//! Loads a map, plays a scene on autopilot at the fixed timestep and records
//! the outcome into a save slot. Rendering and real input live in the host
//! that embeds the library; this binary exercises the simulation end to end.

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result, bail};
use clap::Parser;

use the_knight::audio::MusicTrack;
use the_knight::consts::SIM_DT;
use the_knight::map::MapData;
use the_knight::render::build_frame;
use the_knight::settings::QualityPreset;
use the_knight::sim::{NextScene, Scene, SceneKind, TickOutcome, demo_input, tick};
use the_knight::{ArchiveSlot, Archives, Settings, Tuning};

#[derive(Debug, Parser)]
#[command(name = "the-knight", about = "Run a scene headless on autopilot")]
struct CliArgs {
    /// Tile-map JSON (object layer export)
    map: PathBuf,
    /// cliff, string_star or infinite_mode_cliff
    #[arg(long, default_value = "cliff")]
    scene: String,
    /// Marker object the player starts at
    #[arg(long, default_value = "player01")]
    start: String,
    /// Stop after this many ticks even if the scene is still running
    #[arg(long, default_value_t = 60 * 60 * 5)]
    ticks: u64,
    #[arg(long, default_value_t = 0x6b6e_6967_6874)]
    seed: u64,
    #[arg(long, default_value = "settings.json")]
    settings: PathBuf,
    /// Override the stored quality preset (low, medium, high)
    #[arg(long)]
    quality: Option<String>,
    /// Optional balance overrides
    #[arg(long)]
    tuning: Option<PathBuf>,
    #[arg(long, default_value = "archives.json")]
    archives: PathBuf,
    /// Save slot to record progress into (0-2)
    #[arg(long, default_value_t = 0)]
    slot: usize,
    /// Wipe the slot first and start a new game in it
    #[arg(long)]
    new_game: bool,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = CliArgs::parse();

    let Some(kind) = SceneKind::parse(&args.scene) else {
        bail!("unknown scene '{}'", args.scene);
    };
    let mut settings = Settings::load_from(&args.settings);
    if let Some(name) = &args.quality {
        let Some(preset) = QualityPreset::parse(name) else {
            bail!("unknown quality preset '{name}'");
        };
        settings.apply_preset(preset);
    }
    let tuning = match &args.tuning {
        Some(path) => Tuning::load_from(path)
            .with_context(|| format!("loading tuning from {}", path.display()))?,
        None => Tuning::default(),
    };
    let map = MapData::load(&args.map)
        .with_context(|| format!("loading map {}", args.map.display()))?;

    let mut archives = Archives::load_from(&args.archives)
        .with_context(|| format!("loading archives from {}", args.archives.display()))?;
    if args.new_game && archives.delete(args.slot).is_some() {
        log::info!("Cleared save slot {}", args.slot);
    }
    let mut slot = archives.get(args.slot).cloned().unwrap_or_default();
    if !slot.is_unlocked(kind) {
        let open: Vec<_> = slot.available().into_iter().map(SceneKind::name).collect();
        bail!(
            "scene '{}' is locked in slot {} (available: {})",
            kind.name(),
            args.slot,
            open.join(", ")
        );
    }

    let mut scene = Scene::with_start(kind, &map, &args.start, &settings, &tuning, args.seed)
        .with_context(|| format!("building scene from {}", args.map.display()))?;
    log::info!(
        "The Knight starting: {} ({:?} at {:.2}), {} quality",
        kind.name(),
        MusicTrack::for_scene(kind),
        scene.audio.bgm_volume(),
        settings.quality.name()
    );

    let mut cues = 0usize;
    let started = Instant::now();
    for _ in 0..args.ticks {
        let input = demo_input(&scene);
        match tick(&mut scene, &input, SIM_DT) {
            TickOutcome::Finished(exit) => {
                log::info!("Scene finished at tick {}: {:?}", scene.time_ticks, exit);
                break;
            }
            TickOutcome::SettingsRequested => scene.apply_settings(&settings),
            TickOutcome::Simulated | TickOutcome::Stalled => {}
        }
        cues += scene.audio.cues(&scene.events).len();
    }

    if settings.show_fps {
        let secs = started.elapsed().as_secs_f64();
        log::info!(
            "Simulated {} ticks in {:.2}s ({:.0} ticks/s)",
            scene.time_ticks,
            secs,
            scene.time_ticks as f64 / secs.max(1e-9)
        );
    }

    let frame = build_frame(&scene);
    log::info!(
        "Last frame: {} sprites, hud {:?}, {} sound cues played",
        frame.sprites.len(),
        frame.hud,
        cues
    );

    let next = if kind.is_infinite() {
        NextScene::MainMenu
    } else {
        NextScene::SceneSelect
    };
    let Some(result) = scene.conclude(next) else {
        log::warn!("Tick limit reached before the scene ended");
        return Ok(());
    };

    if let Some(unlocked) = slot.record(&result) {
        println!("Unlocked {}", unlocked.name());
    }
    if let Some(round) = result.round_reached {
        println!("Reached round {round}");
    }
    store(&mut archives, args.slot, slot)?;
    archives
        .save_to(&args.archives)
        .with_context(|| format!("saving archives to {}", args.archives.display()))?;
    println!(
        "{}: {}",
        kind.name(),
        if result.objective_completed { "completed" } else { "failed" }
    );
    Ok(())
}

fn store(archives: &mut Archives, index: usize, slot: ArchiveSlot) -> Result<()> {
    if !archives.store(index, slot) {
        bail!("save slot {index} does not exist");
    }
    Ok(())
}
