mod demo;

use std::path::PathBuf;

use anyhow::Context;
use blockyard_author::BlockEditor;
use blockyard_collision::{BoxCollider, Raycaster};
use blockyard_kernel::{Clock, Rigidbody, SimConfig};
use blockyard_tools::{ClockInspector, WorldInspector};
use clap::{Parser, Subcommand};
use glam::Vec3;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "blockyard-cli", about = "CLI tool for blockyard simulation demos")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print version and crate info
    Info,
    /// Drop a body onto the demo floor under a jittery frame rate
    Simulate {
        /// Wall-clock seconds to simulate
        #[arg(short, long, default_value = "3")]
        seconds: f64,
        /// Average frames per second
        #[arg(short, long, default_value = "60")]
        fps: f64,
        /// JSON sim config (clock and body settings)
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Pause the clock at this many seconds
        #[arg(long)]
        pause_at: Option<f64>,
        /// Length of the pause in seconds
        #[arg(long, default_value = "0.5")]
        pause_for: f64,
        /// Direction the body looks in, for per-frame targeting
        #[arg(long, value_parser = parse_vec3, allow_hyphen_values = true, default_value = "1,-0.5,1")]
        look: Vec3,
    },
    /// Cast a ray into the demo world and report the nearest hit
    Raycast {
        /// Ray origin as x,y,z
        #[arg(long, value_parser = parse_vec3, allow_hyphen_values = true, default_value = "0.5,5,0.5")]
        origin: Vec3,
        /// Ray direction as x,y,z
        #[arg(long, value_parser = parse_vec3, allow_hyphen_values = true, default_value = "0,-1,0")]
        dir: Vec3,
    },
    /// Place and remove blocks by raycast, then undo everything
    Edit,
}

/// Targeting range for the per-frame look ray.
const LOOK_RANGE: f32 = 50.0;

fn parse_vec3(s: &str) -> Result<Vec3, String> {
    let parts = s
        .split(',')
        .map(|p| p.trim().parse::<f32>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| format!("invalid component in '{s}': {e}"))?;
    match parts[..] {
        [x, y, z] => Ok(Vec3::new(x, y, z)),
        _ => Err(format!("expected x,y,z, got '{s}'")),
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match cli.command {
        Commands::Info => {
            println!("blockyard-cli v{}", env!("CARGO_PKG_VERSION"));
            println!("collision: {}", blockyard_collision::crate_info());
            println!("kernel: {}", blockyard_kernel::crate_info());
            println!("world: {}", blockyard_world::crate_info());
            println!("author: {}", blockyard_author::crate_info());
            println!("tools: {}", blockyard_tools::crate_info());
        }
        Commands::Simulate {
            seconds,
            fps,
            config,
            pause_at,
            pause_for,
            look,
        } => simulate(seconds, fps, config, pause_at, pause_for, look)?,
        Commands::Raycast { origin, dir } => {
            let world = demo::demo_world()?;
            let ray = Raycaster::new(origin, dir)?;
            let editor = BlockEditor::new();
            match editor.pick(&world, &ray) {
                Some(pick) => {
                    let p = pick.hit.point;
                    println!(
                        "Hit {} collider at distance {:.3}, point=({:.2}, {:.2}, {:.2}), normal={:?}, side={}",
                        pick.kind, pick.hit.distance, p.x, p.y, p.z, pick.hit.face_normal, pick.side
                    );
                    if let Some(coord) = pick.coord {
                        println!("Block: {coord:?}");
                    }
                }
                None => println!("No hit"),
            }
        }
        Commands::Edit => edit()?,
    }

    Ok(())
}

fn simulate(
    seconds: f64,
    fps: f64,
    config: Option<PathBuf>,
    pause_at: Option<f64>,
    pause_for: f64,
    look: Vec3,
) -> anyhow::Result<()> {
    anyhow::ensure!(fps > 0.0 && fps.is_finite(), "fps must be positive, got {fps}");
    anyhow::ensure!(seconds >= 0.0, "seconds must be non-negative, got {seconds}");

    let config = match config {
        Some(path) => SimConfig::load(&path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => SimConfig::default(),
    };
    let world = demo::demo_world()?;
    let mut clock = Clock::new(config.clock)?;
    let mut body = Rigidbody::new(config.body)?;
    let mut position = Vec3::new(-1.5, 6.0, -1.5);

    println!(
        "Simulating {seconds}s at ~{fps} fps, tick={:.3}ms",
        clock.tick_length_ms()
    );
    tracing::info!(start = ?position, "body spawned");

    // Frame times alternate long and short so ticks per frame vary.
    let base_ms = 1000.0 / fps;
    let end_ms = seconds * 1000.0;
    let pause_window = pause_at.map(|at| (at * 1000.0, (at + pause_for) * 1000.0));
    let mut now_ms = 0.0;
    let mut frame = 0u64;
    let mut failure = None;
    let mut target = None;

    while now_ms <= end_ms {
        if let Some((start, stop)) = pause_window {
            if now_ms >= start && now_ms < stop {
                clock.pause(now_ms);
            } else if now_ms >= stop {
                clock.resume(now_ms);
            }
        }

        let _frame = tracing::info_span!("frame", frame).entered();
        let registry = world.registry();
        let views = registry.collidables();
        clock.update_with(now_ms, |tick_ms| {
            if failure.is_some() {
                return;
            }
            body.update((tick_ms / 1000.0) as f32, &mut position);
            if let Err(e) = demo::resolve_contacts(&views, &mut body, &mut position) {
                failure = Some(e);
            }
        });
        if let Some(e) = failure.take() {
            return Err(e.into());
        }

        match Raycaster::new(position, look) {
            Ok(ray) => {
                let ray = ray.with_max_distance(LOOK_RANGE);
                target = ray.nearest_hit(views.iter()).map(|t| {
                    let side = Raycaster::hit_side(t.hit.face_normal);
                    (t.target.kind(), t.hit.distance, side)
                });
            }
            Err(e) => tracing::warn!(error = %e, "skipping targeting ray"),
        }

        frame += 1;
        now_ms += if frame % 3 == 0 { base_ms * 1.5 } else { base_ms * 0.75 };
    }

    let v = body.velocity();
    println!(
        "Final: pos=({:.3}, {:.3}, {:.3}) vel=({:.3}, {:.3}, {:.3}) grounded={}",
        position.x,
        position.y,
        position.z,
        v.x,
        v.y,
        v.z,
        body.is_colliding()
    );
    println!("Frames: {frame}");
    match target {
        Some((kind, distance, side)) => {
            println!("Looking at: {kind} collider {distance:.2} away, side={side}")
        }
        None => println!("Looking at: nothing within {LOOK_RANGE}"),
    }
    println!("{}", ClockInspector::summary(&clock));
    println!("{}", WorldInspector::summary(&world));
    Ok(())
}

fn edit() -> anyhow::Result<()> {
    let mut world = demo::demo_world()?;
    world.drain_events();
    let mut editor = BlockEditor::new();

    let player_at = Vec3::new(0.5, demo::BODY_HALF_EXTENTS.y, 0.5);
    editor.set_blocker(Some(BoxCollider::new(demo::BODY_HALF_EXTENTS, player_at)?));
    println!("{}", WorldInspector::summary(&world));

    let down = |x: f32, z: f32| Raycaster::new(Vec3::new(x, 10.0, z), Vec3::NEG_Y);

    let placed = editor.place_adjacent(&mut world, &down(-2.5, 0.5)?)?;
    println!("Placed block at {placed:?}");
    let stacked = editor.place_adjacent(&mut world, &down(-2.5, 0.5)?)?;
    println!("Stacked block at {stacked:?}");

    let side = Raycaster::new(Vec3::new(-6.0, 0.5, 0.5), Vec3::X)?;
    let beside = editor.place_adjacent(&mut world, &side)?;
    println!("Placed block against the side at {beside:?}");

    let removed = editor.remove_targeted(&mut world, &down(3.5, -3.5)?)?;
    println!("Removed block at {removed:?}");

    match editor.place_adjacent(&mut world, &down(0.5, 0.5)?) {
        Ok(coord) => println!("Placed block at {coord:?}"),
        Err(e) => println!("Refused: {e}"),
    }

    println!("{}", WorldInspector::summary(&world));

    let mut undone = 0;
    while editor.undo(&mut world)? {
        undone += 1;
    }
    println!("Undid {undone} edits, {} events logged", world.events().len());
    println!("{}", WorldInspector::summary(&world));
    Ok(())
}
