mod demo;

use clap::{Parser, Subcommand};
use glam::{Vec2, Vec3};
use tableau_render::{DebugTextRenderer, Renderer, RenderView};
use tableau_runtime::{FrameloopMode, PhysicsChoice, World, WorldConfig};
use tableau_sim::{SIM_DT, dim3};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "tableau-cli", about = "CLI tool for tableau scene runtime")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print runtime version and crate info
    Info,
    /// Run the demo scene headless and print what the camera sees
    Run {
        /// Number of frames to simulate
        #[arg(short, long, default_value = "180")]
        frames: u64,
        /// Click the spin cube at this frame (0 disables)
        #[arg(short, long, default_value = "60")]
        click_at: u64,
    },
    /// Run the demo scene twice and compare simulation state hashes
    Determinism {
        /// Number of frames per run
        #[arg(short, long, default_value = "300")]
        frames: u64,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match cli.command {
        Commands::Info => {
            println!("tableau-cli v{}", env!("CARGO_PKG_VERSION"));
            println!("common: {}", tableau_common::crate_info());
            println!("scene: {}", tableau_scene::crate_info());
            println!("sim: {}", tableau_sim::crate_info());
            println!("render: {}", tableau_render::crate_info());
            println!("runtime: {}", tableau_runtime::crate_info());
        }
        Commands::Run { frames, click_at } => {
            let mut world = demo_world()?;
            world.start();

            let surface = Vec2::new(800.0, 600.0);
            let renderer = DebugTextRenderer::new();

            for frame in 1..=frames {
                if click_at != 0 && frame == click_at {
                    // Aim at the scene center, where the spin cube sits.
                    world.pointer_moved(Vec2::new(400.0, 300.0), surface);
                    world.pointer_clicked();
                }
                world.advance(SIM_DT);
            }

            println!("{}", renderer.render(world.scene(), world.view()));
            let stats = world.stats();
            println!(
                "Frames: {} ({:.1}s simulated), transients live: {}",
                stats.frames,
                stats.elapsed,
                world.transient_count()
            );
            if let Some(hash) = world.state_hash() {
                println!("State hash: {hash:#x}");
            }
        }
        Commands::Determinism { frames } => {
            println!("Determinism check: {frames} frames per run");
            let first = run_headless(frames)?;
            let second = run_headless(frames)?;
            println!("Run 1: {first:#x}");
            println!("Run 2: {second:#x}");
            if first != second {
                anyhow::bail!("state hashes diverged across identical runs");
            }
            println!("Match: OK");
        }
    }

    Ok(())
}

fn demo_world() -> anyhow::Result<World> {
    let mut world = World::new(WorldConfig {
        mode: FrameloopMode::Continuous,
        physics: PhysicsChoice::ThreeD(dim3::SimConfig::default()),
        view: RenderView {
            eye: Vec3::new(0.0, 4.0, 14.0),
            target: Vec3::new(0.0, 1.0, 0.0),
            fov_degrees: 60.0,
        },
    })?;
    demo::populate(&mut world);
    Ok(world)
}

fn run_headless(frames: u64) -> anyhow::Result<u64> {
    let mut world = demo_world()?;
    world.start();
    for _ in 0..frames {
        world.advance(SIM_DT);
    }
    world
        .state_hash()
        .ok_or_else(|| anyhow::anyhow!("demo world has no physics"))
}
