#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that boots the Geocoin Carrier experience.

mod config;
mod session;
mod terminal;

use std::{
    io::{self, BufRead, Write},
    path::PathBuf,
};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use geocoin_rendering::{Color, Presentation, RenderingBackend, Scene, Viewport};
use geocoin_rendering_macroquad::MacroquadBackend;
use geocoin_system_bootstrap::Bootstrap;
use geocoin_world::query;
use glam::Vec2;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::{
    config::Overrides,
    session::GameLoop,
    terminal::{Action, HELP},
};

/// Command-line arguments accepted by the `geocoin` binary.
#[derive(Debug, Parser)]
#[command(name = "geocoin", about = "Carry coins between caches scattered over a map grid")]
struct Args {
    /// TOML configuration file with a `version = 1` header and a `[world]` table.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Seed salting every luck roll.
    #[arg(long, conflicts_with = "random_seed")]
    seed: Option<u64>,
    /// Picks a fresh luck seed for this run.
    #[arg(long)]
    random_seed: bool,
    /// Radius, in cells, of the neighbourhood revealed around the player.
    #[arg(long)]
    radius: Option<u32>,
    /// Side length of a cell in degrees.
    #[arg(long)]
    tile_degrees: Option<f64>,
    /// Probability that a cell hosts a cache.
    #[arg(long)]
    spawn_probability: Option<f64>,
    /// Logs world activity at debug level unless `RUST_LOG` says otherwise.
    #[arg(short, long)]
    verbose: bool,
    #[command(subcommand)]
    mode: Option<Mode>,
}

/// Front ends the session can be played through.
#[derive(Debug, Subcommand)]
enum Mode {
    /// Interactive terminal session.
    Play,
    /// Runs a comma separated list of actions and prints the final state.
    Script {
        /// Actions such as `n,e,collect 1 2,d 0 0`.
        #[arg(long)]
        moves: String,
    },
    /// Graphical map view.
    Window {
        /// Zoom level of the map.
        #[arg(long, default_value_t = 400_000.0)]
        pixels_per_degree: f64,
        /// Renders as fast as possible instead of synchronising with the display.
        #[arg(long)]
        no_vsync: bool,
    },
}

impl Args {
    fn overrides(&self) -> Overrides {
        Overrides {
            seed: self.seed,
            random_seed: self.random_seed,
            radius: self.radius,
            tile_degrees: self.tile_degrees,
            spawn_probability: self.spawn_probability,
        }
    }
}

/// Entry point for the Geocoin Carrier command-line interface.
fn main() -> Result<()> {
    let args = Args::parse();
    install_tracing(args.verbose);

    let config = config::load(args.config.as_deref(), args.overrides())?;
    let game = GameLoop::new(config).context("failed to create game session")?;

    match args.mode.unwrap_or(Mode::Play) {
        Mode::Play => play(game),
        Mode::Script { moves } => script(game, &moves),
        Mode::Window {
            pixels_per_degree,
            no_vsync,
        } => window(game, pixels_per_degree, !no_vsync),
    }
}

fn install_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn new_scene(game: &mut GameLoop) -> Scene {
    let mut scene = Scene::new(query::player_position(game.world()));
    let _ = game.start(&mut scene);
    scene
}

/// Outcome of performing a single action.
enum Flow {
    Continue,
    Quit,
}

fn perform(
    game: &mut GameLoop,
    scene: &mut Scene,
    action: Action,
    output: &mut impl Write,
) -> Result<Flow> {
    match action {
        Action::Play(command) => {
            let events = game.submit(command, scene);
            let lines = terminal::describe_events(&events);
            if lines.is_empty() {
                writeln!(output, "Nothing happened.")?;
            }
            for line in lines {
                writeln!(output, "{line}")?;
            }
        }
        Action::Look => {
            writeln!(output, "{}", terminal::describe_position(game.world()))?;
            writeln!(output, "{}", terminal::describe_caches(game.world(), scene))?;
        }
        Action::Inventory => writeln!(output, "{}", terminal::describe_inventory(scene))?,
        Action::Help => writeln!(output, "{HELP}")?,
        Action::Quit => return Ok(Flow::Quit),
    }
    Ok(Flow::Continue)
}

fn play(mut game: GameLoop) -> Result<()> {
    let mut scene = new_scene(&mut game);
    let stdin = io::stdin();
    let mut stdout = io::stdout().lock();

    writeln!(stdout, "{}", Bootstrap.welcome_banner(game.world()))?;
    writeln!(stdout, "Type `help` for a list of actions.")?;
    writeln!(stdout, "{}", terminal::describe_position(game.world()))?;

    for line in stdin.lock().lines() {
        let line = line.context("failed to read from standard input")?;
        if line.trim().is_empty() {
            continue;
        }
        match terminal::parse_action(&line) {
            Ok(action) => {
                if let Flow::Quit = perform(&mut game, &mut scene, action, &mut stdout)? {
                    break;
                }
            }
            Err(error) => writeln!(stdout, "{error:#}")?,
        }
        stdout.flush().context("failed to flush standard output")?;
    }

    info!("terminal session finished");
    Ok(())
}

fn script(mut game: GameLoop, moves: &str) -> Result<()> {
    let actions = terminal::parse_script(moves)?;
    let mut scene = new_scene(&mut game);
    let mut stdout = io::stdout().lock();

    for action in actions {
        if let Flow::Quit = perform(&mut game, &mut scene, action, &mut stdout)? {
            break;
        }
    }

    writeln!(stdout, "{}", terminal::describe_position(game.world()))?;
    writeln!(stdout, "{}", terminal::describe_inventory(&scene))?;
    writeln!(stdout, "{}", terminal::describe_caches(game.world(), &scene))?;
    Ok(())
}

fn window(mut game: GameLoop, pixels_per_degree: f64, vsync: bool) -> Result<()> {
    let scene = new_scene(&mut game);
    let viewport = Viewport::new(scene.player, pixels_per_degree, Vec2::new(960.0, 960.0))
        .context("invalid map zoom level")?;
    let presentation = Presentation::new(
        Bootstrap.welcome_banner(game.world()),
        Color::from_rgb_u8(28, 34, 38),
        viewport,
        scene,
    );

    MacroquadBackend::default().with_vsync(vsync).run(
        presentation,
        move |input, viewport, scene| game.handle_frame(input, viewport, scene),
    )
}
