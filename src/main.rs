mod error;
mod field;
mod graphics;
mod math;
mod particle;
mod state;
mod terminal;
mod theme;
mod widget;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::event;
use field::{FrameStats, ParticleField};
use graphics::Canvas;
use rand::rngs::StdRng;
use rand::SeedableRng;
use state::{AppState, PointerState};
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::{Duration, Instant};
use terminal::TerminalSession;
use theme::Theme;
use tracing::info;
use tracing_subscriber::EnvFilter;
use widget::{Control, FieldWidget};

/// Interactive particle field that reacts to the mouse
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Colour theme; press `t` to switch while running
    #[arg(short, long, value_enum, default_value_t = Theme::Light)]
    theme: Theme,

    /// Target frames per second
    #[arg(long, default_value_t = 60, value_parser = clap::value_parser!(u32).range(1..=240))]
    fps: u32,

    /// Simulation units covered by one half-cell pixel
    #[arg(long, default_value_t = 8.0, value_parser = parse_scale)]
    scale: f64,

    /// Seed for particle placement; random when omitted
    #[arg(long)]
    seed: Option<u64>,

    /// Run this many frames off-screen and print a summary instead of
    /// opening the terminal
    #[arg(long, value_name = "FRAMES")]
    headless: Option<u32>,

    /// Viewport width in headless mode
    #[arg(long, default_value_t = 800.0)]
    width: f64,

    /// Viewport height in headless mode
    #[arg(long, default_value_t = 600.0)]
    height: f64,

    /// Write logs to this file
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,
}

fn parse_scale(value: &str) -> Result<f64, String> {
    let scale: f64 = value.parse().map_err(|_| format!("`{value}` is not a number"))?;
    if scale.is_finite() && scale > 0.0 {
        Ok(scale)
    } else {
        Err("scale must be a positive number".to_string())
    }
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Logs go to `log_file` when given. Otherwise only headless runs log, to
/// stderr, since the interactive terminal is the drawing surface.
fn init_tracing(log_file: Option<&Path>, headless: bool) -> Result<()> {
    if let Some(path) = log_file {
        let file = File::create(path)
            .with_context(|| format!("failed to create log file {}", path.display()))?;
        let _ = tracing_subscriber::fmt()
            .with_env_filter(env_filter())
            .with_ansi(false)
            .with_writer(Mutex::new(file))
            .try_init();
    } else if headless {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(env_filter())
            .with_writer(std::io::stderr)
            .try_init();
    }
    Ok(())
}

fn make_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

/// Synthetic pointer that sweeps left to right across the middle of the
/// viewport once every `period` frames
fn sweep_pointer(frame: u32, period: u32, viewport: [f64; 2]) -> PointerState {
    let t = (frame % period) as f64 / period as f64;
    PointerState::at([t * viewport[0], viewport[1] / 2.0])
}

fn run_headless(args: &Args, frames: u32) -> Result<()> {
    let viewport = [args.width, args.height];
    let mut canvas = Canvas::for_viewport(viewport, args.scale)?;
    let mut field = ParticleField::new(viewport, args.theme, make_rng(args.seed));

    let started = Instant::now();
    let mut stats = FrameStats::default();
    for frame in 0..frames {
        let pointer = sweep_pointer(frame, args.fps * 2, viewport);
        stats = field.frame(&pointer, &mut canvas);
    }

    info!(
        theme = %args.theme,
        frames,
        particles = stats.particles,
        connections = stats.connections,
        mean_residual = field.mean_residual(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "headless run finished"
    );
    Ok(())
}

fn run_interactive(args: &Args) -> Result<()> {
    let (cols, rows) = terminal::terminal_size()?;
    let mut data = AppState::new(args.theme);
    let mut widget = FieldWidget::new(cols, rows, args.scale, &data, make_rng(args.seed));
    info!(cols, rows, theme = %data.theme, "starting particle field");

    let mut session = TerminalSession::enter().context("failed to set up the terminal")?;
    let frame_interval = Duration::from_secs_f64(1.0 / args.fps as f64);
    let mut next_frame = Instant::now();

    loop {
        let timeout = next_frame.saturating_duration_since(Instant::now());
        if event::poll(timeout)? {
            if widget.event(&event::read()?, &mut data) == Control::Quit {
                break;
            }
            continue;
        }

        widget.tick(&data);
        widget.paint(session.out(), &data)?;

        next_frame += frame_interval;
        let now = Instant::now();
        if next_frame < now {
            next_frame = now + frame_interval;
        }
    }

    info!("particle field stopped");
    Ok(())
}

/// Main function
fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.log_file.as_deref(), args.headless.is_some())?;

    match args.headless {
        Some(frames) => run_headless(&args, frames),
        None => run_interactive(&args),
    }
}
