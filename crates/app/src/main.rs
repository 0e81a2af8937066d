mod script;

use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::{Path, PathBuf},
};

use clap::{Parser, Subcommand};
use gesture_fx_core::{
    AppConfig, GestureFxError, LandmarkFrame, RenderStats, Renderer, Simulation, TickReport,
};
use tracing_subscriber::EnvFilter;

fn main() -> gesture_fx_core::Result<()> {
    init_tracing();

    let cli = Cli::parse();

    match cli.command {
        Commands::Demo { seed, config } => run_demo(seed, config.as_deref()),
        Commands::Replay {
            input,
            seed,
            config,
        } => run_replay(&input, seed, config.as_deref()),
        Commands::Config { output } => write_default_config(&output),
    }
}

fn load_config(path: Option<&Path>) -> gesture_fx_core::Result<AppConfig> {
    match path {
        Some(path) => {
            tracing::info!(?path, "loading configuration");
            AppConfig::load(path)
        }
        None => Ok(AppConfig::default()),
    }
}

fn run_demo(seed: u64, config: Option<&Path>) -> gesture_fx_core::Result<()> {
    let config = load_config(config)?;
    tracing::info!(seed, "starting scripted demo");

    let frames = script::demo_session(config.viewport);
    let mut session = Session::new(config, seed);
    for frame in &frames {
        session.advance(frame)?;
    }
    session.finish();
    Ok(())
}

fn run_replay(input: &Path, seed: u64, config: Option<&Path>) -> gesture_fx_core::Result<()> {
    let config = load_config(config)?;
    tracing::info!(?input, seed, "replaying landmark recording");

    let reader = BufReader::new(File::open(input)?);
    let mut session = Session::new(config, seed);
    for (number, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let frame: LandmarkFrame = serde_json::from_str(&line).map_err(|err| {
            GestureFxError::msg(format!("{}:{}: {err}", input.display(), number + 1))
        })?;
        session.advance(&frame)?;
    }
    session.finish();
    Ok(())
}

fn write_default_config(output: &Path) -> gesture_fx_core::Result<()> {
    tracing::info!(?output, "writing default configuration");
    let json = AppConfig::default().to_json_pretty()?;
    std::fs::write(output, json)?;
    Ok(())
}

/// Simulation paired with the headless renderer.
struct Session {
    simulation: Simulation,
    renderer: RenderStats,
    events: usize,
}

impl Session {
    fn new(config: AppConfig, seed: u64) -> Self {
        Self {
            simulation: Simulation::new(config, seed),
            renderer: RenderStats::new(),
            events: 0,
        }
    }

    fn advance(&mut self, frame: &LandmarkFrame) -> gesture_fx_core::Result<()> {
        let report = self.simulation.tick(frame);
        self.log_events(&report)?;
        self.renderer.draw(&self.simulation.snapshot())
    }

    fn log_events(&mut self, report: &TickReport) -> gesture_fx_core::Result<()> {
        for event in &report.events {
            self.events += 1;
            let json = serde_json::to_string(event)?;
            tracing::info!(tick = report.tick, event = %json, "simulation event");
        }
        Ok(())
    }

    fn finish(&self) {
        let counts = self.simulation.world().counts();
        tracing::info!(
            ticks = self.simulation.ticks(),
            elapsed = self.simulation.elapsed(),
            events = self.events,
            peak_primitives = self.renderer.peak_primitives(),
            ?counts,
            "session finished"
        );
    }
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .try_init();
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Hand-gesture driven particle effects", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Play a scripted gesture session through synthetic landmarks.
    Demo {
        /// Seed for every random draw in the simulation.
        #[arg(short, long, default_value_t = 0)]
        seed: u64,
        /// Optional JSON configuration file.
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Drive the simulation from a JSON-lines landmark recording.
    Replay {
        /// File with one landmark frame per line.
        input: PathBuf,
        #[arg(short, long, default_value_t = 0)]
        seed: u64,
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Write the default configuration as JSON.
    Config {
        /// Destination path.
        output: PathBuf,
    },
}
