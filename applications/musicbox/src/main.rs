/// Sugoitify Music Box - GPIO button and LED front panel
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use sugoi_core::sim::ClockedEngine;
use sugoi_core::{AudioEngine, DigitalIo};
use sugoi_musicbox::{
    backends::console::{self, ConsoleIo},
    config::MusicBoxConfig,
    scan_tracks, MusicBox,
};

#[derive(Parser)]
#[command(name = "musicbox")]
#[command(about = "Sugoitify music box: GPIO buttons and LEDs driving playback", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable debug logging (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the music box
    Run {
        /// Configuration file path
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Use the console backend instead of the GPIO header
        #[arg(long)]
        simulate: bool,
    },
    /// Load and validate the configuration, then scan the library
    CheckConfig {
        /// Configuration file path
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Print the configured pin assignments
    Pinout {
        /// Configuration file path
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let default_filter = if cli.verbose {
        "musicbox=debug,sugoi_musicbox=debug,sugoi_playback=debug,sugoi_core=debug"
    } else {
        "musicbox=info,sugoi_musicbox=info,sugoi_playback=info,sugoi_core=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .init();

    match cli.command {
        Commands::Run { config, simulate } => {
            run(config.as_deref(), simulate).await?;
        }
        Commands::CheckConfig { config } => {
            check_config(config.as_deref())?;
        }
        Commands::Pinout { config } => {
            pinout(config.as_deref())?;
        }
    }

    Ok(())
}

async fn run(config_path: Option<&Path>, simulate: bool) -> anyhow::Result<()> {
    let config = MusicBoxConfig::load(config_path)?;
    config.validate()?;

    tracing::info!("Starting Sugoitify music box");
    tracing::info!("Library: {}", config.library.music_dir.display());

    let tracks = scan_tracks(&config.library.music_dir, &config.library.extensions)?;

    // Audio output is simulated; tracks last simulation.track_length_secs
    let engine: Arc<dyn AudioEngine> = Arc::new(ClockedEngine::new(config.track_length()));

    if simulate || !cfg!(feature = "rpi") {
        if !simulate {
            tracing::warn!("Built without the rpi feature, running the console simulation");
        }

        let io = Arc::new(ConsoleIo::new(config.indicators.named_pins()));
        let music_box = MusicBox::build(
            &config,
            tracks,
            Arc::clone(&io) as Arc<dyn DigitalIo>,
            engine,
        )?;

        let bindings = config.input_bindings()?;
        ConsoleIo::print_keymap(&bindings);
        let keyboard = console::spawn_keyboard(io, bindings, config.input_period() * 2);

        music_box.run(shutdown_signal()).await?;
        keyboard.abort();
        return Ok(());
    }

    run_gpio(&config, tracks, engine).await
}

#[cfg(feature = "rpi")]
async fn run_gpio(
    config: &MusicBoxConfig,
    tracks: Vec<PathBuf>,
    engine: Arc<dyn AudioEngine>,
) -> anyhow::Result<()> {
    let io: Arc<dyn DigitalIo> = Arc::new(sugoi_musicbox::backends::rpi::RpiGpio::new()?);
    let music_box = MusicBox::build(config, tracks, io, engine)?;
    music_box.run(shutdown_signal()).await?;
    Ok(())
}

#[cfg(not(feature = "rpi"))]
async fn run_gpio(
    _config: &MusicBoxConfig,
    _tracks: Vec<PathBuf>,
    _engine: Arc<dyn AudioEngine>,
) -> anyhow::Result<()> {
    anyhow::bail!("GPIO backend requires the rpi feature")
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for Ctrl-C: {}", e);
    }
}

fn check_config(config_path: Option<&Path>) -> anyhow::Result<()> {
    let config = MusicBoxConfig::load(config_path)?;
    config.validate()?;
    let tracks = scan_tracks(&config.library.music_dir, &config.library.extensions)?;

    println!("Configuration OK");
    println!("  Tracks:     {}", tracks.len());
    println!("  Inputs:     {}", config.inputs.len());
    println!(
        "  Indicators: {}",
        config.indicators.named_pins().len()
    );
    println!();
    println!("{}", config.to_toml()?);

    Ok(())
}

fn pinout(config_path: Option<&Path>) -> anyhow::Result<()> {
    let config = MusicBoxConfig::load(config_path)?;
    let mut pins = config.pin_map()?;
    pins.sort_by_key(|(_, pin)| *pin);

    println!("Pin     Function");
    for (name, pin) in pins {
        println!("{:<7} {}", pin.to_string(), name);
    }

    Ok(())
}
