//! Desktop Pet CLI - a small character that wanders around your desktop.

mod gui;
mod headless;

use anyhow::{Context, Result};
use clap::Parser;
use desktop_pet_core::{Appearance, Config};
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Desktop Pet - a character that wanders your screen and says hello.
///
/// The pet walks around in a transparent always-on-top window, bounces off
/// the screen edges and can be picked up with the mouse. Double-click it to
/// make it talk, right-click it for a menu.
#[derive(Parser, Debug)]
#[command(name = "desktop-pet")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to the character portrait.
    ///
    /// Any PNG, JPEG or GIF works. When the file is missing or cannot be
    /// decoded the pet is drawn as a glyph instead.
    #[arg(
        short = 'i',
        long = "image",
        default_value = "character.png",
        env = "DESKTOP_PET_IMAGE"
    )]
    pub image: PathBuf,

    /// Seed for the random walk.
    ///
    /// The same seed replays the same walk. Without one the pet is seeded
    /// from the operating system.
    #[arg(long = "seed", env = "DESKTOP_PET_SEED")]
    pub seed: Option<u64>,

    /// Run without a window.
    ///
    /// The pet runs on a virtual screen of the default size, reads commands
    /// (`hello`, `pause`, `resume`, `press X Y`, `drag X Y`, `quit`, ...)
    /// from stdin and reports what it does.
    #[arg(long = "headless")]
    pub headless: bool,

    /// Stop after this many seconds.
    #[arg(short = 'd', long = "duration", requires = "headless")]
    pub duration: Option<u64>,

    /// Print events as JSON lines on stdout.
    #[arg(long = "json", requires = "headless")]
    pub json: bool,

    /// Enable verbose output.
    ///
    /// Logs drags, bounces and bubbles. `RUST_LOG` takes precedence.
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,
}

impl Cli {
    /// Convert CLI arguments to a Config.
    pub fn to_config(&self) -> Config {
        let mut config = Config::new().image_path(&self.image);

        if let Some(seed) = self.seed {
            config = config.seed(seed);
        }

        config
    }

    /// How long a headless run may last, if limited.
    pub fn time_limit(&self) -> Option<Duration> {
        self.duration.map(Duration::from_secs)
    }
}

/// Install the log subscriber. Logs go to stderr so `--json` output stays
/// clean.
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = cli.to_config();
    config.validate().context("invalid configuration")?;
    let appearance = Appearance::load_or_glyph(&config.image_path, config.visual_edge);

    if !cli.headless {
        return gui::run(config, appearance).context("window host failed");
    }

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start the async runtime")?;
    let outcome = runtime.block_on(headless::run(
        config,
        appearance.kind(),
        cli.time_limit(),
        cli.json,
    ));
    // the stdin reader may still be parked in a blocking read
    runtime.shutdown_background();

    let outcome = outcome?;
    info!(
        reason = %outcome.reason,
        uptime_secs = outcome.uptime.as_secs_f64(),
        "pet stopped"
    );
    Ok(())
}
