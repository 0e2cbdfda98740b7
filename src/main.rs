use std::io;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tokio::io::BufReader;
use tracing_subscriber::EnvFilter;

use beeper::banner::{BannerInfo, PrintTally, print_banner, print_session_summary};
use beeper::config::Config;
use beeper::console::{Commit, Console, Status};
use beeper::consts::{DEFAULT_SURFACE_HEIGHT, DEFAULT_SURFACE_WIDTH, REVEAL_INTERVAL};
use beeper::desk::Desk;
use beeper::gateway::Gateway;
use beeper::registry::CardRegistry;
use beeper::render::play_reveal;
use beeper::repl::Repl;
use beeper::spinner::Spinner;
use beeper::surface::Surface;

#[derive(Parser)]
#[command(name = "beeper", version, about = "Type it. Print it. Pin it to the desk.")]
struct Cli {
    /// Gemini model used by /fix
    #[arg(long)]
    model: Option<String>,

    /// Gemini API key (overrides GEMINI_API_KEY)
    #[arg(long)]
    api_key: Option<String>,

    /// Desk width in surface units
    #[arg(long, default_value_t = DEFAULT_SURFACE_WIDTH)]
    width: f64,

    /// Desk height in surface units
    #[arg(long, default_value_t = DEFAULT_SURFACE_HEIGHT)]
    height: f64,

    /// Milliseconds between revealed characters
    #[arg(short, long, default_value_t = REVEAL_INTERVAL.as_millis() as u64)]
    interval_ms: u64,

    /// Print a single card and exit (non-interactive)
    #[arg(short, long)]
    run: Option<String>,

    /// With --run, reword the text over the uplink first
    #[arg(long, default_value_t = false, requires = "run")]
    fix: bool,

    /// Log debug output to stderr
    #[arg(short, long, default_value_t = false)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(io::stderr)
        .init();

    let config = Config::from_env()
        .with_api_key(cli.api_key)
        .with_model(cli.model)
        .with_surface(cli.width, cli.height)
        .with_reveal_interval(Duration::from_millis(cli.interval_ms));
    config.validate()?;

    let registry = Arc::new(CardRegistry::new());
    let surface = Arc::new(Surface::measured(config.surface));
    let mut desk = Desk::new(
        Arc::clone(&registry),
        Arc::clone(&surface),
        config.reveal_interval,
    );
    let console = Console::new(Gateway::from_config(&config), Arc::clone(&registry), surface)
        .with_status_light(desk.status_light());

    // Single card mode
    if let Some(text) = cli.run {
        console.set_input(text);
        let commit = if cli.fix {
            let spinner = Spinner::start(Status::Uplinking);
            let commit = console.fix_and_print().await;
            spinner.stop().await;
            commit
        } else {
            console.print()
        };
        let Commit::Printed(card) = commit else {
            eprintln!("nothing to print");
            return Ok(());
        };
        desk.sync();
        if let Some(controller) = desk.controller(card.id()) {
            play_reveal(Arc::clone(&card), controller.reveal().subscribe()).await?;
        }
        return Ok(());
    }

    print_banner(&BannerInfo {
        uplink: &config.uplink_label(),
        surface: (config.surface.width, config.surface.height),
        cadence_ms: config.reveal_interval.as_millis(),
    });

    // async stdin so Ctrl+C and a landing uplink are seen at the prompt too
    let mut repl = Repl::new(Arc::new(console), desk);
    repl.run(BufReader::new(tokio::io::stdin())).await?;

    print_session_summary(PrintTally::from_registry(&registry));
    Ok(())
}
