//! Surface Modes - console host
//!
//! Runs the surface controller against a simulated DAW. Hardware input is
//! typed into a REPL; display and LEDs are printed on request.

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use surface_modes::cli::{self, Command};
use surface_modes::config::{ConfigWatcher, SurfaceConfig};
use surface_modes::controller::{RefreshFrame, SurfaceController};
use surface_modes::daw::{DawModel, SimulatedDaw};
use surface_modes::scheduler::TokioScheduler;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Surface Modes - drive a DAW control surface from the console
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "surface.yaml")]
    config: String,

    /// Log level (error, warn, info, debug, trace)
    #[arg(short, long, env = "LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// Print the default configuration as YAML and exit
    #[arg(long)]
    print_config: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let args = Args::parse();

    init_logging(&args.log_level)?;

    if args.print_config {
        let yaml = serde_yaml::to_string(&SurfaceConfig::default())
            .context("Failed to serialize default config")?;
        print!("{}", yaml);
        return Ok(());
    }

    info!("Starting Surface Modes...");

    let (watcher, config) = if Path::new(&args.config).exists() {
        let (watcher, config) = ConfigWatcher::new(args.config.clone()).await?;
        info!("Configuration loaded from {} with hot-reload enabled", args.config);
        (Some(watcher), config)
    } else {
        warn!("⚠️  Config file {} not found, using defaults", args.config);
        (None, SurfaceConfig::default())
    };

    run_app(config, watcher, shutdown_signal()).await?;

    info!("Surface Modes shutdown complete");
    Ok(())
}

async fn run_app(
    config: SurfaceConfig,
    mut config_watcher: Option<ConfigWatcher>,
    shutdown: impl std::future::Future<Output = ()>,
) -> Result<()> {
    let daw = Arc::new(SimulatedDaw::demo());
    let (scheduler, mut scheduled_rx) = TokioScheduler::new(tokio::runtime::Handle::current());
    let mut controller = SurfaceController::with_cell_buffer(
        &config,
        DawModel::from_shared(daw.clone()),
        Arc::new(scheduler),
    );

    // rustyline blocks, so it gets its own thread
    let (line_tx, mut line_rx) = mpsc::unbounded_channel::<String>();
    std::thread::Builder::new()
        .name("repl".to_string())
        .spawn(move || {
            if let Err(e) = cli::run_repl(line_tx) {
                warn!("REPL stopped: {}", e);
            }
        })
        .context("Failed to start REPL thread")?;

    let mut refresh = tokio::time::interval(Duration::from_millis(config.refresh_ms));
    refresh.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
    let mut grid_config = config.grid.clone();
    let mut last_frame: Option<RefreshFrame> = None;

    println!("{}", "Type 'help' for commands".dimmed());

    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            Some(line) = line_rx.recv() => {
                match cli::parse_command(&line) {
                    Ok(Some(Command::Input(events))) => {
                        for event in events {
                            controller.handle(event);
                        }
                    },
                    Ok(Some(Command::Refresh)) => {
                        let frame = controller.refresh();
                        print_frame(&controller, &frame);
                        last_frame = Some(frame);
                    },
                    Ok(Some(Command::Status)) => {
                        let status = serde_json::to_string_pretty(&controller.status())?;
                        println!("{}", status);
                    },
                    Ok(Some(Command::Help)) => println!("{}", cli::HELP),
                    Ok(Some(Command::Quit)) => {
                        info!("Quit requested");
                        break;
                    },
                    Ok(None) => {},
                    Err(e) => println!("{} {}", "✗".red(), e),
                }
                print_notifications(&mut controller);
            }

            Some(task) = scheduled_rx.recv() => {
                controller.on_scheduled(task);
            }

            _ = refresh.tick() => {
                let frame = controller.refresh();
                if last_frame.as_ref() != Some(&frame) {
                    debug!("LEDs changed: {} lit in {} / {}", frame.lit().len(), frame.mode, frame.view);
                    last_frame = Some(frame);
                }
            }

            Some(new_config) = next_config(&mut config_watcher) => {
                info!("📝 Configuration file changed, reloading...");
                if new_config.grid != grid_config {
                    warn!("⚠️  Grid layout changes take effect after a restart");
                    grid_config = new_config.grid.clone();
                }
                controller.apply_settings(new_config.settings);
                info!("✅ Settings reloaded");
            }

            _ = &mut shutdown => {
                info!("Shutdown signal received, stopping event loop");
                break;
            }
        }
    }

    info!("Shutting down...");
    debug!("{} DAW commands issued this session", daw.actions().len());
    Ok(())
}

/// Next reloaded configuration, or never when hot reload is off
async fn next_config(watcher: &mut Option<ConfigWatcher>) -> Option<SurfaceConfig> {
    match watcher {
        Some(watcher) => watcher.next_config().await,
        None => std::future::pending().await,
    }
}

fn print_frame(controller: &SurfaceController, frame: &RefreshFrame) {
    println!(
        "{} {}  {} {}",
        "mode".dimmed(),
        frame.mode.to_string().cyan().bold(),
        "view".dimmed(),
        frame.view.to_string().cyan().bold()
    );
    for line in controller.display().lines() {
        println!("  {}", line.bright_white());
    }

    let lit = frame.lit();
    if lit.is_empty() {
        println!("  {}", "(no LEDs lit)".dimmed());
        return;
    }
    let leds: Vec<String> = lit
        .iter()
        .map(|(id, state)| match state {
            surface_modes::view::LedState::Hilite => id.to_string().yellow().bold().to_string(),
            _ => id.to_string().green().to_string(),
        })
        .collect();
    println!("  {}", leds.join(" "));
}

fn print_notifications(controller: &mut SurfaceController) {
    for message in controller.display_mut().take_notifications() {
        println!("{} {}", "📟".yellow(), message.yellow());
    }
}

fn init_logging(level: &str) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_thread_ids(false)
                .with_thread_names(false),
        )
        .init();

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for CTRL+C: {}", e);
        std::future::pending::<()>().await;
    }
}
