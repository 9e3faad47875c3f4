//! Touch Overlay - interactive driver for the on-screen controller
//!
//! Loads an overlay layout, then either replays a scripted touch session or
//! runs a REPL that feeds touches to the overlay in real time.

use anyhow::{Context, Result};
use clap::Parser;
use colored::*;
use tracing::{debug, info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use touch_overlay::cli::{self, LiveSession};
use touch_overlay::config::{AppConfig, ConfigWatcher};
use touch_overlay::overlay::{Overlay, OverlaySettings};
use touch_overlay::replay::ReplayScript;
use touch_overlay::sink::SinkEvent;
use touch_overlay::timer::MonotonicClock;

/// Touch Overlay - drive on-screen joysticks and the pointer from the terminal
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to overlay layout file
    #[arg(short, long, default_value = "overlay.yaml")]
    config: String,

    /// Log level (error, warn, info, debug, trace)
    #[arg(short, long, env = "LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// Also write logs to this file
    #[arg(long, env = "LOG_FILE")]
    log_file: Option<String>,

    /// Replay a scripted touch session and exit
    #[arg(long)]
    replay: Option<String>,

    /// Print replay output as JSON lines
    #[arg(long, requires = "replay")]
    json: bool,

    /// List joystick emulation modes and double-tap buttons
    #[arg(long)]
    list_options: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let args = Args::parse();

    // Keep the guard alive so buffered file logs are flushed on exit
    let _log_guard = init_logging(&args.log_level, args.log_file.as_deref())?;

    if args.list_options {
        cli::print_options();
        return Ok(());
    }

    info!("Starting Touch Overlay v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration file: {}", args.config);

    if let Some(script_path) = &args.replay {
        let config = AppConfig::load(&args.config).await?;
        return run_replay(&config, script_path, args.json).await;
    }

    // Load configuration with hot-reload watcher
    let (config_watcher, initial_config) = ConfigWatcher::new(args.config.clone()).await?;
    info!("Configuration loaded successfully with hot-reload enabled");

    run_live((*initial_config).clone(), config_watcher).await?;

    info!("Touch Overlay shutdown complete");
    Ok(())
}

async fn run_replay(config: &AppConfig, script_path: &str, json: bool) -> Result<()> {
    let script = ReplayScript::load(script_path).await?;
    let mut overlay = Overlay::from_config(config);

    let records = script
        .run(&mut overlay)
        .with_context(|| format!("Replay failed: {}", script_path))?;

    for record in &records {
        if json {
            println!("{}", serde_json::to_string(record)?);
            continue;
        }
        let at = format!("{:>6}ms", record.at).dimmed();
        match record.event {
            SinkEvent::Button { id, state } => {
                println!("{} button {} {}", at, id.to_string().yellow(), format!("{:?}", state).green().bold())
            }
            SinkEvent::Axis { id, value } => println!("{} axis   {} {:+.3}", at, id.to_string().cyan(), value),
        }
    }

    info!("Replay finished: {} event(s)", records.len());
    Ok(())
}

async fn run_live(mut config: AppConfig, mut config_watcher: ConfigWatcher) -> Result<()> {
    let clock = MonotonicClock::new();
    let mut session = LiveSession::new(Overlay::from_config(&config));
    let mut lines = cli::spawn_readline("overlay> ");

    println!("{}", "Type 'help' for commands, 'quit' to exit.".dimmed());

    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    loop {
        let next_timer = session.overlay.next_deadline();
        let timer_sleep = async {
            match next_timer {
                Some(ms) => tokio::time::sleep_until(tokio::time::Instant::from_std(clock.instant_at(ms))).await,
                None => std::future::pending().await,
            }
        };

        tokio::select! {
            // Fire double-tap timers on time even while the prompt is idle
            _ = timer_sleep => {
                let fired = session.advance(clock.now_ms());
                debug!("Fired {} timer(s)", fired);
            }

            line = lines.recv() => {
                let Some(line) = line else {
                    info!("Input closed, stopping");
                    break;
                };
                match cli::parse_command(&line) {
                    Ok(Some(command)) => match session.execute(command, clock.now_ms()) {
                        Ok(true) => {}
                        Ok(false) => break,
                        Err(e) => eprintln!("{} {:#}", "error:".red(), e),
                    },
                    Ok(None) => {}
                    Err(e) => eprintln!("{} {:#}", "error:".red(), e),
                }
            }

            // Handle config reload
            Some(new_config) = config_watcher.next_config() => {
                info!("Configuration file changed, reloading...");
                apply_reload(&mut session, &config, &new_config);
                config = new_config;
            }

            _ = &mut shutdown => {
                info!("Shutdown signal received, stopping event loop");
                break;
            }
        }
    }

    session.overlay.shutdown();
    Ok(())
}

/// Settings-only changes are applied in place; anything touching the
/// layout rebuilds the overlay
fn apply_reload(session: &mut LiveSession, old: &AppConfig, new: &AppConfig) {
    let layout_changed = old.joysticks != new.joysticks
        || old.pointer != new.pointer
        || old.overlay.boundary != new.overlay.boundary
        || old.overlay.game_aspect_ratio != new.overlay.game_aspect_ratio;

    if layout_changed {
        session.replace_overlay(Overlay::from_config(new));
        info!("Layout changed, overlay rebuilt");
        return;
    }

    let settings = OverlaySettings {
        relative_center: new.overlay.relative_center,
        opacity: new.overlay.opacity_u8(),
    };
    if settings == session.overlay.settings() {
        warn!("Configuration reloaded but nothing changed");
        return;
    }
    session.overlay.apply_settings(settings);
    info!(
        "Applied settings: relative_center={}, opacity={}",
        settings.relative_center, settings.opacity
    );
}

fn init_logging(level: &str, log_file: Option<&str>) -> Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let console = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_thread_ids(false)
        .with_thread_names(false);

    let (file_layer, guard) = match log_file {
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file: {}", path))?;
            let (writer, guard) = tracing_appender::non_blocking(file);
            let layer = tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(false);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(console)
        .with(file_layer)
        .init();

    Ok(guard)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
}
