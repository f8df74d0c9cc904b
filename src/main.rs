//! fake-lock-screen - blacks out the desktop until the unlock hotkey
//!
//! Entry point for the binary.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use fake_lock_screen::app::App;
use fake_lock_screen::config::{Config, ConfigSource};
use fake_lock_screen::input::KeyFilter;
use fake_lock_screen::platform::{self, Backend};
use fake_lock_screen::session::LockController;
use fake_lock_screen::utils;

/// Rolling log file name inside `logging.log_dir`
const LOG_FILE_PREFIX: &str = "fake-lock-screen.log";

/// Command-line arguments for fake-lock-screen
#[derive(Parser, Debug)]
#[command(name = "fake-lock-screen")]
#[command(version, about = "Fake lock screen with global hotkeys", long_about = None)]
pub struct Args {
    /// Configuration file path
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Lock hotkey, e.g. "ctrl+alt+l"
    #[arg(long, env = "FAKELOCK_LOCK_KEY")]
    pub lock_key: Option<String>,

    /// Unlock hotkey, e.g. "ctrl+alt+u"
    #[arg(long, env = "FAKELOCK_UNLOCK_KEY")]
    pub unlock_key: Option<String>,

    /// Lock immediately after startup
    #[arg(long)]
    pub lock_now: bool,

    /// Verbose logging (can be specified multiple times)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Log format (json|pretty|compact)
    #[arg(long, default_value = "pretty")]
    pub log_format: String,

    /// Write logs to file (in addition to stdout)
    #[arg(long)]
    pub log_file: Option<String>,

    /// Keep the console visible and write a timestamped debug log
    #[arg(long)]
    pub debug: bool,

    /// Do not ask for administrator rights
    #[arg(long)]
    pub no_elevate: bool,

    /// Print the effective configuration as TOML and exit
    #[arg(long)]
    pub dump_config: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let (config, source) = Config::load_or_default(args.config.as_deref());
    let config = config.with_overrides(args.lock_key.clone(), args.unlock_key.clone());

    if args.dump_config {
        print!("{}", config.to_toml()?);
        return Ok(());
    }

    // Initialize logging
    let _log_guard = init_logging(&args, &config)?;

    info!("════════════════════════════════════════════════════════");
    info!("  fake-lock-screen v{}", env!("CARGO_PKG_VERSION"));
    info!("  Built: {} {}", env!("BUILD_DATE"), env!("BUILD_TIME"));
    info!("  Commit: {}", env!("GIT_HASH"));
    info!("  Profile: {}", if cfg!(debug_assertions) { "debug" } else { "release" });
    info!("════════════════════════════════════════════════════════");

    match &source {
        ConfigSource::File(path) => info!("Configuration loaded from {}", path.display()),
        ConfigSource::Legacy(path) => {
            info!("Hotkeys imported from legacy settings {}", path.display())
        }
        ConfigSource::Defaults => info!("No configuration file found, using defaults"),
        ConfigSource::Fallback { path, reason } => {
            warn!("Failed to load config {}: {}, using defaults", path.display(), reason)
        }
    }

    if let Err(e) = config.validate().context("Invalid configuration") {
        eprintln!("{}", utils::format_user_error(&e));
        return Err(e);
    }
    debug!("Config: {:?}", config);

    if !args.no_elevate && !platform::is_elevated() {
        info!("Administrator rights required, relaunching");
        // The elevated child must not try again if the token check still fails
        let mut child_args: Vec<String> = std::env::args().skip(1).collect();
        child_args.push("--no-elevate".to_string());
        match platform::relaunch_elevated(&child_args) {
            Ok(()) => return Ok(()),
            Err(e) => warn!("{}; continuing without administrator rights", e),
        }
    }

    let _instance = match platform::acquire_single_instance() {
        Ok(guard) => guard,
        Err(e) => {
            debug!(
                "{} running process(es) share this executable name",
                utils::count_same_name_processes()
            );
            let e = anyhow::Error::new(e);
            eprintln!("{}", utils::format_user_error(&e));
            return Err(e);
        }
    };

    platform::set_console_visible(args.debug);

    let bindings = config.hotkey_bindings()?;
    info!("Lock hotkey: {}", bindings.lock.display_upper());
    info!("Unlock hotkey: {}", bindings.unlock.display_upper());
    if let Some(quit) = &bindings.quit {
        info!("Quit hotkey: {}", quit.display_upper());
    }

    // Held here as well so the loop outlives a backend that never emits
    let (events_tx, events_rx) = mpsc::unbounded_channel();
    let filter = Arc::new(KeyFilter::new(bindings));

    info!("Initializing desktop backend");
    let backend = match Backend::native(filter, events_tx.clone()) {
        Ok(backend) => backend,
        Err(e) => {
            let e = anyhow::Error::new(e).context("Failed to initialize desktop backend");
            eprintln!("{}", utils::format_user_error(&e));
            return Err(e);
        }
    };

    utils::log_startup_diagnostics(&backend, platform::is_elevated());

    let controller = Arc::new(LockController::new(backend, &config)?);
    let app = App::new(controller.clone(), events_rx);

    if args.lock_now {
        controller.lock().await;
    }

    if let Err(e) = app.run().await {
        let e = anyhow::Error::new(e);
        eprintln!("{}", utils::format_user_error(&e));
        return Err(e);
    }
    drop(events_tx);

    info!("fake-lock-screen shut down");
    Ok(())
}

/// Debug log path next to the working directory, stamped with the start time
fn debug_log_path() -> String {
    format!("debug_{}.txt", chrono::Local::now().format("%Y%m%d_%H%M%S"))
}

fn init_logging(args: &Args, config: &Config) -> Result<Option<WorkerGuard>> {
    use std::fs::File;

    let log_level = match args.verbose {
        0 => config.logging.level.to_lowercase(),
        1 => "debug".to_string(),
        _ => "trace".to_string(),
    };

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        tracing_subscriber::EnvFilter::new(format!(
            "fake_lock_screen={level},warn",
            level = log_level
        ))
    });

    let log_file = args
        .log_file
        .clone()
        .or_else(|| args.debug.then(debug_log_path));

    let (file_writer, guard) = match (&log_file, &config.logging.log_dir) {
        (Some(path), _) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create log file: {}", path))?;
            let (writer, guard) = tracing_appender::non_blocking(file);
            (Some(writer), Some(guard))
        }
        (None, Some(dir)) => {
            let appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (Some(writer), Some(guard))
        }
        (None, None) => (None, None),
    };

    match args.log_format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_writer(std::io::stdout),
                )
                .with(file_writer.map(|writer| {
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_writer(writer)
                        .with_ansi(false)
                }))
                .init();
        }
        "compact" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .compact()
                        .with_writer(std::io::stdout),
                )
                .with(file_writer.map(|writer| {
                    tracing_subscriber::fmt::layer()
                        .compact()
                        .with_writer(writer)
                        .with_ansi(false)
                }))
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .pretty()
                        .with_writer(std::io::stdout),
                )
                .with(file_writer.map(|writer| {
                    tracing_subscriber::fmt::layer()
                        .with_writer(writer)
                        .with_ansi(false)
                }))
                .init();
        }
    }

    if let Some(path) = &log_file {
        info!("Logging to file: {}", path);
    } else if let Some(dir) = &config.logging.log_dir {
        info!("Logging to directory: {}", dir.display());
    }

    Ok(guard)
}
