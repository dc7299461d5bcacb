//! Headless screen manager: entry point.
//!
//! Runs the screen subsystem on its own, without a window manager around it.
//! Useful to watch how a monitor setup is turned into screens, and what
//! happens on hotplug.
//!
//! # Usage
//!
//! ```text
//! screen-manager [OPTIONS]
//!
//! Options:
//!   --config <PATH>        Configuration file [default: $XDG_CONFIG_HOME/screen-manager/config.toml]
//!   --mock-outputs <N>     Simulate N side-by-side 1920x1080 outputs instead of using XRandR
//! ```
//!
//! # Architecture
//!
//! ```text
//! main()
//!  ├─ load AppConfig, init tracing
//!  ├─ ScreenSubsystem::init()      -- first scan
//!  ├─ listener task                -- logs every ScreenEvent from the channel
//!  └─ loop
//!       ├─ interval tick → ScreenSubsystem::tick()   (coalesced scans)
//!       └─ Ctrl-C        → ScreenSubsystem::teardown()
//! ```

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use screen_manager::application::scan_screens::OutputSource;
use screen_manager::application::subsystem::ScreenSubsystem;
use screen_manager::infrastructure::clients::ClientTable;
use screen_manager::infrastructure::events::ChannelEventSink;
use screen_manager::infrastructure::outputs::MockOutputSource;
use screen_manager::infrastructure::storage::config::{load_config, load_config_from};

/// Lower bound for the tick interval so a bad config cannot spin the loop.
const MIN_TICK_INTERVAL_MS: u64 = 10;

// ── CLI argument definitions ──────────────────────────────────────────────────

/// Headless screen manager.
#[derive(Debug, Parser)]
#[command(
    name = "screen-manager",
    about = "Tracks monitors and maintains the logical screen set of a window manager",
    version
)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(long, env = "SCREEN_MANAGER_CONFIG")]
    config: Option<PathBuf>,

    /// Simulate this many side-by-side 1920x1080 outputs.
    ///
    /// Without it the XRandR source is used when the binary was built with
    /// the `x11` feature.
    #[arg(long, env = "SCREEN_MANAGER_MOCK_OUTPUTS")]
    mock_outputs: Option<usize>,
}

/// Picks the output source from the command line and build features.
fn build_source(cli: &Cli) -> anyhow::Result<Arc<dyn OutputSource>> {
    if let Some(count) = cli.mock_outputs {
        info!(count, "using simulated outputs");
        return Ok(Arc::new(MockOutputSource::row_1080p(count)));
    }

    #[cfg(all(target_os = "linux", feature = "x11"))]
    let source: Arc<dyn OutputSource> = Arc::new(
        screen_manager::infrastructure::outputs::XrandrOutputSource::open()
            .context("failed to open the XRandR output source")?,
    );

    #[cfg(not(all(target_os = "linux", feature = "x11")))]
    let source: Arc<dyn OutputSource> = {
        tracing::warn!("built without the x11 feature; simulating a single 1920x1080 output");
        Arc::new(MockOutputSource::single_1080p())
    };

    Ok(source)
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config_from(path),
        None => load_config(),
    }
    .context("failed to load configuration")?;

    // Initialise structured logging.  `RUST_LOG` overrides the configured level.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.general.log_level)),
        )
        .init();

    info!("screen manager starting");

    let policy = config.merge_policy()?;
    let source = build_source(&cli)?;

    // ── Event listener ────────────────────────────────────────────────────────
    let (sink, mut events) = ChannelEventSink::new();
    let listener = tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            info!(?event, "screen event");
        }
    });

    // ── Subsystem ─────────────────────────────────────────────────────────────
    let mut subsystem =
        ScreenSubsystem::new(source, policy, Arc::new(sink), config.subsystem_options());
    let mut clients = ClientTable::new();

    match subsystem.init(&mut clients) {
        Ok(report) => info!(
            screens = subsystem.screen_count(),
            primary = ?report.primary,
            "initial scan complete"
        ),
        Err(e) => error!("initial scan failed: {e}"),
    }

    let tick_ms = config.scan.tick_interval_ms.max(MIN_TICK_INTERVAL_MS);
    let mut interval = tokio::time::interval(Duration::from_millis(tick_ms));

    info!("screen manager ready.  Press Ctrl-C to exit.");

    loop {
        tokio::select! {
            _ = interval.tick() => {
                if let Some(Err(e)) = subsystem.tick(&mut clients) {
                    error!("scan failed: {e}");
                }
            }
            signal = tokio::signal::ctrl_c() => {
                if let Err(e) = signal {
                    error!("failed to listen for Ctrl+C signal: {e}");
                }
                info!("shutdown signal received");
                break;
            }
        }
    }

    subsystem.teardown();
    // Dropping the subsystem drops the last sink, which ends the listener.
    drop(subsystem);
    if let Err(e) = listener.await {
        error!("event listener task failed: {e}");
    }

    info!("screen manager stopped");
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
