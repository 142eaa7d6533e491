//! CLI binary for the pixelframe viewer.

use clap::Parser;
use pixelframe_api::CanvasClient;
use pixelframe_viewer::sync::SessionEvent;
use pixelframe_viewer::{SnapshotWriter, SyncSession, ViewerConfig};
use std::path::PathBuf;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Headless viewer that mirrors a pixelframe canvas.
#[derive(Parser)]
#[command(name = "pixelframe-viewer", version, about)]
struct Cli {
    /// Path to TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Canvas server base URL (overrides the config file).
    #[arg(short, long, env = "PIXELFRAME_SERVER")]
    server: Option<String>,

    /// Write PNG snapshots of the canvas to this path.
    #[arg(long)]
    snapshot: Option<PathBuf>,

    /// Query the canvas size once and exit.
    #[arg(long)]
    check: bool,

    /// Print session events as JSON lines instead of text.
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new("pixelframe_viewer=info,pixelframe_api=info")
        }))
        .init();

    let cli = Cli::parse();
    let config = load_config(&cli)?;

    if cli.check {
        let size = pixelframe_viewer::check_server(&config.server).await?;
        println!("{}: canvas is {size}", config.server.base_url);
        return Ok(());
    }

    run_viewer(config, cli.json).await
}

fn load_config(cli: &Cli) -> anyhow::Result<ViewerConfig> {
    let mut config = if let Some(ref path) = cli.config {
        ViewerConfig::from_file(path)?
    } else {
        let default_path = ViewerConfig::default_config_path();
        if default_path.exists() {
            ViewerConfig::from_file(&default_path)?
        } else {
            ViewerConfig::default()
        }
    };

    if let Some(ref server) = cli.server {
        config.server.base_url = server.clone();
    }
    if let Some(ref path) = cli.snapshot {
        config.output.snapshot_path = Some(path.clone());
    }
    config.validate()?;
    Ok(config)
}

async fn run_viewer(config: ViewerConfig, json: bool) -> anyhow::Result<()> {
    println!("pixelframe-viewer v{}", env!("CARGO_PKG_VERSION"));

    let client = CanvasClient::new(&config.server.api_config())?;
    let (tx, rx) = mpsc::unbounded_channel();
    let mut session = SyncSession::new(client, config.sync.clone()).with_events(tx);

    let cancel = CancellationToken::new();
    let cancel_clone = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("received Ctrl+C, shutting down...");
            cancel_clone.cancel();
        }
    });

    let printer = tokio::spawn(print_events(rx, json));

    // The server may not be up yet; keep trying at the probe rate.
    loop {
        match session.start().await {
            Ok(()) => break,
            Err(e) => {
                warn!("could not load canvas from {}: {e}", config.server.base_url);
                tokio::select! {
                    () = cancel.cancelled() => return Ok(()),
                    () = tokio::time::sleep(config.sync.probe_interval()) => {}
                }
            }
        }
    }

    let snapshots = config.output.snapshot_path.clone().map(|path| {
        let writer = SnapshotWriter::new(session.surface_handle(), path);
        tokio::spawn(writer.run(
            Duration::from_millis(config.output.snapshot_interval_ms),
            cancel.clone(),
        ))
    });

    println!(
        "\nMirroring {}. Press Ctrl+C to stop.\n",
        config.server.base_url
    );
    session.run(cancel).await;

    if let Some(task) = snapshots
        && let Ok(written) = task.await
    {
        info!(written, "snapshot writer stopped");
    }
    drop(session);
    let _ = printer.await;
    Ok(())
}

async fn print_events(mut rx: mpsc::UnboundedReceiver<SessionEvent>, json: bool) {
    while let Some(event) = rx.recv().await {
        if json {
            match serde_json::to_string(&event) {
                Ok(line) => println!("{line}"),
                Err(e) => warn!("could not serialize event: {e}"),
            }
            continue;
        }
        match event {
            SessionEvent::Offline { banner } | SessionEvent::Countdown { banner, .. } => {
                println!("{banner}");
            }
            SessionEvent::Online => println!("Connected."),
            SessionEvent::Resynced { watermark } => println!("Canvas loaded (t={watermark})"),
            SessionEvent::Patched { .. } | SessionEvent::StatusChanged { .. } => {}
        }
    }
}
