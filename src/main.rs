use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};

use prodwatch::config::{MonitorConfig, SourceSpec};
use prodwatch::data::duration::parse_duration;
use prodwatch::logging::{self, LogTarget};
use prodwatch::{
    Clock, DataSource, Driver, FileSource, FrameSink, KeyboardClock, ProductionSnapshot,
    RateMonitor, SystemClock, TerminalSink, TextSink, Theme,
};

#[derive(Parser, Debug)]
#[command(name = "prodwatch", version)]
#[command(about = "Live terminal monitor for production progress, rate and ETA")]
struct Args {
    /// Path to a JSON rows file
    #[arg(short, long, conflicts_with = "url")]
    file: Option<PathBuf>,

    /// HTTP endpoint serving the JSON rows document
    #[arg(short, long)]
    url: Option<String>,

    /// Bearer token sent to the HTTP endpoint
    #[arg(long)]
    token: Option<String>,

    /// Configuration file (TOML, JSON or YAML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Poll interval (e.g., "5s", "500ms", "1m")
    #[arg(short, long)]
    interval: Option<String>,

    /// Progress bar width in blocks
    #[arg(long)]
    bar_width: Option<usize>,

    /// Status label counted as produced
    #[arg(long)]
    complete_status: Option<String>,

    /// Display heading
    #[arg(long)]
    title: Option<String>,

    /// Unit name shown in the rate line
    #[arg(long)]
    unit: Option<String>,

    /// Draw plain text instead of the full-screen display
    #[arg(long)]
    plain: bool,

    /// Disable colors in plain text output
    #[arg(long)]
    no_color: bool,

    /// Append logs to this file
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Export the current snapshot to a JSON file and exit
    #[arg(short, long)]
    export: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let config = resolve_config(&args)?;

    let plain_output = args.plain || args.export.is_some();
    logging::init(&LogTarget::select(args.log_file.clone(), plain_output))?;

    let source = build_source(&config)?;

    // Handle export mode (non-interactive)
    if let Some(export_path) = &args.export {
        return export_to_file(source, &config.complete_status, export_path);
    }

    run_monitor(source, &config, &args)
}

/// Layer the command-line flags over the file and environment settings.
fn resolve_config(args: &Args) -> Result<MonitorConfig> {
    let mut config = MonitorConfig::load(args.config.as_deref())?;

    if let Some(interval) = &args.interval {
        config.poll_interval = parse_duration(interval).context("Invalid --interval")?;
    }
    if let Some(width) = args.bar_width {
        config.bar_width = width;
    }
    if let Some(status) = &args.complete_status {
        config.complete_status = status.clone();
    }
    if let Some(title) = &args.title {
        config.title = title.clone();
    }
    if let Some(unit) = &args.unit {
        config.unit = unit.clone();
    }
    // A source named on the command line replaces the configured one.
    if let Some(file) = &args.file {
        config.file = Some(file.clone());
        config.url = None;
    }
    if let Some(url) = &args.url {
        config.url = Some(url.clone());
        config.file = None;
    }
    if let Some(token) = &args.token {
        config.token = Some(token.clone());
    }

    config.validate()?;
    Ok(config)
}

fn build_source(config: &MonitorConfig) -> Result<Box<dyn DataSource>> {
    match config.source()? {
        SourceSpec::File(path) => Ok(Box::new(FileSource::new(path))),
        #[cfg(feature = "http")]
        SourceSpec::Url { url, token } => {
            let mut builder = prodwatch::HttpSource::builder()
                .endpoint(url)
                .timeout(config.fetch_timeout);
            if let Some(token) = token {
                builder = builder.bearer_token(token);
            }
            Ok(Box::new(builder.build()?))
        }
        #[cfg(not(feature = "http"))]
        SourceSpec::Url { .. } => anyhow::bail!("HTTP sources need the `http` feature"),
    }
}

/// Run the polling loop until interrupted.
fn run_monitor(source: Box<dyn DataSource>, config: &MonitorConfig, args: &Args) -> Result<()> {
    let stop = Arc::new(AtomicBool::new(false));
    let handler_stop = stop.clone();
    ctrlc::set_handler(move || handler_stop.store(true, Ordering::Relaxed))
        .context("Failed to install Ctrl-C handler")?;

    let colored = !args.no_color;

    if args.plain {
        let monitor = initialize(source, SystemClock::with_stop(stop.clone()), config)?;
        return run_driver(monitor, Box::new(TextSink::stdout(colored)), None, config, stop);
    }

    // Fetch before taking over the screen so startup errors stay visible.
    let monitor = initialize(source, KeyboardClock::new(stop.clone()), config)?;
    let fallback: Box<dyn FrameSink> = Box::new(TextSink::stdout(colored));
    match TerminalSink::new(Theme::auto_detect()) {
        Ok(sink) => run_driver(monitor, Box::new(sink), Some(fallback), config, stop),
        Err(e) => {
            warn!(error = %e, "Full-screen display unavailable, using plain text");
            run_driver(monitor, fallback, None, config, stop)
        }
    }
}

fn initialize<C: Clock>(
    source: Box<dyn DataSource>,
    clock: C,
    config: &MonitorConfig,
) -> Result<RateMonitor<C>> {
    let description = source.description().to_string();
    RateMonitor::initialize(source, clock, config.complete_status.as_str())
        .with_context(|| format!("Initial fetch from {} failed", description))
}

fn run_driver<C: Clock>(
    monitor: RateMonitor<C>,
    sink: Box<dyn FrameSink>,
    fallback: Option<Box<dyn FrameSink>>,
    config: &MonitorConfig,
    stop: Arc<AtomicBool>,
) -> Result<()> {
    let mut driver = Driver::new(
        monitor,
        sink,
        config.frame_options(),
        config.poll_interval,
        config.max_backoff,
    )
    .with_stop(stop);
    if let Some(fallback) = fallback {
        driver = driver.with_fallback(fallback);
    }

    driver.run()?;
    Ok(())
}

/// Sample once and write the snapshot as JSON.
fn export_to_file(
    mut source: Box<dyn DataSource>,
    complete_status: &str,
    export_path: &Path,
) -> Result<()> {
    let rows = source
        .read_rows()
        .with_context(|| format!("Failed to read {}", source.description()))?;
    let snapshot = ProductionSnapshot::from_records(&rows, complete_status);

    let json = serde_json::to_string_pretty(&snapshot)?;
    fs::write(export_path, json)
        .with_context(|| format!("Failed to write {}", export_path.display()))?;

    info!(
        path = %export_path.display(),
        categories = snapshot.per_category.len(),
        produced = snapshot.total_produced,
        target = snapshot.total_target,
        "Exported snapshot"
    );
    println!("Exported to {}", export_path.display());

    Ok(())
}
