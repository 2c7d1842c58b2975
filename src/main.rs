//! Montaj - AI-Assisted Short Video Editing Sessions
//!
//! This is the main entry point for the Montaj application, which drives an
//! editing session for a short video: Gemini content analysis, Darija script
//! rewriting, timed subtitles and silence detection.

use anyhow::Result;
use clap::Parser;
use tracing::{Level, info};
use tracing_appender::{non_blocking, rolling};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use montaj::analysis::AnalysisClientFactory;
use montaj::cli::{Args, Commands};
use montaj::config::Config;
use montaj::media::MediaProbeFactory;
use montaj::render::{render_error, render_export_notice, render_workspace, stage_progress};
use montaj::session::{EditorSession, EditorStatus};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    setup_logging(args.verbose)?;

    let config = match &args.config {
        Some(config_path) => Config::from_file(config_path)?,
        None => {
            // Try to load config.toml from current directory first
            if std::path::Path::new("config.toml").exists() {
                info!("Found config.toml in current directory, loading...");
                Config::from_file("config.toml")?
            } else {
                Config::default()
            }
        }
    };

    match args.command {
        Commands::Init { output } => {
            Config::default().save_to_file(&output)?;
            println!("Wrote default configuration to {}", output.display());
        }
        Commands::Process { input, export } => {
            info!("Processing video file: {}", input.display());

            // Fail fast on a missing credential or probe binary; neither
            // belongs deep in the pipeline.
            let client = AnalysisClientFactory::create_client(config.analysis.clone())?;
            let probe = MediaProbeFactory::create_probe(config.media.clone());
            probe.check_availability()?;

            let mut session = EditorSession::new(config.session.clone(), client, probe);

            session.select_file(&input);

            let progress = stage_progress(session.status());
            let resolved = session.resolve_video().await;
            progress.finish_and_clear();

            if resolved {
                let progress = stage_progress(session.status());
                session.analyze().await;
                progress.finish_and_clear();
            }

            if session.status() == EditorStatus::Editing {
                let progress = stage_progress(session.status());
                session.finish_editing().await;
                progress.finish_and_clear();
            }

            match session.status() {
                EditorStatus::Completed => {
                    if let (Some(video), Some(metadata)) = (session.video(), session.metadata()) {
                        render_workspace(video, metadata);
                    }
                    if export {
                        render_export_notice();
                    }
                }
                EditorStatus::Error => {
                    render_error(session.user_message());
                }
                status => info!("Session ended in status {:?}", status),
            }

            session.reset();
        }
    }

    info!("Montaj session finished");
    Ok(())
}

/// Setup logging to both console and file
fn setup_logging(verbose: bool) -> Result<()> {
    // Create log directory
    let montaj_dir = std::env::current_dir()?.join(".montaj");
    let log_dir = montaj_dir.join("log");
    std::fs::create_dir_all(&log_dir)?;

    // Set up file appender with daily rotation
    let file_appender = rolling::daily(&log_dir, "montaj.log");
    let (non_blocking_file, guard) = non_blocking(file_appender);
    // Keep the guard alive for the duration of the program
    std::mem::forget(guard);

    // Determine log level
    let log_level = if verbose { Level::DEBUG } else { Level::INFO };

    // Create console layer
    let console_layer = fmt::layer().with_target(false);

    // Create file layer
    let file_layer = fmt::layer()
        .with_writer(non_blocking_file)
        .with_target(false)
        .with_file(true)
        .with_line_number(true)
        .with_ansi(false); // No ANSI colors in file

    // Setup layered subscriber
    let subscriber = tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(log_level.into()))
        .with(console_layer)
        .with(file_layer);

    subscriber
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    Ok(())
}
