//! shotform-analysis CLI
//!
//! Reads pose-extracted frames as JSON, runs the analysis pipeline, and
//! writes the report as JSON to stdout. A clip the pipeline cannot analyze
//! (no frames, no usable landmarks) exits with code 2 so callers can tell
//! "analysis impossible" apart from "analysis ran and found nothing".

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

use shotform_analysis::{AnalysisConfig, InputFrame, ShotAnalyzer};

#[derive(Parser, Debug)]
#[command(name = "shotform-analysis", version, about = "Basketball shot form analysis")]
struct Args {
    /// Input JSON file: an array of frames with landmarks (and optional luma
    /// planes), in decode order
    #[arg(short, long)]
    input: PathBuf,

    /// Frame rate of the source video
    #[arg(short, long)]
    fps: f64,

    /// Optional TOML config overriding the built-in thresholds
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Cap on the trimmed shot window length, overriding the config
    #[arg(long)]
    max_frames: Option<usize>,

    /// Pretty-print the report JSON
    #[arg(long)]
    pretty: bool,

    /// Log verbosity
    #[arg(long, default_value = "info", env = "SHOTFORM_LOG")]
    log_level: Level,
}

fn main() -> ExitCode {
    let args = Args::parse();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(args.log_level)
        .with_writer(std::io::stderr)
        .finish();
    if tracing::subscriber::set_global_default(subscriber).is_err() {
        eprintln!("Failed to initialize logging");
        return ExitCode::FAILURE;
    }

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(RunError::Pipeline(e)) => {
            error!("Clip cannot be analyzed: {}", e);
            ExitCode::from(2)
        }
        Err(RunError::Other(e)) => {
            error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

enum RunError {
    /// The clip itself defeats analysis (exit code 2)
    Pipeline(shotform_common::Error),
    Other(anyhow::Error),
}

impl From<anyhow::Error> for RunError {
    fn from(e: anyhow::Error) -> Self {
        RunError::Other(e)
    }
}

fn run(args: Args) -> Result<(), RunError> {
    info!("shotform-analysis {}", env!("CARGO_PKG_VERSION"));

    let mut config = match &args.config {
        Some(path) => AnalysisConfig::load(path)
            .with_context(|| format!("Load config {}", path.display()))
            .map_err(RunError::Other)?,
        None => AnalysisConfig::default(),
    };
    if let Some(max_frames) = args.max_frames {
        config.max_frames = max_frames;
    }

    let raw = std::fs::read_to_string(&args.input)
        .with_context(|| format!("Read input {}", args.input.display()))
        .map_err(RunError::Other)?;
    let frames: Vec<InputFrame> = serde_json::from_str(&raw)
        .context("Parse input frames")
        .map_err(RunError::Other)?;
    info!(frames = frames.len(), fps = args.fps, "Input loaded");

    let analyzer = ShotAnalyzer::new(config)
        .map_err(|e| RunError::Other(anyhow::anyhow!(e)))?;
    let report = analyzer.analyze(frames, args.fps).map_err(|e| {
        if e.is_pipeline_failure() {
            RunError::Pipeline(e)
        } else {
            RunError::Other(anyhow::anyhow!(e))
        }
    })?;

    let json = if args.pretty {
        serde_json::to_string_pretty(&report)
    } else {
        serde_json::to_string(&report)
    }
    .context("Serialize report")
    .map_err(RunError::Other)?;

    println!("{}", json);
    Ok(())
}
