use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use gymform_core::{
    parse_detections, AnalysisEngine, AppConfig, CritiquePrompt, KeypointSummary, Sequence,
    TEMPLATES,
};
use tracing_subscriber::EnvFilter;

fn main() -> gymform_core::Result<()> {
    init_tracing();

    let cli = Cli::parse();

    match cli.command {
        Commands::Analyze { input, config } => run_analyze(&input, config.as_deref()),
        Commands::Summary {
            input,
            config,
            prompt,
        } => run_summary(&input, config.as_deref(), prompt),
        Commands::Templates => run_templates(),
    }
}

fn run_analyze(input: &Path, config: Option<&Path>) -> gymform_core::Result<()> {
    let config = load_config(config)?;
    let sequence = load_sequence(input)?;
    tracing::info!(?input, frames = sequence.len(), "analysing pose sequence");

    let engine = AnalysisEngine::with_config(config.analysis);
    let report = engine.analyze(sequence.frames());
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn run_summary(input: &Path, config: Option<&Path>, prompt: bool) -> gymform_core::Result<()> {
    let config = load_config(config)?;
    let sequence = load_sequence(input)?;

    let summary = KeypointSummary::from_frames(sequence.frames(), &config.summary);
    tracing::info!(?input, frames = summary.frames.len(), "built keypoint summary");

    if !prompt {
        println!("{}", summary.to_json()?);
        return Ok(());
    }

    let report = AnalysisEngine::with_config(config.analysis).analyze(sequence.frames());
    let prompt = CritiquePrompt::new(&summary, report.exercise, report.rep_count)?;
    println!("{}", serde_json::to_string_pretty(&prompt)?);
    Ok(())
}

fn run_templates() -> gymform_core::Result<()> {
    println!("{}", serde_json::to_string_pretty(TEMPLATES)?);
    Ok(())
}

fn load_config(path: Option<&Path>) -> gymform_core::Result<AppConfig> {
    match path {
        Some(path) => {
            tracing::debug!(?path, "loading configuration");
            AppConfig::from_path(path)
        }
        None => Ok(AppConfig::default()),
    }
}

fn load_sequence(input: &Path) -> gymform_core::Result<Sequence> {
    let raw = std::fs::read_to_string(input)?;
    let detections = parse_detections(&raw)?;
    Ok(Sequence::from_detections(detections))
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .try_init();
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Workout video motion analysis", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Classify the exercise in a pose sequence and count repetitions.
    Analyze {
        /// JSON array of per-frame landmark detections (`null` for no pose).
        input: PathBuf,
        /// Optional JSON configuration file.
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Emit the down-sampled joint summary used for the form critique.
    Summary {
        /// JSON array of per-frame landmark detections (`null` for no pose).
        input: PathBuf,
        /// Optional JSON configuration file.
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Wrap the summary and the analysis verdict in the critique chat prompt.
        #[arg(long)]
        prompt: bool,
    },
    /// Print the built-in exercise template library.
    Templates,
}
