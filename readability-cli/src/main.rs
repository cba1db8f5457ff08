//! Readability CLI - rate Java methods with the external scoring model

// Global invariants enforced:
// - Deterministic output ordering
// - Identical input yields byte-for-byte identical output

use anyhow::{bail, Context};
use clap::{Parser, Subcommand, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use readability_core::{
    collect_java_files, rank_improvements, render_json, render_text, sort_reports,
    MethodRatingReport, RatingPipeline, ReadabilityConfig, ResolvedConfig, RseEngine,
};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "readability")]
#[command(about = "Rate the readability of Java methods with the Scalabrino scoring model")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Rate all methods under a file or directory
    Rate {
        /// Path to a Java file or directory
        path: PathBuf,

        /// Output format
        #[arg(long, default_value = "text")]
        format: OutputFormat,

        /// Show only the N least readable methods
        #[arg(long)]
        top: Option<usize>,

        /// Only report methods scoring at or below this threshold (overrides config)
        #[arg(long)]
        max_score: Option<f64>,

        /// Path to config file (default: auto-discover)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Directory holding RSE.jar (overrides config and environment)
        #[arg(long)]
        model_dir: Option<PathBuf>,
    },

    /// Rank the metric changes that would most improve one method
    Improve {
        /// Path to a Java file
        path: PathBuf,

        /// Name of the method to improve
        #[arg(long)]
        method: String,

        /// Path to config file (default: auto-discover)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Directory holding RSE.jar (overrides config and environment)
        #[arg(long)]
        model_dir: Option<PathBuf>,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Rate {
            path,
            format,
            top,
            max_score,
            config,
            model_dir,
        } => rate_command(&path, format, top, max_score, config.as_deref(), model_dir),
        Commands::Improve {
            path,
            method,
            config,
            model_dir,
        } => improve_command(&path, &method, config.as_deref(), model_dir),
    }
}

/// Load explicit or discovered config; absent config resolves to defaults
fn resolve_config(explicit: Option<&Path>, root: &Path) -> anyhow::Result<ResolvedConfig> {
    let config = match explicit {
        Some(path) => ReadabilityConfig::load(path)?,
        None => {
            let root = if root.is_dir() {
                root.to_path_buf()
            } else {
                root.parent().map(Path::to_path_buf).unwrap_or_default()
            };
            ReadabilityConfig::discover(&root)?.unwrap_or_default()
        }
    };
    config.resolve()
}

/// Model directory precedence: flag, then config, then environment
fn resolve_model_dir(
    flag: Option<PathBuf>,
    config: &ResolvedConfig,
) -> anyhow::Result<PathBuf> {
    if let Some(dir) = flag {
        return Ok(dir);
    }
    if let Some(dir) = &config.model_dir {
        return Ok(dir.clone());
    }
    if let Ok(dir) = std::env::var("READABILITY_MODEL_DIR") {
        return Ok(PathBuf::from(dir));
    }
    bail!(
        "no scoring model configured: pass --model-dir, set model_dir in \
         .readabilityrc.json, or export READABILITY_MODEL_DIR"
    );
}

fn rate_command(
    path: &Path,
    format: OutputFormat,
    top: Option<usize>,
    max_score: Option<f64>,
    config_path: Option<&Path>,
    model_dir: Option<PathBuf>,
) -> anyhow::Result<()> {
    let config = resolve_config(config_path, path)?;
    let model_dir = resolve_model_dir(model_dir, &config)?;
    let engine = RseEngine::new(model_dir)?;
    let mut pipeline = RatingPipeline::new(engine).with_workers(config.workers);

    let files: Vec<PathBuf> = collect_java_files(path)
        .with_context(|| format!("failed to collect Java files under {}", path.display()))?
        .into_iter()
        .filter(|file| config.should_include(file))
        .collect();
    if files.is_empty() {
        bail!("no Java files found under {}", path.display());
    }

    let bar = ProgressBar::new(files.len() as u64);
    bar.set_style(ProgressStyle::with_template(
        "{bar:40} {pos}/{len} {msg}",
    )?);

    let mut reports: Vec<MethodRatingReport> = Vec::new();
    for file in &files {
        bar.set_message(file.display().to_string());
        let rated = pipeline
            .rate(file)
            .with_context(|| format!("rating failed for {}", file.display()))?;
        reports.extend(rated.iter().map(MethodRatingReport::new));
        bar.inc(1);
    }
    bar.finish_and_clear();

    let mut reports = sort_reports(reports);
    let threshold = max_score.or(config.max_score);
    if let Some(threshold) = threshold {
        reports.retain(|report| report.score <= threshold);
    }
    if let Some(top) = top {
        reports.truncate(top);
    }

    match format {
        OutputFormat::Text => print!("{}", render_text(&reports)),
        OutputFormat::Json => println!("{}", render_json(&reports)),
    }
    Ok(())
}

fn improve_command(
    path: &Path,
    method: &str,
    config_path: Option<&Path>,
    model_dir: Option<PathBuf>,
) -> anyhow::Result<()> {
    let config = resolve_config(config_path, path)?;
    let model_dir = resolve_model_dir(model_dir, &config)?;
    let engine = RseEngine::new(model_dir)?;
    let mut pipeline = RatingPipeline::new(engine).with_workers(config.workers);

    let rated = pipeline
        .rate(path)
        .with_context(|| format!("rating failed for {}", path.display()))?;
    let target = rated
        .iter()
        .find(|scope| scope.method_name() == method)
        .with_context(|| format!("no method named `{method}` in {}", path.display()))?;

    let ranked = rank_improvements(target.result())?;
    println!(
        "Method `{}` scores {:.2} (lines {}-{})",
        target.method_name(),
        target.score(),
        target.start_line(false),
        target.end_line(false),
    );
    if ranked.is_empty() {
        println!("No single-metric change would raise the score.");
        return Ok(());
    }

    println!(
        "{:<6} {:<34} {:>12} {:>12} {:>10}",
        "RANK", "METRIC", "ACTUAL", "TARGET", "SCORE"
    );
    for improvement in &ranked {
        let actual = improvement
            .actual_value
            .map(|v| format!("{v:.3}"))
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:<6} {:<34} {:>12} {:>12.3} {:>10.3}",
            improvement.rank,
            improvement.metric,
            actual,
            improvement.improved_value,
            improvement.improved_score,
        );
    }
    Ok(())
}
