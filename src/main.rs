//! MIRP Scorer CLI
//!
//! Scores recorded model answers from `*_run_<n>.json` files.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use mirp_scorer::{
    answer::parse,
    config::Config,
    evaluate::EvaluationMode,
    experiment::score_directory,
    records::ObjectCenterMap,
    report::{ExperimentReport, save_reports, write_experiment_csvs},
};
use std::path::PathBuf;
use std::time::Instant;
use tracing_subscriber::EnvFilter;

/// MIRP Scorer - score yes/no spatial answers of vision-language models
#[derive(Parser)]
#[command(name = "mirp-score")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Score every experiment against the image ground truth
    Image {
        /// Directory with the *_run_<n>.json files
        #[arg(short, long)]
        answers_dir: Option<PathBuf>,

        /// Directory for the result CSV files
        #[arg(short, long)]
        output_dir: Option<PathBuf>,

        /// Also save all results to one JSON (or .csv) file
        #[arg(long)]
        json: Option<PathBuf>,
    },

    /// Score left/right questions against both image and anatomy ground truth
    Anatomy {
        /// Directory with the *_run_<n>.json files
        #[arg(short, long)]
        answers_dir: Option<PathBuf>,

        /// Object-center JSON of the reference orientation
        #[arg(short, long)]
        centers: Option<PathBuf>,

        /// Directory for the result CSV files
        #[arg(short, long)]
        output_dir: Option<PathBuf>,

        /// Also save all results to one JSON (or .csv) file
        #[arg(long)]
        json: Option<PathBuf>,
    },

    /// Parse a single model answer and explain the decision
    Parse {
        /// The raw model answer
        answer: String,

        /// The question the answer belongs to
        #[arg(short, long, default_value = "")]
        question: String,

        /// The prompt sent to the model
        #[arg(short, long, default_value = "")]
        prompt: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("mirp_scorer=debug,info")
        } else {
            EnvFilter::new("mirp_scorer=info,warn")
        }
    });
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match cli.command {
        Commands::Image {
            answers_dir,
            output_dir,
            json,
        } => cmd_image(answers_dir, output_dir, json),
        Commands::Anatomy {
            answers_dir,
            centers,
            output_dir,
            json,
        } => cmd_anatomy(answers_dir, centers, output_dir, json),
        Commands::Parse {
            answer,
            question,
            prompt,
        } => cmd_parse(&answer, &question, &prompt),
    }
}

fn load_config(answers_dir: Option<PathBuf>, output_dir: Option<PathBuf>) -> Result<Config> {
    let mut config = Config::load().context("Failed to load configuration")?;
    if let Some(dir) = answers_dir {
        config.evaluation.answers_dir = dir;
    }
    if output_dir.is_some() {
        config.evaluation.output_dir = output_dir;
    }
    config.validate().context("Invalid configuration")?;
    Ok(config)
}

fn cmd_image(
    answers_dir: Option<PathBuf>,
    output_dir: Option<PathBuf>,
    json: Option<PathBuf>,
) -> Result<()> {
    let config = load_config(answers_dir, output_dir)?;
    let evaluation = &config.evaluation;

    println!("Scoring answers in: {}", evaluation.answers_dir.display());
    let start = Instant::now();

    let reports = score_directory(&evaluation.answers_dir, EvaluationMode::Image)
        .context("Image evaluation failed")?;

    finish(&config, &reports, json, start)
}

fn cmd_anatomy(
    answers_dir: Option<PathBuf>,
    centers: Option<PathBuf>,
    output_dir: Option<PathBuf>,
    json: Option<PathBuf>,
) -> Result<()> {
    let mut config = load_config(answers_dir, output_dir)?;
    if let Some(centers) = centers {
        config.evaluation.centers_path = centers;
    }
    let evaluation = &config.evaluation;

    if !evaluation.answers_dir.is_dir() {
        anyhow::bail!(
            "Answers directory not found: '{}'",
            evaluation.answers_dir.display()
        );
    }

    let centers = ObjectCenterMap::load_json(&evaluation.centers_path)
        .context("Failed to load object centers")?;
    if centers.is_empty() {
        tracing::warn!(
            "No object centers in {}; every anatomy ground truth will be unavailable",
            evaluation.centers_path.display()
        );
    }
    println!(
        "Loaded centers for {} images from {}",
        centers.len(),
        evaluation.centers_path.display()
    );
    println!("Scoring answers in: {}", evaluation.answers_dir.display());
    let start = Instant::now();

    let reports = score_directory(&evaluation.answers_dir, EvaluationMode::AnatomyDual(&centers))
        .context("Anatomy evaluation failed")?;

    finish(&config, &reports, json, start)
}

fn finish(
    config: &Config,
    reports: &[ExperimentReport],
    json: Option<PathBuf>,
    start: Instant,
) -> Result<()> {
    let evaluation = &config.evaluation;

    for report in reports {
        report.print_summary();
    }

    let output_dir = evaluation.resolved_output_dir();
    let written = write_experiment_csvs(reports, &output_dir, evaluation.runs_per_experiment)
        .context("Failed to write result files")?;
    for path in &written {
        println!("Results saved to: {}", path.display());
    }

    if let Some(json_path) = json {
        save_reports(reports, &json_path, evaluation.runs_per_experiment)
            .context("Failed to save results")?;
        println!("All results saved to: {}", json_path.display());
    }

    println!(
        "\nScored {} experiments in {:.2?}",
        reports.len(),
        start.elapsed()
    );
    Ok(())
}

fn cmd_parse(answer: &str, question: &str, prompt: &str) -> Result<()> {
    let result = parse(answer, question, prompt);

    if result.is_unparseable() {
        println!("Label:    unparseable (scored as incorrect)");
    } else {
        if let Some(label) = result.label {
            println!("Label:    {}", label);
        }
        if let Some(tier) = result.tier {
            println!("Tier:     {}", tier);
        }
    }
    if let Some(residual) = &result.residual_text {
        println!("Residual: {:?}", residual);
    }

    Ok(())
}
