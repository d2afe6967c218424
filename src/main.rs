use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use tracing::info;

use taxi_prep::config::Config;
use taxi_prep::dataset;
use taxi_prep::logging;
use taxi_prep::pipeline::{CleaningPipeline, FeaturePipeline};
use taxi_prep::report;

#[derive(Parser)]
#[command(name = "taxi_prep")]
#[command(about = "NYC taxi trip data cleaning and feature engineering pipeline")]
#[command(version = "0.1.0")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Clean a raw trip dataset: dedup, validate, flag outliers
    Clean {
        /// Raw input CSV
        #[arg(long)]
        input: PathBuf,
        /// Cleaned output CSV (report and stats written alongside)
        #[arg(long, default_value = "cleaned_taxi_data.csv")]
        output: PathBuf,
        /// TOML config overriding bounds/constraints/outlier settings
        #[arg(long)]
        config: Option<PathBuf>,
        /// RNG seed for outlier sampling on large datasets
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Derive analytic features from a cleaned trip dataset
    Features {
        /// Cleaned input CSV
        #[arg(long)]
        input: PathBuf,
        /// Enhanced output CSV (report and stats written alongside)
        #[arg(long, default_value = "enhanced_taxi_data.csv")]
        output: PathBuf,
    },
    /// Run cleaning and feature engineering sequentially
    Run {
        /// Raw input CSV
        #[arg(long)]
        input: PathBuf,
        /// Directory for cleaned/enhanced outputs and reports
        #[arg(long, default_value = "output")]
        output_dir: PathBuf,
        /// TOML config overriding bounds/constraints/outlier settings
        #[arg(long)]
        config: Option<PathBuf>,
        /// RNG seed for outlier sampling on large datasets
        #[arg(long)]
        seed: Option<u64>,
    },
}

/// Builds a sibling path like `cleaned_taxi_data_cleaning_report.txt` from
/// `cleaned_taxi_data.csv`.
fn companion_path(output: &Path, suffix: &str) -> PathBuf {
    let stem = output
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or("output");
    output.with_file_name(format!("{stem}{suffix}"))
}

fn run_cleaning(
    input: &Path,
    output: &Path,
    config: &Config,
    seed: Option<u64>,
) -> anyhow::Result<()> {
    println!("🧹 Running cleaning pipeline...");
    info!(input = %input.display(), "starting cleaning run");

    let records = dataset::read_records(input)?;
    let mut pipeline = CleaningPipeline::new(config);
    if let Some(seed) = seed {
        pipeline = pipeline.with_seed(seed);
    }
    let cleaned = pipeline.run(records);

    dataset::write_cleaned(output, &cleaned)?;
    report::write_cleaning_report(
        &companion_path(output, "_cleaning_report.txt"),
        input,
        output,
        pipeline.stats(),
        pipeline.bounds(),
    )?;
    report::write_stats_json(
        &companion_path(output, "_cleaning_stats.json"),
        pipeline.stats(),
    )?;

    let stats = pipeline.stats();
    println!("\n📊 Cleaning Results:");
    println!("   Total records: {}", stats.total_records);
    println!("   Valid records: {}", stats.valid_records);
    println!("   Invalid records: {}", stats.invalid_records);
    println!("   Duplicates removed: {}", stats.duplicates_removed);
    println!("   Outliers flagged: {}", stats.outliers_detected);
    println!("   Data quality: {:.2}%", stats.data_quality_pct());
    println!("   Output file: {}", output.display());
    Ok(())
}

fn run_features(input: &Path, output: &Path) -> anyhow::Result<()> {
    println!("🛠️  Running feature engineering pipeline...");
    info!(input = %input.display(), "starting feature engineering run");

    let records = dataset::read_records(input)?;
    let mut pipeline = FeaturePipeline::new();
    let enriched = pipeline.run(records);

    dataset::write_enriched(output, &enriched)?;
    report::write_feature_report(
        &companion_path(output, "_features_report.txt"),
        input,
        output,
        pipeline.stats(),
        enriched.first(),
    )?;
    report::write_stats_json(
        &companion_path(output, "_features_stats.json"),
        pipeline.stats(),
    )?;

    let stats = pipeline.stats();
    println!("\n📊 Feature Engineering Results:");
    println!("   Records processed: {}", stats.records_processed);
    println!("   Features created: {}", stats.features_created);
    println!("   Output file: {}", output.display());
    Ok(())
}

fn main() -> anyhow::Result<()> {
    // Initialize logging
    logging::init_logging();

    let cli = Cli::parse();

    match cli.command {
        Commands::Clean {
            input,
            output,
            config,
            seed,
        } => {
            let config = Config::load_or_default(config.as_deref())?;
            run_cleaning(&input, &output, &config, seed)?;
            println!("\n✅ Cleaning completed");
        }
        Commands::Features { input, output } => {
            run_features(&input, &output)?;
            println!("\n✅ Feature engineering completed");
        }
        Commands::Run {
            input,
            output_dir,
            config,
            seed,
        } => {
            println!("🚀 Running full pipeline (cleaning + feature engineering)...");
            let config = Config::load_or_default(config.as_deref())?;
            std::fs::create_dir_all(&output_dir)?;

            let cleaned_path = output_dir.join("cleaned_taxi_data.csv");
            let enhanced_path = output_dir.join("enhanced_taxi_data.csv");

            println!("\n📥 Step 1: Cleaning...");
            run_cleaning(&input, &cleaned_path, &config, seed)?;

            println!("\n🛠️  Step 2: Feature engineering...");
            run_features(&cleaned_path, &enhanced_path)?;

            println!("\n✅ Full pipeline completed successfully!");
        }
    }
    Ok(())
}
