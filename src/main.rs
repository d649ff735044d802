use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use tracing::info;

use banyan_eval::{CrossValidation, VariantConfig};
use banyan_forest::{MaxFeatures, PatchBounds, ProjectionMatrix};
use banyan_io::{DatasetReader, ExperimentName, ResultWriter};

#[derive(Parser)]
#[command(name = "banyan")]
#[command(about = "Cross-validated evaluation of structured random forests on graph data")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// RNG seed for reproducibility
    #[arg(long, default_value_t = 42, global = true)]
    seed: u64,

    /// Enable verbose (debug-level) logging
    #[arg(long, global = true)]
    verbose: bool,

    /// Suppress all output except errors
    #[arg(long, global = true)]
    quiet: bool,

    /// Number of threads for parallel computation (defaults to all cores)
    #[arg(long, global = true)]
    threads: Option<usize>,
}

/// Shared forest and cross-validation tuning parameters.
#[derive(Args, Debug, Clone)]
struct ForestArgs {
    /// Number of cross-validation folds
    #[arg(long, default_value_t = 5)]
    folds: usize,

    /// Number of trees per forest
    #[arg(long, default_value_t = 100)]
    n_trees: usize,

    /// Comma-separated projection matrices to evaluate
    #[arg(
        long,
        value_delimiter = ',',
        default_value = "RerF,S-RerF,Graph-Node-RerF,Graph-Edge-RerF"
    )]
    variants: Vec<String>,

    /// Candidate projections per split for RerF (sqrt of features if unset)
    #[arg(long)]
    sporf_mtry: Option<usize>,

    /// Candidate projections per split for structured variants (sqrt of features if unset)
    #[arg(long)]
    morf_mtry: Option<usize>,

    /// Minimum patch size for structured variants
    #[arg(long, default_value_t = 1)]
    patch_min: usize,

    /// Maximum patch size for structured variants
    #[arg(long, default_value_t = 3)]
    patch_max: usize,
}

#[derive(Subcommand)]
enum Command {
    /// Evaluate every variant plus the embedding baseline into an error table
    Classify {
        /// Path to the input CSV file
        #[arg(long)]
        data: PathBuf,

        /// Experiment name for output files (must match [a-zA-Z0-9_-]+)
        #[arg(long)]
        experiment: String,

        /// Output directory for result files
        #[arg(long, default_value = ".")]
        output_dir: PathBuf,

        #[command(flatten)]
        forest: ForestArgs,
    },

    /// Collect per-fold class-probability matrices for every variant
    Sweep {
        /// Path to the input CSV file
        #[arg(long)]
        data: PathBuf,

        /// Experiment name for output files (must match [a-zA-Z0-9_-]+)
        #[arg(long)]
        experiment: String,

        /// Output directory for result files
        #[arg(long, default_value = ".")]
        output_dir: PathBuf,

        #[command(flatten)]
        forest: ForestArgs,
    },
}

// --- JSON stdout output structs ---

#[derive(Serialize)]
struct ClassifyOutput {
    experiment: String,
    n_samples: usize,
    n_classes: usize,
    n_folds: usize,
    columns: Vec<String>,
    mean_errors: Vec<f64>,
}

#[derive(Serialize)]
struct SweepOutput {
    experiment: String,
    n_samples: usize,
    n_folds: usize,
    n_variants: usize,
    test_counts: Vec<usize>,
}

fn parse_variants(names: &[String]) -> Result<Vec<ProjectionMatrix>> {
    names
        .iter()
        .map(|name| {
            ProjectionMatrix::parse(name)
                .with_context(|| format!("invalid --variants entry \"{name}\""))
        })
        .collect()
}

fn build_variant_config(args: &ForestArgs, seed: u64) -> Result<VariantConfig> {
    let variants = parse_variants(&args.variants)?;
    let patch_bounds = PatchBounds::new(args.patch_min, args.patch_max)
        .context("invalid patch bounds")?;

    let mut config = VariantConfig::new(args.n_trees)
        .context("invalid forest configuration")?
        .with_variants(variants)
        .with_patch_bounds(patch_bounds)
        .with_seed(seed);

    if let Some(mtry) = args.sporf_mtry {
        config = config.with_sporf_mtry(MaxFeatures::Fixed(mtry));
    }
    if let Some(mtry) = args.morf_mtry {
        config = config.with_morf_mtry(MaxFeatures::Fixed(mtry));
    }
    Ok(config)
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = match (cli.verbose, cli.quiet) {
        (true, _) => "debug",
        (_, true) => "error",
        _ => "info",
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    // Configure Rayon thread pool
    if let Some(threads) = cli.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .context("failed to configure thread pool")?;
        info!(threads, "thread pool configured");
    }

    match cli.command {
        Command::Classify {
            data,
            experiment,
            output_dir,
            forest,
        } => {
            let experiment_name = ExperimentName::new(experiment.clone())?;

            // Read dataset
            let dataset = DatasetReader::new(&data)
                .read()
                .context("failed to read input CSV")?;
            info!(
                n_samples = dataset.n_samples(),
                n_classes = dataset.n_classes(),
                order = dataset.order(),
                "dataset loaded"
            );

            // Cross-validate every variant plus the baseline
            let config = build_variant_config(&forest, cli.seed)?;
            let cv = CrossValidation::new(forest.folds)?.with_seed(cli.seed);
            let table = cv
                .error_table(dataset.samples(), dataset.labels(), &config)
                .context("cross-validation failed")?;

            // Write JSON artifact
            let writer = ResultWriter::new(&output_dir, experiment_name)?;
            writer.write_classify(
                dataset.n_samples(),
                dataset.n_classes(),
                table.columns(),
                table.rows(),
                &table.column_means(),
            )?;

            // Build and print stdout summary
            let output = ClassifyOutput {
                experiment,
                n_samples: dataset.n_samples(),
                n_classes: dataset.n_classes(),
                n_folds: table.n_folds(),
                columns: table.columns().to_vec(),
                mean_errors: table.column_means(),
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }

        Command::Sweep {
            data,
            experiment,
            output_dir,
            forest,
        } => {
            let experiment_name = ExperimentName::new(experiment.clone())?;

            // Read dataset
            let dataset = DatasetReader::new(&data)
                .read()
                .context("failed to read input CSV")?;
            info!(
                n_samples = dataset.n_samples(),
                n_classes = dataset.n_classes(),
                order = dataset.order(),
                "dataset loaded"
            );

            // Collect probability matrices per fold
            let config = build_variant_config(&forest, cli.seed)?;
            let cv = CrossValidation::new(forest.folds)?.with_seed(cli.seed);
            let sweep = cv
                .probability_sweep(dataset.samples(), dataset.labels(), &config)
                .context("probability sweep failed")?;

            // Flatten to primitives for the writer
            let folds: Vec<Vec<Vec<Vec<f64>>>> = sweep
                .iter()
                .map(|matrices| matrices.iter().map(|m| m.rows().to_vec()).collect())
                .collect();
            let variant_names: Vec<String> = config
                .variants()
                .iter()
                .map(|v| v.name().to_string())
                .collect();

            let writer = ResultWriter::new(&output_dir, experiment_name)?;
            writer.write_sweep(dataset.n_samples(), &variant_names, &folds)?;

            // Build and print stdout summary
            let test_counts: Vec<usize> = sweep
                .iter()
                .map(|matrices| matrices.first().map_or(0, |m| m.n_rows()))
                .collect();
            let output = SweepOutput {
                experiment,
                n_samples: dataset.n_samples(),
                n_folds: sweep.len(),
                n_variants: variant_names.len(),
                test_counts,
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }

    Ok(())
}
