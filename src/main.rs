use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

use sudokuscan::{Pipeline, ReferenceDigitSet, ScanConfig, generate_references, load_image};

#[derive(Parser)]
#[command(name = "sudokuscan")]
#[command(about = "Read the digits of a photographed 9x9 puzzle grid")]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// JSON file overriding the default scan parameters
    #[arg(long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Recognize the grid in a puzzle photograph
    Extract(ExtractArgs),

    /// Create reference digits from a sheet with digit d in column d
    References(ReferenceArgs),
}

#[derive(Args)]
struct ExtractArgs {
    /// Path to input image file
    #[arg(value_name = "IMAGE")]
    image_path: PathBuf,

    /// Directory holding 1.png .. 9.png
    #[arg(long, value_name = "DIR")]
    references: Option<PathBuf>,

    /// Save intermediate images to directory (must be empty)
    #[arg(long, value_name = "DIR")]
    debug_out: Option<PathBuf>,

    /// Use image size / 9 instead of estimating the cell size
    #[arg(long)]
    no_estimate: bool,

    /// Print the grid as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct ReferenceArgs {
    /// Known-good sheet with digits 1-9 in columns 1-9
    #[arg(value_name = "IMAGE")]
    image_path: PathBuf,

    /// Output directory for the reference digits
    #[arg(long, value_name = "DIR")]
    out: Option<PathBuf>,
}

fn load_config(path: Option<&Path>) -> anyhow::Result<ScanConfig> {
    match path {
        Some(path) => ScanConfig::from_json_file(path)
            .with_context(|| format!("loading config {}", path.display())),
        None => Ok(ScanConfig::default()),
    }
}

fn run_extract(args: ExtractArgs, mut config: ScanConfig) -> anyhow::Result<()> {
    if let Some(dir) = args.references {
        config.references.directory = dir;
    }
    if args.no_estimate {
        config.geometry.enabled = false;
    }

    let img = load_image(&args.image_path)?;
    tracing::info!(
        path = %args.image_path.display(),
        width = img.width(),
        height = img.height(),
        "image loaded"
    );

    let references = ReferenceDigitSet::load(&config.references)?;

    let mut pipeline = Pipeline::new(config);
    if let Some(debug_dir) = args.debug_out {
        pipeline = pipeline.with_debug(debug_dir)?;
    }

    let output = pipeline.run(&img, &references)?;

    if args.json {
        println!("{}", serde_json::to_string(&output.grid.rows())?);
    } else {
        print!("{}", output.grid);
    }

    Ok(())
}

fn run_references(args: ReferenceArgs, mut config: ScanConfig) -> anyhow::Result<()> {
    if let Some(dir) = args.out {
        config.references.directory = dir;
    }

    let written = generate_references(&args.image_path, &config)
        .with_context(|| format!("generating references from {}", args.image_path.display()))?;
    for path in &written {
        println!("{}", path.display());
    }

    Ok(())
}

fn main() -> anyhow::Result<()> {
    let args = Cli::parse();

    let default_level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = load_config(args.config.as_deref())?;

    match args.command {
        Command::Extract(extract) => run_extract(extract, config),
        Command::References(references) => run_references(references, config),
    }
}
