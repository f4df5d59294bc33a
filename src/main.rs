use anyhow::{anyhow, Context};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, error, info, trace};
use tracing_subscriber::EnvFilter;

use safe_regroup::config::{Config, ConfigLoader};
use safe_regroup::pipeline::{DriverOptions, PipelineDriver, PipelineRequest};
use safe_regroup::regroup::{ExternalTransformer, GroupingSpec, IdentityTransformer, Transformer};
use safe_regroup::storage::{write_table_file, ChunkStore, DirectoryStore};
use safe_regroup::subprocess::production_runner;
use safe_regroup::table::mtx;

/// Regroup wide feature tables chunk by chunk
#[derive(Parser)]
#[command(name = "safe-regroup")]
#[command(about = "Split a table by sample, regroup each chunk, and join the results", long_about = None)]
struct Cli {
    /// Enable verbose output (-v for debug, -vv for trace, -vvv for all)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to configuration file
    #[arg(short = 'c', long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Regroup a BIOM table one chunk of samples at a time
    Regroup(RegroupArgs),
    /// Build a BIOM table from a Matrix Market file and id lists
    Convert {
        /// Matrix Market coordinate file (features x samples)
        matrix: PathBuf,

        /// Feature identifiers, one per line
        row_ids: PathBuf,

        /// Sample identifiers, one per line
        col_ids: PathBuf,

        /// Where to write the BIOM table
        output: PathBuf,
    },
}

#[derive(Args)]
struct RegroupArgs {
    /// Input BIOM table
    input: PathBuf,

    /// Grouping passed to the regroup tool's -g flag (e.g. uniref90_ko)
    group: String,

    /// Where to write the joined table
    output: PathBuf,

    /// Samples per chunk (default: 100)
    #[arg(short = 'n', long)]
    chunk_size: Option<usize>,

    /// Keep intermediates in this directory instead of a fresh run directory
    #[arg(short = 'w', long)]
    work_dir: Option<PathBuf>,

    /// Regroup command line, split with shell quoting rules
    #[arg(long)]
    regroup_command: Option<String>,

    /// Trust a zero exit status without checking for the output file
    #[arg(long)]
    no_verify_outputs: bool,

    /// Delete intermediates after a successful run
    #[arg(long)]
    cleanup: bool,

    /// Split and join without calling the regroup tool
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = ConfigLoader::load(cli.config.as_deref()).await;

    let configured_level = config.as_ref().ok().and_then(|c| c.log_level.clone());
    let log_level = match (cli.verbose, configured_level) {
        (0, Some(level)) => level,
        (0, None) => "info".to_string(),
        (1, _) => "debug".to_string(),
        _ => "trace".to_string(),
    };

    let filter = EnvFilter::try_new(&log_level).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(cli.verbose >= 2) // Show target module for -vv and above
        .with_thread_ids(cli.verbose >= 3) // Show thread IDs for -vvv
        .with_line_number(cli.verbose >= 3) // Show line numbers for -vvv
        .init();

    debug!("safe-regroup started with verbosity level: {}", cli.verbose);
    trace!("Full CLI args: {:?}", std::env::args().collect::<Vec<_>>());

    let result = match config {
        Ok(config) => run(cli.command, config).await,
        Err(e) => Err(e),
    };

    if let Err(e) = result {
        error!("Fatal error: {}", e);
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

async fn run(command: Commands, config: Config) -> anyhow::Result<()> {
    match command {
        Commands::Regroup(args) => run_regroup(args, config).await,
        Commands::Convert {
            matrix,
            row_ids,
            col_ids,
            output,
        } => run_convert(matrix, row_ids, col_ids, output, config).await,
    }
}

async fn run_regroup(args: RegroupArgs, mut config: Config) -> anyhow::Result<()> {
    if let Some(chunk_size) = args.chunk_size {
        config.chunk_size = chunk_size;
    }
    if let Some(command) = args.regroup_command {
        config.regroup_command = command;
    }
    if args.no_verify_outputs {
        config.verify_outputs = false;
    }
    if args.cleanup {
        config.keep_intermediates = false;
    }
    config
        .validate()
        .map_err(|e| anyhow!(e.coded_message()))?;
    debug!("Effective configuration: {:?}", config);

    // The regroup tool runs from the store root, so its paths must be absolute
    let store = match args.work_dir {
        Some(dir) => DirectoryStore::new(std::path::absolute(&dir)?).await?,
        None => DirectoryStore::for_run(&std::path::absolute(&config.work_root)?).await?,
    };
    let store = Arc::new(store);
    info!("Intermediate files go to {}", store.root().display());

    let transformer: Arc<dyn Transformer> = if args.dry_run {
        info!("Dry run: chunks are joined without regrouping");
        Arc::new(IdentityTransformer)
    } else {
        Arc::new(
            ExternalTransformer::from_command_line(&config.regroup_command, production_runner())?
                .with_working_dir(store.root()),
        )
    };

    let options = DriverOptions {
        verify_outputs: config.verify_outputs,
        keep_intermediates: config.keep_intermediates,
        provenance: config.provenance.clone(),
    };
    let mut driver = PipelineDriver::new(store.clone(), transformer, options);

    let request = PipelineRequest {
        input: args.input,
        grouping: GroupingSpec::new(args.group),
        chunk_size: config.chunk_size,
        output: args.output,
    };
    let mut report = driver.run(&request).await;

    if let Some(err) = report.error.take() {
        if let Some(chunk) = report.failed_chunk() {
            eprintln!(
                "Split {} ({}) failed with {}",
                chunk.index,
                chunk.chunk_path.display(),
                chunk.status
            );
            if !chunk.stdout.trim().is_empty() {
                eprintln!("--- stdout ---\n{}", chunk.stdout.trim_end());
            }
            if !chunk.stderr.trim().is_empty() {
                eprintln!("--- stderr ---\n{}", chunk.stderr.trim_end());
            }
        }
        eprintln!("Intermediate files kept in {}", store.root().display());
        return Err(anyhow!(err.coded_message()));
    }

    let output = report
        .output
        .ok_or_else(|| anyhow!("Pipeline finished without an output path"))?;
    println!(
        "Regrouped {} chunks into {}",
        report.chunks.len(),
        output.display()
    );
    if let Some(stats) = report.cleanup {
        println!(
            "Removed {} intermediate files ({} bytes)",
            stats.items_removed, stats.bytes_reclaimed
        );
    }
    Ok(())
}

async fn run_convert(
    matrix: PathBuf,
    row_ids: PathBuf,
    col_ids: PathBuf,
    output: PathBuf,
    config: Config,
) -> anyhow::Result<()> {
    info!("Loading {}", matrix.display());
    let table = mtx::load_from_parts(&matrix, &row_ids, &col_ids)
        .await
        .with_context(|| format!("Failed to build table from {}", matrix.display()))?;

    info!("Saving table to {}", output.display());
    write_table_file(&output, &table, &config.provenance).await?;
    println!(
        "Wrote {} features x {} samples to {}",
        table.n_rows(),
        table.n_cols(),
        output.display()
    );
    Ok(())
}
