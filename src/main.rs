//! # Post Asset Optimizer - Main Entry Point
//!
//! Questo è il punto di ingresso principale dell'applicazione.
//!
//! ## Responsabilità:
//! - Parsing degli argomenti della command line con `clap`
//! - Inizializzazione del sistema di logging con `tracing`
//! - Costruzione della configurazione (file JSON + override da CLI)
//! - Avvio dell'optimizer e mappatura dell'esito sul codice di uscita
//!
//! ## Codici di uscita:
//! - `0`: successo, anche con fallimenti parziali o nessun candidato
//! - `1`: directory radice illeggibile o configurazione non valida
//! - `2`: tutti i candidati sono falliti
//!
//! ## Esempio di utilizzo:
//! ```bash
//! asset-optimizer assets/images/posts --max-dimension 1200 --quality 85 --verbose
//! ```

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use post_asset_optimizer::{
    json_output::JsonMessage, AssetOptimizer, Config, OptimizeError, ResizeAlgorithm, RunStatus,
};

#[derive(Parser)]
#[command(name = "asset-optimizer")]
#[command(about = "Shrink and recompress blog post images in place")]
struct Args {
    /// Directory containing the images to optimize
    #[arg(default_value = "assets/images/posts")]
    root: PathBuf,

    /// Maximum size in pixels of the larger image side [default: 1200]
    #[arg(short, long)]
    max_dimension: Option<u32>,

    /// JPEG quality (1-100) [default: 85]
    #[arg(short, long)]
    quality: Option<u32>,

    /// Number of parallel workers [default: available CPUs]
    #[arg(short, long)]
    workers: Option<usize>,

    /// Comma-separated extension allow-list [default: jpg,jpeg,png]
    #[arg(short, long, value_delimiter = ',')]
    extensions: Option<Vec<String>>,

    /// Resampling filter [default: lanczos]
    #[arg(short, long, value_enum)]
    filter: Option<ResizeAlgorithm>,

    /// Dry run - encode but don't replace files
    #[arg(long)]
    dry_run: bool,

    /// Emit line-delimited JSON events on stdout
    #[arg(long)]
    json: bool,

    /// JSON configuration file; explicit flags override its values
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) => {
            let _ = e.print();
            return ExitCode::from(parse_failure_code(&e));
        }
    };

    if let Err(e) = init_logging(args.verbose) {
        eprintln!("Failed to initialize logging: {}", e);
    }

    let json_output = args.json;
    let outcome = run(args).await;
    if let Err(ref e) = outcome {
        error!("{:#}", e);
        if json_output {
            JsonMessage::error(e.to_string(), e.chain().nth(1).map(|s| s.to_string())).emit();
        }
    }
    ExitCode::from(exit_code(&outcome))
}

/// `--help` and `--version` succeed; real parse errors exit 1 so they never
/// read as "every candidate failed"
fn parse_failure_code(error: &clap::Error) -> u8 {
    if error.use_stderr() {
        RunStatus::Fatal.exit_code()
    } else {
        RunStatus::Success.exit_code()
    }
}

fn exit_code(outcome: &Result<RunStatus>) -> u8 {
    match outcome {
        Ok(status) => status.exit_code(),
        Err(_) => RunStatus::Fatal.exit_code(),
    }
}

fn init_logging(verbose: bool) -> Result<()> {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    // stderr keeps stdout clean for --json
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

async fn run(args: Args) -> Result<RunStatus> {
    let config = build_config(&args).await?;
    let optimizer = AssetOptimizer::new(config)?;

    let stop = optimizer.stop_handle();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received, finishing in-flight images");
            stop.stop();
        }
    });

    let result = optimizer.run(&args.root).await?;
    let status = result.status();
    if status == RunStatus::AllFailed {
        error!("Every candidate image failed to process");
    }
    Ok(status)
}

/// Merge the optional config file with explicit command-line flags
async fn build_config(args: &Args) -> Result<Config> {
    let mut config = match args.config {
        Some(ref path) => {
            info!("Loading configuration from {}", path.display());
            Config::from_file(path).await?
        }
        None => Config::default(),
    };

    if let Some(max_dimension) = args.max_dimension {
        config.max_dimension = max_dimension;
    }
    if let Some(quality) = args.quality {
        config.quality = u8::try_from(quality).map_err(|_| {
            OptimizeError::Policy(format!("quality must be between 1 and 100, got {}", quality))
        })?;
    }
    if let Some(workers) = args.workers {
        config.workers = workers;
    }
    if let Some(ref extensions) = args.extensions {
        config.extensions = extensions.clone();
    }
    if let Some(filter) = args.filter {
        config.filter = filter;
    }
    config.dry_run |= args.dry_run;
    config.json_output |= args.json;

    config.validate()?;
    Ok(config)
}
