use batch_unpack::utils::validate_target_dir;
use batch_unpack::{Config, SevenZipExtractor, run_process};
use clap::Parser;
use std::path::PathBuf;
use std::process;
use tracing::{error, info};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt};

/// Extract numbered archives and normalize the resulting folders
#[derive(Parser, Debug)]
#[command(name = "batch-unpack", version, about, long_about = None)]
struct Cli {
    /// Absolute path of the directory holding the archives
    target: Option<String>,

    /// Configuration file to use instead of searching upward from the working directory
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,
}

fn init_logger() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .compact()
                .with_target(false)
                .without_time(),
        )
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() {
    init_logger();

    let cli = Cli::parse();
    info!(
        name = env!("CARGO_PKG_NAME"),
        version = env!("CARGO_PKG_VERSION"),
        "starting"
    );

    let Some(target) = cli.target else {
        error!("missing target directory, usage: batch-unpack <ABSOLUTE_DIR>");
        process::exit(1);
    };

    if let Err(e) = run(&target, cli.config).await {
        error!(code = e.error_code(), error = %e, "run failed");
        process::exit(1);
    }
}

async fn run(target: &str, config_path: Option<PathBuf>) -> batch_unpack::Result<()> {
    let target_dir = validate_target_dir(target).await?;
    info!(?target_dir, "target directory");

    let config = Config::load(config_path.as_deref()).await?;
    let extractor = SevenZipExtractor::from_config(&config)?;
    info!(binary = ?extractor.binary_path(), "using 7z");

    run_process(&target_dir, &config, &extractor).await?;
    Ok(())
}
