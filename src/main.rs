use demand_scope::analyzer::{Decomposer, StlDecomposer};
use demand_scope::config::{load_or_default, AppConfig};
use demand_scope::exporter::{render_preview, Destination};
use demand_scope::model::PipelineError;
use demand_scope::preflight;
use demand_scope::provider::{
    GoogleTrendsFetcher, QuerySettings, SeriesCache, SeriesProvider, TrendsSource,
};
use demand_scope::Pipeline;

use clap::Parser;
use std::error::Error;
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

const PREVIEW_ROWS: usize = 10;

#[derive(Parser)]
#[command(name = "demand-scope")]
#[command(about = "Google Trends interest (US, last 5y) → robust STL → CSV", long_about = None)]
struct Cli {
    /// Keyword to analyse; omit to enter keywords interactively
    keyword: Vec<String>,

    /// JSON config file (missing file = defaults)
    #[arg(short, long, default_value = "config.json")]
    config: PathBuf,

    /// Directory for CSV exports (overrides the config)
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Print the CSV to stdout instead of writing a file
    #[arg(long)]
    stdout: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Set panic hook to log details about any panic
    std::panic::set_hook(Box::new(|panic_info| {
        eprintln!("😱 Panic occurred: {:?}", panic_info);
    }));

    let cli = Cli::parse();

    let mut config: AppConfig = match load_or_default(&cli.config) {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("Config load error: {}", e);
            return ExitCode::FAILURE;
        }
    };
    if let Some(dir) = cli.output_dir {
        config.output_dir = dir;
    }
    let destination = if cli.stdout {
        Destination::Stdout
    } else {
        Destination::Dir(config.output_dir.clone())
    };

    let issues = preflight::check(&config);
    if !issues.is_empty() {
        for issue in &issues {
            error!("Preflight check failed: {}", issue);
        }
        return ExitCode::FAILURE;
    }

    let fetcher = match GoogleTrendsFetcher::new(&config) {
        Ok(f) => f,
        Err(e) => {
            error!("Failed to initialize HTTP client: {}", e);
            return ExitCode::FAILURE;
        }
    };
    let cache = Arc::new(SeriesCache::new(config.cache_ttl()));
    let provider = SeriesProvider::new(fetcher, QuerySettings::from(&config)).with_cache(cache);
    let pipeline = Pipeline::new(provider, StlDecomposer::robust());

    info!(
        "🚀 Ready: region={} language={} timeframe='{}'",
        config.region, config.language, config.timeframe
    );

    if !cli.keyword.is_empty() {
        let keyword = cli.keyword.join(" ");
        return match run_once(&pipeline, &keyword, &destination).await {
            Ok(()) => ExitCode::SUCCESS,
            Err(_) => ExitCode::FAILURE,
        };
    }

    interactive(&pipeline, &destination).await;
    ExitCode::SUCCESS
}

/// Prompts for keywords until `quit`, `exit` or end of input.
async fn interactive<S: TrendsSource, D: Decomposer>(
    pipeline: &Pipeline<S, D>,
    destination: &Destination,
) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("Keyword (e.g. rocket stove, 'quit' to exit): ");
        let _ = std::io::stdout().flush();

        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                warn!("Failed to read input: {}", e);
                break;
            }
        };
        match line.trim() {
            "quit" | "exit" => break,
            keyword => {
                let _ = run_once(pipeline, keyword, destination).await;
            }
        }
    }
    info!("Bye.");
}

async fn run_once<S: TrendsSource, D: Decomposer>(
    pipeline: &Pipeline<S, D>,
    keyword: &str,
    destination: &Destination,
) -> Result<(), Box<dyn Error>> {
    let report = match pipeline.run(keyword).await {
        Ok(report) => report,
        Err(e) => {
            error!("❌ [{}] {}", e.stage(), e);
            if matches!(e, PipelineError::FetchFailure(_)) {
                info!("Tip: the source may be rate limiting; wait a moment and try again.");
            }
            return Err(e.into());
        }
    };

    info!("\n{}", render_preview(&report, PREVIEW_ROWS));

    if let Err(e) = destination.deliver(&report.table, &report.keyword) {
        error!("❌ [export] CSV export failed: {}", e);
        return Err(e.into());
    }
    Ok(())
}
