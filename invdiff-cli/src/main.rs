use std::{path::PathBuf, process::ExitCode, sync::Arc};

use anyhow::Context;
use clap::{ArgAction, Parser};
use invdiff_config::Config;
use invdiff_inventory::{
    compare,
    report::{render_verdict, Report},
    InventoryLoader, LoadMode,
};
use invdiff_object_storage::{resolve_profile, BucketStores, S3Settings};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Differences and load failures share the same exit code.
const EXIT_FAILURE: u8 = 1;

#[derive(Debug, Parser)]
#[command(
    name = "invdiff",
    version,
    about = "Compare S3 inventory files between two buckets",
    long_about = None
)]
struct Cli {
    #[arg(value_name = "BUCKET", long, help = "First bucket name")]
    bucket1: String,

    #[arg(value_name = "BUCKET", long, help = "Second bucket name")]
    bucket2: String,

    #[arg(
        value_name = "KEY",
        long,
        help = "Key of the first bucket's inventory file or manifest"
    )]
    inventory1: String,

    #[arg(
        value_name = "KEY",
        long,
        help = "Key of the second bucket's inventory file or manifest"
    )]
    inventory2: String,

    #[arg(long, action = ArgAction::SetTrue, help = "Treat inventory keys as manifest files")]
    use_manifest: bool,

    #[arg(value_name = "PROFILE", long, help = "AWS profile to use")]
    profile: Option<String>,

    #[arg(value_name = "REGION", long, help = "AWS region [env: INVDIFF_AWS_REGION]")]
    region: Option<String>,

    #[arg(
        value_name = "URL",
        long,
        help = "S3 compatible endpoint [env: INVDIFF_S3_ENDPOINT]"
    )]
    endpoint: Option<String>,

    #[arg(long, action = ArgAction::SetTrue, help = "Allow plain HTTP endpoints")]
    allow_http: bool,

    #[arg(
        value_name = "DIR",
        long,
        help = "Read buckets from sub directories of DIR instead of S3"
    )]
    local_root: Option<PathBuf>,

    #[arg(
        value_name = "N",
        long,
        help = "Data files fetched at once per manifest [env: INVDIFF_FETCH_CONCURRENCY]"
    )]
    concurrency: Option<usize>,

    #[arg(
        value_name = "N",
        long,
        help = "Entries listed per difference category [env: INVDIFF_REPORT_PREVIEW_LIMIT]"
    )]
    preview_limit: Option<usize>,

    #[arg(long, action = ArgAction::SetTrue, help = "Print the comparison result as JSON")]
    json: bool,

    /// Increase verbosity (-v, -vv). Use -q to quiet.
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,

    /// Only log errors. Overrides -v.
    #[arg(short = 'q', long, action = ArgAction::SetTrue)]
    quiet: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            // Tracing is configured from this config, so report directly.
            eprintln!("Invalid configuration: {}", e);
            return ExitCode::from(EXIT_FAILURE);
        }
    };
    setup_tracing(&cli, &config);

    let outcome = run(cli, &config).await;
    if let Err(e) = &outcome {
        tracing::error!("Comparison failed: {:#}", e);
    }
    ExitCode::from(exit_status(&outcome))
}

/// 0 when both inventories matched, [`EXIT_FAILURE`] on differences or errors.
fn exit_status(outcome: &anyhow::Result<bool>) -> u8 {
    match outcome {
        Ok(true) => 0,
        Ok(false) | Err(_) => EXIT_FAILURE,
    }
}

/// Returns whether both inventories matched.
async fn run(cli: Cli, config: &Config) -> anyhow::Result<bool> {
    let stores = build_stores(&cli, config).await?;
    tracing::debug!("Resolving buckets through {}", stores);

    let loader = InventoryLoader::new(Arc::new(stores))
        .with_fetch_concurrency(cli.concurrency.unwrap_or(config.fetch_concurrency));
    let mode = LoadMode::from_use_manifest(cli.use_manifest);

    tracing::info!("Loading inventory from {}/{}", cli.bucket1, cli.inventory1);
    let first = loader
        .load(mode, &cli.bucket1, &cli.inventory1)
        .await
        .with_context(|| format!("Failed to load inventory of {}", cli.bucket1))?;

    tracing::info!("Loading inventory from {}/{}", cli.bucket2, cli.inventory2);
    let second = loader
        .load(mode, &cli.bucket2, &cli.inventory2)
        .await
        .with_context(|| format!("Failed to load inventory of {}", cli.bucket2))?;

    tracing::info!("Comparing inventories...");
    let result = compare(&first, &second);

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        let report = Report::new(&result, &cli.bucket1, &cli.bucket2)
            .with_preview_limit(cli.preview_limit.unwrap_or(config.report_preview_limit));
        print!("{}", report);
    }

    tracing::info!("{}", render_verdict(&result));
    Ok(result.is_clean())
}

async fn build_stores(cli: &Cli, config: &Config) -> anyhow::Result<BucketStores> {
    if let Some(root) = &cli.local_root {
        return Ok(BucketStores::local(root));
    }

    let mut settings = s3_settings(cli, config);
    if let Some(profile) = &cli.profile {
        let resolved = resolve_profile(profile)
            .await
            .with_context(|| format!("Failed to load AWS profile {}", profile))?;
        settings.region = settings.region.or(resolved.region);
        settings.credentials = Some(resolved.credentials);
    }

    Ok(BucketStores::s3(settings))
}

fn s3_settings(cli: &Cli, config: &Config) -> S3Settings {
    S3Settings {
        region: cli.region.clone().or_else(|| config.aws_region.clone()),
        endpoint: cli.endpoint.clone().or_else(|| config.s3_endpoint.clone()),
        allow_http: cli.allow_http || config.s3_allow_http,
        credentials: None,
    }
}

fn setup_tracing(cli: &Cli, config: &Config) {
    let default_filter = if cli.quiet {
        "error".to_string()
    } else {
        match cli.verbose {
            0 => config.log_level.clone(),
            1 => "debug".to_string(),
            _ => "trace".to_string(),
        }
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        // stdout is reserved for the report
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
