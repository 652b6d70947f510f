//! # netkan-curse CLI
//!
//! Command-line front end for the Curse enrichment pipeline.
//!
//! - `transform`: enrich a `.netkan` document and print or save the result
//! - `resolve`: show where a mod id resolves to and its latest download
//!
//! Ctrl-C cancels any request in flight.

mod telemetry;

use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use netkan_curse::curse::{CurseApi, CurseConfig, DEFAULT_BASE_URL};
use netkan_curse::http::{DEFAULT_MAX_REDIRECTS, DEFAULT_TIMEOUT_SECS};
use netkan_curse::metadata::MetadataDocument;
use netkan_curse::transform::{CurseTransformer, Transformer};
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument, warn};

#[derive(Parser)]
#[command(author, version, about = "Fill NetKAN metadata from the Curse mod host", long_about = None)]
struct Cli {
    #[command(flatten)]
    connection: ConnectionArgs,

    /// Also write logs to this file
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Enrich a metadata document
    Transform(TransformArgs),

    /// Resolve a mod id to its page and latest download
    Resolve(ResolveArgs),
}

#[derive(Args, Debug, Clone)]
struct ConnectionArgs {
    /// Base URL of the project pages
    #[arg(long, global = true, default_value = DEFAULT_BASE_URL)]
    base_url: String,

    /// User agent sent with every request
    #[arg(long, global = true)]
    user_agent: Option<String>,

    /// Per-request timeout in seconds
    #[arg(long, global = true, default_value_t = DEFAULT_TIMEOUT_SECS)]
    timeout_secs: u64,

    /// Maximum redirects to follow when resolving a mod
    #[arg(long, global = true, default_value_t = DEFAULT_MAX_REDIRECTS)]
    max_redirects: usize,
}

#[derive(Args, Debug)]
struct TransformArgs {
    /// Metadata document to enrich
    #[arg(required = true)]
    input: PathBuf,

    /// Write the result here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct ResolveArgs {
    /// Mod id on the host
    #[arg(required = true)]
    mod_id: String,
}

impl ConnectionArgs {
    fn config(&self) -> CurseConfig {
        let mut builder = CurseConfig::builder()
            .base_url(self.base_url.clone())
            .timeout(Duration::from_secs(self.timeout_secs))
            .max_redirects(self.max_redirects);
        if let Some(user_agent) = &self.user_agent {
            builder = builder.user_agent(user_agent.clone());
        }
        builder.build()
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse command line arguments
    let cli = Cli::parse();

    let _logs = telemetry::init_tracing_subscriber(cli.log_file.as_deref())?;

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, cancelling");
            on_interrupt.cancel();
        }
    });

    match cli.command {
        Some(Commands::Transform(args)) => {
            transform_command(args, cli.connection.config(), &cancel).await?;
        }
        Some(Commands::Resolve(args)) => {
            resolve_command(args, cli.connection.config(), &cancel).await?;
        }
        None => {
            // If no command is provided, show help
            let _ = Cli::parse_from(["netkan-curse", "--help"]);
        }
    }

    Ok(())
}

#[instrument(skip(config, cancel))]
async fn transform_command(
    args: TransformArgs,
    config: CurseConfig,
    cancel: &CancellationToken,
) -> anyhow::Result<()> {
    let document = MetadataDocument::load(&args.input).await?;

    let transformer = CurseTransformer::new(CurseApi::new(config)?);
    let enriched = transformer.transform(document, cancel).await?;

    match args.output {
        Some(output_file) => {
            enriched.save(&output_file).await?;
            info!("Saved enriched metadata to {}", output_file.display());
        }
        None => println!("{}", enriched.to_pretty_string()?),
    }

    Ok(())
}

#[instrument(skip(config, cancel))]
async fn resolve_command(
    args: ResolveArgs,
    config: CurseConfig,
    cancel: &CancellationToken,
) -> anyhow::Result<()> {
    let api = CurseApi::new(config)?;
    let record = api.get_mod(&args.mod_id, cancel).await?;
    let latest = record.latest()?;

    println!("page:     {}", record.page_url());
    println!("download: {}", latest.download_text);

    Ok(())
}
