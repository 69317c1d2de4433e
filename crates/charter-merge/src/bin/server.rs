//! Charter Party merge server binary
//!
//! Run with: cargo run -p charter-merge -- serve

use anyhow::Context;
use charter_merge::{config::MergeConfig, server::MergeServer, MergePipeline};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "charter-merge", version, about = "Charter Party merge service")]
struct Cli {
    /// TOML configuration file
    #[arg(long, global = true, env = "CP_MERGE_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Start the HTTP server (default)
    Serve(ServeArgs),
    /// Merge three local files into a DOCX
    Merge(MergeArgs),
}

#[derive(Debug, Default, Args)]
struct ServeArgs {
    /// Host address to bind
    #[arg(long)]
    host: Option<String>,
    /// Port to listen on
    #[arg(long)]
    port: Option<u16>,
}

#[derive(Debug, Args)]
struct MergeArgs {
    /// Fixture recap (PDF, DOCX or TXT)
    #[arg(long)]
    fixture: PathBuf,
    /// Base Charter Party
    #[arg(long)]
    base_cp: PathBuf,
    /// Negotiated clauses
    #[arg(long)]
    clauses: PathBuf,
    /// Output DOCX path
    #[arg(long, short, default_value = "merged_charter_party.docx")]
    output: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "charter_merge=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let mut config = MergeConfig::load(cli.config.as_deref())?;

    match cli.command.unwrap_or(Command::Serve(ServeArgs::default())) {
        Command::Serve(args) => {
            if let Some(host) = args.host {
                config.server.host = host;
            }
            if let Some(port) = args.port {
                config.server.port = port;
            }
            serve(config).await
        }
        Command::Merge(args) => merge(config, args).await,
    }
}

async fn serve(config: MergeConfig) -> anyhow::Result<()> {
    println!(
        r#"
╔═══════════════════════════════════════════════════════════╗
║                  Charter Party Merge                      ║
║     Fixture Recap + Base CP + Clauses  ->  DOCX           ║
╚═══════════════════════════════════════════════════════════╝
"#
    );

    tracing::info!("Configuration loaded");
    tracing::info!("  - Max upload size: {} bytes", config.server.max_upload_size);
    tracing::info!("  - PDF extraction timeout: {}s", config.extraction.pdf_timeout_secs);
    tracing::info!("  - CORS: {}", config.server.enable_cors);

    let server = MergeServer::new(config);

    println!("\nServer starting...");
    println!("  API: http://{}", server.address());
    println!("  Health: http://{}/health", server.address());
    println!("\nEndpoints:");
    println!("  POST /api/merge - Upload fixture, baseCP and clauses");
    println!("  GET  /api/info  - Service info");
    println!("\nPress Ctrl+C to stop\n");

    server.start().await?;

    Ok(())
}

async fn merge(config: MergeConfig, args: MergeArgs) -> anyhow::Result<()> {
    let pipeline = MergePipeline::new(config.extraction);

    let output = pipeline
        .run_files(&args.fixture, &args.base_cp, &args.clauses)
        .await?;

    tokio::fs::write(&args.output, &output.document)
        .await
        .with_context(|| format!("writing {}", args.output.display()))?;

    println!(
        "Wrote {} ({} clauses, {} bytes)",
        args.output.display(),
        output.clause_count,
        output.document.len()
    );

    Ok(())
}
