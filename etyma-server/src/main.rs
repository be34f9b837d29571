//! Etyma - Main entry point
//!
//! Serves the name-analysis web app and its fulfilment webhook. The
//! `analyze` and `render` subcommands run the same pipeline pieces from
//! the command line without starting the server.

use std::fs::OpenOptions;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use etyma_common::analysis::validate_name;
use etyma_common::config::{LoggingConfig, TomlConfig, CONFIG_ENV_VAR};
use etyma_common::{ArtStyle, ColourPalette, NameAnalysis};
use etyma_server::services::{render_poster_pdf, AnalysisClient, ArtClient, ArtRequest};
use etyma_server::{build_router, AppState};
use tokio::signal;
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Command-line arguments for etyma
#[derive(Parser, Debug)]
#[command(name = "etyma")]
#[command(about = "Name etymology posters: analysis, artwork and print delivery")]
#[command(version)]
struct Args {
    /// Path to TOML config file
    #[arg(short, long, env = CONFIG_ENV_VAR, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP server (default)
    Serve,

    /// Analyze a name and print the analysis as JSON
    Analyze {
        name: String,

        /// Also generate artwork and print its URL
        #[arg(long)]
        art: bool,

        /// Palette id used in the art prompt
        #[arg(long, default_value = "warm-gold")]
        palette: ColourPalette,

        /// Art style id (abstract, botanical, celestial, geometric, minimalist)
        #[arg(long, default_value = "abstract")]
        imagery: String,
    },

    /// Render a poster PDF from a saved analysis
    Render {
        /// Analysis JSON file
        #[arg(long)]
        analysis: PathBuf,

        #[arg(long)]
        palette: ColourPalette,

        /// Artwork to embed
        #[arg(long)]
        art_url: Option<String>,

        /// Output PDF path
        #[arg(long)]
        out: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Config loading logs through a temporary stderr subscriber; the
    // configured one needs the loaded logging section.
    let bootstrap = fmt().with_writer(std::io::stderr).finish();
    let config = tracing::subscriber::with_default(bootstrap, || {
        TomlConfig::load(args.config.as_deref())
    })
    .context("Failed to load configuration")?;

    init_tracing(&config.logging)?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        git_hash = env!("GIT_HASH"),
        built = env!("BUILD_TIMESTAMP"),
        profile = env!("BUILD_PROFILE"),
        "Etyma starting"
    );

    match args.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(config).await,
        Command::Analyze {
            name,
            art,
            palette,
            imagery,
        } => analyze(&config, &name, art.then_some((palette, imagery))).await,
        Command::Render {
            analysis,
            palette,
            art_url,
            out,
        } => render(&config, &analysis, palette, art_url.as_deref(), &out).await,
    }
}

/// `RUST_LOG` wins over the configured level
fn init_tracing(logging: &LoggingConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&logging.level))
        .with_context(|| format!("Invalid log level '{}'", logging.level))?;

    let file_layer = match &logging.file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            Some(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer())
        .with(file_layer)
        .init();
    Ok(())
}

async fn serve(config: TomlConfig) -> Result<()> {
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .with_context(|| {
            format!(
                "Invalid listen address {}:{}",
                config.server.host, config.server.port
            )
        })?;
    let sweep_every = Duration::from_secs(config.orders.sweep_interval_secs.max(1));

    let state = AppState::from_config(config).context("Failed to build upstream clients")?;
    if !state.analysis.is_configured() {
        tracing::warn!("No analysis API key configured, /api/analyze will fail");
    }
    let sweeper = state.orders.spawn_sweeper(sweep_every);

    let app = build_router(state);

    info!("Starting HTTP server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    sweeper.abort();
    info!("Server shutdown complete");
    Ok(())
}

async fn analyze(
    config: &TomlConfig,
    raw_name: &str,
    art: Option<(ColourPalette, String)>,
) -> Result<()> {
    let name = validate_name(raw_name)?;
    let client = AnalysisClient::new(&config.openai)?;
    let mut analysis = client
        .analyze_name(&name)
        .await
        .context("Name analysis failed")?;
    if analysis.name.trim().is_empty() {
        analysis.name = name.clone();
    }
    println!("{}", serde_json::to_string_pretty(&analysis)?);

    if let Some((palette, imagery)) = art {
        let style = ArtStyle::from_id_lossy(&imagery);
        let request = ArtRequest {
            name: analysis.name.clone(),
            meaning: analysis.etymology.meaning.clone(),
            palette: Some(palette.id().to_string()),
            imagery: style.id().to_string(),
            etymology: Some(serde_json::to_value(&analysis.etymology)?),
            morphology: Some(serde_json::to_value(&analysis.morphology)?),
            emotional_register: analysis
                .emotional_register
                .as_ref()
                .map(serde_json::to_value)
                .transpose()?,
        };
        if !request.is_complete() {
            bail!("Analysis has no meaning to illustrate");
        }

        let client = ArtClient::new(&config.art)?;
        let task = client.submit(&request).await.context("Art submission failed")?;
        info!(task_id = %task.task_id, provider = %task.provider, "Waiting for artwork");
        let url = client
            .wait_for_completion(&task.task_id)
            .await
            .context("Art generation failed")?;
        println!("{}", url);
    }
    Ok(())
}

async fn render(
    config: &TomlConfig,
    analysis_path: &Path,
    palette: ColourPalette,
    art_url: Option<&str>,
    out: &Path,
) -> Result<()> {
    let text = std::fs::read_to_string(analysis_path)
        .with_context(|| format!("Failed to read {}", analysis_path.display()))?;
    let analysis = NameAnalysis::from_json(&text)?;

    let art = ArtClient::new(&config.art)?;
    let pdf = render_poster_pdf(&art, &analysis, palette, art_url)
        .await
        .context("Poster rendering failed")?;

    std::fs::write(out, &pdf).with_context(|| format!("Failed to write {}", out.display()))?;
    info!(bytes = pdf.len(), path = %out.display(), "Poster written");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
